/// A per-pixel statistic evaluated over a materialized neighborhood.
///
/// Implementors receive the center sample and the window samples in the order of
/// [`crate::shape::Shape::offsets`]. The window buffer belongs to the current pixel only, so
/// it may be reordered in place (e.g. for a median selection).
pub trait DirectStatistic: Send + Sync {
    /// The decision or filtered value produced for one pixel.
    type Output;

    /// Evaluate the statistic for one pixel.
    fn evaluate(&self, center: f64, window: &mut [f64]) -> Self::Output;
}

/// First and second order moments of a window.
///
/// Both the direct and the integral-image paths reduce a window to these moments, so every
/// statistic derived from them is computed by the same formulas on both paths.
///
/// The sums are taken over `sample - shift`. Choosing a shift close to the samples keeps the
/// sums small, so the variance does not cancel away for large-magnitude pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowMoments {
    /// Number of samples.
    pub count: f64,
    /// Value subtracted from every sample before summing.
    pub shift: f64,
    /// Sum of the shifted samples.
    pub sum: f64,
    /// Sum of the squared shifted samples.
    pub sum_sq: f64,
}

impl WindowMoments {
    /// Accumulate the moments of a window, shifted by its first sample.
    pub fn from_samples(window: &[f64]) -> Self {
        let shift = window.first().copied().unwrap_or_default();
        Self::from_shifted_samples(window, shift)
    }

    /// Accumulate the moments of a window, shifted by `shift`.
    pub fn from_shifted_samples(window: &[f64], shift: f64) -> Self {
        window.iter().fold(
            Self {
                shift,
                ..Self::default()
            },
            |acc, &v| {
                let d = v - shift;
                Self {
                    count: acc.count + 1.0,
                    sum: acc.sum + d,
                    sum_sq: acc.sum_sq + d * d,
                    ..acc
                }
            },
        )
    }

    /// Mean of the window, 0 for an empty window.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.count == 0.0 {
            return 0.0;
        }
        self.shift + self.sum / self.count
    }

    /// Population variance of the window, never negative.
    #[inline]
    pub fn variance(&self) -> f64 {
        if self.count == 0.0 {
            return 0.0;
        }
        let mean = self.sum / self.count;
        (self.sum_sq / self.count - mean * mean).max(0.0)
    }

    /// Population standard deviation of the window.
    #[inline]
    pub fn stdev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Minimum and maximum of a window, `(0, 0)` for an empty window.
pub fn min_max(window: &[f64]) -> (f64, f64) {
    if window.is_empty() {
        return (0.0, 0.0);
    }
    window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Median of a window, reordering the samples in place.
///
/// Windows with an even number of samples average the two middle samples.
pub fn median(window: &mut [f64]) -> f64 {
    let n = window.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    let (lower, upper, _) = window.select_nth_unstable_by(mid, f64::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        return upper;
    }
    let lower = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    0.5 * (lower + upper)
}
