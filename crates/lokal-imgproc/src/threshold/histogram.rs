use std::sync::Arc;

use crate::{
    error::LocalOpError,
    statistic::{min_max, DirectStatistic},
};

/// Number of histogram bins used when none is given.
pub const DEFAULT_BINS: usize = 256;

/// A global threshold method: maps a histogram to a threshold bin.
///
/// Samples whose bin is strictly above the returned bin are foreground. Any
/// `Fn(&[u64]) -> usize` closure implements the trait.
pub trait HistogramThreshold: Send + Sync {
    /// Compute the threshold bin of `histogram`.
    fn threshold_bin(&self, histogram: &[u64]) -> usize;
}

impl<F> HistogramThreshold for F
where
    F: Fn(&[u64]) -> usize + Send + Sync,
{
    fn threshold_bin(&self, histogram: &[u64]) -> usize {
        self(histogram)
    }
}

/// A global histogram method applied to every neighborhood.
///
/// The window samples are binned over `[window min, window max]` and the method's threshold
/// bin decides the center: `true` when the bin of the center is above it.
#[derive(Clone)]
pub struct LocalHistogram {
    name: String,
    method: Arc<dyn HistogramThreshold>,
    bins: usize,
}

impl std::fmt::Debug for LocalHistogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalHistogram")
            .field("name", &self.name)
            .field("bins", &self.bins)
            .finish_non_exhaustive()
    }
}

impl LocalHistogram {
    /// Wrap a histogram method under `name`, with [`DEFAULT_BINS`] bins.
    ///
    /// # Examples
    ///
    /// ```
    /// use lokal_imgproc::threshold::{otsu, LocalHistogram};
    ///
    /// let method = LocalHistogram::new("otsu", otsu).with_bins(64);
    /// assert_eq!(method.name(), "otsu");
    /// assert_eq!(method.bins(), 64);
    /// ```
    pub fn new(name: impl Into<String>, method: impl HistogramThreshold + 'static) -> Self {
        Self::from_arc(name, Arc::new(method))
    }

    /// Wrap a shared histogram method under `name`.
    pub fn from_arc(name: impl Into<String>, method: Arc<dyn HistogramThreshold>) -> Self {
        Self {
            name: name.into(),
            method,
            bins: DEFAULT_BINS,
        }
    }

    /// Set the number of bins.
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// The registered name of the method.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of bins.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Check the bin count.
    pub fn validate(&self) -> Result<(), LocalOpError> {
        if self.bins < 2 {
            return Err(LocalOpError::InvalidParameter {
                name: "bins",
                value: self.bins as f64,
                reason: "a histogram needs at least two bins",
            });
        }
        Ok(())
    }

    /// Bin of `value` for a histogram spanning `[lo, hi]`.
    #[inline]
    fn bin(&self, value: f64, lo: f64, hi: f64) -> usize {
        if hi <= lo {
            return 0;
        }
        let pos = (value - lo) / (hi - lo) * self.bins as f64;
        (pos.max(0.0) as usize).min(self.bins - 1)
    }

    /// Histogram of the window over its own range.
    pub fn histogram(&self, window: &[f64]) -> Vec<u64> {
        let (lo, hi) = min_max(window);
        let mut histogram = vec![0u64; self.bins];
        for &v in window {
            histogram[self.bin(v, lo, hi)] += 1;
        }
        histogram
    }
}

impl DirectStatistic for LocalHistogram {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        let (lo, hi) = min_max(window);
        let histogram = self.histogram(window);
        let k = self.method.threshold_bin(&histogram);
        self.bin(center, lo, hi) > k
    }
}

/// Otsu's method: the bin maximizing the between-class variance.
///
/// # Examples
///
/// ```
/// use lokal_imgproc::threshold::otsu;
///
/// let histogram = [10, 0, 0, 0, 0, 0, 0, 10];
/// assert_eq!(otsu(&histogram), 0);
/// ```
pub fn otsu(histogram: &[u64]) -> usize {
    let total = histogram.iter().sum::<u64>() as f64;
    if total == 0.0 {
        return 0;
    }
    let sum_total = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>();

    let mut sum_background = 0.0;
    let mut weight_background = 0.0;
    let mut max_variance = -1.0;
    let mut best = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground == 0.0 {
            break;
        }
        sum_background += t as f64 * count as f64;

        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;
        let diff = mean_background - mean_foreground;
        let variance = weight_background * weight_foreground * diff * diff;

        if variance > max_variance {
            max_variance = variance;
            best = t;
        }
    }

    best
}

/// The mean gray level, truncated to a bin.
pub fn mean(histogram: &[u64]) -> usize {
    let total = histogram.iter().sum::<u64>() as f64;
    if total == 0.0 {
        return 0;
    }
    let sum = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>();
    (sum / total).floor() as usize
}

/// The bin whose cumulative fraction is closest to one half.
pub fn percentile(histogram: &[u64]) -> usize {
    let total = histogram.iter().sum::<u64>() as f64;
    if total == 0.0 {
        return 0;
    }
    let mut cumulative = 0.0;
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, &count) in histogram.iter().enumerate() {
        cumulative += count as f64;
        let distance = (cumulative / total - 0.5).abs();
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

/// Ridler and Calvard's iterative intermeans method.
///
/// Starting from the mean bin, the threshold moves to the midpoint of the means below and
/// above it until it no longer changes.
pub fn isodata(histogram: &[u64]) -> usize {
    let mut threshold = mean(histogram);
    if histogram.is_empty() {
        return threshold;
    }

    let class_mean = |range: std::ops::Range<usize>| -> Option<f64> {
        let (weight, sum) = histogram[range.clone()]
            .iter()
            .zip(range)
            .fold((0.0, 0.0), |(w, s), (&count, i)| {
                (w + count as f64, s + i as f64 * count as f64)
            });
        (weight > 0.0).then(|| sum / weight)
    };

    for _ in 0..histogram.len() {
        let below = class_mean(0..threshold + 1);
        let above = class_mean(threshold + 1..histogram.len());
        let (Some(below), Some(above)) = (below, above) else {
            break;
        };
        let next = ((below + above) / 2.0).floor() as usize;
        if next == threshold {
            break;
        }
        threshold = next;
    }

    threshold
}
