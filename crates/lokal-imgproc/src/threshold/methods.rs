use lokal_image::PixelType;

use crate::{
    error::LocalOpError,
    statistic::{median, min_max, DirectStatistic, WindowMoments},
    threshold::histogram::LocalHistogram,
};

/// A threshold derived from the first and second window moments only.
///
/// These methods can be evaluated from integral tables as well as from a materialized
/// window, and both paths share the same formula.
pub trait MomentStatistic: Send + Sync {
    /// The local threshold for a window with the given moments.
    fn threshold(&self, moments: &WindowMoments) -> f64;

    /// Whether `center` is foreground.
    #[inline]
    fn decide(&self, center: f64, moments: &WindowMoments) -> bool {
        center > self.threshold(moments)
    }
}

fn ensure_finite(name: &'static str, value: f64) -> Result<(), LocalOpError> {
    if !value.is_finite() {
        return Err(LocalOpError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        });
    }
    Ok(())
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), LocalOpError> {
    ensure_finite(name, value)?;
    if value <= 0.0 {
        return Err(LocalOpError::InvalidParameter {
            name,
            value,
            reason: "must be strictly positive",
        });
    }
    Ok(())
}

/// Foreground when the center is above the window mean minus `c`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalMean {
    /// Offset subtracted from the mean.
    pub c: f64,
}

impl LocalMean {
    /// Set the offset.
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), LocalOpError> {
        ensure_finite("c", self.c)
    }
}

impl MomentStatistic for LocalMean {
    #[inline]
    fn threshold(&self, moments: &WindowMoments) -> f64 {
        moments.mean() - self.c
    }
}

impl DirectStatistic for LocalMean {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        self.decide(center, &WindowMoments::from_samples(window))
    }
}

/// Foreground when the center is above the window median minus `c`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalMedian {
    /// Offset subtracted from the median.
    pub c: f64,
}

impl LocalMedian {
    /// Set the offset.
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), LocalOpError> {
        ensure_finite("c", self.c)
    }
}

impl DirectStatistic for LocalMedian {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        center > median(window) - self.c
    }
}

/// Foreground when the center is above the window mid-range minus `c`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalMidGrey {
    /// Offset subtracted from the mid-range.
    pub c: f64,
}

impl LocalMidGrey {
    /// Set the offset.
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), LocalOpError> {
        ensure_finite("c", self.c)
    }
}

impl DirectStatistic for LocalMidGrey {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        let (lo, hi) = min_max(window);
        center > 0.5 * (lo + hi) - self.c
    }
}

/// Foreground when the center is closer to the window maximum than to the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalContrast;

impl DirectStatistic for LocalContrast {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        let (lo, hi) = min_max(window);
        center - lo > hi - center
    }
}

/// Bernsen's method.
///
/// High contrast windows compare the center against the mid-range. Windows whose range is
/// below `contrast_threshold` are uniform: the whole window is foreground when its mid-range
/// reaches `half_max_value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalBernsen {
    /// Minimum range of a high contrast window.
    pub contrast_threshold: f64,
    /// Mid-range from which a uniform window is foreground.
    pub half_max_value: f64,
}

impl Default for LocalBernsen {
    fn default() -> Self {
        Self {
            contrast_threshold: 15.0,
            half_max_value: 127.5,
        }
    }
}

impl LocalBernsen {
    /// Default parameters with `half_max_value` at half the maximum of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lokal_imgproc::threshold::LocalBernsen;
    ///
    /// assert_eq!(LocalBernsen::for_pixel_type::<u16>().half_max_value, 32767.5);
    /// ```
    pub fn for_pixel_type<T: PixelType>() -> Self {
        Self::default().with_half_max_value(T::max_value().to_f64() / 2.0)
    }

    /// Set the contrast threshold.
    pub fn with_contrast_threshold(mut self, contrast_threshold: f64) -> Self {
        self.contrast_threshold = contrast_threshold;
        self
    }

    /// Set the uniform window cutoff.
    pub fn with_half_max_value(mut self, half_max_value: f64) -> Self {
        self.half_max_value = half_max_value;
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), LocalOpError> {
        ensure_finite("contrast_threshold", self.contrast_threshold)?;
        ensure_finite("half_max_value", self.half_max_value)
    }
}

impl DirectStatistic for LocalBernsen {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        let (lo, hi) = min_max(window);
        let mid_grey = 0.5 * (lo + hi);
        if hi - lo < self.contrast_threshold {
            mid_grey >= self.half_max_value
        } else {
            center >= mid_grey
        }
    }
}

/// Niblack's method: `mean + k * stdev + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalNiblack {
    /// Weight of the standard deviation.
    pub k: f64,
    /// Constant offset.
    pub c: f64,
}

impl Default for LocalNiblack {
    fn default() -> Self {
        Self { k: 0.2, c: 0.0 }
    }
}

impl LocalNiblack {
    /// Set the standard deviation weight.
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    /// Set the constant offset.
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), LocalOpError> {
        ensure_finite("k", self.k)?;
        ensure_finite("c", self.c)
    }
}

impl MomentStatistic for LocalNiblack {
    #[inline]
    fn threshold(&self, moments: &WindowMoments) -> f64 {
        moments.mean() + self.k * moments.stdev() + self.c
    }
}

impl DirectStatistic for LocalNiblack {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        self.decide(center, &WindowMoments::from_samples(window))
    }
}

/// Sauvola's method: `mean * (1 + k * (stdev / r - 1))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSauvola {
    /// Sensitivity to the local contrast.
    pub k: f64,
    /// Dynamic range of the standard deviation, strictly positive.
    pub r: f64,
}

impl Default for LocalSauvola {
    fn default() -> Self {
        Self { k: 0.5, r: 0.5 }
    }
}

impl LocalSauvola {
    /// Set the contrast sensitivity.
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    /// Set the dynamic range.
    pub fn with_r(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), LocalOpError> {
        ensure_finite("k", self.k)?;
        ensure_positive("r", self.r)
    }
}

impl MomentStatistic for LocalSauvola {
    #[inline]
    fn threshold(&self, moments: &WindowMoments) -> f64 {
        moments.mean() * (1.0 + self.k * (moments.stdev() / self.r - 1.0))
    }
}

impl DirectStatistic for LocalSauvola {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        self.decide(center, &WindowMoments::from_samples(window))
    }
}

/// Phansalkar's method: `mean * (1 + p * exp(-q * mean) + k * (stdev / r - 1))`.
///
/// Intended for images normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPhansalkar {
    /// Sensitivity to the local contrast.
    pub k: f64,
    /// Dynamic range of the standard deviation, strictly positive.
    pub r: f64,
    /// Magnitude of the exponential term.
    pub p: f64,
    /// Decay of the exponential term.
    pub q: f64,
}

impl Default for LocalPhansalkar {
    fn default() -> Self {
        Self {
            k: 0.25,
            r: 0.5,
            p: 2.0,
            q: 10.0,
        }
    }
}

impl LocalPhansalkar {
    /// Set the contrast sensitivity.
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    /// Set the dynamic range.
    pub fn with_r(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    /// Set the exponential magnitude.
    pub fn with_p(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    /// Set the exponential decay.
    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), LocalOpError> {
        ensure_finite("k", self.k)?;
        ensure_positive("r", self.r)?;
        ensure_finite("p", self.p)?;
        ensure_finite("q", self.q)
    }
}

impl MomentStatistic for LocalPhansalkar {
    #[inline]
    fn threshold(&self, moments: &WindowMoments) -> f64 {
        let mean = moments.mean();
        mean * (1.0 + self.p * (-self.q * mean).exp() + self.k * (moments.stdev() / self.r - 1.0))
    }
}

impl DirectStatistic for LocalPhansalkar {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        self.decide(center, &WindowMoments::from_samples(window))
    }
}

/// Every local threshold method.
#[derive(Debug, Clone)]
pub enum ThresholdMethod {
    /// See [`LocalMean`].
    Mean(LocalMean),
    /// See [`LocalMedian`].
    Median(LocalMedian),
    /// See [`LocalMidGrey`].
    MidGrey(LocalMidGrey),
    /// See [`LocalContrast`].
    Contrast(LocalContrast),
    /// See [`LocalBernsen`].
    Bernsen(LocalBernsen),
    /// See [`LocalNiblack`].
    Niblack(LocalNiblack),
    /// See [`LocalSauvola`].
    Sauvola(LocalSauvola),
    /// See [`LocalPhansalkar`].
    Phansalkar(LocalPhansalkar),
    /// See [`LocalHistogram`].
    Histogram(LocalHistogram),
}

impl ThresholdMethod {
    /// The name of the method.
    pub fn name(&self) -> &str {
        match self {
            Self::Mean(_) => "mean",
            Self::Median(_) => "median",
            Self::MidGrey(_) => "mid_grey",
            Self::Contrast(_) => "contrast",
            Self::Bernsen(_) => "bernsen",
            Self::Niblack(_) => "niblack",
            Self::Sauvola(_) => "sauvola",
            Self::Phansalkar(_) => "phansalkar",
            Self::Histogram(method) => method.name(),
        }
    }

    /// Check the parameters of the method.
    pub fn validate(&self) -> Result<(), LocalOpError> {
        match self {
            Self::Mean(method) => method.validate(),
            Self::Median(method) => method.validate(),
            Self::MidGrey(method) => method.validate(),
            Self::Contrast(_) => Ok(()),
            Self::Bernsen(method) => method.validate(),
            Self::Niblack(method) => method.validate(),
            Self::Sauvola(method) => method.validate(),
            Self::Phansalkar(method) => method.validate(),
            Self::Histogram(method) => method.validate(),
        }
    }

    /// The moment form of the method, if it has one.
    pub fn as_moment_statistic(&self) -> Option<&dyn MomentStatistic> {
        match self {
            Self::Mean(method) => Some(method),
            Self::Niblack(method) => Some(method),
            Self::Sauvola(method) => Some(method),
            Self::Phansalkar(method) => Some(method),
            _ => None,
        }
    }
}

impl DirectStatistic for ThresholdMethod {
    type Output = bool;

    fn evaluate(&self, center: f64, window: &mut [f64]) -> bool {
        match self {
            Self::Mean(method) => method.evaluate(center, window),
            Self::Median(method) => method.evaluate(center, window),
            Self::MidGrey(method) => method.evaluate(center, window),
            Self::Contrast(method) => method.evaluate(center, window),
            Self::Bernsen(method) => method.evaluate(center, window),
            Self::Niblack(method) => method.evaluate(center, window),
            Self::Sauvola(method) => method.evaluate(center, window),
            Self::Phansalkar(method) => method.evaluate(center, window),
            Self::Histogram(method) => method.evaluate(center, window),
        }
    }
}

macro_rules! impl_from_method {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for ThresholdMethod {
                fn from(method: $ty) -> Self {
                    Self::$variant(method)
                }
            }
        )*
    };
}

impl_from_method!(
    Mean(LocalMean),
    Median(LocalMedian),
    MidGrey(LocalMidGrey),
    Contrast(LocalContrast),
    Bernsen(LocalBernsen),
    Niblack(LocalNiblack),
    Sauvola(LocalSauvola),
    Phansalkar(LocalPhansalkar),
    Histogram(LocalHistogram),
);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_with_offset() {
        let window = [10.0, 20.0, 30.0];
        assert!(!LocalMean::default().evaluate(20.0, &mut window.clone()));
        assert!(LocalMean::default().with_c(1.0).evaluate(20.0, &mut window.clone()));
    }

    #[test]
    fn median_and_mid_grey() {
        let window = [0.0, 1.0, 2.0, 9.0];
        // median 1.5, mid-range 4.5
        assert!(LocalMedian::default().evaluate(2.0, &mut window.clone()));
        assert!(!LocalMidGrey::default().evaluate(2.0, &mut window.clone()));
        assert!(LocalMidGrey::default().with_c(3.0).evaluate(2.0, &mut window.clone()));
    }

    #[test]
    fn contrast() {
        assert!(LocalContrast.evaluate(7.0, &mut [0.0, 7.0, 10.0]));
        assert!(!LocalContrast.evaluate(3.0, &mut [0.0, 3.0, 10.0]));
        assert!(!LocalContrast.evaluate(5.0, &mut [0.0, 5.0, 10.0]));
    }

    #[test]
    fn bernsen_branches() {
        let bernsen = LocalBernsen::default();
        // low contrast, bright
        assert!(bernsen.evaluate(200.0, &mut [200.0, 205.0, 210.0]));
        // low contrast, dark
        assert!(!bernsen.evaluate(20.0, &mut [20.0, 25.0, 30.0]));
        // high contrast, center at the mid-range
        assert!(bernsen.evaluate(50.0, &mut [0.0, 50.0, 100.0]));
        assert!(!bernsen.evaluate(49.0, &mut [0.0, 49.0, 100.0]));
    }

    #[test]
    fn flat_window_formulas() {
        let moments = WindowMoments::from_samples(&[0.5; 9]);
        assert_eq!(moments.stdev(), 0.0);
        assert_relative_eq!(LocalNiblack::default().threshold(&moments), 0.5);
        assert_relative_eq!(
            LocalNiblack::default().with_c(0.1).threshold(&moments),
            0.6,
            epsilon = 1e-12
        );
        // stdev 0: mean * (1 - k)
        assert_relative_eq!(LocalSauvola::default().threshold(&moments), 0.25, epsilon = 1e-12);
        let expected = 0.5 * (1.0 + 2.0 * (-5.0f64).exp() - 0.25);
        assert_relative_eq!(
            LocalPhansalkar::default().threshold(&moments),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn invalid_parameters() {
        assert!(matches!(
            LocalSauvola::default().with_r(0.0).validate(),
            Err(LocalOpError::InvalidParameter { name: "r", .. })
        ));
        assert!(matches!(
            LocalPhansalkar::default().with_r(-1.0).validate(),
            Err(LocalOpError::InvalidParameter { name: "r", .. })
        ));
        assert!(matches!(
            LocalNiblack::default().with_k(f64::NAN).validate(),
            Err(LocalOpError::InvalidParameter { name: "k", .. })
        ));
        assert!(ThresholdMethod::from(LocalContrast).validate().is_ok());
    }

    #[test]
    fn moment_forms() {
        assert!(ThresholdMethod::from(LocalMean::default())
            .as_moment_statistic()
            .is_some());
        assert!(ThresholdMethod::from(LocalPhansalkar::default())
            .as_moment_statistic()
            .is_some());
        assert!(ThresholdMethod::from(LocalMedian::default())
            .as_moment_statistic()
            .is_none());
        assert!(ThresholdMethod::from(LocalBernsen::default())
            .as_moment_statistic()
            .is_none());
        assert_eq!(ThresholdMethod::from(LocalMidGrey::default()).name(), "mid_grey");
    }
}
