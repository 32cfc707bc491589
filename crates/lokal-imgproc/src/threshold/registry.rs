use std::{collections::HashMap, sync::Arc};

use crate::{
    error::LocalOpError,
    threshold::{
        histogram::{self, HistogramThreshold, LocalHistogram},
        methods::{
            LocalBernsen, LocalContrast, LocalMean, LocalMedian, LocalMidGrey, LocalNiblack,
            LocalPhansalkar, LocalSauvola, ThresholdMethod,
        },
    },
};

/// Optional method parameters; unset fields keep the method defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MethodParams {
    /// Contrast weight (Niblack, Sauvola, Phansalkar).
    pub k: Option<f64>,
    /// Dynamic range of the standard deviation (Sauvola, Phansalkar).
    pub r: Option<f64>,
    /// Exponential magnitude (Phansalkar).
    pub p: Option<f64>,
    /// Exponential decay (Phansalkar).
    pub q: Option<f64>,
    /// Constant offset (mean, median, mid-grey, Niblack).
    pub c: Option<f64>,
    /// Minimum range of a high contrast window (Bernsen).
    pub contrast_threshold: Option<f64>,
    /// Uniform window cutoff (Bernsen).
    ///
    /// Defaults to 127.5, half the range of `u8`. For other pixel types pass half their
    /// maximum, as [`LocalBernsen::for_pixel_type`] does, or low-contrast windows are
    /// classified against the `u8` midpoint.
    pub half_max_value: Option<f64>,
    /// Histogram bins (histogram methods).
    pub bins: Option<usize>,
}

impl MethodParams {
    /// Set `k`.
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = Some(k);
        self
    }

    /// Set `r`.
    pub fn with_r(mut self, r: f64) -> Self {
        self.r = Some(r);
        self
    }

    /// Set `p`.
    pub fn with_p(mut self, p: f64) -> Self {
        self.p = Some(p);
        self
    }

    /// Set `q`.
    pub fn with_q(mut self, q: f64) -> Self {
        self.q = Some(q);
        self
    }

    /// Set `c`.
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = Some(c);
        self
    }

    /// Set the Bernsen contrast threshold.
    pub fn with_contrast_threshold(mut self, contrast_threshold: f64) -> Self {
        self.contrast_threshold = Some(contrast_threshold);
        self
    }

    /// Set the Bernsen uniform window cutoff.
    pub fn with_half_max_value(mut self, half_max_value: f64) -> Self {
        self.half_max_value = Some(half_max_value);
        self
    }

    /// Set the histogram bin count.
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }
}

/// Builds a method from parameters.
pub type MethodFactory = Arc<dyn Fn(&MethodParams) -> ThresholdMethod + Send + Sync>;

/// Name to factory table of the local threshold methods.
///
/// # Examples
///
/// ```
/// use lokal_imgproc::threshold::{MethodParams, MethodRegistry};
///
/// let registry = MethodRegistry::with_defaults();
/// let method = registry
///     .create("sauvola", &MethodParams::default().with_k(0.3))
///     .unwrap();
/// assert_eq!(method.name(), "sauvola");
///
/// assert!(registry.create("unknown", &MethodParams::default()).is_err());
/// ```
#[derive(Clone, Default)]
pub struct MethodRegistry {
    factories: HashMap<String, MethodFactory>,
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl MethodRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in method.
    ///
    /// The global histogram methods are registered as `otsu`, `histogram_mean`, `percentile`
    /// and `isodata`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register("mean", |params| {
            let d = LocalMean::default();
            d.with_c(params.c.unwrap_or(d.c)).into()
        });
        registry.register("median", |params| {
            let d = LocalMedian::default();
            d.with_c(params.c.unwrap_or(d.c)).into()
        });
        registry.register("mid_grey", |params| {
            let d = LocalMidGrey::default();
            d.with_c(params.c.unwrap_or(d.c)).into()
        });
        registry.register("contrast", |_| LocalContrast.into());
        registry.register("bernsen", |params| {
            let d = LocalBernsen::default();
            d.with_contrast_threshold(params.contrast_threshold.unwrap_or(d.contrast_threshold))
                .with_half_max_value(params.half_max_value.unwrap_or(d.half_max_value))
                .into()
        });
        registry.register("niblack", |params| {
            let d = LocalNiblack::default();
            d.with_k(params.k.unwrap_or(d.k))
                .with_c(params.c.unwrap_or(d.c))
                .into()
        });
        registry.register("sauvola", |params| {
            let d = LocalSauvola::default();
            d.with_k(params.k.unwrap_or(d.k))
                .with_r(params.r.unwrap_or(d.r))
                .into()
        });
        registry.register("phansalkar", |params| {
            let d = LocalPhansalkar::default();
            d.with_k(params.k.unwrap_or(d.k))
                .with_r(params.r.unwrap_or(d.r))
                .with_p(params.p.unwrap_or(d.p))
                .with_q(params.q.unwrap_or(d.q))
                .into()
        });

        registry.register_histogram("otsu", histogram::otsu);
        registry.register_histogram("histogram_mean", histogram::mean);
        registry.register_histogram("percentile", histogram::percentile);
        registry.register_histogram("isodata", histogram::isodata);

        registry
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&MethodParams) -> ThresholdMethod + Send + Sync + 'static,
    {
        let name = name.into();
        log::debug!("registering threshold method `{name}`");
        self.factories.insert(name, Arc::new(factory));
    }

    /// Register a global histogram method, applied locally, under `name`.
    pub fn register_histogram<H>(&mut self, name: impl Into<String>, method: H)
    where
        H: HistogramThreshold + 'static,
    {
        let name = name.into();
        let method: Arc<dyn HistogramThreshold> = Arc::new(method);
        let key = name.clone();
        self.register(key, move |params| {
            let local = LocalHistogram::from_arc(name.clone(), method.clone());
            match params.bins {
                Some(bins) => local.with_bins(bins).into(),
                None => local.into(),
            }
        });
    }

    /// Build and validate the method registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LocalOpError::UnknownMethod`] if nothing is registered under `name`, or the
    /// validation error of the built method.
    pub fn create(&self, name: &str, params: &MethodParams) -> Result<ThresholdMethod, LocalOpError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| LocalOpError::UnknownMethod(name.to_string()))?;
        let method = factory(params);
        method.validate()?;
        Ok(method)
    }

    /// Whether a method is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// The registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.factories.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}
