use lokal_image::{Image, PixelType};

use crate::{
    boundary::BoundaryPolicy,
    error::{ensure_same_shape, LocalOpError},
    integral::IntegralTables,
    neighborhood::NeighborhoodWindow,
    parallel::{par_iter_planes, par_iter_rows, ExecutionStrategy},
    plane::PlaneView,
    shape::{RectangleShape, Shape},
    statistic::{DirectStatistic, WindowMoments},
};

/// Clamp a real value to the range of `T` and convert it.
///
/// # Examples
///
/// ```
/// use lokal_imgproc::engine::clamp_to_pixel;
///
/// assert_eq!(clamp_to_pixel::<u8>(312.4), 255);
/// assert_eq!(clamp_to_pixel::<i8>(-300.0), -128);
/// assert_eq!(clamp_to_pixel::<u16>(41.5), 42);
/// ```
#[inline]
pub fn clamp_to_pixel<T: PixelType>(value: f64) -> T {
    let lo = T::min_value().to_f64();
    let hi = T::max_value().to_f64();
    T::from_f64(value.clamp(lo, hi))
}

/// Evaluates neighborhood statistics plane by plane.
///
/// The engine owns the configuration shared by every operator: the neighborhood shape, the
/// boundary policy and the execution strategy. It borrows the images only for the duration
/// of a call and keeps no state between calls.
///
/// # Examples
///
/// ```
/// use lokal_image::Image;
/// use lokal_imgproc::{engine::NeighborhoodEngine, statistic::DirectStatistic, Shape};
///
/// struct WindowMax;
///
/// impl DirectStatistic for WindowMax {
///     type Output = f64;
///     fn evaluate(&self, _center: f64, window: &mut [f64]) -> f64 {
///         window.iter().copied().fold(f64::MIN, f64::max)
///     }
/// }
///
/// let src = Image::<u8, 2>::new([3, 1], vec![1, 5, 2]).unwrap();
/// let mut dst = Image::<u8, 2>::from_shape_val([3, 1], 0).unwrap();
///
/// let engine = NeighborhoodEngine::new(Shape::rectangle(1, false).unwrap());
/// engine.apply_direct(&src, &mut dst, &WindowMax, |v| v as u8).unwrap();
/// assert_eq!(dst.as_slice(), &[5, 5, 5]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborhoodEngine {
    shape: Shape,
    boundary: BoundaryPolicy,
    strategy: ExecutionStrategy,
}

impl NeighborhoodEngine {
    /// Create an engine for `shape` with the default boundary and execution strategy.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            boundary: BoundaryPolicy::default(),
            strategy: ExecutionStrategy::default(),
        }
    }

    /// Set the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The neighborhood shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The boundary policy.
    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    /// The execution strategy.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Evaluate `statistic` over a materialized window around every pixel.
    ///
    /// # Arguments
    ///
    /// * `src` - The input image.
    /// * `dst` - The output image, same shape as `src`.
    /// * `statistic` - The per-pixel statistic.
    /// * `emit` - Converts the statistic output into an output sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes differ, before anything is written.
    pub fn apply_direct<T, O, S, E, const N: usize>(
        &self,
        src: &Image<T, N>,
        dst: &mut Image<O, N>,
        statistic: &S,
        emit: E,
    ) -> Result<(), LocalOpError>
    where
        T: PixelType,
        O: PixelType,
        S: DirectStatistic,
        E: Fn(S::Output) -> O + Sync + Send,
    {
        ensure_same_shape(src.shape(), dst.shape())?;

        let size = src.plane_size();
        log::debug!(
            "direct scan: shape {}, boundary {}, {} planes of {}",
            self.shape,
            self.boundary,
            src.num_planes(),
            size
        );

        let planes = PlaneView::planes(src)?;
        par_iter_planes(
            &planes,
            dst.as_slice_mut(),
            src.plane_len(),
            self.strategy,
            |_, (key, plane), dst_plane| {
                log::trace!("direct scan of plane {:?}", key.0);
                let plane = *plane;
                let window = NeighborhoodWindow::new(plane, &self.shape, self.boundary);
                par_iter_rows(dst_plane, size.width, self.strategy, |y, row| {
                    let mut buf = Vec::with_capacity(window.len());
                    for (x, out) in row.iter_mut().enumerate() {
                        window.samples_at(x, y, &mut buf);
                        *out = emit(statistic.evaluate(plane.get(x, y), &mut buf));
                    }
                });
            },
        )?;

        Ok(())
    }

    /// Check that the integral-image path can honor this configuration.
    ///
    /// Only rectangle shapes with the [`BoundaryPolicy::Clamp`] boundary are supported.
    pub fn integral_shape(&self) -> Result<RectangleShape, LocalOpError> {
        let Shape::Rectangle(rect) = self.shape else {
            return Err(LocalOpError::UnsupportedShape {
                operation: "integral image",
                shape: self.shape.to_string(),
            });
        };
        if self.boundary != BoundaryPolicy::Clamp {
            return Err(LocalOpError::UnsupportedBoundary {
                operation: "integral image",
                boundary: self.boundary.to_string(),
            });
        }
        Ok(rect)
    }

    /// Evaluate `decide` on the window moments of every pixel, read from integral tables.
    ///
    /// Each plane first builds its tables completely, then queries them; the tables are
    /// dropped once the plane is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is not a rectangle, if the boundary is not
    /// [`BoundaryPolicy::Clamp`], or if the image shapes differ. Nothing is written on error.
    pub fn apply_integral<T, O, F, const N: usize>(
        &self,
        src: &Image<T, N>,
        dst: &mut Image<O, N>,
        decide: F,
    ) -> Result<(), LocalOpError>
    where
        T: PixelType,
        O: PixelType,
        F: Fn(f64, &WindowMoments) -> O + Sync + Send,
    {
        let rect = self.integral_shape()?;
        ensure_same_shape(src.shape(), dst.shape())?;

        let size = src.plane_size();
        log::debug!(
            "integral scan: shape {}, {} planes of {}",
            self.shape,
            src.num_planes(),
            size
        );

        let planes = PlaneView::planes(src)?;
        par_iter_planes(
            &planes,
            dst.as_slice_mut(),
            src.plane_len(),
            self.strategy,
            |_, (key, plane), dst_plane| {
                log::trace!("integral scan of plane {:?}", key.0);
                let plane = *plane;
                let tables = IntegralTables::new(&plane);
                par_iter_rows(dst_plane, size.width, self.strategy, |y, row| {
                    for (x, out) in row.iter_mut().enumerate() {
                        let moments = tables.window_moments(x, y, &rect);
                        *out = decide(plane.get(x, y), &moments);
                    }
                });
            },
        )?;

        Ok(())
    }
}
