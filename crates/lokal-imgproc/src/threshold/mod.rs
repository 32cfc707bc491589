use lokal_image::{Image, PixelType};

use crate::{
    boundary::BoundaryPolicy, engine::NeighborhoodEngine, error::LocalOpError, shape::Shape,
};

/// Global histogram methods applied per neighborhood.
mod histogram;
pub use histogram::*;

/// Local threshold methods and their parameters.
mod methods;
pub use methods::*;

/// Name to factory table of the methods.
mod registry;
pub use registry::*;

/// Apply a local threshold by scanning every neighborhood.
///
/// # Arguments
///
/// * `src` - The input image of any rank.
/// * `dst` - The binary output image with the same shape as `src`.
/// * `method` - The threshold method.
/// * `shape` - The neighborhood shape.
/// * `boundary` - How samples outside the plane are read.
///
/// # Errors
///
/// Returns an error if the method parameters are invalid or the shapes differ. `dst` is
/// left untouched on error.
///
/// # Examples
///
/// ```
/// use lokal_image::Image;
/// use lokal_imgproc::{
///     threshold::{local_threshold, LocalMean},
///     BoundaryPolicy, Shape,
/// };
///
/// let src = Image::<u8, 2>::new([3, 1], vec![10, 50, 20]).unwrap();
/// let mut dst = Image::<bool, 2>::from_shape_val([3, 1], false).unwrap();
///
/// local_threshold(
///     &src,
///     &mut dst,
///     &LocalMean::default().into(),
///     &Shape::rectangle(1, false).unwrap(),
///     BoundaryPolicy::Clamp,
/// )
/// .unwrap();
/// assert_eq!(dst.as_slice(), &[false, true, false]);
/// ```
pub fn local_threshold<T, const N: usize>(
    src: &Image<T, N>,
    dst: &mut Image<bool, N>,
    method: &ThresholdMethod,
    shape: &Shape,
    boundary: BoundaryPolicy,
) -> Result<(), LocalOpError>
where
    T: PixelType,
{
    let engine = NeighborhoodEngine::new(*shape).with_boundary(boundary);
    local_threshold_with(&engine, src, dst, method)
}

/// Apply a local threshold by scanning every neighborhood, with an explicit engine.
pub fn local_threshold_with<T, const N: usize>(
    engine: &NeighborhoodEngine,
    src: &Image<T, N>,
    dst: &mut Image<bool, N>,
    method: &ThresholdMethod,
) -> Result<(), LocalOpError>
where
    T: PixelType,
{
    method.validate()?;
    log::debug!("local threshold `{}`", method.name());
    engine.apply_direct(src, dst, method, |decision| decision)
}

/// Apply a local threshold from integral tables.
///
/// Produces the same decisions as [`local_threshold`] with [`BoundaryPolicy::Clamp`], in
/// time independent of the neighborhood size.
///
/// # Errors
///
/// Returns an error if the shape is not a rectangle, if `boundary` is not
/// [`BoundaryPolicy::Clamp`], if the method is not one of mean, Niblack, Sauvola or
/// Phansalkar, if its parameters are invalid, or if the shapes differ. `dst` is left
/// untouched on error.
///
/// # Examples
///
/// ```
/// use lokal_image::Image;
/// use lokal_imgproc::{
///     threshold::{local_threshold_integral, LocalNiblack},
///     BoundaryPolicy, Shape,
/// };
///
/// let src = Image::<u8, 2>::new([3, 1], vec![10, 50, 20]).unwrap();
/// let mut dst = Image::<bool, 2>::from_shape_val([3, 1], false).unwrap();
///
/// local_threshold_integral(
///     &src,
///     &mut dst,
///     &LocalNiblack::default().into(),
///     &Shape::rectangle(1, false).unwrap(),
///     BoundaryPolicy::Clamp,
/// )
/// .unwrap();
/// assert_eq!(dst.as_slice(), &[false, true, false]);
/// ```
pub fn local_threshold_integral<T, const N: usize>(
    src: &Image<T, N>,
    dst: &mut Image<bool, N>,
    method: &ThresholdMethod,
    shape: &Shape,
    boundary: BoundaryPolicy,
) -> Result<(), LocalOpError>
where
    T: PixelType,
{
    let engine = NeighborhoodEngine::new(*shape).with_boundary(boundary);
    local_threshold_integral_with(&engine, src, dst, method)
}

/// Apply a local threshold from integral tables, with an explicit engine.
pub fn local_threshold_integral_with<T, const N: usize>(
    engine: &NeighborhoodEngine,
    src: &Image<T, N>,
    dst: &mut Image<bool, N>,
    method: &ThresholdMethod,
) -> Result<(), LocalOpError>
where
    T: PixelType,
{
    let statistic = method
        .as_moment_statistic()
        .ok_or_else(|| LocalOpError::UnsupportedMethod {
            operation: "integral image",
            method: method.name().to_string(),
        })?;
    method.validate()?;
    log::debug!("local threshold `{}` from integral tables", method.name());
    engine.apply_integral(src, dst, |center, moments| {
        statistic.decide(center, moments)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_by_two_span_zero() -> Result<(), LocalOpError> {
        let src = Image::<u8, 2>::new([2, 2], vec![10, 20, 30, 40])?;
        let mut dst = Image::<bool, 2>::from_shape_val([2, 2], true)?;
        let shape = Shape::rectangle(0, false)?;
        local_threshold(
            &src,
            &mut dst,
            &LocalMean::default().into(),
            &shape,
            BoundaryPolicy::default(),
        )?;
        assert!(dst.as_slice().iter().all(|&v| !v));
        Ok(())
    }

    #[test]
    fn integral_rejects_unsupported_method() -> Result<(), LocalOpError> {
        let src = Image::<u8, 2>::from_shape_val([3, 3], 1)?;
        let mut dst = Image::<bool, 2>::from_shape_val([3, 3], false)?;
        let shape = Shape::rectangle(1, false)?;
        for method in [
            ThresholdMethod::from(LocalMedian::default()),
            LocalBernsen::default().into(),
            LocalContrast.into(),
            LocalHistogram::new("otsu", otsu).into(),
        ] {
            let res =
                local_threshold_integral(&src, &mut dst, &method, &shape, BoundaryPolicy::Clamp);
            assert!(matches!(res, Err(LocalOpError::UnsupportedMethod { .. })));
        }
        Ok(())
    }

    #[test]
    fn invalid_parameters_write_nothing() -> Result<(), LocalOpError> {
        let src = Image::<f32, 2>::from_shape_val([3, 3], 0.5)?;
        let mut dst = Image::<bool, 2>::from_shape_val([3, 3], true)?;
        let shape = Shape::rectangle(1, false)?;
        let method: ThresholdMethod = LocalSauvola::default().with_r(0.0).into();

        let res = local_threshold(&src, &mut dst, &method, &shape, BoundaryPolicy::Clamp);
        assert!(res.as_ref().is_err_and(LocalOpError::is_configuration_error));
        let res = local_threshold_integral(&src, &mut dst, &method, &shape, BoundaryPolicy::Clamp);
        assert!(res.as_ref().is_err_and(LocalOpError::is_configuration_error));

        assert!(dst.as_slice().iter().all(|&v| v));
        Ok(())
    }
}
