use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use lokal_image::{Image, PixelType};

use crate::{
    boundary::BoundaryPolicy,
    engine::{clamp_to_pixel, NeighborhoodEngine},
    error::LocalOpError,
    shape::Shape,
    statistic::DirectStatistic,
};

/// Direction of every position of the 3x3 kernel, row by row with x varying fastest.
///
/// The center entry is never used: the center weight is always 1.
pub const SHADOW_ANGLES: [f64; 9] = [
    3.0 * FRAC_PI_4,
    FRAC_PI_2,
    FRAC_PI_4,
    PI,
    0.0,
    0.0,
    5.0 * FRAC_PI_4,
    3.0 * FRAC_PI_2,
    7.0 * FRAC_PI_4,
];

const CENTER: usize = 4;

/// The 3x3 kernel of the shadow filter for one illumination direction.
///
/// # Examples
///
/// ```
/// use lokal_imgproc::filter::ShadowKernel;
///
/// let kernel = ShadowKernel::new(0.0).unwrap();
/// // light from the east: east neighbor +2, west neighbor -2, center 1
/// assert!((kernel.weights()[5] - 2.0).abs() < 1e-12);
/// assert!((kernel.weights()[3] + 2.0).abs() < 1e-12);
/// assert_eq!(kernel.weights()[4], 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowKernel {
    theta: f64,
    weights: [f64; 9],
    scale: f64,
}

impl ShadowKernel {
    /// Build the kernel for the direction `theta`, in radians.
    ///
    /// # Errors
    ///
    /// Returns [`LocalOpError::InvalidTheta`] if `theta` is not in `[0, 2π]`.
    pub fn new(theta: f64) -> Result<Self, LocalOpError> {
        if !(0.0..=TAU).contains(&theta) {
            return Err(LocalOpError::InvalidTheta(theta));
        }

        let (sin_t, cos_t) = theta.sin_cos();
        let mut weights = SHADOW_ANGLES.map(|phi| {
            let (sin_p, cos_p) = phi.sin_cos();
            2.0 * (cos_p * cos_t + sin_p * sin_t)
        });
        weights[CENTER] = 1.0;

        let sum = weights.iter().sum::<f64>();
        let scale = if sum == 0.0 { 1.0 } else { sum };

        log::trace!("shadow kernel for theta {theta}: {weights:?}, scale {scale}");

        Ok(Self {
            theta,
            weights,
            scale,
        })
    }

    /// The illumination direction.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// The kernel weights, aligned with the 3x3 window offsets.
    pub fn weights(&self) -> &[f64; 9] {
        &self.weights
    }

    /// The normalization divisor.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl DirectStatistic for ShadowKernel {
    type Output = f64;

    fn evaluate(&self, _center: f64, window: &mut [f64]) -> f64 {
        let acc = window
            .iter()
            .zip(self.weights.iter())
            .map(|(s, w)| s * w)
            .sum::<f64>();
        acc / self.scale
    }
}

/// Apply the directional shadow filter with the default mirror boundary.
///
/// # Arguments
///
/// * `src` - The input image of any rank.
/// * `dst` - The output image with the same shape as `src`.
/// * `theta` - The illumination direction in radians, in `[0, 2π]`.
///
/// # Errors
///
/// Returns an error if `theta` is out of range or the shapes differ. `dst` is left
/// untouched on error.
///
/// # Examples
///
/// ```
/// use lokal_image::Image;
/// use lokal_imgproc::filter::shadow;
///
/// let src = Image::<u8, 2>::from_shape_val([4, 3], 90).unwrap();
/// let mut dst = Image::<u8, 2>::from_shape_val([4, 3], 0).unwrap();
///
/// shadow(&src, &mut dst, std::f64::consts::FRAC_PI_2).unwrap();
/// assert!(dst.as_slice().iter().all(|&v| v == 90));
/// ```
pub fn shadow<T, const N: usize>(
    src: &Image<T, N>,
    dst: &mut Image<T, N>,
    theta: f64,
) -> Result<(), LocalOpError>
where
    T: PixelType,
{
    shadow_with_boundary(src, dst, theta, BoundaryPolicy::MirrorSingle)
}

/// Apply the directional shadow filter with an explicit boundary policy.
///
/// Each output sample is the weighted sum of the 3x3 neighborhood divided by the kernel
/// scale, clamped to the range of `T`. Integer outputs are rounded to nearest.
pub fn shadow_with_boundary<T, const N: usize>(
    src: &Image<T, N>,
    dst: &mut Image<T, N>,
    theta: f64,
    boundary: BoundaryPolicy,
) -> Result<(), LocalOpError>
where
    T: PixelType,
{
    let kernel = ShadowKernel::new(theta)?;
    let engine = NeighborhoodEngine::new(Shape::rectangle(1, false)?).with_boundary(boundary);
    engine.apply_direct(src, dst, &kernel, clamp_to_pixel::<T>)
}

/// Apply the directional shadow filter into a newly allocated image.
pub fn shadow_image<T, const N: usize>(
    src: &Image<T, N>,
    theta: f64,
) -> Result<Image<T, N>, LocalOpError>
where
    T: PixelType,
{
    let mut dst = Image::from_shape_val(src.shape(), T::default())?;
    shadow(src, &mut dst, theta)?;
    Ok(dst)
}
