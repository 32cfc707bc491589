use lokal_image::ImageError;
use thiserror::Error;

use crate::parallel::ParallelError;

/// Errors returned by the neighborhood operators.
///
/// Every error is raised before the first output sample is written, so a failed call
/// leaves the destination image untouched.
#[derive(Error, Debug, PartialEq)]
pub enum LocalOpError {
    /// A shape was constructed with a negative span or radius.
    #[error("Invalid shape: span {span} on axis {axis} must be non-negative")]
    InvalidShapeSpan {
        /// The axis of the offending span.
        axis: usize,
        /// The requested span.
        span: isize,
    },

    /// The shape does not contain a single offset.
    #[error("Invalid shape: the neighborhood is empty")]
    EmptyNeighborhood,

    /// The shadow direction lies outside `[0, 2π]`.
    #[error("Invalid theta {0}: the illumination direction must lie in [0, 2π]")]
    InvalidTheta(f64),

    /// A method parameter is outside its valid domain.
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Why the value is rejected.
        reason: &'static str,
    },

    /// The operation cannot honor the requested boundary policy.
    #[error("Unsupported boundary for {operation}: {boundary}")]
    UnsupportedBoundary {
        /// Name of the operation.
        operation: &'static str,
        /// Description of the rejected policy.
        boundary: String,
    },

    /// The operation cannot handle the requested neighborhood shape.
    #[error("Unsupported shape for {operation}: {shape}")]
    UnsupportedShape {
        /// Name of the operation.
        operation: &'static str,
        /// Description of the rejected shape.
        shape: String,
    },

    /// The threshold method has no accelerated form.
    #[error("Unsupported method for {operation}: {method}")]
    UnsupportedMethod {
        /// Name of the operation.
        operation: &'static str,
        /// Name of the rejected method.
        method: String,
    },

    /// No method is registered under the requested name.
    #[error("Unknown threshold method `{0}`")]
    UnknownMethod(String),

    /// Source and destination images have different shapes.
    #[error("Dimension mismatch: source shape {expected:?}, destination shape {actual:?}")]
    DimensionMismatch {
        /// The shape of the source image.
        expected: Vec<usize>,
        /// The shape of the destination image.
        actual: Vec<usize>,
    },

    /// An error raised by the image container.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// An error raised while dispatching work to the thread pool.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}

impl LocalOpError {
    /// Creates a DimensionMismatch error from two image shapes.
    pub fn dimension_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::DimensionMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Returns true if the error stems from an invalid operator configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidShapeSpan { .. }
                | Self::EmptyNeighborhood
                | Self::InvalidTheta(_)
                | Self::InvalidParameter { .. }
                | Self::UnsupportedBoundary { .. }
                | Self::UnsupportedShape { .. }
                | Self::UnsupportedMethod { .. }
                | Self::UnknownMethod(_)
        )
    }
}

/// Check that `src` and `dst` have the same shape.
pub(crate) fn ensure_same_shape<const N: usize>(
    src: [usize; N],
    dst: [usize; N],
) -> Result<(), LocalOpError> {
    if src != dst {
        return Err(LocalOpError::dimension_mismatch(&src, &dst));
    }
    Ok(())
}
