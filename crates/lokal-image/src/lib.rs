#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// N-dimensional image representation.
pub mod image;

/// Error types for the image module.
pub mod error;

/// Bounded numeric pixel types.
pub mod pixel;

pub use crate::error::ImageError;
pub use crate::image::{get_strides_from_shape, Image, ImageSize};
pub use crate::pixel::PixelType;

/// A binary image, the output of every local threshold operator.
pub type BinaryImage<const N: usize> = Image<bool, N>;
