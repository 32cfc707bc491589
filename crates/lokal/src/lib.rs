#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use lokal_image as image;

#[doc(inline)]
pub use lokal_imgproc as imgproc;
