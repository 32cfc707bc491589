/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// The image has rank 0.
    #[error("Image rank must be at least 1")]
    InvalidRank,

    /// The data length does not match the product of the shape.
    #[error("Data length ({actual}) does not match the image shape {shape:?} ({expected} samples)")]
    InvalidShape {
        /// The requested shape.
        shape: Vec<usize>,
        /// Number of samples implied by the shape.
        expected: usize,
        /// Number of samples provided.
        actual: usize,
    },

    /// A coordinate component exceeds the extent of its axis.
    #[error("Index {index} out of bounds for axis {axis} of extent {extent}")]
    IndexOutOfBounds {
        /// The offending axis.
        axis: usize,
        /// The requested index.
        index: usize,
        /// The extent of the axis.
        extent: usize,
    },

    /// A plane key does not name a plane of the image.
    #[error("Plane key {key:?} does not fit the pinned axes {extents:?}")]
    InvalidPlaneKey {
        /// The requested key.
        key: Vec<usize>,
        /// Extents of the axes beyond the first two.
        extents: Vec<usize>,
    },

    /// A plane index exceeds the number of planes.
    #[error("Plane index {0} out of bounds, the image has {1} planes")]
    PlaneIndexOutOfBounds(usize, usize),
}
