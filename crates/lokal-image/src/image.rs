use crate::{error::ImageError, pixel::PixelType};

/// Size of a single 2-D plane in pixels.
///
/// # Examples
///
/// ```
/// use lokal_image::ImageSize;
///
/// let size = ImageSize {
///     width: 10,
///     height: 20,
/// };
///
/// assert_eq!(size.width, 10);
/// assert_eq!(size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the plane in pixels (extent of axis 0).
    pub width: usize,
    /// Height of the plane in pixels (extent of axis 1).
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

impl ImageSize {
    /// Number of pixels in the plane.
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }
}

/// Computes the strides of an image whose first axis varies fastest.
///
/// With this layout every 2-D plane (axes 0 and 1) is a contiguous block of memory.
///
/// # Examples
///
/// ```
/// use lokal_image::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([4, 3]), [1, 4]);
/// assert_eq!(get_strides_from_shape([4, 3, 2]), [1, 4, 12]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in 0..shape.len() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// An N-dimensional image with owned sample data.
///
/// Coordinates are `[x, y, z, ...]`: axis 0 is the column, axis 1 the row and every
/// further axis selects a plane (slice, channel, time point, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const N: usize> {
    data: Vec<T>,
    shape: [usize; N],
    strides: [usize; N],
}

impl<T, const N: usize> Image<T, N> {
    /// Create a new image from sample data laid out with axis 0 varying fastest.
    ///
    /// # Arguments
    ///
    /// * `shape` - The extent of every axis.
    /// * `data` - The sample data of the image.
    ///
    /// # Errors
    ///
    /// Returns an error if `N` is 0 or if the length of the data does not match the shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use lokal_image::Image;
    ///
    /// let image = Image::<u8, 3>::new([4, 3, 2], vec![0u8; 24]).unwrap();
    ///
    /// assert_eq!(image.width(), 4);
    /// assert_eq!(image.height(), 3);
    /// assert_eq!(image.num_planes(), 2);
    /// ```
    pub fn new(shape: [usize; N], data: Vec<T>) -> Result<Self, ImageError> {
        if N == 0 {
            return Err(ImageError::InvalidRank);
        }

        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(ImageError::InvalidShape {
                shape: shape.to_vec(),
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Create a new image with every sample set to `val`.
    pub fn from_shape_val(shape: [usize; N], val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; shape.iter().product::<usize>()];
        Self::new(shape, data)
    }

    /// Create a new image by evaluating `f` at every coordinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use lokal_image::Image;
    ///
    /// let image = Image::<u32, 2>::from_shape_fn([3, 2], |[x, y]| (x + 10 * y) as u32).unwrap();
    /// assert_eq!(image.get([2, 1]), Some(&12));
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], mut f: F) -> Result<Self, ImageError>
    where
        F: FnMut([usize; N]) -> T,
    {
        let num_elements = shape.iter().product::<usize>();
        let strides = get_strides_from_shape(shape);
        let data = (0..num_elements)
            .map(|offset| {
                let mut coord = [0usize; N];
                for axis in 0..N {
                    coord[axis] = (offset / strides[axis]) % shape[axis];
                }
                f(coord)
            })
            .collect();
        Self::new(shape, data)
    }

    /// The extent of every axis.
    #[inline]
    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    /// The memory strides of every axis.
    #[inline]
    pub fn strides(&self) -> [usize; N] {
        self.strides
    }

    /// The number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        N
    }

    /// Extent of axis 0.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape[0]
    }

    /// Extent of axis 1, or 1 for one-dimensional images.
    #[inline]
    pub fn height(&self) -> usize {
        if N > 1 {
            self.shape[1]
        } else {
            1
        }
    }

    /// Size of a single plane.
    pub fn plane_size(&self) -> ImageSize {
        ImageSize {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Number of samples in a single plane.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.width() * self.height()
    }

    /// Number of planes, the product of the extents of every axis beyond the first two.
    pub fn num_planes(&self) -> usize {
        self.shape.iter().skip(2).product()
    }

    /// Total number of samples.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// The sample data as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The sample data as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its sample data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Linear offset of a coordinate, if it lies inside the image.
    #[inline]
    pub fn offset(&self, coord: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for axis in 0..N {
            if coord[axis] >= self.shape[axis] {
                return None;
            }
            offset += coord[axis] * self.strides[axis];
        }
        Some(offset)
    }

    /// Get a reference to the sample at `coord`.
    #[inline]
    pub fn get(&self, coord: [usize; N]) -> Option<&T> {
        self.offset(coord).map(|offset| &self.data[offset])
    }

    /// Get a mutable reference to the sample at `coord`.
    #[inline]
    pub fn get_mut(&mut self, coord: [usize; N]) -> Option<&mut T> {
        self.offset(coord).map(move |offset| &mut self.data[offset])
    }

    /// Write the sample at `coord`.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinate lies outside the image.
    pub fn set(&mut self, coord: [usize; N], val: T) -> Result<(), ImageError> {
        for axis in 0..N {
            if coord[axis] >= self.shape[axis] {
                return Err(ImageError::IndexOutOfBounds {
                    axis,
                    index: coord[axis],
                    extent: self.shape[axis],
                });
            }
        }
        if let Some(sample) = self.get_mut(coord) {
            *sample = val;
        }
        Ok(())
    }

    /// The samples of the plane at linear plane index `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index >= num_planes()`.
    pub fn plane(&self, index: usize) -> Result<&[T], ImageError> {
        let num_planes = self.num_planes();
        if index >= num_planes {
            return Err(ImageError::PlaneIndexOutOfBounds(index, num_planes));
        }
        let len = self.plane_len();
        Ok(&self.data[index * len..(index + 1) * len])
    }

    /// Apply `f` to every sample, producing a new image of the same shape.
    pub fn map<U, F>(&self, f: F) -> Image<U, N>
    where
        F: Fn(&T) -> U,
    {
        Image {
            data: self.data.iter().map(f).collect(),
            shape: self.shape,
            strides: self.strides,
        }
    }
}

impl<T: PixelType, const N: usize> Image<T, N> {
    /// Cast the samples to another pixel type, clamping to the range of `U`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lokal_image::Image;
    ///
    /// let image = Image::<i16, 1>::new([3], vec![-5, 100, 400]).unwrap();
    /// let image_u8: Image<u8, 1> = image.cast();
    /// assert_eq!(image_u8.as_slice(), &[0, 100, 255]);
    /// ```
    pub fn cast<U: PixelType>(&self) -> Image<U, N> {
        self.map(|&x| U::from_f64(x.to_f64()))
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(image_size.num_pixels(), 200);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8, 2>::new([10, 20], vec![0u8; 10 * 20])?;
        assert_eq!(image.width(), 10);
        assert_eq!(image.height(), 20);
        assert_eq!(image.num_planes(), 1);
        assert_eq!(image.plane_len(), 200);

        Ok(())
    }

    #[test]
    fn image_invalid_shape() {
        let res = Image::<u8, 2>::new([3, 3], vec![0u8; 8]);
        assert_eq!(
            res,
            Err(ImageError::InvalidShape {
                shape: vec![3, 3],
                expected: 9,
                actual: 8,
            })
        );
    }

    #[test]
    fn image_rank_zero() {
        let res = Image::<u8, 0>::new([], vec![0u8]);
        assert_eq!(res, Err(ImageError::InvalidRank));
    }

    #[test]
    fn image_layout_first_axis_fastest() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new([2, 2, 2], (0..8).collect())?;
        assert_eq!(image.strides(), [1, 2, 4]);
        assert_eq!(image.get([1, 0, 0]), Some(&1));
        assert_eq!(image.get([0, 1, 0]), Some(&2));
        assert_eq!(image.get([1, 1, 1]), Some(&7));
        assert_eq!(image.get([2, 0, 0]), None);
        assert_eq!(image.plane(1)?, &[4, 5, 6, 7]);

        Ok(())
    }

    #[test]
    fn image_from_shape_fn() -> Result<(), ImageError> {
        let image = Image::<usize, 3>::from_shape_fn([3, 2, 2], |[x, y, z]| x + 10 * y + 100 * z)?;
        assert_eq!(image.get([2, 1, 1]), Some(&112));
        assert_eq!(image.as_slice()[0..3], [0, 1, 2]);

        Ok(())
    }

    #[test]
    fn image_set() -> Result<(), ImageError> {
        let mut image = Image::<f32, 2>::from_shape_val([2, 2], 0.0)?;
        image.set([1, 0], 3.5)?;
        assert_eq!(image.as_slice(), &[0.0, 3.5, 0.0, 0.0]);
        assert_eq!(
            image.set([0, 2], 1.0),
            Err(ImageError::IndexOutOfBounds {
                axis: 1,
                index: 2,
                extent: 2,
            })
        );

        Ok(())
    }

    #[test]
    fn image_one_dimensional() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([5], vec![1, 2, 3, 4, 5])?;
        assert_eq!(image.height(), 1);
        assert_eq!(image.plane_len(), 5);
        assert_eq!(image.num_planes(), 1);

        Ok(())
    }

    #[test]
    fn image_cast() -> Result<(), ImageError> {
        let image = Image::<f32, 2>::new([2, 1], vec![-1.0, 254.6])?;
        let image_u8: Image<u8, 2> = image.cast();
        assert_eq!(image_u8.as_slice(), &[0, 255]);

        Ok(())
    }
}
