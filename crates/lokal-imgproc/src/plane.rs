use lokal_image::{Image, ImageError, ImageSize, PixelType};

/// The pinned coordinates of every axis beyond the first two.
///
/// A two-dimensional image has exactly one key, the empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PlaneKey(pub Vec<usize>);

impl PlaneKey {
    /// Linear index of the plane, given the extents of the pinned axes.
    ///
    /// Axis 2 varies fastest, matching the memory order of [`Image`].
    pub fn index(&self, extents: &[usize]) -> usize {
        let mut index = 0;
        let mut stride = 1;
        for (value, extent) in self.0.iter().zip(extents) {
            index += value * stride;
            stride *= extent;
        }
        index
    }
}

/// Enumerates the planes of an N-dimensional image.
///
/// The iterator is lazy and finite. Cloning it, or calling [`PlaneIterator::reset`], restarts
/// the enumeration.
///
/// # Examples
///
/// ```
/// use lokal_imgproc::plane::{PlaneIterator, PlaneKey};
///
/// let keys: Vec<PlaneKey> = PlaneIterator::new(&[4, 4, 2, 3]).collect();
/// assert_eq!(keys.len(), 6);
/// assert_eq!(keys[0], PlaneKey(vec![0, 0]));
/// assert_eq!(keys[1], PlaneKey(vec![1, 0]));
/// assert_eq!(keys[5], PlaneKey(vec![1, 2]));
///
/// assert_eq!(PlaneIterator::new(&[4, 4]).count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PlaneIterator {
    extents: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl PlaneIterator {
    /// Create an iterator over the planes of an image with the given shape.
    pub fn new(shape: &[usize]) -> Self {
        let extents = shape.iter().skip(2).copied().collect::<Vec<_>>();
        let mut iter = Self {
            extents,
            next: None,
        };
        iter.reset();
        iter
    }

    /// Restart the enumeration from the first plane.
    pub fn reset(&mut self) {
        self.next = if self.extents.iter().any(|&extent| extent == 0) {
            None
        } else {
            Some(vec![0; self.extents.len()])
        };
    }

    /// The extents of the pinned axes.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Total number of planes.
    pub fn num_planes(&self) -> usize {
        self.extents.iter().product()
    }

    /// The key of the plane at linear index `index`.
    pub fn key_at(&self, index: usize) -> PlaneKey {
        let mut rem = index;
        PlaneKey(
            self.extents
                .iter()
                .map(|&extent| {
                    let value = rem % extent;
                    rem /= extent;
                    value
                })
                .collect(),
        )
    }
}

impl Iterator for PlaneIterator {
    type Item = PlaneKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        let mut following = current.clone();
        let mut carry = true;
        for (value, &extent) in following.iter_mut().zip(&self.extents) {
            *value += 1;
            if *value < extent {
                carry = false;
                break;
            }
            *value = 0;
        }
        if !carry {
            self.next = Some(following);
        }

        Some(PlaneKey(current))
    }
}

/// A read-only view of one plane of an image.
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a, T> {
    data: &'a [T],
    size: ImageSize,
}

impl<'a, T: PixelType> PlaneView<'a, T> {
    /// Wrap a contiguous block of `size.width * size.height` samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the length of `data` does not match the size.
    pub fn new(data: &'a [T], size: ImageSize) -> Result<Self, ImageError> {
        if data.len() != size.num_pixels() {
            return Err(ImageError::InvalidShape {
                shape: vec![size.width, size.height],
                expected: size.num_pixels(),
                actual: data.len(),
            });
        }
        Ok(Self { data, size })
    }

    /// The view of the plane pinned by `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` does not name a plane of `image`.
    pub fn from_image<const N: usize>(
        image: &'a Image<T, N>,
        key: &PlaneKey,
    ) -> Result<Self, ImageError> {
        let extents = image.shape().iter().skip(2).copied().collect::<Vec<_>>();
        if key.0.len() != extents.len() || key.0.iter().zip(&extents).any(|(v, e)| v >= e) {
            return Err(ImageError::InvalidPlaneKey {
                key: key.0.clone(),
                extents,
            });
        }
        let data = image.plane(key.index(&extents))?;
        Self::new(data, image.plane_size())
    }

    /// The views of every plane of `image`, in [`PlaneIterator`] order.
    ///
    /// # Errors
    ///
    /// Returns an error if a plane cannot be viewed.
    pub fn planes<const N: usize>(
        image: &'a Image<T, N>,
    ) -> Result<Vec<(PlaneKey, Self)>, ImageError> {
        PlaneIterator::new(&image.shape())
            .map(|key| {
                let view = Self::from_image(image, &key)?;
                Ok((key, view))
            })
            .collect()
    }

    /// The size of the plane.
    #[inline]
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Extent of axis 0.
    #[inline]
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Extent of axis 1.
    #[inline]
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// The samples of the plane.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// The sample at an in-range position as a real value.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.size.width + x].to_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lokal_image::ImageError;

    #[test]
    fn two_dimensional_has_one_plane() {
        let mut iter = PlaneIterator::new(&[5, 3]);
        assert_eq!(iter.next(), Some(PlaneKey(vec![])));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn one_dimensional_has_one_plane() {
        assert_eq!(PlaneIterator::new(&[5]).count(), 1);
    }

    #[test]
    fn empty_axis_has_no_planes() {
        assert_eq!(PlaneIterator::new(&[5, 3, 0]).count(), 0);
    }

    #[test]
    fn restartable() {
        let mut iter = PlaneIterator::new(&[2, 2, 3]);
        let first = iter.clone().collect::<Vec<_>>();
        assert_eq!(first.len(), 3);
        iter.by_ref().for_each(drop);
        assert_eq!(iter.next(), None);
        iter.reset();
        assert_eq!(iter.collect::<Vec<_>>(), first);
    }

    #[test]
    fn key_index_round_trip() {
        let iter = PlaneIterator::new(&[1, 1, 2, 3, 4]);
        for (index, key) in iter.clone().enumerate() {
            assert_eq!(key.index(iter.extents()), index);
            assert_eq!(iter.key_at(index), key);
        }
    }

    #[test]
    fn plane_view() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new([2, 2, 2], (0..8).collect())?;
        let view = PlaneView::from_image(&image, &PlaneKey(vec![1]))?;
        assert_eq!(view.as_slice(), &[4, 5, 6, 7]);
        assert_eq!(view.get(1, 1), 7.0);
        assert!(matches!(
            PlaneView::from_image(&image, &PlaneKey(vec![2])),
            Err(ImageError::InvalidPlaneKey { .. })
        ));
        assert!(matches!(
            PlaneView::from_image(&image, &PlaneKey(vec![])),
            Err(ImageError::InvalidPlaneKey { .. })
        ));
        Ok(())
    }

    #[test]
    fn plane_view_length_mismatch() {
        let data = [0u8; 5];
        let res = PlaneView::new(&data, ImageSize { width: 3, height: 2 });
        assert_eq!(
            res.err(),
            Some(ImageError::InvalidShape {
                shape: vec![3, 2],
                expected: 6,
                actual: 5,
            })
        );
    }

    #[test]
    fn planes_follow_iterator_order() -> Result<(), ImageError> {
        let image = Image::<u8, 4>::new([1, 2, 2, 2], (0..8).collect())?;
        let planes = PlaneView::planes(&image)?;
        let keys = planes.iter().map(|(key, _)| key.clone()).collect::<Vec<_>>();
        assert_eq!(keys, PlaneIterator::new(&image.shape()).collect::<Vec<_>>());
        assert_eq!(planes[1].1.as_slice(), &[2, 3]);
        assert_eq!(planes[2].1.as_slice(), &[4, 5]);
        Ok(())
    }
}
