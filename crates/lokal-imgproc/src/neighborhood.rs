use lokal_image::PixelType;

use crate::{boundary::BoundaryPolicy, plane::PlaneView, shape::Shape};

/// A sliding neighborhood over one plane.
///
/// The window gathers the samples at `center + offset` for every offset of the shape, in the
/// order of [`Shape::offsets`]. Kernels that weight samples by position rely on this order.
#[derive(Debug, Clone)]
pub struct NeighborhoodWindow<'a, T> {
    plane: PlaneView<'a, T>,
    offsets: Vec<[isize; 2]>,
    radius: [usize; 2],
    boundary: BoundaryPolicy,
}

impl<'a, T: PixelType> NeighborhoodWindow<'a, T> {
    /// Create a window of `shape` over `plane`, extended by `boundary`.
    pub fn new(plane: PlaneView<'a, T>, shape: &Shape, boundary: BoundaryPolicy) -> Self {
        Self {
            plane,
            offsets: shape.offsets(),
            radius: shape.radius(),
            boundary,
        }
    }

    /// Number of samples in the window.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the window has no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The plane the window slides over.
    #[inline]
    pub fn plane(&self) -> &PlaneView<'a, T> {
        &self.plane
    }

    /// Whether the whole window around `(x, y)` lies inside the plane.
    #[inline]
    fn is_interior(&self, x: usize, y: usize) -> bool {
        x >= self.radius[0]
            && y >= self.radius[1]
            && x + self.radius[0] < self.plane.width()
            && y + self.radius[1] < self.plane.height()
    }

    /// Write the samples around `(x, y)` into `buf`, replacing its content.
    ///
    /// # Arguments
    ///
    /// * `x` - The column of the center, inside the plane.
    /// * `y` - The row of the center, inside the plane.
    /// * `buf` - The output buffer, resized to the window length.
    pub fn samples_at(&self, x: usize, y: usize, buf: &mut Vec<f64>) {
        buf.clear();
        let (cx, cy) = (x as isize, y as isize);

        if self.is_interior(x, y) {
            buf.extend(self.offsets.iter().map(|&[dx, dy]| {
                self.plane
                    .get((cx + dx) as usize, (cy + dy) as usize)
            }));
            return;
        }

        let (width, height) = (self.plane.width(), self.plane.height());
        buf.extend(self.offsets.iter().map(|&[dx, dy]| {
            self.boundary
                .sample(cx + dx, cy + dy, width, height, |sx, sy| self.plane.get(sx, sy))
        }));
    }

    /// The samples around `(x, y)` as a new vector.
    pub fn samples(&self, x: usize, y: usize) -> Vec<f64> {
        let mut buf = Vec::with_capacity(self.len());
        self.samples_at(x, y, &mut buf);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocalOpError;
    use lokal_image::ImageSize;

    fn plane_3x3() -> Vec<u8> {
        vec![1, 2, 3, 4, 5, 6, 7, 8, 9]
    }

    #[test]
    fn interior_window() -> Result<(), LocalOpError> {
        let data = plane_3x3();
        let plane = PlaneView::new(&data, ImageSize { width: 3, height: 3 })?;
        let shape = Shape::rectangle(1, false)?;
        let window = NeighborhoodWindow::new(plane, &shape, BoundaryPolicy::MirrorSingle);
        assert_eq!(
            window.samples(1, 1),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
        Ok(())
    }

    #[test]
    fn corner_mirror_single() -> Result<(), LocalOpError> {
        let data = plane_3x3();
        let plane = PlaneView::new(&data, ImageSize { width: 3, height: 3 })?;
        let shape = Shape::rectangle(1, false)?;
        let window = NeighborhoodWindow::new(plane, &shape, BoundaryPolicy::MirrorSingle);
        assert_eq!(
            window.samples(0, 0),
            vec![5.0, 4.0, 5.0, 2.0, 1.0, 2.0, 5.0, 4.0, 5.0]
        );
        Ok(())
    }

    #[test]
    fn corner_constant() -> Result<(), LocalOpError> {
        let data = plane_3x3();
        let plane = PlaneView::new(&data, ImageSize { width: 3, height: 3 })?;
        let shape = Shape::rectangle(1, false)?;
        let window = NeighborhoodWindow::new(plane, &shape, BoundaryPolicy::Constant(0.0));
        assert_eq!(
            window.samples(2, 2),
            vec![5.0, 6.0, 0.0, 8.0, 9.0, 0.0, 0.0, 0.0, 0.0]
        );
        Ok(())
    }

    #[test]
    fn edge_clamp_diamond() -> Result<(), LocalOpError> {
        let data = plane_3x3();
        let plane = PlaneView::new(&data, ImageSize { width: 3, height: 3 })?;
        let shape = Shape::diamond(1)?;
        let window = NeighborhoodWindow::new(plane, &shape, BoundaryPolicy::Clamp);
        assert_eq!(window.samples(1, 0), vec![2.0, 1.0, 2.0, 3.0, 5.0]);
        Ok(())
    }

    #[test]
    fn buffer_is_reused() -> Result<(), LocalOpError> {
        let data = plane_3x3();
        let plane = PlaneView::new(&data, ImageSize { width: 3, height: 3 })?;
        let shape = Shape::rectangle(0, false)?;
        let window = NeighborhoodWindow::new(plane, &shape, BoundaryPolicy::Periodic);
        let mut buf = vec![42.0; 16];
        window.samples_at(2, 1, &mut buf);
        assert_eq!(buf, vec![6.0]);
        Ok(())
    }
}
