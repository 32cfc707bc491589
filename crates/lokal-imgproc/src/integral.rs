use lokal_image::PixelType;

use crate::{plane::PlaneView, shape::RectangleShape, statistic::WindowMoments};

/// Prefix-sum and prefix-sum-of-squares tables over one plane.
///
/// Both tables are one element larger than the plane on each axis: entry `(x, y)` holds the
/// sum over the samples `[0, x) x [0, y)`. The samples are shifted by the first sample of the
/// plane before summing, so the tables grow with the dynamic range of the plane rather than
/// its absolute level. The tables are only valid for the plane that produced them.
#[derive(Debug, Clone)]
pub struct IntegralTables {
    width: usize,
    height: usize,
    shift: f64,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

/// A contiguous run of indices on one axis and the number of times each index is counted.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    start: usize,
    end: usize,
    weight: f64,
}

/// Split the window `[center - radius, center + radius]` on an axis of length `len` into the
/// in-range run plus the edge indices that the clamp boundary repeats.
fn clamp_segments(center: usize, radius: usize, len: usize) -> [Segment; 3] {
    let lo = center as isize - radius as isize;
    let hi = (center + radius) as isize;
    let last = len as isize - 1;

    let start = lo.max(0) as usize;
    let end = hi.min(last) as usize + 1;
    let extra_lo = (-lo).max(0) as f64;
    let extra_hi = (hi - last).max(0) as f64;

    [
        Segment {
            start,
            end,
            weight: 1.0,
        },
        Segment {
            start: 0,
            end: 1,
            weight: extra_lo,
        },
        Segment {
            start: len - 1,
            end: len,
            weight: extra_hi,
        },
    ]
}

impl IntegralTables {
    /// Build the tables in one forward pass over the plane.
    pub fn new<T: PixelType>(plane: &PlaneView<T>) -> Self {
        let (width, height) = (plane.width(), plane.height());
        let stride = width + 1;
        let mut sum = vec![0.0; stride * (height + 1)];
        let mut sum_sq = vec![0.0; stride * (height + 1)];
        let shift = plane.as_slice().first().map_or(0.0, |v| v.to_f64());

        for (y, row) in plane.as_slice().chunks_exact(width.max(1)).enumerate() {
            let mut row_sum = 0.0;
            let mut row_sum_sq = 0.0;
            for (x, sample) in row.iter().enumerate() {
                let v = sample.to_f64() - shift;
                row_sum += v;
                row_sum_sq += v * v;
                let above = y * stride + x + 1;
                let here = (y + 1) * stride + x + 1;
                sum[here] = sum[above] + row_sum;
                sum_sq[here] = sum_sq[above] + row_sum_sq;
            }
        }

        log::trace!("built integral tables for a {width}x{height} plane");

        Self {
            width,
            height,
            shift,
            sum,
            sum_sq,
        }
    }

    /// Extent of axis 0 of the source plane.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Extent of axis 1 of the source plane.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The value subtracted from every sample before summing.
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Shifted sum and sum of squares over the half-open rectangle `[x0, x1) x [y0, y1)`.
    ///
    /// # Panics
    ///
    /// Panics if the rectangle exceeds the plane.
    #[inline]
    pub fn rect_sums(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> (f64, f64) {
        let stride = self.width + 1;
        let corners = |table: &[f64]| {
            table[y1 * stride + x1] - table[y0 * stride + x1] - table[y1 * stride + x0]
                + table[y0 * stride + x0]
        };
        (corners(&self.sum), corners(&self.sum_sq))
    }

    /// The moments of a rectangular window centered at `(x, y)`.
    ///
    /// Out-of-range positions follow the clamp boundary: the window is clipped to the plane
    /// and every edge row, column and corner is added again once per position it stands in
    /// for. The result equals a direct scan with [`crate::boundary::BoundaryPolicy::Clamp`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lokal_image::ImageSize;
    /// use lokal_imgproc::{integral::IntegralTables, plane::PlaneView, shape::RectangleShape};
    ///
    /// let data = vec![1u8, 2, 3, 4];
    /// let plane = PlaneView::new(&data, ImageSize { width: 2, height: 2 }).unwrap();
    /// let tables = IntegralTables::new(&plane);
    ///
    /// let rect = RectangleShape { span: [1, 1], skip_center: false };
    /// let moments = tables.window_moments(0, 0, &rect);
    /// // rows 0, 0, 1 and columns 0, 0, 1
    /// assert_eq!(moments.count, 9.0);
    /// assert_eq!(moments.mean(), (4.0 * 1.0 + 2.0 * 2.0 + 2.0 * 3.0 + 4.0) / 9.0);
    /// ```
    pub fn window_moments(&self, x: usize, y: usize, rect: &RectangleShape) -> WindowMoments {
        let cols = clamp_segments(x, rect.span[0], self.width);
        let rows = clamp_segments(y, rect.span[1], self.height);

        let mut moments = WindowMoments {
            shift: self.shift,
            ..WindowMoments::default()
        };
        for row in rows.iter().filter(|s| s.weight > 0.0) {
            for col in cols.iter().filter(|s| s.weight > 0.0) {
                let weight = row.weight * col.weight;
                let (sum, sum_sq) = self.rect_sums(col.start, row.start, col.end, row.end);
                moments.sum += weight * sum;
                moments.sum_sq += weight * sum_sq;
            }
        }
        moments.count = ((2 * rect.span[0] + 1) * (2 * rect.span[1] + 1)) as f64;

        if rect.skip_center {
            let (center, center_sq) = self.rect_sums(x, y, x + 1, y + 1);
            moments.count -= 1.0;
            moments.sum -= center;
            moments.sum_sq -= center_sq;
        }

        moments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        boundary::BoundaryPolicy,
        error::LocalOpError,
        neighborhood::NeighborhoodWindow,
        shape::Shape,
    };
    use approx::assert_relative_eq;
    use lokal_image::ImageSize;

    #[test]
    fn table_layout() -> Result<(), LocalOpError> {
        let data = vec![1u8, 2, 3, 4, 5, 6];
        let plane = PlaneView::new(&data, ImageSize { width: 3, height: 2 })?;
        let tables = IntegralTables::new(&plane);
        // samples are shifted by the first one: 0, 1, 2, 3, 4, 5
        assert_eq!(tables.shift(), 1.0);
        assert_eq!(tables.rect_sums(0, 0, 3, 2), (15.0, 55.0));
        assert_eq!(tables.rect_sums(1, 1, 3, 2), (9.0, 41.0));
        assert_eq!(tables.rect_sums(2, 0, 3, 1), (2.0, 4.0));
        assert_eq!(tables.rect_sums(1, 1, 1, 2), (0.0, 0.0));
        Ok(())
    }

    #[test]
    fn clamp_segments_inside() {
        let segments = clamp_segments(3, 1, 10);
        assert_eq!((segments[0].start, segments[0].end), (2, 5));
        assert_eq!(segments[1].weight, 0.0);
        assert_eq!(segments[2].weight, 0.0);
    }

    #[test]
    fn clamp_segments_both_edges() {
        let segments = clamp_segments(1, 4, 3);
        assert_eq!((segments[0].start, segments[0].end), (0, 3));
        assert_eq!(segments[1].weight, 3.0);
        assert_eq!(segments[2].weight, 3.0);
    }

    #[test]
    fn matches_direct_clamp_scan() -> Result<(), LocalOpError> {
        let (width, height) = (7, 5);
        let data = (0..width * height)
            .map(|i| ((i * 37 + 11) % 251) as u8)
            .collect::<Vec<_>>();
        let plane = PlaneView::new(&data, ImageSize { width, height })?;
        let tables = IntegralTables::new(&plane);

        for (span, skip_center) in [([1, 1], false), ([2, 3], false), ([4, 1], true), ([6, 6], false)] {
            let shape = Shape::rectangle_with_spans([span[0], span[1]], skip_center)?;
            let Shape::Rectangle(rect) = shape else {
                unreachable!("rectangle constructor returns a rectangle")
            };
            let window = NeighborhoodWindow::new(plane, &shape, BoundaryPolicy::Clamp);
            for y in 0..height {
                for x in 0..width {
                    let direct = WindowMoments::from_samples(&window.samples(x, y));
                    let fast = tables.window_moments(x, y, &rect);
                    assert_eq!(direct.count, fast.count);
                    assert_relative_eq!(direct.mean(), fast.mean(), max_relative = 1e-12);
                    assert_relative_eq!(
                        direct.variance(),
                        fast.variance(),
                        max_relative = 1e-9,
                        epsilon = 1e-9
                    );
                }
            }
        }
        Ok(())
    }

    #[test]
    fn large_offset_variance() -> Result<(), LocalOpError> {
        let (width, height) = (16, 16);
        let data = (0..width * height)
            .map(|i| 4_000_000_000u32 + ((i * 389 + 17) % 1000) as u32)
            .collect::<Vec<_>>();
        let plane = PlaneView::new(&data, ImageSize { width, height })?;
        let tables = IntegralTables::new(&plane);

        let shape = Shape::rectangle(2, false)?;
        let Shape::Rectangle(rect) = shape else {
            unreachable!("rectangle constructor returns a rectangle")
        };
        let window = NeighborhoodWindow::new(plane, &shape, BoundaryPolicy::Clamp);
        for y in 0..height {
            for x in 0..width {
                let samples = window.samples(x, y);
                let n = samples.len() as f64;
                let mean = samples.iter().map(|v| v - 4.0e9).sum::<f64>() / n;
                let variance = samples
                    .iter()
                    .map(|v| (v - 4.0e9 - mean).powi(2))
                    .sum::<f64>()
                    / n;
                let fast = tables.window_moments(x, y, &rect);
                assert_relative_eq!(fast.mean(), 4.0e9 + mean, max_relative = 1e-15);
                assert_relative_eq!(fast.variance(), variance, max_relative = 1e-9);
            }
        }
        Ok(())
    }
}
