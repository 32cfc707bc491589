use crate::error::LocalOpError;

/// A rectangular neighborhood with a radius per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectangleShape {
    /// Radius along axis 0 and axis 1; the window is `2 * span + 1` wide on each axis.
    pub span: [usize; 2],
    /// Whether the center pixel is excluded from the window.
    pub skip_center: bool,
}

/// A diamond neighborhood: every offset with `|dx| + |dy| <= radius`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiamondShape {
    /// Manhattan radius of the diamond.
    pub radius: usize,
}

/// The geometry of a neighborhood within a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Axis-aligned rectangle, optionally without its center.
    Rectangle(RectangleShape),
    /// Diamond with a Manhattan cutoff.
    Diamond(DiamondShape),
}

fn check_span(axis: usize, span: isize) -> Result<usize, LocalOpError> {
    if span < 0 {
        return Err(LocalOpError::InvalidShapeSpan { axis, span });
    }
    Ok(span as usize)
}

impl Shape {
    /// Create a square rectangle shape with the same span on both axes.
    ///
    /// # Arguments
    ///
    /// * `span` - The radius of the window; a span of 1 gives a 3x3 window.
    /// * `skip_center` - Whether the center pixel is excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is negative, or if the window would be empty
    /// (span 0 without its center).
    ///
    /// # Examples
    ///
    /// ```
    /// use lokal_imgproc::Shape;
    ///
    /// let shape = Shape::rectangle(1, false).unwrap();
    /// assert_eq!(shape.len(), 9);
    ///
    /// assert!(Shape::rectangle(-1, false).is_err());
    /// ```
    pub fn rectangle(span: isize, skip_center: bool) -> Result<Self, LocalOpError> {
        Self::rectangle_with_spans([span, span], skip_center)
    }

    /// Create a rectangle shape with an individual span per axis.
    pub fn rectangle_with_spans(
        span: [isize; 2],
        skip_center: bool,
    ) -> Result<Self, LocalOpError> {
        let span = [check_span(0, span[0])?, check_span(1, span[1])?];
        if skip_center && span == [0, 0] {
            return Err(LocalOpError::EmptyNeighborhood);
        }
        Ok(Shape::Rectangle(RectangleShape { span, skip_center }))
    }

    /// Create a diamond shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is negative.
    pub fn diamond(radius: isize) -> Result<Self, LocalOpError> {
        let radius = check_span(0, radius)?;
        Ok(Shape::Diamond(DiamondShape { radius }))
    }

    /// The half extent of the bounding box on axis 0 and axis 1.
    pub fn radius(&self) -> [usize; 2] {
        match self {
            Shape::Rectangle(rect) => rect.span,
            Shape::Diamond(diamond) => [diamond.radius, diamond.radius],
        }
    }

    /// Whether the relative offset `(dx, dy)` belongs to the neighborhood.
    pub fn contains(&self, dx: isize, dy: isize) -> bool {
        match self {
            Shape::Rectangle(rect) => {
                let inside = dx.unsigned_abs() <= rect.span[0] && dy.unsigned_abs() <= rect.span[1];
                inside && !(rect.skip_center && dx == 0 && dy == 0)
            }
            Shape::Diamond(diamond) => dx.unsigned_abs() + dy.unsigned_abs() <= diamond.radius,
        }
    }

    /// The relative offsets `[dx, dy]` of the neighborhood.
    ///
    /// Offsets are ordered row-major over the bounding box with `dx` varying fastest.
    ///
    /// # Examples
    ///
    /// ```
    /// use lokal_imgproc::Shape;
    ///
    /// let shape = Shape::diamond(1).unwrap();
    /// assert_eq!(
    ///     shape.offsets(),
    ///     vec![[0, -1], [-1, 0], [0, 0], [1, 0], [0, 1]]
    /// );
    /// ```
    pub fn offsets(&self) -> Vec<[isize; 2]> {
        let [rx, ry] = self.radius();
        let (rx, ry) = (rx as isize, ry as isize);
        let mut offsets = Vec::with_capacity(((2 * rx + 1) * (2 * ry + 1)) as usize);
        for dy in -ry..=ry {
            for dx in -rx..=rx {
                if self.contains(dx, dy) {
                    offsets.push([dx, dy]);
                }
            }
        }
        offsets
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        match self {
            Shape::Rectangle(rect) => {
                let full = (2 * rect.span[0] + 1) * (2 * rect.span[1] + 1);
                full - usize::from(rect.skip_center)
            }
            Shape::Diamond(diamond) => 2 * diamond.radius * (diamond.radius + 1) + 1,
        }
    }

    /// Whether the window has no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Shape::Rectangle(rect) => write!(
                f,
                "Rectangle {{ span: {:?}, skip_center: {} }}",
                rect.span, rect.skip_center
            ),
            Shape::Diamond(diamond) => write!(f, "Diamond {{ radius: {} }}", diamond.radius),
        }
    }
}
