/// How out-of-range neighborhood samples are produced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundaryPolicy {
    /// Mirror at the border without repeating the edge sample.
    ///
    /// Example: ...d c b a | b c d e...
    #[default]
    MirrorSingle,

    /// Mirror at the border, repeating the edge sample.
    ///
    /// Example: ...d c b a | a b c d...
    MirrorDouble,

    /// Repeat the outermost sample.
    ///
    /// Example: ...d c b a | a a a a...
    Clamp,

    /// Fill with a constant value.
    ///
    /// Example: ...d c b a | v v v v...
    Constant(f64),

    /// Wrap around to the opposite side.
    ///
    /// Example: ...d c b a | w x y z...
    Periodic,
}

impl BoundaryPolicy {
    #[inline]
    fn mirror_double(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let mut i = i;
        while i < 0 || i >= len {
            if i < 0 {
                i = -i - 1;
            } else {
                i = 2 * len - i - 1;
            }
        }
        i as usize
    }

    #[inline]
    fn mirror_single(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let mut i = i;
        while i < 0 || i >= len {
            if i < 0 {
                i = -i;
            } else {
                i = 2 * len - i - 2;
            }
        }
        i as usize
    }

    #[inline]
    fn periodic(i: isize, len: usize) -> usize {
        i.rem_euclid(len as isize) as usize
    }

    /// Maps index `i` to a valid index within `[0, len)` according to the policy.
    ///
    /// Returns `None` when the sample must be taken from the fill value instead, which only
    /// happens for [`BoundaryPolicy::Constant`] with an out-of-range index.
    ///
    /// # Arguments
    ///
    /// * `i` - The (possibly out-of-range) coordinate index.
    /// * `len` - The valid length of the axis, must be > 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use lokal_imgproc::BoundaryPolicy;
    ///
    /// assert_eq!(BoundaryPolicy::MirrorSingle.resolve(-1, 4), Some(1));
    /// assert_eq!(BoundaryPolicy::MirrorDouble.resolve(-1, 4), Some(0));
    /// assert_eq!(BoundaryPolicy::Clamp.resolve(6, 4), Some(3));
    /// assert_eq!(BoundaryPolicy::Periodic.resolve(4, 4), Some(0));
    /// assert_eq!(BoundaryPolicy::Constant(0.0).resolve(4, 4), None);
    /// ```
    #[inline]
    pub fn resolve(&self, i: isize, len: usize) -> Option<usize> {
        if i >= 0 && (i as usize) < len {
            return Some(i as usize);
        }
        match self {
            BoundaryPolicy::MirrorSingle => Some(Self::mirror_single(i, len)),
            BoundaryPolicy::MirrorDouble => Some(Self::mirror_double(i, len)),
            BoundaryPolicy::Clamp => Some(i.clamp(0, len as isize - 1) as usize),
            BoundaryPolicy::Periodic => Some(Self::periodic(i, len)),
            BoundaryPolicy::Constant(_) => None,
        }
    }

    /// The value used for samples outside the plane, if the policy has one.
    #[inline]
    pub fn fill_value(&self) -> Option<f64> {
        match self {
            BoundaryPolicy::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Resolve a 2-D position and read the sample through `get`.
    ///
    /// `get` receives in-range `(x, y)` indices; the fill value is returned when either
    /// axis falls outside the plane under [`BoundaryPolicy::Constant`].
    #[inline]
    pub fn sample<F>(&self, x: isize, y: isize, width: usize, height: usize, get: F) -> f64
    where
        F: Fn(usize, usize) -> f64,
    {
        match (self.resolve(x, width), self.resolve(y, height)) {
            (Some(x), Some(y)) => get(x, y),
            _ => self.fill_value().unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BoundaryPolicy::MirrorSingle => write!(f, "MirrorSingle"),
            BoundaryPolicy::MirrorDouble => write!(f, "MirrorDouble"),
            BoundaryPolicy::Clamp => write!(f, "Clamp"),
            BoundaryPolicy::Constant(value) => write!(f, "Constant({value})"),
            BoundaryPolicy::Periodic => write!(f, "Periodic"),
        }
    }
}
