use num_traits::{Bounded, NumCast};

/// A bounded numeric sample type.
///
/// Every operator in this workspace reads samples as `f64` and writes them back through
/// [`PixelType::from_f64`], which clamps to the representable range of the type.
///
/// Send and Sync are required to process planes on the rayon thread pool.
pub trait PixelType: Copy + Default + PartialOrd + Send + Sync + 'static {
    /// The smallest representable value.
    fn min_value() -> Self;

    /// The largest representable value.
    fn max_value() -> Self;

    /// Convert the sample to a real value.
    fn to_f64(self) -> f64;

    /// Convert a real value to the sample type.
    ///
    /// The value is clamped to `[min_value, max_value]`; integer types round to the
    /// nearest representable value. `NaN` maps to the default value of the type.
    fn from_f64(x: f64) -> Self;
}

macro_rules! impl_pixel_type_int {
    ($($t:ty),*) => {
        $(
            impl PixelType for $t {
                #[inline]
                fn min_value() -> Self {
                    <$t as Bounded>::min_value()
                }

                #[inline]
                fn max_value() -> Self {
                    <$t as Bounded>::max_value()
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(x: f64) -> Self {
                    if x.is_nan() {
                        return <$t>::default();
                    }
                    let lo = <Self as PixelType>::min_value().to_f64();
                    let hi = <Self as PixelType>::max_value().to_f64();
                    <$t as NumCast>::from(x.round().clamp(lo, hi)).unwrap_or_default()
                }
            }
        )*
    };
}

macro_rules! impl_pixel_type_float {
    ($($t:ty),*) => {
        $(
            impl PixelType for $t {
                #[inline]
                fn min_value() -> Self {
                    <$t as Bounded>::min_value()
                }

                #[inline]
                fn max_value() -> Self {
                    <$t as Bounded>::max_value()
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(x: f64) -> Self {
                    if x.is_nan() {
                        return <$t>::default();
                    }
                    let lo = <Self as PixelType>::min_value().to_f64();
                    let hi = <Self as PixelType>::max_value().to_f64();
                    x.clamp(lo, hi) as $t
                }
            }
        )*
    };
}

impl_pixel_type_int!(u8, u16, u32, i8, i16, i32);
impl_pixel_type_float!(f32, f64);

impl PixelType for bool {
    #[inline]
    fn min_value() -> Self {
        false
    }

    #[inline]
    fn max_value() -> Self {
        true
    }

    #[inline]
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn from_f64(x: f64) -> Self {
        x >= 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::PixelType;

    #[test]
    fn pixel_bounds() {
        assert_eq!(<u8 as PixelType>::min_value(), 0);
        assert_eq!(<u8 as PixelType>::max_value(), 255);
        assert_eq!(<i16 as PixelType>::min_value(), i16::MIN);
        assert_eq!(<u16 as PixelType>::max_value(), u16::MAX);
        assert_eq!(<f32 as PixelType>::max_value(), f32::MAX);
        assert!(!<bool as PixelType>::min_value());
    }

    #[test]
    fn pixel_from_f64_clamps() {
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-4.0), 0);
        assert_eq!(u8::from_f64(41.6), 42);
        assert_eq!(i8::from_f64(-200.0), -128);
        assert_eq!(u16::from_f64(f64::NAN), 0);
        assert_eq!(f32::from_f64(1e300), f32::MAX);
        assert_eq!(f64::from_f64(-0.25), -0.25);
        assert!(bool::from_f64(1.0));
        assert!(!bool::from_f64(0.0));
    }

    #[test]
    fn pixel_to_f64() {
        assert_eq!(200u8.to_f64(), 200.0);
        assert_eq!((-3i32).to_f64(), -3.0);
        assert_eq!(true.to_f64(), 1.0);
    }
}
