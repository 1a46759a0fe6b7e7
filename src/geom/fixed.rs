use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Shr, ShrAssign, Sub, SubAssign};

/// Signed 16.16 fixed-point number.
///
/// Arithmetic wraps on overflow. Multiplication and division round the last
/// bit to nearest by carrying one extra bit of precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fixed16(i32);

impl Fixed16 {
    pub const FRACTION_BITS: u32 = 16;
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << 16);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);

    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn from_int(value: i32) -> Self {
        Self(value.wrapping_mul(1 << 16))
    }

    /// Rounds half away from zero. Out-of-range values saturate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(value: f64) -> Self {
        let scaled = value * 65536.0;
        let rounded = if value >= 0.0 { scaled + 0.5 } else { scaled - 0.5 };
        Self(rounded as i32)
    }

    #[must_use]
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 65536.0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.wrapping_abs())
    }

    /// Divide the raw value by an integer, truncating toward zero.
    #[must_use]
    pub const fn div_int(self, rhs: i32) -> Self {
        if rhs == 0 {
            return if self.0 < 0 { Self::MIN } else { Self::MAX };
        }
        Self(self.0.wrapping_div(rhs))
    }
}

impl PartialOrd for Fixed16 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fixed16 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<Fixed16> for f64 {
    fn from(value: Fixed16) -> Self {
        value.to_f64()
    }
}

impl Add for Fixed16 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed16 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed16 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fixed16 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Fixed16 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}

impl Mul for Fixed16 {
    type Output = Self;
    #[allow(clippy::cast_possible_truncation)]
    fn mul(self, rhs: Self) -> Self::Output {
        let v = (i64::from(self.0) * i64::from(rhs.0)) / (1_i64 << 15);
        Self((v / 2 + v % 2) as i32)
    }
}

impl Div for Fixed16 {
    type Output = Self;
    #[allow(clippy::cast_possible_truncation)]
    fn div(self, rhs: Self) -> Self::Output {
        if rhs.0 == 0 {
            return if self.0 < 0 { Self::MIN } else { Self::MAX };
        }
        let v = (i64::from(self.0) * (1_i64 << 17)) / i64::from(rhs.0);
        Self((v / 2 + v % 2) as i32)
    }
}

impl Shr<u32> for Fixed16 {
    type Output = Self;
    fn shr(self, rhs: u32) -> Self::Output {
        Self(self.0.checked_shr(rhs).unwrap_or(if self.0 < 0 { -1 } else { 0 }))
    }
}

impl ShrAssign<u32> for Fixed16 {
    fn shr_assign(&mut self, rhs: u32) {
        *self = *self >> rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_rounds_half_away() {
        assert_eq!(Fixed16::from_f64(1.0).raw(), 65536);
        assert_eq!(Fixed16::from_f64(-1.0).raw(), -65536);
        assert_eq!(Fixed16::from_f64(0.5 / 65536.0).raw(), 1);
        assert_eq!(Fixed16::from_f64(-0.5 / 65536.0).raw(), -1);
        assert!((Fixed16::from_f64(3.25).to_f64() - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_mul_div() {
        let a = Fixed16::from_f64(2.5);
        let b = Fixed16::from_f64(-4.0);
        assert_eq!((a * b).to_f64(), -10.0);
        assert_eq!(b / a, Fixed16::from_f64(-1.6));
        assert_eq!(Fixed16::ONE / Fixed16::ZERO, Fixed16::MAX);
    }

    #[test]
    fn test_shift_and_int_division() {
        let a = Fixed16::from_int(10);
        assert_eq!((a >> 1).to_f64(), 5.0);
        assert_eq!(a.div_int(8).to_f64(), 1.25);
        assert_eq!((-Fixed16::from_raw(1)) >> 40, Fixed16::from_raw(-1));
        assert_eq!(Fixed16::from_raw(1) >> 40, Fixed16::ZERO);
    }

    #[test]
    fn test_wrapping_add() {
        let near_max = Fixed16::MAX;
        assert_eq!(near_max + Fixed16::from_raw(1), Fixed16::MIN);
    }
}
