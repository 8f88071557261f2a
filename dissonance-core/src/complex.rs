//! Complex scalar arithmetic for the root finder and z-plane filter.
//!
//! A plain value type; every operation is by value. Division and absolute
//! value rescale by the larger component (Smith's algorithm) so that
//! intermediate squares cannot overflow where the quotient itself is
//! representable.

use std::ops::{Add, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cpx {
    pub re: f32,
    pub im: f32,
}

impl Cpx {
    pub const ZERO: Cpx = Cpx { re: 0.0, im: 0.0 };

    #[inline]
    pub fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    /// Scalar times complex.
    #[inline]
    pub fn scale(self, x: f32) -> Self {
        Self::new(x * self.re, x * self.im)
    }

    /// Division, dispatching on |re| >= |im| of the divisor.
    pub fn div(self, rhs: Cpx) -> Self {
        if rhs.re.abs() >= rhs.im.abs() {
            let r = rhs.im / rhs.re;
            let den = rhs.re + r * rhs.im;
            Self::new((self.re + r * self.im) / den, (self.im - r * self.re) / den)
        } else {
            let r = rhs.re / rhs.im;
            let den = rhs.im + r * rhs.re;
            Self::new((self.re * r + self.im) / den, (self.im * r - self.re) / den)
        }
    }

    /// Magnitude with the same rescaling as [`Cpx::div`].
    pub fn abs(self) -> f32 {
        let x = self.re.abs();
        let y = self.im.abs();
        if x == 0.0 {
            y
        } else if y == 0.0 {
            x
        } else if x > y {
            let t = y / x;
            x * (1.0 + t * t).sqrt()
        } else {
            let t = x / y;
            y * (1.0 + t * t).sqrt()
        }
    }

    /// Principal square root; (0, 0) maps to (0, 0).
    pub fn sqrt(self) -> Self {
        if self.re == 0.0 && self.im == 0.0 {
            return Self::ZERO;
        }
        let x = self.re.abs();
        let y = self.im.abs();
        let w = if x >= y {
            let r = y / x;
            x.sqrt() * (0.5 * (1.0 + (1.0 + r * r).sqrt())).sqrt()
        } else {
            let r = x / y;
            y.sqrt() * (0.5 * (r + (1.0 + r * r).sqrt())).sqrt()
        };
        if self.re >= 0.0 {
            Self::new(w, self.im / (2.0 * w))
        } else {
            let im = if self.im >= 0.0 { w } else { -w };
            Self::new(self.im / (2.0 * im), im)
        }
    }
}

impl Add for Cpx {
    type Output = Cpx;
    #[inline]
    fn add(self, rhs: Cpx) -> Cpx {
        Cpx::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Cpx {
    type Output = Cpx;
    #[inline]
    fn sub(self, rhs: Cpx) -> Cpx {
        Cpx::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Cpx {
    type Output = Cpx;
    #[inline]
    fn mul(self, rhs: Cpx) -> Cpx {
        Cpx::new(
            self.re * rhs.re - self.im * rhs.im,
            self.im * rhs.re + self.re * rhs.im,
        )
    }
}

// --------------------------- Tests -----------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_basic() {
        let p = Cpx::new(1.0, 2.0) * Cpx::new(3.0, -1.0);
        assert!((p.re - 5.0).abs() < 1e-6);
        assert!((p.im - 5.0).abs() < 1e-6);
    }

    #[test]
    fn div_roundtrip() {
        let a = Cpx::new(3.0, -2.5);
        let b = Cpx::new(-0.7, 4.0);
        let q = a.div(b);
        let back = q * b;
        assert!((back.re - a.re).abs() < 1e-5);
        assert!((back.im - a.im).abs() < 1e-5);
    }

    #[test]
    fn div_avoids_overflow_on_large_components() {
        let big = 1.0e30_f32;
        let q = Cpx::new(big, big).div(Cpx::new(big, big));
        assert!((q.re - 1.0).abs() < 1e-6);
        assert!(q.im.abs() < 1e-6);
    }

    #[test]
    fn abs_is_hypotenuse() {
        assert!((Cpx::new(3.0, 4.0).abs() - 5.0).abs() < 1e-6);
        assert!((Cpx::new(-4.0, 3.0).abs() - 5.0).abs() < 1e-6);
        assert_eq!(Cpx::new(0.0, -2.0).abs(), 2.0);
    }

    #[test]
    fn sqrt_principal_branch() {
        assert_eq!(Cpx::ZERO.sqrt(), Cpx::ZERO);
        let i = Cpx::new(-1.0, 0.0).sqrt();
        assert!(i.re.abs() < 1e-6);
        assert!((i.im - 1.0).abs() < 1e-6);
        let r = Cpx::new(2.0, -3.0).sqrt();
        let sq = r * r;
        assert!((sq.re - 2.0).abs() < 1e-5);
        assert!((sq.im + 3.0).abs() < 1e-5);
        // principal branch keeps the real part non-negative
        assert!(r.re >= 0.0);
    }
}
