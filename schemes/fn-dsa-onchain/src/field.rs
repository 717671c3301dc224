//! Field arithmetic in Z_q where q = 12289.
//!
//! Everything handled here is public (keys, hash points, signature
//! components), so the operations favour clarity over constant-time tricks.
//! Values are stored as `u16` in [0, q-1]; products are formed in `u32`.

use crate::params::Q;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// An element of Z_q.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct Zq(u16);

impl Zq {
    /// The additive identity.
    pub const ZERO: Zq = Zq(0);

    /// The multiplicative identity.
    pub const ONE: Zq = Zq(1);

    /// Creates a field element from any signed integer, reducing modulo q.
    #[inline]
    pub fn new(val: i64) -> Self {
        Zq(val.rem_euclid(Q as i64) as u16)
    }

    /// Creates a field element from a value that must already lie in [0, q-1].
    #[inline]
    pub fn from_reduced(val: u16) -> Option<Self> {
        if (val as u32) < Q {
            Some(Zq(val))
        } else {
            None
        }
    }

    /// Returns the canonical value in [0, q-1].
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns true if this is zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Computes self^exp by square-and-multiply.
    pub fn pow(self, mut exp: u32) -> Self {
        let mut base = self;
        let mut result = Zq::ONE;
        while exp > 0 {
            if exp & 1 == 1 {
                result *= base;
            }
            base *= base;
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse via Fermat, `a^(q-2)`. Zero maps to zero.
    #[inline]
    pub fn inverse(self) -> Self {
        self.pow(Q - 2)
    }

    /// Centered representative in (-q/2, q/2], i.e. [-6144, 6144].
    #[inline]
    pub fn centered(self) -> i32 {
        let v = self.0 as i32;
        if v > (Q / 2) as i32 {
            v - Q as i32
        } else {
            v
        }
    }
}

impl Add for Zq {
    type Output = Zq;

    #[inline]
    fn add(self, rhs: Zq) -> Zq {
        let sum = self.0 as u32 + rhs.0 as u32;
        Zq(if sum >= Q { sum - Q } else { sum } as u16)
    }
}

impl AddAssign for Zq {
    #[inline]
    fn add_assign(&mut self, rhs: Zq) {
        *self = *self + rhs;
    }
}

impl Sub for Zq {
    type Output = Zq;

    #[inline]
    fn sub(self, rhs: Zq) -> Zq {
        let diff = self.0 as u32 + Q - rhs.0 as u32;
        Zq(if diff >= Q { diff - Q } else { diff } as u16)
    }
}

impl SubAssign for Zq {
    #[inline]
    fn sub_assign(&mut self, rhs: Zq) {
        *self = *self - rhs;
    }
}

impl Mul for Zq {
    type Output = Zq;

    #[inline]
    fn mul(self, rhs: Zq) -> Zq {
        Zq(((self.0 as u32 * rhs.0 as u32) % Q) as u16)
    }
}

impl MulAssign for Zq {
    #[inline]
    fn mul_assign(&mut self, rhs: Zq) {
        *self = *self * rhs;
    }
}

impl Neg for Zq {
    type Output = Zq;

    #[inline]
    fn neg(self) -> Zq {
        Zq::ZERO - self
    }
}

impl From<i16> for Zq {
    #[inline]
    fn from(val: i16) -> Self {
        Zq::new(val as i64)
    }
}
