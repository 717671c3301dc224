//! Polynomial arithmetic over Z_q[X]/(X^n + 1).
//!
//! Multiplication and division go through the negacyclic NTT, which is exact
//! in Z_q: q - 1 = 3 * 2^12, so 2n-th roots of unity exist for n up to 2048.

use crate::error::{Result, WireError};
use crate::field::Zq;
use crate::params::Q;

/// Generator of the multiplicative group of Z_q.
const GENERATOR: i64 = 11;

/// A polynomial in Z_q[X]/(X^n + 1); `coeffs[i]` is the coefficient of x^i.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    coeffs: Vec<Zq>,
}

impl Poly {
    /// The zero polynomial with `n` coefficients.
    pub fn zero(n: usize) -> Self {
        Poly {
            coeffs: vec![Zq::ZERO; n],
        }
    }

    /// Wraps reduced coefficients.
    pub fn from_zq(coeffs: Vec<Zq>) -> Self {
        Poly { coeffs }
    }

    /// Lifts signed coefficients (such as a decompressed `s1`) into Z_q.
    pub fn from_signed(coeffs: &[i16]) -> Self {
        Poly {
            coeffs: coeffs.iter().map(|&c| Zq::from(c)).collect(),
        }
    }

    /// Returns the number of coefficients.
    #[inline]
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// True for the empty polynomial.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Borrow the coefficients.
    #[inline]
    pub fn coeffs(&self) -> &[Zq] {
        &self.coeffs
    }

    /// Canonical coefficient values in [0, q-1].
    pub fn to_u16(&self) -> Vec<u16> {
        self.coeffs.iter().map(|c| c.value()).collect()
    }

    /// Coefficients mapped into (-q/2, q/2].
    pub fn to_centered(&self) -> Vec<i32> {
        self.coeffs.iter().map(|c| c.centered()).collect()
    }

    /// Squared L2 norm of the centered coefficients.
    pub fn centered_norm_sq(&self) -> u64 {
        self.coeffs
            .iter()
            .map(|c| {
                let v = c.centered() as i64;
                (v * v) as u64
            })
            .sum()
    }

    /// Coefficient-wise sum.
    pub fn add(&self, other: &Poly) -> Result<Poly> {
        self.check_same_degree(other)?;
        Ok(Poly {
            coeffs: self
                .coeffs
                .iter()
                .zip(&other.coeffs)
                .map(|(&a, &b)| a + b)
                .collect(),
        })
    }

    /// Coefficient-wise difference.
    pub fn sub(&self, other: &Poly) -> Result<Poly> {
        self.check_same_degree(other)?;
        Ok(Poly {
            coeffs: self
                .coeffs
                .iter()
                .zip(&other.coeffs)
                .map(|(&a, &b)| a - b)
                .collect(),
        })
    }

    /// Negacyclic product `self * other mod (X^n + 1, q)`.
    pub fn mul(&self, other: &Poly) -> Result<Poly> {
        self.check_same_degree(other)?;
        let mut a = self.coeffs.clone();
        let mut b = other.coeffs.clone();
        ntt(&mut a)?;
        ntt(&mut b)?;
        for (x, y) in a.iter_mut().zip(&b) {
            *x *= *y;
        }
        intt(&mut a)?;
        Ok(Poly { coeffs: a })
    }

    /// Quotient `self / other` in the ring.
    ///
    /// Fails when `other` is not invertible, i.e. one of its NTT
    /// evaluations is zero.
    pub fn div(&self, other: &Poly) -> Result<Poly> {
        self.check_same_degree(other)?;
        let mut a = self.coeffs.clone();
        let mut b = other.coeffs.clone();
        ntt(&mut a)?;
        ntt(&mut b)?;
        for (x, y) in a.iter_mut().zip(&b) {
            if y.is_zero() {
                return Err(WireError::Arithmetic {
                    reason: "divisor is not invertible mod q",
                });
            }
            *x *= y.inverse();
        }
        intt(&mut a)?;
        Ok(Poly { coeffs: a })
    }

    fn check_same_degree(&self, other: &Poly) -> Result<()> {
        if self.len() != other.len() {
            return Err(WireError::Arithmetic {
                reason: "operands have different degrees",
            });
        }
        Ok(())
    }
}

/// Primitive `order`-th root of unity in Z_q.
fn root_of_unity(order: usize) -> Result<Zq> {
    if order == 0 || (Q as usize - 1) % order != 0 {
        return Err(WireError::Arithmetic {
            reason: "no root of unity of the required order",
        });
    }
    Ok(Zq::new(GENERATOR).pow((Q - 1) / order as u32))
}

fn check_len(n: usize) -> Result<()> {
    if n < 2 || !n.is_power_of_two() {
        return Err(WireError::Arithmetic {
            reason: "degree must be a power of two",
        });
    }
    Ok(())
}

#[inline]
fn bit_reverse(x: usize, log_n: u32) -> usize {
    x.reverse_bits() >> (usize::BITS - log_n)
}

/// Bit-reversal followed by Cooley-Tukey butterflies with root `omega`.
/// Input in natural order, output in natural order.
fn dit(values: &mut [Zq], omega: Zq) {
    let n = values.len();
    let log_n = n.trailing_zeros();
    for i in 0..n {
        let j = bit_reverse(i, log_n);
        if i < j {
            values.swap(i, j);
        }
    }

    let mut len = 1;
    while len < n {
        let step = omega.pow((n / (2 * len)) as u32);
        for block in (0..n).step_by(2 * len) {
            let mut w = Zq::ONE;
            for j in block..block + len {
                let u = values[j];
                let t = w * values[j + len];
                values[j] = u + t;
                values[j + len] = u - t;
                w *= step;
            }
        }
        len <<= 1;
    }
}

/// Forward negacyclic NTT: evaluates `a` at psi^(2k+1), psi a primitive
/// 2n-th root of unity.
pub fn ntt(a: &mut [Zq]) -> Result<()> {
    let n = a.len();
    check_len(n)?;
    let psi = root_of_unity(2 * n)?;

    let mut psi_pow = Zq::ONE;
    for c in a.iter_mut() {
        *c *= psi_pow;
        psi_pow *= psi;
    }
    dit(a, psi * psi);
    Ok(())
}

/// Inverse of [`ntt`].
pub fn intt(a: &mut [Zq]) -> Result<()> {
    let n = a.len();
    check_len(n)?;
    let psi_inv = root_of_unity(2 * n)?.inverse();
    let n_inv = Zq::new(n as i64).inverse();

    dit(a, psi_inv * psi_inv);
    let mut scale = n_inv;
    for c in a.iter_mut() {
        *c *= scale;
        scale *= psi_inv;
    }
    Ok(())
}

/// O(n^2) negacyclic product, used to cross-check the NTT path.
pub fn mul_schoolbook(a: &[Zq], b: &[Zq]) -> Vec<Zq> {
    let n = a.len();
    debug_assert_eq!(n, b.len());
    let mut result = vec![Zq::ZERO; n];
    for i in 0..n {
        for j in 0..n {
            let idx = i + j;
            if idx < n {
                result[idx] += a[i] * b[j];
            } else {
                // x^n = -1
                result[idx - n] -= a[i] * b[j];
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_poly(rng: &mut StdRng, n: usize) -> Poly {
        Poly::from_zq((0..n).map(|_| Zq::new(rng.gen_range(0..Q as i64))).collect())
    }

    #[test]
    fn test_poly_add_sub() {
        let a = Poly::from_signed(&[1, 2, 3, 4]);
        let b = Poly::from_signed(&[5, 6, 7, -8]);
        assert_eq!(a.add(&b).unwrap().to_centered(), vec![6, 8, 10, -4]);
        assert_eq!(a.sub(&b).unwrap().to_centered(), vec![-4, -4, -4, 12]);
    }

    #[test]
    fn test_degree_mismatch() {
        let a = Poly::zero(4);
        let b = Poly::zero(8);
        assert!(a.add(&b).is_err());
        assert!(a.mul(&b).is_err());
    }

    #[test]
    fn test_schoolbook_negacyclic() {
        // x^3 * x = x^4 = -1 in Z[X]/(X^4 + 1)
        let a = Poly::from_signed(&[0, 0, 0, 1]);
        let b = Poly::from_signed(&[0, 1, 0, 0]);
        let c = mul_schoolbook(a.coeffs(), b.coeffs());
        assert_eq!(c[0], Zq::new(-1));
        assert!(c[1..].iter().all(|x| x.is_zero()));
    }

    #[test]
    fn test_primitive_root() {
        for &n in &[512usize, 1024] {
            let psi = root_of_unity(2 * n).unwrap();
            assert_eq!(psi.pow((2 * n) as u32), Zq::ONE);
            assert_eq!(psi.pow(n as u32), Zq::new(-1));
        }
        assert!(root_of_unity(5).is_err());
    }

    #[test]
    fn test_ntt_roundtrip() {
        let mut rng = StdRng::seed_from_u64(7);
        for &n in &[8usize, 64, 512, 1024] {
            let p = random_poly(&mut rng, n);
            let mut v = p.coeffs().to_vec();
            ntt(&mut v).unwrap();
            intt(&mut v).unwrap();
            assert_eq!(v, p.coeffs(), "roundtrip failed at n={}", n);
        }
    }

    #[test]
    fn test_mul_matches_schoolbook() {
        let mut rng = StdRng::seed_from_u64(42);
        for &n in &[4usize, 16, 512] {
            let a = random_poly(&mut rng, n);
            let b = random_poly(&mut rng, n);
            let fast = a.mul(&b).unwrap();
            assert_eq!(fast.coeffs(), mul_schoolbook(a.coeffs(), b.coeffs()).as_slice());
        }
    }

    #[test]
    fn test_div_inverts_mul() {
        let mut rng = StdRng::seed_from_u64(99);
        let n = 512;
        let f = Poly::from_signed(&(0..n).map(|_| rng.gen_range(-4i16..=4)).collect::<Vec<_>>());
        let g = random_poly(&mut rng, n);
        match g.div(&f) {
            Ok(h) => assert_eq!(h.mul(&f).unwrap(), g),
            Err(e) => assert!(matches!(e, WireError::Arithmetic { .. })),
        }
    }

    #[test]
    fn test_div_by_zero_fails() {
        let a = Poly::from_signed(&[1, 2, 3, 4]);
        assert!(a.div(&Poly::zero(4)).is_err());
    }

    #[test]
    fn test_centered_norm() {
        let p = Poly::from_signed(&[1, -1, 2, -2]);
        assert_eq!(p.centered_norm_sq(), 10);
    }
}
