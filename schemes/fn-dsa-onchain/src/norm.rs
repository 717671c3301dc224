//! Norm bound check for FALCON signatures.
//!
//! Given the public key h, the hashed point c and the decoded s1:
//! 1. s0 = c - s1 * h mod (X^n + 1, q)
//! 2. s0 is centered into (-q/2, q/2]
//! 3. ||s0||^2 + ||s1||^2 is compared with the parameter set's bound
//!
//! The sum is accumulated in `u64`, which cannot overflow for n <= 1024.

use serde::Serialize;

use crate::error::{Result, WireError};
use crate::params::Params;
use crate::poly::Poly;

/// Outcome of a norm check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The squared norm is at most the bound.
    Accepted,
    /// The squared norm is strictly greater than the bound.
    BoundExceeded,
}

/// Squared norm computed for a signature, with the bound it was held to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NormCheck {
    /// ||s0||^2 + ||s1||^2.
    pub squared_norm: u64,
    /// Bound for the parameter set.
    pub bound: u64,
    /// Accepted iff `squared_norm <= bound`.
    pub verdict: Verdict,
}

impl NormCheck {
    /// Builds the result for a computed squared norm.
    pub fn new(squared_norm: u64, bound: u64) -> Self {
        let verdict = if squared_norm <= bound {
            Verdict::Accepted
        } else {
            Verdict::BoundExceeded
        };
        NormCheck {
            squared_norm,
            bound,
            verdict,
        }
    }

    /// True if the signature is short enough.
    #[inline]
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }
}

/// Computes ||s0||^2 + ||s1||^2 and compares it with `params.sig_bound_sq`.
///
/// `h` and `c` must have n coefficients reduced mod q and `s1` must have n
/// signed coefficients; anything else is a format error.
pub fn check_norm(h: &Poly, c: &Poly, s1: &[i16], params: &Params) -> Result<NormCheck> {
    let n = params.n;
    if h.len() != n || c.len() != n || s1.len() != n {
        return Err(WireError::Format {
            field: "norm check input",
            reason: "polynomial length does not match degree",
        });
    }

    let s1_poly = Poly::from_signed(s1);
    let s0 = c.sub(&s1_poly.mul(h)?)?;

    let s0_norm = s0.centered_norm_sq();
    let s1_norm: u64 = s1
        .iter()
        .map(|&x| {
            let v = x as i64;
            (v * v) as u64
        })
        .sum();

    Ok(NormCheck::new(s0_norm + s1_norm, params.sig_bound_sq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Zq;
    use crate::params::{FALCON_1024, FALCON_512, Q};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_poly(rng: &mut StdRng, n: usize) -> Poly {
        Poly::from_zq((0..n).map(|_| Zq::new(rng.gen_range(0..Q as i64))).collect())
    }

    #[test]
    fn test_zero_signature_of_zero_point() {
        let mut rng = StdRng::seed_from_u64(11);
        let h = random_poly(&mut rng, 512);
        let check = check_norm(&h, &Poly::zero(512), &[0; 512], &FALCON_512).unwrap();
        assert_eq!(check.squared_norm, 0);
        assert!(check.is_accepted());
    }

    #[test]
    fn test_s1_only_contribution() {
        // h = 0 gives s0 = c; with c = 0 only s1 counts
        let s1 = vec![3i16; 512];
        let check = check_norm(&Poly::zero(512), &Poly::zero(512), &s1, &FALCON_512).unwrap();
        assert_eq!(check.squared_norm, 9 * 512);
    }

    #[test]
    fn test_s0_is_centered() {
        // c = q - 1 in every slot centers to -1
        let c = Poly::from_zq(vec![Zq::new(-1); 512]);
        let check = check_norm(&Poly::zero(512), &c, &[0; 512], &FALCON_512).unwrap();
        assert_eq!(check.squared_norm, 512);
    }

    #[test]
    fn test_bound_is_inclusive() {
        assert!(NormCheck::new(34_034_726, FALCON_512.sig_bound_sq).is_accepted());
        let over = NormCheck::new(34_034_727, FALCON_512.sig_bound_sq);
        assert_eq!(over.verdict, Verdict::BoundExceeded);
    }

    #[test]
    fn test_random_point_exceeds_bound() {
        // A uniform c with s1 = 0 has expected norm ~ n * q^2 / 12
        let mut rng = StdRng::seed_from_u64(5);
        for params in [&FALCON_512, &FALCON_1024] {
            let h = random_poly(&mut rng, params.n);
            let c = random_poly(&mut rng, params.n);
            let s1 = vec![0i16; params.n];
            let check = check_norm(&h, &c, &s1, params).unwrap();
            assert!(!check.is_accepted());
            assert_eq!(check.bound, params.sig_bound_sq);
        }
    }

    #[test]
    fn test_consistent_triple_is_accepted() {
        // Choose small s0 and s1, derive c = s0 + s1 * h
        let mut rng = StdRng::seed_from_u64(77);
        let n = 512;
        let h = random_poly(&mut rng, n);
        let s0: Vec<i16> = (0..n).map(|_| rng.gen_range(-150..=150)).collect();
        let s1: Vec<i16> = (0..n).map(|_| rng.gen_range(-150..=150)).collect();
        let c = Poly::from_signed(&s0)
            .add(&Poly::from_signed(&s1).mul(&h).unwrap())
            .unwrap();

        let expected: u64 = s0
            .iter()
            .chain(&s1)
            .map(|&x| (x as i64 * x as i64) as u64)
            .sum();
        let check = check_norm(&h, &c, &s1, &FALCON_512).unwrap();
        assert_eq!(check.squared_norm, expected);
        assert!(check.is_accepted());
    }

    #[test]
    fn test_length_mismatch_is_format_error() {
        let err =
            check_norm(&Poly::zero(512), &Poly::zero(512), &[0; 10], &FALCON_512).unwrap_err();
        assert!(err.is_format());
    }
}
