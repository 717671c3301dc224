//! Hash-to-point for FALCON.
//!
//! Maps a salt and message to a polynomial in Z_q[X]/(X^n + 1) with SHAKE256,
//! the same way the reference implementation and the on-chain verifier do.

use crate::field::Zq;
use crate::params::{Params, Q};
use crate::poly::Poly;
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

/// Rejection threshold: the largest multiple of q below 2^16.
const ACCEPT_BELOW: u32 = 5 * Q;

/// Hashes `salt || message` to a polynomial with coefficients in [0, q-1].
///
/// - Input: SHAKE256(salt || message)
/// - Reads 2 bytes big-endian as a 16-bit value w
/// - Accepts if w < 5*q = 61445 and keeps w mod q
pub fn hash_to_point(message: &[u8], salt: &[u8], params: &Params) -> Poly {
    let mut hasher = Shake256::default();
    hasher.update(salt);
    hasher.update(message);
    let mut reader = hasher.finalize_xof();

    let mut coeffs = Vec::with_capacity(params.n);
    let mut buf = [0u8; 2];
    while coeffs.len() < params.n {
        reader.read(&mut buf);
        let w = u16::from_be_bytes(buf) as u32;
        if w < ACCEPT_BELOW {
            coeffs.push(Zq::new((w % Q) as i64));
        }
    }

    Poly::from_zq(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FALCON_1024, FALCON_512, SALT_LEN};

    #[test]
    fn test_hash_to_point_deterministic() {
        let salt = [0u8; SALT_LEN];
        let c1 = hash_to_point(b"test message", &salt, &FALCON_512);
        let c2 = hash_to_point(b"test message", &salt, &FALCON_512);
        assert_eq!(c1.len(), 512);
        assert_eq!(c1, c2);
    }

    #[test]
    fn test_hash_to_point_depends_on_salt_and_message() {
        let salt = [0u8; SALT_LEN];
        let other_salt = [1u8; SALT_LEN];
        let base = hash_to_point(b"message 1", &salt, &FALCON_512);
        assert_ne!(base, hash_to_point(b"message 2", &salt, &FALCON_512));
        assert_ne!(base, hash_to_point(b"message 1", &other_salt, &FALCON_512));
    }

    #[test]
    fn test_hash_to_point_degree() {
        let c = hash_to_point(b"test", &[42u8; SALT_LEN], &FALCON_1024);
        assert_eq!(c.len(), 1024);
        assert!(c.to_u16().iter().all(|&v| (v as u32) < Q));
    }
}
