//! Parameter sets for the FN-DSA (FALCON) wire format.
//!
//! Every size, tag and bound the codecs depend on lives in one immutable
//! table indexed by degree:
//! - FALCON-512: degree tag `0x09`, 897-byte public keys
//! - FALCON-1024: degree tag `0x0A`, 1793-byte public keys
//!
//! Both use the same modulus q = 12289 and ring Z_q[X]/(X^n + 1).

use crate::error::{Result, WireError};

/// The FALCON modulus q = 12289.
pub const Q: u32 = 12289;

/// Bits per packed public key coefficient.
pub const Q_BITS: usize = 14;

/// Salt (nonce) length in bytes.
pub const SALT_LEN: usize = 40;

/// Header byte length for keys and signatures.
pub const HEADER_LEN: usize = 1;

/// Shortest buffer `parse_signature` accepts: header plus salt.
pub const MIN_SIGNATURE_LEN: usize = HEADER_LEN + SALT_LEN;

/// Largest magnitude a compressed coefficient may carry.
pub const MAX_COMPRESSED_COEFF: u32 = 2047;

/// Parameters for one FALCON degree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    /// Polynomial degree n.
    pub n: usize,

    /// Log2 of n; doubles as the one-byte degree tag.
    pub log_n: u8,

    /// Squared L2 norm bound: a signature is accepted iff
    /// `||s0||^2 + ||s1||^2 <= sig_bound_sq`.
    pub sig_bound_sq: u64,

    /// Encoded public key size in bytes.
    pub pk_bytes: usize,

    /// Fixed size of a padded-format signature.
    pub padded_sig_bytes: usize,

    /// Fixed size of a constant-time-format signature.
    pub ct_sig_bytes: usize,

    /// Bits per coefficient in the constant-time payload.
    pub ct_bits: usize,
}

impl Params {
    /// Returns the polynomial degree n.
    #[inline]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// The degree tag written in key and signature headers.
    #[inline]
    pub const fn degree_tag(&self) -> u8 {
        self.log_n
    }

    /// Length of the packed coefficient block of a public key.
    #[inline]
    pub const fn pk_coeff_bytes(&self) -> usize {
        (Q_BITS * self.n + 7) / 8
    }

    /// Length of the constant-time payload.
    #[inline]
    pub const fn ct_payload_bytes(&self) -> usize {
        (self.ct_bits * self.n + 7) / 8
    }

    /// Looks up the parameter set for degree `n`.
    pub fn for_degree(n: usize) -> Result<&'static Params> {
        PARAMETER_SETS
            .iter()
            .find(|p| p.n == n)
            .ok_or(WireError::Format {
                field: "degree",
                reason: "unsupported polynomial degree",
            })
    }

    /// Looks up the parameter set for a degree tag (`log2 n`).
    pub fn for_log_n(log_n: u8) -> Result<&'static Params> {
        PARAMETER_SETS
            .iter()
            .find(|p| p.log_n == log_n)
            .ok_or(WireError::Format {
                field: "degree tag",
                reason: "unrecognized degree tag",
            })
    }
}

/// FALCON-512 parameters (NIST Level 1).
pub const FALCON_512: Params = Params {
    n: 512,
    log_n: 9,
    // floor(beta^2 * 2n * sigma^2) with beta = 1.1, sigma ~ 165.74
    sig_bound_sq: 34_034_726,
    pk_bytes: 897,
    padded_sig_bytes: 666,
    ct_sig_bytes: 809,
    ct_bits: 12,
};

/// FALCON-1024 parameters (NIST Level 5).
pub const FALCON_1024: Params = Params {
    n: 1024,
    log_n: 10,
    sig_bound_sq: 70_265_242,
    pk_bytes: 1793,
    padded_sig_bytes: 1280,
    ct_sig_bytes: 1577,
    ct_bits: 12,
};

/// Every supported parameter set, by increasing degree.
pub static PARAMETER_SETS: [Params; 2] = [FALCON_512, FALCON_1024];

/// Size limits enforced by the deployed ledger contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerLimits {
    /// Degree of the keys the contract verifies; the signature length
    /// limits only bind signatures of this degree.
    pub degree: usize,
    /// Smallest signature the contract looks at.
    pub min_signature_len: usize,
    /// Largest signature the contract copies in.
    pub max_signature_len: usize,
    /// Messages past this length are truncated by the contract.
    pub max_message_len: usize,
}

impl LedgerLimits {
    /// Checks message and signature sizes against the contract's caps.
    pub fn check(&self, params: &Params, message_len: usize, signature_len: usize) -> Result<()> {
        if message_len > self.max_message_len {
            return Err(WireError::Format {
                field: "message",
                reason: "longer than the ledger accepts",
            });
        }
        self.check_signature(params, signature_len)
    }

    /// Checks only the signature length; it binds signatures of `degree`.
    pub fn check_signature(&self, params: &Params, signature_len: usize) -> Result<()> {
        if params.n == self.degree
            && !(self.min_signature_len..=self.max_signature_len).contains(&signature_len)
        {
            return Err(WireError::Format {
                field: "signature",
                reason: "length outside the ledger's accepted range",
            });
        }
        Ok(())
    }

    /// The prefix of `message` the contract actually hashes.
    pub fn truncate_message<'a>(&self, message: &'a [u8]) -> &'a [u8] {
        &message[..message.len().min(self.max_message_len)]
    }
}

/// Limits of the Soroban FALCON-512 verifier contract.
pub const SOROBAN_LIMITS: LedgerLimits = LedgerLimits {
    degree: 512,
    min_signature_len: 42,
    max_signature_len: 700,
    max_message_len: 4096,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falcon_512_params() {
        assert_eq!(FALCON_512.n, 512);
        assert_eq!(FALCON_512.degree_tag(), 0x09);
        assert_eq!(FALCON_512.pk_bytes, 897);
        assert_eq!(HEADER_LEN + FALCON_512.pk_coeff_bytes(), FALCON_512.pk_bytes);
        assert_eq!(
            HEADER_LEN + SALT_LEN + FALCON_512.ct_payload_bytes(),
            FALCON_512.ct_sig_bytes
        );
    }

    #[test]
    fn test_falcon_1024_params() {
        assert_eq!(FALCON_1024.n, 1024);
        assert_eq!(FALCON_1024.degree_tag(), 0x0A);
        assert_eq!(HEADER_LEN + FALCON_1024.pk_coeff_bytes(), FALCON_1024.pk_bytes);
        assert_eq!(
            HEADER_LEN + SALT_LEN + FALCON_1024.ct_payload_bytes(),
            FALCON_1024.ct_sig_bytes
        );
    }

    #[test]
    fn test_lookup() {
        assert_eq!(Params::for_degree(512).unwrap(), &FALCON_512);
        assert_eq!(Params::for_log_n(10).unwrap(), &FALCON_1024);
        assert!(Params::for_degree(256).is_err());
        assert!(Params::for_log_n(0x0F).is_err());
    }

    #[test]
    fn test_modulus() {
        // q = 12289 = 3 * 2^12 + 1, fits in 14 bits
        assert_eq!(Q, 3 * 4096 + 1);
        assert!(Q < 1 << Q_BITS);
    }

    #[test]
    fn test_ledger_limits() {
        let limits = SOROBAN_LIMITS;
        assert!(limits.check(&FALCON_512, 0, 666).is_ok());
        assert!(limits.check(&FALCON_512, 4096, 42).is_ok());
        assert!(limits.check(&FALCON_512, 4097, 666).unwrap_err().is_format());
        assert!(limits.check(&FALCON_512, 10, 41).is_err());
        // A constant-time FALCON-512 signature does not fit the contract
        assert!(limits.check(&FALCON_512, 10, FALCON_512.ct_sig_bytes).is_err());
        // Only the message cap applies to other degrees
        assert!(limits.check(&FALCON_1024, 10, FALCON_1024.padded_sig_bytes).is_ok());
        assert!(limits.check(&FALCON_1024, 5000, 1280).is_err());
        assert!(limits.check_signature(&FALCON_1024, 1280).is_ok());
        assert!(limits.check_signature(&FALCON_512, 701).is_err());
    }

    #[test]
    fn test_truncate_message() {
        let long = vec![7u8; 5000];
        assert_eq!(SOROBAN_LIMITS.truncate_message(&long).len(), 4096);
        assert_eq!(SOROBAN_LIMITS.truncate_message(b"short"), b"short");
        assert_eq!(SOROBAN_LIMITS.truncate_message(&long[..4096]).len(), 4096);
    }

    #[test]
    fn test_n_is_power_of_two() {
        for p in PARAMETER_SETS.iter() {
            assert!(p.n.is_power_of_two());
            assert_eq!(1usize << p.log_n, p.n);
        }
    }
}
