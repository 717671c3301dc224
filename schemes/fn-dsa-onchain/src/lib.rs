//! # pqsigs-fn-dsa-onchain
//!
//! Wire codecs and verification for FN-DSA (FALCON) signatures destined for
//! an on-chain verifier.
//!
//! ## Overview
//!
//! A ledger contract that verifies FALCON signatures sees three byte
//! strings: a public key, a message and a signature. This crate owns the
//! bit-exact layouts of those strings and the verification predicate the
//! contract evaluates, so that a signer can check its output locally
//! before paying to submit it.
//!
//! - [`packing`]: public key `h` as a degree tag plus 14-bit coefficients
//! - [`signature`]: header, salt and compressed / padded / constant-time
//!   payloads
//! - [`norm`]: `||s0||^2 + ||s1||^2` against the parameter set's bound
//! - [`verify`]: the full predicate, with the contract's signature cap and message truncation
//! - [`pipeline`]: key generation and signing through `pqcrypto-falcon`,
//!   cross-checked stage by stage
//! - [`nist`]: NIST attached-signature framing and KAT files
//!
//! ## Parameter Sets
//!
//! - [`params::FALCON_512`]: n = 512, 897-byte public keys
//! - [`params::FALCON_1024`]: n = 1024, 1793-byte public keys
//!
//! ## Security Warning
//!
//! Everything here operates on public data. Key generation and signing are
//! delegated to `pqcrypto-falcon`; this crate does not produce signatures
//! itself and has not been audited.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod field;
pub mod hash;
pub mod nist;
pub mod norm;
pub mod packing;
pub mod params;
pub mod pipeline;
pub mod poly;
pub mod signature;
pub mod verify;

pub use error::{Result, Stage, WireError};
pub use norm::{check_norm, NormCheck, Verdict};
pub use params::{LedgerLimits, Params, FALCON_1024, FALCON_512, SOROBAN_LIMITS};
pub use pipeline::{
    Falcon1024, Falcon512, FalconPadded1024, FalconPadded512, KeyMaterial, LedgerTarget,
    SignatureScheme, SubmissionArtifact, VerificationPipeline,
};
pub use verify::{inspect_signature, inspect_signature_with, verify, verify_bool, VerificationInfo};

// Re-export codec functions
pub use hash::hash_to_point;
pub use nist::parse_nist_signed_message;
pub use packing::{decode_public_key, encode_public_key, PublicKey};
pub use signature::{
    compress_payload, decompress_payload, parse_signature, ParsedSignature, SignatureFormat,
    SignatureHeader,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_available() {
        assert_eq!(FALCON_512.n, 512);
        assert_eq!(FALCON_1024.n, 1024);
    }

    #[test]
    fn test_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PublicKey>();
        assert_send_sync::<VerificationInfo>();
        assert_send_sync::<WireError>();
        assert_send_sync::<VerificationPipeline<Falcon512>>();
    }
}
