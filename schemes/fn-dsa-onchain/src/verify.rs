//! Verification against the on-chain wire format.
//!
//! This is the predicate the ledger contract evaluates:
//! 1. Decode the public key and lift h into Z_q
//! 2. Split the signature and require its degree to match the key
//! 3. Enforce the contract's signature size limits and truncate the
//!    message to the prefix the contract hashes
//! 4. Decode s1, recompute c = H(salt || message)
//! 5. Accept iff ||c - s1*h||^2 + ||s1||^2 is within the bound

use log::debug;
use serde::Serialize;

use crate::error::{Result, Stage, WireError};
use crate::hash::hash_to_point;
use crate::norm::{check_norm, NormCheck};
use crate::packing::decode_public_key;
use crate::params::{Params, SOROBAN_LIMITS};
use crate::poly::Poly;
use crate::signature::{parse_signature, ParsedSignature, SignatureFormat};

/// What a verification run saw and concluded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationInfo {
    /// Signature header byte.
    pub header: u8,
    /// Payload format named by the header.
    pub format: SignatureFormat,
    /// Polynomial degree.
    pub n: usize,
    /// Salt, hex encoded.
    pub salt_hex: String,
    /// Total signature length in bytes.
    pub signature_len: usize,
    /// Norm check result.
    #[serde(flatten)]
    pub norm: NormCheck,
    /// Verdict of the norm check as a flag.
    pub accepted: bool,
}

impl VerificationInfo {
    /// True if the norm check accepted the signature.
    #[inline]
    pub fn accepted(&self) -> bool {
        self.accepted
    }
}

fn parse_for<'a>(params: &'static Params, sig: &'a [u8]) -> Result<ParsedSignature<'a>> {
    let parsed = parse_signature(sig).map_err(|e| e.at(Stage::ParseSignature))?;
    if parsed.header.params() != params {
        return Err(WireError::Format {
            field: "signature header",
            reason: "degree does not match the public key",
        }
        .at(Stage::ParseSignature));
    }
    Ok(parsed)
}

/// Runs parse, decompress, hash-to-point and the norm check for a key
/// already lifted into Z_q.
///
/// Rejection by the norm bound is reported in the returned info, not as an
/// error. No ledger limits are applied here.
pub fn inspect_signature(
    h: &Poly,
    params: &'static Params,
    message: &[u8],
    sig: &[u8],
) -> Result<VerificationInfo> {
    inspect_signature_with(h, params, message, sig, |m, salt| {
        hash_to_point(m, salt, params)
    })
}

/// [`inspect_signature`] with a caller-supplied hash-to-point.
pub fn inspect_signature_with<H>(
    h: &Poly,
    params: &'static Params,
    message: &[u8],
    sig: &[u8],
    hash: H,
) -> Result<VerificationInfo>
where
    H: Fn(&[u8], &[u8]) -> Poly,
{
    let parsed = parse_for(params, sig)?;
    let s1 = parsed
        .decompress()
        .map_err(|e| e.at(Stage::DecompressPayload))?;
    let c = hash(message, &parsed.salt[..]);
    if c.len() != params.n {
        return Err(WireError::Format {
            field: "hash point",
            reason: "degree does not match the parameter set",
        }
        .at(Stage::HashToPoint));
    }
    let norm = check_norm(h, &c, &s1, params).map_err(|e| e.at(Stage::NormCheck))?;

    debug!(
        "signature {:#04x} ({}): squared norm {} / bound {}",
        parsed.header.byte(),
        parsed.header.format(),
        norm.squared_norm,
        norm.bound
    );

    Ok(VerificationInfo {
        header: parsed.header.byte(),
        format: parsed.header.format(),
        n: params.n,
        salt_hex: hex::encode(parsed.salt),
        signature_len: sig.len(),
        accepted: norm.is_accepted(),
        norm,
    })
}

/// Verifies wire-format bytes the way the ledger contract does.
///
/// Messages longer than the ledger's cap are truncated to it before
/// hashing, as the contract does.
pub fn verify(public_key: &[u8], message: &[u8], sig: &[u8]) -> Result<VerificationInfo> {
    let pk = decode_public_key(public_key).map_err(|e| e.at(Stage::DecodePublicKey))?;
    let h = pk.to_ring().map_err(|e| e.at(Stage::DecodePublicKey))?;

    // Header and degree are checked before the size caps so that a foreign
    // signature reports its real defect.
    parse_for(pk.params, sig)?;
    SOROBAN_LIMITS
        .check_signature(pk.params, sig.len())
        .map_err(|e| e.at(Stage::LedgerLimits))?;
    let hashed = SOROBAN_LIMITS.truncate_message(message);
    if hashed.len() < message.len() {
        debug!(
            "message truncated from {} to {} bytes",
            message.len(),
            hashed.len()
        );
    }

    inspect_signature(&h, pk.params, hashed, sig)
}

/// Boolean form of [`verify`]: any error or rejection is `false`.
pub fn verify_bool(public_key: &[u8], message: &[u8], sig: &[u8]) -> bool {
    match verify(public_key, message, sig) {
        Ok(info) => info.accepted(),
        Err(e) => {
            debug!("verification failed: {}", e);
            false
        }
    }
}
