//! Sign-and-prepare pipeline for ledger submission.
//!
//! A [`VerificationPipeline`] drives an external FALCON implementation
//! through key generation and signing, then re-derives every wire-level
//! quantity locally before handing out an artifact:
//!
//! 1. KeyGen, then unpack h from the library's public key bytes
//! 2. Re-encode h and require byte equality with the library's key
//! 3. Sign, then check the signature against the ledger size limits
//! 4. Parse, decompress, hash-to-point and check the norm locally
//! 5. Cross-check with the library's own verifier
//!
//! Any disagreement between the local predicate and the library is an
//! [`WireError::Integrity`] and no artifact is produced.

use log::{debug, info, warn};
use pqcrypto_traits::sign::{
    DetachedSignature as _, PublicKey as _, SecretKey as _, SignedMessage as _,
};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::{Result, Stage, WireError};
use crate::hash::hash_to_point;
use crate::packing::{decode_public_key, encode_public_key};
use crate::params::{LedgerLimits, Params, FALCON_1024, FALCON_512, SOROBAN_LIMITS};
use crate::poly::Poly;
use crate::verify::{inspect_signature_with, VerificationInfo};

// ============================================================================
// Signature Scheme Seam
// ============================================================================

/// Key pair as produced by a [`SignatureScheme`].
pub struct KeyMaterial {
    /// Public key in the wire layout.
    pub public_key: Vec<u8>,
    /// Secret key bytes, wiped on drop.
    pub secret_key: Zeroizing<Vec<u8>>,
}

impl KeyMaterial {
    /// Unpacks the public key polynomial h into Z_q.
    pub fn public_key_polynomial(&self) -> Result<Poly> {
        decode_public_key(&self.public_key)?.to_ring()
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key_len", &self.public_key.len())
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// The primitives a pipeline needs from a FALCON implementation.
pub trait SignatureScheme {
    /// Parameter set of the keys and signatures this scheme produces.
    fn params(&self) -> &'static Params;

    /// Generates a fresh key pair.
    fn keypair(&self) -> Result<KeyMaterial>;

    /// Produces a detached signature (`header || salt || payload`).
    fn sign(&self, message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>>;

    /// Produces a NIST attached signature (`sm`).
    fn sign_attached(&self, message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>>;

    /// The library's own verdict on a detached signature.
    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool>;

    /// Hash-to-point for this scheme's degree. The pipeline's local
    /// predicate hashes through this method.
    fn hash_to_point(&self, message: &[u8], salt: &[u8]) -> Poly {
        hash_to_point(message, salt, self.params())
    }
}

macro_rules! pqcrypto_scheme {
    ($(#[$doc:meta])* $name:ident, $module:ident, $params:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl SignatureScheme for $name {
            fn params(&self) -> &'static Params {
                &$params
            }

            fn keypair(&self) -> Result<KeyMaterial> {
                let (pk, sk) = pqcrypto_falcon::$module::keypair();
                Ok(KeyMaterial {
                    public_key: pk.as_bytes().to_vec(),
                    secret_key: Zeroizing::new(sk.as_bytes().to_vec()),
                })
            }

            fn sign(&self, message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
                let sk = pqcrypto_falcon::$module::SecretKey::from_bytes(secret_key).map_err(|_| {
                    WireError::Primitive {
                        stage: Stage::Sign,
                        reason: "secret key bytes rejected by library",
                    }
                })?;
                let sig = pqcrypto_falcon::$module::detached_sign(message, &sk);
                Ok(sig.as_bytes().to_vec())
            }

            fn sign_attached(&self, message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
                let sk = pqcrypto_falcon::$module::SecretKey::from_bytes(secret_key).map_err(|_| {
                    WireError::Primitive {
                        stage: Stage::Sign,
                        reason: "secret key bytes rejected by library",
                    }
                })?;
                let sm = pqcrypto_falcon::$module::sign(message, &sk);
                Ok(sm.as_bytes().to_vec())
            }

            fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool> {
                let pk = pqcrypto_falcon::$module::PublicKey::from_bytes(public_key).map_err(|_| {
                    WireError::Primitive {
                        stage: Stage::ReferenceVerify,
                        reason: "public key bytes rejected by library",
                    }
                })?;
                let sig = match pqcrypto_falcon::$module::DetachedSignature::from_bytes(signature) {
                    Ok(sig) => sig,
                    Err(_) => return Ok(false),
                };
                Ok(pqcrypto_falcon::$module::verify_detached_signature(&sig, message, &pk).is_ok())
            }
        }
    };
}

pqcrypto_scheme!(
    /// FALCON-512 with compressed detached signatures (header `0x39`).
    Falcon512,
    falcon512,
    FALCON_512
);

pqcrypto_scheme!(
    /// FALCON-1024 with compressed detached signatures (header `0x3A`).
    Falcon1024,
    falcon1024,
    FALCON_1024
);

pqcrypto_scheme!(
    /// FALCON-512 with detached signatures zero-padded to 666 bytes.
    FalconPadded512,
    falconpadded512,
    FALCON_512
);

pqcrypto_scheme!(
    /// FALCON-1024 with detached signatures zero-padded to 1280 bytes.
    FalconPadded1024,
    falconpadded1024,
    FALCON_1024
);

// ============================================================================
// Artifact
// ============================================================================

/// Hex triple ready for the ledger's `verify(public_key, message, signature)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionArtifact {
    /// Encoded public key.
    pub public_key_hex: String,
    /// Message bytes.
    pub message_hex: String,
    /// Detached signature.
    pub signature_hex: String,
    /// Local verification details.
    pub verification: VerificationInfo,
    /// Both the local predicate and the library's verifier accepted.
    pub verified: bool,
}

/// Where and as whom to invoke the ledger contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerTarget {
    /// Deployed verifier contract.
    pub contract_id: String,
    /// Account that submits the transaction.
    pub source: String,
    /// Network name.
    pub network: String,
}

/// The FALCON-512 verifier deployed on Stellar testnet.
pub const TESTNET_CONTRACT_ID: &str = "CCUXVGY7ABTWKKAMOJNUD536D7KVVEPG5DXA7SSALSSB3O7OAU3TL57S";

impl Default for LedgerTarget {
    fn default() -> Self {
        LedgerTarget {
            contract_id: TESTNET_CONTRACT_ID.to_string(),
            source: "alice".to_string(),
            network: "testnet".to_string(),
        }
    }
}

impl SubmissionArtifact {
    /// `stellar contract invoke` command that runs the on-chain verify.
    pub fn invoke_command(&self, target: &LedgerTarget) -> String {
        format!(
            "stellar contract invoke \\\n    --id {} \\\n    --source {} \\\n    --network {} \\\n    -- \\\n    verify \\\n    --public_key {} \\\n    --message {} \\\n    --signature {}",
            target.contract_id,
            target.source,
            target.network,
            self.public_key_hex,
            self.message_hex,
            self.signature_hex
        )
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Runs a [`SignatureScheme`] and checks its output against the wire codecs.
#[derive(Clone, Debug)]
pub struct VerificationPipeline<S> {
    scheme: S,
    limits: LedgerLimits,
}

impl<S: SignatureScheme> VerificationPipeline<S> {
    /// Pipeline bound by the deployed contract's limits.
    pub fn new(scheme: S) -> Self {
        Self::with_limits(scheme, SOROBAN_LIMITS)
    }

    /// Pipeline with custom ledger limits.
    pub fn with_limits(scheme: S, limits: LedgerLimits) -> Self {
        VerificationPipeline { scheme, limits }
    }

    /// The wrapped scheme.
    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Generates a key pair, signs `message` and returns a checked artifact.
    pub fn sign_and_prepare(&self, message: &[u8]) -> Result<SubmissionArtifact> {
        let params = self.scheme.params();
        if message.len() > self.limits.max_message_len {
            return Err(WireError::Format {
                field: "message",
                reason: "longer than the ledger accepts",
            }
            .at(Stage::LedgerLimits));
        }

        debug!("generating FALCON-{} key pair", params.n);
        let keys = self.scheme.keypair().map_err(|e| e.at(Stage::KeyGen))?;
        self.prepare_with_keys(&keys, message)
    }

    /// Same as [`sign_and_prepare`](Self::sign_and_prepare) with an existing key pair.
    pub fn prepare_with_keys(
        &self,
        keys: &KeyMaterial,
        message: &[u8],
    ) -> Result<SubmissionArtifact> {
        let params = self.scheme.params();

        let pk = decode_public_key(&keys.public_key).map_err(|e| {
            integrity(Stage::KeyGen, format!("library public key does not decode: {}", e))
        })?;
        if pk.params != params {
            return Err(integrity(
                Stage::KeyGen,
                format!("library produced a FALCON-{} key", pk.params.n),
            ));
        }
        let h = pk
            .to_ring()
            .map_err(|e| integrity(Stage::KeyGen, format!("public key is not reduced: {}", e)))?;

        let encoded =
            encode_public_key(&pk.h, params.n).map_err(|e| e.at(Stage::EncodePublicKey))?;
        if encoded != keys.public_key {
            return Err(integrity(
                Stage::EncodePublicKey,
                "re-encoded public key differs from library bytes".to_string(),
            ));
        }
        debug!("public key: {} bytes, round trip ok", encoded.len());

        let signature = self
            .scheme
            .sign(message, &keys.secret_key)
            .map_err(|e| e.at(Stage::Sign))?;
        debug!(
            "signature: {} bytes, header {:#04x}",
            signature.len(),
            signature.first().copied().unwrap_or(0)
        );

        self.limits
            .check(params, message.len(), signature.len())
            .map_err(|e| e.at(Stage::LedgerLimits))?;

        let verification = self.check_submission(&h, &keys.public_key, message, &signature)?;
        info!(
            "FALCON-{} signature accepted: squared norm {} / bound {}",
            params.n, verification.norm.squared_norm, verification.norm.bound
        );

        Ok(SubmissionArtifact {
            public_key_hex: hex::encode(&encoded),
            message_hex: hex::encode(message),
            signature_hex: hex::encode(&signature),
            verification,
            verified: true,
        })
    }

    /// Runs the local predicate and the library verifier on one signature.
    ///
    /// A local rejection or any disagreement is an integrity error.
    pub fn check_submission(
        &self,
        h: &Poly,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<VerificationInfo> {
        let params = self.scheme.params();
        let info = inspect_signature_with(h, params, message, signature, |m, salt| {
            self.scheme.hash_to_point(m, salt)
        })?;
        if !info.accepted() {
            return Err(integrity(
                Stage::NormCheck,
                format!(
                    "squared norm {} exceeds bound {}",
                    info.norm.squared_norm, info.norm.bound
                ),
            ));
        }

        let reference = self
            .scheme
            .verify(message, signature, public_key)
            .map_err(|e| e.at(Stage::ReferenceVerify))?;
        if !reference {
            return Err(integrity(
                Stage::ReferenceVerify,
                "reference verifier rejected a locally accepted signature".to_string(),
            ));
        }

        Ok(info)
    }
}

fn integrity(stage: Stage, reason: String) -> WireError {
    warn!("integrity failure during {}: {}", stage, reason);
    WireError::Integrity { stage, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_params() {
        assert_eq!(Falcon512.params().n, 512);
        assert_eq!(Falcon1024.params().n, 1024);
        assert_eq!(FalconPadded512.params(), &FALCON_512);
    }

    #[test]
    fn test_keypair_sizes() {
        let keys = Falcon512.keypair().unwrap();
        assert_eq!(keys.public_key.len(), 897);
        assert_eq!(keys.public_key[0], 0x09);
        assert_eq!(keys.public_key_polynomial().unwrap().len(), 512);
        assert!(!format!("{:?}", keys).contains(&hex::encode(&keys.secret_key[..8])));
    }

    #[test]
    fn test_sign_and_prepare() {
        let pipeline = VerificationPipeline::new(Falcon512);
        let artifact = pipeline.sign_and_prepare(b"test").unwrap();
        assert!(artifact.verification.accepted());
        assert!(artifact.verified);
        assert_eq!(artifact.message_hex, "74657374");
        assert_eq!(artifact.public_key_hex.len(), 2 * 897);
        assert!(artifact.signature_hex.starts_with("39"));
    }

    #[test]
    fn test_message_over_limit() {
        let pipeline = VerificationPipeline::new(Falcon512);
        let err = pipeline.sign_and_prepare(&vec![0u8; 4097]).unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.stage(), Some(Stage::LedgerLimits));
    }

    #[test]
    fn test_invoke_command() {
        let artifact = VerificationPipeline::new(Falcon512)
            .sign_and_prepare(b"Hello from Rust Falcon!")
            .unwrap();
        let cmd = artifact.invoke_command(&LedgerTarget::default());
        assert!(cmd.starts_with("stellar contract invoke"));
        assert!(cmd.contains(&format!("--id {}", TESTNET_CONTRACT_ID)));
        assert!(cmd.contains("--source alice"));
        assert!(cmd.contains(&format!("--signature {}", artifact.signature_hex)));
    }
}
