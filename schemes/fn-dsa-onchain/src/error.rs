//! Error types for the on-chain FN-DSA (FALCON) codecs and pipeline.

use std::fmt;
use thiserror::Error;

/// Pipeline stage at which an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Key pair generation by the primitives library.
    KeyGen,
    /// Packing the public key polynomial.
    EncodePublicKey,
    /// Unpacking a public key received from the wire.
    DecodePublicKey,
    /// Signing by the primitives library.
    Sign,
    /// Splitting the signature into header, salt and payload.
    ParseSignature,
    /// Decoding the payload into `s1`.
    DecompressPayload,
    /// Hashing message and salt to a point.
    HashToPoint,
    /// Squared norm against the bound.
    NormCheck,
    /// Cross-check against the reference verifier.
    ReferenceVerify,
    /// Contract-side size limits.
    LedgerLimits,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::KeyGen => "key generation",
            Stage::EncodePublicKey => "public key encoding",
            Stage::DecodePublicKey => "public key decoding",
            Stage::Sign => "signing",
            Stage::ParseSignature => "signature parsing",
            Stage::DecompressPayload => "payload decompression",
            Stage::HashToPoint => "hash-to-point",
            Stage::NormCheck => "norm check",
            Stage::ReferenceVerify => "reference verification",
            Stage::LedgerLimits => "ledger limits",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while encoding, decoding or checking signatures.
#[derive(Debug, Error)]
pub enum WireError {
    /// Malformed header, wrong buffer length or unknown tag.
    #[error("invalid {field}: {reason}")]
    Format {
        /// The field that was invalid.
        field: &'static str,
        /// Description of why the input is invalid.
        reason: &'static str,
    },

    /// The compressed payload does not decode to exactly `n` coefficients.
    #[error("decoding error: {context}")]
    Decode {
        /// Context about what was being decoded.
        context: &'static str,
    },

    /// Modular polynomial arithmetic could not be carried out.
    #[error("arithmetic error: {reason}")]
    Arithmetic {
        /// Description of the failure.
        reason: &'static str,
    },

    /// The local check disagrees with the signer or the reference verifier.
    #[error("integrity failure during {stage}: {reason}")]
    Integrity {
        /// Stage where the inconsistency surfaced.
        stage: Stage,
        /// Description of the inconsistency.
        reason: String,
    },

    /// The primitives library rejected its own output.
    #[error("primitive failure during {stage}: {reason}")]
    Primitive {
        /// Stage that invoked the library.
        stage: Stage,
        /// Description of the failure.
        reason: &'static str,
    },

    /// A codec error raised inside a named pipeline stage.
    #[error("{stage} failed: {source}")]
    Stage {
        /// The failing stage.
        stage: Stage,
        /// The underlying error.
        #[source]
        source: Box<WireError>,
    },
}

impl WireError {
    /// Attaches the pipeline stage to a codec error.
    ///
    /// Errors that already carry a stage are returned unchanged.
    pub fn at(self, stage: Stage) -> WireError {
        match self {
            WireError::Integrity { .. } | WireError::Primitive { .. } | WireError::Stage { .. } => {
                self
            }
            other => WireError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Returns the stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            WireError::Integrity { stage, .. }
            | WireError::Primitive { stage, .. }
            | WireError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the innermost error, skipping stage wrappers.
    pub fn root(&self) -> &WireError {
        match self {
            WireError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for malformed headers, lengths and tags.
    pub fn is_format(&self) -> bool {
        matches!(self.root(), WireError::Format { .. })
    }

    /// True when a payload failed to decode.
    pub fn is_decode(&self) -> bool {
        matches!(self.root(), WireError::Decode { .. })
    }

    /// True for fatal internal inconsistencies.
    pub fn is_integrity(&self) -> bool {
        matches!(self.root(), WireError::Integrity { .. })
    }
}

/// Result type alias for codec and pipeline operations.
pub type Result<T> = std::result::Result<T, WireError>;
