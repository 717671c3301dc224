//! NIST PQC API framing.
//!
//! The reference `crypto_sign` emits attached signatures:
//!
//! ```text
//! sm = sig_len (2 bytes, big-endian) || nonce (40) || message (mlen) || sig_data (sig_len)
//! sig_data = header || body
//! ```
//!
//! The detached wire format the ledger expects is `header || nonce || body`.
//! NIST public keys already use the wire layout.

use crate::error::{Result, WireError};
use crate::params::SALT_LEN;

/// Bytes in front of the nonce.
const LEN_PREFIX: usize = 2;

/// Splits an attached signature into `(message, detached signature)`.
pub fn parse_nist_signed_message(sm: &[u8], mlen: usize) -> Result<(Vec<u8>, Vec<u8>)> {
    let fixed = LEN_PREFIX + SALT_LEN;
    if sm.len() < fixed + mlen {
        return Err(WireError::Format {
            field: "signed message",
            reason: "shorter than length prefix, nonce and message",
        });
    }

    let sig_len = u16::from_be_bytes([sm[0], sm[1]]) as usize;
    let nonce = &sm[LEN_PREFIX..fixed];
    let message = &sm[fixed..fixed + mlen];
    let sig_data = &sm[fixed + mlen..];

    if sig_data.len() != sig_len {
        return Err(WireError::Format {
            field: "signed message",
            reason: "signature length prefix does not match trailing data",
        });
    }
    let (&header, body) = sig_data.split_first().ok_or(WireError::Format {
        field: "signed message",
        reason: "missing signature header",
    })?;

    let mut sig = Vec::with_capacity(1 + SALT_LEN + body.len());
    sig.push(header);
    sig.extend_from_slice(nonce);
    sig.extend_from_slice(body);

    Ok((message.to_vec(), sig))
}

/// One record of a `.rsp` known-answer file, hex fields decoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KatVector {
    /// Record index.
    pub count: usize,
    /// Message.
    pub msg: Vec<u8>,
    /// Public key.
    pub pk: Vec<u8>,
    /// Attached signature.
    pub sm: Vec<u8>,
}

impl KatVector {
    /// The detached signature carried in `sm`.
    pub fn detached_signature(&self) -> Result<Vec<u8>> {
        let (message, sig) = parse_nist_signed_message(&self.sm, self.msg.len())?;
        if message != self.msg {
            return Err(WireError::Format {
                field: "signed message",
                reason: "embedded message differs from msg field",
            });
        }
        Ok(sig)
    }
}

fn decode_hex_field(value: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|_| WireError::Format {
        field: "kat record",
        reason: "invalid hex",
    })
}

/// Parses `key = value` records separated by blank or `#` lines.
///
/// Records missing `pk`, `sm` or `msg` are skipped.
pub fn parse_kat_file(content: &str) -> Result<Vec<KatVector>> {
    let mut vectors = Vec::new();
    let mut current: Option<KatVector> = None;
    let mut complete = [false; 3];

    let mut flush = |current: &mut Option<KatVector>, complete: &mut [bool; 3]| {
        if let Some(v) = current.take() {
            if complete.iter().all(|&c| c) {
                vectors.push(v);
            }
        }
        *complete = [false; 3];
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            flush(&mut current, &mut complete);
            continue;
        }
        let Some((key, value)) = line.split_once(" = ") else {
            continue;
        };
        let value = value.trim();
        let v = current.get_or_insert_with(KatVector::default);
        match key.trim() {
            "count" => {
                v.count = value.parse().map_err(|_| WireError::Format {
                    field: "kat record",
                    reason: "count is not a number",
                })?
            }
            "msg" => {
                v.msg = decode_hex_field(value)?;
                complete[0] = true;
            }
            "pk" => {
                v.pk = decode_hex_field(value)?;
                complete[1] = true;
            }
            "sm" => {
                v.sm = decode_hex_field(value)?;
                complete[2] = true;
            }
            _ => {}
        }
    }
    flush(&mut current, &mut complete);

    Ok(vectors)
}
