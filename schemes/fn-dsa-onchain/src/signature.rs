//! Signature framing and payload codecs.
//!
//! A signature is laid out as:
//! - 1 byte: header, high nibble = format tag, low nibble = `log2 n`
//! - 40 bytes: salt
//! - remaining bytes: payload encoding `s1`
//!
//! Three payload formats are recognized:
//! - compressed (`0x3_`): per coefficient a sign bit, the low 7 bits of
//!   |x|, then |x| >> 7 in unary (zeros closed by a one); |x| <= 2047
//! - padded (`0x2_`): the compressed coding followed by zero bytes up to
//!   a fixed signature length
//! - constant-time (`0x5_`): 12-bit two's complement per coefficient

use std::fmt;

use serde::Serialize;

use crate::error::{Result, WireError};
use crate::packing::{BitReader, BitWriter};
use crate::params::{Params, HEADER_LEN, MAX_COMPRESSED_COEFF, MIN_SIGNATURE_LEN, SALT_LEN};

/// Payload format named by the high nibble of the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureFormat {
    /// Variable-length compressed coding, no trailing data.
    Compressed,
    /// Compressed coding zero-padded to a fixed length.
    Padded,
    /// Fixed-width two's complement coding.
    ConstantTime,
}

impl SignatureFormat {
    /// The header's high nibble for this format.
    pub const fn tag(self) -> u8 {
        match self {
            SignatureFormat::Compressed => 0x30,
            SignatureFormat::Padded => 0x20,
            SignatureFormat::ConstantTime => 0x50,
        }
    }

    /// Maps a header's high nibble (`byte & 0xF0`) back to a format.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x30 => Some(SignatureFormat::Compressed),
            0x20 => Some(SignatureFormat::Padded),
            0x50 => Some(SignatureFormat::ConstantTime),
            _ => None,
        }
    }

    /// Lower-case display name.
    pub const fn name(self) -> &'static str {
        match self {
            SignatureFormat::Compressed => "compressed",
            SignatureFormat::Padded => "padded",
            SignatureFormat::ConstantTime => "constant-time",
        }
    }
}

impl fmt::Display for SignatureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated signature header byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignatureHeader {
    format: SignatureFormat,
    params: &'static Params,
}

impl SignatureHeader {
    /// Header for `format` at the degree of `params`.
    pub fn new(format: SignatureFormat, params: &'static Params) -> Self {
        SignatureHeader { format, params }
    }

    /// Validates a header byte.
    pub fn parse(byte: u8) -> Result<Self> {
        let format = SignatureFormat::from_tag(byte & 0xF0).ok_or(WireError::Format {
            field: "signature header",
            reason: "unrecognized format tag",
        })?;
        let params = Params::for_log_n(byte & 0x0F).map_err(|_| WireError::Format {
            field: "signature header",
            reason: "unsupported degree tag",
        })?;
        Ok(SignatureHeader { format, params })
    }

    /// The encoded header byte.
    pub fn byte(&self) -> u8 {
        self.format.tag() | self.params.degree_tag()
    }

    /// Payload format.
    pub fn format(&self) -> SignatureFormat {
        self.format
    }

    /// Parameter set selected by the degree tag.
    pub fn params(&self) -> &'static Params {
        self.params
    }
}

/// A signature split into its three fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedSignature<'a> {
    /// Validated header.
    pub header: SignatureHeader,
    /// Salt mixed into hash-to-point.
    pub salt: [u8; SALT_LEN],
    /// Encoded `s1`.
    pub payload: &'a [u8],
}

impl ParsedSignature<'_> {
    /// Decodes the payload according to the header.
    pub fn decompress(&self) -> Result<Vec<i16>> {
        decompress_payload(self.payload, self.header.params().n, self.header.format())
    }
}

/// Splits `sig` into header, salt and payload.
pub fn parse_signature(sig: &[u8]) -> Result<ParsedSignature<'_>> {
    if sig.len() < MIN_SIGNATURE_LEN {
        return Err(WireError::Format {
            field: "signature",
            reason: "shorter than header and salt",
        });
    }

    let header = SignatureHeader::parse(sig[0])?;
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&sig[HEADER_LEN..MIN_SIGNATURE_LEN]);

    Ok(ParsedSignature {
        header,
        salt,
        payload: &sig[MIN_SIGNATURE_LEN..],
    })
}

/// Decodes `payload` into exactly `n` signed coefficients.
pub fn decompress_payload(payload: &[u8], n: usize, format: SignatureFormat) -> Result<Vec<i16>> {
    let params = Params::for_degree(n)?;
    match format {
        SignatureFormat::Compressed | SignatureFormat::Padded => decode_compressed(payload, n),
        SignatureFormat::ConstantTime => decode_ct(payload, n, params.ct_bits as u32),
    }
}

fn decode_compressed(payload: &[u8], n: usize) -> Result<Vec<i16>> {
    const TRUNCATED: WireError = WireError::Decode {
        context: "payload ended before n coefficients",
    };

    let mut reader = BitReader::new(payload);
    let mut s1 = Vec::with_capacity(n);

    for _ in 0..n {
        let byte = reader.read_bits(8).ok_or(TRUNCATED)?;
        let negative = byte & 0x80 != 0;
        let mut magnitude = byte & 0x7F;

        while reader.read_bit().ok_or(TRUNCATED)? == 0 {
            magnitude += 128;
            if magnitude > MAX_COMPRESSED_COEFF {
                return Err(WireError::Decode {
                    context: "coefficient magnitude exceeds 2047",
                });
            }
        }

        if negative && magnitude == 0 {
            return Err(WireError::Decode {
                context: "negative zero is not a valid encoding",
            });
        }

        let value = magnitude as i16;
        s1.push(if negative { -value } else { value });
    }

    if !reader.pad_bits_are_zero() {
        return Err(WireError::Decode {
            context: "non-zero bits after last coefficient",
        });
    }
    if payload[reader.bytes_consumed()..].iter().any(|&b| b != 0) {
        return Err(WireError::Decode {
            context: "non-zero bytes after coefficient stream",
        });
    }

    Ok(s1)
}

fn decode_ct(payload: &[u8], n: usize, bits: u32) -> Result<Vec<i16>> {
    if payload.len() != (bits as usize * n + 7) / 8 {
        return Err(WireError::Decode {
            context: "constant-time payload has wrong length",
        });
    }

    let sign_bit = 1i32 << (bits - 1);
    let mut reader = BitReader::new(payload);
    let mut s1 = Vec::with_capacity(n);

    for _ in 0..n {
        let raw = reader.read_bits(bits).ok_or(WireError::Decode {
            context: "payload ended before n coefficients",
        })? as i32;
        let value = if raw & sign_bit != 0 { raw - (sign_bit << 1) } else { raw };
        if value == -sign_bit {
            return Err(WireError::Decode {
                context: "minimum two's complement value is forbidden",
            });
        }
        s1.push(value as i16);
    }

    if !reader.pad_bits_are_zero() {
        return Err(WireError::Decode {
            context: "non-zero bits after last coefficient",
        });
    }

    Ok(s1)
}

// ============================================================================
// Encoders
// ============================================================================

/// Compressed coding of `s1` with no trailing padding.
pub fn compress_payload(s1: &[i16]) -> Result<Vec<u8>> {
    let mut writer = BitWriter::with_capacity(s1.len() * 2);
    for &x in s1 {
        let magnitude = x.unsigned_abs() as u32;
        if magnitude > MAX_COMPRESSED_COEFF {
            return Err(WireError::Format {
                field: "s1",
                reason: "coefficient outside compressible range",
            });
        }
        writer.push((x < 0) as u32, 1);
        writer.push(magnitude & 0x7F, 7);
        writer.push(0, magnitude >> 7);
        writer.push(1, 1);
    }
    Ok(writer.finish())
}

/// Compressed coding of `s1`, zero-padded to exactly `payload_len` bytes.
pub fn compress_payload_padded(s1: &[i16], payload_len: usize) -> Result<Vec<u8>> {
    let mut payload = compress_payload(s1)?;
    if payload.len() > payload_len {
        return Err(WireError::Format {
            field: "s1",
            reason: "compressed coding exceeds padded length",
        });
    }
    payload.resize(payload_len, 0);
    Ok(payload)
}

/// Fixed-width two's complement coding of `s1`; `bits` must be in `2..=16`.
pub fn encode_payload_ct(s1: &[i16], bits: u32) -> Result<Vec<u8>> {
    if !(2..=16).contains(&bits) {
        return Err(WireError::Format {
            field: "bits",
            reason: "constant-time width must be between 2 and 16",
        });
    }
    let limit = (1i32 << (bits - 1)) - 1;
    let mut writer = BitWriter::with_capacity((bits as usize * s1.len() + 7) / 8);
    for &x in s1 {
        if (x as i32).abs() > limit {
            return Err(WireError::Format {
                field: "s1",
                reason: "coefficient outside constant-time range",
            });
        }
        writer.push(x as i32 as u32, bits);
    }
    Ok(writer.finish())
}

/// Concatenates header, salt and payload.
pub fn encode_signature(header: SignatureHeader, salt: &[u8; SALT_LEN], payload: &[u8]) -> Vec<u8> {
    let mut sig = Vec::with_capacity(MIN_SIGNATURE_LEN + payload.len());
    sig.push(header.byte());
    sig.extend_from_slice(salt);
    sig.extend_from_slice(payload);
    sig
}

/// Builds a complete signature of the given format from `s1`.
pub fn build_signature(
    format: SignatureFormat,
    params: &'static Params,
    salt: &[u8; SALT_LEN],
    s1: &[i16],
) -> Result<Vec<u8>> {
    if s1.len() != params.n {
        return Err(WireError::Format {
            field: "s1",
            reason: "coefficient count does not match degree",
        });
    }
    let payload = match format {
        SignatureFormat::Compressed => compress_payload(s1)?,
        SignatureFormat::Padded => {
            compress_payload_padded(s1, params.padded_sig_bytes - MIN_SIGNATURE_LEN)?
        }
        SignatureFormat::ConstantTime => encode_payload_ct(s1, params.ct_bits as u32)?,
    };
    Ok(encode_signature(SignatureHeader::new(format, params), salt, &payload))
}
