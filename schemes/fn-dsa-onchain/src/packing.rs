//! Public key packing for the on-chain wire format.
//!
//! Layout (bit-exact with the FALCON reference encoding):
//! - 1 byte: degree tag (`log2 n`, `0x09` for FALCON-512)
//! - ceil(14n / 8) bytes: coefficients of h, 14 bits each, MSB-first,
//!   with the final partial byte right-padded with zero bits
//!
//! The MSB-first bit writer and reader here are shared with the signature
//! payload codecs.

use crate::error::{Result, WireError};
use crate::field::Zq;
use crate::params::{Params, HEADER_LEN, Q_BITS};
use crate::poly::Poly;

// ============================================================================
// Bit I/O
// ============================================================================

/// MSB-first bit accumulator.
pub(crate) struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    acc_len: u32,
}

impl BitWriter {
    pub(crate) fn with_capacity(bytes: usize) -> Self {
        BitWriter {
            out: Vec::with_capacity(bytes),
            acc: 0,
            acc_len: 0,
        }
    }

    /// Appends the low `bits` bits of `value` (at most 16 at a time).
    pub(crate) fn push(&mut self, value: u32, bits: u32) {
        debug_assert!(bits <= 16);
        if bits == 0 {
            return;
        }
        self.acc = (self.acc << bits) | (value & ((1u32 << bits) - 1));
        self.acc_len += bits;
        while self.acc_len >= 8 {
            self.acc_len -= 8;
            self.out.push((self.acc >> self.acc_len) as u8);
        }
        self.acc &= (1u32 << self.acc_len) - 1;
    }

    /// Flushes the pending bits, zero-padding the low end of the last byte.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        if self.acc_len > 0 {
            self.out.push((self.acc << (8 - self.acc_len)) as u8);
        }
        self.out
    }
}

/// MSB-first bit cursor over a byte slice.
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        BitReader { data, pos: 0 }
    }

    pub(crate) fn read_bit(&mut self) -> Option<u32> {
        let byte = *self.data.get(self.pos / 8)?;
        let bit = (byte >> (7 - self.pos % 8)) & 1;
        self.pos += 1;
        Some(bit as u32)
    }

    pub(crate) fn read_bits(&mut self, bits: u32) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..bits {
            value = (value << 1) | self.read_bit()?;
        }
        Some(value)
    }

    /// Number of bytes touched so far, counting a partially read byte.
    pub(crate) fn bytes_consumed(&self) -> usize {
        (self.pos + 7) / 8
    }

    /// True when the unread bits of the current byte are all zero.
    pub(crate) fn pad_bits_are_zero(&self) -> bool {
        let used = self.pos % 8;
        if used == 0 {
            return true;
        }
        let byte = self.data[self.pos / 8];
        byte & ((1u8 << (8 - used)) - 1) == 0
    }
}

// ============================================================================
// Public Key
// ============================================================================

/// A FALCON public key: the polynomial h = g/f mod q and its parameter set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    /// Parameter set selected by the degree tag.
    pub params: &'static Params,
    /// Raw 14-bit coefficients of h.
    pub h: Vec<u16>,
}

impl PublicKey {
    /// Builds a key from raw coefficients; `h.len()` selects the degree.
    pub fn new(h: Vec<u16>) -> Result<Self> {
        let params = Params::for_degree(h.len())?;
        Ok(PublicKey { params, h })
    }

    /// Builds a key from a ring polynomial.
    pub fn from_ring(h: &Poly) -> Result<Self> {
        PublicKey::new(h.to_u16())
    }

    /// Polynomial degree n.
    pub fn n(&self) -> usize {
        self.params.n
    }

    /// Encodes to the wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_public_key(&self.h, self.params.n)
    }

    /// Lifts h into Z_q, rejecting coefficients >= q.
    pub fn to_ring(&self) -> Result<Poly> {
        self.h
            .iter()
            .map(|&c| {
                Zq::from_reduced(c).ok_or(WireError::Format {
                    field: "public_key",
                    reason: "coefficient not reduced mod q",
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Poly::from_zq)
    }
}

/// Packs `h` into `1 + ceil(14n / 8)` bytes.
pub fn encode_public_key(h: &[u16], n: usize) -> Result<Vec<u8>> {
    let params = Params::for_degree(n)?;
    if h.len() != n {
        return Err(WireError::Format {
            field: "public_key",
            reason: "coefficient count does not match degree",
        });
    }
    if h.iter().any(|&c| c >> Q_BITS != 0) {
        return Err(WireError::Format {
            field: "public_key",
            reason: "coefficient does not fit in 14 bits",
        });
    }

    let mut writer = BitWriter::with_capacity(params.pk_bytes);
    writer.push(params.degree_tag() as u32, 8);
    for &coeff in h {
        writer.push(coeff as u32, Q_BITS as u32);
    }

    let bytes = writer.finish();
    debug_assert_eq!(bytes.len(), params.pk_bytes);
    Ok(bytes)
}

/// Unpacks a public key, deriving n from the degree tag.
pub fn decode_public_key(bytes: &[u8]) -> Result<PublicKey> {
    let (&tag, body) = bytes.split_first().ok_or(WireError::Format {
        field: "public_key",
        reason: "empty buffer",
    })?;

    let params = Params::for_log_n(tag).map_err(|_| WireError::Format {
        field: "public_key",
        reason: "unrecognized degree tag",
    })?;

    if bytes.len() != params.pk_bytes {
        return Err(WireError::Format {
            field: "public_key",
            reason: "length does not match degree tag",
        });
    }
    debug_assert_eq!(body.len() + HEADER_LEN, params.pk_bytes);

    let mut reader = BitReader::new(body);
    let mut h = Vec::with_capacity(params.n);
    for _ in 0..params.n {
        let coeff = reader.read_bits(Q_BITS as u32).ok_or(WireError::Format {
            field: "public_key",
            reason: "truncated coefficient block",
        })?;
        h.push(coeff as u16);
    }

    if !reader.pad_bits_are_zero() {
        return Err(WireError::Format {
            field: "public_key",
            reason: "non-zero padding bits",
        });
    }

    Ok(PublicKey { params, h })
}
