//! Canonical RLP codec for transaction bodies.
//!
//! The encoding is the consensus contract between nodes: what gets hashed,
//! signed, stored and gossiped. Field order is fixed:
//!
//! ```text
//! [chain_tag, nonce, block_ref, [clause...], gas_price_coef, gas,
//!  depends_on, [reserved...], signature]
//! clause = [to, value, data]
//! ```
//!
//! Absent optionals (`to`, `depends_on`) are the empty string `0x80`, never
//! skipped, so the element count of a list never depends on its contents.
//! The signing payload is the same list minus the trailing signature.
//!
//! Decoding is strict: non-canonical integers, integers wider than their
//! field, wrong fixed-size lengths, element-count mismatches and trailing
//! garbage are all rejected.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::{BufMut, Decodable, Encodable, Error as RlpError, Header, EMPTY_STRING_CODE};

use super::types::{Clause, ReservedField};

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// The signed payload of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct Body {
    pub(crate) chain_tag: u8,
    pub(crate) nonce: u64,
    pub(crate) block_ref: u64,
    pub(crate) clauses: Vec<Clause>,
    pub(crate) gas_price_coef: u8,
    pub(crate) gas: u64,
    pub(crate) depends_on: Option<B256>,
    pub(crate) reserved: Vec<ReservedField>,
    pub(crate) signature: Bytes,
}

impl Body {
    /// Combined length of every field except the signature, headers
    /// included, list header excluded.
    fn unsigned_fields_len(&self) -> usize {
        self.chain_tag.length()
            + self.nonce.length()
            + self.block_ref.length()
            + list_length(&self.clauses)
            + self.gas_price_coef.length()
            + self.gas.length()
            + optional_length(&self.depends_on)
            + list_length(&self.reserved)
    }

    fn encode_unsigned_fields(&self, out: &mut dyn BufMut) {
        self.chain_tag.encode(out);
        self.nonce.encode(out);
        self.block_ref.encode(out);
        encode_list(&self.clauses, out);
        self.gas_price_coef.encode(out);
        self.gas.encode(out);
        encode_optional(&self.depends_on, out);
        encode_list(&self.reserved, out);
    }

    /// RLP of the body without the signature: the signing pre-image.
    pub(crate) fn signing_payload(&self) -> Vec<u8> {
        let payload_length = self.unsigned_fields_len();
        let header = Header {
            list: true,
            payload_length,
        };
        let mut out = Vec::with_capacity(header.length() + payload_length);
        header.encode(&mut out);
        self.encode_unsigned_fields(&mut out);
        out
    }

    /// Full RLP of the body, signature included.
    pub(crate) fn encoded(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.encode(&mut out);
        out
    }

    fn fields_len(&self) -> usize {
        self.unsigned_fields_len() + self.signature.length()
    }
}

impl Encodable for Body {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.fields_len(),
        }
        .encode(out);
        self.encode_unsigned_fields(out);
        self.signature.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.fields_len();
        Header {
            list: true,
            payload_length,
        }
        .length()
            + payload_length
    }
}

impl Decodable for Body {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let mut fields = open_list(buf)?;
        let body = Self {
            chain_tag: Decodable::decode(&mut fields)?,
            nonce: Decodable::decode(&mut fields)?,
            block_ref: Decodable::decode(&mut fields)?,
            clauses: decode_list(&mut fields)?,
            gas_price_coef: Decodable::decode(&mut fields)?,
            gas: Decodable::decode(&mut fields)?,
            depends_on: decode_optional(&mut fields)?,
            reserved: decode_list(&mut fields)?,
            signature: Decodable::decode(&mut fields)?,
        };
        close_list(fields)?;
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Clause
// ---------------------------------------------------------------------------

impl Clause {
    fn fields_len(&self) -> usize {
        optional_length(&self.to) + self.value.length() + self.data.length()
    }
}

impl Encodable for Clause {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.fields_len(),
        }
        .encode(out);
        encode_optional(&self.to, out);
        self.value.encode(out);
        self.data.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.fields_len();
        Header {
            list: true,
            payload_length,
        }
        .length()
            + payload_length
    }
}

impl Decodable for Clause {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let mut fields = open_list(buf)?;
        let to: Option<Address> = decode_optional(&mut fields)?;
        let value: U256 = Decodable::decode(&mut fields)?;
        let data: Bytes = Decodable::decode(&mut fields)?;
        close_list(fields)?;
        Ok(Self { to, value, data })
    }
}

// ---------------------------------------------------------------------------
// ReservedField
// ---------------------------------------------------------------------------

impl Encodable for ReservedField {
    fn encode(&self, out: &mut dyn BufMut) {
        out.put_slice(&self.0);
    }

    fn length(&self) -> usize {
        self.0.len()
    }
}

impl Decodable for ReservedField {
    /// Captures the next item, header and payload, without interpreting it.
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let start = *buf;
        let mut rest = start;
        let header = Header::decode(&mut rest)?;
        // Single bytes below 0x80 are their own header: nothing consumed.
        let header_len = start.len() - rest.len();
        let total = header_len + header.payload_length;
        if start.len() < total {
            return Err(RlpError::InputTooShort);
        }
        *buf = &start[total..];
        Ok(Self(Bytes::copy_from_slice(&start[..total])))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn list_length<T: Encodable>(items: &[T]) -> usize {
    let payload_length: usize = items.iter().map(Encodable::length).sum();
    Header {
        list: true,
        payload_length,
    }
    .length()
        + payload_length
}

fn encode_list<T: Encodable>(items: &[T], out: &mut dyn BufMut) {
    let payload_length: usize = items.iter().map(Encodable::length).sum();
    Header {
        list: true,
        payload_length,
    }
    .encode(out);
    for item in items {
        item.encode(out);
    }
}

fn decode_list<T: Decodable>(buf: &mut &[u8]) -> alloy_rlp::Result<Vec<T>> {
    let mut items = open_list(buf)?;
    let mut out = Vec::new();
    while !items.is_empty() {
        out.push(T::decode(&mut items)?);
    }
    Ok(out)
}

/// Reads a list header and returns exactly its payload, advancing `buf`
/// past the whole list.
fn open_list<'a>(buf: &mut &'a [u8]) -> alloy_rlp::Result<&'a [u8]> {
    let header = Header::decode(buf)?;
    if !header.list {
        return Err(RlpError::UnexpectedString);
    }
    if buf.len() < header.payload_length {
        return Err(RlpError::InputTooShort);
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    Ok(payload)
}

/// Fails if a list payload has elements left over after decoding.
fn close_list(remaining: &[u8]) -> alloy_rlp::Result<()> {
    if remaining.is_empty() {
        Ok(())
    } else {
        Err(RlpError::Custom("list has too many elements"))
    }
}

fn optional_length<T: Encodable>(value: &Option<T>) -> usize {
    value.as_ref().map_or(1, Encodable::length)
}

fn encode_optional<T: Encodable>(value: &Option<T>, out: &mut dyn BufMut) {
    match value {
        Some(v) => v.encode(out),
        None => out.put_u8(EMPTY_STRING_CODE),
    }
}

/// Decodes a nil-able fixed-size field: the empty string means `None`.
///
/// The empty list `0xc0` is not an alias for nil; it fails as a malformed
/// value, keeping a single encoding per body.
fn decode_optional<T: Decodable>(buf: &mut &[u8]) -> alloy_rlp::Result<Option<T>> {
    match buf.first() {
        None => Err(RlpError::InputTooShort),
        Some(&EMPTY_STRING_CODE) => {
            *buf = &buf[1..];
            Ok(None)
        }
        Some(_) => T::decode(buf).map(Some),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
