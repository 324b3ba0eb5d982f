// Length-prefixed structured values (amino binary).
//
// The store writes its latest-version counter and per-height commit info
// through a reflection-driven codec. Only two shapes are ever read here,
// so instead of a general codec this module decodes exactly those shapes:
//
//   latest version : uvarint(len) uvarint(version)
//   commit info    : uvarint(len) fields...
//
// Struct fields use protobuf-style keys (`field_number << 3 | wire_type`).
// Zero-valued scalars are omitted by the writer and default on read.

use super::primitive::{DecodeError, Reader};
use super::varint;

const STRUCT: &str = "struct";
const STRING: &str = "string";
const FIELD_KEY: &str = "field key";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Root commit of one sub-store at a given version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitId {
    pub version: i64,
    pub hash: Vec<u8>,
}

/// A named sub-store and its commit identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreInfo {
    pub name: String,
    pub commit_id: CommitId,
}

/// Snapshot of every sub-store root at one version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitInfo {
    pub version: i64,
    pub store_infos: Vec<StoreInfo>,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireType {
    Varint,
    Fixed64,
    Bytes,
    Fixed32,
}

impl WireType {
    fn from_key(key: u64, field: &'static str) -> Result<Self, DecodeError> {
        match key & 0x07 {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::Bytes),
            5 => Ok(Self::Fixed32),
            other => Err(DecodeError::Invalid {
                field,
                expected: FIELD_KEY,
                reason: format!("unsupported wire type {other}"),
            }),
        }
    }

    fn bits(self) -> u64 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::Bytes => 2,
            Self::Fixed32 => 5,
        }
    }
}

/// Read the next field key, or `None` at the end of the struct.
fn next_field(
    r: &mut Reader<'_>,
    field: &'static str,
) -> Result<Option<(u64, WireType)>, DecodeError> {
    if r.is_empty() {
        return Ok(None);
    }
    let key = r.uvarint(field)?;
    let number = key >> 3;
    if number == 0 {
        return Err(DecodeError::Invalid {
            field,
            expected: FIELD_KEY,
            reason: "field number 0".to_string(),
        });
    }
    Ok(Some((number, WireType::from_key(key, field)?)))
}

fn expect_wire(
    got: WireType,
    want: WireType,
    field: &'static str,
    expected: &'static str,
) -> Result<(), DecodeError> {
    if got != want {
        return Err(DecodeError::Invalid {
            field,
            expected,
            reason: format!("wire type {} where {} was expected", got.bits(), want.bits()),
        });
    }
    Ok(())
}

fn skip_field(r: &mut Reader<'_>, wire: WireType, field: &'static str) -> Result<(), DecodeError> {
    match wire {
        WireType::Varint => r.uvarint(field).map(|_| ()),
        WireType::Fixed64 => r.take(8, field, "fixed64").map(|_| ()),
        WireType::Bytes => r.byte_slice(field).map(|_| ()),
        WireType::Fixed32 => r.take(4, field, "fixed32").map(|_| ()),
    }
}

/// Strip the outer length prefix, requiring it to cover the rest of `value`.
fn unframe<'a>(
    value: &'a [u8],
    field: &'static str,
    expected: &'static str,
) -> Result<&'a [u8], DecodeError> {
    if value.is_empty() {
        return Err(DecodeError::Invalid {
            field,
            expected,
            reason: "empty value".to_string(),
        });
    }
    let (len, n) =
        varint::read_usize(value).map_err(|e| DecodeError::from_varint(e, field, expected))?;
    let payload = &value[n..];
    if payload.len() < len {
        return Err(DecodeError::Truncated { field, expected });
    }
    if payload.len() > len {
        return Err(DecodeError::Invalid {
            field,
            expected,
            reason: format!("{} trailing bytes after {len}-byte payload", payload.len() - len),
        });
    }
    Ok(payload)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode the value stored under `s/latest`.
pub fn decode_latest_version(value: &[u8]) -> Result<i64, DecodeError> {
    const FIELD: &str = "latest_version";
    let payload = unframe(value, FIELD, super::primitive::VARINT)?;
    let mut r = Reader::new(payload);
    let version = r.varint(FIELD)?;
    if !r.is_empty() {
        return Err(DecodeError::Invalid {
            field: FIELD,
            expected: super::primitive::VARINT,
            reason: format!("{} trailing bytes", r.remaining().len()),
        });
    }
    Ok(version)
}

impl CommitInfo {
    /// Decode the value stored under `s/{height}`.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        let payload = unframe(value, "commit_info", STRUCT)?;
        Self::decode_fields(payload)
    }

    fn decode_fields(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut info = Self::default();
        let mut r = Reader::new(buf);
        while let Some((number, wire)) = next_field(&mut r, "commit_info")? {
            match number {
                1 => {
                    const F: &str = "commit_info.version";
                    expect_wire(wire, WireType::Varint, F, super::primitive::VARINT)?;
                    info.version = r.varint(F)?;
                }
                2 => {
                    const F: &str = "commit_info.store_infos";
                    expect_wire(wire, WireType::Bytes, F, STRUCT)?;
                    let body = r.byte_slice(F)?;
                    info.store_infos.push(StoreInfo::decode_fields(body)?);
                }
                _ => skip_field(&mut r, wire, "commit_info")?,
            }
        }
        Ok(info)
    }

    /// Length-prefixed encoding, the inverse of [`CommitInfo::decode`].
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        put_varint_field(&mut body, 1, self.version);
        for store in &self.store_infos {
            put_bytes_field(&mut body, 2, &store.encode_fields(), true);
        }
        frame(&body)
    }
}

impl StoreInfo {
    fn decode_fields(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut store = Self::default();
        let mut r = Reader::new(buf);
        while let Some((number, wire)) = next_field(&mut r, "store_info")? {
            match number {
                1 => {
                    const F: &str = "store_info.name";
                    expect_wire(wire, WireType::Bytes, F, STRING)?;
                    let raw = r.byte_slice(F)?;
                    store.name = std::str::from_utf8(raw)
                        .map_err(|e| DecodeError::Invalid {
                            field: F,
                            expected: STRING,
                            reason: e.to_string(),
                        })?
                        .to_string();
                }
                2 => {
                    const F: &str = "store_info.core";
                    expect_wire(wire, WireType::Bytes, F, STRUCT)?;
                    let body = r.byte_slice(F)?;
                    store.commit_id = decode_store_core(body)?;
                }
                _ => skip_field(&mut r, wire, "store_info")?,
            }
        }
        Ok(store)
    }

    fn encode_fields(&self) -> Vec<u8> {
        let mut core = Vec::new();
        put_bytes_field(&mut core, 1, &self.commit_id.encode_fields(), true);

        let mut out = Vec::new();
        put_bytes_field(&mut out, 1, self.name.as_bytes(), false);
        put_bytes_field(&mut out, 2, &core, true);
        out
    }
}

/// The sub-store core wraps nothing but the commit id.
fn decode_store_core(buf: &[u8]) -> Result<CommitId, DecodeError> {
    let mut commit_id = CommitId::default();
    let mut r = Reader::new(buf);
    while let Some((number, wire)) = next_field(&mut r, "store_core")? {
        if number == 1 {
            const F: &str = "store_core.commit_id";
            expect_wire(wire, WireType::Bytes, F, STRUCT)?;
            let body = r.byte_slice(F)?;
            commit_id = CommitId::decode_fields(body)?;
        } else {
            skip_field(&mut r, wire, "store_core")?;
        }
    }
    Ok(commit_id)
}

impl CommitId {
    fn decode_fields(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut id = Self::default();
        let mut r = Reader::new(buf);
        while let Some((number, wire)) = next_field(&mut r, "commit_id")? {
            match number {
                1 => {
                    const F: &str = "commit_id.version";
                    expect_wire(wire, WireType::Varint, F, super::primitive::VARINT)?;
                    id.version = r.varint(F)?;
                }
                2 => {
                    const F: &str = "commit_id.hash";
                    expect_wire(wire, WireType::Bytes, F, super::primitive::BYTE_SLICE)?;
                    id.hash = r.byte_slice(F)?.to_vec();
                }
                _ => skip_field(&mut r, wire, "commit_id")?,
            }
        }
        Ok(id)
    }

    fn encode_fields(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_varint_field(&mut out, 1, self.version);
        put_bytes_field(&mut out, 2, &self.hash, false);
        out
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Length-prefixed encoding of the latest-version counter.
pub fn encode_latest_version(version: i64) -> Vec<u8> {
    let mut body = Vec::new();
    varint::write_u64(&mut body, version as u64);
    frame(&body)
}

fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + varint::sizeof_u64(body.len() as u64));
    super::primitive::encode_byte_slice(&mut out, body);
    out
}

fn put_key(out: &mut Vec<u8>, number: u64, wire: WireType) {
    varint::write_u64(out, (number << 3) | wire.bits());
}

fn put_varint_field(out: &mut Vec<u8>, number: u64, value: i64) {
    if value != 0 {
        put_key(out, number, WireType::Varint);
        varint::write_u64(out, value as u64);
    }
}

fn put_bytes_field(out: &mut Vec<u8>, number: u64, value: &[u8], always: bool) {
    if always || !value.is_empty() {
        put_key(out, number, WireType::Bytes);
        super::primitive::encode_byte_slice(out, value);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
