//! Order-preserving byte encoding for index keys.
//!
//! An index key is the encoded index column values followed by the encoded HKey of the row. Every value
//! is self-delimiting (a type tag, then a fixed-width or terminated payload), so byte-wise comparison of
//! two keys agrees with comparing their decoded (values, hkey) tuples, and the encoding of a leading
//! prefix of columns is a byte prefix of every key that starts with those values.
//!
//! Variable-width payloads escape 0x00 as 0x00 0xFF and end with 0x00 0x00.

use crate::collation::{tag, Collatable};
use crate::error::EncodingError;
use crate::hkey::{HKey, HKeySegment};
use crate::value::Value;

const ESCAPE: u8 = 0xFF;
const TERMINATOR: [u8; 2] = [0x00, 0x00];

pub fn encode_value(value: &Value, out: &mut Vec<u8>) {
    out.push(value.type_tag());
    match value {
        Value::Null => {}
        Value::String(s) => encode_escaped(s.as_bytes(), out),
        Value::Binary(bytes) => encode_escaped(bytes, out),
        _ => out.extend_from_slice(&value.to_bytes()),
    }
}

fn encode_escaped(bytes: &[u8], out: &mut Vec<u8>) {
    out.reserve(bytes.len() + 2);
    for &b in bytes {
        if b == 0x00 {
            out.push(0x00);
            out.push(ESCAPE);
        } else {
            out.push(b);
        }
    }
    out.extend_from_slice(&TERMINATOR);
}

pub fn encode_tuple(values: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        encode_value(v, &mut out);
    }
    out
}

pub fn encode_hkey(hkey: &HKey) -> Vec<u8> {
    let mut out = Vec::new();
    encode_hkey_into(hkey, &mut out);
    out
}

fn encode_hkey_into(hkey: &HKey, out: &mut Vec<u8>) {
    for segment in hkey.segments() {
        out.extend_from_slice(&segment.ordinal.to_be_bytes());
        encode_value(&segment.value, out);
    }
}

pub fn encode_index_key(values: &[Value], hkey: &HKey) -> Vec<u8> {
    let mut out = encode_tuple(values);
    encode_hkey_into(hkey, &mut out);
    out
}

/// Decode one value starting at `pos`, returning it with the position just past it
pub fn decode_value(bytes: &[u8], pos: usize) -> Result<(Value, usize), EncodingError> {
    let type_tag = *bytes.get(pos).ok_or(EncodingError::Truncated(pos))?;
    let body = pos + 1;
    match type_tag {
        tag::NULL => Ok((Value::Null, body)),
        tag::BOOL => {
            let b = *bytes.get(body).ok_or(EncodingError::Truncated(body))?;
            Ok((Value::Bool(b != 0), body + 1))
        }
        tag::INT => {
            let raw = u64::from_be_bytes(fixed8(bytes, body)?);
            Ok((Value::I64((raw ^ (1 << 63)) as i64), body + 8))
        }
        tag::FLOAT => {
            let raw = u64::from_be_bytes(fixed8(bytes, body)?);
            let f = if raw == u64::MAX {
                f64::NAN
            } else if raw & (1 << 63) != 0 {
                f64::from_bits(raw ^ (1 << 63))
            } else {
                f64::from_bits(!raw)
            };
            Ok((Value::F64(f), body + 8))
        }
        tag::STRING => {
            let (raw, end) = decode_escaped(bytes, body)?;
            let s = String::from_utf8(raw).map_err(|_| EncodingError::InvalidUtf8)?;
            Ok((Value::String(s), end))
        }
        tag::BINARY => {
            let (raw, end) = decode_escaped(bytes, body)?;
            Ok((Value::Binary(raw), end))
        }
        other => Err(EncodingError::UnknownTag { tag: other, pos }),
    }
}

fn fixed8(bytes: &[u8], pos: usize) -> Result<[u8; 8], EncodingError> {
    bytes.get(pos..pos + 8).and_then(|s| s.try_into().ok()).ok_or(EncodingError::Truncated(bytes.len()))
}

fn decode_escaped(bytes: &[u8], mut pos: usize) -> Result<(Vec<u8>, usize), EncodingError> {
    let mut out = Vec::new();
    loop {
        match (bytes.get(pos), bytes.get(pos + 1)) {
            (None, _) => return Err(EncodingError::Truncated(pos)),
            (Some(0x00), Some(0x00)) => return Ok((out, pos + 2)),
            (Some(0x00), Some(&ESCAPE)) => {
                out.push(0x00);
                pos += 2;
            }
            (Some(0x00), Some(_)) => return Err(EncodingError::BadEscape(pos)),
            (Some(0x00), None) => return Err(EncodingError::Truncated(pos + 1)),
            (Some(&b), _) => {
                out.push(b);
                pos += 1;
            }
        }
    }
}

/// Position just past the value starting at `pos`, without materializing it
fn skip_value(bytes: &[u8], pos: usize) -> Result<usize, EncodingError> {
    let type_tag = *bytes.get(pos).ok_or(EncodingError::Truncated(pos))?;
    let body = pos + 1;
    let end = match type_tag {
        tag::NULL => body,
        tag::BOOL => body + 1,
        tag::INT | tag::FLOAT => body + 8,
        tag::STRING | tag::BINARY => {
            let mut at = body;
            loop {
                match (bytes.get(at), bytes.get(at + 1)) {
                    (Some(0x00), Some(0x00)) => break at + 2,
                    (Some(0x00), Some(&ESCAPE)) => at += 2,
                    (Some(0x00), Some(_)) => return Err(EncodingError::BadEscape(at)),
                    (Some(_), _) => at += 1,
                    (None, _) => return Err(EncodingError::Truncated(at)),
                }
            }
        }
        other => return Err(EncodingError::UnknownTag { tag: other, pos }),
    };
    if end > bytes.len() {
        return Err(EncodingError::Truncated(bytes.len()));
    }
    Ok(end)
}

/// Length in bytes of the first `n` encoded values of `bytes`
pub fn prefix_len(bytes: &[u8], n: usize) -> Result<usize, EncodingError> {
    let mut pos = 0;
    for _ in 0..n {
        pos = skip_value(bytes, pos)?;
    }
    Ok(pos)
}

/// Decode the HKey occupying `bytes[pos..]`
pub fn decode_hkey(bytes: &[u8], mut pos: usize) -> Result<HKey, EncodingError> {
    let mut segments = Vec::new();
    while pos < bytes.len() {
        let ordinal = bytes.get(pos..pos + 4).and_then(|s| s.try_into().ok()).map(u32::from_be_bytes).ok_or(EncodingError::Truncated(bytes.len()))?;
        let (value, end) = decode_value(bytes, pos + 4)?;
        segments.push(HKeySegment { ordinal, value });
        pos = end;
    }
    Ok(HKey::new(segments))
}

/// Split a stored index key back into its `width` column values and the row's HKey
pub fn decode_index_key(bytes: &[u8], width: usize) -> Result<(Vec<Value>, HKey), EncodingError> {
    let mut values = Vec::with_capacity(width);
    let mut pos = 0;
    for _ in 0..width {
        let (value, end) = decode_value(bytes, pos)?;
        values.push(value);
        pos = end;
    }
    Ok((values, decode_hkey(bytes, pos)?))
}

/// The smallest byte string greater than every string that starts with `prefix`.
///
/// Returns None when no such string exists (the prefix is empty or all 0xFF), meaning "unbounded".
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let last = prefix.iter().rposition(|&b| b != 0xFF)?;
    let mut succ = prefix[..=last].to_vec();
    succ[last] += 1;
    Some(succ)
}
