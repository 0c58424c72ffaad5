//! Bit-exact wire primitives.
//!
//! All multi-byte integers are big-endian. Lengths and small counts are
//! VarInts: 7-bit groups, least significant group first, high bit set on
//! every byte but the last, at most five bytes.
//!
//! Decoders never panic on arbitrary input. Every short read or malformed
//! field is reported as `ChatError::Wire`.

use bytes::{Buf, BufMut};
use uuid::Uuid;

use chatlink_crypto::{MessageSignature, SIGNATURE_BYTES};

use crate::bitset::BitSet;
use crate::error::{ChatError, Result};

/// Maximum encoded size of a VarInt.
pub const MAX_VAR_INT_BYTES: usize = 5;

/// Maximum UTF-8 bytes per character accepted in a wire string.
const MAX_UTF8_BYTES_PER_CHAR: usize = 4;

/// Fail unless `buf` holds at least `needed` more bytes.
pub fn ensure(buf: &impl Buf, needed: usize, what: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(ChatError::Wire(format!(
            "truncated {what}: need {needed} bytes, have {}",
            buf.remaining()
        )));
    }
    Ok(())
}

/// Decode a whole buffer with `decode`, rejecting trailing bytes.
pub fn decode_exact<T>(bytes: &[u8], decode: impl FnOnce(&mut &[u8]) -> Result<T>) -> Result<T> {
    let mut buf = bytes;
    let value = decode(&mut buf)?;
    if buf.has_remaining() {
        return Err(ChatError::Wire(format!(
            "{} trailing bytes",
            buf.remaining()
        )));
    }
    Ok(value)
}

/// Write a VarInt.
pub fn put_var_int(buf: &mut impl BufMut, value: u32) {
    let mut value = value;
    while value & !0x7f != 0 {
        buf.put_u8((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Read a VarInt.
pub fn get_var_int(buf: &mut impl Buf) -> Result<u32> {
    let mut value = 0u32;
    for group in 0..MAX_VAR_INT_BYTES {
        ensure(&*buf, 1, "var int")?;
        let byte = buf.get_u8();
        // Only four bits of the last group fit in a u32.
        if group == MAX_VAR_INT_BYTES - 1 && byte & 0x70 != 0 {
            return Err(ChatError::Wire("var int overflows u32".into()));
        }
        value |= u32::from(byte & 0x7f) << (7 * group);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(ChatError::Wire("var int longer than 5 bytes".into()))
}

/// Read a VarInt length and check it against `max`.
pub fn get_len(buf: &mut impl Buf, max: usize, what: &str) -> Result<usize> {
    let len = get_var_int(buf)? as usize;
    if len > max {
        return Err(ChatError::Wire(format!("{what} length {len} exceeds {max}")));
    }
    Ok(len)
}

/// Write a length as a VarInt.
pub fn put_len(buf: &mut impl BufMut, len: usize) {
    put_var_int(buf, u32::try_from(len).unwrap_or(u32::MAX));
}

/// Read a big-endian u64.
pub fn get_u64(buf: &mut impl Buf) -> Result<u64> {
    ensure(&*buf, 8, "u64")?;
    Ok(buf.get_u64())
}

/// Read a big-endian i64.
pub fn get_i64(buf: &mut impl Buf) -> Result<i64> {
    ensure(&*buf, 8, "i64")?;
    Ok(buf.get_i64())
}

/// Write a UUID as two big-endian u64 halves.
pub fn put_uuid(buf: &mut impl BufMut, id: &Uuid) {
    buf.put_slice(id.as_bytes());
}

/// Read a UUID.
pub fn get_uuid(buf: &mut impl Buf) -> Result<Uuid> {
    ensure(&*buf, 16, "uuid")?;
    let mut bytes = [0u8; 16];
    buf.copy_to_slice(&mut bytes);
    Ok(Uuid::from_bytes(bytes))
}

/// Write a length-prefixed UTF-8 string of at most `max_chars` characters.
pub fn put_string(buf: &mut impl BufMut, value: &str, max_chars: usize) -> Result<()> {
    let chars = value.chars().count();
    if chars > max_chars {
        return Err(ChatError::ContentTooLong {
            max: max_chars,
            actual: chars,
        });
    }
    put_len(buf, value.len());
    buf.put_slice(value.as_bytes());
    Ok(())
}

/// Read a length-prefixed UTF-8 string of at most `max_chars` characters.
pub fn get_string(buf: &mut impl Buf, max_chars: usize) -> Result<String> {
    let len = get_len(buf, max_chars * MAX_UTF8_BYTES_PER_CHAR, "string")?;
    ensure(&*buf, len, "string")?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    let value = String::from_utf8(bytes).map_err(|e| ChatError::Wire(e.to_string()))?;

    let chars = value.chars().count();
    if chars > max_chars {
        return Err(ChatError::ContentTooLong {
            max: max_chars,
            actual: chars,
        });
    }
    Ok(value)
}

/// Write a varint-length-prefixed byte array.
pub fn put_byte_array(buf: &mut impl BufMut, bytes: &[u8]) {
    put_len(buf, bytes.len());
    buf.put_slice(bytes);
}

/// Read a varint-length-prefixed byte array of at most `max` bytes.
pub fn get_byte_array(buf: &mut impl Buf, max: usize) -> Result<Vec<u8>> {
    let len = get_len(buf, max, "byte array")?;
    ensure(&*buf, len, "byte array")?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}

/// Write a full signature as raw bytes.
pub fn put_signature(buf: &mut impl BufMut, signature: &MessageSignature) {
    buf.put_slice(signature.as_bytes());
}

/// Read a full signature.
pub fn get_signature(buf: &mut impl Buf) -> Result<MessageSignature> {
    ensure(&*buf, SIGNATURE_BYTES, "signature")?;
    let mut bytes = [0u8; SIGNATURE_BYTES];
    buf.copy_to_slice(&mut bytes);
    Ok(MessageSignature::from_array(bytes))
}

/// Write a bitset of `bits` bits as `ceil(bits / 8)` little-endian bytes.
pub fn put_fixed_bitset(buf: &mut impl BufMut, set: &BitSet, bits: usize) -> Result<()> {
    if set.len() > bits {
        return Err(ChatError::Wire(format!(
            "bitset of length {} does not fit in {bits} bits",
            set.len()
        )));
    }
    buf.put_slice(&set.to_le_bytes(bits.div_ceil(8)));
    Ok(())
}

/// Read a bitset of `bits` bits.
///
/// Padding bits in the last byte are kept, so a caller can tell when a
/// peer set a bit beyond the window.
pub fn get_fixed_bitset(buf: &mut impl Buf, bits: usize) -> Result<BitSet> {
    let len = bits.div_ceil(8);
    ensure(&*buf, len, "bitset")?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(BitSet::from_le_bytes(&bytes))
}
