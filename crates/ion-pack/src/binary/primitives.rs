//! Variable-length field codecs of the Ion 1.0 binary form.
//!
//! `VarUInt` is big-endian base-128 with the high bit set on the final
//! octet. `VarInt` is the same, except the first octet donates its second
//! highest bit as the sign. `UInt` and `Int` are plain big-endian
//! magnitudes whose length is carried by the enclosing type descriptor;
//! `Int` dedicates the leading bit of its first octet to the sign.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use crate::error::{IonError, IonResult};

/// A decoded `VarInt`, keeping negative zero representable (the binary
/// timestamp encodes the unspecified `-00:00` offset as negative zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt {
    pub negative: bool,
    pub magnitude: u64,
}

impl VarInt {
    pub fn value(&self) -> i64 {
        if self.negative {
            -(self.magnitude as i64)
        } else {
            self.magnitude as i64
        }
    }

    pub fn is_negative_zero(&self) -> bool {
        self.negative && self.magnitude == 0
    }
}

/// Reads a `VarUInt` starting at `*pos`, advancing the cursor.
pub fn read_var_uint(data: &[u8], pos: &mut usize) -> IonResult<u64> {
    let mut result: u64 = 0;
    let start = *pos;
    loop {
        if *pos >= data.len() {
            return Err(IonError::malformed(start, "unterminated VarUInt"));
        }
        if *pos - start >= 10 {
            return Err(IonError::malformed(start, "VarUInt overflows 64 bits"));
        }
        let b = data[*pos];
        *pos += 1;
        if result > (u64::MAX >> 7) {
            return Err(IonError::malformed(start, "VarUInt overflows 64 bits"));
        }
        result = (result << 7) | (b & 0x7f) as u64;
        if b & 0x80 != 0 {
            return Ok(result);
        }
    }
}

/// Reads a `VarInt` starting at `*pos`, advancing the cursor.
pub fn read_var_int(data: &[u8], pos: &mut usize) -> IonResult<VarInt> {
    let start = *pos;
    if *pos >= data.len() {
        return Err(IonError::malformed(start, "unterminated VarInt"));
    }
    let b0 = data[*pos];
    *pos += 1;
    let negative = b0 & 0x40 != 0;
    let mut magnitude = (b0 & 0x3f) as u64;
    if b0 & 0x80 != 0 {
        return Ok(VarInt {
            negative,
            magnitude,
        });
    }
    loop {
        if *pos >= data.len() {
            return Err(IonError::malformed(start, "unterminated VarInt"));
        }
        if *pos - start >= 10 || magnitude > (u64::MAX >> 7) {
            return Err(IonError::malformed(start, "VarInt overflows 64 bits"));
        }
        let b = data[*pos];
        *pos += 1;
        magnitude = (magnitude << 7) | (b & 0x7f) as u64;
        if b & 0x80 != 0 {
            return Ok(VarInt {
                negative,
                magnitude,
            });
        }
    }
}

/// Decodes a `UInt` body as a `u64`, or `None` if it overflows 64 bits.
pub fn uint_as_u64(body: &[u8]) -> Option<u64> {
    let trimmed = trim_leading_zeros(body);
    if trimmed.len() > 8 {
        return None;
    }
    let mut value: u64 = 0;
    for &b in trimmed {
        value = (value << 8) | b as u64;
    }
    Some(value)
}

/// Decodes a `UInt` body of any length.
pub fn uint_as_big(body: &[u8]) -> BigUint {
    BigUint::from_bytes_be(body)
}

/// Decodes an `Int` body (sign-magnitude) of any length.
pub fn int_as_big(body: &[u8]) -> BigInt {
    if body.is_empty() {
        return BigInt::zero();
    }
    let negative = body[0] & 0x80 != 0;
    let mut magnitude = body.to_vec();
    magnitude[0] &= 0x7f;
    let magnitude = BigUint::from_bytes_be(&magnitude);
    if magnitude.is_zero() {
        return BigInt::zero();
    }
    let sign = if negative { Sign::Minus } else { Sign::Plus };
    BigInt::from_biguint(sign, magnitude)
}

/// Decodes an `Int` body into explicit sign and magnitude, preserving
/// negative zero (needed for the decimal coefficient).
pub fn int_as_parts(body: &[u8]) -> (bool, BigUint) {
    if body.is_empty() {
        return (false, BigUint::zero());
    }
    let negative = body[0] & 0x80 != 0;
    let mut magnitude = body.to_vec();
    magnitude[0] &= 0x7f;
    (negative, BigUint::from_bytes_be(&magnitude))
}

/// Appends a `VarUInt` encoding of `n`.
pub fn write_var_uint(out: &mut Vec<u8>, n: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    let mut rest = n;
    loop {
        groups[count] = (rest & 0x7f) as u8;
        count += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let terminator = if i == 0 { 0x80 } else { 0 };
        out.push(groups[i] | terminator);
    }
}

/// Number of octets `write_var_uint` produces for `n`.
pub fn var_uint_len(n: u64) -> usize {
    let bits = 64 - n.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Appends a `VarInt` encoding of the given sign and magnitude. A negative
/// sign with zero magnitude encodes negative zero.
pub fn write_var_int_parts(out: &mut Vec<u8>, negative: bool, magnitude: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    let mut rest = magnitude;
    loop {
        groups[count] = (rest & 0x7f) as u8;
        count += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    // The top octet must leave room for the sign bit.
    if groups[count - 1] & 0x40 != 0 {
        groups[count] = 0;
        count += 1;
    }
    if negative {
        groups[count - 1] |= 0x40;
    }
    for i in (0..count).rev() {
        let terminator = if i == 0 { 0x80 } else { 0 };
        out.push(groups[i] | terminator);
    }
}

/// Appends a `VarInt` encoding of `value`.
pub fn write_var_int(out: &mut Vec<u8>, value: i64) {
    write_var_int_parts(out, value < 0, value.unsigned_abs());
}

/// Appends the minimal big-endian `UInt` encoding of `n`. Zero encodes as
/// no octets; the enclosing descriptor carries the length.
pub fn write_uint_u64(out: &mut Vec<u8>, n: u64) {
    let bytes = n.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(8);
    out.extend_from_slice(&bytes[first..]);
}

/// Appends the big-endian `UInt` encoding of an arbitrary magnitude.
pub fn write_uint_big(out: &mut Vec<u8>, n: &BigUint) {
    if n.is_zero() {
        return;
    }
    out.extend_from_slice(&n.to_bytes_be());
}

/// Appends the sign-magnitude `Int` encoding. A zero magnitude with a
/// negative sign produces the single octet `0x80` (negative zero), which is
/// only legal inside decimal coefficients.
pub fn write_int_parts(out: &mut Vec<u8>, negative: bool, magnitude: &BigUint) {
    if magnitude.is_zero() {
        if negative {
            out.push(0x80);
        }
        return;
    }
    let bytes = magnitude.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        // Sign bit needs an octet of its own.
        out.push(if negative { 0x80 } else { 0x00 });
        out.extend_from_slice(&bytes);
    } else {
        let mut bytes = bytes;
        if negative {
            bytes[0] |= 0x80;
        }
        out.extend_from_slice(&bytes);
    }
}

/// Number of octets the minimal `UInt` encoding of `n` occupies.
pub fn uint_len(n: u64) -> usize {
    if n == 0 {
        return 0;
    }
    (8 - n.leading_zeros() as usize / 8).max(1)
}

fn trim_leading_zeros(body: &[u8]) -> &[u8] {
    let first = body.iter().position(|b| *b != 0).unwrap_or(body.len());
    &body[first..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_uint_roundtrip() {
        for n in [
            0u64,
            1,
            127,
            128,
            16_383,
            16_384,
            2_097_151,
            2_097_152,
            u32::MAX as u64,
            u64::MAX,
        ] {
            let mut out = Vec::new();
            write_var_uint(&mut out, n);
            assert_eq!(out.len(), var_uint_len(n), "length for {n}");
            let mut pos = 0;
            assert_eq!(read_var_uint(&out, &mut pos).unwrap(), n);
            assert_eq!(pos, out.len());
        }
    }

    #[test]
    fn var_uint_wire_bytes() {
        let mut out = Vec::new();
        write_var_uint(&mut out, 0);
        assert_eq!(out, [0x80]);
        out.clear();
        write_var_uint(&mut out, 127);
        assert_eq!(out, [0xff]);
        out.clear();
        write_var_uint(&mut out, 128);
        assert_eq!(out, [0x01, 0x80]);
    }

    #[test]
    fn var_uint_unterminated() {
        let mut pos = 0;
        assert!(read_var_uint(&[0x01, 0x02], &mut pos).is_err());
    }

    #[test]
    fn var_int_roundtrip() {
        for v in [0i64, 1, -1, 63, 64, -64, -65, 8191, -8192, i32::MAX as i64] {
            let mut out = Vec::new();
            write_var_int(&mut out, v);
            let mut pos = 0;
            let decoded = read_var_int(&out, &mut pos).unwrap();
            assert_eq!(decoded.value(), v, "value {v}");
            assert_eq!(pos, out.len());
        }
    }

    #[test]
    fn var_int_sign_bit_spill() {
        // 64 needs 7 bits, so the sign forces a second octet.
        let mut out = Vec::new();
        write_var_int(&mut out, -64);
        assert_eq!(out, [0x40, 0xc0]);
    }

    #[test]
    fn var_int_negative_zero() {
        let mut out = Vec::new();
        write_var_int_parts(&mut out, true, 0);
        assert_eq!(out, [0xc0]);
        let mut pos = 0;
        let decoded = read_var_int(&out, &mut pos).unwrap();
        assert!(decoded.is_negative_zero());
        assert_eq!(decoded.value(), 0);
    }

    #[test]
    fn uint_minimal_encoding() {
        let mut out = Vec::new();
        write_uint_u64(&mut out, 0);
        assert!(out.is_empty());
        write_uint_u64(&mut out, 0x1234);
        assert_eq!(out, [0x12, 0x34]);
        assert_eq!(uint_as_u64(&out), Some(0x1234));
    }

    #[test]
    fn uint_overflow_detection() {
        let body = [0x01, 0, 0, 0, 0, 0, 0, 0, 0]; // 2^64
        assert_eq!(uint_as_u64(&body), None);
        assert_eq!(uint_as_big(&body), BigUint::from(1u8) << 64);
    }

    #[test]
    fn int_sign_magnitude() {
        let mut out = Vec::new();
        write_int_parts(&mut out, true, &BigUint::from(0x7fu8));
        assert_eq!(out, [0xff]);
        assert_eq!(int_as_big(&out), BigInt::from(-0x7f));

        out.clear();
        // 0x80 magnitude collides with the sign bit and needs a pad octet.
        write_int_parts(&mut out, false, &BigUint::from(0x80u8));
        assert_eq!(out, [0x00, 0x80]);
        assert_eq!(int_as_big(&out), BigInt::from(0x80));
    }

    #[test]
    fn int_negative_zero_parts() {
        let (negative, magnitude) = int_as_parts(&[0x80]);
        assert!(negative);
        assert!(magnitude.is_zero());
        // int_as_big folds it to plain zero.
        assert_eq!(int_as_big(&[0x80]), BigInt::zero());
    }

    #[test]
    fn uint_len_matches_write() {
        for n in [0u64, 1, 255, 256, 65_535, 65_536, u64::MAX] {
            let mut out = Vec::new();
            write_uint_u64(&mut out, n);
            assert_eq!(out.len(), uint_len(n), "for {n}");
        }
    }
}
