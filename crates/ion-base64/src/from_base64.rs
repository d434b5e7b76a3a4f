//! Standard base64 decoding function.

use crate::constants::ALPHABET_BYTES;
use crate::Base64Error;

const PADDING_CHAR: u8 = b'=';

/// Reverse lookup table: ASCII byte → 6-bit value, or -1 for invalid bytes.
static REVERSE: [i16; 256] = {
    let mut table = [-1i16; 256];
    let mut i = 0;
    while i < 64 {
        table[ALPHABET_BYTES[i] as usize] = i as i16;
        i += 1;
    }
    table
};

/// Decodes a standard base64 string (with padding) to bytes.
///
/// # Errors
///
/// Returns an error if the input length is not a multiple of 4 or contains
/// bytes outside the standard alphabet.
///
/// # Example
///
/// ```
/// use ion_base64::from_base64;
///
/// let decoded = from_base64("aGVsbG8=").unwrap();
/// assert_eq!(decoded, b"hello");
/// ```
pub fn from_base64(encoded: &str) -> Result<Vec<u8>, Base64Error> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    let bytes = encoded.as_bytes();
    let length = bytes.len();
    if length % 4 != 0 {
        return Err(Base64Error::InvalidLength);
    }

    let padding = if bytes[length - 1] == PADDING_CHAR {
        if bytes[length - 2] == PADDING_CHAR {
            2
        } else {
            1
        }
    } else {
        0
    };

    let mut out = Vec::with_capacity(length / 4 * 3);
    let main_end = length - 4;

    let mut i = 0;
    while i < main_end {
        let quad = decode_quad(bytes, i)?;
        out.push((quad >> 16) as u8);
        out.push((quad >> 8) as u8);
        out.push(quad as u8);
        i += 4;
    }

    // Final quantum, possibly padded.
    let s0 = lookup(bytes[main_end])?;
    let s1 = lookup(bytes[main_end + 1])?;
    match padding {
        2 => {
            out.push(((s0 << 2) | (s1 >> 4)) as u8);
        }
        1 => {
            let s2 = lookup(bytes[main_end + 2])?;
            out.push(((s0 << 2) | (s1 >> 4)) as u8);
            out.push(((s1 << 4) | (s2 >> 2)) as u8);
        }
        _ => {
            let quad = decode_quad(bytes, main_end)?;
            out.push((quad >> 16) as u8);
            out.push((quad >> 8) as u8);
            out.push(quad as u8);
        }
    }

    Ok(out)
}

#[inline]
fn lookup(b: u8) -> Result<u32, Base64Error> {
    let v = REVERSE[b as usize];
    if v < 0 {
        return Err(Base64Error::InvalidBase64String);
    }
    Ok(v as u32)
}

#[inline]
fn decode_quad(bytes: &[u8], i: usize) -> Result<u32, Base64Error> {
    Ok((lookup(bytes[i])? << 18)
        | (lookup(bytes[i + 1])? << 12)
        | (lookup(bytes[i + 2])? << 6)
        | lookup(bytes[i + 3])?)
}
