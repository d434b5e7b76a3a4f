//! Tests for base64 decoding (from_base64).

use ion_base64::{from_base64, to_base64, Base64Error};

#[test]
fn roundtrips_all_lengths() {
    for length in 0..64usize {
        let blob: Vec<u8> = (0..length).map(|i| (i * 7 + 13) as u8).collect();
        let encoded = to_base64(&blob);
        let decoded = from_base64(&encoded).unwrap();
        assert_eq!(decoded, blob, "failed for blob of length {length}");
    }
}

#[test]
fn handles_invalid_values() {
    let result = from_base64("Zm9v!!!!");
    assert!(matches!(result, Err(Base64Error::InvalidBase64String)));
}

#[test]
fn rejects_truncated_input() {
    assert!(matches!(from_base64("Zm9"), Err(Base64Error::InvalidLength)));
}

#[test]
fn empty_input() {
    assert_eq!(from_base64("").unwrap(), b"");
}

#[test]
fn padded_vectors() {
    assert_eq!(from_base64("Zg==").unwrap(), b"f");
    assert_eq!(from_base64("Zm8=").unwrap(), b"fo");
    assert_eq!(from_base64("Zm9v").unwrap(), b"foo");
}
