//! Wire-level matrix for the binary reader and writer.

use ion_pack::{
    copy_all, BinaryReader, BinaryWriter, IonError, IonReader, IonType, IonWriter,
};
use num_bigint::BigInt;

const BVM: [u8; 4] = [0xe0, 0x01, 0x00, 0xea];

fn with_bvm(tail: &[u8]) -> Vec<u8> {
    let mut bytes = BVM.to_vec();
    bytes.extend_from_slice(tail);
    bytes
}

fn write_one(f: impl FnOnce(&mut BinaryWriter)) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    f(&mut writer);
    writer.finish().unwrap();
    writer.bytes().to_vec()
}

#[test]
fn empty_document() {
    let mut reader = BinaryReader::new(&BVM);
    assert_eq!(reader.next().unwrap(), IonType::NoType);
    assert_eq!(reader.next().unwrap(), IonType::NoType);

    assert_eq!(write_one(|_| {}), BVM.to_vec());
}

#[test]
fn scalar_wire_bytes() {
    assert_eq!(write_one(|w| w.write_null()), with_bvm(&[0x0f]));
    assert_eq!(
        write_one(|w| w.write_null_of(IonType::String)),
        with_bvm(&[0x8f])
    );
    assert_eq!(write_one(|w| w.write_bool(true)), with_bvm(&[0x11]));
    assert_eq!(write_one(|w| w.write_bool(false)), with_bvm(&[0x10]));
    assert_eq!(write_one(|w| w.write_i64(0)), with_bvm(&[0x20]));
    assert_eq!(write_one(|w| w.write_i64(42)), with_bvm(&[0x21, 0x2a]));
    assert_eq!(write_one(|w| w.write_i64(-1)), with_bvm(&[0x31, 0x01]));
    assert_eq!(
        write_one(|w| w.write_i64(0x1234)),
        with_bvm(&[0x22, 0x12, 0x34])
    );
    assert_eq!(write_one(|w| w.write_f64(0.0)), with_bvm(&[0x40]));
    assert_eq!(
        write_one(|w| w.write_string("foo")),
        with_bvm(&[0x83, 0x66, 0x6f, 0x6f])
    );
    assert_eq!(
        write_one(|w| w.write_blob(b"ab")),
        with_bvm(&[0xa2, 0x61, 0x62])
    );
}

#[test]
fn float_encoding_is_big_endian() {
    let bytes = write_one(|w| w.write_f64(1.5));
    assert_eq!(bytes[4], 0x48);
    assert_eq!(&bytes[5..13], &1.5f64.to_be_bytes());

    let mut reader = BinaryReader::new(&bytes);
    assert_eq!(reader.next().unwrap(), IonType::Float);
    assert_eq!(reader.read_f64().unwrap(), 1.5);
}

#[test]
fn negative_zero_float_keeps_its_sign() {
    let bytes = write_one(|w| w.write_f64(-0.0));
    let mut reader = BinaryReader::new(&bytes);
    reader.next().unwrap();
    assert!(reader.read_f64().unwrap().is_sign_negative());
}

#[test]
fn integer_boundaries_roundtrip() {
    let cases: Vec<i64> = vec![
        0,
        1,
        -1,
        127,
        128,
        255,
        256,
        -255,
        -256,
        65_535,
        -65_536,
        i64::MAX,
        i64::MIN + 1,
        i64::MIN,
    ];
    for value in cases {
        let bytes = write_one(|w| w.write_i64(value));
        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.next().unwrap(), IonType::Int, "for {value}");
        assert_eq!(reader.read_i64().unwrap(), value, "for {value}");
        assert_eq!(reader.next().unwrap(), IonType::NoType);
    }
}

#[test]
fn big_integers_roundtrip() {
    let huge = BigInt::parse_bytes(b"123456789012345678901234567890", 10).unwrap();
    for value in [huge.clone(), -huge] {
        let bytes = write_one(|w| w.write_big_int(&value));
        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.next().unwrap(), IonType::Int);
        assert!(matches!(reader.read_i64(), Err(IonError::OutOfRange(_))));
        assert_eq!(reader.read_big_int().unwrap(), value);
    }
}

#[test]
fn struct_and_list_events() {
    let mut writer = BinaryWriter::new();
    writer.begin_struct();
    writer.field_name("a");
    writer.write_i64(1);
    writer.field_name("b");
    writer.begin_list();
    writer.write_i64(2);
    writer.write_i64(3);
    writer.end_list();
    writer.end_struct();
    writer.finish().unwrap();

    let mut reader = BinaryReader::new(writer.bytes());
    assert_eq!(reader.next().unwrap(), IonType::Struct);
    reader.step_in().unwrap();
    assert_eq!(reader.next().unwrap(), IonType::Int);
    assert_eq!(reader.field_name().unwrap(), "a");
    assert_eq!(reader.read_i64().unwrap(), 1);
    assert_eq!(reader.next().unwrap(), IonType::List);
    assert_eq!(reader.field_name().unwrap(), "b");
    reader.step_in().unwrap();
    assert_eq!(reader.next().unwrap(), IonType::Int);
    assert_eq!(reader.read_i64().unwrap(), 2);
    // step_out skips the unread tail.
    reader.step_out().unwrap();
    assert_eq!(reader.next().unwrap(), IonType::NoType);
    reader.step_out().unwrap();
    assert_eq!(reader.next().unwrap(), IonType::NoType);
}

#[test]
fn symbol_values_intern_and_resolve() {
    let bytes = write_one(|w| {
        w.write_symbol("foo");
        w.write_symbol("bar");
        w.write_symbol("foo");
    });
    let mut reader = BinaryReader::new(&bytes);
    for expected in ["foo", "bar", "foo"] {
        assert_eq!(reader.next().unwrap(), IonType::Symbol);
        assert_eq!(reader.read_string().unwrap(), expected);
    }
    // "foo" and "bar" landed after the system table, in first-use order.
    assert_eq!(reader.symbol_table().find_by_text("foo"), Some(10));
    assert_eq!(reader.symbol_table().find_by_text("bar"), Some(11));
}

#[test]
fn local_symbol_table_is_absorbed() {
    // $ion_symbol_table::{symbols:["foo"]} followed by symbol SID 10.
    let bytes = with_bvm(&[
        0xe9, 0x81, 0x83, 0xd6, 0x87, 0xb4, 0x83, 0x66, 0x6f, 0x6f, 0x71, 0x0a,
    ]);
    let mut reader = BinaryReader::new(&bytes);
    assert_eq!(reader.next().unwrap(), IonType::Symbol);
    assert_eq!(reader.read_string().unwrap(), "foo");
    assert_eq!(reader.next().unwrap(), IonType::NoType);

    // Re-encoding produces an equivalent table and reference.
    let mut reader = BinaryReader::new(&bytes);
    let mut writer = BinaryWriter::new();
    copy_all(&mut reader, &mut writer).unwrap();
    writer.finish().unwrap();
    let mut reader = BinaryReader::new(writer.bytes());
    assert_eq!(reader.next().unwrap(), IonType::Symbol);
    assert_eq!(reader.read_string().unwrap(), "foo");
}

#[test]
fn bvm_repetition_resets_the_symbol_table() {
    let mut writer = BinaryWriter::new();
    writer.write_symbol("foo");
    writer.finish().unwrap();
    let mut stream = writer.bytes().to_vec();
    // A second document: its own BVM, table, and symbol value.
    stream.extend_from_slice(writer.bytes());

    let mut reader = BinaryReader::new(&stream);
    assert_eq!(reader.next().unwrap(), IonType::Symbol);
    assert_eq!(reader.read_string().unwrap(), "foo");
    assert_eq!(reader.next().unwrap(), IonType::Symbol);
    assert_eq!(reader.read_string().unwrap(), "foo");
    assert_eq!(reader.symbol_table().max_id(), 10);
    assert_eq!(reader.next().unwrap(), IonType::NoType);
}

#[test]
fn nop_padding_is_skipped() {
    // One-byte pad, then int 1.
    let mut reader = BinaryReader::new(&with_bvm(&[0x00, 0x21, 0x01]));
    assert_eq!(reader.next().unwrap(), IonType::Int);
    assert_eq!(reader.read_i64().unwrap(), 1);

    // Multi-byte pad.
    let mut reader = BinaryReader::new(&with_bvm(&[0x03, 0xff, 0xff, 0xff, 0x21, 0x01]));
    assert_eq!(reader.next().unwrap(), IonType::Int);
    assert_eq!(reader.read_i64().unwrap(), 1);
}

#[test]
fn annotated_values_resolve_annotations() {
    let bytes = write_one(|w| {
        w.annotation("answer");
        w.write_i64(42);
    });
    let mut reader = BinaryReader::new(&bytes);
    assert_eq!(reader.next().unwrap(), IonType::Int);
    assert_eq!(reader.annotations().unwrap(), vec!["answer".to_owned()]);
    assert_eq!(reader.read_i64().unwrap(), 42);
}

#[test]
fn malformed_inputs_error_and_stick() {
    let cases: Vec<Vec<u8>> = vec![
        // Bad version marker.
        vec![0xe0, 0x01, 0x00, 0xeb],
        // Value before any BVM.
        vec![0x21, 0x01],
        // Negative zero int, both immediate and padded forms.
        with_bvm(&[0x30]),
        with_bvm(&[0x31, 0x00]),
        // Reserved type code.
        with_bvm(&[0xf0]),
        // Invalid bool length.
        with_bvm(&[0x12]),
        // Unsupported float length.
        with_bvm(&[0x42, 0x00, 0x00]),
        // Truncated string body.
        with_bvm(&[0x84, 0x66, 0x6f]),
        // Annotation wrapper with no annotations.
        with_bvm(&[0xe2, 0x80, 0x0f]),
        // Annotation wrapper around nop padding.
        with_bvm(&[0xe3, 0x81, 0x84, 0x00]),
    ];
    for bytes in cases {
        let mut reader = BinaryReader::new(&bytes);
        let mut result = reader.next();
        // Walk to the failure point if the first value parses.
        while let Ok(t) = result {
            assert_ne!(t, IonType::NoType, "expected an error for {bytes:02x?}");
            result = reader.next();
        }
        let err = result.unwrap_err();
        assert!(
            matches!(err, IonError::Malformed { .. }),
            "unexpected error {err:?} for {bytes:02x?}"
        );
        // The error is sticky.
        assert_eq!(reader.next().unwrap_err(), err);
    }
}

#[test]
fn container_overrun_is_malformed() {
    // List claims one byte of body but its child needs two.
    let mut reader = BinaryReader::new(&with_bvm(&[0xb1, 0x21, 0x01]));
    assert_eq!(reader.next().unwrap(), IonType::List);
    reader.step_in().unwrap();
    assert!(matches!(
        reader.next(),
        Err(IonError::Malformed { .. })
    ));
}

#[test]
fn unknown_field_symbol_is_reported_on_access() {
    // {$10: 0} without a symbol table entry for SID 10.
    let mut reader = BinaryReader::new(&with_bvm(&[0xd2, 0x8a, 0x20]));
    assert_eq!(reader.next().unwrap(), IonType::Struct);
    reader.step_in().unwrap();
    assert_eq!(reader.next().unwrap(), IonType::Int);
    assert_eq!(
        reader.field_name().unwrap_err(),
        IonError::UnresolvedSymbol(10)
    );
    // Not sticky: the value itself is still readable.
    assert_eq!(reader.read_i64().unwrap(), 0);
}

#[test]
fn type_mismatch_is_recoverable() {
    let mut reader = BinaryReader::new(&with_bvm(&[0x21, 0x2a]));
    assert_eq!(reader.next().unwrap(), IonType::Int);
    assert!(matches!(
        reader.read_string(),
        Err(IonError::TypeMismatch { .. })
    ));
    assert_eq!(reader.read_i64().unwrap(), 42);
}

#[test]
fn typed_nulls_roundtrip() {
    let types = [
        IonType::Bool,
        IonType::Int,
        IonType::Float,
        IonType::Decimal,
        IonType::Timestamp,
        IonType::String,
        IonType::Symbol,
        IonType::Blob,
        IonType::Clob,
        IonType::Struct,
        IonType::List,
        IonType::Sexp,
    ];
    for t in types {
        let bytes = write_one(|w| w.write_null_of(t));
        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.next().unwrap(), t, "null.{t}");
        assert!(reader.is_null());
        if t.is_container() {
            assert!(reader.step_in().is_err());
        }
    }
}

#[test]
fn writer_usage_violations_latch() {
    // Field name outside a struct.
    let mut writer = BinaryWriter::new();
    writer.field_name("a");
    assert!(matches!(writer.err(), Some(IonError::Usage(_))));
    assert!(writer.finish().is_err());

    // Missing field name inside a struct.
    let mut writer = BinaryWriter::new();
    writer.begin_struct();
    writer.write_i64(1);
    assert!(writer.err().is_some());

    // Mismatched container close.
    let mut writer = BinaryWriter::new();
    writer.begin_list();
    writer.end_struct();
    assert!(writer.err().is_some());

    // Finish with an open container.
    let mut writer = BinaryWriter::new();
    writer.begin_list();
    assert!(writer.finish().is_err());

    // Writing after finish.
    let mut writer = BinaryWriter::new();
    writer.finish().unwrap();
    writer.write_i64(1);
    assert!(writer.err().is_some());
}

#[test]
fn sorted_struct_length_form_is_accepted() {
    // D1 (sorted struct): VarUInt length 2, then field SID 4 ("name") and
    // int 0.
    let mut reader = BinaryReader::new(&with_bvm(&[0xd1, 0x82, 0x84, 0x20]));
    assert_eq!(reader.next().unwrap(), IonType::Struct);
    reader.step_in().unwrap();
    assert_eq!(reader.next().unwrap(), IonType::Int);
    assert_eq!(reader.field_name().unwrap(), "name");
}

#[test]
fn struct_wire_bytes_with_system_field() {
    // "name" is system SID 4, so no local table is emitted.
    let mut writer = BinaryWriter::new();
    writer.begin_struct();
    writer.field_name("name");
    writer.write_bool(true);
    writer.end_struct();
    writer.finish().unwrap();
    assert_eq!(&writer.bytes()[4..], &[0xd2, 0x84, 0x11]);

    let mut writer = BinaryWriter::new();
    writer.begin_struct();
    writer.end_struct();
    writer.finish().unwrap();
    assert_eq!(&writer.bytes()[4..], &[0xd0]);
}
