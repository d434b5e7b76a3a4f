//! Reader→writer copy loops across both encodings.

use ion_pack::{
    copy_all, BinaryReader, BinaryWriter, IonReader, IonType, IonWriter, TextReader, TextWriter,
};

/// Documents covering every type, containers, annotations, and nulls.
const DOCUMENTS: &[&str] = &[
    "null",
    "null.int",
    "true false",
    "0 42 -7 1234567890123456789",
    "123456789012345678901234567890",
    "0.5e0 -1.25e2 nan +inf -inf",
    "1.5 1.00 -0. 1d3 0.001",
    "2007T 2007-02T 2007-02-23 2007-02-23T12:14Z",
    "2007-02-23T12:14:33.079-08:00 2001-01-01T00:00:00.000-00:00",
    "\"hello\" \"uni \\u00e9\" \"\"",
    "sym 'quoted sym' ''",
    "{{aGVsbG8=}} {{\"clob\"}}",
    "[] [1, [2, [3]]] {} {a: 1} (a + 1)",
    "{a: 1, b: [true, null, \"x\"], c: {d: e::2}}",
    "ann::42 a::b::[1, ann::{x: y::2}]",
    "{repeated: 1, repeated: 2}",
];

/// Re-reads `reader` and `other` in lock step, asserting identical event
/// streams and scalar values.
fn assert_same_stream<A: IonReader, B: IonReader>(a: &mut A, b: &mut B) {
    loop {
        let ta = a.next().unwrap();
        let tb = b.next().unwrap();
        assert_eq!(ta, tb, "event type diverged");
        if ta == IonType::NoType {
            if a.depth() == 0 {
                return;
            }
            a.step_out().unwrap();
            b.step_out().unwrap();
            continue;
        }
        if a.depth() > 0 {
            let fa = a.field_name();
            let fb = b.field_name();
            match (fa, fb) {
                (Ok(na), Ok(nb)) => assert_eq!(na, nb, "field name diverged"),
                (Err(_), Err(_)) => {}
                (fa, fb) => panic!("field name divergence: {fa:?} vs {fb:?}"),
            }
        }
        assert_eq!(
            a.annotations().unwrap(),
            b.annotations().unwrap(),
            "annotations diverged"
        );
        assert_eq!(a.is_null(), b.is_null());
        if a.is_null() {
            continue;
        }
        match ta {
            IonType::Bool => assert_eq!(a.read_bool().unwrap(), b.read_bool().unwrap()),
            IonType::Int => assert_eq!(a.read_big_int().unwrap(), b.read_big_int().unwrap()),
            IonType::Float => {
                let va = a.read_f64().unwrap();
                let vb = b.read_f64().unwrap();
                assert!(va.to_bits() == vb.to_bits() || (va.is_nan() && vb.is_nan()));
            }
            IonType::Decimal => assert_eq!(a.read_decimal().unwrap(), b.read_decimal().unwrap()),
            IonType::Timestamp => {
                assert_eq!(a.read_timestamp().unwrap(), b.read_timestamp().unwrap())
            }
            IonType::String | IonType::Symbol => {
                assert_eq!(a.read_string().unwrap(), b.read_string().unwrap())
            }
            IonType::Blob | IonType::Clob => {
                assert_eq!(a.read_bytes().unwrap(), b.read_bytes().unwrap())
            }
            IonType::Struct | IonType::List | IonType::Sexp => {
                a.step_in().unwrap();
                b.step_in().unwrap();
            }
            IonType::NoType | IonType::Null => unreachable!(),
        }
    }
}

fn text_to_binary(text: &str) -> Vec<u8> {
    let mut reader = TextReader::new(text);
    let mut writer = BinaryWriter::new();
    copy_all(&mut reader, &mut writer).unwrap();
    writer.finish().unwrap();
    writer.bytes().to_vec()
}

fn binary_to_text(bytes: &[u8]) -> String {
    let mut reader = BinaryReader::new(bytes);
    let mut writer = TextWriter::new();
    copy_all(&mut reader, &mut writer).unwrap();
    writer.finish().unwrap();
    writer.text().to_owned()
}

fn text_to_text(text: &str) -> String {
    let mut reader = TextReader::new(text);
    let mut writer = TextWriter::new();
    copy_all(&mut reader, &mut writer).unwrap();
    writer.finish().unwrap();
    writer.text().to_owned()
}

#[test]
fn text_roundtrips_semantically() {
    for document in DOCUMENTS {
        let rewritten = text_to_text(document);
        let mut original = TextReader::new(document);
        let mut roundtripped = TextReader::new(&rewritten);
        assert_same_stream(&mut original, &mut roundtripped);
    }
}

#[test]
fn text_to_binary_to_text_preserves_the_stream() {
    for document in DOCUMENTS {
        let binary = text_to_binary(document);
        let text = binary_to_text(&binary);
        let mut original = TextReader::new(document);
        let mut roundtripped = TextReader::new(&text);
        assert_same_stream(&mut original, &mut roundtripped);
    }
}

#[test]
fn binary_reencoding_is_stable() {
    // Once a document has been written by our binary writer, reading it
    // back and writing it again must reproduce the bytes exactly (the
    // first pass already normalized nop pads and table emission).
    for document in DOCUMENTS {
        let first = text_to_binary(document);
        let mut reader = BinaryReader::new(&first);
        let mut writer = BinaryWriter::new();
        copy_all(&mut reader, &mut writer).unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.bytes(), &first[..], "for {document:?}");
    }
}

#[test]
fn binary_roundtrip_preserves_the_stream() {
    for document in DOCUMENTS {
        let binary = text_to_binary(document);
        let mut original = TextReader::new(document);
        let mut decoded = BinaryReader::new(&binary);
        assert_same_stream(&mut original, &mut decoded);
    }
}

#[test]
fn every_reader_terminates_with_no_type() {
    for document in DOCUMENTS {
        let mut reader = TextReader::new(document);
        loop {
            match reader.next().unwrap() {
                IonType::NoType => break,
                _ => {}
            }
        }
        assert_eq!(reader.next().unwrap(), IonType::NoType);

        let binary = text_to_binary(document);
        let mut reader = BinaryReader::new(&binary);
        loop {
            match reader.next().unwrap() {
                IonType::NoType => break,
                _ => {}
            }
        }
        assert_eq!(reader.next().unwrap(), IonType::NoType);
    }
}

#[test]
fn clean_writers_report_no_error_after_finish() {
    for document in DOCUMENTS {
        let mut reader = TextReader::new(document);
        let mut writer = BinaryWriter::new();
        copy_all(&mut reader, &mut writer).unwrap();
        writer.finish().unwrap();
        assert!(writer.err().is_none(), "for {document:?}");
    }
}

#[test]
fn symbol_table_roundtrip_through_binary() {
    // A binary stream with a local table: reading and re-writing emits an
    // equivalent table and resolves to the same text.
    let binary = text_to_binary("{name: sym, other: sym}");
    let mut reader = BinaryReader::new(&binary);
    assert_eq!(reader.next().unwrap(), IonType::Struct);
    reader.step_in().unwrap();
    assert_eq!(reader.next().unwrap(), IonType::Symbol);
    assert_eq!(reader.field_name().unwrap(), "name");
    assert_eq!(reader.read_string().unwrap(), "sym");
    assert_eq!(reader.next().unwrap(), IonType::Symbol);
    assert_eq!(reader.field_name().unwrap(), "other");
    assert_eq!(reader.read_string().unwrap(), "sym");
}
