//! Amazon Ion 1.0 codec: pull readers and streaming writers for both the
//! self-describing text form and the compact binary form, sharing one
//! value model (arbitrary-precision ints and decimals, precision-tracking
//! timestamps) and one symbol-table machinery.
//!
//! Reading is pull-style: [`IonReader::next`] advances over sibling
//! values, [`IonReader::step_in`]/[`IonReader::step_out`] move through
//! containers, and scalar accessors decode the current value on demand.
//! Writing mirrors it with `begin_*`/`end_*` and typed `write_*` calls;
//! the binary writer interns symbols as they occur and emits the local
//! symbol table ahead of the values on [`IonWriter::finish`].

pub mod binary;
mod decimal;
mod error;
mod reader;
mod symbols;
pub mod text;
mod timestamp;
mod types;
mod writer;

pub use binary::{BinaryReader, BinaryWriter};
pub use decimal::Decimal;
pub use error::{IonError, IonResult};
pub use reader::{copy_all, copy_value, IonReader};
pub use symbols::{SharedImport, SymbolTable, SYSTEM_MAX_ID};
pub use text::{TextReader, TextWriter};
pub use timestamp::{Precision, Timestamp, TimezoneKind};
pub use types::IonType;
pub use writer::IonWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_binary_document() {
        let mut reader = BinaryReader::new(&[0xe0, 0x01, 0x00, 0xea]);
        assert_eq!(reader.next().unwrap(), IonType::NoType);

        let mut writer = BinaryWriter::new();
        writer.finish().unwrap();
        assert_eq!(writer.bytes(), &[0xe0, 0x01, 0x00, 0xea]);
    }

    #[test]
    fn annotated_int_text_to_binary() {
        let mut reader = TextReader::new("answer::42");
        assert_eq!(reader.next().unwrap(), IonType::Int);
        assert_eq!(reader.annotations().unwrap(), vec!["answer".to_owned()]);
        assert_eq!(reader.read_i64().unwrap(), 42);

        let mut writer = BinaryWriter::new();
        let mut reader = TextReader::new("answer::42");
        copy_all(&mut reader, &mut writer).unwrap();
        writer.finish().unwrap();

        let mut reader = BinaryReader::new(writer.bytes());
        assert_eq!(reader.next().unwrap(), IonType::Int);
        assert_eq!(reader.annotations().unwrap(), vec!["answer".to_owned()]);
        assert_eq!(reader.read_i64().unwrap(), 42);
        assert_eq!(reader.next().unwrap(), IonType::NoType);
    }

    #[test]
    fn nested_struct_event_stream() {
        let mut reader = TextReader::new("{a: 1, b: [2, 3]}");
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
        assert_eq!(reader.next().unwrap(), IonType::Int);
        assert_eq!(reader.read_i64().unwrap(), 3);
        assert_eq!(reader.next().unwrap(), IonType::NoType);
        reader.step_out().unwrap();

        assert_eq!(reader.next().unwrap(), IonType::NoType);
        reader.step_out().unwrap();
        assert_eq!(reader.next().unwrap(), IonType::NoType);
    }

    #[test]
    fn timestamp_precision_survives_format() {
        let text = "2001-01-01T00:00:00.000-00:00";
        let ts = Timestamp::parse(text).unwrap();
        assert_eq!(ts.precision(), Precision::Nanosecond);
        assert_eq!(ts.kind(), TimezoneKind::Unspecified);
        assert_eq!(ts.fractional_units(), 3);
        assert_eq!(ts.format(), text);
    }

    #[test]
    fn big_int_bounds() {
        let mut writer = BinaryWriter::new();
        let big: num_bigint::BigInt = num_bigint::BigInt::from(1u8) << 64;
        writer.write_big_int(&big);
        writer.finish().unwrap();

        let mut reader = BinaryReader::new(writer.bytes());
        assert_eq!(reader.next().unwrap(), IonType::Int);
        assert!(matches!(reader.read_i64(), Err(IonError::OutOfRange(_))));
        assert_eq!(reader.read_big_int().unwrap(), big);
        // The failed narrowing did not disturb the cursor.
        assert_eq!(reader.next().unwrap(), IonType::NoType);
    }
}
