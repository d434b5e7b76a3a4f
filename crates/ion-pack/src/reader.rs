//! The pull-reader contract shared by the binary and text decoders, plus
//! the reader→writer copy loop.

use num_bigint::BigInt;

use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::symbols::SymbolTable;
use crate::timestamp::Timestamp;
use crate::types::IonType;
use crate::writer::IonWriter;

/// A pull-style Ion reader.
///
/// [`next`](IonReader::next) advances to the next sibling value and returns
/// its type, or [`IonType::NoType`] once the current container (or the
/// stream) is exhausted. Scalar accessors decode the current value on
/// demand without moving the cursor; a `TypeMismatch` or `OutOfRange` from
/// an accessor leaves the reader usable, while malformed input latches the
/// reader in its error state permanently.
pub trait IonReader {
    /// The symbol table currently in effect.
    fn symbol_table(&self) -> &SymbolTable;

    /// Advances to the next value in the current container.
    fn next(&mut self) -> IonResult<IonType>;

    /// Type of the current value without consuming it.
    fn ion_type(&self) -> IonType;

    /// Whether the current value is a null (typed or untyped).
    fn is_null(&self) -> bool;

    /// Number of open containers.
    fn depth(&self) -> usize;

    /// Enters the current container value.
    fn step_in(&mut self) -> IonResult<()>;

    /// Leaves the current container, skipping any unread children.
    fn step_out(&mut self) -> IonResult<()>;

    /// Field name of the current value. Only legal inside a struct.
    fn field_name(&self) -> IonResult<String>;

    /// Annotations of the current value, in order. Empty when none.
    fn annotations(&self) -> IonResult<Vec<String>>;

    fn read_bool(&mut self) -> IonResult<bool>;
    fn read_i64(&mut self) -> IonResult<i64>;
    fn read_big_int(&mut self) -> IonResult<BigInt>;
    fn read_f64(&mut self) -> IonResult<f64>;
    fn read_decimal(&mut self) -> IonResult<Decimal>;
    fn read_timestamp(&mut self) -> IonResult<Timestamp>;

    /// Text of the current string or symbol value.
    fn read_string(&mut self) -> IonResult<String>;

    /// Bytes of the current blob or clob value.
    fn read_bytes(&mut self) -> IonResult<Vec<u8>>;
}

/// Copies every remaining value at the reader's current depth to the
/// writer, recursing through containers.
pub fn copy_all<R, W>(reader: &mut R, writer: &mut W) -> IonResult<()>
where
    R: IonReader + ?Sized,
    W: IonWriter + ?Sized,
{
    loop {
        let ion_type = reader.next()?;
        if ion_type == IonType::NoType {
            return Ok(());
        }
        copy_value(reader, writer)?;
        if let Some(err) = writer.err() {
            return Err(err.clone());
        }
    }
}

/// Copies the value the reader is currently positioned on, including its
/// field name (when inside a struct) and annotations.
pub fn copy_value<R, W>(reader: &mut R, writer: &mut W) -> IonResult<()>
where
    R: IonReader + ?Sized,
    W: IonWriter + ?Sized,
{
    if writer.in_struct() {
        writer.field_name(&reader.field_name()?);
    }
    let annotations = reader.annotations()?;
    if !annotations.is_empty() {
        writer.annotations(&annotations);
    }

    let ion_type = reader.ion_type();
    if reader.is_null() {
        if ion_type == IonType::Null {
            writer.write_null();
        } else {
            writer.write_null_of(ion_type);
        }
        return Ok(());
    }

    match ion_type {
        IonType::Bool => writer.write_bool(reader.read_bool()?),
        IonType::Int => match reader.read_i64() {
            Ok(value) => writer.write_i64(value),
            Err(IonError::OutOfRange(_)) => writer.write_big_int(&reader.read_big_int()?),
            Err(err) => return Err(err),
        },
        IonType::Float => writer.write_f64(reader.read_f64()?),
        IonType::Decimal => writer.write_decimal(&reader.read_decimal()?),
        IonType::Timestamp => writer.write_timestamp(&reader.read_timestamp()?),
        IonType::Symbol => writer.write_symbol(&reader.read_string()?),
        IonType::String => writer.write_string(&reader.read_string()?),
        IonType::Blob => writer.write_blob(&reader.read_bytes()?),
        IonType::Clob => writer.write_clob(&reader.read_bytes()?),
        IonType::Struct | IonType::List | IonType::Sexp => {
            reader.step_in()?;
            match ion_type {
                IonType::Struct => writer.begin_struct(),
                IonType::List => writer.begin_list(),
                _ => writer.begin_sexp(),
            }
            copy_all(reader, writer)?;
            match ion_type {
                IonType::Struct => writer.end_struct(),
                IonType::List => writer.end_list(),
                _ => writer.end_sexp(),
            }
            reader.step_out()?;
        }
        IonType::NoType | IonType::Null => {
            return Err(IonError::usage("copy_value called with no current value"));
        }
    }
    Ok(())
}
