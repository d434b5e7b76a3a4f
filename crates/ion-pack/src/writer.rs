//! The streaming-writer contract shared by the binary and text encoders,
//! plus the structural-state core both implementations drive.

use num_bigint::BigInt;

use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::timestamp::Timestamp;
use crate::types::IonType;

/// A streaming Ion writer.
///
/// Write calls do not return errors; the first structural violation (or
/// sink failure) latches the writer and every later call becomes a no-op.
/// [`err`](IonWriter::err) exposes the latched error and
/// [`finish`](IonWriter::finish) returns it.
pub trait IonWriter {
    fn in_struct(&self) -> bool;
    fn in_list(&self) -> bool;
    fn in_sexp(&self) -> bool;

    /// Number of open containers.
    fn depth(&self) -> usize;

    /// The latched error, if any.
    fn err(&self) -> Option<&IonError>;

    /// Sets the field name for the next value. Required inside a struct,
    /// forbidden elsewhere.
    fn field_name(&mut self, name: &str);

    /// Attaches one annotation to the next value.
    fn annotation(&mut self, value: &str);

    /// Attaches an ordered annotation sequence to the next value. At most
    /// one of `annotation`/`annotations` may be used per value.
    fn annotations(&mut self, values: &[String]);

    fn begin_struct(&mut self);
    fn end_struct(&mut self);
    fn begin_list(&mut self);
    fn end_list(&mut self);
    fn begin_sexp(&mut self);
    fn end_sexp(&mut self);

    /// Writes the untyped `null`.
    fn write_null(&mut self);
    /// Writes a typed null, `null.T`.
    fn write_null_of(&mut self, ion_type: IonType);

    fn write_bool(&mut self, value: bool);
    fn write_i64(&mut self, value: i64);
    fn write_big_int(&mut self, value: &BigInt);
    fn write_f64(&mut self, value: f64);
    fn write_decimal(&mut self, value: &Decimal);
    fn write_timestamp(&mut self, value: &Timestamp);
    fn write_symbol(&mut self, value: &str);
    fn write_string(&mut self, value: &str);
    fn write_blob(&mut self, value: &[u8]);
    fn write_clob(&mut self, value: &[u8]);

    /// Flushes the stream. Fails if a container is still open; the writer
    /// is terminal afterwards.
    fn finish(&mut self) -> IonResult<()>;
}

/// Field name and annotations captured for the value about to be written.
pub(crate) struct ValuePrelude {
    pub field_name: Option<String>,
    pub annotations: Vec<String>,
}

/// Structural bookkeeping shared by both writer implementations: the
/// container stack, the pending field name and annotations, and the
/// latched error.
pub(crate) struct WriterCore {
    containers: Vec<IonType>,
    field: Option<String>,
    annotations: Option<Vec<String>>,
    err: Option<IonError>,
    finished: bool,
}

impl WriterCore {
    pub fn new() -> Self {
        Self {
            containers: Vec::new(),
            field: None,
            annotations: None,
            err: None,
            finished: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    pub fn parent(&self) -> Option<IonType> {
        self.containers.last().copied()
    }

    pub fn in_struct(&self) -> bool {
        self.parent() == Some(IonType::Struct)
    }

    pub fn in_list(&self) -> bool {
        self.parent() == Some(IonType::List)
    }

    pub fn in_sexp(&self) -> bool {
        self.parent() == Some(IonType::Sexp)
    }

    pub fn err(&self) -> Option<&IonError> {
        self.err.as_ref()
    }

    pub fn fail(&mut self, err: IonError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Whether the writer can accept the next call at all.
    pub fn usable(&mut self) -> bool {
        if self.err.is_some() {
            return false;
        }
        if self.finished {
            self.fail(IonError::usage("writer already finished"));
            return false;
        }
        true
    }

    pub fn set_field_name(&mut self, name: &str) {
        if !self.usable() {
            return;
        }
        if !self.in_struct() {
            self.fail(IonError::usage("field name is only legal inside a struct"));
            return;
        }
        self.field = Some(name.to_owned());
    }

    pub fn set_annotations(&mut self, values: Vec<String>) {
        if !self.usable() {
            return;
        }
        if self.annotations.is_some() {
            self.fail(IonError::usage(
                "annotations may be set at most once per value",
            ));
            return;
        }
        self.annotations = Some(values);
    }

    /// Consumes the pending field name and annotations for a value write,
    /// enforcing the field-name invariant.
    pub fn begin_value(&mut self) -> IonResult<ValuePrelude> {
        if self.in_struct() && self.field.is_none() {
            let err = IonError::usage("value inside a struct requires a field name");
            self.fail(err.clone());
            return Err(err);
        }
        Ok(ValuePrelude {
            field_name: self.field.take(),
            annotations: self.annotations.take().unwrap_or_default(),
        })
    }

    pub fn push_container(&mut self, ion_type: IonType) {
        self.containers.push(ion_type);
    }

    pub fn pop_container(&mut self, expected: IonType) -> IonResult<()> {
        match self.containers.last() {
            Some(top) if *top == expected => {
                self.containers.pop();
                Ok(())
            }
            Some(top) => {
                let err = IonError::usage(format!("cannot end {expected} inside a {top}"));
                self.fail(err.clone());
                Err(err)
            }
            None => {
                let err = IonError::usage(format!("cannot end {expected} at the top level"));
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    /// Validates and records stream completion.
    pub fn finish(&mut self) -> IonResult<()> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if self.finished {
            return Err(IonError::usage("writer already finished"));
        }
        if !self.containers.is_empty() {
            let err = IonError::usage(format!(
                "finish with {} container(s) still open",
                self.containers.len()
            ));
            self.fail(err.clone());
            return Err(err);
        }
        if self.field.is_some() || self.annotations.is_some() {
            let err = IonError::usage("finish with a dangling field name or annotations");
            self.fail(err.clone());
            return Err(err);
        }
        self.finished = true;
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_name_outside_struct_latches() {
        let mut core = WriterCore::new();
        core.set_field_name("a");
        assert!(matches!(core.err(), Some(IonError::Usage(_))));
    }

    #[test]
    fn double_annotations_latch() {
        let mut core = WriterCore::new();
        core.set_annotations(vec!["a".to_owned()]);
        core.set_annotations(vec!["b".to_owned()]);
        assert!(core.err().is_some());
    }

    #[test]
    fn struct_requires_field_name() {
        let mut core = WriterCore::new();
        core.push_container(IonType::Struct);
        assert!(core.begin_value().is_err());
        assert!(core.err().is_some());
    }

    #[test]
    fn mismatched_end_latches() {
        let mut core = WriterCore::new();
        core.push_container(IonType::List);
        assert!(core.pop_container(IonType::Struct).is_err());
        assert!(core.err().is_some());
    }

    #[test]
    fn finish_with_open_container_fails() {
        let mut core = WriterCore::new();
        core.push_container(IonType::List);
        assert!(core.finish().is_err());
    }

    #[test]
    fn finish_is_terminal() {
        let mut core = WriterCore::new();
        core.finish().unwrap();
        assert!(core.is_finished());
        assert!(!core.usable());
        assert!(core.err().is_some());
    }
}
