//! Streaming writer for canonical Ion text.
//!
//! Output goes straight to an [`ion_buffers::Writer`]: top-level values on
//! their own lines, `,` separators in structs and lists, whitespace in
//! sexps, symbols left bare whenever the identifier grammar allows it.

use ion_buffers::Writer;
use num_bigint::BigInt;

use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::text::scanner::{is_identifier, is_keyword};
use crate::timestamp::Timestamp;
use crate::types::IonType;
use crate::writer::{IonWriter, ValuePrelude, WriterCore};

/// Streaming text writer. Output becomes available from
/// [`TextWriter::text`] after [`finish`](IonWriter::finish).
pub struct TextWriter {
    core: WriterCore,
    out: Writer,
    /// Whether a value was already written at each open depth (index 0 is
    /// the top level).
    seen: Vec<bool>,
    finished_text: String,
}

impl Default for TextWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextWriter {
    pub fn new() -> Self {
        Self {
            core: WriterCore::new(),
            out: Writer::new(),
            seen: vec![false],
            finished_text: String::new(),
        }
    }

    /// The finished document. Empty until `finish` succeeds.
    pub fn text(&self) -> &str {
        &self.finished_text
    }

    /// Writes separators, the field name, and annotations; returns false
    /// when the writer is latched.
    fn begin_value(&mut self) -> bool {
        if !self.core.usable() {
            return false;
        }
        let prelude = match self.core.begin_value() {
            Ok(p) => p,
            Err(_) => return false,
        };
        self.write_prelude(&prelude);
        true
    }

    fn write_prelude(&mut self, prelude: &ValuePrelude) {
        let depth = self.core.depth();
        if self.seen[depth] {
            if depth == 0 {
                self.out.u8(b'\n');
            } else if self.core.in_sexp() {
                self.out.u8(b' ');
            } else {
                self.out.u8(b',');
            }
        }
        self.seen[depth] = true;

        if let Some(name) = &prelude.field_name {
            self.write_symbol_text(name);
            self.out.u8(b':');
        }
        for annotation in &prelude.annotations {
            self.write_symbol_text(annotation);
            self.out.ascii("::");
        }
    }

    /// Writes a symbol, bare when the identifier grammar and the reserved
    /// words allow, single-quoted otherwise.
    fn write_symbol_text(&mut self, text: &str) {
        if is_identifier(text) && !is_keyword(text) {
            self.out.utf8(text);
            return;
        }
        self.out.u8(b'\'');
        for c in text.chars() {
            match c {
                '\'' => self.out.ascii("\\'"),
                '\\' => self.out.ascii("\\\\"),
                '\n' => self.out.ascii("\\n"),
                '\r' => self.out.ascii("\\r"),
                '\t' => self.out.ascii("\\t"),
                c if (c as u32) < 0x20 => {
                    self.out.ascii(&format!("\\x{:02x}", c as u32));
                }
                c => {
                    let mut buf = [0u8; 4];
                    self.out.utf8(c.encode_utf8(&mut buf));
                }
            }
        }
        self.out.u8(b'\'');
    }

    fn write_string_body(&mut self, text: &str) {
        self.out.u8(b'"');
        for c in text.chars() {
            match c {
                '"' => self.out.ascii("\\\""),
                '\\' => self.out.ascii("\\\\"),
                '\n' => self.out.ascii("\\n"),
                '\r' => self.out.ascii("\\r"),
                '\t' => self.out.ascii("\\t"),
                c if (c as u32) < 0x20 => {
                    self.out.ascii(&format!("\\x{:02x}", c as u32));
                }
                c => {
                    let mut buf = [0u8; 4];
                    self.out.utf8(c.encode_utf8(&mut buf));
                }
            }
        }
        self.out.u8(b'"');
    }

    fn begin_container(&mut self, ion_type: IonType, open: u8) {
        if !self.begin_value() {
            return;
        }
        self.out.u8(open);
        self.core.push_container(ion_type);
        self.seen.push(false);
    }

    fn end_container(&mut self, ion_type: IonType, close: u8) {
        if !self.core.usable() {
            return;
        }
        if self.core.pop_container(ion_type).is_err() {
            return;
        }
        self.seen.pop();
        self.out.u8(close);
    }
}

impl IonWriter for TextWriter {
    fn in_struct(&self) -> bool {
        self.core.in_struct()
    }

    fn in_list(&self) -> bool {
        self.core.in_list()
    }

    fn in_sexp(&self) -> bool {
        self.core.in_sexp()
    }

    fn depth(&self) -> usize {
        self.core.depth()
    }

    fn err(&self) -> Option<&IonError> {
        self.core.err()
    }

    fn field_name(&mut self, name: &str) {
        self.core.set_field_name(name);
    }

    fn annotation(&mut self, value: &str) {
        self.core.set_annotations(vec![value.to_owned()]);
    }

    fn annotations(&mut self, values: &[String]) {
        self.core.set_annotations(values.to_vec());
    }

    fn begin_struct(&mut self) {
        self.begin_container(IonType::Struct, b'{');
    }

    fn end_struct(&mut self) {
        self.end_container(IonType::Struct, b'}');
    }

    fn begin_list(&mut self) {
        self.begin_container(IonType::List, b'[');
    }

    fn end_list(&mut self) {
        self.end_container(IonType::List, b']');
    }

    fn begin_sexp(&mut self) {
        self.begin_container(IonType::Sexp, b'(');
    }

    fn end_sexp(&mut self) {
        self.end_container(IonType::Sexp, b')');
    }

    fn write_null(&mut self) {
        if self.begin_value() {
            self.out.ascii("null");
        }
    }

    fn write_null_of(&mut self, ion_type: IonType) {
        if !self.begin_value() {
            return;
        }
        if matches!(ion_type, IonType::Null | IonType::NoType) {
            self.out.ascii("null.null");
        } else {
            self.out.ascii(&format!("null.{ion_type}"));
        }
    }

    fn write_bool(&mut self, value: bool) {
        if self.begin_value() {
            self.out.ascii(if value { "true" } else { "false" });
        }
    }

    fn write_i64(&mut self, value: i64) {
        if self.begin_value() {
            self.out.ascii(&value.to_string());
        }
    }

    fn write_big_int(&mut self, value: &BigInt) {
        if self.begin_value() {
            self.out.ascii(&value.to_string());
        }
    }

    fn write_f64(&mut self, value: f64) {
        if !self.begin_value() {
            return;
        }
        if value.is_nan() {
            self.out.ascii("nan");
        } else if value == f64::INFINITY {
            self.out.ascii("+inf");
        } else if value == f64::NEG_INFINITY {
            self.out.ascii("-inf");
        } else {
            // {:e} always carries an exponent, which is what separates a
            // float from an int or decimal in Ion text.
            self.out.ascii(&format!("{value:e}"));
        }
    }

    fn write_decimal(&mut self, value: &Decimal) {
        if self.begin_value() {
            self.out.ascii(&value.to_string());
        }
    }

    fn write_timestamp(&mut self, value: &Timestamp) {
        if self.begin_value() {
            self.out.ascii(&value.format());
        }
    }

    fn write_symbol(&mut self, value: &str) {
        if self.begin_value() {
            self.write_symbol_text(value);
        }
    }

    fn write_string(&mut self, value: &str) {
        if self.begin_value() {
            self.write_string_body(value);
        }
    }

    fn write_blob(&mut self, value: &[u8]) {
        if !self.begin_value() {
            return;
        }
        self.out.ascii("{{");
        self.out.ascii(&ion_base64::to_base64(value));
        self.out.ascii("}}");
    }

    fn write_clob(&mut self, value: &[u8]) {
        if !self.begin_value() {
            return;
        }
        self.out.ascii("{{\"");
        for &b in value {
            match b {
                b'"' => self.out.ascii("\\\""),
                b'\\' => self.out.ascii("\\\\"),
                b'\n' => self.out.ascii("\\n"),
                b'\r' => self.out.ascii("\\r"),
                b'\t' => self.out.ascii("\\t"),
                b if (0x20..0x7f).contains(&b) => self.out.u8(b),
                b => self.out.ascii(&format!("\\x{b:02x}")),
            }
        }
        self.out.ascii("\"}}");
    }

    fn finish(&mut self) -> IonResult<()> {
        self.core.finish()?;
        let bytes = self.out.flush();
        self.finished_text =
            String::from_utf8(bytes).map_err(|_| IonError::Io("non-UTF-8 output".to_owned()))?;
        Ok(())
    }
}
