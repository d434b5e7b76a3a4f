//! Streaming writer for the Ion 1.0 binary form.
//!
//! Container lengths are unknown until the container closes, so every open
//! container gets its own byte buffer; closing it prefixes the buffer with
//! a type descriptor and appends the result to the parent. Symbols are
//! interned as they occur and the local symbol table is emitted ahead of
//! the buffered values on `finish`, so no value byte ever precedes a SID
//! it depends on.

use num_bigint::{BigInt, Sign};

use crate::binary::constants::{
    null_overlay_for, ION_BVM, LENGTH_NULL, LENGTH_VARUINT, SID_ION_SYMBOL_TABLE, SID_SYMBOLS,
    TypeOverlay,
};
use crate::binary::primitives as prim;
use crate::decimal::Decimal;
use crate::error::IonResult;
use crate::symbols::SymbolTable;
use crate::timestamp::{Precision, Timestamp, TimezoneKind};
use crate::types::IonType;
use crate::writer::{IonWriter, ValuePrelude, WriterCore};

/// Field name and annotations held back while a container is open.
struct OpenContainer {
    ion_type: IonType,
    prelude: ValuePrelude,
}

/// Streaming binary writer. Output becomes available from
/// [`BinaryWriter::bytes`] after [`finish`](IonWriter::finish).
pub struct BinaryWriter {
    core: WriterCore,
    symbols: SymbolTable,
    /// Value buffers: index 0 is the top level, one more per open container.
    bufs: Vec<Vec<u8>>,
    open: Vec<OpenContainer>,
    out: Vec<u8>,
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self {
            core: WriterCore::new(),
            symbols: SymbolTable::system(),
            bufs: vec![Vec::new()],
            open: Vec::new(),
            out: Vec::new(),
        }
    }

    /// The finished stream. Empty until `finish` succeeds.
    pub fn bytes(&self) -> &[u8] {
        &self.out
    }

    /// The symbol table accumulated while writing.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    fn target(&mut self) -> &mut Vec<u8> {
        self.bufs.last_mut().expect("top-level buffer always exists")
    }

    /// Applies the pending field name and annotation wrapper to an encoded
    /// value and appends it to the innermost buffer.
    fn commit(&mut self, prelude: ValuePrelude, encoded: Vec<u8>) {
        let field_sid = prelude.field_name.map(|name| self.symbols.intern(&name));
        let wrapped = if prelude.annotations.is_empty() {
            encoded
        } else {
            let mut sid_bytes = Vec::new();
            for annotation in &prelude.annotations {
                let sid = self.symbols.intern(annotation);
                prim::write_var_uint(&mut sid_bytes, sid);
            }
            let mut wrapper = Vec::with_capacity(encoded.len() + sid_bytes.len() + 4);
            let content_len =
                prim::var_uint_len(sid_bytes.len() as u64) + sid_bytes.len() + encoded.len();
            push_descriptor(&mut wrapper, TypeOverlay::ANNO, content_len);
            prim::write_var_uint(&mut wrapper, sid_bytes.len() as u64);
            wrapper.extend_from_slice(&sid_bytes);
            wrapper.extend_from_slice(&encoded);
            wrapper
        };
        let target = self.target();
        if let Some(sid) = field_sid {
            prim::write_var_uint(target, sid);
        }
        target.extend_from_slice(&wrapped);
    }

    fn write_scalar(&mut self, encoded: Vec<u8>) {
        if !self.core.usable() {
            return;
        }
        match self.core.begin_value() {
            Ok(prelude) => self.commit(prelude, encoded),
            Err(_) => {} // already latched
        }
    }

    fn begin_container(&mut self, ion_type: IonType) {
        if !self.core.usable() {
            return;
        }
        let prelude = match self.core.begin_value() {
            Ok(p) => p,
            Err(_) => return,
        };
        self.core.push_container(ion_type);
        self.bufs.push(Vec::new());
        self.open.push(OpenContainer { ion_type, prelude });
    }

    fn end_container(&mut self, ion_type: IonType) {
        if !self.core.usable() {
            return;
        }
        if self.core.pop_container(ion_type).is_err() {
            return;
        }
        let body = self.bufs.pop().expect("container buffer");
        let open = self.open.pop().expect("container record");
        let overlay = match open.ion_type {
            IonType::Struct => TypeOverlay::STRU,
            IonType::List => TypeOverlay::LIST,
            _ => TypeOverlay::SEXP,
        };
        let mut encoded = Vec::with_capacity(body.len() + 4);
        if open.ion_type == IonType::Struct && body.len() == 1 {
            // D1 is the sorted-struct form, so a one-byte struct spells its
            // length out as a VarUInt.
            encoded.push(overlay | LENGTH_VARUINT);
            prim::write_var_uint(&mut encoded, 1);
        } else {
            push_descriptor(&mut encoded, overlay, body.len());
        }
        encoded.extend_from_slice(&body);
        self.commit(open.prelude, encoded);
    }

    /// Encodes the `$ion_symbol_table` struct that precedes the values.
    fn encode_symbol_table(&self) -> Vec<u8> {
        let mut list_body = Vec::new();
        for text in self.symbols.local_symbols() {
            let text = text.as_deref().unwrap_or("");
            let mut string = Vec::with_capacity(text.len() + 4);
            push_descriptor(&mut string, TypeOverlay::STRI, text.len());
            string.extend_from_slice(text.as_bytes());
            list_body.extend_from_slice(&string);
        }

        let mut list = Vec::with_capacity(list_body.len() + 4);
        push_descriptor(&mut list, TypeOverlay::LIST, list_body.len());
        list.extend_from_slice(&list_body);

        let field_len = prim::var_uint_len(SID_SYMBOLS);
        let struct_len = field_len + list.len();
        let mut body = Vec::with_capacity(struct_len + 4);
        if struct_len == 1 {
            body.push(TypeOverlay::STRU | LENGTH_VARUINT);
            prim::write_var_uint(&mut body, 1);
        } else {
            push_descriptor(&mut body, TypeOverlay::STRU, struct_len);
        }
        prim::write_var_uint(&mut body, SID_SYMBOLS);
        body.extend_from_slice(&list);

        let mut sid_bytes = Vec::new();
        prim::write_var_uint(&mut sid_bytes, SID_ION_SYMBOL_TABLE);
        let content_len = prim::var_uint_len(sid_bytes.len() as u64) + sid_bytes.len() + body.len();
        let mut wrapper = Vec::with_capacity(content_len + 4);
        push_descriptor(&mut wrapper, TypeOverlay::ANNO, content_len);
        prim::write_var_uint(&mut wrapper, sid_bytes.len() as u64);
        wrapper.extend_from_slice(&sid_bytes);
        wrapper.extend_from_slice(&body);
        wrapper
    }
}

impl IonWriter for BinaryWriter {
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

    fn err(&self) -> Option<&crate::error::IonError> {
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
        self.begin_container(IonType::Struct);
    }

    fn end_struct(&mut self) {
        self.end_container(IonType::Struct);
    }

    fn begin_list(&mut self) {
        self.begin_container(IonType::List);
    }

    fn end_list(&mut self) {
        self.end_container(IonType::List);
    }

    fn begin_sexp(&mut self) {
        self.begin_container(IonType::Sexp);
    }

    fn end_sexp(&mut self) {
        self.end_container(IonType::Sexp);
    }

    fn write_null(&mut self) {
        self.write_scalar(vec![TypeOverlay::NULL | LENGTH_NULL]);
    }

    fn write_null_of(&mut self, ion_type: IonType) {
        self.write_scalar(vec![null_overlay_for(ion_type) | LENGTH_NULL]);
    }

    fn write_bool(&mut self, value: bool) {
        self.write_scalar(vec![TypeOverlay::BOOL | u8::from(value)]);
    }

    fn write_i64(&mut self, value: i64) {
        let overlay = if value < 0 {
            TypeOverlay::NINT
        } else {
            TypeOverlay::UINT
        };
        let mut body = Vec::with_capacity(8);
        prim::write_uint_u64(&mut body, value.unsigned_abs());
        let mut encoded = Vec::with_capacity(body.len() + 2);
        push_descriptor(&mut encoded, overlay, body.len());
        encoded.extend_from_slice(&body);
        self.write_scalar(encoded);
    }

    fn write_big_int(&mut self, value: &BigInt) {
        let overlay = if value.sign() == Sign::Minus {
            TypeOverlay::NINT
        } else {
            TypeOverlay::UINT
        };
        let mut body = Vec::new();
        prim::write_uint_big(&mut body, value.magnitude());
        let mut encoded = Vec::with_capacity(body.len() + 4);
        push_descriptor(&mut encoded, overlay, body.len());
        encoded.extend_from_slice(&body);
        self.write_scalar(encoded);
    }

    fn write_f64(&mut self, value: f64) {
        if value.to_bits() == 0 {
            // Positive zero has the dedicated empty encoding.
            self.write_scalar(vec![TypeOverlay::FLOT]);
            return;
        }
        let mut encoded = Vec::with_capacity(9);
        encoded.push(TypeOverlay::FLOT | 8);
        encoded.extend_from_slice(&value.to_be_bytes());
        self.write_scalar(encoded);
    }

    fn write_decimal(&mut self, value: &Decimal) {
        let mut body = Vec::new();
        if value.exponent() != 0 || !value.is_zero() || value.is_negative() {
            prim::write_var_int(&mut body, value.exponent());
            prim::write_int_parts(&mut body, value.is_negative(), value.magnitude());
        }
        let mut encoded = Vec::with_capacity(body.len() + 4);
        push_descriptor(&mut encoded, TypeOverlay::DECI, body.len());
        encoded.extend_from_slice(&body);
        self.write_scalar(encoded);
    }

    fn write_timestamp(&mut self, value: &Timestamp) {
        let mut body = Vec::new();
        match value.kind() {
            TimezoneKind::Unspecified => prim::write_var_int_parts(&mut body, true, 0),
            TimezoneKind::Utc => prim::write_var_int(&mut body, 0),
            TimezoneKind::Local => prim::write_var_int(&mut body, value.offset_minutes() as i64),
        }
        let utc = value.utc_date_time();
        use chrono::{Datelike, Timelike};
        prim::write_var_uint(&mut body, utc.year().max(0) as u64);
        let precision = value.precision();
        if precision >= Precision::Month {
            prim::write_var_uint(&mut body, utc.month() as u64);
        }
        if precision >= Precision::Day {
            prim::write_var_uint(&mut body, utc.day() as u64);
        }
        if precision >= Precision::Minute {
            prim::write_var_uint(&mut body, utc.hour() as u64);
            prim::write_var_uint(&mut body, utc.minute() as u64);
        }
        if precision >= Precision::Second {
            prim::write_var_uint(&mut body, utc.second() as u64);
        }
        if let Some((exponent, coefficient)) = value.fraction_parts() {
            if exponent < 0 {
                prim::write_var_int(&mut body, exponent as i64);
                let mut coeff = Vec::new();
                prim::write_uint_u64(&mut coeff, coefficient);
                // Int coefficient: guard the sign bit.
                if coeff.first().map(|b| b & 0x80 != 0).unwrap_or(false) {
                    body.push(0);
                }
                body.extend_from_slice(&coeff);
            }
        }
        let mut encoded = Vec::with_capacity(body.len() + 4);
        push_descriptor(&mut encoded, TypeOverlay::TIME, body.len());
        encoded.extend_from_slice(&body);
        self.write_scalar(encoded);
    }

    fn write_symbol(&mut self, value: &str) {
        if !self.core.usable() {
            return;
        }
        let sid = self.symbols.intern(value);
        let mut body = Vec::with_capacity(8);
        prim::write_uint_u64(&mut body, sid);
        let mut encoded = Vec::with_capacity(body.len() + 2);
        push_descriptor(&mut encoded, TypeOverlay::SYMB, body.len());
        encoded.extend_from_slice(&body);
        self.write_scalar(encoded);
    }

    fn write_string(&mut self, value: &str) {
        let bytes = value.as_bytes();
        let mut encoded = Vec::with_capacity(bytes.len() + 4);
        push_descriptor(&mut encoded, TypeOverlay::STRI, bytes.len());
        encoded.extend_from_slice(bytes);
        self.write_scalar(encoded);
    }

    fn write_blob(&mut self, value: &[u8]) {
        let mut encoded = Vec::with_capacity(value.len() + 4);
        push_descriptor(&mut encoded, TypeOverlay::BLOB, value.len());
        encoded.extend_from_slice(value);
        self.write_scalar(encoded);
    }

    fn write_clob(&mut self, value: &[u8]) {
        let mut encoded = Vec::with_capacity(value.len() + 4);
        push_descriptor(&mut encoded, TypeOverlay::CLOB, value.len());
        encoded.extend_from_slice(value);
        self.write_scalar(encoded);
    }

    fn finish(&mut self) -> IonResult<()> {
        self.core.finish()?;
        self.out.extend_from_slice(&ION_BVM);
        if self.symbols.has_local_symbols() {
            let table = self.encode_symbol_table();
            self.out.extend_from_slice(&table);
        }
        let top = std::mem::take(&mut self.bufs[0]);
        self.out.extend_from_slice(&top);
        Ok(())
    }
}

/// Writes `overlay | L` with the length following as a VarUInt when it does
/// not fit the nibble.
fn push_descriptor(out: &mut Vec<u8>, overlay: u8, length: usize) {
    if length < LENGTH_VARUINT as usize {
        out.push(overlay | length as u8);
    } else {
        out.push(overlay | LENGTH_VARUINT);
        prim::write_var_uint(out, length as u64);
    }
}
