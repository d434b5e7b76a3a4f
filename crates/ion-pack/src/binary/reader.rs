//! Pull reader for the Ion 1.0 binary form.
//!
//! `next` drives a state machine over the raw bytes: it consumes version
//! markers and local symbol tables silently, skips nop padding, and leaves
//! the cursor positioned after the current value so that scalar accessors
//! can decode the recorded body range on demand without moving it.

use num_bigint::BigInt;

use crate::binary::constants::{
    type_for_code, ION_BVM, LENGTH_NULL, LENGTH_VARUINT, SID_IMPORTS, SID_ION_SYMBOL_TABLE,
    SID_MAX_ID, SID_NAME, SID_SYMBOLS, SID_VERSION, TypeCode,
};
use crate::binary::primitives as prim;
use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::reader::IonReader;
use crate::symbols::{SharedImport, SymbolTable};
use crate::timestamp::{Precision, Timestamp};
use crate::types::IonType;

/// One parsed type descriptor plus the body range it governs.
#[derive(Debug, Clone, Copy)]
struct Header {
    code: u8,
    len_nibble: u8,
    is_null: bool,
    body_start: usize,
    body_end: usize,
}

/// An open container: its type and the byte position where it ends.
#[derive(Debug, Clone, Copy)]
struct Frame {
    ion_type: IonType,
    end: usize,
}

/// The value the cursor is currently positioned on.
#[derive(Debug, Clone)]
struct Current {
    ion_type: IonType,
    code: u8,
    len_nibble: u8,
    is_null: bool,
    field_sid: Option<u64>,
    annotations: Vec<u64>,
    body: (usize, usize),
}

/// Pull reader over a complete binary Ion document.
pub struct BinaryReader {
    data: Vec<u8>,
    pos: usize,
    containers: Vec<Frame>,
    symbols: SymbolTable,
    current: Option<Current>,
    err: Option<IonError>,
    seen_bvm: bool,
}

impl BinaryReader {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            containers: Vec::new(),
            symbols: SymbolTable::system(),
            current: None,
            err: None,
            seen_bvm: false,
        }
    }

    fn check_usable(&self) -> IonResult<()> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Records sticky errors and hands the error back for propagation.
    fn fail(&mut self, err: IonError) -> IonError {
        if err.is_sticky() && self.err.is_none() {
            self.err = Some(err.clone());
        }
        err
    }

    fn container_end(&self) -> usize {
        self.containers
            .last()
            .map(|f| f.end)
            .unwrap_or(self.data.len())
    }

    fn in_struct(&self) -> bool {
        self.containers
            .last()
            .map(|f| f.ion_type == IonType::Struct)
            .unwrap_or(false)
    }

    fn next_impl(&mut self) -> IonResult<IonType> {
        self.current = None;
        let end = self.container_end();
        loop {
            if self.pos >= end {
                return Ok(IonType::NoType);
            }

            let at_top = self.containers.is_empty();
            if at_top && self.data[self.pos] == 0xe0 {
                if self.pos + 4 <= self.data.len() && self.data[self.pos..self.pos + 4] == ION_BVM {
                    self.pos += 4;
                    self.symbols = SymbolTable::system();
                    self.seen_bvm = true;
                    continue;
                }
                return Err(IonError::malformed(
                    self.pos,
                    "invalid binary version marker",
                ));
            }
            if at_top && !self.seen_bvm {
                return Err(IonError::malformed(
                    self.pos,
                    "stream does not start with a binary version marker",
                ));
            }

            let field_sid = if self.in_struct() {
                let sid = prim::read_var_uint(&self.data, &mut self.pos)?;
                if self.pos >= end {
                    return Err(IonError::malformed(self.pos, "field name without a value"));
                }
                Some(sid)
            } else {
                None
            };

            let header_at = self.pos;
            let header = read_header(&self.data, &mut self.pos)?;
            if header.body_end > end {
                return Err(IonError::malformed(header_at, "value overruns its container"));
            }

            // Nop padding carries no value.
            if header.code == TypeCode::NULL && !header.is_null {
                continue;
            }

            let (annotations, value) = if header.code == TypeCode::ANNO {
                if header.is_null {
                    return Err(IonError::malformed(header_at, "null annotation wrapper"));
                }
                parse_annotation_wrapper(&self.data, header_at, header)?
            } else {
                (Vec::new(), header)
            };

            validate_value_header(&self.data, &value, header_at)?;
            let ion_type = type_for_code(value.code)
                .ok_or_else(|| IonError::malformed(header_at, "unknown type code"))?;

            // A top-level struct annotated with $ion_symbol_table is a
            // symbol-table definition, absorbed rather than surfaced.
            if at_top
                && ion_type == IonType::Struct
                && !value.is_null
                && annotations.first() == Some(&SID_ION_SYMBOL_TABLE)
            {
                self.absorb_symbol_table(value.body_start, value.body_end)?;
                continue;
            }

            self.current = Some(Current {
                ion_type,
                code: value.code,
                len_nibble: value.len_nibble,
                is_null: value.is_null,
                field_sid,
                annotations,
                body: (value.body_start, value.body_end),
            });
            return Ok(ion_type);
        }
    }

    /// Installs the symbol table described by the struct body at
    /// `[start, end)`.
    fn absorb_symbol_table(&mut self, start: usize, end: usize) -> IonResult<()> {
        let mut cursor = start;
        let mut imports: Vec<SharedImport> = Vec::new();
        let mut append = false;
        let mut symbols: Vec<Option<String>> = Vec::new();

        while cursor < end {
            let sid = prim::read_var_uint(&self.data, &mut cursor)?;
            let at = cursor;
            let header = read_header(&self.data, &mut cursor)?;
            if header.body_end > end {
                return Err(IonError::malformed(at, "symbol table field overruns struct"));
            }
            match sid {
                SID_IMPORTS => {
                    if header.code == TypeCode::SYMB && !header.is_null {
                        let body = &self.data[header.body_start..header.body_end];
                        if prim::uint_as_u64(body) == Some(SID_ION_SYMBOL_TABLE) {
                            append = true;
                        }
                    } else if header.code == TypeCode::LIST && !header.is_null {
                        imports =
                            parse_import_list(&self.data, header.body_start, header.body_end)?;
                    }
                }
                SID_SYMBOLS => {
                    if header.code == TypeCode::LIST && !header.is_null {
                        let mut item = header.body_start;
                        while item < header.body_end {
                            let item_at = item;
                            let entry = read_header(&self.data, &mut item)?;
                            if entry.body_end > header.body_end {
                                return Err(IonError::malformed(
                                    item_at,
                                    "symbol entry overruns list",
                                ));
                            }
                            if entry.code == TypeCode::STRI && !entry.is_null {
                                let bytes = &self.data[entry.body_start..entry.body_end];
                                let text = std::str::from_utf8(bytes).map_err(|_| {
                                    IonError::malformed(item_at, "symbol text is not UTF-8")
                                })?;
                                symbols.push(Some(text.to_owned()));
                            } else {
                                // Non-string entries still claim a SID.
                                symbols.push(None);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        let mut table = if append {
            self.symbols.clone()
        } else {
            SymbolTable::with_imports(imports)
        };
        for text in symbols {
            table.append(text);
        }
        self.symbols = table;
        Ok(())
    }

    /// The current value if its type matches, with nulls rejected.
    fn scalar(&self, operation: &'static str, expected: IonType) -> IonResult<&Current> {
        let current = self
            .current
            .as_ref()
            .ok_or(IonError::mismatch(operation, IonType::NoType))?;
        if current.ion_type != expected {
            return Err(IonError::mismatch(operation, current.ion_type));
        }
        if current.is_null {
            return Err(IonError::mismatch(operation, IonType::Null));
        }
        Ok(current)
    }

    fn body_slice(&self, current: &Current) -> &[u8] {
        &self.data[current.body.0..current.body.1]
    }
}

impl IonReader for BinaryReader {
    fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    fn next(&mut self) -> IonResult<IonType> {
        self.check_usable()?;
        match self.next_impl() {
            Ok(t) => Ok(t),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn ion_type(&self) -> IonType {
        self.current
            .as_ref()
            .map(|c| c.ion_type)
            .unwrap_or(IonType::NoType)
    }

    fn is_null(&self) -> bool {
        self.current.as_ref().map(|c| c.is_null).unwrap_or(false)
    }

    fn depth(&self) -> usize {
        self.containers.len()
    }

    fn step_in(&mut self) -> IonResult<()> {
        self.check_usable()?;
        let current = match &self.current {
            Some(c) => c,
            None => return Err(IonError::mismatch("step_in", IonType::NoType)),
        };
        if !current.ion_type.is_container() {
            return Err(IonError::mismatch("step_in", current.ion_type));
        }
        if current.is_null {
            return Err(IonError::mismatch("step_in", IonType::Null));
        }
        let frame = Frame {
            ion_type: current.ion_type,
            end: current.body.1,
        };
        self.pos = current.body.0;
        self.containers.push(frame);
        self.current = None;
        Ok(())
    }

    fn step_out(&mut self) -> IonResult<()> {
        self.check_usable()?;
        let frame = match self.containers.pop() {
            Some(f) => f,
            None => {
                let err = IonError::usage("step_out at the top level");
                return Err(self.fail(err));
            }
        };
        self.pos = frame.end;
        self.current = None;
        Ok(())
    }

    fn field_name(&self) -> IonResult<String> {
        let current = self
            .current
            .as_ref()
            .ok_or(IonError::mismatch("field_name", IonType::NoType))?;
        if !self.in_struct() {
            return Err(IonError::mismatch("field_name", current.ion_type));
        }
        let sid = current
            .field_sid
            .ok_or(IonError::mismatch("field_name", current.ion_type))?;
        match self.symbols.find_by_id(sid) {
            Some(text) => Ok(text.to_owned()),
            None => Err(IonError::UnresolvedSymbol(sid)),
        }
    }

    fn annotations(&self) -> IonResult<Vec<String>> {
        let current = self
            .current
            .as_ref()
            .ok_or(IonError::mismatch("annotations", IonType::NoType))?;
        let mut out = Vec::with_capacity(current.annotations.len());
        for &sid in &current.annotations {
            match self.symbols.find_by_id(sid) {
                Some(text) => out.push(text.to_owned()),
                None => return Err(IonError::UnresolvedSymbol(sid)),
            }
        }
        Ok(out)
    }

    fn read_bool(&mut self) -> IonResult<bool> {
        self.check_usable()?;
        let current = self.scalar("read_bool", IonType::Bool)?;
        Ok(current.len_nibble == 1)
    }

    fn read_i64(&mut self) -> IonResult<i64> {
        self.check_usable()?;
        let current = self.scalar("read_i64", IonType::Int)?;
        let negative = current.code == TypeCode::NINT;
        let body = self.body_slice(current);
        let magnitude = prim::uint_as_u64(body)
            .ok_or_else(|| IonError::OutOfRange("int does not fit in 64 bits".to_owned()))?;
        if negative {
            if magnitude > (1u64 << 63) {
                return Err(IonError::OutOfRange(
                    "int does not fit in 64 bits".to_owned(),
                ));
            }
            Ok((magnitude as i128).wrapping_neg() as i64)
        } else {
            if magnitude > i64::MAX as u64 {
                return Err(IonError::OutOfRange(
                    "int does not fit in 64 bits".to_owned(),
                ));
            }
            Ok(magnitude as i64)
        }
    }

    fn read_big_int(&mut self) -> IonResult<BigInt> {
        self.check_usable()?;
        let current = self.scalar("read_big_int", IonType::Int)?;
        let negative = current.code == TypeCode::NINT;
        let magnitude = prim::uint_as_big(self.body_slice(current));
        let value = BigInt::from(magnitude);
        Ok(if negative { -value } else { value })
    }

    fn read_f64(&mut self) -> IonResult<f64> {
        self.check_usable()?;
        let current = self.scalar("read_f64", IonType::Float)?;
        let body = self.body_slice(current);
        match body.len() {
            0 => Ok(0.0),
            4 => Ok(f32::from_be_bytes(body.try_into().expect("4 bytes")) as f64),
            8 => Ok(f64::from_be_bytes(body.try_into().expect("8 bytes"))),
            // Other lengths were rejected in next().
            _ => unreachable!("float length validated on advance"),
        }
    }

    fn read_decimal(&mut self) -> IonResult<Decimal> {
        self.check_usable()?;
        let (position, body) = {
            let current = self.scalar("read_decimal", IonType::Decimal)?;
            (current.body.0, self.body_slice(current).to_vec())
        };
        if body.is_empty() {
            return Ok(Decimal::from_i64(0));
        }
        let mut cursor = 0usize;
        let exponent = match prim::read_var_int(&body, &mut cursor) {
            Ok(v) => v.value(),
            Err(_) => {
                let err = IonError::malformed(position, "truncated decimal exponent");
                return Err(self.fail(err));
            }
        };
        let (negative, magnitude) = prim::int_as_parts(&body[cursor..]);
        Ok(Decimal::from_parts(negative, magnitude, exponent))
    }

    fn read_timestamp(&mut self) -> IonResult<Timestamp> {
        self.check_usable()?;
        let (position, body) = {
            let current = self.scalar("read_timestamp", IonType::Timestamp)?;
            (current.body.0, self.body_slice(current).to_vec())
        };
        match decode_timestamp(&body, position) {
            Ok(ts) => Ok(ts),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn read_string(&mut self) -> IonResult<String> {
        self.check_usable()?;
        let (ion_type, position, body) = {
            let current = match &self.current {
                Some(c) if c.ion_type == IonType::String || c.ion_type == IonType::Symbol => c,
                Some(c) => return Err(IonError::mismatch("read_string", c.ion_type)),
                None => return Err(IonError::mismatch("read_string", IonType::NoType)),
            };
            if current.is_null {
                return Err(IonError::mismatch("read_string", IonType::Null));
            }
            (current.ion_type, current.body.0, self.body_slice(current).to_vec())
        };
        if ion_type == IonType::String {
            return match String::from_utf8(body) {
                Ok(text) => Ok(text),
                Err(_) => {
                    let err = IonError::malformed(position, "string is not valid UTF-8");
                    Err(self.fail(err))
                }
            };
        }
        // Symbol: the body is a UInt SID.
        let sid = match prim::uint_as_u64(&body) {
            Some(sid) => sid,
            None => {
                let err = IonError::malformed(position, "symbol ID overflows 64 bits");
                return Err(self.fail(err));
            }
        };
        match self.symbols.find_by_id(sid) {
            Some(text) => Ok(text.to_owned()),
            None => Err(IonError::UnresolvedSymbol(sid)),
        }
    }

    fn read_bytes(&mut self) -> IonResult<Vec<u8>> {
        self.check_usable()?;
        let current = match &self.current {
            Some(c) if c.ion_type == IonType::Blob || c.ion_type == IonType::Clob => c,
            Some(c) => return Err(IonError::mismatch("read_bytes", c.ion_type)),
            None => return Err(IonError::mismatch("read_bytes", IonType::NoType)),
        };
        if current.is_null {
            return Err(IonError::mismatch("read_bytes", IonType::Null));
        }
        Ok(self.body_slice(current).to_vec())
    }
}

/// Reads a type descriptor (and its length field, if any), bounds-checks
/// the body, and advances the cursor past the whole value.
fn read_header(data: &[u8], pos: &mut usize) -> IonResult<Header> {
    let at = *pos;
    if *pos >= data.len() {
        return Err(IonError::malformed(at, "unexpected end of input"));
    }
    let descriptor = data[*pos];
    *pos += 1;
    let code = descriptor >> 4;
    let len_nibble = descriptor & 0x0f;

    if code == TypeCode::RSVD {
        return Err(IonError::malformed(at, "reserved type code 15"));
    }
    if len_nibble == LENGTH_NULL {
        return Ok(Header {
            code,
            len_nibble,
            is_null: true,
            body_start: *pos,
            body_end: *pos,
        });
    }

    let length = if code == TypeCode::BOOL {
        // L encodes the value itself.
        0
    } else if len_nibble == LENGTH_VARUINT || (code == TypeCode::STRU && len_nibble == 1) {
        // Struct L == 1 is the sorted-struct form: the length always
        // follows as a VarUInt.
        prim::read_var_uint(data, pos)? as usize
    } else {
        len_nibble as usize
    };

    let body_start = *pos;
    let body_end = body_start
        .checked_add(length)
        .ok_or_else(|| IonError::malformed(at, "value length overflows"))?;
    if body_end > data.len() {
        return Err(IonError::malformed(at, "value body runs past end of input"));
    }
    *pos = body_end;
    Ok(Header {
        code,
        len_nibble,
        is_null: false,
        body_start,
        body_end,
    })
}

/// Parses the interior of an annotation wrapper: the annotation SIDs and
/// the single wrapped value, which must fill the wrapper exactly.
fn parse_annotation_wrapper(
    data: &[u8],
    at: usize,
    wrapper: Header,
) -> IonResult<(Vec<u64>, Header)> {
    let mut cursor = wrapper.body_start;
    let annot_len = prim::read_var_uint(data, &mut cursor)? as usize;
    let annot_end = cursor
        .checked_add(annot_len)
        .filter(|end| *end <= wrapper.body_end)
        .ok_or_else(|| IonError::malformed(at, "annotation list overruns wrapper"))?;

    let mut annotations = Vec::new();
    while cursor < annot_end {
        annotations.push(prim::read_var_uint(data, &mut cursor)?);
    }
    if cursor != annot_end {
        return Err(IonError::malformed(at, "annotation list length mismatch"));
    }
    if annotations.is_empty() {
        return Err(IonError::malformed(at, "annotation wrapper without annotations"));
    }

    let inner_at = cursor;
    let inner = read_header(data, &mut cursor)?;
    if inner.code == TypeCode::ANNO {
        return Err(IonError::malformed(inner_at, "nested annotation wrapper"));
    }
    if inner.code == TypeCode::NULL && !inner.is_null {
        return Err(IonError::malformed(inner_at, "annotated nop padding"));
    }
    if inner.body_end != wrapper.body_end {
        return Err(IonError::malformed(at, "annotation wrapper length mismatch"));
    }
    Ok((annotations, inner))
}

/// Rejects the illegal type-descriptor combinations of Ion 1.0.
fn validate_value_header(data: &[u8], header: &Header, at: usize) -> IonResult<()> {
    if header.is_null {
        return Ok(());
    }
    match header.code {
        TypeCode::BOOL => {
            if header.len_nibble > 1 {
                return Err(IonError::malformed(at, "invalid bool length"));
            }
        }
        TypeCode::FLOT => {
            let len = header.body_end - header.body_start;
            if len != 0 && len != 4 && len != 8 {
                return Err(IonError::malformed(at, "unsupported float length"));
            }
        }
        TypeCode::NINT => {
            let body = &data[header.body_start..header.body_end];
            if body.iter().all(|b| *b == 0) {
                return Err(IonError::malformed(at, "negative integer zero"));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Decodes a binary timestamp body. Wall-clock fields are stored in UTC on
/// the wire; the offset is re-applied during construction.
fn decode_timestamp(body: &[u8], position: usize) -> IonResult<Timestamp> {
    let mut pos = 0usize;
    let malformed = |reason: &str| IonError::malformed(position, reason.to_owned());

    let offset = prim::read_var_int(body, &mut pos).map_err(|_| malformed("truncated offset"))?;
    let offset_minutes = if offset.is_negative_zero() {
        None
    } else {
        let minutes = offset.value();
        if minutes <= -(24 * 60) || minutes >= 24 * 60 {
            return Err(malformed("timezone offset out of range"));
        }
        Some(minutes as i32)
    };

    let year = prim::read_var_uint(body, &mut pos).map_err(|_| malformed("missing year"))?;
    if year > 9999 {
        return Err(malformed("year out of range"));
    }

    let mut precision = Precision::Year;
    let mut month = 1u64;
    let mut day = 1u64;
    let mut hour = 0u64;
    let mut minute = 0u64;
    let mut second = 0u64;
    let mut nanos = 0u32;
    let mut fractional_units = 0u8;

    if pos < body.len() {
        month = prim::read_var_uint(body, &mut pos).map_err(|_| malformed("truncated month"))?;
        precision = Precision::Month;
    }
    if pos < body.len() {
        day = prim::read_var_uint(body, &mut pos).map_err(|_| malformed("truncated day"))?;
        precision = Precision::Day;
    }
    if pos < body.len() {
        hour = prim::read_var_uint(body, &mut pos).map_err(|_| malformed("truncated hour"))?;
        if pos >= body.len() {
            return Err(malformed("hour without minute"));
        }
        minute = prim::read_var_uint(body, &mut pos).map_err(|_| malformed("truncated minute"))?;
        precision = Precision::Minute;
    }
    if pos < body.len() {
        second = prim::read_var_uint(body, &mut pos).map_err(|_| malformed("truncated second"))?;
        precision = Precision::Second;
    }
    if pos < body.len() {
        let exponent =
            prim::read_var_int(body, &mut pos).map_err(|_| malformed("truncated fraction"))?;
        let (negative, coefficient) = prim::int_as_parts(&body[pos..]);
        pos = body.len();
        if negative {
            return Err(malformed("negative fractional seconds"));
        }
        let exp = exponent.value();
        let coefficient = u64::try_from(coefficient)
            .map_err(|_| malformed("fractional coefficient too large"))?;
        if coefficient == 0 && exp > -1 {
            // Zero fraction with a non-negative exponent is ignored.
        } else {
            if !(-9..=0).contains(&exp) {
                return Err(malformed("fractional exponent out of range"));
            }
            let units = (-exp) as u32;
            let limit = 10u64.pow(units);
            if coefficient >= limit {
                return Err(malformed("fractional seconds not less than one"));
            }
            nanos = (coefficient * 10u64.pow(9 - units)) as u32;
            fractional_units = units as u8;
            precision = Precision::Nanosecond;
        }
    }

    if precision <= Precision::Day && offset_minutes.is_some() {
        // Date-only timestamps carry an unknown offset on the wire.
        return Err(malformed("date-precision timestamp with a known offset"));
    }

    Timestamp::from_component_fields(
        year as u32,
        month as u32,
        day as u32,
        hour as u32,
        minute as u32,
        second as u32,
        nanos,
        offset_minutes,
        precision,
        fractional_units,
    )
}

/// Parses the `imports` list of a symbol-table struct.
fn parse_import_list(data: &[u8], start: usize, end: usize) -> IonResult<Vec<SharedImport>> {
    let mut imports = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let at = cursor;
        let entry = read_header(data, &mut cursor)?;
        if entry.body_end > end {
            return Err(IonError::malformed(at, "import entry overruns list"));
        }
        if entry.code != TypeCode::STRU || entry.is_null {
            continue;
        }

        let mut name: Option<String> = None;
        let mut version: u32 = 1;
        let mut max_id: Option<u32> = None;
        let mut field = entry.body_start;
        while field < entry.body_end {
            let sid = prim::read_var_uint(data, &mut field)?;
            let field_at = field;
            let value = read_header(data, &mut field)?;
            if value.body_end > entry.body_end {
                return Err(IonError::malformed(field_at, "import field overruns struct"));
            }
            let body = &data[value.body_start..value.body_end];
            match sid {
                SID_NAME if value.code == TypeCode::STRI && !value.is_null => {
                    let text = std::str::from_utf8(body)
                        .map_err(|_| IonError::malformed(field_at, "import name is not UTF-8"))?;
                    name = Some(text.to_owned());
                }
                SID_VERSION if value.code == TypeCode::UINT && !value.is_null => {
                    version = prim::uint_as_u64(body)
                        .and_then(|v| u32::try_from(v).ok())
                        .ok_or_else(|| IonError::malformed(field_at, "import version overflows"))?;
                }
                SID_MAX_ID if value.code == TypeCode::UINT && !value.is_null => {
                    max_id = Some(
                        prim::uint_as_u64(body)
                            .and_then(|v| u32::try_from(v).ok())
                            .ok_or_else(|| {
                                IonError::malformed(field_at, "import max_id overflows")
                            })?,
                    );
                }
                _ => {}
            }
        }

        match (name, max_id) {
            (Some(name), Some(max_id)) if name != "$ion" => imports.push(SharedImport {
                name,
                version,
                max_id,
            }),
            (Some(_), None) => {
                return Err(IonError::malformed(
                    at,
                    "shared table import requires a max_id",
                ));
            }
            _ => {}
        }
    }
    Ok(imports)
}
