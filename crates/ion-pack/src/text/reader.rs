//! Pull reader for the Ion 1.0 text form.
//!
//! Drives the scanner token by token. Scalars are decoded eagerly (the
//! scanner already classified them); container bodies stay unparsed until
//! `step_in`, and are skipped token-wise when the caller moves past them.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::reader::IonReader;
use crate::symbols::{SharedImport, SymbolTable};
use crate::text::scanner::{Scanner, Token};
use crate::timestamp::Timestamp;
use crate::types::IonType;

/// A symbol occurrence: literal text, or a `$N` reference into the local
/// symbol table.
#[derive(Debug, Clone, PartialEq)]
enum SymbolRef {
    Text(String),
    Sid(u64),
}

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    None,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Str(String),
    Symbol(SymbolRef),
    Bytes(Vec<u8>),
    Container,
}

#[derive(Debug, Clone)]
struct TextValue {
    ion_type: IonType,
    is_null: bool,
    field_name: Option<SymbolRef>,
    annotations: Vec<SymbolRef>,
    payload: Payload,
    /// For containers: whether the body was entered or skipped already.
    consumed: bool,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    ion_type: IonType,
    seen_value: bool,
    at_end: bool,
}

/// Pull reader over a complete Ion text document.
pub struct TextReader {
    scanner: Scanner,
    containers: Vec<Frame>,
    symbols: SymbolTable,
    current: Option<TextValue>,
    err: Option<IonError>,
}

impl TextReader {
    pub fn new(input: &str) -> Self {
        Self {
            scanner: Scanner::new(input),
            containers: Vec::new(),
            symbols: SymbolTable::system(),
            current: None,
            err: None,
        }
    }

    fn check_usable(&self) -> IonResult<()> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, err: IonError) -> IonError {
        if err.is_sticky() && self.err.is_none() {
            self.err = Some(err.clone());
        }
        err
    }

    fn malformed(&self, reason: impl Into<String>) -> IonError {
        IonError::malformed(self.scanner.offset(), reason)
    }

    fn resolve(&self, symbol: &SymbolRef) -> IonResult<String> {
        match symbol {
            SymbolRef::Text(text) => Ok(text.clone()),
            SymbolRef::Sid(sid) => match self.symbols.find_by_id(*sid) {
                Some(text) => Ok(text.to_owned()),
                None => Err(IonError::UnresolvedSymbol(*sid)),
            },
        }
    }

    /// Abandons the body of the current container without surfacing it.
    fn skip_current_container(&mut self) -> IonResult<()> {
        let kind = match &self.current {
            Some(c) if c.ion_type.is_container() && !c.is_null && !c.consumed => c.ion_type,
            _ => return Ok(()),
        };
        self.skip_container_body(kind)
    }

    /// Consumes tokens until the matching close of a container whose open
    /// token was already read.
    fn skip_container_body(&mut self, kind: IonType) -> IonResult<()> {
        let mut stack = vec![kind];
        loop {
            let in_sexp = *stack.last().expect("non-empty stack") == IonType::Sexp;
            match self.scanner.next_token(in_sexp)? {
                Token::OpenBrace => stack.push(IonType::Struct),
                Token::OpenBracket => stack.push(IonType::List),
                Token::OpenParen => stack.push(IonType::Sexp),
                Token::CloseBrace => self.pop_skip(&mut stack, IonType::Struct)?,
                Token::CloseBracket => self.pop_skip(&mut stack, IonType::List)?,
                Token::CloseParen => self.pop_skip(&mut stack, IonType::Sexp)?,
                Token::Eof => return Err(self.malformed("unterminated container")),
                _ => continue,
            }
            if stack.is_empty() {
                return Ok(());
            }
        }
    }

    fn pop_skip(&mut self, stack: &mut Vec<IonType>, expected: IonType) -> IonResult<()> {
        match stack.pop() {
            Some(kind) if kind == expected => Ok(()),
            _ => Err(self.malformed("mismatched container delimiter")),
        }
    }

    fn next_impl(&mut self) -> IonResult<IonType> {
        self.skip_current_container()?;
        self.current = None;

        loop {
            if self.containers.is_empty() {
                let token = self.scanner.next_token(false)?;
                if token == Token::Eof {
                    return Ok(IonType::NoType);
                }
                let (value, bare_symbol) = self.parse_value(token, false)?;

                // An unannotated identifier-form `$ion_1_0` is a version
                // marker: reset the table and keep going.
                if let Some(name) = &bare_symbol {
                    if name == "$ion_1_0" {
                        self.symbols = SymbolTable::system();
                        continue;
                    }
                    if is_version_marker_shape(name) {
                        return Err(self.malformed(format!("unsupported Ion version '{name}'")));
                    }
                }

                if value.ion_type == IonType::Struct
                    && !value.is_null
                    && self.first_annotation_is_symbol_table(&value)
                {
                    self.current = Some(value);
                    self.absorb_symbol_table()?;
                    continue;
                }

                self.current = Some(value);
                return Ok(self.current.as_ref().expect("just set").ion_type);
            }

            let frame = *self.containers.last().expect("non-empty");
            if frame.at_end {
                return Ok(IonType::NoType);
            }
            let in_sexp = frame.ion_type == IonType::Sexp;
            let mut token = self.scanner.next_token(in_sexp)?;

            if is_close_for(&token, frame.ion_type) {
                self.containers.last_mut().expect("non-empty").at_end = true;
                return Ok(IonType::NoType);
            }

            // Struct and list children are comma-separated; sexp children
            // are separated by whitespace alone.
            if frame.seen_value && frame.ion_type != IonType::Sexp {
                match token {
                    Token::Comma => {
                        token = self.scanner.next_token(in_sexp)?;
                        if is_close_for(&token, frame.ion_type) {
                            self.containers.last_mut().expect("non-empty").at_end = true;
                            return Ok(IonType::NoType);
                        }
                    }
                    _ => return Err(self.malformed("expected ',' or container close")),
                }
            }

            let field_name = if frame.ion_type == IonType::Struct {
                let name = self.parse_field_name(token)?;
                match self.scanner.next_token(false)? {
                    Token::Colon => {}
                    _ => return Err(self.malformed("expected ':' after field name")),
                }
                token = self.scanner.next_token(false)?;
                Some(name)
            } else {
                None
            };

            let (mut value, _) = self.parse_value(token, in_sexp)?;
            value.field_name = field_name;
            self.containers.last_mut().expect("non-empty").seen_value = true;
            self.current = Some(value);
            return Ok(self.current.as_ref().expect("just set").ion_type);
        }
    }

    fn parse_field_name(&mut self, token: Token) -> IonResult<SymbolRef> {
        match token {
            Token::Identifier(name) => Ok(SymbolRef::Text(name)),
            Token::QuotedSymbol(name) => Ok(SymbolRef::Text(name)),
            Token::Str(name) => Ok(SymbolRef::Text(name)),
            Token::SymbolId(sid) => Ok(SymbolRef::Sid(sid)),
            _ => Err(self.malformed("expected a field name")),
        }
    }

    /// Parses one value, consuming its annotation prefix. Returns the
    /// value and, for unannotated identifier-form symbols, the bare text
    /// (the version-marker check needs exactly that shape).
    fn parse_value(
        &mut self,
        token: Token,
        in_sexp: bool,
    ) -> IonResult<(TextValue, Option<String>)> {
        let mut annotations: Vec<SymbolRef> = Vec::new();
        let mut token = token;
        loop {
            match token {
                Token::Identifier(name) => {
                    if self.scanner.double_colon_follows()? {
                        annotations.push(SymbolRef::Text(name));
                        token = self.scanner.next_token(in_sexp)?;
                        continue;
                    }
                    let bare = annotations.is_empty().then(|| name.clone());
                    return Ok((
                        value_of(
                            IonType::Symbol,
                            Payload::Symbol(SymbolRef::Text(name)),
                            annotations,
                        ),
                        bare,
                    ));
                }
                Token::QuotedSymbol(name) => {
                    if self.scanner.double_colon_follows()? {
                        annotations.push(SymbolRef::Text(name));
                        token = self.scanner.next_token(in_sexp)?;
                        continue;
                    }
                    return Ok((
                        value_of(
                            IonType::Symbol,
                            Payload::Symbol(SymbolRef::Text(name)),
                            annotations,
                        ),
                        None,
                    ));
                }
                Token::SymbolId(sid) => {
                    if self.scanner.double_colon_follows()? {
                        annotations.push(SymbolRef::Sid(sid));
                        token = self.scanner.next_token(in_sexp)?;
                        continue;
                    }
                    return Ok((
                        value_of(
                            IonType::Symbol,
                            Payload::Symbol(SymbolRef::Sid(sid)),
                            annotations,
                        ),
                        None,
                    ));
                }
                Token::Operator(text) => {
                    return Ok((
                        value_of(
                            IonType::Symbol,
                            Payload::Symbol(SymbolRef::Text(text)),
                            annotations,
                        ),
                        None,
                    ));
                }
                Token::Bool(value) => {
                    return Ok((
                        value_of(IonType::Bool, Payload::Bool(value), annotations),
                        None,
                    ));
                }
                Token::Int(value) => {
                    return Ok((
                        value_of(IonType::Int, Payload::Int(value), annotations),
                        None,
                    ));
                }
                Token::Float(value) => {
                    return Ok((
                        value_of(IonType::Float, Payload::Float(value), annotations),
                        None,
                    ));
                }
                Token::Decimal(value) => {
                    return Ok((
                        value_of(IonType::Decimal, Payload::Decimal(value), annotations),
                        None,
                    ));
                }
                Token::Timestamp(value) => {
                    return Ok((
                        value_of(IonType::Timestamp, Payload::Timestamp(value), annotations),
                        None,
                    ));
                }
                Token::Str(value) => {
                    return Ok((
                        value_of(IonType::String, Payload::Str(value), annotations),
                        None,
                    ));
                }
                Token::Blob(bytes) => {
                    return Ok((
                        value_of(IonType::Blob, Payload::Bytes(bytes), annotations),
                        None,
                    ));
                }
                Token::Clob(bytes) => {
                    return Ok((
                        value_of(IonType::Clob, Payload::Bytes(bytes), annotations),
                        None,
                    ));
                }
                Token::Null(of_type) => {
                    let mut value = value_of(of_type, Payload::None, annotations);
                    value.is_null = true;
                    return Ok((value, None));
                }
                Token::OpenBrace => {
                    return Ok((
                        value_of(IonType::Struct, Payload::Container, annotations),
                        None,
                    ));
                }
                Token::OpenBracket => {
                    return Ok((
                        value_of(IonType::List, Payload::Container, annotations),
                        None,
                    ));
                }
                Token::OpenParen => {
                    return Ok((
                        value_of(IonType::Sexp, Payload::Container, annotations),
                        None,
                    ));
                }
                Token::Eof => return Err(self.malformed("expected a value")),
                _ => return Err(self.malformed(format!("expected a value, got {token:?}"))),
            }
        }
    }

    fn first_annotation_is_symbol_table(&self, value: &TextValue) -> bool {
        match value.annotations.first() {
            Some(symbol) => self
                .resolve(symbol)
                .map(|text| text == "$ion_symbol_table")
                .unwrap_or(false),
            None => false,
        }
    }

    /// Reads the current `$ion_symbol_table` struct through the ordinary
    /// pull machinery and installs the table it describes.
    fn absorb_symbol_table(&mut self) -> IonResult<()> {
        let mut imports: Vec<SharedImport> = Vec::new();
        let mut append = false;
        let mut symbols: Vec<Option<String>> = Vec::new();

        self.step_in()?;
        loop {
            let ion_type = self.next_impl()?;
            if ion_type == IonType::NoType {
                break;
            }
            let field = match &self.current {
                Some(c) => match &c.field_name {
                    // Fields with unresolvable names are skipped.
                    Some(name) => match self.resolve(name) {
                        Ok(text) => text,
                        Err(_) => continue,
                    },
                    None => continue,
                },
                None => continue,
            };
            match (field.as_str(), ion_type) {
                ("imports", IonType::Symbol) if !self.is_null() => {
                    if self.read_string()? == "$ion_symbol_table" {
                        append = true;
                    }
                }
                ("imports", IonType::List) if !self.is_null() => {
                    self.step_in()?;
                    while self.next_impl()? != IonType::NoType {
                        if self.ion_type() != IonType::Struct || self.is_null() {
                            continue;
                        }
                        imports.extend(self.read_import_entry()?);
                    }
                    self.step_out()?;
                }
                ("symbols", IonType::List) if !self.is_null() => {
                    self.step_in()?;
                    loop {
                        let entry = self.next_impl()?;
                        if entry == IonType::NoType {
                            break;
                        }
                        if entry == IonType::String && !self.is_null() {
                            symbols.push(Some(self.read_string()?));
                        } else {
                            symbols.push(None);
                        }
                    }
                    self.step_out()?;
                }
                _ => {}
            }
        }
        self.step_out()?;

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

    /// Reads one `{name, version, max_id}` struct from an imports list.
    fn read_import_entry(&mut self) -> IonResult<Option<SharedImport>> {
        let mut name: Option<String> = None;
        let mut version: u32 = 1;
        let mut max_id: Option<u32> = None;

        self.step_in()?;
        loop {
            let ion_type = self.next_impl()?;
            if ion_type == IonType::NoType {
                break;
            }
            let field = match &self.current {
                Some(c) => match &c.field_name {
                    Some(f) => match self.resolve(f) {
                        Ok(text) => text,
                        Err(_) => continue,
                    },
                    None => continue,
                },
                None => continue,
            };
            match (field.as_str(), ion_type) {
                ("name", IonType::String) if !self.is_null() => {
                    name = Some(self.read_string()?);
                }
                ("version", IonType::Int) if !self.is_null() => {
                    version = u32::try_from(self.read_i64()?.max(1)).unwrap_or(1);
                }
                ("max_id", IonType::Int) if !self.is_null() => {
                    let value = self.read_i64()?;
                    if value < 0 {
                        return Err(self.malformed("import max_id must be non-negative"));
                    }
                    max_id = Some(u32::try_from(value).map_err(|_| {
                        self.malformed("import max_id overflows")
                    })?);
                }
                _ => {}
            }
        }
        self.step_out()?;

        match (name, max_id) {
            (Some(name), Some(max_id)) if name != "$ion" => Ok(Some(SharedImport {
                name,
                version,
                max_id,
            })),
            (Some(_), None) => Err(self.malformed("shared table import requires a max_id")),
            _ => Ok(None),
        }
    }

    fn scalar(&self, operation: &'static str, expected: IonType) -> IonResult<&TextValue> {
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
}

fn value_of(ion_type: IonType, payload: Payload, annotations: Vec<SymbolRef>) -> TextValue {
    TextValue {
        ion_type,
        is_null: false,
        field_name: None,
        annotations,
        payload,
        consumed: false,
    }
}

fn is_close_for(token: &Token, kind: IonType) -> bool {
    matches!(
        (token, kind),
        (Token::CloseBrace, IonType::Struct)
            | (Token::CloseBracket, IonType::List)
            | (Token::CloseParen, IonType::Sexp)
    )
}

/// `$ion_<digits>_<digits>`, the shape reserved for version markers.
fn is_version_marker_shape(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("$ion_") else {
        return false;
    };
    let mut parts = rest.splitn(2, '_');
    let major = parts.next().unwrap_or("");
    let minor = parts.next().unwrap_or("");
    !major.is_empty()
        && !minor.is_empty()
        && major.bytes().all(|b| b.is_ascii_digit())
        && minor.bytes().all(|b| b.is_ascii_digit())
}

impl IonReader for TextReader {
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
        let current = match &mut self.current {
            Some(c) => c,
            None => return Err(IonError::mismatch("step_in", IonType::NoType)),
        };
        if !current.ion_type.is_container() {
            return Err(IonError::mismatch("step_in", current.ion_type));
        }
        if current.is_null {
            return Err(IonError::mismatch("step_in", IonType::Null));
        }
        current.consumed = true;
        let frame = Frame {
            ion_type: current.ion_type,
            seen_value: false,
            at_end: false,
        };
        self.containers.push(frame);
        self.current = None;
        Ok(())
    }

    fn step_out(&mut self) -> IonResult<()> {
        self.check_usable()?;
        // Leave behind an unconsumed child container first.
        if let Err(err) = self.skip_current_container() {
            return Err(self.fail(err));
        }
        self.current = None;
        let frame = match self.containers.pop() {
            Some(f) => f,
            None => {
                let err = IonError::usage("step_out at the top level");
                return Err(self.fail(err));
            }
        };
        if !frame.at_end {
            // Consume the remaining children up to the closing delimiter.
            if let Err(err) = self.skip_container_body(frame.ion_type) {
                return Err(self.fail(err));
            }
        }
        Ok(())
    }

    fn field_name(&self) -> IonResult<String> {
        let current = self
            .current
            .as_ref()
            .ok_or(IonError::mismatch("field_name", IonType::NoType))?;
        match &current.field_name {
            Some(symbol) => self.resolve(symbol),
            None => Err(IonError::mismatch("field_name", current.ion_type)),
        }
    }

    fn annotations(&self) -> IonResult<Vec<String>> {
        let current = self
            .current
            .as_ref()
            .ok_or(IonError::mismatch("annotations", IonType::NoType))?;
        current
            .annotations
            .iter()
            .map(|symbol| self.resolve(symbol))
            .collect()
    }

    fn read_bool(&mut self) -> IonResult<bool> {
        self.check_usable()?;
        match &self.scalar("read_bool", IonType::Bool)?.payload {
            Payload::Bool(value) => Ok(*value),
            _ => unreachable!("bool payload"),
        }
    }

    fn read_i64(&mut self) -> IonResult<i64> {
        self.check_usable()?;
        match &self.scalar("read_i64", IonType::Int)?.payload {
            Payload::Int(value) => value
                .to_i64()
                .ok_or_else(|| IonError::OutOfRange("int does not fit in 64 bits".to_owned())),
            _ => unreachable!("int payload"),
        }
    }

    fn read_big_int(&mut self) -> IonResult<BigInt> {
        self.check_usable()?;
        match &self.scalar("read_big_int", IonType::Int)?.payload {
            Payload::Int(value) => Ok(value.clone()),
            _ => unreachable!("int payload"),
        }
    }

    fn read_f64(&mut self) -> IonResult<f64> {
        self.check_usable()?;
        match &self.scalar("read_f64", IonType::Float)?.payload {
            Payload::Float(value) => Ok(*value),
            _ => unreachable!("float payload"),
        }
    }

    fn read_decimal(&mut self) -> IonResult<Decimal> {
        self.check_usable()?;
        match &self.scalar("read_decimal", IonType::Decimal)?.payload {
            Payload::Decimal(value) => Ok(value.clone()),
            _ => unreachable!("decimal payload"),
        }
    }

    fn read_timestamp(&mut self) -> IonResult<Timestamp> {
        self.check_usable()?;
        match &self.scalar("read_timestamp", IonType::Timestamp)?.payload {
            Payload::Timestamp(value) => Ok(value.clone()),
            _ => unreachable!("timestamp payload"),
        }
    }

    fn read_string(&mut self) -> IonResult<String> {
        self.check_usable()?;
        let current = match &self.current {
            Some(c) if c.ion_type == IonType::String || c.ion_type == IonType::Symbol => c,
            Some(c) => return Err(IonError::mismatch("read_string", c.ion_type)),
            None => return Err(IonError::mismatch("read_string", IonType::NoType)),
        };
        if current.is_null {
            return Err(IonError::mismatch("read_string", IonType::Null));
        }
        match &current.payload {
            Payload::Str(value) => Ok(value.clone()),
            Payload::Symbol(symbol) => self.resolve(symbol),
            _ => unreachable!("text payload"),
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
        match &current.payload {
            Payload::Bytes(bytes) => Ok(bytes.clone()),
            _ => unreachable!("bytes payload"),
        }
    }
}
