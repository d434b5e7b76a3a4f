//! Tokenizer for the Ion 1.0 text form.
//!
//! A byte cursor over the input that hands the reader one lexeme at a
//! time: punctuation, identifiers, quoted symbols, strings (with long
//! string segments already concatenated), numbers classified into
//! int/float/decimal/timestamp, typed nulls, and `{{ }}` lob bodies.
//! Whitespace and comments are consumed as separators.

use num_bigint::BigInt;

use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::timestamp::Timestamp;
use crate::types::IonType;

/// One lexeme of the text grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    DoubleColon,
    /// Bare identifier symbol. Keywords are surfaced as their own tokens.
    Identifier(String),
    /// `'quoted'` symbol.
    QuotedSymbol(String),
    /// `$123` symbol-ID reference.
    SymbolId(u64),
    /// Short or (concatenated) long string.
    Str(String),
    Int(BigInt),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Blob(Vec<u8>),
    Clob(Vec<u8>),
    /// Run of operator characters; only produced inside s-expressions.
    Operator(String),
    Bool(bool),
    /// `null` or `null.T` (`Null(IonType::Null)` for the bare form).
    Null(IonType),
}

const OPERATOR_CHARS: &[u8] = b"!#%&*+-./;<=>?@^`|~";

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_identifier_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn is_operator_char(b: u8) -> bool {
    OPERATOR_CHARS.contains(&b)
}

/// Whether `text` lexes as a bare identifier symbol.
pub fn is_identifier(text: &str) -> bool {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b) if is_identifier_start(*b) => {}
        _ => return false,
    }
    if !bytes.iter().all(|b| is_identifier_part(*b)) {
        return false;
    }
    // `$123` is a symbol-ID reference, not an identifier.
    if bytes[0] == b'$' && bytes.len() > 1 && bytes[1..].iter().all(|b| b.is_ascii_digit()) {
        return false;
    }
    true
}

/// Reserved words that cannot appear as bare symbols.
pub fn is_keyword(text: &str) -> bool {
    matches!(text, "true" | "false" | "null" | "nan")
}

pub struct Scanner {
    data: Vec<u8>,
    pos: usize,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Self {
            data: input.as_bytes().to_vec(),
            pos: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    fn malformed(&self, reason: impl Into<String>) -> IonError {
        IonError::malformed(self.pos, reason)
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.data.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Skips whitespace and comments.
    pub fn skip_trivia(&mut self) -> IonResult<()> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(0x0b) | Some(0x0c) => {
                    self.pos += 1;
                }
                Some(b'/') => match self.peek_at(1) {
                    Some(b'/') => {
                        self.pos += 2;
                        while let Some(b) = self.peek() {
                            self.pos += 1;
                            if b == b'\n' {
                                break;
                            }
                        }
                    }
                    Some(b'*') => {
                        self.pos += 2;
                        loop {
                            match self.bump() {
                                Some(b'*') if self.peek() == Some(b'/') => {
                                    self.pos += 1;
                                    break;
                                }
                                Some(_) => {}
                                None => {
                                    return Err(self.malformed("unterminated block comment"));
                                }
                            }
                        }
                    }
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    /// Consumes a `::` if it is the next non-trivia lexeme.
    pub fn double_colon_follows(&mut self) -> IonResult<bool> {
        self.skip_trivia()?;
        if self.peek() == Some(b':') && self.peek_at(1) == Some(b':') {
            self.pos += 2;
            return Ok(true);
        }
        Ok(false)
    }

    /// Produces the next token. `in_sexp` admits operator runs.
    pub fn next_token(&mut self, in_sexp: bool) -> IonResult<Token> {
        self.skip_trivia()?;
        let b = match self.peek() {
            Some(b) => b,
            None => return Ok(Token::Eof),
        };
        match b {
            b'{' => {
                if self.peek_at(1) == Some(b'{') {
                    self.pos += 2;
                    return self.scan_lob();
                }
                self.pos += 1;
                Ok(Token::OpenBrace)
            }
            b'}' => {
                self.pos += 1;
                Ok(Token::CloseBrace)
            }
            b'[' => {
                self.pos += 1;
                Ok(Token::OpenBracket)
            }
            b']' => {
                self.pos += 1;
                Ok(Token::CloseBracket)
            }
            b'(' => {
                self.pos += 1;
                Ok(Token::OpenParen)
            }
            b')' => {
                self.pos += 1;
                Ok(Token::CloseParen)
            }
            b',' => {
                self.pos += 1;
                Ok(Token::Comma)
            }
            b':' => {
                if self.peek_at(1) == Some(b':') {
                    self.pos += 2;
                    return Ok(Token::DoubleColon);
                }
                self.pos += 1;
                Ok(Token::Colon)
            }
            b'"' => {
                self.pos += 1;
                let text = self.scan_short_string()?;
                Ok(Token::Str(text))
            }
            b'\'' => {
                if self.peek_at(1) == Some(b'\'') && self.peek_at(2) == Some(b'\'') {
                    let text = self.scan_long_strings()?;
                    return Ok(Token::Str(text));
                }
                self.pos += 1;
                let text = self.scan_quoted_symbol()?;
                Ok(Token::QuotedSymbol(text))
            }
            b'+' => {
                if self.matches_inf(1) {
                    self.pos += 4;
                    return Ok(Token::Float(f64::INFINITY));
                }
                if in_sexp {
                    return self.scan_operator();
                }
                Err(self.malformed("unexpected '+'"))
            }
            b'-' => {
                if self.matches_inf(1) {
                    self.pos += 4;
                    return Ok(Token::Float(f64::NEG_INFINITY));
                }
                if self.peek_at(1).map(|d| d.is_ascii_digit()).unwrap_or(false) {
                    return self.scan_number();
                }
                if in_sexp {
                    return self.scan_operator();
                }
                Err(self.malformed("unexpected '-'"))
            }
            b if b.is_ascii_digit() => self.scan_number(),
            b if is_identifier_start(b) => self.scan_identifier(),
            b if in_sexp && is_operator_char(b) => self.scan_operator(),
            _ => Err(self.malformed(format!("unexpected byte 0x{b:02x}"))),
        }
    }

    /// Checks for `inf` followed by a word boundary at `pos + skip`.
    fn matches_inf(&self, skip: usize) -> bool {
        if self.peek_at(skip) != Some(b'i')
            || self.peek_at(skip + 1) != Some(b'n')
            || self.peek_at(skip + 2) != Some(b'f')
        {
            return false;
        }
        match self.peek_at(skip + 3) {
            Some(b) => !is_identifier_part(b),
            None => true,
        }
    }

    fn scan_operator(&mut self) -> IonResult<Token> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !is_operator_char(b) {
                break;
            }
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.data[start..self.pos])
            .expect("operator characters are ASCII")
            .to_owned();
        Ok(Token::Operator(text))
    }

    fn scan_identifier(&mut self) -> IonResult<Token> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !is_identifier_part(b) {
                break;
            }
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.data[start..self.pos])
            .expect("identifier characters are ASCII")
            .to_owned();

        if text.as_bytes()[0] == b'$' && text.len() > 1 {
            let digits = &text[1..];
            if digits.bytes().all(|b| b.is_ascii_digit()) {
                let sid: u64 = digits
                    .parse()
                    .map_err(|_| self.malformed("symbol ID out of range"))?;
                return Ok(Token::SymbolId(sid));
            }
            if digits.as_bytes()[0].is_ascii_digit() {
                return Err(self.malformed(format!("invalid symbol '{text}'")));
            }
        }

        match text.as_str() {
            "true" => Ok(Token::Bool(true)),
            "false" => Ok(Token::Bool(false)),
            "nan" => Ok(Token::Float(f64::NAN)),
            "null" => {
                if self.peek() == Some(b'.') {
                    self.pos += 1;
                    return self.scan_null_type();
                }
                Ok(Token::Null(IonType::Null))
            }
            _ => Ok(Token::Identifier(text)),
        }
    }

    fn scan_null_type(&mut self) -> IonResult<Token> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !is_identifier_part(b) {
                break;
            }
            self.pos += 1;
        }
        let name = std::str::from_utf8(&self.data[start..self.pos]).expect("ascii");
        let ion_type = match name {
            "null" => IonType::Null,
            "bool" => IonType::Bool,
            "int" => IonType::Int,
            "float" => IonType::Float,
            "decimal" => IonType::Decimal,
            "timestamp" => IonType::Timestamp,
            "string" => IonType::String,
            "symbol" => IonType::Symbol,
            "blob" => IonType::Blob,
            "clob" => IonType::Clob,
            "struct" => IonType::Struct,
            "list" => IonType::List,
            "sexp" => IonType::Sexp,
            _ => return Err(self.malformed(format!("invalid null type 'null.{name}'"))),
        };
        Ok(Token::Null(ion_type))
    }

    // ------------------------------------------------------------ numbers

    fn scan_number(&mut self) -> IonResult<Token> {
        let negative = self.peek() == Some(b'-');
        if negative {
            self.pos += 1;
        }

        // Radix-prefixed integers.
        if self.peek() == Some(b'0') {
            match self.peek_at(1) {
                Some(b'x') | Some(b'X') => return self.scan_radix_int(negative, 16),
                Some(b'b') | Some(b'B') => return self.scan_radix_int(negative, 2),
                _ => {}
            }
        }

        // Timestamps start with exactly four digits followed by '-' or 'T'.
        if !negative {
            let mut d = 0;
            while self
                .peek_at(d)
                .map(|b| b.is_ascii_digit())
                .unwrap_or(false)
            {
                d += 1;
            }
            if d == 4 && matches!(self.peek_at(4), Some(b'-') | Some(b'T')) {
                return self.scan_timestamp();
            }
        }

        let int_digits = self.scan_digit_run()?;
        if int_digits.is_empty() {
            return Err(self.malformed("expected digits"));
        }
        if int_digits.len() > 1 && int_digits[0] == b'0' {
            return Err(self.malformed("number has a leading zero"));
        }

        let mut frac_digits: Vec<u8> = Vec::new();
        let mut has_point = false;
        if self.peek() == Some(b'.') {
            has_point = true;
            self.pos += 1;
            frac_digits = self.scan_digit_run()?;
        }

        let mut marker: Option<u8> = None;
        let mut exp_text = String::new();
        match self.peek() {
            Some(m @ (b'e' | b'E' | b'd' | b'D')) => {
                marker = Some(m.to_ascii_lowercase());
                self.pos += 1;
                if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                    exp_text.push(self.bump().expect("sign byte") as char);
                }
                let exp_digits = self.scan_digit_run()?;
                if exp_digits.is_empty() {
                    return Err(self.malformed("exponent requires digits"));
                }
                exp_text.push_str(std::str::from_utf8(&exp_digits).expect("ascii"));
            }
            _ => {}
        }
        self.require_number_boundary()?;

        let int_text = String::from_utf8(int_digits).expect("ascii digits");
        let frac_text = String::from_utf8(frac_digits).expect("ascii digits");
        let sign = if negative { "-" } else { "" };

        match marker {
            Some(b'e') => {
                let mut lexeme = format!("{sign}{int_text}");
                if has_point {
                    lexeme.push('.');
                    lexeme.push_str(&frac_text);
                }
                lexeme.push('e');
                lexeme.push_str(&exp_text);
                let value: f64 = lexeme
                    .parse()
                    .map_err(|_| self.malformed(format!("invalid float '{lexeme}'")))?;
                Ok(Token::Float(value))
            }
            Some(_) => {
                let mut lexeme = format!("{sign}{int_text}");
                if has_point {
                    lexeme.push('.');
                    lexeme.push_str(&frac_text);
                }
                lexeme.push('d');
                lexeme.push_str(&exp_text);
                let value = Decimal::parse(&lexeme)
                    .map_err(|_| self.malformed(format!("invalid decimal '{lexeme}'")))?;
                Ok(Token::Decimal(value))
            }
            None if has_point => {
                let lexeme = format!("{sign}{int_text}.{frac_text}");
                let value = Decimal::parse(&lexeme)
                    .map_err(|_| self.malformed(format!("invalid decimal '{lexeme}'")))?;
                Ok(Token::Decimal(value))
            }
            None => {
                let lexeme = format!("{sign}{int_text}");
                let value = BigInt::parse_bytes(lexeme.as_bytes(), 10)
                    .ok_or_else(|| self.malformed(format!("invalid int '{lexeme}'")))?;
                Ok(Token::Int(value))
            }
        }
    }

    /// Scans a digit run, validating and dropping `_` separators.
    fn scan_digit_run(&mut self) -> IonResult<Vec<u8>> {
        let mut digits = Vec::new();
        let mut prev_underscore = false;
        let mut first = true;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => {
                    digits.push(b);
                    prev_underscore = false;
                }
                b'_' => {
                    if first || prev_underscore {
                        return Err(self.malformed("misplaced digit separator"));
                    }
                    prev_underscore = true;
                }
                _ => break,
            }
            first = false;
            self.pos += 1;
        }
        if prev_underscore {
            return Err(self.malformed("trailing digit separator"));
        }
        Ok(digits)
    }

    fn scan_radix_int(&mut self, negative: bool, radix: u32) -> IonResult<Token> {
        self.pos += 2; // 0x / 0b
        let mut digits = Vec::new();
        let mut prev_underscore = false;
        let mut first = true;
        while let Some(b) = self.peek() {
            let is_digit = match radix {
                16 => b.is_ascii_hexdigit(),
                _ => b == b'0' || b == b'1',
            };
            if is_digit {
                digits.push(b);
                prev_underscore = false;
            } else if b == b'_' {
                if first || prev_underscore {
                    return Err(self.malformed("misplaced digit separator"));
                }
                prev_underscore = true;
            } else {
                break;
            }
            first = false;
            self.pos += 1;
        }
        if digits.is_empty() || prev_underscore {
            return Err(self.malformed("invalid radix integer"));
        }
        self.require_number_boundary()?;
        let mut value = BigInt::parse_bytes(&digits, radix)
            .ok_or_else(|| self.malformed("invalid radix integer"))?;
        if negative {
            value = -value;
        }
        Ok(Token::Int(value))
    }

    fn scan_timestamp(&mut self) -> IonResult<Token> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            let keep = b.is_ascii_digit()
                || matches!(b, b'-' | b':' | b'+' | b'.' | b'T' | b'Z' | b'z');
            if !keep {
                break;
            }
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.data[start..self.pos]).expect("ascii");
        let value = Timestamp::parse(text)
            .map_err(|_| IonError::malformed(start, format!("invalid timestamp '{text}'")))?;
        self.require_number_boundary()?;
        Ok(Token::Timestamp(value))
    }

    /// A numeric lexeme must be followed by a delimiter, not more symbol
    /// characters.
    fn require_number_boundary(&self) -> IonResult<()> {
        match self.peek() {
            Some(b) if is_identifier_part(b) => {
                Err(self.malformed("invalid trailing characters after number"))
            }
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------ strings

    fn scan_short_string(&mut self) -> IonResult<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(b'"') => return Ok(out),
                Some(b'\\') => {
                    if let Some(c) = self.read_escape_char()? {
                        out.push(c);
                    }
                }
                Some(b'\n') | Some(b'\r') => {
                    return Err(self.malformed("unescaped newline in string"));
                }
                Some(b) => self.push_utf8_byte(&mut out, b)?,
                None => return Err(self.malformed("unterminated string")),
            }
        }
    }

    /// Scans a run of adjacent `'''…'''` segments into one string.
    fn scan_long_strings(&mut self) -> IonResult<String> {
        let mut out = String::new();
        loop {
            self.pos += 3; // opening '''
            loop {
                if self.peek() == Some(b'\'')
                    && self.peek_at(1) == Some(b'\'')
                    && self.peek_at(2) == Some(b'\'')
                {
                    self.pos += 3;
                    break;
                }
                match self.bump() {
                    Some(b'\\') => {
                        if let Some(c) = self.read_escape_char()? {
                            out.push(c);
                        }
                    }
                    Some(b'\r') => {
                        // CR and CRLF normalize to LF.
                        if self.peek() == Some(b'\n') {
                            self.pos += 1;
                        }
                        out.push('\n');
                    }
                    Some(b) => self.push_utf8_byte(&mut out, b)?,
                    None => return Err(self.malformed("unterminated long string")),
                }
            }
            self.skip_trivia()?;
            if !(self.peek() == Some(b'\'')
                && self.peek_at(1) == Some(b'\'')
                && self.peek_at(2) == Some(b'\''))
            {
                return Ok(out);
            }
        }
    }

    fn scan_quoted_symbol(&mut self) -> IonResult<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(b'\'') => return Ok(out),
                Some(b'\\') => {
                    if let Some(c) = self.read_escape_char()? {
                        out.push(c);
                    }
                }
                Some(b'\n') | Some(b'\r') => {
                    return Err(self.malformed("unescaped newline in symbol"));
                }
                Some(b) => self.push_utf8_byte(&mut out, b)?,
                None => return Err(self.malformed("unterminated quoted symbol")),
            }
        }
    }

    /// Appends one input byte to `out`, re-validating multi-byte UTF-8.
    fn push_utf8_byte(&mut self, out: &mut String, first: u8) -> IonResult<()> {
        if first < 0x80 {
            out.push(first as char);
            return Ok(());
        }
        let width = match first {
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Err(self.malformed("invalid UTF-8")),
        };
        let from = self.pos - 1;
        let to = from + width;
        if to > self.data.len() {
            return Err(self.malformed("invalid UTF-8"));
        }
        let text =
            std::str::from_utf8(&self.data[from..to]).map_err(|_| self.malformed("invalid UTF-8"))?;
        out.push_str(text);
        self.pos = to;
        Ok(())
    }

    /// Decodes one escape sequence. `None` means the escape produced no
    /// character (line continuation).
    fn read_escape_char(&mut self) -> IonResult<Option<char>> {
        let b = self
            .bump()
            .ok_or_else(|| self.malformed("unterminated escape"))?;
        let c = match b {
            b'0' => '\0',
            b'a' => '\u{7}',
            b'b' => '\u{8}',
            b't' => '\t',
            b'n' => '\n',
            b'f' => '\u{c}',
            b'r' => '\r',
            b'v' => '\u{b}',
            b'"' => '"',
            b'\'' => '\'',
            b'?' => '?',
            b'/' => '/',
            b'\\' => '\\',
            b'\n' => return Ok(None),
            b'\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
                return Ok(None);
            }
            b'x' => return Ok(Some(self.read_hex_escape(2)?)),
            b'u' => return Ok(Some(self.read_hex_escape(4)?)),
            b'U' => return Ok(Some(self.read_hex_escape(8)?)),
            _ => return Err(self.malformed(format!("invalid escape '\\{}'", b as char))),
        };
        Ok(Some(c))
    }

    fn read_hex_escape(&mut self, width: usize) -> IonResult<char> {
        let mut value: u32 = 0;
        for _ in 0..width {
            let b = self
                .bump()
                .ok_or_else(|| self.malformed("unterminated escape"))?;
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| self.malformed("invalid hex escape"))?;
            value = value * 16 + digit;
        }
        char::from_u32(value).ok_or_else(|| self.malformed("escape is not a valid code point"))
    }

    // --------------------------------------------------------------- lobs

    /// Scans a `{{ … }}` body. The opening braces are already consumed.
    fn scan_lob(&mut self) -> IonResult<Token> {
        self.skip_lob_whitespace();
        match self.peek() {
            Some(b'"') => {
                self.pos += 1;
                let bytes = self.scan_clob_short()?;
                self.expect_lob_close()?;
                Ok(Token::Clob(bytes))
            }
            Some(b'\'') => {
                let mut bytes = Vec::new();
                loop {
                    if !(self.peek() == Some(b'\'')
                        && self.peek_at(1) == Some(b'\'')
                        && self.peek_at(2) == Some(b'\''))
                    {
                        break;
                    }
                    self.pos += 3;
                    self.scan_clob_long_segment(&mut bytes)?;
                    self.skip_lob_whitespace();
                }
                if bytes.is_empty() && self.peek() != Some(b'}') {
                    return Err(self.malformed("invalid clob"));
                }
                self.expect_lob_close()?;
                Ok(Token::Clob(bytes))
            }
            _ => {
                let mut text = String::new();
                loop {
                    match self.peek() {
                        Some(b'}') => break,
                        Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => self.pos += 1,
                        Some(b) if b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=') => {
                            text.push(b as char);
                            self.pos += 1;
                        }
                        Some(_) => return Err(self.malformed("invalid base64 in blob")),
                        None => return Err(self.malformed("unterminated blob")),
                    }
                }
                self.expect_lob_close()?;
                let bytes = ion_base64::from_base64(&text)
                    .map_err(|_| self.malformed("invalid base64 in blob"))?;
                Ok(Token::Blob(bytes))
            }
        }
    }

    /// Lob bodies admit whitespace but not comments.
    fn skip_lob_whitespace(&mut self) {
        while let Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn expect_lob_close(&mut self) -> IonResult<()> {
        self.skip_lob_whitespace();
        if self.peek() == Some(b'}') && self.peek_at(1) == Some(b'}') {
            self.pos += 2;
            return Ok(());
        }
        Err(self.malformed("expected '}}'"))
    }

    fn scan_clob_short(&mut self) -> IonResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            match self.bump() {
                Some(b'"') => return Ok(out),
                Some(b'\\') => self.read_clob_escape(&mut out)?,
                Some(b'\n') | Some(b'\r') => {
                    return Err(self.malformed("unescaped newline in clob"));
                }
                Some(b) if (0x20..0x7f).contains(&b) => out.push(b),
                Some(_) => return Err(self.malformed("clob bytes must be ASCII")),
                None => return Err(self.malformed("unterminated clob")),
            }
        }
    }

    fn scan_clob_long_segment(&mut self, out: &mut Vec<u8>) -> IonResult<()> {
        loop {
            if self.peek() == Some(b'\'')
                && self.peek_at(1) == Some(b'\'')
                && self.peek_at(2) == Some(b'\'')
            {
                self.pos += 3;
                return Ok(());
            }
            match self.bump() {
                Some(b'\\') => self.read_clob_escape(out)?,
                Some(b'\r') => {
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                    out.push(b'\n');
                }
                Some(b) if b == b'\n' || b == b'\t' || (0x20..0x7f).contains(&b) => out.push(b),
                Some(_) => return Err(self.malformed("clob bytes must be ASCII")),
                None => return Err(self.malformed("unterminated clob")),
            }
        }
    }

    /// Clob escapes are byte-valued; Unicode escapes are not allowed.
    fn read_clob_escape(&mut self, out: &mut Vec<u8>) -> IonResult<()> {
        let b = self
            .bump()
            .ok_or_else(|| self.malformed("unterminated escape"))?;
        let byte = match b {
            b'0' => 0x00,
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'f' => 0x0c,
            b'r' => b'\r',
            b'v' => 0x0b,
            b'"' => b'"',
            b'\'' => b'\'',
            b'?' => b'?',
            b'/' => b'/',
            b'\\' => b'\\',
            b'\n' => return Ok(()),
            b'\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
                return Ok(());
            }
            b'x' => {
                let c = self.read_hex_escape(2)?;
                out.push(c as u32 as u8);
                return Ok(());
            }
            b'u' | b'U' => return Err(self.malformed("Unicode escapes are not allowed in clobs")),
            _ => return Err(self.malformed(format!("invalid escape '\\{}'", b as char))),
        };
        out.push(byte);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(input: &str) -> Token {
        Scanner::new(input).next_token(false).unwrap()
    }

    #[test]
    fn punctuation_and_identifiers() {
        assert_eq!(one("{"), Token::OpenBrace);
        assert_eq!(one("foo"), Token::Identifier("foo".to_owned()));
        assert_eq!(one("$ion_1_0"), Token::Identifier("$ion_1_0".to_owned()));
        assert_eq!(one("$10"), Token::SymbolId(10));
        assert_eq!(one("'a b'"), Token::QuotedSymbol("a b".to_owned()));
        assert_eq!(one("true"), Token::Bool(true));
        assert_eq!(one("null"), Token::Null(IonType::Null));
        assert_eq!(one("null.int"), Token::Null(IonType::Int));
    }

    #[test]
    fn comments_are_separators() {
        let mut scanner = Scanner::new("// line\n /* block */ 42");
        assert_eq!(scanner.next_token(false).unwrap(), Token::Int(BigInt::from(42)));
    }

    #[test]
    fn numbers_classify() {
        assert_eq!(one("42"), Token::Int(BigInt::from(42)));
        assert_eq!(one("-7"), Token::Int(BigInt::from(-7)));
        assert_eq!(one("0x1f"), Token::Int(BigInt::from(0x1f)));
        assert_eq!(one("-0b101"), Token::Int(BigInt::from(-5)));
        assert_eq!(one("1_000"), Token::Int(BigInt::from(1000)));
        assert_eq!(one("2.5e0"), Token::Float(2.5));
        assert_eq!(one("1.5"), Token::Decimal(Decimal::parse("1.5").unwrap()));
        assert_eq!(one("1d3"), Token::Decimal(Decimal::parse("1d3").unwrap()));
    }

    #[test]
    fn number_separator_rules() {
        for bad in ["1__0", "1_", "0x_1", "_1.0", "1._2"] {
            let result = Scanner::new(bad).next_token(false);
            let ok_identifier = matches!(result, Ok(Token::Identifier(_)));
            assert!(
                result.is_err() || ok_identifier,
                "expected rejection for {bad}, got {result:?}"
            );
        }
        assert!(Scanner::new("1__0").next_token(false).is_err());
        assert!(Scanner::new("1_").next_token(false).is_err());
        assert!(Scanner::new("0x_1").next_token(false).is_err());
    }

    #[test]
    fn leading_zero_is_rejected() {
        assert!(Scanner::new("007").next_token(false).is_err());
    }

    #[test]
    fn special_floats() {
        assert_eq!(one("+inf"), Token::Float(f64::INFINITY));
        assert_eq!(one("-inf"), Token::Float(f64::NEG_INFINITY));
        assert!(matches!(one("nan"), Token::Float(f) if f.is_nan()));
    }

    #[test]
    fn timestamps_lex_as_one_token() {
        let token = one("2007-02-23T12:14:33.079-08:00");
        assert!(matches!(token, Token::Timestamp(_)));
        // A four-digit int is still an int.
        assert_eq!(one("2007 "), Token::Int(BigInt::from(2007)));
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(one(r#""a\nb""#), Token::Str("a\nb".to_owned()));
        assert_eq!(one(r#""\x41B""#), Token::Str("AB".to_owned()));
        assert_eq!(one("'''a''' '''b'''"), Token::Str("ab".to_owned()));
        assert!(Scanner::new("\"abc").next_token(false).is_err());
    }

    #[test]
    fn lobs() {
        assert_eq!(one("{{aGVsbG8=}}"), Token::Blob(b"hello".to_vec()));
        assert_eq!(one("{{ aGVs bG8= }}"), Token::Blob(b"hello".to_vec()));
        assert_eq!(one(r#"{{"hi"}}"#), Token::Clob(b"hi".to_vec()));
        assert_eq!(one("{{'''hi'''}}"), Token::Clob(b"hi".to_vec()));
        assert!(Scanner::new("{{!!}}").next_token(false).is_err());
    }

    #[test]
    fn operators_only_in_sexp() {
        let mut scanner = Scanner::new("+");
        assert!(scanner.next_token(false).is_err());
        let mut scanner = Scanner::new("+ ");
        assert_eq!(
            scanner.next_token(true).unwrap(),
            Token::Operator("+".to_owned())
        );
    }

    #[test]
    fn double_colon_lookahead() {
        let mut scanner = Scanner::new("  :: x");
        assert!(scanner.double_colon_follows().unwrap());
        // A single colon is left alone.
        let mut scanner = Scanner::new(" : x");
        assert!(!scanner.double_colon_follows().unwrap());
        assert_eq!(scanner.next_token(false).unwrap(), Token::Colon);
    }
}
