//! Ion timestamps: a point in time with preserved source precision,
//! timezone kind, and fractional-second digit count.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{IonError, IonResult};

/// How much of the timestamp was actually specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Year,
    Month,
    Day,
    Minute,
    Second,
    Nanosecond,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Precision::Year => "Year",
            Precision::Month => "Month",
            Precision::Day => "Day",
            Precision::Minute => "Minute",
            Precision::Second => "Second",
            Precision::Nanosecond => "Nanosecond",
        };
        write!(f, "{text}")
    }
}

/// The tri-state timezone classification.
///
/// A written `-00:00` offset (and every date-only timestamp) is
/// `Unspecified`; `Z` or `+00:00` is `Utc`; any other offset is `Local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimezoneKind {
    Unspecified,
    Utc,
    Local,
}

impl fmt::Display for TimezoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TimezoneKind::Unspecified => "Unspecified",
            TimezoneKind::Utc => "UTC",
            TimezoneKind::Local => "Local",
        };
        write!(f, "{text}")
    }
}

/// A calendrically validated Ion timestamp.
///
/// `date_time` holds the wall-clock reading in the timestamp's own zone;
/// `offset_minutes` is zero unless the kind is [`TimezoneKind::Local`].
/// Two timestamps are equal only if instant, offset, precision, kind, and
/// fractional digit count all agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    date_time: NaiveDateTime,
    offset_minutes: i32,
    precision: Precision,
    kind: TimezoneKind,
    fractional_units: u8,
}

impl Timestamp {
    /// Constructor for timestamps that only have a date portion.
    pub fn new_date(date: NaiveDate, precision: Precision) -> Self {
        let precision = precision.min(Precision::Day);
        Self {
            date_time: date.and_time(NaiveTime::MIN),
            offset_minutes: 0,
            precision,
            kind: TimezoneKind::Unspecified,
            fractional_units: 0,
        }
    }

    /// General constructor. Year/Month/Day precision forces the kind to
    /// [`TimezoneKind::Unspecified`].
    pub fn new(date_time: NaiveDateTime, precision: Precision, kind: TimezoneKind) -> Self {
        Self::with_fractional_seconds(date_time, precision, kind, 0)
    }

    /// Constructor carrying a fractional-second digit count, clamped to 9.
    pub fn with_fractional_seconds(
        date_time: NaiveDateTime,
        precision: Precision,
        kind: TimezoneKind,
        fraction_digits: u8,
    ) -> Self {
        let kind = if precision <= Precision::Day {
            TimezoneKind::Unspecified
        } else {
            kind
        };
        Self {
            date_time,
            offset_minutes: 0,
            precision,
            kind,
            fractional_units: fraction_digits.min(9),
        }
    }

    /// Attaches a local-zone offset, in minutes east of UTC. Only
    /// meaningful for [`TimezoneKind::Local`] timestamps.
    pub fn with_offset(mut self, offset_minutes: i32) -> Self {
        if self.kind == TimezoneKind::Local {
            self.offset_minutes = offset_minutes;
        }
        self
    }

    /// Parses `text` and checks that the result carries the expected
    /// precision and timezone kind.
    pub fn from_str(text: &str, precision: Precision, kind: TimezoneKind) -> IonResult<Timestamp> {
        let parsed = Timestamp::parse(text)?;
        if parsed.precision != precision || parsed.kind != kind {
            return Err(IonError::InvalidTimestamp(format!(
                "'{text}' does not match precision {precision} with {kind} timezone"
            )));
        }
        Ok(parsed)
    }

    /// Parses an Ion timestamp literal, inferring precision, timezone kind,
    /// and fractional digit count from its shape.
    pub fn parse(text: &str) -> IonResult<Timestamp> {
        let mut p = FieldParser::new(text);

        let year = p.digits(4)?;
        if year == 0 {
            return Err(invalid(text));
        }
        if p.eat(b'T') {
            p.finish(text)?;
            let date = date_of(year, 1, 1, text)?;
            return Ok(Timestamp::new_date(date, Precision::Year));
        }

        p.expect(b'-', text)?;
        let month = p.digits(2)?;
        if p.eat(b'T') {
            p.finish(text)?;
            let date = date_of(year, month, 1, text)?;
            return Ok(Timestamp::new_date(date, Precision::Month));
        }

        p.expect(b'-', text)?;
        let day = p.digits(2)?;
        let date = date_of(year, month, day, text)?;
        if p.at_end() {
            return Ok(Timestamp::new_date(date, Precision::Day));
        }
        p.expect(b'T', text)?;
        if p.at_end() {
            return Ok(Timestamp::new_date(date, Precision::Day));
        }

        let hour = p.digits(2)?;
        p.expect(b':', text)?;
        let minute = p.digits(2)?;

        let mut precision = Precision::Minute;
        let mut second = 0u32;
        let mut nanos = 0u32;
        let mut fractional_units = 0u8;

        if p.eat(b':') {
            precision = Precision::Second;
            second = p.digits(2)?;
            if p.eat(b'.') {
                precision = Precision::Nanosecond;
                let (frac_nanos, declared, nonzero) = p.fraction(text)?;
                nanos = frac_nanos;
                // Trailing zeros of a non-zero fraction do not count toward
                // the preserved digit count; an all-zero fraction keeps its
                // declared width.
                fractional_units = if nonzero {
                    let significant = significant_units(nanos);
                    if significant == 0 {
                        declared
                    } else {
                        significant
                    }
                } else {
                    declared
                };
            }
        }

        let (kind, offset_minutes) = p.offset(text)?;
        p.finish(text)?;

        let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
            .ok_or_else(|| invalid(text))?;
        let date_time = date.and_time(time);
        let ts = Timestamp::with_fractional_seconds(date_time, precision, kind, fractional_units);
        Ok(ts.with_offset(offset_minutes))
    }

    /// Builds a timestamp from binary-form components. The wall-clock
    /// fields arrive in UTC; the offset is re-applied here. Invalid dates
    /// are rejected, never normalized.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_component_fields(
        year: u32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        nanos: u32,
        offset_minutes: Option<i32>,
        precision: Precision,
        fractional_units: u8,
    ) -> IonResult<Timestamp> {
        let label = format!("{year:04}-{month:02}-{day:02}");
        if year == 0 {
            return Err(IonError::InvalidTimestamp(label));
        }
        let date = NaiveDate::from_ymd_opt(year as i32, month, day)
            .ok_or_else(|| IonError::InvalidTimestamp(label.clone()))?;
        if precision <= Precision::Day {
            return Ok(Timestamp::new_date(date, precision));
        }
        let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
            .ok_or_else(|| IonError::InvalidTimestamp(label))?;
        let utc = date.and_time(time);
        let (kind, offset) = match offset_minutes {
            None => (TimezoneKind::Unspecified, 0),
            Some(0) => (TimezoneKind::Utc, 0),
            Some(m) => (TimezoneKind::Local, m),
        };
        let wall = utc + Duration::minutes(offset as i64);
        let ts = Timestamp::with_fractional_seconds(wall, precision, kind, fractional_units);
        Ok(ts.with_offset(offset))
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn kind(&self) -> TimezoneKind {
        self.kind
    }

    pub fn fractional_units(&self) -> u8 {
        self.fractional_units
    }

    /// Wall-clock reading in the timestamp's own zone.
    pub fn date_time(&self) -> NaiveDateTime {
        self.date_time
    }

    /// Offset in minutes east of UTC; zero unless the kind is `Local`.
    pub fn offset_minutes(&self) -> i32 {
        self.offset_minutes
    }

    /// The UTC reading of the instant.
    pub fn utc_date_time(&self) -> NaiveDateTime {
        self.date_time - Duration::minutes(self.offset_minutes as i64)
    }

    /// Nanoseconds with trailing zeros removed down to the preserved digit
    /// count (`123456000` with six fractional units → `123456`).
    pub fn truncated_nanoseconds(&self) -> u32 {
        let mut nsecs = self.date_time.nanosecond();
        let mut budget = 9 - self.fractional_units.min(9);
        while budget > 0 && nsecs > 0 && nsecs % 10 == 0 {
            nsecs /= 10;
            budget -= 1;
        }
        nsecs
    }

    /// The binary-form fraction field: `(exponent, coefficient)` such that
    /// `coefficient × 10^exponent` seconds is the sub-second part. `None`
    /// below [`Precision::Nanosecond`].
    pub(crate) fn fraction_parts(&self) -> Option<(i32, u64)> {
        if self.precision < Precision::Nanosecond {
            return None;
        }
        let units = self.fractional_units.min(9) as u32;
        let coefficient = self.date_time.nanosecond() as u64 / 10u64.pow(9 - units);
        Some((-(units as i32), coefficient))
    }

    /// Renders the canonical Ion text form.
    pub fn format(&self) -> String {
        let d = &self.date_time;
        let mut out = String::with_capacity(32);
        match self.precision {
            Precision::Year => {
                out.push_str(&format!("{:04}T", d.year()));
                return out;
            }
            Precision::Month => {
                out.push_str(&format!("{:04}-{:02}T", d.year(), d.month()));
                return out;
            }
            Precision::Day => {
                out.push_str(&format!("{:04}-{:02}-{:02}T", d.year(), d.month(), d.day()));
                return out;
            }
            _ => {}
        }

        out.push_str(&format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}",
            d.year(),
            d.month(),
            d.day(),
            d.hour(),
            d.minute()
        ));
        if self.precision >= Precision::Second {
            out.push_str(&format!(":{:02}", d.second()));
        }
        if self.precision == Precision::Nanosecond && self.fractional_units > 0 {
            let digits = format!("{:09}", d.nanosecond());
            out.push('.');
            out.push_str(&digits[..self.fractional_units.min(9) as usize]);
        }
        match self.kind {
            TimezoneKind::Utc => out.push('Z'),
            TimezoneKind::Unspecified => out.push_str("-00:00"),
            TimezoneKind::Local => {
                let sign = if self.offset_minutes < 0 { '-' } else { '+' };
                let magnitude = self.offset_minutes.unsigned_abs();
                out.push_str(&format!("{sign}{:02}:{:02}", magnitude / 60, magnitude % 60));
            }
        }
        out
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

fn invalid(text: &str) -> IonError {
    IonError::InvalidTimestamp(text.to_owned())
}

fn date_of(year: u32, month: u32, day: u32, text: &str) -> IonResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| invalid(text))
}

/// Count of digits needed before trailing zeros begin in a 9-digit
/// nanosecond rendering of `nanos`.
fn significant_units(nanos: u32) -> u8 {
    if nanos == 0 {
        return 0;
    }
    let mut units = 9u8;
    let mut n = nanos;
    while n % 10 == 0 {
        n /= 10;
        units -= 1;
    }
    units
}

/// Byte-cursor helper for the fixed-width timestamp fields.
struct FieldParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn digits(&mut self, count: usize) -> IonResult<u32> {
        if self.pos + count > self.bytes.len() {
            return Err(IonError::InvalidTimestamp("truncated field".to_owned()));
        }
        let mut value = 0u32;
        for _ in 0..count {
            let b = self.bytes[self.pos];
            if !b.is_ascii_digit() {
                return Err(IonError::InvalidTimestamp("expected digit".to_owned()));
            }
            value = value * 10 + (b - b'0') as u32;
            self.pos += 1;
        }
        Ok(value)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.pos < self.bytes.len() && self.bytes[self.pos] == b {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, b: u8, text: &str) -> IonResult<()> {
        if !self.eat(b) {
            return Err(invalid(text));
        }
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Reads the fractional-second digit run. Returns the nanosecond value
    /// (first nine digits), the declared digit count (clamped to 9), and
    /// whether any digit was non-zero.
    fn fraction(&mut self, text: &str) -> IonResult<(u32, u8, bool)> {
        let mut nanos = 0u64;
        let mut seen = 0usize;
        let mut nonzero = false;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            let digit = (self.bytes[self.pos] - b'0') as u64;
            if digit != 0 {
                nonzero = true;
            }
            if seen < 9 {
                nanos = nanos * 10 + digit;
            }
            seen += 1;
            self.pos += 1;
        }
        if seen == 0 {
            return Err(invalid(text));
        }
        let kept = seen.min(9);
        // Scale to a full nanosecond count.
        for _ in kept..9 {
            nanos *= 10;
        }
        Ok((nanos as u32, kept as u8, nonzero))
    }

    fn offset(&mut self, text: &str) -> IonResult<(TimezoneKind, i32)> {
        if self.eat(b'Z') || self.eat(b'z') {
            return Ok((TimezoneKind::Utc, 0));
        }
        let negative = if self.eat(b'+') {
            false
        } else if self.eat(b'-') {
            true
        } else {
            return Err(invalid(text));
        };
        let hours = self.digits(2)?;
        self.expect(b':', text)?;
        let minutes = self.digits(2)?;
        if hours > 23 || minutes > 59 {
            return Err(invalid(text));
        }
        let total = (hours * 60 + minutes) as i32;
        if total == 0 {
            if negative {
                return Ok((TimezoneKind::Unspecified, 0));
            }
            return Ok((TimezoneKind::Utc, 0));
        }
        Ok((TimezoneKind::Local, if negative { -total } else { total }))
    }

    fn finish(&self, text: &str) -> IonResult<()> {
        if self.pos != self.bytes.len() {
            return Err(invalid(text));
        }
        Ok(())
    }
}
