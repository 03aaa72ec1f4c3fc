//! Scalar coercion: turning a lexical token into the scalar a shape asks for.
//!
//! Conversions are best effort. When the token cannot be represented exactly by the requested kind
//! the raw token is handed back unchanged, so a wrong hint never fails a parse. Dates are the one
//! exception: a string bound for a date/time that does not match the wire format is an error.

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::trace;

use crate::shape::{ScalarKind, Shape};
use crate::value::{Key, Number, Value};
use crate::ErrorKind;

/// A lexical token as the scanner produced it, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
    Bool(bool),
    Str(String),
    /// The numeric slice exactly as it appeared in the input.
    Num(String),
}

impl Raw {
    /// The uncoerced value: what `Any` targets and failed conversions produce.
    pub fn into_value(self) -> Value {
        match self {
            Raw::Bool(b) => Value::Bool(b),
            Raw::Str(s) => Value::String(s),
            Raw::Num(n) => Value::Number(Number::Raw(n)),
        }
    }
}

/// Coerce `raw` into the scalar kind requested by `shape`. Non-scalar shapes leave it raw.
pub fn coerce(raw: Raw, shape: &Shape) -> Result<Value, ErrorKind> {
    let Some(kind) = shape.scalar_kind() else {
        return Ok(raw.into_value());
    };

    if kind == ScalarKind::DateTime {
        return match raw {
            Raw::Str(s) => parse_datetime(&s)
                .map(Value::DateTime)
                .ok_or(ErrorKind::DateFormat { input: s }),
            other => Ok(other.into_value()),
        };
    }

    match convert(&raw, kind) {
        Some(value) => Ok(value),
        None => {
            trace!(?raw, %kind, "token does not fit the requested kind, keeping it raw");
            Ok(raw.into_value())
        }
    }
}

/// Coerce an object key to `shape`. Keys that do not convert, or whose shape is not a hashable
/// scalar, stay strings.
pub fn coerce_key(key: String, shape: &Shape) -> Key {
    let converted = match shape.scalar_kind() {
        Some(ScalarKind::String | ScalarKind::DateTime) | None => None,
        Some(kind) => convert(&Raw::Str(key.clone()), kind),
    };
    match converted {
        Some(Value::Bool(b)) => Key::Bool(b),
        Some(Value::Number(Number::I64(n))) => Key::I64(n),
        Some(Value::Number(Number::U64(n))) => Key::U64(n),
        _ => Key::String(key),
    }
}

fn convert(raw: &Raw, kind: ScalarKind) -> Option<Value> {
    use ScalarKind::*;

    match kind {
        Bool => to_bool(raw).map(Value::Bool),
        I8 | I16 | I32 | I64 => {
            let n = to_integer(raw)?;
            let (lo, hi) = signed_bounds(kind);
            (lo..=hi)
                .contains(&n)
                .then(|| Value::Number(Number::I64(n as i64)))
        }
        U8 | U16 | U32 | U64 => {
            let n = to_integer(raw)?;
            (0..=unsigned_max(kind))
                .contains(&n)
                .then(|| Value::Number(Number::U64(n as u64)))
        }
        F32 => match raw {
            Raw::Bool(b) => Some(f32::from(u8::from(*b))),
            Raw::Str(s) | Raw::Num(s) => s.parse::<f32>().ok(),
        }
        .map(|n| Value::Number(Number::F32(n))),
        F64 => match raw {
            Raw::Bool(b) => Some(f64::from(u8::from(*b))),
            Raw::Str(s) | Raw::Num(s) => s.parse::<f64>().ok(),
        }
        .map(|n| Value::Number(Number::F64(n))),
        String => Some(Value::String(match raw {
            Raw::Bool(b) => b.to_string(),
            Raw::Str(s) | Raw::Num(s) => s.clone(),
        })),
        DateTime => None,
    }
}

fn to_bool(raw: &Raw) -> Option<bool> {
    match raw {
        Raw::Bool(b) => Some(*b),
        Raw::Str(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Raw::Str(s) if s.eq_ignore_ascii_case("false") => Some(false),
        Raw::Str(_) => None,
        Raw::Num(n) => n.parse::<f64>().ok().filter(|f| !f.is_nan()).map(|f| f != 0.0),
    }
}

/// The exact integer a token denotes. Exponent forms like `13e7` count when they land on an
/// integer; fractional values do not.
fn to_integer(raw: &Raw) -> Option<i128> {
    match raw {
        Raw::Bool(b) => Some(i128::from(*b)),
        Raw::Str(s) | Raw::Num(s) => exact_integer(s),
    }
}

/// Decimal literal to integer by shifting the decimal point in the digit string, so precision is
/// never routed through `f64`. `None` for fractional values, malformed text or anything outside
/// `i128`.
pub(crate) fn exact_integer(text: &str) -> Option<i128> {
    if let Ok(n) = text.parse::<i128>() {
        return Some(n);
    }

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) => (&unsigned[..i], unsigned[i + 1..].parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut digits = format!("{whole}{fraction}");
    let shift = exponent.checked_sub(i64::try_from(fraction.len()).ok()?)?;
    let all_zero = |s: &str| s.bytes().all(|b| b == b'0');

    if shift < 0 {
        let dropped = usize::try_from(shift.unsigned_abs()).ok()?;
        if dropped >= digits.len() {
            return all_zero(&digits).then_some(0);
        }
        let cut = digits.len() - dropped;
        if !all_zero(&digits[cut..]) {
            return None;
        }
        digits.truncate(cut);
    } else if shift > 0 {
        let significant = digits.trim_start_matches('0').len();
        if significant == 0 {
            return Some(0);
        }
        // i128 holds at most 39 digits.
        let shift = usize::try_from(shift).ok().filter(|s| significant + s <= 39)?;
        digits.extend(std::iter::repeat('0').take(shift));
    }

    let n = digits.parse::<i128>().ok()?;
    Some(if negative { -n } else { n })
}

fn signed_bounds(kind: ScalarKind) -> (i128, i128) {
    match kind {
        ScalarKind::I8 => (i8::MIN.into(), i8::MAX.into()),
        ScalarKind::I16 => (i16::MIN.into(), i16::MAX.into()),
        ScalarKind::I32 => (i32::MIN.into(), i32::MAX.into()),
        _ => (i64::MIN.into(), i64::MAX.into()),
    }
}

fn unsigned_max(kind: ScalarKind) -> i128 {
    match kind {
        ScalarKind::U8 => u8::MAX.into(),
        ScalarKind::U16 => u16::MAX.into(),
        ScalarKind::U32 => u32::MAX.into(),
        _ => u64::MAX.into(),
    }
}

/// Parse `YYYY-MM-DDTHH:mm:ss.sss` followed by `Z` or a `±HH:MM` offset, normalized to UTC. An
/// instant whose UTC form is out of range keeps its offset.
pub fn parse_datetime(input: &str) -> Option<OffsetDateTime> {
    let parsed = match input.strip_suffix('Z') {
        Some(local) => PrimitiveDateTime::parse(
            local,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"),
        )
        .ok()?
        .assume_utc(),
        None => OffsetDateTime::parse(
            input,
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory]:[offset_minute]"
            ),
        )
        .ok()?,
    };
    Some(to_utc(parsed).unwrap_or(parsed))
}

/// Render `dt` as `YYYY-MM-DDTHH:mm:ss.sssZ` in UTC. When the UTC instant is out of range the
/// local time is written with its `±HH:MM` offset instead.
pub fn format_datetime(dt: OffsetDateTime) -> String {
    match to_utc(dt) {
        Some(utc) => utc.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        )),
        None => dt.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory]:[offset_minute]"
        )),
    }
    .unwrap_or_else(|_| dt.to_string())
}

/// `None` when the UTC instant falls outside the supported date range.
fn to_utc(dt: OffsetDateTime) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(dt.unix_timestamp_nanos()).ok()
}
