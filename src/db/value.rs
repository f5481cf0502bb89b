//! Typed cell values.
//!
//! DuckDB hands back a wide set of native types. Rows are normalized into the
//! small closed [`CellValue`] set here; its `Display` impl is the display rule
//! every tool uses (`NULL` for null, natural text for everything else).

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Integer(i128),
    Float(f64),
    /// Exact decimal in its textual form
    Decimal(String),
    Text(String),
    /// Date, time, timestamp or interval already rendered as text
    Temporal(String),
    Binary(Vec<u8>),
    /// LIST and ARRAY elements
    List(Vec<CellValue>),
    /// STRUCT fields or MAP entries, in order
    Map(Vec<(CellValue, CellValue)>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for integer, float and decimal cells.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_) | Self::Decimal(_))
    }

    /// Get the type name of this value for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Temporal(_) => "temporal",
            Self::Binary(_) => "binary",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

/// Text rendering used for every `data` cell.
///
/// SQL NULL is the only value rendered from [`CellValue::Null`], but a text
/// cell holding the string `NULL` renders the same way; use
/// [`CellValue::is_null`] when the difference matters.
impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Decimal(s) | Self::Text(s) | Self::Temporal(s) => f.write_str(s),
            Self::Binary(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => f.write_str(s),
                Err(_) => f.write_str(&STANDARD.encode(bytes)),
            },
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Boolean(b) => Self::Boolean(b),
            Value::TinyInt(i) => Self::Integer(i.into()),
            Value::SmallInt(i) => Self::Integer(i.into()),
            Value::Int(i) => Self::Integer(i.into()),
            Value::BigInt(i) => Self::Integer(i.into()),
            Value::HugeInt(i) => Self::Integer(i),
            Value::UTinyInt(i) => Self::Integer(i.into()),
            Value::USmallInt(i) => Self::Integer(i.into()),
            Value::UInt(i) => Self::Integer(i.into()),
            Value::UBigInt(i) => Self::Integer(i.into()),
            // Widening f32 to f64 directly prints the binary error (1.1 -> 1.100000023841858).
            Value::Float(v) => Self::Float(v.to_string().parse().unwrap_or(f64::from(v))),
            Value::Double(v) => Self::Float(v),
            Value::Decimal(d) => Self::Decimal(d.to_string()),
            Value::Text(s) | Value::Enum(s) => Self::Text(s),
            Value::Blob(bytes) => Self::Binary(bytes),
            Value::Date32(days) => Self::Temporal(
                infinity_label(i64::from(days), i64::from(i32::MAX))
                    .map_or_else(|| format_date(days), String::from),
            ),
            Value::Time64(unit, v) => Self::Temporal(format_time(to_micros(unit, v))),
            Value::Timestamp(unit, v) => Self::Temporal(
                infinity_label(v, i64::MAX)
                    .map_or_else(|| format_timestamp(to_micros(unit, v)), String::from),
            ),
            Value::Interval {
                months,
                days,
                nanos,
            } => Self::Temporal(format_interval(months, days, nanos)),
            Value::List(items) | Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            Value::Struct(fields) => Self::Map(
                fields
                    .iter()
                    .map(|(name, value)| (Self::Text(name.clone()), Self::from(value.clone())))
                    .collect(),
            ),
            Value::Map(entries) => Self::Map(
                entries
                    .iter()
                    .map(|(key, value)| (Self::from(key.clone()), Self::from(value.clone())))
                    .collect(),
            ),
            Value::Union(inner) => Self::from(*inner),
            #[allow(unreachable_patterns)]
            other => Self::Text(format!("{other:?}")),
        }
    }
}

/// DuckDB stores +/-infinity for DATE and TIMESTAMP as the extreme values of the
/// underlying integer.
fn infinity_label(raw: i64, max: i64) -> Option<&'static str> {
    if raw == max {
        Some("infinity")
    } else if raw == -max || raw == -max - 1 {
        Some("-infinity")
    } else {
        None
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn format_date(days_since_epoch: i32) -> String {
    days_since_epoch
        .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| format!("{days_since_epoch} days"))
}

fn format_time(micros_since_midnight: i64) -> String {
    let secs = micros_since_midnight.div_euclid(1_000_000);
    let micros = micros_since_midnight.rem_euclid(1_000_000);
    u32::try_from(secs)
        .ok()
        .and_then(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, (micros * 1_000) as u32))
        .map(|t| t.format("%H:%M:%S%.f").to_string())
        .unwrap_or_else(|| format!("{micros_since_midnight}us"))
}

fn format_timestamp(micros_since_epoch: i64) -> String {
    DateTime::from_timestamp_micros(micros_since_epoch)
        .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.f").to_string())
        .unwrap_or_else(|| format!("{micros_since_epoch}us"))
}

fn format_interval(months: i32, days: i32, nanos: i64) -> String {
    let mut parts = Vec::new();
    let (years, months) = (months / 12, months % 12);
    if years != 0 {
        parts.push(plural(i64::from(years), "year"));
    }
    if months != 0 {
        parts.push(plural(i64::from(months), "month"));
    }
    if days != 0 {
        parts.push(plural(i64::from(days), "day"));
    }
    if nanos != 0 || parts.is_empty() {
        let sign = if nanos < 0 { "-" } else { "" };
        let total_micros = (nanos / 1_000).unsigned_abs();
        let secs = total_micros / 1_000_000;
        let frac = total_micros % 1_000_000;
        let clock = format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);
        if frac == 0 {
            parts.push(format!("{sign}{clock}"));
        } else {
            parts.push(format!("{sign}{clock}.{frac:06}"));
        }
    }
    parts.join(" ")
}

fn plural(n: i64, unit: &str) -> String {
    if n.abs() == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
