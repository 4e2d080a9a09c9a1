//! Column kinds, type guessing, and raw-value coercion.

use std::fmt;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::event::Value;

/// The semantic kind of a reference-table column, inferred from a sample
/// value rather than a declared schema.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Whole numbers within the `i64` range.
    Integer,
    /// Finite decimal numbers.
    Float,
    /// `true` or `false`, case-insensitively.
    Boolean,
    /// Anything else stays raw text.
    Bytes,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::Bytes => "bytes",
        })
    }
}

/// A raw value did not parse as the kind sampled for its column.
#[derive(Debug, Snafu)]
#[snafu(display("could not convert {value:?} to {kind}"))]
pub struct ConversionError {
    kind: Kind,
    value: String,
}

impl Kind {
    /// Guesses the kind of a column from a single sample value.
    ///
    /// The ladder is ordered and the first match wins: integer, then float,
    /// then boolean, then raw text. Callers sample only the first data row of
    /// a table; columns whose later rows diverge from the sampled kind fail
    /// per event at coercion time, not here.
    pub fn guess(sample: &str) -> Kind {
        if sample.parse::<i64>().is_ok() {
            Kind::Integer
        } else if sample
            .parse::<f64>()
            .map(f64::is_finite)
            .unwrap_or(false)
        {
            Kind::Float
        } else if sample.eq_ignore_ascii_case("true") || sample.eq_ignore_ascii_case("false") {
            Kind::Boolean
        } else {
            Kind::Bytes
        }
    }

    /// Coerces a raw table cell into a typed [`Value`] of this kind.
    pub fn coerce(self, raw: &str) -> Result<Value, ConversionError> {
        let parsed = match self {
            Kind::Integer => raw.parse::<i64>().ok().map(Value::Integer),
            Kind::Float => raw
                .parse::<f64>()
                .ok()
                .and_then(|value| NotNan::new(value).ok())
                .map(Value::Float),
            Kind::Boolean => {
                if raw.eq_ignore_ascii_case("true") {
                    Some(Value::Boolean(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Some(Value::Boolean(false))
                } else {
                    None
                }
            }
            Kind::Bytes => Some(Value::from(raw)),
        };
        parsed.ok_or_else(|| {
            ConversionSnafu {
                kind: self,
                value: raw,
            }
            .build()
        })
    }

    /// The kind-appropriate empty value, used by the fill-on-miss policy.
    pub fn empty_value(self) -> Value {
        match self {
            Kind::Integer => Value::Integer(0),
            Kind::Float => Value::from_f64_or_zero(0.0),
            Kind::Boolean => Value::Boolean(false),
            Kind::Bytes => Value::from(""),
        }
    }
}
