use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Comparison – how a predicate tests its attribute
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Comparison {
    #[default]
    OneOf,
    LessThan,
    GreaterThan,
}

impl Comparison {
    pub const ALL: [Comparison; 3] = [
        Comparison::LessThan,
        Comparison::OneOf,
        Comparison::GreaterThan,
    ];

    /// Wire symbol, as emitted in the `type` field.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::OneOf => "of",
            Comparison::LessThan => "<",
            Comparison::GreaterThan => ">",
        }
    }

    /// Picker text.
    pub fn label(self) -> &'static str {
        match self {
            Comparison::OneOf => "is one of",
            Comparison::LessThan => "is less than",
            Comparison::GreaterThan => "is greater than",
        }
    }

    pub fn is_threshold(self) -> bool {
        !matches!(self, Comparison::OneOf)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown comparison '{0}', expected one of: of, <, >")]
pub struct UnknownComparison(pub String);

impl FromStr for Comparison {
    type Err = UnknownComparison;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "of" => Ok(Comparison::OneOf),
            "<" => Ok(Comparison::LessThan),
            ">" => Ok(Comparison::GreaterThan),
            other => Err(UnknownComparison(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Predicate – one committed filter
// ---------------------------------------------------------------------------

pub type PredicateId = u32;

/// The condition half of a predicate. Serialized flat into the predicate
/// object, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Condition {
    #[serde(rename = "of")]
    OneOf {
        #[serde(rename = "allowedValues")]
        allowed_values: Vec<String>,
    },
    #[serde(rename = "<")]
    LessThan { threshold: f64 },
    #[serde(rename = ">")]
    GreaterThan { threshold: f64 },
}

impl Condition {
    pub fn comparison(&self) -> Comparison {
        match self {
            Condition::OneOf { .. } => Comparison::OneOf,
            Condition::LessThan { .. } => Comparison::LessThan,
            Condition::GreaterThan { .. } => Comparison::GreaterThan,
        }
    }
}

/// A committed filter. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    id: PredicateId,
    #[serde(rename = "keyName")]
    key_name: String,
    #[serde(flatten)]
    condition: Condition,
}

impl Predicate {
    /// Membership predicate. Callers guarantee `allowed_values` is non-empty.
    pub fn one_of(
        id: PredicateId,
        key_name: impl Into<String>,
        allowed_values: Vec<String>,
    ) -> Self {
        Predicate {
            id,
            key_name: key_name.into(),
            condition: Condition::OneOf { allowed_values },
        }
    }

    /// Threshold predicate. `OneOf` is not a threshold comparison and is
    /// rejected with `None`.
    pub fn threshold(
        id: PredicateId,
        key_name: impl Into<String>,
        comparison: Comparison,
        threshold: f64,
    ) -> Option<Self> {
        let condition = match comparison {
            Comparison::LessThan => Condition::LessThan { threshold },
            Comparison::GreaterThan => Condition::GreaterThan { threshold },
            Comparison::OneOf => return None,
        };
        Some(Predicate {
            id,
            key_name: key_name.into(),
            condition,
        })
    }

    pub fn id(&self) -> PredicateId {
        self.id
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn comparison(&self) -> Comparison {
        self.condition.comparison()
    }

    pub fn allowed_values(&self) -> Option<&[String]> {
        match &self.condition {
            Condition::OneOf { allowed_values } => Some(allowed_values),
            _ => None,
        }
    }

    pub fn threshold_value(&self) -> Option<f64> {
        match self.condition {
            Condition::LessThan { threshold } | Condition::GreaterThan { threshold } => {
                Some(threshold)
            }
            Condition::OneOf { .. } => None,
        }
    }

    /// Bubble text: `color: red or blue`, `age < 5`.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.condition {
            Condition::OneOf { allowed_values } => {
                write!(f, "{}: {}", self.key_name, join_values(allowed_values))
            }
            Condition::LessThan { threshold } | Condition::GreaterThan { threshold } => {
                write!(f, "{} {} {}", self.key_name, self.comparison().symbol(), threshold)
            }
        }
    }
}

/// Join allowed values with `" or "`, no separator after the last.
pub fn join_values<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(" or ")
}

// ---------------------------------------------------------------------------
// Query-string encoding
// ---------------------------------------------------------------------------

/// Encode a filter set into the compact `%`-separated form the transfer
/// statistics endpoint parses.
///
/// ```text
///  ,color%=red%=blue%,age%<5
///  │       │          │
///  │       │          └ threshold token: comparison symbol + value
///  │       └ one `=` token per allowed value
///  └ `,` opens an attribute
/// ```
///
/// Values are not escaped: a key or value containing `%`, or starting with
/// `,`, `=`, `<` or `>`, will be split differently by the parser. Threshold
/// predicates whose threshold is NaN are left out.
pub fn encode_filters(filters: &[Predicate]) -> String {
    let mut tokens: Vec<String> = Vec::new();
    for predicate in filters {
        if predicate.threshold_value().is_some_and(f64::is_nan) {
            continue;
        }
        tokens.push(format!(",{}", predicate.key_name()));
        match predicate.condition() {
            Condition::OneOf { allowed_values } => {
                tokens.extend(allowed_values.iter().map(|v| format!("={v}")));
            }
            Condition::LessThan { threshold } => tokens.push(format!("<{threshold}")),
            Condition::GreaterThan { threshold } => tokens.push(format!(">{threshold}")),
        }
    }
    tokens.join("%")
}
