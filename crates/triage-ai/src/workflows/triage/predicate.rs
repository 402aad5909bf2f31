use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::PatientAttributes;
use super::indicators::Indicator;

/// Closed vocabulary of scalar tests a rule may apply to its operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    LessThan { value: f64 },
    AtMost { value: f64 },
    GreaterThan { value: f64 },
    AtLeast { value: f64 },
    Equals { value: f64 },
    /// Inclusive on both ends.
    Between { min: f64, max: f64 },
    /// True at or beyond either bound.
    Outside { low: f64, high: f64 },
}

impl Predicate {
    pub fn test(&self, operand: f64) -> bool {
        match *self {
            Predicate::LessThan { value } => operand < value,
            Predicate::AtMost { value } => operand <= value,
            Predicate::GreaterThan { value } => operand > value,
            Predicate::AtLeast { value } => operand >= value,
            Predicate::Equals { value } => operand == value,
            Predicate::Between { min, max } => operand >= min && operand <= max,
            Predicate::Outside { low, high } => operand <= low || operand >= high,
        }
    }

    pub(crate) fn bounds(&self) -> Vec<f64> {
        match *self {
            Predicate::LessThan { value }
            | Predicate::AtMost { value }
            | Predicate::GreaterThan { value }
            | Predicate::AtLeast { value }
            | Predicate::Equals { value } => vec![value],
            Predicate::Between { min, max } => vec![min, max],
            Predicate::Outside { low, high } => vec![low, high],
        }
    }

    /// Structural problems that make the predicate meaningless.
    pub(crate) fn defect(&self) -> Option<String> {
        if self.bounds().iter().any(|bound| !bound.is_finite()) {
            return Some("threshold must be finite".to_string());
        }
        match *self {
            Predicate::Between { min, max } if min > max => {
                Some(format!("range lower bound {min} exceeds upper bound {max}"))
            }
            Predicate::Outside { low, high } if low >= high => {
                Some(format!("band lower bound {low} must be below {high}"))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::LessThan { value } => write!(f, "< {value}"),
            Predicate::AtMost { value } => write!(f, "<= {value}"),
            Predicate::GreaterThan { value } => write!(f, "> {value}"),
            Predicate::AtLeast { value } => write!(f, ">= {value}"),
            Predicate::Equals { value } => write!(f, "== {value}"),
            Predicate::Between { min, max } => write!(f, "in [{min}, {max}]"),
            Predicate::Outside { low, high } => write!(f, "<= {low} or >= {high}"),
        }
    }
}

/// What a rule's predicate is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum RuleKey {
    /// A single attribute's scalar value, defaulted when absent.
    Attribute(String),
    /// An indicator derived from the full attribute mapping.
    Composite(Indicator),
}

impl RuleKey {
    pub fn attribute(name: &str) -> Self {
        RuleKey::Attribute(name.to_string())
    }

    pub fn operand(&self, attributes: &PatientAttributes) -> f64 {
        match self {
            RuleKey::Attribute(name) => attributes.value_or_default(name),
            RuleKey::Composite(indicator) => indicator.evaluate(attributes),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKey::Attribute(name) => f.write_str(name),
            RuleKey::Composite(indicator) => f.write_str(indicator.label()),
        }
    }
}

pub fn less_than(value: f64) -> Predicate {
    Predicate::LessThan { value }
}

pub fn at_most(value: f64) -> Predicate {
    Predicate::AtMost { value }
}

pub fn greater_than(value: f64) -> Predicate {
    Predicate::GreaterThan { value }
}

pub fn at_least(value: f64) -> Predicate {
    Predicate::AtLeast { value }
}

pub fn equals(value: f64) -> Predicate {
    Predicate::Equals { value }
}

pub fn between(min: f64, max: f64) -> Predicate {
    Predicate::Between { min, max }
}

pub fn outside(low: f64, high: f64) -> Predicate {
    Predicate::Outside { low, high }
}
