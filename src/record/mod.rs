mod bill;
mod customer;
mod product;

pub use bill::{Bill, BillItem, BillStatus, PaymentMode};
pub use customer::Customer;
pub use product::Product;

use chrono::NaiveDateTime;
use std::fmt;

/// Identity shared by every record kind the engine filters and totals.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// Owning shop; sources only hand out records of the requested tenant.
    fn tenant_id(&self) -> &str;

    /// Local wall-clock time used for recency and date-range filtering.
    fn timestamp(&self) -> NaiveDateTime;

    fn is_deleted(&self) -> bool {
        false
    }

    /// Look up a field by name. Unknown names yield `None`.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// A dynamically typed field value, used by name-based filters.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Time(NaiveDateTime),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Time(value) => Some(*value),
            _ => None,
        }
    }

    /// Loose equality against user-typed text: numbers compare numerically,
    /// text and enum labels compare case-insensitively.
    pub fn matches_literal(&self, literal: &str) -> bool {
        let literal = literal.trim();
        match self {
            FieldValue::Text(value) => value.eq_ignore_ascii_case(literal),
            FieldValue::Number(value) => literal
                .parse::<f64>()
                .map(|rhs| (value - rhs).abs() < f64::EPSILON)
                .unwrap_or(false),
            FieldValue::Bool(value) => literal
                .parse::<bool>()
                .map(|rhs| *value == rhs)
                .unwrap_or(false),
            FieldValue::Time(value) => {
                if let Ok(date) = chrono::NaiveDate::parse_from_str(literal, "%Y-%m-%d") {
                    value.date() == date
                } else {
                    false
                }
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => write!(f, "{value}"),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Time(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::Time(value)
    }
}
