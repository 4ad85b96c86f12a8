use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::record::Record;

type TestFn<T> = dyn Fn(&T) -> bool + Send + Sync;

/// Pulls a searchable string out of a record.
pub type TextField<T> = Arc<dyn for<'a> Fn(&'a T) -> Option<&'a str> + Send + Sync>;

/// Wrap a closure as a [`TextField`] for [`Predicate::text_contains`].
pub fn text_field<T, F>(extract: F) -> TextField<T>
where
    F: for<'a> Fn(&'a T) -> Option<&'a str> + Send + Sync + 'static,
{
    Arc::new(extract)
}

/// Comparison used by numeric threshold filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
            Comparison::Less => lhs < rhs,
            Comparison::LessOrEqual => lhs <= rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
        }
    }
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">" => Ok(Comparison::Greater),
            ">=" => Ok(Comparison::GreaterOrEqual),
            "<" => Ok(Comparison::Less),
            "<=" => Ok(Comparison::LessOrEqual),
            other => Err(format!("unknown comparison '{other}'")),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A pure, keyed boolean test over a record.
///
/// The key names the slot a predicate occupies in a
/// [`FilterSet`](super::FilterSet), so replacing the date filter leaves the
/// search filter alone. Bounds and queries are captured at construction;
/// `matches` never panics and never has side effects.
pub struct Predicate<T> {
    key: String,
    test: Arc<TestFn<T>>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").field("key", &self.key).finish()
    }
}

impl<T> Predicate<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Same test under a different key.
    pub fn keyed(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn matches(&self, record: &T) -> bool {
        (self.test)(record)
    }
}

impl<T: 'static> Predicate<T> {
    pub fn new<F>(key: impl Into<String>, test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            test: Arc::new(test),
        }
    }

    /// Matches every record.
    pub fn always() -> Self {
        Self::new("always", |_| true)
    }

    /// Case-insensitive substring search over one or more text fields.
    ///
    /// A query that is empty after trimming matches everything. Fields that
    /// are absent on a record never match.
    pub fn text_contains(fields: Vec<TextField<T>>, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Self::always().keyed("search");
        }
        Self::new("search", move |record| {
            fields.iter().any(|field| {
                field(record)
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
    }

    /// Inclusive calendar-day range. Either bound may be open.
    ///
    /// The record's time of day is ignored: anything on `end`'s date matches,
    /// up to the last instant of that day.
    pub fn date_range<F>(extract: F, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self
    where
        F: Fn(&T) -> Option<NaiveDateTime> + Send + Sync + 'static,
    {
        if start.is_none() && end.is_none() {
            return Self::always().keyed("date_range");
        }
        Self::new("date_range", move |record| {
            let Some(at) = extract(record) else {
                return false;
            };
            let day = at.date();
            start.map_or(true, |start| day >= start) && end.map_or(true, |end| day <= end)
        })
    }

    /// Categorical equality. `None` means "All" and matches everything.
    pub fn equals<V, F>(extract: F, value: Option<V>) -> Self
    where
        V: PartialEq + Send + Sync + 'static,
        F: Fn(&T) -> Option<V> + Send + Sync + 'static,
    {
        let Some(wanted) = value else {
            return Self::always().keyed("equals");
        };
        Self::new("equals", move |record| {
            extract(record).map_or(false, |actual| actual == wanted)
        })
    }

    pub fn threshold<F>(extract: F, op: Comparison, threshold: f64) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        Self::new("threshold", move |record| {
            extract(record).map_or(false, |value| op.holds(value, threshold))
        })
    }

    pub fn negate(self) -> Self {
        let key = format!("not:{}", self.key);
        let inner = self.test;
        Self::new(key, move |record: &T| !inner(record))
    }

    /// Conjunction; empty input matches everything.
    pub fn all_of(key: impl Into<String>, parts: Vec<Predicate<T>>) -> Self {
        Self::new(key, move |record| parts.iter().all(|p| p.matches(record)))
    }

    /// Disjunction; empty input matches nothing.
    pub fn any_of(key: impl Into<String>, parts: Vec<Predicate<T>>) -> Self {
        Self::new(key, move |record| parts.iter().any(|p| p.matches(record)))
    }
}

/// Name-based constructors for filters that are configured at runtime.
///
/// A field the record does not have makes the predicate a non-match rather
/// than an error.
impl<T: Record> Predicate<T> {
    pub fn field_equals(field: &str, literal: &str) -> Self {
        let field = field.to_string();
        let literal = literal.to_string();
        Self::new(format!("{field}="), move |record: &T| {
            lookup(record, &field).map_or(false, |value| value.matches_literal(&literal))
        })
    }

    /// Present and different. A missing field still does not match.
    pub fn field_not_equals(field: &str, literal: &str) -> Self {
        let field = field.to_string();
        let literal = literal.to_string();
        Self::new(format!("{field}!="), move |record: &T| {
            lookup(record, &field).map_or(false, |value| !value.matches_literal(&literal))
        })
    }

    pub fn field_contains(field: &str, query: &str) -> Self {
        let field = field.to_string();
        let needle = query.trim().to_lowercase();
        Self::new(format!("{field}~"), move |record: &T| {
            lookup(record, &field).map_or(false, |value| {
                value.to_string().to_lowercase().contains(&needle)
            })
        })
    }

    pub fn field_threshold(field: &str, op: Comparison, threshold: f64) -> Self {
        let field = field.to_string();
        Self::new(format!("{field}{op}"), move |record: &T| {
            lookup(record, &field)
                .and_then(|value| value.as_number())
                .map_or(false, |value| op.holds(value, threshold))
        })
    }
}

fn lookup<T: Record>(record: &T, field: &str) -> Option<crate::record::FieldValue> {
    let value = record.field(field);
    if value.is_none() {
        tracing::trace!(field, record = record.id(), "field not present; treating as non-match");
    }
    value
}
