mod presets;

pub use presets::{bill_metrics, customer_metrics, stock_metrics, metric};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::filter::Predicate;

type AmountFn<T> = Arc<dyn Fn(&T) -> Option<f64> + Send + Sync>;
type CategoryFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;
type BreakdownFn<T> = Arc<dyn Fn(&T) -> Vec<(String, f64)> + Send + Sync>;

/// How a spec folds its narrowed records into a value.
///
/// Amount extractors returning `None` contribute nothing. Every reducer
/// yields `0` (or no groups) for empty input.
pub enum Reducer<T> {
    Sum(AmountFn<T>),
    Count,
    Average(AmountFn<T>),
    Min(AmountFn<T>),
    Max(AmountFn<T>),
    /// Per-category totals of one amount per record.
    GroupSum {
        category: CategoryFn<T>,
        amount: AmountFn<T>,
    },
    /// Per-category totals where one record carries several lines.
    Breakdown(BreakdownFn<T>),
}

impl<T> Clone for Reducer<T> {
    fn clone(&self) -> Self {
        match self {
            Reducer::Sum(f) => Reducer::Sum(Arc::clone(f)),
            Reducer::Count => Reducer::Count,
            Reducer::Average(f) => Reducer::Average(Arc::clone(f)),
            Reducer::Min(f) => Reducer::Min(Arc::clone(f)),
            Reducer::Max(f) => Reducer::Max(Arc::clone(f)),
            Reducer::GroupSum { category, amount } => Reducer::GroupSum {
                category: Arc::clone(category),
                amount: Arc::clone(amount),
            },
            Reducer::Breakdown(f) => Reducer::Breakdown(Arc::clone(f)),
        }
    }
}

impl<T> Reducer<T> {
    fn name(&self) -> &'static str {
        match self {
            Reducer::Sum(_) => "sum",
            Reducer::Count => "count",
            Reducer::Average(_) => "average",
            Reducer::Min(_) => "min",
            Reducer::Max(_) => "max",
            Reducer::GroupSum { .. } => "group_sum",
            Reducer::Breakdown(_) => "breakdown",
        }
    }
}

/// A named reduction with an optional guard restricting which records count.
pub struct AggregateSpec<T> {
    key: String,
    guard: Option<Predicate<T>>,
    reducer: Reducer<T>,
}

impl<T> Clone for AggregateSpec<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            guard: self.guard.clone(),
            reducer: self.reducer.clone(),
        }
    }
}

impl<T> fmt::Debug for AggregateSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateSpec")
            .field("key", &self.key)
            .field("reducer", &self.reducer.name())
            .field("guard", &self.guard.as_ref().map(Predicate::key))
            .finish()
    }
}

impl<T: 'static> AggregateSpec<T> {
    pub fn new(key: impl Into<String>, reducer: Reducer<T>) -> Self {
        Self {
            key: key.into(),
            guard: None,
            reducer,
        }
    }

    pub fn sum<F>(key: impl Into<String>, amount: F) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        Self::new(key, Reducer::Sum(Arc::new(amount)))
    }

    pub fn count(key: impl Into<String>) -> Self {
        Self::new(key, Reducer::Count)
    }

    pub fn average<F>(key: impl Into<String>, amount: F) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        Self::new(key, Reducer::Average(Arc::new(amount)))
    }

    pub fn min<F>(key: impl Into<String>, amount: F) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        Self::new(key, Reducer::Min(Arc::new(amount)))
    }

    pub fn max<F>(key: impl Into<String>, amount: F) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        Self::new(key, Reducer::Max(Arc::new(amount)))
    }

    pub fn group_sum<C, F>(key: impl Into<String>, category: C, amount: F) -> Self
    where
        C: Fn(&T) -> Option<String> + Send + Sync + 'static,
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        Self::new(
            key,
            Reducer::GroupSum {
                category: Arc::new(category),
                amount: Arc::new(amount),
            },
        )
    }

    pub fn breakdown<F>(key: impl Into<String>, lines: F) -> Self
    where
        F: Fn(&T) -> Vec<(String, f64)> + Send + Sync + 'static,
    {
        Self::new(key, Reducer::Breakdown(Arc::new(lines)))
    }

    /// Only records matching `guard` contribute.
    pub fn guarded(mut self, guard: Predicate<T>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn admits(&self, record: &T) -> bool {
        self.guard.as_ref().map_or(true, |guard| guard.matches(record))
    }

    /// Fold `records` in sequence order, one pass.
    pub fn reduce(&self, records: &[T]) -> AggregateValue {
        let narrowed = records.iter().filter(|record| self.admits(record));
        match &self.reducer {
            Reducer::Sum(amount) => {
                AggregateValue::Number(narrowed.filter_map(|r| amount(r)).fold(0.0, |acc, v| acc + v))
            }
            Reducer::Count => AggregateValue::Number(narrowed.count() as f64),
            Reducer::Average(amount) => {
                let (total, n) = narrowed
                    .filter_map(|r| amount(r))
                    .fold((0.0, 0usize), |(acc, n), v| (acc + v, n + 1));
                AggregateValue::Number(if n == 0 { 0.0 } else { total / n as f64 })
            }
            Reducer::Min(amount) => AggregateValue::Number(
                narrowed
                    .filter_map(|r| amount(r))
                    .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))))
                    .unwrap_or(0.0),
            ),
            Reducer::Max(amount) => AggregateValue::Number(
                narrowed
                    .filter_map(|r| amount(r))
                    .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
                    .unwrap_or(0.0),
            ),
            Reducer::GroupSum { category, amount } => {
                let mut groups = BTreeMap::new();
                for record in narrowed {
                    if let (Some(name), Some(value)) = (category(record), amount(record)) {
                        *groups.entry(name).or_insert(0.0) += value;
                    }
                }
                AggregateValue::Groups(groups)
            }
            Reducer::Breakdown(lines) => {
                let mut groups = BTreeMap::new();
                for record in narrowed {
                    for (name, value) in lines(record) {
                        *groups.entry(name).or_insert(0.0) += value;
                    }
                }
                AggregateValue::Groups(groups)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateValue {
    Number(f64),
    Groups(BTreeMap<String, f64>),
}

/// Values keyed by spec key. Always rebuilt in full.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    values: BTreeMap<String, AggregateValue>,
}

impl AggregateResult {
    pub fn get(&self, key: &str) -> Option<&AggregateValue> {
        self.values.get(key)
    }

    /// Scalar value for `key`, or `None` if absent or grouped.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            AggregateValue::Number(value) => Some(*value),
            AggregateValue::Groups(_) => None,
        }
    }

    pub fn groups(&self, key: &str) -> Option<&BTreeMap<String, f64>> {
        match self.values.get(key)? {
            AggregateValue::Groups(groups) => Some(groups),
            AggregateValue::Number(_) => None,
        }
    }

    /// The `n` largest groups, ties broken by name.
    pub fn top(&self, key: &str, n: usize) -> Vec<(String, f64)> {
        let Some(groups) = self.groups(key) else {
            return Vec::new();
        };
        let mut ranked: Vec<(String, f64)> =
            groups.iter().map(|(name, value)| (name.clone(), *value)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Run every spec over `records`. Pure: same input, same output.
pub fn compute<T: 'static>(records: &[T], specs: &[AggregateSpec<T>]) -> AggregateResult {
    let values = specs
        .iter()
        .map(|spec| (spec.key.clone(), spec.reduce(records)))
        .collect();
    AggregateResult { values }
}

/// The registered specs of one screen.
pub struct AggregationEngine<T> {
    specs: Vec<AggregateSpec<T>>,
}

impl<T> Clone for AggregationEngine<T> {
    fn clone(&self) -> Self {
        Self {
            specs: self.specs.clone(),
        }
    }
}

impl<T> Default for AggregationEngine<T> {
    fn default() -> Self {
        Self { specs: Vec::new() }
    }
}

impl<T> fmt::Debug for AggregationEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.specs.iter()).finish()
    }
}

impl<T: 'static> AggregationEngine<T> {
    pub fn new(specs: Vec<AggregateSpec<T>>) -> Self {
        Self { specs }
    }

    /// Register a spec. A later spec with the same key wins.
    pub fn register(&mut self, spec: AggregateSpec<T>) {
        self.specs.retain(|existing| existing.key != spec.key);
        self.specs.push(spec);
    }

    pub fn specs(&self) -> &[AggregateSpec<T>] {
        &self.specs
    }

    pub fn compute(&self, records: &[T]) -> AggregateResult {
        compute(records, &self.specs)
    }
}

impl<T: 'static> FromIterator<AggregateSpec<T>> for AggregationEngine<T> {
    fn from_iter<I: IntoIterator<Item = AggregateSpec<T>>>(iter: I) -> Self {
        let mut engine = Self::default();
        for spec in iter {
            engine.register(spec);
        }
        engine
    }
}
