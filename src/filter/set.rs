use std::collections::HashMap;
use std::fmt;

use super::Predicate;

/// Keyed conjunction of predicates.
///
/// An empty set matches every record. Predicates live in a vector that a
/// key index points into, so `set` and `clear` are constant time and
/// evaluation order only changes when the set does.
pub struct FilterSet<T> {
    entries: Vec<Predicate<T>>,
    index: HashMap<String, usize>,
}

impl<T> Clone for FilterSet<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            index: self.index.clone(),
        }
    }
}

impl<T> Default for FilterSet<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> fmt::Debug for FilterSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.sorted_keys()).finish()
    }
}

impl<T> FilterSet<T> {
    fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.index.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl<T: 'static> FilterSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `predicate` under `key`, replacing whatever was there.
    pub fn set(&mut self, key: impl Into<String>, predicate: Predicate<T>) {
        let key = key.into();
        let predicate = predicate.keyed(key.clone());
        self.store(key, predicate);
    }

    /// Store `predicate` under its own key.
    pub fn insert(&mut self, predicate: Predicate<T>) {
        self.store(predicate.key().to_string(), predicate);
    }

    fn store(&mut self, key: String, predicate: Predicate<T>) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot] = predicate,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(predicate);
            }
        }
    }

    /// Remove the filter under `key`. Returns whether one was present.
    pub fn clear(&mut self, key: &str) -> bool {
        let Some(slot) = self.index.remove(key) else {
            return false;
        };
        self.entries.swap_remove(slot);
        // the last entry moved into the freed slot
        if let Some(moved) = self.entries.get(slot) {
            self.index.insert(moved.key().to_string(), slot);
        }
        true
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Copy of this set with `key` replaced.
    pub fn with(&self, key: impl Into<String>, predicate: Predicate<T>) -> Self {
        let mut next = self.clone();
        next.set(key, predicate);
        next
    }

    /// Copy of this set with `key` removed.
    pub fn without(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.clear(key);
        next
    }

    pub fn get(&self, key: &str) -> Option<&Predicate<T>> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Filter keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sorted_keys().into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every predicate matches. Stops at the first failure.
    pub fn matches(&self, record: &T) -> bool {
        self.entries.iter().all(|predicate| predicate.matches(record))
    }

    /// Borrow the matching records, in input order.
    pub fn select<'a>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

impl<T: Clone + 'static> FilterSet<T> {
    /// The matching records, in input order. The input is left untouched.
    pub fn apply(&self, records: &[T]) -> Vec<T> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Comparison;

    fn at_least(min: i32) -> Predicate<i32> {
        Predicate::threshold(|n: &i32| Some(f64::from(*n)), Comparison::GreaterOrEqual, f64::from(min))
    }

    #[test]
    fn set_replaces_same_key_only() {
        let mut filters = FilterSet::new();
        filters.set("min", at_least(3));
        filters.set("even", Predicate::new("even", |n: &i32| n % 2 == 0));
        filters.set("min", at_least(5));

        assert_eq!(filters.len(), 2);
        assert_eq!(filters.apply(&[2, 4, 6, 8]), vec![6, 8]);
        assert_eq!(filters.get("min").map(Predicate::key), Some("min"));
    }

    #[test]
    fn clear_restores_identity() {
        let mut filters = FilterSet::new();
        filters.set("min", at_least(100));
        assert!(filters.clear("min"));
        assert!(!filters.clear("min"));
        assert_eq!(filters.apply(&[1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn with_leaves_original_untouched() {
        let base = FilterSet::new();
        let narrowed = base.with("min", at_least(2));
        assert!(base.is_empty());
        assert_eq!(narrowed.keys().collect::<Vec<_>>(), vec!["min"]);
        assert!(narrowed.without("min").is_empty());
    }

    #[test]
    fn clearing_a_middle_key_keeps_the_rest_reachable() {
        let mut filters = FilterSet::new();
        filters.set("min", at_least(2));
        filters.set("even", Predicate::new("even", |n: &i32| n % 2 == 0));
        filters.set("small", Predicate::new("small", |n: &i32| *n < 10));

        assert!(filters.clear("min"));
        assert_eq!(filters.keys().collect::<Vec<_>>(), vec!["even", "small"]);
        assert_eq!(filters.get("small").map(Predicate::key), Some("small"));

        filters.set("small", Predicate::new("small", |n: &i32| *n < 5));
        assert_eq!(filters.len(), 2);
        assert_eq!(filters.apply(&[0, 1, 4, 6, 12]), vec![0, 4]);
        assert_eq!(format!("{filters:?}"), r#"{"even", "small"}"#);
    }
}
