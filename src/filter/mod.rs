mod condition;
mod predicate;
mod set;

pub use condition::parse_condition;
pub use predicate::{text_field, Comparison, Predicate, TextField};
pub use set::FilterSet;
