pub mod aggregate;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod record;
pub mod source;
pub mod view;

pub use aggregate::{compute, AggregateResult, AggregateSpec, AggregateValue, AggregationEngine, Reducer};
pub use error::{FilterParseError, Result, SourceError, TallyError};
pub use filter::{parse_condition, text_field, Comparison, FilterSet, Predicate};
pub use record::{Bill, BillItem, BillStatus, Customer, FieldValue, PaymentMode, Product, Record};
pub use source::{HttpSource, JsonFileSource, MemorySource, RecordSource};
pub use view::{ReactiveView, RefreshOutcome, RefreshTicket, Snapshot, ViewError, ViewEvent, ViewState, ViewValue};
