//! Dataset aggregation: grouped, reduced series for chart consumption.
//!
//! - **reduce**: the reduction operators (sum, count, average, min, max)
//! - **group**: group-by aggregation with ordering, rounding, and a skipped
//!   tally for non-numeric measures
//! - **period**: date bucketing into year/quarter/month labels with a
//!   configurable fiscal year start

pub mod error;
pub mod group;
pub mod period;
pub mod reduce;

pub use error::{AggregateError, Result};
pub use group::{AggregateOptions, LabelOrder, aggregate};
pub use period::{PeriodSpec, aggregate_by_period, derive_period_column, period_label};
pub use reduce::Reduction;
