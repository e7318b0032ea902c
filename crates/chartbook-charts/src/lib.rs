//! Chart configuration building.
//!
//! Maps datasets and aggregate series into declarative, serializable chart
//! specifications. The rendering layer consumes [`ChartSpec`] values as
//! read-only JSON; nothing here draws anything.

pub mod config;
pub mod spec;

pub use config::{ChartDef, ChartError, DashboardConfig, PeriodBucket, build_chart, build_dashboard};
pub use spec::{ChartKind, ChartSpec, DEFAULT_PALETTE};
