//! Dashboard configuration.
//!
//! One parameterized configuration drives every dashboard variant: each
//! [`ChartDef`] names a chart kind and the data mapping (group-by column or
//! period bucketing, measure, reduction). Variants are data, not copies of
//! component code.

use thiserror::Error;
use tracing::debug;

use chartbook_aggregate::{
    AggregateError, AggregateOptions, LabelOrder, PeriodSpec, Reduction, aggregate,
    aggregate_by_period,
};
use chartbook_model::Dataset;

use crate::spec::{ChartKind, ChartSpec};

/// Errors from building charts out of a dataset.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Aggregation failed for the named chart.
    #[error("chart '{id}': {source}")]
    Aggregate {
        id: String,
        #[source]
        source: AggregateError,
    },

    /// The chart definition itself is inconsistent.
    #[error("chart '{id}': {reason}")]
    InvalidDef { id: String, reason: String },
}

/// Result type for chart building.
pub type Result<T> = std::result::Result<T, ChartError>;

/// Bucket a date column into period labels instead of grouping on raw values.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PeriodBucket {
    pub date_column: String,
    pub spec: PeriodSpec,
}

/// Declarative description of one chart.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartDef {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    /// Column whose values label the series. Exactly one of `group_by` and
    /// `period` must be set.
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub period: Option<PeriodBucket>,
    pub measure: String,
    pub reduction: Reduction,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub order: LabelOrder,
}

/// An ordered set of chart definitions: the whole dashboard as data.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct DashboardConfig {
    pub charts: Vec<ChartDef>,
}

/// Builds one chart from a dataset.
pub fn build_chart(dataset: &Dataset, def: &ChartDef) -> Result<ChartSpec> {
    let series = match (&def.group_by, &def.period) {
        (Some(group_by), None) => {
            let mut options = AggregateOptions::new(group_by, &def.measure, def.reduction);
            options.precision = def.precision;
            options.order = def.order;
            aggregate(dataset, &options)
        }
        (None, Some(bucket)) => {
            let mut options =
                AggregateOptions::new(&bucket.date_column, &def.measure, def.reduction);
            options.precision = def.precision;
            options.order = def.order;
            aggregate_by_period(dataset, &bucket.date_column, &bucket.spec, &options)
        }
        (Some(_), Some(_)) => {
            return Err(ChartError::InvalidDef {
                id: def.id.clone(),
                reason: "group_by and period are mutually exclusive".to_string(),
            });
        }
        (None, None) => {
            return Err(ChartError::InvalidDef {
                id: def.id.clone(),
                reason: "one of group_by or period is required".to_string(),
            });
        }
    }
    .map_err(|source| ChartError::Aggregate {
        id: def.id.clone(),
        source,
    })?;
    debug!(chart = %def.id, points = series.points.len(), "chart built");
    Ok(ChartSpec::new(&def.id, &def.title, def.kind, series))
}

/// Builds every chart in the configuration, in configuration order.
pub fn build_dashboard(dataset: &Dataset, config: &DashboardConfig) -> Result<Vec<ChartSpec>> {
    config
        .charts
        .iter()
        .map(|def| build_chart(dataset, def))
        .collect()
}
