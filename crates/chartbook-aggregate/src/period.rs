//! Period bucketing for trend series.
//!
//! Fiscal boundaries are configuration, not assumptions: quarter derivation
//! takes the fiscal year's starting month, so a company closing its year in
//! March labels 2025-05-01 as Q1 of fiscal 2025.

use chrono::{Datelike, NaiveDate};

use chartbook_model::{AggregateSeries, CellValue, ColumnType, Dataset};

use crate::error::{AggregateError, Result};
use crate::group::{AggregateOptions, aggregate_with_keys};

/// How to bucket a date column into period labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSpec {
    /// `2025`
    Year,
    /// `2025-10`
    Month,
    /// `Q4 2025`, quarters counted from `fiscal_start_month` (1 = calendar).
    Quarter { fiscal_start_month: u32 },
}

impl PeriodSpec {
    /// Calendar-year quarters.
    pub fn calendar_quarter() -> Self {
        Self::Quarter {
            fiscal_start_month: 1,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Quarter { .. } => "quarter",
        }
    }
}

/// Label for one date under a period spec.
pub fn period_label(date: NaiveDate, spec: &PeriodSpec) -> String {
    match spec {
        PeriodSpec::Year => format!("{}", date.year()),
        PeriodSpec::Month => format!("{}-{:02}", date.year(), date.month()),
        PeriodSpec::Quarter { fiscal_start_month } => {
            let start = (*fiscal_start_month).clamp(1, 12);
            let shift = (date.month() + 12 - start) % 12;
            let quarter = shift / 3 + 1;
            let fiscal_year = if date.month() >= start {
                date.year()
            } else {
                date.year() - 1
            };
            format!("Q{quarter} {fiscal_year}")
        }
    }
}

/// Derives one period label per dataset row from a date column.
///
/// Rows with a missing cell get the empty label; the column itself must be a
/// date column.
pub fn derive_period_column(
    dataset: &Dataset,
    date_column: &str,
    spec: &PeriodSpec,
) -> Result<Vec<String>> {
    let column = dataset
        .column(date_column)
        .ok_or_else(|| AggregateError::ColumnNotFound {
            column: date_column.to_string(),
        })?;
    if !matches!(column.ty, ColumnType::Date | ColumnType::Empty) {
        return Err(AggregateError::NotADateColumn {
            column: date_column.to_string(),
        });
    }
    let labels = dataset
        .rows()
        .iter()
        .map(|row| match row.cell(date_column) {
            CellValue::Date(date) => period_label(*date, spec),
            _ => String::new(),
        })
        .collect();
    Ok(labels)
}

/// Aggregates a measure grouped by derived period labels.
pub fn aggregate_by_period(
    dataset: &Dataset,
    date_column: &str,
    spec: &PeriodSpec,
    options: &AggregateOptions,
) -> Result<AggregateSeries> {
    let keys = derive_period_column(dataset, date_column, spec)?;
    let name = format!(
        "{} of {} by {}",
        options.reduction,
        options.measure,
        spec.describe()
    );
    aggregate_with_keys(dataset, &keys, &name, options)
}
