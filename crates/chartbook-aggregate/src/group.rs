//! Group-by aggregation over a dataset.

use std::collections::HashMap;

use tracing::debug;

use chartbook_model::{AggregateSeries, Dataset, SeriesPoint};

use crate::error::{AggregateError, Result};
use crate::reduce::Reduction;

/// Ordering of series labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelOrder {
    /// Order in which each label first appears in the dataset.
    #[default]
    FirstSeen,
    /// Lexicographic by label.
    ByLabel,
}

/// Parameters for one aggregation call.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Column whose values become the series labels.
    pub group_by: String,
    /// Column reduced per group.
    pub measure: String,
    pub reduction: Reduction,
    /// Decimal places to round values to; `None` leaves values unrounded.
    pub precision: Option<u32>,
    pub order: LabelOrder,
}

impl AggregateOptions {
    pub fn new(
        group_by: impl Into<String>,
        measure: impl Into<String>,
        reduction: Reduction,
    ) -> Self {
        Self {
            group_by: group_by.into(),
            measure: measure.into(),
            reduction,
            precision: None,
            order: LabelOrder::default(),
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_order(mut self, order: LabelOrder) -> Self {
        self.order = order;
        self
    }
}

/// Reduces a dataset into one aggregate series.
///
/// Rows whose group-by cell is missing group under the empty label; they are
/// rows and `count` must see them. Measure cells that do not coerce to a
/// number are excluded from numeric reductions and tallied as skipped.
pub fn aggregate(dataset: &Dataset, options: &AggregateOptions) -> Result<AggregateSeries> {
    if !dataset.has_column(&options.group_by) {
        return Err(AggregateError::ColumnNotFound {
            column: options.group_by.clone(),
        });
    }
    let keys: Vec<String> = dataset
        .rows()
        .iter()
        .map(|row| row.cell(&options.group_by).to_label())
        .collect();
    let name = format!(
        "{} of {} by {}",
        options.reduction, options.measure, options.group_by
    );
    aggregate_with_keys(dataset, &keys, &name, options)
}

/// Shared core: reduces the measure column grouped by precomputed row keys.
///
/// `keys` must hold one label per dataset row. Used by [`aggregate`] and by
/// period bucketing, which derives its keys from a date column.
pub(crate) fn aggregate_with_keys(
    dataset: &Dataset,
    keys: &[String],
    name: &str,
    options: &AggregateOptions,
) -> Result<AggregateSeries> {
    if !dataset.has_column(&options.measure) {
        return Err(AggregateError::ColumnNotFound {
            column: options.measure.clone(),
        });
    }

    #[derive(Default)]
    struct Group {
        rows: usize,
        values: Vec<f64>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group> = HashMap::new();
    let mut skipped = 0usize;

    for (row, key) in dataset.rows().iter().zip(keys) {
        if !groups.contains_key(key) {
            order.push(key.clone());
        }
        let group = groups.entry(key.clone()).or_default();
        group.rows += 1;
        if options.reduction.is_numeric() {
            match row.cell(&options.measure).to_f64() {
                Some(value) => group.values.push(value),
                None => skipped += 1,
            }
        }
    }

    if options.order == LabelOrder::ByLabel {
        order.sort();
    }

    let mut points = Vec::with_capacity(order.len());
    for label in order {
        let group = &groups[&label];
        if let Some(value) = options.reduction.apply(group.rows, &group.values) {
            points.push(SeriesPoint::new(label, round_to(value, options.precision)));
        }
    }

    debug!(
        series = %name,
        groups = points.len(),
        skipped,
        "aggregate series built"
    );
    Ok(AggregateSeries::new(name, points, skipped))
}

/// Rounds to `precision` decimal places; `None` passes the value through.
fn round_to(value: f64, precision: Option<u32>) -> f64 {
    match precision {
        Some(p) => {
            let factor = 10f64.powi(p as i32);
            (value * factor).round() / factor
        }
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chartbook_model::{CellValue, Column, ColumnType, RowRecord};

    fn row(pairs: &[(&str, CellValue)]) -> RowRecord {
        let mut cells = BTreeMap::new();
        for (name, value) in pairs {
            cells.insert((*name).to_string(), value.clone());
        }
        RowRecord::new(cells)
    }

    fn sales_dataset() -> Dataset {
        Dataset::new(
            "Sheet1",
            "fp",
            vec![
                Column::new("region", ColumnType::Text),
                Column::new("sales", ColumnType::Mixed),
            ],
            vec![
                row(&[
                    ("region", CellValue::Text("East".into())),
                    ("sales", CellValue::Number(10.0)),
                ]),
                row(&[
                    ("region", CellValue::Text("West".into())),
                    ("sales", CellValue::Number(20.0)),
                ]),
                row(&[
                    ("region", CellValue::Text("East".into())),
                    ("sales", CellValue::Number(5.0)),
                ]),
                row(&[
                    ("region", CellValue::Text("West".into())),
                    ("sales", CellValue::Text("n/a".into())),
                ]),
            ],
        )
    }

    #[test]
    fn sum_by_region() {
        let series = aggregate(
            &sales_dataset(),
            &AggregateOptions::new("region", "sales", Reduction::Sum),
        )
        .unwrap();
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0], SeriesPoint::new("East", 15.0));
        assert_eq!(series.points[1], SeriesPoint::new("West", 20.0));
        assert_eq!(series.skipped, 1);
    }

    #[test]
    fn count_ignores_measure_validity() {
        let series = aggregate(
            &sales_dataset(),
            &AggregateOptions::new("region", "sales", Reduction::Count),
        )
        .unwrap();
        assert_eq!(series.value("East"), Some(2.0));
        assert_eq!(series.value("West"), Some(2.0));
        assert_eq!(series.skipped, 0);
    }

    #[test]
    fn average_drops_groups_without_numbers() {
        let ds = Dataset::new(
            "Sheet1",
            "fp",
            vec![
                Column::new("region", ColumnType::Text),
                Column::new("sales", ColumnType::Mixed),
            ],
            vec![
                row(&[
                    ("region", CellValue::Text("East".into())),
                    ("sales", CellValue::Number(10.0)),
                ]),
                row(&[
                    ("region", CellValue::Text("West".into())),
                    ("sales", CellValue::Text("n/a".into())),
                ]),
            ],
        );
        let series = aggregate(&ds, &AggregateOptions::new("region", "sales", Reduction::Average))
            .unwrap();
        assert_eq!(series.points, vec![SeriesPoint::new("East", 10.0)]);
        assert_eq!(series.skipped, 1);

        // Sum keeps the group at zero.
        let series = aggregate(&ds, &AggregateOptions::new("region", "sales", Reduction::Sum))
            .unwrap();
        assert_eq!(series.value("West"), Some(0.0));
    }

    #[test]
    fn missing_group_key_becomes_empty_label() {
        let ds = Dataset::new(
            "Sheet1",
            "fp",
            vec![
                Column::new("region", ColumnType::Text),
                Column::new("sales", ColumnType::Number),
            ],
            vec![
                row(&[("region", CellValue::Missing), ("sales", CellValue::Number(7.0))]),
                row(&[
                    ("region", CellValue::Text("East".into())),
                    ("sales", CellValue::Number(1.0)),
                ]),
            ],
        );
        let series =
            aggregate(&ds, &AggregateOptions::new("region", "sales", Reduction::Sum)).unwrap();
        assert_eq!(series.value(""), Some(7.0));
    }

    #[test]
    fn missing_columns_fail() {
        let ds = sales_dataset();
        let err = aggregate(&ds, &AggregateOptions::new("region", "profit", Reduction::Sum))
            .unwrap_err();
        assert!(matches!(err, AggregateError::ColumnNotFound { column } if column == "profit"));

        let err = aggregate(&ds, &AggregateOptions::new("territory", "sales", Reduction::Sum))
            .unwrap_err();
        assert!(matches!(err, AggregateError::ColumnNotFound { column } if column == "territory"));
    }

    #[test]
    fn precision_rounds_values() {
        let ds = Dataset::new(
            "Sheet1",
            "fp",
            vec![
                Column::new("k", ColumnType::Text),
                Column::new("v", ColumnType::Number),
            ],
            vec![
                row(&[("k", CellValue::Text("a".into())), ("v", CellValue::Number(1.0))]),
                row(&[("k", CellValue::Text("a".into())), ("v", CellValue::Number(2.0))]),
                row(&[("k", CellValue::Text("a".into())), ("v", CellValue::Number(2.0))]),
            ],
        );
        let series = aggregate(
            &ds,
            &AggregateOptions::new("k", "v", Reduction::Average).with_precision(2),
        )
        .unwrap();
        assert_eq!(series.value("a"), Some(1.67));
    }

    #[test]
    fn label_ordering_modes() {
        let series = aggregate(
            &sales_dataset(),
            &AggregateOptions::new("region", "sales", Reduction::Sum)
                .with_order(LabelOrder::ByLabel),
        )
        .unwrap();
        let labels: Vec<&str> = series.labels().collect();
        assert_eq!(labels, vec!["East", "West"]);

        // First-seen keeps dataset order even when it differs from sorted.
        let ds = Dataset::new(
            "Sheet1",
            "fp",
            vec![
                Column::new("k", ColumnType::Text),
                Column::new("v", ColumnType::Number),
            ],
            vec![
                row(&[("k", CellValue::Text("z".into())), ("v", CellValue::Number(1.0))]),
                row(&[("k", CellValue::Text("a".into())), ("v", CellValue::Number(1.0))]),
            ],
        );
        let series =
            aggregate(&ds, &AggregateOptions::new("k", "v", Reduction::Sum)).unwrap();
        let labels: Vec<&str> = series.labels().collect();
        assert_eq!(labels, vec!["z", "a"]);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let ds = sales_dataset();
        let options = AggregateOptions::new("region", "sales", Reduction::Sum);
        let a = aggregate(&ds, &options).unwrap();
        let b = aggregate(&ds, &options).unwrap();
        assert_eq!(a, b);
    }
}
