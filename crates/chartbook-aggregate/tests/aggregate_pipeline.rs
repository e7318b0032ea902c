//! Ingestion-to-aggregation pipeline tests, plus property checks.

use proptest::prelude::*;

use chartbook_aggregate::{
    AggregateError, AggregateOptions, LabelOrder, PeriodSpec, Reduction, aggregate,
    aggregate_by_period,
};
use chartbook_ingest::{IngestOptions, ingest_csv};
use chartbook_model::SeriesPoint;

#[test]
fn sum_scenario_from_uploaded_csv() {
    let ds = ingest_csv(
        b"region,sales\nEast,10\nWest,20\nEast,5\n",
        &IngestOptions::default(),
    )
    .unwrap();
    let series = aggregate(&ds, &AggregateOptions::new("region", "sales", Reduction::Sum))
        .unwrap();
    assert_eq!(
        series.points,
        vec![SeriesPoint::new("East", 15.0), SeriesPoint::new("West", 20.0)]
    );
    assert_eq!(series.skipped, 0);
}

#[test]
fn missing_measure_column_fails() {
    let ds = ingest_csv(b"region,sales\nEast,10\n", &IngestOptions::default()).unwrap();
    let err = aggregate(&ds, &AggregateOptions::new("region", "profit", Reduction::Sum))
        .unwrap_err();
    assert!(matches!(err, AggregateError::ColumnNotFound { column } if column == "profit"));
}

#[test]
fn count_sees_every_row_of_the_group() {
    let ds = ingest_csv(
        b"region,sales\nEast,10\nEast,n/a\nWest,20\n",
        &IngestOptions::default(),
    )
    .unwrap();
    let series = aggregate(
        &ds,
        &AggregateOptions::new("region", "sales", Reduction::Count),
    )
    .unwrap();
    assert_eq!(series.value("East"), Some(2.0));
    assert_eq!(series.value("West"), Some(1.0));
}

#[test]
fn quarterly_trend_from_csv_dates() {
    let ds = ingest_csv(
        b"date,sales\n2025-10-05,10\n2025-11-20,20\n2026-01-02,5\n",
        &IngestOptions::default(),
    )
    .unwrap();
    let series = aggregate_by_period(
        &ds,
        "date",
        &PeriodSpec::calendar_quarter(),
        &AggregateOptions::new("date", "sales", Reduction::Sum),
    )
    .unwrap();
    assert_eq!(
        series.points,
        vec![
            SeriesPoint::new("Q4 2025", 30.0),
            SeriesPoint::new("Q1 2026", 5.0),
        ]
    );
}

/// Rows as (group index, value); keeps groups drawn from a small pool so
/// collisions actually happen.
fn rows_strategy() -> impl Strategy<Value = Vec<(u8, i32)>> {
    prop::collection::vec((0u8..5, -1000i32..1000), 1..50)
}

proptest! {
    #[test]
    fn sum_matches_manual_grouping(rows in rows_strategy()) {
        let mut csv = String::from("group,value\n");
        for (g, v) in &rows {
            csv.push_str(&format!("g{g},{v}\n"));
        }
        let ds = ingest_csv(csv.as_bytes(), &IngestOptions::default()).unwrap();
        let series = aggregate(
            &ds,
            &AggregateOptions::new("group", "value", Reduction::Sum)
                .with_order(LabelOrder::ByLabel),
        )
        .unwrap();

        for point in &series.points {
            let expected: i64 = rows
                .iter()
                .filter(|(g, _)| format!("g{g}") == point.label)
                .map(|(_, v)| i64::from(*v))
                .sum();
            prop_assert_eq!(point.value, expected as f64);
        }

        // Every distinct group appears exactly once.
        let mut labels: Vec<String> = rows.iter().map(|(g, _)| format!("g{g}")).collect();
        labels.sort();
        labels.dedup();
        let got: Vec<String> = series.labels().map(str::to_string).collect();
        prop_assert_eq!(got, labels);
    }

    #[test]
    fn aggregation_is_idempotent(rows in rows_strategy()) {
        let mut csv = String::from("group,value\n");
        for (g, v) in &rows {
            csv.push_str(&format!("g{g},{v}\n"));
        }
        let ds = ingest_csv(csv.as_bytes(), &IngestOptions::default()).unwrap();
        let options = AggregateOptions::new("group", "value", Reduction::Average);
        let a = aggregate(&ds, &options).unwrap();
        let b = aggregate(&ds, &options).unwrap();
        prop_assert_eq!(a, b);
    }
}
