//! Serialized chart specifications.
//!
//! A [`ChartSpec`] is the read-only hand-off to whatever renders the charts:
//! plain data, one aggregate series, a color per point. Rendering itself is
//! someone else's job.

use chartbook_model::AggregateSeries;

/// The chart families the dashboards render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    /// Bars plus an overlaid area/line.
    Composed,
}

/// Default color cycle assigned to series points.
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884d8", "#82ca9d",
];

/// One fully-derived chart, ready to serialize for the presentation layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub series: AggregateSeries,
    /// One color per series point, cycled from the default palette.
    pub colors: Vec<String>,
}

impl ChartSpec {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: ChartKind,
        series: AggregateSeries,
    ) -> Self {
        let colors = assign_colors(series.points.len());
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            series,
            colors,
        }
    }
}

fn assign_colors(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()].to_string())
        .collect()
}
