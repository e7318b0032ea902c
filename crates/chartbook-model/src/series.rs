/// One (label, value) point of an aggregate series.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A named, ordered sequence of grouped/reduced points, ready for charting.
///
/// Labels are unique within a series. `skipped` counts measure cells that
/// were excluded from a numeric reduction because they did not coerce to a
/// number.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AggregateSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
    pub skipped: usize,
}

impl AggregateSeries {
    pub fn new(name: impl Into<String>, points: Vec<SeriesPoint>, skipped: usize) -> Self {
        Self {
            name: name.into(),
            points,
            skipped,
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.label.as_str())
    }

    pub fn value(&self, label: &str) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.value)
    }
}
