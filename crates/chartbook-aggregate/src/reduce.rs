//! Reduction operators.

/// The function applied to each group's measure values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Sum,
    Count,
    Average,
    Min,
    Max,
}

impl Reduction {
    /// Whether the operator consumes numeric measure values. `Count` counts
    /// rows and never looks at the measure's validity.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Reduction::Count)
    }

    pub fn label(self) -> &'static str {
        match self {
            Reduction::Sum => "sum",
            Reduction::Count => "count",
            Reduction::Average => "average",
            Reduction::Min => "min",
            Reduction::Max => "max",
        }
    }

    /// Reduces one group. `row_count` is the number of rows in the group,
    /// `values` its numeric-coercible measure values. Returns `None` when the
    /// operator has no defined value for the group (mean/min/max of nothing).
    pub fn apply(self, row_count: usize, values: &[f64]) -> Option<f64> {
        match self {
            Reduction::Count => Some(row_count as f64),
            Reduction::Sum => Some(values.iter().sum()),
            Reduction::Average => {
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f64>() / values.len() as f64)
                }
            }
            Reduction::Min => values.iter().copied().reduce(f64::min),
            Reduction::Max => values.iter().copied().reduce(f64::max),
        }
    }
}

impl std::fmt::Display for Reduction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_over_values() {
        let values = [10.0, 20.0, 5.0];
        assert_eq!(Reduction::Sum.apply(3, &values), Some(35.0));
        assert_eq!(Reduction::Count.apply(3, &values), Some(3.0));
        assert_eq!(Reduction::Average.apply(3, &values), Some(35.0 / 3.0));
        assert_eq!(Reduction::Min.apply(3, &values), Some(5.0));
        assert_eq!(Reduction::Max.apply(3, &values), Some(20.0));
    }

    #[test]
    fn empty_groups() {
        assert_eq!(Reduction::Sum.apply(2, &[]), Some(0.0));
        assert_eq!(Reduction::Count.apply(2, &[]), Some(2.0));
        assert_eq!(Reduction::Average.apply(2, &[]), None);
        assert_eq!(Reduction::Min.apply(2, &[]), None);
        assert_eq!(Reduction::Max.apply(2, &[]), None);
    }

    #[test]
    fn serde_names_match_operators() {
        let json = serde_json::to_string(&Reduction::Average).unwrap();
        assert_eq!(json, "\"average\"");
    }
}
