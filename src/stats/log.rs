use crate::indicators::{gd, hypervolume, igd, spacing};
use ndarray::Array2;
use std::fmt;

/// One row of the run log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    /// Recorded generation number (1 = initial population).
    pub generation: usize,
    /// Evaluations consumed so far.
    pub evaluations: usize,
    pub values: LogValues,
}

/// Per-mode statistics of a log row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogValues {
    /// Indicators of the current non-dominated set. `gd`/`igd` need a
    /// reference front and `spacing` at least two points; otherwise `None`.
    Multi {
        gd: Option<f64>,
        igd: Option<f64>,
        hv: f64,
        spacing: Option<f64>,
    },
    /// Objective statistics over feasible individuals, in the problem's own
    /// direction. `best` is the best-ever feasible value. All `None` when no
    /// feasible individual exists yet.
    Single {
        best: Option<f64>,
        mean: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
        std: Option<f64>,
    },
}

impl LogValues {
    /// Indicators for a minimization-normalized front.
    pub fn multi(front: &Array2<f64>, reference: Option<&Array2<f64>>) -> Self {
        LogValues::Multi {
            gd: reference.and_then(|r| gd(front, r)),
            igd: reference.and_then(|r| igd(front, r)),
            hv: hypervolume(front, reference),
            spacing: spacing(front),
        }
    }

    /// Statistics over the objective values of feasible individuals.
    pub fn single(feasible: &[f64], best: Option<f64>) -> Self {
        if feasible.is_empty() {
            return LogValues::Single {
                best,
                mean: None,
                min: None,
                max: None,
                std: None,
            };
        }
        let n = feasible.len() as f64;
        let mean = feasible.iter().sum::<f64>() / n;
        let var = feasible.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        LogValues::Single {
            best,
            mean: Some(mean),
            min: Some(feasible.iter().copied().fold(f64::INFINITY, f64::min)),
            max: Some(feasible.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            std: Some(var.sqrt()),
        }
    }
}

fn cell(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |x| format!("{x:.5e}"))
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen {:>5} | evals {:>8}", self.generation, self.evaluations)?;
        match &self.values {
            LogValues::Multi {
                gd,
                igd,
                hv,
                spacing,
            } => write!(
                f,
                " | gd {} | igd {} | hv {:.5e} | spacing {}",
                cell(*gd),
                cell(*igd),
                hv,
                cell(*spacing)
            ),
            LogValues::Single {
                best,
                mean,
                min,
                max,
                std,
            } => write!(
                f,
                " | best {} | mean {} | min {} | max {} | std {}",
                cell(*best),
                cell(*mean),
                cell(*min),
                cell(*max),
                cell(*std)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_single_stats() {
        let values = LogValues::single(&[1.0, 3.0], Some(0.5));
        assert_eq!(
            values,
            LogValues::Single {
                best: Some(0.5),
                mean: Some(2.0),
                min: Some(1.0),
                max: Some(3.0),
                std: Some(1.0),
            }
        );
    }

    #[test]
    fn test_single_no_feasible() {
        let values = LogValues::single(&[], None);
        assert!(matches!(values, LogValues::Single { mean: None, .. }));
    }

    #[test]
    fn test_multi_without_reference() {
        let values = LogValues::multi(&array![[0.0, 1.0], [1.0, 0.0]], None);
        match values {
            LogValues::Multi { gd, igd, hv, spacing } => {
                assert!(gd.is_none() && igd.is_none());
                assert!(hv > 0.0);
                assert!(spacing.is_some());
            }
            LogValues::Single { .. } => panic!("expected multi-objective values"),
        }
    }

    #[test]
    fn test_display() {
        let entry = LogEntry {
            generation: 3,
            evaluations: 60,
            values: LogValues::single(&[2.0], Some(2.0)),
        };
        let line = entry.to_string();
        assert!(line.starts_with("gen     3 | evals       60"));
        assert!(line.contains("best 2.00000e0"));
    }
}
