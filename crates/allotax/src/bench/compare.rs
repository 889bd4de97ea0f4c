//! Run-to-run comparisons with a fixed regression policy.

use crate::bench::history::History;
use crate::bench::model::{RunRecord, round_to};
use std::fmt;

/// Changes smaller than this (in percent, either direction) are noise.
pub const NEUTRAL_BAND_PCT: f64 = 1.0;
/// Changes beyond this (in percent) are flagged outright.
pub const SIGNIFICANT_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Neutral,
    Regression,
    Improvement,
    MinorRegression,
    MinorImprovement,
}

impl Classification {
    pub fn from_change(change_pct: f64) -> Self {
        if change_pct.abs() < NEUTRAL_BAND_PCT {
            Self::Neutral
        } else if change_pct > SIGNIFICANT_PCT {
            Self::Regression
        } else if change_pct < -SIGNIFICANT_PCT {
            Self::Improvement
        } else if change_pct > 0.0 {
            Self::MinorRegression
        } else {
            Self::MinorImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Regression => "regression",
            Self::Improvement => "improvement",
            Self::MinorRegression => "minor regression",
            Self::MinorImprovement => "minor improvement",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Changed {
        test: String,
        baseline_time: f64,
        current_time: f64,
        change_pct: f64,
        current_size_kb: f64,
        size_delta_kb: f64,
        classification: Classification,
    },
    New {
        test: String,
        current_time: f64,
        current_size_kb: f64,
    },
}

impl Comparison {
    pub fn test(&self) -> &str {
        match self {
            Comparison::Changed { test, .. } | Comparison::New { test, .. } => test,
        }
    }

    pub fn classification(&self) -> Option<Classification> {
        match self {
            Comparison::Changed { classification, .. } => Some(*classification),
            Comparison::New { .. } => None,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Changed {
                test,
                baseline_time,
                current_time,
                change_pct,
                current_size_kb,
                size_delta_kb,
                classification,
            } => {
                write!(
                    f,
                    "  [{}] {test}: {baseline_time:.3}s -> {current_time:.3}s ({change_pct:+.1}%) | {current_size_kb:.1}KB",
                    classification.label()
                )?;
                if *size_delta_kb != 0.0 {
                    write!(f, " ({size_delta_kb:+.1}KB)")?;
                }
                Ok(())
            }
            Comparison::New {
                test,
                current_time,
                current_size_kb,
            } => write!(
                f,
                "  [new] {test}: {current_time:.3}s | {current_size_kb:.1}KB (new test)"
            ),
        }
    }
}

/// Compares every test of `current` against the same test in `baseline`.
pub fn compare_runs(baseline: &RunRecord, current: &RunRecord) -> Vec<Comparison> {
    current
        .results
        .iter()
        .map(|curr| {
            let current_size_kb = curr.files.total_size_kb;
            let Some(base) = baseline.result(&curr.test) else {
                return Comparison::New {
                    test: curr.test.clone(),
                    current_time: curr.mean_time,
                    current_size_kb,
                };
            };
            // A zero baseline has no meaningful ratio.
            let change_pct = if base.mean_time == 0.0 {
                0.0
            } else {
                (curr.mean_time - base.mean_time) / base.mean_time * 100.0
            };
            Comparison::Changed {
                test: curr.test.clone(),
                baseline_time: base.mean_time,
                current_time: curr.mean_time,
                change_pct,
                current_size_kb,
                size_delta_kb: round_to(current_size_kb - base.files.total_size_kb, 1),
                classification: Classification::from_change(change_pct),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSection {
    pub title: String,
    pub comparisons: Vec<Comparison>,
}

impl fmt::Display for ComparisonSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{}:", self.title)?;
        for comparison in &self.comparisons {
            writeln!(f, "{comparison}")?;
        }
        Ok(())
    }
}

/// Comparisons of the latest run against the previous run and against the latest earlier run
/// with the same version.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub previous: ComparisonSection,
    pub same_version: Option<ComparisonSection>,
    /// Version of the latest run, kept to explain a missing same-version section.
    pub version: String,
}

impl ComparisonReport {
    /// `None` until the history holds at least two runs.
    pub fn build(history: &History) -> Option<Self> {
        let current = history.latest()?;
        let prev = history.previous()?;

        let previous = ComparisonSection {
            title: format!("Vs Previous Run ({} @ {})", prev.version, prev.git_commit),
            comparisons: compare_runs(prev, current),
        };
        let same_version = history
            .same_version_baseline()
            .map(|baseline| ComparisonSection {
                title: format!("Vs Same Version Baseline ({})", baseline.git_commit),
                comparisons: compare_runs(baseline, current),
            });

        Some(Self {
            previous,
            same_version,
            version: current.version.clone(),
        })
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nPERFORMANCE COMPARISONS")?;
        writeln!(f, "{}", "=".repeat(60))?;
        write!(f, "{}", self.previous)?;
        match &self.same_version {
            Some(section) => write!(f, "{section}"),
            None => writeln!(
                f,
                "\nNo earlier run with version {}; same-version comparison skipped.",
                self.version
            ),
        }
    }
}
