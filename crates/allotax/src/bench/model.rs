use crate::bench::catalog;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One persisted benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: String,
    pub version: String,
    pub git_commit: String,
    #[serde(default)]
    pub results: Vec<TestResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test: String,
    pub mean_time: f64,
    pub min_time: f64,
    pub rounds: u64,
    pub files: FilePair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePair {
    pub file1: FileInfo,
    pub file2: FileInfo,
    pub total_size_kb: f64,
    pub total_records: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub size_kb: f64,
    pub records: u64,
}

/// Raw benchmark results as written by the benchmark harness.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BenchmarkReport {
    #[serde(default, alias = "results")]
    pub benchmarks: Vec<BenchmarkEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkEntry {
    pub name: String,
    pub stats: BenchmarkStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkStats {
    pub mean: f64,
    pub min: f64,
    #[serde(default = "default_rounds")]
    pub rounds: u64,
}

fn default_rounds() -> u64 {
    1
}

/// Context recorded alongside every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMeta {
    pub timestamp: String,
    pub version: String,
    pub git_commit: String,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl TestResult {
    /// Builds a result from a raw entry. File statistics come from the fixed catalog, resolved
    /// against `root`, never from the raw entry.
    pub fn from_entry(entry: &BenchmarkEntry, root: &Path) -> Self {
        let test = catalog::classify(&entry.name);
        let (file1, file2) = catalog::file_paths(&test);
        Self {
            mean_time: round_to(entry.stats.mean, 3),
            min_time: round_to(entry.stats.min, 3),
            rounds: entry.stats.rounds,
            files: FilePair::probe(root, file1, file2),
            test,
        }
    }
}

impl RunRecord {
    pub fn from_report(report: &BenchmarkReport, meta: RunMeta, root: &Path) -> Self {
        Self {
            timestamp: meta.timestamp,
            version: meta.version,
            git_commit: meta.git_commit,
            results: report
                .benchmarks
                .iter()
                .map(|entry| TestResult::from_entry(entry, root))
                .collect(),
        }
    }

    pub fn result(&self, test: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.test == test)
    }
}
