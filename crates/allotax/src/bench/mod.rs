//! Benchmark history: turns the latest benchmark-results file into a [`model::RunRecord`],
//! keeps the last [`history::MAX_ENTRIES`] runs and reports how the newest run moved.

pub mod catalog;
pub mod compare;
pub mod files;
pub mod history;
pub mod meta;
pub mod model;
pub mod summary;

pub use compare::{Classification, Comparison, ComparisonReport, compare_runs};
pub use history::{History, MAX_ENTRIES};
pub use model::{BenchmarkReport, FileInfo, FilePair, RunMeta, RunRecord, TestResult};
pub use summary::{HistorianConfig, SaveOutcome, save_summary, show_history};
