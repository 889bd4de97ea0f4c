//! Save-and-compare and history listing.
//!
//! Reports are written to a caller-supplied writer (stdout for the CLI) so they can be
//! asserted on in tests.

use crate::bench::compare::ComparisonReport;
use crate::bench::history::History;
use crate::bench::meta;
use crate::bench::model::{BenchmarkReport, RunMeta, RunRecord};
use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const DEFAULT_BENCHMARKS_DIR: &str = ".benchmarks";
pub const DEFAULT_HISTORY_FILE: &str = "summary_history.json";
pub const DEFAULT_MANIFEST: &str = "Cargo.toml";
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Locations used by the historian, relative to `root` unless absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorianConfig {
    pub root: PathBuf,
    pub benchmarks_dir: PathBuf,
    pub history_file: PathBuf,
    pub manifest: PathBuf,
}

impl Default for HistorianConfig {
    fn default() -> Self {
        Self::with_root(".")
    }
}

impl HistorianConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            benchmarks_dir: PathBuf::from(DEFAULT_BENCHMARKS_DIR),
            history_file: Path::new(DEFAULT_BENCHMARKS_DIR).join(DEFAULT_HISTORY_FILE),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
        }
    }

    pub fn benchmarks_dir(&self) -> PathBuf {
        self.root.join(&self.benchmarks_dir)
    }

    pub fn history_path(&self) -> PathBuf {
        self.root.join(&self.history_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "json") {
            out.push(path);
        }
    }
}

/// Most recently modified `*.json` under `dir` (recursively), never the history file itself.
pub fn latest_results_file(dir: &Path, history: &Path) -> Option<PathBuf> {
    let mut files = Vec::new();
    collect_json_files(dir, &mut files);
    files.sort();

    let history = fs::canonicalize(history).ok();
    files
        .into_iter()
        .filter(|path| history.is_none() || fs::canonicalize(path).ok() != history)
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, path)| path)
}

pub fn load_report(path: &Path) -> Result<BenchmarkReport> {
    let text = fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::BenchmarkJson {
        path: path.display().to_string(),
        source,
    })
}

pub fn current_meta(config: &HistorianConfig) -> RunMeta {
    RunMeta {
        timestamp: chrono::Local::now()
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string(),
        version: meta::project_version(&config.manifest_path()),
        git_commit: meta::git_revision(&config.root),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// No benchmark directory or no result files; nothing was written.
    NoBenchmarks,
    Saved {
        run: RunRecord,
        history_len: usize,
        report: Option<ComparisonReport>,
    },
}

/// Records the latest benchmark results into the history and prints comparisons.
pub fn save_summary(config: &HistorianConfig, out: &mut impl Write) -> Result<SaveOutcome> {
    save_summary_with_meta(config, current_meta(config), out)
}

pub fn save_summary_with_meta(
    config: &HistorianConfig,
    meta: RunMeta,
    out: &mut impl Write,
) -> Result<SaveOutcome> {
    let bench_dir = config.benchmarks_dir();
    if !bench_dir.is_dir() {
        writeln!(
            out,
            "No {} directory found. Run benchmarks first.",
            config.benchmarks_dir.display()
        )?;
        return Ok(SaveOutcome::NoBenchmarks);
    }

    let history_path = config.history_path();
    let Some(latest) = latest_results_file(&bench_dir, &history_path) else {
        writeln!(out, "No benchmark results found.")?;
        return Ok(SaveOutcome::NoBenchmarks);
    };
    tracing::info!(results = %latest.display(), "summarizing benchmark results");

    let report = load_report(&latest)?;
    let run = RunRecord::from_report(&report, meta, &config.root);

    let mut history = History::load(&history_path)?;
    history.push(run.clone());
    history.save(&history_path)?;
    tracing::debug!(entries = history.len(), path = %history_path.display(), "history saved");

    writeln!(out, "Summary saved to {}", history_path.display())?;
    writeln!(out, "Version: {}, Commit: {}", run.version, run.git_commit)?;
    writeln!(out, "\nFile sizes in this run:")?;
    for result in &run.results {
        let files = &result.files;
        writeln!(
            out,
            "  {}: {:.1}KB total ({} records)",
            result.test, files.total_size_kb, files.total_records
        )?;
        writeln!(
            out,
            "    File1: {:.1}KB ({} records)",
            files.file1.size_kb, files.file1.records
        )?;
        writeln!(
            out,
            "    File2: {:.1}KB ({} records)",
            files.file2.size_kb, files.file2.records
        )?;
    }

    let comparison = ComparisonReport::build(&history);
    match &comparison {
        Some(report) => write!(out, "{report}")?,
        None => writeln!(out, "Need more runs for comparison.")?,
    }

    Ok(SaveOutcome::Saved {
        run,
        history_len: history.len(),
        report: comparison,
    })
}

/// Prints up to `limit` runs, newest first.
pub fn show_history(config: &HistorianConfig, limit: usize, out: &mut impl Write) -> Result<()> {
    let history_path = config.history_path();
    if !history_path.exists() {
        writeln!(out, "No benchmark history found.")?;
        return Ok(());
    }
    let history = History::load(&history_path)?;

    writeln!(out, "\nRECENT BENCHMARK HISTORY (last {limit} runs)")?;
    writeln!(out, "{}", "=".repeat(80))?;
    for run in history.recent(limit) {
        writeln!(
            out,
            "\n{} | v{} @ {}",
            run.timestamp, run.version, run.git_commit
        )?;
        for result in &run.results {
            writeln!(
                out,
                "  {}: {:.3}s | {:.1}KB ({} records)",
                result.test,
                result.mean_time,
                result.files.total_size_kb,
                result.files.total_records
            )?;
        }
    }
    Ok(())
}
