use crate::bench::model::RunRecord;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Maximum number of runs retained; older runs are evicted first.
pub const MAX_ENTRIES: usize = 50;

/// Rolling benchmark history, oldest run first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    runs: Vec<RunRecord>,
}

impl History {
    pub fn from_runs(runs: Vec<RunRecord>) -> Self {
        let mut history = Self { runs };
        history.evict();
        history
    }

    /// Loads the history at `path`. A missing or blank file is an empty history; anything
    /// else must parse.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let runs: Vec<RunRecord> =
            serde_json::from_str(&text).map_err(|source| Error::HistoryJson {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self { runs })
    }

    /// Rewrites the whole file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::WriteFile {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let mut json = serde_json::to_string_pretty(&self.runs)?;
        json.push('\n');
        fs::write(path, json).map_err(|source| Error::WriteFile {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn push(&mut self, run: RunRecord) {
        self.runs.push(run);
        self.evict();
    }

    fn evict(&mut self) {
        if self.runs.len() > MAX_ENTRIES {
            let excess = self.runs.len() - MAX_ENTRIES;
            self.runs.drain(..excess);
        }
    }

    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn latest(&self) -> Option<&RunRecord> {
        self.runs.last()
    }

    /// The run just before the latest one.
    pub fn previous(&self) -> Option<&RunRecord> {
        self.runs.len().checked_sub(2).map(|i| &self.runs[i])
    }

    /// Most recent run before the latest one that shares its version tag.
    pub fn same_version_baseline(&self) -> Option<&RunRecord> {
        let (latest, earlier) = self.runs.split_last()?;
        earlier.iter().rev().find(|r| r.version == latest.version)
    }

    /// Up to `limit` runs, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &RunRecord> {
        self.runs.iter().rev().take(limit)
    }
}
