use crate::bench::model::{FileInfo, FilePair, round_to};
use crate::dataset::Dataset;
use std::fs;
use std::path::Path;

impl FileInfo {
    /// Size (KB, one decimal) and record count for `path` relative to `root`.
    ///
    /// A missing file reports zeros; a file that is present but not a parseable dataset keeps
    /// its size and reports zero records.
    pub fn probe(root: &Path, path: &str) -> Self {
        let mut info = FileInfo {
            path: path.to_string(),
            ..Default::default()
        };
        if path.is_empty() {
            return info;
        }

        let full = root.join(path);
        let Ok(meta) = fs::metadata(&full) else {
            tracing::debug!(path = %full.display(), "benchmark input missing");
            return info;
        };
        if !meta.is_file() {
            return info;
        }
        info.size_kb = round_to(meta.len() as f64 / 1024.0, 1);
        info.records = fs::read_to_string(&full)
            .ok()
            .and_then(|text| Dataset::parse(&text).ok())
            .map_or(0, |d| d.record_count() as u64);
        info
    }
}

impl FilePair {
    pub fn probe(root: &Path, file1: &str, file2: &str) -> Self {
        Self::new(FileInfo::probe(root, file1), FileInfo::probe(root, file2))
    }

    pub fn new(file1: FileInfo, file2: FileInfo) -> Self {
        Self {
            total_size_kb: round_to(file1.size_kb + file2.size_kb, 1),
            total_records: file1.records + file2.records,
            file1,
            file2,
        }
    }
}
