//! Version and revision metadata for a run. Every lookup degrades to [`UNKNOWN`].

use std::fs;
use std::path::Path;
use std::process::Command;

pub const UNKNOWN: &str = "unknown";

/// Version from the first `version = "..."` line of a manifest. An unquoted value (such as
/// `version = { workspace = true }`) is not a version.
pub fn project_version(manifest: &Path) -> String {
    let Ok(text) = fs::read_to_string(manifest) else {
        tracing::debug!(manifest = %manifest.display(), "manifest not readable");
        return UNKNOWN.to_string();
    };
    parse_version(&text).unwrap_or_else(|| UNKNOWN.to_string())
}

fn parse_version(manifest: &str) -> Option<String> {
    let line = manifest
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("version = "))?;
    let (_, value) = line.split_once('=')?;
    let value = value.trim();
    let value = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q))?;
    (!value.is_empty()).then(|| value.to_string())
}

fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Short commit hash of `dir`'s checkout, with `-dirty` appended when the working tree has
/// uncommitted changes.
pub fn git_revision(dir: &Path) -> String {
    let Some(commit) = git(dir, &["rev-parse", "--short", "HEAD"]) else {
        tracing::debug!(dir = %dir.display(), "no git revision available");
        return UNKNOWN.to_string();
    };
    let Some(status) = git(dir, &["status", "--porcelain"]) else {
        return UNKNOWN.to_string();
    };
    if status.is_empty() {
        commit
    } else {
        format!("{commit}-dirty")
    }
}
