//! Ranked-frequency datasets.
//!
//! A dataset is a list of `(label, frequency)` records for one period. Files arrive either as
//! plain JSON or as a JS module (`export const data = [...];`) written for the browser build of
//! the allotaxonometer library. Both forms normalize to the same JSON payload.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Key under which an object-shaped dataset carries its record array.
pub const RECORDS_KEY: &str = "data";

/// Removes a leading `export const <name> =` assignment (and the trailing `;`) from a JS data
/// module, leaving the JSON payload. Text without the wrapper is returned trimmed.
pub fn strip_export_statement(text: &str) -> &str {
    static EXPORT_RE: OnceLock<Regex> = OnceLock::new();
    let re = EXPORT_RE.get_or_init(|| {
        Regex::new(r"^\s*(?:export\s+)?(?:const|let|var)\s+[A-Za-z_$][\w$]*\s*=\s*")
            .expect("valid regex")
    });

    let body = match re.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    let body = body.trim();
    body.strip_suffix(';').map(str::trim_end).unwrap_or(body)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    value: Value,
}

impl Dataset {
    /// Parses dataset text (plain JSON or an export-wrapped JS module).
    pub fn parse(text: &str) -> std::result::Result<Self, serde_json::Error> {
        let value = serde_json::from_str(strip_export_statement(text))?;
        Ok(Self { value })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text).map_err(|source| Error::DatasetJson {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The record array, when the payload has one.
    pub fn records(&self) -> Option<&[Value]> {
        match &self.value {
            Value::Array(items) => Some(items),
            Value::Object(map) => map
                .get(RECORDS_KEY)
                .and_then(Value::as_array)
                .map(Vec::as_slice),
            _ => None,
        }
    }

    /// Number of records; a payload that is neither a list nor wraps one counts as a single
    /// record.
    pub fn record_count(&self) -> usize {
        self.records().map_or(1, <[Value]>::len)
    }

    /// Compact JSON, suitable for embedding into a JS module.
    pub fn to_json(&self) -> String {
        self.value.to_string()
    }
}
