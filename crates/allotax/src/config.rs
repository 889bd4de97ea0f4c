//! Environment-driven defaults. CLI flags take precedence over everything here.

use std::ffi::OsString;
use std::path::PathBuf;

pub const NODE_ENV: &str = "ALLOTAX_NODE";
pub const RENDERER_ENV: &str = "ALLOTAX_RENDERER";
pub const PDF_ENV: &str = "ALLOTAX_PDF";

pub const DEFAULT_NODE: &str = "node";
pub const DEFAULT_RENDERER: &str = "tools/allotaxonometer/render.mjs";
pub const DEFAULT_PDF: &str = "chromium";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    pub node: OsString,
    pub renderer_script: PathBuf,
    /// Strategy name as given; resolved (and rejected if unknown) at conversion time.
    pub pdf_strategy: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            node: OsString::from(DEFAULT_NODE),
            renderer_script: PathBuf::from(DEFAULT_RENDERER),
            pdf_strategy: DEFAULT_PDF.to_string(),
        }
    }
}

impl ChartConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            node: non_empty(NODE_ENV).unwrap_or(defaults.node),
            renderer_script: non_empty(RENDERER_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.renderer_script),
            pdf_strategy: non_empty(PDF_ENV)
                .map(|v| v.to_string_lossy().into_owned())
                .unwrap_or(defaults.pdf_strategy),
        }
    }
}
