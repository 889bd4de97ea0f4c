use std::process::ExitStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {path}: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset JSON in {path}: {source}")]
    DatasetJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid divergence parameter (alpha): {value:?} (expected a non-negative number or `inf`)")]
    InvalidAlpha { value: String },

    #[error("failed to spawn renderer `{program}`: {source}")]
    RendererSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer exited with {status}:\n{stderr}")]
    RenderFailed { status: ExitStatus, stderr: String },

    #[error("PDF conversion failed ({strategy}): {message}")]
    PdfConvert {
        strategy: &'static str,
        message: String,
    },

    #[error("failed to parse benchmark history {path}: {source}")]
    HistoryJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse benchmark results {path}: {source}")]
    BenchmarkJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// Exit code a CLI should surface for this error.
    ///
    /// A failed renderer propagates its own exit code so callers observe the same status the
    /// Node process reported.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::RenderFailed { status, .. } => status.code().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}
