//! Allotaxonometer chart pipeline.
//!
//! The rank-turbulence computation and the dashboard markup both live in the external JS
//! library. This module only prepares its input (an ES module holding both datasets, alpha and
//! the titles), runs the renderer, stores the captured HTML and hands it to a PDF converter.

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::pdf::PdfStrategy;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use tempfile::NamedTempFile;

/// Divergence parameter for rank-turbulence divergence. Passed through to the renderer as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alpha(f64);

impl Alpha {
    pub fn new(value: f64) -> Option<Self> {
        (!value.is_nan() && value >= 0.0).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// JS literal form used in the intermediate module.
    pub fn to_js(self) -> String {
        if self.0.is_infinite() {
            "Infinity".to_string()
        } else {
            self.0.to_string()
        }
    }
}

impl FromStr for Alpha {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parsed = match trimmed.to_ascii_lowercase().as_str() {
            "inf" | "infinity" | "+inf" | "+infinity" => Some(f64::INFINITY),
            other => other.parse::<f64>().ok(),
        };
        parsed.and_then(Alpha::new).ok_or_else(|| Error::InvalidAlpha {
            value: s.to_string(),
        })
    }
}

impl fmt::Display for Alpha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_infinite() {
            f.write_str("inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub dataset1: PathBuf,
    pub dataset2: PathBuf,
    pub output: PathBuf,
    pub alpha: Alpha,
    pub title1: Option<String>,
    pub title2: Option<String>,
}

impl ChartRequest {
    fn title_for(explicit: Option<&str>, path: &Path) -> String {
        explicit
            .map(str::to_string)
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_default()
    }

    pub fn titles(&self) -> (String, String) {
        (
            Self::title_for(self.title1.as_deref(), &self.dataset1),
            Self::title_for(self.title2.as_deref(), &self.dataset2),
        )
    }
}

/// Where the chart's HTML and PDF land for a requested output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOutputs {
    pub html: PathBuf,
    pub pdf: PathBuf,
}

impl ChartOutputs {
    /// A `.pdf` request keeps the PDF at that path and writes the HTML next to it; any other
    /// request is the HTML path and the PDF becomes its `.pdf` sibling.
    pub fn for_output(output: &Path) -> Self {
        let is_pdf = output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            Self {
                html: output.with_extension("html"),
                pdf: output.to_path_buf(),
            }
        } else {
            Self {
                html: output.to_path_buf(),
                pdf: output.with_extension("pdf"),
            }
        }
    }
}

/// Writes the renderer's input module into a fresh temporary file.
///
/// The file is removed when the returned handle drops.
pub fn write_intermediate_script(
    dataset1: &Dataset,
    dataset2: &Dataset,
    alpha: Alpha,
    titles: (&str, &str),
) -> Result<NamedTempFile> {
    let script = render_intermediate_script(dataset1, dataset2, alpha, titles)?;
    let mut file = tempfile::Builder::new()
        .prefix("allotax-")
        .suffix(".mjs")
        .tempfile()
        .map_err(|source| Error::WriteFile {
            path: std::env::temp_dir().display().to_string(),
            source,
        })?;
    file.write_all(script.as_bytes())
        .map_err(|source| Error::WriteFile {
            path: file.path().display().to_string(),
            source,
        })?;
    Ok(file)
}

pub fn render_intermediate_script(
    dataset1: &Dataset,
    dataset2: &Dataset,
    alpha: Alpha,
    titles: (&str, &str),
) -> Result<String> {
    let title1 = serde_json::to_string(titles.0)?;
    let title2 = serde_json::to_string(titles.1)?;
    Ok(format!(
        "export const data1 = {};\nexport const data2 = {};\nexport const alpha = {};\nexport const title1 = {title1};\nexport const title2 = {title2};\n",
        dataset1.to_json(),
        dataset2.to_json(),
        alpha.to_js(),
    ))
}

/// Captured output of a successful renderer run.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub stdout: String,
    pub stderr: String,
}

pub trait ChartRenderer {
    /// Renders the chart described by the intermediate module at `script`.
    fn render(&self, script: &Path) -> Result<Rendered>;
}

/// Renderer backed by a child process that receives the intermediate module path as its last
/// argument and prints the chart markup on stdout.
#[derive(Debug, Clone)]
pub struct ProcessRenderer {
    program: OsString,
    args: Vec<OsString>,
}

impl ProcessRenderer {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// `node <script> <intermediate>`.
    pub fn node(node: impl Into<OsString>, script: impl Into<OsString>) -> Self {
        Self::new(node).arg(script)
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl ChartRenderer for ProcessRenderer {
    fn render(&self, script: &Path) -> Result<Rendered> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(program = ?self.program, args = ?self.args, script = %script.display(), "running renderer");
        let output = cmd.output().map_err(|source| Error::RendererSpawn {
            program: self.program.to_string_lossy().to_string(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(Error::RenderFailed {
                status: output.status,
                stderr,
            });
        }
        Ok(Rendered { stdout, stderr })
    }
}

#[derive(Debug)]
pub enum PdfOutcome {
    Written(PathBuf),
    Skipped,
    Failed(Error),
}

#[derive(Debug)]
pub struct ChartOutcome {
    pub html: PathBuf,
    pub pdf: PdfOutcome,
}

/// Runs the whole pipeline for one chart.
///
/// Malformed datasets and a failing renderer abort before anything is written. A PDF failure
/// is reported in the outcome and leaves the HTML in place.
pub fn generate_chart(
    request: &ChartRequest,
    renderer: &dyn ChartRenderer,
    pdf: PdfStrategy,
) -> Result<ChartOutcome> {
    let dataset1 = Dataset::from_path(&request.dataset1)?;
    let dataset2 = Dataset::from_path(&request.dataset2)?;
    tracing::info!(
        left = %request.dataset1.display(),
        left_records = dataset1.record_count(),
        right = %request.dataset2.display(),
        right_records = dataset2.record_count(),
        alpha = %request.alpha,
        "loaded datasets"
    );

    let (title1, title2) = request.titles();
    let script = write_intermediate_script(&dataset1, &dataset2, request.alpha, (&title1, &title2))?;
    let rendered = renderer.render(script.path())?;
    if !rendered.stderr.trim().is_empty() {
        tracing::debug!(stderr = %rendered.stderr.trim(), "renderer diagnostics");
    }

    let outputs = ChartOutputs::for_output(&request.output);
    if let Some(parent) = outputs.html.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::WriteFile {
            path: parent.display().to_string(),
            source,
        })?;
    }
    fs::write(&outputs.html, rendered.stdout.as_bytes()).map_err(|source| Error::WriteFile {
        path: outputs.html.display().to_string(),
        source,
    })?;
    tracing::info!(html = %outputs.html.display(), bytes = rendered.stdout.len(), "chart HTML written");

    let pdf = match pdf.convert(&outputs.html, &outputs.pdf) {
        Ok(true) => PdfOutcome::Written(outputs.pdf),
        Ok(false) => PdfOutcome::Skipped,
        Err(err) => {
            tracing::warn!(error = %err, "PDF conversion failed; HTML kept");
            PdfOutcome::Failed(err)
        }
    };

    Ok(ChartOutcome {
        html: outputs.html,
        pdf,
    })
}
