//! HTML → PDF conversion.
//!
//! Conversion is delegated: either to an external converter process (headless Chromium,
//! `wkhtmltopdf`) or, for `svg2pdf`, to an in-process conversion of the chart's inline
//! `<svg>` panels. Every strategy is attempted exactly once.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Environment variable overriding the Chromium binary used by [`PdfStrategy::Chromium`].
pub const CHROMIUM_ENV: &str = "ALLOTAX_CHROMIUM";
const DEFAULT_CHROMIUM: &str = "chromium";

const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfStrategy {
    #[default]
    Chromium,
    Wkhtmltopdf,
    Svg2Pdf,
    None,
}

impl PdfStrategy {
    pub const ALL: [PdfStrategy; 4] = [
        PdfStrategy::Chromium,
        PdfStrategy::Wkhtmltopdf,
        PdfStrategy::Svg2Pdf,
        PdfStrategy::None,
    ];

    /// Looks a strategy up by name. Unknown names yield `None`; callers report them and skip
    /// conversion.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Some(Self::Chromium),
            "wkhtmltopdf" => Some(Self::Wkhtmltopdf),
            "svg2pdf" => Some(Self::Svg2Pdf),
            "none" | "off" => Some(Self::None),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Wkhtmltopdf => "wkhtmltopdf",
            Self::Svg2Pdf => "svg2pdf",
            Self::None => "none",
        }
    }

    /// Converts `html` into `pdf`. Returns `Ok(false)` when the strategy is [`PdfStrategy::None`].
    pub fn convert(self, html: &Path, pdf: &Path) -> Result<bool> {
        tracing::debug!(strategy = self.name(), html = %html.display(), pdf = %pdf.display(), "converting to PDF");
        match self {
            Self::Chromium => {
                let program = std::env::var_os(CHROMIUM_ENV)
                    .unwrap_or_else(|| OsString::from(DEFAULT_CHROMIUM));
                let url = file_url(html)?;
                let mut print_to = OsString::from("--print-to-pdf=");
                print_to.push(pdf.as_os_str());
                let mut cmd = Command::new(program);
                cmd.arg("--headless")
                    .arg("--disable-gpu")
                    .arg("--no-sandbox")
                    .arg("--no-pdf-header-footer")
                    .arg(print_to)
                    .arg(url);
                run_converter(self, &mut cmd)?;
            }
            Self::Wkhtmltopdf => {
                let mut cmd = Command::new("wkhtmltopdf");
                cmd.arg("--quiet")
                    .arg("--orientation")
                    .arg("Landscape")
                    .arg("--zoom")
                    .arg("0.8")
                    .arg("--margin-left")
                    .arg("0")
                    .arg(html)
                    .arg(pdf);
                run_converter(self, &mut cmd)?;
            }
            Self::Svg2Pdf => {
                let markup = fs::read_to_string(html).map_err(|source| Error::ReadFile {
                    path: html.display().to_string(),
                    source,
                })?;
                let bytes = html_to_pdf_bytes(&markup)?;
                fs::write(pdf, bytes).map_err(|source| Error::WriteFile {
                    path: pdf.display().to_string(),
                    source,
                })?;
            }
            Self::None => return Ok(false),
        }
        Ok(true)
    }
}

impl fmt::Display for PdfStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn file_url(path: &Path) -> Result<String> {
    let abs = fs::canonicalize(path).map_err(|source| Error::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let abs = abs.to_string_lossy().replace('\\', "/");
    if abs.starts_with('/') {
        Ok(format!("file://{abs}"))
    } else {
        Ok(format!("file:///{abs}"))
    }
}

fn run_converter(strategy: PdfStrategy, cmd: &mut Command) -> Result<()> {
    let output = cmd.output().map_err(|err| Error::PdfConvert {
        strategy: strategy.name(),
        message: format!("failed to spawn process: {err}"),
    })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(Error::PdfConvert {
            strategy: strategy.name(),
            message: format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })
    }
}

/// Byte range of the first `<svg>...</svg>` element at or after `from`, including nested
/// `<svg>` children.
fn svg_element_range(html: &str, from: usize) -> Option<(usize, usize)> {
    let start = find_svg_open(html, from)?;
    let mut depth = 0usize;
    let mut i = start;
    loop {
        let next_open = find_svg_open(html, i);
        let next_close = html[i..].find("</svg>").map(|rel| i + rel)?;
        match next_open {
            Some(open) if open < next_close => {
                // Self-closing `<svg ... />` does not change depth.
                let tag_end = html[open..].find('>').map(|rel| open + rel)?;
                if !html[..tag_end].ends_with('/') {
                    depth += 1;
                } else if depth == 0 {
                    return Some((start, tag_end + 1));
                }
                i = tag_end + 1;
            }
            _ => {
                depth = depth.saturating_sub(1);
                i = next_close + "</svg>".len();
                if depth == 0 {
                    return Some((start, i));
                }
            }
        }
    }
}

/// Every top-level `<svg>` element of `html`, in document order.
pub fn extract_svg_elements(html: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some((start, end)) = svg_element_range(html, from) {
        found.push(&html[start..end]);
        from = end;
    }
    found
}

fn find_svg_open(html: &str, from: usize) -> Option<usize> {
    let mut i = from;
    while let Some(rel) = html[i..].find("<svg") {
        let at = i + rel;
        // Skip `<svgfoo` lookalikes.
        match html[at + 4..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => return Some(at),
            _ => i = at + 4,
        }
    }
    None
}

/// Inline SVG in HTML may omit the namespace; `usvg` requires it.
fn ensure_svg_namespace(svg: &str) -> String {
    let tag_end = svg.find('>').unwrap_or(svg.len());
    if svg[..tag_end].contains("xmlns=") {
        svg.to_string()
    } else {
        format!("<svg xmlns=\"{SVG_NS}\"{}", &svg[4..])
    }
}

fn svg_convert_error(message: String) -> Error {
    Error::PdfConvert {
        strategy: PdfStrategy::Svg2Pdf.name(),
        message,
    }
}

fn usvg_options() -> svg2pdf::usvg::Options<'static> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "system-ui".to_string();
    opt
}

fn parse_svg(svg: &str, opt: &svg2pdf::usvg::Options<'_>) -> Result<svg2pdf::usvg::Tree> {
    svg2pdf::usvg::Tree::from_str(svg, opt)
        .map_err(|err| svg_convert_error(format!("failed to parse SVG: {err}")))
}

/// Stacks several standalone SVGs top to bottom into one document, each keeping its own
/// intrinsic size.
fn compose_svgs(svgs: &[&str], opt: &svg2pdf::usvg::Options<'_>) -> Result<String> {
    let mut body = String::new();
    let (mut width, mut height) = (0f32, 0f32);
    for svg in svgs {
        let svg = ensure_svg_namespace(svg);
        let size = parse_svg(&svg, opt)?.size();
        body.push_str(&format!(
            "<svg x=\"0\" y=\"{height}\" width=\"{}\" height=\"{}\">{svg}</svg>",
            size.width(),
            size.height()
        ));
        width = width.max(size.width());
        height += size.height();
    }
    Ok(format!(
        "<svg xmlns=\"{SVG_NS}\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">{body}</svg>"
    ))
}

/// Converts the chart markup in `html` to PDF. A dashboard made of several sibling `<svg>`
/// panels becomes a single page with the panels stacked in document order.
pub fn html_to_pdf_bytes(html: &str) -> Result<Vec<u8>> {
    let opt = usvg_options();
    let svg = match extract_svg_elements(html).as_slice() {
        [] => {
            return Err(svg_convert_error(
                "no <svg> element found in chart markup".to_string(),
            ));
        }
        [single] => ensure_svg_namespace(single),
        panels => compose_svgs(panels, &opt)?,
    };
    tree_to_pdf(&parse_svg(&svg, &opt)?)
}

fn tree_to_pdf(tree: &svg2pdf::usvg::Tree) -> Result<Vec<u8>> {
    svg2pdf::to_pdf(
        tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| svg_convert_error("failed to convert SVG to PDF".to_string()))
}
