#![cfg(unix)]

use allotax::{
    Alpha, ChartRequest, Error, PdfOutcome, PdfStrategy, ProcessRenderer, generate_chart,
};
use std::fs;
use std::path::{Path, PathBuf};

const CHART_HTML: &str = r#"<!DOCTYPE html><html><body><svg width="40" height="20" viewBox="0 0 40 20"><rect width="40" height="20" fill="steelblue"/></svg></body></html>"#;

/// A stand-in for the Node renderer: checks the intermediate module and prints fixed markup.
fn fake_renderer(dir: &Path, exit_code: i32) -> ProcessRenderer {
    let script = dir.join("render.sh");
    let body = format!(
        "#!/bin/sh\n\
grep -q 'export const data1 = ' \"$1\" || {{ echo 'missing data1' >&2; exit 9; }}\n\
grep -q 'export const alpha = 0.17;' \"$1\" || {{ echo 'missing alpha' >&2; exit 9; }}\n\
if [ {exit_code} -ne 0 ]; then echo 'renderer exploded' >&2; exit {exit_code}; fi\n\
printf '%s' '{CHART_HTML}'\n"
    );
    fs::write(&script, body).expect("write fake renderer");
    ProcessRenderer::new("sh").arg(script)
}

fn write_datasets(dir: &Path) -> (PathBuf, PathBuf) {
    let d1 = dir.join("boys_1968.json");
    let d2 = dir.join("boys_2018.js");
    fs::write(
        &d1,
        r#"[{"types":"Michael","counts":86214},{"types":"James","counts":71322}]"#,
    )
    .unwrap();
    fs::write(
        &d2,
        "export const data = [{\"types\":\"Liam\",\"counts\":19837},{\"types\":\"Noah\",\"counts\":18267}];\n",
    )
    .unwrap();
    (d1, d2)
}

fn request(d1: PathBuf, d2: PathBuf, output: PathBuf) -> ChartRequest {
    ChartRequest {
        dataset1: d1,
        dataset2: d2,
        output,
        alpha: "0.17".parse::<Alpha>().unwrap(),
        title1: Some("Boys 1968".to_string()),
        title2: Some("Boys 2018".to_string()),
    }
}

#[test]
fn successful_render_writes_html_verbatim() {
    let tmp = tempfile::tempdir().unwrap();
    let (d1, d2) = write_datasets(tmp.path());
    let out = tmp.path().join("charts").join("boys.html");

    let renderer = fake_renderer(tmp.path(), 0);
    let outcome = generate_chart(&request(d1, d2, out.clone()), &renderer, PdfStrategy::None)
        .expect("chart generation");

    assert_eq!(outcome.html, out);
    assert_eq!(fs::read_to_string(&out).unwrap(), CHART_HTML);
    assert!(matches!(outcome.pdf, PdfOutcome::Skipped));
    assert!(!out.with_extension("pdf").exists());
}

#[test]
fn failing_renderer_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let (d1, d2) = write_datasets(tmp.path());
    let out = tmp.path().join("boys.html");

    let renderer = fake_renderer(tmp.path(), 3);
    let err = generate_chart(&request(d1, d2, out.clone()), &renderer, PdfStrategy::Svg2Pdf)
        .unwrap_err();

    match &err {
        Error::RenderFailed { stderr, .. } => assert!(stderr.contains("renderer exploded")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 3);
    assert!(!out.exists());
    assert!(!out.with_extension("pdf").exists());
}

#[test]
fn malformed_dataset_is_fatal_before_rendering() {
    let tmp = tempfile::tempdir().unwrap();
    let (d1, _) = write_datasets(tmp.path());
    let bad = tmp.path().join("broken.json");
    fs::write(&bad, "export const data = [{\"types\": \"x\",];").unwrap();
    let out = tmp.path().join("boys.html");

    let renderer = fake_renderer(tmp.path(), 0);
    let err = generate_chart(&request(d1, bad, out.clone()), &renderer, PdfStrategy::None)
        .unwrap_err();
    assert!(matches!(err, Error::DatasetJson { .. }));
    assert!(!out.exists());
}

#[test]
fn pdf_request_keeps_html_sibling_and_writes_pdf() {
    let tmp = tempfile::tempdir().unwrap();
    let (d1, d2) = write_datasets(tmp.path());
    let out = tmp.path().join("test.pdf");

    let renderer = fake_renderer(tmp.path(), 0);
    let outcome = generate_chart(&request(d1, d2, out.clone()), &renderer, PdfStrategy::Svg2Pdf)
        .expect("chart generation");

    assert_eq!(outcome.html, tmp.path().join("test.html"));
    assert!(outcome.html.exists());
    match outcome.pdf {
        PdfOutcome::Written(path) => assert_eq!(path, out),
        other => panic!("expected a PDF, got {other:?}"),
    }
    assert!(fs::read(&out).unwrap().starts_with(b"%PDF"));
}

#[test]
fn pdf_failure_leaves_html_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let (d1, d2) = write_datasets(tmp.path());
    let out = tmp.path().join("plain.html");

    let script = tmp.path().join("no_svg.sh");
    fs::write(&script, "#!/bin/sh\nprintf '<html><body>no chart</body></html>'\n").unwrap();
    let renderer = ProcessRenderer::new("sh").arg(script);

    let outcome = generate_chart(&request(d1, d2, out.clone()), &renderer, PdfStrategy::Svg2Pdf)
        .expect("HTML is still produced");
    assert!(matches!(outcome.pdf, PdfOutcome::Failed(Error::PdfConvert { .. })));
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "<html><body>no chart</body></html>"
    );
}

#[test]
fn missing_renderer_binary_is_a_spawn_error() {
    let tmp = tempfile::tempdir().unwrap();
    let (d1, d2) = write_datasets(tmp.path());
    let out = tmp.path().join("boys.html");

    let renderer = ProcessRenderer::node(
        tmp.path().join("definitely-not-node"),
        "render.mjs",
    );
    let err = generate_chart(&request(d1, d2, out.clone()), &renderer, PdfStrategy::None)
        .unwrap_err();
    assert!(matches!(err, Error::RendererSpawn { .. }));
    assert!(!out.exists());
}
