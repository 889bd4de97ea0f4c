#![cfg(unix)]

use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

const CHART_HTML: &str = r#"<!DOCTYPE html><html><body><svg width="40" height="20" viewBox="0 0 40 20"><rect width="40" height="20" fill="tomato"/></svg></body></html>"#;

/// Writes a shell script that stands in for `render.mjs`; it is run as `sh <script> <module>`.
fn write_renderer(dir: &Path, exit_code: i32) -> String {
    let script = dir.join("render.sh");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\n\
test -f \"$1\" || exit 8\n\
if [ {exit_code} -ne 0 ]; then echo 'TypeError: boom' >&2; exit {exit_code}; fi\n\
printf '%s' '{CHART_HTML}'\n"
        ),
    )
    .expect("write renderer");
    script.to_string_lossy().to_string()
}

fn write_datasets(dir: &Path) -> (String, String) {
    let d1 = dir.join("boys_1968.json");
    let d2 = dir.join("boys_2018.json");
    fs::write(&d1, r#"[{"types":"Michael","counts":86214}]"#).unwrap();
    fs::write(&d2, r#"{"data":[{"types":"Liam","counts":19837}]}"#).unwrap();
    (
        d1.to_string_lossy().to_string(),
        d2.to_string_lossy().to_string(),
    )
}

fn allotax() -> Command {
    let exe = assert_cmd::cargo_bin!("allotax");
    let mut cmd = Command::new(exe);
    cmd.env_remove("ALLOTAX_PDF")
        .env_remove("ALLOTAX_NODE")
        .env_remove("ALLOTAX_RENDERER");
    cmd
}

#[test]
fn missing_arguments_print_usage() {
    let output = allotax().arg("only-one.json").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("USAGE:"));
}

#[test]
fn renders_html_and_pdf() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (d1, d2) = write_datasets(tmp.path());
    let renderer = write_renderer(tmp.path(), 0);
    let out = tmp.path().join("test.pdf");

    allotax()
        .args([
            "--node",
            "sh",
            "--renderer",
            renderer.as_str(),
            "--pdf",
            "svg2pdf",
            d1.as_str(),
            d2.as_str(),
            out.to_string_lossy().as_ref(),
            "0.17",
            "Baby boy names 1968",
            "Baby boy names 2018",
        ])
        .assert()
        .success();

    let html = fs::read_to_string(tmp.path().join("test.html")).expect("read html");
    assert_eq!(html, CHART_HTML);
    let pdf = fs::read(&out).expect("read pdf");
    assert!(pdf.starts_with(b"%PDF"), "output is not a PDF");
}

#[test]
fn unknown_pdf_strategy_is_reported_and_skipped() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (d1, d2) = write_datasets(tmp.path());
    let renderer = write_renderer(tmp.path(), 0);
    let out = tmp.path().join("chart.html");

    let output = allotax()
        .env("ALLOTAX_PDF", "weasyprint")
        .args([
            "--node",
            "sh",
            "--renderer",
            renderer.as_str(),
            d1.as_str(),
            d2.as_str(),
            out.to_string_lossy().as_ref(),
            "0.17",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid PDF strategy `weasyprint`"));
    assert!(out.exists());
    assert!(!out.with_extension("pdf").exists());
}

#[test]
fn renderer_exit_status_is_propagated() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (d1, d2) = write_datasets(tmp.path());
    let renderer = write_renderer(tmp.path(), 7);
    let out = tmp.path().join("chart.html");

    let output = allotax()
        .args([
            "--node",
            "sh",
            "--renderer",
            renderer.as_str(),
            "--pdf",
            "none",
            d1.as_str(),
            d2.as_str(),
            out.to_string_lossy().as_ref(),
            "0.17",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: TypeError: boom"));
    assert!(!out.exists());
}

#[test]
fn invalid_alpha_fails_without_rendering() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (d1, d2) = write_datasets(tmp.path());
    let renderer = write_renderer(tmp.path(), 0);
    let out = tmp.path().join("chart.html");

    let output = allotax()
        .args([
            "--node",
            "sh",
            "--renderer",
            renderer.as_str(),
            d1.as_str(),
            d2.as_str(),
            out.to_string_lossy().as_ref(),
            "-0.5",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid divergence parameter"));
    assert!(!out.exists());
}

#[test]
fn chromium_failure_keeps_html() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (d1, d2) = write_datasets(tmp.path());
    let renderer = write_renderer(tmp.path(), 0);
    let out = tmp.path().join("chart.pdf");

    let output = allotax()
        .env("ALLOTAX_CHROMIUM", tmp.path().join("no-such-chromium"))
        .args([
            "--node",
            "sh",
            "--renderer",
            renderer.as_str(),
            "--pdf",
            "chromium",
            d1.as_str(),
            d2.as_str(),
            out.to_string_lossy().as_ref(),
            "inf",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PDF conversion failed (chromium)"), "{stderr}");
    assert_eq!(
        fs::read_to_string(tmp.path().join("chart.html")).unwrap(),
        CHART_HTML
    );
    assert!(!out.exists());
}
