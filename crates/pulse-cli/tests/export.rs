#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use std::path::{Path, PathBuf};

use common::{Sandbox, mount_report};
use predicates::prelude::*;
use wiremock::MockServer;

fn reports_in(dir: &Path, ext: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("pagespeed-report-") && n.ends_with(ext))
        })
        .collect()
}

#[tokio::test]
async fn csv_export_writes_dated_report() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, 1).await;
    let sandbox = Sandbox::new();
    let out_dir = sandbox.data.path().join("reports");

    sandbox
        .cmd_against(&server)
        .args(["export", "https://example.com", "--format", "csv", "--out-dir"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 metrics"));

    let reports = reports_in(&out_dir, ".csv");
    assert_eq!(reports.len(), 1);
    // pagespeed-report-YYYY-MM-DD.csv
    let name = reports[0].file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name.len(), "pagespeed-report-".len() + 10 + ".csv".len());

    let content = std::fs::read_to_string(&reports[0])?;
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("Metric,Score,Description"));
    assert_eq!(
        lines.next(),
        Some(
            "First Contentful Paint,97,First Contentful Paint marks the time at which the first text or image is painted."
        )
    );
    assert!(lines.next().unwrap().starts_with(
        "Background and foreground colors have a sufficient contrast ratio,0,"
    ));
    assert_eq!(lines.next(), None);
    Ok(())
}

#[tokio::test]
async fn xlsx_is_the_default_format() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, 1).await;
    let sandbox = Sandbox::new();
    let out_dir = sandbox.data.path().join("reports");

    sandbox
        .cmd_against(&server)
        .args(["export", "https://example.com", "-o"])
        .arg(&out_dir)
        .assert()
        .success();

    let reports = reports_in(&out_dir, ".xlsx");
    assert_eq!(reports.len(), 1);
    assert!(std::fs::read(&reports[0])?.starts_with(b"PK"));
    Ok(())
}

#[tokio::test]
async fn export_reuses_cached_analysis() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, 1).await;
    let sandbox = Sandbox::new();

    sandbox
        .cmd_against(&server)
        .args(["analyze", "https://example.com"])
        .assert()
        .success();
    sandbox
        .cmd_against(&server)
        .args(["export", "https://example.com", "-f", "csv", "-o"])
        .arg(sandbox.data.path())
        .assert()
        .success();
    Ok(())
}

#[test]
fn export_rejects_invalid_url() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["export", "ftp://example.com", "-o"])
        .arg(sandbox.data.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a valid URL"));
    assert!(reports_in(sandbox.data.path(), ".xlsx").is_empty());
}
