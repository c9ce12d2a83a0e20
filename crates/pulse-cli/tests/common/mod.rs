#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// A minimal but realistic PageSpeed Insights envelope.
pub const REPORT: &str = r#"{
    "id": "https://example.com/",
    "lighthouseResult": {
        "finalUrl": "https://example.com/",
        "fetchTime": "2024-05-01T10:00:00.000Z",
        "categories": {
            "performance": {"title": "Performance", "score": 0.95},
            "accessibility": {"title": "Accessibility", "score": 0.85},
            "best-practices": {"title": "Best Practices", "score": 0.92},
            "seo": {"title": "SEO", "score": 0.99}
        },
        "audits": {
            "first-contentful-paint": {"title": "First Contentful Paint", "description": "First Contentful Paint marks the time at which the first text or image is painted.", "score": 0.97, "displayValue": "1.2 s"},
            "color-contrast": {"title": "Background and foreground colors have a sufficient contrast ratio", "description": "Low-contrast text is difficult or impossible for many users to read.", "score": 0},
            "screenshot-thumbnails": {"title": "Screenshot Thumbnails", "description": "This is what the load of your site looked like.", "score": null}
        },
        "fullPageScreenshot": {
            "screenshot": {"data": "data:image/webp;base64,UElORw==", "width": 412, "height": 900}
        }
    },
    "loadingExperience": {
        "overall_category": "FAST",
        "metrics": {
            "LARGEST_CONTENTFUL_PAINT_MS": {"percentile": 1800, "category": "FAST"}
        }
    }
}"#;

/// Isolated data and config directories for one test.
pub struct Sandbox {
    pub data: TempDir,
    pub config: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            data: tempfile::tempdir().expect("failed to create data dir for tests"),
            config: tempfile::tempdir().expect("failed to create config dir for tests"),
        }
    }

    /// A `pulse` command that only touches this sandbox.
    pub fn cmd(&self) -> Command {
        pulse_cmd_with_dirs(self.data.path(), self.config.path())
    }

    /// A `pulse` command pointed at a mock endpoint.
    pub fn cmd_against(&self, server: &MockServer) -> Command {
        let mut cmd = self.cmd();
        cmd.env("PULSE_ENDPOINT", endpoint(server));
        cmd
    }

    pub fn cache_dir(&self) -> std::path::PathBuf {
        self.data.path().join("cache")
    }

    pub fn write_config(&self, toml: &str) {
        std::fs::write(self.config.path().join("config.toml"), toml).unwrap();
    }
}

pub fn pulse_cmd_with_dirs(data_dir: &Path, config_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pulse"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("PULSE_DATA_DIR", data_dir);
    cmd.env("PULSE_CONFIG_DIR", config_dir);
    cmd.env_remove("PULSE_API_KEY");
    cmd.env_remove("PULSE_ENDPOINT");
    cmd.env("NO_COLOR", "1");
    cmd
}

pub fn endpoint(server: &MockServer) -> String {
    format!("{}/runPagespeed", server.uri())
}

/// Serve [`REPORT`] for every analysis request, expecting exactly `times` calls.
pub async fn mount_report(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/runPagespeed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REPORT))
        .expect(times)
        .mount(server)
        .await;
}

pub fn entry_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, |entries| {
        entries
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("kv_"))
            .count()
    })
}
