//! Shared fixtures for the integration tests
//!
//! `FixtureCloner` stands in for a real clone by writing a small Go tree
//! into the destination; `RecordingReporter` keeps every report it receives.

#![allow(dead_code)]

use async_trait::async_trait;
use depweight::fetcher::{CloneError, CloneStatus, Cloner, FetchConfig};
use depweight::reporter::{ReportError, Reporter, ScanReport};
use depweight::service::ServiceConfig;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

pub const MAIN_GO: &str = "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n\n\t\"github.com/foae/dimago/util\"\n)\n\nfunc main() {\n\tfmt.Println(util.Name(), os.Args)\n}\n";

pub const UTIL_GO: &str = "package util\n\nimport (\n\t\"fmt\"\n\t\"strings\"\n)\n\nfunc Name() string { return strings.ToUpper(fmt.Sprint(\"x\")) }\n";

pub const UTIL_TEST_GO: &str = "package util\n\nimport (\n\t\"testing\"\n)\n";

/// Writes a fixed Go project into every clone destination
pub struct FixtureCloner {
    files: Vec<(String, String)>,
    pub urls: Mutex<Vec<String>>,
}

impl FixtureCloner {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(path, contents)| (path.to_string(), contents.to_string()))
                .collect(),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// `cmd/main.go`, `util/util.go` and an ignored test file
    pub fn go_project() -> Self {
        Self::new(&[
            ("cmd/main.go", MAIN_GO),
            ("util/util.go", UTIL_GO),
            ("util/util_test.go", UTIL_TEST_GO),
        ])
    }
}

#[async_trait]
impl Cloner for FixtureCloner {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<CloneStatus, CloneError> {
        self.urls.lock().unwrap().push(url.to_string());
        for (relative, contents) in &self.files {
            let path = dest.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
        Ok(CloneStatus::Cloned)
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub reports: Mutex<Vec<ScanReport>>,
}

#[async_trait]
impl Reporter for RecordingReporter {
    fn name(&self) -> &str {
        "recording"
    }

    async fn emit(&self, report: &ScanReport) -> Result<(), ReportError> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}

pub fn service_config(staging: &Path) -> ServiceConfig {
    ServiceConfig {
        fetch: FetchConfig {
            staging_dir: staging.to_path_buf(),
            ..FetchConfig::default()
        },
        ..ServiceConfig::default()
    }
}
