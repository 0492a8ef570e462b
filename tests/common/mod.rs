//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use htmlclones::{FetchError, PipelineConfig, StylesheetFetcher};
use url::Url;

/// Write `files` into `dir/<name>`, creating the directory first.
pub fn write_site(dir: &Path, files: &[(&str, &str)]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    for (name, html) in files {
        fs::write(dir.join(name), html).unwrap();
    }
    dir.to_path_buf()
}

/// Offline defaults: no network, small pool.
pub fn offline_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_fetch_external_styles(false)
        .with_workers(2)
}

pub fn page(body: &str) -> String {
    format!("<html><body>{body}</body></html>")
}

/// In-memory stylesheet source; unknown URLs answer 404.
#[derive(Default)]
pub struct MapFetcher {
    sheets: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn with(mut self, url: &str, css: &str) -> Self {
        self.sheets.insert(url.to_string(), css.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        let mut seen = self.requests.lock().unwrap().clone();
        seen.sort();
        seen
    }
}

impl StylesheetFetcher for MapFetcher {
    fn fetch(&self, url: &Url, _referer: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.sheets
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Every request fails as if the network were down.
pub struct FailingFetcher;

impl StylesheetFetcher for FailingFetcher {
    fn fetch(&self, url: &Url, _referer: &str) -> Result<String, FetchError> {
        Err(FetchError::Request {
            url: url.to_string(),
            reason: "connection refused".into(),
        })
    }
}
