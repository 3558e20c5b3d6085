use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

/// Checked in order; the first non-empty, parseable value wins.
pub const API_URL_ENV_VARS: [&str; 3] = ["NEXT_PUBLIC_API_URL", "CATALOG_API_URL", "APP__API_URL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailEndpoint {
    #[default]
    Root,
    Users,
}

impl DetailEndpoint {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "root" | "/" => Some(Self::Root),
            "users" | "/users" => Some(Self::Users),
            _ => None,
        }
    }
}

/// Immutable controller configuration, built once and handed to every
/// controller at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: Option<Url>,
    pub page_size: u32,
    pub debounce: Duration,
    pub feedback_ttl: Duration,
    pub detail_endpoint: DetailEndpoint,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            page_size: 20,
            debounce: Duration::from_millis(500),
            feedback_ttl: Duration::from_millis(2000),
            detail_endpoint: DetailEndpoint::Root,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_url: Option<String>,
    page_size: Option<u32>,
    debounce_ms: Option<u64>,
    feedback_ttl_ms: Option<u64>,
    detail_endpoint: Option<String>,
    request_timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn with_base_url(mut self, raw: &str) -> Self {
        self.base_url = parse_base_url(raw);
        self
    }

    /// Defaults, then `catalog.toml` in the working directory, then the
    /// process environment.
    pub fn load() -> Self {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        let raw = fs::read_to_string(path).ok();
        Self::from_sources(raw.as_deref(), |name| std::env::var(name).ok())
    }

    pub fn from_sources(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = file {
            match toml::from_str::<FileConfig>(raw) {
                Ok(file_cfg) => config.apply_file(file_cfg),
                Err(err) => tracing::warn!(error = %err, "ignoring malformed config file"),
            }
        }

        if let Some(url) = API_URL_ENV_VARS
            .iter()
            .filter_map(|name| env(name))
            .find_map(|raw| parse_base_url(&raw))
        {
            config.base_url = Some(url);
        }
        if let Some(v) = env("APP__PAGE_SIZE").and_then(|v| v.trim().parse::<u32>().ok()) {
            if v > 0 {
                config.page_size = v;
            }
        }
        if let Some(v) = env("APP__DEBOUNCE_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
            config.debounce = Duration::from_millis(v);
        }

        config
    }

    fn apply_file(&mut self, file_cfg: FileConfig) {
        if let Some(url) = file_cfg.api_url.as_deref().and_then(parse_base_url) {
            self.base_url = Some(url);
        }
        if let Some(v) = file_cfg.page_size.filter(|v| *v > 0) {
            self.page_size = v;
        }
        if let Some(v) = file_cfg.debounce_ms {
            self.debounce = Duration::from_millis(v);
        }
        if let Some(v) = file_cfg.feedback_ttl_ms {
            self.feedback_ttl = Duration::from_millis(v);
        }
        if let Some(v) = file_cfg.detail_endpoint.as_deref().and_then(DetailEndpoint::parse) {
            self.detail_endpoint = v;
        }
        if let Some(v) = file_cfg.request_timeout_ms.filter(|v| *v > 0) {
            self.request_timeout = Duration::from_millis(v);
        }
    }
}

pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ClientError::ConfigMissing)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse_base_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let url = Url::parse(raw).ok()?;
    let supported = matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base();
    supported.then_some(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
