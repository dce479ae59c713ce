// Core data models for SQLi Sentinel
// Targets, scan configurations, scan results and vulnerabilities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScanError;

/// Minimum and maximum delay between probes, in milliseconds
pub const MIN_REQUEST_DELAY_MS: u64 = 100;
pub const MAX_REQUEST_DELAY_MS: u64 = 10_000;

/// A web endpoint registered for testing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: u64,
    pub url: String,
    pub auth_token: Option<String>,
    /// Raw query-string-like text, e.g. `id=1&name=bob`
    pub test_parameters: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a target
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTarget {
    pub url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub test_parameters: Option<String>,
}

impl NewTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_test_parameters(mut self, params: impl Into<String>) -> Self {
        self.test_parameters = Some(params.into());
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// The URL must be absolute and use http or https.
    pub fn validate(&self) -> Result<(), ScanError> {
        let parsed = url::Url::parse(self.url.trim())
            .map_err(|e| ScanError::Validation(format!("invalid url '{}': {}", self.url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ScanError::Validation(format!(
                "unsupported url scheme '{}', expected http or https",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    Low,
    Medium,
    High,
}

/// Settings for a single scan run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfiguration {
    pub id: u64,
    pub target_id: u64,
    pub injection_types: Vec<String>,
    pub intensity_level: IntensityLevel,
    pub request_delay: u64,
    pub follow_redirects: bool,
    pub test_cookies: bool,
    pub log_requests: bool,
}

fn default_true() -> bool {
    true
}

/// Input for starting a scan; also the body of `POST /api/scans/start`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScanConfiguration {
    pub target_id: u64,
    pub injection_types: Vec<String>,
    pub intensity_level: IntensityLevel,
    pub request_delay: u64,
    #[serde(default = "default_true")]
    pub follow_redirects: bool,
    #[serde(default)]
    pub test_cookies: bool,
    #[serde(default = "default_true")]
    pub log_requests: bool,
}

impl NewScanConfiguration {
    pub fn new(target_id: u64, injection_types: &[&str], request_delay: u64) -> Self {
        Self {
            target_id,
            injection_types: injection_types.iter().map(|t| t.to_string()).collect(),
            intensity_level: IntensityLevel::Medium,
            request_delay,
            follow_redirects: true,
            test_cookies: false,
            log_requests: true,
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.injection_types.is_empty() {
            return Err(ScanError::Validation(
                "at least one injection type is required".to_string(),
            ));
        }
        if self.injection_types.iter().any(|t| t.trim().is_empty()) {
            return Err(ScanError::Validation(
                "injection type names must not be blank".to_string(),
            ));
        }
        if !(MIN_REQUEST_DELAY_MS..=MAX_REQUEST_DELAY_MS).contains(&self.request_delay) {
            return Err(ScanError::Validation(format!(
                "requestDelay must be between {} and {} ms, got {}",
                MIN_REQUEST_DELAY_MS, MAX_REQUEST_DELAY_MS, self.request_delay
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Running,
    Completed,
    Failed,
    Stopped,
}

impl ScanStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanStatus::Running)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Running => write!(f, "running"),
            ScanStatus::Completed => write!(f, "completed"),
            ScanStatus::Failed => write!(f, "failed"),
            ScanStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Progress record of one scan run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub id: u64,
    pub target_id: u64,
    pub status: ScanStatus,
    pub progress: u8,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Partial update applied by `Storage::update_scan_result`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResultUpdate {
    pub status: Option<ScanStatus>,
    pub progress: Option<u8>,
}

impl ScanResultUpdate {
    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn status(status: ScanStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn completed() -> Self {
        Self {
            status: Some(ScanStatus::Completed),
            progress: Some(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A stored finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: u64,
    pub scan_id: u64,
    pub severity: Severity,
    /// Technique name, e.g. `error-based`
    #[serde(rename = "type")]
    pub kind: String,
    pub parameter: String,
    pub payload: String,
    pub description: String,
    pub cvss_score: Option<String>,
    /// The exact probed URL
    pub endpoint: String,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVulnerability {
    pub scan_id: u64,
    pub severity: Severity,
    pub kind: String,
    pub parameter: String,
    pub payload: String,
    pub description: String,
    pub cvss_score: Option<String>,
    pub endpoint: String,
}
