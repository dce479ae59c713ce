// Reporting for SQLi Sentinel
// Dashboard aggregates and the JSON report composite for one scan

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ScanError;
use crate::models::{ScanConfiguration, ScanResult, ScanStatus, Severity, Target, Vulnerability};
use crate::storage::Storage;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_scans: usize,
    pub running_scans: usize,
    pub completed_scans: usize,
    pub failed_scans: usize,
    pub stopped_scans: usize,
    pub critical_vulns: usize,
    pub high_vulns: usize,
    pub medium_vulns: usize,
    pub low_vulns: usize,
    pub info_vulns: usize,
}

impl DashboardStats {
    pub fn tally(results: &[ScanResult], vulnerabilities: &[Vulnerability]) -> Self {
        let by_status = |status: ScanStatus| results.iter().filter(|r| r.status == status).count();
        let summary = SeveritySummary::tally(vulnerabilities);
        Self {
            total_scans: results.len(),
            running_scans: by_status(ScanStatus::Running),
            completed_scans: by_status(ScanStatus::Completed),
            failed_scans: by_status(ScanStatus::Failed),
            stopped_scans: by_status(ScanStatus::Stopped),
            critical_vulns: summary.critical,
            high_vulns: summary.high,
            medium_vulns: summary.medium,
            low_vulns: summary.low,
            info_vulns: summary.info,
        }
    }
}

/// Finding counts per severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeveritySummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeveritySummary {
    pub fn tally(vulnerabilities: &[Vulnerability]) -> Self {
        let mut summary = Self {
            total: vulnerabilities.len(),
            ..Self::default()
        };
        for vuln in vulnerabilities {
            match vuln.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub scan: ScanResult,
    pub target: Option<Target>,
    pub configuration: Option<ScanConfiguration>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub summary: SeveritySummary,
    pub generated_at: DateTime<Utc>,
}

pub async fn dashboard_stats(storage: &dyn Storage) -> Result<DashboardStats, ScanError> {
    let results = storage.list_scan_results().await?;
    let vulnerabilities = storage.list_all_vulnerabilities().await?;
    Ok(DashboardStats::tally(&results, &vulnerabilities))
}

/// Assemble the export for one scan. The configuration is the latest one
/// recorded for the scan's target.
pub async fn export_report(storage: &dyn Storage, scan_id: u64) -> Result<ScanReport, ScanError> {
    let scan = storage
        .get_scan_result(scan_id)
        .await?
        .ok_or_else(|| ScanError::NotFound(format!("scan {}", scan_id)))?;
    let vulnerabilities = storage.list_vulnerabilities_by_scan(scan_id).await?;
    let target = storage.get_target(scan.target_id).await?;
    let configuration = storage.get_scan_configuration(scan.target_id).await?;

    Ok(ScanReport {
        summary: SeveritySummary::tally(&vulnerabilities),
        scan,
        target,
        configuration,
        vulnerabilities,
        generated_at: Utc::now(),
    })
}
