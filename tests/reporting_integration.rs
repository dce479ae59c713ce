use sqli_sentinel::models::{NewTarget, NewVulnerability, ScanResultUpdate, ScanStatus, Severity};
use sqli_sentinel::reporting::{dashboard_stats, export_report};
use sqli_sentinel::{MemoryStorage, NewScanConfiguration, ScanError, Storage};

fn finding(scan_id: u64, severity: Severity) -> NewVulnerability {
    NewVulnerability {
        scan_id,
        severity,
        kind: "union-based".to_string(),
        parameter: "id".to_string(),
        payload: "' UNION SELECT NULL--".to_string(),
        description: "Potential union-based SQL injection".to_string(),
        cvss_score: Some("9.1".to_string()),
        endpoint: "http://shop.test/?id=x".to_string(),
    }
}

#[tokio::test]
async fn report_summary_matches_manual_tally() {
    let storage = MemoryStorage::new();
    let target = storage.create_target(NewTarget::new("http://shop.test/")).await.unwrap();
    storage
        .create_scan_configuration(NewScanConfiguration::new(target.id, &["union-based"], 500))
        .await
        .unwrap();
    let scan = storage.create_scan_result(target.id).await.unwrap();
    let other = storage.create_scan_result(target.id).await.unwrap();

    let severities = [
        Severity::Critical,
        Severity::High,
        Severity::Critical,
        Severity::Medium,
        Severity::Low,
        Severity::High,
        Severity::Critical,
    ];
    for severity in severities {
        storage.create_vulnerability(finding(scan.id, severity)).await.unwrap();
    }
    // Belongs to another scan and must not be counted
    storage.create_vulnerability(finding(other.id, Severity::Critical)).await.unwrap();

    let report = export_report(&storage, scan.id).await.unwrap();
    let count = |s: Severity| severities.iter().filter(|v| **v == s).count();
    assert_eq!(report.summary.total, severities.len());
    assert_eq!(report.summary.critical, count(Severity::Critical));
    assert_eq!(report.summary.high, count(Severity::High));
    assert_eq!(report.summary.medium, count(Severity::Medium));
    assert_eq!(report.summary.low, count(Severity::Low));
    assert_eq!(report.summary.info, 0);
    assert_eq!(report.vulnerabilities.len(), severities.len());
    assert_eq!(report.target.as_ref().map(|t| t.id), Some(target.id));
    assert_eq!(
        report.configuration.as_ref().map(|c| c.injection_types.clone()),
        Some(vec!["union-based".to_string()])
    );

    let json = serde_json::to_value(&report).unwrap();
    for key in ["scan", "target", "configuration", "vulnerabilities", "summary", "generatedAt"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
}

#[tokio::test]
async fn report_for_unknown_scan() {
    let storage = MemoryStorage::new();
    assert!(matches!(export_report(&storage, 3).await, Err(ScanError::NotFound(_))));
}

#[tokio::test]
async fn dashboard_reads_storage() {
    let storage = MemoryStorage::new();
    let done = storage.create_scan_result(1).await.unwrap();
    storage.update_scan_result(done.id, ScanResultUpdate::completed()).await.unwrap();
    let failed = storage.create_scan_result(2).await.unwrap();
    storage
        .update_scan_result(failed.id, ScanResultUpdate::status(ScanStatus::Failed))
        .await
        .unwrap();
    storage.create_scan_result(3).await.unwrap();
    storage.create_vulnerability(finding(done.id, Severity::Info)).await.unwrap();

    let stats = dashboard_stats(&storage).await.unwrap();
    assert_eq!(stats.total_scans, 3);
    assert_eq!(stats.completed_scans, 1);
    assert_eq!(stats.failed_scans, 1);
    assert_eq!(stats.running_scans, 1);
    assert_eq!(stats.info_vulns, 1);
}
