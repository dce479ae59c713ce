use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::Storage;
use crate::error::StorageError;
use crate::models::{
    NewScanConfiguration, NewTarget, NewVulnerability, ScanConfiguration, ScanResult,
    ScanResultUpdate, ScanStatus, Target, Vulnerability,
};

#[derive(Default)]
struct Tables {
    targets: BTreeMap<u64, Target>,
    configurations: BTreeMap<u64, ScanConfiguration>,
    results: BTreeMap<u64, ScanResult>,
    vulnerabilities: BTreeMap<u64, Vulnerability>,
    last_target_id: u64,
    last_configuration_id: u64,
    last_result_id: u64,
    last_vulnerability_id: u64,
}

/// Process-local storage. Ids start at 1 and increase per table.
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_target(&self, target: NewTarget) -> Result<Target, StorageError> {
        let mut tables = self.tables.write().await;
        tables.last_target_id += 1;
        let created = Target {
            id: tables.last_target_id,
            url: target.url,
            auth_token: target.auth_token,
            test_parameters: target.test_parameters,
            created_at: Utc::now(),
        };
        tables.targets.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_target(&self, id: u64) -> Result<Option<Target>, StorageError> {
        Ok(self.tables.read().await.targets.get(&id).cloned())
    }

    async fn list_targets(&self) -> Result<Vec<Target>, StorageError> {
        Ok(self.tables.read().await.targets.values().cloned().collect())
    }

    async fn create_scan_configuration(
        &self,
        config: NewScanConfiguration,
    ) -> Result<ScanConfiguration, StorageError> {
        let mut tables = self.tables.write().await;
        tables.last_configuration_id += 1;
        let created = ScanConfiguration {
            id: tables.last_configuration_id,
            target_id: config.target_id,
            injection_types: config.injection_types,
            intensity_level: config.intensity_level,
            request_delay: config.request_delay,
            follow_redirects: config.follow_redirects,
            test_cookies: config.test_cookies,
            log_requests: config.log_requests,
        };
        tables.configurations.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_scan_configuration(
        &self,
        target_id: u64,
    ) -> Result<Option<ScanConfiguration>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .configurations
            .values()
            .rev()
            .find(|c| c.target_id == target_id)
            .cloned())
    }

    async fn create_scan_result(&self, target_id: u64) -> Result<ScanResult, StorageError> {
        let mut tables = self.tables.write().await;
        tables.last_result_id += 1;
        let created = ScanResult {
            id: tables.last_result_id,
            target_id,
            status: ScanStatus::Running,
            progress: 0,
            started_at: Utc::now(),
            completed_at: None,
        };
        tables.results.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_scan_result(&self, id: u64) -> Result<Option<ScanResult>, StorageError> {
        Ok(self.tables.read().await.results.get(&id).cloned())
    }

    async fn get_scan_result_by_target_id(
        &self,
        target_id: u64,
    ) -> Result<Option<ScanResult>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .results
            .values()
            .rev()
            .find(|r| r.target_id == target_id)
            .cloned())
    }

    async fn update_scan_result(
        &self,
        id: u64,
        update: ScanResultUpdate,
    ) -> Result<ScanResult, StorageError> {
        let mut tables = self.tables.write().await;
        let result = tables
            .results
            .get_mut(&id)
            .ok_or(StorageError::NotFound { entity: "scan result", id })?;

        if let Some(progress) = update.progress {
            result.progress = progress.min(100);
        }
        if let Some(status) = update.status {
            result.status = status;
            if status == ScanStatus::Completed {
                result.completed_at = Some(Utc::now());
            }
        }
        Ok(result.clone())
    }

    async fn list_scan_results(&self) -> Result<Vec<ScanResult>, StorageError> {
        Ok(self.tables.read().await.results.values().cloned().collect())
    }

    async fn create_vulnerability(
        &self,
        vulnerability: NewVulnerability,
    ) -> Result<Vulnerability, StorageError> {
        let mut tables = self.tables.write().await;
        tables.last_vulnerability_id += 1;
        let created = Vulnerability {
            id: tables.last_vulnerability_id,
            scan_id: vulnerability.scan_id,
            severity: vulnerability.severity,
            kind: vulnerability.kind,
            parameter: vulnerability.parameter,
            payload: vulnerability.payload,
            description: vulnerability.description,
            cvss_score: vulnerability.cvss_score,
            endpoint: vulnerability.endpoint,
            detected_at: Utc::now(),
        };
        tables.vulnerabilities.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_vulnerabilities_by_scan(
        &self,
        scan_id: u64,
    ) -> Result<Vec<Vulnerability>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .vulnerabilities
            .values()
            .filter(|v| v.scan_id == scan_id)
            .cloned()
            .collect())
    }

    async fn list_all_vulnerabilities(&self) -> Result<Vec<Vulnerability>, StorageError> {
        Ok(self.tables.read().await.vulnerabilities.values().cloned().collect())
    }
}
