// Storage interface consumed by the scan engine
//
// memory.rs holds the in-process implementation used by the server binary.
// Other backends only need to implement `Storage`.

pub mod memory;

pub use memory::MemoryStorage;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{
    NewScanConfiguration, NewTarget, NewVulnerability, ScanConfiguration, ScanResult,
    ScanResultUpdate, Target, Vulnerability,
};

#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_target(&self, target: NewTarget) -> Result<Target, StorageError>;
    async fn get_target(&self, id: u64) -> Result<Option<Target>, StorageError>;
    async fn list_targets(&self) -> Result<Vec<Target>, StorageError>;

    async fn create_scan_configuration(
        &self,
        config: NewScanConfiguration,
    ) -> Result<ScanConfiguration, StorageError>;
    /// Most recent configuration created for the target
    async fn get_scan_configuration(
        &self,
        target_id: u64,
    ) -> Result<Option<ScanConfiguration>, StorageError>;

    /// Creates a running result with progress 0
    async fn create_scan_result(&self, target_id: u64) -> Result<ScanResult, StorageError>;
    async fn get_scan_result(&self, id: u64) -> Result<Option<ScanResult>, StorageError>;
    /// Most recent result for the target
    async fn get_scan_result_by_target_id(
        &self,
        target_id: u64,
    ) -> Result<Option<ScanResult>, StorageError>;
    /// Applies the set fields; stamps `completed_at` when the status becomes completed.
    async fn update_scan_result(
        &self,
        id: u64,
        update: ScanResultUpdate,
    ) -> Result<ScanResult, StorageError>;
    async fn list_scan_results(&self) -> Result<Vec<ScanResult>, StorageError>;

    async fn create_vulnerability(
        &self,
        vulnerability: NewVulnerability,
    ) -> Result<Vulnerability, StorageError>;
    async fn list_vulnerabilities_by_scan(
        &self,
        scan_id: u64,
    ) -> Result<Vec<Vulnerability>, StorageError>;
    async fn list_all_vulnerabilities(&self) -> Result<Vec<Vulnerability>, StorageError>;
}
