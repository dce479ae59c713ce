pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod params;
pub mod payloads;
pub mod reporting;
pub mod response_analysis;
pub mod scanner;
pub mod server;
pub mod severity;
pub mod storage;

// Re-export commonly used items
pub use config::Config;
pub use engine::{Probe, ProbeEngine, ProbeOutcome};
pub use error::{ScanError, StorageError};
pub use models::*;
pub use payloads::{Payload, PayloadCatalog};
pub use response_analysis::{analyze, Finding};
pub use scanner::ScanOrchestrator;
pub use severity::{classify, cvss_score};
pub use storage::{MemoryStorage, Storage};
