use std::sync::Arc;

use crate::scanner::ScanOrchestrator;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ScanOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<ScanOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.orchestrator.storage().as_ref()
    }
}
