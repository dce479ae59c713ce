// Scan orchestration for SQLi Sentinel
//
// One background task per active scan, tracked in a registry keyed by
// target id. Tasks walk techniques → payloads → parameters strictly in
// order, probing, analyzing and persisting findings, with a delay after
// every probe. Cancellation is cooperative and checked before each probe.

pub mod cancel;

pub use cancel::{CancelToken, RunState};

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::auth;
use crate::engine::{ProbeEngine, ProbeOptions, ProbeOutcome};
use crate::error::ScanError;
use crate::models::{
    NewScanConfiguration, NewVulnerability, ScanConfiguration, ScanResult, ScanResultUpdate,
    ScanStatus, Target,
};
use crate::params::resolve_test_parameters;
use crate::payloads::{Payload, PayloadCatalog};
use crate::response_analysis::{analyze, Finding};
use crate::severity::classify;
use crate::storage::Storage;

/// Registry entry for a scan in flight
struct ActiveScan {
    scan_id: u64,
    token: CancelToken,
    handle: Option<JoinHandle<()>>,
}

type Registry = Arc<DashMap<u64, ActiveScan>>;

pub struct ScanOrchestrator {
    storage: Arc<dyn Storage>,
    engine: Arc<ProbeEngine>,
    catalog: Arc<PayloadCatalog>,
    active: Registry,
    /// Serializes admission so two starts cannot both pass the registry check
    admission: Mutex<()>,
}

impl ScanOrchestrator {
    pub fn new(storage: Arc<dyn Storage>, engine: ProbeEngine, catalog: PayloadCatalog) -> Self {
        Self {
            storage,
            engine: Arc::new(engine),
            catalog: Arc::new(catalog),
            active: Arc::new(DashMap::new()),
            admission: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn catalog(&self) -> &PayloadCatalog {
        &self.catalog
    }

    pub fn active_scans(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, target_id: u64) -> bool {
        self.active.contains_key(&target_id)
    }

    /// Persist the configuration and a running result, then launch the scan
    /// task. Returns as soon as the task is spawned.
    pub async fn start_scan(
        &self,
        target_id: u64,
        config: NewScanConfiguration,
    ) -> Result<ScanResult, ScanError> {
        config.validate()?;
        let target = self
            .storage
            .get_target(target_id)
            .await?
            .ok_or_else(|| ScanError::target_not_found(target_id))?;

        let _admission = self.admission.lock().await;
        if self.active.contains_key(&target_id) {
            return Err(ScanError::AlreadyRunning(target_id));
        }

        for technique in &config.injection_types {
            if !self.catalog.contains(technique) {
                warn!(target_id, technique = %technique, "technique has no catalog entry, it will be skipped");
            }
        }

        let configuration = self
            .storage
            .create_scan_configuration(NewScanConfiguration { target_id, ..config })
            .await?;
        let result = self.storage.create_scan_result(target_id).await?;

        let token = CancelToken::new();
        self.active.insert(
            target_id,
            ActiveScan {
                scan_id: result.id,
                token: token.clone(),
                handle: None,
            },
        );

        let run = ScanRun {
            storage: self.storage.clone(),
            engine: self.engine.clone(),
            catalog: self.catalog.clone(),
            active: self.active.clone(),
            target,
            configuration,
            scan_id: result.id,
            token,
        };
        let handle = tokio::spawn(run.execute());

        // The task may already have finished and deregistered itself.
        if let Some(mut entry) = self.active.get_mut(&target_id) {
            if entry.scan_id == result.id {
                entry.handle = Some(handle);
            }
        }

        info!(target_id, scan_id = result.id, "scan started");
        Ok(result)
    }

    /// Cancel the active scan for a target and mark it stopped. If the write
    /// fails the scan stays registered and the call can be repeated.
    pub async fn stop_scan(&self, target_id: u64) -> Result<ScanResult, ScanError> {
        let (result, _handle) = self.stop_inner(target_id).await?;
        Ok(result)
    }

    /// Stop every active scan and wait for the tasks to exit.
    pub async fn shutdown(&self) {
        let targets: Vec<u64> = self.active.iter().map(|entry| *entry.key()).collect();
        if !targets.is_empty() {
            info!(count = targets.len(), "stopping active scans");
        }

        for target_id in targets {
            match self.stop_inner(target_id).await {
                Ok((_, Some(handle))) => {
                    if let Err(e) = handle.await {
                        error!(target_id, error = %e, "scan task did not exit cleanly");
                    }
                }
                Ok((_, None)) => {}
                Err(ScanError::NotFound(_)) => debug!(target_id, "scan ended before shutdown reached it"),
                Err(e) => error!(target_id, error = %e, "failed to stop scan during shutdown"),
            }
        }
    }

    async fn stop_inner(
        &self,
        target_id: u64,
    ) -> Result<(ScanResult, Option<JoinHandle<()>>), ScanError> {
        let not_active = || ScanError::NotFound(format!("active scan for target {}", target_id));

        let (scan_id, token) = self
            .active
            .get(&target_id)
            .map(|entry| (entry.scan_id, entry.token.clone()))
            .ok_or_else(not_active)?;

        let guard = token
            .transition(RunState::Cancelled)
            .await
            .ok_or_else(not_active)?;
        // Another stop may have settled this scan while we waited for the lock
        if !self.is_registered(target_id, scan_id) {
            return Err(not_active());
        }

        // On failure the entry stays, so the row is never left running unowned
        let updated = self
            .storage
            .update_scan_result(scan_id, ScanResultUpdate::status(ScanStatus::Stopped))
            .await?;

        let handle = self
            .active
            .remove_if(&target_id, |_, entry| entry.scan_id == scan_id)
            .and_then(|(_, mut entry)| entry.handle.take());
        drop(guard);

        info!(target_id, scan_id, progress = updated.progress, "scan stopped");
        Ok((updated, handle))
    }

    fn is_registered(&self, target_id: u64, scan_id: u64) -> bool {
        self.active
            .get(&target_id)
            .map_or(false, |entry| entry.scan_id == scan_id)
    }
}

enum LoopExit {
    Exhausted,
    Cancelled,
}

/// Everything one scan task owns
struct ScanRun {
    storage: Arc<dyn Storage>,
    engine: Arc<ProbeEngine>,
    catalog: Arc<PayloadCatalog>,
    active: Registry,
    target: Target,
    configuration: ScanConfiguration,
    scan_id: u64,
    token: CancelToken,
}

impl ScanRun {
    async fn execute(self) {
        match self.run().await {
            Ok(LoopExit::Exhausted) => {
                if self.finish(ScanResultUpdate::completed()).await {
                    info!(target_id = self.target.id, scan_id = self.scan_id, "scan completed");
                }
            }
            Ok(LoopExit::Cancelled) => {
                debug!(target_id = self.target.id, scan_id = self.scan_id, "scan task observed cancellation");
            }
            Err(e) => {
                error!(target_id = self.target.id, scan_id = self.scan_id, error = %e, "scan failed");
                self.finish(ScanResultUpdate::status(ScanStatus::Failed)).await;
            }
        }
    }

    async fn run(&self) -> Result<LoopExit, ScanError> {
        let techniques = &self.configuration.injection_types;
        let total = techniques.len();
        let parameters = resolve_test_parameters(self.target.test_parameters.as_deref());
        let auth = auth::strategy_for(self.target.auth_token.as_deref());
        let options = ProbeOptions {
            follow_redirects: self.configuration.follow_redirects,
            send_cookie: self.configuration.test_cookies,
            auth: auth.as_ref(),
        };
        let delay = Duration::from_millis(self.configuration.request_delay);

        for (index, technique) in techniques.iter().enumerate() {
            let progress = (index * 100 / total) as u8;
            if !self.persist_progress(progress).await? {
                return Ok(LoopExit::Cancelled);
            }
            debug!(scan_id = self.scan_id, technique = %technique, progress, "testing technique");

            for payload in self.catalog.get(technique) {
                for (parameter, _) in &parameters {
                    if self.token.is_cancelled() {
                        return Ok(LoopExit::Cancelled);
                    }

                    let probe = self
                        .engine
                        .probe_with(&self.target.url, parameter, &payload.payload, &options)
                        .await?;
                    self.log_probe(technique, parameter, &probe.url, &probe.outcome);

                    let finding = analyze(technique, &probe.outcome, parameter, &probe.url, &payload.payload);
                    if let Some(finding) = &finding {
                        if !self.persist_finding(technique, payload, finding).await? {
                            return Ok(LoopExit::Cancelled);
                        }
                    }

                    self.pause(delay).await;

                    if finding.is_some() {
                        break;
                    }
                }
            }
        }

        Ok(LoopExit::Exhausted)
    }

    /// `Ok(false)` when the scan was cancelled before the write.
    async fn persist_progress(&self, progress: u8) -> Result<bool, ScanError> {
        let Some(_live) = self.token.live().await else {
            return Ok(false);
        };
        self.storage
            .update_scan_result(self.scan_id, ScanResultUpdate::progress(progress))
            .await?;
        Ok(true)
    }

    async fn persist_finding(
        &self,
        technique: &str,
        payload: &Payload,
        finding: &Finding,
    ) -> Result<bool, ScanError> {
        let Some(_live) = self.token.live().await else {
            return Ok(false);
        };
        let (severity, _) = classify(technique, &finding.description);
        let vulnerability = self
            .storage
            .create_vulnerability(NewVulnerability {
                scan_id: self.scan_id,
                severity,
                kind: technique.to_string(),
                parameter: finding.parameter.clone(),
                payload: payload.payload.clone(),
                description: finding.description.clone(),
                cvss_score: Some(finding.cvss_score.clone()),
                endpoint: finding.endpoint.clone(),
            })
            .await?;
        info!(
            scan_id = self.scan_id,
            vulnerability_id = vulnerability.id,
            severity = %severity,
            technique,
            parameter = %finding.parameter,
            "vulnerability detected"
        );
        Ok(true)
    }

    /// Rate-limit delay; cut short when the scan is cancelled.
    async fn pause(&self, delay: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = self.token.cancelled() => {}
        }
    }

    fn log_probe(&self, technique: &str, parameter: &str, url: &str, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Response { status, body } => {
                if self.configuration.log_requests {
                    info!(scan_id = self.scan_id, technique, parameter, url, status, bytes = body.len(), "probe");
                } else {
                    debug!(scan_id = self.scan_id, technique, parameter, url, status, bytes = body.len(), "probe");
                }
            }
            ProbeOutcome::NetworkFailure { reason } => {
                warn!(scan_id = self.scan_id, technique, parameter, url, reason = %reason, "probe failed");
            }
        }
    }

    /// Write the terminal state and leave the registry, unless a stop got
    /// there first. A failed completion write falls back to `failed`; if that
    /// fails too the entry is left cancelled for `stop_scan` to settle.
    /// Returns whether `update` itself was persisted.
    async fn finish(&self, update: ScanResultUpdate) -> bool {
        let Some(mut guard) = self.token.transition(RunState::Finished).await else {
            return false;
        };

        let can_fall_back = update.status != Some(ScanStatus::Failed);
        let mut persisted = true;
        let written = match self.storage.update_scan_result(self.scan_id, update).await {
            Err(e) if can_fall_back => {
                error!(scan_id = self.scan_id, error = %e, "failed to persist final scan state, marking failed");
                persisted = false;
                self.storage
                    .update_scan_result(self.scan_id, ScanResultUpdate::status(ScanStatus::Failed))
                    .await
            }
            other => other,
        };
        if let Err(e) = written {
            error!(
                target_id = self.target.id,
                scan_id = self.scan_id,
                error = %e,
                "scan result still marked running, target stays registered until stopped"
            );
            *guard = RunState::Cancelled;
            return false;
        }

        self.active
            .remove_if(&self.target.id, |_, entry| entry.scan_id == self.scan_id);
        drop(guard);
        persisted
    }
}
