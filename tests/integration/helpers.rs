//! Shared fixtures for integration tests

use anyhow::{bail, Result};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

use verity::models::{
    ReportMetadata, StoredReport, VerificationDetail, VerificationResult, VerificationWarning,
};
use verity::report::ReportGenerator;
use verity::storage::ReportStorage;
use verity::verify::Verifier;

/// Storage rooted in a fresh temp dir; keep the `TempDir` alive for the test
pub fn temp_storage(max_reports: usize) -> (TempDir, ReportStorage) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let storage = ReportStorage::new(temp.path().join("reports-store"), max_reports);
    storage.initialize().expect("Failed to initialize storage");
    (temp, storage)
}

pub fn passing(module: &str) -> VerificationResult {
    VerificationResult::from_details(
        module,
        vec![VerificationDetail::pass(module, "reachable", "ok")],
    )
}

pub fn failing(module: &str) -> VerificationResult {
    let mut result = VerificationResult::from_details(
        module,
        vec![VerificationDetail::fail(module, "reachable", "connection refused")],
    );
    result.errors.push("connection refused".to_string());
    result
}

pub fn warning(module: &str) -> VerificationResult {
    let mut result = VerificationResult::from_details(
        module,
        vec![VerificationDetail::warning(module, "latency", "slow response")],
    );
    result.warnings.push(VerificationWarning::new("slow response"));
    result
}

/// Generate and store a report for `results` through the generator
pub fn store(storage: &ReportStorage, results: &[VerificationResult]) -> StoredReport {
    let generator = ReportGenerator::new(None);
    let report = generator.build_report(results, true);
    storage
        .store_report(&report, ReportMetadata::default())
        .expect("Failed to store report")
}

/// Verifier returning a fixed result
pub struct FixedVerifier {
    pub name: String,
    pub result: VerificationResult,
}

impl FixedVerifier {
    pub fn new(result: VerificationResult) -> Self {
        Self {
            name: result.module.clone(),
            result,
        }
    }
}

impl Verifier for FixedVerifier {
    fn module_name(&self) -> &str {
        &self.name
    }

    fn verify(&self) -> Result<VerificationResult> {
        Ok(self.result.clone())
    }
}

/// Verifier whose `verify` returns an error
pub struct ErroringVerifier(pub &'static str);

impl Verifier for ErroringVerifier {
    fn module_name(&self) -> &str {
        self.0
    }

    fn verify(&self) -> Result<VerificationResult> {
        bail!("database connection lost")
    }
}

/// Verifier that panics inside `verify`
pub struct PanickingVerifier(pub &'static str);

impl Verifier for PanickingVerifier {
    fn module_name(&self) -> &str {
        self.0
    }

    fn verify(&self) -> Result<VerificationResult> {
        panic!("unexpected state")
    }
}

/// Verifier that sleeps before passing
pub struct SlowVerifier {
    pub name: &'static str,
    pub delay: Duration,
}

impl Verifier for SlowVerifier {
    fn module_name(&self) -> &str {
        self.name
    }

    fn verify(&self) -> Result<VerificationResult> {
        thread::sleep(self.delay);
        Ok(passing(self.name))
    }
}
