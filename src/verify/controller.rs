//! Verification controller
//!
//! Holds the registration map and fans each run out to one thread per verifier.
//! Results are collected over a channel sized to the registration count and
//! slotted back by their originating position, so the returned order always
//! matches registration order regardless of completion order.
//!
//! Failure containment:
//! - `verify()` returning `Err`: converted to a FAIL result with the error text
//! - `verify()` panicking: caught via `catch_unwind`, converted the same way
//! - no result before the deadline: FAIL result with a timeout message; the
//!   verifier thread is left detached since threads cannot be cancelled
//!
//! A run never aborts part-way: N registrations always yield N results.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::verifier::Verifier;
use crate::models::result::VerificationResult;

/// Default deadline for a single verifier (5 minutes)
pub const DEFAULT_VERIFIER_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("No verifier registered for module: {module}")]
    NotRegistered { module: String },
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Upper bound on a single verifier's run; `None` waits indefinitely
    pub verifier_timeout: Option<Duration>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            verifier_timeout: Some(DEFAULT_VERIFIER_TIMEOUT),
        }
    }
}

impl ControllerConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            verifier_timeout: Some(timeout),
        }
    }
}

type Registration = (String, Arc<dyn Verifier>);

/// Runs registered verifiers and isolates their failures.
///
/// Holds no state between runs other than the registrations themselves.
#[derive(Default)]
pub struct Controller {
    config: ControllerConfig,
    verifiers: Vec<Registration>,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            verifiers: Vec::new(),
        }
    }

    /// Bind `module_id` to `verifier`.
    ///
    /// Re-registering an id replaces the previous binding and keeps its position.
    pub fn register_verifier(&mut self, module_id: impl Into<String>, verifier: Arc<dyn Verifier>) {
        let module_id = module_id.into();
        match self.verifiers.iter_mut().find(|(id, _)| *id == module_id) {
            Some(slot) => {
                debug!(module = %module_id, "Replacing registered verifier");
                slot.1 = verifier;
            }
            None => self.verifiers.push((module_id, verifier)),
        }
    }

    /// Register a verifier under its own module name
    pub fn register<V: Verifier + 'static>(&mut self, verifier: V) {
        let module_id = verifier.module_name().to_string();
        self.register_verifier(module_id, Arc::new(verifier));
    }

    /// Registered module ids in registration order
    pub fn registered_modules(&self) -> Vec<&str> {
        self.verifiers.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn is_registered(&self, module_id: &str) -> bool {
        self.verifiers.iter().any(|(id, _)| id == module_id)
    }

    /// Run every registered verifier concurrently
    pub fn run_full(&self) -> Vec<VerificationResult> {
        info!(modules = self.verifiers.len(), "Starting full verification");
        let started = Instant::now();

        let results = self.run_batch(&self.verifiers);

        info!(
            elapsed_ms = duration_ms(started.elapsed()),
            "Full verification completed"
        );
        results
    }

    /// Run a single verifier under the same containment rules as [`run_full`](Self::run_full)
    pub fn run_module(&self, module_id: &str) -> Result<VerificationResult, ControllerError> {
        let registration = self
            .verifiers
            .iter()
            .find(|(id, _)| id == module_id)
            .cloned()
            .ok_or_else(|| ControllerError::NotRegistered {
                module: module_id.to_string(),
            })?;

        let mut results = self.run_batch(std::slice::from_ref(&registration));
        Ok(results
            .pop()
            .unwrap_or_else(|| VerificationResult::execution_failure(module_id, "No result", 0)))
    }

    fn run_batch(&self, batch: &[Registration]) -> Vec<VerificationResult> {
        let total = batch.len();
        let started = Instant::now();
        let deadline = self.config.verifier_timeout.map(|t| started + t);

        let (tx, rx) = mpsc::sync_channel::<(usize, VerificationResult)>(total.max(1));
        let mut slots: Vec<Option<VerificationResult>> = (0..total).map(|_| None).collect();

        for (index, (module, verifier)) in batch.iter().enumerate() {
            let tx = tx.clone();
            let thread_module = module.clone();
            let verifier = Arc::clone(verifier);

            let spawned = thread::Builder::new()
                .name(format!("verify-{module}"))
                .spawn(move || {
                    let result = invoke(&thread_module, verifier.as_ref());
                    // Receiver is gone only when the run already gave up on us
                    let _ = tx.send((index, result));
                });

            if let Err(e) = spawned {
                error!(module = %module, error = %e, "Failed to spawn verifier thread");
                slots[index] = Some(VerificationResult::execution_failure(
                    module,
                    format!("Failed to start verifier: {e}"),
                    0,
                ));
            }
        }
        drop(tx);

        let mut pending = slots.iter().filter(|s| s.is_none()).count();
        while pending > 0 {
            let received = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    rx.recv_timeout(remaining)
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok((index, result)) => {
                    if slots[index].is_none() {
                        pending -= 1;
                    }
                    slots[index] = Some(result);
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let elapsed = duration_ms(started.elapsed());
        let results: Vec<VerificationResult> = slots
            .into_iter()
            .zip(batch)
            .map(|(slot, (module, _))| {
                slot.unwrap_or_else(|| {
                    let cause = match self.config.verifier_timeout {
                        Some(timeout) => format!(
                            "Verifier did not complete within {}ms",
                            timeout.as_millis()
                        ),
                        None => "Verifier exited without producing a result".to_string(),
                    };
                    warn!(module = %module, "{cause}");
                    VerificationResult::execution_failure(module, cause, elapsed)
                })
            })
            .collect();

        cleanup_all(batch);
        results
    }
}

/// Call `verify` with panic and error containment
fn invoke(module: &str, verifier: &dyn Verifier) -> VerificationResult {
    info!(module, "Running verification");
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| verifier.verify()));
    let elapsed = duration_ms(start.elapsed());

    match outcome {
        Ok(Ok(mut result)) => {
            if result.duration_ms == 0 {
                result.duration_ms = elapsed;
            }
            info!(
                module,
                status = %result.status,
                duration_ms = result.duration_ms,
                "Verification completed"
            );
            result
        }
        Ok(Err(e)) => {
            error!(module, error = %format!("{e:#}"), "Verification failed");
            VerificationResult::execution_failure(module, format!("{e:#}"), elapsed)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(module, panic = %message, "Verifier panicked");
            VerificationResult::execution_failure(
                module,
                format!("Verifier panicked: {message}"),
                elapsed,
            )
        }
    }
}

/// Best-effort cleanup; errors and panics are logged, never raised
fn cleanup_all(batch: &[Registration]) {
    for (module, verifier) in batch {
        match panic::catch_unwind(AssertUnwindSafe(|| verifier.cleanup())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(module = %module, error = %format!("{e:#}"), "Cleanup failed"),
            Err(payload) => warn!(
                module = %module,
                panic = %panic_message(payload.as_ref()),
                "Cleanup panicked"
            ),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::{VerificationDetail, VerificationStatus};
    use anyhow::{anyhow, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        delay: Duration,
    }

    impl Verifier for Fixed {
        fn module_name(&self) -> &str {
            self.name
        }

        fn verify(&self) -> Result<VerificationResult> {
            thread::sleep(self.delay);
            Ok(VerificationResult::from_details(
                self.name,
                vec![VerificationDetail::pass(self.name, "check", "ok")],
            ))
        }
    }

    struct Failing;

    impl Verifier for Failing {
        fn module_name(&self) -> &str {
            "failing"
        }

        fn verify(&self) -> Result<VerificationResult> {
            Err(anyhow!("database unreachable"))
        }
    }

    struct Panicking;

    impl Verifier for Panicking {
        fn module_name(&self) -> &str {
            "panicking"
        }

        fn verify(&self) -> Result<VerificationResult> {
            panic!("exploded mid-check");
        }
    }

    struct Counting {
        cleanups: Arc<AtomicUsize>,
        fail_cleanup: bool,
    }

    impl Verifier for Counting {
        fn module_name(&self) -> &str {
            "counting"
        }

        fn verify(&self) -> Result<VerificationResult> {
            Ok(VerificationResult::new("counting", VerificationStatus::Pass))
        }

        fn cleanup(&self) -> Result<()> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            if self.fail_cleanup {
                Err(anyhow!("cleanup exploded"))
            } else {
                Ok(())
            }
        }
    }

    fn fixed(name: &'static str, delay_ms: u64) -> Fixed {
        Fixed {
            name,
            delay: Duration::from_millis(delay_ms),
        }
    }

    #[test]
    fn test_results_follow_registration_order() {
        let mut controller = Controller::default();
        controller.register(fixed("slow", 150));
        controller.register(fixed("medium", 50));
        controller.register(fixed("fast", 0));

        let results = controller.run_full();
        let modules: Vec<_> = results.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(modules, vec!["slow", "medium", "fast"]);
    }

    #[test]
    fn test_failing_verifier_does_not_abort_batch() {
        let mut controller = Controller::default();
        controller.register(fixed("first", 0));
        controller.register(Failing);
        controller.register(fixed("third", 0));

        let results = controller.run_full();
        assert_eq!(results.len(), 3);

        let failures: Vec<_> = results
            .iter()
            .filter(|r| r.status == VerificationStatus::Fail)
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].module, "failing");
        assert!(failures[0].errors[0].contains("database unreachable"));
        assert!(failures[0].details[0].message.contains("database unreachable"));
    }

    #[test]
    fn test_panicking_verifier_is_contained() {
        let mut controller = Controller::default();
        controller.register(Panicking);
        controller.register(fixed("ok", 0));

        let results = controller.run_full();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, VerificationStatus::Fail);
        assert!(results[0].errors[0].contains("exploded mid-check"));
        assert_eq!(results[1].status, VerificationStatus::Pass);
    }

    #[test]
    fn test_stuck_verifier_times_out() {
        let mut controller = Controller::new(ControllerConfig::with_timeout(
            Duration::from_millis(100),
        ));
        controller.register(fixed("stuck", 5_000));
        controller.register(fixed("quick", 0));

        let started = Instant::now();
        let results = controller.run_full();
        assert!(started.elapsed() < Duration::from_secs(4));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].module, "stuck");
        assert_eq!(results[0].status, VerificationStatus::Fail);
        assert!(results[0].errors[0].contains("did not complete"));
        assert_eq!(results[1].status, VerificationStatus::Pass);
    }

    #[test]
    fn test_duration_stamped_when_verifier_leaves_it_zero() {
        let mut controller = Controller::default();
        controller.register(fixed("sleepy", 30));

        let results = controller.run_full();
        assert!(results[0].duration_ms >= 30);
    }

    #[test]
    fn test_cleanup_runs_and_errors_are_swallowed() {
        let cleanups = Arc::new(AtomicUsize::new(0));
        let mut controller = Controller::default();
        controller.register(Counting {
            cleanups: Arc::clone(&cleanups),
            fail_cleanup: true,
        });

        let results = controller.run_full();
        assert_eq!(results.len(), 1);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);

        controller.run_module("counting").unwrap();
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_run_module_unknown_id() {
        let controller = Controller::default();
        let err = controller.run_module("ghost").unwrap_err();
        assert!(matches!(err, ControllerError::NotRegistered { .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_run_module_contains_failure() {
        let mut controller = Controller::default();
        controller.register(Failing);

        let result = controller.run_module("failing").unwrap();
        assert_eq!(result.status, VerificationStatus::Fail);
        assert!(result.has_errors());
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut controller = Controller::default();
        controller.register_verifier("a", Arc::new(fixed("a", 0)));
        controller.register_verifier("b", Arc::new(fixed("b", 0)));
        controller.register_verifier("a", Arc::new(Failing));

        assert_eq!(controller.registered_modules(), vec!["a", "b"]);
        assert!(controller.is_registered("b"));
        assert!(!controller.is_registered("c"));

        let results = controller.run_full();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, VerificationStatus::Fail);
    }

    #[test]
    fn test_empty_controller_runs_nothing() {
        let controller = Controller::default();
        assert!(controller.run_full().is_empty());
    }
}
