//! Controller to generator to storage, end to end

use std::sync::Arc;
use std::time::Duration;

use verity::models::{OverallStatus, ReportMetadata, VerificationStatus};
use verity::report::{generate_summary_text, ReportGenerator, ReportOptions};
use verity::verify::{Controller, ControllerConfig};

use crate::helpers::{
    failing, passing, temp_storage, ErroringVerifier, FixedVerifier, PanickingVerifier,
    SlowVerifier,
};

#[test]
fn test_erroring_verifier_does_not_abort_run() {
    let mut controller = Controller::default();
    controller.register(FixedVerifier::new(passing("database")));
    controller.register(ErroringVerifier("integrations"));
    controller.register(FixedVerifier::new(passing("security")));

    let results = controller.run_full();

    assert_eq!(results.len(), 3);
    let failed: Vec<_> = results
        .iter()
        .filter(|r| r.status == VerificationStatus::Fail)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].module, "integrations");
    assert!(failed[0].errors[0].contains("database connection lost"));
}

#[test]
fn test_results_follow_registration_order() {
    let mut controller = Controller::default();
    controller.register(SlowVerifier {
        name: "slow",
        delay: Duration::from_millis(150),
    });
    controller.register(FixedVerifier::new(passing("fast")));

    let modules: Vec<_> = controller
        .run_full()
        .into_iter()
        .map(|r| r.module)
        .collect();
    assert_eq!(modules, vec!["slow", "fast"]);
}

#[test]
fn test_panic_and_timeout_become_failures() {
    let mut controller = Controller::new(ControllerConfig::with_timeout(Duration::from_millis(200)));
    controller.register(PanickingVerifier("cache"));
    controller.register(SlowVerifier {
        name: "storage",
        delay: Duration::from_secs(5),
    });
    controller.register(FixedVerifier::new(passing("api")));

    let results = controller.run_full();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, VerificationStatus::Fail);
    assert!(results[0].errors[0].contains("unexpected state"));
    assert_eq!(results[1].status, VerificationStatus::Fail);
    assert!(results[1].errors[0].contains("did not complete"));
    assert_eq!(results[2].status, VerificationStatus::Pass);
}

#[test]
fn test_run_module_unknown_id() {
    let controller = Controller::default();
    let err = controller.run_module("missing").unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[test]
fn test_run_module_single_verifier() {
    let mut controller = Controller::default();
    controller.register_verifier("infra", Arc::new(ErroringVerifier("infra")));
    controller.register(FixedVerifier::new(passing("api")));

    let result = controller.run_module("infra").unwrap();
    assert_eq!(result.module, "infra");
    assert_eq!(result.status, VerificationStatus::Fail);
}

#[test]
fn test_full_run_is_generated_and_stored() {
    let (_temp, storage) = temp_storage(10);
    let generator = ReportGenerator::new(Some(storage.clone()));

    let mut controller = Controller::default();
    controller.register(FixedVerifier::new(passing("database")));
    controller.register(FixedVerifier::new(failing("network")));
    let results = controller.run_full();

    let options = ReportOptions {
        metadata: ReportMetadata {
            branch: Some("main".to_string()),
            ..ReportMetadata::default()
        },
        ..ReportOptions::default()
    };
    let generated = generator.generate_report(&results, &options).unwrap();

    assert_eq!(generated.report.overall_status, OverallStatus::CriticalFailures);
    assert_eq!(generated.report.summary.total_tests, 2);
    assert!(!generated.report.recommendations.is_empty());

    let stored = generated.stored.expect("report should be stored");
    let loaded = storage.get_report(&stored.id).unwrap();
    assert_eq!(loaded.metadata.branch.as_deref(), Some("main"));
    assert_eq!(loaded.report.module_results.len(), 2);

    let text = generate_summary_text(&results);
    assert!(text.contains("VERIFICATION SUMMARY"));
    assert!(text.contains("CRITICAL_FAILURES"));
}

#[test]
fn test_generate_without_auto_store() {
    let (_temp, storage) = temp_storage(10);
    let generator = ReportGenerator::new(Some(storage.clone()));

    let options = ReportOptions {
        auto_store: false,
        ..ReportOptions::default()
    };
    let generated = generator
        .generate_report(&[passing("database")], &options)
        .unwrap();

    assert_eq!(generated.report.overall_status, OverallStatus::Healthy);
    assert!(generated.stored.is_none());
    assert!(storage.get_all_reports(None, None, None).is_empty());
}
