//! Persistence, retention and recovery of stored reports

use std::collections::HashSet;
use std::fs;
use std::thread;

use verity::models::{DetailValue, OverallStatus, VerificationDetail, VerificationResult};
use verity::storage::ReportStorage;

use crate::helpers::{failing, passing, store, temp_storage, warning};

#[test]
fn test_store_and_reload_round_trip() {
    let (_temp, storage) = temp_storage(10);
    let stored = store(&storage, &[passing("database"), warning("api")]);

    assert!(stored.id.starts_with("report-"));
    assert!(storage.report_path(&stored.id).exists());

    let loaded = storage.get_report(&stored.id).unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(loaded.report.overall_status, OverallStatus::IssuesFound);

    let index = storage.read_index().unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].id, stored.id);
}

#[test]
fn test_non_finite_measurement_survives_store() {
    let (_temp, storage) = temp_storage(10);
    let detail = VerificationDetail::pass("cache", "hit-ratio", "no traffic yet")
        .with_data("ratio", f64::NAN)
        .with_data("hits", 0i64);
    let stored = store(&storage, &[VerificationResult::from_details("cache", vec![detail])]);

    let loaded = storage
        .get_report(&stored.id)
        .expect("stored report must stay readable");
    assert_eq!(loaded, stored);
    assert_eq!(
        loaded.report.module_results[0].details[0].data["ratio"],
        DetailValue::Text("NaN".to_string())
    );
    assert_eq!(storage.read_index().unwrap().len(), 1);
}

#[test]
fn test_unknown_and_invalid_ids_are_absent() {
    let (_temp, storage) = temp_storage(10);
    assert!(storage.get_report("report-does-not-exist").is_none());
    assert!(storage.get_report("../index").is_none());
}

#[test]
fn test_retention_keeps_newest() {
    let (_temp, storage) = temp_storage(2);
    let ids: Vec<String> = (0..3)
        .map(|_| store(&storage, &[passing("database")]).id)
        .collect();

    let remaining: Vec<String> = storage
        .get_all_reports(None, None, None)
        .into_iter()
        .map(|r| r.id)
        .collect();

    assert_eq!(remaining, vec![ids[2].clone(), ids[1].clone()]);
    assert!(!storage.report_path(&ids[0]).exists());
    assert_eq!(storage.read_index().unwrap().len(), 2);
}

#[test]
fn test_listing_limit_and_order() {
    let (_temp, storage) = temp_storage(10);
    let first = store(&storage, &[passing("a")]);
    let second = store(&storage, &[failing("a")]);
    let third = store(&storage, &[warning("a")]);

    let all = storage.get_all_reports(None, None, None);
    let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);

    let limited = storage.get_all_reports(Some(1), None, None);
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, third.id);

    let bounded = storage.get_all_reports(None, Some(second.timestamp), Some(second.timestamp));
    assert_eq!(bounded.len(), 1);
    assert_eq!(bounded[0].id, second.id);
}

#[test]
fn test_corrupt_index_is_rebuilt() {
    let (_temp, storage) = temp_storage(10);
    let a = store(&storage, &[passing("database")]);
    let b = store(&storage, &[failing("database")]);

    fs::write(storage.index_path(), "{ not json").unwrap();

    let reports = storage.get_all_reports(None, None, None);
    let ids: Vec<_> = reports.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![b.id.clone(), a.id.clone()]);

    let index = storage.read_index().unwrap();
    assert_eq!(index.len(), 2);
}

#[test]
fn test_missing_index_is_rebuilt() {
    let (_temp, storage) = temp_storage(10);
    let stored = store(&storage, &[passing("database")]);

    fs::remove_file(storage.index_path()).unwrap();

    let reports = storage.get_all_reports(None, None, None);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, stored.id);
    assert!(storage.index_path().exists());
}

#[test]
fn test_deleted_body_is_pruned_from_index() {
    let (_temp, storage) = temp_storage(10);
    let kept = store(&storage, &[passing("database")]);
    let lost = store(&storage, &[passing("database")]);

    fs::remove_file(storage.report_path(&lost.id)).unwrap();

    let reports = storage.get_all_reports(None, None, None);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, kept.id);
    let index = storage.read_index().unwrap();
    assert!(index.iter().all(|e| e.id != lost.id));
}

#[test]
fn test_corrupt_body_is_quarantined() {
    let (_temp, storage) = temp_storage(10);
    let stored = store(&storage, &[passing("database")]);
    let path = storage.report_path(&stored.id);

    fs::write(&path, "garbage").unwrap();

    assert!(storage.get_report(&stored.id).is_none());
    assert!(!path.exists());
    assert!(path.with_extension("json.corrupt").exists());
    assert!(storage.read_index().unwrap().is_empty());
}

#[test]
fn test_concurrent_stores_keep_every_entry() {
    let (_temp, storage) = temp_storage(100);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let storage = storage.clone();
            thread::spawn(move || {
                (0..5)
                    .map(|_| store(&storage, &[passing("database")]).id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let written: HashSet<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(written.len(), 20);

    let indexed: HashSet<String> = storage
        .read_index()
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(indexed, written);
}

#[test]
fn test_second_storage_instance_sees_reports() {
    let (temp, storage) = temp_storage(10);
    let stored = store(&storage, &[passing("database")]);

    let reopened = ReportStorage::new(temp.path().join("reports-store"), 10);
    reopened.initialize().unwrap();
    assert_eq!(reopened.get_report(&stored.id), Some(stored));
}

#[test]
fn test_cleanup_dry_run_plans_without_deleting() {
    let (temp, storage) = temp_storage(10);
    for _ in 0..3 {
        store(&storage, &[passing("database")]);
    }

    let tight = ReportStorage::new(temp.path().join("reports-store"), 1);
    let planned = tight.plan_cleanup();
    assert_eq!(planned.len(), 2);
    assert_eq!(tight.read_index().unwrap().len(), 3);

    let outcome = tight.cleanup_old_reports();
    assert_eq!(outcome.deleted.len(), 2);
    assert_eq!(outcome.retained, 1);
    assert!(outcome.failed.is_empty());
}
