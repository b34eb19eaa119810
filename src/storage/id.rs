//! Report identifiers
//!
//! `report-{YYYY-MM-DDTHH-MM-SS-mmmZ}-{6 hex}`: the timestamp part sorts
//! lexicographically in time order and the hex suffix comes from a v4 UUID.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

const ID_PREFIX: &str = "report-";
const SUFFIX_LEN: usize = 6;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Next storage timestamp, strictly later than any handed out before in this process.
///
/// Two reports stored in the same millisecond are pushed apart by one
/// millisecond so their order never depends on the random suffix.
pub fn next_timestamp() -> DateTime<Utc> {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_MILLIS.load(Ordering::SeqCst);
    let millis = loop {
        let candidate = now.max(last + 1);
        match LAST_MILLIS.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => break candidate,
            Err(actual) => last = actual,
        }
    };
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

/// Build the id for a report stored at `timestamp`
pub fn report_id(timestamp: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect();
    format!(
        "{ID_PREFIX}{}-{suffix}",
        timestamp.format("%Y-%m-%dT%H-%M-%S-%3fZ")
    )
}

/// Allocate a fresh `(id, timestamp)` pair
pub fn generate_report_id() -> (String, DateTime<Utc>) {
    let timestamp = next_timestamp();
    (report_id(timestamp), timestamp)
}
