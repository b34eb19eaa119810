//! Summary aggregation over a batch of results

use crate::models::report::VerificationSummary;
use crate::models::result::{VerificationResult, VerificationStatus};

/// Count PASS/FAIL/WARNING across all details of all results.
///
/// `critical_issues` is incremented once per result that carries at least one
/// execution error, independently of how many FAIL details it has.
pub fn compute_summary(results: &[VerificationResult]) -> VerificationSummary {
    let mut summary = VerificationSummary::default();

    for result in results {
        summary.total_tests += result.details.len();

        for detail in &result.details {
            match detail.result {
                VerificationStatus::Pass => summary.passed += 1,
                VerificationStatus::Fail => summary.failed += 1,
                VerificationStatus::Warning => summary.warnings += 1,
            }
        }

        if result.has_errors() {
            summary.critical_issues += 1;
        }
    }

    summary
}
