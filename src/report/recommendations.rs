//! Recommendations derived from verifier output
//!
//! Solutions come from a best-effort lookup: known phrases in the failure
//! message win, then a per-module generic answer, then a catch-all.

use crate::config::{ReportConfig, DEFAULT_SLOW_MODULE_MS};
use crate::models::report::{Recommendation, Severity};
use crate::models::result::{VerificationResult, VerificationStatus};

const MESSAGE_SOLUTIONS: &[(&[&str], &str)] = &[
    (
        &["connection", "network"],
        "Check network connectivity and service availability. Verify configuration settings.",
    ),
    (
        &["permission", "access"],
        "Check file permissions and access rights. Ensure proper authentication credentials.",
    ),
    (
        &["timeout", "timed out"],
        "Increase timeout values or check for performance issues in the target service.",
    ),
    (
        &["not found", "missing"],
        "Verify that all required files, dependencies, and configurations are present.",
    ),
];

const MODULE_SOLUTIONS: &[(&str, &str)] = &[
    (
        "infrastructure",
        "Check project manifests, environment variables, and directory structure.",
    ),
    (
        "backend",
        "Verify server configuration, API endpoints, and service initialization.",
    ),
    (
        "frontend",
        "Check the application build, routing configuration, and component rendering.",
    ),
    (
        "authentication",
        "Verify auth provider configuration, user credentials, and role-based access.",
    ),
    (
        "database",
        "Check the database connection, access policies, and migration status.",
    ),
    (
        "download_system",
        "Verify download sources, download configuration, and file system permissions.",
    ),
    (
        "test_suite",
        "Check the test runner installation, test configuration, and browser compatibility.",
    ),
    (
        "scripts",
        "Verify project scripts, environment variables, and build configuration.",
    ),
];

const DEFAULT_SOLUTION: &str =
    "Review module-specific documentation and check system logs for more details.";
const WARNING_SOLUTION: &str =
    "Review the warning details and consider addressing to improve system reliability";
const SILENT_FAILURE_SOLUTION: &str = "Review module logs and check for configuration issues";
const SLOW_MODULE_SOLUTION: &str =
    "Consider optimizing verification logic or increasing timeout values";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationConfig {
    /// Links render as `{docs_base_url}/{module}-troubleshooting.md`
    pub docs_base_url: Option<String>,
    pub slow_module_ms: u64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            docs_base_url: None,
            slow_module_ms: DEFAULT_SLOW_MODULE_MS,
        }
    }
}

impl From<&ReportConfig> for RecommendationConfig {
    fn from(config: &ReportConfig) -> Self {
        Self {
            docs_base_url: config.docs_base_url.clone(),
            slow_module_ms: config.slow_module_ms,
        }
    }
}

impl RecommendationConfig {
    fn documentation(&self, module: &str) -> Option<String> {
        self.docs_base_url
            .as_deref()
            .map(|base| format!("{}/{module}-troubleshooting.md", base.trim_end_matches('/')))
    }
}

/// Pick a solution for `message` raised by `module`
pub fn solution_for(module: &str, message: &str) -> &'static str {
    let lower = message.to_lowercase();
    MESSAGE_SOLUTIONS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, solution)| *solution)
        .or_else(|| {
            MODULE_SOLUTIONS
                .iter()
                .find(|(name, _)| *name == module)
                .map(|(_, solution)| *solution)
        })
        .unwrap_or(DEFAULT_SOLUTION)
}

/// One recommendation per execution error, FAIL/WARNING detail and warning,
/// followed by performance recommendations for slow modules.
///
/// A FAIL detail that restates one of its module's execution errors is
/// already covered by the HIGH recommendation for that error.
pub fn generate_recommendations(
    results: &[VerificationResult],
    config: &RecommendationConfig,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for result in results {
        let module = result.module.as_str();
        let documentation = config.documentation(module);
        let recommend = |severity, component: &str, issue: String, solution: &str| Recommendation {
            severity,
            component: component.to_string(),
            issue,
            solution: solution.to_string(),
            documentation: documentation.clone(),
        };

        for error in &result.errors {
            recommendations.push(recommend(
                Severity::High,
                module,
                format!("Module failure: {error}"),
                solution_for(module, error),
            ));
        }

        let has_failed_details = result.count(VerificationStatus::Fail) > 0;
        if result.status == VerificationStatus::Fail && !result.has_errors() && !has_failed_details
        {
            recommendations.push(recommend(
                Severity::Medium,
                module,
                "Module reported failure status without specific errors".to_string(),
                SILENT_FAILURE_SOLUTION,
            ));
        }

        for detail in &result.details {
            match detail.result {
                VerificationStatus::Fail => {
                    if result.errors.iter().any(|e| *e == detail.message) {
                        continue;
                    }
                    recommendations.push(recommend(
                        Severity::Medium,
                        detail.component.as_str(),
                        format!("Test failure: {}", detail.test),
                        solution_for(module, &detail.message),
                    ));
                }
                VerificationStatus::Warning => {
                    recommendations.push(recommend(
                        Severity::Low,
                        detail.component.as_str(),
                        format!("Test warning: {}", detail.test),
                        solution_for(module, &detail.message),
                    ));
                }
                VerificationStatus::Pass => {}
            }
        }

        for warning in &result.warnings {
            let component = warning.component.as_deref().unwrap_or(module);
            let issue = if warning.message.is_empty() {
                "Warning detected".to_string()
            } else {
                warning.message.clone()
            };
            recommendations.push(recommend(Severity::Low, component, issue, WARNING_SOLUTION));
        }
    }

    for result in results.iter().filter(|r| r.duration_ms > config.slow_module_ms) {
        recommendations.push(Recommendation {
            severity: Severity::Low,
            component: result.module.clone(),
            issue: format!("Slow verification performance: {}ms", result.duration_ms),
            solution: SLOW_MODULE_SOLUTION.to_string(),
            documentation: config.documentation(&result.module),
        });
    }

    recommendations
}
