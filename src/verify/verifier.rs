use anyhow::Result;

use crate::models::result::VerificationResult;

/// A unit of verification work.
///
/// Implementations are opaque to the controller: it only calls [`Verifier::verify`]
/// once per run and [`Verifier::cleanup`] after every verifier has settled.
/// Verifiers run on their own thread, hence the `Send + Sync` bound.
pub trait Verifier: Send + Sync {
    /// Stable identifier used for registration and lookup
    fn module_name(&self) -> &str;

    /// Run every check this verifier owns.
    ///
    /// Returning `Err` (or panicking) is contained by the controller and turned
    /// into a FAIL result carrying the error message.
    fn verify(&self) -> Result<VerificationResult>;

    /// Release resources acquired by `verify`. Failures are logged, never raised.
    fn cleanup(&self) -> Result<()> {
        Ok(())
    }
}
