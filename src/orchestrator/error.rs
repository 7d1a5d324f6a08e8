// ABOUTME: Error types for orchestration stage transitions.
// ABOUTME: Distinguishes fatal pre-flight failures from rollback-triggering ones.

use crate::artifacts::ArtifactError;
use crate::certs::CertError;
use crate::health::HealthError;
use crate::types::ServiceName;

#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    /// Pre-flight failed; nothing was executed.
    #[error("missing required commands: {}", .0.join(", "))]
    MissingRequirements(Vec<String>),

    /// Certificate provisioning failed. Fatal: without TLS material every
    /// HTTPS-dependent service downstream is unreachable.
    #[error(transparent)]
    Certificate(#[from] CertError),

    /// Configuration artifact write failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Base image rebuild failed. Fatal for this run, no automatic retry.
    #[error("base image build failed for tag {0}")]
    BuildFailed(String),

    /// A supervised service reported a failing exit.
    #[error("service {0} exited with a failure")]
    ServiceFailed(ServiceName),

    /// Infrastructure never became reachable within the attempt budget.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// Interrupt signal received while the stack was live.
    #[error("interrupted by signal")]
    Interrupted,
}
