// ABOUTME: Deployment orchestrator - the startup/shutdown state machine.
// ABOUTME: Sequences provisioning, infrastructure, health gating, applications, rollback.

mod error;
mod rollback;
mod session;
mod stage;
mod transitions;

pub use error::OrchestrationError;
pub use rollback::shutdown_infrastructure;
pub use session::Session;
pub use stage::{
    ApplicationsRunning, CertificateReady, ConfigurationWritten, Idle, InfrastructureHealthy,
    InfrastructureLive, InfrastructureStarting, RequirementsChecked,
};
pub use transitions::{Orchestration, TransitionResult};
