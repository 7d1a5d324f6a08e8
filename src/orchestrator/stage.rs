// ABOUTME: Orchestration stage marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid stage transitions at compile time.

/// Initial stage: configuration loaded, nothing verified yet.
/// Available actions: `check_requirements()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

/// Required external commands resolved.
/// Available actions: `provision_certificate()`
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementsChecked;

/// TLS key/cert/chain present under the workspace root.
/// Available actions: `write_artifacts()`
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateReady;

/// Per-service configuration artifacts written.
/// Available actions: `start_infrastructure()`
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationWritten;

/// Infrastructure containers launched but not yet reachable.
/// Available actions: `await_healthy()`, `rollback()`
#[derive(Debug, Clone, Copy, Default)]
pub struct InfrastructureStarting;

/// Every infrastructure target answered in the same polling round.
/// Available actions: `start_applications()`, `rollback()`
#[derive(Debug, Clone, Copy, Default)]
pub struct InfrastructureHealthy;

/// Application processes launched and supervised.
/// Available actions: `supervise()`, `rollback()`
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationsRunning;

/// Stages at which infrastructure containers exist and rollback is possible.
pub trait InfrastructureLive: private::Sealed {}

impl InfrastructureLive for InfrastructureStarting {}
impl InfrastructureLive for InfrastructureHealthy {}
impl InfrastructureLive for ApplicationsRunning {}

mod private {
    pub trait Sealed {}
    impl Sealed for super::InfrastructureStarting {}
    impl Sealed for super::InfrastructureHealthy {}
    impl Sealed for super::ApplicationsRunning {}
}
