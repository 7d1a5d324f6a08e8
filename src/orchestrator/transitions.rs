// ABOUTME: Stage transition methods for the deployment orchestrator.
// ABOUTME: Each method consumes self and returns the next stage on success.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use crate::certs::{self, CertificateBundle};
use crate::config::Config;
use crate::health;
use crate::image;
use crate::process::{CommandRunner, Outcome};
use crate::{artifacts, requirements};

use super::error::OrchestrationError;
use super::rollback;
use super::session::Session;
use super::stage::{
    ApplicationsRunning, CertificateReady, ConfigurationWritten, Idle, InfrastructureHealthy,
    InfrastructureLive, InfrastructureStarting, RequirementsChecked,
};

/// Result type for transitions that may need rollback on failure: the error
/// side hands the pre-transition stage back to the caller so rollback can be
/// issued exactly once.
pub type TransitionResult<T, S> =
    Result<Orchestration<T>, (Orchestration<S>, OrchestrationError)>;

/// An orchestration run, parameterized by its current stage.
///
/// All concurrency happens as supervised tasks reporting into the session's
/// event channel; the `Orchestration` value itself only ever lives on the
/// single control task.
#[derive(Debug)]
pub struct Orchestration<S> {
    pub(crate) config: Config,
    pub(crate) root: PathBuf,
    pub(crate) certificate: Option<CertificateBundle>,
    pub(crate) session: Session,
    pub(crate) _stage: PhantomData<S>,
}

impl Orchestration<Idle> {
    pub fn new(config: Config, root: PathBuf) -> Self {
        Orchestration {
            config,
            root,
            certificate: None,
            session: Session::new(),
            _stage: PhantomData,
        }
    }

    /// Verify every required external command is resolvable.
    ///
    /// # Errors
    ///
    /// Returns `OrchestrationError::MissingRequirements` with the full
    /// listing of unresolvable commands; nothing is executed in that case.
    pub fn check_requirements(self) -> Result<Orchestration<RequirementsChecked>, OrchestrationError> {
        let commands = self.config.required_commands();
        let missing = requirements::missing_commands(&commands);
        if !missing.is_empty() {
            return Err(OrchestrationError::MissingRequirements(missing));
        }
        Ok(self.transition())
    }
}

impl Orchestration<RequirementsChecked> {
    /// Ensure the TLS key/cert/chain triple exists under the workspace root.
    ///
    /// # Errors
    ///
    /// Any generation or write failure is fatal.
    pub fn provision_certificate(
        mut self,
    ) -> Result<Orchestration<CertificateReady>, OrchestrationError> {
        let hostname = self.config.local_hostname();
        let bundle = certs::ensure_certificate(&self.root, &hostname)?;
        self.certificate = Some(bundle);
        Ok(self.transition())
    }
}

impl Orchestration<CertificateReady> {
    /// Materialize the configured per-service artifact files.
    ///
    /// # Errors
    ///
    /// The first failed write aborts the run.
    pub fn write_artifacts(self) -> Result<Orchestration<ConfigurationWritten>, OrchestrationError> {
        artifacts::write_artifacts(&self.root, &self.config.artifacts)?;
        Ok(self.transition())
    }
}

impl Orchestration<ConfigurationWritten> {
    /// Rebuild the base image when missing or stale, then launch all
    /// infrastructure containers as supervised tasks without awaiting their
    /// completion (they are long-running).
    ///
    /// # Errors
    ///
    /// Returns `OrchestrationError::BuildFailed` when the awaited rebuild
    /// fails; launch failures surface asynchronously through the event
    /// channel instead.
    pub async fn start_infrastructure<R: CommandRunner + 'static>(
        mut self,
        runner: &Arc<R>,
    ) -> Result<Orchestration<InfrastructureStarting>, OrchestrationError> {
        if let Some(base) = self.config.base_image.clone() {
            if image::should_rebuild(runner.as_ref(), &base.tag).await {
                let result = runner.run(&base.build_spec()).await;
                if result.outcome == Outcome::Failure {
                    return Err(OrchestrationError::BuildFailed(base.tag));
                }
            }
        }

        for service in self.config.infrastructure.clone() {
            let container_name = self.config.container_name(&service.name);
            let spec = service.spec(&container_name, self.config.silent_infrastructure);
            self.session.track_container(container_name);
            self.session.launch(runner, spec);
        }

        Ok(self.transition())
    }
}

impl Orchestration<InfrastructureStarting> {
    /// Gate on every infrastructure target answering in the same polling
    /// round, while watching for early launch failures and the interrupt
    /// signal. The settle delay is only a pre-probe grace period; readiness
    /// is decided by the probes.
    pub async fn await_healthy(mut self) -> TransitionResult<InfrastructureHealthy, InfrastructureStarting> {
        let targets = self.config.health_targets();
        let attempts = self.config.health.attempts;
        let interval = self.config.health.interval;
        let settle = self.config.settle_delay;

        let gate = async {
            tokio::time::sleep(settle).await;
            health::wait_for_targets(&targets, attempts, interval).await
        };
        tokio::pin!(gate);

        loop {
            tokio::select! {
                result = &mut gate => {
                    return match result {
                        Ok(()) => Ok(self.transition()),
                        Err(e) => Err((self, e.into())),
                    };
                }
                event = self.session.next_event() => {
                    if let Some(result) = event {
                        if result.is_failure() {
                            return Err((self, OrchestrationError::ServiceFailed(result.service)));
                        }
                        tracing::debug!(service = %result.service, "service exited during startup");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    return Err((self, OrchestrationError::Interrupted));
                }
            }
        }
    }
}

impl Orchestration<InfrastructureHealthy> {
    /// Launch all application processes as supervised tasks. Failures are
    /// reported asynchronously, so this transition itself cannot fail.
    pub fn start_applications<R: CommandRunner + 'static>(
        mut self,
        runner: &Arc<R>,
    ) -> Orchestration<ApplicationsRunning> {
        for app in self.config.applications.clone() {
            self.session.launch(runner, app.spec());
        }
        self.transition()
    }
}

impl Orchestration<ApplicationsRunning> {
    /// Single control loop over the event channel and the interrupt signal.
    ///
    /// Returns `Ok` when every supervised task has exited successfully.
    /// A failing task or an interrupt hands the stage back for rollback.
    pub async fn supervise(mut self) -> Result<(), (Orchestration<ApplicationsRunning>, OrchestrationError)> {
        loop {
            if self.session.outstanding() == 0 {
                return Ok(());
            }

            tokio::select! {
                event = self.session.next_event() => {
                    match event {
                        Some(result) if result.is_failure() => {
                            return Err((self, OrchestrationError::ServiceFailed(result.service)));
                        }
                        Some(result) => {
                            tracing::info!(service = %result.service, "service exited cleanly");
                        }
                        None => return Ok(()),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    return Err((self, OrchestrationError::Interrupted));
                }
            }
        }
    }
}

impl<S: InfrastructureLive> Orchestration<S> {
    /// Best-effort termination of all started infrastructure containers.
    /// Consumes the session, so rollback can only be issued once.
    pub async fn rollback<R: CommandRunner + ?Sized>(self, runner: &R) {
        rollback::shutdown_infrastructure(runner, self.session.container_names()).await;
    }
}

impl<S> Orchestration<S> {
    /// Internal helper to move to the next stage.
    fn transition<T>(self) -> Orchestration<T> {
        Orchestration {
            config: self.config,
            root: self.root,
            certificate: self.certificate,
            session: self.session,
            _stage: PhantomData,
        }
    }

    pub fn certificate(&self) -> Option<&CertificateBundle> {
        self.certificate.as_ref()
    }
}
