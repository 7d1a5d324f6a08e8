// ABOUTME: TCP reachability gate for infrastructure services.
// ABOUTME: Polls all targets in synchronized rounds with a bounded attempt budget.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;

pub const DEFAULT_ATTEMPTS: u32 = 30;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Per-probe connect timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("services did not become reachable within {attempts} rounds")]
    ServicesUnavailable { attempts: u32 },
}

/// One host:port reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthTarget {
    pub host: String,
    pub port: u16,
}

impl HealthTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for HealthTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Probe a single target. Ready means the endpoint accepts a TCP connection;
/// no application-level protocol is spoken and the connection is dropped
/// immediately.
pub async fn probe(target: &HealthTarget) -> bool {
    let addr = (target.host.as_str(), target.port);
    matches!(
        tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

/// Block until every target is reachable in the same polling round.
///
/// Partial readiness across different rounds does not count - a round only
/// succeeds when all targets report ready simultaneously, so a flapping
/// dependency cannot sneak the stack past the gate.
pub async fn wait_for_targets(
    targets: &[HealthTarget],
    attempts: u32,
    interval: Duration,
) -> Result<(), HealthError> {
    for round in 1..=attempts {
        let probes = targets.iter().map(probe);
        let ready = futures::future::join_all(probes).await;

        if ready.iter().all(|r| *r) {
            tracing::debug!(round, "all health targets reachable");
            return Ok(());
        }

        tracing::debug!(round, "health targets not ready yet");
        tokio::time::sleep(interval).await;
    }

    Err(HealthError::ServicesUnavailable { attempts })
}
