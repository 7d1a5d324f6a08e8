// ABOUTME: Best-effort termination of started infrastructure containers.

use crate::process::{CommandRunner, ServiceSpec};
use crate::types::ServiceName;

/// Issue a forced terminate against the named containers. Best-effort: the
/// goal is cleanup, not correctness, so failures are logged and never
/// escalated.
pub async fn shutdown_infrastructure<R: CommandRunner + ?Sized>(runner: &R, names: &[String]) {
    if names.is_empty() {
        return;
    }

    // Invariant: "rollback" is a valid RFC 1123 label.
    let tag = ServiceName::new("rollback").expect("static name is valid");
    let mut args = vec!["kill".to_string()];
    args.extend(names.iter().cloned());

    let spec = ServiceSpec::new(tag, "docker").args(args);
    let result = runner.run(&spec).await;
    if result.is_failure() {
        tracing::warn!(
            containers = ?names,
            "failed to kill some infrastructure containers during rollback"
        );
    }
}
