// ABOUTME: Tests for the base image freshness policy.
// ABOUTME: Drives should_rebuild through a fake runner with canned docker output.

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use stackup::image::should_rebuild;
use stackup::process::{CommandRunner, RunResult, ServiceSpec};

/// Canned responses for the two image metadata queries.
struct FakeDocker {
    ls_stdout: &'static str,
    inspect: InspectBehavior,
}

enum InspectBehavior {
    CreatedDaysAgo(i64),
    Fails,
    Garbage,
}

fn output(code: i32, stdout: Vec<u8>) -> Output {
    Output {
        status: ExitStatus::from_raw(code << 8),
        stdout,
        stderr: Vec::new(),
    }
}

#[async_trait]
impl CommandRunner for FakeDocker {
    async fn run(&self, spec: &ServiceSpec) -> RunResult {
        RunResult::from_exit_code(spec.name().clone(), Some(0))
    }

    async fn output(&self, _program: &str, args: &[&str]) -> std::io::Result<Output> {
        match args {
            ["image", "ls", "-q", _] => Ok(output(0, self.ls_stdout.as_bytes().to_vec())),
            ["image", "inspect", _] => match &self.inspect {
                InspectBehavior::CreatedDaysAgo(days) => {
                    let created = Utc::now() - Duration::days(*days);
                    let body = format!(r#"[{{"Created": "{}"}}]"#, created.to_rfc3339());
                    Ok(output(0, body.into_bytes()))
                }
                InspectBehavior::Fails => Ok(output(1, Vec::new())),
                InspectBehavior::Garbage => Ok(output(0, b"not json".to_vec())),
            },
            _ => Ok(output(1, Vec::new())),
        }
    }
}

#[tokio::test]
async fn missing_image_forces_rebuild() {
    let docker = FakeDocker {
        ls_stdout: "",
        inspect: InspectBehavior::Fails,
    };
    assert!(should_rebuild(&docker, "base:latest").await);
}

#[tokio::test]
async fn stale_image_forces_rebuild() {
    let docker = FakeDocker {
        ls_stdout: "abc123\n",
        inspect: InspectBehavior::CreatedDaysAgo(8),
    };
    assert!(should_rebuild(&docker, "base:latest").await);
}

#[tokio::test]
async fn fresh_image_is_kept() {
    let docker = FakeDocker {
        ls_stdout: "abc123\n",
        inspect: InspectBehavior::CreatedDaysAgo(6),
    };
    assert!(!should_rebuild(&docker, "base:latest").await);
}

#[tokio::test]
async fn failing_timestamp_query_keeps_the_image() {
    // A stale-but-present image is still usable; a transient inspect fault
    // must not force an expensive no-cache rebuild.
    let docker = FakeDocker {
        ls_stdout: "abc123\n",
        inspect: InspectBehavior::Fails,
    };
    assert!(!should_rebuild(&docker, "base:latest").await);
}

#[tokio::test]
async fn unparseable_metadata_keeps_the_image() {
    let docker = FakeDocker {
        ls_stdout: "abc123\n",
        inspect: InspectBehavior::Garbage,
    };
    assert!(!should_rebuild(&docker, "base:latest").await);
}
