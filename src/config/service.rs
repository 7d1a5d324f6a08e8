// ABOUTME: Per-service configuration entries and their ServiceSpec builders.
// ABOUTME: Container invocations are assembled as structured argument vectors.

use std::path::PathBuf;

use serde::Deserialize;

use crate::process::ServiceSpec;
use crate::types::ServiceName;

/// A long-running dependency container (data store, cache, mail-capture).
#[derive(Debug, Clone, Deserialize)]
pub struct InfraService {
    #[serde(deserialize_with = "super::deserialize_service_name")]
    pub name: ServiceName,

    pub image: String,

    /// Port publish specs passed to `-p`, e.g. "127.0.0.1:27017:27017".
    #[serde(default)]
    pub ports: Vec<String>,

    /// Volume specs passed to `-v`.
    #[serde(default)]
    pub volumes: Vec<String>,

    /// Trailing arguments handed to the container entrypoint.
    #[serde(default)]
    pub args: Vec<String>,

    /// Port probed for readiness.
    pub health_port: u16,

    #[serde(default = "default_health_host")]
    pub health_host: String,
}

fn default_health_host() -> String {
    "127.0.0.1".to_string()
}

impl InfraService {
    /// Build the `docker run` invocation for this service.
    pub fn spec(&self, container_name: &str, silent: bool) -> ServiceSpec {
        let mut args = vec![
            "run".to_string(),
            "--name".to_string(),
            container_name.to_string(),
            "--rm".to_string(),
        ];
        for port in &self.ports {
            args.push("-p".to_string());
            args.push(port.clone());
        }
        for volume in &self.volumes {
            args.push("-v".to_string());
            args.push(volume.clone());
        }
        args.push(self.image.clone());
        args.extend(self.args.iter().cloned());

        ServiceSpec::new(self.name.clone(), "docker")
            .args(args)
            .silent(silent)
    }
}

/// A long-running application process that depends on infrastructure being
/// reachable.
#[derive(Debug, Clone, Deserialize)]
pub struct AppService {
    #[serde(deserialize_with = "super::deserialize_service_name")]
    pub name: ServiceName,

    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub shell: bool,
}

impl AppService {
    pub fn spec(&self) -> ServiceSpec {
        let mut spec = ServiceSpec::new(self.name.clone(), self.command.clone())
            .args(self.args.iter().cloned())
            .shell(self.shell);
        if let Some(cwd) = &self.cwd {
            spec = spec.cwd(cwd.clone());
        }
        spec
    }
}

/// Cached base build artifact with a bounded-staleness rebuild policy.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseImageConfig {
    pub tag: String,

    pub dockerfile: PathBuf,

    #[serde(default = "default_context")]
    pub context: PathBuf,
}

fn default_context() -> PathBuf {
    PathBuf::from(".")
}

impl BaseImageConfig {
    /// Build the no-cache `docker build` invocation.
    pub fn build_spec(&self) -> ServiceSpec {
        // Invariant: "base-image" is a valid RFC 1123 label.
        let name = ServiceName::new("base-image").expect("static name is valid");
        ServiceSpec::new(name, "docker").args([
            "buildx".to_string(),
            "build".to_string(),
            "--no-cache".to_string(),
            "-t".to_string(),
            self.tag.clone(),
            "-f".to_string(),
            self.dockerfile.display().to_string(),
            self.context.display().to_string(),
        ])
    }
}
