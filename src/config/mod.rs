// ABOUTME: Configuration types and parsing for stackup.yml.
// ABOUTME: Handles YAML parsing, validation, and config file discovery.

mod service;

pub use service::{AppService, BaseImageConfig, InfraService};

use std::path::{Path, PathBuf};
use std::time::Duration;

use nonempty::NonEmpty;
use serde::Deserialize;

use crate::artifacts::ArtifactConfig;
use crate::error::{Error, Result};
use crate::health::{self, HealthTarget};
use crate::types::ServiceName;

pub const CONFIG_FILENAME: &str = "stackup.yml";
pub const CONFIG_FILENAME_ALT: &str = "stackup.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".stackup/config.yml";

/// Top-level configuration, constructed once at startup and passed into each
/// component. There is no ambient global.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_service_name")]
    pub project: ServiceName,

    /// Suppress stdout of infrastructure containers (stderr always surfaces).
    #[serde(default = "default_true")]
    pub silent_infrastructure: bool,

    /// Grace period between launching infrastructure and the first probe.
    #[serde(default = "default_settle_delay", with = "humantime_serde")]
    pub settle_delay: Duration,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub base_image: Option<BaseImageConfig>,

    #[serde(deserialize_with = "deserialize_infrastructure")]
    pub infrastructure: NonEmpty<InfraService>,

    #[serde(default)]
    pub applications: Vec<AppService>,

    #[serde(default)]
    pub artifacts: Vec<ArtifactConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            interval: default_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_attempts() -> u32 {
    health::DEFAULT_ATTEMPTS
}

fn default_interval() -> Duration {
    health::DEFAULT_INTERVAL
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Container name for an infrastructure service, prefixed with the
    /// project so parallel stacks do not collide.
    pub fn container_name(&self, service: &ServiceName) -> String {
        format!("{}-{}", self.project, service)
    }

    pub fn infra_container_names(&self) -> Vec<String> {
        self.infrastructure
            .iter()
            .map(|service| self.container_name(&service.name))
            .collect()
    }

    pub fn health_targets(&self) -> Vec<HealthTarget> {
        self.infrastructure
            .iter()
            .map(|service| HealthTarget::new(service.health_host.clone(), service.health_port))
            .collect()
    }

    /// Hostname included in the leaf certificate alongside localhost.
    pub fn local_hostname(&self) -> String {
        format!("{}.local", self.project)
    }

    /// External commands the orchestration depends on, deduplicated.
    pub fn required_commands(&self) -> Vec<String> {
        let mut commands = vec!["docker".to_string()];
        for app in &self.applications {
            if !commands.contains(&app.command) {
                commands.push(app.command.clone());
            }
        }
        commands
    }
}

/// Write a template configuration into `dir`, refusing to overwrite an
/// existing one unless `force` is set.
pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE_YAML)?;
    Ok(())
}

const TEMPLATE_YAML: &str = r#"project: myapp

infrastructure:
  - name: mongo
    image: docker.io/mongo:8-noble
    ports: ["127.0.0.1:27017:27017"]
    volumes: [".mongo-data:/data/db"]
    args: ["--quiet"]
    health_port: 27017
  - name: redis
    image: docker.io/redis:7-alpine
    ports: ["127.0.0.1:6379:6379"]
    health_port: 6379
  - name: mailhog
    image: docker.io/mailhog/mailhog:v1.0.1
    ports: ["127.0.0.1:1025:1025", "127.0.0.1:8025:8025"]
    health_port: 8025

applications:
  - name: server
    command: npm
    args: ["run", "dev"]
    cwd: Server
"#;

// Custom deserializers

pub(crate) fn deserialize_service_name<'de, D>(
    deserializer: D,
) -> std::result::Result<ServiceName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ServiceName::new(&s).map_err(serde::de::Error::custom)
}

fn deserialize_infrastructure<'de, D>(
    deserializer: D,
) -> std::result::Result<NonEmpty<InfraService>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let services: Vec<InfraService> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(services)
        .ok_or_else(|| serde::de::Error::custom("at least one infrastructure service is required"))
}
