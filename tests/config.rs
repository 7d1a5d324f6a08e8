// ABOUTME: Integration tests for configuration parsing and discovery.
// ABOUTME: Covers defaults, validation errors, and the file lookup order.

use std::time::Duration;

use stackup::config::{init_config, Config, CONFIG_FILENAME};

const MINIMAL: &str = r#"
project: myapp
infrastructure:
  - name: mongo
    image: docker.io/mongo:8-noble
    health_port: 27017
"#;

const FULL: &str = r#"
project: myapp
silent_infrastructure: false
settle_delay: 2s

health:
  attempts: 5
  interval: 250ms

base_image:
  tag: myapp/base:latest
  dockerfile: Dockerfile.base

infrastructure:
  - name: mongo
    image: docker.io/mongo:8-noble
    ports: ["127.0.0.1:27017:27017"]
    volumes: [".mongo-data:/data/db"]
    args: ["--quiet"]
    health_port: 27017
  - name: redis
    image: docker.io/redis:7-alpine
    health_port: 6379
    health_host: "::1"

applications:
  - name: server
    command: npm
    args: ["run", "dev"]
    cwd: Server

artifacts:
  - path: Server/.env
    contents: |
      PORT=8080
"#;

#[test]
fn minimal_config_gets_defaults() {
    let config = Config::from_yaml(MINIMAL).unwrap();

    assert_eq!(config.project.as_str(), "myapp");
    assert!(config.silent_infrastructure);
    assert_eq!(config.settle_delay, Duration::from_secs(10));
    assert_eq!(config.health.attempts, 30);
    assert_eq!(config.health.interval, Duration::from_secs(1));
    assert!(config.base_image.is_none());
    assert!(config.applications.is_empty());
    assert!(config.artifacts.is_empty());

    let infra = config.infrastructure.first();
    assert_eq!(infra.health_host, "127.0.0.1");
    assert!(infra.ports.is_empty());
}

#[test]
fn full_config_parses() {
    let config = Config::from_yaml(FULL).unwrap();

    assert!(!config.silent_infrastructure);
    assert_eq!(config.settle_delay, Duration::from_secs(2));
    assert_eq!(config.health.attempts, 5);
    assert_eq!(config.health.interval, Duration::from_millis(250));
    assert_eq!(config.base_image.as_ref().unwrap().tag, "myapp/base:latest");
    assert_eq!(config.infrastructure.len(), 2);
    assert_eq!(config.applications.len(), 1);
    assert_eq!(config.artifacts.len(), 1);
}

#[test]
fn derived_names_are_project_prefixed() {
    let config = Config::from_yaml(FULL).unwrap();

    assert_eq!(
        config.infra_container_names(),
        vec!["myapp-mongo", "myapp-redis"]
    );
    assert_eq!(config.local_hostname(), "myapp.local");
}

#[test]
fn health_targets_honor_per_service_hosts() {
    let config = Config::from_yaml(FULL).unwrap();
    let targets = config.health_targets();

    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].to_string(), "127.0.0.1:27017");
    assert_eq!(targets[1].to_string(), "::1:6379");
}

#[test]
fn required_commands_are_deduplicated() {
    let yaml = r#"
project: myapp
infrastructure:
  - name: mongo
    image: mongo
    health_port: 27017
applications:
  - name: server
    command: npm
  - name: viewer
    command: npm
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.required_commands(), vec!["docker", "npm"]);
}

#[test]
fn empty_infrastructure_is_rejected() {
    let yaml = r#"
project: myapp
infrastructure: []
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("at least one infrastructure"));
}

#[test]
fn invalid_project_name_is_rejected() {
    let yaml = MINIMAL.replace("myapp", "My App");
    assert!(Config::from_yaml(&yaml).is_err());
}

#[test]
fn discover_prefers_the_canonical_filename() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("stackup.yml"), MINIMAL).unwrap();
    std::fs::write(
        dir.path().join("stackup.yaml"),
        MINIMAL.replace("myapp", "other"),
    )
    .unwrap();

    let config = Config::discover(dir.path()).unwrap();
    assert_eq!(config.project.as_str(), "myapp");
}

#[test]
fn discover_falls_back_to_dotdir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".stackup")).unwrap();
    std::fs::write(dir.path().join(".stackup/config.yml"), MINIMAL).unwrap();

    let config = Config::discover(dir.path()).unwrap();
    assert_eq!(config.project.as_str(), "myapp");
}

#[test]
fn discover_without_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::discover(dir.path()).is_err());
}

#[test]
fn init_writes_a_loadable_template() {
    let dir = tempfile::tempdir().unwrap();

    init_config(dir.path(), false).unwrap();

    let config = Config::discover(dir.path()).unwrap();
    assert_eq!(config.infrastructure.len(), 3);
    assert_eq!(config.applications.len(), 1);
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILENAME);
    std::fs::write(&path, "project: keep\n").unwrap();

    assert!(init_config(dir.path(), false).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "project: keep\n");

    init_config(dir.path(), true).unwrap();
    assert!(std::fs::read_to_string(&path).unwrap().contains("mongo"));
}
