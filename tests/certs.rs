// ABOUTME: Integration tests for TLS provisioning.
// ABOUTME: Verifies generation, chain contents, and the idempotence short-circuit.

use stackup::certs::{ensure_certificate, CERT_FILENAME, CHAIN_FILENAME, KEY_FILENAME};

#[test]
fn creates_key_cert_and_chain() {
    let dir = tempfile::tempdir().unwrap();

    let bundle = ensure_certificate(dir.path(), "myapp.local").unwrap();

    assert_eq!(bundle.key_path, dir.path().join(KEY_FILENAME));
    assert_eq!(bundle.cert_path, dir.path().join(CERT_FILENAME));
    assert_eq!(bundle.chain_path, dir.path().join(CHAIN_FILENAME));

    let key = std::fs::read_to_string(&bundle.key_path).unwrap();
    assert!(key.contains("BEGIN PRIVATE KEY"));

    let cert = std::fs::read_to_string(&bundle.cert_path).unwrap();
    assert!(cert.contains("BEGIN CERTIFICATE"));

    // Chain carries the leaf followed by the CA certificate.
    let chain = std::fs::read_to_string(&bundle.chain_path).unwrap();
    assert_eq!(chain.matches("BEGIN CERTIFICATE").count(), 2);
    assert!(chain.starts_with(cert.trim_end_matches('\n')));
}

#[test]
fn existing_key_and_cert_are_never_regenerated() {
    let dir = tempfile::tempdir().unwrap();

    ensure_certificate(dir.path(), "myapp.local").unwrap();
    let key_before = std::fs::read(dir.path().join(KEY_FILENAME)).unwrap();
    let cert_before = std::fs::read(dir.path().join(CERT_FILENAME)).unwrap();

    // A second call must not touch the trusted material.
    ensure_certificate(dir.path(), "myapp.local").unwrap();

    assert_eq!(std::fs::read(dir.path().join(KEY_FILENAME)).unwrap(), key_before);
    assert_eq!(std::fs::read(dir.path().join(CERT_FILENAME)).unwrap(), cert_before);
}

#[test]
fn missing_cert_triggers_regeneration() {
    let dir = tempfile::tempdir().unwrap();

    ensure_certificate(dir.path(), "myapp.local").unwrap();
    std::fs::remove_file(dir.path().join(CERT_FILENAME)).unwrap();
    let key_before = std::fs::read(dir.path().join(KEY_FILENAME)).unwrap();

    ensure_certificate(dir.path(), "myapp.local").unwrap();

    // An incomplete pair is replaced wholesale.
    assert!(dir.path().join(CERT_FILENAME).exists());
    assert_ne!(std::fs::read(dir.path().join(KEY_FILENAME)).unwrap(), key_before);
}

#[test]
fn unwritable_root_is_fatal() {
    let missing = std::path::Path::new("/proc/definitely-not-writable");
    assert!(ensure_certificate(missing, "myapp.local").is_err());
}
