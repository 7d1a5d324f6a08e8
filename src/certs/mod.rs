// ABOUTME: Local TLS provisioning - generates a development CA and leaf certificate.
// ABOUTME: Idempotent: existing key and cert are never regenerated.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair, SanType};
use thiserror::Error;

pub const KEY_FILENAME: &str = "key.pem";
pub const CERT_FILENAME: &str = "cert.pem";
pub const CHAIN_FILENAME: &str = "fullchain.pem";

const ORGANIZATION: &str = "Stackup Local Dev";
const VALIDITY_DAYS: u64 = 365;

#[derive(Debug, Error)]
pub enum CertError {
    #[error("failed to generate certificate: {0}")]
    Generation(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Paths of the key/certificate/chain triple under the workspace root.
///
/// A durable artifact: created once per workspace, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CertificateBundle {
    pub key_path: PathBuf,
    pub cert_path: PathBuf,
    pub chain_path: PathBuf,
}

impl CertificateBundle {
    fn under(root: &Path) -> Self {
        Self {
            key_path: root.join(KEY_FILENAME),
            cert_path: root.join(CERT_FILENAME),
            chain_path: root.join(CHAIN_FILENAME),
        }
    }
}

/// Ensure the key/cert/chain triple exists under `root`, generating a CA and
/// leaf certificate only when absent.
///
/// The short-circuit on an existing key+cert pair is load-bearing:
/// regenerating would silently invalidate a CA the developer has already
/// added to their system trust store.
pub fn ensure_certificate(root: &Path, hostname: &str) -> Result<CertificateBundle, CertError> {
    let bundle = CertificateBundle::under(root);

    if bundle.key_path.exists() && bundle.cert_path.exists() {
        tracing::debug!("TLS key and certificate already exist, keeping them");
        return Ok(bundle);
    }

    let not_before = SystemTime::now();
    let not_after = not_before + Duration::from_secs(VALIDITY_DAYS * 24 * 60 * 60);

    // Development CA
    let mut ca_params = CertificateParams::new(Vec::<String>::new())
        .map_err(|e| CertError::Generation(e.to_string()))?;
    ca_params.distinguished_name = DistinguishedName::new();
    ca_params
        .distinguished_name
        .push(DnType::OrganizationName, ORGANIZATION);
    ca_params
        .distinguished_name
        .push(DnType::CommonName, "Stackup Local Dev CA");
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    ca_params.not_before = not_before.into();
    ca_params.not_after = not_after.into();

    let ca_key = KeyPair::generate().map_err(|e| CertError::Generation(e.to_string()))?;
    let ca_cert = ca_params
        .self_signed(&ca_key)
        .map_err(|e| CertError::Generation(e.to_string()))?;

    // Leaf certificate for the local development domains
    let mut params = CertificateParams::new(vec!["localhost".to_string(), hostname.to_string()])
        .map_err(|e| CertError::Generation(e.to_string()))?;
    params.distinguished_name = DistinguishedName::new();
    params
        .distinguished_name
        .push(DnType::OrganizationName, ORGANIZATION);
    params.distinguished_name.push(DnType::CommonName, hostname);
    params.subject_alt_names.push(SanType::IpAddress(
        "127.0.0.1"
            .parse()
            .map_err(|e| CertError::Generation(format!("invalid loopback address: {e}")))?,
    ));
    params.not_before = not_before.into();
    params.not_after = not_after.into();

    let leaf_key = KeyPair::generate().map_err(|e| CertError::Generation(e.to_string()))?;
    let leaf_cert = params
        .signed_by(&leaf_key, &ca_cert, &ca_key)
        .map_err(|e| CertError::Generation(e.to_string()))?;

    write_pem(&bundle.key_path, &leaf_key.serialize_pem())?;
    write_pem(&bundle.cert_path, &leaf_cert.pem())?;
    write_pem(
        &bundle.chain_path,
        &format!("{}\n{}", leaf_cert.pem(), ca_cert.pem()),
    )?;

    tracing::info!("created TLS key, certificate and chain in {}", root.display());
    Ok(bundle)
}

fn write_pem(path: &Path, pem: &str) -> Result<(), CertError> {
    std::fs::write(path, pem).map_err(|source| CertError::Write {
        path: path.to_path_buf(),
        source,
    })
}
