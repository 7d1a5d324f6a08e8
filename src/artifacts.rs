// ABOUTME: Per-service configuration artifact writer.
// ABOUTME: Opaque succeed-or-abort writes to paths owned by the application projects.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One configuration file to materialize before the stack starts.
///
/// Contents are opaque to the orchestrator; the consuming projects own the
/// format.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    pub path: PathBuf,
    pub contents: String,
}

/// Write every artifact relative to the workspace root, creating parent
/// directories as needed. The first failure aborts.
pub fn write_artifacts(root: &Path, artifacts: &[ArtifactConfig]) -> Result<(), ArtifactError> {
    for artifact in artifacts {
        let path = root.join(&artifact.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ArtifactError::Write {
                path: path.clone(),
                source,
            })?;
        }
        std::fs::write(&path, &artifact.contents).map_err(|source| ArtifactError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("wrote artifact {}", path.display());
    }
    Ok(())
}
