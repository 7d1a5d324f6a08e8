// ABOUTME: Base image freshness check - decides whether a rebuild is required.
// ABOUTME: Queries the container runtime for image existence and creation time.

use chrono::{DateTime, Utc};

use crate::process::CommandRunner;

/// Fixed staleness policy: rebuild when the cached image is older than this.
pub const STALENESS_THRESHOLD_DAYS: i64 = 7;

/// Determine whether the base image tagged `tag` is missing or stale.
///
/// A missing image always forces a rebuild. When the creation timestamp
/// cannot be determined (transient runtime fault, unparseable metadata) the
/// image is kept: a stale-but-present image is still usable, and a no-cache
/// rebuild is expensive.
pub async fn should_rebuild<R: CommandRunner + ?Sized>(runner: &R, tag: &str) -> bool {
    match runner.output("docker", &["image", "ls", "-q", tag]).await {
        Ok(out) if out.status.success() => {
            if String::from_utf8_lossy(&out.stdout).trim().is_empty() {
                tracing::info!(%tag, "base image not present, rebuild required");
                return true;
            }
        }
        _ => {
            tracing::info!(%tag, "could not list base image, rebuild required");
            return true;
        }
    }

    let Some(created) = image_created_at(runner, tag).await else {
        tracing::warn!(%tag, "could not determine image age, keeping existing image");
        return false;
    };

    let age = Utc::now().signed_duration_since(created);
    let stale = age > chrono::Duration::days(STALENESS_THRESHOLD_DAYS);
    if stale {
        tracing::info!(%tag, age_days = age.num_days(), "base image is stale, rebuild required");
    } else {
        tracing::debug!(%tag, age_days = age.num_days(), "base image is fresh");
    }
    stale
}

/// Creation timestamp from `docker image inspect`, or None when the query or
/// the metadata parse fails.
async fn image_created_at<R: CommandRunner + ?Sized>(
    runner: &R,
    tag: &str,
) -> Option<DateTime<Utc>> {
    let out = runner
        .output("docker", &["image", "inspect", tag])
        .await
        .ok()?;
    if !out.status.success() {
        return None;
    }

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).ok()?;
    let created = value.get(0)?.get("Created")?.as_str()?;
    DateTime::parse_from_rfc3339(created)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
