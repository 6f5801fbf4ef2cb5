//! Failure screenshots.
//!
//! The façade asks a [`Diagnostics`] collaborator for a screenshot whenever
//! an action fails. Capture problems are logged and swallowed: a broken
//! screenshot must never mask the failure that triggered it.
//!
//! [`ScreenshotStore`] writes each capture to
//! `<dir>/<label>_<YYYYmmdd_HHMMSS>_<8 hex>.png`. The random suffix keeps
//! parallel sessions that fail at the same second from overwriting each
//! other.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::driver::{BrowserDriver, DriverError};

#[derive(Error, Debug)]
pub enum DiagnosticsError {
    #[error("Screenshot capture failed: {0}")]
    Capture(#[from] DriverError),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A captured screenshot.
#[derive(Debug, Clone)]
pub struct ScreenshotArtifact {
    /// Sanitized label, e.g. `click_failed`.
    pub name: String,
    pub timestamp: DateTime<Utc>,
    /// PNG bytes.
    pub payload: Vec<u8>,
}

impl ScreenshotArtifact {
    pub fn new(label: &str, payload: Vec<u8>) -> Self {
        Self {
            name: sanitize_label(label),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Collision-free file name for this artifact.
    pub fn file_name(&self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "{}_{}_{}.png",
            self.name,
            self.timestamp.format("%Y%m%d_%H%M%S"),
            &suffix[..8]
        )
    }

    /// Base64 PNG, for report attachments.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.payload)
    }
}

/// Replaces anything but letters, digits, `-` and `_` with `_`.
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "screenshot".to_string()
    } else {
        cleaned
    }
}

/// Receives failure notifications from the façade.
#[async_trait]
pub trait Diagnostics: Send + Sync {
    /// Capture whatever is useful for `label`. Returns where the screenshot
    /// went, if anywhere. Must not fail.
    async fn capture_on_failure(&self, driver: &dyn BrowserDriver, label: &str) -> Option<PathBuf>;
}

/// Writes failure screenshots into a directory.
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Capture a screenshot and persist it. Errors are returned; see
    /// [`Diagnostics::capture_on_failure`] for the swallowing variant.
    pub async fn capture(
        &self,
        driver: &dyn BrowserDriver,
        label: &str,
    ) -> Result<(ScreenshotArtifact, PathBuf), DiagnosticsError> {
        let payload = driver.screenshot().await?;
        let artifact = ScreenshotArtifact::new(label, payload);
        let path = self.save(&artifact).await?;
        Ok((artifact, path))
    }

    /// Write an artifact to the store directory.
    pub async fn save(&self, artifact: &ScreenshotArtifact) -> Result<PathBuf, DiagnosticsError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DiagnosticsError::Write {
                path: self.dir.clone(),
                source,
            })?;
        let path = self.dir.join(artifact.file_name());
        tokio::fs::write(&path, &artifact.payload)
            .await
            .map_err(|source| DiagnosticsError::Write {
                path: path.clone(),
                source,
            })?;
        info!(label = %artifact.name, path = %path.display(), "Screenshot saved");
        Ok(path)
    }
}

#[async_trait]
impl Diagnostics for ScreenshotStore {
    async fn capture_on_failure(&self, driver: &dyn BrowserDriver, label: &str) -> Option<PathBuf> {
        match self.capture(driver, label).await {
            Ok((_, path)) => Some(path),
            Err(e) => {
                warn!(label, error = %e, "Failure screenshot not captured");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("click failed: #submit"), "click_failed___submit");
        assert_eq!(sanitize_label("login_error"), "login_error");
        assert_eq!(sanitize_label("登录异常"), "登录异常");
        assert_eq!(sanitize_label("  "), "screenshot");
    }

    #[test]
    fn test_file_names_do_not_collide() {
        let artifact = ScreenshotArtifact::new("type_text", vec![1, 2, 3]);
        let a = artifact.file_name();
        let b = artifact.file_name();
        assert_ne!(a, b);
        assert!(a.starts_with("type_text_"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn test_base64_payload() {
        let artifact = ScreenshotArtifact::new("x", b"PNG".to_vec());
        assert_eq!(artifact.to_base64(), "UE5H");
    }
}
