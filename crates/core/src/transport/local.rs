//! Filesystem transport: inbox in, per-user outbox out.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::job::UserId;

use super::config::LocalTransportConfig;
use super::error::TransportError;
use super::traits::Transport;
use super::types::{DeliveryMetadata, InputDescriptor, OutputDescriptor};

const MESSAGES_LOG: &str = "messages.log";

/// Transport backed by two local directories.
pub struct LocalTransport {
    config: LocalTransportConfig,
}

impl LocalTransport {
    pub fn new(config: LocalTransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocalTransportConfig {
        &self.config
    }

    /// Per-user outbox directory.
    pub fn user_dir(&self, user_id: UserId) -> PathBuf {
        self.config.outbox_dir.join(user_id.to_string())
    }

    /// Resolves a location to a path inside the inbox.
    ///
    /// Only plain relative paths are accepted, and the resolved file must not
    /// leave the inbox through a symlink.
    pub async fn resolve_input(&self, location: &str) -> Result<PathBuf, TransportError> {
        let relative = Path::new(location);
        if location.is_empty() {
            return Err(TransportError::invalid_location(location, "empty location"));
        }
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(TransportError::invalid_location(
                location,
                "must be a relative path inside the inbox",
            ));
        }

        let candidate = self.config.inbox_dir.join(relative);
        let resolved = match fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TransportError::NotFound {
                    location: location.to_string(),
                })
            }
            Err(e) => {
                return Err(TransportError::FetchFailed {
                    location: location.to_string(),
                    source: e,
                })
            }
        };

        let inbox = fs::canonicalize(&self.config.inbox_dir)
            .await
            .map_err(|e| TransportError::FetchFailed {
                location: location.to_string(),
                source: e,
            })?;

        if !resolved.starts_with(&inbox) {
            return Err(TransportError::invalid_location(location, "escapes the inbox"));
        }
        if !resolved.is_file() {
            return Err(TransportError::invalid_location(location, "not a regular file"));
        }

        Ok(resolved)
    }

    async fn ensure_user_dir(&self, user_id: UserId) -> std::io::Result<PathBuf> {
        let dir = self.user_dir(user_id);
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }
}

#[async_trait]
impl Transport for LocalTransport {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, input: &InputDescriptor, dest: &Path) -> Result<u64, TransportError> {
        let source = self.resolve_input(&input.location).await?;
        let bytes = fs::copy(&source, dest)
            .await
            .map_err(|e| TransportError::FetchFailed {
                location: input.location.clone(),
                source: e,
            })?;

        debug!(location = %input.location, bytes, "Fetched input");
        Ok(bytes)
    }

    async fn deliver(
        &self,
        user_id: UserId,
        output: &OutputDescriptor,
        metadata: &DeliveryMetadata,
    ) -> Result<(), TransportError> {
        let delivery_failed = |source: std::io::Error| TransportError::DeliveryFailed {
            user_id,
            path: output.path.clone(),
            source,
        };

        let dir = self.ensure_user_dir(user_id).await.map_err(delivery_failed)?;
        let dest = dir.join(&output.file_name);
        fs::copy(&output.path, &dest).await.map_err(delivery_failed)?;

        let sidecar = dir.join(format!("{}.json", output.file_name));
        let json = serde_json::to_vec_pretty(metadata)
            .map_err(|e| delivery_failed(std::io::Error::other(e)))?;
        fs::write(&sidecar, json).await.map_err(delivery_failed)?;

        info!(
            user_id = %user_id,
            job_id = %metadata.job_id,
            path = %dest.display(),
            size_bytes = output.size_bytes,
            "Delivered output"
        );
        Ok(())
    }

    async fn notify(&self, user_id: UserId, text: &str) -> Result<(), TransportError> {
        info!(user_id = %user_id, "Message: {}", text);

        let write = async {
            let dir = self.ensure_user_dir(user_id).await?;
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(MESSAGES_LOG))
                .await?;
            let entry = format!("[{}] {}\n", Utc::now().to_rfc3339(), text);
            file.write_all(entry.as_bytes()).await?;
            file.flush().await
        };

        write
            .await
            .map_err(|e| TransportError::notify_failed(user_id, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{CompressionSummary, JobId, MediaKind};
    use crate::preset::PresetLevel;
    use crate::transcoder::{DerivedMetadata, EncodeMode};
    use tempfile::TempDir;

    fn setup() -> (TempDir, LocalTransport) {
        let root = TempDir::new().unwrap();
        let inbox = root.path().join("inbox");
        let outbox = root.path().join("outbox");
        std::fs::create_dir_all(&inbox).unwrap();
        let transport = LocalTransport::new(LocalTransportConfig::new(inbox, outbox));
        (root, transport)
    }

    fn metadata() -> DeliveryMetadata {
        DeliveryMetadata {
            job_id: JobId::new(),
            preset: PresetLevel::High,
            summary: CompressionSummary::new(100, 40),
            derived: DerivedMetadata::default(),
            mode: EncodeMode::Encoded,
            caption: "done".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_copies_from_inbox() {
        let (root, transport) = setup();
        std::fs::create_dir_all(root.path().join("inbox/u1")).unwrap();
        std::fs::write(root.path().join("inbox/u1/song.ogg"), b"audio-bytes").unwrap();

        let dest = root.path().join("work-input");
        let bytes = transport
            .fetch(&InputDescriptor::new("u1/song.ogg", 11), &dest)
            .await
            .unwrap();

        assert_eq!(bytes, 11);
        assert_eq!(std::fs::read(&dest).unwrap(), b"audio-bytes");
    }

    #[tokio::test]
    async fn test_fetch_rejects_escaping_paths() {
        let (root, transport) = setup();
        std::fs::write(root.path().join("secret.txt"), b"x").unwrap();
        let dest = root.path().join("out");

        for location in ["../secret.txt", "/etc/passwd", "u1/../../secret.txt"] {
            let err = transport
                .fetch(&InputDescriptor::new(location, 1), &dest)
                .await
                .unwrap_err();
            assert!(
                matches!(err, TransportError::InvalidLocation { .. }),
                "{} should be rejected, got {:?}",
                location,
                err
            );
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_rejects_symlink_escape() {
        let (root, transport) = setup();
        std::fs::write(root.path().join("secret.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(
            root.path().join("secret.txt"),
            root.path().join("inbox/link.txt"),
        )
        .unwrap();

        let err = transport
            .fetch(&InputDescriptor::new("link.txt", 1), &root.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidLocation { .. }));
    }

    #[tokio::test]
    async fn test_fetch_missing_input() {
        let (root, transport) = setup();
        let err = transport
            .fetch(&InputDescriptor::new("nope.mp4", 1), &root.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deliver_writes_file_and_sidecar() {
        let (root, transport) = setup();
        let produced = root.path().join("result.mp3");
        std::fs::write(&produced, b"compressed").unwrap();

        let output = OutputDescriptor {
            path: produced,
            file_name: "song_compressed.mp3".to_string(),
            size_bytes: 10,
            media_kind: MediaKind::Audio,
        };
        transport
            .deliver(UserId(42), &output, &metadata())
            .await
            .unwrap();

        let user_dir = transport.user_dir(UserId(42));
        assert_eq!(
            std::fs::read(user_dir.join("song_compressed.mp3")).unwrap(),
            b"compressed"
        );
        let sidecar = std::fs::read_to_string(user_dir.join("song_compressed.mp3.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
        assert_eq!(parsed["preset"], "high");
    }

    #[tokio::test]
    async fn test_notify_appends_messages() {
        let (_root, transport) = setup();
        transport.notify(UserId(7), "first").await.unwrap();
        transport.notify(UserId(7), "second").await.unwrap();

        let log = std::fs::read_to_string(transport.user_dir(UserId(7)).join(MESSAGES_LOG)).unwrap();
        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
    }
}
