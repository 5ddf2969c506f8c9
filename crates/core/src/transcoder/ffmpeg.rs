//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::OnceCell;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::job::MediaKind;
use crate::metrics;
use crate::preset::PresetProfile;

use super::config::{TranscoderConfig, UnavailablePolicy};
use super::error::TranscodeError;
use super::traits::Transcoder;
use super::types::{DerivedMetadata, EncodeMode, TranscodeOutput, TranscodeRequest, TranscodeResult};

/// How the external process ended.
enum ProcessEnd {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

/// FFmpeg-based transcoder implementation.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
    available: OnceCell<bool>,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self {
            config,
            available: OnceCell::new(),
        }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    /// Builds ffmpeg arguments for one profile.
    fn build_args(&self, input_path: &Path, output_path: &Path, profile: &PresetProfile) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-threads".to_string(),
            self.config.thread_cap.to_string(),
        ];

        match &profile.video {
            Some(video) => {
                args.extend([
                    "-vf".to_string(),
                    format!("scale=-2:{}", video.height),
                    "-r".to_string(),
                    video.fps.to_string(),
                    "-c:v".to_string(),
                    video.codec.ffmpeg_codec().to_string(),
                    "-preset".to_string(),
                    video.encoder_preset.clone(),
                    "-crf".to_string(),
                    video.crf.to_string(),
                ]);
            }
            // Drop embedded cover art and any other video streams
            None => args.push("-vn".to_string()),
        }

        let audio = &profile.audio;
        args.extend([
            "-c:a".to_string(),
            audio.codec.ffmpeg_codec().to_string(),
            "-b:a".to_string(),
            format!("{}k", audio.bitrate_kbps),
            "-ac".to_string(),
            audio.channels.to_string(),
        ]);
        if let Some(rate) = audio.sample_rate_hz {
            args.extend(["-ar".to_string(), rate.to_string()]);
        }

        if profile.video.is_some() {
            args.extend(["-movflags".to_string(), "+faststart".to_string()]);
        }

        args.extend([
            "-f".to_string(),
            profile.container.ffmpeg_format().to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        // Output
        args.push(output_path.to_string_lossy().to_string());

        args
    }

    /// Parses ffprobe JSON output.
    fn parse_probe_output(output: &str) -> Result<DerivedMetadata, TranscodeError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            width: Option<u32>,
            height: Option<u32>,
        }

        let probe: ProbeOutput = serde_json::from_str(output)
            .map_err(|e| TranscodeError::probe(format!("Failed to parse ffprobe output: {}", e)))?;

        let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");

        Ok(DerivedMetadata {
            duration_secs: probe
                .format
                .duration
                .as_ref()
                .and_then(|d| d.parse::<f64>().ok()),
            width: video_stream.and_then(|s| s.width),
            height: video_stream.and_then(|s| s.height),
        })
    }

    /// Runs `-version` once; later calls reuse the answer.
    async fn check_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| async {
                let status = Command::new(&self.config.ffmpeg_path)
                    .arg("-version")
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .status()
                    .await;

                match status {
                    Ok(status) if status.success() => {
                        info!(path = %self.config.ffmpeg_path.display(), "FFmpeg available");
                        true
                    }
                    Ok(status) => {
                        warn!(
                            path = %self.config.ffmpeg_path.display(),
                            code = ?status.code(),
                            "FFmpeg -version failed"
                        );
                        false
                    }
                    Err(e) => {
                        warn!(
                            path = %self.config.ffmpeg_path.display(),
                            error = %e,
                            "FFmpeg not found"
                        );
                        false
                    }
                }
            })
            .await
    }

    /// Applies the unavailable policy: copy audio unchanged, fail everything else.
    async fn transcode_unavailable(&self, request: &TranscodeRequest, start: Instant) -> TranscodeResult {
        let unavailable = || TranscodeError::Unavailable {
            path: self.config.ffmpeg_path.clone(),
        };

        if request.profile.kind != MediaKind::Audio
            || self.config.unavailable_audio != UnavailablePolicy::Copy
        {
            return Err(unavailable());
        }

        // Keep the input's extension; the bytes are not re-encoded.
        let output_path = match request.input_path.extension() {
            Some(ext) => request.output_path.with_extension(ext),
            None => request.output_path.clone(),
        };

        warn!(
            job_id = %request.job_id,
            "FFmpeg unavailable, delivering audio without re-encoding"
        );
        metrics::TRANSCODE_FALLBACKS.inc();

        let output_size_bytes = tokio::fs::copy(&request.input_path, &output_path).await?;

        Ok(TranscodeOutput {
            output_path,
            output_size_bytes,
            metadata: DerivedMetadata::default(),
            mode: EncodeMode::PassthroughCopy,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Kills the process and removes whatever it wrote.
    async fn abort(&self, child: &mut Child, output_path: &Path) {
        if let Err(e) = child.kill().await {
            debug!(error = %e, "Failed to kill ffmpeg (already exited?)");
        }
        remove_partial_output(output_path).await;
    }

    async fn probe_or_empty(&self, path: &Path) -> DerivedMetadata {
        match self.probe(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Probe failed, continuing without metadata");
                DerivedMetadata::default()
            }
        }
    }
}

/// Reads a stream to its end, keeping only the last `max_lines` lines.
async fn collect_tail<R: AsyncRead + Unpin>(reader: R, max_lines: usize) -> String {
    let mut lines = BufReader::new(reader).lines();
    let mut tail = VecDeque::with_capacity(max_lines);

    while let Ok(Some(line)) = lines.next_line().await {
        if tail.len() == max_lines {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    Vec::from(tail).join("\n")
}

async fn remove_partial_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial output"),
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(&self, request: TranscodeRequest, cancel: CancellationToken) -> TranscodeResult {
        let start = Instant::now();

        if !self.check_available().await {
            return self.transcode_unavailable(&request, start).await;
        }

        let args = self.build_args(&request.input_path, &request.output_path, &request.profile);
        debug!(job_id = %request.job_id, ?args, "Spawning ffmpeg");

        let spawned = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return self.transcode_unavailable(&request, start).await;
            }
            Err(e) => return Err(TranscodeError::Io(e)),
        };

        let max_lines = self.config.diagnostic_lines;
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(collect_tail(stderr, max_lines)));

        let end = tokio::select! {
            status = child.wait() => ProcessEnd::Exited(status),
            _ = tokio::time::sleep(request.timeout) => ProcessEnd::TimedOut,
            _ = cancel.cancelled() => ProcessEnd::Cancelled,
        };

        let status = match end {
            ProcessEnd::Exited(Ok(status)) => status,
            ProcessEnd::Exited(Err(e)) => {
                self.abort(&mut child, &request.output_path).await;
                return Err(TranscodeError::Io(e));
            }
            ProcessEnd::TimedOut => {
                self.abort(&mut child, &request.output_path).await;
                if let Some(task) = stderr_task {
                    task.abort();
                }
                warn!(
                    job_id = %request.job_id,
                    timeout_secs = request.timeout.as_secs(),
                    "FFmpeg timed out, process killed"
                );
                return Err(TranscodeError::Timeout {
                    timeout_secs: request.timeout.as_secs(),
                });
            }
            ProcessEnd::Cancelled => {
                self.abort(&mut child, &request.output_path).await;
                if let Some(task) = stderr_task {
                    task.abort();
                }
                info!(job_id = %request.job_id, "FFmpeg cancelled, process killed");
                return Err(TranscodeError::Cancelled);
            }
        };

        if !status.success() {
            let diagnostics = match stderr_task {
                Some(task) => task.await.unwrap_or_default(),
                None => String::new(),
            };
            remove_partial_output(&request.output_path).await;
            warn!(
                job_id = %request.job_id,
                code = ?status.code(),
                diagnostics = %diagnostics,
                "FFmpeg failed"
            );
            return Err(TranscodeError::NonZeroExit {
                code: status.code(),
                diagnostics,
            });
        }

        if let Some(task) = stderr_task {
            task.abort();
        }

        let output_size_bytes = tokio::fs::metadata(&request.output_path).await?.len();
        let metadata = self.probe_or_empty(&request.input_path).await;

        Ok(TranscodeOutput {
            output_path: request.output_path,
            output_size_bytes,
            metadata,
            mode: EncodeMode::Encoded,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn probe(&self, path: &Path) -> Result<DerivedMetadata, TranscodeError> {
        let command = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = timeout(Duration::from_secs(self.config.probe_timeout_secs), command)
            .await
            .map_err(|_| TranscodeError::probe("ffprobe timed out"))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::probe(format!(
                        "ffprobe not found at path: {}",
                        self.config.ffprobe_path.display()
                    ))
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(TranscodeError::probe(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(&stdout)
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        if self.check_available().await {
            Ok(())
        } else {
            Err(TranscodeError::Unavailable {
                path: self.config.ffmpeg_path.clone(),
            })
        }
    }

    async fn is_available(&self) -> bool {
        self.check_available().await
    }
}

/// Output path for a job: `<dir>/<stem>.<container extension>`.
pub fn output_path_for(dir: &Path, stem: &str, profile: &PresetProfile) -> PathBuf {
    dir.join(format!("{}.{}", stem, profile.container.extension()))
}
