//! Mock transcoder for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::transcoder::{
    DerivedMetadata, EncodeMode, TranscodeError, TranscodeOutput, TranscodeRequest,
    TranscodeResult, Transcoder,
};

/// Mock implementation of the Transcoder trait.
///
/// Provides controllable behavior for testing:
/// - Track transcode requests for assertions
/// - Simulate failures and slow runs
/// - Write an output sized as a fraction of the input
/// - Observe how many transcodes ran at the same time
///
/// # Example
///
/// ```rust,ignore
/// use squish_core::testing::MockTranscoder;
///
/// let transcoder = MockTranscoder::new();
/// transcoder.set_delay(Duration::from_millis(50)).await;
///
/// // ... run jobs ...
///
/// assert_eq!(transcoder.request_count().await, 3);
/// assert!(transcoder.peak_concurrency() <= 2);
/// ```
#[derive(Debug)]
pub struct MockTranscoder {
    requests: Arc<RwLock<Vec<TranscodeRequest>>>,
    /// If set, the next transcode fails with this error.
    next_error: Arc<RwLock<Option<TranscodeError>>>,
    delay: Arc<RwLock<Duration>>,
    /// Output size as a fraction of the input size.
    output_ratio: Arc<RwLock<f64>>,
    metadata: Arc<RwLock<DerivedMetadata>>,
    available: Arc<RwLock<bool>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder writing outputs at a quarter of the input size.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            output_ratio: Arc::new(RwLock::new(0.25)),
            metadata: Arc::new(RwLock::new(DerivedMetadata::default())),
            available: Arc::new(RwLock::new(true)),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Get all recorded requests.
    pub async fn requests(&self) -> Vec<TranscodeRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Configure the next transcode to fail with the given error.
    pub async fn set_next_error(&self, error: TranscodeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set how long each transcode takes.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    pub async fn set_output_ratio(&self, ratio: f64) {
        *self.output_ratio.write().await = ratio;
    }

    /// Set the metadata returned by probes and transcodes.
    pub async fn set_metadata(&self, metadata: DerivedMetadata) {
        *self.metadata.write().await = metadata;
    }

    pub async fn set_available(&self, available: bool) {
        *self.available.write().await = available;
    }

    /// Highest number of transcodes observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn run(&self, request: &TranscodeRequest, cancel: &CancellationToken) -> TranscodeResult {
        let started = Instant::now();
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(TranscodeError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if cancel.is_cancelled() {
            return Err(TranscodeError::Cancelled);
        }

        let input_size = tokio::fs::metadata(&request.input_path).await?.len();
        let ratio = *self.output_ratio.read().await;
        let output_size = (input_size as f64 * ratio).round() as u64;
        tokio::fs::write(&request.output_path, vec![0u8; output_size as usize]).await?;

        Ok(TranscodeOutput {
            output_path: request.output_path.clone(),
            output_size_bytes: output_size,
            metadata: self.metadata.read().await.clone(),
            mode: EncodeMode::Encoded,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(&self, request: TranscodeRequest, cancel: CancellationToken) -> TranscodeResult {
        self.requests.write().await.push(request.clone());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        let result = self.run(&request, &cancel).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn probe(&self, _path: &Path) -> Result<DerivedMetadata, TranscodeError> {
        Ok(self.metadata.read().await.clone())
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        if *self.available.read().await {
            Ok(())
        } else {
            Err(TranscodeError::Unavailable {
                path: PathBuf::from("mock"),
            })
        }
    }
}
