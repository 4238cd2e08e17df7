use super::dto::SynthesisRequest;
use super::error::TtsServiceError;
use super::planner::Chunk;
use super::stream::SegmentStream;
use super::voice::{VoiceLookup, VoiceRegistry, VoiceShaping};
use crate::infrastructure::audio::{apply_speed, encode_wav};
use crate::infrastructure::model::{ModelHandle, ModelParams};
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};

/// Rendered audio for one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSegment {
    /// Zero-based chunk index
    pub index: usize,
    pub total: usize,
    pub bytes: Vec<u8>,
}

impl AudioSegment {
    /// One-based position, as reported to clients
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

/// Advisory count of in-flight synthesis requests
#[derive(Debug, Clone, Default)]
pub struct ActiveRequests(Arc<AtomicUsize>);

impl ActiveRequests {
    pub fn enter(&self) -> ActiveRequestGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        ActiveRequestGuard(self.0.clone())
    }

    pub fn current(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Decrements the counter when the request finishes, fails or is dropped
#[derive(Debug)]
pub struct ActiveRequestGuard(Arc<AtomicUsize>);

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Everything a producer task needs about one request
struct Job {
    request: SynthesisRequest,
    voice_prompt: Option<PathBuf>,
    exaggeration: f32,
}

/// Serializes model access and renders chunks in order.
///
/// The model lock is held only around the model call. Resampling and WAV
/// encoding run on the blocking pool, bounded by `max_workers` permits, so
/// one request's encoding never delays another request's model call.
#[derive(Clone)]
pub struct SynthesisScheduler {
    model: ModelHandle,
    voices: Arc<VoiceRegistry>,
    shaping: VoiceShaping,
    encoders: Arc<Semaphore>,
    max_workers: usize,
}

impl SynthesisScheduler {
    pub fn new(
        model: ModelHandle,
        voices: Arc<VoiceRegistry>,
        shaping: VoiceShaping,
        max_workers: usize,
    ) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            model,
            voices,
            shaping,
            encoders: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn voices(&self) -> &VoiceRegistry {
        &self.voices
    }

    /// Start rendering `chunks` and return the ordered segment stream.
    ///
    /// Rendering happens on a spawned task. Dropping the returned stream
    /// cancels it at the next chunk boundary; a model call already running
    /// completes and its result is discarded.
    pub fn stream(
        &self,
        request: SynthesisRequest,
        chunks: Vec<Chunk>,
        guard: ActiveRequestGuard,
    ) -> Result<SegmentStream, TtsServiceError> {
        let job = self.prepare_job(request)?;
        let total = chunks.len();
        let (tx, rx) = mpsc::channel(1);
        let scheduler = self.clone();

        tokio::spawn(async move {
            let _guard = guard;
            scheduler.produce(job, chunks, tx).await;
        });

        Ok(SegmentStream::new(rx, total))
    }

    /// Render the whole request text as a single segment
    pub async fn synthesize_once(
        &self,
        request: SynthesisRequest,
        guard: ActiveRequestGuard,
    ) -> Result<AudioSegment, TtsServiceError> {
        let job = self.prepare_job(request)?;
        let scheduler = self.clone();

        // Spawned so a dropped caller cannot interrupt a call holding the model lock
        tokio::spawn(async move {
            let _guard = guard;
            let text = job.request.text.clone();
            scheduler
                .render_chunk(&job, 0, 1, &text, std::future::pending())
                .await
        })
        .await
        .map_err(|e| TtsServiceError::Other(anyhow::anyhow!("synthesis task failed: {}", e)))?
    }

    fn prepare_job(&self, request: SynthesisRequest) -> Result<Job, TtsServiceError> {
        let voice_prompt = match self.voices.lookup(request.voice) {
            VoiceLookup::Neutral => None,
            VoiceLookup::Ready(handle) => Some(handle.path().to_path_buf()),
            VoiceLookup::NotLoaded => {
                return Err(TtsServiceError::ResourceUnavailable(format!(
                    "voice profile '{}' is not loaded",
                    request.voice
                )))
            }
        };
        let exaggeration = self.shaping.shape(request.voice, request.exaggeration);

        Ok(Job {
            request,
            voice_prompt,
            exaggeration,
        })
    }

    async fn produce(
        &self,
        job: Job,
        chunks: Vec<Chunk>,
        tx: mpsc::Sender<Result<AudioSegment, TtsServiceError>>,
    ) {
        let total = chunks.len();

        for (index, chunk) in chunks.iter().enumerate() {
            // Waits until the previous segment was taken by the consumer
            let Ok(permit) = tx.reserve().await else {
                tracing::debug!(chunk = index, total, "Consumer gone, stopping synthesis");
                return;
            };

            match self
                .render_chunk(&job, index, total, &chunk.text, tx.closed())
                .await
            {
                Ok(segment) => {
                    if tx.is_closed() {
                        tracing::debug!(chunk = index, total, "Consumer gone, discarding rendered chunk");
                        return;
                    }
                    permit.send(Ok(segment));
                }
                Err(TtsServiceError::Cancelled) => {
                    tracing::debug!(chunk = index, total, "Stream cancelled while waiting for the model");
                    return;
                }
                Err(e) => {
                    tracing::error!(
                        chunk = index,
                        total,
                        language = %job.request.language,
                        error = %e,
                        "Streaming synthesis failed"
                    );
                    permit.send(Err(e));
                    return;
                }
            }
        }
    }

    async fn render_chunk(
        &self,
        job: &Job,
        index: usize,
        total: usize,
        text: &str,
        cancelled: impl Future<Output = ()>,
    ) -> Result<AudioSegment, TtsServiceError> {
        let start_time = Instant::now();
        let request = &job.request;

        let raw = {
            let mut model = tokio::select! {
                guard = self.model.lock() => guard,
                _ = cancelled => return Err(TtsServiceError::Cancelled),
            };
            model
                .synthesize(ModelParams {
                    text,
                    language: request.language,
                    voice_prompt: job.voice_prompt.as_deref(),
                    temperature: request.temperature,
                    cfg_weight: request.cfg_weight,
                    exaggeration: job.exaggeration,
                })
                .await
                .map_err(|source| TtsServiceError::SynthesisFailure {
                    chunk_index: index,
                    source,
                })?
        };

        let permit = self
            .encoders
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| TtsServiceError::Other(e.into()))?;
        let speed = request.speed;
        let bytes = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let samples = apply_speed(&raw.samples, speed);
            encode_wav(&samples, raw.sample_rate)
        })
        .await
        .map_err(|e| TtsServiceError::Other(anyhow::anyhow!("encoding task failed: {}", e)))?
        .map_err(|e| TtsServiceError::Other(e.into()))?;

        tracing::debug!(
            chunk = index + 1,
            total,
            language = %request.language,
            elapsed_ms = start_time.elapsed().as_millis(),
            bytes = bytes.len(),
            "Chunk generated"
        );

        Ok(AudioSegment {
            index,
            total,
            bytes,
        })
    }
}
