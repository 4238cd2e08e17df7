use super::dto::{SpeechRequest, SynthesisRequest};
use super::error::TtsServiceError;
use super::language::{build_detector, detect_language, LanguageCode};
use super::planner::{plan, ChunkOptions, ChunkPolicy};
use super::scheduler::{ActiveRequests, SynthesisScheduler};
use super::stream::SegmentStream;
use super::voice::{VoiceIdentity, VoiceRegistry, VoiceShaping};
use crate::infrastructure::model::{into_handle, ModelParams, SpeechModel};
use async_trait::async_trait;
use lingua::LanguageDetector;
use moka::future::Cache;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

const WARMUP_TEXT: &str = "Initialization test.";

/// Streaming synthesis in progress
pub struct StreamingSynthesis {
    pub language: LanguageCode,
    pub voice: VoiceIdentity,
    pub segments: SegmentStream,
}

/// Complete audio for a non-streaming request
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub language: LanguageCode,
    pub voice: VoiceIdentity,
    pub audio: Arc<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoicesLoaded {
    pub female: bool,
    pub male: bool,
}

/// Point-in-time service state for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub model_ready: bool,
    pub voices_loaded: VoicesLoaded,
    pub active_requests: usize,
    pub max_workers: usize,
}

/// Service-wide knobs, fixed at startup
#[derive(Debug, Clone)]
pub struct TtsSettings {
    pub policy: ChunkPolicy,
    pub shaping: VoiceShaping,
    pub max_workers: usize,
    pub cache_enabled: bool,
    /// Profiles to prepare during initialization
    pub voice_paths: Vec<(VoiceIdentity, PathBuf)>,
    pub warmup: bool,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            policy: ChunkPolicy::default(),
            shaping: VoiceShaping::default(),
            max_workers: 3,
            cache_enabled: false,
            voice_paths: Vec::new(),
            warmup: true,
        }
    }
}

pub struct TtsService {
    scheduler: OnceLock<SynthesisScheduler>,
    settings: TtsSettings,
    active: ActiveRequests,
    language_detector: Arc<LanguageDetector>,
    cache: Option<Cache<String, SynthesisOutput>>,
}

impl TtsService {
    pub fn new(settings: TtsSettings) -> Self {
        let cache = if settings.cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(100)
                    .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                    .build(),
            )
        } else {
            None
        };

        Self {
            scheduler: OnceLock::new(),
            settings,
            active: ActiveRequests::default(),
            language_detector: Arc::new(build_detector()),
            cache,
        }
    }

    /// Prepare voices, warm the model up and make it available.
    ///
    /// Runs in the background at startup. Voice and warmup failures are
    /// logged and never abort initialization.
    pub async fn initialize(&self, mut model: Box<dyn SpeechModel>) {
        let start_time = Instant::now();
        tracing::info!(
            voices = self.settings.voice_paths.len(),
            warmup = self.settings.warmup,
            "Initializing synthesis engine"
        );

        let voices = VoiceRegistry::load(
            model.as_mut(),
            &self.settings.voice_paths,
            &self.settings.shaping,
        )
        .await;

        if self.settings.warmup {
            let warmup = model
                .synthesize(ModelParams {
                    text: WARMUP_TEXT,
                    language: LanguageCode::English,
                    voice_prompt: None,
                    temperature: 0.6,
                    cfg_weight: 0.35,
                    exaggeration: 0.25,
                })
                .await;
            match warmup {
                Ok(audio) => tracing::info!(samples = audio.samples.len(), "Model warmup complete"),
                Err(e) => tracing::warn!(error = %e, "Model warmup failed, continuing"),
            }
        }

        self.install(SynthesisScheduler::new(
            into_handle(model),
            Arc::new(voices),
            self.settings.shaping,
            self.settings.max_workers,
        ));
        tracing::info!(
            elapsed_ms = start_time.elapsed().as_millis(),
            "Synthesis engine initialized"
        );
    }

    /// Make the model available; later calls are ignored
    pub fn install(&self, scheduler: SynthesisScheduler) {
        if self.scheduler.set(scheduler).is_err() {
            tracing::warn!("Synthesis engine already installed, ignoring");
        } else {
            tracing::info!("Synthesis engine ready");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.scheduler.get().is_some()
    }

    fn ready_scheduler(&self) -> Result<&SynthesisScheduler, TtsServiceError> {
        self.scheduler.get().ok_or_else(|| {
            TtsServiceError::ResourceUnavailable("model is still initializing".to_string())
        })
    }

    /// Validate the request and wait for the model to be ready.
    ///
    /// A request without a language is checked with the detector on the
    /// blocking pool; anything it cannot place confidently stays English.
    async fn prepare(
        &self,
        request: SpeechRequest,
    ) -> Result<(SynthesisRequest, &SynthesisScheduler), TtsServiceError> {
        let detect = request.language.is_none();
        let mut request = request.validate()?;
        let scheduler = self.ready_scheduler()?;

        if detect {
            let detector = self.language_detector.clone();
            let text = request.text.clone();
            request.language =
                tokio::task::spawn_blocking(move || detect_language(&detector, &text))
                    .await
                    .map_err(|e| anyhow::anyhow!("language detection task failed: {}", e))?;
        }

        Ok((request, scheduler))
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Start streaming synthesis.
    ///
    /// The text is planned into whole-sentence chunks and each chunk is
    /// rendered and delivered in order. Fails up front on validation errors
    /// or when the model or requested voice is not available.
    async fn synthesize_stream(
        &self,
        request: SpeechRequest,
    ) -> Result<StreamingSynthesis, TtsServiceError>;

    /// Render the full text as one audio payload; chunking options are ignored
    async fn synthesize(&self, request: SpeechRequest) -> Result<SynthesisOutput, TtsServiceError>;

    fn health(&self) -> HealthSnapshot;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn synthesize_stream(
        &self,
        request: SpeechRequest,
    ) -> Result<StreamingSynthesis, TtsServiceError> {
        let (request, scheduler) = self.prepare(request).await?;
        let guard = self.active.enter();

        let chunk_plan = plan(&request.text, request.chunking, &self.settings.policy);

        tracing::info!(
            chunks = chunk_plan.chunks.len(),
            language = %request.language,
            voice = %request.voice,
            temperature = request.temperature,
            chunk_by_sentences = request.chunking.enabled,
            target_words = chunk_plan.word_target,
            max_sentences = ?chunk_plan.max_sentences,
            "Streaming TTS request"
        );

        let language = request.language;
        let voice = request.voice;
        let segments = scheduler.stream(request, chunk_plan.chunks, guard)?;

        Ok(StreamingSynthesis {
            language,
            voice,
            segments,
        })
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<SynthesisOutput, TtsServiceError> {
        let (mut request, scheduler) = self.prepare(request).await?;

        // Non-streaming always renders the whole text as one unit
        request.chunking = ChunkOptions {
            enabled: false,
            max_words: None,
            max_sentences: None,
        };

        let cache_key = cache_key(&request);
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&cache_key).await {
                tracing::info!(
                    audio_size = cached.audio.len(),
                    language = %cached.language,
                    "TTS cache hit - returning cached audio"
                );
                return Ok(cached);
            }
        }

        tracing::info!(
            text_length = request.text.chars().count(),
            language = %request.language,
            voice = %request.voice,
            "Non-streaming TTS request"
        );

        let language = request.language;
        let voice = request.voice;
        let segment = scheduler.synthesize_once(request, self.active.enter()).await?;

        let output = SynthesisOutput {
            language,
            voice,
            audio: Arc::new(segment.bytes),
        };

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, output.clone()).await;
        }

        Ok(output)
    }

    fn health(&self) -> HealthSnapshot {
        let scheduler = self.scheduler.get();
        let loaded = |voice| scheduler.is_some_and(|s| s.voices().is_loaded(voice));

        HealthSnapshot {
            model_ready: scheduler.is_some(),
            voices_loaded: VoicesLoaded {
                female: loaded(VoiceIdentity::Female),
                male: loaded(VoiceIdentity::Male),
            },
            active_requests: self.active.current(),
            max_workers: scheduler.map_or(self.settings.max_workers, |s| s.max_workers()),
        }
    }
}

/// Every field that changes the rendered audio
fn cache_key(request: &SynthesisRequest) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}",
        request.language,
        request.voice,
        request.temperature,
        request.cfg_weight,
        request.exaggeration,
        request.speed,
        request.text
    )
}
