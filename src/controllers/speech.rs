use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::tts::{
        LanguageCode, SpeechRequest, StreamingSynthesis, TtsService, TtsServiceApi, VoiceIdentity,
    },
    error::{AppError, AppResult},
};

pub struct SpeechController {
    tts_service: Arc<TtsService>,
}

impl SpeechController {
    pub fn new(tts_service: Arc<TtsService>) -> Self {
        Self { tts_service }
    }

    /// POST /v1/audio/speech - Streams unless the request sets `stream: false`
    pub async fn speech(
        State(controller): State<Arc<SpeechController>>,
        payload: Result<Json<SpeechRequest>, JsonRejection>,
    ) -> AppResult<Response> {
        let Json(request) = payload?;
        if request.stream {
            return controller.start_stream(request).await;
        }

        let output = controller
            .tts_service
            .synthesize(request)
            .await
            .map_err(AppError::from)?;

        let mut headers = audio_headers(output.voice, output.language, false);
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(output.audio.len()));

        Ok((StatusCode::OK, headers, Body::from(output.audio.to_vec())).into_response())
    }

    /// POST /v1/audio/speech/stream - Chunked WAV segments in text order
    pub async fn speech_stream(
        State(controller): State<Arc<SpeechController>>,
        payload: Result<Json<SpeechRequest>, JsonRejection>,
    ) -> AppResult<Response> {
        let Json(request) = payload?;
        controller.start_stream(request).await
    }

    async fn start_stream(&self, request: SpeechRequest) -> AppResult<Response> {
        let StreamingSynthesis {
            language,
            voice,
            segments,
        } = self
            .tts_service
            .synthesize_stream(request)
            .await
            .map_err(AppError::from)?;

        let mut headers = audio_headers(voice, language, true);
        headers.insert("X-Chunk-Count", HeaderValue::from(segments.total_chunks()));

        Ok((StatusCode::OK, headers, Body::from_stream(segments.into_bytes())).into_response())
    }
}

fn audio_headers(voice: VoiceIdentity, language: LanguageCode, streaming: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
    headers.insert("X-Voice-Type", HeaderValue::from_static(voice.as_str()));
    headers.insert("X-Language", HeaderValue::from_static(language.as_str()));
    headers.insert(
        "X-Streaming",
        HeaderValue::from_static(if streaming { "true" } else { "false" }),
    );
    headers
}
