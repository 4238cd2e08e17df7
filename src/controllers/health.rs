use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::domain::tts::{LanguageCode, LanguagesResponse, TtsService, TtsServiceApi};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(tts_service): State<Arc<TtsService>>) -> impl IntoResponse {
    let snapshot = tts_service.health();
    let (status, label) = if snapshot.model_ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "initializing")
    };
    let languages: Vec<&str> = LanguageCode::ALL.iter().map(|l| l.as_str()).collect();

    (
        status,
        Json(json!({
            "status": label,
            "model_ready": snapshot.model_ready,
            "voices_loaded": snapshot.voices_loaded,
            "active_requests": snapshot.active_requests,
            "max_workers": snapshot.max_workers,
            "supported_languages": languages,
            "checked_at": Utc::now(),
        })),
    )
}

pub async fn languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse::supported())
}
