use crate::error::AppError;
use crate::infrastructure::model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("synthesis failed on chunk {chunk_index}: {source}")]
    SynthesisFailure {
        chunk_index: usize,
        #[source]
        source: ModelError,
    },
    /// The consumer stopped listening; never reported to a client
    #[error("stream cancelled by consumer")]
    Cancelled,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Validation(msg) => AppError::BadRequest(msg),
            TtsServiceError::ResourceUnavailable(msg) => AppError::ServiceUnavailable(msg),
            e @ TtsServiceError::SynthesisFailure { .. } => AppError::SynthesisFailed(e.to_string()),
            TtsServiceError::Cancelled => AppError::Internal("stream cancelled".to_string()),
            TtsServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
