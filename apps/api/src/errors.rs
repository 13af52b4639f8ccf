use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::document::extractor::ExtractError;
use crate::render;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Completion failures are not represented here: they come back from the
/// completion client as `Error: ...` text and are shown as the result.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Please upload a resume to analyze.")]
    MissingInput,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analyze a resume before asking follow-up questions.")]
    NoAnalysis,

    #[error("Could not read the uploaded resume: {0}")]
    Extraction(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::MissingInput => AppError::MissingInput,
            other => AppError::Extraction(other.to_string()),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingInput | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NoAnalysis => StatusCode::CONFLICT,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingInput => "MISSING_INPUT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NoAnalysis => "NO_ANALYSIS",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Text shown in the inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Internal(_) => "Something went wrong. Please try again.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn log(&self) {
        match self {
            AppError::Extraction(msg) => tracing::warn!("Extraction error: {msg}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            other => tracing::debug!("Rejected request: {other}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let page = render::error_page(self.error_code(), &self.user_message());
        (self.status_code(), Html(page)).into_response()
    }
}
