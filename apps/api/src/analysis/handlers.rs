//! Axum route handlers for the resume form.

use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::controller::{AnalysisRequest, Controller};
use crate::document::UploadedDocument;
use crate::errors::AppError;
use crate::render::{self, FollowUpView, InlineError, PageView};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "resumeats_session";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FollowUpForm {
    #[serde(default)]
    pub question: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
///
/// The form, plus the session's last analysis if there is one.
pub async fn handle_index(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, session_id) = ensure_session(jar);
    let snapshot = state.sessions.snapshot(session_id).await;

    let html = render::page(&PageView {
        selected_mode: snapshot.as_ref().map(|s| s.mode).unwrap_or_default(),
        analysis: snapshot.as_ref().map(|s| s.analysis.as_str()),
        ..PageView::default()
    });

    (jar, Html(html)).into_response()
}

/// POST /analyze
///
/// Multipart form: `resume` (PDF file), `job_description`, `mode`.
/// Every response carries the session cookie, including error pages.
pub async fn handle_analyze(
    State(state): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Response {
    let (jar, session_id) = ensure_session(jar);
    let request = match read_analysis_form(&mut multipart).await {
        Ok(request) => request,
        Err(err) => return (jar, err).into_response(),
    };
    let mode = request.mode;
    let job_description = request.job_description.clone();

    let cancel = state.shutdown.child_token();
    let controller = Controller::new(state.llm.as_ref(), &state.sessions, &cancel);

    match controller.analyze(session_id, request).await {
        Ok(analysis) => {
            let html = render::page(&PageView {
                selected_mode: mode,
                job_description: &job_description,
                analysis: Some(&analysis),
                ..PageView::default()
            });
            (jar, Html(html)).into_response()
        }
        // Re-show what the user entered so only the upload needs fixing.
        Err(err) => {
            err.log();
            let message = err.user_message();
            let html = render::page(&PageView {
                selected_mode: mode,
                job_description: &job_description,
                error: Some(InlineError {
                    code: err.error_code(),
                    message: &message,
                }),
                ..PageView::default()
            });
            (err.status_code(), jar, Html(html)).into_response()
        }
    }
}

/// POST /follow-up
///
/// Url-encoded form: `question`. Answered against the session's stored analysis.
pub async fn handle_follow_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<FollowUpForm>,
) -> Response {
    let (jar, session_id) = ensure_session(jar);

    let cancel = state.shutdown.child_token();
    let controller = Controller::new(state.llm.as_ref(), &state.sessions, &cancel);

    match controller.follow_up(session_id, &form.question).await {
        Ok(reply) => {
            let html = render::page(&PageView {
                selected_mode: reply.mode,
                analysis: Some(&reply.analysis),
                follow_up: Some(FollowUpView {
                    question: &form.question,
                    answer: &reply.answer,
                }),
                ..PageView::default()
            });
            (jar, Html(html)).into_response()
        }
        // Keep the earlier analysis on screen when only the question was bad.
        Err(err @ AppError::Validation(_)) => {
            err.log();
            let snapshot = state.sessions.snapshot(session_id).await;
            let message = err.user_message();
            let html = render::page(&PageView {
                selected_mode: snapshot.as_ref().map(|s| s.mode).unwrap_or_default(),
                analysis: snapshot.as_ref().map(|s| s.analysis.as_str()),
                error: Some(InlineError {
                    code: err.error_code(),
                    message: &message,
                }),
                ..PageView::default()
            });
            (err.status_code(), jar, Html(html)).into_response()
        }
        Err(err) => (jar, err).into_response(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Reads the session id from the cookie jar, issuing a new one if absent or invalid.
fn ensure_session(jar: CookieJar) -> (CookieJar, Uuid) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    tracing::debug!(session_id = %id, "Issued new session");
    (jar.add(cookie), id)
}

async fn read_analysis_form(multipart: &mut Multipart) -> Result<AnalysisRequest, AppError> {
    let mut request = AnalysisRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read uploaded file: {e}")))?;

                // Browsers submit an empty part when no file was chosen.
                if data.is_empty() {
                    continue;
                }

                let mut upload = UploadedDocument::new(file_name, data);
                if let Some(content_type) = content_type {
                    upload = upload.with_content_type(content_type);
                }
                request.upload = Some(upload);
            }
            "job_description" => {
                request.job_description = read_text(field).await?;
            }
            "mode" => {
                request.mode = read_text(field)
                    .await?
                    .parse()
                    .map_err(AppError::Validation)?;
            }
            _ => {}
        }
    }

    Ok(request)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))
}
