//! The analysis flow: upload → extract → prompt → complete → remember, then
//! follow-up questions against the remembered analysis.
//!
//! Completion failures arrive as `Error: ...` text and are treated exactly
//! like a successful reply; they are shown and stored as the analysis.

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::analysis::mode::AnalysisMode;
use crate::analysis::prompts::{build_analysis_prompt, build_follow_up_prompt};
use crate::analysis::session::{AnalysisSnapshot, SessionStore};
use crate::document::extractor::extract;
use crate::document::UploadedDocument;
use crate::errors::AppError;
use crate::llm_client::CompletionService;

/// One "Analyze" submission.
#[derive(Debug, Default)]
pub struct AnalysisRequest {
    pub upload: Option<UploadedDocument>,
    pub mode: AnalysisMode,
    pub job_description: String,
}

/// A follow-up answer together with the analysis it was asked about.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUpAnswer {
    pub analysis: String,
    pub mode: AnalysisMode,
    pub answer: String,
}

/// Borrowed handles the flow needs for one user action.
#[derive(Clone, Copy)]
pub struct Controller<'a> {
    pub llm: &'a dyn CompletionService,
    pub sessions: &'a SessionStore,
    pub cancel: &'a CancellationToken,
}

impl<'a> Controller<'a> {
    pub fn new(
        llm: &'a dyn CompletionService,
        sessions: &'a SessionStore,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            llm,
            sessions,
            cancel,
        }
    }

    /// Runs a full analysis. Rejected before any work if nothing was uploaded.
    pub async fn analyze(
        &self,
        session_id: Uuid,
        request: AnalysisRequest,
    ) -> Result<String, AppError> {
        let upload = request.upload.ok_or(AppError::MissingInput)?;

        // lopdf parsing is CPU-bound; keep it off the async workers.
        let resume_text = tokio::task::spawn_blocking(move || extract(Some(&upload)))
            .await
            .context("extraction task failed")??;

        Ok(self
            .analyze_text(session_id, resume_text, request.mode, &request.job_description)
            .await)
    }

    /// Analysis step once the resume text is known. Stores the outcome for follow-ups.
    pub async fn analyze_text(
        &self,
        session_id: Uuid,
        resume_text: String,
        mode: AnalysisMode,
        job_description: &str,
    ) -> String {
        info!(
            %session_id,
            mode = mode.as_str(),
            resume_chars = resume_text.len(),
            job_description_chars = job_description.len(),
            "Running resume analysis"
        );

        let prompt = build_analysis_prompt(mode, job_description);
        let analysis = self.llm.complete(&prompt, &resume_text, self.cancel).await;

        self.sessions
            .record_analysis(
                session_id,
                AnalysisSnapshot {
                    resume_text,
                    analysis: analysis.clone(),
                    mode,
                },
            )
            .await;

        analysis
    }

    /// Answers a follow-up question using the session's stored analysis.
    /// No completion call is made for a blank question or before any analysis.
    pub async fn follow_up(
        &self,
        session_id: Uuid,
        question: &str,
    ) -> Result<FollowUpAnswer, AppError> {
        if question.trim().is_empty() {
            return Err(AppError::Validation(
                "Enter a question about your resume or the analysis.".to_string(),
            ));
        }

        let snapshot = self
            .sessions
            .snapshot(session_id)
            .await
            .ok_or(AppError::NoAnalysis)?;

        info!(%session_id, question_chars = question.len(), "Answering follow-up question");

        let prompt = build_follow_up_prompt(question, &snapshot.analysis);
        let answer = self
            .llm
            .complete(&prompt, &snapshot.resume_text, self.cancel)
            .await;
        self.sessions.touch(session_id).await;

        Ok(FollowUpAnswer {
            analysis: snapshot.analysis,
            mode: snapshot.mode,
            answer,
        })
    }
}
