pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes() + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(handlers::handle_index))
        .route("/analyze", post(handlers::handle_analyze))
        .route("/follow-up", post(handlers::handle_follow_up))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, Response, StatusCode};
    use chrono::Duration;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::controller::tests::ScriptedCompletion;
    use crate::analysis::handlers::SESSION_COOKIE;
    use crate::analysis::session::SessionStore;
    use crate::config::Config;
    use crate::document::extractor::tests::build_pdf;

    const BOUNDARY: &str = "resumeatsboundary";

    fn test_config() -> Config {
        Config {
            perplexity_api_key: "test-key".to_string(),
            completion_api_url: "http://127.0.0.1:1/chat/completions".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            max_upload_mb: 1,
            session_ttl_minutes: 60,
        }
    }

    fn setup_test_app(llm: Arc<ScriptedCompletion>) -> Router {
        build_router(AppState {
            llm,
            sessions: SessionStore::new(Duration::minutes(60)),
            config: test_config(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Builds a multipart body with optional file part plus text fields.
    fn multipart_body(file: Option<&[u8]>, fields: &[(&str, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(bytes) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"resume.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn analyze_request(body: Vec<u8>, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn follow_up_request(question: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/follow-up")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let encoded = question.replace(' ', "+").replace('?', "%3F");
        builder
            .body(Body::from(format!("question={encoded}")))
            .unwrap()
    }

    /// `name=value` of the session cookie set by the response.
    fn session_cookie(response: &Response<Body>) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap();
        let pair = set_cookie.split(';').next().unwrap().to_string();
        assert!(pair.starts_with(SESSION_COOKIE));
        pair
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = setup_test_app(Arc::new(ScriptedCompletion::default()));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "resumeats");
    }

    #[tokio::test]
    async fn test_index_issues_session_cookie() {
        let app = setup_test_app(Arc::new(ScriptedCompletion::default()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response);
        let html = body_text(response).await;
        assert!(html.contains("Analyze Resume"));
        assert!(html.contains(r#"name="question" disabled"#));
    }

    #[tokio::test]
    async fn test_analyze_without_file_shows_inline_error() {
        let llm = Arc::new(ScriptedCompletion::default());
        let app = setup_test_app(llm.clone());

        let body = multipart_body(
            None,
            &[
                ("mode", "detailed_analysis"),
                ("job_description", "Platform engineer, Rust"),
            ],
        );
        let response = app.oneshot(analyze_request(body, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        session_cookie(&response);
        let html = body_text(response).await;
        assert!(html.contains(r#"data-code="MISSING_INPUT""#));
        assert!(html.contains("Please upload a resume to analyze."));
        assert!(html.contains(r#"value="detailed_analysis" checked"#));
        assert!(html.contains("Platform engineer, Rust</textarea>"));
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_pdf_keeps_session_and_form_values() {
        let llm = Arc::new(ScriptedCompletion::default());
        let app = setup_test_app(llm.clone());

        let body = multipart_body(
            Some(b"%PDF-not really a pdf".as_slice()),
            &[("mode", "ats_optimization"), ("job_description", "SRE")],
        );
        let response = app.oneshot(analyze_request(body, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        session_cookie(&response);
        let html = body_text(response).await;
        assert!(html.contains(r#"data-code="EXTRACTION_ERROR""#));
        assert!(html.contains(r#"value="ats_optimization" checked"#));
        assert!(html.contains("SRE</textarea>"));
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_with_unknown_mode_is_rejected() {
        let llm = Arc::new(ScriptedCompletion::default());
        let app = setup_test_app(llm.clone());

        let pdf = build_pdf(&["Jane Doe"]);
        let body = multipart_body(Some(pdf.as_slice()), &[("mode", "deep_dive")]);
        let response = app.oneshot(analyze_request(body, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        session_cookie(&response);
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_follow_up_without_analysis_makes_no_call() {
        let llm = Arc::new(ScriptedCompletion::default());
        let app = setup_test_app(llm.clone());

        let response = app
            .oneshot(follow_up_request("How can I improve my ATS score?", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        session_cookie(&response);
        let html = body_text(response).await;
        assert!(html.contains(r#"data-code="NO_ANALYSIS""#));
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_then_follow_up_in_same_session() {
        let llm = Arc::new(ScriptedCompletion::replying(&[
            "Score: 78/100 ...",
            "Add Go and Kubernetes keywords.",
        ]));
        let app = setup_test_app(llm.clone());

        let pdf = build_pdf(&["Jane Doe"]);
        let body = multipart_body(
            Some(pdf.as_slice()),
            &[
                ("mode", "ats_optimization"),
                ("job_description", "Senior backend engineer, Go, Kubernetes."),
            ],
        );
        let response = app
            .clone()
            .oneshot(analyze_request(body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        let html = body_text(response).await;
        assert!(html.contains("Score: 78/100 ..."));
        assert!(html.contains(r#"<input type="text" name="question">"#));

        let response = app
            .clone()
            .oneshot(follow_up_request("How can I improve my ATS score?", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Add Go and Kubernetes keywords."));
        assert!(html.contains("Score: 78/100 ..."));
        assert!(html.contains(r#"value="ats_optimization" checked"#));

        let calls = llm.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0].0.lines().last().unwrap(),
            "Job description: Senior backend engineer, Go, Kubernetes."
        );
        assert!(calls[1].0.contains("How can I improve my ATS score?"));
        assert!(calls[1].0.contains("Score: 78/100 ..."));
        assert_eq!(calls[1].1, calls[0].1);

        // A different session has no analysis to refer to.
        let response = app
            .oneshot(follow_up_request("Another question?", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(llm.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_follow_up_keeps_analysis_on_screen() {
        let llm = Arc::new(ScriptedCompletion::replying(&["Score: 64/100"]));
        let app = setup_test_app(llm.clone());

        let pdf = build_pdf(&["Jane Doe"]);
        let body = multipart_body(Some(pdf.as_slice()), &[("mode", "quick_scan")]);
        let response = app
            .clone()
            .oneshot(analyze_request(body, None))
            .await
            .unwrap();
        let cookie = session_cookie(&response);

        let response = app
            .oneshot(follow_up_request("", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains(r#"data-code="VALIDATION_ERROR""#));
        assert!(html.contains("Score: 64/100"));
        assert_eq!(llm.calls().len(), 1);
    }
}
