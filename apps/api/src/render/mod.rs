//! Server-rendered HTML for the single-page form.
//!
//! Pages are plain `format!` strings. Every user- or model-supplied value is
//! escaped before it is embedded.

use crate::analysis::mode::AnalysisMode;

/// Everything the form page can show.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub selected_mode: AnalysisMode,
    pub job_description: &'a str,
    pub error: Option<InlineError<'a>>,
    /// The analysis result for this session; enables the follow-up field.
    pub analysis: Option<&'a str>,
    pub follow_up: Option<FollowUpView<'a>>,
}

#[derive(Debug)]
pub struct InlineError<'a> {
    pub code: &'a str,
    pub message: &'a str,
}

#[derive(Debug)]
pub struct FollowUpView<'a> {
    pub question: &'a str,
    pub answer: &'a str,
}

const RESOURCES: &[(&str, &str)] = &[
    (
        "Resume Writing Tips",
        "https://cdn-careerservices.fas.harvard.edu/wp-content/uploads/sites/161/2023/08/College-resume-and-cover-letter-4.pdf",
    ),
    (
        "ATS Optimization Guide",
        "https://career.io/career-advice/create-an-optimized-ats-resume",
    ),
    (
        "Interview Preparation",
        "https://hbr.org/2021/11/10-common-job-interview-questions-and-how-to-answer-them",
    ),
];

const STYLE: &str = r#"
    body { font-family: -apple-system, "Helvetica Neue", sans-serif; background: #f5f5f7; color: #1d1d1f; margin: 0; display: flex; }
    aside { width: 240px; padding: 24px; background: #ffffff; min-height: 100vh; }
    main { flex: 1; padding: 24px 48px; max-width: 900px; }
    button { background: #0071e3; color: #fff; border: 0; border-radius: 20px; padding: 8px 20px; cursor: pointer; }
    button:disabled { background: #a1a1a6; cursor: default; }
    textarea, input[type=text] { width: 100%; border-radius: 10px; border: 1px solid #d2d2d7; padding: 8px; box-sizing: border-box; }
    .error-inline { background: #ffe5e5; color: #b00020; border-radius: 10px; padding: 10px 14px; margin: 12px 0; }
    .result { white-space: pre-wrap; background: #fff; border-radius: 10px; padding: 16px; }
"#;

/// Escapes text for safe inclusion in HTML bodies and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders the full form page.
pub fn page(view: &PageView<'_>) -> String {
    let error_section = view
        .error
        .as_ref()
        .map(|e| {
            format!(
                r#"<div class="error-inline" role="alert" data-code="{}">{}</div>"#,
                html_escape(e.code),
                html_escape(e.message)
            )
        })
        .unwrap_or_default();

    let analysis_section = view
        .analysis
        .map(|text| {
            format!(
                r#"<section id="analysis"><h2>Analysis Results</h2><div class="result">{}</div></section>"#,
                html_escape(text)
            )
        })
        .unwrap_or_default();

    let answer_section = view
        .follow_up
        .as_ref()
        .map(|f| {
            format!(
                r#"<section id="follow-up-answer"><h3>{}</h3><div class="result">{}</div></section>"#,
                html_escape(f.question),
                html_escape(f.answer)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ResumeATS Pro</title>
    <style>{style}</style>
</head>
<body>
    {sidebar}
    <main>
        <h1>ResumeATS Pro</h1>
        <p>Optimize Your Resume for ATS and Land Your Dream Job</p>
        {error_section}
        {analyze_form}
        {analysis_section}
        {follow_up_form}
        {answer_section}
    </main>
</body>
</html>"#,
        style = STYLE,
        sidebar = sidebar(),
        analyze_form = analyze_form(view.selected_mode, view.job_description),
        follow_up_form = follow_up_form(view.analysis.is_some()),
    )
}

/// The blank form with an error banner on top.
pub fn error_page(code: &str, message: &str) -> String {
    page(&PageView {
        error: Some(InlineError { code, message }),
        ..PageView::default()
    })
}

fn analyze_form(selected: AnalysisMode, job_description: &str) -> String {
    let radios: String = AnalysisMode::ALL
        .iter()
        .map(|mode| {
            let checked = if *mode == selected { " checked" } else { "" };
            format!(
                r#"<label><input type="radio" name="mode" value="{}"{checked}> {}</label><br>"#,
                mode.as_str(),
                mode.label()
            )
        })
        .collect();

    format!(
        r#"<form id="analyze" method="post" action="/analyze" enctype="multipart/form-data">
            <p><label>Upload your resume (PDF)<br><input type="file" name="resume" accept="application/pdf,.pdf"></label></p>
            <p><label>Enter the job description (optional)<br><textarea name="job_description" rows="6">{}</textarea></label></p>
            <fieldset><legend>Choose analysis type:</legend>{radios}</fieldset>
            <p><button type="submit">Analyze Resume</button></p>
        </form>"#,
        html_escape(job_description)
    )
}

fn follow_up_form(enabled: bool) -> String {
    let disabled = if enabled { "" } else { " disabled" };
    format!(
        r#"<form id="follow-up" method="post" action="/follow-up">
            <h2>Have questions about your resume?</h2>
            <p><label>Ask me anything about your resume or the analysis:<br><input type="text" name="question"{disabled}></label></p>
            <p><button type="submit"{disabled}>Ask</button></p>
        </form>"#
    )
}

fn sidebar() -> String {
    let links: String = RESOURCES
        .iter()
        .map(|(title, url)| format!(r#"<li><a href="{url}">{title}</a></li>"#))
        .collect();
    format!(r#"<aside><h2>Resources</h2><ul>{links}</ul></aside>"#)
}
