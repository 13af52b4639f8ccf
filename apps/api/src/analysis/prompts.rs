//! Analysis prompt templates and the two builders that fill them.
//!
//! Placeholders are filled in a single pass, so braces inside a job
//! description, question or prior analysis are copied through untouched.

use crate::analysis::mode::AnalysisMode;

/// Quick scan template. Replace `{job_description}` before sending.
pub const QUICK_SCAN_TEMPLATE: &str = "\
Provide a quick scan of the following resume:

1. Identify the most suitable profession for this resume.
2. List 3 key strengths of the resume.
3. Suggest 2 quick improvements.
4. Give an overall ATS score out of 100.

Job description (if provided): {job_description}";

/// Detailed analysis template. Replace `{job_description}` before sending.
pub const DETAILED_ANALYSIS_TEMPLATE: &str = "\
Provide a detailed analysis of the following resume:

1. Identify the most suitable profession for this resume.
2. List 5 strengths of the resume.
3. Suggest 3-5 areas for improvement with specific recommendations.
4. Rate the following aspects out of 10: Impact, Brevity, Style, Structure, Skills.
5. Provide a brief review of each major section (e.g., Summary, Experience, Education).
6. Give an overall ATS score out of 100 with a breakdown of the scoring.

Job description (if provided): {job_description}";

/// ATS optimization template. The job description line is always present,
/// even when the user left the field empty.
pub const ATS_OPTIMIZATION_TEMPLATE: &str = "\
Analyze the following resume and provide ATS optimization suggestions:

1. Identify keywords from the job description that should be included in the resume.
2. Suggest reformatting or restructuring to improve ATS readability.
3. Recommend changes to improve keyword density without keyword stuffing.
4. Provide 3-5 bullet points on how to tailor this resume for the specific job description.
5. Give an ATS compatibility score out of 100 and explain how to improve it.

Job description: {job_description}";

/// Follow-up template. Replace `{question}` and `{previous_analysis}`.
pub const FOLLOW_UP_TEMPLATE: &str = "\
Based on the resume and analysis provided, answer the following question:
{question}

Previous analysis: {previous_analysis}";

pub fn template_for(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::QuickScan => QUICK_SCAN_TEMPLATE,
        AnalysisMode::DetailedAnalysis => DETAILED_ANALYSIS_TEMPLATE,
        AnalysisMode::AtsOptimization => ATS_OPTIMIZATION_TEMPLATE,
    }
}

/// Instruction text for an analysis run.
pub fn build_analysis_prompt(mode: AnalysisMode, job_description: &str) -> String {
    fill_template(
        template_for(mode),
        &[("job_description", job_description)],
    )
}

/// Instruction text for a follow-up question about an earlier analysis.
pub fn build_follow_up_prompt(question: &str, previous_analysis: &str) -> String {
    fill_template(
        FOLLOW_UP_TEMPLATE,
        &[
            ("question", question),
            ("previous_analysis", previous_analysis),
        ],
    )
}

/// Replaces `{key}` occurrences in `template`. Values are never rescanned.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(
        template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>(),
    );
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
