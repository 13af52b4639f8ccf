// Shared prompt constants for the completion client.
// Analysis templates live with the analysis flow in analysis/prompts.rs.

/// System persona sent with every completion call.
pub const RESUME_CHECKER_SYSTEM: &str =
    "You are ResumeChecker, an expert in resume analysis and ATS optimization.";
