use std::fmt;
use std::str::FromStr;

/// The report template the user picked on the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisMode {
    #[default]
    QuickScan,
    DetailedAnalysis,
    AtsOptimization,
}

impl AnalysisMode {
    /// Radio order on the form.
    pub const ALL: [AnalysisMode; 3] = [
        AnalysisMode::QuickScan,
        AnalysisMode::DetailedAnalysis,
        AnalysisMode::AtsOptimization,
    ];

    /// Form value submitted by the radio input.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::QuickScan => "quick_scan",
            AnalysisMode::DetailedAnalysis => "detailed_analysis",
            AnalysisMode::AtsOptimization => "ats_optimization",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMode::QuickScan => "Quick Scan",
            AnalysisMode::DetailedAnalysis => "Detailed Analysis",
            AnalysisMode::AtsOptimization => "ATS Optimization",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    /// Accepts either the form value or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AnalysisMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s || m.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown analysis mode '{s}'"))
    }
}
