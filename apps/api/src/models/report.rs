//! Wire models for analysis results.

use serde::{Deserialize, Serialize};

use crate::extract::requirements::RequirementKind;
use crate::matching::evidence::MatchStatus;
use crate::scoring::ScoreBreakdown;

/// Match result for a single must-have requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementMatch {
    pub requirement: String,
    pub kind: RequirementKind,
    pub skills: Vec<String>,
    pub status: MatchStatus,
    /// Best supporting text, omitted when the requirement is missing.
    pub evidence: Option<String>,
    pub confidence: f32,
    /// e.g. "Experience > bullet 2"
    pub suggested_edit_target: String,
}

/// One ranked edit in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedEdit {
    pub target: String,
    pub current: Option<String>,
    pub suggested: String,
    pub reason: String,
    pub estimated_score_gain: u32,
}

/// Complete result of one candidate/target analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub overall_score: u32,
    pub breakdown: ScoreBreakdown,
    pub explanation: String,
    pub target_title: String,
    pub must_haves: Vec<RequirementMatch>,
    pub top_edits: Vec<SuggestedEdit>,
    pub skills_insertions: Vec<String>,
    pub summary_suggestion: Option<String>,
}
