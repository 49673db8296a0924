//! Multi-factor scorer - aggregates coverage, explicitness, role alignment,
//! keyword overlap, and writing quality into a single 0-100 score with a
//! machine-generated explanation.
//!
//! The five weights are validated once at scorer construction; a bad weight
//! vector is a configuration error, never a per-call error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::evidence::{EvidenceRecord, MatchStatus};

/// Weight vector over the five sub-scores. Must sum to 1.0 within
/// `WEIGHT_TOLERANCE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub coverage: f64,
    pub explicitness: f64,
    pub role_alignment: f64,
    pub keywords: f64,
    pub writing_quality: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            coverage: 0.35,
            explicitness: 0.25,
            role_alignment: 0.15,
            keywords: 0.15,
            writing_quality: 0.10,
        }
    }
}

impl ScoreWeights {
    fn sum(&self) -> f64 {
        self.coverage + self.explicitness + self.role_alignment + self.keywords
            + self.writing_quality
    }
}

const WEIGHT_TOLERANCE: f64 = 0.01;

/// Per-factor sub-scores, each in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub coverage: f64,
    pub explicitness: f64,
    pub role_alignment: f64,
    pub keywords: f64,
    pub writing_quality: f64,
}

/// Complete score for a candidate/target pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchScore {
    pub overall_score: u32,
    pub breakdown: ScoreBreakdown,
    pub explanation: String,
}

/// The improvable score dimensions `estimate_score_gain` understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementKind {
    Coverage,
    Explicitness,
    Keywords,
    Writing,
}

/// Everything the scorer consumes for one analysis.
pub struct ScoreInputs<'a> {
    pub must_have_skills: &'a BTreeSet<String>,
    pub preferred_skills: &'a BTreeSet<String>,
    pub evidence: &'a [EvidenceRecord],
    pub candidate_skills: &'a BTreeSet<String>,
    pub candidate_bullets: &'a [String],
    pub target_title: Option<&'a str>,
    pub candidate_title: Option<&'a str>,
}

/// Curated role keywords for title alignment.
const ROLE_KEYWORDS: &[&str] = &[
    "data scientist",
    "ml engineer",
    "machine learning",
    "software engineer",
    "data engineer",
    "analyst",
    "engineer",
    "scientist",
    "developer",
    "architect",
    "manager",
    "lead",
    "senior",
    "junior",
    "staff",
    "principal",
];

/// Recognized opening action verbs for the writing-quality heuristic.
const ACTION_VERBS: &[&str] = &[
    "led",
    "built",
    "developed",
    "created",
    "designed",
    "implemented",
    "improved",
    "optimized",
    "analyzed",
    "managed",
    "drove",
    "increased",
    "reduced",
    "launched",
    "established",
    "automated",
    "trained",
    "deployed",
];

#[derive(Debug)]
pub struct MatchScorer {
    weights: ScoreWeights,
}

impl MatchScorer {
    /// Validates the weight vector once; violation is a configuration error.
    pub fn new(weights: ScoreWeights) -> Result<Self, AppError> {
        let total = weights.sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(AppError::InvalidConfiguration(format!(
                "Scoring weights must sum to 1.0, got {total}"
            )));
        }
        Ok(Self { weights })
    }

    pub fn calculate_score(&self, inputs: &ScoreInputs<'_>) -> MatchScore {
        let coverage = calculate_coverage(inputs.must_have_skills, inputs.evidence);
        let explicitness =
            calculate_explicitness(inputs.must_have_skills, inputs.candidate_skills);
        let role_alignment =
            calculate_role_alignment(inputs.target_title, inputs.candidate_title);
        let keywords = calculate_keyword_match(
            inputs.must_have_skills,
            inputs.preferred_skills,
            inputs.candidate_skills,
            inputs.candidate_bullets,
        );
        let writing_quality = calculate_writing_quality(inputs.candidate_bullets);

        let overall = self.weights.coverage * coverage
            + self.weights.explicitness * explicitness
            + self.weights.role_alignment * role_alignment
            + self.weights.keywords * keywords
            + self.weights.writing_quality * writing_quality;

        let overall_score = (overall * 100.0).round() as u32;

        let breakdown = ScoreBreakdown {
            coverage,
            explicitness,
            role_alignment,
            keywords,
            writing_quality,
        };
        let explanation = generate_explanation(&breakdown, overall_score);

        MatchScore {
            overall_score,
            breakdown,
            explanation,
        }
    }

    /// Estimated 0-100-scale gain from addressing roughly 20% of the
    /// remaining gap on one dimension. Floor 1 keeps every suggestion
    /// actionable; ceiling 15 avoids overpromising.
    pub fn estimate_score_gain(&self, breakdown: &ScoreBreakdown, kind: ImprovementKind) -> u32 {
        let (subscore, weight) = match kind {
            ImprovementKind::Coverage => (breakdown.coverage, self.weights.coverage),
            ImprovementKind::Explicitness => (breakdown.explicitness, self.weights.explicitness),
            ImprovementKind::Keywords => (breakdown.keywords, self.weights.keywords),
            ImprovementKind::Writing => (breakdown.writing_quality, self.weights.writing_quality),
        };
        let gap = 1.0 - subscore;
        let potential = gap * weight * 100.0;
        ((potential * 0.2).round() as u32).clamp(1, 15)
    }
}

/// Fraction of must-have requirements with non-missing evidence, over the
/// must-have skill count; 1.0 when the skill set is empty.
fn calculate_coverage(must_have_skills: &BTreeSet<String>, evidence: &[EvidenceRecord]) -> f64 {
    if must_have_skills.is_empty() {
        return 1.0;
    }
    let covered = evidence
        .iter()
        .filter(|e| e.status != MatchStatus::Missing)
        .count();
    (covered as f64 / must_have_skills.len() as f64).min(1.0)
}

/// Fraction of must-have skills literally named by the candidate.
fn calculate_explicitness(
    must_have_skills: &BTreeSet<String>,
    candidate_skills: &BTreeSet<String>,
) -> f64 {
    if must_have_skills.is_empty() {
        return 1.0;
    }
    let candidate_lower: BTreeSet<String> =
        candidate_skills.iter().map(|s| s.to_lowercase()).collect();
    let explicit = must_have_skills
        .iter()
        .filter(|s| candidate_lower.contains(&s.to_lowercase()))
        .count();
    (explicit as f64 / must_have_skills.len() as f64).min(1.0)
}

/// Title alignment: exact match 1.0; 0.5 neutral when either title is
/// absent or the target title carries no role keyword; otherwise the
/// fraction of target-title role keywords present in the candidate title.
fn calculate_role_alignment(target_title: Option<&str>, candidate_title: Option<&str>) -> f64 {
    let (target, candidate) = match (target_title, candidate_title) {
        (Some(t), Some(c)) if !t.is_empty() && !c.is_empty() => (t, c),
        _ => return 0.5,
    };

    let target_lower = target.to_lowercase();
    let candidate_lower = candidate.to_lowercase();
    if target_lower == candidate_lower {
        return 1.0;
    }

    let target_roles: Vec<&str> = ROLE_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| target_lower.contains(kw))
        .collect();
    if target_roles.is_empty() {
        return 0.5;
    }

    let overlap = target_roles
        .iter()
        .filter(|kw| candidate_lower.contains(*kw))
        .count();
    (overlap as f64 / target_roles.len() as f64).min(1.0)
}

/// Fraction of the combined must-have + preferred skill set found in the
/// candidate's skills or anywhere in the concatenated bullet text.
fn calculate_keyword_match(
    must_have_skills: &BTreeSet<String>,
    preferred_skills: &BTreeSet<String>,
    candidate_skills: &BTreeSet<String>,
    candidate_bullets: &[String],
) -> f64 {
    let keyword_set: BTreeSet<&String> =
        must_have_skills.iter().chain(preferred_skills).collect();
    if keyword_set.is_empty() {
        return 1.0;
    }

    let bullet_text = candidate_bullets.join(" ").to_lowercase();
    let candidate_lower: BTreeSet<String> =
        candidate_skills.iter().map(|s| s.to_lowercase()).collect();

    let matches = keyword_set
        .iter()
        .filter(|kw| {
            let kw_lower = kw.to_lowercase();
            candidate_lower.contains(&kw_lower) || bullet_text.contains(&kw_lower)
        })
        .count();
    (matches as f64 / keyword_set.len() as f64).min(1.0)
}

/// Mean per-bullet writing score; neutral 0.5 when there are no bullets.
/// Each bullet earns independent bonuses for brevity, an opening action
/// verb, and at least one digit.
fn calculate_writing_quality(bullets: &[String]) -> f64 {
    if bullets.is_empty() {
        return 0.5;
    }

    let total: f64 = bullets
        .iter()
        .map(|bullet| {
            let mut score = 0.0;

            let word_count = bullet.split_whitespace().count();
            if word_count <= 28 {
                score += 0.33;
            } else if word_count <= 35 {
                score += 0.20;
            }

            if let Some(first) = bullet.split_whitespace().next() {
                if ACTION_VERBS.contains(&first.to_lowercase().as_str()) {
                    score += 0.33;
                }
            }

            if bullet.chars().any(|c| c.is_ascii_digit()) {
                score += 0.34;
            }

            score
        })
        .sum();

    (total / bullets.len() as f64).min(1.0)
}

/// Threshold-banded explanation. Bands are monotonic: the lower a
/// sub-score, the more corrective the sentence.
fn generate_explanation(breakdown: &ScoreBreakdown, overall_score: u32) -> String {
    let mut parts: Vec<String> = Vec::new();

    if overall_score >= 80 {
        parts.push("Strong match for this role.".to_string());
    } else if overall_score >= 60 {
        parts.push("Good match with room for improvement.".to_string());
    } else {
        parts.push("Significant gaps to address.".to_string());
    }

    let pct = |v: f64| format!("{:.0}%", v * 100.0);

    if breakdown.coverage < 0.7 {
        parts.push(format!(
            "Coverage: {} - missing key required skills.",
            pct(breakdown.coverage)
        ));
    } else if breakdown.coverage < 0.9 {
        parts.push(format!(
            "Coverage: {} - most requirements covered.",
            pct(breakdown.coverage)
        ));
    } else {
        parts.push(format!(
            "Coverage: {} - excellent coverage.",
            pct(breakdown.coverage)
        ));
    }

    if breakdown.explicitness < 0.6 {
        parts.push(format!(
            "Explicitness: {} - name required skills more explicitly.",
            pct(breakdown.explicitness)
        ));
    }

    if breakdown.role_alignment < 0.5 {
        parts.push(format!(
            "Role alignment: {} - title mismatch with the target role.",
            pct(breakdown.role_alignment)
        ));
    }

    if breakdown.keywords < 0.6 {
        parts.push(format!(
            "Keywords: {} - missing important technical keywords.",
            pct(breakdown.keywords)
        ));
    }

    if breakdown.writing_quality < 0.7 {
        parts.push(format!(
            "Writing: {} - tighten bullet structure and add metrics.",
            pct(breakdown.writing_quality)
        ));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn evidence(status: MatchStatus, score: f32) -> EvidenceRecord {
        EvidenceRecord {
            requirement_text: "req".to_string(),
            matched_text: "matched".to_string(),
            similarity_score: score,
            status,
            section: "Experience".to_string(),
            bullet_index: Some(0),
        }
    }

    fn scorer() -> MatchScorer {
        MatchScorer::new(ScoreWeights::default()).unwrap()
    }

    #[test]
    fn test_default_weights_construct() {
        // {0.35, 0.25, 0.15, 0.15, 0.10} sums to 1.00.
        assert!(MatchScorer::new(ScoreWeights::default()).is_ok());
    }

    #[test]
    fn test_weights_summing_to_0_9_rejected() {
        let weights = ScoreWeights {
            coverage: 0.35,
            explicitness: 0.25,
            role_alignment: 0.15,
            keywords: 0.05,
            writing_quality: 0.10,
        };
        let err = MatchScorer::new(weights).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_weights_within_tolerance_accepted() {
        let weights = ScoreWeights {
            coverage: 0.35,
            explicitness: 0.25,
            role_alignment: 0.15,
            keywords: 0.15,
            writing_quality: 0.105,
        };
        assert!(MatchScorer::new(weights).is_ok());
    }

    #[test]
    fn test_empty_must_haves_and_bullets_are_neutral() {
        // Empty must-have set and bullet list: coverage and explicitness
        // default to 1.0, writing quality to the 0.5 neutral.
        let empty = BTreeSet::new();
        let inputs = ScoreInputs {
            must_have_skills: &empty,
            preferred_skills: &empty,
            evidence: &[],
            candidate_skills: &empty,
            candidate_bullets: &[],
            target_title: None,
            candidate_title: None,
        };
        let score = scorer().calculate_score(&inputs);
        assert_eq!(score.breakdown.coverage, 1.0);
        assert_eq!(score.breakdown.explicitness, 1.0);
        assert_eq!(score.breakdown.writing_quality, 0.5);
    }

    #[test]
    fn test_single_covered_must_have() {
        // "Python" named in candidate skills with present evidence gives
        // full explicitness and coverage.
        let must = skills(&["Python"]);
        let candidate = skills(&["Python", "SQL"]);
        let ev = vec![evidence(MatchStatus::Present, 0.9)];
        let bullets = vec!["Built 3 Python services".to_string()];
        let inputs = ScoreInputs {
            must_have_skills: &must,
            preferred_skills: &BTreeSet::new(),
            evidence: &ev,
            candidate_skills: &candidate,
            candidate_bullets: &bullets,
            target_title: None,
            candidate_title: None,
        };
        let score = scorer().calculate_score(&inputs);
        assert_eq!(score.breakdown.explicitness, 1.0);
        assert_eq!(score.breakdown.coverage, 1.0);
    }

    #[test]
    fn test_coverage_counts_weak_as_covered() {
        let must = skills(&["Python", "SQL"]);
        let ev = vec![
            evidence(MatchStatus::Weak, 0.6),
            evidence(MatchStatus::Missing, 0.2),
        ];
        assert_eq!(calculate_coverage(&must, &ev), 0.5);
    }

    #[test]
    fn test_coverage_capped_at_one() {
        let must = skills(&["Python"]);
        let ev = vec![
            evidence(MatchStatus::Present, 0.9),
            evidence(MatchStatus::Present, 0.9),
        ];
        assert_eq!(calculate_coverage(&must, &ev), 1.0);
    }

    #[test]
    fn test_explicitness_case_insensitive() {
        let must = skills(&["python", "SQL"]);
        let candidate = skills(&["Python", "sql"]);
        assert_eq!(calculate_explicitness(&must, &candidate), 1.0);
    }

    #[test]
    fn test_role_alignment_exact_match() {
        assert_eq!(
            calculate_role_alignment(Some("Data Scientist"), Some("data scientist")),
            1.0
        );
    }

    #[test]
    fn test_role_alignment_missing_title_neutral() {
        assert_eq!(calculate_role_alignment(None, Some("Engineer")), 0.5);
        assert_eq!(calculate_role_alignment(Some("Engineer"), None), 0.5);
    }

    #[test]
    fn test_role_alignment_no_role_keywords_neutral() {
        assert_eq!(
            calculate_role_alignment(Some("Chief Vibes Officer"), Some("Software Engineer")),
            0.5
        );
    }

    #[test]
    fn test_role_alignment_partial_overlap() {
        // Target hits "data scientist", "scientist", "senior"; candidate
        // title contains only "scientist".
        let alignment =
            calculate_role_alignment(Some("Senior Data Scientist"), Some("Research Scientist"));
        assert!(alignment > 0.0 && alignment < 1.0);
    }

    #[test]
    fn test_keywords_found_in_bullets() {
        let must = skills(&["Spark"]);
        let preferred = skills(&["Airflow"]);
        let bullets = vec!["Scheduled Spark jobs with Airflow".to_string()];
        assert_eq!(
            calculate_keyword_match(&must, &preferred, &BTreeSet::new(), &bullets),
            1.0
        );
    }

    #[test]
    fn test_keywords_empty_set_scores_one() {
        assert_eq!(
            calculate_keyword_match(&BTreeSet::new(), &BTreeSet::new(), &BTreeSet::new(), &[]),
            1.0
        );
    }

    #[test]
    fn test_writing_quality_full_marks() {
        let bullets = vec!["Reduced p99 latency by 40% across 12 services".to_string()];
        let quality = calculate_writing_quality(&bullets);
        assert!((quality - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_writing_quality_long_bullet_partial_length_credit() {
        // 30 words: 0.20 length credit, no opening verb, no digit.
        let bullet = vec!["word ".repeat(30).trim().to_string()];
        let quality = calculate_writing_quality(&bullet);
        assert!((quality - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_writing_quality_action_verb_detected() {
        let bullets = vec!["Launched the thing".to_string()];
        // 0.33 length + 0.33 verb, no digit.
        let quality = calculate_writing_quality(&bullets);
        assert!((quality - 0.66).abs() < 1e-9);
    }

    #[test]
    fn test_overall_score_rounds_weighted_sum() {
        let must = skills(&["Python"]);
        let candidate = skills(&["Python"]);
        let ev = vec![evidence(MatchStatus::Present, 0.9)];
        let bullets = vec!["Built 3 Python services".to_string()];
        let inputs = ScoreInputs {
            must_have_skills: &must,
            preferred_skills: &BTreeSet::new(),
            evidence: &ev,
            candidate_skills: &candidate,
            candidate_bullets: &bullets,
            target_title: Some("Software Engineer"),
            candidate_title: Some("Software Engineer"),
        };
        let score = scorer().calculate_score(&inputs);
        // All sub-scores are 1.0: 0.35 + 0.25 + 0.15 + 0.15 + 0.10 = 1.0.
        assert_eq!(score.overall_score, 100);
    }

    #[test]
    fn test_explanation_bands_are_monotonic() {
        let strong = generate_explanation(
            &ScoreBreakdown {
                coverage: 1.0,
                explicitness: 1.0,
                role_alignment: 1.0,
                keywords: 1.0,
                writing_quality: 1.0,
            },
            90,
        );
        assert!(strong.contains("Strong match"));
        assert!(strong.contains("excellent coverage"));

        let weak = generate_explanation(
            &ScoreBreakdown {
                coverage: 0.3,
                explicitness: 0.3,
                role_alignment: 0.3,
                keywords: 0.3,
                writing_quality: 0.3,
            },
            30,
        );
        assert!(weak.contains("Significant gaps"));
        assert!(weak.contains("missing key required skills"));
        assert!(weak.contains("title mismatch"));
    }

    #[test]
    fn test_estimate_score_gain_bounds() {
        let s = scorer();
        for kind in [
            ImprovementKind::Coverage,
            ImprovementKind::Explicitness,
            ImprovementKind::Keywords,
            ImprovementKind::Writing,
        ] {
            for subscore in [0.0, 0.25, 0.5, 0.99, 1.0] {
                let breakdown = ScoreBreakdown {
                    coverage: subscore,
                    explicitness: subscore,
                    role_alignment: subscore,
                    keywords: subscore,
                    writing_quality: subscore,
                };
                let gain = s.estimate_score_gain(&breakdown, kind);
                assert!((1..=15).contains(&gain), "gain {gain} out of bounds");
            }
        }
    }

    #[test]
    fn test_estimate_score_gain_scales_with_gap() {
        let s = scorer();
        let poor = ScoreBreakdown {
            coverage: 0.0,
            explicitness: 1.0,
            role_alignment: 1.0,
            keywords: 1.0,
            writing_quality: 1.0,
        };
        // gap 1.0 * weight 0.35 * 100 * 0.2 = 7.
        assert_eq!(s.estimate_score_gain(&poor, ImprovementKind::Coverage), 7);
        // Fully addressed dimension still floors at 1.
        assert_eq!(
            s.estimate_score_gain(&poor, ImprovementKind::Explicitness),
            1
        );
    }
}
