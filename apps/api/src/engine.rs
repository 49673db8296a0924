//! Analysis orchestrator - the synchronous per-analysis pipeline.
//!
//! Each stage fully completes before the next begins: sectionize and
//! extract, canonicalize skills, build the evidence index, retrieve
//! evidence per must-have requirement, score, then generate suggestions.
//! The `EvidenceRetriever` is constructed fresh for every analysis and
//! never shared, so independent analyses can run concurrently against one
//! engine without touching shared mutable state.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::AppError;
use crate::extract::requirements::{Requirement, RequirementExtractor, RequirementKind};
use crate::extract::sectionizer::{Section, SectionType, Sectionizer};
use crate::generation::suggestions::{Suggestion, SuggestionGenerator, SuggestionType};
use crate::matching::embedder::Embedder;
use crate::matching::evidence::{
    ContentUnit, EvidenceRecord, EvidenceRetriever, MatchStatus, RetrieverSettings,
};
use crate::models::report::{AnalysisReport, RequirementMatch, SuggestedEdit};
use crate::scoring::{ImprovementKind, MatchScorer, ScoreInputs};
use crate::taxonomy::SkillsTaxonomy;

const MAX_EDITS: usize = 20;
const MAX_SKILL_INSERTIONS: usize = 10;
const FALLBACK_TARGET_TITLE: &str = "Target Role";
const FALLBACK_CANDIDATE_TITLE: &str = "Professional";

pub struct AnalysisEngine {
    taxonomy: Arc<SkillsTaxonomy>,
    sectionizer: Sectionizer,
    extractor: RequirementExtractor,
    embedder: Arc<dyn Embedder>,
    retriever_settings: RetrieverSettings,
    scorer: MatchScorer,
    suggestions: SuggestionGenerator,
}

impl AnalysisEngine {
    pub fn new(
        taxonomy: Arc<SkillsTaxonomy>,
        embedder: Arc<dyn Embedder>,
        retriever_settings: RetrieverSettings,
        scorer: MatchScorer,
        suggestions: SuggestionGenerator,
    ) -> Self {
        Self {
            extractor: RequirementExtractor::new(taxonomy.clone()),
            taxonomy,
            sectionizer: Sectionizer::new(),
            embedder,
            retriever_settings,
            scorer,
            suggestions,
        }
    }

    /// Runs the full pipeline for one candidate/target pair.
    pub async fn analyze(
        &self,
        candidate_text: &str,
        target_text: &str,
    ) -> Result<AnalysisReport, AppError> {
        if candidate_text.trim().is_empty() {
            return Err(AppError::Validation(
                "Candidate document text is required".to_string(),
            ));
        }
        if target_text.trim().is_empty() {
            return Err(AppError::Validation(
                "Target role description text is required".to_string(),
            ));
        }

        // Structure both documents.
        let sections = self.sectionizer.sectionize(candidate_text);
        let requirements = self.extractor.extract_requirements(target_text);
        debug!(
            "Structured input: {} sections, {} requirements",
            sections.len(),
            requirements.len()
        );

        // Canonicalize skills on both sides.
        let candidate_skills: BTreeSet<String> = sections
            .iter()
            .flat_map(|s| self.taxonomy.extract_skills_from_text(&s.content))
            .map(|m| m.canonical_skill)
            .collect();
        let must_have_skills =
            RequirementExtractor::skills_of_kind(&requirements, RequirementKind::MustHave);
        let preferred_skills =
            RequirementExtractor::skills_of_kind(&requirements, RequirementKind::Preferred);

        // Build the per-analysis evidence index and query it once per
        // must-have requirement.
        let mut retriever =
            EvidenceRetriever::new(self.embedder.clone(), self.retriever_settings);
        retriever.index(index_units(&sections)).await?;

        let mut evidence_list: Vec<EvidenceRecord> = Vec::new();
        let mut requirement_matches: Vec<RequirementMatch> = Vec::new();
        for req in requirements
            .iter()
            .filter(|r| r.kind == RequirementKind::MustHave)
        {
            let evidence = retriever.retrieve_evidence(&req.text, &req.skills).await?;
            requirement_matches.push(to_requirement_match(req, &evidence));
            evidence_list.push(evidence);
        }

        // Score.
        let target_title = self
            .extractor
            .extract_job_title(target_text)
            .unwrap_or_else(|| FALLBACK_TARGET_TITLE.to_string());
        let candidate_title = extract_candidate_title(&sections);
        let bullets: Vec<String> = sections.iter().flat_map(|s| s.bullets.clone()).collect();

        let score = self.scorer.calculate_score(&ScoreInputs {
            must_have_skills: &must_have_skills,
            preferred_skills: &preferred_skills,
            evidence: &evidence_list,
            candidate_skills: &candidate_skills,
            candidate_bullets: &bullets,
            target_title: Some(&target_title),
            candidate_title: Some(&candidate_title),
        });

        // Suggestions, ranked by estimated gain. Generation is best-effort;
        // failures have already degraded to placeholders by this point.
        let suggestions = self
            .build_suggestions(
                &requirement_matches,
                &sections,
                &must_have_skills,
                &candidate_skills,
                &score.breakdown,
            )
            .await;

        let missing_skills: Vec<String> = must_have_skills
            .difference(&candidate_skills)
            .take(MAX_SKILL_INSERTIONS)
            .cloned()
            .collect();

        let summary_suggestion = match sections
            .iter()
            .find(|s| s.section_type == SectionType::Summary)
        {
            Some(summary) => Some(
                self.suggestions
                    .generate_summary_update(
                        &summary.content,
                        &target_title,
                        &must_have_skills.iter().cloned().collect::<Vec<_>>(),
                    )
                    .await,
            ),
            None => None,
        };

        info!(
            "Analysis complete: score={} must_haves={} edits={}",
            score.overall_score,
            requirement_matches.len(),
            suggestions.len()
        );

        Ok(AnalysisReport {
            overall_score: score.overall_score,
            breakdown: score.breakdown,
            explanation: score.explanation,
            target_title,
            must_haves: requirement_matches,
            top_edits: suggestions
                .into_iter()
                .map(|s| SuggestedEdit {
                    target: s.target_location,
                    current: s.current_text,
                    suggested: s.suggested_text,
                    reason: s.reason,
                    estimated_score_gain: s.estimated_score_gain,
                })
                .collect(),
            skills_insertions: missing_skills,
            summary_suggestion,
        })
    }

    async fn build_suggestions(
        &self,
        requirement_matches: &[RequirementMatch],
        sections: &[Section],
        must_have_skills: &BTreeSet<String>,
        candidate_skills: &BTreeSet<String>,
        breakdown: &crate::scoring::ScoreBreakdown,
    ) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        for m in requirement_matches {
            if m.status == MatchStatus::Present {
                continue;
            }
            let kind = if m.status == MatchStatus::Missing {
                ImprovementKind::Coverage
            } else {
                ImprovementKind::Explicitness
            };
            let gain = self.scorer.estimate_score_gain(breakdown, kind);

            let current = m
                .evidence
                .clone()
                .unwrap_or_else(|| "Worked on relevant projects".to_string());
            let suggested = self
                .suggestions
                .generate_bullet_rewrite(&current, &m.requirement, &m.skills)
                .await;

            suggestions.push(Suggestion {
                suggestion_type: SuggestionType::BulletRewrite,
                target_section: m
                    .suggested_edit_target
                    .split('>')
                    .next()
                    .unwrap_or("Experience")
                    .trim()
                    .to_string(),
                target_location: m.suggested_edit_target.clone(),
                current_text: m.evidence.clone(),
                suggested_text: suggested,
                reason: format!("Requirement: {}", m.requirement),
                requirement: m.requirement.clone(),
                estimated_score_gain: gain,
            });
        }

        let missing: Vec<String> = must_have_skills
            .difference(candidate_skills)
            .cloned()
            .collect();
        if !missing.is_empty() {
            if let Some(skills_section) = sections
                .iter()
                .find(|s| s.section_type == SectionType::Skills)
            {
                let suggested = self
                    .suggestions
                    .generate_skill_insertions(&missing, &skills_section.content);
                suggestions.push(Suggestion {
                    suggestion_type: SuggestionType::SkillInsertion,
                    target_section: "Skills".to_string(),
                    target_location: "Skills section".to_string(),
                    current_text: Some(skills_section.content.clone()),
                    suggested_text: suggested,
                    reason: "Add missing must-have skills".to_string(),
                    requirement: "Multiple requirements".to_string(),
                    estimated_score_gain: self
                        .scorer
                        .estimate_score_gain(breakdown, ImprovementKind::Coverage),
                });
            }
        }

        suggestions.sort_by(|a, b| b.estimated_score_gain.cmp(&a.estimated_score_gain));
        suggestions.truncate(MAX_EDITS);
        suggestions
    }
}

/// Index units: each bullet individually; a section's whole content only
/// when it has no bullets.
fn index_units(sections: &[Section]) -> Vec<ContentUnit> {
    let mut units = Vec::new();
    for section in sections {
        for (i, bullet) in section.bullets.iter().enumerate() {
            units.push(ContentUnit {
                text: bullet.clone(),
                section: section.title.clone(),
                bullet_index: Some(i),
            });
        }
        if section.bullets.is_empty() && !section.content.is_empty() {
            units.push(ContentUnit {
                text: section.content.clone(),
                section: section.title.clone(),
                bullet_index: None,
            });
        }
    }
    units
}

fn to_requirement_match(req: &Requirement, evidence: &EvidenceRecord) -> RequirementMatch {
    let suggested_edit_target = match evidence.bullet_index {
        Some(i) => format!("{} > bullet {i}", evidence.section),
        None => evidence.section.clone(),
    };
    RequirementMatch {
        requirement: req.text.clone(),
        kind: req.kind,
        skills: req.skills.iter().cloned().collect(),
        status: evidence.status,
        evidence: (evidence.status != MatchStatus::Missing)
            .then(|| evidence.matched_text.clone()),
        confidence: evidence.similarity_score,
        suggested_edit_target,
    }
}

/// Current title heuristic: first substantial line of the experience
/// section, else a neutral fallback.
fn extract_candidate_title(sections: &[Section]) -> String {
    for section in sections {
        if section.section_type == SectionType::Experience {
            for line in section.content.lines().take(5) {
                let stripped = line.trim();
                if stripped.len() > 5 {
                    return stripped.to_string();
                }
            }
        }
    }
    FALLBACK_CANDIDATE_TITLE.to_string()
}
