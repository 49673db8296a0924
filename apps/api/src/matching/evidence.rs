#![allow(dead_code)]

//! Evidence retrieval - locates the best-supporting candidate content unit
//! for each requirement via vector similarity, with a two-threshold
//! classification policy and a skill-mention boost.
//!
//! A retriever is exclusively owned by the analysis that built it:
//! `index()` destructively replaces prior state, so callers construct a
//! fresh retriever per analysis rather than sharing one.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::embedder::Embedder;
use crate::matching::index::{dot, DenseIndex};

/// Boost added per distinct requirement skill found verbatim in the
/// matched unit's text.
const SKILL_BOOST: f32 = 0.05;

/// Tri-state classification of how well a requirement is supported.
/// Ordering of favorability: Present > Weak > Missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Present,
    Weak,
    Missing,
}

/// One indexable unit of candidate content: a bullet, or a whole section's
/// text when the section has no bullets.
#[derive(Debug, Clone)]
pub struct ContentUnit {
    pub text: String,
    pub section: String,
    pub bullet_index: Option<usize>,
}

/// Best evidence found for a single requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub requirement_text: String,
    pub matched_text: String,
    pub similarity_score: f32,
    pub status: MatchStatus,
    pub section: String,
    pub bullet_index: Option<usize>,
}

/// Ranked candidate from `retrieve_top_k_evidence`, for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEvidence {
    pub text: String,
    pub similarity_score: f32,
    pub section: String,
    pub bullet_index: Option<usize>,
}

/// Validated retrieval thresholds. `tau_low <= tau_high` is checked once
/// here; a violation is a configuration error, never a per-call error.
#[derive(Debug, Clone, Copy)]
pub struct RetrieverSettings {
    pub tau_high: f32,
    pub tau_low: f32,
    pub top_k: usize,
}

impl RetrieverSettings {
    pub fn new(tau_high: f32, tau_low: f32, top_k: usize) -> Result<Self, AppError> {
        if tau_low > tau_high {
            return Err(AppError::InvalidConfiguration(format!(
                "tau_low ({tau_low}) must not exceed tau_high ({tau_high})"
            )));
        }
        if top_k == 0 {
            return Err(AppError::InvalidConfiguration(
                "top_k must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            tau_high,
            tau_low,
            top_k,
        })
    }
}

pub struct EvidenceRetriever {
    embedder: Arc<dyn Embedder>,
    settings: RetrieverSettings,
    units: Vec<ContentUnit>,
    index: Option<DenseIndex>,
}

impl EvidenceRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, settings: RetrieverSettings) -> Self {
        Self {
            embedder,
            settings,
            units: Vec::new(),
            index: None,
        }
    }

    /// Embeds all unit texts and builds a fresh index, replacing any prior
    /// one. Must be called before any retrieval.
    pub async fn index(&mut self, units: Vec<ContentUnit>) -> Result<(), AppError> {
        let texts: Vec<String> = units.iter().map(|u| u.text.clone()).collect();
        let vectors = self
            .embedder
            .embed(&texts)
            .await
            .map_err(|e| AppError::Embedding(e.to_string()))?;
        self.units = units;
        self.index = Some(DenseIndex::build(vectors));
        Ok(())
    }

    /// Best supporting unit for a requirement.
    ///
    /// The top match of a top-K query is classified against the thresholds;
    /// then each distinct requirement skill appearing (case-insensitively)
    /// in the matched text adds 0.05, capped at 1.0, and the boosted score
    /// is re-tested against tau_high and tau_low. The boost can only raise
    /// or preserve the status, never lower it.
    pub async fn retrieve_evidence(
        &self,
        requirement_text: &str,
        requirement_skills: &BTreeSet<String>,
    ) -> Result<EvidenceRecord, AppError> {
        let index = self.index.as_ref().ok_or_else(|| {
            AppError::NotIndexed("retrieve_evidence called before index()".to_string())
        })?;

        if index.is_empty() {
            return Ok(EvidenceRecord {
                requirement_text: requirement_text.to_string(),
                matched_text: String::new(),
                similarity_score: 0.0,
                status: MatchStatus::Missing,
                section: String::new(),
                bullet_index: None,
            });
        }

        let query = self.embed_one(requirement_text).await?;
        let k = self.settings.top_k.min(self.units.len());
        let ranked = index.query(&query, k);
        let (best_score, best_id) = ranked[0];

        let mut score = best_score;
        let mut status = self.classify(score);

        let unit = &self.units[best_id];
        let matched_lower = unit.text.to_lowercase();
        let skill_hits = requirement_skills
            .iter()
            .filter(|s| matched_lower.contains(&s.to_lowercase()))
            .count();

        if skill_hits > 0 {
            score = (score + SKILL_BOOST * skill_hits as f32).min(1.0);
            // Upward-only re-classification: the missing arm is not
            // reasserted after a boost.
            if score >= self.settings.tau_high {
                status = MatchStatus::Present;
            } else if score >= self.settings.tau_low {
                status = MatchStatus::Weak;
            }
        }

        Ok(EvidenceRecord {
            requirement_text: requirement_text.to_string(),
            matched_text: unit.text.clone(),
            similarity_score: score,
            status,
            section: unit.section.clone(),
            bullet_index: unit.bullet_index,
        })
    }

    /// Full ranked candidate list for a requirement, for diagnostics.
    pub async fn retrieve_top_k_evidence(
        &self,
        requirement_text: &str,
        k: Option<usize>,
    ) -> Result<Vec<RankedEvidence>, AppError> {
        let index = self.index.as_ref().ok_or_else(|| {
            AppError::NotIndexed("retrieve_top_k_evidence called before index()".to_string())
        })?;

        let query = self.embed_one(requirement_text).await?;
        let k = k.unwrap_or(self.settings.top_k).min(self.units.len());

        Ok(index
            .query(&query, k)
            .into_iter()
            .map(|(score, id)| {
                let unit = &self.units[id];
                RankedEvidence {
                    text: unit.text.clone(),
                    similarity_score: score,
                    section: unit.section.clone(),
                    bullet_index: unit.bullet_index,
                }
            })
            .collect())
    }

    /// Direct oracle round-trip for ad hoc comparisons; no index involved.
    pub async fn compute_similarity(&self, text1: &str, text2: &str) -> Result<f32, AppError> {
        let vectors = self
            .embedder
            .embed(&[text1.to_string(), text2.to_string()])
            .await
            .map_err(|e| AppError::Embedding(e.to_string()))?;
        Ok(dot(&vectors[0], &vectors[1]))
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let mut vectors = self
            .embedder
            .embed(&[text.to_string()])
            .await
            .map_err(|e| AppError::Embedding(e.to_string()))?;
        if vectors.is_empty() {
            return Err(AppError::Embedding(
                "embedding backend returned no vector".to_string(),
            ));
        }
        Ok(vectors.remove(0))
    }

    fn classify(&self, score: f32) -> MatchStatus {
        if score >= self.settings.tau_high {
            MatchStatus::Present
        } else if score >= self.settings.tau_low {
            MatchStatus::Weak
        } else {
            MatchStatus::Missing
        }
    }
}
