#![allow(dead_code)]

//! Suggestion generator - turns weak and missing evidence into actionable
//! edits. Every generation failure is caught at this boundary and mapped
//! to a placeholder string; matching and scoring always complete even when
//! the generation backend is down.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generation::prompts::{BULLET_REWRITE_PROMPT, SUMMARY_UPDATE_PROMPT};
use crate::llm_client::TextGenerator;

/// Closed set of suggestion kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    BulletRewrite,
    SkillInsertion,
    SummaryUpdate,
    KeywordAdd,
}

/// One actionable edit, ranked by estimated score gain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion_type: SuggestionType,
    pub target_section: String,
    /// e.g. "Experience > bullet 2"
    pub target_location: String,
    pub current_text: Option<String>,
    pub suggested_text: String,
    pub reason: String,
    pub requirement: String,
    pub estimated_score_gain: u32,
}

/// Returned in place of generated text when the backend fails.
pub const GENERATION_PLACEHOLDER: &str =
    "[suggestion unavailable - generation backend failed, matching results are unaffected]";

const MAX_OUTPUT_TOKENS: u32 = 150;

pub struct SuggestionGenerator {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    /// intent -> verb list, loaded once from data/action_verbs.json.
    action_verbs: BTreeMap<String, Vec<String>>,
}

impl SuggestionGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, temperature: f32) -> Self {
        let action_verbs: BTreeMap<String, Vec<String>> =
            serde_json::from_str(include_str!("../../data/action_verbs.json"))
                .expect("built-in action verbs must parse");
        Self {
            generator,
            temperature,
            action_verbs,
        }
    }

    /// Rewrites a bullet toward a requirement. Degrades to a placeholder on
    /// any backend failure.
    pub async fn generate_bullet_rewrite(
        &self,
        current_bullet: &str,
        requirement: &str,
        requirement_skills: &[String],
    ) -> String {
        let verbs = self.select_action_verbs(requirement);
        let prompt = BULLET_REWRITE_PROMPT
            .replace("{requirement}", requirement)
            .replace("{skills}", &requirement_skills.join(", "))
            .replace("{current_bullet}", current_bullet)
            .replace("{verbs}", &verbs.join(", "));

        match self
            .generator
            .generate(&prompt, self.temperature, MAX_OUTPUT_TOKENS)
            .await
        {
            Ok(response) => extract_clean_line(&response),
            Err(e) => {
                warn!(
                    "Bullet rewrite generation failed ({}): {e}",
                    self.generator.backend_name()
                );
                GENERATION_PLACEHOLDER.to_string()
            }
        }
    }

    /// Appends missing skills to the skills section text. Pure string edit,
    /// no LLM involved.
    pub fn generate_skill_insertions(
        &self,
        missing_skills: &[String],
        current_skills_section: &str,
    ) -> String {
        let current_lower = current_skills_section.to_lowercase();
        let to_add: Vec<&str> = missing_skills
            .iter()
            .map(String::as_str)
            .filter(|s| !current_lower.contains(&s.to_lowercase()))
            .collect();

        if to_add.is_empty() {
            return current_skills_section.to_string();
        }

        let mut updated = current_skills_section.trim().to_string();
        if !updated.is_empty() && !updated.ends_with(',') {
            updated.push(',');
        }
        updated.push(' ');
        updated.push_str(&to_add.join(", "));
        updated.trim().to_string()
    }

    /// Rewrites the summary toward the target title. Degrades to a
    /// placeholder on any backend failure.
    pub async fn generate_summary_update(
        &self,
        current_summary: &str,
        job_title: &str,
        key_skills: &[String],
    ) -> String {
        let top_skills: Vec<&str> = key_skills.iter().take(5).map(String::as_str).collect();
        let prompt = SUMMARY_UPDATE_PROMPT
            .replace("{job_title}", job_title)
            .replace("{current_summary}", current_summary)
            .replace("{skills}", &top_skills.join(", "));

        match self
            .generator
            .generate(&prompt, self.temperature, MAX_OUTPUT_TOKENS)
            .await
        {
            Ok(response) => response.trim().to_string(),
            Err(e) => {
                warn!(
                    "Summary update generation failed ({}): {e}",
                    self.generator.backend_name()
                );
                GENERATION_PLACEHOLDER.to_string()
            }
        }
    }

    /// Picks a verb set by requirement intent keywords; creation verbs are
    /// the fallback.
    fn select_action_verbs(&self, requirement: &str) -> Vec<String> {
        let req_lower = requirement.to_lowercase();

        let intent = if ["build", "develop", "create", "design"]
            .iter()
            .any(|w| req_lower.contains(w))
        {
            "creation"
        } else if ["lead", "manage", "mentor"].iter().any(|w| req_lower.contains(w)) {
            "leadership"
        } else if ["improve", "optimize", "enhance"]
            .iter()
            .any(|w| req_lower.contains(w))
        {
            "improvement"
        } else if ["analyze", "evaluate", "research"]
            .iter()
            .any(|w| req_lower.contains(w))
        {
            "analysis"
        } else if ["automate", "script", "pipeline"]
            .iter()
            .any(|w| req_lower.contains(w))
        {
            "automation"
        } else if ["model", "predict", "train", "ml", "machine learning"]
            .iter()
            .any(|w| req_lower.contains(w))
        {
            "data_science"
        } else {
            "creation"
        };

        self.action_verbs
            .get(intent)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(5)
            .collect()
    }
}

/// Peels meta-text, markers, and quotes off an LLM response, keeping the
/// first substantial line.
fn extract_clean_line(response: &str) -> String {
    let mut text = response.trim().to_string();

    let meta_phrases = [
        "here is a rewritten bullet",
        "here's a rewritten bullet",
        "rewritten bullet:",
        "here is the rewritten",
        "here's the rewritten",
        "revised bullet:",
        "updated bullet:",
    ];
    let text_lower = text.to_lowercase();
    for phrase in meta_phrases {
        if let Some(idx) = text_lower.find(phrase) {
            // get() guards against a lowercasing length shift landing the
            // offset off a char boundary.
            if let Some(rest) = text.get(idx + phrase.len()..) {
                text = rest
                    .trim_start_matches([':', '•', '-', '*', '+', ' ', '\n'])
                    .to_string();
            }
            break;
        }
    }

    let line = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .find(|l| {
            let lower = l.to_lowercase();
            l.len() > 20 && !lower.starts_with("here") && !lower.starts_with("this")
        })
        .or_else(|| text.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("");

    line.trim_matches(['•', '-', '*', '+', ' '])
        .trim_matches(['"', '\''])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct CannedGenerator(Result<String, ()>);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(LlmError::EmptyContent),
            }
        }

        fn backend_name(&self) -> &'static str {
            "canned"
        }
    }

    fn generator_with(result: Result<String, ()>) -> SuggestionGenerator {
        SuggestionGenerator::new(Arc::new(CannedGenerator(result)), 0.3)
    }

    #[tokio::test]
    async fn test_bullet_rewrite_returns_cleaned_response() {
        let sg = generator_with(Ok(
            "Here is a rewritten bullet: Deployed 4 Spark pipelines cutting runtime 35%"
                .to_string(),
        ));
        let rewritten = sg
            .generate_bullet_rewrite("old bullet", "Spark experience", &["Spark".to_string()])
            .await;
        assert_eq!(
            rewritten,
            "Deployed 4 Spark pipelines cutting runtime 35%"
        );
    }

    #[tokio::test]
    async fn test_bullet_rewrite_degrades_to_placeholder() {
        let sg = generator_with(Err(()));
        let rewritten = sg
            .generate_bullet_rewrite("old bullet", "Spark experience", &[])
            .await;
        assert_eq!(rewritten, GENERATION_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_summary_update_degrades_to_placeholder() {
        let sg = generator_with(Err(()));
        let updated = sg
            .generate_summary_update("old summary", "Data Engineer", &[])
            .await;
        assert_eq!(updated, GENERATION_PLACEHOLDER);
    }

    #[test]
    fn test_skill_insertion_appends_missing_only() {
        let sg = generator_with(Ok(String::new()));
        let updated = sg.generate_skill_insertions(
            &["Python".to_string(), "Kafka".to_string()],
            "Python, SQL",
        );
        assert_eq!(updated, "Python, SQL, Kafka");
    }

    #[test]
    fn test_skill_insertion_noop_when_all_present() {
        let sg = generator_with(Ok(String::new()));
        let updated = sg.generate_skill_insertions(&["python".to_string()], "Python, SQL");
        assert_eq!(updated, "Python, SQL");
    }

    #[test]
    fn test_skill_insertion_into_empty_section() {
        let sg = generator_with(Ok(String::new()));
        let updated = sg.generate_skill_insertions(&["Kafka".to_string()], "");
        assert_eq!(updated, "Kafka");
    }

    #[test]
    fn test_select_action_verbs_by_intent() {
        let sg = generator_with(Ok(String::new()));
        let verbs = sg.select_action_verbs("Lead and mentor a team of engineers");
        assert!(verbs.contains(&"Led".to_string()));
        let verbs = sg.select_action_verbs("Automate deployment pipelines");
        assert!(verbs.contains(&"Automated".to_string()));
        // Unrecognized intent falls back to creation verbs.
        let verbs = sg.select_action_verbs("Do the needful");
        assert!(verbs.contains(&"Built".to_string()));
    }

    #[test]
    fn test_extract_clean_line_strips_markers_and_quotes() {
        assert_eq!(
            extract_clean_line("• \"Shipped 3 services with 99.9% uptime\""),
            "Shipped 3 services with 99.9% uptime"
        );
    }

    #[test]
    fn test_extract_clean_line_skips_meta_lines() {
        let response = "Here's the rewritten\nBuilt 5 dashboards adopted by 40 analysts\n";
        assert_eq!(
            extract_clean_line(response),
            "Built 5 dashboards adopted by 40 analysts"
        );
    }
}
