#![allow(dead_code)]

//! Skills taxonomy matcher - canonicalizes free-text skill mentions against
//! a static category -> canonical -> aliases table.
//!
//! The taxonomy is loaded once at startup and shared read-only across all
//! analyses as an `Arc<SkillsTaxonomy>`. It is never mutated after load.
//! Categories and canonical names are held in `BTreeMap`s so every scan is
//! deterministic (lexicographic); substring containment carries no word
//! boundary rule, matching is intentionally a bag-of-matches operation.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Result of matching a single skill mention. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMatch {
    pub canonical_skill: String,
    pub matched_alias: Option<String>,
    pub category: String,
    /// 1.0 exact, 0.9 alias hit during extraction, 0.8 canonical substring,
    /// 0.7 alias substring.
    pub confidence: f32,
}

type CategoryTable = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Read-only skills taxonomy with a reverse index over canonical names and
/// aliases (lower-cased) for exact lookup.
pub struct SkillsTaxonomy {
    categories: CategoryTable,
    /// lower-cased canonical or alias -> (canonical, category)
    reverse: HashMap<String, (String, String)>,
}

impl SkillsTaxonomy {
    pub fn from_json(raw: &str) -> Result<Self> {
        let categories: CategoryTable =
            serde_json::from_str(raw).context("Failed to parse skills taxonomy JSON")?;
        Ok(Self::from_table(categories))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skills taxonomy at {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// The taxonomy shipped with the service, used when no path is configured.
    pub fn builtin() -> Self {
        Self::from_json(include_str!("../data/skills_taxonomy.json"))
            .expect("built-in skills taxonomy must parse")
    }

    fn from_table(categories: CategoryTable) -> Self {
        let mut reverse = HashMap::new();
        for (category, skills) in &categories {
            for (canonical, aliases) in skills {
                reverse.insert(
                    canonical.to_lowercase(),
                    (canonical.clone(), category.clone()),
                );
                for alias in aliases {
                    reverse.insert(alias.to_lowercase(), (canonical.clone(), category.clone()));
                }
            }
        }
        Self {
            categories,
            reverse,
        }
    }

    /// Matches one skill mention to its canonical form.
    ///
    /// Precedence: exact reverse-index lookup (1.0), then substring
    /// containment against canonical names in either direction (0.8), then
    /// against aliases in either direction (0.7). Returns `None` when the
    /// text matches nothing in the table.
    pub fn match_skill(&self, skill_text: &str) -> Option<SkillMatch> {
        let skill_lower = skill_text.trim().to_lowercase();
        if skill_lower.is_empty() {
            return None;
        }

        if let Some((canonical, category)) = self.reverse.get(&skill_lower) {
            let matched_alias = if skill_text != canonical {
                Some(skill_text.to_string())
            } else {
                None
            };
            return Some(SkillMatch {
                canonical_skill: canonical.clone(),
                matched_alias,
                category: category.clone(),
                confidence: 1.0,
            });
        }

        for (category, skills) in &self.categories {
            for (canonical, aliases) in skills {
                let canonical_lower = canonical.to_lowercase();
                if skill_lower.contains(&canonical_lower) || canonical_lower.contains(&skill_lower)
                {
                    return Some(SkillMatch {
                        canonical_skill: canonical.clone(),
                        matched_alias: Some(skill_text.to_string()),
                        category: category.clone(),
                        confidence: 0.8,
                    });
                }
                for alias in aliases {
                    let alias_lower = alias.to_lowercase();
                    if skill_lower.contains(&alias_lower) || alias_lower.contains(&skill_lower) {
                        return Some(SkillMatch {
                            canonical_skill: canonical.clone(),
                            matched_alias: Some(skill_text.to_string()),
                            category: category.clone(),
                            confidence: 0.7,
                        });
                    }
                }
            }
        }

        None
    }

    /// Reports every taxonomy skill mentioned in `text`, at most once per
    /// canonical skill. A canonical-name hit (1.0) takes priority over an
    /// alias hit (0.9) for the same skill; the first textual hit wins.
    pub fn extract_skills_from_text(&self, text: &str) -> Vec<SkillMatch> {
        let text_lower = text.to_lowercase();
        let mut matches = Vec::new();

        for (category, skills) in &self.categories {
            for (canonical, aliases) in skills {
                if text_lower.contains(&canonical.to_lowercase()) {
                    matches.push(SkillMatch {
                        canonical_skill: canonical.clone(),
                        matched_alias: None,
                        category: category.clone(),
                        confidence: 1.0,
                    });
                    continue;
                }
                if let Some(alias) = aliases
                    .iter()
                    .find(|a| text_lower.contains(&a.to_lowercase()))
                {
                    matches.push(SkillMatch {
                        canonical_skill: canonical.clone(),
                        matched_alias: Some(alias.clone()),
                        category: category.clone(),
                        confidence: 0.9,
                    });
                }
            }
        }

        matches
    }

    /// Canonical form for a skill, falling back to the input when unmatched.
    pub fn normalize_skill(&self, skill: &str) -> String {
        self.match_skill(skill)
            .map(|m| m.canonical_skill)
            .unwrap_or_else(|| skill.to_string())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn category_skills(&self, category: &str) -> Vec<&str> {
        self.categories
            .get(category)
            .map(|skills| skills.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_taxonomy() -> SkillsTaxonomy {
        SkillsTaxonomy::from_json(
            r#"{
                "cloud_platforms": {
                    "AWS": ["amazon web services", "ec2"],
                    "AWS Lambda": ["lambda functions"]
                },
                "programming_languages": {
                    "Python": ["python3", "py"],
                    "Rust": []
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_exact_canonical_match_confidence_one() {
        let tax = make_taxonomy();
        let m = tax.match_skill("Python").unwrap();
        assert_eq!(m.canonical_skill, "Python");
        assert_eq!(m.confidence, 1.0);
        assert!(m.matched_alias.is_none());
        assert_eq!(m.category, "programming_languages");
    }

    #[test]
    fn test_exact_alias_match_reports_alias() {
        let tax = make_taxonomy();
        let m = tax.match_skill("python3").unwrap();
        assert_eq!(m.canonical_skill, "Python");
        assert_eq!(m.confidence, 1.0);
        assert_eq!(m.matched_alias.as_deref(), Some("python3"));
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let tax = make_taxonomy();
        let m = tax.match_skill("RUST").unwrap();
        assert_eq!(m.canonical_skill, "Rust");
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn test_canonical_substring_scores_0_8() {
        let tax = make_taxonomy();
        let m = tax.match_skill("expert in Rust programming").unwrap();
        assert_eq!(m.canonical_skill, "Rust");
        assert_eq!(m.confidence, 0.8);
        assert!(m.matched_alias.is_some());
    }

    #[test]
    fn test_alias_substring_scores_0_7() {
        let tax = make_taxonomy();
        let m = tax.match_skill("managed ec2 fleets").unwrap();
        assert_eq!(m.canonical_skill, "AWS");
        assert_eq!(m.confidence, 0.7);
    }

    #[test]
    fn test_no_match_returns_none() {
        let tax = make_taxonomy();
        assert!(tax.match_skill("watercolor painting").is_none());
    }

    #[test]
    fn test_extract_one_match_per_canonical() {
        let tax = make_taxonomy();
        let matches = tax.extract_skills_from_text("Python, python3, and more Python");
        let pythons: Vec<_> = matches
            .iter()
            .filter(|m| m.canonical_skill == "Python")
            .collect();
        assert_eq!(pythons.len(), 1);
        assert_eq!(pythons[0].confidence, 1.0);
    }

    #[test]
    fn test_extract_alias_hit_scores_0_9() {
        let tax = make_taxonomy();
        let matches = tax.extract_skills_from_text("deployed lambda functions daily");
        let hit = matches
            .iter()
            .find(|m| m.canonical_skill == "AWS Lambda")
            .unwrap();
        assert_eq!(hit.confidence, 0.9);
        assert_eq!(hit.matched_alias.as_deref(), Some("lambda functions"));
    }

    #[test]
    fn test_extract_overlapping_canonicals_both_reported() {
        // "AWS Lambda" mentions contain "AWS" as a substring; dedup is per
        // canonical skill, so both canonicals surface.
        let tax = make_taxonomy();
        let matches = tax.extract_skills_from_text("built AWS Lambda pipelines");
        let names: Vec<_> = matches.iter().map(|m| m.canonical_skill.as_str()).collect();
        assert!(names.contains(&"AWS"));
        assert!(names.contains(&"AWS Lambda"));
    }

    #[test]
    fn test_normalize_skill_falls_back_to_input() {
        let tax = make_taxonomy();
        assert_eq!(tax.normalize_skill("py"), "Python");
        assert_eq!(tax.normalize_skill("basket weaving"), "basket weaving");
    }

    #[test]
    fn test_builtin_taxonomy_parses_and_is_nonempty() {
        let tax = SkillsTaxonomy::builtin();
        assert!(tax.categories().count() > 0);
        assert!(tax.match_skill("Python").is_some());
    }
}
