//! Requirement extractor - splits a target-role description into classified
//! requirement statements with per-statement skill, years, and
//! technical-flag annotations.

use std::collections::BTreeSet;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::taxonomy::SkillsTaxonomy;

/// The three requirement buckets of a target description, ranked by
/// mandatoriness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    MustHave,
    Preferred,
    Responsibility,
}

/// A single requirement statement. Produced once per analysis, immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub text: String,
    pub kind: RequirementKind,
    pub skills: BTreeSet<String>,
    pub years_experience: Option<u32>,
    pub is_technical: bool,
}

/// Bucket header markers. A trimmed lower-cased line containing any marker
/// opens that bucket; buckets are checked in this priority order, so a line
/// like "preferred qualifications" lands in must-have via "qualifications".
const MUST_HAVE_MARKERS: &[&str] = &[
    "required",
    "requirements",
    "qualifications",
    "must have",
    "you have",
    "you bring",
    "minimum qualifications",
];

const PREFERRED_MARKERS: &[&str] = &[
    "preferred",
    "nice to have",
    "bonus",
    "plus",
    "ideal",
    "preferred qualifications",
    "we'd love if",
];

const RESPONSIBILITY_MARKERS: &[&str] = &[
    "responsibilities",
    "you will",
    "what you'll do",
    "day-to-day",
    "role",
    "about the role",
];

const TECHNICAL_INDICATORS: &[&str] = &[
    "python",
    "sql",
    "java",
    "aws",
    "cloud",
    "machine learning",
    "data",
    "api",
    "framework",
    "library",
    "database",
    "tool",
    "platform",
    "system",
    "software",
    "code",
    "programming",
];

const SOFT_INDICATORS: &[&str] = &[
    "communication",
    "leadership",
    "teamwork",
    "collaboration",
    "stakeholder",
    "presentation",
    "agile",
    "scrum",
];

/// Requirement lines shorter than this (trimmed) are discarded as noise.
const MIN_REQUIREMENT_LEN: usize = 10;

pub struct RequirementExtractor {
    taxonomy: Arc<SkillsTaxonomy>,
    years: Regex,
    bullet_marker: Regex,
    title_role: Regex,
    title_labeled: Vec<Regex>,
}

impl RequirementExtractor {
    pub fn new(taxonomy: Arc<SkillsTaxonomy>) -> Self {
        Self {
            taxonomy,
            years: Regex::new(r"(?i)(\d+)\+?\s*(?:years?|yrs?)(?:\s+of)?(?:\s+experience)?")
                .expect("years pattern must compile"),
            bullet_marker: Regex::new(r"^\s*(?:[•\-*+]|\d+\.|[a-z]\))\s*")
                .expect("bullet pattern must compile"),
            title_role: Regex::new(
                r"(?i)(Senior|Junior|Lead|Staff|Principal)?\s*(Data Scientist|ML Engineer|Software Engineer|Data Engineer|Analyst)",
            )
            .expect("title pattern must compile"),
            title_labeled: vec![
                Regex::new(r"(?i)Job Title:\s*(.+)").expect("title pattern must compile"),
                Regex::new(r"(?i)Position:\s*(.+)").expect("title pattern must compile"),
            ],
        }
    }

    /// Extracts classified requirement statements from target-role text.
    /// Output order: all must-have, then preferred, then responsibility.
    pub fn extract_requirements(&self, text: &str) -> Vec<Requirement> {
        let buckets = split_into_buckets(text);

        let mut requirements = Vec::new();
        for (kind, lines) in buckets {
            for line in self.requirement_lines(&lines) {
                requirements.push(self.parse_requirement(line, kind));
            }
        }
        requirements
    }

    /// Individual requirement lines from a bucket: short lines discarded,
    /// leading bullet/number markers stripped.
    fn requirement_lines(&self, lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .filter(|line| line.trim().len() >= MIN_REQUIREMENT_LEN)
            .filter_map(|line| {
                let cleaned = self.bullet_marker.replace(line.trim(), "").trim().to_string();
                (!cleaned.is_empty()).then_some(cleaned)
            })
            .collect()
    }

    fn parse_requirement(&self, text: String, kind: RequirementKind) -> Requirement {
        let skills = self
            .taxonomy
            .extract_skills_from_text(&text)
            .into_iter()
            .map(|m| m.canonical_skill)
            .collect();
        let years_experience = self.extract_years(&text);
        let is_technical = is_technical_requirement(&text);

        Requirement {
            text,
            kind,
            skills,
            years_experience,
            is_technical,
        }
    }

    fn extract_years(&self, text: &str) -> Option<u32> {
        self.years
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Scans the first 10 lines for a title-like pattern; first match wins.
    pub fn extract_job_title(&self, text: &str) -> Option<String> {
        for line in text.lines().take(10) {
            let stripped = line.trim();
            if stripped.len() < 5 {
                continue;
            }
            for pattern in &self.title_labeled {
                if let Some(caps) = pattern.captures(stripped) {
                    return Some(caps[1].trim().to_string());
                }
            }
            if let Some(m) = self.title_role.find(stripped) {
                return Some(m.as_str().trim().to_string());
            }
        }
        None
    }

    /// Union of skills over requirements of the given kind.
    pub fn skills_of_kind(
        requirements: &[Requirement],
        kind: RequirementKind,
    ) -> BTreeSet<String> {
        requirements
            .iter()
            .filter(|r| r.kind == kind)
            .flat_map(|r| r.skills.iter().cloned())
            .collect()
    }
}

/// First pass: bucket lines under the most recent recognized header.
/// Lines before any header are dropped. Bucket output order is fixed:
/// must-have, preferred, responsibility.
fn split_into_buckets(text: &str) -> Vec<(RequirementKind, Vec<String>)> {
    let mut must_have = Vec::new();
    let mut preferred = Vec::new();
    let mut responsibility = Vec::new();
    let mut current: Option<RequirementKind> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }

        if let Some(kind) = identify_bucket(&stripped.to_lowercase()) {
            current = Some(kind);
            continue;
        }

        match current {
            Some(RequirementKind::MustHave) => must_have.push(stripped.to_string()),
            Some(RequirementKind::Preferred) => preferred.push(stripped.to_string()),
            Some(RequirementKind::Responsibility) => responsibility.push(stripped.to_string()),
            None => {}
        }
    }

    vec![
        (RequirementKind::MustHave, must_have),
        (RequirementKind::Preferred, preferred),
        (RequirementKind::Responsibility, responsibility),
    ]
}

fn identify_bucket(line: &str) -> Option<RequirementKind> {
    if MUST_HAVE_MARKERS.iter().any(|m| line.contains(m)) {
        return Some(RequirementKind::MustHave);
    }
    if PREFERRED_MARKERS.iter().any(|m| line.contains(m)) {
        return Some(RequirementKind::Preferred);
    }
    if RESPONSIBILITY_MARKERS.iter().any(|m| line.contains(m)) {
        return Some(RequirementKind::Responsibility);
    }
    None
}

/// Technical indicators are checked before soft indicators; the first hit
/// across both lists wins, defaulting to technical when neither matches.
fn is_technical_requirement(text: &str) -> bool {
    let text_lower = text.to_lowercase();
    if TECHNICAL_INDICATORS.iter().any(|i| text_lower.contains(i)) {
        return true;
    }
    if SOFT_INDICATORS.iter().any(|i| text_lower.contains(i)) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_extractor() -> RequirementExtractor {
        let taxonomy = SkillsTaxonomy::from_json(
            r#"{
                "programming_languages": {
                    "Python": ["python3"],
                    "SQL": []
                },
                "cloud_platforms": {
                    "AWS": ["amazon web services"]
                },
                "soft_skills": {
                    "Communication": ["presentation skills"]
                }
            }"#,
        )
        .unwrap();
        RequirementExtractor::new(Arc::new(taxonomy))
    }

    const JD: &str = "\
Senior Data Scientist
About the role
Ship models to production weekly.

Requirements
• 5+ years of experience with Python and SQL
• Experience deploying models on AWS
Short one

Nice to have
• Strong communication and presentation skills
";

    #[test]
    fn test_buckets_and_order() {
        let reqs = make_extractor().extract_requirements(JD);
        let kinds: Vec<RequirementKind> = reqs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RequirementKind::MustHave,
                RequirementKind::MustHave,
                RequirementKind::Preferred,
                RequirementKind::Responsibility,
            ]
        );
    }

    #[test]
    fn test_short_lines_discarded() {
        let reqs = make_extractor().extract_requirements(JD);
        assert!(reqs.iter().all(|r| !r.text.contains("Short one")));
    }

    #[test]
    fn test_years_extracted_from_must_have() {
        let reqs = make_extractor().extract_requirements(JD);
        assert_eq!(reqs[0].years_experience, Some(5));
        assert_eq!(reqs[1].years_experience, None);
    }

    #[test]
    fn test_skills_canonicalized_per_requirement() {
        let reqs = make_extractor().extract_requirements(JD);
        assert!(reqs[0].skills.contains("Python"));
        assert!(reqs[0].skills.contains("SQL"));
        assert!(reqs[1].skills.contains("AWS"));
    }

    #[test]
    fn test_technical_flag_defaults_and_soft_detection() {
        let reqs = make_extractor().extract_requirements(JD);
        assert!(reqs[0].is_technical);
        // "Strong communication and presentation skills" hits only soft markers.
        let preferred = reqs
            .iter()
            .find(|r| r.kind == RequirementKind::Preferred)
            .unwrap();
        assert!(!preferred.is_technical);
    }

    #[test]
    fn test_technical_wins_over_soft_when_both_present() {
        assert!(is_technical_requirement(
            "Communicate data platform decisions to stakeholders"
        ));
    }

    #[test]
    fn test_unmatched_text_defaults_technical() {
        assert!(is_technical_requirement("Own the quarterly roadmap"));
    }

    #[test]
    fn test_must_have_priority_over_preferred_markers() {
        // "preferred qualifications" contains the must-have marker
        // "qualifications", and must-have is checked first.
        assert_eq!(
            identify_bucket("preferred qualifications"),
            Some(RequirementKind::MustHave)
        );
        assert_eq!(
            identify_bucket("nice to have"),
            Some(RequirementKind::Preferred)
        );
    }

    #[test]
    fn test_job_title_from_role_pattern() {
        let title = make_extractor().extract_job_title(JD);
        assert_eq!(title.as_deref(), Some("Senior Data Scientist"));
    }

    #[test]
    fn test_job_title_from_label() {
        let ex = make_extractor();
        let title = ex.extract_job_title("Job Title: Platform Wizard\nmore text");
        assert_eq!(title.as_deref(), Some("Platform Wizard"));
        let title = ex.extract_job_title("Position: Head of Data\n");
        assert_eq!(title.as_deref(), Some("Head of Data"));
    }

    #[test]
    fn test_job_title_absent() {
        assert!(make_extractor()
            .extract_job_title("We are a company.\nWe make things.\n")
            .is_none());
    }

    #[test]
    fn test_skill_union_by_kind() {
        let reqs = make_extractor().extract_requirements(JD);
        let must = RequirementExtractor::skills_of_kind(&reqs, RequirementKind::MustHave);
        assert!(must.contains("Python"));
        assert!(must.contains("AWS"));
        let preferred = RequirementExtractor::skills_of_kind(&reqs, RequirementKind::Preferred);
        assert!(preferred.contains("Communication"));
        assert!(!preferred.contains("Python"));
    }

    #[test]
    fn test_bullet_markers_stripped_from_requirement_text() {
        let reqs = make_extractor().extract_requirements(JD);
        assert!(reqs[0].text.starts_with("5+ years"));
    }
}
