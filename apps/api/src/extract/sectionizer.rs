//! Structural sectionizer - splits candidate document text into typed,
//! ordered sections with extracted bullet lines and header metadata.
//!
//! Single forward pass over lines, effectively a two-state machine:
//! scanning-header vs in-section(type). A header line closes the open
//! section and opens a new accumulator; everything else accumulates into
//! the open section. Heuristics are tuned for short, bulleted professional
//! documents in English.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Closed set of section types a document can sectionize into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Header,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Publications,
    Awards,
    Other,
}

impl SectionType {
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionType::Header => "Header",
            SectionType::Summary => "Summary",
            SectionType::Experience => "Experience",
            SectionType::Education => "Education",
            SectionType::Skills => "Skills",
            SectionType::Projects => "Projects",
            SectionType::Certifications => "Certifications",
            SectionType::Publications => "Publications",
            SectionType::Awards => "Awards",
            SectionType::Other => "Other",
        }
    }
}

/// One section of a candidate document. Produced once per analysis by the
/// sectionization pass, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub section_type: SectionType,
    pub title: String,
    pub content: String,
    pub bullets: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Section-type patterns in priority order. Earlier entries win when a line
/// would match more than one.
const SECTION_PATTERNS: &[(SectionType, &[&str])] = &[
    (
        SectionType::Summary,
        &[
            r"^(professional\s+)?summary",
            r"^profile",
            r"^objective",
            r"^about(\s+me)?",
        ],
    ),
    (
        SectionType::Experience,
        &[
            r"^(work\s+)?experience",
            r"^employment(\s+history)?",
            r"^professional\s+experience",
            r"^career\s+history",
        ],
    ),
    (
        SectionType::Education,
        &[r"^education", r"^academic\s+background"],
    ),
    (
        SectionType::Skills,
        &[
            r"^(technical\s+)?skills",
            r"^competencies",
            r"^expertise",
            r"^technologies",
        ],
    ),
    (
        SectionType::Projects,
        &[r"^projects", r"^key\s+projects", r"^selected\s+projects"],
    ),
    (
        SectionType::Certifications,
        &[r"^certifications?", r"^licenses?"],
    ),
    (SectionType::Publications, &[r"^publications?", r"^papers?"]),
    (
        SectionType::Awards,
        &[r"^awards?", r"^honors?", r"^achievements?"],
    ),
];

/// Maximum number of leading lines scanned for the header block.
const HEADER_SCAN_LINES: usize = 10;

pub struct Sectionizer {
    patterns: Vec<(SectionType, Vec<Regex>)>,
    bullet_marker: Regex,
    email: Regex,
    phone: Regex,
    linkedin: Regex,
    github: Regex,
}

impl Sectionizer {
    pub fn new() -> Self {
        let patterns = SECTION_PATTERNS
            .iter()
            .map(|(section_type, raw)| {
                let compiled = raw
                    .iter()
                    .map(|p| Regex::new(p).expect("section pattern must compile"))
                    .collect();
                (*section_type, compiled)
            })
            .collect();

        Self {
            patterns,
            bullet_marker: Regex::new(r"^\s*(?:[•\-*+]|\d+\.|[a-z]\))\s*")
                .expect("bullet pattern must compile"),
            email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("email pattern must compile"),
            phone: Regex::new(r"(\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}")
                .expect("phone pattern must compile"),
            linkedin: Regex::new(r"(?i)linkedin\.com/in/[\w\-]+")
                .expect("linkedin pattern must compile"),
            github: Regex::new(r"(?i)github\.com/[\w\-]+").expect("github pattern must compile"),
        }
    }

    /// Splits document text into typed, ordered sections.
    pub fn sectionize(&self, text: &str) -> Vec<Section> {
        let lines: Vec<&str> = text.lines().collect();
        let mut sections = Vec::new();

        // Leading header block: up to HEADER_SCAN_LINES non-empty non-header
        // lines. Scanning stops at the first blank or recognized header line.
        let mut header_lines: Vec<&str> = Vec::new();
        let mut i = 0;
        while i < lines.len().min(HEADER_SCAN_LINES) {
            let line = lines[i].trim();
            if !line.is_empty() && self.identify_section(line).is_none() {
                header_lines.push(line);
                i += 1;
            } else {
                break;
            }
        }

        if !header_lines.is_empty() {
            let content = header_lines.join("\n");
            let metadata = self.extract_contact_info(&content);
            sections.push(Section {
                section_type: SectionType::Header,
                title: SectionType::Header.display_name().to_string(),
                content,
                bullets: Vec::new(),
                metadata,
            });
        }

        // Remaining lines: accumulate into the open section; content before
        // the first recognized header is dropped.
        let mut current_type: Option<SectionType> = None;
        let mut current_content: Vec<&str> = Vec::new();

        for line in &lines[i..] {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }

            if let Some(section_type) = self.identify_section(stripped) {
                if let Some(open) = current_type {
                    sections.push(self.close_section(open, &current_content));
                }
                current_type = Some(section_type);
                current_content.clear();
            } else if current_type.is_some() {
                current_content.push(line.trim_end());
            }
        }

        if let Some(open) = current_type {
            if !current_content.is_empty() {
                sections.push(self.close_section(open, &current_content));
            }
        }

        sections
    }

    fn close_section(&self, section_type: SectionType, content_lines: &[&str]) -> Section {
        let content = content_lines.join("\n");
        let bullets = self.extract_bullets(&content);
        Section {
            section_type,
            title: section_type.display_name().to_string(),
            content,
            bullets,
            metadata: BTreeMap::new(),
        }
    }

    /// First pattern (in priority order) matching the trimmed, lower-cased
    /// line decides the section type; `None` means the line is content.
    fn identify_section(&self, line: &str) -> Option<SectionType> {
        let line_clean = line.trim().to_lowercase();
        for (section_type, patterns) in &self.patterns {
            if patterns.iter().any(|p| p.is_match(&line_clean)) {
                return Some(*section_type);
            }
        }
        None
    }

    /// Extracts bullet strings from section content. A line counts as a
    /// bullet only when it starts with a marker (glyph, `1.`-style number,
    /// or `a)`-style letter); the marker is stripped off.
    fn extract_bullets(&self, content: &str) -> Vec<String> {
        content
            .lines()
            .filter_map(|line| {
                if !self.bullet_marker.is_match(line) {
                    return None;
                }
                let cleaned = self.bullet_marker.replace(line, "").trim().to_string();
                (!cleaned.is_empty()).then_some(cleaned)
            })
            .collect()
    }

    /// Contact metadata from the header block. Independent patterns, first
    /// match per field wins; absence is not an error.
    fn extract_contact_info(&self, header_text: &str) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        if let Some(m) = self.email.find(header_text) {
            metadata.insert("email".to_string(), m.as_str().to_string());
        }
        if let Some(m) = self.phone.find(header_text) {
            metadata.insert("phone".to_string(), m.as_str().to_string());
        }
        if let Some(m) = self.linkedin.find(header_text) {
            metadata.insert("linkedin".to_string(), m.as_str().to_string());
        }
        if let Some(m) = self.github.find(header_text) {
            metadata.insert("github".to_string(), m.as_str().to_string());
        }
        metadata
    }
}

impl Default for Sectionizer {
    fn default() -> Self {
        Self::new()
    }
}
