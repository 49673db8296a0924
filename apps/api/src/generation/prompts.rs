//! Prompt templates for suggestion generation. `{placeholder}` slots are
//! filled with `str::replace` before the call.

pub const BULLET_REWRITE_PROMPT: &str = r#"Rewrite the following resume bullet to better match a job requirement.

Requirement: "{requirement}"
Key skills to highlight: {skills}

Current bullet: "{current_bullet}"

Guidelines:
1. Keep it to ONE line (max 28 words)
2. Start with a strong action verb (suggestions: {verbs})
3. Include specific skills from the requirement if truthful
4. Add quantified impact if possible (%, $, time saved)
5. DO NOT invent facts - only enhance what's already there
6. Make the connection to the requirement explicit

Rewritten bullet (one line only):"#;

pub const SUMMARY_UPDATE_PROMPT: &str = r#"Rewrite this professional summary to align with a {job_title} role.

Current summary: {current_summary}

Requirements:
- Highlight these key skills: {skills}
- Keep it to 2-3 sentences
- Be specific and quantified where possible
- Stay truthful to the original content

Rewritten summary:"#;
