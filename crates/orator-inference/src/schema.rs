// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strict parsing of a model's assessment reply.
//!
//! The reply is first parsed as-is. If that fails, one fallback pass takes
//! the largest balanced `{...}` span embedded in the text (models like to
//! wrap JSON in prose or code fences) and parses that. Nothing else is tried.

use serde::Deserialize;

use orator_core::types::{Feedback, SubScores};

const LEVELS: &[&str] = &["A1", "A2", "B1", "B2", "C1", "C2"];

/// A validated assessment as produced by a model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParsedAssessment {
    pub overall_score: u8,
    pub scores: SubScores,
    pub transcription: String,
    pub level: String,
    #[serde(default)]
    pub feedback: Feedback,
}

/// Why a reply could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError(pub String);

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses and validates a reply.
pub fn parse_assessment(text: &str) -> Result<ParsedAssessment, SchemaError> {
    let direct = parse_strict(text.trim());
    let parsed = match direct {
        Ok(parsed) => parsed,
        Err(direct_err) => {
            let Some(span) = largest_json_object(text) else {
                return Err(SchemaError(format!("no JSON object in reply ({direct_err})")));
            };
            parse_strict(span)?
        }
    };
    validate(parsed)
}

fn parse_strict(text: &str) -> Result<ParsedAssessment, SchemaError> {
    serde_json::from_str(text).map_err(|e| SchemaError(format!("schema mismatch: {e}")))
}

fn validate(mut parsed: ParsedAssessment) -> Result<ParsedAssessment, SchemaError> {
    let SubScores {
        accuracy,
        fluency,
        prosody,
        completeness,
        word_accuracy,
    } = parsed.scores;
    for (name, value) in [
        ("overall_score", parsed.overall_score),
        ("accuracy", accuracy),
        ("fluency", fluency),
        ("prosody", prosody),
        ("completeness", completeness),
        ("word_accuracy", word_accuracy),
    ] {
        if value > 100 {
            return Err(SchemaError(format!("{name} out of range: {value}")));
        }
    }

    let level = parsed.level.trim().to_uppercase();
    if !LEVELS.contains(&level.as_str()) {
        return Err(SchemaError(format!("unknown level `{}`", parsed.level)));
    }
    parsed.level = level;
    parsed.transcription = parsed.transcription.trim().to_string();
    Ok(parsed)
}

/// Largest balanced `{...}` span in `text`, ignoring braces inside JSON strings.
pub fn largest_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut best: Option<(usize, usize)> = None;
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let len = i + 1 - start;
                    if best.is_none_or(|(s, e)| e - s < len) {
                        best = Some((start, i + 1));
                    }
                }
            }
            _ => {}
        }
    }

    best.map(|(s, e)| &text[s..e])
}
