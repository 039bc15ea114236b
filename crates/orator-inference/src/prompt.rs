// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assessment instruction text.
//!
//! The rubric is fixed; only the assessment kind and the target phrase vary.

use orator_core::types::AssessmentKind;

const RUBRIC: &str = "You are an English pronunciation examiner. Listen to the attached \
recording and score the speaker on five criteria, each an integer from 0 to 100:
- accuracy: phonetic accuracy of individual sounds
- fluency: smoothness, pace and absence of unnatural pauses
- prosody: stress, rhythm and intonation
- completeness: share of the expected words actually spoken
- word_accuracy: share of words pronounced recognisably and correctly
Give an overall_score (integer 0-100) and a CEFR level (A1, A2, B1, B2, C1 or C2).";

const OUTPUT_SCHEMA: &str = r#"Reply with a single JSON object and nothing else, exactly in this shape:
{
  "overall_score": 0,
  "scores": {"accuracy": 0, "fluency": 0, "prosody": 0, "completeness": 0, "word_accuracy": 0},
  "transcription": "what you heard",
  "level": "B1",
  "feedback": {
    "strengths": ["..."],
    "mispronounced": [{"word": "...", "heard": "...", "phonemes": "/IPA/", "note": "..."}],
    "action_plan": ["..."]
  }
}"#;

/// Builds the instruction sent alongside the audio.
pub fn build_instruction(kind: AssessmentKind, target_text: Option<&str>) -> String {
    let task = match (kind, target_text) {
        (AssessmentKind::General, _) | (_, None) => {
            "The speaker talks freely; there is no reference text. Judge completeness \
             by whether sentences are finished."
                .to_string()
        }
        (AssessmentKind::Compare, Some(target)) => format!(
            "The speaker imitates a reference reading of this text: \"{target}\". \
             Compare their pronunciation against a careful native reading of it."
        ),
        (AssessmentKind::Test | AssessmentKind::Task, Some(target)) => format!(
            "The speaker was asked to read this text aloud: \"{target}\". \
             List every word of it that was mispronounced or skipped."
        ),
    };
    format!("{RUBRIC}\n\n{task}\n\n{OUTPUT_SCHEMA}")
}
