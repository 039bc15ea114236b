// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat templates for assessment results.
//!
//! Three templates: general (no target phrase), short-form (target of at most
//! two words, where fluency and prosody say little) and long-form.

use std::fmt::Write;

use orator_core::types::{AssessmentResult, Button, TextForm, classify_target};

/// Which template a result is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    General,
    ShortForm,
    LongForm,
}

pub fn template_for(result: &AssessmentResult) -> Template {
    match result.target_text.as_deref() {
        None => Template::General,
        Some(target) => match classify_target(target) {
            TextForm::Short => Template::ShortForm,
            TextForm::Long => Template::LongForm,
        },
    }
}

/// Renders a result for chat.
pub fn format_result(result: &AssessmentResult) -> String {
    let mut out = String::new();
    let s = &result.scores;
    let template = template_for(result);

    let title = match template {
        Template::General => "🎙 Pronunciation assessment",
        Template::ShortForm => "🔤 Word check",
        Template::LongForm => "📖 Reading assessment",
    };
    let _ = writeln!(out, "{title}");
    let _ = writeln!(
        out,
        "Overall: {}/100 · Level {}",
        result.overall_score, result.level
    );
    if let Some(target) = &result.target_text {
        let _ = writeln!(out, "Target: «{target}»");
    }
    out.push('\n');

    match template {
        Template::ShortForm => {
            let _ = writeln!(
                out,
                "Accuracy {} · Word accuracy {} · Completeness {}",
                s.accuracy, s.word_accuracy, s.completeness
            );
        }
        Template::General | Template::LongForm => {
            let _ = writeln!(
                out,
                "Accuracy {} · Fluency {} · Prosody {}",
                s.accuracy, s.fluency, s.prosody
            );
            let _ = writeln!(
                out,
                "Completeness {} · Word accuracy {}",
                s.completeness, s.word_accuracy
            );
        }
    }

    if !result.transcription.is_empty() && template != Template::ShortForm {
        let _ = writeln!(out, "\n📝 I heard: \"{}\"", result.transcription);
    }

    let feedback = &result.feedback;
    if !feedback.strengths.is_empty() && template != Template::ShortForm {
        let _ = writeln!(out, "\n✅ Strengths");
        for strength in &feedback.strengths {
            let _ = writeln!(out, "• {strength}");
        }
    }

    if !feedback.mispronounced.is_empty() {
        let _ = writeln!(out, "\n⚠️ Work on");
        for word in &feedback.mispronounced {
            let mut line = format!("• {}", word.word);
            if let Some(heard) = &word.heard {
                let _ = write!(line, " (heard \"{heard}\")");
            }
            if let Some(phonemes) = &word.phonemes {
                let _ = write!(line, " /{}/", phonemes.trim_matches('/'));
            }
            if !word.note.is_empty() {
                let _ = write!(line, ": {}", word.note);
            }
            let _ = writeln!(out, "{line}");
        }
    }

    if !feedback.action_plan.is_empty() {
        let _ = writeln!(out, "\n🎯 Next steps");
        let limit = if template == Template::ShortForm { 2 } else { usize::MAX };
        for (i, step) in feedback.action_plan.iter().take(limit).enumerate() {
            let _ = writeln!(out, "{}. {step}", i + 1);
        }
    }

    out.trim_end().to_string()
}

/// Buttons attached under a result.
pub fn result_buttons(result_id: &str) -> Vec<Vec<Button>> {
    vec![vec![
        Button::new("📄 Full report", format!("report:{result_id}")),
        Button::new("🏠 Menu", "menu:main"),
    ]]
}

/// One line per result for `/history`.
pub fn history_line(result: &AssessmentResult) -> String {
    let date = result.created_at.get(..10).unwrap_or(&result.created_at);
    let target = result
        .target_text
        .as_deref()
        .map(|t| format!(" «{t}»"))
        .unwrap_or_default();
    format!(
        "{date} · {kind}{target} · {score}/100 {level} · /report {id}",
        kind = result.kind,
        score = result.overall_score,
        level = result.level,
        id = result.id,
    )
}
