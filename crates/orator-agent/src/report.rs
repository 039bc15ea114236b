// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text report regenerated from a stored result.

use std::fmt::Write;

use orator_core::types::{AssessmentResult, Attachment};

/// Renders the full report for `/report <id>`.
pub fn render_report(result: &AssessmentResult) -> Attachment {
    let mut out = String::new();
    let s = &result.scores;

    let _ = writeln!(out, "ORATOR PRONUNCIATION REPORT");
    let _ = writeln!(out, "===========================");
    let _ = writeln!(out, "Result:     {}", result.id);
    let _ = writeln!(out, "Date:       {}", result.created_at);
    let _ = writeln!(out, "Kind:       {}", result.kind);
    if let Some(target) = &result.target_text {
        let _ = writeln!(out, "Target:     {target}");
    }
    if let Some(task) = &result.task_id {
        let _ = writeln!(out, "Task:       {task}");
    }
    let _ = writeln!(out, "Level:      {}", result.level);
    let _ = writeln!(out, "Overall:    {}/100", result.overall_score);
    let _ = writeln!(out);
    let _ = writeln!(out, "SCORES");
    for (name, value) in [
        ("Accuracy", s.accuracy),
        ("Fluency", s.fluency),
        ("Prosody", s.prosody),
        ("Completeness", s.completeness),
        ("Word accuracy", s.word_accuracy),
    ] {
        let _ = writeln!(out, "  {name:<14}{value:>3}  {}", bar(value));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "TRANSCRIPTION");
    let _ = writeln!(out, "  {}", result.transcription);

    let feedback = &result.feedback;
    if !feedback.strengths.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "STRENGTHS");
        for item in &feedback.strengths {
            let _ = writeln!(out, "  - {item}");
        }
    }
    if !feedback.mispronounced.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "MISPRONOUNCED WORDS");
        for word in &feedback.mispronounced {
            let _ = writeln!(out, "  - {}", word.word);
            if let Some(heard) = &word.heard {
                let _ = writeln!(out, "      heard:    {heard}");
            }
            if let Some(phonemes) = &word.phonemes {
                let _ = writeln!(out, "      expected: {phonemes}");
            }
            if !word.note.is_empty() {
                let _ = writeln!(out, "      note:     {}", word.note);
            }
        }
    }
    if !feedback.action_plan.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "ACTION PLAN");
        for (i, step) in feedback.action_plan.iter().enumerate() {
            let _ = writeln!(out, "  {}. {step}", i + 1);
        }
    }

    Attachment {
        filename: format!("orator-report-{}.txt", result.id),
        mime_type: "text/plain".to_string(),
        data: out.into_bytes(),
    }
}

/// Ten-cell bar for a 0-100 score.
fn bar(value: u8) -> String {
    let filled = usize::from(value.min(100)).div_ceil(10);
    format!("{}{}", "#".repeat(filled), ".".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orator_core::UserId;
    use orator_core::types::{AssessmentKind, Feedback, SubScores};

    #[test]
    fn bar_rounds_up() {
        assert_eq!(bar(0), "..........");
        assert_eq!(bar(41), "#####.....");
        assert_eq!(bar(100), "##########");
    }

    #[test]
    fn report_contains_every_score() {
        let result = AssessmentResult {
            id: "abc".into(),
            user_id: UserId::from("1"),
            kind: AssessmentKind::Task,
            target_text: Some("good morning".into()),
            task_id: Some("t-1".into()),
            backend_id: "openai:gpt-4o-audio-preview".into(),
            overall_score: 88,
            scores: SubScores {
                accuracy: 90,
                fluency: 85,
                prosody: 80,
                completeness: 100,
                word_accuracy: 87,
            },
            transcription: "good morning".into(),
            level: "C1".into(),
            feedback: Feedback::default(),
            created_at: "2026-03-01T10:00:00.000Z".into(),
        };
        let attachment = render_report(&result);
        assert_eq!(attachment.filename, "orator-report-abc.txt");
        let text = String::from_utf8(attachment.data).unwrap();
        assert!(text.contains("Task:       t-1"));
        assert!(text.contains("Completeness  100"));
        assert!(text.contains("Overall:    88/100"));
        assert!(!text.contains("ACTION PLAN"));
    }
}
