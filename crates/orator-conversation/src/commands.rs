// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command parsing for slash commands, main-menu labels and button ids.

use orator_core::UserId;
use orator_core::types::{Button, VOICES};

/// Button id that sends a composed announcement.
pub const ANNOUNCE_SEND: &str = "announce:send";
/// Button id that discards a composed announcement.
pub const ANNOUNCE_CANCEL: &str = "announce:cancel";

/// Main menu entries as `(label, button id)`.
///
/// Labels are also accepted as typed text.
pub const MAIN_MENU: &[(&str, &str)] = &[
    ("🎙 Assess", "menu:assess"),
    ("🎯 Test", "menu:test"),
    ("🔁 Compare", "menu:compare"),
    ("👤 Profile", "menu:profile"),
    ("📜 History", "menu:history"),
    ("📋 Tasks", "menu:tasks"),
    ("🎁 Referral", "menu:referral"),
    ("❓ Help", "menu:help"),
];

/// A user command, independent of how it was typed or tapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start { referrer: Option<UserId> },
    Menu,
    Help,
    Profile,
    Test,
    Compare,
    Assess,
    Referral,
    Voice,
    SetVoice(String),
    History,
    Report(String),
    Tasks,
    OpenTask(String),
    Assign { assignee: UserId, text: String },
    Grade(String),
    Announce,
    Premium,
    /// A known command whose arguments are missing or wrong.
    Usage(&'static str),
    Unknown(String),
}

/// Parses typed text. Returns `None` for anything that is not a command or a
/// main-menu label.
pub fn parse_text(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix('/') {
        return Some(parse_slash(rest));
    }
    MAIN_MENU
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(trimmed))
        .and_then(|(_, id)| parse_button(id))
}

/// Parses a button id. Returns `None` for ids owned by a conversation state
/// (announcement send/cancel) and for unknown ids.
pub fn parse_button(id: &str) -> Option<Command> {
    let (scope, value) = id.split_once(':')?;
    match scope {
        "menu" => match value {
            "main" => Some(Command::Menu),
            "assess" => Some(Command::Assess),
            "test" => Some(Command::Test),
            "compare" => Some(Command::Compare),
            "profile" => Some(Command::Profile),
            "history" => Some(Command::History),
            "tasks" => Some(Command::Tasks),
            "referral" => Some(Command::Referral),
            "help" => Some(Command::Help),
            "voice" => Some(Command::Voice),
            "premium" => Some(Command::Premium),
            _ => None,
        },
        "voice" => VOICES
            .contains(&value)
            .then(|| Command::SetVoice(value.to_string())),
        "task" if !value.is_empty() => Some(Command::OpenTask(value.to_string())),
        "grade" if !value.is_empty() => Some(Command::Grade(value.to_string())),
        "report" if !value.is_empty() => Some(Command::Report(value.to_string())),
        _ => None,
    }
}

/// Whether a payload is global: it aborts any active state before dispatch.
pub fn is_global_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('/') || MAIN_MENU.iter().any(|(label, _)| label.eq_ignore_ascii_case(trimmed))
}

pub fn is_global_button(id: &str) -> bool {
    id.starts_with("menu:")
}

fn parse_slash(rest: &str) -> Command {
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    // Group chats address commands as `/cmd@botname`.
    let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();

    match name.as_str() {
        "start" => Command::Start {
            referrer: args
                .strip_prefix("ref_")
                .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()))
                .map(UserId::from),
        },
        "menu" => Command::Menu,
        "help" => Command::Help,
        "profile" => Command::Profile,
        "test" => Command::Test,
        "compare" => Command::Compare,
        "assess" => Command::Assess,
        "referral" => Command::Referral,
        "voice" => match args {
            "" => Command::Voice,
            v if VOICES.contains(&v) => Command::SetVoice(v.to_string()),
            _ => Command::Usage("/voice female|male"),
        },
        "history" => Command::History,
        "report" => match args.split_whitespace().next() {
            Some(id) => Command::Report(id.to_string()),
            None => Command::Usage("/report <result id>"),
        },
        "tasks" => Command::Tasks,
        "assign" => match args.split_once(char::is_whitespace) {
            Some((user, text)) if !text.trim().is_empty() => Command::Assign {
                assignee: UserId::from(user.trim_start_matches('@')),
                text: text.trim().to_string(),
            },
            _ => Command::Usage("/assign <user id> <phrase>"),
        },
        "grade" => match args.split_whitespace().next() {
            Some(id) => Command::Grade(id.to_string()),
            None => Command::Usage("/grade <task id>"),
        },
        "announce" => Command::Announce,
        "premium" => Command::Premium,
        other => Command::Unknown(other.to_string()),
    }
}

/// The main menu as button rows, two per row.
pub fn main_menu_buttons() -> Vec<Vec<Button>> {
    MAIN_MENU
        .chunks(2)
        .map(|row| row.iter().map(|(label, id)| Button::new(*label, *id)).collect())
        .collect()
}

/// Voice picker buttons.
pub fn voice_buttons() -> Vec<Vec<Button>> {
    vec![
        VOICES
            .iter()
            .map(|v| Button::new(*v, format!("voice:{v}")))
            .collect(),
    ]
}

/// Buttons shown while an announcement is being drafted.
pub fn announcement_buttons() -> Vec<Vec<Button>> {
    vec![vec![
        Button::new("Send", ANNOUNCE_SEND),
        Button::new("Cancel", ANNOUNCE_CANCEL),
    ]]
}
