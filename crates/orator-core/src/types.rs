// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the Orator crates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque platform identity of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// Unique identifier for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
}

// --- Users and quota ---

/// A bot user and their quota counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display handle, if the platform supplied one.
    pub username: Option<String>,
    /// Chat used to reach the user outside of a reply.
    pub chat_id: String,
    pub used_today: u32,
    pub daily_limit: u32,
    /// Referral-earned units, consumed only once `daily_limit` is used up.
    pub bonus_limit: u32,
    pub is_premium: bool,
    pub premium_until: Option<DateTime<Utc>>,
    /// Maximum whitespace-delimited words accepted as a target phrase.
    pub word_limit: u32,
    /// Preferred reference voice.
    pub voice: String,
    /// Calendar day (UTC) of the last quota evaluation.
    pub last_active: NaiveDate,
    pub referral_count: u32,
    pub referred_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A fresh free-tier user.
    pub fn new(
        id: UserId,
        chat_id: String,
        daily_limit: u32,
        word_limit: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: None,
            chat_id,
            used_today: 0,
            daily_limit,
            bonus_limit: 0,
            is_premium: false,
            premium_until: None,
            word_limit,
            voice: DEFAULT_VOICE.to_string(),
            last_active: now.date_naive(),
            referral_count: 0,
            referred_by: None,
            created_at: now,
        }
    }

    /// Units still available today, counting bonus.
    pub fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.used_today) + self.bonus_limit
    }
}

/// Voice used when none was chosen.
pub const DEFAULT_VOICE: &str = "female";

/// Voices a user may pick from.
pub const VOICES: &[&str] = &["female", "male"];

// --- Conversation ---

/// What the bot expects next from a user. At most one is active per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConversationState {
    /// Waiting for the phrase the user wants to practise.
    AwaitingTargetText { kind: AssessmentKind },
    /// Waiting for a recording, optionally against a fixed target.
    AwaitingAudio {
        kind: AssessmentKind,
        target_text: Option<String>,
    },
    /// Waiting for a recording that completes an assigned task.
    AwaitingTaskAudio { task_id: String, target_text: String },
    /// An admin is drafting an announcement.
    ComposingAnnouncement { parts: Vec<String> },
}

impl ConversationState {
    /// Short stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ConversationState::AwaitingTargetText { .. } => "awaiting_target_text",
            ConversationState::AwaitingAudio { .. } => "awaiting_audio",
            ConversationState::AwaitingTaskAudio { .. } => "awaiting_task_audio",
            ConversationState::ComposingAnnouncement { .. } => "composing_announcement",
        }
    }
}

// --- Assessments ---

/// What kind of assessment a recording is submitted for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AssessmentKind {
    /// Free speech, no target phrase.
    General,
    /// The user typed the phrase they then read aloud.
    Test,
    /// The user compares their reading with a reference rendition.
    Compare,
    /// A phrase assigned by another user.
    Task,
}

/// Raw recorded audio as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub data: Vec<u8>,
    /// Duration declared by the transport.
    pub duration_secs: u32,
    pub media_type: String,
}

/// A request for one assessment. Never persisted as-is.
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub user_id: UserId,
    pub audio: AudioPayload,
    pub kind: AssessmentKind,
    pub target_text: Option<String>,
    pub task_id: Option<String>,
}

/// Sub-scores on a 0-100 integer scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub accuracy: u8,
    pub fluency: u8,
    pub prosody: u8,
    pub completeness: u8,
    pub word_accuracy: u8,
}

/// A word the speaker got wrong, with phoneme-level notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MispronouncedWord {
    pub word: String,
    /// What the model heard instead, if it said.
    #[serde(default)]
    pub heard: Option<String>,
    /// Expected phonemes, e.g. IPA.
    #[serde(default)]
    pub phonemes: Option<String>,
    #[serde(default)]
    pub note: String,
}

/// Structured coaching feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub mispronounced: Vec<MispronouncedWord>,
    #[serde(default)]
    pub action_plan: Vec<String>,
}

/// A completed, scored assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub id: String,
    pub user_id: UserId,
    pub kind: AssessmentKind,
    pub target_text: Option<String>,
    pub task_id: Option<String>,
    /// Candidate that produced the result (`provider:model`).
    pub backend_id: String,
    pub overall_score: u8,
    pub scores: SubScores,
    pub transcription: String,
    /// CEFR-like level label (A1..C2).
    pub level: String,
    pub feedback: Feedback,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

/// Template family chosen by target length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextForm {
    /// One or two words.
    Short,
    /// Three words or more.
    Long,
}

/// Number of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Classifies a target phrase: up to 2 tokens is short-form, 3 or more is long-form.
pub fn classify_target(text: &str) -> TextForm {
    if word_count(text) <= 2 {
        TextForm::Short
    } else {
        TextForm::Long
    }
}

// --- Usage ---

/// Token counters reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// One row per completed inference call. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLogEntry {
    pub id: String,
    pub user_id: UserId,
    pub backend_id: String,
    pub purpose: AssessmentKind,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Estimated cost in USD.
    pub cost_usd: f64,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

// --- Tasks ---

/// Lifecycle of an assigned task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Submitted,
    Graded,
}

/// A phrase one user (the requester) asks another (the assignee) to record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub requester_id: UserId,
    pub assignee_id: UserId,
    pub target_text: String,
    pub status: TaskStatus,
    pub result_id: Option<String>,
    pub created_at: String,
}

// --- Provider exchange ---

/// A request to an inference provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Model identifier at the provider.
    pub model: String,
    /// Instruction text (rubric and output schema).
    pub instruction: String,
    pub audio: AudioPayload,
    pub max_tokens: u32,
}

/// Raw text answer from an inference provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub model: String,
    pub usage: TokenUsage,
}

// --- Transport ---

/// Payload shapes a transport can deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Text(String),
    Audio(AudioPayload),
    /// Opaque button id.
    Button(String),
}

impl EventPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            EventPayload::Text(_) => PayloadKind::Text,
            EventPayload::Audio(_) => PayloadKind::Audio,
            EventPayload::Button(_) => PayloadKind::Button,
        }
    }
}

/// Discriminant of [`EventPayload`], used by state acceptance tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Text,
    Audio,
    Button,
}

/// An event received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub id: String,
    pub user_id: UserId,
    pub chat_id: String,
    pub username: Option<String>,
    pub payload: EventPayload,
    /// ISO 8601 timestamp.
    pub timestamp: String,
}

/// An inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub id: String,
}

impl Button {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
        }
    }
}

/// A file sent alongside a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// What the bot answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundResponse {
    /// Text with optional rows of buttons.
    Text {
        text: String,
        buttons: Vec<Vec<Button>>,
    },
    TextWithAttachment {
        text: String,
        attachment: Attachment,
    },
    /// Nothing is sent.
    Silent,
}

impl OutboundResponse {
    pub fn text(text: impl Into<String>) -> Self {
        OutboundResponse::Text {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons(text: impl Into<String>, buttons: Vec<Vec<Button>>) -> Self {
        OutboundResponse::Text {
            text: text.into(),
            buttons,
        }
    }

    /// The text part, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            OutboundResponse::Text { text, .. }
            | OutboundResponse::TextWithAttachment { text, .. } => Some(text),
            OutboundResponse::Silent => None,
        }
    }
}

/// A response addressed to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub response: OutboundResponse,
}
