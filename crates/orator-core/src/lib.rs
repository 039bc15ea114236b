// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Orator pronunciation assessment bot.
//!
//! This crate provides the trait definitions, error types, and domain types
//! used throughout the Orator workspace. All adapters implement traits
//! defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{OratorError, UserFacing};
pub use types::{AdapterType, HealthStatus, MessageId, UserId};

// Re-export all adapter traits at crate root.
pub use traits::{
    ChannelAdapter, Notifier, PluginAdapter, ProviderAdapter, StorageAdapter, UsageRecorder,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    #[test]
    fn user_facing_mapping_covers_taxonomy() {
        let limit = OratorError::LimitExceeded {
            user_id: "u1".into(),
        };
        assert_eq!(limit.user_facing(), UserFacing::LimitExceeded);

        let exhausted = OratorError::ProviderExhausted {
            attempts: 5,
            last_error: "429".into(),
        };
        assert_eq!(exhausted.user_facing(), UserFacing::ProviderExhausted);

        let fatal = OratorError::provider_status(401, "bad key");
        assert_eq!(fatal.user_facing(), UserFacing::ProviderExhausted);

        let malformed = OratorError::MalformedResponse {
            backend: "gemini:x".into(),
            message: "no json".into(),
        };
        assert_eq!(malformed.user_facing(), UserFacing::MalformedResponse);

        let storage = OratorError::Storage {
            source: Box::new(std::io::Error::other("disk")),
        };
        assert_eq!(storage.user_facing(), UserFacing::TransportUnavailable);

        let timeout = OratorError::Timeout {
            duration: std::time::Duration::from_secs(15),
        };
        assert_eq!(timeout.user_facing(), UserFacing::TransportUnavailable);
    }

    #[test]
    fn target_classification_boundary() {
        assert_eq!(classify_target("cat"), TextForm::Short);
        assert_eq!(classify_target("  black   cat "), TextForm::Short);
        assert_eq!(classify_target("the cat sat"), TextForm::Long);
        assert_eq!(classify_target("the cat sat down"), TextForm::Long);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn conversation_state_serializes_with_tag() {
        let state = ConversationState::AwaitingAudio {
            kind: AssessmentKind::Test,
            target_text: Some("hello world".into()),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"state\":\"awaiting_audio\""), "got: {json}");
        assert!(json.contains("\"kind\":\"test\""), "got: {json}");
        let back: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn assessment_kind_display_and_parse() {
        use std::str::FromStr;
        assert_eq!(AssessmentKind::Compare.to_string(), "compare");
        assert_eq!(
            AssessmentKind::from_str("task").unwrap(),
            AssessmentKind::Task
        );
        assert_eq!(TaskStatus::Submitted.to_string(), "submitted");
    }

    #[test]
    fn new_user_starts_on_free_tier() {
        let now = chrono::Utc::now();
        let user = User::new(UserId::from("42"), "42".into(), 3, 5, now);
        assert_eq!(user.used_today, 0);
        assert_eq!(user.remaining(), 3);
        assert!(!user.is_premium);
        assert_eq!(user.voice, DEFAULT_VOICE);
        assert_eq!(user.last_active, now.date_naive());
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_notifier<T: Notifier>() {}
        fn _assert_usage_recorder<T: UsageRecorder>() {}
    }
}
