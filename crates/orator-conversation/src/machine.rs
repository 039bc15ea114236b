// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation state machine.
//!
//! States form a flat set. Each state declares the payload kinds it accepts;
//! anything else aborts the state and is dispatched as if no state were
//! active. Global commands (slash commands, menu labels, `menu:*` buttons)
//! always abort first.

use std::sync::Arc;

use tracing::debug;

use orator_core::types::{AssessmentKind, ConversationState, EventPayload, PayloadKind, word_count};
use orator_core::{OratorError, StorageAdapter, UserId};

use crate::commands::{
    ANNOUNCE_CANCEL, ANNOUNCE_SEND, Command, is_global_button, is_global_text, parse_button,
    parse_text,
};

/// Per-user facts the machine needs beyond the stored state.
#[derive(Debug, Clone, Copy)]
pub struct EventContext {
    pub word_limit: u32,
    pub is_admin: bool,
}

/// What the orchestrator should do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Command(Command),
    /// The target phrase was taken; prompt for the recording.
    TargetAccepted {
        kind: AssessmentKind,
        target_text: String,
    },
    TargetTooLong { words: usize, limit: u32 },
    Assess {
        kind: AssessmentKind,
        target_text: Option<String>,
        task_id: Option<String>,
    },
    DraftUpdated { parts: usize },
    /// Send was pressed on an empty draft.
    DraftEmpty,
    SendAnnouncement { parts: Vec<String> },
    AnnouncementCancelled,
    Ignore,
}

/// How the stored state changes after the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextState {
    Keep,
    Set(ConversationState),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: Action,
    pub next_state: NextState,
    /// Name of the state this event aborted, if any.
    pub aborted: Option<&'static str>,
}

impl Resolution {
    fn new(action: Action, next_state: NextState) -> Self {
        Self {
            action,
            next_state,
            aborted: None,
        }
    }

    fn keep(action: Action) -> Self {
        Self::new(action, NextState::Keep)
    }
}

/// Payload kinds each state accepts.
fn accepts(state: &ConversationState) -> &'static [PayloadKind] {
    match state {
        ConversationState::AwaitingTargetText { .. } => &[PayloadKind::Text],
        ConversationState::AwaitingAudio { .. } | ConversationState::AwaitingTaskAudio { .. } => {
            &[PayloadKind::Audio]
        }
        ConversationState::ComposingAnnouncement { .. } => &[PayloadKind::Text, PayloadKind::Button],
    }
}

fn is_global(payload: &EventPayload) -> bool {
    match payload {
        EventPayload::Text(text) => is_global_text(text),
        EventPayload::Button(id) => is_global_button(id),
        EventPayload::Audio(_) => false,
    }
}

/// Pure transition function.
pub fn transition(
    state: Option<&ConversationState>,
    ctx: &EventContext,
    payload: &EventPayload,
) -> Resolution {
    let Some(state) = state else {
        return dispatch_idle(ctx, payload);
    };

    if is_global(payload) || !accepts(state).contains(&payload.kind()) {
        return abort(state, ctx, payload);
    }

    match in_state(state, ctx, payload) {
        Some(resolution) => resolution,
        None => abort(state, ctx, payload),
    }
}

fn abort(state: &ConversationState, ctx: &EventContext, payload: &EventPayload) -> Resolution {
    let mut resolution = dispatch_idle(ctx, payload);
    if resolution.next_state == NextState::Keep {
        resolution.next_state = NextState::Clear;
    }
    resolution.aborted = Some(state.name());
    resolution
}

/// Handles a payload the state accepts. `None` means the state has no use for
/// this particular payload after all (an unknown button id).
fn in_state(
    state: &ConversationState,
    ctx: &EventContext,
    payload: &EventPayload,
) -> Option<Resolution> {
    match (state, payload) {
        (ConversationState::AwaitingTargetText { kind }, EventPayload::Text(text)) => {
            let target = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let words = word_count(&target);
            if words == 0 {
                return Some(Resolution::keep(Action::Ignore));
            }
            if words > ctx.word_limit as usize {
                return Some(Resolution::keep(Action::TargetTooLong {
                    words,
                    limit: ctx.word_limit,
                }));
            }
            Some(Resolution::new(
                Action::TargetAccepted {
                    kind: *kind,
                    target_text: target.clone(),
                },
                NextState::Set(ConversationState::AwaitingAudio {
                    kind: *kind,
                    target_text: Some(target),
                }),
            ))
        }
        (ConversationState::AwaitingAudio { kind, target_text }, EventPayload::Audio(_)) => {
            Some(Resolution::keep(Action::Assess {
                kind: *kind,
                target_text: target_text.clone(),
                task_id: None,
            }))
        }
        (
            ConversationState::AwaitingTaskAudio {
                task_id,
                target_text,
            },
            EventPayload::Audio(_),
        ) => Some(Resolution::keep(Action::Assess {
            kind: AssessmentKind::Task,
            target_text: Some(target_text.clone()),
            task_id: Some(task_id.clone()),
        })),
        (ConversationState::ComposingAnnouncement { parts }, EventPayload::Text(text)) => {
            let mut parts = parts.clone();
            parts.push(text.trim().to_string());
            Some(Resolution::new(
                Action::DraftUpdated { parts: parts.len() },
                NextState::Set(ConversationState::ComposingAnnouncement { parts }),
            ))
        }
        (ConversationState::ComposingAnnouncement { parts }, EventPayload::Button(id)) => {
            match id.as_str() {
                ANNOUNCE_SEND if parts.is_empty() => Some(Resolution::keep(Action::DraftEmpty)),
                ANNOUNCE_SEND => Some(Resolution::new(
                    Action::SendAnnouncement {
                        parts: parts.clone(),
                    },
                    NextState::Clear,
                )),
                ANNOUNCE_CANCEL => Some(Resolution::new(
                    Action::AnnouncementCancelled,
                    NextState::Clear,
                )),
                _ => None,
            }
        }
        _ => None,
    }
}

fn dispatch_idle(ctx: &EventContext, payload: &EventPayload) -> Resolution {
    match payload {
        EventPayload::Text(text) => match parse_text(text) {
            Some(command) => command_resolution(command, ctx),
            None => Resolution::keep(Action::Ignore),
        },
        EventPayload::Button(id) => match parse_button(id) {
            Some(command) => command_resolution(command, ctx),
            None => Resolution::keep(Action::Ignore),
        },
        EventPayload::Audio(_) => Resolution::keep(Action::Assess {
            kind: AssessmentKind::General,
            target_text: None,
            task_id: None,
        }),
    }
}

/// Commands that open a flow set the state here. Task flows need a storage
/// lookup first and are entered by the orchestrator.
fn command_resolution(command: Command, ctx: &EventContext) -> Resolution {
    let next_state = match &command {
        Command::Test => NextState::Set(ConversationState::AwaitingTargetText {
            kind: AssessmentKind::Test,
        }),
        Command::Compare => NextState::Set(ConversationState::AwaitingTargetText {
            kind: AssessmentKind::Compare,
        }),
        Command::Assess => NextState::Set(ConversationState::AwaitingAudio {
            kind: AssessmentKind::General,
            target_text: None,
        }),
        Command::Announce if ctx.is_admin => {
            NextState::Set(ConversationState::ComposingAnnouncement { parts: Vec::new() })
        }
        _ => NextState::Keep,
    };
    Resolution::new(Action::Command(command), next_state)
}

/// Storage-backed front end of [`transition`]: loads the user's state, applies
/// the transition and writes the new state back.
pub struct ConversationMachine {
    storage: Arc<dyn StorageAdapter>,
}

impl ConversationMachine {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    pub async fn resolve(
        &self,
        user_id: &UserId,
        ctx: &EventContext,
        payload: &EventPayload,
    ) -> Result<Resolution, OratorError> {
        let current = self.storage.get_state(user_id).await?;
        let resolution = transition(current.as_ref(), ctx, payload);

        if let Some(aborted) = resolution.aborted {
            debug!(user_id = %user_id, state = aborted, "conversation state aborted");
        }
        match &resolution.next_state {
            NextState::Keep => {}
            NextState::Set(state) => {
                debug!(user_id = %user_id, state = state.name(), "conversation state set");
                self.storage.set_state(user_id, state).await?;
            }
            NextState::Clear => {
                if current.is_some() {
                    self.storage.clear_state(user_id).await?;
                }
            }
        }
        Ok(resolution)
    }

    /// Enters a state opened outside the transition table (task recording).
    pub async fn enter(&self, user_id: &UserId, state: &ConversationState) -> Result<(), OratorError> {
        debug!(user_id = %user_id, state = state.name(), "conversation state entered");
        self.storage.set_state(user_id, state).await
    }

    /// Ends the active flow after its terminal action has completed.
    pub async fn finish(&self, user_id: &UserId) -> Result<(), OratorError> {
        self.storage.clear_state(user_id).await
    }

    pub async fn current(&self, user_id: &UserId) -> Result<Option<ConversationState>, OratorError> {
        self.storage.get_state(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orator_core::types::AudioPayload;

    const CTX: EventContext = EventContext {
        word_limit: 5,
        is_admin: false,
    };
    const ADMIN: EventContext = EventContext {
        word_limit: 5,
        is_admin: true,
    };

    fn text(s: &str) -> EventPayload {
        EventPayload::Text(s.into())
    }

    fn audio() -> EventPayload {
        EventPayload::Audio(AudioPayload {
            data: vec![1, 2, 3],
            duration_secs: 3,
            media_type: "audio/ogg".into(),
        })
    }

    fn awaiting_audio(target: Option<&str>) -> ConversationState {
        ConversationState::AwaitingAudio {
            kind: AssessmentKind::Test,
            target_text: target.map(str::to_string),
        }
    }

    #[test]
    fn transition_table() {
        struct Case {
            name: &'static str,
            state: Option<ConversationState>,
            ctx: EventContext,
            payload: EventPayload,
            action: Action,
            next: NextState,
        }

        let cases = vec![
            Case {
                name: "idle audio is a general assessment",
                state: None,
                ctx: CTX,
                payload: audio(),
                action: Action::Assess {
                    kind: AssessmentKind::General,
                    target_text: None,
                    task_id: None,
                },
                next: NextState::Keep,
            },
            Case {
                name: "idle chatter is ignored",
                state: None,
                ctx: CTX,
                payload: text("hi"),
                action: Action::Ignore,
                next: NextState::Keep,
            },
            Case {
                name: "test opens target entry",
                state: None,
                ctx: CTX,
                payload: text("/test"),
                action: Action::Command(Command::Test),
                next: NextState::Set(ConversationState::AwaitingTargetText {
                    kind: AssessmentKind::Test,
                }),
            },
            Case {
                name: "target text accepted",
                state: Some(ConversationState::AwaitingTargetText {
                    kind: AssessmentKind::Compare,
                }),
                ctx: CTX,
                payload: text("  the  cat sat "),
                action: Action::TargetAccepted {
                    kind: AssessmentKind::Compare,
                    target_text: "the cat sat".into(),
                },
                next: NextState::Set(ConversationState::AwaitingAudio {
                    kind: AssessmentKind::Compare,
                    target_text: Some("the cat sat".into()),
                }),
            },
            Case {
                name: "target over word limit keeps state",
                state: Some(ConversationState::AwaitingTargetText {
                    kind: AssessmentKind::Test,
                }),
                ctx: CTX,
                payload: text("one two three four five six"),
                action: Action::TargetTooLong { words: 6, limit: 5 },
                next: NextState::Keep,
            },
            Case {
                name: "audio while awaiting audio assesses and keeps state",
                state: Some(awaiting_audio(Some("cat"))),
                ctx: CTX,
                payload: audio(),
                action: Action::Assess {
                    kind: AssessmentKind::Test,
                    target_text: Some("cat".into()),
                    task_id: None,
                },
                next: NextState::Keep,
            },
            Case {
                name: "task audio carries the task id",
                state: Some(ConversationState::AwaitingTaskAudio {
                    task_id: "t1".into(),
                    target_text: "good morning".into(),
                }),
                ctx: CTX,
                payload: audio(),
                action: Action::Assess {
                    kind: AssessmentKind::Task,
                    target_text: Some("good morning".into()),
                    task_id: Some("t1".into()),
                },
                next: NextState::Keep,
            },
            Case {
                name: "menu text aborts awaiting audio",
                state: Some(awaiting_audio(None)),
                ctx: CTX,
                payload: text("/menu"),
                action: Action::Command(Command::Menu),
                next: NextState::Clear,
            },
            Case {
                name: "menu label aborts target entry and opens a new flow",
                state: Some(ConversationState::AwaitingTargetText {
                    kind: AssessmentKind::Test,
                }),
                ctx: CTX,
                payload: text("🔁 Compare"),
                action: Action::Command(Command::Compare),
                next: NextState::Set(ConversationState::AwaitingTargetText {
                    kind: AssessmentKind::Compare,
                }),
            },
            Case {
                name: "plain text in awaiting audio is a state abort",
                state: Some(awaiting_audio(Some("cat"))),
                ctx: CTX,
                payload: text("what now?"),
                action: Action::Ignore,
                next: NextState::Clear,
            },
            Case {
                name: "audio during target entry aborts and assesses generally",
                state: Some(ConversationState::AwaitingTargetText {
                    kind: AssessmentKind::Test,
                }),
                ctx: CTX,
                payload: audio(),
                action: Action::Assess {
                    kind: AssessmentKind::General,
                    target_text: None,
                    task_id: None,
                },
                next: NextState::Clear,
            },
            Case {
                name: "voice button in awaiting audio aborts then applies",
                state: Some(awaiting_audio(None)),
                ctx: CTX,
                payload: EventPayload::Button("voice:male".into()),
                action: Action::Command(Command::SetVoice("male".into())),
                next: NextState::Clear,
            },
            Case {
                name: "announce is admin only",
                state: None,
                ctx: CTX,
                payload: text("/announce"),
                action: Action::Command(Command::Announce),
                next: NextState::Keep,
            },
            Case {
                name: "admin announce opens a draft",
                state: None,
                ctx: ADMIN,
                payload: text("/announce"),
                action: Action::Command(Command::Announce),
                next: NextState::Set(ConversationState::ComposingAnnouncement { parts: vec![] }),
            },
            Case {
                name: "draft collects parts",
                state: Some(ConversationState::ComposingAnnouncement {
                    parts: vec!["Hello".into()],
                }),
                ctx: ADMIN,
                payload: text("New tasks are live"),
                action: Action::DraftUpdated { parts: 2 },
                next: NextState::Set(ConversationState::ComposingAnnouncement {
                    parts: vec!["Hello".into(), "New tasks are live".into()],
                }),
            },
            Case {
                name: "send delivers the draft",
                state: Some(ConversationState::ComposingAnnouncement {
                    parts: vec!["Hello".into()],
                }),
                ctx: ADMIN,
                payload: EventPayload::Button(ANNOUNCE_SEND.into()),
                action: Action::SendAnnouncement {
                    parts: vec!["Hello".into()],
                },
                next: NextState::Clear,
            },
            Case {
                name: "send on empty draft keeps composing",
                state: Some(ConversationState::ComposingAnnouncement { parts: vec![] }),
                ctx: ADMIN,
                payload: EventPayload::Button(ANNOUNCE_SEND.into()),
                action: Action::DraftEmpty,
                next: NextState::Keep,
            },
            Case {
                name: "cancel discards the draft",
                state: Some(ConversationState::ComposingAnnouncement {
                    parts: vec!["x".into()],
                }),
                ctx: ADMIN,
                payload: EventPayload::Button(ANNOUNCE_CANCEL.into()),
                action: Action::AnnouncementCancelled,
                next: NextState::Clear,
            },
            Case {
                name: "audio while composing aborts",
                state: Some(ConversationState::ComposingAnnouncement { parts: vec![] }),
                ctx: ADMIN,
                payload: audio(),
                action: Action::Assess {
                    kind: AssessmentKind::General,
                    target_text: None,
                    task_id: None,
                },
                next: NextState::Clear,
            },
        ];

        for case in cases {
            let resolution = transition(case.state.as_ref(), &case.ctx, &case.payload);
            assert_eq!(resolution.action, case.action, "{}", case.name);
            assert_eq!(resolution.next_state, case.next, "{}", case.name);
            if case.state.is_none() {
                assert_eq!(resolution.aborted, None, "{}", case.name);
            }
        }
    }

    #[test]
    fn unknown_button_while_composing_aborts() {
        let state = ConversationState::ComposingAnnouncement {
            parts: vec!["a".into()],
        };
        let resolution = transition(
            Some(&state),
            &ADMIN,
            &EventPayload::Button("task:t1".into()),
        );
        assert_eq!(resolution.action, Action::Command(Command::OpenTask("t1".into())));
        assert_eq!(resolution.next_state, NextState::Clear);
        assert_eq!(resolution.aborted, Some("composing_announcement"));
    }
}
