// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event orchestrator: one inbound event in, one response out.
//!
//! Every event registers (or refreshes) the user, runs through the
//! conversation state machine, and the resulting action is executed here.
//! Assessments go audio validation -> quota check -> inference pool ->
//! persist result -> commit usage -> clear state -> format.

use std::sync::Arc;

use tracing::{debug, info, warn};

use orator_config::model::OratorConfig;
use orator_conversation::commands::{announcement_buttons, main_menu_buttons, voice_buttons};
use orator_conversation::{Action, Command, ConversationMachine, EventContext};
use orator_core::types::{
    AssessmentKind, AssessmentRequest, AssessmentResult, AudioPayload, Button, ConversationState,
    EventPayload, InboundEvent, OutboundResponse, Task, TaskStatus, User, word_count,
};
use orator_core::{Notifier, OratorError, StorageAdapter, UserFacing, UserId};
use orator_inference::InferencePool;
use orator_quota::QuotaLedger;

use crate::format::{format_result, history_line, result_buttons};
use crate::messages;
use crate::report::render_report;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Settings the orchestrator reads on every event.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub admin_ids: Vec<String>,
    pub max_audio_secs: u32,
    pub bot_username: Option<String>,
    pub history_limit: u32,
}

impl From<&OratorConfig> for AgentSettings {
    fn from(config: &OratorConfig) -> Self {
        Self {
            admin_ids: config.agent.admin_ids.clone(),
            max_audio_secs: config.quota.max_audio_secs,
            bot_username: config.telegram.bot_username.clone(),
            history_limit: 10,
        }
    }
}

/// Turns inbound events into responses.
pub struct Orchestrator {
    storage: Arc<dyn StorageAdapter>,
    ledger: Arc<QuotaLedger>,
    machine: ConversationMachine,
    pool: Arc<InferencePool>,
    notifier: Arc<dyn Notifier>,
    settings: AgentSettings,
}

impl Orchestrator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        ledger: Arc<QuotaLedger>,
        pool: Arc<InferencePool>,
        notifier: Arc<dyn Notifier>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            machine: ConversationMachine::new(storage.clone()),
            storage,
            ledger,
            pool,
            notifier,
            settings,
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    /// Handles one event. Errors are mapped to exactly one user-facing message;
    /// raw provider text never reaches the user.
    pub async fn handle(&self, event: &InboundEvent) -> OutboundResponse {
        match self.process(event).await {
            Ok(response) => response,
            Err(e) => {
                let kind = e.user_facing();
                match kind {
                    UserFacing::LimitExceeded => {
                        info!(user_id = %event.user_id, "daily limit reached")
                    }
                    _ => warn!(user_id = %event.user_id, error = %e, "event failed"),
                }
                OutboundResponse::text(messages::user_facing(kind))
            }
        }
    }

    async fn process(&self, event: &InboundEvent) -> Result<OutboundResponse, OratorError> {
        let referrer = start_referrer(&event.payload);
        let registration = self
            .ledger
            .register(
                &event.user_id,
                &event.chat_id,
                event.username.as_deref(),
                referrer.as_ref(),
            )
            .await?;
        if let Some(referrer) = &registration.credited_referrer {
            self.notify_referrer(referrer).await;
        }
        let user = registration.user;

        let ctx = EventContext {
            word_limit: user.word_limit,
            is_admin: self.is_admin(&user.id),
        };
        let resolution = self
            .machine
            .resolve(&event.user_id, &ctx, &event.payload)
            .await?;
        debug!(
            user_id = %event.user_id,
            action = ?resolution.action,
            "event resolved"
        );

        match resolution.action {
            Action::Command(command) => self.command(command, &user, registration.created).await,
            Action::TargetAccepted { target_text, .. } => {
                Ok(OutboundResponse::text(messages::record_prompt(&target_text)))
            }
            Action::TargetTooLong { words, limit } => Ok(OutboundResponse::text(
                messages::target_too_long(words, limit),
            )),
            Action::Assess {
                kind,
                target_text,
                task_id,
            } => {
                let EventPayload::Audio(audio) = &event.payload else {
                    return Err(OratorError::Internal(
                        "assessment resolved without audio".into(),
                    ));
                };
                self.assess(&user, audio, kind, target_text, task_id).await
            }
            Action::DraftUpdated { parts } => Ok(OutboundResponse::with_buttons(
                messages::draft_updated(parts),
                announcement_buttons(),
            )),
            Action::DraftEmpty => Ok(OutboundResponse::with_buttons(
                messages::ANNOUNCE_EMPTY,
                announcement_buttons(),
            )),
            Action::SendAnnouncement { parts } => self.broadcast(&user, parts).await,
            Action::AnnouncementCancelled => {
                Ok(OutboundResponse::text(messages::ANNOUNCE_CANCELLED))
            }
            Action::Ignore => Ok(OutboundResponse::Silent),
        }
    }

    fn is_admin(&self, user_id: &UserId) -> bool {
        self.settings
            .admin_ids
            .iter()
            .any(|id| id == user_id.as_str())
    }

    // --- Assessment ---

    async fn assess(
        &self,
        user: &User,
        audio: &AudioPayload,
        kind: AssessmentKind,
        target_text: Option<String>,
        task_id: Option<String>,
    ) -> Result<OutboundResponse, OratorError> {
        // Rejected before the quota check: no unit is consumed.
        if audio.data.is_empty() {
            return Ok(OutboundResponse::text(messages::EMPTY_AUDIO));
        }
        if audio.duration_secs > self.settings.max_audio_secs {
            return Ok(OutboundResponse::text(messages::audio_too_long(
                audio.duration_secs,
                self.settings.max_audio_secs,
            )));
        }

        if !self.ledger.check_and_reserve(&user.id).await {
            return Err(OratorError::LimitExceeded {
                user_id: user.id.to_string(),
            });
        }

        let request = AssessmentRequest {
            user_id: user.id.clone(),
            audio: audio.clone(),
            kind,
            target_text,
            task_id,
        };
        let result = self.pool.assess(&request).await?;
        self.storage.insert_result(&result).await?;

        if let Err(e) = self.ledger.commit_usage(&user.id).await {
            warn!(user_id = %user.id, error = %e, "usage commit failed after persisted result");
        }
        if let Err(e) = self.machine.finish(&user.id).await {
            warn!(user_id = %user.id, error = %e, "failed to clear conversation state");
        }
        if let Some(task_id) = &result.task_id {
            self.submit_task(task_id, &result).await;
        }

        info!(
            user_id = %user.id,
            result_id = %result.id,
            kind = %result.kind,
            score = result.overall_score,
            "assessment delivered"
        );
        Ok(OutboundResponse::with_buttons(
            format_result(&result),
            result_buttons(&result.id),
        ))
    }

    /// Links a task result and tells the requester. Failures are logged: the
    /// assessment itself already succeeded.
    async fn submit_task(&self, task_id: &str, result: &AssessmentResult) {
        if let Err(e) = self
            .storage
            .update_task_status(task_id, TaskStatus::Submitted, Some(&result.id))
            .await
        {
            warn!(task_id, error = %e, "failed to mark task submitted");
            return;
        }
        let task = match self.storage.get_task(task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => return,
            Err(e) => {
                warn!(task_id, error = %e, "failed to reload task");
                return;
            }
        };
        let text = messages::task_submitted(
            task.assignee_id.as_str(),
            &task.target_text,
            result.overall_score,
        );
        let buttons = vec![vec![
            Button::new("📄 Report", format!("report:{}", result.id)),
            Button::new("✅ Mark reviewed", format!("grade:{}", task.id)),
        ]];
        self.notify_user(&task.requester_id, OutboundResponse::with_buttons(text, buttons))
            .await;
    }

    // --- Commands ---

    async fn command(
        &self,
        command: Command,
        user: &User,
        created: bool,
    ) -> Result<OutboundResponse, OratorError> {
        let policy = self.ledger.policy();
        let response = match command {
            Command::Start { .. } => OutboundResponse::with_buttons(
                messages::welcome(user.username.as_deref(), created),
                main_menu_buttons(),
            ),
            Command::Menu => OutboundResponse::with_buttons(messages::MENU, main_menu_buttons()),
            Command::Help => OutboundResponse::text(messages::HELP),
            Command::Profile => OutboundResponse::text(messages::profile(user, policy)),
            Command::Test => {
                OutboundResponse::text(messages::target_prompt(AssessmentKind::Test, user.word_limit))
            }
            Command::Compare => OutboundResponse::text(messages::target_prompt(
                AssessmentKind::Compare,
                user.word_limit,
            )),
            Command::Assess => OutboundResponse::text(messages::SEND_AUDIO),
            Command::Referral => OutboundResponse::text(messages::referral(
                user,
                self.settings.bot_username.as_deref(),
                policy,
            )),
            Command::Voice => {
                OutboundResponse::with_buttons(messages::voice(&user.voice), voice_buttons())
            }
            Command::SetVoice(voice) => {
                let updated = self.ledger.set_voice(&user.id, &voice).await?;
                OutboundResponse::text(messages::voice_set(&updated.voice))
            }
            Command::History => self.history(user).await?,
            Command::Report(id) => self.report(user, &id).await?,
            Command::Tasks => self.tasks(user).await?,
            Command::OpenTask(id) => self.open_task(user, &id).await?,
            Command::Assign { assignee, text } => self.assign(user, assignee, text).await?,
            Command::Grade(id) => self.grade(user, &id).await?,
            Command::Announce => {
                if self.is_admin(&user.id) {
                    OutboundResponse::with_buttons(messages::ANNOUNCE_START, announcement_buttons())
                } else {
                    OutboundResponse::text(messages::ADMIN_ONLY)
                }
            }
            Command::Premium => OutboundResponse::text(messages::premium(user, policy)),
            Command::Usage(usage) => OutboundResponse::text(messages::usage(usage)),
            Command::Unknown(name) => OutboundResponse::text(messages::unknown_command(&name)),
        };
        Ok(response)
    }

    async fn history(&self, user: &User) -> Result<OutboundResponse, OratorError> {
        let results = self
            .storage
            .list_results(&user.id, self.settings.history_limit)
            .await?;
        if results.is_empty() {
            return Ok(OutboundResponse::text(messages::NO_HISTORY));
        }
        let lines: Vec<String> = results.iter().map(history_line).collect();
        Ok(OutboundResponse::text(format!(
            "Your recent assessments:\n\n{}",
            lines.join("\n")
        )))
    }

    async fn report(&self, user: &User, id: &str) -> Result<OutboundResponse, OratorError> {
        let result = self.storage.get_result(id).await?;
        match result {
            Some(result) if result.user_id == user.id || self.is_admin(&user.id) => {
                Ok(OutboundResponse::TextWithAttachment {
                    text: format!("Full report for result {id}."),
                    attachment: render_report(&result),
                })
            }
            _ => Ok(OutboundResponse::text(format!("No result with id {id}."))),
        }
    }

    async fn tasks(&self, user: &User) -> Result<OutboundResponse, OratorError> {
        let tasks = self.storage.list_tasks_for(&user.id).await?;
        if tasks.is_empty() {
            return Ok(OutboundResponse::text(messages::NO_TASKS));
        }
        let mut lines = Vec::with_capacity(tasks.len());
        let mut buttons = Vec::new();
        for task in &tasks {
            lines.push(messages::task_line(task, user.id.as_str()));
            if task.assignee_id == user.id && task.status == TaskStatus::Pending {
                buttons.push(vec![Button::new(
                    format!("🎙 Record «{}»", task.target_text),
                    format!("task:{}", task.id),
                )]);
            } else if task.requester_id == user.id && task.status == TaskStatus::Submitted {
                buttons.push(vec![Button::new(
                    format!("✅ Review «{}»", task.target_text),
                    format!("grade:{}", task.id),
                )]);
            }
        }
        Ok(OutboundResponse::with_buttons(
            format!("Your tasks:\n\n{}", lines.join("\n")),
            buttons,
        ))
    }

    async fn open_task(&self, user: &User, id: &str) -> Result<OutboundResponse, OratorError> {
        let task = match self.storage.get_task(id).await? {
            Some(task) if task.assignee_id == user.id => task,
            _ => return Ok(OutboundResponse::text(format!("No task with id {id}."))),
        };
        if task.status != TaskStatus::Pending {
            return Ok(OutboundResponse::text("That task has already been submitted."));
        }
        self.machine
            .enter(
                &user.id,
                &ConversationState::AwaitingTaskAudio {
                    task_id: task.id.clone(),
                    target_text: task.target_text.clone(),
                },
            )
            .await?;
        Ok(OutboundResponse::text(messages::record_prompt(&task.target_text)))
    }

    async fn assign(
        &self,
        user: &User,
        assignee: UserId,
        text: String,
    ) -> Result<OutboundResponse, OratorError> {
        if assignee == user.id {
            return Ok(OutboundResponse::text("You can't assign a task to yourself."));
        }
        let words = word_count(&text);
        if words > user.word_limit as usize {
            return Ok(OutboundResponse::text(messages::target_too_long(
                words,
                user.word_limit,
            )));
        }
        let Some(target_user) = self.storage.get_user(&assignee).await? else {
            return Ok(OutboundResponse::text(format!(
                "User {assignee} hasn't started the bot yet."
            )));
        };

        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            requester_id: user.id.clone(),
            assignee_id: assignee.clone(),
            target_text: text,
            status: TaskStatus::Pending,
            result_id: None,
            created_at: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        self.storage.create_task(&task).await?;
        info!(task_id = %task.id, requester = %user.id, assignee = %assignee, "task assigned");

        let requester_name = user.username.as_deref().unwrap_or(user.id.as_str());
        let notice = OutboundResponse::with_buttons(
            messages::task_received(requester_name, &task.target_text),
            vec![vec![Button::new("🎙 Record now", format!("task:{}", task.id))]],
        );
        if let Err(e) = self
            .notifier
            .notify(&target_user.id, &target_user.chat_id, notice)
            .await
        {
            warn!(task_id = %task.id, error = %e, "failed to notify assignee");
        }

        let assignee_name = target_user
            .username
            .as_deref()
            .unwrap_or(target_user.id.as_str());
        Ok(OutboundResponse::text(messages::task_assigned(assignee_name)))
    }

    async fn grade(&self, user: &User, id: &str) -> Result<OutboundResponse, OratorError> {
        let task = match self.storage.get_task(id).await? {
            Some(task) if task.requester_id == user.id => task,
            _ => return Ok(OutboundResponse::text(format!("No task with id {id}."))),
        };
        match task.status {
            TaskStatus::Pending => {
                return Ok(OutboundResponse::text("That task has no recording yet."));
            }
            TaskStatus::Graded => {
                return Ok(OutboundResponse::text("That task is already reviewed."));
            }
            TaskStatus::Submitted => {}
        }
        self.storage
            .update_task_status(&task.id, TaskStatus::Graded, task.result_id.as_deref())
            .await?;
        self.notify_user(
            &task.assignee_id,
            OutboundResponse::text(messages::task_graded(&task.target_text)),
        )
        .await;
        Ok(OutboundResponse::text(format!(
            "Marked «{}» as reviewed.",
            task.target_text
        )))
    }

    // --- Notifications ---

    async fn broadcast(
        &self,
        user: &User,
        parts: Vec<String>,
    ) -> Result<OutboundResponse, OratorError> {
        if !self.is_admin(&user.id) {
            return Ok(OutboundResponse::text(messages::ADMIN_ONLY));
        }
        let text = parts.join("\n\n");
        let recipients = self.storage.list_user_ids().await?;
        let total = recipients.len();
        let mut delivered = 0;
        for (user_id, chat_id) in &recipients {
            match self
                .notifier
                .notify(user_id, chat_id, OutboundResponse::text(text.clone()))
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => warn!(user_id = %user_id, error = %e, "announcement not delivered"),
            }
        }
        info!(delivered, total, "announcement sent");
        Ok(OutboundResponse::text(messages::announcement_sent(delivered, total)))
    }

    async fn notify_referrer(&self, referrer: &UserId) {
        match self.storage.get_user(referrer).await {
            Ok(Some(user)) => {
                let text = messages::referral_joined(user.referral_count);
                if let Err(e) = self
                    .notifier
                    .notify(&user.id, &user.chat_id, OutboundResponse::text(text))
                    .await
                {
                    warn!(referrer = %referrer, error = %e, "failed to notify referrer");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(referrer = %referrer, error = %e, "failed to load referrer"),
        }
    }

    async fn notify_user(&self, user_id: &UserId, response: OutboundResponse) {
        let chat_id = match self.storage.get_user(user_id).await {
            Ok(Some(user)) => user.chat_id,
            Ok(None) => return,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "failed to load user for notification");
                return;
            }
        };
        if let Err(e) = self.notifier.notify(user_id, &chat_id, response).await {
            warn!(user_id = %user_id, error = %e, "notification failed");
        }
    }
}

/// Referrer carried by `/start ref_<id>`, if the event is one.
fn start_referrer(payload: &EventPayload) -> Option<UserId> {
    let EventPayload::Text(text) = payload else {
        return None;
    };
    match orator_conversation::parse_text(text) {
        Some(Command::Start { referrer }) => referrer,
        _ => None,
    }
}
