// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing message texts.

use orator_core::UserFacing;
use orator_core::types::{AssessmentKind, Task, TaskStatus, User};
use orator_quota::QuotaPolicy;

pub const HELP: &str = "\
I score your English pronunciation from voice messages.

/assess – record anything, get a general assessment
/test – type a phrase, then read it aloud
/compare – type a phrase and compare your reading with it
/profile – your plan and today's remaining attempts
/history – your recent results
/report <id> – download the full report of a result
/tasks – phrases assigned to you or by you
/assign <user id> <phrase> – ask someone to record a phrase
/referral – invite friends and earn bonus attempts
/voice – choose the reference voice
/premium – higher limits and longer phrases
/menu – main menu

A voice message sent outside a flow gets a general assessment.";

pub const MENU: &str = "What would you like to do?";
pub const SEND_AUDIO: &str = "Send me a voice message and I'll assess your pronunciation.";
pub const EMPTY_AUDIO: &str = "That recording is empty. Please record it again.";
pub const ADMIN_ONLY: &str = "This command is only available to administrators.";
pub const ANNOUNCE_START: &str =
    "Send the announcement text. You can send several messages; press Send when done.";
pub const ANNOUNCE_EMPTY: &str = "The announcement is empty. Send some text first.";
pub const ANNOUNCE_CANCELLED: &str = "Announcement discarded.";
pub const NO_HISTORY: &str = "No assessments yet. Send a voice message to get started.";
pub const NO_TASKS: &str = "No tasks yet. Use /assign <user id> <phrase> to create one.";

pub fn user_facing(kind: UserFacing) -> &'static str {
    match kind {
        UserFacing::LimitExceeded => {
            "You've used all of today's assessments. The limit resets tomorrow; \
             /referral earns bonus attempts and /premium raises the daily limit."
        }
        UserFacing::ProviderExhausted => {
            "The assessment service is busy right now. Please try again in a few minutes."
        }
        UserFacing::MalformedResponse => {
            "I couldn't read an assessment for that recording. Please record it again."
        }
        UserFacing::TransportUnavailable => {
            "Something went wrong on our side. Please try again shortly."
        }
    }
}

pub fn welcome(name: Option<&str>, created: bool) -> String {
    let greeting = match (name, created) {
        (Some(name), true) => format!("Welcome, {name}!"),
        (None, true) => "Welcome!".to_string(),
        (Some(name), false) => format!("Welcome back, {name}!"),
        (None, false) => "Welcome back!".to_string(),
    };
    format!("{greeting} Send a voice message or pick an option below.")
}

pub fn target_prompt(kind: AssessmentKind, word_limit: u32) -> String {
    match kind {
        AssessmentKind::Compare => format!(
            "Type the phrase you want to compare against (up to {word_limit} words)."
        ),
        _ => format!("Type the phrase you want to practise (up to {word_limit} words)."),
    }
}

pub fn record_prompt(target: &str) -> String {
    format!("Now record yourself reading:\n\n«{target}»")
}

pub fn target_too_long(words: usize, limit: u32) -> String {
    format!(
        "That phrase has {words} words; your plan allows up to {limit}. \
         Send a shorter phrase or see /premium."
    )
}

pub fn audio_too_long(duration: u32, max: u32) -> String {
    format!("That recording is {duration}s long; the maximum is {max}s. Please record a shorter one.")
}

pub fn profile(user: &User, policy: &QuotaPolicy) -> String {
    let plan = match (user.is_premium, user.premium_until) {
        (true, Some(until)) => format!("Premium until {}", until.format("%Y-%m-%d")),
        (true, None) => "Premium".to_string(),
        (false, _) => "Free".to_string(),
    };
    let name = user.username.as_deref().unwrap_or("—");
    format!(
        "👤 {name} (id {id})\n\
         Plan: {plan}\n\
         Today: {used}/{limit} used, {remaining} remaining\n\
         Bonus attempts: {bonus}\n\
         Phrase length: up to {words} words\n\
         Referrals: {referrals} (every {threshold} earn +{reward})\n\
         Voice: {voice}",
        id = user.id,
        used = user.used_today,
        limit = user.daily_limit,
        remaining = user.remaining(),
        bonus = user.bonus_limit,
        words = user.word_limit,
        referrals = user.referral_count,
        threshold = policy.referral_threshold,
        reward = policy.referral_reward,
        voice = user.voice,
    )
}

pub fn referral(user: &User, bot_username: Option<&str>, policy: &QuotaPolicy) -> String {
    let link = match bot_username {
        Some(bot) => format!("https://t.me/{bot}?start=ref_{}", user.id),
        None => format!("/start ref_{}", user.id),
    };
    let next = policy.referral_threshold - user.referral_count % policy.referral_threshold.max(1);
    format!(
        "Invite friends with your link:\n{link}\n\n\
         You've referred {count}. {next} more to earn +{reward} bonus attempts.",
        count = user.referral_count,
        reward = policy.referral_reward,
    )
}

pub fn referral_joined(total: u32) -> String {
    format!("🎉 A friend joined with your link. Referrals so far: {total}.")
}

pub fn premium(user: &User, policy: &QuotaPolicy) -> String {
    let status = if user.is_premium {
        match user.premium_until {
            Some(until) => format!("You're on Premium until {}.", until.format("%Y-%m-%d")),
            None => "You're on Premium.".to_string(),
        }
    } else {
        "You're on the Free plan.".to_string()
    };
    format!(
        "{status}\n\n\
         Free: {free_daily} assessments a day, phrases up to {free_words} words.\n\
         Premium: {premium_daily} assessments a day, phrases up to {premium_words} words.\n\n\
         Ask an administrator to upgrade your account.",
        free_daily = policy.free_daily_limit,
        free_words = policy.free_word_limit,
        premium_daily = policy.premium_daily_limit,
        premium_words = policy.premium_word_limit,
    )
}

pub fn voice(current: &str) -> String {
    format!("Reference voice: {current}. Pick one:")
}

pub fn voice_set(voice: &str) -> String {
    format!("Reference voice set to {voice}.")
}

pub fn usage(usage: &str) -> String {
    format!("Usage: {usage}")
}

pub fn unknown_command(name: &str) -> String {
    format!("Unknown command /{name}. See /help.")
}

pub fn draft_updated(parts: usize) -> String {
    format!("Added. The announcement has {parts} part(s). Send more text or press Send.")
}

pub fn announcement_sent(delivered: usize, total: usize) -> String {
    format!("Announcement delivered to {delivered} of {total} users.")
}

pub fn task_line(task: &Task, viewer: &str) -> String {
    let role = if task.assignee_id.as_str() == viewer {
        format!("from {}", task.requester_id)
    } else {
        format!("for {}", task.assignee_id)
    };
    format!("• «{}» {role}: {}", task.target_text, status_label(task.status))
}

fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Submitted => "submitted, waiting for review",
        TaskStatus::Graded => "reviewed",
    }
}

pub fn task_assigned(assignee: &str) -> String {
    format!("Task sent to {assignee}. You'll be notified when they submit a recording.")
}

pub fn task_received(requester: &str, target: &str) -> String {
    format!("📋 New task from {requester}: record «{target}».")
}

pub fn task_submitted(assignee: &str, target: &str, score: u8) -> String {
    format!("✅ {assignee} submitted «{target}» and scored {score}/100.")
}

pub fn task_graded(target: &str) -> String {
    format!("Your recording of «{target}» has been reviewed.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use orator_core::UserId;

    fn policy() -> QuotaPolicy {
        QuotaPolicy::from(&orator_config::model::QuotaConfig::default())
    }

    #[test]
    fn every_user_facing_kind_has_text() {
        for kind in [
            UserFacing::LimitExceeded,
            UserFacing::ProviderExhausted,
            UserFacing::MalformedResponse,
            UserFacing::TransportUnavailable,
        ] {
            assert!(!user_facing(kind).is_empty());
        }
    }

    #[test]
    fn referral_link_uses_bot_username() {
        let mut user = User::new(UserId::from("42"), "42".into(), 3, 30, chrono::Utc::now());
        user.referral_count = 4;
        let text = referral(&user, Some("OratorBot"), &policy());
        assert!(text.contains("https://t.me/OratorBot?start=ref_42"), "{text}");
        assert!(text.contains("2 more"), "{text}");

        let text = referral(&user, None, &policy());
        assert!(text.contains("/start ref_42"), "{text}");
    }

    #[test]
    fn profile_shows_remaining() {
        let mut user = User::new(UserId::from("7"), "7".into(), 3, 30, chrono::Utc::now());
        user.used_today = 1;
        user.bonus_limit = 2;
        let text = profile(&user, &policy());
        assert!(text.contains("1/3 used, 4 remaining"), "{text}");
        assert!(text.contains("Plan: Free"), "{text}");
    }
}
