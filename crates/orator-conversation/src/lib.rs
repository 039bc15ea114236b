// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commands and the per-user conversation state machine.

pub mod commands;
pub mod machine;

pub use commands::{Command, main_menu_buttons, parse_button, parse_text};
pub use machine::{Action, ConversationMachine, EventContext, NextState, Resolution, transition};
