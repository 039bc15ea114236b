// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Orator integration tests.
//!
//! # Components
//!
//! - [`MockBackend`] - inference provider with scripted outcomes and call counting
//! - [`MockChannel`] - channel adapter with event injection and sent capture
//! - [`RecordingNotifier`] - notifier that records every push
//! - [`FaultyStorage`] - SQLite store with switchable write faults
//! - [`TestHarness`] - the full stack on a temporary SQLite database

pub mod harness;
pub mod mock_backend;
pub mod mock_channel;
pub mod mock_storage;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_backend::{MockBackend, MockOutcome, assessment_json};
pub use mock_channel::{MockChannel, RecordingNotifier};
pub use mock_storage::FaultyStorage;
