// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Adapters extend the [`PluginAdapter`] base trait and use `#[async_trait]`
//! for dynamic dispatch. Collaborators that are not full adapters
//! ([`Notifier`], [`UsageRecorder`]) are plain async traits.

pub mod adapter;
pub mod channel;
pub mod provider;
pub mod storage;
pub mod usage;

pub use adapter::PluginAdapter;
pub use channel::{ChannelAdapter, Notifier};
pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
pub use usage::UsageRecorder;
