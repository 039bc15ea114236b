// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference backends and the failover pool that turns a recording into an
//! [`AssessmentResult`](orator_core::types::AssessmentResult).
//!
//! Providers speak their own wire formats; the pool owns ordering, retries,
//! exclusion marks, response parsing and usage recording.

pub mod classify;
pub mod gemini;
pub mod openai;
pub mod pool;
pub mod prompt;
pub mod schema;

pub use classify::{FailureClass, classify};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use pool::{BackendCandidate, InferencePool, PoolSettings};
pub use prompt::build_instruction;
pub use schema::{ParsedAssessment, SchemaError, parse_assessment};
