// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure classification for inference calls.
//!
//! The HTTP status decides when one is present; otherwise the error text is
//! matched against known provider phrasings.

use orator_core::OratorError;

/// Prefix of provider errors raised when the request got no HTTP answer
/// (refused or reset connection, client-side timeout, broken body).
pub const TRANSPORT_FAILURE: &str = "transport failure";

/// Maps a reqwest error from sending a request or reading its body.
pub fn transport_error(context: &str, e: reqwest::Error) -> OratorError {
    let message = if e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() {
        format!("{TRANSPORT_FAILURE}: {context}: {e}")
    } else {
        format!("{context}: {e}")
    };
    OratorError::Provider {
        message,
        status: None,
        source: Some(Box::new(e)),
    }
}

/// How the pool reacts to a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient: retry the same candidate with backoff.
    SameBackend,
    /// Candidate cannot serve this request: exclude it and move on.
    SwitchBackend,
    /// Request or credentials are wrong: stop immediately.
    Fatal,
}

/// Classifies an error returned by a provider call.
pub fn classify(error: &OratorError) -> FailureClass {
    match error {
        OratorError::Timeout { .. } => FailureClass::SameBackend,
        OratorError::MalformedResponse { .. } => FailureClass::SwitchBackend,
        OratorError::Provider {
            status: Some(status),
            message,
            ..
        } => classify_status(*status).unwrap_or_else(|| classify_message(message)),
        // No status: the request never got an HTTP answer.
        OratorError::Provider {
            status: None,
            message,
            ..
        } => {
            let lower = message.to_lowercase();
            if message.starts_with(TRANSPORT_FAILURE) || is_connection_failure(&lower) {
                FailureClass::SameBackend
            } else {
                classify_message(message)
            }
        }
        _ => FailureClass::SwitchBackend,
    }
}

fn classify_status(status: u16) -> Option<FailureClass> {
    match status {
        500 | 502 | 503 | 504 | 529 => Some(FailureClass::SameBackend),
        404 | 415 | 429 => Some(FailureClass::SwitchBackend),
        400 | 401 | 403 => Some(FailureClass::Fatal),
        _ => None,
    }
}

fn is_connection_failure(lower: &str) -> bool {
    ["connect", "connection", "timed out", "timeout", "reset", "broken pipe"]
        .iter()
        .any(|needle| lower.contains(needle))
}

fn classify_message(message: &str) -> FailureClass {
    let lower = message.to_lowercase();
    if lower.contains("invalid key")
        || lower.contains("invalid api key")
        || lower.contains("api key not valid")
        || lower.contains("incorrect api key")
    {
        FailureClass::Fatal
    } else if lower.contains("overloaded") || lower.contains("timeout") {
        FailureClass::SameBackend
    } else {
        // "quota", "not found", "unavailable", unsupported media and anything
        // unrecognized all move on to the next candidate.
        FailureClass::SwitchBackend
    }
}
