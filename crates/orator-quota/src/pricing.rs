// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing tables and cost calculation.
//!
//! Audio-input prices in USD per million tokens, checked against the
//! provider price pages on 2026-09-01:
//!
//! gemini-2.5-flash:       input=$1.00/MTok, output=$2.50/MTok
//! gemini-2.0-flash:       input=$0.70/MTok, output=$0.40/MTok
//! gpt-4o-audio-preview:   input=$40.00/MTok, output=$10.00/MTok
//! gpt-4o-mini-audio:      input=$10.00/MTok, output=$0.60/MTok

use orator_core::types::TokenUsage;

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

/// Look up pricing for a `provider:model` id or a bare model name.
///
/// Matches on substrings. Unknown models fall back to gemini-2.5-flash
/// pricing so a usage row is never dropped for lack of a price.
pub fn get_pricing(model: &str) -> ModelPricing {
    let lower = model.to_lowercase();

    if lower.contains("gpt-4o-mini") {
        ModelPricing {
            input_per_mtok: 10.0,
            output_per_mtok: 0.60,
        }
    } else if lower.contains("gpt-4o") {
        ModelPricing {
            input_per_mtok: 40.0,
            output_per_mtok: 10.0,
        }
    } else if lower.contains("gemini-2.0") {
        ModelPricing {
            input_per_mtok: 0.70,
            output_per_mtok: 0.40,
        }
    } else {
        ModelPricing {
            input_per_mtok: 1.0,
            output_per_mtok: 2.50,
        }
    }
}

/// Cost in USD: sum of (tokens / 1_000_000) * price_per_million per token type.
pub fn calculate_cost(usage: &TokenUsage, pricing: &ModelPricing) -> f64 {
    let input = (usage.input_tokens as f64 / 1_000_000.0) * pricing.input_per_mtok;
    let output = (usage.output_tokens as f64 / 1_000_000.0) * pricing.output_per_mtok;
    input + output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpt4o_mini_is_not_priced_as_gpt4o() {
        let mini = get_pricing("openai:gpt-4o-mini-audio-preview");
        let full = get_pricing("openai:gpt-4o-audio-preview");
        assert!((mini.input_per_mtok - 10.0).abs() < f64::EPSILON);
        assert!((full.input_per_mtok - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_model_falls_back() {
        assert_eq!(get_pricing("something-new"), get_pricing("gemini-2.5-flash"));
    }

    #[test]
    fn cost_of_one_million_each() {
        let usage = TokenUsage {
            input_tokens: 1_000_000,
            output_tokens: 1_000_000,
        };
        let cost = calculate_cost(&usage, &get_pricing("gemini:gemini-2.0-flash"));
        assert!((cost - 1.10).abs() < 1e-9);
    }

    #[test]
    fn zero_usage_is_free() {
        let cost = calculate_cost(&TokenUsage::default(), &get_pricing("gpt-4o"));
        assert_eq!(cost, 0.0);
    }
}
