// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quota and usage accounting for the Orator assessment bot.
//!
//! - [`ledger`]: per-user daily allowance, bonus, premium and referrals
//! - [`usage`]: append-only usage rows with estimated cost
//! - [`pricing`]: per-model token prices

pub mod ledger;
pub mod pricing;
pub mod usage;

pub use ledger::{QuotaLedger, QuotaPolicy, Registration};
pub use usage::{DailyUsage, UsageLedger, UsageTotals};
