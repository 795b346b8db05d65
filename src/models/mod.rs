// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the streak engine.

pub mod activity;
pub mod streak;

pub use activity::{DailyActivity, DayClassification, JournalEntry};
pub use streak::{StreakState, StreakSummary};
