// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

mod classify;
pub mod engine;
pub mod history;

pub(crate) use classify::fetch_daily_activity;
pub use engine::{BatchOutcome, StreakEngine};
pub use history::{ActivityHistory, ActivityHistoryView, DayBreakdown, HistorySummary};
