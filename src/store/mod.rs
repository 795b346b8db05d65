// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage collaborator contracts.
//!
//! Raw events (tasks, progress entries, journal rows) and the shield
//! balance are owned by neighboring components; the engine consumes them
//! through these traits and persists only its own `StreakState` rows.
//! `memory` provides an in-process implementation for tests and
//! benchmarks.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{JournalEntry, StreakState};

pub mod memory;

pub use memory::MemoryStore;

/// Read access to the three activity sources, plus the single journal
/// mutation the engine owns (flipping the shield flag).
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Did the user complete a task on `date`?
    async fn has_completed_task_on(&self, user_id: u64, date: NaiveDate) -> Result<bool>;

    /// Did the user log progress toward any goal on `date`?
    async fn has_progress_on(&self, user_id: u64, date: NaiveDate) -> Result<bool>;

    /// The user's journal entry for `date`, if one exists (at most one
    /// per user per date, enforced by the owning component).
    async fn journal_entry(&self, user_id: u64, date: NaiveDate) -> Result<Option<JournalEntry>>;

    /// All dates in `[start, end]` with a journal entry, sorted.
    async fn journal_dates_in_range(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>>;

    /// Mark the journal entry for `date` as shield-protected. Fails if no
    /// entry exists for that date.
    async fn set_journal_shield_used(&self, user_id: u64, date: NaiveDate) -> Result<()>;
}

/// Shield token balance, owned by the user profile.
#[async_trait]
pub trait ShieldLedger: Send + Sync {
    /// Current shield balance.
    async fn balance(&self, user_id: u64) -> Result<u32>;

    /// Consume one shield to protect `date`.
    ///
    /// Atomically checks the balance and the rolling-week consumption cap
    /// and decrements on success. `Ok(false)` (empty balance or cap
    /// reached) is a normal outcome, not an error.
    async fn try_consume(&self, user_id: u64, date: NaiveDate) -> Result<bool>;

    /// Add shields to the balance (purchase or earn-back).
    async fn grant(&self, user_id: u64, count: u32) -> Result<()>;

    /// Shields consumed for dates within `[start, end]`.
    async fn consumed_in_week(&self, user_id: u64, start: NaiveDate, end: NaiveDate)
        -> Result<u32>;
}

/// Persistence for the engine-owned streak aggregate.
#[async_trait]
pub trait StreakStore: Send + Sync {
    /// Load a user's streak row, if one exists.
    async fn get(&self, user_id: u64) -> Result<Option<StreakState>>;

    /// Create or replace a user's streak row.
    async fn put(&self, state: &StreakState) -> Result<()>;
}
