// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory implementation of the storage collaborators.
//!
//! Backs the integration tests, the concurrency tests and the benchmarks.
//! Each map entry is guarded by its shard lock, so the read-check-write in
//! `try_consume` is atomic per user, matching the contract a transactional
//! store would provide.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use crate::error::{EngineError, Result};
use crate::models::{JournalEntry, StreakState};
use crate::store::{ActivitySource, ShieldLedger, StreakStore};
use crate::time_utils::rolling_week;

#[derive(Debug, Default)]
struct ShieldAccount {
    balance: u32,
    /// Dates a shield was consumed for, for rolling-week cap counting.
    consumed: BTreeSet<NaiveDate>,
}

/// In-memory activity source, shield ledger and streak store.
#[derive(Debug)]
pub struct MemoryStore {
    weekly_cap: u32,
    tasks: DashMap<u64, BTreeSet<NaiveDate>>,
    progress: DashMap<u64, BTreeSet<NaiveDate>>,
    /// date -> shield_used flag; one journal entry per user per date.
    journals: DashMap<u64, BTreeMap<NaiveDate, bool>>,
    shields: DashMap<u64, ShieldAccount>,
    streaks: DashMap<u64, StreakState>,
}

impl MemoryStore {
    /// Store with the default weekly consumption cap of 1.
    pub fn new() -> Self {
        Self::with_weekly_cap(1)
    }

    pub fn with_weekly_cap(weekly_cap: u32) -> Self {
        Self {
            weekly_cap,
            tasks: DashMap::new(),
            progress: DashMap::new(),
            journals: DashMap::new(),
            shields: DashMap::new(),
            streaks: DashMap::new(),
        }
    }

    // ─── Seeding / Inspection ────────────────────────────────────

    /// Record a task completion for `date`.
    pub fn record_task(&self, user_id: u64, date: NaiveDate) {
        self.tasks.entry(user_id).or_default().insert(date);
    }

    /// Record a progress entry for `date`.
    pub fn record_progress(&self, user_id: u64, date: NaiveDate) {
        self.progress.entry(user_id).or_default().insert(date);
    }

    /// Record a journal entry for `date`. Saving twice for the same date
    /// keeps the existing entry (and its shield flag) untouched.
    pub fn record_journal(&self, user_id: u64, date: NaiveDate) {
        self.journals
            .entry(user_id)
            .or_default()
            .entry(date)
            .or_insert(false);
    }

    /// Remove a task completion, as an upstream historical correction
    /// would (deleting a counted task after the fact).
    pub fn remove_task(&self, user_id: u64, date: NaiveDate) {
        if let Some(mut dates) = self.tasks.get_mut(&user_id) {
            dates.remove(&date);
        }
    }

    /// Overwrite the user's shield balance, clearing consumption history.
    pub fn set_shield_balance(&self, user_id: u64, balance: u32) {
        self.shields.insert(
            user_id,
            ShieldAccount {
                balance,
                consumed: BTreeSet::new(),
            },
        );
    }

    /// The shield flag of the journal entry for `date`, if one exists.
    pub fn journal_shield_flag(&self, user_id: u64, date: NaiveDate) -> Option<bool> {
        self.journals
            .get(&user_id)
            .and_then(|m| m.get(&date).copied())
    }

    /// Drop the user's streak row, as if it had never been created.
    pub fn clear_streak(&self, user_id: u64) {
        self.streaks.remove(&user_id);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivitySource for MemoryStore {
    async fn has_completed_task_on(&self, user_id: u64, date: NaiveDate) -> Result<bool> {
        Ok(self
            .tasks
            .get(&user_id)
            .is_some_and(|dates| dates.contains(&date)))
    }

    async fn has_progress_on(&self, user_id: u64, date: NaiveDate) -> Result<bool> {
        Ok(self
            .progress
            .get(&user_id)
            .is_some_and(|dates| dates.contains(&date)))
    }

    async fn journal_entry(&self, user_id: u64, date: NaiveDate) -> Result<Option<JournalEntry>> {
        Ok(self.journals.get(&user_id).and_then(|m| {
            m.get(&date)
                .map(|&shield_used| JournalEntry { shield_used })
        }))
    }

    async fn journal_dates_in_range(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>> {
        Ok(self
            .journals
            .get(&user_id)
            .map(|m| m.range(start..=end).map(|(date, _)| *date).collect())
            .unwrap_or_default())
    }

    async fn set_journal_shield_used(&self, user_id: u64, date: NaiveDate) -> Result<()> {
        let mut entries = self.journals.entry(user_id).or_default();
        match entries.get_mut(&date) {
            Some(shield_used) => {
                *shield_used = true;
                Ok(())
            }
            None => Err(EngineError::Storage(format!(
                "No journal entry for user {} on {}",
                user_id, date
            ))),
        }
    }
}

#[async_trait]
impl ShieldLedger for MemoryStore {
    async fn balance(&self, user_id: u64) -> Result<u32> {
        Ok(self.shields.get(&user_id).map(|a| a.balance).unwrap_or(0))
    }

    async fn try_consume(&self, user_id: u64, date: NaiveDate) -> Result<bool> {
        // Single entry guard covers the cap check and the decrement.
        let mut account = self.shields.entry(user_id).or_default();
        let (week_start, week_end) = rolling_week(date);
        let used_this_week = account.consumed.range(week_start..=week_end).count() as u32;

        if account.balance == 0 || used_this_week >= self.weekly_cap {
            return Ok(false);
        }

        account.balance -= 1;
        account.consumed.insert(date);
        Ok(true)
    }

    async fn grant(&self, user_id: u64, count: u32) -> Result<()> {
        self.shields.entry(user_id).or_default().balance += count;
        Ok(())
    }

    async fn consumed_in_week(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u32> {
        Ok(self
            .shields
            .get(&user_id)
            .map(|a| a.consumed.range(start..=end).count() as u32)
            .unwrap_or(0))
    }
}

#[async_trait]
impl StreakStore for MemoryStore {
    async fn get(&self, user_id: u64) -> Result<Option<StreakState>> {
        Ok(self.streaks.get(&user_id).map(|s| s.clone()))
    }

    async fn put(&self, state: &StreakState) -> Result<()> {
        self.streaks.insert(state.user_id, state.clone());
        Ok(())
    }
}
