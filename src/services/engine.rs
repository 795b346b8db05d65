// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak & consistency engine.
//!
//! Handles the core workflow:
//! 1. Classify a calendar day from the activity sources
//! 2. Close out a day (extend the streak, spend a shield, or reset)
//! 3. Apply live increments when activity is recorded during the day
//! 4. Rebuild counters from history whenever the cheap path is unsafe
//! 5. Award earn-back shields for consistent journaling
//!
//! The full recomputation is the authoritative definition of the
//! counters; the end-of-day close and the live increment are cached
//! optimizations that must agree with it.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use tokio::sync::Mutex;

use crate::config::StreakConfig;
use crate::error::Result;
use crate::models::{DayClassification, StreakState, StreakSummary};
use crate::services::fetch_daily_activity;
use crate::store::{ActivitySource, ShieldLedger, StreakStore};
use crate::time_utils::{days_inclusive, month_bounds, rolling_week};

/// Concurrency limit for the end-of-day sweep across users.
const MAX_CONCURRENT_USERS: usize = 50;

/// The trailing window of journal days that earns a bonus shield.
const EARN_BACK_WINDOW_DAYS: usize = 7;

/// Per-user mutex map to serialize read-modify-write cycles.
pub type UserLocks = Arc<DashMap<u64, Arc<Mutex<()>>>>;

/// Decides, per user per day, whether activity counts toward the running
/// streak, spends and awards shields, and keeps `StreakState` consistent
/// across its update paths.
#[derive(Clone)]
pub struct StreakEngine {
    activity: Arc<dyn ActivitySource>,
    shields: Arc<dyn ShieldLedger>,
    streaks: Arc<dyn StreakStore>,
    config: StreakConfig,
    /// Per-user mutex to serialize state updates; distinct users proceed
    /// in parallel.
    user_locks: UserLocks,
}

impl StreakEngine {
    pub fn new(
        activity: Arc<dyn ActivitySource>,
        shields: Arc<dyn ShieldLedger>,
        streaks: Arc<dyn StreakStore>,
        config: StreakConfig,
    ) -> Self {
        Self {
            activity,
            shields,
            streaks,
            config,
            user_locks: Arc::new(DashMap::new()),
        }
    }

    /// Acquireable handle for the user's critical section.
    fn user_lock(&self, user_id: u64) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Load the user's streak row, lazily treating a missing row as the
    /// zero state.
    async fn load_or_default(&self, user_id: u64) -> Result<StreakState> {
        Ok(self
            .streaks
            .get(user_id)
            .await?
            .unwrap_or_else(|| StreakState::new(user_id)))
    }

    // ─── End-of-Day Closing ──────────────────────────────────────

    /// Decide the fate of exactly one calendar day.
    ///
    /// Normally invoked by the nightly batch with "yesterday". Idempotent:
    /// a day the state has already accounted for is skipped, so the batch
    /// may be re-run from any point after a partial failure.
    pub async fn process_end_of_day(&self, user_id: u64, date: NaiveDate) -> Result<StreakState> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut state = self.load_or_default(user_id).await?;

        if state.last_updated.is_some_and(|last| last >= date) {
            tracing::debug!(user_id, date = %date, "Day already accounted (idempotent skip)");
            return Ok(state);
        }
        if let Some(last) = state.last_updated {
            let gap = (date - last).num_days();
            if gap > 1 {
                tracing::warn!(
                    user_id,
                    date = %date,
                    last_accounted = %last,
                    unclosed_days = gap - 1,
                    "Closing a day with unclosed days before it"
                );
            }
        }

        let day = fetch_daily_activity(self.activity.as_ref(), user_id, date).await?;
        match day.classification() {
            DayClassification::RealActivity | DayClassification::ShieldProtected => {
                state.extend(date);
            }
            DayClassification::Unqualified if day.awaiting_shield() => {
                if self.shields.try_consume(user_id, date).await? {
                    // Flag the journal before persisting the counters: if the
                    // state write fails, a retry sees a shield-protected day
                    // and extends without consuming a second shield.
                    self.activity.set_journal_shield_used(user_id, date).await?;
                    state.extend(date);
                    tracing::info!(user_id, date = %date, "Journal-only day protected by shield");
                } else {
                    state.interrupt(date);
                    tracing::debug!(
                        user_id,
                        date = %date,
                        "Shield unavailable (balance or weekly cap), streak reset"
                    );
                }
            }
            DayClassification::Unqualified => {
                state.interrupt(date);
            }
        }

        self.streaks.put(&state).await?;
        tracing::debug!(
            user_id,
            date = %date,
            current = state.current_streak,
            best = state.best_streak,
            "Day closed"
        );
        Ok(state)
    }

    /// Close one day for every listed user, with bounded concurrency.
    ///
    /// Per-user failures are logged and reported without aborting the
    /// sweep; each user's close is independently idempotent, so re-running
    /// the sweep for the failed users is safe.
    pub async fn process_end_of_day_batch(
        &self,
        user_ids: &[u64],
        date: NaiveDate,
    ) -> BatchOutcome {
        let results: Vec<std::result::Result<u64, u64>> = stream::iter(user_ids.to_vec())
            .map(|user_id| async move {
                match self.process_end_of_day(user_id, date).await {
                    Ok(_) => Ok(user_id),
                    Err(e) => {
                        tracing::error!(user_id, date = %date, error = %e, "End-of-day close failed");
                        Err(user_id)
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_USERS)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for result in results {
            match result {
                Ok(_) => outcome.processed += 1,
                Err(user_id) => outcome.failed.push(user_id),
            }
        }

        tracing::info!(
            date = %date,
            processed = outcome.processed,
            failed = outcome.failed.len(),
            "End-of-day sweep complete"
        );
        outcome
    }

    // ─── Live Increment ──────────────────────────────────────────

    /// Give immediate streak feedback after a qualifying action "today",
    /// without waiting for the nightly close.
    ///
    /// Safe to invoke any number of times per day. The increment is only
    /// taken when the state provably accounted for exactly yesterday;
    /// otherwise the full recomputation is the authority.
    pub async fn on_activity_recorded(&self, user_id: u64, today: NaiveDate) -> Result<StreakState> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut state = self.load_or_default(user_id).await?;
        match state.last_updated {
            Some(last) if last == today => {
                tracing::debug!(user_id, date = %today, "Today already counted (no-op)");
                Ok(state)
            }
            Some(last) if today.pred_opt() == Some(last) => {
                state.extend(today);
                self.streaks.put(&state).await?;
                tracing::debug!(
                    user_id,
                    date = %today,
                    current = state.current_streak,
                    "Streak extended incrementally"
                );
                Ok(state)
            }
            _ => {
                // Unaccounted days exist between the last touch and today
                // (or the state is new); the shortcut cannot prove
                // correctness, so rebuild from history.
                tracing::info!(user_id, date = %today, "Incremental update unsafe, recomputing");
                self.recalculate_locked(user_id, today).await
            }
        }
    }

    // ─── Full Recomputation ──────────────────────────────────────

    /// Rebuild `current_streak` and `best_streak` from activity history.
    ///
    /// Used for correction, backfill and as the live path's fallback. The
    /// walk reads prior shield decisions but never consumes new shields.
    pub async fn recalculate_streak(&self, user_id: u64, today: NaiveDate) -> Result<StreakState> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;
        self.recalculate_locked(user_id, today).await
    }

    /// Recomputation body; caller must hold the user's lock.
    async fn recalculate_locked(&self, user_id: u64, today: NaiveDate) -> Result<StreakState> {
        let mut state = self.load_or_default(user_id).await?;

        let today_day = fetch_daily_activity(self.activity.as_ref(), user_id, today).await?;
        let today_qualifies = today_day.classification().qualifies();
        let today_closed = state.last_updated.is_some_and(|last| last >= today);

        // An unqualified today that is still open stays unaccounted (the
        // rebuild ends at yesterday, leaving the day closable); once the
        // close has decided it, the run ending today is what counts.
        let scan_end = if today_qualifies || today_closed {
            Some(today)
        } else {
            today.pred_opt()
        };

        let mut run: u32 = 0;
        let mut longest: u32 = 0;
        if let Some(end) = scan_end {
            let horizon = today
                .checked_sub_signed(Duration::days(self.config.recompute_horizon_days - 1))
                .unwrap_or(NaiveDate::MIN);
            for date in days_inclusive(horizon, end) {
                let qualifies = if date == today {
                    today_qualifies
                } else {
                    fetch_daily_activity(self.activity.as_ref(), user_id, date)
                        .await?
                        .classification()
                        .qualifies()
                };
                if qualifies {
                    run += 1;
                    longest = longest.max(run);
                } else {
                    run = 0;
                }
            }
        }

        // The final run ends exactly at the last accounted day, so it is
        // the current streak (zero when that day did not qualify). A
        // best streak achieved under since-corrected data is never
        // silently shrunk.
        state.current_streak = run;
        state.best_streak = state.best_streak.max(longest);
        if let Some(end) = scan_end {
            state.last_updated = Some(end);
        }

        self.streaks.put(&state).await?;
        tracing::info!(
            user_id,
            date = %today,
            current = state.current_streak,
            best = state.best_streak,
            "Streak recomputed from history"
        );
        Ok(state)
    }

    // ─── Shield Earn-Back ────────────────────────────────────────

    /// Award one bonus shield after a complete trailing week of
    /// journaling, unless the balance already sits at the cap.
    ///
    /// Returns whether a shield was granted. Independent of the weekly
    /// consumption cap; awarding and spending are tracked separately.
    pub async fn check_and_award_journal_shield(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<bool> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        // Balance check first so a capped user costs no journal query.
        if self.shields.balance(user_id).await? >= self.config.max_shield_balance {
            return Ok(false);
        }

        let (start, end) = rolling_week(date);
        let journal_dates = self
            .activity
            .journal_dates_in_range(user_id, start, end)
            .await?;
        // The query is bounded to the 7-day window, so a full count means
        // every date is present.
        if journal_dates.len() < EARN_BACK_WINDOW_DAYS {
            return Ok(false);
        }

        self.shields.grant(user_id, 1).await?;
        tracing::info!(user_id, date = %date, "Journal consistency shield awarded");
        Ok(true)
    }

    // ─── Snapshot ────────────────────────────────────────────────

    /// Best-effort snapshot of the user's streak standing.
    ///
    /// Returns the stored counters plus live shield and journal numbers;
    /// it does not close open days. A missing row reads as the zero state.
    pub async fn get_user_streak(&self, user_id: u64, today: NaiveDate) -> Result<StreakSummary> {
        let state = self.load_or_default(user_id).await?;
        let shields_available = self.shields.balance(user_id).await?;

        let (week_start, week_end) = rolling_week(today);
        let shields_used_this_week = self
            .shields
            .consumed_in_week(user_id, week_start, week_end)
            .await?;

        let (month_start, month_end) = month_bounds(today);
        let journal_entries_this_month = self
            .activity
            .journal_dates_in_range(user_id, month_start, month_end)
            .await?
            .len() as u32;

        Ok(StreakSummary {
            current_streak: state.current_streak,
            best_streak: state.best_streak,
            shields_available,
            shields_used_this_week,
            journal_entries_this_month,
        })
    }
}

/// Result of an end-of-day sweep.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Users whose day was closed (or already accounted)
    pub processed: usize,
    /// Users whose close failed and should be re-run
    pub failed: Vec<u64>,
}
