//! Per-user streak aggregate for efficient streak queries.
//!
//! One row per user, created lazily on first activity and mutated only
//! through the engine. The counters are derived state: the authoritative
//! definition is a full recomputation over activity history, and the
//! mutators here are the incremental steps that must agree with it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted streak counters for one user.
///
/// This is the global scope; per-goal and per-task streaks share the same
/// shape and algorithm, keyed by (user, scope) instead of user alone.
///
/// Invariant: `best_streak >= current_streak` after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Owning user (identity managed elsewhere)
    pub user_id: u64,
    /// Consecutive qualifying days ending at the last accounted day
    #[serde(default)]
    pub current_streak: u32,
    /// Longest streak ever observed; never decreases outside an explicit
    /// historical reset
    #[serde(default)]
    pub best_streak: u32,
    /// Last calendar day this state has accounted for; `None` until the
    /// first day is closed
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
}

impl StreakState {
    /// Zero-valued state for a user with no accounted history.
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            current_streak: 0,
            best_streak: 0,
            last_updated: None,
        }
    }

    /// Count `date` as a qualifying day extending the streak.
    pub fn extend(&mut self, date: NaiveDate) {
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
        self.last_updated = Some(date);
    }

    /// Close `date` as unqualified: the running streak resets, the best
    /// streak stands.
    pub fn interrupt(&mut self, date: NaiveDate) {
        self.current_streak = 0;
        self.last_updated = Some(date);
    }
}

/// Snapshot returned to callers of `get_user_streak`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub best_streak: u32,
    pub shields_available: u32,
    pub shields_used_this_week: u32,
    pub journal_entries_this_month: u32,
}
