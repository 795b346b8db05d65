// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Daily activity snapshot and classification.
//!
//! A calendar day qualifies for the streak either through real activity
//! (a completed task or a progress entry) or through a shield consumed
//! for a journal-only day. The classification is pure and re-derivable
//! from the activity sources at any time, so the engine's update paths
//! and the history read-model can never disagree about a day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read snapshot of the external journal row for one (user, date).
///
/// `shield_used` is flipped to true exactly once, by the end-of-day close
/// when it decides to protect the day; this snapshot never mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalEntry {
    pub shield_used: bool,
}

/// How one calendar day counts toward the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayClassification {
    /// No qualifying activity; closing this day resets the streak.
    Unqualified,
    /// A task was completed or progress was logged.
    RealActivity,
    /// Journal-only day already protected by a consumed shield.
    ShieldProtected,
}

impl DayClassification {
    /// Whether a day with this classification extends the streak.
    pub fn qualifies(&self) -> bool {
        !matches!(self, DayClassification::Unqualified)
    }
}

/// Per-date activity snapshot assembled from the three activity queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub completed_task: bool,
    pub logged_progress: bool,
    pub journal: Option<JournalEntry>,
}

impl DailyActivity {
    /// True if a task was completed or progress was logged on this date.
    pub fn has_real_activity(&self) -> bool {
        self.completed_task || self.logged_progress
    }

    /// Journal entry exists but the day has no real activity.
    pub fn journal_only(&self) -> bool {
        self.journal.is_some() && !self.has_real_activity()
    }

    /// Journal-only day whose shield flag is not yet set: eligible for
    /// protection, pending the end-of-day close's decision.
    pub fn awaiting_shield(&self) -> bool {
        self.journal_only() && !self.journal.is_some_and(|j| j.shield_used)
    }

    /// Classify this day. Real activity wins over any journal state; an
    /// already-flagged journal makes the day shield-protected; everything
    /// else (including a not-yet-flagged journal) is unqualified.
    pub fn classification(&self) -> DayClassification {
        if self.has_real_activity() {
            DayClassification::RealActivity
        } else if self.journal.is_some_and(|j| j.shield_used) {
            DayClassification::ShieldProtected
        } else {
            DayClassification::Unqualified
        }
    }
}
