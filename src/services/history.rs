// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity history read-model.
//!
//! Serves calendars and heatmaps: per-day breakdowns over a date range
//! plus aggregate counts. Uses the same classification rule as the
//! engine, so a day shown as active here is exactly a day the engine
//! would count. No mutation; safe to call concurrently.

use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::{stream, StreamExt, TryStreamExt};
use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::models::{DailyActivity, DayClassification};
use crate::services::fetch_daily_activity;
use crate::store::ActivitySource;
use crate::time_utils::days_inclusive;

/// Longest range a single history query may span.
const MAX_RANGE_DAYS: i64 = 366;

/// Concurrent per-day fetches within one range query.
const FETCH_CONCURRENCY: usize = 16;

/// One day of a user's history, as shown on a calendar.
#[derive(Debug, Clone, Serialize)]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub completed_task: bool,
    pub logged_progress: bool,
    pub journaled: bool,
    pub shield_used: bool,
    pub classification: DayClassification,
}

impl From<DailyActivity> for DayBreakdown {
    fn from(day: DailyActivity) -> Self {
        Self {
            date: day.date,
            completed_task: day.completed_task,
            logged_progress: day.logged_progress,
            journaled: day.journal.is_some(),
            shield_used: day.journal.is_some_and(|j| j.shield_used),
            classification: day.classification(),
        }
    }
}

/// Aggregate counts over a history range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    /// Days that qualify for the streak (real or shield-protected)
    pub active_days: u32,
    pub task_completions: u32,
    pub progress_entries: u32,
    pub journal_entries: u32,
    pub shielded_days: u32,
}

/// Per-day breakdown plus summary for one range query.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityHistory {
    pub days: Vec<DayBreakdown>,
    pub summary: HistorySummary,
}

/// Read-only view over the activity sources.
#[derive(Clone)]
pub struct ActivityHistoryView {
    activity: Arc<dyn ActivitySource>,
}

impl ActivityHistoryView {
    pub fn new(activity: Arc<dyn ActivitySource>) -> Self {
        Self { activity }
    }

    /// Per-day breakdown and aggregate counts for `[start, end]`.
    ///
    /// Rejects reversed ranges and ranges longer than a year rather than
    /// silently truncating.
    pub async fn get_activity_history(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ActivityHistory> {
        if start > end {
            return Err(EngineError::BadRequest(format!(
                "Range start {} is after end {}",
                start, end
            )));
        }
        let span = (end - start).num_days() + 1;
        if span > MAX_RANGE_DAYS {
            return Err(EngineError::BadRequest(format!(
                "Range of {} days exceeds the {}-day limit",
                span, MAX_RANGE_DAYS
            )));
        }

        let fetched: Vec<DailyActivity> = stream::iter(days_inclusive(start, end))
            .map(|date| fetch_daily_activity(self.activity.as_ref(), user_id, date))
            .buffered(FETCH_CONCURRENCY)
            .try_collect()
            .await?;

        let mut summary = HistorySummary::default();
        let days: Vec<DayBreakdown> = fetched.into_iter().map(DayBreakdown::from).collect();
        for day in &days {
            if day.classification.qualifies() {
                summary.active_days += 1;
            }
            if day.completed_task {
                summary.task_completions += 1;
            }
            if day.logged_progress {
                summary.progress_entries += 1;
            }
            if day.journaled {
                summary.journal_entries += 1;
            }
            if day.shield_used {
                summary.shielded_days += 1;
            }
        }

        tracing::debug!(
            user_id,
            start = %start,
            end = %end,
            days = days.len(),
            active = summary.active_days,
            "History range assembled"
        );

        Ok(ActivityHistory { days, summary })
    }

    /// Breakdown for a single day.
    pub async fn get_daily_activity(&self, user_id: u64, date: NaiveDate) -> Result<DayBreakdown> {
        let day = fetch_daily_activity(self.activity.as_ref(), user_id, date).await?;
        Ok(DayBreakdown::from(day))
    }
}
