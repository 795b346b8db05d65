// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared daily-activity lookup.
//!
//! Both the engine and the history read-model build their view of a day
//! through this one helper, so a day can never count differently in the
//! two places.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::DailyActivity;
use crate::store::ActivitySource;

/// Assemble the activity snapshot for one (user, date) from the three
/// read queries. No side effects.
pub(crate) async fn fetch_daily_activity(
    source: &dyn ActivitySource,
    user_id: u64,
    date: NaiveDate,
) -> Result<DailyActivity> {
    let completed_task = source.has_completed_task_on(user_id, date).await?;
    let logged_progress = source.has_progress_on(user_id, date).await?;
    let journal = source.journal_entry(user_id, date).await?;

    Ok(DailyActivity {
        date,
        completed_task,
        logged_progress,
        journal,
    })
}
