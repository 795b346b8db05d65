// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Same-user races: concurrent live updates, duplicate day closes, and a
//! live update racing the nightly batch must never lose or double-apply
//! an increment. The per-user critical section makes every interleaving
//! land on the same state.

mod common;
use common::{d, test_engine};

const NUM_CONCURRENT_CALLS: usize = 20;

#[tokio::test]
async fn test_concurrent_live_updates_count_today_once() {
    let (engine, store) = test_engine();
    let user_id = 31;

    store.record_task(user_id, d("2024-06-09"));
    engine.process_end_of_day(user_id, d("2024-06-09")).await.unwrap();
    store.record_task(user_id, d("2024-06-10"));

    let mut handles = vec![];
    for _ in 0..NUM_CONCURRENT_CALLS {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.on_activity_recorded(user_id, d("2024-06-10")).await
        }));
    }
    for handle in handles {
        handle.await.expect("task join failed").expect("update failed");
    }

    let state = engine.recalculate_streak(user_id, d("2024-06-10")).await.unwrap();
    assert_eq!(state.current_streak, 2, "today must be counted exactly once");
    assert_eq!(state.best_streak, 2);
}

#[tokio::test]
async fn test_concurrent_day_closes_apply_once() {
    let (engine, store) = test_engine();
    let user_id = 32;
    store.record_task(user_id, d("2024-06-10"));

    let mut handles = vec![];
    for _ in 0..NUM_CONCURRENT_CALLS {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.process_end_of_day(user_id, d("2024-06-10")).await
        }));
    }
    for handle in handles {
        handle.await.expect("task join failed").expect("close failed");
    }

    let summary = engine.get_user_streak(user_id, d("2024-06-10")).await.unwrap();
    assert_eq!(summary.current_streak, 1);
}

#[tokio::test]
async fn test_concurrent_shield_closes_spend_one_shield() {
    // Duplicate closes of a journal-only day must not double-spend.
    let (engine, store) = test_engine();
    let user_id = 33;
    store.set_shield_balance(user_id, 2);
    store.record_journal(user_id, d("2024-06-10"));

    let mut handles = vec![];
    for _ in 0..NUM_CONCURRENT_CALLS {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.process_end_of_day(user_id, d("2024-06-10")).await
        }));
    }
    for handle in handles {
        handle.await.expect("task join failed").expect("close failed");
    }

    let summary = engine.get_user_streak(user_id, d("2024-06-10")).await.unwrap();
    assert_eq!(summary.current_streak, 1);
    assert_eq!(summary.shields_available, 1);
    assert_eq!(summary.shields_used_this_week, 1);
}

#[tokio::test]
async fn test_live_update_racing_nightly_close_converges() {
    // The batch closes yesterday while a live activity lands today. Both
    // orderings must end with a 3-day streak accounted through today.
    let (engine, store) = test_engine();
    let user_id = 34;

    store.record_task(user_id, d("2024-06-08"));
    engine.process_end_of_day(user_id, d("2024-06-08")).await.unwrap();
    store.record_task(user_id, d("2024-06-09"));
    store.record_task(user_id, d("2024-06-10"));

    let close = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.process_end_of_day(user_id, d("2024-06-09")).await })
    };
    let live = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.on_activity_recorded(user_id, d("2024-06-10")).await })
    };
    close.await.expect("task join failed").expect("close failed");
    live.await.expect("task join failed").expect("update failed");

    let summary = engine.get_user_streak(user_id, d("2024-06-10")).await.unwrap();
    assert_eq!(summary.current_streak, 3);
    assert_eq!(summary.best_streak, 3);
}
