// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::{Arc, Once};

use chrono::NaiveDate;
use stride_engine::config::StreakConfig;
use stride_engine::services::{ActivityHistoryView, StreakEngine};
use stride_engine::store::MemoryStore;

static TRACING: Once = Once::new();

/// Initialize test logging once per binary (RUST_LOG controls verbosity).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Engine over a fresh in-memory store with the default config.
#[allow(dead_code)]
pub fn test_engine() -> (StreakEngine, Arc<MemoryStore>) {
    test_engine_with_config(StreakConfig::default())
}

/// Engine over a fresh in-memory store with a custom config. The store's
/// weekly cap follows the config so ledger and engine agree.
#[allow(dead_code)]
pub fn test_engine_with_config(config: StreakConfig) -> (StreakEngine, Arc<MemoryStore>) {
    init_tracing();
    let store = Arc::new(MemoryStore::with_weekly_cap(config.weekly_shield_cap));
    let engine = StreakEngine::new(store.clone(), store.clone(), store.clone(), config);
    (engine, store)
}

/// History view over the same store an engine was built on.
#[allow(dead_code)]
pub fn history_view(store: &Arc<MemoryStore>) -> ActivityHistoryView {
    ActivityHistoryView::new(store.clone())
}

/// Shorthand for literal test dates.
#[allow(dead_code)]
pub fn d(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}
