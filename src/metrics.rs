//! Lightweight global metrics.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Bloom fast-path (tests / negative / positive)
//! - Chain walk (шаги по entries, испорченные цепочки)
//! - Put / flush / remap

use std::sync::atomic::{AtomicU64, Ordering};

static BLOOM_TESTS: AtomicU64 = AtomicU64::new(0);
static BLOOM_NEGATIVE: AtomicU64 = AtomicU64::new(0);
static BLOOM_POSITIVE: AtomicU64 = AtomicU64::new(0);

static CHAIN_STEPS: AtomicU64 = AtomicU64::new(0);
static CHAIN_CORRUPT: AtomicU64 = AtomicU64::new(0);

static PUTS_TOTAL: AtomicU64 = AtomicU64::new(0);
static PUT_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static FLUSH_CALLS: AtomicU64 = AtomicU64::new(0);
static MAP_REMAPS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub bloom_tests: u64,
    pub bloom_negative: u64,
    pub bloom_positive: u64,

    pub chain_steps: u64,
    pub chain_corrupt: u64,

    pub puts_total: u64,
    pub put_bytes_written: u64,
    pub flush_calls: u64,
    pub map_remaps: u64,
}

impl MetricsSnapshot {
    /// Доля get(), отсечённых bloom-фильтром без чтения entries.
    pub fn bloom_negative_ratio(&self) -> f64 {
        if self.bloom_tests == 0 {
            0.0
        } else {
            self.bloom_negative as f64 / self.bloom_tests as f64
        }
    }
}

pub fn record_bloom_negative() {
    BLOOM_TESTS.fetch_add(1, Ordering::Relaxed);
    BLOOM_NEGATIVE.fetch_add(1, Ordering::Relaxed);
}
pub fn record_bloom_positive() {
    BLOOM_TESTS.fetch_add(1, Ordering::Relaxed);
    BLOOM_POSITIVE.fetch_add(1, Ordering::Relaxed);
}

pub fn record_chain_step() {
    CHAIN_STEPS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_chain_corrupt() {
    CHAIN_CORRUPT.fetch_add(1, Ordering::Relaxed);
}

pub fn record_put(entry_bytes: usize) {
    PUTS_TOTAL.fetch_add(1, Ordering::Relaxed);
    PUT_BYTES_WRITTEN.fetch_add(entry_bytes as u64, Ordering::Relaxed);
}
pub fn record_flush() {
    FLUSH_CALLS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_remap() {
    MAP_REMAPS.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        bloom_tests: BLOOM_TESTS.load(Ordering::Relaxed),
        bloom_negative: BLOOM_NEGATIVE.load(Ordering::Relaxed),
        bloom_positive: BLOOM_POSITIVE.load(Ordering::Relaxed),

        chain_steps: CHAIN_STEPS.load(Ordering::Relaxed),
        chain_corrupt: CHAIN_CORRUPT.load(Ordering::Relaxed),

        puts_total: PUTS_TOTAL.load(Ordering::Relaxed),
        put_bytes_written: PUT_BYTES_WRITTEN.load(Ordering::Relaxed),
        flush_calls: FLUSH_CALLS.load(Ordering::Relaxed),
        map_remaps: MAP_REMAPS.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    BLOOM_TESTS.store(0, Ordering::Relaxed);
    BLOOM_NEGATIVE.store(0, Ordering::Relaxed);
    BLOOM_POSITIVE.store(0, Ordering::Relaxed);

    CHAIN_STEPS.store(0, Ordering::Relaxed);
    CHAIN_CORRUPT.store(0, Ordering::Relaxed);

    PUTS_TOTAL.store(0, Ordering::Relaxed);
    PUT_BYTES_WRITTEN.store(0, Ordering::Relaxed);
    FLUSH_CALLS.store(0, Ordering::Relaxed);
    MAP_REMAPS.store(0, Ordering::Relaxed);
}
