//! Centralized configuration for store creation/opening.
//!
//! Goals:
//! - Single place for tunables instead of scattering env lookups.
//! - StoreConfig::from_env() reads SHS_* variables; fluent with_* setters
//!   override individual fields.
//!
//! Usage:
//!   let cfg = StoreConfig::from_env()
//!       .with_segment_count(64)
//!       .with_bloom_fp(0.001);
//!   let store = Store::open_with(path, 8, cfg)?;

use crate::consts::{DEFAULT_BLOOM_FP, DEFAULT_CAPACITY_HINT, DEFAULT_SEGMENT_COUNT};
use std::fmt;

/// Tunables consumed at open/create time. When opening an existing file the
/// segment count is taken from the header and the configured value is ignored.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Number of bucket chains. Env: SHS_SEGMENTS (default 256).
    pub segment_count: u32,

    /// Target Bloom false-positive rate. Env: SHS_BLOOM_FP (default 0.01).
    /// Also used on reopen to rederive the hash count, so open a store with
    /// the same rate it was created with.
    pub bloom_fp: f64,

    /// Expected number of distinct keys; sizes the Bloom region reserved at
    /// creation. Env: SHS_CAPACITY_HINT (default 100_000).
    pub capacity_hint: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            segment_count: DEFAULT_SEGMENT_COUNT,
            bloom_fp: DEFAULT_BLOOM_FP,
            capacity_hint: DEFAULT_CAPACITY_HINT,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("SHS_SEGMENTS") {
            if let Ok(n) = v.trim().parse::<u32>() {
                if n > 0 {
                    cfg.segment_count = n;
                }
            }
        }

        if let Ok(v) = std::env::var("SHS_BLOOM_FP") {
            if let Ok(p) = v.trim().parse::<f64>() {
                if p > 0.0 && p < 1.0 {
                    cfg.bloom_fp = p;
                }
            }
        }

        if let Ok(v) = std::env::var("SHS_CAPACITY_HINT") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.capacity_hint = n;
            }
        }

        cfg
    }

    // Fluent setters (builder-style).

    pub fn with_segment_count(mut self, n: u32) -> Self {
        self.segment_count = n;
        self
    }

    pub fn with_bloom_fp(mut self, p: f64) -> Self {
        self.bloom_fp = p;
        self
    }

    pub fn with_capacity_hint(mut self, n: u64) -> Self {
        self.capacity_hint = n;
        self
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreConfig {{ segment_count: {}, bloom_fp: {}, capacity_hint: {} }}",
            self.segment_count, self.bloom_fp, self.capacity_hint
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_setters() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.segment_count, 256);
        assert_eq!(cfg.capacity_hint, 100_000);
        assert!((cfg.bloom_fp - 0.01).abs() < 1e-12);

        let cfg = cfg.with_segment_count(16).with_bloom_fp(0.001).with_capacity_hint(10);
        assert_eq!(cfg.segment_count, 16);
        assert_eq!(cfg.capacity_hint, 10);
        assert!((cfg.bloom_fp - 0.001).abs() < 1e-12);
    }
}
