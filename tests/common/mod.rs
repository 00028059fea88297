//! Common test utilities: tracing setup and a naive reference permutation.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     // ... test code with tracing::info!, tracing::debug!, etc.
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Filter directives (e.g., `dynperm=debug,dynperm::tree=trace`)
//! - `DYNPERM_LOG_DIR`: Log directory (default: `logs/`)
//! - `DYNPERM_LOG_CONSOLE`: Set to "0" to disable console output
//!
//! Library events are only emitted when the crate is built with
//! `--features tracing`.
//!
//! # Log Files
//!
//! Logs are written to `logs/dynperm.jsonl` as newline-delimited JSON (NDJSON):
//!
//! ```bash
//! # Every split in the inverse-pi tree
//! cat logs/dynperm.jsonl | jq 'select(.fields.side == "inverse-pi")'
//! ```

#![allow(dead_code)]

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

// ============================================================================
//  Tracing
// ============================================================================

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Initialize the tracing subscriber with file and console logging.
///
/// Safe to call multiple times - only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        setup_tracing();
    });
}

/// Configuration for tracing setup.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Directory for log files.
    pub log_dir: PathBuf,
    /// Log file name.
    pub log_file: String,
    /// Enable console output.
    pub console_enabled: bool,
    /// Default log level if RUST_LOG is not set.
    pub default_level: Level,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            log_file: "dynperm.jsonl".to_string(),
            console_enabled: true,
            default_level: Level::INFO,
        }
    }
}

impl TracingConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("DYNPERM_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        if env::var("DYNPERM_LOG_CONSOLE").is_ok_and(|v| v == "0") {
            config.console_enabled = false;
        }

        config
    }
}

/// Create an EnvFilter from RUST_LOG or use default level.
fn make_filter(default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{default_level}")))
}

#[expect(clippy::expect_used)]
fn setup_tracing() {
    let config = TracingConfig::from_env();

    std::fs::create_dir_all(&config.log_dir).expect("Failed to create log directory");
    let log_path = config.log_dir.join(&config.log_file);

    // Append mode: test binaries run in separate processes.
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let console_layer = config.console_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .compact()
            .with_filter(make_filter(config.default_level))
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .json()
        .with_filter(make_filter(config.default_level));

    // try_init: another test binary helper may already have installed one.
    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

// ============================================================================
//  NaivePermutation
// ============================================================================

/// Reference permutation on a plain `Vec`: every operation is O(n).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaivePermutation {
    pi: Vec<usize>,
}

impl NaivePermutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(pi: Vec<usize>) -> Self {
        Self { pi }
    }

    pub fn len(&self) -> usize {
        self.pi.len()
    }

    pub fn access(&self, i: usize) -> usize {
        self.pi[i]
    }

    pub fn inverse(&self, v: usize) -> usize {
        self.pi.iter().position(|&x| x == v).unwrap_or(usize::MAX)
    }

    pub fn insert(&mut self, i: usize, v: usize) {
        for x in &mut self.pi {
            if *x >= v {
                *x += 1;
            }
        }
        self.pi.insert(i, v);
    }

    pub fn erase(&mut self, i: usize) -> usize {
        let v = self.pi.remove(i);
        for x in &mut self.pi {
            if *x > v {
                *x -= 1;
            }
        }
        v
    }

    pub fn move_pi_index(&mut self, from: usize, to: usize) {
        let v = self.pi.remove(from);
        self.pi.insert(to, v);
    }

    pub fn pi_vector(&self) -> Vec<usize> {
        self.pi.clone()
    }

    pub fn inverse_vector(&self) -> Vec<usize> {
        let mut inv = vec![0; self.pi.len()];
        for (i, &v) in self.pi.iter().enumerate() {
            inv[v] = i;
        }
        inv
    }
}

/// Deterministic pseudo-random permutation of `[0, n)` (Fisher-Yates over a
/// 64-bit LCG), for scenario tests and benchmarks that need a fixed input.
pub fn scrambled(n: usize, seed: u64) -> Vec<usize> {
    let mut values: Vec<usize> = (0..n).collect();
    let mut state = seed | 1;
    for i in (1..n).rev() {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let j = (state >> 33) as usize % (i + 1);
        values.swap(i, j);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_init() {
        init_tracing();
        tracing::info!("Tracing initialized successfully");
        tracing::debug!(n = 42, "Debug event");
    }

    #[test]
    fn test_naive_insert_erase() {
        let mut naive = NaivePermutation::from_vec(vec![2, 0, 1]);
        naive.insert(1, 3);
        assert_eq!(naive.pi_vector(), vec![2, 3, 0, 1]);
        assert_eq!(naive.erase(0), 2);
        assert_eq!(naive.pi_vector(), vec![2, 0, 1]);
        assert_eq!(naive.inverse_vector(), vec![1, 2, 0]);
    }

    #[test]
    fn test_scrambled_is_permutation() {
        let mut values = scrambled(1000, 7);
        values.sort_unstable();
        assert_eq!(values, (0..1000).collect::<Vec<_>>());
    }
}
