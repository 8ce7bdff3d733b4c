//! Kernel tuning knobs.
//!
//! Defaults come from the hardware; two environment variables override them:
//!
//! | Variable | Field | Meaning |
//! |----------|-------|---------|
//! | `DENSEMX_NUM_THREADS` | `num_threads` | upper bound on threads per multiply |
//! | `DENSEMX_PARALLEL_THRESHOLD` | `parallel_threshold` | minimum `m*n` before threading |
//!
//! The environment is read once, on first use of [`KernelConfig::global`].

use std::sync::OnceLock;

pub const ENV_NUM_THREADS: &str = "DENSEMX_NUM_THREADS";
pub const ENV_PARALLEL_THRESHOLD: &str = "DENSEMX_PARALLEL_THRESHOLD";

/// Tuned: 256*256 is where spawning threads starts paying for itself.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256 * 256;
/// Below this `m*n*k` the blocked path is pure overhead.
pub const DEFAULT_SMALL_THRESHOLD: usize = 110_000;
/// Depth of a packed panel (rows of B kept hot in L2).
pub const DEFAULT_BLOCK_K: usize = 256;
/// Width of a panel (columns of B / C processed together).
pub const DEFAULT_BLOCK_N: usize = 1024;

static GLOBAL: OnceLock<KernelConfig> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    pub num_threads: usize,
    pub parallel_threshold: usize,
    pub small_threshold: usize,
    pub block_k: usize,
    pub block_n: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            num_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            small_threshold: DEFAULT_SMALL_THRESHOLD,
            block_k: DEFAULT_BLOCK_K,
            block_n: DEFAULT_BLOCK_N,
        }
    }
}

impl KernelConfig {
    /// Defaults with threading disabled.
    pub fn single_threaded() -> Self {
        Self {
            num_threads: 1,
            ..Self::default()
        }
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Process-wide configuration used by the engine.
    pub fn global() -> &'static KernelConfig {
        GLOBAL.get_or_init(|| {
            let config = Self::from_env();
            tracing::debug!(?config, "kernel configuration loaded");
            config
        })
    }

    /// Apply overrides from `lookup` (an environment or a test map).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(n) =
            lookup(ENV_NUM_THREADS).and_then(|raw| parse_positive(ENV_NUM_THREADS, &raw))
        {
            self.num_threads = n;
        }
        if let Some(t) = lookup(ENV_PARALLEL_THRESHOLD)
            .and_then(|raw| parse_positive(ENV_PARALLEL_THRESHOLD, &raw))
        {
            self.parallel_threshold = t;
        }
        self
    }

    /// Threads to use for an `m x n` output.
    pub fn threads_for(&self, m: usize, n: usize) -> usize {
        if m.saturating_mul(n) < self.parallel_threshold {
            1
        } else {
            self.num_threads.clamp(1, m.max(1))
        }
    }
}

fn parse_positive(key: &str, raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            tracing::warn!(key, value = raw, "ignoring invalid override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn overrides_apply() {
        let cfg = KernelConfig::default()
            .with_overrides(lookup(&[(ENV_NUM_THREADS, "3"), (ENV_PARALLEL_THRESHOLD, " 64 ")]));
        assert_eq!(cfg.num_threads, 3);
        assert_eq!(cfg.parallel_threshold, 64);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let base = KernelConfig::single_threaded();
        let cfg = base
            .clone()
            .with_overrides(lookup(&[(ENV_NUM_THREADS, "0"), (ENV_PARALLEL_THRESHOLD, "lots")]));
        assert_eq!(cfg, base);
    }

    #[test]
    fn threads_for_respects_threshold() {
        let cfg = KernelConfig {
            num_threads: 8,
            parallel_threshold: 100,
            ..KernelConfig::default()
        };
        assert_eq!(cfg.threads_for(5, 5), 1);
        assert_eq!(cfg.threads_for(10, 10), 8);
        // never more threads than output rows
        assert_eq!(cfg.threads_for(2, 1000), 2);
    }

    #[test]
    fn default_has_at_least_one_thread() {
        assert!(KernelConfig::default().num_threads >= 1);
        assert_eq!(KernelConfig::single_threaded().num_threads, 1);
    }
}
