//! Solver settings, read from the environment by the `bellman` binary.
//!
//! `BELLMAN_GAMMA`, `BELLMAN_THRESHOLD` (`none` disables early stopping) and
//! `BELLMAN_MAX_ITER`. Missing or unparsable values fall back to the defaults.

use crate::common::defs::*;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub gamma: Continous,
    /// Stop once successive estimates are closer than `10^-threshold`.
    pub threshold: Option<i32>,
    pub max_iter: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            threshold: Some(4),
            max_iter: 10_000,
        }
    }
}

impl SolverConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();

        let threshold = match lookup("BELLMAN_THRESHOLD") {
            Some(t) if t.trim().eq_ignore_ascii_case("none") => None,
            Some(t) => parse_or("BELLMAN_THRESHOLD", &t, defaults.threshold, |t| {
                t.parse().ok().map(Some)
            }),
            None => defaults.threshold,
        };

        Self {
            gamma: lookup("BELLMAN_GAMMA").map_or(defaults.gamma, |g| {
                parse_or("BELLMAN_GAMMA", &g, defaults.gamma, |g| {
                    g.parse().ok().filter(|g: &Continous| (0. ..=1.).contains(g))
                })
            }),
            threshold,
            max_iter: lookup("BELLMAN_MAX_ITER").map_or(defaults.max_iter, |m| {
                parse_or("BELLMAN_MAX_ITER", &m, defaults.max_iter, |m| m.parse().ok())
            }),
        }
    }
}

fn parse_or<T, F>(key: &str, value: &str, default: T, parse: F) -> T
where
    T: std::fmt::Debug,
    F: Fn(&str) -> Option<T>,
{
    parse(value.trim()).unwrap_or_else(|| {
        warn!(key, value, ?default, "ignoring unparsable setting");
        default
    })
}
