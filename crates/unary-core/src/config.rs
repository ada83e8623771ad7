//! Run configuration
//!
//! [`RunConfig`] carries the knobs of one testbench run. Values come from
//! [`Default`], then the environment ([`RunConfig::from_env`]), then the
//! command line, each layer overriding the previous one.
//!
//! # Environment Variables
//!
//! - `UNARY_TB_SEED` - Stimulus seed (unsigned integer)
//! - `UNARY_TB_VERBOSITY` - Verbosity level, `0` (warnings) to `3` (trace)
//! - `UNARY_TB_DEBUG` - Force debug logging (`1`/`true`/`yes`/`on`)
//! - `UNARY_TB_VCD` - Enable waveform capture
//! - `UNARY_TB_TRACE_DIR` - Directory receiving `<design>.vcd` files

use std::env;
use std::path::PathBuf;

use crate::random::DEFAULT_SEED;

/// Environment value that failed to parse and was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedValue {
    pub key: &'static str,
    pub value: String,
}

/// Knobs for one testbench run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub seed: u64,
    pub verbosity: u8,
    pub debug: bool,
    /// Capture a VCD waveform per scenario
    pub vcd: bool,
    pub trace_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            verbosity: 0,
            debug: false,
            vcd: false,
            trace_dir: PathBuf::from("."),
        }
    }
}

impl RunConfig {
    /// Defaults overridden by `UNARY_TB_*` variables.
    ///
    /// Unparsable values keep their default and are returned alongside the
    /// config. This runs before any subscriber exists, so reporting them is
    /// left to the caller.
    pub fn from_env() -> (Self, Vec<RejectedValue>) {
        let mut config = Self::default();
        let mut rejected = Vec::new();

        if let Some(seed) = env_value("UNARY_TB_SEED", |v| v.parse().ok(), &mut rejected) {
            config.seed = seed;
        }
        if let Some(verbosity) = env_value("UNARY_TB_VERBOSITY", |v| v.parse().ok(), &mut rejected) {
            config.verbosity = verbosity;
        }
        if let Some(debug) = env_value("UNARY_TB_DEBUG", parse_flag, &mut rejected) {
            config.debug = debug;
        }
        if let Some(vcd) = env_value("UNARY_TB_VCD", parse_flag, &mut rejected) {
            config.vcd = vcd;
        }
        if let Ok(dir) = env::var("UNARY_TB_TRACE_DIR") {
            if !dir.trim().is_empty() {
                config.trace_dir = PathBuf::from(dir);
            }
        }

        (config, rejected)
    }

    /// Default tracing directive for this verbosity.
    pub fn log_directive(&self) -> &'static str {
        if self.debug {
            return "debug";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn env_value<T>(
    key: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
    rejected: &mut Vec<RejectedValue>,
) -> Option<T> {
    let raw = env::var(key).ok()?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        rejected.push(RejectedValue { key, value: raw });
    }
    parsed
}

/// Parse an on/off flag: `1/0`, `true/false`, `yes/no`, `on/off`.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
