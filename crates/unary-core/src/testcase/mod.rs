//! Test-case framework
//!
//! A [`TestCase`] drives one [`Device`] with a stimulus strategy and compares
//! every device decision against the reference model through the shared
//! [`TestCaseCore::check`]. Strategies only supply their option keys and their
//! trial loop; lifecycle, configuration parsing and pass/fail bookkeeping are
//! provided methods.
//!
//! ## Lifecycle
//!
//! ```text
//! Created ──config──▶ Configured ──run──▶ Running ──▶ Passed | Failed
//!    └──────────────────run────────────────▲
//! ```
//!
//! Terminal states are final: running again yields [`Error::AlreadyRun`] and
//! configuring after a run yields [`Error::ConfigAfterRun`].
//!
//! ## Options
//!
//! `key:value` pairs separated by `;`, for example
//! `n:500;unary_prob:0.25;admit_complement:off`. Every strategy accepts
//! `admit_complement`; the rest are strategy specific.

mod directed;
mod randomized;

use std::fmt;

pub use directed::DirectedExhaustiveTestCase;
pub use randomized::FullyRandomizedTestCase;

use crate::bitvec::BitVector;
use crate::config::parse_flag;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::random::StimulusRng;
use crate::reference::classify;
use crate::registry::TestCaseRegistry;

/// Option key toggling the complement feature
pub const ADMIT_COMPLEMENT: &str = "admit_complement";

/// Position of a test case in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestState {
    #[default]
    Created,
    Configured,
    Running,
    Passed,
    Failed,
}

impl TestState {
    /// Whether the test case has started or finished running
    pub fn has_run(self) -> bool {
        matches!(self, Self::Running | Self::Passed | Self::Failed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Configured => "configured",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Option value checked by [`TestCase::config`] before it is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Flag(bool),
    Count(usize),
    Probability(f64),
}

/// State shared by every strategy
#[derive(Debug, Clone)]
pub struct TestCaseCore {
    name: String,
    mismatches: usize,
    complement_enabled: bool,
    state: TestState,
}

impl TestCaseCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mismatches: 0,
            complement_enabled: true,
            state: TestState::Created,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mismatches(&self) -> usize {
        self.mismatches
    }

    pub fn state(&self) -> TestState {
        self.state
    }

    pub fn complement_enabled(&self) -> bool {
        self.complement_enabled
    }

    pub fn set_complement_enabled(&mut self, enabled: bool) {
        self.complement_enabled = enabled;
    }

    /// Classify `stimulus` on `device` and compare with the reference model.
    ///
    /// Returns `false` and counts a mismatch when the admission bit differs,
    /// or when the polarity bit disagrees with what the complement feature
    /// allows: equal to the reference when enabled, deasserted when disabled.
    pub fn check(&mut self, device: &mut dyn Device, stimulus: &BitVector) -> bool {
        let rtl = device.classify(stimulus);
        let expected = classify(stimulus);
        tracing::info!(
            test = %self.name,
            stimulus = %stimulus,
            rtl = %rtl,
            reference = %expected,
            "check"
        );

        let failure = if rtl.is_unary != expected.is_unary {
            Some("is_unary mismatch")
        } else if self.complement_enabled && rtl.is_complement != expected.is_complement {
            Some("is_complement mismatch")
        } else if !self.complement_enabled && rtl.is_complement {
            Some("is_complement asserted with complement feature disabled")
        } else {
            None
        };

        match failure {
            Some(reason) => {
                self.mismatches += 1;
                tracing::error!(
                    test = %self.name,
                    device = device.name(),
                    stimulus = %stimulus,
                    rtl = %rtl,
                    reference = %expected,
                    mismatches = self.mismatches,
                    "{reason}"
                );
                false
            }
            None => true,
        }
    }

    fn invalid_option(&self, key: &str, reason: impl Into<String>) -> Error {
        Error::InvalidOption {
            test: self.name.clone(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Parse a boolean option value.
    pub fn parse_bool(&self, key: &str, value: &str) -> Result<bool> {
        parse_flag(value).ok_or_else(|| self.invalid_option(key, format!("`{value}` is not a boolean")))
    }

    /// Parse a non-negative count option value.
    pub fn parse_count(&self, key: &str, value: &str) -> Result<usize> {
        value
            .trim()
            .parse()
            .map_err(|_| self.invalid_option(key, format!("`{value}` is not a non-negative integer")))
    }

    /// Parse a probability in `[0, 1]`.
    pub fn parse_probability(&self, key: &str, value: &str) -> Result<f64> {
        match value.trim().parse::<f64>() {
            Ok(p) if (0.0..=1.0).contains(&p) => Ok(p),
            _ => Err(self.invalid_option(key, format!("`{value}` is not a probability in [0, 1]"))),
        }
    }
}

/// Stimulus strategy that verifies a device against the reference model
pub trait TestCase: Send {
    fn core(&self) -> &TestCaseCore;

    fn core_mut(&mut self) -> &mut TestCaseCore;

    /// Parse a strategy-specific option without applying it.
    ///
    /// Returns `Ok(None)` when `key` is not one of the strategy's options.
    fn parse_option(&self, key: &str, value: &str) -> Result<Option<OptionValue>>;

    /// Apply a value produced by [`parse_option`](Self::parse_option) for `key`.
    fn apply_option(&mut self, key: &str, value: OptionValue);

    /// Trial loop. Returns `false` on the first failed check.
    fn execute(&mut self, device: &mut dyn Device, rng: &mut StimulusRng) -> bool;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn state(&self) -> TestState {
        self.core().state()
    }

    fn mismatches(&self) -> usize {
        self.core().mismatches()
    }

    fn pass(&self) -> bool {
        self.mismatches() == 0
    }

    fn fail(&self) -> bool {
        !self.pass()
    }

    /// Apply `key:value;key:value` options.
    ///
    /// Every pair is parsed before any is applied, so a rejected string leaves
    /// the test case untouched.
    fn config(&mut self, options: &str) -> Result<()> {
        if self.state().has_run() {
            return Err(Error::ConfigAfterRun(self.name().to_string()));
        }

        let mut staged = Vec::new();
        for pair in options.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = pair.split_once(':') else {
                return Err(self
                    .core()
                    .invalid_option(pair, "expected `key:value`"));
            };
            let (key, value) = (key.trim(), value.trim());

            let parsed = if key == ADMIT_COMPLEMENT {
                Some(OptionValue::Flag(self.core().parse_bool(key, value)?))
            } else {
                self.parse_option(key, value)?
            };
            match parsed {
                Some(parsed) => staged.push((key, parsed)),
                None => return Err(self.core().invalid_option(key, "unknown option")),
            }
        }

        for (key, value) in staged {
            match (key, value) {
                (ADMIT_COMPLEMENT, OptionValue::Flag(enabled)) => {
                    self.core_mut().set_complement_enabled(enabled)
                }
                _ => self.apply_option(key, value),
            }
            tracing::debug!(test = %self.name(), key, ?value, "option applied");
        }

        self.core_mut().state = TestState::Configured;
        Ok(())
    }

    /// Run the strategy against `device` and return [`pass`](Self::pass).
    fn run(&mut self, device: &mut dyn Device, rng: &mut StimulusRng) -> Result<bool> {
        if self.state().has_run() {
            return Err(Error::AlreadyRun(self.name().to_string()));
        }

        self.core_mut().state = TestState::Running;
        tracing::info!(test = %self.name(), device = device.name(), "test case started");
        self.execute(device, rng);

        let passed = self.pass();
        self.core_mut().state = if passed {
            TestState::Passed
        } else {
            TestState::Failed
        };
        tracing::info!(
            test = %self.name(),
            state = %self.state(),
            mismatches = self.mismatches(),
            "test case finished"
        );
        Ok(passed)
    }
}

/// Register the built-in strategies.
pub fn register_test_cases(registry: &mut TestCaseRegistry) {
    registry.register(randomized::NAME, || Box::new(FullyRandomizedTestCase::new()));
    registry.register(directed::NAME, || Box::new(DirectedExhaustiveTestCase::new(false)));
    registry.register(directed::COMPLEMENT_NAME, || {
        Box::new(DirectedExhaustiveTestCase::new(true))
    });
}
