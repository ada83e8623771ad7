use super::{OptionValue, TestCase, TestCaseCore};
use crate::device::Device;
use crate::error::Result;
use crate::random::StimulusRng;
use crate::stimulus::{StimulusGenerator, DEFAULT_NON_UNARY_ROUNDS};

pub(super) const NAME: &str = "FullyRandomizedTestCase";

/// Default number of trials
pub const DEFAULT_TRIALS: usize = 100;

/// Default probability that a trial drives a unary vector
pub const DEFAULT_UNARY_PROB: f64 = 0.1;

/// Default probability that a unary vector is complemented
pub const DEFAULT_COMPLEMENT_PROB: f64 = 0.5;

/// Mixes random thermometer codes with random non-unary vectors.
///
/// Options: `n` (trials), `unary_prob`, `complement_prob`, `rounds`
/// (non-unary retry rounds). Unary run lengths are uniform in `[0, W - 2]`.
/// A trial whose non-unary draw is exhausted is skipped.
#[derive(Debug, Clone)]
pub struct FullyRandomizedTestCase {
    core: TestCaseCore,
    trials: usize,
    unary_prob: f64,
    complement_prob: f64,
    rounds: usize,
}

impl Default for FullyRandomizedTestCase {
    fn default() -> Self {
        Self::new()
    }
}

impl FullyRandomizedTestCase {
    pub fn new() -> Self {
        Self {
            core: TestCaseCore::new(NAME),
            trials: DEFAULT_TRIALS,
            unary_prob: DEFAULT_UNARY_PROB,
            complement_prob: DEFAULT_COMPLEMENT_PROB,
            rounds: DEFAULT_NON_UNARY_ROUNDS,
        }
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn unary_prob(&self) -> f64 {
        self.unary_prob
    }

    pub fn complement_prob(&self) -> f64 {
        self.complement_prob
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

impl TestCase for FullyRandomizedTestCase {
    fn core(&self) -> &TestCaseCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TestCaseCore {
        &mut self.core
    }

    fn parse_option(&self, key: &str, value: &str) -> Result<Option<OptionValue>> {
        let parsed = match key {
            "n" | "rounds" => OptionValue::Count(self.core.parse_count(key, value)?),
            "unary_prob" | "complement_prob" => {
                OptionValue::Probability(self.core.parse_probability(key, value)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }

    fn apply_option(&mut self, key: &str, value: OptionValue) {
        match (key, value) {
            ("n", OptionValue::Count(n)) => self.trials = n,
            ("rounds", OptionValue::Count(n)) => self.rounds = n,
            ("unary_prob", OptionValue::Probability(p)) => self.unary_prob = p,
            ("complement_prob", OptionValue::Probability(p)) => self.complement_prob = p,
            _ => tracing::warn!(test = NAME, key, ?value, "option value ignored"),
        }
    }

    fn execute(&mut self, device: &mut dyn Device, rng: &mut StimulusRng) -> bool {
        let width = device.width();
        let generator = StimulusGenerator::new(width);
        let mut skipped = 0usize;

        for trial in 0..self.trials {
            let stimulus = if rng.chance(self.unary_prob) {
                let n = rng.uniform_inclusive(width.bits().saturating_sub(2));
                let complement = rng.chance(self.complement_prob);
                generator.unary(n, complement)
            } else {
                match generator.non_unary(self.rounds, rng) {
                    Some(v) => v,
                    None => {
                        skipped += 1;
                        tracing::debug!(test = NAME, trial, "non-unary generation exhausted, trial skipped");
                        continue;
                    }
                }
            };

            if !self.core.check(device, &stimulus) {
                tracing::debug!(test = NAME, trial, "stopping at first failure");
                return false;
            }
        }

        if skipped > 0 {
            tracing::info!(test = NAME, skipped, trials = self.trials, "trials skipped");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitvec::{BitVector, Width, DEFAULT_WIDTH};
    use crate::device::ReferenceDevice;
    use crate::error::Error;
    use crate::reference::Classification;
    use crate::testcase::TestState;

    /// Device that rejects everything and counts calls.
    struct RejectAll {
        width: Width,
        calls: usize,
    }

    impl Device for RejectAll {
        fn name(&self) -> &str {
            "reject"
        }

        fn width(&self) -> Width {
            self.width
        }

        fn classify(&mut self, stimulus: &BitVector) -> Classification {
            self.calls += 1;
            Classification::new(false, stimulus.bit(self.width.bits() - 1))
        }
    }

    #[test]
    fn defaults() {
        let t = FullyRandomizedTestCase::new();
        assert_eq!(t.trials(), 100);
        assert_eq!(t.unary_prob(), 0.1);
        assert_eq!(t.complement_prob(), 0.5);
        assert_eq!(t.rounds(), 1);
        assert_eq!(t.name(), "FullyRandomizedTestCase");
    }

    #[test]
    fn options_are_applied() {
        let mut t = FullyRandomizedTestCase::new();
        t.config("n:7;unary_prob:1;complement_prob:0.0;rounds:4").unwrap();
        assert_eq!(t.trials(), 7);
        assert_eq!(t.unary_prob(), 1.0);
        assert_eq!(t.complement_prob(), 0.0);
        assert_eq!(t.rounds(), 4);
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        let mut t = FullyRandomizedTestCase::new();
        assert!(matches!(t.config("unary_prob:1.5"), Err(Error::InvalidOption { .. })));
        assert!(matches!(t.config("n:-1"), Err(Error::InvalidOption { .. })));
    }

    #[test]
    fn zero_trials_pass_trivially() {
        let mut t = FullyRandomizedTestCase::new();
        t.config("n:0").unwrap();
        let mut dev = RejectAll { width: DEFAULT_WIDTH, calls: 0 };
        assert!(t.run(&mut dev, &mut StimulusRng::default()).unwrap());
        assert_eq!(dev.calls, 0);
        assert_eq!(t.mismatches(), 0);
    }

    #[test]
    fn reference_device_always_passes() {
        let mut t = FullyRandomizedTestCase::new();
        t.config("n:500;unary_prob:0.5").unwrap();
        let mut dev = ReferenceDevice::new("reference", DEFAULT_WIDTH);
        assert!(t.run(&mut dev, &mut StimulusRng::new(1234)).unwrap());
        assert_eq!(t.state(), TestState::Passed);
    }

    #[test]
    fn fails_fast_on_first_mismatch() {
        // Every trial is a thermometer code; inner run lengths are admitted
        // by the reference and rejected by the device.
        let mut t = FullyRandomizedTestCase::new();
        t.config("n:50;unary_prob:1").unwrap();
        let mut dev = RejectAll { width: DEFAULT_WIDTH, calls: 0 };
        let mut rng = StimulusRng::new(3);

        let passed = t.run(&mut dev, &mut rng).unwrap();
        // Run length 0 is the boundary vector, which both reject.
        assert!(!passed);
        assert_eq!(t.mismatches(), 1);
        assert!(dev.calls <= 50);
    }

    #[test]
    fn exhausted_draws_are_skipped_not_failed() {
        // Zero rounds never draws, so every trial is skipped.
        let mut t = FullyRandomizedTestCase::new();
        t.config("n:20;unary_prob:0;rounds:0").unwrap();
        let mut dev = RejectAll { width: Width::new(2).unwrap(), calls: 0 };
        assert!(t.run(&mut dev, &mut StimulusRng::default()).unwrap());
        assert_eq!(dev.calls, 0);
    }

    #[test]
    fn same_seed_same_calls() {
        let run = |seed| {
            let mut t = FullyRandomizedTestCase::new();
            t.config("n:200;unary_prob:0.3").unwrap();
            let mut dev = ReferenceDevice::new("reference", Width::new(6).unwrap());
            let mut rng = StimulusRng::new(seed);
            t.run(&mut dev, &mut rng).unwrap();
            rng.uniform_inclusive(usize::MAX)
        };
        assert_eq!(run(99), run(99));
    }
}
