use super::{OptionValue, TestCase, TestCaseCore};
use crate::bitvec::BitVector;
use crate::device::Device;
use crate::error::Result;
use crate::random::StimulusRng;
use crate::stimulus::StimulusGenerator;

pub(super) const NAME: &str = "DirectedExhaustiveTestCase";
pub(super) const COMPLEMENT_NAME: &str = "DirectedExhaustiveComplementTestCase";

/// Walks every thermometer code of one polarity.
///
/// Checks the boundary vector first (all ones when complemented, all zeros
/// otherwise), then `unary(i)` for every `i` in `[0, W)`. Stops at the first
/// failure. Option `polarity` is `normal` or `complement`; applying it also
/// renames the test case to the registered name of that polarity.
#[derive(Debug, Clone)]
pub struct DirectedExhaustiveTestCase {
    core: TestCaseCore,
    is_complement: bool,
}

impl DirectedExhaustiveTestCase {
    pub fn new(is_complement: bool) -> Self {
        Self {
            core: TestCaseCore::new(Self::name_for(is_complement)),
            is_complement,
        }
    }

    fn name_for(is_complement: bool) -> &'static str {
        if is_complement {
            COMPLEMENT_NAME
        } else {
            NAME
        }
    }

    pub fn is_complement(&self) -> bool {
        self.is_complement
    }
}

impl TestCase for DirectedExhaustiveTestCase {
    fn core(&self) -> &TestCaseCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TestCaseCore {
        &mut self.core
    }

    fn parse_option(&self, key: &str, value: &str) -> Result<Option<OptionValue>> {
        if key != "polarity" {
            return Ok(None);
        }
        match value {
            "normal" => Ok(Some(OptionValue::Flag(false))),
            "complement" => Ok(Some(OptionValue::Flag(true))),
            _ => Err(self
                .core
                .invalid_option(key, format!("`{value}` is neither `normal` nor `complement`"))),
        }
    }

    fn apply_option(&mut self, key: &str, value: OptionValue) {
        match (key, value) {
            ("polarity", OptionValue::Flag(is_complement)) => {
                self.is_complement = is_complement;
                self.core.name = Self::name_for(is_complement).to_string();
            }
            _ => tracing::warn!(test = %self.core.name(), key, ?value, "option value ignored"),
        }
    }

    fn execute(&mut self, device: &mut dyn Device, _rng: &mut StimulusRng) -> bool {
        let width = device.width();
        let boundary = if self.is_complement {
            BitVector::all_ones(width)
        } else {
            BitVector::all_zeros(width)
        };
        if !self.core.check(device, &boundary) {
            return false;
        }

        let generator = StimulusGenerator::new(width);
        for run in 0..width.bits() {
            if !self.core.check(device, &generator.unary(run, self.is_complement)) {
                tracing::debug!(test = %self.core.name(), run, "stopping at first failure");
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitvec::{Width, DEFAULT_WIDTH};
    use crate::device::{ReferenceDevice, SimDevice};
    use crate::designs::EdgeCounter;
    use crate::error::Error;
    use crate::reference::Classification;
    use crate::testcase::TestState;

    /// Records every stimulus it is asked to classify and answers like the
    /// reference, except that it rejects `reject`.
    struct Recorder {
        width: Width,
        seen: Vec<BitVector>,
        reject: Option<BitVector>,
    }

    impl Recorder {
        fn new(width: Width) -> Self {
            Self { width, seen: Vec::new(), reject: None }
        }
    }

    impl Device for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn width(&self) -> Width {
            self.width
        }

        fn classify(&mut self, stimulus: &BitVector) -> Classification {
            self.seen.push(stimulus.clone());
            let expected = crate::reference::classify(stimulus);
            if self.reject.as_ref() == Some(stimulus) {
                Classification::new(false, expected.is_complement)
            } else {
                expected
            }
        }
    }

    #[test]
    fn names_follow_polarity() {
        assert_eq!(DirectedExhaustiveTestCase::new(false).name(), NAME);
        assert_eq!(DirectedExhaustiveTestCase::new(true).name(), COMPLEMENT_NAME);
    }

    #[test]
    fn both_polarities_pass_against_reference() {
        for complement in [false, true] {
            let mut t = DirectedExhaustiveTestCase::new(complement);
            let mut dev = ReferenceDevice::new("reference", DEFAULT_WIDTH);
            assert!(t.run(&mut dev, &mut StimulusRng::default()).unwrap());
            assert_eq!(t.mismatches(), 0);
        }
    }

    #[test]
    fn visits_boundary_then_every_run_length() {
        let w = Width::new(6).unwrap();
        let mut t = DirectedExhaustiveTestCase::new(true);
        let mut dev = Recorder::new(w);
        t.run(&mut dev, &mut StimulusRng::default()).unwrap();

        let g = StimulusGenerator::new(w);
        let mut expected = vec![BitVector::all_ones(w)];
        expected.extend((0..6).map(|i| g.unary(i, true)));
        assert_eq!(dev.seen, expected);
    }

    #[test]
    fn stops_at_first_failing_run_length() {
        let w = Width::new(6).unwrap();
        let g = StimulusGenerator::new(w);
        let k = 3;
        let mut t = DirectedExhaustiveTestCase::new(false);
        let mut dev = Recorder::new(w);
        dev.reject = Some(g.unary(k, false));

        assert!(!t.run(&mut dev, &mut StimulusRng::default()).unwrap());
        assert_eq!(dev.seen.len(), k + 2);
        assert_eq!(dev.seen.last(), Some(&g.unary(k, false)));
        assert_eq!(t.mismatches(), 1);
        assert_eq!(t.state(), TestState::Failed);
    }

    #[test]
    fn polarity_option() {
        let mut t = DirectedExhaustiveTestCase::new(false);
        t.config("polarity:complement").unwrap();
        assert!(t.is_complement());
        assert_eq!(t.name(), COMPLEMENT_NAME);

        t.config("polarity:normal").unwrap();
        assert!(!t.is_complement());
        assert_eq!(t.name(), NAME);

        assert!(matches!(t.config("polarity:both"), Err(Error::InvalidOption { .. })));
        assert_eq!(t.name(), NAME);
    }

    #[test]
    fn renamed_run_walks_complemented_codes() {
        let w = Width::new(4).unwrap();
        let mut t = DirectedExhaustiveTestCase::new(false);
        t.config("polarity:complement").unwrap();
        let mut dev = Recorder::new(w);
        assert!(t.run(&mut dev, &mut StimulusRng::default()).unwrap());
        assert_eq!(t.name(), COMPLEMENT_NAME);
        assert_eq!(dev.seen[0], BitVector::all_ones(w));
    }

    #[test]
    fn circuit_disagrees_on_boundary_vector() {
        let mut t = DirectedExhaustiveTestCase::new(false);
        let mut dev = SimDevice::new("e", EdgeCounter::new(DEFAULT_WIDTH));
        assert!(!t.run(&mut dev, &mut StimulusRng::default()).unwrap());
        assert_eq!(t.mismatches(), 1);
        assert_eq!(dev.time(), 1);
    }
}
