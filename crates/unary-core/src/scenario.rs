//! Scenarios and programs
//!
//! A [`Scenario`] pairs one device with an ordered list of test cases. It is
//! usually parsed from a comma-separated token string:
//!
//! ```text
//! design=u,test=FullyRandomizedTestCase,options=n:500;unary_prob:0.3,t=DirectedExhaustiveTestCase
//! ```
//!
//! `design`/`d` names the device, `test`/`t` appends a test case and
//! `options`/`o` configures the most recently appended one. A [`Program`] runs
//! its scenarios in order with one shared [`StimulusRng`].

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::RunConfig;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::random::StimulusRng;
use crate::registry::{DesignRegistry, TestCaseRegistry};
use crate::testcase::{TestCase, TestState};

/// Cooperative cancellation flag shared between a program and its controller
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub name: String,
    pub state: TestState,
    pub mismatches: usize,
}

impl TestReport {
    fn of(test: &dyn TestCase) -> Self {
        Self {
            name: test.name().to_string(),
            state: test.state(),
            mismatches: test.mismatches(),
        }
    }

    pub fn passed(&self) -> bool {
        self.state == TestState::Passed
    }

    pub fn failed(&self) -> bool {
        self.state == TestState::Failed
    }

    /// Never ran, because of cancellation or a missing device
    pub fn skipped(&self) -> bool {
        !self.state.has_run()
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub spec: String,
    pub device: Option<String>,
    pub tests: Vec<TestReport>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.tests.iter().all(TestReport::passed)
    }
}

/// Outcome of a whole program run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramReport {
    pub seed: u64,
    pub scenarios: Vec<ScenarioReport>,
}

impl ProgramReport {
    pub fn tests(&self) -> impl Iterator<Item = &TestReport> {
        self.scenarios.iter().flat_map(|s| s.tests.iter())
    }

    pub fn total(&self) -> usize {
        self.tests().count()
    }

    pub fn passed(&self) -> usize {
        self.tests().filter(|t| t.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.tests().filter(|t| t.failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.tests().filter(|t| t.skipped()).count()
    }

    pub fn mismatches(&self) -> usize {
        self.tests().map(|t| t.mismatches).sum()
    }

    pub fn all_passed(&self) -> bool {
        self.tests().all(TestReport::passed)
    }
}

/// One device and the test cases run against it
pub struct Scenario {
    spec: String,
    device: Option<Box<dyn Device>>,
    tests: Vec<Box<dyn TestCase>>,
}

impl Scenario {
    /// Empty scenario labelled `spec` in logs and reports.
    pub fn new(spec: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            device: None,
            tests: Vec::new(),
        }
    }

    /// Parse a `key=value,...` token string against the given registries.
    pub fn parse(spec: &str, designs: &DesignRegistry, tests: &TestCaseRegistry) -> Result<Self> {
        let mut scenario = Self::new(spec);

        for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let mut parts = token.split('=');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(Error::MalformedToken(token.to_string()));
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "d" | "design" => {
                    let device = designs
                        .construct(value)
                        .ok_or_else(|| Error::UnknownDesign(value.to_string()))?;
                    scenario.set_device(device)?;
                }
                "t" | "test" => {
                    if !scenario.has_design() {
                        return Err(Error::NoDesign(token.to_string()));
                    }
                    let test = tests
                        .construct(value)
                        .ok_or_else(|| Error::UnknownTest(value.to_string()))?;
                    scenario.add_test(test)?;
                }
                "o" | "options" => {
                    if !scenario.has_design() {
                        return Err(Error::NoDesign(token.to_string()));
                    }
                    scenario
                        .head_mut()
                        .ok_or_else(|| Error::NoTest(value.to_string()))?
                        .config(value)?;
                }
                _ => return Err(Error::UnknownToken(token.to_string())),
            }
        }

        if !scenario.is_valid() {
            return Err(Error::IncompleteScenario(spec.to_string()));
        }
        Ok(scenario)
    }

    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn device(&self) -> Option<&dyn Device> {
        self.device.as_deref()
    }

    pub fn tests(&self) -> impl Iterator<Item = &dyn TestCase> {
        self.tests.iter().map(|t| &**t as &dyn TestCase)
    }

    pub fn has_design(&self) -> bool {
        self.device.is_some()
    }

    pub fn has_test(&self) -> bool {
        !self.tests.is_empty()
    }

    /// A device and at least one test case
    pub fn is_valid(&self) -> bool {
        self.has_design() && self.has_test()
    }

    /// Install the device. A scenario holds at most one.
    pub fn set_device(&mut self, device: Box<dyn Device>) -> Result<()> {
        if let Some(existing) = &self.device {
            return Err(Error::DuplicateDesign {
                existing: existing.name().to_string(),
                requested: device.name().to_string(),
            });
        }
        self.device = Some(device);
        Ok(())
    }

    /// Append a test case. Requires a device.
    pub fn add_test(&mut self, test: Box<dyn TestCase>) -> Result<()> {
        if !self.has_design() {
            return Err(Error::NoDesign(test.name().to_string()));
        }
        self.tests.push(test);
        Ok(())
    }

    /// Most recently appended test case
    pub fn head_mut(&mut self) -> Option<&mut dyn TestCase> {
        let head: &mut dyn TestCase = &mut **self.tests.last_mut()?;
        Some(head)
    }

    /// Run every test case in order.
    ///
    /// Failures do not stop later test cases. When `trace_dir` is given and
    /// the device supports it, a waveform is captured to
    /// `<trace_dir>/<device>.vcd` for the duration of the scenario.
    pub fn run(
        &mut self,
        rng: &mut StimulusRng,
        cancel: &CancellationToken,
        trace_dir: Option<&Path>,
    ) -> ScenarioReport {
        let _span = tracing::info_span!("scenario", spec = %self.spec).entered();

        let Some(device) = self.device.as_deref_mut() else {
            tracing::error!("scenario has no design, skipping its test cases");
            return ScenarioReport {
                spec: self.spec.clone(),
                device: None,
                tests: self.tests.iter().map(|t| TestReport::of(&**t)).collect(),
            };
        };
        let device_name = device.name().to_string();
        tracing::info!(device = %device_name, tests = self.tests.len(), "scenario started");

        if let Some(dir) = trace_dir {
            if let Some(tracer) = device.as_traceable() {
                let path = dir.join(format!("{device_name}.vcd"));
                if let Err(err) = tracer.open_trace(&path) {
                    tracing::warn!(path = %path.display(), error = %err, "cannot open waveform trace");
                }
            }
        }

        let mut reports = Vec::with_capacity(self.tests.len());
        for test in &mut self.tests {
            if cancel.is_cancelled() {
                tracing::info!(test = %test.name(), "cancelled, test case skipped");
            } else if let Err(err) = test.run(device, rng) {
                tracing::error!(test = %test.name(), error = %err, "test case not run");
            }
            reports.push(TestReport::of(&**test));
        }

        if let Some(tracer) = device.as_traceable() {
            if let Err(err) = tracer.close_trace() {
                tracing::warn!(error = %err, "cannot close waveform trace");
            }
        }

        let report = ScenarioReport {
            spec: self.spec.clone(),
            device: Some(device_name),
            tests: reports,
        };
        tracing::info!(passed = report.passed(), "scenario finished");
        report
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("spec", &self.spec)
            .field("device", &self.device.as_ref().map(|d| d.name()))
            .field("tests", &self.tests().map(|t| t.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Ordered scenarios sharing one seeded random engine
#[derive(Debug)]
pub struct Program {
    config: RunConfig,
    rng: StimulusRng,
    scenarios: Vec<Scenario>,
    cancel: CancellationToken,
}

impl Program {
    pub fn new(config: RunConfig) -> Self {
        Self {
            rng: StimulusRng::new(config.seed),
            config,
            scenarios: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Append a scenario. It must have a device and a test case.
    pub fn add(&mut self, scenario: Scenario) -> Result<()> {
        if !scenario.is_valid() {
            return Err(Error::IncompleteScenario(scenario.spec));
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Handle that stops the run before the next scenario or test case.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run every scenario in order.
    pub fn run(&mut self) -> ProgramReport {
        let trace_dir = self.config.vcd.then_some(self.config.trace_dir.as_path());
        tracing::info!(
            seed = self.config.seed,
            scenarios = self.scenarios.len(),
            vcd = self.config.vcd,
            "program started"
        );

        let mut reports = Vec::with_capacity(self.scenarios.len());
        for scenario in &mut self.scenarios {
            if self.cancel.is_cancelled() {
                tracing::info!(spec = %scenario.spec(), "cancelled, scenario skipped");
                reports.push(ScenarioReport {
                    spec: scenario.spec().to_string(),
                    device: scenario.device().map(|d| d.name().to_string()),
                    tests: scenario.tests().map(TestReport::of).collect(),
                });
                continue;
            }
            reports.push(scenario.run(&mut self.rng, &self.cancel, trace_dir));
        }

        let report = ProgramReport {
            seed: self.config.seed,
            scenarios: reports,
        };
        tracing::info!(
            total = report.total(),
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "program finished"
        );
        report
    }
}
