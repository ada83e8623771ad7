//! # unary-core - Thermometer-Code Admission Testbench
//!
//! Stimulus and verification engine for circuits that decide whether a
//! fixed-width bit vector is a unary (thermometer) code and whether the code
//! is in complemented polarity.
//!
//! ## Architecture
//!
//! ```text
//! StimulusGenerator ──▶ BitVector ──▶ Device::classify ─┐
//!                                 └─▶ reference::classify ┴─▶ TestCaseCore::check
//!                                                             │
//!             ProgramReport ◀── Program ◀── Scenario ◀─────────┘
//! ```
//!
//! - **Reference model**: [`classify`] is the golden classifier every device is
//!   compared against.
//! - **Devices**: anything implementing [`Device`]. [`SimDevice`] drives one of
//!   the circuit models in [`designs`] and can capture a VCD waveform.
//! - **Test cases**: [`TestCase`] strategies (randomized, directed exhaustive)
//!   with a `Created → Configured → Running → Passed | Failed` lifecycle.
//! - **Registries**: designs and test cases are looked up by name through
//!   [`design_registry`] and [`test_case_registry`].
//! - **Scenarios**: [`Scenario::parse`] builds a device plus test cases from a
//!   `design=..,test=..,options=..` string; a [`Program`] runs scenarios with
//!   one seeded [`StimulusRng`].
//!
//! ## Example
//!
//! ```
//! use unary_core::{design_registry, test_case_registry, Program, RunConfig, Scenario};
//!
//! let scenario = Scenario::parse(
//!     "design=reference,test=FullyRandomizedTestCase,options=n:50",
//!     design_registry(),
//!     test_case_registry(),
//! )?;
//!
//! let mut program = Program::new(RunConfig::default());
//! program.add(scenario)?;
//! let report = program.run();
//! assert!(report.all_passed());
//! # Ok::<(), unary_core::Error>(())
//! ```

pub mod bitvec;
pub mod config;
pub mod designs;
pub mod device;
pub mod error;
pub mod random;
pub mod reference;
pub mod registry;
pub mod scenario;
pub mod stimulus;
pub mod testcase;
pub mod trace;

// Re-export primary types
pub use bitvec::{BitVector, Width, DEFAULT_WIDTH, MAX_WIDTH};
pub use config::{RejectedValue, RunConfig};
pub use device::{Circuit, Device, ReferenceDevice, SimDevice, Traceable};
pub use error::{Error, Result};
pub use random::{StimulusRng, DEFAULT_SEED};
pub use reference::{classify, Classification};
pub use registry::{design_registry, test_case_registry, DesignRegistry, Registry, TestCaseRegistry};
pub use scenario::{CancellationToken, Program, ProgramReport, Scenario, ScenarioReport, TestReport};
pub use stimulus::StimulusGenerator;
pub use testcase::{DirectedExhaustiveTestCase, FullyRandomizedTestCase, TestCase, TestCaseCore, TestState};
pub use trace::VcdWriter;
