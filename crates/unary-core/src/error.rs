//! Error types for unary-core operations

/// Result type for unary-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running testbench scenarios
///
/// Classification mismatches are deliberately absent: they are recorded on
/// the owning test case and surfaced through its report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Scenario token without exactly one `=`
    #[error("malformed token `{0}`: expected exactly one `=`")]
    MalformedToken(String),

    /// Token key is not one of `design`/`d`, `test`/`t`, `options`/`o`
    #[error("unknown scenario token `{0}`")]
    UnknownToken(String),

    /// Design name absent from the design registry
    #[error("unknown design: {0}")]
    UnknownDesign(String),

    /// Test case name absent from the test-case registry
    #[error("unknown test case: {0}")]
    UnknownTest(String),

    /// A second design was named in one scenario
    #[error("scenario already has design `{existing}`, cannot add `{requested}`")]
    DuplicateDesign { existing: String, requested: String },

    /// Test or options given before any design
    #[error("no design in scenario, cannot apply `{0}`")]
    NoDesign(String),

    /// Options given before any test case
    #[error("no test case in scenario, cannot apply options `{0}`")]
    NoTest(String),

    /// Scenario lacks a design or a test case
    #[error("scenario `{0}` requires a design and at least one test case")]
    IncompleteScenario(String),

    /// Test-case configuration rejected
    #[error("invalid option `{key}` for {test}: {reason}")]
    InvalidOption { test: String, key: String, reason: String },

    /// Test case configured after it started running
    #[error("test case {0} cannot be configured once it has run")]
    ConfigAfterRun(String),

    /// Test case run a second time
    #[error("test case {0} has already run")]
    AlreadyRun(String),

    /// Bit width outside `[1, MAX_WIDTH]`
    #[error("invalid bit width {width}: must be in [1, {max}]")]
    InvalidWidth { width: usize, max: usize },

    /// Waveform trace I/O failure
    #[error("trace I/O error: {0}")]
    Trace(#[from] std::io::Error),
}
