//! Device abstraction
//!
//! A [`Device`] is anything that classifies a stimulus vector. Test cases
//! hold it by `&mut` for the duration of a run and call nothing but
//! [`Device::classify`]. Waveform capture is an optional capability exposed
//! through [`Device::as_traceable`].
//!
//! ## Adapters
//!
//! ```text
//! ReferenceDevice          loop-back to reference::classify
//! SimDevice<C: Circuit>    drive i_x port words → C::eval → sample outputs
//!                          → optional VCD dump → advance one time step
//! ```

use std::path::Path;

use crate::bitvec::{BitVector, Width};
use crate::error::Result;
use crate::reference::{classify, Classification};
use crate::trace::VcdWriter;

/// Evaluatable device under test
pub trait Device: Send {
    /// Registry name of the device
    fn name(&self) -> &str;

    /// Stimulus width the device's input port accepts
    fn width(&self) -> Width;

    /// Evaluate `stimulus` and return the admission decision.
    fn classify(&mut self, stimulus: &BitVector) -> Classification;

    /// Waveform capture capability, if the device has one.
    fn as_traceable(&mut self) -> Option<&mut dyn Traceable> {
        None
    }
}

/// Waveform capture capability of a simulated device
pub trait Traceable {
    /// Advance simulated time by `steps`.
    fn advance(&mut self, steps: u64);

    /// Start dumping port activity to `path`, replacing any open trace.
    fn open_trace(&mut self, path: &Path) -> Result<()>;

    /// Flush and close the current trace. A no-op when none is open.
    fn close_trace(&mut self) -> Result<()>;

    fn is_tracing(&self) -> bool;
}

/// Device wired directly to the reference model
///
/// Useful as a known-good device: any mismatch against it points at the
/// harness, not at a circuit.
#[derive(Debug, Clone)]
pub struct ReferenceDevice {
    name: String,
    width: Width,
}

impl ReferenceDevice {
    pub fn new(name: impl Into<String>, width: Width) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }
}

impl Device for ReferenceDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> Width {
        self.width
    }

    fn classify(&mut self, stimulus: &BitVector) -> Classification {
        classify(stimulus)
    }
}

/// Combinational admission circuit evaluated on 32-bit port words
///
/// `i_x[k]` carries stimulus bits `[32k, 32k + 32)`; bits at or beyond the
/// circuit width are zero.
pub trait Circuit: Send {
    fn width(&self) -> Width;

    /// Compute `(o_is_unary, o_is_complement)` from the input port.
    fn eval(&self, i_x: &[u32]) -> Classification;
}

/// Simulation adapter driving a [`Circuit`] one time step per evaluation
pub struct SimDevice<C> {
    name: String,
    circuit: C,
    time: u64,
    trace: Option<VcdWriter>,
}

impl<C: Circuit> SimDevice<C> {
    pub fn new(name: impl Into<String>, circuit: C) -> Self {
        Self {
            name: name.into(),
            circuit,
            time: 0,
            trace: None,
        }
    }

    /// Current simulated time in steps
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn circuit(&self) -> &C {
        &self.circuit
    }
}

impl<C: Circuit> Device for SimDevice<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> Width {
        self.circuit.width()
    }

    fn classify(&mut self, stimulus: &BitVector) -> Classification {
        let i_x = stimulus.to_port_words();
        let response = self.circuit.eval(&i_x);

        if let Some(trace) = self.trace.as_mut() {
            if let Err(err) = trace.dump(self.time, stimulus, response) {
                tracing::warn!(device = %self.name, error = %err, "waveform dump failed, tracing disabled");
                self.trace = None;
            }
        }
        self.advance(1);
        response
    }

    fn as_traceable(&mut self) -> Option<&mut dyn Traceable> {
        Some(self)
    }
}

impl<C: Circuit> Traceable for SimDevice<C> {
    fn advance(&mut self, steps: u64) {
        self.time = self.time.saturating_add(steps);
    }

    fn open_trace(&mut self, path: &Path) -> Result<()> {
        self.close_trace()?;
        self.trace = Some(VcdWriter::create(path, &self.name, self.circuit.width())?);
        tracing::debug!(device = %self.name, path = %path.display(), "waveform trace opened");
        Ok(())
    }

    fn close_trace(&mut self) -> Result<()> {
        if let Some(trace) = self.trace.take() {
            trace.finish(self.time)?;
            tracing::debug!(device = %self.name, time = self.time, "waveform trace closed");
        }
        Ok(())
    }

    fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }
}

impl<C> Drop for SimDevice<C> {
    fn drop(&mut self) {
        if let Some(trace) = self.trace.take() {
            let _ = trace.finish(self.time);
        }
    }
}
