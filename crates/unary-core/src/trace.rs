//! Value Change Dump (VCD) waveform capture
//!
//! Records the admission circuit's ports, `i_x`, `o_is_unary` and
//! `o_is_complement`, once per simulated time step. Only values that changed
//! since the previous step are written, as the format expects.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::bitvec::{BitVector, Width};
use crate::error::Result;
use crate::reference::Classification;

const ID_INPUT: char = '!';
const ID_UNARY: char = '"';
const ID_COMPLEMENT: char = '#';

/// Streaming VCD writer for one device
pub struct VcdWriter<W: Write = BufWriter<File>> {
    out: W,
    last: Option<(BitVector, Classification)>,
}

impl VcdWriter<BufWriter<File>> {
    /// Create `path` and write the VCD header for a `width`-bit device.
    pub fn create(path: impl AsRef<Path>, module: &str, width: Width) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Self::new(BufWriter::new(file), module, width)
    }
}

impl<W: Write> VcdWriter<W> {
    /// Wrap `out` and write the header.
    pub fn new(mut out: W, module: &str, width: Width) -> Result<Self> {
        writeln!(out, "$version unary-tb {} $end", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "$timescale 1ns $end")?;
        writeln!(out, "$scope module {module} $end")?;
        writeln!(out, "$var wire {} {ID_INPUT} i_x [{}:0] $end", width, width.bits() - 1)?;
        writeln!(out, "$var wire 1 {ID_UNARY} o_is_unary $end")?;
        writeln!(out, "$var wire 1 {ID_COMPLEMENT} o_is_complement $end")?;
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;
        Ok(Self { out, last: None })
    }

    /// Record port values at `time`.
    pub fn dump(&mut self, time: u64, stimulus: &BitVector, response: Classification) -> Result<()> {
        let (input_changed, unary_changed, complement_changed) = match &self.last {
            None => (true, true, true),
            Some((prev_input, prev_response)) => (
                prev_input != stimulus,
                prev_response.is_unary != response.is_unary,
                prev_response.is_complement != response.is_complement,
            ),
        };
        if !(input_changed || unary_changed || complement_changed) {
            return Ok(());
        }

        writeln!(self.out, "#{time}")?;
        if input_changed {
            let bits = stimulus.to_string();
            let bits = bits.split_once('b').map_or(bits.as_str(), |(_, b)| b);
            writeln!(self.out, "b{bits} {ID_INPUT}")?;
        }
        if unary_changed {
            writeln!(self.out, "{}{ID_UNARY}", u8::from(response.is_unary))?;
        }
        if complement_changed {
            writeln!(self.out, "{}{ID_COMPLEMENT}", u8::from(response.is_complement))?;
        }
        self.last = Some((stimulus.clone(), response));
        Ok(())
    }

    /// Write the closing timestamp, flush, and hand back the sink.
    pub fn finish(mut self, time: u64) -> Result<W> {
        writeln!(self.out, "#{time}")?;
        self.out.flush()?;
        Ok(self.out)
    }
}
