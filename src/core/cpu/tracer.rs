// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CPU execution tracer for debugging
//!
//! Writes one line per traced instruction to any [`std::io::Write`] sink:
//!
//! ```text
//! 80010000: 3C011234  lui r1, 0x1234
//! ```

use super::{Disassembler, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CPU execution tracer
///
/// Instructions are read with [`Bus::peek32`], so tracing has no bus side
/// effects and costs no cycles.
///
/// # Example
/// ```
/// use psrx_core::core::cpu::{CpuTracer, CPU};
/// use psrx_core::core::memory::Bus;
///
/// let mut cpu = CPU::new();
/// let mut bus = Bus::new();
/// let mut tracer = CpuTracer::new(Vec::new());
///
/// tracer.trace(&cpu, &bus).unwrap();
/// cpu.step(&mut bus).unwrap();
///
/// let text = String::from_utf8(tracer.into_inner()).unwrap();
/// assert!(text.starts_with("BFC00000: 00000000  nop"));
/// ```
pub struct CpuTracer<W: Write> {
    /// Enable/disable tracing
    enabled: bool,
    /// Trace sink
    output: W,
    /// Stop writing after this many lines
    limit: Option<u64>,
    /// Lines written so far
    traced: u64,
}

impl CpuTracer<BufWriter<File>> {
    /// Trace into a file, truncating it if it exists
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let output = BufWriter::new(File::create(path)?);
        Ok(Self::new(output))
    }
}

impl<W: Write> CpuTracer<W> {
    pub fn new(output: W) -> Self {
        Self {
            enabled: true,
            output,
            limit: None,
            traced: 0,
        }
    }

    /// Stop tracing after `limit` instructions
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Enable or disable tracing
    ///
    /// When disabled, trace() calls return immediately without writing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if tracing is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of lines written
    pub fn traced(&self) -> u64 {
        self.traced
    }

    fn active(&self) -> bool {
        self.enabled && self.limit.is_none_or(|limit| self.traced < limit)
    }

    fn write_instruction(&mut self, cpu: &CPU, bus: &Bus) -> Result<()> {
        let pc = cpu.pc();
        match bus.peek32(pc) {
            Some(word) => write!(
                self.output,
                "{:08X}: {:08X}  {}",
                pc,
                word,
                Disassembler::disassemble(word, pc)
            )?,
            None => write!(self.output, "{:08X}: ????????", pc)?,
        }
        self.traced += 1;
        Ok(())
    }

    /// Trace the instruction the CPU is about to execute
    pub fn trace(&mut self, cpu: &CPU, bus: &Bus) -> Result<()> {
        if !self.active() {
            return Ok(());
        }

        self.write_instruction(cpu, bus)?;
        writeln!(self.output)?;
        Ok(())
    }

    /// Trace with custom register selection
    ///
    /// Like `trace()`, followed by the values of up to 8 registers.
    pub fn trace_with_regs(&mut self, cpu: &CPU, bus: &Bus, regs: &[u8]) -> Result<()> {
        if !self.active() {
            return Ok(());
        }

        self.write_instruction(cpu, bus)?;
        write!(self.output, " |")?;
        for &reg in regs.iter().take(8) {
            write!(self.output, " r{}={:08X}", reg, cpu.reg(reg))?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    /// Flush the output buffer
    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }

    /// Consume the tracer, returning the sink
    pub fn into_inner(self) -> W {
        self.output
    }
}
