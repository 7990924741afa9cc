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

//! System integration module
//!
//! [`System`] is the machine context: it owns one CPU, one bus (which in turn
//! owns the interrupt controller and every mapped device) and the
//! configuration they were built from. Two `System` values share nothing.

#[cfg(test)]
mod tests;

use super::config::MachineConfig;
use super::cpu::{CpuTracer, KernelCallHook, KernelCallLogger, CPU};
use super::error::Result;
use super::interrupt::IrqLines;
use super::memory::{Bus, IODevice};
use super::save_state::SaveState;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// PlayStation CPU machine
///
/// # Example
/// ```
/// use psrx_core::core::config::MachineConfig;
/// use psrx_core::core::system::System;
///
/// let mut system = System::new(MachineConfig::default());
/// // ori r1, r0, 0x42
/// system.load_program(0x8001_0000, &0x3401_0042u32.to_le_bytes(), 0x8001_0000).unwrap();
/// system.step().unwrap();
/// assert_eq!(system.cpu().reg(1), 0x42);
/// ```
pub struct System {
    /// CPU instance
    cpu: CPU,
    /// Memory bus
    bus: Bus,
    /// Configuration the machine was built from
    config: MachineConfig,
    /// CPU tracer for debugging (optional)
    tracer: Option<CpuTracer<Box<dyn Write>>>,
}

impl System {
    /// Create a machine from `config`
    ///
    /// The BIOS named by `config.bios_path` is not loaded here; call
    /// [`load_bios`](Self::load_bios).
    pub fn new(config: MachineConfig) -> Self {
        let mut cpu = CPU::new();
        if config.trace_kernel_calls {
            cpu.set_kernel_hook(Box::new(KernelCallLogger));
        }

        Self {
            cpu,
            bus: Bus::with_config(&config),
            config,
            tracer: None,
        }
    }

    /// Configuration the machine was built from
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Load a BIOS image (exactly 512KB)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use psrx_core::core::config::MachineConfig;
    /// use psrx_core::core::system::System;
    ///
    /// let mut system = System::new(MachineConfig::default());
    /// system.load_bios("SCPH1001.BIN").unwrap();
    /// ```
    pub fn load_bios<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Load a BIOS image from memory
    pub fn load_bios_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.bus.load_bios_bytes(data)
    }

    /// Copy raw code into RAM at `address` and start executing at `entry`
    pub fn load_program(&mut self, address: u32, data: &[u8], entry: u32) -> Result<()> {
        self.bus.load_program(address, data)?;
        self.cpu.set_pc(entry);
        log::info!(
            "Loaded {} bytes at 0x{:08X}, entry 0x{:08X}",
            data.len(),
            address,
            entry
        );
        Ok(())
    }

    /// Reset the system to initial state
    ///
    /// Clears RAM, scratchpad and the interrupt controller. The BIOS, mapped
    /// devices and any kernel-call hook are preserved.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
    }

    /// Execute one CPU instruction
    ///
    /// # Returns
    /// Number of cycles consumed
    ///
    /// # Errors
    /// Only host-level failures; guest exceptions are handled inside the CPU.
    pub fn step(&mut self) -> Result<u32> {
        if let Some(tracer) = self.tracer.as_mut() {
            if let Err(e) = tracer.trace(&self.cpu, &self.bus) {
                log::warn!("Failed to write trace: {}", e);
            }
        }
        self.cpu.step(&mut self.bus)
    }

    /// Execute `n` instructions
    ///
    /// # Returns
    /// Total cycles consumed
    pub fn run(&mut self, n: u64) -> Result<u64> {
        let mut cycles = 0u64;
        for _ in 0..n {
            cycles += self.step()? as u64;
        }
        Ok(cycles)
    }

    /// Capture the machine state
    ///
    /// Must be called between steps, which is the only time `&self` is
    /// reachable.
    pub fn snapshot(&self, label: impl Into<String>) -> SaveState {
        SaveState::capture(&self.cpu, &self.bus, label)
    }

    /// Restore a state captured by [`snapshot`](Self::snapshot)
    ///
    /// The BIOS and mapped devices are not part of the state.
    pub fn restore(&mut self, state: &SaveState) -> Result<()> {
        state.apply(&mut self.cpu, &mut self.bus)?;
        log::info!(
            "Restored save state '{}' ({} cycles)",
            state.metadata.label,
            state.metadata.cycles
        );
        Ok(())
    }

    /// Map a peripheral at the range it reports
    pub fn map_device(&mut self, device: Box<dyn IODevice>) -> Result<()> {
        self.bus.map_device(device)
    }

    /// Handle for peripherals to raise interrupts
    pub fn irq_lines(&self) -> IrqLines {
        self.bus.irq_lines()
    }

    /// Install a kernel-call observer, replacing any previous one
    pub fn set_kernel_hook(&mut self, hook: Box<dyn KernelCallHook>) {
        self.cpu.set_kernel_hook(hook);
    }

    /// Trace every executed instruction into `path`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use psrx_core::core::config::MachineConfig;
    /// use psrx_core::core::system::System;
    ///
    /// let mut system = System::new(MachineConfig::default());
    /// system.enable_tracing("trace.log", Some(5000)).unwrap(); // first 5000 instructions
    /// ```
    pub fn enable_tracing<P: AsRef<Path>>(&mut self, path: P, limit: Option<u64>) -> Result<()> {
        let file = BufWriter::new(File::create(path.as_ref())?);
        self.trace_into(Box::new(file), limit);
        log::info!(
            "CPU tracing enabled: {} (limit: {})",
            path.as_ref().display(),
            limit.map_or_else(|| "unlimited".to_string(), |l| l.to_string())
        );
        Ok(())
    }

    /// Trace every executed instruction into `output`
    pub fn trace_into(&mut self, output: Box<dyn Write>, limit: Option<u64>) {
        let tracer = CpuTracer::new(output);
        self.tracer = Some(match limit {
            Some(limit) => tracer.with_limit(limit),
            None => tracer,
        });
    }

    /// Stop tracing and flush the output
    pub fn disable_tracing(&mut self) -> Result<()> {
        if let Some(mut tracer) = self.tracer.take() {
            tracer.flush()?;
            log::info!("CPU tracing disabled (traced {} instructions)", tracer.traced());
        }
        Ok(())
    }

    /// Check if tracing is currently enabled
    pub fn is_tracing(&self) -> bool {
        self.tracer.is_some()
    }

    /// Number of instructions traced so far
    pub fn trace_count(&self) -> u64 {
        self.tracer.as_ref().map_or(0, |t| t.traced())
    }

    /// Get current PC value
    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    /// Total cycles executed since reset
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles()
    }

    /// Get reference to CPU
    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    /// Get mutable reference to CPU
    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    /// Get reference to the bus
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Get mutable reference to the bus
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}
