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

//! Save state serialization
//!
//! A save state captures everything needed to resume execution between two
//! instructions: the CPU register file and pipeline state, COP0, the GTE,
//! main RAM, the scratchpad and the interrupt controller.
//!
//! # Save State Format
//!
//! States are encoded with bincode's standard configuration. Fields are
//! written in declaration order. The BIOS image is not part of the state;
//! restoring requires the same BIOS to be loaded already.
//!
//! # Version Compatibility
//!
//! Every state carries [`SAVE_STATE_VERSION`]. Loading a state with a
//! different version fails with
//! [`EmulatorError::SaveStateVersion`](crate::core::error::EmulatorError::SaveStateVersion).
//!
//! # Example
//!
//! ```no_run
//! use psrx_core::core::config::MachineConfig;
//! use psrx_core::core::save_state::SaveState;
//! use psrx_core::core::System;
//!
//! let mut system = System::new(MachineConfig::default());
//! system.run(1000).unwrap();
//!
//! let state = system.snapshot("checkpoint");
//! state.save_to_file("save.state").unwrap();
//!
//! let loaded = SaveState::load_from_file("save.state").unwrap();
//! system.restore(&loaded).unwrap();
//! ```

use crate::core::cpu::CPU;
use crate::core::error::{EmulatorError, Result};
use crate::core::gte::GTE;
use crate::core::memory::Bus;
use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Save state version for compatibility checking
///
/// Incremented whenever the encoded layout changes.
pub const SAVE_STATE_VERSION: u32 = 1;

/// Complete machine save state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveState {
    /// Version number for compatibility checking
    pub version: u32,

    /// Save state metadata
    pub metadata: SaveStateMetadata,

    /// CPU state
    pub cpu: CPUState,

    /// Memory state (RAM, scratchpad)
    pub memory: MemoryState,

    /// Interrupt controller state
    pub interrupts: InterruptState,
}

/// Save state metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[bincode(encode_bounds = "", decode_bounds = "")]
pub struct SaveStateMetadata {
    /// Timestamp when the save state was created
    #[bincode(with_serde)]
    pub timestamp: DateTime<Utc>,

    /// Free-form label chosen by the user
    pub label: String,

    /// CPU cycle counter at save time
    pub cycles: u64,
}

/// CPU state (MIPS R3000A)
///
/// Captures the register file, the PC triplet, both delay slots, COP0 and
/// the GTE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct CPUState {
    /// General purpose registers (R0-R31)
    pub regs: [u32; 32],

    /// HI register
    pub hi: u32,

    /// LO register
    pub lo: u32,

    /// Program counter
    pub pc: u32,

    /// Next PC (for delay slot handling)
    pub next_pc: u32,

    /// Address of the last executed instruction
    pub current_pc: u32,

    /// The next instruction is a branch delay slot
    pub branch: bool,

    /// The last executed instruction was in a delay slot
    pub delay_slot: bool,

    /// Pending load (register index, value)
    pub load_delay: Option<(u8, u32)>,

    /// COP0 registers r0-r15
    pub cop0_regs: [u32; 16],

    /// GTE register file
    pub gte: GTE,

    /// Cycle counter
    pub cycles: u64,
}

/// Memory state (RAM and scratchpad)
///
/// The BIOS is read-only and not saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct MemoryState {
    /// Main RAM (2MB)
    pub ram: Vec<u8>,

    /// Scratchpad (1KB fast RAM)
    pub scratchpad: Vec<u8>,
}

/// Interrupt controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct InterruptState {
    /// Interrupt status register (I_STAT)
    pub i_stat: u32,

    /// Interrupt mask register (I_MASK)
    pub i_mask: u32,

    /// Current level of each request line
    pub line_levels: u16,

    /// Rising edges not yet latched into I_STAT
    pub line_edges: u16,
}

impl SaveState {
    /// Capture the state of a CPU and its bus
    ///
    /// Must be called between steps.
    pub fn capture(cpu: &CPU, bus: &Bus, label: impl Into<String>) -> Self {
        Self {
            version: SAVE_STATE_VERSION,
            metadata: SaveStateMetadata {
                timestamp: Utc::now(),
                label: label.into(),
                cycles: cpu.cycles(),
            },
            cpu: cpu.to_state(),
            memory: bus.to_state(),
            interrupts: bus.interrupts().to_state(),
        }
    }

    /// Restore a CPU and its bus from this state
    ///
    /// The state is validated first; on error nothing is modified.
    pub fn apply(&self, cpu: &mut CPU, bus: &mut Bus) -> Result<()> {
        self.validate()?;
        cpu.restore_from_state(&self.cpu);
        bus.restore_from_state(&self.memory);
        bus.interrupts_mut().restore_from_state(&self.interrupts);
        Ok(())
    }

    /// Check version and buffer sizes
    pub fn validate(&self) -> Result<()> {
        if self.version != SAVE_STATE_VERSION {
            return Err(EmulatorError::SaveStateVersion {
                expected: SAVE_STATE_VERSION,
                got: self.version,
            });
        }
        if self.memory.ram.len() != Bus::RAM_SIZE {
            return Err(EmulatorError::InvalidSaveState(format!(
                "RAM is {} bytes, expected {}",
                self.memory.ram.len(),
                Bus::RAM_SIZE
            )));
        }
        if self.memory.scratchpad.len() != Bus::SCRATCHPAD_SIZE {
            return Err(EmulatorError::InvalidSaveState(format!(
                "scratchpad is {} bytes, expected {}",
                self.memory.scratchpad.len(),
                Bus::SCRATCHPAD_SIZE
            )));
        }
        if let Some((reg, _)) = self.cpu.load_delay {
            if reg >= 32 {
                return Err(EmulatorError::InvalidSaveState(format!(
                    "pending load targets r{}",
                    reg
                )));
            }
        }
        Ok(())
    }

    /// Encode the state
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, config::standard())?)
    }

    /// Decode and validate a state
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (state, _): (SaveState, usize) = bincode::decode_from_slice(bytes, config::standard())?;
        state.validate()?;
        Ok(state)
    }

    /// Save state to file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use psrx_core::core::{cpu::CPU, memory::Bus, save_state::SaveState};
    /// # let (cpu, bus) = (CPU::new(), Bus::new());
    /// let state = SaveState::capture(&cpu, &bus, "boot");
    /// state.save_to_file("save.state").unwrap();
    /// ```
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Load state from file
    ///
    /// Fails on I/O errors, decode errors and version mismatches.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

/// Trait for components that can be saved and restored
///
/// # Example
///
/// ```
/// use psrx_core::core::save_state::StateSave;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct LatchState {
///     value: u32,
/// }
///
/// struct Latch {
///     value: u32,
/// }
///
/// impl StateSave for Latch {
///     type State = LatchState;
///
///     fn to_state(&self) -> Self::State {
///         LatchState { value: self.value }
///     }
///
///     fn restore_from_state(&mut self, state: &Self::State) {
///         self.value = state.value;
///     }
/// }
/// ```
pub trait StateSave {
    /// The state type for this component
    type State: Serialize + for<'de> Deserialize<'de>;

    /// Convert this component to a saveable state
    fn to_state(&self) -> Self::State;

    /// Restore this component from a saved state
    fn restore_from_state(&mut self, state: &Self::State);
}
