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

/// Emulator error types
///
/// These are host-level failures only. Conditions the emulated CPU handles
/// itself (reserved instruction, overflow, address error, bus error under the
/// default policy, ...) never surface here; they are delivered through COP0.
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("BIOS file not found: {0}")]
    BiosNotFound(String),

    #[error("Invalid BIOS size: {got} bytes (expected {expected})")]
    InvalidBiosSize { expected: usize, got: usize },

    #[error("Unmapped {width}-byte bus access at 0x{address:08X}")]
    UnmappedAccess { address: u32, width: u8 },

    #[error("Unaligned memory access: {size}-byte access at 0x{address:08X}")]
    UnalignedAccess { address: u32, size: u8 },

    /// Access to an address no region claims, under the default policy.
    ///
    /// The CPU turns this into an IBE/DBE exception; it never leaves
    /// `CPU::step`.
    #[error("Bus error at 0x{address:08X}")]
    BusError { address: u32 },

    #[error("Region 0x{base:08X}+0x{size:X} overlaps an existing mapping")]
    RegionOverlap { base: u32, size: u32 },

    #[error("Invalid region 0x{base:08X}+0x{size:X}")]
    InvalidRegion { base: u32, size: u32 },

    #[error("Program of {size} bytes does not fit in RAM at 0x{address:08X}")]
    ProgramTooLarge { address: u32, size: usize },

    #[error("Device '{name}' failed: {reason}")]
    Device { name: String, reason: String },

    #[error("Save state encode error: {0}")]
    SaveStateEncode(#[from] bincode::error::EncodeError),

    #[error("Save state decode error: {0}")]
    SaveStateDecode(#[from] bincode::error::DecodeError),

    #[error("Incompatible save state version: expected {expected}, got {got}")]
    SaveStateVersion { expected: u32, got: u32 },

    #[error("Invalid save state: {0}")]
    InvalidSaveState(String),

    #[error("Failed to deserialize config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
