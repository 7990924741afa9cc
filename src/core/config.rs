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

//! Machine configuration
//!
//! Settings are read from a TOML file. Every field has a default so a config
//! file only needs to name what it changes:
//!
//! ```toml
//! bios_path = "SCPH1001.BIN"
//! unmapped = "fatal"
//!
//! [timing]
//! ram = 6
//! bios = 20
//! ```

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What the bus does when an access hits no region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedPolicy {
    /// Raise a bus error exception (IBE/DBE) inside the emulated CPU
    #[default]
    Exception,
    /// Stop emulation with [`EmulatorError::UnmappedAccess`](crate::core::error::EmulatorError::UnmappedAccess)
    Fatal,
}

/// Fixed access cost in CPU cycles for each region kind
///
/// Instruction fetches are charged the same way as data accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessTiming {
    pub ram: u32,
    pub bios: u32,
    pub scratchpad: u32,
    pub io: u32,
    pub expansion: u32,
}

impl Default for AccessTiming {
    fn default() -> Self {
        Self {
            ram: 5,
            bios: 24,
            scratchpad: 1,
            io: 3,
            expansion: 8,
        }
    }
}

/// Top-level machine configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// BIOS image loaded by the runner (512KB)
    pub bios_path: Option<PathBuf>,

    /// Per-region access costs
    pub timing: AccessTiming,

    /// Unmapped access handling
    pub unmapped: UnmappedPolicy,

    /// Install the logging kernel-call hook
    pub trace_kernel_calls: bool,
}

impl MachineConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::config::{MachineConfig, UnmappedPolicy};
    ///
    /// let config = MachineConfig::from_toml_str("unmapped = \"fatal\"\n[timing]\nram = 7\n").unwrap();
    /// assert_eq!(config.unmapped, UnmappedPolicy::Fatal);
    /// assert_eq!(config.timing.ram, 7);
    /// assert_eq!(config.timing.bios, 24);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to a file, replacing any existing one
    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
