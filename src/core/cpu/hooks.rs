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

//! BIOS kernel call observers
//!
//! The BIOS exposes its services through three dispatchers in low RAM. Code
//! calls `0xA0`, `0xB0` or `0xC0` with the function number in `r9` (t1) and
//! the arguments in `r4`-`r7` (a0-a3). The CPU notifies a [`KernelCallHook`]
//! when execution reaches the A and B dispatchers.

use super::CPU;

/// Observer for BIOS A/B function calls
///
/// Hooks see the CPU state read-only and cannot change control flow.
///
/// # Example
/// ```
/// use psrx_core::core::cpu::{KernelCallHook, CPU};
///
/// struct PutcharCounter(usize);
///
/// impl KernelCallHook for PutcharCounter {
///     fn b_function(&mut self, cpu: &CPU) {
///         if cpu.reg(9) == 0x3D {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait KernelCallHook {
    /// Called when the PC reaches the A-function dispatcher
    fn a_function(&mut self, _cpu: &CPU) {}

    /// Called when the PC reaches the B-function dispatcher
    fn b_function(&mut self, _cpu: &CPU) {}
}

/// Logs every A/B call at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct KernelCallLogger;

impl KernelCallLogger {
    fn log_call(table: char, cpu: &CPU) {
        let function = cpu.reg(9);
        log::debug!(
            "BIOS {}({:02X}h) a0=0x{:08X} a1=0x{:08X} a2=0x{:08X} a3=0x{:08X} ra=0x{:08X}",
            table,
            function,
            cpu.reg(4),
            cpu.reg(5),
            cpu.reg(6),
            cpu.reg(7),
            cpu.reg(31)
        );
    }
}

impl KernelCallHook for KernelCallLogger {
    fn a_function(&mut self, cpu: &CPU) {
        Self::log_call('A', cpu);
    }

    fn b_function(&mut self, cpu: &CPU) {
        Self::log_call('B', cpu);
    }
}
