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

//! Test fixtures for common test scenarios

use super::assembler::assemble;
use psrx_core::core::config::MachineConfig;
use psrx_core::core::system::System;

/// Where test programs are loaded (KSEG0 RAM)
#[allow(dead_code)]
pub const PROGRAM_BASE: u32 = 0x8001_0000;

/// Scratch data area
#[allow(dead_code)]
pub const DATA_BASE: u32 = 0x8002_0000;

/// Exception vector with SR.BEV clear
#[allow(dead_code)]
pub const RAM_VECTOR: u32 = 0x8000_0080;

/// Create a System with `program` loaded at [`PROGRAM_BASE`]
#[allow(dead_code)]
pub fn system_with_program(program: &[u32]) -> System {
    let mut system = System::new(MachineConfig::default());
    system
        .load_program(PROGRAM_BASE, &assemble(program), PROGRAM_BASE)
        .expect("program fits in RAM");
    system
}

/// Place an exception handler at [`RAM_VECTOR`]
#[allow(dead_code)]
pub fn install_handler(system: &mut System, handler: &[u32]) {
    system
        .bus_mut()
        .load_program(RAM_VECTOR, &assemble(handler))
        .expect("handler fits in RAM");
}

/// Step until the PC reaches `address` or `limit` steps pass
#[allow(dead_code)]
pub fn run_until(system: &mut System, address: u32, limit: usize) -> usize {
    for n in 0..limit {
        if system.pc() == address {
            return n;
        }
        system.step().expect("host-level failure");
    }
    panic!(
        "PC never reached 0x{:08X} (stopped at 0x{:08X})",
        address,
        system.pc()
    );
}
