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

//! System module tests
//!
//! - `basic`: construction, configuration, reset
//! - `execution`: stepping, cycle totals, tracing
//! - `devices`: peripherals mapped through the bus
//! - `interrupt_integration`: interrupt lines reaching the CPU
//! - `save_state`: snapshot and restore

mod basic;
mod interrupt_integration;

use super::*;

/// Where test programs are loaded
pub(super) const BASE: u32 = 0x8001_0000;

pub(super) fn words(program: &[u32]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// System with `program` loaded at [`BASE`] and the PC pointing at it
pub(super) fn system_with(program: &[u32]) -> System {
    let mut system = System::default();
    system.load_program(BASE, &words(program), BASE).unwrap();
    system
}

// Instruction words used across the tests
pub(super) const NOP: u32 = 0x0000_0000;
/// addiu r2, r2, 1
pub(super) const INC_R2: u32 = 0x2442_0001;
/// j BASE + 4
pub(super) const JUMP_BACK: u32 = 0x0800_4001;
