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

//! Basic system functionality tests

use super::super::*;
use super::{system_with, words, BASE, INC_R2, NOP};
use crate::core::config::{AccessTiming, UnmappedPolicy};

#[test]
fn test_system_initialization() {
    let system = System::default();
    assert_eq!(system.cycles(), 0);
    assert_eq!(system.pc(), 0xBFC00000);
    assert!(!system.is_tracing());
}

#[test]
fn test_config_is_kept() {
    let config = MachineConfig {
        timing: AccessTiming {
            ram: 9,
            ..AccessTiming::default()
        },
        unmapped: UnmappedPolicy::Fatal,
        ..MachineConfig::default()
    };
    let mut system = System::new(config.clone());
    assert_eq!(system.config(), &config);

    system.load_program(BASE, &words(&[NOP]), BASE).unwrap();
    assert_eq!(system.step().unwrap(), 9);
}

#[test]
fn test_kernel_logger_installed_by_config() {
    let config = MachineConfig {
        trace_kernel_calls: true,
        ..MachineConfig::default()
    };
    let mut system = System::new(config);
    assert!(system.cpu_mut().take_kernel_hook().is_some());

    let mut plain = System::default();
    assert!(plain.cpu_mut().take_kernel_hook().is_none());
}

#[test]
fn test_load_program_sets_entry() {
    let system = system_with(&[INC_R2]);
    assert_eq!(system.pc(), BASE);
    assert_eq!(system.bus().peek32(BASE), Some(INC_R2));
}

#[test]
fn test_load_program_outside_ram_fails() {
    let mut system = System::default();
    assert!(system.load_program(0xBFC0_0000, &words(&[NOP]), 0xBFC0_0000).is_err());
}

#[test]
fn test_load_bios_bytes() {
    let mut system = System::default();
    let mut bios = vec![0u8; Bus::BIOS_SIZE];
    bios[..4].copy_from_slice(&INC_R2.to_le_bytes());
    system.load_bios_bytes(&bios).unwrap();

    system.step().unwrap();
    assert_eq!(system.cpu().reg(2), 1);

    assert!(system.load_bios_bytes(&[0u8; 16]).is_err());
}

#[test]
fn test_system_reset() {
    let mut system = system_with(&[INC_R2, INC_R2]);
    system.run(2).unwrap();
    assert!(system.cycles() > 0);

    system.reset();
    assert_eq!(system.cycles(), 0);
    assert_eq!(system.pc(), 0xBFC00000);
    assert_eq!(system.cpu().reg(2), 0);
    assert_eq!(system.bus().peek32(BASE), Some(0), "RAM is cleared");
}

#[test]
fn test_systems_are_independent() {
    let mut a = system_with(&[INC_R2]);
    let b = system_with(&[INC_R2]);

    a.step().unwrap();
    a.bus_mut().write32(BASE + 0x100, 7).unwrap();

    assert_eq!(a.cpu().reg(2), 1);
    assert_eq!(b.cpu().reg(2), 0);
    assert_eq!(b.bus().peek32(BASE + 0x100), Some(0));
}
