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

//! Interrupt controller integration tests

use super::super::*;
use super::{system_with, BASE, NOP};
use crate::core::error::Result;
use crate::core::interrupt::{interrupts, IrqLines};

/// SR with IEc and the hardware interrupt mask bit set, BEV clear
const SR_IRQ_ENABLED: u32 = 0x0000_0401;
const RAM_VECTOR: u32 = 0x8000_0080;

/// Pulses TIMER0 on every write
struct Pulser {
    lines: IrqLines,
}

impl IODevice for Pulser {
    fn address_range(&self) -> (u32, u32) {
        (0x1F80_1800, 0x1F80_1803)
    }

    fn read_register(&mut self, _offset: u32) -> Result<u32> {
        Ok(0)
    }

    fn write_register(&mut self, _offset: u32, _value: u32) -> Result<()> {
        self.lines.pulse(4);
        Ok(())
    }
}

#[test]
fn test_interrupt_controller_registers() {
    let mut system = System::default();

    system.bus_mut().write32(0x1F801074, 0x00FF).unwrap();
    assert_eq!(system.bus_mut().read32(0x1F801074).unwrap(), 0x00FF);
    assert_eq!(system.bus_mut().read32(0x1F801070).unwrap(), 0);
}

#[test]
fn test_device_interrupt_reaches_cpu() {
    // lui r1, 0x1F80; ori r1, r1, 0x1800; sw r0, 0(r1); nop
    let mut system = system_with(&[0x3C01_1F80, 0x3421_1800, 0xAC20_0000, NOP]);
    let lines = system.irq_lines();
    system.map_device(Box::new(Pulser { lines })).unwrap();
    system
        .bus_mut()
        .interrupts_mut()
        .write_mask(interrupts::TIMER0 as u32);
    system.cpu_mut().set_cop0_reg(12, SR_IRQ_ENABLED);

    system.run(3).unwrap();

    assert_eq!(system.pc(), RAM_VECTOR);
    assert_eq!(system.cpu().cop0_reg(14), BASE + 12);
    let cause = system.cpu().cop0_reg(13);
    assert_eq!((cause >> 2) & 0x1F, 0);
    assert_ne!(cause & (1 << 10), 0);
    assert_eq!(
        system.bus().interrupts().read_status(),
        interrupts::TIMER0 as u32
    );
}

#[test]
fn test_masked_interrupt_only_latches() {
    let mut system = system_with(&[NOP, NOP]);
    system.cpu_mut().set_cop0_reg(12, SR_IRQ_ENABLED);
    system.irq_lines().assert_line(0);

    system.step().unwrap();
    assert_eq!(system.pc(), BASE + 4);
    assert_eq!(
        system.bus().interrupts().read_status(),
        interrupts::VBLANK as u32
    );

    system
        .bus_mut()
        .interrupts_mut()
        .write_mask(interrupts::VBLANK as u32);
    system.step().unwrap();
    assert_eq!(system.pc(), RAM_VECTOR);
}

#[test]
fn test_acknowledge_clears_pending() {
    let mut system = system_with(&[NOP, NOP]);
    system
        .bus_mut()
        .interrupts_mut()
        .write_mask(interrupts::VBLANK as u32);
    system.irq_lines().pulse(0);
    system.step().unwrap();
    assert!(system.bus().interrupts().is_pending());

    system
        .bus_mut()
        .write32(0x1F801070, !(interrupts::VBLANK as u32))
        .unwrap();
    assert!(!system.bus().interrupts().is_pending());

    system.cpu_mut().set_cop0_reg(12, SR_IRQ_ENABLED);
    system.step().unwrap();
    assert_eq!(system.pc(), BASE + 8);
}

#[test]
fn test_lines_survive_reset() {
    let mut system = System::default();
    let lines = system.irq_lines();
    system.reset();

    lines.assert_line(2);
    system.bus_mut().interrupts_mut().sync();
    assert_eq!(
        system.bus().interrupts().read_status(),
        interrupts::CDROM as u32
    );
}
