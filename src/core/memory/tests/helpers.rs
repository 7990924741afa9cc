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

//! Test helpers for memory tests

use super::super::*;

/// Device with a few word registers that counts its accesses
pub struct CountingDevice {
    pub base: u32,
    pub registers: [u32; 4],
    pub reads: usize,
    pub writes: usize,
}

impl CountingDevice {
    pub fn at(base: u32) -> Self {
        Self {
            base,
            registers: [0; 4],
            reads: 0,
            writes: 0,
        }
    }
}

impl IODevice for CountingDevice {
    fn address_range(&self) -> (u32, u32) {
        (self.base, self.base + 0x0F)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        self.reads += 1;
        Ok(self.registers[(offset / 4) as usize])
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        self.writes += 1;
        self.registers[(offset / 4) as usize] = value;
        Ok(())
    }

    fn name(&self) -> &str {
        "CountingDevice"
    }
}

/// Device whose handlers always fail
pub struct FailingDevice;

impl IODevice for FailingDevice {
    fn address_range(&self) -> (u32, u32) {
        (0x1F80_1100, 0x1F80_112F)
    }

    fn read_register(&mut self, _offset: u32) -> Result<u32> {
        Err(EmulatorError::Device {
            name: "timer".to_string(),
            reason: "counter mode not supported".to_string(),
        })
    }

    fn write_register(&mut self, _offset: u32, _value: u32) -> Result<()> {
        Ok(())
    }
}

/// Device reporting an arbitrary, possibly malformed, address range
pub struct RangeDevice(pub u32, pub u32);

impl IODevice for RangeDevice {
    fn address_range(&self) -> (u32, u32) {
        (self.0, self.1)
    }

    fn read_register(&mut self, _offset: u32) -> Result<u32> {
        Ok(0)
    }

    fn write_register(&mut self, _offset: u32, _value: u32) -> Result<()> {
        Ok(())
    }
}

/// Bus with a recognizable BIOS image (word i holds i)
pub fn create_bus_with_bios_data() -> Bus {
    let mut bus = Bus::new();
    let image: Vec<u8> = (0..Bus::BIOS_SIZE as u32 / 4)
        .flat_map(|i| i.to_le_bytes())
        .collect();
    bus.load_bios_bytes(&image).unwrap();
    bus
}
