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

//! Built-in system control devices
//!
//! These live on the bus of every machine regardless of which peripherals the
//! host maps in. None of them do more than the BIOS needs to get through
//! initialization: the memory control registers latch what is written, and
//! the expansion regions report "nothing connected".

use super::{AccessWidth, IODevice};
use crate::core::error::Result;

/// A bank of plain read/write 32-bit registers
///
/// Used for memory control 1 (`0x1F801000`), memory control 2 (RAM size,
/// `0x1F801060`) and cache control (`0xFFFE0130`).
pub struct LatchBank {
    name: &'static str,
    base: u32,
    registers: Vec<u32>,
}

impl LatchBank {
    /// Memory control 1: expansion base addresses and bus delay/size registers
    pub const MEMORY_CONTROL_BASE: u32 = 0x1F80_1000;
    /// Memory control 2: RAM size configuration
    pub const RAM_SIZE_BASE: u32 = 0x1F80_1060;
    /// Cache control register
    pub const CACHE_CONTROL_BASE: u32 = 0xFFFE_0130;

    /// Create a bank of `count` zeroed registers at `base`
    pub fn new(name: &'static str, base: u32, count: usize) -> Self {
        Self {
            name,
            base,
            registers: vec![0; count],
        }
    }

    /// Memory control 1 (9 registers)
    pub fn memory_control() -> Self {
        Self::new("MemoryControl", Self::MEMORY_CONTROL_BASE, 9)
    }

    /// Memory control 2 (1 register)
    pub fn ram_size() -> Self {
        Self::new("RamSize", Self::RAM_SIZE_BASE, 1)
    }

    /// Cache control (1 register)
    pub fn cache_control() -> Self {
        Self::new("CacheControl", Self::CACHE_CONTROL_BASE, 1)
    }

    /// Current register values
    pub fn registers(&self) -> &[u32] {
        &self.registers
    }
}

impl IODevice for LatchBank {
    fn address_range(&self) -> (u32, u32) {
        let size = (self.registers.len() * 4) as u32;
        (self.base, self.base + size - 1)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        Ok(self.registers[(offset / 4) as usize])
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        log::trace!("{}[0x{:02X}] = 0x{:08X}", self.name, offset, value);
        self.registers[(offset / 4) as usize] = value;
        Ok(())
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Expansion region 1 (parallel port)
///
/// With nothing plugged in every read returns all ones and writes are
/// dropped. The BIOS probes this region for a boot ROM header.
pub struct Expansion1;

impl Expansion1 {
    pub const BASE: u32 = 0x1F00_0000;
    pub const SIZE: u32 = 0x0080_0000;
}

impl IODevice for Expansion1 {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE, Self::BASE + Self::SIZE - 1)
    }

    fn read_register(&mut self, _offset: u32) -> Result<u32> {
        Ok(0xFFFF_FFFF)
    }

    fn write_register(&mut self, _offset: u32, _value: u32) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "Expansion1"
    }
}

/// Expansion region 2 (DUART and POST display on dev boards)
///
/// Bytes written to the DUART transmit register are collected into lines
/// and logged; this is where the BIOS and many homebrew programs send their
/// TTY output. Only the unfinished line is kept. Writes to the POST register
/// are logged as boot progress.
pub struct Expansion2 {
    tty_line: String,
    post: u8,
}

impl Expansion2 {
    pub const BASE: u32 = 0x1F80_2000;
    pub const SIZE: u32 = 0x80;

    /// DUART channel A transmit holding register
    const DUART_THR_A: u32 = 0x23;
    /// POST (boot status) 7-segment display
    const POST: u32 = 0x41;
    /// Lines longer than this are logged in pieces
    const TTY_LINE_MAX: usize = 256;

    pub fn new() -> Self {
        Self {
            tty_line: String::new(),
            post: 0,
        }
    }

    /// TTY text written since the last logged line
    pub fn pending_tty(&self) -> &str {
        &self.tty_line
    }

    /// Last POST value written
    pub fn post(&self) -> u8 {
        self.post
    }

    fn push_tty(&mut self, byte: u8) {
        match byte as char {
            '\n' => self.flush_tty(),
            '\r' => {}
            c => {
                self.tty_line.push(c);
                if self.tty_line.len() >= Self::TTY_LINE_MAX {
                    self.flush_tty();
                }
            }
        }
    }

    fn flush_tty(&mut self) {
        log::info!("TTY: {}", self.tty_line);
        self.tty_line.clear();
    }
}

impl Default for Expansion2 {
    fn default() -> Self {
        Self::new()
    }
}

impl IODevice for Expansion2 {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE, Self::BASE + Self::SIZE - 1)
    }

    fn read_register(&mut self, _offset: u32) -> Result<u32> {
        Ok(0)
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        // Registers are byte-wide; a word store hits the lowest byte
        self.write(offset, AccessWidth::Byte, value)
    }

    fn read(&mut self, _offset: u32, _width: AccessWidth) -> Result<u32> {
        Ok(0)
    }

    fn write(&mut self, offset: u32, _width: AccessWidth, value: u32) -> Result<()> {
        match offset {
            Self::DUART_THR_A => self.push_tty(value as u8),
            Self::POST => {
                self.post = value as u8;
                log::debug!("POST: 0x{:02X}", self.post);
            }
            _ => log::trace!("Expansion2[0x{:02X}] = 0x{:02X}", offset, value as u8),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Expansion2"
    }
}
