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

//! I/O device trait for memory-mapped peripherals
//!
//! Every peripheral outside the CPU core (GPU, SPU, DMA, timers, pads, CD-ROM)
//! plugs into the bus through this trait. The bus owns the region table and
//! forwards each access with a region-relative offset and an access width.
//!
//! # Example
//!
//! ```
//! use psrx_core::core::error::Result;
//! use psrx_core::core::memory::{AccessWidth, Bus, IODevice};
//!
//! struct Latch {
//!     value: u32,
//! }
//!
//! impl IODevice for Latch {
//!     fn address_range(&self) -> (u32, u32) {
//!         (0x1F801810, 0x1F801813)
//!     }
//!
//!     fn read_register(&mut self, _offset: u32) -> Result<u32> {
//!         Ok(self.value)
//!     }
//!
//!     fn write_register(&mut self, _offset: u32, value: u32) -> Result<()> {
//!         self.value = value;
//!         Ok(())
//!     }
//! }
//!
//! let mut bus = Bus::new();
//! bus.map_device(Box::new(Latch { value: 0 })).unwrap();
//! bus.write32(0xBF801810, 0xCAFEBABE).unwrap();
//! assert_eq!(bus.read(0x1F801812, AccessWidth::Half).unwrap(), 0xCAFE);
//! ```

use super::AccessWidth;
use crate::core::error::Result;

/// Trait for memory-mapped I/O devices
///
/// Devices implement 32-bit register access; the default [`IODevice::read`]
/// and [`IODevice::write`] derive 8-bit and 16-bit access from it by shifting
/// into (or read-modify-writing) the containing word. Devices whose registers
/// react differently to narrow accesses override those two methods.
///
/// Reads take `&mut self` since reading a hardware register may have side
/// effects (FIFO pops, acknowledge-on-read).
pub trait IODevice {
    /// Physical address range this device responds to, `(start, end)` inclusive
    fn address_range(&self) -> (u32, u32);

    /// Check if this device contains the given physical address
    fn contains(&self, addr: u32) -> bool {
        let (start, end) = self.address_range();
        addr >= start && addr <= end
    }

    /// Read the 32-bit register at a word-aligned offset
    fn read_register(&mut self, offset: u32) -> Result<u32>;

    /// Write the 32-bit register at a word-aligned offset
    fn write_register(&mut self, offset: u32, value: u32) -> Result<()>;

    /// Read `width` bytes at `offset`
    ///
    /// The returned value is zero-extended; sign extension is the CPU's job.
    fn read(&mut self, offset: u32, width: AccessWidth) -> Result<u32> {
        let value = self.read_register(offset & !0x03)?;
        let shift = (offset & 0x03) * 8;
        Ok((value >> shift) & width.mask())
    }

    /// Write the low `width` bytes of `value` at `offset`
    fn write(&mut self, offset: u32, width: AccessWidth, value: u32) -> Result<()> {
        if width == AccessWidth::Word {
            return self.write_register(offset & !0x03, value);
        }

        // Read-modify-write to update only the targeted lanes
        let aligned = offset & !0x03;
        let shift = (offset & 0x03) * 8;
        let mask = width.mask() << shift;
        let current = self.read_register(aligned)?;
        let new_value = (current & !mask) | ((value << shift) & mask);
        self.write_register(aligned, new_value)
    }

    /// Device name for logging
    fn name(&self) -> &str {
        "Unknown Device"
    }
}
