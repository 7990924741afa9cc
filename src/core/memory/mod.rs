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

//! Memory bus implementation for PlayStation 1 emulator
//!
//! The Bus is the central component for all memory operations in the emulator.
//! It manages address translation, the region table, per-region access costs,
//! and routing of read/write operations to RAM, ROM or a device.
//!
//! # Memory Map
//!
//! | Physical Address Range | Region           | Size   | Access |
//! |------------------------|------------------|--------|--------|
//! | 0x00000000-0x007FFFFF  | RAM (2MB x4)     | 8MB    | R/W    |
//! | 0x1F000000-0x1F7FFFFF  | Expansion 1      | 8MB    | R/W    |
//! | 0x1F800000-0x1F8003FF  | Scratchpad       | 1KB    | R/W    |
//! | 0x1F801000-0x1F801023  | Memory control 1 | 36B    | R/W    |
//! | 0x1F801060-0x1F801063  | Memory control 2 | 4B     | R/W    |
//! | 0x1F801070-0x1F801077  | Interrupt ctrl   | 8B     | R/W    |
//! | 0x1F802000-0x1F80207F  | Expansion 2      | 128B   | R/W    |
//! | 0x1FC00000-0x1FC7FFFF  | BIOS ROM         | 512KB  | R only |
//! | 0xFFFE0130-0xFFFE0133  | Cache control    | 4B     | R/W    |
//!
//! Peripherals are added with [`Bus::map_device`]; everything else is
//! unmapped and produces a bus error.
//!
//! # Example
//!
//! ```
//! use psrx_core::core::memory::Bus;
//!
//! let mut bus = Bus::new();
//!
//! // Write to RAM via KSEG0
//! bus.write32(0x80000000, 0x12345678).unwrap();
//!
//! // Read from same location via different segment (should mirror)
//! assert_eq!(bus.read32(0x00000000).unwrap(), 0x12345678);
//! assert_eq!(bus.read32(0xA0000000).unwrap(), 0x12345678);
//! ```

mod devices;
mod io_device;
mod region;

#[cfg(test)]
mod tests;

pub use devices::{Expansion1, Expansion2, LatchBank};
pub use io_device::IODevice;
pub use region::{translate_address, MemoryRegion, Region, RegionTable};

use crate::core::config::{AccessTiming, MachineConfig, UnmappedPolicy};
use crate::core::error::{EmulatorError, Result};
use crate::core::interrupt::{InterruptController, IrqLines};
use crate::core::save_state::{MemoryState, StateSave};
use region::Handler;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Width of a bus access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessWidth {
    /// 8-bit
    Byte = 1,
    /// 16-bit
    Half = 2,
    /// 32-bit
    Word = 4,
}

impl AccessWidth {
    /// Size in bytes
    #[inline(always)]
    pub fn bytes(self) -> u32 {
        self as u32
    }

    /// Mask covering the low `bytes()` bytes of a word
    #[inline(always)]
    pub fn mask(self) -> u32 {
        match self {
            AccessWidth::Byte => 0xFF,
            AccessWidth::Half => 0xFFFF,
            AccessWidth::Word => 0xFFFF_FFFF,
        }
    }
}

/// Memory bus managing all memory accesses
pub struct Bus {
    /// Main RAM (2MB), mirrored across the first 8MB
    ram: Vec<u8>,

    /// Scratchpad (1KB fast RAM)
    scratchpad: Vec<u8>,

    /// BIOS ROM (512KB)
    bios: Vec<u8>,

    /// Region table (built-in regions + mapped devices)
    regions: RegionTable,

    /// Device handlers, indexed by `Handler::Device`
    devices: Vec<Box<dyn IODevice>>,

    /// Interrupt controller (I_STAT / I_MASK)
    interrupts: InterruptController,

    /// Access costs used for regions mapped later
    timing: AccessTiming,

    /// Unmapped access handling
    unmapped: UnmappedPolicy,

    /// Cycles charged since the last `take_access_cycles`
    access_cycles: u32,
}

impl Bus {
    /// RAM size (2MB)
    pub const RAM_SIZE: usize = 2 * 1024 * 1024;

    /// BIOS size (512KB)
    pub const BIOS_SIZE: usize = 512 * 1024;

    /// Scratchpad size (1KB)
    pub const SCRATCHPAD_SIZE: usize = 1024;

    /// RAM physical base and mirrored window size
    const RAM_START: u32 = 0x0000_0000;
    const RAM_WINDOW: u32 = 8 * 1024 * 1024;

    /// Scratchpad physical base
    const SCRATCHPAD_START: u32 = 0x1F80_0000;

    /// BIOS ROM physical base
    const BIOS_START: u32 = 0x1FC0_0000;

    /// Create a new Bus with the default configuration
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::{Bus, MemoryRegion};
    ///
    /// let bus = Bus::new();
    /// assert_eq!(bus.identify_region(0xBFC00000), MemoryRegion::BIOS);
    /// ```
    pub fn new() -> Self {
        Self::with_config(&MachineConfig::default())
    }

    /// Create a new Bus using the timing and unmapped policy of `config`
    pub fn with_config(config: &MachineConfig) -> Self {
        let timing = config.timing;
        let devices: Vec<Box<dyn IODevice>> = vec![
            Box::new(Expansion1),
            Box::new(LatchBank::memory_control()),
            Box::new(LatchBank::ram_size()),
            Box::new(Expansion2::new()),
            Box::new(LatchBank::cache_control()),
        ];

        let builtin = vec![
            Region::new(Self::RAM_START, Self::RAM_WINDOW, MemoryRegion::RAM, timing.ram, Handler::Ram),
            Region::new(
                Expansion1::BASE,
                Expansion1::SIZE,
                MemoryRegion::Expansion1,
                timing.expansion,
                Handler::Device(0),
            ),
            Region::new(
                Self::SCRATCHPAD_START,
                Self::SCRATCHPAD_SIZE as u32,
                MemoryRegion::Scratchpad,
                timing.scratchpad,
                Handler::Scratchpad,
            ),
            Region::new(
                LatchBank::MEMORY_CONTROL_BASE,
                0x24,
                MemoryRegion::MemoryControl,
                timing.io,
                Handler::Device(1),
            ),
            Region::new(LatchBank::RAM_SIZE_BASE, 4, MemoryRegion::RamSize, timing.io, Handler::Device(2)),
            Region::new(
                InterruptController::BASE,
                InterruptController::SIZE,
                MemoryRegion::Interrupt,
                timing.io,
                Handler::Interrupt,
            ),
            Region::new(
                Expansion2::BASE,
                Expansion2::SIZE,
                MemoryRegion::Expansion2,
                timing.expansion,
                Handler::Device(3),
            ),
            Region::new(
                Self::BIOS_START,
                Self::BIOS_SIZE as u32,
                MemoryRegion::BIOS,
                timing.bios,
                Handler::Bios,
            ),
            Region::new(
                LatchBank::CACHE_CONTROL_BASE,
                4,
                MemoryRegion::CacheControl,
                timing.io,
                Handler::Device(4),
            ),
        ];

        Self {
            ram: vec![0u8; Self::RAM_SIZE],
            scratchpad: vec![0u8; Self::SCRATCHPAD_SIZE],
            bios: vec![0u8; Self::BIOS_SIZE],
            regions: RegionTable::from_sorted(builtin),
            devices,
            interrupts: InterruptController::new(),
            timing,
            unmapped: config.unmapped,
            access_cycles: 0,
        }
    }

    /// Reset the bus to initial state
    ///
    /// Clears RAM and scratchpad to zero, simulating a power-cycle.
    /// BIOS contents and mapped devices are preserved.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.scratchpad.fill(0);
        self.interrupts.reset();
        self.access_cycles = 0;
    }

    /// Map a peripheral into the address space
    ///
    /// The device's [`IODevice::address_range`] gives the physical range.
    /// Accesses are charged the `io` cost of the timing configuration.
    ///
    /// # Errors
    ///
    /// [`EmulatorError::RegionOverlap`] if the range intersects an existing
    /// region, [`EmulatorError::InvalidRegion`] if the range is empty or
    /// spans the whole address space.
    pub fn map_device(&mut self, device: Box<dyn IODevice>) -> Result<()> {
        let (start, end) = device.address_range();
        let size = end
            .checked_sub(start)
            .and_then(|span| span.checked_add(1))
            .ok_or(EmulatorError::InvalidRegion {
                base: start,
                size: 0,
            })?;

        let index = self.devices.len();
        self.regions.insert(Region::new(
            start,
            size,
            MemoryRegion::IO,
            self.timing.io,
            Handler::Device(index),
        ))?;

        log::debug!(
            "Mapped {} at 0x{:08X}-0x{:08X}",
            device.name(),
            start,
            end
        );
        self.devices.push(device);
        Ok(())
    }

    /// Region table
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Interrupt controller
    pub fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    /// Interrupt controller (mutable)
    pub fn interrupts_mut(&mut self) -> &mut InterruptController {
        &mut self.interrupts
    }

    /// Handle for peripherals to drive interrupt lines
    pub fn irq_lines(&self) -> IrqLines {
        self.interrupts.lines()
    }

    /// Drain the cycles charged by accesses since the last call
    #[inline]
    pub fn take_access_cycles(&mut self) -> u32 {
        std::mem::take(&mut self.access_cycles)
    }

    /// Load BIOS from file
    ///
    /// The file must be exactly 512KB in size.
    ///
    /// # Errors
    ///
    /// - [`EmulatorError::BiosNotFound`] if the file cannot be opened
    /// - [`EmulatorError::InvalidBiosSize`] if the size is not 512KB
    pub fn load_bios<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|_| EmulatorError::BiosNotFound(path.display().to_string()))?;

        let metadata = file.metadata()?;

        if metadata.len() != Self::BIOS_SIZE as u64 {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: metadata.len() as usize,
            });
        }

        file.read_exact(&mut self.bios)?;

        log::info!("BIOS loaded from {}", path.display());
        Ok(())
    }

    /// Load a BIOS image from memory
    pub fn load_bios_bytes(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != Self::BIOS_SIZE {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: data.len(),
            });
        }
        self.bios.copy_from_slice(data);
        Ok(())
    }

    /// Copy raw code or data into RAM at `vaddr`
    ///
    /// No cycles are charged.
    ///
    /// # Errors
    ///
    /// [`EmulatorError::ProgramTooLarge`] if the bytes do not fit in the 2MB
    /// of physical RAM starting at `vaddr`.
    pub fn load_program(&mut self, vaddr: u32, data: &[u8]) -> Result<()> {
        let paddr = translate_address(vaddr);
        let start = paddr as usize;
        let fits = paddr < Self::RAM_SIZE as u32 && start + data.len() <= Self::RAM_SIZE;
        if !fits {
            return Err(EmulatorError::ProgramTooLarge {
                address: vaddr,
                size: data.len(),
            });
        }
        self.ram[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Main RAM contents
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Main RAM contents (mutable)
    pub fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }

    /// Identify memory region for an address
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::{Bus, MemoryRegion};
    ///
    /// let bus = Bus::new();
    ///
    /// assert_eq!(bus.identify_region(0x00000000), MemoryRegion::RAM);
    /// assert_eq!(bus.identify_region(0x00600000), MemoryRegion::RAM);
    /// assert_eq!(bus.identify_region(0x1F800000), MemoryRegion::Scratchpad);
    /// assert_eq!(bus.identify_region(0x1F801074), MemoryRegion::Interrupt);
    /// assert_eq!(bus.identify_region(0xBFC00000), MemoryRegion::BIOS);
    /// assert_eq!(bus.identify_region(0xFFFE0130), MemoryRegion::CacheControl);
    /// assert_eq!(bus.identify_region(0x1F801810), MemoryRegion::Unmapped);
    /// ```
    pub fn identify_region(&self, vaddr: u32) -> MemoryRegion {
        self.regions
            .find(translate_address(vaddr))
            .map_or(MemoryRegion::Unmapped, |r| r.kind)
    }

    /// Read `width` bytes at `vaddr`
    ///
    /// The value is zero-extended. The access is charged the region's cost.
    ///
    /// # Errors
    ///
    /// - [`EmulatorError::UnalignedAccess`] if `vaddr` is not aligned to `width`
    /// - [`EmulatorError::BusError`] for an unmapped address under the
    ///   `Exception` policy, [`EmulatorError::UnmappedAccess`] under `Fatal`
    /// - Any error raised by a device handler
    pub fn read(&mut self, vaddr: u32, width: AccessWidth) -> Result<u32> {
        Self::check_alignment(vaddr, width)?;

        let paddr = translate_address(vaddr);
        let Some(region) = self.regions.find(paddr).copied() else {
            return Err(self.unmapped_error(vaddr, width));
        };

        self.access_cycles += region.cycles;
        let offset = paddr - region.base;

        match region.handler {
            Handler::Ram => Ok(read_le(&self.ram, (offset as usize) % Self::RAM_SIZE, width)),
            Handler::Scratchpad => Ok(read_le(&self.scratchpad, offset as usize, width)),
            Handler::Bios => Ok(read_le(&self.bios, offset as usize, width)),
            Handler::Interrupt => self.interrupts.read(offset, width),
            Handler::Device(index) => self.devices[index].read(offset, width),
        }
    }

    /// Write the low `width` bytes of `value` at `vaddr`
    ///
    /// Writes to BIOS ROM are charged but dropped.
    ///
    /// # Errors
    ///
    /// Same as [`Bus::read`].
    pub fn write(&mut self, vaddr: u32, width: AccessWidth, value: u32) -> Result<()> {
        Self::check_alignment(vaddr, width)?;

        let paddr = translate_address(vaddr);
        let Some(region) = self.regions.find(paddr).copied() else {
            return Err(self.unmapped_error(vaddr, width));
        };

        self.access_cycles += region.cycles;
        let offset = paddr - region.base;

        match region.handler {
            Handler::Ram => {
                write_le(&mut self.ram, (offset as usize) % Self::RAM_SIZE, width, value);
                Ok(())
            }
            Handler::Scratchpad => {
                write_le(&mut self.scratchpad, offset as usize, width, value);
                Ok(())
            }
            Handler::Bios => {
                log::trace!("Ignoring write to BIOS ROM at 0x{:08X}", vaddr);
                Ok(())
            }
            Handler::Interrupt => self.interrupts.write(offset, width, value),
            Handler::Device(index) => self.devices[index].write(offset, width, value),
        }
    }

    /// Read 8-bit value from memory
    pub fn read8(&mut self, vaddr: u32) -> Result<u8> {
        Ok(self.read(vaddr, AccessWidth::Byte)? as u8)
    }

    /// Read 16-bit value from memory
    pub fn read16(&mut self, vaddr: u32) -> Result<u16> {
        Ok(self.read(vaddr, AccessWidth::Half)? as u16)
    }

    /// Read 32-bit value from memory
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x80000000, 0x12345678).unwrap();
    /// assert_eq!(bus.read32(0x80000000).unwrap(), 0x12345678);
    ///
    /// // Unaligned access fails
    /// assert!(bus.read32(0x80000001).is_err());
    /// ```
    pub fn read32(&mut self, vaddr: u32) -> Result<u32> {
        self.read(vaddr, AccessWidth::Word)
    }

    /// Write 8-bit value to memory
    pub fn write8(&mut self, vaddr: u32, value: u8) -> Result<()> {
        self.write(vaddr, AccessWidth::Byte, value as u32)
    }

    /// Write 16-bit value to memory
    pub fn write16(&mut self, vaddr: u32, value: u16) -> Result<()> {
        self.write(vaddr, AccessWidth::Half, value as u32)
    }

    /// Write 32-bit value to memory
    pub fn write32(&mut self, vaddr: u32, value: u32) -> Result<()> {
        self.write(vaddr, AccessWidth::Word, value)
    }

    /// Read a word from RAM, scratchpad or BIOS without side effects
    ///
    /// No cycles are charged and devices are never touched, so this is safe to
    /// call from debugging tools between steps. Returns `None` for device
    /// regions, unmapped or unaligned addresses.
    pub fn peek32(&self, vaddr: u32) -> Option<u32> {
        if vaddr & 0x3 != 0 {
            return None;
        }
        let paddr = translate_address(vaddr);
        let region = self.regions.find(paddr)?;
        let offset = (paddr - region.base) as usize;

        match region.handler {
            Handler::Ram => Some(read_le(&self.ram, offset % Self::RAM_SIZE, AccessWidth::Word)),
            Handler::Scratchpad => Some(read_le(&self.scratchpad, offset, AccessWidth::Word)),
            Handler::Bios => Some(read_le(&self.bios, offset, AccessWidth::Word)),
            _ => None,
        }
    }

    #[inline(always)]
    fn check_alignment(vaddr: u32, width: AccessWidth) -> Result<()> {
        if vaddr & (width.bytes() - 1) != 0 {
            return Err(EmulatorError::UnalignedAccess {
                address: vaddr,
                size: width.bytes() as u8,
            });
        }
        Ok(())
    }

    fn unmapped_error(&self, vaddr: u32, width: AccessWidth) -> EmulatorError {
        log::warn!("Unmapped {}-byte access at 0x{:08X}", width.bytes(), vaddr);
        match self.unmapped {
            UnmappedPolicy::Exception => EmulatorError::BusError { address: vaddr },
            UnmappedPolicy::Fatal => EmulatorError::UnmappedAccess {
                address: vaddr,
                width: width.bytes() as u8,
            },
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// RAM and scratchpad contents
///
/// The caller validates buffer sizes before restoring (see
/// [`SaveState::validate`](crate::core::save_state::SaveState::validate)).
impl StateSave for Bus {
    type State = MemoryState;

    fn to_state(&self) -> Self::State {
        MemoryState {
            ram: self.ram.clone(),
            scratchpad: self.scratchpad.clone(),
        }
    }

    fn restore_from_state(&mut self, state: &Self::State) {
        self.ram.copy_from_slice(&state.ram);
        self.scratchpad.copy_from_slice(&state.scratchpad);
        self.access_cycles = 0;
    }
}

#[inline(always)]
fn read_le(buf: &[u8], offset: usize, width: AccessWidth) -> u32 {
    match width {
        AccessWidth::Byte => buf[offset] as u32,
        AccessWidth::Half => u16::from_le_bytes([buf[offset], buf[offset + 1]]) as u32,
        AccessWidth::Word => u32::from_le_bytes([
            buf[offset],
            buf[offset + 1],
            buf[offset + 2],
            buf[offset + 3],
        ]),
    }
}

#[inline(always)]
fn write_le(buf: &mut [u8], offset: usize, width: AccessWidth, value: u32) {
    let n = width.bytes() as usize;
    buf[offset..offset + n].copy_from_slice(&value.to_le_bytes()[..n]);
}
