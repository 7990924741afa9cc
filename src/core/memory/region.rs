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

//! Memory region table and address translation
//!
//! The PlayStation 1 uses MIPS memory segments that mirror the physical
//! address space. After translation, each physical address resolves to at
//! most one entry of the [`RegionTable`].

use crate::core::error::{EmulatorError, Result};

/// Memory region identification
///
/// Used to identify which memory region an address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegion {
    /// Main RAM (2MB, mirrored four times)
    RAM,
    /// Expansion region 1 (parallel port)
    Expansion1,
    /// Scratchpad (1KB)
    Scratchpad,
    /// Memory control 1 (bus delay/size registers)
    MemoryControl,
    /// Memory control 2 (RAM size)
    RamSize,
    /// Interrupt controller (I_STAT / I_MASK)
    Interrupt,
    /// Expansion region 2 (DUART / POST)
    Expansion2,
    /// BIOS ROM
    BIOS,
    /// Cache control register (KSEG2)
    CacheControl,
    /// Peripheral mapped with [`Bus::map_device`](super::Bus::map_device)
    IO,
    /// No region contains the address
    Unmapped,
}

/// Where accesses to a region are routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Handler {
    Ram,
    Scratchpad,
    Bios,
    Interrupt,
    Device(usize),
}

/// One region table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Physical base address
    pub base: u32,
    /// Size in bytes
    pub size: u32,
    /// Region kind
    pub kind: MemoryRegion,
    /// Fixed access cost in CPU cycles
    pub cycles: u32,
    pub(super) handler: Handler,
}

impl Region {
    pub(super) fn new(base: u32, size: u32, kind: MemoryRegion, cycles: u32, handler: Handler) -> Self {
        Self {
            base,
            size,
            kind,
            cycles,
            handler,
        }
    }

    /// Last physical address covered by the region
    #[inline(always)]
    pub fn end(&self) -> u32 {
        self.base + (self.size - 1)
    }

    /// Check whether `paddr` falls inside the region
    #[inline(always)]
    pub fn contains(&self, paddr: u32) -> bool {
        paddr >= self.base && paddr - self.base < self.size
    }

    fn overlaps(&self, other: &Region) -> bool {
        self.base <= other.end() && other.base <= self.end()
    }
}

/// Ordered set of non-overlapping regions
///
/// Entries are kept sorted by base address so lookup is a binary search.
#[derive(Debug, Default, Clone)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from entries already sorted by base and disjoint
    pub(super) fn from_sorted(regions: Vec<Region>) -> Self {
        debug_assert!(regions.windows(2).all(|w| w[0].end() < w[1].base));
        Self { regions }
    }

    /// Insert a region
    ///
    /// # Errors
    ///
    /// - [`EmulatorError::InvalidRegion`] for an empty region or one that wraps
    ///   past the end of the address space
    /// - [`EmulatorError::RegionOverlap`] if it intersects an existing entry
    pub(super) fn insert(&mut self, region: Region) -> Result<()> {
        if region.size == 0 || region.base.checked_add(region.size - 1).is_none() {
            return Err(EmulatorError::InvalidRegion {
                base: region.base,
                size: region.size,
            });
        }

        if self.regions.iter().any(|r| r.overlaps(&region)) {
            return Err(EmulatorError::RegionOverlap {
                base: region.base,
                size: region.size,
            });
        }

        let index = self.regions.partition_point(|r| r.base < region.base);
        self.regions.insert(index, region);
        Ok(())
    }

    /// Find the region containing a physical address
    #[inline]
    pub fn find(&self, paddr: u32) -> Option<&Region> {
        // Index of the first region starting after `paddr`; the candidate is
        // the one just before it.
        let index = self.regions.partition_point(|r| r.base <= paddr);
        let region = self.regions.get(index.checked_sub(1)?)?;
        region.contains(paddr).then_some(region)
    }

    /// Iterate over all regions in address order
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the table has no regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Per-segment masks indexed by the top three address bits
///
/// KUSEG passes through, KSEG0 and KSEG1 strip the segment bits, KSEG2 passes
/// through (only the cache control register lives there).
const SEGMENT_MASK: [u32; 8] = [
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0x7FFF_FFFF,
    0x1FFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
];

/// Translate virtual address to physical address
///
/// - 0x00001234 (KUSEG) → 0x00001234
/// - 0x80001234 (KSEG0) → 0x00001234
/// - 0xA0001234 (KSEG1) → 0x00001234
/// - 0xFFFE0130 (KSEG2) → 0xFFFE0130
#[inline(always)]
pub fn translate_address(vaddr: u32) -> u32 {
    vaddr & SEGMENT_MASK[(vaddr >> 29) as usize]
}
