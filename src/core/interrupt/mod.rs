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

//! PSX Interrupt Controller Implementation
//!
//! The interrupt controller collects interrupt requests from all PSX hardware
//! components and exposes a single line to the CPU (COP0 CAUSE bit 10).
//!
//! ## Registers
//!
//! - **I_STAT** (0x1F801070): Interrupt status register (R/W)
//!   - Reading returns current interrupt flags
//!   - Writing 0 to a bit acknowledges that interrupt (clears the bit)
//!   - Writing 1 to a bit has no effect
//!
//! - **I_MASK** (0x1F801074): Interrupt mask register (R/W)
//!   - Controls which interrupts can reach the CPU
//!   - 1 = interrupt enabled, 0 = interrupt masked
//!
//! ## Interrupt Sources (Bit Positions)
//!
//! ```text
//! Bit  | Source        | Description
//! -----|---------------|----------------------------------
//! 0    | VBLANK        | Vertical blank interrupt
//! 1    | GPU           | GPU command/transfer complete
//! 2    | CDROM         | CD-ROM controller
//! 3    | DMA           | DMA transfer complete
//! 4    | TIMER0        | Timer 0 interrupt
//! 5    | TIMER1        | Timer 1 interrupt
//! 6    | TIMER2        | Timer 2 interrupt
//! 7    | CONTROLLER    | Controller/memory card
//! 8    | SIO           | Serial I/O
//! 9    | SPU           | Sound processing unit
//! 10   | LIGHTPEN      | Lightpen/IRQ10 (PIO)
//! 11-15| -             | Not used
//! ```
//!
//! ## Interrupt lines
//!
//! Peripherals do not hold a reference to the controller. They get an
//! [`IrqLines`] handle and assert or deassert numbered lines on it from their
//! own register handlers. A rising edge is latched immediately, but it only
//! reaches I_STAT when the CPU synchronizes at the next instruction boundary.
//!
//! ## References
//!
//! - [PSX-SPX: Interrupt Control](http://problemkaputt.de/psx-spx.htm#interruptcontrol)

use crate::core::error::Result;
use crate::core::memory::{AccessWidth, IODevice};
use crate::core::save_state::{InterruptState, StateSave};
use std::cell::Cell;
use std::rc::Rc;

#[cfg(test)]
mod tests;

/// Interrupt source bit flags
///
/// These constants represent the bit positions in I_STAT and I_MASK registers
/// for each interrupt source.
pub mod interrupts {
    /// Vertical blank interrupt (bit 0)
    pub const VBLANK: u16 = 1 << 0;

    /// GPU command/transfer complete interrupt (bit 1)
    pub const GPU: u16 = 1 << 1;

    /// CD-ROM controller interrupt (bit 2)
    pub const CDROM: u16 = 1 << 2;

    /// DMA transfer complete interrupt (bit 3)
    pub const DMA: u16 = 1 << 3;

    /// Timer 0 interrupt (bit 4)
    pub const TIMER0: u16 = 1 << 4;

    /// Timer 1 interrupt (bit 5)
    pub const TIMER1: u16 = 1 << 5;

    /// Timer 2 interrupt (bit 6)
    pub const TIMER2: u16 = 1 << 6;

    /// Controller/memory card interrupt (bit 7)
    pub const CONTROLLER: u16 = 1 << 7;

    /// Serial I/O interrupt (bit 8)
    pub const SIO: u16 = 1 << 8;

    /// Sound processing unit interrupt (bit 9)
    pub const SPU: u16 = 1 << 9;

    /// Lightpen/IRQ10 (PIO) interrupt (bit 10)
    pub const LIGHTPEN: u16 = 1 << 10;

    /// All implemented sources
    pub const ALL: u16 = 0x07FF;
}

/// Number of interrupt lines
pub const IRQ_LINE_COUNT: u8 = 11;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LineState {
    /// Current level of each line
    level: u16,
    /// Rising edges not yet seen by the controller
    edges: u16,
}

/// Shared handle peripherals use to drive interrupt lines
///
/// Cloning the handle is cheap; all clones drive the same lines.
///
/// # Example
///
/// ```
/// use psrx_core::core::interrupt::{interrupts, InterruptController};
///
/// let mut ic = InterruptController::new();
/// let lines = ic.lines();
///
/// lines.assert_line(0);
/// assert_eq!(ic.read_status(), 0); // not observed until the next sync
///
/// ic.sync();
/// assert_eq!(ic.read_status(), interrupts::VBLANK as u32);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IrqLines {
    state: Rc<Cell<LineState>>,
}

impl IrqLines {
    /// Drive a line high
    ///
    /// Only a low-to-high transition requests an interrupt; asserting a line
    /// that is already high does nothing.
    pub fn assert_line(&self, line: u8) {
        let bit = Self::bit(line);
        let mut state = self.state.get();
        if state.level & bit == 0 {
            state.edges |= bit;
        }
        state.level |= bit;
        self.state.set(state);
    }

    /// Drive a line low
    pub fn deassert_line(&self, line: u8) {
        let mut state = self.state.get();
        state.level &= !Self::bit(line);
        self.state.set(state);
    }

    /// Pulse a line (assert then deassert)
    pub fn pulse(&self, line: u8) {
        self.assert_line(line);
        self.deassert_line(line);
    }

    /// Current level of all lines
    pub fn levels(&self) -> u16 {
        self.state.get().level
    }

    fn take_edges(&self) -> u16 {
        let mut state = self.state.get();
        let edges = state.edges;
        state.edges = 0;
        self.state.set(state);
        edges
    }

    #[inline(always)]
    fn bit(line: u8) -> u16 {
        if line >= IRQ_LINE_COUNT {
            log::warn!("Ignoring invalid IRQ line {}", line);
            return 0;
        }
        1 << line
    }
}

/// PlayStation Interrupt Controller
///
/// Manages interrupt requests from all hardware components and determines
/// which interrupts reach the CPU based on the mask register.
///
/// # Example
///
/// ```
/// use psrx_core::core::interrupt::{InterruptController, interrupts};
///
/// let mut ic = InterruptController::new();
///
/// // Request VBLANK interrupt
/// ic.request(interrupts::VBLANK);
///
/// // Enable VBLANK interrupts
/// ic.write_mask(interrupts::VBLANK as u32);
///
/// // Check if any interrupt is pending
/// assert!(ic.is_pending());
///
/// // Acknowledge the interrupt (write 0 to its bit)
/// ic.write_status(!interrupts::VBLANK as u32);
/// assert!(!ic.is_pending());
/// ```
#[derive(Debug, Default)]
pub struct InterruptController {
    /// I_STAT (0x1F801070) - Interrupt status register
    status: u16,

    /// I_MASK (0x1F801074) - Interrupt mask register
    mask: u16,

    /// Lines driven by peripherals
    lines: IrqLines,
}

impl InterruptController {
    /// Physical base address
    pub const BASE: u32 = 0x1F80_1070;
    /// Register block size in bytes
    pub const SIZE: u32 = 8;

    const I_STAT: u32 = 0x0;
    const I_MASK: u32 = 0x4;

    /// Create a new interrupt controller
    ///
    /// Initializes with all interrupts cleared and masked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear I_STAT, I_MASK and unseen edges
    ///
    /// Handles returned by [`lines`](Self::lines) stay connected.
    pub fn reset(&mut self) {
        self.status = 0;
        self.mask = 0;
        self.lines.take_edges();
    }

    /// Handle for peripherals to drive interrupt lines
    pub fn lines(&self) -> IrqLines {
        self.lines.clone()
    }

    /// Request an interrupt
    ///
    /// Sets the specified interrupt bit(s) in the status register directly.
    ///
    /// # Arguments
    ///
    /// * `interrupt` - Interrupt bit(s) to set (can be multiple ORed together)
    pub fn request(&mut self, interrupt: u16) {
        self.status |= interrupt & interrupts::ALL;
        log::trace!(
            "IRQ requested: 0x{:04X}, status=0x{:04X}",
            interrupt,
            self.status
        );
    }

    /// Latch rising edges seen on the interrupt lines into I_STAT
    ///
    /// Called once per instruction boundary.
    pub fn sync(&mut self) {
        let edges = self.lines.take_edges();
        if edges != 0 {
            self.request(edges);
        }
    }

    /// Check whether any unmasked interrupt is pending
    #[inline]
    pub fn is_pending(&self) -> bool {
        (self.status & self.mask) != 0
    }

    /// Read I_STAT
    pub fn read_status(&self) -> u32 {
        self.status as u32
    }

    /// Write I_STAT
    ///
    /// Bits written as 0 are acknowledged, bits written as 1 are kept.
    pub fn write_status(&mut self, value: u32) {
        self.status &= value as u16;
        log::trace!("IRQ acknowledged, status=0x{:04X}", self.status);
    }

    /// Read I_MASK
    pub fn read_mask(&self) -> u32 {
        self.mask as u32
    }

    /// Write I_MASK
    pub fn write_mask(&mut self, value: u32) {
        self.mask = value as u16 & interrupts::ALL;
        log::debug!("IRQ mask set: 0x{:04X}", self.mask);
    }
}

impl IODevice for InterruptController {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE, Self::BASE + Self::SIZE - 1)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        Ok(match offset {
            Self::I_STAT => self.read_status(),
            Self::I_MASK => self.read_mask(),
            _ => 0,
        })
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        match offset {
            Self::I_STAT => self.write_status(value),
            Self::I_MASK => self.write_mask(value),
            _ => {}
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, width: AccessWidth, value: u32) -> Result<()> {
        // Narrow writes only touch the addressed lanes; the untouched lanes of
        // I_STAT must read as 1 so they are not acknowledged.
        let shift = (offset & 0x03) * 8;
        let lanes = width.mask() << shift;
        let aligned = offset & !0x03;
        match aligned {
            Self::I_STAT => self.write_status((value << shift) | !lanes),
            Self::I_MASK => {
                let merged = (self.read_mask() & !lanes) | ((value << shift) & lanes);
                self.write_mask(merged);
            }
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "InterruptController"
    }
}

impl StateSave for InterruptController {
    type State = InterruptState;

    fn to_state(&self) -> Self::State {
        let lines = self.lines.state.get();
        InterruptState {
            i_stat: self.status as u32,
            i_mask: self.mask as u32,
            line_levels: lines.level,
            line_edges: lines.edges,
        }
    }

    fn restore_from_state(&mut self, state: &Self::State) {
        self.status = state.i_stat as u16 & interrupts::ALL;
        self.mask = state.i_mask as u16 & interrupts::ALL;
        self.lines.state.set(LineState {
            level: state.line_levels,
            edges: state.line_edges,
        });
    }
}
