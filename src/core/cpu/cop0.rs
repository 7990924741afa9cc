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

//! Coprocessor 0 (System Control Unit)
//!
//! Holds the privileged register set, applies the per-register write masks
//! and implements the kernel/user mode stack shifted on exception entry and
//! return.

use bitflags::bitflags;

bitflags! {
    /// Status register (SR, cop0r12) bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u32 {
        /// Interrupt enable (current)
        const IEC = 1 << 0;
        /// User mode (current)
        const KUC = 1 << 1;
        /// Interrupt enable (previous)
        const IEP = 1 << 2;
        /// User mode (previous)
        const KUP = 1 << 3;
        /// Interrupt enable (old)
        const IEO = 1 << 4;
        /// User mode (old)
        const KUO = 1 << 5;
        /// Software interrupt mask bits
        const IM_SW = 0b11 << 8;
        /// Hardware interrupt mask bit (the interrupt controller line)
        const IM_HW = 1 << 10;
        /// Isolate cache (stores do not reach memory)
        const ISC = 1 << 16;
        /// Boot exception vectors in ROM
        const BEV = 1 << 22;
        /// COP0 usable in user mode
        const CU0 = 1 << 28;
        /// COP2 (GTE) usable
        const CU2 = 1 << 30;
    }
}

/// Exception codes written to CAUSE bits 2-6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExceptionCause {
    /// Interrupt (external or internal)
    Interrupt = 0,
    /// Address error on load or instruction fetch
    AddressErrorLoad = 4,
    /// Address error on store
    AddressErrorStore = 5,
    /// Bus error on instruction fetch
    BusErrorInstruction = 6,
    /// Bus error on data access
    BusErrorData = 7,
    /// Syscall instruction executed
    Syscall = 8,
    /// Breakpoint instruction executed
    Breakpoint = 9,
    /// Reserved or illegal instruction
    ReservedInstruction = 10,
    /// Coprocessor unusable
    CoprocessorUnusable = 11,
    /// Arithmetic overflow
    Overflow = 12,
}

/// Coprocessor 0 register file
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct COP0 {
    /// cop0r0-r15; r16-r31 do not exist on the R3000A
    pub(super) regs: [u32; 16],
}

impl COP0 {
    /// Breakpoint PC
    pub const BPC: usize = 3;
    /// Breakpoint Data Address
    pub const BDA: usize = 5;
    /// Last jump target (read-only)
    pub const JUMPDEST: usize = 6;
    /// Breakpoint control
    pub const DCIC: usize = 7;
    /// Bad Virtual Address
    pub const BADA: usize = 8;
    /// Data Address Mask
    pub const BDAM: usize = 9;
    /// PC Mask
    pub const BPCM: usize = 11;
    /// Status Register
    pub const SR: usize = 12;
    /// Cause Register
    pub const CAUSE: usize = 13;
    /// Exception PC
    pub const EPC: usize = 14;
    /// Processor ID
    pub const PRID: usize = 15;

    /// Number of implemented registers
    pub const COUNT: usize = 16;

    /// SR after reset: BEV set, kernel mode, interrupts disabled
    const SR_RESET: u32 = 0x1040_0000;
    /// R3000A processor ID
    const PRID_VALUE: u32 = 0x0000_0002;

    /// Writable SR bits (CM, PE and TS are status outputs)
    const SR_WRITE_MASK: u32 = 0xF247_FF3F;
    /// Only the software interrupt bits of CAUSE are writable
    const CAUSE_WRITE_MASK: u32 = 0x0000_0300;

    /// Hardware interrupt pending bit (IP2) in CAUSE
    const CAUSE_IP_HW: u32 = 1 << 10;
    /// Branch delay bit in CAUSE
    const CAUSE_BD: u32 = 1 << 31;

    /// Create a new COP0 instance with reset values
    pub(super) fn new() -> Self {
        let mut regs = [0u32; Self::COUNT];
        regs[Self::SR] = Self::SR_RESET;
        regs[Self::PRID] = Self::PRID_VALUE;

        Self { regs }
    }

    /// Read a register; `None` for indices that do not exist
    pub(super) fn read(&self, index: usize) -> Option<u32> {
        self.regs.get(index).copied()
    }

    /// Write a register through its write mask
    ///
    /// Returns `false` for indices that do not exist.
    pub(super) fn write(&mut self, index: usize, value: u32) -> bool {
        let mask = match index {
            Self::BPC | Self::BDA | Self::DCIC | Self::BDAM | Self::BPCM => 0xFFFF_FFFF,
            Self::SR => Self::SR_WRITE_MASK,
            Self::CAUSE => Self::CAUSE_WRITE_MASK,
            Self::BADA | Self::EPC | Self::PRID | Self::JUMPDEST => 0,
            // Unnamed slots read back whatever reset left there
            0..Self::COUNT => 0,
            _ => return false,
        };
        let reg = &mut self.regs[index];
        *reg = (*reg & !mask) | (value & mask);
        true
    }

    #[inline(always)]
    pub(super) fn status(&self) -> Status {
        Status::from_bits_retain(self.regs[Self::SR])
    }

    /// Running in user mode (KUc set)
    #[inline(always)]
    pub(super) fn user_mode(&self) -> bool {
        self.status().contains(Status::KUC)
    }

    /// Stores do not reach the bus while the cache is isolated
    #[inline(always)]
    pub(super) fn cache_isolated(&self) -> bool {
        self.status().contains(Status::ISC)
    }

    /// Exception vector selected by SR.BEV
    pub(super) fn exception_vector(&self) -> u32 {
        if self.status().contains(Status::BEV) {
            0xBFC0_0180
        } else {
            0x8000_0080
        }
    }

    /// Mirror the interrupt controller output into CAUSE.IP2
    #[inline(always)]
    pub(super) fn set_hardware_interrupt(&mut self, pending: bool) {
        if pending {
            self.regs[Self::CAUSE] |= Self::CAUSE_IP_HW;
        } else {
            self.regs[Self::CAUSE] &= !Self::CAUSE_IP_HW;
        }
    }

    /// IEc set and at least one unmasked CAUSE.IP bit
    #[inline(always)]
    pub(super) fn interrupt_pending(&self) -> bool {
        let sr = self.regs[Self::SR];
        let ip = self.regs[Self::CAUSE] & 0xFF00;
        sr & Status::IEC.bits() != 0 && ip & sr & 0xFF00 != 0
    }

    /// Record an exception and push the mode stack
    ///
    /// Returns the address of the handler.
    pub(super) fn enter_exception(
        &mut self,
        cause: ExceptionCause,
        epc: u32,
        in_delay_slot: bool,
        coprocessor: u32,
    ) -> u32 {
        let sr = self.regs[Self::SR];
        let mode = sr & 0x3F;
        // Shift (KU, IE) pairs: current -> previous -> old, then kernel with
        // interrupts disabled.
        self.regs[Self::SR] = (sr & !0x3F) | ((mode << 2) & 0x3F);

        let mut cause_reg = self.regs[Self::CAUSE] & !(0x7C | 0x3000_0000 | Self::CAUSE_BD);
        cause_reg |= (cause as u32) << 2;
        cause_reg |= (coprocessor & 0x3) << 28;
        if in_delay_slot {
            cause_reg |= Self::CAUSE_BD;
        }
        self.regs[Self::CAUSE] = cause_reg;
        self.regs[Self::EPC] = epc;

        self.exception_vector()
    }

    /// Pop the mode stack (RFE)
    ///
    /// The old pair is left in place.
    pub(super) fn return_from_exception(&mut self) {
        let sr = self.regs[Self::SR];
        self.regs[Self::SR] = (sr & !0xF) | ((sr >> 2) & 0xF);
    }
}
