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

use super::super::decode::Instruction;
use super::super::CPU;
use crate::core::error::Result;
use crate::core::memory::{AccessWidth, Bus};

impl CPU {
    // === Load Instructions ===

    /// Effective address: rs + sign_extend(offset)
    #[inline(always)]
    pub(in crate::core::cpu) fn effective_address(&self, instr: Instruction) -> u32 {
        self.reg(instr.rs()).wrapping_add(instr.imm_se())
    }

    /// LB: Load Byte (sign-extended)
    ///
    /// Format: lb rt, offset(rs)
    pub(in crate::core::cpu) fn op_lb(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if let Some(value) = self.load(bus, addr, AccessWidth::Byte)? {
            self.set_reg_delayed(instr.rt(), value as u8 as i8 as u32);
        }
        Ok(())
    }

    /// LBU: Load Byte Unsigned
    ///
    /// Format: lbu rt, offset(rs)
    pub(in crate::core::cpu) fn op_lbu(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if let Some(value) = self.load(bus, addr, AccessWidth::Byte)? {
            self.set_reg_delayed(instr.rt(), value);
        }
        Ok(())
    }

    /// LH: Load Halfword (sign-extended)
    ///
    /// The address must be 2-byte aligned; otherwise AddressErrorLoad is
    /// raised before the bus is touched.
    ///
    /// Format: lh rt, offset(rs)
    pub(in crate::core::cpu) fn op_lh(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if let Some(value) = self.load(bus, addr, AccessWidth::Half)? {
            self.set_reg_delayed(instr.rt(), value as u16 as i16 as u32);
        }
        Ok(())
    }

    /// LHU: Load Halfword Unsigned
    ///
    /// Format: lhu rt, offset(rs)
    pub(in crate::core::cpu) fn op_lhu(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if let Some(value) = self.load(bus, addr, AccessWidth::Half)? {
            self.set_reg_delayed(instr.rt(), value);
        }
        Ok(())
    }

    /// LW: Load Word
    ///
    /// The result is visible after the next instruction (load delay slot).
    ///
    /// Format: lw rt, offset(rs)
    pub(in crate::core::cpu) fn op_lw(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if let Some(value) = self.load(bus, addr, AccessWidth::Word)? {
            self.set_reg_delayed(instr.rt(), value);
        }
        Ok(())
    }

    /// LWL: Load Word Left
    ///
    /// Merges the most significant bytes of an unaligned word into rt.
    /// Paired with LWR to load from any address. The merge sees a load to rt
    /// still in flight from the previous instruction.
    ///
    /// Format: lwl rt, offset(rs)
    pub(in crate::core::cpu) fn op_lwl(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let current = self.reg_bypassed(instr.rt());

        let Some(word) = self.load(bus, addr & !0x3, AccessWidth::Word)? else {
            return Ok(());
        };

        let value = match addr & 0x3 {
            0 => (current & 0x00FF_FFFF) | (word << 24),
            1 => (current & 0x0000_FFFF) | (word << 16),
            2 => (current & 0x0000_00FF) | (word << 8),
            _ => word,
        };
        self.set_reg_delayed(instr.rt(), value);
        Ok(())
    }

    /// LWR: Load Word Right
    ///
    /// Merges the least significant bytes of an unaligned word into rt.
    ///
    /// Format: lwr rt, offset(rs)
    pub(in crate::core::cpu) fn op_lwr(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let current = self.reg_bypassed(instr.rt());

        let Some(word) = self.load(bus, addr & !0x3, AccessWidth::Word)? else {
            return Ok(());
        };

        let value = match addr & 0x3 {
            0 => word,
            1 => (current & 0xFF00_0000) | (word >> 8),
            2 => (current & 0xFFFF_0000) | (word >> 16),
            _ => (current & 0xFFFF_FF00) | (word >> 24),
        };
        self.set_reg_delayed(instr.rt(), value);
        Ok(())
    }
}
