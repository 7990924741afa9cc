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
use super::super::{ExceptionCause, CPU};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::{AccessWidth, Bus};

impl CPU {
    // === Store Instructions ===

    /// SB: Store Byte
    ///
    /// Format: sb rt, offset(rs)
    pub(in crate::core::cpu) fn op_sb(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let value = self.reg(instr.rt()) & 0xFF;
        self.store(bus, addr, AccessWidth::Byte, value)
    }

    /// SH: Store Halfword
    ///
    /// The address must be 2-byte aligned.
    ///
    /// Format: sh rt, offset(rs)
    pub(in crate::core::cpu) fn op_sh(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let value = self.reg(instr.rt()) & 0xFFFF;
        self.store(bus, addr, AccessWidth::Half, value)
    }

    /// SW: Store Word
    ///
    /// Format: sw rt, offset(rs)
    pub(in crate::core::cpu) fn op_sw(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let value = self.reg(instr.rt());
        self.store(bus, addr, AccessWidth::Word, value)
    }

    /// SWL: Store Word Left
    ///
    /// Writes the most significant bytes of rt to an unaligned address by
    /// read-modify-writing the enclosing aligned word.
    ///
    /// Format: swl rt, offset(rs)
    pub(in crate::core::cpu) fn op_swl(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let aligned = addr & !0x3;
        let value = self.reg(instr.rt());

        let Some(memory) = self.read_for_merge(bus, aligned)? else {
            return Ok(());
        };

        let merged = match addr & 0x3 {
            0 => (memory & 0xFFFF_FF00) | (value >> 24),
            1 => (memory & 0xFFFF_0000) | (value >> 16),
            2 => (memory & 0xFF00_0000) | (value >> 8),
            _ => value,
        };
        self.store(bus, aligned, AccessWidth::Word, merged)
    }

    /// SWR: Store Word Right
    ///
    /// Writes the least significant bytes of rt to an unaligned address.
    ///
    /// Format: swr rt, offset(rs)
    pub(in crate::core::cpu) fn op_swr(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let aligned = addr & !0x3;
        let value = self.reg(instr.rt());

        let Some(memory) = self.read_for_merge(bus, aligned)? else {
            return Ok(());
        };

        let merged = match addr & 0x3 {
            0 => value,
            1 => (memory & 0x0000_00FF) | (value << 8),
            2 => (memory & 0x0000_FFFF) | (value << 16),
            _ => (memory & 0x00FF_FFFF) | (value << 24),
        };
        self.store(bus, aligned, AccessWidth::Word, merged)
    }

    /// Read the aligned word an SWL/SWR merges into
    ///
    /// Faults are reported as store faults.
    fn read_for_merge(&mut self, bus: &mut Bus, aligned: u32) -> Result<Option<u32>> {
        if self.cop0.user_mode() && aligned >= 0x8000_0000 {
            self.address_error(ExceptionCause::AddressErrorStore, aligned);
            return Ok(None);
        }

        match bus.read32(aligned) {
            Ok(word) => Ok(Some(word)),
            Err(EmulatorError::BusError { .. }) => {
                self.exception(ExceptionCause::BusErrorData);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
