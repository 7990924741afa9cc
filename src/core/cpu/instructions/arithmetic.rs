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
use crate::core::error::Result;

impl CPU {
    // === Arithmetic Instructions ===

    /// ADD: Add (with overflow exception)
    ///
    /// Adds two registers with signed overflow detection. On overflow the
    /// destination is left untouched and an Overflow exception is raised.
    ///
    /// Format: add rd, rs, rt
    /// Operation: rd = rs + rt
    pub(in crate::core::cpu) fn op_add(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let a = self.reg(rs) as i32;
        let b = self.reg(rt) as i32;

        match a.checked_add(b) {
            Some(result) => self.set_reg(rd, result as u32),
            None => self.exception(ExceptionCause::Overflow),
        }
        Ok(())
    }

    /// ADDU: Add Unsigned (no overflow exception)
    ///
    /// Format: addu rd, rs, rt
    /// Operation: rd = rs + rt (modulo 2^32)
    pub(in crate::core::cpu) fn op_addu(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let result = self.reg(rs).wrapping_add(self.reg(rt));
        self.set_reg(rd, result);
        Ok(())
    }

    /// ADDI: Add Immediate (with overflow exception)
    ///
    /// Format: addi rt, rs, imm
    /// Operation: rt = rs + sign_extend(imm)
    pub(in crate::core::cpu) fn op_addi(&mut self, instr: Instruction) -> Result<()> {
        let a = self.reg(instr.rs()) as i32;
        let imm = instr.imm_se() as i32;

        match a.checked_add(imm) {
            Some(result) => self.set_reg(instr.rt(), result as u32),
            None => self.exception(ExceptionCause::Overflow),
        }
        Ok(())
    }

    /// ADDIU: Add Immediate Unsigned (no overflow exception)
    ///
    /// Despite the name "unsigned", the immediate is sign-extended.
    ///
    /// Format: addiu rt, rs, imm
    /// Operation: rt = rs + sign_extend(imm)
    pub(in crate::core::cpu) fn op_addiu(&mut self, instr: Instruction) -> Result<()> {
        let result = self.reg(instr.rs()).wrapping_add(instr.imm_se());
        self.set_reg(instr.rt(), result);
        Ok(())
    }

    /// SUB: Subtract (with overflow exception)
    ///
    /// Format: sub rd, rs, rt
    /// Operation: rd = rs - rt
    pub(in crate::core::cpu) fn op_sub(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let a = self.reg(rs) as i32;
        let b = self.reg(rt) as i32;

        match a.checked_sub(b) {
            Some(result) => self.set_reg(rd, result as u32),
            None => self.exception(ExceptionCause::Overflow),
        }
        Ok(())
    }

    /// SUBU: Subtract Unsigned (no overflow exception)
    ///
    /// Format: subu rd, rs, rt
    pub(in crate::core::cpu) fn op_subu(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let result = self.reg(rs).wrapping_sub(self.reg(rt));
        self.set_reg(rd, result);
        Ok(())
    }

    /// SLT: Set on Less Than (signed)
    ///
    /// Format: slt rd, rs, rt
    /// Operation: rd = (rs < rt) ? 1 : 0
    pub(in crate::core::cpu) fn op_slt(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let result = (self.reg(rs) as i32) < (self.reg(rt) as i32);
        self.set_reg(rd, result as u32);
        Ok(())
    }

    /// SLTU: Set on Less Than Unsigned
    pub(in crate::core::cpu) fn op_sltu(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let result = self.reg(rs) < self.reg(rt);
        self.set_reg(rd, result as u32);
        Ok(())
    }

    /// SLTI: Set on Less Than Immediate (signed)
    ///
    /// Format: slti rt, rs, imm
    /// Operation: rt = (rs < sign_extend(imm)) ? 1 : 0
    pub(in crate::core::cpu) fn op_slti(&mut self, instr: Instruction) -> Result<()> {
        let result = (self.reg(instr.rs()) as i32) < (instr.imm_se() as i32);
        self.set_reg(instr.rt(), result as u32);
        Ok(())
    }

    /// SLTIU: Set on Less Than Immediate Unsigned
    ///
    /// The immediate is sign-extended, then compared unsigned.
    pub(in crate::core::cpu) fn op_sltiu(&mut self, instr: Instruction) -> Result<()> {
        let result = self.reg(instr.rs()) < instr.imm_se();
        self.set_reg(instr.rt(), result as u32);
        Ok(())
    }
}
