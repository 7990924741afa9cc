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

impl CPU {
    // === Branch Instructions ===

    /// Schedule a relative branch
    ///
    /// The following instruction is a delay slot whether or not the branch is
    /// taken. `self.pc` already points at that delay slot, so the target is
    /// relative to it.
    fn branch(&mut self, instr: Instruction, taken: bool) {
        self.branch = true;
        if taken {
            let offset = instr.imm_se() << 2;
            self.next_pc = self.pc.wrapping_add(offset);
        }
    }

    /// Handle BCONDZ instructions (opcode 0x01)
    ///
    /// BCONDZ instructions include BLTZ, BGEZ, BLTZAL, and BGEZAL.
    /// Bit 0 of rt selects BGEZ over BLTZ. The link variants are decoded
    /// only when rt bits 4..1 are 0b1000; every other rt value is a plain
    /// BLTZ/BGEZ. The link register is written even if the branch is not
    /// taken.
    pub(in crate::core::cpu) fn execute_bcondz(&mut self, instr: Instruction) -> Result<()> {
        let rt = instr.rt();
        let is_bgez = (rt & 0x01) != 0;
        let is_link = (rt & 0x1E) == 0x10;

        let test = (self.reg(instr.rs()) as i32) >= 0;
        let taken = if is_bgez { test } else { !test };

        if is_link {
            self.set_reg(31, self.next_pc);
        }

        self.branch(instr, taken);
        Ok(())
    }

    /// BEQ: Branch on Equal
    ///
    /// Format: beq rs, rt, offset
    /// Operation: if (rs == rt) PC = PC + 4 + (sign_extend(offset) << 2)
    pub(in crate::core::cpu) fn op_beq(&mut self, instr: Instruction) -> Result<()> {
        let taken = self.reg(instr.rs()) == self.reg(instr.rt());
        self.branch(instr, taken);
        Ok(())
    }

    /// BNE: Branch on Not Equal
    ///
    /// Format: bne rs, rt, offset
    pub(in crate::core::cpu) fn op_bne(&mut self, instr: Instruction) -> Result<()> {
        let taken = self.reg(instr.rs()) != self.reg(instr.rt());
        self.branch(instr, taken);
        Ok(())
    }

    /// BLEZ: Branch on Less Than or Equal to Zero (signed)
    pub(in crate::core::cpu) fn op_blez(&mut self, instr: Instruction) -> Result<()> {
        let taken = (self.reg(instr.rs()) as i32) <= 0;
        self.branch(instr, taken);
        Ok(())
    }

    /// BGTZ: Branch on Greater Than Zero (signed)
    pub(in crate::core::cpu) fn op_bgtz(&mut self, instr: Instruction) -> Result<()> {
        let taken = (self.reg(instr.rs()) as i32) > 0;
        self.branch(instr, taken);
        Ok(())
    }
}
