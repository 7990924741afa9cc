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
    // === Jump Instructions ===

    fn jump_to(&mut self, target: u32) {
        self.next_pc = target;
        self.branch = true;
    }

    /// J: Jump
    ///
    /// The target keeps the upper 4 bits of the delay slot address.
    ///
    /// Format: j target
    /// Operation: PC = (PC & 0xF0000000) | (target << 2)
    pub(in crate::core::cpu) fn op_j(&mut self, instr: Instruction) -> Result<()> {
        let target = (self.pc & 0xF000_0000) | (instr.target() << 2);
        self.jump_to(target);
        Ok(())
    }

    /// JAL: Jump And Link
    ///
    /// Stores the address after the delay slot in r31 (ra).
    ///
    /// Format: jal target
    pub(in crate::core::cpu) fn op_jal(&mut self, instr: Instruction) -> Result<()> {
        self.set_reg(31, self.next_pc);
        self.op_j(instr)
    }

    /// JR: Jump Register
    ///
    /// A misaligned target faults on the following fetch, not here.
    ///
    /// Format: jr rs
    pub(in crate::core::cpu) fn op_jr(&mut self, rs: u8) -> Result<()> {
        let target = self.reg(rs);
        self.jump_to(target);
        Ok(())
    }

    /// JALR: Jump And Link Register
    ///
    /// The target is read before rd is written, so `jalr r4, r4` jumps to
    /// the old value of r4.
    ///
    /// Format: jalr rd, rs
    pub(in crate::core::cpu) fn op_jalr(&mut self, rs: u8, rd: u8) -> Result<()> {
        let target = self.reg(rs);
        self.set_reg(rd, self.next_pc);
        self.jump_to(target);
        Ok(())
    }
}
