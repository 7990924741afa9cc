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

//! CPU instruction implementations
//!
//! Handlers are grouped by instruction family. Dispatch goes through the
//! primary opcode table, then the SPECIAL, BCONDZ and coprocessor sub-tables.
//! Anything not listed raises a reserved instruction exception.

use super::decode::Instruction;
use super::{ExceptionCause, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

// Instruction modules organized by type
mod arithmetic;
mod branch;
mod cop0;
mod cop2;
mod exception;
mod jump;
mod load;
mod logical;
mod multiply;
mod shift;
mod store;

impl CPU {
    /// Decode and execute the current instruction
    ///
    /// This method dispatches the instruction to the appropriate handler
    /// based on its opcode (upper 6 bits).
    pub(super) fn execute_instruction(&mut self, bus: &mut Bus) -> Result<()> {
        let instr = self.current_instruction;

        match instr.opcode() {
            0x00 => self.execute_special(instr),
            0x01 => self.execute_bcondz(instr),
            0x02 => self.op_j(instr),                        // J
            0x03 => self.op_jal(instr),                      // JAL
            0x04 => self.op_beq(instr),                      // BEQ
            0x05 => self.op_bne(instr),                      // BNE
            0x06 => self.op_blez(instr),                     // BLEZ
            0x07 => self.op_bgtz(instr),                     // BGTZ
            0x08 => self.op_addi(instr),                     // ADDI
            0x09 => self.op_addiu(instr),                    // ADDIU
            0x0A => self.op_slti(instr),                     // SLTI
            0x0B => self.op_sltiu(instr),                    // SLTIU
            0x0C => self.op_andi(instr),                     // ANDI
            0x0D => self.op_ori(instr),                      // ORI
            0x0E => self.op_xori(instr),                     // XORI
            0x0F => self.op_lui(instr),                      // LUI
            0x10 => self.execute_cop0(instr),                // COP0
            0x11 | 0x13 => self.op_coprocessor_unusable(instr), // COP1, COP3
            0x12 => self.execute_cop2(instr),                // COP2
            0x20 => self.op_lb(instr, bus),                  // LB
            0x21 => self.op_lh(instr, bus),                  // LH
            0x22 => self.op_lwl(instr, bus),                 // LWL
            0x23 => self.op_lw(instr, bus),                  // LW
            0x24 => self.op_lbu(instr, bus),                 // LBU
            0x25 => self.op_lhu(instr, bus),                 // LHU
            0x26 => self.op_lwr(instr, bus),                 // LWR
            0x28 => self.op_sb(instr, bus),                  // SB
            0x29 => self.op_sh(instr, bus),                  // SH
            0x2A => self.op_swl(instr, bus),                 // SWL
            0x2B => self.op_sw(instr, bus),                  // SW
            0x2E => self.op_swr(instr, bus),                 // SWR
            0x30 | 0x31 | 0x33 => self.op_coprocessor_unusable(instr), // LWC0, LWC1, LWC3
            0x32 => self.op_lwc2(instr, bus),                // LWC2
            0x38 | 0x39 | 0x3B => self.op_coprocessor_unusable(instr), // SWC0, SWC1, SWC3
            0x3A => self.op_swc2(instr, bus),                // SWC2
            _ => self.op_reserved(instr),
        }
    }

    /// Handle SPECIAL instructions (opcode 0x00)
    ///
    /// SPECIAL instructions use the lower 6 bits (funct field) to determine
    /// the specific operation.
    fn execute_special(&mut self, instr: Instruction) -> Result<()> {
        let (rs, rt, rd) = (instr.rs(), instr.rt(), instr.rd());
        let shamt = instr.shamt();

        match instr.funct() {
            0x00 => self.op_sll(rt, rd, shamt),   // SLL
            0x02 => self.op_srl(rt, rd, shamt),   // SRL
            0x03 => self.op_sra(rt, rd, shamt),   // SRA
            0x04 => self.op_sllv(rs, rt, rd),     // SLLV
            0x06 => self.op_srlv(rs, rt, rd),     // SRLV
            0x07 => self.op_srav(rs, rt, rd),     // SRAV
            0x08 => self.op_jr(rs),               // JR
            0x09 => self.op_jalr(rs, rd),         // JALR
            0x0C => self.op_syscall(instr),       // SYSCALL
            0x0D => self.op_break(instr),         // BREAK
            0x10 => self.op_mfhi(rd),             // MFHI
            0x11 => self.op_mthi(rs),             // MTHI
            0x12 => self.op_mflo(rd),             // MFLO
            0x13 => self.op_mtlo(rs),             // MTLO
            0x18 => self.op_mult(rs, rt),         // MULT
            0x19 => self.op_multu(rs, rt),        // MULTU
            0x1A => self.op_div(rs, rt),          // DIV
            0x1B => self.op_divu(rs, rt),         // DIVU
            0x20 => self.op_add(rs, rt, rd),      // ADD
            0x21 => self.op_addu(rs, rt, rd),     // ADDU
            0x22 => self.op_sub(rs, rt, rd),      // SUB
            0x23 => self.op_subu(rs, rt, rd),     // SUBU
            0x24 => self.op_and(rs, rt, rd),      // AND
            0x25 => self.op_or(rs, rt, rd),       // OR
            0x26 => self.op_xor(rs, rt, rd),      // XOR
            0x27 => self.op_nor(rs, rt, rd),      // NOR
            0x2A => self.op_slt(rs, rt, rd),      // SLT
            0x2B => self.op_sltu(rs, rt, rd),     // SLTU
            _ => self.op_reserved(instr),
        }
    }

    /// Handle COP0 instructions (opcode 0x10)
    fn execute_cop0(&mut self, instr: Instruction) -> Result<()> {
        match instr.cop_op() {
            0x00 => self.op_mfc0(instr), // MFC0
            0x04 => self.op_mtc0(instr), // MTC0
            0x10 if instr.cop_fn() == 0x10 => self.op_rfe(instr), // RFE
            _ => self.op_reserved(instr),
        }
    }

    /// Handle COP2 (GTE) instructions (opcode 0x12)
    fn execute_cop2(&mut self, instr: Instruction) -> Result<()> {
        if !self.cop2_usable() {
            self.exception_with_coprocessor(ExceptionCause::CoprocessorUnusable, 2);
            return Ok(());
        }

        if instr.is_cop_command() {
            return self.op_gte_command(instr);
        }

        match instr.cop_op() {
            0x00 => self.op_mfc2(instr), // MFC2
            0x02 => self.op_cfc2(instr), // CFC2
            0x04 => self.op_mtc2(instr), // MTC2
            0x06 => self.op_ctc2(instr), // CTC2
            _ => self.op_reserved(instr),
        }
    }
}
