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

//! MIPS instruction disassembler for debugging
//!
//! Converts binary instruction encodings to human-readable assembly mnemonics.
//! Branch and jump targets are printed as absolute addresses.

use super::decode::Instruction;
use crate::core::gte::Command;

/// Instruction disassembler
///
/// # Example
/// ```
/// use psrx_core::core::cpu::Disassembler;
///
/// let instruction = 0x00000000; // NOP
/// let disasm = Disassembler::disassemble(instruction, 0xBFC00000);
/// assert_eq!(disasm, "nop");
/// ```
pub struct Disassembler;

impl Disassembler {
    /// Disassemble a single instruction to human-readable format
    ///
    /// # Arguments
    ///
    /// * `instruction` - The 32-bit instruction to disassemble
    /// * `pc` - Address of the instruction (for branch and jump targets)
    ///
    /// # Example
    /// ```
    /// use psrx_core::core::cpu::Disassembler;
    ///
    /// let instruction = 0x3C011234; // LUI r1, 0x1234
    /// let disasm = Disassembler::disassemble(instruction, 0xBFC00000);
    /// assert_eq!(disasm, "lui r1, 0x1234");
    /// ```
    pub fn disassemble(instruction: u32, pc: u32) -> String {
        let instr = Instruction(instruction);
        let (rs, rt) = (instr.rs(), instr.rt());
        let simm = instr.imm() as i16;

        match instr.opcode() {
            0x00 => Self::disasm_special(instr),
            0x01 => Self::disasm_bcondz(instr, pc),
            0x02 => format!("j 0x{:08X}", Self::jump_target(instr, pc)),
            0x03 => format!("jal 0x{:08X}", Self::jump_target(instr, pc)),
            0x04 => format!("beq r{}, r{}, 0x{:08X}", rs, rt, Self::branch_target(instr, pc)),
            0x05 => format!("bne r{}, r{}, 0x{:08X}", rs, rt, Self::branch_target(instr, pc)),
            0x06 => format!("blez r{}, 0x{:08X}", rs, Self::branch_target(instr, pc)),
            0x07 => format!("bgtz r{}, 0x{:08X}", rs, Self::branch_target(instr, pc)),
            0x08 => format!("addi r{}, r{}, {}", rt, rs, simm),
            0x09 => format!("addiu r{}, r{}, {}", rt, rs, simm),
            0x0A => format!("slti r{}, r{}, {}", rt, rs, simm),
            0x0B => format!("sltiu r{}, r{}, {}", rt, rs, simm),
            0x0C => format!("andi r{}, r{}, 0x{:04X}", rt, rs, instr.imm()),
            0x0D => format!("ori r{}, r{}, 0x{:04X}", rt, rs, instr.imm()),
            0x0E => format!("xori r{}, r{}, 0x{:04X}", rt, rs, instr.imm()),
            0x0F => format!("lui r{}, 0x{:04X}", rt, instr.imm()),
            0x10 => Self::disasm_cop0(instr),
            0x12 => Self::disasm_cop2(instr),
            0x11 | 0x13 => format!("cop{} 0x{:07X}", instr.cop_number(), instruction & 0x01FF_FFFF),
            0x20 => Self::memory("lb", instr),
            0x21 => Self::memory("lh", instr),
            0x22 => Self::memory("lwl", instr),
            0x23 => Self::memory("lw", instr),
            0x24 => Self::memory("lbu", instr),
            0x25 => Self::memory("lhu", instr),
            0x26 => Self::memory("lwr", instr),
            0x28 => Self::memory("sb", instr),
            0x29 => Self::memory("sh", instr),
            0x2A => Self::memory("swl", instr),
            0x2B => Self::memory("sw", instr),
            0x2E => Self::memory("swr", instr),
            0x32 => format!("lwc2 gd{}, {}(r{})", rt, simm, rs),
            0x3A => format!("swc2 gd{}, {}(r{})", rt, simm, rs),
            0x30 | 0x31 | 0x33 => format!("lwc{} {}, {}(r{})", instr.cop_number(), rt, simm, rs),
            0x38 | 0x39 | 0x3B => format!("swc{} {}, {}(r{})", instr.cop_number(), rt, simm, rs),
            _ => format!("??? 0x{:08X}", instruction),
        }
    }

    fn memory(mnemonic: &str, instr: Instruction) -> String {
        format!(
            "{} r{}, {}(r{})",
            mnemonic,
            instr.rt(),
            instr.imm() as i16,
            instr.rs()
        )
    }

    fn branch_target(instr: Instruction, pc: u32) -> u32 {
        pc.wrapping_add(4).wrapping_add(instr.imm_se() << 2)
    }

    fn jump_target(instr: Instruction, pc: u32) -> u32 {
        (pc.wrapping_add(4) & 0xF000_0000) | (instr.target() << 2)
    }

    /// Disassemble SPECIAL (opcode 0x00) instruction
    fn disasm_special(instr: Instruction) -> String {
        let (rs, rt, rd, shamt) = (instr.rs(), instr.rt(), instr.rd(), instr.shamt());

        match instr.funct() {
            0x00 if instr.0 == 0 => "nop".to_string(),
            0x00 => format!("sll r{}, r{}, {}", rd, rt, shamt),
            0x02 => format!("srl r{}, r{}, {}", rd, rt, shamt),
            0x03 => format!("sra r{}, r{}, {}", rd, rt, shamt),
            0x04 => format!("sllv r{}, r{}, r{}", rd, rt, rs),
            0x06 => format!("srlv r{}, r{}, r{}", rd, rt, rs),
            0x07 => format!("srav r{}, r{}, r{}", rd, rt, rs),
            0x08 => format!("jr r{}", rs),
            0x09 if rd == 31 => format!("jalr r{}", rs),
            0x09 => format!("jalr r{}, r{}", rd, rs),
            0x0C => "syscall".to_string(),
            0x0D => "break".to_string(),
            0x10 => format!("mfhi r{}", rd),
            0x11 => format!("mthi r{}", rs),
            0x12 => format!("mflo r{}", rd),
            0x13 => format!("mtlo r{}", rs),
            0x18 => format!("mult r{}, r{}", rs, rt),
            0x19 => format!("multu r{}, r{}", rs, rt),
            0x1A => format!("div r{}, r{}", rs, rt),
            0x1B => format!("divu r{}, r{}", rs, rt),
            0x20 => format!("add r{}, r{}, r{}", rd, rs, rt),
            0x21 => format!("addu r{}, r{}, r{}", rd, rs, rt),
            0x22 => format!("sub r{}, r{}, r{}", rd, rs, rt),
            0x23 => format!("subu r{}, r{}, r{}", rd, rs, rt),
            0x24 => format!("and r{}, r{}, r{}", rd, rs, rt),
            0x25 => format!("or r{}, r{}, r{}", rd, rs, rt),
            0x26 => format!("xor r{}, r{}, r{}", rd, rs, rt),
            0x27 => format!("nor r{}, r{}, r{}", rd, rs, rt),
            0x2A => format!("slt r{}, r{}, r{}", rd, rs, rt),
            0x2B => format!("sltu r{}, r{}, r{}", rd, rs, rt),
            _ => format!("??? 0x{:08X}", instr.0),
        }
    }

    /// Disassemble BCONDZ (opcode 0x01) instruction
    ///
    /// Mirrors the CPU decode: only rt = 0x10/0x11 link.
    fn disasm_bcondz(instr: Instruction, pc: u32) -> String {
        let rt = instr.rt();
        let mnemonic = match (rt & 0x01 != 0, rt & 0x1E == 0x10) {
            (false, false) => "bltz",
            (true, false) => "bgez",
            (false, true) => "bltzal",
            (true, true) => "bgezal",
        };
        format!(
            "{} r{}, 0x{:08X}",
            mnemonic,
            instr.rs(),
            Self::branch_target(instr, pc)
        )
    }

    /// Disassemble COP0 (coprocessor 0) instruction
    fn disasm_cop0(instr: Instruction) -> String {
        match instr.cop_op() {
            0x00 => format!("mfc0 r{}, cop0r{}", instr.rt(), instr.rd()),
            0x04 => format!("mtc0 r{}, cop0r{}", instr.rt(), instr.rd()),
            0x10 if instr.cop_fn() == 0x10 => "rfe".to_string(),
            _ => format!("??? 0x{:08X}", instr.0),
        }
    }

    /// Disassemble COP2 (GTE) instruction
    ///
    /// Data registers print as `gdN`, control registers as `gcN`.
    fn disasm_cop2(instr: Instruction) -> String {
        if instr.is_cop_command() {
            let command = Command(instr.0);
            let mut text = command.mnemonic().to_string();
            if command.shift() != 0 {
                text.push_str(" sf");
            }
            if command.lm() {
                text.push_str(" lm");
            }
            return text;
        }

        match instr.cop_op() {
            0x00 => format!("mfc2 r{}, gd{}", instr.rt(), instr.rd()),
            0x02 => format!("cfc2 r{}, gc{}", instr.rt(), instr.rd()),
            0x04 => format!("mtc2 r{}, gd{}", instr.rt(), instr.rd()),
            0x06 => format!("ctc2 r{}, gc{}", instr.rt(), instr.rd()),
            _ => format!("??? 0x{:08X}", instr.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disasm_nop() {
        let result = Disassembler::disassemble(0x00000000, 0);
        assert_eq!(result, "nop");
    }

    #[test]
    fn test_disasm_lui() {
        let result = Disassembler::disassemble(0x3C011234, 0); // LUI r1, 0x1234
        assert_eq!(result, "lui r1, 0x1234");
    }

    #[test]
    fn test_disasm_addiu() {
        let result = Disassembler::disassemble(0x24220042, 0); // ADDIU r2, r1, 66
        assert_eq!(result, "addiu r2, r1, 66");
    }

    #[test]
    fn test_disasm_or() {
        let result = Disassembler::disassemble(0x00411825, 0); // OR r3, r2, r1
        assert_eq!(result, "or r3, r2, r1");
    }

    #[test]
    fn test_disasm_sw_lw() {
        assert_eq!(Disassembler::disassemble(0xAC220000, 0), "sw r2, 0(r1)");
        assert_eq!(Disassembler::disassemble(0x8C22FFFC, 0), "lw r2, -4(r1)");
    }

    #[test]
    fn test_disasm_j() {
        let result = Disassembler::disassemble(0x0BF00000, 0xBFC00000); // J 0xBFC00000
        assert_eq!(result, "j 0xBFC00000");
    }

    #[test]
    fn test_disasm_branch_target() {
        // BEQ r1, r2, -1 at 0x80010000 loops back onto itself
        let result = Disassembler::disassemble(0x1022FFFF, 0x8001_0000);
        assert_eq!(result, "beq r1, r2, 0x80010000");
    }

    #[test]
    fn test_disasm_bcondz_link_decode() {
        // rt = 0x11: BGEZAL
        assert_eq!(
            Disassembler::disassemble(0x04310001, 0),
            "bgezal r1, 0x00000008"
        );
        // rt = 0x03 does not link
        assert_eq!(
            Disassembler::disassemble(0x04230001, 0),
            "bgez r1, 0x00000008"
        );
    }

    #[test]
    fn test_disasm_jr() {
        let result = Disassembler::disassemble(0x03E00008, 0); // JR r31
        assert_eq!(result, "jr r31");
    }

    #[test]
    fn test_disasm_cop0() {
        assert_eq!(Disassembler::disassemble(0x40026000, 0), "mfc0 r2, cop0r12");
        assert_eq!(Disassembler::disassemble(0x42000010, 0), "rfe");
    }

    #[test]
    fn test_disasm_cop2() {
        assert_eq!(Disassembler::disassemble(0x4A180001, 0), "rtps sf");
        assert_eq!(Disassembler::disassemble(0x4882D000, 0), "mtc2 r2, gd26");
        assert_eq!(Disassembler::disassemble(0x48C2F800, 0), "ctc2 r2, gc31");
        assert_eq!(Disassembler::disassemble(0xC8A10004, 0), "lwc2 gd1, 4(r5)");
    }

    #[test]
    fn test_disasm_unknown() {
        let result = Disassembler::disassemble(0xFFFFFFFF, 0);
        assert!(result.starts_with("???"));
    }
}
