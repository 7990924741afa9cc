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

//! CPU test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: CPU initialization, reset, register access, PC handling
//! - `load_delay`: Load delay slot behavior
//! - `exceptions`: Exception entry, faults, interrupts
//! - `cop0`: COP0 coprocessor operations (MFC0, MTC0, RFE)
//! - `decode`: Instruction decoding
//! - `instructions`: Instruction execution
//! - `hooks`: Kernel call observers
//! - `timing`: Cycle accounting


use super::*;
use crate::core::memory::Bus;

/// Where test programs are loaded (KSEG0 RAM)
pub(super) const BASE: u32 = 0x8001_0000;

/// Scratch data area used by load/store tests
pub(super) const DATA: u32 = BASE + 0x1000;

/// Load `program` at [`BASE`] and point the CPU at it
pub(super) fn setup(program: &[u32]) -> (CPU, Bus) {
    let mut bus = Bus::new();
    load_words(&mut bus, BASE, program);
    let mut cpu = CPU::new();
    cpu.set_pc(BASE);
    (cpu, bus)
}

pub(super) fn load_words(bus: &mut Bus, address: u32, words: &[u32]) {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    bus.load_program(address, &bytes).unwrap();
}

pub(super) fn run(cpu: &mut CPU, bus: &mut Bus, steps: usize) {
    for _ in 0..steps {
        cpu.step(bus).unwrap();
    }
}

/// Exception code from CAUSE bits 2-6
pub(super) fn exception_code(cpu: &CPU) -> u32 {
    (cpu.cop0_reg(COP0::CAUSE) >> 2) & 0x1F
}

/// Minimal encoder for the instructions the tests need
pub(super) mod asm {
    fn r_type(funct: u32, rs: u8, rt: u8, rd: u8, shamt: u32) -> u32 {
        ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | (shamt << 6) | funct
    }

    fn i_type(op: u32, rs: u8, rt: u8, imm: u16) -> u32 {
        (op << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | imm as u32
    }

    pub fn nop() -> u32 {
        0
    }
    pub fn sll(rd: u8, rt: u8, shamt: u32) -> u32 {
        r_type(0x00, 0, rt, rd, shamt)
    }
    pub fn sra(rd: u8, rt: u8, shamt: u32) -> u32 {
        r_type(0x03, 0, rt, rd, shamt)
    }
    pub fn srlv(rd: u8, rt: u8, rs: u8) -> u32 {
        r_type(0x06, rs, rt, rd, 0)
    }
    pub fn jr(rs: u8) -> u32 {
        r_type(0x08, rs, 0, 0, 0)
    }
    pub fn jalr(rd: u8, rs: u8) -> u32 {
        r_type(0x09, rs, 0, rd, 0)
    }
    pub fn syscall() -> u32 {
        0x0000_000C
    }
    pub fn brk() -> u32 {
        0x0000_000D
    }
    pub fn mfhi(rd: u8) -> u32 {
        r_type(0x10, 0, 0, rd, 0)
    }
    pub fn mflo(rd: u8) -> u32 {
        r_type(0x12, 0, 0, rd, 0)
    }
    pub fn mult(rs: u8, rt: u8) -> u32 {
        r_type(0x18, rs, rt, 0, 0)
    }
    pub fn multu(rs: u8, rt: u8) -> u32 {
        r_type(0x19, rs, rt, 0, 0)
    }
    pub fn div(rs: u8, rt: u8) -> u32 {
        r_type(0x1A, rs, rt, 0, 0)
    }
    pub fn divu(rs: u8, rt: u8) -> u32 {
        r_type(0x1B, rs, rt, 0, 0)
    }
    pub fn add(rd: u8, rs: u8, rt: u8) -> u32 {
        r_type(0x20, rs, rt, rd, 0)
    }
    pub fn addu(rd: u8, rs: u8, rt: u8) -> u32 {
        r_type(0x21, rs, rt, rd, 0)
    }
    pub fn sub(rd: u8, rs: u8, rt: u8) -> u32 {
        r_type(0x22, rs, rt, rd, 0)
    }
    pub fn nor(rd: u8, rs: u8, rt: u8) -> u32 {
        r_type(0x27, rs, rt, rd, 0)
    }
    pub fn slt(rd: u8, rs: u8, rt: u8) -> u32 {
        r_type(0x2A, rs, rt, rd, 0)
    }
    pub fn sltu(rd: u8, rs: u8, rt: u8) -> u32 {
        r_type(0x2B, rs, rt, rd, 0)
    }

    pub fn bltz(rs: u8, offset: i16) -> u32 {
        i_type(0x01, rs, 0x00, offset as u16)
    }
    pub fn bgezal(rs: u8, offset: i16) -> u32 {
        i_type(0x01, rs, 0x11, offset as u16)
    }
    /// BCONDZ with an arbitrary rt field
    pub fn bcondz(rs: u8, rt: u8, offset: i16) -> u32 {
        i_type(0x01, rs, rt, offset as u16)
    }
    pub fn j(target: u32) -> u32 {
        (0x02 << 26) | ((target >> 2) & 0x03FF_FFFF)
    }
    pub fn jal(target: u32) -> u32 {
        (0x03 << 26) | ((target >> 2) & 0x03FF_FFFF)
    }
    pub fn beq(rs: u8, rt: u8, offset: i16) -> u32 {
        i_type(0x04, rs, rt, offset as u16)
    }
    pub fn bne(rs: u8, rt: u8, offset: i16) -> u32 {
        i_type(0x05, rs, rt, offset as u16)
    }
    pub fn addi(rt: u8, rs: u8, imm: i16) -> u32 {
        i_type(0x08, rs, rt, imm as u16)
    }
    pub fn addiu(rt: u8, rs: u8, imm: i16) -> u32 {
        i_type(0x09, rs, rt, imm as u16)
    }
    pub fn slti(rt: u8, rs: u8, imm: i16) -> u32 {
        i_type(0x0A, rs, rt, imm as u16)
    }
    pub fn sltiu(rt: u8, rs: u8, imm: i16) -> u32 {
        i_type(0x0B, rs, rt, imm as u16)
    }
    pub fn andi(rt: u8, rs: u8, imm: u16) -> u32 {
        i_type(0x0C, rs, rt, imm)
    }
    pub fn ori(rt: u8, rs: u8, imm: u16) -> u32 {
        i_type(0x0D, rs, rt, imm)
    }
    pub fn xori(rt: u8, rs: u8, imm: u16) -> u32 {
        i_type(0x0E, rs, rt, imm)
    }
    pub fn lui(rt: u8, imm: u16) -> u32 {
        i_type(0x0F, 0, rt, imm)
    }

    pub fn mfc0(rt: u8, rd: u8) -> u32 {
        0x4000_0000 | ((rt as u32) << 16) | ((rd as u32) << 11)
    }
    pub fn mtc0(rt: u8, rd: u8) -> u32 {
        0x4080_0000 | ((rt as u32) << 16) | ((rd as u32) << 11)
    }
    pub fn rfe() -> u32 {
        0x4200_0010
    }
    pub fn mfc2(rt: u8, rd: u8) -> u32 {
        0x4800_0000 | ((rt as u32) << 16) | ((rd as u32) << 11)
    }
    pub fn cfc2(rt: u8, rd: u8) -> u32 {
        0x4840_0000 | ((rt as u32) << 16) | ((rd as u32) << 11)
    }
    pub fn mtc2(rt: u8, rd: u8) -> u32 {
        0x4880_0000 | ((rt as u32) << 16) | ((rd as u32) << 11)
    }
    pub fn ctc2(rt: u8, rd: u8) -> u32 {
        0x48C0_0000 | ((rt as u32) << 16) | ((rd as u32) << 11)
    }

    pub fn lb(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x20, base, rt, offset as u16)
    }
    pub fn lh(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x21, base, rt, offset as u16)
    }
    pub fn lwl(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x22, base, rt, offset as u16)
    }
    pub fn lw(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x23, base, rt, offset as u16)
    }
    pub fn lbu(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x24, base, rt, offset as u16)
    }
    pub fn lhu(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x25, base, rt, offset as u16)
    }
    pub fn lwr(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x26, base, rt, offset as u16)
    }
    pub fn sb(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x28, base, rt, offset as u16)
    }
    pub fn sh(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x29, base, rt, offset as u16)
    }
    pub fn swl(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x2A, base, rt, offset as u16)
    }
    pub fn sw(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x2B, base, rt, offset as u16)
    }
    pub fn swr(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x2E, base, rt, offset as u16)
    }
    pub fn lwc2(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x32, base, rt, offset as u16)
    }
    pub fn swc2(rt: u8, base: u8, offset: i16) -> u32 {
        i_type(0x3A, base, rt, offset as u16)
    }
}
