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

//! Tiny R3000A assembler for hand-written test programs

#![allow(dead_code)]

// Register names
pub const ZERO: u8 = 0;
pub const AT: u8 = 1;
pub const V0: u8 = 2;
pub const V1: u8 = 3;
pub const A0: u8 = 4;
pub const A1: u8 = 5;
pub const A2: u8 = 6;
pub const T0: u8 = 8;
pub const T1: u8 = 9;
pub const T2: u8 = 10;
pub const K0: u8 = 26;
pub const SP: u8 = 29;
pub const RA: u8 = 31;

// COP0 registers
pub const BADVADDR: u8 = 8;
pub const SR: u8 = 12;
pub const CAUSE: u8 = 13;
pub const EPC: u8 = 14;

fn r_type(funct: u32, rs: u8, rt: u8, rd: u8, shamt: u32) -> u32 {
    ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | ((shamt & 0x1F) << 6) | funct
}

fn i_type(op: u32, rs: u8, rt: u8, imm: u16) -> u32 {
    (op << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | imm as u32
}

fn cop(op: u32, sub: u32, rt: u8, rd: u8) -> u32 {
    (op << 26) | (sub << 21) | ((rt as u32) << 16) | ((rd as u32) << 11)
}

pub fn nop() -> u32 {
    0
}
pub fn sll(rd: u8, rt: u8, shamt: u32) -> u32 {
    r_type(0x00, 0, rt, rd, shamt)
}
pub fn srl(rd: u8, rt: u8, shamt: u32) -> u32 {
    r_type(0x02, 0, rt, rd, shamt)
}
pub fn jr(rs: u8) -> u32 {
    r_type(0x08, rs, 0, 0, 0)
}
pub fn syscall() -> u32 {
    0x0000_000C
}
pub fn mflo(rd: u8) -> u32 {
    r_type(0x12, 0, 0, rd, 0)
}
pub fn multu(rs: u8, rt: u8) -> u32 {
    r_type(0x19, rs, rt, 0, 0)
}
pub fn addu(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x21, rs, rt, rd, 0)
}
pub fn subu(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x23, rs, rt, rd, 0)
}
pub fn or(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x25, rs, rt, rd, 0)
}
pub fn slt(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x2A, rs, rt, rd, 0)
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
pub fn blez(rs: u8, offset: i16) -> u32 {
    i_type(0x06, rs, 0, offset as u16)
}
pub fn addiu(rt: u8, rs: u8, imm: i16) -> u32 {
    i_type(0x09, rs, rt, imm as u16)
}
pub fn andi(rt: u8, rs: u8, imm: u16) -> u32 {
    i_type(0x0C, rs, rt, imm)
}
pub fn ori(rt: u8, rs: u8, imm: u16) -> u32 {
    i_type(0x0D, rs, rt, imm)
}
pub fn lui(rt: u8, imm: u16) -> u32 {
    i_type(0x0F, 0, rt, imm)
}

/// `lui` + `ori` pair loading a full 32-bit constant
pub fn li(rt: u8, value: u32) -> [u32; 2] {
    [lui(rt, (value >> 16) as u16), ori(rt, rt, value as u16)]
}

pub fn mfc0(rt: u8, rd: u8) -> u32 {
    cop(0x10, 0x00, rt, rd)
}
pub fn mtc0(rt: u8, rd: u8) -> u32 {
    cop(0x10, 0x04, rt, rd)
}
pub fn rfe() -> u32 {
    0x4200_0010
}
pub fn mfc2(rt: u8, rd: u8) -> u32 {
    cop(0x12, 0x00, rt, rd)
}
pub fn cfc2(rt: u8, rd: u8) -> u32 {
    cop(0x12, 0x02, rt, rd)
}
pub fn mtc2(rt: u8, rd: u8) -> u32 {
    cop(0x12, 0x04, rt, rd)
}
pub fn ctc2(rt: u8, rd: u8) -> u32 {
    cop(0x12, 0x06, rt, rd)
}
/// GTE command word (`cop2 imm25`)
pub fn gte(command: u32) -> u32 {
    0x4A00_0000 | (command & 0x01FF_FFFF)
}

pub fn lb(rt: u8, base: u8, offset: i16) -> u32 {
    i_type(0x20, base, rt, offset as u16)
}
pub fn lw(rt: u8, base: u8, offset: i16) -> u32 {
    i_type(0x23, base, rt, offset as u16)
}
pub fn lbu(rt: u8, base: u8, offset: i16) -> u32 {
    i_type(0x24, base, rt, offset as u16)
}
pub fn sb(rt: u8, base: u8, offset: i16) -> u32 {
    i_type(0x28, base, rt, offset as u16)
}
pub fn sw(rt: u8, base: u8, offset: i16) -> u32 {
    i_type(0x2B, base, rt, offset as u16)
}
pub fn lwc2(rt: u8, base: u8, offset: i16) -> u32 {
    i_type(0x32, base, rt, offset as u16)
}
pub fn swc2(rt: u8, base: u8, offset: i16) -> u32 {
    i_type(0x3A, base, rt, offset as u16)
}

/// Little-endian image of a program
pub fn assemble(program: &[u32]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_le_bytes()).collect()
}
