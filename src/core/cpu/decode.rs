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

//! Instruction field decoding
//!
//! Layouts:
//!
//! ```text
//! R-type: | op (6) | rs (5) | rt (5) | rd (5) | shamt (5) | funct (6) |
//! I-type: | op (6) | rs (5) | rt (5) |        immediate (16)         |
//! J-type: | op (6) |                 target (26)                      |
//! ```

use std::fmt;

/// A raw 32-bit instruction word with field accessors
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Instruction(pub u32);

impl Instruction {
    /// Primary opcode (bits 31-26)
    #[inline(always)]
    pub fn opcode(self) -> u32 {
        self.0 >> 26
    }

    /// Source register (bits 25-21)
    #[inline(always)]
    pub fn rs(self) -> u8 {
        ((self.0 >> 21) & 0x1F) as u8
    }

    /// Target register (bits 20-16)
    #[inline(always)]
    pub fn rt(self) -> u8 {
        ((self.0 >> 16) & 0x1F) as u8
    }

    /// Destination register (bits 15-11)
    #[inline(always)]
    pub fn rd(self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    /// Shift amount (bits 10-6)
    #[inline(always)]
    pub fn shamt(self) -> u32 {
        (self.0 >> 6) & 0x1F
    }

    /// Secondary opcode (bits 5-0)
    #[inline(always)]
    pub fn funct(self) -> u32 {
        self.0 & 0x3F
    }

    /// Zero-extended immediate
    #[inline(always)]
    pub fn imm(self) -> u32 {
        self.0 & 0xFFFF
    }

    /// Sign-extended immediate
    #[inline(always)]
    pub fn imm_se(self) -> u32 {
        (self.0 & 0xFFFF) as i16 as u32
    }

    /// 26-bit jump target
    #[inline(always)]
    pub fn target(self) -> u32 {
        self.0 & 0x03FF_FFFF
    }

    /// Coprocessor sub-opcode (bits 25-21, same position as `rs`)
    #[inline(always)]
    pub fn cop_op(self) -> u32 {
        (self.0 >> 21) & 0x1F
    }

    /// Coprocessor number for COPz/LWCz/SWCz (bits 27-26)
    #[inline(always)]
    pub fn cop_number(self) -> u32 {
        (self.0 >> 26) & 0x3
    }

    /// CO bit (25): coprocessor command rather than a register transfer
    #[inline(always)]
    pub fn is_cop_command(self) -> bool {
        self.0 & (1 << 25) != 0
    }

    /// Coprocessor command number (bits 5-0)
    #[inline(always)]
    pub fn cop_fn(self) -> u32 {
        self.0 & 0x3F
    }

    /// Whether this word is a GTE command (COP2 with CO set)
    #[inline(always)]
    pub fn is_gte_command(self) -> bool {
        self.opcode() == 0x12 && self.is_cop_command()
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction(0x{:08X})", self.0)
    }
}
