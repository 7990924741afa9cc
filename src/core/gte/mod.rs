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

//! GTE (Geometry Transformation Engine) - Coprocessor 2
//!
//! Fixed-point vector/matrix unit used for 3D transformation, perspective
//! projection and lighting.
//!
//! # Register file
//!
//! - 32 data registers (vectors, colors, screen coordinate and depth FIFOs,
//!   accumulators)
//! - 32 control registers (rotation/light/color matrices, translation and
//!   color vectors, projection parameters, FLAG)
//!
//! Every command clears FLAG on entry. Accumulation happens in 44-bit
//! logical precision; narrowing saturates and records the condition in FLAG.
//! Overflow never traps.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

mod commands;
mod divide;
#[cfg(test)]
mod tests;

pub use commands::Command;

/// FLAG register bits
pub mod flag {
    /// MAC1 larger than 43 bits (positive)
    pub const MAC1_POSITIVE: u32 = 1 << 30;
    /// MAC2 larger than 43 bits (positive)
    pub const MAC2_POSITIVE: u32 = 1 << 29;
    /// MAC3 larger than 43 bits (positive)
    pub const MAC3_POSITIVE: u32 = 1 << 28;
    /// MAC1 larger than 43 bits (negative)
    pub const MAC1_NEGATIVE: u32 = 1 << 27;
    /// MAC2 larger than 43 bits (negative)
    pub const MAC2_NEGATIVE: u32 = 1 << 26;
    /// MAC3 larger than 43 bits (negative)
    pub const MAC3_NEGATIVE: u32 = 1 << 25;
    /// IR1 saturated
    pub const IR1_SATURATED: u32 = 1 << 24;
    /// IR2 saturated
    pub const IR2_SATURATED: u32 = 1 << 23;
    /// IR3 saturated
    pub const IR3_SATURATED: u32 = 1 << 22;
    /// Color FIFO red saturated to 0..0xFF
    pub const R_SATURATED: u32 = 1 << 21;
    /// Color FIFO green saturated to 0..0xFF
    pub const G_SATURATED: u32 = 1 << 20;
    /// Color FIFO blue saturated to 0..0xFF
    pub const B_SATURATED: u32 = 1 << 19;
    /// SZ3 or OTZ saturated to 0..0xFFFF
    pub const SZ3_OTZ_SATURATED: u32 = 1 << 18;
    /// Perspective divide overflow
    pub const DIVIDE_OVERFLOW: u32 = 1 << 17;
    /// MAC0 larger than 31 bits (positive)
    pub const MAC0_POSITIVE: u32 = 1 << 16;
    /// MAC0 larger than 31 bits (negative)
    pub const MAC0_NEGATIVE: u32 = 1 << 15;
    /// SX2 saturated to -0x400..0x3FF
    pub const SX2_SATURATED: u32 = 1 << 14;
    /// SY2 saturated to -0x400..0x3FF
    pub const SY2_SATURATED: u32 = 1 << 13;
    /// IR0 saturated to 0..0x1000
    pub const IR0_SATURATED: u32 = 1 << 12;
    /// Summary bit, OR of [`ERROR_MASK`]
    pub const ERROR: u32 = 1 << 31;

    /// Bits that feed the summary bit (30..23 and 18..13)
    pub const ERROR_MASK: u32 = 0x7F87_E000;

    /// Bits a CTC2 write can set
    pub const WRITABLE: u32 = 0x7FFF_F000;
}

/// 3x3 matrix of signed 4.12 entries, row major
type Matrix = [[i16; 3]; 3];

/// GTE register file
///
/// # Example
///
/// ```
/// use psrx_core::core::gte::GTE;
///
/// let mut gte = GTE::new();
/// gte.write_data(GTE::LZCS, 0x0000_FFFF);
/// assert_eq!(gte.read_data(GTE::LZCR), 16);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct GTE {
    /// Input vectors V0-V2 (x, y, z)
    v: [[i16; 3]; 3],
    /// Color and GPU code (R, G, B, CODE)
    rgbc: [u8; 4],
    /// Ordering table Z average
    otz: u16,
    /// Interpolation factor
    ir0: i16,
    /// Intermediate vector IR1-IR3
    ir: [i16; 3],
    /// Screen XY FIFO (SXY0, SXY1, SXY2); SXYP mirrors SXY2
    sxy: [[i16; 2]; 3],
    /// Screen Z FIFO (SZ0..SZ3)
    sz: [u16; 4],
    /// Color FIFO (RGB0..RGB2)
    rgb_fifo: [[u8; 4]; 3],
    /// Prohibited register, plain storage
    res1: u32,
    /// Scalar accumulator
    mac0: i32,
    /// Vector accumulators MAC1-MAC3
    mac: [i32; 3],
    /// Leading zero count source
    lzcs: u32,
    /// Leading zero count result
    lzcr: u32,

    /// Rotation matrix
    rt: Matrix,
    /// Translation vector
    tr: [i32; 3],
    /// Light source matrix
    llm: Matrix,
    /// Background color
    bk: [i32; 3],
    /// Light color matrix
    lcm: Matrix,
    /// Far color
    fc: [i32; 3],
    /// Screen offset X (16.16)
    ofx: i32,
    /// Screen offset Y (16.16)
    ofy: i32,
    /// Projection plane distance
    h: u16,
    /// Depth queuing coefficient
    dqa: i16,
    /// Depth queuing offset
    dqb: i32,
    /// Z3 average scale factor
    zsf3: i16,
    /// Z4 average scale factor
    zsf4: i16,

    /// Error flags (control register 31)
    pub flags: u32,
}

impl GTE {
    // Data registers (MFC2/MTC2/LWC2/SWC2)
    pub const VXY0: usize = 0;
    pub const VZ0: usize = 1;
    pub const VXY1: usize = 2;
    pub const VZ1: usize = 3;
    pub const VXY2: usize = 4;
    pub const VZ2: usize = 5;
    pub const RGBC: usize = 6;
    pub const OTZ: usize = 7;
    pub const IR0: usize = 8;
    pub const IR1: usize = 9;
    pub const IR2: usize = 10;
    pub const IR3: usize = 11;
    pub const SXY0: usize = 12;
    pub const SXY1: usize = 13;
    pub const SXY2: usize = 14;
    pub const SXYP: usize = 15;
    pub const SZ0: usize = 16;
    pub const SZ1: usize = 17;
    pub const SZ2: usize = 18;
    pub const SZ3: usize = 19;
    pub const RGB0: usize = 20;
    pub const RGB1: usize = 21;
    pub const RGB2: usize = 22;
    pub const RES1: usize = 23;
    pub const MAC0: usize = 24;
    pub const MAC1: usize = 25;
    pub const MAC2: usize = 26;
    pub const MAC3: usize = 27;
    pub const IRGB: usize = 28;
    pub const ORGB: usize = 29;
    pub const LZCS: usize = 30;
    pub const LZCR: usize = 31;

    // Control registers (CFC2/CTC2)
    pub const RT11_RT12: usize = 0;
    pub const RT13_RT21: usize = 1;
    pub const RT22_RT23: usize = 2;
    pub const RT31_RT32: usize = 3;
    pub const RT33: usize = 4;
    pub const TRX: usize = 5;
    pub const TRY: usize = 6;
    pub const TRZ: usize = 7;
    pub const L11_L12: usize = 8;
    pub const L13_L21: usize = 9;
    pub const L22_L23: usize = 10;
    pub const L31_L32: usize = 11;
    pub const L33: usize = 12;
    pub const RBK: usize = 13;
    pub const GBK: usize = 14;
    pub const BBK: usize = 15;
    pub const LR1_LR2: usize = 16;
    pub const LR3_LG1: usize = 17;
    pub const LG2_LG3: usize = 18;
    pub const LB1_LB2: usize = 19;
    pub const LB3: usize = 20;
    pub const RFC: usize = 21;
    pub const GFC: usize = 22;
    pub const BFC: usize = 23;
    pub const OFX: usize = 24;
    pub const OFY: usize = 25;
    pub const H: usize = 26;
    pub const DQA: usize = 27;
    pub const DQB: usize = 28;
    pub const ZSF3: usize = 29;
    pub const ZSF4: usize = 30;
    pub const FLAG: usize = 31;

    /// Create a GTE with every register cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Read a data register (MFC2/SWC2)
    pub fn read_data(&self, index: usize) -> i32 {
        let index = index & 0x1F;
        match index {
            Self::VXY0 | Self::VXY1 | Self::VXY2 => {
                let v = &self.v[index / 2];
                pack_pair(v[0], v[1])
            }
            Self::VZ0 | Self::VZ1 | Self::VZ2 => i32::from(self.v[index / 2][2]),
            Self::RGBC => i32::from_le_bytes(self.rgbc),
            Self::OTZ => i32::from(self.otz),
            Self::IR0 => i32::from(self.ir0),
            Self::IR1..=Self::IR3 => i32::from(self.ir[index - Self::IR1]),
            Self::SXY0..=Self::SXY2 => {
                let [x, y] = self.sxy[index - Self::SXY0];
                pack_pair(x, y)
            }
            Self::SXYP => {
                let [x, y] = self.sxy[2];
                pack_pair(x, y)
            }
            Self::SZ0..=Self::SZ3 => i32::from(self.sz[index - Self::SZ0]),
            Self::RGB0..=Self::RGB2 => i32::from_le_bytes(self.rgb_fifo[index - Self::RGB0]),
            Self::RES1 => self.res1 as i32,
            Self::MAC0 => self.mac0,
            Self::MAC1..=Self::MAC3 => self.mac[index - Self::MAC1],
            Self::IRGB | Self::ORGB => self.pack_ir_color() as i32,
            Self::LZCS => self.lzcs as i32,
            _ => self.lzcr as i32,
        }
    }

    /// Write a data register (MTC2/LWC2)
    pub fn write_data(&mut self, index: usize, value: i32) {
        let index = index & 0x1F;
        let raw = value as u32;
        match index {
            Self::VXY0 | Self::VXY1 | Self::VXY2 => {
                let (x, y) = unpack_pair(raw);
                let v = &mut self.v[index / 2];
                v[0] = x;
                v[1] = y;
            }
            Self::VZ0 | Self::VZ1 | Self::VZ2 => self.v[index / 2][2] = raw as i16,
            Self::RGBC => self.rgbc = raw.to_le_bytes(),
            Self::OTZ => self.otz = raw as u16,
            Self::IR0 => self.ir0 = raw as i16,
            Self::IR1..=Self::IR3 => self.ir[index - Self::IR1] = raw as i16,
            Self::SXY0..=Self::SXY2 => {
                let (x, y) = unpack_pair(raw);
                self.sxy[index - Self::SXY0] = [x, y];
            }
            Self::SXYP => {
                let (x, y) = unpack_pair(raw);
                self.sxy[0] = self.sxy[1];
                self.sxy[1] = self.sxy[2];
                self.sxy[2] = [x, y];
            }
            Self::SZ0..=Self::SZ3 => self.sz[index - Self::SZ0] = raw as u16,
            Self::RGB0..=Self::RGB2 => self.rgb_fifo[index - Self::RGB0] = raw.to_le_bytes(),
            Self::RES1 => self.res1 = raw,
            Self::MAC0 => self.mac0 = value,
            Self::MAC1..=Self::MAC3 => self.mac[index - Self::MAC1] = value,
            Self::IRGB => {
                // 5:5:5 color expanded to IR1-IR3 (x 0x80)
                self.ir[0] = ((raw & 0x1F) << 7) as i16;
                self.ir[1] = (((raw >> 5) & 0x1F) << 7) as i16;
                self.ir[2] = (((raw >> 10) & 0x1F) << 7) as i16;
            }
            Self::LZCS => {
                self.lzcs = raw;
                self.lzcr = if value < 0 {
                    raw.leading_ones()
                } else {
                    raw.leading_zeros()
                };
            }
            // ORGB and LZCR are read-only
            _ => {}
        }
    }

    /// Read a control register (CFC2)
    pub fn read_control(&self, index: usize) -> i32 {
        let index = index & 0x1F;
        match index {
            Self::RT11_RT12..=Self::RT33 => read_matrix(&self.rt, index - Self::RT11_RT12),
            Self::TRX..=Self::TRZ => self.tr[index - Self::TRX],
            Self::L11_L12..=Self::L33 => read_matrix(&self.llm, index - Self::L11_L12),
            Self::RBK..=Self::BBK => self.bk[index - Self::RBK],
            Self::LR1_LR2..=Self::LB3 => read_matrix(&self.lcm, index - Self::LR1_LR2),
            Self::RFC..=Self::BFC => self.fc[index - Self::RFC],
            Self::OFX => self.ofx,
            Self::OFY => self.ofy,
            // H is unsigned but reads back sign-extended
            Self::H => i32::from(self.h as i16),
            Self::DQA => i32::from(self.dqa),
            Self::DQB => self.dqb,
            Self::ZSF3 => i32::from(self.zsf3),
            Self::ZSF4 => i32::from(self.zsf4),
            _ => self.flags as i32,
        }
    }

    /// Write a control register (CTC2)
    pub fn write_control(&mut self, index: usize, value: i32) {
        let index = index & 0x1F;
        match index {
            Self::RT11_RT12..=Self::RT33 => {
                write_matrix(&mut self.rt, index - Self::RT11_RT12, value)
            }
            Self::TRX..=Self::TRZ => self.tr[index - Self::TRX] = value,
            Self::L11_L12..=Self::L33 => write_matrix(&mut self.llm, index - Self::L11_L12, value),
            Self::RBK..=Self::BBK => self.bk[index - Self::RBK] = value,
            Self::LR1_LR2..=Self::LB3 => {
                write_matrix(&mut self.lcm, index - Self::LR1_LR2, value)
            }
            Self::RFC..=Self::BFC => self.fc[index - Self::RFC] = value,
            Self::OFX => self.ofx = value,
            Self::OFY => self.ofy = value,
            Self::H => self.h = value as u16,
            Self::DQA => self.dqa = value as i16,
            Self::DQB => self.dqb = value,
            Self::ZSF3 => self.zsf3 = value as i16,
            Self::ZSF4 => self.zsf4 = value as i16,
            _ => {
                self.flags = value as u32 & flag::WRITABLE;
                self.update_error_flag();
            }
        }
    }

    /// Execute a GTE command word (COP2 with bit 25 set)
    ///
    /// FLAG is cleared first; unknown command numbers have no other effect.
    pub fn execute(&mut self, command: u32) {
        let command = Command(command);
        self.flags = 0;

        log::trace!("GTE {} (0x{:08X})", command.mnemonic(), command.0);

        match command.number() {
            0x01 => self.rtps(command),
            0x06 => self.nclip(),
            0x0C => self.op(command),
            0x10 => self.dpcs(command),
            0x11 => self.intpl(command),
            0x12 => self.mvmva(command),
            0x13 => self.ncds(command),
            0x14 => self.cdp(command),
            0x16 => self.ncdt(command),
            0x1B => self.nccs(command),
            0x1C => self.cc(command),
            0x1E => self.ncs(command),
            0x20 => self.nct(command),
            0x28 => self.sqr(command),
            0x29 => self.dcpl(command),
            0x2A => self.dpct(command),
            0x2D => self.avsz3(),
            0x2E => self.avsz4(),
            0x30 => self.rtpt(command),
            0x3D => self.gpf(command),
            0x3E => self.gpl(command),
            0x3F => self.ncct(command),
            number => log::trace!("Unknown GTE command 0x{:02X}", number),
        }

        self.update_error_flag();
    }

    /// Recompute FLAG bit 31 from the error bits
    #[inline]
    fn update_error_flag(&mut self) {
        if self.flags & flag::ERROR_MASK != 0 {
            self.flags |= flag::ERROR;
        } else {
            self.flags &= !flag::ERROR;
        }
    }

    /// IR1-IR3 packed as 5:5:5 color (IRGB/ORGB read)
    fn pack_ir_color(&self) -> u32 {
        let channel = |ir: i16| (i32::from(ir) >> 7).clamp(0, 0x1F) as u32;
        channel(self.ir[0]) | (channel(self.ir[1]) << 5) | (channel(self.ir[2]) << 10)
    }
}

#[inline(always)]
fn pack_pair(lo: i16, hi: i16) -> i32 {
    ((lo as u16 as u32) | ((hi as u16 as u32) << 16)) as i32
}

#[inline(always)]
fn unpack_pair(value: u32) -> (i16, i16) {
    (value as i16, (value >> 16) as i16)
}

/// Matrices are stored as five words: four packed pairs and a lone entry
fn read_matrix(m: &Matrix, word: usize) -> i32 {
    let entry = |n: usize| m[n / 3][n % 3];
    if word == 4 {
        i32::from(entry(8))
    } else {
        pack_pair(entry(word * 2), entry(word * 2 + 1))
    }
}

fn write_matrix(m: &mut Matrix, word: usize, value: i32) {
    let (lo, hi) = unpack_pair(value as u32);
    let n = word * 2;
    m[n / 3][n % 3] = lo;
    if word != 4 {
        m[(n + 1) / 3][(n + 1) % 3] = hi;
    }
}
