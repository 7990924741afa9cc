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

//! GTE command implementations
//!
//! Fixed-point conventions: matrices and IR0 are 1.3.12, vectors are 1.15.0
//! (or 1.3.12 for normals), translation and far/background colors are added
//! as `value << 12` so the 44-bit sum lines up with the products.

use super::divide::{divide, DIVIDE_MAX};
use super::{flag, Matrix, GTE};

/// GTE command word
///
/// ```text
/// 31-25  COP2 + CO (0x4A)
/// 19     sf  shift results right by 12
/// 17-18  mx  MVMVA matrix (RT, LLM, LCM, reserved)
/// 15-16  v   MVMVA vector (V0, V1, V2, IR)
/// 13-14  cv  MVMVA translation (TR, BK, FC, none)
/// 10     lm  clamp IR results to 0..0x7FFF instead of -0x8000..0x7FFF
/// 0-5        command number
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command(pub u32);

impl Command {
    /// Base encoding of a COP2 command instruction
    const COP2_COMMAND: u32 = 0x4A00_0000;

    /// Command instruction for `number` with all fields clear
    pub fn new(number: u32) -> Self {
        Command(Self::COP2_COMMAND | (number & 0x3F))
    }

    /// Set the sf bit
    pub fn with_sf(self) -> Self {
        Command(self.0 | (1 << 19))
    }

    /// Set the lm bit
    pub fn with_lm(self) -> Self {
        Command(self.0 | (1 << 10))
    }

    /// Set the MVMVA matrix, vector and translation selectors
    pub fn with_mvmva(self, mx: u32, v: u32, cv: u32) -> Self {
        Command(self.0 | ((mx & 3) << 17) | ((v & 3) << 15) | ((cv & 3) << 13))
    }

    /// Command number (bits 0-5)
    #[inline(always)]
    pub fn number(self) -> u32 {
        self.0 & 0x3F
    }

    /// Result shift: 12 when sf is set, else 0
    #[inline(always)]
    pub fn shift(self) -> u32 {
        if self.0 & (1 << 19) != 0 {
            12
        } else {
            0
        }
    }

    /// IR lower limit is 0 instead of -0x8000
    #[inline(always)]
    pub fn lm(self) -> bool {
        self.0 & (1 << 10) != 0
    }

    /// MVMVA matrix selector
    pub fn matrix(self) -> u32 {
        (self.0 >> 17) & 3
    }

    /// MVMVA vector selector
    pub fn vector(self) -> u32 {
        (self.0 >> 15) & 3
    }

    /// MVMVA translation selector
    pub fn translation(self) -> u32 {
        (self.0 >> 13) & 3
    }

    /// Assembler mnemonic, `"???"` for unknown numbers
    pub fn mnemonic(self) -> &'static str {
        match self.number() {
            0x01 => "rtps",
            0x06 => "nclip",
            0x0C => "op",
            0x10 => "dpcs",
            0x11 => "intpl",
            0x12 => "mvmva",
            0x13 => "ncds",
            0x14 => "cdp",
            0x16 => "ncdt",
            0x1B => "nccs",
            0x1C => "cc",
            0x1E => "ncs",
            0x20 => "nct",
            0x28 => "sqr",
            0x29 => "dcpl",
            0x2A => "dpct",
            0x2D => "avsz3",
            0x2E => "avsz4",
            0x30 => "rtpt",
            0x3D => "gpf",
            0x3E => "gpl",
            0x3F => "ncct",
            _ => "???",
        }
    }
}

// Saturation and FIFO helpers
impl GTE {
    /// Flag a MAC1-3 intermediate outside 44 bits and wrap it to 44 bits
    #[inline]
    fn check_mac(&mut self, lane: usize, value: i64) -> i64 {
        if value > (1 << 43) - 1 {
            self.flags |= flag::MAC1_POSITIVE >> lane;
        } else if value < -(1 << 43) {
            self.flags |= flag::MAC1_NEGATIVE >> lane;
        }
        (value << 20) >> 20
    }

    /// Store `value >> shift` into MAC1-3
    #[inline]
    fn set_mac(&mut self, lane: usize, value: i64, shift: u32) -> i32 {
        let value = self.check_mac(lane, value);
        let mac = (value >> shift) as i32;
        self.mac[lane] = mac;
        mac
    }

    /// Saturate into IR1-3
    #[inline]
    fn set_ir(&mut self, lane: usize, value: i32, lm: bool) {
        let min = if lm { 0 } else { -0x8000 };
        if value < min || value > 0x7FFF {
            self.flags |= flag::IR1_SATURATED >> lane;
        }
        self.ir[lane] = value.clamp(min, 0x7FFF) as i16;
    }

    #[inline]
    fn set_mac_ir(&mut self, lane: usize, value: i64, shift: u32, lm: bool) {
        let mac = self.set_mac(lane, value, shift);
        self.set_ir(lane, mac, lm);
    }

    /// Store into MAC0, flagging values outside 32 bits
    #[inline]
    fn set_mac0(&mut self, value: i64) {
        if value > i64::from(i32::MAX) {
            self.flags |= flag::MAC0_POSITIVE;
        } else if value < i64::from(i32::MIN) {
            self.flags |= flag::MAC0_NEGATIVE;
        }
        self.mac0 = value as i32;
    }

    #[inline]
    fn set_ir0(&mut self, value: i64) {
        if !(0..=0x1000).contains(&value) {
            self.flags |= flag::IR0_SATURATED;
        }
        self.ir0 = value.clamp(0, 0x1000) as i16;
    }

    /// Push a depth onto the SZ FIFO, returning the saturated value
    fn push_sz(&mut self, value: i64) -> u16 {
        if !(0..=0xFFFF).contains(&value) {
            self.flags |= flag::SZ3_OTZ_SATURATED;
        }
        let sz3 = value.clamp(0, 0xFFFF) as u16;
        self.sz.copy_within(1.., 0);
        self.sz[3] = sz3;
        sz3
    }

    fn push_sxy(&mut self, x: i64, y: i64) {
        if !(-0x400..=0x3FF).contains(&x) {
            self.flags |= flag::SX2_SATURATED;
        }
        if !(-0x400..=0x3FF).contains(&y) {
            self.flags |= flag::SY2_SATURATED;
        }
        self.sxy[0] = self.sxy[1];
        self.sxy[1] = self.sxy[2];
        self.sxy[2] = [x.clamp(-0x400, 0x3FF) as i16, y.clamp(-0x400, 0x3FF) as i16];
    }

    /// Push MAC1-3 / 16 onto the color FIFO with the current CODE byte
    fn push_color(&mut self) {
        let mut color = [0u8; 4];
        for (lane, out) in color.iter_mut().take(3).enumerate() {
            let c = self.mac[lane] >> 4;
            if !(0..=0xFF).contains(&c) {
                self.flags |= flag::R_SATURATED >> lane;
            }
            *out = c.clamp(0, 0xFF) as u8;
        }
        color[3] = self.rgbc[3];

        self.rgb_fifo[0] = self.rgb_fifo[1];
        self.rgb_fifo[1] = self.rgb_fifo[2];
        self.rgb_fifo[2] = color;
    }

    /// `base + m * v` per row, flag-checked after every addition
    fn mat_vec_acc(&mut self, m: Matrix, base: [i64; 3], v: [i16; 3]) -> [i64; 3] {
        let mut out = base;
        for (row, acc) in out.iter_mut().enumerate() {
            for col in 0..3 {
                let product = i64::from(m[row][col]) * i64::from(v[col]);
                *acc = self.check_mac(row, *acc + product);
            }
        }
        out
    }

    /// `MAC = (base + m * v) >> shift`, `IR = saturate(MAC)`
    fn mat_vec(&mut self, m: Matrix, base: [i64; 3], v: [i16; 3], shift: u32, lm: bool) {
        let acc = self.mat_vec_acc(m, base, v);
        for (lane, value) in acc.into_iter().enumerate() {
            self.set_mac_ir(lane, value, shift, lm);
        }
    }

    fn translation(v: [i32; 3]) -> [i64; 3] {
        v.map(|c| i64::from(c) << 12)
    }

    /// `[R*IR1, G*IR2, B*IR3] << 4`
    fn color_times_ir(&self) -> [i64; 3] {
        [0, 1, 2].map(|lane| (i64::from(self.rgbc[lane]) * i64::from(self.ir[lane])) << 4)
    }

    /// Interpolate `base` towards the far color by IR0 and push the result
    fn interpolate(&mut self, base: [i64; 3], command: Command) {
        let shift = command.shift();
        let lm = command.lm();

        for (lane, value) in base.into_iter().enumerate() {
            let far = (i64::from(self.fc[lane]) << 12) - value;
            self.set_mac_ir(lane, far, shift, false);
        }
        for (lane, value) in base.into_iter().enumerate() {
            let acc = i64::from(self.ir[lane]) * i64::from(self.ir0) + value;
            self.set_mac_ir(lane, acc, shift, lm);
        }

        self.push_color();
    }

    /// Rotate, translate and project vertex `n`
    ///
    /// Returns the projection factor for depth cueing.
    fn rtp(&mut self, n: usize, command: Command) -> i64 {
        let shift = command.shift();
        let lm = command.lm();

        let acc = self.mat_vec_acc(self.rt, Self::translation(self.tr), self.v[n]);
        self.set_mac_ir(0, acc[0], shift, lm);
        self.set_mac_ir(1, acc[1], shift, lm);
        let mac3 = self.set_mac(2, acc[2], shift);

        // IR3 is flagged from the depth before the sf shift, but takes MAC3
        let z = acc[2] >> 12;
        if !(-0x8000..=0x7FFF).contains(&z) {
            self.flags |= flag::IR3_SATURATED;
        }
        let min = if lm { 0 } else { -0x8000 };
        self.ir[2] = mac3.clamp(min, 0x7FFF) as i16;

        let sz3 = self.push_sz(z);
        let factor = match divide(self.h, sz3) {
            Some(q) => q,
            None => {
                self.flags |= flag::DIVIDE_OVERFLOW;
                DIVIDE_MAX
            }
        };
        let factor = i64::from(factor);

        let sx = factor * i64::from(self.ir[0]) + i64::from(self.ofx);
        self.set_mac0(sx);
        let sy = factor * i64::from(self.ir[1]) + i64::from(self.ofy);
        self.set_mac0(sy);
        self.push_sxy(sx >> 16, sy >> 16);

        factor
    }

    fn depth_cue(&mut self, factor: i64) {
        let depth = factor * i64::from(self.dqa) + i64::from(self.dqb);
        self.set_mac0(depth);
        self.set_ir0(depth >> 12);
    }

    /// IR = LLM * v, then IR = BK + LCM * IR
    fn light(&mut self, v: [i16; 3], command: Command) {
        let shift = command.shift();
        let lm = command.lm();
        self.mat_vec(self.llm, [0; 3], v, shift, lm);
        self.mat_vec(self.lcm, Self::translation(self.bk), self.ir, shift, lm);
    }

    /// MAC = color * IR, saturate and push
    fn modulate(&mut self, command: Command) {
        let base = self.color_times_ir();
        for (lane, value) in base.into_iter().enumerate() {
            self.set_mac_ir(lane, value, command.shift(), command.lm());
        }
        self.push_color();
    }
}

// Commands
impl GTE {
    /// RTPS: perspective transform V0
    pub(super) fn rtps(&mut self, command: Command) {
        let factor = self.rtp(0, command);
        self.depth_cue(factor);
    }

    /// RTPT: perspective transform V0, V1, V2
    pub(super) fn rtpt(&mut self, command: Command) {
        self.rtp(0, command);
        self.rtp(1, command);
        let factor = self.rtp(2, command);
        self.depth_cue(factor);
    }

    /// NCLIP: winding of the triangle in the SXY FIFO
    pub(super) fn nclip(&mut self) {
        let [p0, p1, p2] = self.sxy.map(|[x, y]| (i64::from(x), i64::from(y)));
        let area = p0.0 * p1.1 + p1.0 * p2.1 + p2.0 * p0.1
            - p0.0 * p2.1
            - p1.0 * p0.1
            - p2.0 * p1.1;
        self.set_mac0(area);
    }

    /// OP: outer product of IR with the RT diagonal
    pub(super) fn op(&mut self, command: Command) {
        let d = [self.rt[0][0], self.rt[1][1], self.rt[2][2]].map(i64::from);
        let ir = self.ir.map(i64::from);

        let cross = [
            ir[2] * d[1] - ir[1] * d[2],
            ir[0] * d[2] - ir[2] * d[0],
            ir[1] * d[0] - ir[0] * d[1],
        ];
        for (lane, value) in cross.into_iter().enumerate() {
            self.set_mac_ir(lane, value, command.shift(), command.lm());
        }
    }

    /// DPCS: depth cue RGBC
    pub(super) fn dpcs(&mut self, command: Command) {
        let base = [0, 1, 2].map(|lane| i64::from(self.rgbc[lane]) << 16);
        self.interpolate(base, command);
    }

    /// DPCT: depth cue the color FIFO three times
    pub(super) fn dpct(&mut self, command: Command) {
        for _ in 0..3 {
            let oldest = self.rgb_fifo[0];
            let base = [0, 1, 2].map(|lane| i64::from(oldest[lane]) << 16);
            self.interpolate(base, command);
        }
    }

    /// INTPL: interpolate IR towards the far color
    pub(super) fn intpl(&mut self, command: Command) {
        let base = self.ir.map(|ir| i64::from(ir) << 12);
        self.interpolate(base, command);
    }

    /// DCPL: depth cue color times IR
    pub(super) fn dcpl(&mut self, command: Command) {
        let base = self.color_times_ir();
        self.interpolate(base, command);
    }

    /// MVMVA: generic matrix * vector + translation
    pub(super) fn mvmva(&mut self, command: Command) {
        let shift = command.shift();
        let lm = command.lm();

        let m = match command.matrix() {
            0 => self.rt,
            1 => self.llm,
            2 => self.lcm,
            _ => {
                // Reserved selector reads a fixed mix of registers
                let r = i16::from(self.rgbc[0]) << 4;
                [
                    [-r, r, self.ir0],
                    [self.rt[0][2]; 3],
                    [self.rt[1][1]; 3],
                ]
            }
        };
        let v = match command.vector() {
            n @ 0..=2 => self.v[n as usize],
            _ => self.ir,
        };
        let base = match command.translation() {
            0 => Self::translation(self.tr),
            1 => Self::translation(self.bk),
            2 => Self::translation(self.fc),
            _ => [0; 3],
        };

        if command.translation() != 2 {
            self.mat_vec(m, base, v, shift, lm);
            return;
        }

        // Far color: the first column only feeds the flags, the result is
        // built from the remaining two columns.
        for lane in 0..3 {
            let partial = base[lane] + i64::from(m[lane][0]) * i64::from(v[0]);
            let partial = self.check_mac(lane, partial);
            self.set_ir(lane, (partial >> shift) as i32, false);
        }
        for lane in 0..3 {
            let acc = self.check_mac(lane, i64::from(m[lane][1]) * i64::from(v[1]));
            let acc = self.check_mac(lane, acc + i64::from(m[lane][2]) * i64::from(v[2]));
            self.set_mac_ir(lane, acc, shift, lm);
        }
    }

    /// NCS: normal color, single vertex
    pub(super) fn ncs(&mut self, command: Command) {
        self.light(self.v[0], command);
        self.push_color();
    }

    /// NCT: normal color, three vertices
    pub(super) fn nct(&mut self, command: Command) {
        for n in 0..3 {
            self.light(self.v[n], command);
            self.push_color();
        }
    }

    /// NCCS: normal color color, single vertex
    pub(super) fn nccs(&mut self, command: Command) {
        self.light(self.v[0], command);
        self.modulate(command);
    }

    /// NCCT: normal color color, three vertices
    pub(super) fn ncct(&mut self, command: Command) {
        for n in 0..3 {
            self.light(self.v[n], command);
            self.modulate(command);
        }
    }

    /// NCDS: normal color depth cue, single vertex
    pub(super) fn ncds(&mut self, command: Command) {
        self.light(self.v[0], command);
        let base = self.color_times_ir();
        self.interpolate(base, command);
    }

    /// NCDT: normal color depth cue, three vertices
    pub(super) fn ncdt(&mut self, command: Command) {
        for n in 0..3 {
            self.light(self.v[n], command);
            let base = self.color_times_ir();
            self.interpolate(base, command);
        }
    }

    /// CC: color color (light color matrix applied to IR)
    pub(super) fn cc(&mut self, command: Command) {
        self.mat_vec(
            self.lcm,
            Self::translation(self.bk),
            self.ir,
            command.shift(),
            command.lm(),
        );
        self.modulate(command);
    }

    /// CDP: color depth cue
    pub(super) fn cdp(&mut self, command: Command) {
        self.mat_vec(
            self.lcm,
            Self::translation(self.bk),
            self.ir,
            command.shift(),
            command.lm(),
        );
        let base = self.color_times_ir();
        self.interpolate(base, command);
    }

    /// SQR: square IR1-3
    pub(super) fn sqr(&mut self, command: Command) {
        for lane in 0..3 {
            let ir = i64::from(self.ir[lane]);
            self.set_mac_ir(lane, ir * ir, command.shift(), command.lm());
        }
    }

    /// AVSZ3: average of three Z values for ordering tables
    pub(super) fn avsz3(&mut self) {
        let sum: i64 = self.sz[1..].iter().map(|&z| i64::from(z)).sum();
        self.average_z(i64::from(self.zsf3) * sum);
    }

    /// AVSZ4: average of four Z values
    pub(super) fn avsz4(&mut self) {
        let sum: i64 = self.sz.iter().map(|&z| i64::from(z)).sum();
        self.average_z(i64::from(self.zsf4) * sum);
    }

    fn average_z(&mut self, value: i64) {
        self.set_mac0(value);
        let otz = value >> 12;
        if !(0..=0xFFFF).contains(&otz) {
            self.flags |= flag::SZ3_OTZ_SATURATED;
        }
        self.otz = otz.clamp(0, 0xFFFF) as u16;
    }

    /// GPF: general purpose interpolation (IR * IR0)
    pub(super) fn gpf(&mut self, command: Command) {
        for lane in 0..3 {
            let value = i64::from(self.ir[lane]) * i64::from(self.ir0);
            self.set_mac_ir(lane, value, command.shift(), command.lm());
        }
        self.push_color();
    }

    /// GPL: general purpose interpolation with base (MAC + IR * IR0)
    pub(super) fn gpl(&mut self, command: Command) {
        let shift = command.shift();
        for lane in 0..3 {
            let base = i64::from(self.mac[lane]) << shift;
            let value = self.check_mac(lane, base + i64::from(self.ir[lane]) * i64::from(self.ir0));
            self.set_mac_ir(lane, value, shift, command.lm());
        }
        self.push_color();
    }
}
