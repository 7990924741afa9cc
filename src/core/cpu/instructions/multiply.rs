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

use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Multiply and Divide Instructions ===

    /// MULT: Multiply (signed)
    ///
    /// Multiplies two signed 32-bit values into a 64-bit result split across
    /// HI (upper) and LO (lower).
    ///
    /// Format: mult rs, rt
    pub(in crate::core::cpu) fn op_mult(&mut self, rs: u8, rt: u8) -> Result<()> {
        let a = self.reg(rs) as i32 as i64;
        let b = self.reg(rt) as i32 as i64;
        let result = (a * b) as u64;

        self.hi = (result >> 32) as u32;
        self.lo = result as u32;
        Ok(())
    }

    /// MULTU: Multiply Unsigned
    ///
    /// Format: multu rs, rt
    pub(in crate::core::cpu) fn op_multu(&mut self, rs: u8, rt: u8) -> Result<()> {
        let a = self.reg(rs) as u64;
        let b = self.reg(rt) as u64;
        let result = a * b;

        self.hi = (result >> 32) as u32;
        self.lo = result as u32;
        Ok(())
    }

    /// DIV: Divide (signed)
    ///
    /// LO = quotient, HI = remainder. Division never traps; the hardware
    /// results for the edge cases are:
    ///
    /// | case              | LO                         | HI       |
    /// |-------------------|----------------------------|----------|
    /// | n / 0, n >= 0     | 0xFFFFFFFF                 | n        |
    /// | n / 0, n < 0      | 1                          | n        |
    /// | 0x80000000 / -1   | 0x80000000                 | 0        |
    ///
    /// Format: div rs, rt
    pub(in crate::core::cpu) fn op_div(&mut self, rs: u8, rt: u8) -> Result<()> {
        let n = self.reg(rs) as i32;
        let d = self.reg(rt) as i32;

        if d == 0 {
            self.hi = n as u32;
            self.lo = if n >= 0 { 0xFFFF_FFFF } else { 1 };
        } else if n == i32::MIN && d == -1 {
            self.hi = 0;
            self.lo = i32::MIN as u32;
        } else {
            self.hi = (n % d) as u32;
            self.lo = (n / d) as u32;
        }
        Ok(())
    }

    /// DIVU: Divide Unsigned
    ///
    /// Division by zero yields LO = 0xFFFFFFFF and HI = dividend.
    ///
    /// Format: divu rs, rt
    pub(in crate::core::cpu) fn op_divu(&mut self, rs: u8, rt: u8) -> Result<()> {
        let n = self.reg(rs);
        let d = self.reg(rt);

        if d == 0 {
            self.hi = n;
            self.lo = 0xFFFF_FFFF;
        } else {
            self.hi = n % d;
            self.lo = n / d;
        }
        Ok(())
    }

    /// MFHI: Move From HI
    pub(in crate::core::cpu) fn op_mfhi(&mut self, rd: u8) -> Result<()> {
        self.set_reg(rd, self.hi);
        Ok(())
    }

    /// MTHI: Move To HI
    pub(in crate::core::cpu) fn op_mthi(&mut self, rs: u8) -> Result<()> {
        self.hi = self.reg(rs);
        Ok(())
    }

    /// MFLO: Move From LO
    pub(in crate::core::cpu) fn op_mflo(&mut self, rd: u8) -> Result<()> {
        self.set_reg(rd, self.lo);
        Ok(())
    }

    /// MTLO: Move To LO
    pub(in crate::core::cpu) fn op_mtlo(&mut self, rs: u8) -> Result<()> {
        self.lo = self.reg(rs);
        Ok(())
    }
}
