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

//! COP2 (GTE) instruction implementations
//!
//! Register transfers between the CPU and the Geometry Transformation Engine,
//! GTE commands, and the LWC2/SWC2 memory transfers.

use super::super::cop0::Status;
use super::super::decode::Instruction;
use super::super::{ExceptionCause, CPU};
use crate::core::error::Result;
use crate::core::memory::{AccessWidth, Bus};

impl CPU {
    /// COP2 access is gated by SR.CU2 in user mode
    pub(in crate::core::cpu) fn cop2_usable(&self) -> bool {
        !self.cop0.user_mode() || self.cop0.status().contains(Status::CU2)
    }

    /// MFC2: Move From Coprocessor 2 (data register)
    ///
    /// Format: MFC2 rt, rd
    /// - rt: CPU destination register (bits [20:16])
    /// - rd: GTE data register (bits [15:11])
    ///
    /// # Example
    ///
    /// ```text
    /// MFC2 r5, [25]  // r5 = GTE.data[25] (MAC1)
    /// ```
    pub(in crate::core::cpu) fn op_mfc2(&mut self, instr: Instruction) -> Result<()> {
        let (rt, rd) = (instr.rt(), instr.rd());

        let value = self.gte.read_data(rd as usize);
        self.set_reg_delayed(rt, value as u32);

        log::trace!("MFC2: r{} = GTE.data[{}] (0x{:08X})", rt, rd, value);
        Ok(())
    }

    /// CFC2: Move From Coprocessor 2 (control register)
    ///
    /// Format: CFC2 rt, rd
    ///
    /// # Example
    ///
    /// ```text
    /// CFC2 r5, [26]  // r5 = GTE.control[26] (H)
    /// ```
    pub(in crate::core::cpu) fn op_cfc2(&mut self, instr: Instruction) -> Result<()> {
        let (rt, rd) = (instr.rt(), instr.rd());

        let value = self.gte.read_control(rd as usize);
        self.set_reg_delayed(rt, value as u32);

        log::trace!("CFC2: r{} = GTE.control[{}] (0x{:08X})", rt, rd, value);
        Ok(())
    }

    /// MTC2: Move To Coprocessor 2 (data register)
    ///
    /// Format: MTC2 rt, rd
    pub(in crate::core::cpu) fn op_mtc2(&mut self, instr: Instruction) -> Result<()> {
        let (rt, rd) = (instr.rt(), instr.rd());

        let value = self.reg(rt) as i32;
        self.gte.write_data(rd as usize, value);

        log::trace!("MTC2: GTE.data[{}] = r{} (0x{:08X})", rd, rt, value);
        Ok(())
    }

    /// CTC2: Move To Coprocessor 2 (control register)
    ///
    /// Format: CTC2 rt, rd
    pub(in crate::core::cpu) fn op_ctc2(&mut self, instr: Instruction) -> Result<()> {
        let (rt, rd) = (instr.rt(), instr.rd());

        let value = self.reg(rt) as i32;
        self.gte.write_control(rd as usize, value);

        log::trace!("CTC2: GTE.control[{}] = r{} (0x{:08X})", rd, rt, value);
        Ok(())
    }

    /// Execute GTE command
    ///
    /// Format: COP2 imm25
    ///
    /// # Common Commands
    ///
    /// - 0x4A180001: RTPS (Rotate, Translate, Perspective transform Single)
    /// - 0x4A280030: RTPT (Rotate, Translate, Perspective transform Triple)
    /// - 0x4A000006: NCLIP (Normal clipping)
    pub(in crate::core::cpu) fn op_gte_command(&mut self, instr: Instruction) -> Result<()> {
        self.gte.execute(instr.0);
        Ok(())
    }

    /// LWC2: Load Word to Coprocessor 2
    ///
    /// Format: lwc2 rt, offset(rs)
    /// Operation: GTE.data[rt] = memory[rs + sign_extend(offset)]
    pub(in crate::core::cpu) fn op_lwc2(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        if !self.cop2_usable() {
            self.exception_with_coprocessor(ExceptionCause::CoprocessorUnusable, 2);
            return Ok(());
        }

        let addr = self.effective_address(instr);
        if let Some(value) = self.load(bus, addr, AccessWidth::Word)? {
            self.gte.write_data(instr.rt() as usize, value as i32);
            log::trace!("LWC2: GTE.data[{}] = [0x{:08X}] (0x{:08X})", instr.rt(), addr, value);
        }
        Ok(())
    }

    /// SWC2: Store Word from Coprocessor 2
    ///
    /// Format: swc2 rt, offset(rs)
    /// Operation: memory[rs + sign_extend(offset)] = GTE.data[rt]
    pub(in crate::core::cpu) fn op_swc2(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        if !self.cop2_usable() {
            self.exception_with_coprocessor(ExceptionCause::CoprocessorUnusable, 2);
            return Ok(());
        }

        let addr = self.effective_address(instr);
        let value = self.gte.read_data(instr.rt() as usize) as u32;
        log::trace!("SWC2: [0x{:08X}] = GTE.data[{}] (0x{:08X})", addr, instr.rt(), value);
        self.store(bus, addr, AccessWidth::Word, value)
    }
}
