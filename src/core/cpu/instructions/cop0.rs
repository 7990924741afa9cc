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

//! Coprocessor 0 (System Control) instructions

use super::super::cop0::Status;
use super::super::decode::Instruction;
use super::super::{ExceptionCause, CPU};
use crate::core::error::Result;

impl CPU {
    /// COP0 is always usable in kernel mode, and in user mode only with CU0
    fn cop0_usable(&mut self) -> bool {
        if self.cop0.user_mode() && !self.cop0.status().contains(Status::CU0) {
            self.exception_with_coprocessor(ExceptionCause::CoprocessorUnusable, 0);
            return false;
        }
        true
    }

    /// MFC0: Move From Coprocessor 0
    ///
    /// Moves the contents of a COP0 register to a general-purpose register,
    /// through the load delay slot. Registers 16-31 do not exist and raise a
    /// reserved instruction exception.
    ///
    /// # Format
    ///
    /// MFC0 rt, rd
    ///
    /// # Example
    ///
    /// ```text
    /// MFC0 $t0, $12  # Move Status Register to $t0
    /// ```
    pub(in crate::core::cpu) fn op_mfc0(&mut self, instr: Instruction) -> Result<()> {
        if !self.cop0_usable() {
            return Ok(());
        }

        match self.cop0.read(instr.rd() as usize) {
            Some(value) => self.set_reg_delayed(instr.rt(), value),
            None => self.exception(ExceptionCause::ReservedInstruction),
        }
        Ok(())
    }

    /// MTC0: Move To Coprocessor 0
    ///
    /// Only the writable bits of the target register change.
    ///
    /// # Format
    ///
    /// MTC0 rt, rd
    ///
    /// # Example
    ///
    /// ```text
    /// MTC0 $t0, $12  # Move $t0 to Status Register
    /// ```
    pub(in crate::core::cpu) fn op_mtc0(&mut self, instr: Instruction) -> Result<()> {
        if !self.cop0_usable() {
            return Ok(());
        }

        let value = self.reg(instr.rt());
        if !self.cop0.write(instr.rd() as usize, value) {
            self.exception(ExceptionCause::ReservedInstruction);
        }
        Ok(())
    }

    /// RFE: Return From Exception
    ///
    /// Pops the KU/IE stack: previous becomes current, old becomes
    /// previous. The old pair itself is left unchanged. Control transfer
    /// back to EPC is done by the JR in the RFE's preceding slot.
    pub(in crate::core::cpu) fn op_rfe(&mut self, _instr: Instruction) -> Result<()> {
        if !self.cop0_usable() {
            return Ok(());
        }

        self.cop0.return_from_exception();
        Ok(())
    }
}
