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

//! Exception-triggering instructions

use super::super::decode::Instruction;
use super::super::ExceptionCause;
use super::CPU;
use crate::core::error::Result;

impl CPU {
    /// SYSCALL: System Call
    ///
    /// Transfers control to the exception handler. Programs use it to
    /// request kernel services; the 20-bit code field is ignored.
    pub(in crate::core::cpu) fn op_syscall(&mut self, _instr: Instruction) -> Result<()> {
        self.exception(ExceptionCause::Syscall);
        Ok(())
    }

    /// BREAK: Breakpoint
    pub(in crate::core::cpu) fn op_break(&mut self, _instr: Instruction) -> Result<()> {
        self.exception(ExceptionCause::Breakpoint);
        Ok(())
    }

    /// Any opcode, function or coprocessor sub-op with no instruction behind it
    pub(in crate::core::cpu) fn op_reserved(&mut self, instr: Instruction) -> Result<()> {
        log::warn!(
            "Reserved instruction 0x{:08X} at PC=0x{:08X}",
            instr.0,
            self.current_pc
        );
        self.exception(ExceptionCause::ReservedInstruction);
        Ok(())
    }

    /// COP1, COP3 and the LWCz/SWCz forms for coprocessors 0, 1 and 3
    pub(in crate::core::cpu) fn op_coprocessor_unusable(&mut self, instr: Instruction) -> Result<()> {
        let coprocessor = instr.cop_number();
        log::warn!(
            "Coprocessor {} unusable: 0x{:08X} at PC=0x{:08X}",
            coprocessor,
            instr.0,
            self.current_pc
        );
        self.exception_with_coprocessor(ExceptionCause::CoprocessorUnusable, coprocessor);
        Ok(())
    }
}
