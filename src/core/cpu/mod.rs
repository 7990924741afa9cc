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

//! MIPS R3000A interpreter
//!
//! The CPU owns the general purpose register file, HI/LO, the program counter
//! triplet, both delay slots, COP0 and the GTE. Memory is reached only through
//! the [`Bus`] handed to [`CPU::step`].

use crate::core::error::{EmulatorError, Result};
use crate::core::gte::GTE;
use crate::core::memory::{translate_address, AccessWidth, Bus};
use crate::core::save_state::{CPUState, StateSave};

/// CPU (MIPS R3000A) emulation implementation
///
/// # Specifications
/// - Architecture: MIPS I (32-bit)
/// - Clock frequency: 33.8688 MHz
/// - Registers: 32 general-purpose registers + HI/LO
/// - Coprocessors: COP0 (system control), COP2 (GTE)
///
/// # Example
/// ```
/// use psrx_core::core::cpu::CPU;
///
/// let mut cpu = CPU::new();
/// cpu.reset();
/// assert_eq!(cpu.reg(0), 0); // r0 is always 0
/// assert_eq!(cpu.pc(), 0xBFC0_0000);
/// ```
pub struct CPU {
    /// General purpose registers (r0-r31)
    ///
    /// r0 is hardwired to always return 0
    regs: [u32; 32],

    /// HI register (multiplication/division result upper 32 bits)
    hi: u32,

    /// LO register (multiplication/division result lower 32 bits)
    lo: u32,

    /// Address of the next instruction to fetch
    pc: u32,

    /// Address fetched after `pc`; branches redirect this one
    next_pc: u32,

    /// Address of the instruction currently executing
    current_pc: u32,

    /// Set by a branch or jump: the next instruction is its delay slot
    branch: bool,

    /// The instruction currently executing sits in a delay slot
    delay_slot: bool,

    /// Load issued by the last instruction, visible after the next one
    load_delay: Option<LoadDelay>,

    /// Load retiring at the end of the current step
    retiring: Option<LoadDelay>,

    /// Register written directly by the current instruction
    written: Option<u8>,

    /// Coprocessor 0 (System Control Unit)
    cop0: COP0,

    /// Coprocessor 2 (Geometry Transformation Engine)
    gte: GTE,

    /// Current instruction (for debugging)
    current_instruction: Instruction,

    /// Total cycles consumed since reset
    cycles: u64,

    /// Address of the most recent access that raised IBE/DBE
    last_bus_error: Option<u32>,

    /// Observer for BIOS A/B function calls
    hook: Option<Box<dyn KernelCallHook>>,
}

/// Load delay management structure
///
/// The result of a load is not visible to the instruction immediately
/// following it. The pending value is held here for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadDelay {
    /// Target register
    pub reg: u8,
    /// Value to load
    pub value: u32,
}

// Module declarations
mod cop0;
mod decode;
mod disassembler;
mod hooks;
mod instructions;
#[cfg(test)]
mod tests;
mod tracer;

// Re-exports
use cop0::COP0;
pub use cop0::{ExceptionCause, Status};
pub use decode::Instruction;
pub use disassembler::Disassembler;
pub use hooks::{KernelCallHook, KernelCallLogger};
pub use tracer::CpuTracer;

impl CPU {
    /// Reset vector (BIOS entry point)
    pub const RESET_VECTOR: u32 = 0xBFC0_0000;

    /// Physical address of the BIOS A-function dispatcher
    pub const A_FUNCTION_ADDRESS: u32 = 0xA0;

    /// Physical address of the BIOS B-function dispatcher
    pub const B_FUNCTION_ADDRESS: u32 = 0xB0;

    /// Create a new CPU instance with initial state
    ///
    /// The CPU is initialized with the following state:
    /// - All general purpose registers: 0
    /// - PC: 0xBFC00000 (BIOS entry point)
    /// - next_pc: 0xBFC00004
    /// - COP0 SR: 0x10400000
    /// - COP0 PRID: 0x00000002
    pub fn new() -> Self {
        Self {
            regs: [0u32; 32],
            hi: 0,
            lo: 0,
            pc: Self::RESET_VECTOR,
            next_pc: Self::RESET_VECTOR.wrapping_add(4),
            current_pc: Self::RESET_VECTOR,
            branch: false,
            delay_slot: false,
            load_delay: None,
            retiring: None,
            written: None,
            cop0: COP0::new(),
            gte: GTE::new(),
            current_instruction: Instruction(0),
            cycles: 0,
            last_bus_error: None,
            hook: None,
        }
    }

    /// Reset CPU to initial state
    ///
    /// Mimics power-on. An installed kernel-call hook survives the reset.
    pub fn reset(&mut self) {
        let hook = self.hook.take();
        *self = Self::new();
        self.hook = hook;
    }

    /// Read from general purpose register
    ///
    /// # Example
    /// ```
    /// use psrx_core::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// assert_eq!(cpu.reg(0), 0); // r0 is always 0
    /// ```
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        self.regs[(index & 0x1F) as usize]
    }

    /// Write to general purpose register
    ///
    /// Writes to r0 are ignored. A direct write cancels a pending load to the
    /// same register that would otherwise retire at the end of this step.
    ///
    /// # Example
    /// ```
    /// use psrx_core::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg(1, 0x12345678);
    /// assert_eq!(cpu.reg(1), 0x12345678);
    ///
    /// cpu.set_reg(0, 0xDEADBEEF);
    /// assert_eq!(cpu.reg(0), 0);
    /// ```
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        let index = index & 0x1F;
        if index != 0 {
            self.regs[index as usize] = value;
            self.written = Some(index);
        }
    }

    /// Write to register through the load delay slot
    ///
    /// The value lands after the next instruction has executed. A load to
    /// the register another load is still retiring into supersedes it.
    pub(crate) fn set_reg_delayed(&mut self, index: u8, value: u32) {
        let index = index & 0x1F;
        if self.retiring.is_some_and(|load| load.reg == index) {
            self.retiring = None;
        }
        self.load_delay = (index != 0).then_some(LoadDelay { reg: index, value });
    }

    /// Register value including a load still in flight to it
    ///
    /// LWL/LWR merge into the loaded value even inside the delay slot.
    pub(crate) fn reg_bypassed(&self, index: u8) -> u32 {
        match self.retiring {
            Some(load) if load.reg == index => load.value,
            _ => self.reg(index),
        }
    }

    /// HI register
    pub fn hi(&self) -> u32 {
        self.hi
    }

    /// LO register
    pub fn lo(&self) -> u32 {
        self.lo
    }

    pub fn set_hi(&mut self, value: u32) {
        self.hi = value;
    }

    pub fn set_lo(&mut self, value: u32) {
        self.lo = value;
    }

    /// Address of the next instruction to execute
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Address that follows `pc` (a branch target while in a delay slot)
    pub fn next_pc(&self) -> u32 {
        self.next_pc
    }

    /// Address of the instruction executed by the last step
    pub fn current_pc(&self) -> u32 {
        self.current_pc
    }

    /// The last executed instruction word
    pub fn current_instruction(&self) -> Instruction {
        self.current_instruction
    }

    /// Jump to `address` outside of normal execution
    ///
    /// Used to start a program loaded directly into RAM.
    pub fn set_pc(&mut self, address: u32) {
        self.pc = address;
        self.next_pc = address.wrapping_add(4);
        self.branch = false;
        self.delay_slot = false;
    }

    /// Check if the next instruction is a branch delay slot
    pub fn in_delay_slot(&self) -> bool {
        self.branch
    }

    /// Load waiting to retire after the next instruction
    pub fn pending_load(&self) -> Option<LoadDelay> {
        self.load_delay
    }

    /// Total cycles consumed since reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Address of the most recent access that raised a bus error
    ///
    /// Bus errors do not latch BADVADDR, so this is the only record of the
    /// faulting address.
    pub fn last_bus_error(&self) -> Option<u32> {
        self.last_bus_error
    }

    /// Read a COP0 register (0 for indices that do not exist)
    pub fn cop0_reg(&self, index: usize) -> u32 {
        self.cop0.read(index).unwrap_or(0)
    }

    /// Write a COP0 register through its write mask, as MTC0 would
    pub fn set_cop0_reg(&mut self, index: usize, value: u32) {
        if !self.cop0.write(index, value) {
            log::warn!("Ignoring write to missing COP0 register {}", index);
        }
    }

    /// Current status register
    pub fn status(&self) -> Status {
        self.cop0.status()
    }

    pub fn gte(&self) -> &GTE {
        &self.gte
    }

    pub fn gte_mut(&mut self) -> &mut GTE {
        &mut self.gte
    }

    /// Install an observer for BIOS A/B function calls
    pub fn set_kernel_hook(&mut self, hook: Box<dyn KernelCallHook>) {
        self.hook = Some(hook);
    }

    /// Remove the kernel-call observer, returning it
    pub fn take_kernel_hook(&mut self) -> Option<Box<dyn KernelCallHook>> {
        self.hook.take()
    }

    /// Execute one instruction
    ///
    /// This is the main CPU execution step. It performs:
    /// 1. Kernel call hook check
    /// 2. Instruction fetch (address and bus errors become exceptions)
    /// 3. PC update (with delay slot handling)
    /// 4. Instruction execution
    /// 5. Retiring the load issued by the previous instruction
    /// 6. Interrupt check
    ///
    /// # Returns
    ///
    /// Number of cycles consumed: the bus cost of the fetch plus any data
    /// accesses, at least 1. Only host-level failures are `Err`.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::cpu::CPU;
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut cpu = CPU::new();
    /// let mut bus = Bus::new();
    ///
    /// // The empty BIOS reads as NOPs
    /// let cycles = cpu.step(&mut bus).unwrap();
    /// assert!(cycles >= 1);
    /// assert_eq!(cpu.pc(), 0xBFC0_0004);
    /// ```
    pub fn step(&mut self, bus: &mut Bus) -> Result<u32> {
        // Accesses made between steps are not charged to the CPU
        bus.take_access_cycles();

        self.call_kernel_hook();

        self.current_pc = self.pc;
        self.delay_slot = self.branch;
        self.branch = false;
        self.retiring = self.load_delay.take();
        self.written = None;

        if let Some(word) = self.fetch(bus)? {
            self.current_instruction = Instruction(word);
            self.pc = self.next_pc;
            self.next_pc = self.next_pc.wrapping_add(4);

            self.execute_instruction(bus)?;
        }

        self.retire_load();
        self.check_interrupts(bus);

        let cycles = bus.take_access_cycles().max(1);
        self.cycles += u64::from(cycles);
        Ok(cycles)
    }

    /// Notify the hook when execution reaches a kernel dispatcher
    fn call_kernel_hook(&mut self) {
        let address = translate_address(self.pc);
        if address != Self::A_FUNCTION_ADDRESS && address != Self::B_FUNCTION_ADDRESS {
            return;
        }
        if let Some(mut hook) = self.hook.take() {
            if address == Self::A_FUNCTION_ADDRESS {
                hook.a_function(self);
            } else {
                hook.b_function(self);
            }
            self.hook = Some(hook);
        }
    }

    /// Fetch the word at `pc`
    ///
    /// `None` means an exception was raised instead.
    fn fetch(&mut self, bus: &mut Bus) -> Result<Option<u32>> {
        let pc = self.pc;
        if pc & 0x3 != 0 || (self.cop0.user_mode() && pc >= 0x8000_0000) {
            self.address_error(ExceptionCause::AddressErrorLoad, pc);
            return Ok(None);
        }

        match bus.read32(pc) {
            Ok(word) => Ok(Some(word)),
            Err(EmulatorError::BusError { address }) => {
                self.bus_error(ExceptionCause::BusErrorInstruction, address);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn retire_load(&mut self) {
        if let Some(load) = self.retiring.take() {
            if self.written != Some(load.reg) {
                self.regs[load.reg as usize] = load.value;
            }
        }
    }

    /// Mirror the interrupt controller into CAUSE and take the interrupt
    /// if it is enabled
    fn check_interrupts(&mut self, bus: &mut Bus) {
        let controller = bus.interrupts_mut();
        controller.sync();
        self.cop0.set_hardware_interrupt(controller.is_pending());

        if !self.cop0.interrupt_pending() {
            return;
        }

        // A GTE command about to execute completes before the interrupt is
        // taken; the BIOS handler skips it when it sees it at EPC.
        if !self.branch {
            if let Some(word) = bus.peek32(self.pc) {
                let next = Instruction(word);
                if next.is_gte_command() {
                    self.gte.execute(next.0);
                }
            }
        }

        let (epc, in_delay_slot) = if self.branch {
            (self.pc.wrapping_sub(4), true)
        } else {
            (self.pc, false)
        };
        self.enter_exception(ExceptionCause::Interrupt, epc, in_delay_slot, 0);
    }

    /// Raise an exception for the instruction currently executing
    ///
    /// Saves EPC (the branch when in a delay slot), pushes the mode stack and
    /// redirects execution to the handler. Structural exceptions never
    /// surface as `Err`.
    pub fn exception(&mut self, cause: ExceptionCause) {
        self.exception_with_coprocessor(cause, 0);
    }

    /// Raise a coprocessor-unusable style exception carrying the
    /// coprocessor number in CAUSE
    pub(crate) fn exception_with_coprocessor(&mut self, cause: ExceptionCause, coprocessor: u32) {
        let (epc, in_delay_slot) = if self.delay_slot {
            (self.current_pc.wrapping_sub(4), true)
        } else {
            (self.current_pc, false)
        };
        self.enter_exception(cause, epc, in_delay_slot, coprocessor);
    }

    /// Raise AdEL/AdES and latch the offending address in BADVADDR
    pub(crate) fn address_error(&mut self, cause: ExceptionCause, address: u32) {
        self.cop0.regs[COP0::BADA] = address;
        self.exception(cause);
    }

    fn enter_exception(
        &mut self,
        cause: ExceptionCause,
        epc: u32,
        in_delay_slot: bool,
        coprocessor: u32,
    ) {
        let handler = self
            .cop0
            .enter_exception(cause, epc, in_delay_slot, coprocessor);

        log::debug!(
            "EXCEPTION: cause={:?}, EPC=0x{:08X}, handler=0x{:08X}, in_delay={}, instruction=0x{:08X}",
            cause,
            epc,
            handler,
            in_delay_slot,
            self.current_instruction.0
        );

        self.pc = handler;
        self.next_pc = handler.wrapping_add(4);
        self.branch = false;
    }

    /// Raise IBE/DBE for an access to `address`
    ///
    /// BADVADDR is left alone; the address is kept in `last_bus_error`.
    fn bus_error(&mut self, cause: ExceptionCause, address: u32) {
        log::debug!("Bus error ({:?}) at 0x{:08X}", cause, address);
        self.last_bus_error = Some(address);
        self.exception(cause);
    }

    /// Read data memory for a load instruction
    ///
    /// Alignment, privilege and bus errors are raised here; `None` means the
    /// load must not complete.
    pub(crate) fn load(
        &mut self,
        bus: &mut Bus,
        address: u32,
        width: AccessWidth,
    ) -> Result<Option<u32>> {
        if address & (width.bytes() - 1) != 0
            || (self.cop0.user_mode() && address >= 0x8000_0000)
        {
            self.address_error(ExceptionCause::AddressErrorLoad, address);
            return Ok(None);
        }

        match bus.read(address, width) {
            Ok(value) => Ok(Some(value)),
            Err(EmulatorError::BusError { address }) => {
                self.bus_error(ExceptionCause::BusErrorData, address);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Write data memory for a store instruction
    ///
    /// Stores made while the cache is isolated have no effect on the bus.
    pub(crate) fn store(
        &mut self,
        bus: &mut Bus,
        address: u32,
        width: AccessWidth,
        value: u32,
    ) -> Result<()> {
        if address & (width.bytes() - 1) != 0
            || (self.cop0.user_mode() && address >= 0x8000_0000)
        {
            self.address_error(ExceptionCause::AddressErrorStore, address);
            return Ok(());
        }

        if self.cop0.cache_isolated() {
            return Ok(());
        }

        match bus.write(address, width, value) {
            Ok(()) => Ok(()),
            Err(EmulatorError::BusError { address }) => {
                self.bus_error(ExceptionCause::BusErrorData, address);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Dump all CPU registers for debugging
    pub fn dump_registers(&self) {
        println!("CPU Registers:");
        println!("PC: 0x{:08X}  Next PC: 0x{:08X}", self.pc, self.next_pc);
        println!("HI: 0x{:08X}  LO: 0x{:08X}", self.hi, self.lo);
        println!();

        // Print general-purpose registers in rows of 4
        for i in 0..32 {
            if i % 4 == 0 && i > 0 {
                println!();
            }
            print!("r{:2}: 0x{:08X}  ", i, self.reg(i));
        }
        println!("\n");

        println!("COP0 Registers:");
        println!("SR:    0x{:08X}", self.cop0.regs[COP0::SR]);
        println!("CAUSE: 0x{:08X}", self.cop0.regs[COP0::CAUSE]);
        println!("EPC:   0x{:08X}", self.cop0.regs[COP0::EPC]);
        println!("BADA:  0x{:08X}", self.cop0.regs[COP0::BADA]);
        println!("PRID:  0x{:08X}", self.cop0.regs[COP0::PRID]);
    }
}

impl StateSave for CPU {
    type State = CPUState;

    fn to_state(&self) -> Self::State {
        CPUState {
            regs: self.regs,
            hi: self.hi,
            lo: self.lo,
            pc: self.pc,
            next_pc: self.next_pc,
            current_pc: self.current_pc,
            branch: self.branch,
            delay_slot: self.delay_slot,
            load_delay: self.load_delay.map(|load| (load.reg, load.value)),
            cop0_regs: self.cop0.regs,
            gte: self.gte.clone(),
            cycles: self.cycles,
        }
    }

    fn restore_from_state(&mut self, state: &Self::State) {
        self.regs = state.regs;
        self.regs[0] = 0;
        self.hi = state.hi;
        self.lo = state.lo;
        self.pc = state.pc;
        self.next_pc = state.next_pc;
        self.current_pc = state.current_pc;
        self.branch = state.branch;
        self.delay_slot = state.delay_slot;
        self.load_delay = state
            .load_delay
            .filter(|&(reg, _)| reg != 0)
            .map(|(reg, value)| LoadDelay { reg: reg & 0x1F, value });
        self.retiring = None;
        self.written = None;
        self.cop0.regs = state.cop0_regs;
        self.gte = state.gte.clone();
        self.cycles = state.cycles;
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
