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

//! PlayStation (PSX) CPU core
//!
//! An interpreter for the R3000A as found in the PlayStation: branch and load
//! delay slots, COP0 exceptions and privilege, the GTE vector coprocessor and
//! a memory bus with per-region access costs. Peripherals plug in through
//! [`IODevice`](core::memory::IODevice).
//!
//! # Example
//!
//! ```
//! use psrx_core::core::cpu::CPU;
//! use psrx_core::core::memory::Bus;
//!
//! let mut cpu = CPU::new();
//! let mut bus = Bus::new();
//!
//! // The blank BIOS image is all NOPs
//! let cycles = cpu.step(&mut bus).unwrap();
//! assert_eq!(cycles, 24);
//! assert_eq!(cpu.pc(), 0xBFC0_0004);
//! ```

pub mod core;
