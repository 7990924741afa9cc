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

//! Basic interrupt controller tests

use super::super::*;

#[test]
fn test_interrupt_request() {
    let mut ic = InterruptController::new();

    ic.request(interrupts::VBLANK);
    assert_eq!(ic.status, interrupts::VBLANK);
    assert_eq!(ic.read_status(), interrupts::VBLANK as u32);
}

#[test]
fn test_interrupt_masking() {
    let mut ic = InterruptController::new();

    // Request interrupt but it's masked
    ic.request(interrupts::VBLANK);
    ic.write_mask(0);
    assert!(!ic.is_pending());

    // Unmask
    ic.write_mask(interrupts::VBLANK as u32);
    assert!(ic.is_pending());
}

#[test]
fn test_partial_masking() {
    let mut ic = InterruptController::new();

    ic.request(interrupts::VBLANK | interrupts::TIMER0);

    ic.write_mask(interrupts::TIMER0 as u32);
    assert!(ic.is_pending());

    ic.write_mask(interrupts::SPU as u32);
    assert!(!ic.is_pending());
}

#[test]
fn test_unused_bits_ignored() {
    let mut ic = InterruptController::new();

    ic.write_mask(0xFFFF);
    assert_eq!(ic.read_mask(), interrupts::ALL as u32);

    ic.request(0xF800);
    assert_eq!(ic.read_status(), 0);
}

#[test]
fn test_register_access_through_device_trait() {
    let mut ic = InterruptController::new();

    ic.write(0x4, AccessWidth::Word, 0x0000_0005).unwrap();
    assert_eq!(ic.read_mask(), 0x5);

    ic.request(interrupts::VBLANK | interrupts::CDROM);
    assert_eq!(ic.read(0x0, AccessWidth::Half).unwrap(), 0x5);
    assert_eq!(ic.read(0x4, AccessWidth::Word).unwrap(), 0x5);
}
