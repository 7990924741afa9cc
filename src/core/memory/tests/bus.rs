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

//! Bus access tests

use super::super::*;
use super::helpers::create_bus_with_bios_data;

#[test]
fn test_ram_mirroring_across_segments() {
    let mut bus = Bus::new();

    bus.write32(0x80000000, 0x12345678).unwrap();

    // Read from different segments (should all mirror)
    assert_eq!(bus.read32(0x00000000).unwrap(), 0x12345678);
    assert_eq!(bus.read32(0x80000000).unwrap(), 0x12345678);
    assert_eq!(bus.read32(0xA0000000).unwrap(), 0x12345678);
}

#[test]
fn test_ram_mirrored_four_times() {
    let mut bus = Bus::new();

    bus.write32(0x00000100, 0xCAFEBABE).unwrap();

    assert_eq!(bus.read32(0x00200100).unwrap(), 0xCAFEBABE);
    assert_eq!(bus.read32(0x00400100).unwrap(), 0xCAFEBABE);
    assert_eq!(bus.read32(0x80600100).unwrap(), 0xCAFEBABE);

    // Past the 8MB window is unmapped
    assert!(matches!(
        bus.read32(0x00800000),
        Err(EmulatorError::BusError { address: 0x00800000 })
    ));
}

#[test]
fn test_bios_read_only() {
    let mut bus = Bus::new();

    bus.write32(0xBFC00000, 0xDEADBEEF).unwrap();
    assert_eq!(bus.read32(0xBFC00000).unwrap(), 0x00000000);
}

#[test]
fn test_bios_contents_visible_in_all_segments() {
    let mut bus = create_bus_with_bios_data();

    assert_eq!(bus.read32(0xBFC00010).unwrap(), 4);
    assert_eq!(bus.read32(0x9FC00010).unwrap(), 4);
    assert_eq!(bus.read32(0x1FC00010).unwrap(), 4);
    assert_eq!(bus.read16(0xBFC00012).unwrap(), 0);
    assert_eq!(bus.read8(0xBFC00014).unwrap(), 5);
}

#[test]
fn test_alignment() {
    let mut bus = Bus::new();

    assert!(matches!(
        bus.read32(0x80000001),
        Err(EmulatorError::UnalignedAccess { size: 4, .. })
    ));
    assert!(matches!(
        bus.write16(0x80000003, 0),
        Err(EmulatorError::UnalignedAccess { size: 2, .. })
    ));

    // 8-bit access can be unaligned
    assert!(bus.read8(0x80000001).is_ok());
}

#[test]
fn test_scratchpad_access() {
    let mut bus = Bus::new();

    bus.write32(0x1F800000, 0xABCDEF00).unwrap();
    assert_eq!(bus.read32(0x1F800000).unwrap(), 0xABCDEF00);
    assert_eq!(bus.read32(0x9F800000).unwrap(), 0xABCDEF00);
    assert_eq!(bus.ram()[0], 0);
}

#[test]
fn test_endianness() {
    let mut bus = Bus::new();

    bus.write8(0x80000000, 0x12).unwrap();
    bus.write8(0x80000001, 0x34).unwrap();
    bus.write8(0x80000002, 0x56).unwrap();
    bus.write8(0x80000003, 0x78).unwrap();

    assert_eq!(bus.read32(0x80000000).unwrap(), 0x78563412);
    assert_eq!(bus.read16(0x80000002).unwrap(), 0x7856);
}

#[test]
fn test_narrow_write_only_touches_its_bytes() {
    let mut bus = Bus::new();

    bus.write32(0x80000010, 0x11223344).unwrap();
    bus.write16(0x80000012, 0xAABB).unwrap();

    assert_eq!(bus.read32(0x80000010).unwrap(), 0xAABB3344);
}

#[test]
fn test_unmapped_policy_fatal() {
    let config = MachineConfig {
        unmapped: UnmappedPolicy::Fatal,
        ..MachineConfig::default()
    };
    let mut bus = Bus::with_config(&config);

    assert!(matches!(
        bus.read32(0x1F801810),
        Err(EmulatorError::UnmappedAccess {
            address: 0x1F801810,
            width: 4
        })
    ));
}

#[test]
fn test_load_program() {
    let mut bus = Bus::new();

    bus.load_program(0x80010000, &[0x78, 0x56, 0x34, 0x12]).unwrap();
    assert_eq!(bus.read32(0x00010000).unwrap(), 0x12345678);

    let too_big = vec![0u8; 0x100];
    assert!(matches!(
        bus.load_program(0x801FFF80, &too_big),
        Err(EmulatorError::ProgramTooLarge { .. })
    ));
}

#[test]
fn test_invalid_bios_size() {
    let mut bus = Bus::new();

    assert!(matches!(
        bus.load_bios_bytes(&[0u8; 16]),
        Err(EmulatorError::InvalidBiosSize { got: 16, .. })
    ));
}

#[test]
fn test_peek_has_no_side_effects() {
    let mut bus = create_bus_with_bios_data();
    bus.write32(0x80000040, 0x0BADF00D).unwrap();
    bus.take_access_cycles();

    assert_eq!(bus.peek32(0x80000040), Some(0x0BADF00D));
    assert_eq!(bus.peek32(0xBFC00008), Some(2));
    assert_eq!(bus.peek32(0x1F801070), None);
    assert_eq!(bus.peek32(0x80000041), None);
    assert_eq!(bus.take_access_cycles(), 0);
}

#[test]
fn test_reset_clears_ram_keeps_bios() {
    let mut bus = create_bus_with_bios_data();
    bus.write32(0x80000000, 0xFFFFFFFF).unwrap();
    bus.write32(0x1F800000, 0xFFFFFFFF).unwrap();

    bus.reset();

    assert_eq!(bus.read32(0x80000000).unwrap(), 0);
    assert_eq!(bus.read32(0x1F800000).unwrap(), 0);
    assert_eq!(bus.read32(0xBFC00004).unwrap(), 1);
}
