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

//! Register transfer tests

use super::super::*;
use super::xy;

#[test]
fn test_gte_initialization() {
    let gte = GTE::new();
    assert_eq!(gte.read_data(0), 0);
    assert_eq!(gte.read_control(0), 0);
    assert_eq!(gte.flags, 0);
}

#[test]
fn test_data_register_read_write() {
    let mut gte = GTE::new();

    gte.write_data(GTE::MAC1, 0x12345678);
    assert_eq!(gte.read_data(GTE::MAC1), 0x12345678);

    gte.write_data(GTE::RES1, 0xCAFE_F00Du32 as i32);
    assert_eq!(gte.read_data(GTE::RES1) as u32, 0xCAFE_F00D);

    gte.write_data(GTE::VXY1, xy(-2, 7));
    assert_eq!(gte.read_data(GTE::VXY1), xy(-2, 7));
}

#[test]
fn test_sign_and_zero_extension() {
    let mut gte = GTE::new();

    gte.write_data(GTE::VZ0, 0x0000_FFFF);
    assert_eq!(gte.read_data(GTE::VZ0), -1);

    gte.write_data(GTE::IR2, 0x1234_8000);
    assert_eq!(gte.read_data(GTE::IR2), -0x8000);

    gte.write_data(GTE::OTZ, -1);
    assert_eq!(gte.read_data(GTE::OTZ), 0xFFFF);

    gte.write_data(GTE::SZ1, -1);
    assert_eq!(gte.read_data(GTE::SZ1), 0xFFFF);
}

#[test]
fn test_leading_zero_count() {
    let mut gte = GTE::new();

    gte.write_data(GTE::LZCS, 0x00000001);
    assert_eq!(gte.read_data(GTE::LZCR), 31);

    // Negative values count leading ones
    gte.write_data(GTE::LZCS, -1);
    assert_eq!(gte.read_data(GTE::LZCR), 32);

    gte.write_data(GTE::LZCS, 0xF000_0000u32 as i32);
    assert_eq!(gte.read_data(GTE::LZCR), 4);

    gte.write_data(GTE::LZCS, 0);
    assert_eq!(gte.read_data(GTE::LZCR), 32);

    // LZCR itself is read-only
    gte.write_data(GTE::LZCR, 5);
    assert_eq!(gte.read_data(GTE::LZCR), 32);
    assert_eq!(gte.read_data(GTE::LZCS), 0);
}

#[test]
fn test_sxy_fifo() {
    let mut gte = GTE::new();

    // Write to SXYP should push to FIFO
    gte.write_data(GTE::SXYP, 100);
    assert_eq!(gte.read_data(GTE::SXY2), 100);
    assert_eq!(gte.read_data(GTE::SXY1), 0);
    assert_eq!(gte.read_data(GTE::SXY0), 0);

    gte.write_data(GTE::SXYP, 200);
    gte.write_data(GTE::SXYP, 300);
    assert_eq!(gte.read_data(GTE::SXY2), 300);
    assert_eq!(gte.read_data(GTE::SXY1), 200);
    assert_eq!(gte.read_data(GTE::SXY0), 100);

    // SXYP reads as SXY2
    assert_eq!(gte.read_data(GTE::SXYP), 300);
}

#[test]
fn test_irgb_orgb_conversion() {
    let mut gte = GTE::new();

    gte.write_data(GTE::IRGB, 0x7C1F);
    assert_eq!(gte.read_data(GTE::IR1), 0x1F << 7);
    assert_eq!(gte.read_data(GTE::IR2), 0);
    assert_eq!(gte.read_data(GTE::IR3), 0x1F << 7);
    assert_eq!(gte.read_data(GTE::ORGB), 0x7C1F);

    // ORGB saturates each channel to 0..0x1F
    gte.write_data(GTE::IR1, -100);
    gte.write_data(GTE::IR2, 0x7FFF);
    gte.write_data(GTE::IR3, 0x0100);
    assert_eq!(gte.read_data(GTE::ORGB), (0x1F << 5) | (0x02 << 10));

    // ORGB writes are ignored
    gte.write_data(GTE::ORGB, 0);
    assert_eq!(gte.read_data(GTE::IRGB), (0x1F << 5) | (0x02 << 10));
}

#[test]
fn test_control_register_read_write() {
    let mut gte = GTE::new();

    gte.write_control(GTE::TRX, 1000);
    assert_eq!(gte.read_control(GTE::TRX), 1000);

    gte.write_control(GTE::OFY, -(120 << 16));
    assert_eq!(gte.read_control(GTE::OFY), -(120 << 16));

    gte.write_control(GTE::RT13_RT21, 0x2000_1000);
    assert_eq!(gte.read_control(GTE::RT13_RT21), 0x2000_1000);

    // Lone matrix entries sign-extend
    gte.write_control(GTE::RT33, 0x1234_8000);
    assert_eq!(gte.read_control(GTE::RT33), -0x8000);
}

#[test]
fn test_h_reads_sign_extended() {
    let mut gte = GTE::new();

    gte.write_control(GTE::H, 2000);
    assert_eq!(gte.read_control(GTE::H), 2000);

    gte.write_control(GTE::H, 0xFFFF);
    assert_eq!(gte.read_control(GTE::H), -1);
}

#[test]
fn test_flag_write_mask_and_summary() {
    let mut gte = GTE::new();

    gte.write_control(GTE::FLAG, -1);
    assert_eq!(gte.read_control(GTE::FLAG) as u32, 0xFFFF_F000);

    // Color saturation bits do not feed bit 31
    gte.write_control(GTE::FLAG, flag::R_SATURATED as i32);
    assert_eq!(gte.read_control(GTE::FLAG) as u32, flag::R_SATURATED);

    gte.write_control(GTE::FLAG, flag::DIVIDE_OVERFLOW as i32);
    assert_eq!(
        gte.read_control(GTE::FLAG) as u32,
        flag::DIVIDE_OVERFLOW | flag::ERROR
    );
}
