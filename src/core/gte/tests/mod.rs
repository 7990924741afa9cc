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

//! GTE test modules
//!
//! - `basic`: register transfers and their quirks
//! - `transforms`: perspective transform, NCLIP, averaging
//! - `commands`: matrix, color and interpolation commands

mod basic;

use super::*;

/// Load an identity matrix (1.0 = 0x1000) into the five RT words
pub(super) fn identity_rotation(gte: &mut GTE) {
    gte.write_control(GTE::RT11_RT12, 0x0000_1000);
    gte.write_control(GTE::RT13_RT21, 0x0000_0000);
    gte.write_control(GTE::RT22_RT23, 0x0000_1000);
    gte.write_control(GTE::RT31_RT32, 0x0000_0000);
    gte.write_control(GTE::RT33, 0x0000_1000);
}

/// Load identity light and light color matrices
pub(super) fn identity_lighting(gte: &mut GTE) {
    gte.write_control(GTE::L11_L12, 0x0000_1000);
    gte.write_control(GTE::L22_L23, 0x0000_1000);
    gte.write_control(GTE::L33, 0x0000_1000);
    gte.write_control(GTE::LR1_LR2, 0x0000_1000);
    gte.write_control(GTE::LG2_LG3, 0x0000_1000);
    gte.write_control(GTE::LB3, 0x0000_1000);
}

/// Pack two signed 16-bit values into one register word
pub(super) fn xy(x: i16, y: i16) -> i32 {
    ((x as u16 as u32) | ((y as u16 as u32) << 16)) as i32
}
