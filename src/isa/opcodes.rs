// Intcode virtual machine with cooperative suspend/resume execution.
//
// SPDX-License-Identifier: Apache-2.0
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

#![allow(missing_docs)]

// No-operation instruction (extension)
pub const INSTR_NOP: i64 = 0;

// Arithmetic instructions
pub const INSTR_ADD: i64 = 1;
pub const INSTR_MUL: i64 = 2;

// Input/output instructions
pub const INSTR_IN: i64 = 3;
pub const INSTR_OUT: i64 = 4;

// Control-flow instructions
pub const INSTR_JNZ: i64 = 5;
pub const INSTR_JZ: i64 = 6;

// Comparison instructions
pub const INSTR_LT: i64 = 7;
pub const INSTR_EQ: i64 = 8;

// Relative base adjustment
pub const INSTR_ARB: i64 = 9;

pub const INSTR_HALT: i64 = 99;

// Addressing modes
pub const MODE_POSITION: i64 = 0;
pub const MODE_IMMEDIATE: i64 = 1;
pub const MODE_RELATIVE: i64 = 2;
