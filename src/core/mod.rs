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

//! Intcode machine registers and memory

#[allow(clippy::module_inception)]
mod core;
mod memory;
mod regs;

pub use self::core::Core;
pub use self::memory::Memory;
pub use self::regs::State;

/// Memory cell value; also the machine word every instruction is encoded with.
pub type Word = i64;

/// Memory address. Negative addresses are valid and resolve to the sparse region.
pub type Addr = i64;
