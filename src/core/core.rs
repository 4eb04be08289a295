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

use std::fmt::{self, Debug, Formatter};

use super::{Addr, Memory, Word};

/// Registers and memory of a single machine.
#[derive(Clone, Eq, PartialEq, Default)]
pub struct Core {
    /// Instruction pointer.
    pub(super) ip: Addr,

    /// Relative base, added to operands decoded in relative mode.
    pub(super) rb: Word,

    /// Counts instructions executed since the core was created.
    ///
    /// # See also
    ///
    /// - [`Core::cl`] register
    pub(super) ca: u64,

    /// Step limit.
    ///
    /// If this register has a value set, once [`Core::ca`] reaches this value the machine suspends
    /// before executing the next instruction.
    pub(super) cl: Option<u64>,

    /// Working memory.
    pub(super) mem: Memory,
}

impl Core {
    /// Initializes registers to zero and the working memory from a program image.
    pub fn with(image: &[Word], step_limit: Option<u64>) -> Self {
        Core { ip: 0, rb: 0, ca: 0, cl: step_limit, mem: Memory::with(image) }
    }
}

impl Debug for Core {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (sect, reg, val, reset) = if f.alternate() {
            ("\x1B[0;4;1m", "\x1B[0;1m", "\x1B[0;32m", "\x1B[0m")
        } else {
            ("", "", "", "")
        };

        writeln!(f, "{sect}C-regs:{reset}")?;
        write!(f, "{reg}ip{reset} {val}{}{reset}, ", self.ip)?;
        write!(f, "{reg}rb{reset} {val}{}{reset}, ", self.rb)?;
        write!(f, "{reg}ca{reset} {val}{}{reset}, ", self.ca)?;
        let cl = self
            .cl
            .map(|v| v.to_string())
            .unwrap_or_else(|| "~".to_string());
        writeln!(f, "{reg}cl{reset} {val}{cl}{reset}")?;

        writeln!(f, "{sect}Memory:{reset}")?;
        write!(f, "{reg}code{reset} {val}{}{reset} cells, ", self.mem.code_len())?;
        writeln!(f, "{reg}bss{reset} {val}{}{reset} cells", self.mem.bss_len())
    }
}
