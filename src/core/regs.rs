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

use super::{Addr, Core, Memory, Word};
use crate::isa::{Mode, Operand};

/// Execution state of a machine, as reported to the host after every resume.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum State {
    /// Program is loaded but the machine was not started.
    #[default]
    #[display("not started")]
    NotStarted,

    /// Ready to resume; set by start.
    #[display("paused")]
    Paused,

    /// Suspended right after producing an output value in yield mode.
    #[display("yield")]
    Yield,

    /// Suspended on an input instruction which found the input queue empty. The instruction is
    /// re-attempted on the next resume.
    #[display("read")]
    Read,

    /// Suspended because the step or time budget ran out.
    #[display("exhausted")]
    Exhausted,

    /// Executed the halt instruction.
    #[display("halted")]
    Halted,

    /// Instruction pointer left the code segment without halting.
    #[display("exited")]
    Exited,

    /// Decoded a word which is not a valid instruction.
    #[display("bad instruction")]
    BadInstruction,
}

impl State {
    /// Returns whether the machine may be resumed from this state.
    pub fn is_resumable(self) -> bool {
        matches!(self, State::Paused | State::Yield | State::Read | State::Exhausted)
    }

    /// Returns whether no further execution is possible from this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Halted | State::Exited | State::BadInstruction)
    }
}

/// Microcode for control registers.
impl Core {
    /// Read instruction pointer.
    #[inline]
    pub fn ip(&self) -> Addr { self.ip }

    /// Set instruction pointer.
    #[inline]
    pub fn set_ip(&mut self, ip: Addr) { self.ip = ip }

    /// Read relative base.
    #[inline]
    pub fn rb(&self) -> Word { self.rb }

    /// Shift relative base by `delta`.
    #[inline]
    pub fn shift_rb(&mut self, delta: Word) { self.rb = self.rb.wrapping_add(delta) }

    /// Return number of instructions executed so far.
    #[inline]
    pub fn ca(&self) -> u64 { self.ca }

    /// Return step limit value.
    #[inline]
    pub fn cl(&self) -> Option<u64> { self.cl }

    /// Replace step limit value.
    pub fn set_cl(&mut self, limit: Option<u64>) { self.cl = limit }

    /// Return whether the step limit is reached.
    pub fn is_cl_reached(&self) -> bool { self.cl.map(|lim| self.ca >= lim).unwrap_or_default() }

    /// Accumulate one executed instruction.
    #[inline]
    pub fn acc_step(&mut self) { self.ca = self.ca.saturating_add(1) }

    /// Returns whether the instruction pointer is inside the code segment.
    pub fn ip_in_code(&self) -> bool { self.mem.is_code(self.ip) }
}

/// Microcode for memory access.
impl Core {
    /// Working memory.
    #[inline]
    pub fn mem(&self) -> &Memory { &self.mem }

    /// Read memory cell.
    #[inline]
    pub fn peek(&self, addr: Addr) -> Word { self.mem.peek(addr) }

    /// Write memory cell.
    #[inline]
    pub fn poke(&mut self, addr: Addr, value: Word) { self.mem.poke(addr, value) }

    /// Resolves the operand stored `offset` cells after the instruction pointer.
    ///
    /// An immediate operand is addressed by its own cell, so that a write through it lands on the
    /// operand word itself.
    pub fn operand(&self, mode: Mode, offset: Addr) -> Operand {
        let at = self.ip.wrapping_add(offset);
        let raw = self.peek(at);
        let addr = match mode {
            Mode::Position => raw,
            Mode::Immediate => at,
            Mode::Relative => self.rb.wrapping_add(raw),
        };
        let value = match mode {
            Mode::Immediate => raw,
            Mode::Position | Mode::Relative => self.peek(addr),
        };
        Operand { mode, raw, addr, value }
    }
}
