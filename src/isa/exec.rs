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

use std::collections::VecDeque;

use super::{Instr, Operand};
use crate::core::{Addr, Core, Word};

/// Machine movement after instruction execution
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ExecStep {
    /// Move to the next instruction
    Next,

    /// Jump to the absolute address
    Jump(Addr),

    /// Value produced by an output instruction; execution moves to the next instruction once the
    /// value is delivered
    Output(Word),

    /// Input queue is empty; the instruction must be re-executed once input is available
    Starve,

    /// Stop program execution
    Stop,
}

impl Instr {
    /// Executes the instruction over already resolved operands.
    ///
    /// `args` must hold at least [`Instr::arity`] operands. The instruction pointer is not touched:
    /// advancing it is up to the caller, according to the returned [`ExecStep`].
    pub fn exec(self, core: &mut Core, args: &[Operand], input: &mut VecDeque<Word>) -> ExecStep {
        match self {
            Instr::Nop => {}
            Instr::Halt => return ExecStep::Stop,
            Instr::Add => core.poke(args[2].addr, args[0].value.wrapping_add(args[1].value)),
            Instr::Mul => core.poke(args[2].addr, args[0].value.wrapping_mul(args[1].value)),
            Instr::In => match input.pop_front() {
                Some(value) => core.poke(args[0].addr, value),
                None => return ExecStep::Starve,
            },
            Instr::Out => return ExecStep::Output(args[0].value),
            Instr::Jnz => {
                if args[0].value != 0 {
                    return ExecStep::Jump(args[1].value);
                }
            }
            Instr::Jz => {
                if args[0].value == 0 {
                    return ExecStep::Jump(args[1].value);
                }
            }
            Instr::Lt => core.poke(args[2].addr, Word::from(args[0].value < args[1].value)),
            Instr::Eq => core.poke(args[2].addr, Word::from(args[0].value == args[1].value)),
            Instr::Arb => core.shift_rb(args[0].value),
        }
        ExecStep::Next
    }
}
