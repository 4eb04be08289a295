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

use std::fmt::{self, Display, Formatter};

use super::opcodes::*;
use crate::core::{Addr, Word};

/// Errors decoding an instruction word.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum DecodeError {
    /// instruction word {0} does not encode a known opcode.
    UnknownOpcode(Word),

    /// instruction word {0} uses unknown addressing mode {1}.
    UnknownMode(Word, Word),
}

/// Operations of the instruction set.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
pub enum Instr {
    /// Does nothing.
    #[display("nop")]
    Nop,

    /// `mem[c] = a + b`.
    #[display("add")]
    Add,

    /// `mem[c] = a * b`.
    #[display("mul")]
    Mul,

    /// Moves the next value of the input queue into `mem[a]`.
    #[display("in")]
    In,

    /// Produces value `a`.
    #[display("out")]
    Out,

    /// Jumps to `b` if `a` is not zero.
    #[display("jnz")]
    Jnz,

    /// Jumps to `b` if `a` is zero.
    #[display("jz")]
    Jz,

    /// `mem[c] = a < b`.
    #[display("lt")]
    Lt,

    /// `mem[c] = a == b`.
    #[display("eq")]
    Eq,

    /// Adds `a` to the relative base.
    #[display("arb")]
    Arb,

    /// Stops execution.
    #[display("halt")]
    Halt,
}

impl Instr {
    /// Maps an opcode (the two lowest decimal digits of an instruction word) to an instruction.
    pub fn from_opcode(opcode: Word) -> Option<Self> {
        Some(match opcode {
            INSTR_NOP => Instr::Nop,
            INSTR_ADD => Instr::Add,
            INSTR_MUL => Instr::Mul,
            INSTR_IN => Instr::In,
            INSTR_OUT => Instr::Out,
            INSTR_JNZ => Instr::Jnz,
            INSTR_JZ => Instr::Jz,
            INSTR_LT => Instr::Lt,
            INSTR_EQ => Instr::Eq,
            INSTR_ARB => Instr::Arb,
            INSTR_HALT => Instr::Halt,
            _ => return None,
        })
    }

    /// Opcode of the instruction.
    pub const fn opcode(self) -> Word {
        match self {
            Instr::Nop => INSTR_NOP,
            Instr::Add => INSTR_ADD,
            Instr::Mul => INSTR_MUL,
            Instr::In => INSTR_IN,
            Instr::Out => INSTR_OUT,
            Instr::Jnz => INSTR_JNZ,
            Instr::Jz => INSTR_JZ,
            Instr::Lt => INSTR_LT,
            Instr::Eq => INSTR_EQ,
            Instr::Arb => INSTR_ARB,
            Instr::Halt => INSTR_HALT,
        }
    }

    /// Number of operands following the instruction word.
    pub const fn arity(self) -> usize {
        match self {
            Instr::Nop | Instr::Halt => 0,
            Instr::In | Instr::Out | Instr::Arb => 1,
            Instr::Jnz | Instr::Jz => 2,
            Instr::Add | Instr::Mul | Instr::Lt | Instr::Eq => 3,
        }
    }

    /// Index of the operand the instruction writes to, if any.
    pub const fn dst(self) -> Option<usize> {
        match self {
            Instr::In => Some(0),
            Instr::Add | Instr::Mul | Instr::Lt | Instr::Eq => Some(2),
            Instr::Nop | Instr::Out | Instr::Jnz | Instr::Jz | Instr::Arb | Instr::Halt => None,
        }
    }
}

/// Operand addressing mode.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, Display)]
pub enum Mode {
    /// Operand is the address of the value.
    #[default]
    #[display("position")]
    Position,

    /// Operand is the value itself.
    #[display("immediate")]
    Immediate,

    /// Operand plus the relative base is the address of the value.
    #[display("relative")]
    Relative,
}

impl Mode {
    /// Maps a mode digit to an addressing mode.
    pub fn from_digit(digit: Word) -> Option<Self> {
        match digit {
            MODE_POSITION => Some(Mode::Position),
            MODE_IMMEDIATE => Some(Mode::Immediate),
            MODE_RELATIVE => Some(Mode::Relative),
            _ => None,
        }
    }
}

/// Operand resolved against the current registers and memory.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Operand {
    /// Addressing mode the operand was decoded with.
    pub mode: Mode,
    /// Word stored in the operand cell.
    pub raw: Word,
    /// Effective address.
    pub addr: Addr,
    /// Value the operand evaluates to.
    pub value: Word,
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Position => write!(f, "[{}]", self.raw),
            Mode::Immediate => write!(f, "{}", self.raw),
            Mode::Relative => write!(f, "[rb{:+}]", self.raw),
        }
    }
}

/// Decoded instruction word: the operation and the addressing modes of its operands.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Opcode {
    /// Operation.
    pub instr: Instr,
    /// Addressing modes; only the first [`Instr::arity`] entries are meaningful.
    pub modes: [Mode; 3],
}

impl Opcode {
    /// Decodes an instruction word.
    ///
    /// The opcode is the word modulo 100; the mode of the operand `i` (counting from 1) is the
    /// decimal digit at position `10^(i+1)`. Mode digits beyond the instruction arity are ignored.
    ///
    /// # Errors
    ///
    /// Negative words, opcodes outside of the instruction set and mode digits other than 0, 1 or 2
    /// on used operands are rejected.
    pub fn decode(word: Word) -> Result<Self, DecodeError> {
        if word < 0 {
            return Err(DecodeError::UnknownOpcode(word));
        }
        let instr = Instr::from_opcode(word % 100).ok_or(DecodeError::UnknownOpcode(word))?;
        let mut modes = [Mode::Position; 3];
        let mut digits = word / 100;
        for mode in modes.iter_mut().take(instr.arity()) {
            let digit = digits % 10;
            *mode = Mode::from_digit(digit).ok_or(DecodeError::UnknownMode(word, digit))?;
            digits /= 10;
        }
        Ok(Opcode { instr, modes })
    }

    /// Size of the instruction in memory cells, including the instruction word.
    pub const fn size(self) -> Addr { 1 + self.instr.arity() as Addr }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_modes() {
        let op = Opcode::decode(1002).unwrap();
        assert_eq!(op.instr, Instr::Mul);
        assert_eq!(op.modes, [Mode::Position, Mode::Immediate, Mode::Position]);
        assert_eq!(op.size(), 4);

        let op = Opcode::decode(21107).unwrap();
        assert_eq!(op.instr, Instr::Lt);
        assert_eq!(op.modes, [Mode::Immediate, Mode::Immediate, Mode::Relative]);

        let op = Opcode::decode(204).unwrap();
        assert_eq!(op.instr, Instr::Out);
        assert_eq!(op.modes[0], Mode::Relative);
    }

    #[test]
    fn decode_ignores_unused_mode_digits() {
        let op = Opcode::decode(99999).unwrap();
        assert_eq!(op.instr, Instr::Halt);
        assert_eq!(op.size(), 1);

        let op = Opcode::decode(1004).unwrap();
        assert_eq!(op.instr, Instr::Out);
        assert_eq!(op.modes[0], Mode::Position);
    }

    #[test]
    fn decode_failures() {
        assert_eq!(Opcode::decode(73), Err(DecodeError::UnknownOpcode(73)));
        assert_eq!(Opcode::decode(10), Err(DecodeError::UnknownOpcode(10)));
        assert_eq!(Opcode::decode(-1), Err(DecodeError::UnknownOpcode(-1)));
        assert_eq!(Opcode::decode(301), Err(DecodeError::UnknownMode(301, 3)));
        assert_eq!(Opcode::decode(30001), Err(DecodeError::UnknownMode(30001, 3)));
        assert!(DecodeError::UnknownMode(301, 3)
            .to_string()
            .contains("unknown addressing mode 3"));
    }

    #[test]
    fn opcode_roundtrip() {
        for code in 0..100 {
            if let Some(instr) = Instr::from_opcode(code) {
                assert_eq!(instr.opcode(), code);
            }
        }
        assert_eq!(Instr::from_opcode(99), Some(Instr::Halt));
    }

    #[test]
    fn operand_display() {
        let op = Operand { mode: Mode::Relative, raw: -1, addr: 0, value: 0 };
        assert_eq!(op.to_string(), "[rb-1]");
        let op = Operand { mode: Mode::Position, raw: 9, addr: 9, value: 0 };
        assert_eq!(op.to_string(), "[9]");
    }
}
