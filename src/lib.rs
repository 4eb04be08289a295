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

//! Intcode virtual machine.
//!
//! A program is a flat array of signed integers which is both code and data. The machine
//! interprets it with a fetch-decode-execute loop over a unified address space: the code segment
//! initialized from the program plus an unbounded sparse region which reads as zero until written.
//!
//! Execution is cooperative. [`Machine::resume`] runs until the program halts, needs input it does
//! not have, produces an output value in [`OutputMode::Yield`], or exhausts a host-provided budget.
//! The reason is reported through [`State`]; nothing survives between calls except what is stored
//! on the machine itself, so a machine can be cloned at any suspension point and both copies
//! continue independently.
//!
//! # Example
//!
//! ```
//! use intcode::{Machine, OutputMode, State};
//!
//! let mut machine = Machine::new();
//! machine.load_from_text("3,0,4,0,99").unwrap();
//!
//! assert_eq!(machine.run(OutputMode::Yield, false), State::Read);
//! machine.push_input(42);
//! assert_eq!(machine.resume(), State::Yield);
//! assert_eq!(machine.pop_output(), Some(42));
//! assert_eq!(machine.resume(), State::Halted);
//! ```

#![deny(unsafe_code, non_upper_case_globals, non_camel_case_types, non_snake_case)]
#![warn(missing_docs)]

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

pub mod core;
pub mod isa;
mod program;
mod vm;

pub use self::core::{Addr, Core, Memory, State, Word};
pub use self::program::{LoadError, ParseError, Program};
pub use self::vm::{Budget, Machine, MachineConfig, OutputMode};
