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

//! Intcode machine driven by the host through start/resume calls

use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use crate::core::{Addr, Core, State, Word};
use crate::isa::{ExecStep, Opcode, Operand};
use crate::program::{LoadError, ParseError, Program};

/// What an output instruction does with the value it produces. Selected once per start.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum OutputMode {
    /// Values accumulate in the output queue; execution goes on.
    #[default]
    #[display("buffered")]
    Buffered,

    /// Each value is printed to the standard output as a decimal integer.
    #[display("direct")]
    Direct,

    /// Each value is printed to the standard output as a character.
    ///
    /// See [`OutputMode::render_ascii`].
    #[display("ascii")]
    Ascii,

    /// Each value is appended to the output queue and execution suspends with [`State::Yield`].
    #[display("yield")]
    Yield,
}

impl OutputMode {
    /// Renders a value the way [`OutputMode::Ascii`] prints it: values `0..=255` become the
    /// corresponding (Latin-1) character, anything else is escaped as `#<value>;`.
    pub fn render_ascii(value: Word) -> String {
        match u8::try_from(value) {
            Ok(byte) => char::from(byte).to_string(),
            Err(_) => format!("#{value};"),
        }
    }
}

/// Configuration for [`Machine`] start.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct MachineConfig {
    /// Output handling mode.
    pub output_mode: OutputMode,
    /// Prints a trace of every executed instruction to the standard error.
    pub debug: bool,
    /// Cap on the number of instructions executed since start, across all resumes.
    pub step_limit: Option<u64>,
}

impl MachineConfig {
    /// Configuration with the given output mode and debug flag and no step limit.
    pub fn with(output_mode: OutputMode, debug: bool) -> Self {
        MachineConfig { output_mode, debug, step_limit: None }
    }
}

/// Budget for a single resume call. Once it runs out the machine suspends with
/// [`State::Exhausted`] and may be resumed again.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Budget {
    /// Runs until the machine suspends or stops by itself.
    #[default]
    Unlimited,

    /// Executes at most this number of instructions.
    Steps(u64),

    /// Does not start a new instruction after this moment.
    Until(Instant),
}

impl Budget {
    fn is_exhausted(self, executed: u64) -> bool {
        match self {
            Budget::Unlimited => false,
            Budget::Steps(max) => executed >= max,
            Budget::Until(deadline) => Instant::now() >= deadline,
        }
    }
}

/// Intcode virtual machine.
///
/// The machine owns its program, working memory, registers and both I/O queues. Cloning produces
/// a fully independent machine continuing from the same point.
#[derive(Clone, Debug, Default)]
pub struct Machine {
    program: Program,
    core: Core,
    config: MachineConfig,
    state: State,
    input: VecDeque<Word>,
    output: VecDeque<Word>,
}

impl From<Program> for Machine {
    fn from(program: Program) -> Self {
        let mut machine = Machine::new();
        machine.load(program);
        machine
    }
}

/// Program loading and lifecycle.
impl Machine {
    /// Constructs a machine with an empty program.
    pub fn new() -> Self { Machine::default() }

    /// Loads a program, resetting memory, registers and state, and clearing both I/O queues.
    ///
    /// The machine has to be started before it can run the program.
    pub fn load(&mut self, program: impl Into<Program>) {
        self.program = program.into();
        self.core = Core::with(&self.program, None);
        self.state = State::NotStarted;
        self.flush_io();
    }

    /// Parses a textual program and loads it.
    ///
    /// # Errors
    ///
    /// On a malformed program the machine is left untouched.
    pub fn load_from_text(&mut self, text: &str) -> Result<(), ParseError> {
        let program = text.parse::<Program>()?;
        self.load(program);
        Ok(())
    }

    /// Reads a textual program from a file and loads it.
    ///
    /// # Errors
    ///
    /// If the file can't be read or parsed the machine is left untouched.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let program = Program::read_file(path)?;
        self.load(program);
        Ok(())
    }

    /// Clears both I/O queues. Memory and registers are not affected.
    pub fn flush_io(&mut self) {
        self.input.clear();
        self.output.clear();
    }

    /// Prepares the loaded program for execution with the given output mode.
    ///
    /// Working memory is reset to a fresh copy of the program, registers to zero and the state to
    /// [`State::Paused`]. I/O queues are preserved.
    pub fn start(&mut self, output_mode: OutputMode, debug: bool) -> State {
        self.start_with(MachineConfig::with(output_mode, debug))
    }

    /// Prepares the loaded program for execution using a configuration object.
    pub fn start_with(&mut self, config: MachineConfig) -> State {
        self.core = Core::with(&self.program, config.step_limit);
        self.config = config;
        self.state = State::Paused;
        self.state
    }

    /// Starts the machine and resumes it once.
    pub fn run(&mut self, output_mode: OutputMode, debug: bool) -> State {
        self.start(output_mode, debug);
        self.resume()
    }

    /// Starts the machine with a configuration object and resumes it once.
    pub fn run_with(&mut self, config: MachineConfig) -> State {
        self.start_with(config);
        self.resume()
    }

    /// Continues execution until the machine suspends or stops.
    ///
    /// Resuming a machine which was not started or has already stopped does nothing and returns
    /// the current state.
    pub fn resume(&mut self) -> State { self.resume_with(Budget::Unlimited) }

    /// Continues execution for at most `max_steps` instructions.
    pub fn resume_for(&mut self, max_steps: u64) -> State { self.resume_with(Budget::Steps(max_steps)) }

    /// Continues execution, starting no new instruction after `deadline`.
    pub fn resume_until(&mut self, deadline: Instant) -> State {
        self.resume_with(Budget::Until(deadline))
    }

    /// Continues execution within the provided budget.
    pub fn resume_with(&mut self, budget: Budget) -> State {
        if !self.state.is_resumable() {
            #[cfg(feature = "log")]
            eprintln!("resume ignored: machine is {}", self.state);
            return self.state;
        }

        let mut executed = 0u64;
        let state = loop {
            if self.core.is_cl_reached() || budget.is_exhausted(executed) {
                break State::Exhausted;
            }
            if let Some(state) = self.step() {
                break state;
            }
            executed += 1;
        };
        self.state = state;

        #[cfg(feature = "log")]
        {
            let (d, g, r, y, z) = ("\x1B[0;37;2m", "\x1B[0;32m", "\x1B[0;31m", "\x1B[0;33m", "\x1B[0m");
            let c = match state {
                State::Halted => g,
                State::Exited | State::BadInstruction => r,
                _ => y,
            };
            eprintln!(
                "execution stopped at {d}ip{z} {}, {d}ca{z} {}; machine is {c}{state}{z}",
                self.core.ip(),
                self.core.ca()
            );
        }

        state
    }

    /// Executes a single instruction.
    ///
    /// # Returns
    ///
    /// State the machine has to suspend or stop in, if any.
    fn step(&mut self) -> Option<State> {
        let ip = self.core.ip();
        if !self.core.ip_in_code() {
            return Some(if self.program.is_empty() { State::Halted } else { State::Exited });
        }

        let word = self.core.peek(ip);
        let opcode = match Opcode::decode(word) {
            Ok(opcode) => opcode,
            Err(err) => {
                if self.config.debug {
                    eprintln!("\x1B[0;35m@{ip:06}:\x1B[0m \x1B[0;31m{err}\x1B[0m");
                }
                self.core.set_ip(ip.wrapping_add(1));
                return Some(State::BadInstruction);
            }
        };

        let arity = opcode.instr.arity();
        let mut args = [Operand::default(); 3];
        for (no, arg) in args.iter_mut().enumerate().take(arity) {
            *arg = self.core.operand(opcode.modes[no], no as Addr + 1);
        }
        let args = &args[..arity];

        if self.config.debug {
            self.trace_pre(opcode, args);
        }

        let next = ip.wrapping_add(opcode.size());
        let step = opcode.instr.exec(&mut self.core, args, &mut self.input);

        if self.config.debug {
            self.trace_post(opcode, args, step);
        }

        match step {
            ExecStep::Starve => return Some(State::Read),
            ExecStep::Jump(pos) => self.core.set_ip(pos),
            ExecStep::Next | ExecStep::Output(_) | ExecStep::Stop => self.core.set_ip(next),
        }
        self.core.acc_step();

        match step {
            ExecStep::Stop => Some(State::Halted),
            ExecStep::Output(value) => self.deliver(value),
            ExecStep::Next | ExecStep::Jump(_) | ExecStep::Starve => None,
        }
    }

    /// Dispatches an output value according to the output mode.
    fn deliver(&mut self, value: Word) -> Option<State> {
        match self.config.output_mode {
            OutputMode::Buffered => self.output.push_back(value),
            OutputMode::Yield => {
                self.output.push_back(value);
                return Some(State::Yield);
            }
            OutputMode::Direct => println!("{value}"),
            OutputMode::Ascii => {
                let mut stdout = io::stdout().lock();
                let _ = stdout.write_all(OutputMode::render_ascii(value).as_bytes());
                let _ = stdout.flush();
            }
        }
        None
    }

    fn trace_pre(&self, opcode: Opcode, args: &[Operand]) {
        let (m, w, d, z) = ("\x1B[0;35m", "\x1B[1;1m", "\x1B[0;37;2m", "\x1B[0m");
        let operands = args
            .iter()
            .map(Operand::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        eprint!("{m}@{:06}:{z} {: <5}{: <24}; ", self.core.ip(), opcode.instr.to_string(), operands);
        for (no, arg) in args.iter().enumerate() {
            if Some(no) != opcode.instr.dst() {
                eprint!("{d}{arg} {z}{w}{}{z}, ", arg.value);
            }
        }
    }

    fn trace_post(&self, opcode: Opcode, args: &[Operand], step: ExecStep) {
        let (g, r, y, z) = ("\x1B[0;32m", "\x1B[0;31m", "\x1B[0;33m", "\x1B[0m");
        eprint!("-> ");
        match step {
            ExecStep::Starve => eprint!("{r}input queue is empty{z}"),
            ExecStep::Jump(pos) => eprint!("{g}ip {y}{pos}{z}"),
            ExecStep::Output(value) => eprint!("{g}out {y}{value}{z}"),
            ExecStep::Stop => eprint!("{g}halt{z}"),
            ExecStep::Next => {
                if let Some(dst) = opcode.instr.dst() {
                    let addr = args[dst].addr;
                    eprint!("{g}[{addr}] {y}{}{z}", self.core.peek(addr));
                }
            }
        }
        eprintln!(", {g}rb {y}{}{z}", self.core.rb());
    }
}

/// Host access to the machine state, memory and I/O queues.
impl Machine {
    /// Current execution state.
    #[inline]
    pub fn state(&self) -> State { self.state }

    /// Loaded program.
    #[inline]
    pub fn program(&self) -> &Program { &self.program }

    /// Configuration the machine was last started with.
    #[inline]
    pub fn config(&self) -> MachineConfig { self.config }

    /// Output mode the machine was last started with.
    #[inline]
    pub fn output_mode(&self) -> OutputMode { self.config.output_mode }

    /// Registers and working memory.
    #[inline]
    pub fn core(&self) -> &Core { &self.core }

    /// Instruction pointer.
    #[inline]
    pub fn ip(&self) -> Addr { self.core.ip() }

    /// Relative base.
    #[inline]
    pub fn relative_base(&self) -> Word { self.core.rb() }

    /// Number of instructions executed since start.
    #[inline]
    pub fn steps(&self) -> u64 { self.core.ca() }

    /// Replaces the cumulative step limit set at start.
    pub fn set_step_limit(&mut self, limit: Option<u64>) {
        self.config.step_limit = limit;
        self.core.set_cl(limit);
    }

    /// Reads memory at `addr`, using the same address resolution as instructions do.
    #[inline]
    pub fn peek(&self, addr: Addr) -> Word { self.core.peek(addr) }

    /// Writes `value` to memory at `addr`, using the same address resolution as instructions do.
    ///
    /// Start resets the working memory, so patches must be applied after it.
    #[inline]
    pub fn poke(&mut self, addr: Addr, value: Word) { self.core.poke(addr, value) }

    /// Memory cells which differ from the loaded program, sorted by address.
    pub fn dirty_cells(&self) -> Vec<(Addr, Word)> { self.core.mem().dirty_cells(&self.program) }

    /// Input queue.
    #[inline]
    pub fn input(&self) -> &VecDeque<Word> { &self.input }

    /// Mutable input queue.
    #[inline]
    pub fn input_mut(&mut self) -> &mut VecDeque<Word> { &mut self.input }

    /// Output queue.
    #[inline]
    pub fn output(&self) -> &VecDeque<Word> { &self.output }

    /// Mutable output queue.
    #[inline]
    pub fn output_mut(&mut self) -> &mut VecDeque<Word> { &mut self.output }

    /// Appends a value to the input queue.
    pub fn push_input(&mut self, value: Word) { self.input.push_back(value) }

    /// Appends values to the input queue.
    pub fn extend_input(&mut self, values: impl IntoIterator<Item = Word>) {
        self.input.extend(values)
    }

    /// Removes the oldest value from the output queue.
    pub fn pop_output(&mut self) -> Option<Word> { self.output.pop_front() }

    /// Removes all values from the output queue.
    pub fn take_output(&mut self) -> Vec<Word> { self.output.drain(..).collect() }
}

#[cfg(test)]
mod test {
    use super::*;

    fn machine(code: &[Word]) -> Machine { Machine::from(Program::from(code)) }

    #[test]
    fn not_started() {
        let mut vm = machine(&[99]);
        assert_eq!(vm.state(), State::NotStarted);
        assert_eq!(vm.resume(), State::NotStarted);
        assert_eq!(vm.peek(0), 99);
    }

    #[test]
    fn terminal_state_is_sticky() {
        let mut vm = machine(&[99]);
        assert_eq!(vm.run(OutputMode::Buffered, false), State::Halted);
        assert_eq!(vm.ip(), 1);
        assert_eq!(vm.resume(), State::Halted);
        assert_eq!(vm.ip(), 1);
    }

    #[test]
    fn empty_program_halts() {
        let mut vm = Machine::new();
        assert_eq!(vm.run(OutputMode::Buffered, false), State::Halted);
    }

    #[test]
    fn running_off_the_end() {
        let mut vm = machine(&[1101, 1, 1, 5, 0]);
        assert_eq!(vm.run(OutputMode::Buffered, false), State::Exited);
        assert_eq!(vm.peek(5), 2);
        assert_eq!(vm.ip(), 5);
    }

    #[test]
    fn negative_jump_exits() {
        let mut vm = machine(&[1105, 1, -4]);
        assert_eq!(vm.run(OutputMode::Buffered, false), State::Exited);
        assert_eq!(vm.ip(), -4);
    }

    #[test]
    fn immediate_destination_writes_operand_cell() {
        let mut vm = machine(&[11101, 2, 3, 0, 99]);
        assert_eq!(vm.run(OutputMode::Buffered, false), State::Halted);
        assert_eq!(vm.peek(3), 5);
    }

    #[test]
    fn truncated_instruction_reads_zeros() {
        // `add [0], [0] -> [..]` with the destination operand missing writes to cell 0
        let mut vm = machine(&[1, 0, 0]);
        assert_eq!(vm.run(OutputMode::Buffered, false), State::Exited);
        assert_eq!(vm.peek(0), 2);
    }

    #[test]
    fn nop_extension() {
        let mut vm = machine(&[0, 0, 104, 7, 99]);
        assert_eq!(vm.run(OutputMode::Buffered, false), State::Halted);
        assert_eq!(vm.take_output(), vec![7]);
        assert_eq!(vm.steps(), 4);
    }

    #[test]
    fn bad_mode_digit() {
        let mut vm = machine(&[301, 0, 0, 0, 99]);
        assert_eq!(vm.run(OutputMode::Buffered, false), State::BadInstruction);
        assert_eq!(vm.ip(), 1);
    }

    #[test]
    fn wrapping_arithmetic() {
        let mut vm = machine(&[1102, Word::MAX, 2, 7, 4, 7, 99, 0]);
        assert_eq!(vm.run(OutputMode::Buffered, false), State::Halted);
        assert_eq!(vm.take_output(), vec![Word::MAX.wrapping_mul(2)]);
    }

    #[test]
    fn start_resets_memory_not_queues() {
        let mut vm = machine(&[3, 0, 99]);
        vm.push_input(5);
        vm.push_input(6);
        assert_eq!(vm.run(OutputMode::Buffered, false), State::Halted);
        assert_eq!(vm.peek(0), 5);

        vm.start(OutputMode::Buffered, false);
        assert_eq!(vm.peek(0), 3);
        assert_eq!(vm.input().iter().copied().collect::<Vec<_>>(), vec![6]);
        assert_eq!(vm.resume(), State::Halted);
        assert_eq!(vm.peek(0), 6);
    }

    #[test]
    fn step_budget() {
        // infinite loop: jnz 1, 0
        let mut vm = machine(&[1105, 1, 0]);
        vm.start(OutputMode::Buffered, false);
        assert_eq!(vm.resume_for(10), State::Exhausted);
        assert_eq!(vm.steps(), 10);
        assert_eq!(vm.resume_for(5), State::Exhausted);
        assert_eq!(vm.steps(), 15);
        assert_eq!(vm.resume_for(0), State::Exhausted);
        assert_eq!(vm.steps(), 15);
    }

    #[test]
    fn step_budget_does_not_hide_suspension() {
        let mut vm = machine(&[104, 1, 104, 2, 99]);
        vm.start(OutputMode::Yield, false);
        assert_eq!(vm.resume_for(100), State::Yield);
        assert_eq!(vm.resume_for(100), State::Yield);
        assert_eq!(vm.resume_for(1), State::Halted);
        assert_eq!(vm.take_output(), vec![1, 2]);
    }

    #[test]
    fn cumulative_step_limit() {
        let mut vm = machine(&[1105, 1, 0]);
        let config = MachineConfig { step_limit: Some(100), ..default!() };
        assert_eq!(vm.run_with(config), State::Exhausted);
        assert_eq!(vm.steps(), 100);
        assert_eq!(vm.resume(), State::Exhausted);
        assert_eq!(vm.steps(), 100);

        vm.set_step_limit(Some(150));
        assert_eq!(vm.resume(), State::Exhausted);
        assert_eq!(vm.steps(), 150);
        assert_eq!(vm.config().step_limit, Some(150));
    }

    #[test]
    fn deadline_budget() {
        let mut vm = machine(&[1105, 1, 0]);
        vm.start(OutputMode::Buffered, false);
        assert_eq!(vm.resume_until(Instant::now()), State::Exhausted);
        assert_eq!(vm.steps(), 0);
    }

    #[test]
    fn ascii_rendering() {
        assert_eq!(OutputMode::render_ascii(72), "H");
        assert_eq!(OutputMode::render_ascii(10), "\n");
        assert_eq!(OutputMode::render_ascii(255), "\u{ff}");
        assert_eq!(OutputMode::render_ascii(256), "#256;");
        assert_eq!(OutputMode::render_ascii(-1), "#-1;");
    }

    #[test]
    fn direct_modes_bypass_queue() {
        for mode in [OutputMode::Direct, OutputMode::Ascii] {
            let mut vm = machine(&[104, 65, 104, 10, 99]);
            assert_eq!(vm.run(mode, false), State::Halted);
            assert!(vm.output().is_empty());
            assert_eq!(vm.output_mode(), mode);
        }
    }

    #[test]
    fn debug_trace_does_not_change_semantics() {
        let mut vm = machine(&[1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]);
        assert_eq!(vm.run(OutputMode::Buffered, true), State::Halted);
        assert_eq!(vm.peek(0), 3500);
    }

    #[test]
    fn dirty_cells() {
        let mut vm = machine(&[1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]);
        vm.run(OutputMode::Buffered, false);
        vm.poke(-1, 1);
        assert_eq!(vm.dirty_cells(), vec![(-1, 1), (0, 3500), (3, 70)]);
    }

    #[test]
    fn machine_is_send() {
        fn assert_send<T: Send + Sync>() {}
        assert_send::<Machine>();
    }
}
