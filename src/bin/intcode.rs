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

//! Command-line runner for Intcode programs.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use intcode::{Machine, MachineConfig, OutputMode, State, Word};

/// Runs an Intcode program. While the program waits for input, the collected output is shown and
/// a comma-separated list of values is read from the standard input; an empty line stops the run.
#[derive(FromArgs)]
struct Arguments {
    /// program file: comma-separated integers, `#` and `;` start comments
    #[argh(positional)]
    filename: PathBuf,

    /// print output values as ASCII text
    #[argh(switch, short = 'a')]
    ascii: bool,

    /// trace every executed instruction to the standard error
    #[argh(switch, short = 'D')]
    debug: bool,

    /// show memory cells changed by the program on exit
    #[argh(switch, short = 'm')]
    memory: bool,

    /// stop after this number of executed instructions
    #[argh(option)]
    max_steps: Option<u64>,
}

fn parse_values(line: &str) -> Result<Vec<Word>, String> {
    line.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<Word>().map_err(|err| format!("`{token}`: {err}")))
        .collect()
}

fn format_queue<'a>(values: impl IntoIterator<Item = &'a Word>) -> String {
    let values = values
        .into_iter()
        .map(Word::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{values}]")
}

fn interact(machine: &mut Machine, mut state: State) -> io::Result<State> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while state == State::Read {
        println!("{}", format_queue(machine.output()));
        print!("input> ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if line.trim().is_empty() {
            break;
        }
        match parse_values(&line) {
            Ok(values) => machine.extend_input(values),
            Err(err) => {
                eprintln!("invalid input {err}");
                continue;
            }
        }
        state = machine.resume();
    }
    Ok(state)
}

fn main() -> ExitCode {
    let args: Arguments = argh::from_env();

    let mut machine = Machine::new();
    if let Err(err) = machine.load_from_file(&args.filename) {
        eprintln!("{}: {err}", args.filename.display());
        return ExitCode::FAILURE;
    }

    let output_mode = if args.ascii { OutputMode::Ascii } else { OutputMode::Buffered };
    let config = MachineConfig { output_mode, debug: args.debug, step_limit: args.max_steps };
    let state = machine.run_with(config);

    let state = match interact(&mut machine, state) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("terminal error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if !args.ascii || !machine.output().is_empty() {
        println!("{state} {}", format_queue(machine.output()));
    } else {
        println!();
        println!("{state}");
    }

    if args.memory {
        for (addr, value) in machine.dirty_cells() {
            let was = if machine.core().mem().is_code(addr) {
                machine.program()[addr as usize].to_string()
            } else {
                String::from("~")
            };
            println!("[{addr:6}]   {was} -> {value}");
        }
    }

    match state {
        State::Exited | State::BadInstruction => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
