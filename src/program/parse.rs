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

use std::num::ParseIntError;

use crate::core::Word;

/// Error parsing a textual program.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("line {line}: `{token}` is not a valid integer ({source})")]
pub struct ParseError {
    /// Line number, counting from 1.
    pub line: usize,
    /// Offending token, with surrounding whitespace trimmed.
    pub token: String,
    /// Integer parser failure.
    pub source: ParseIntError,
}

/// Starts a comment running to the end of the line.
const COMMENT_CHARS: [char; 2] = ['#', ';'];

/// Strips comments and a leading `[nnn]` address label from a line.
fn strip_line(line: &str) -> &str {
    let line = match line.find(&COMMENT_CHARS[..]) {
        Some(pos) => &line[..pos],
        None => line,
    };
    let line = line.trim();
    match line.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
        Some((_, code)) => code.trim_start(),
        None => line,
    }
}

/// Parses comma-separated integers spread across any number of lines.
///
/// Comments (`#` or `;` to the end of the line), blank lines, empty tokens produced by
/// leading/trailing commas and whitespace around tokens are ignored. A line may start with a
/// `[nnn]` address label, which is skipped as well.
pub(crate) fn parse(text: &str) -> Result<Vec<Word>, ParseError> {
    let mut words = vec![];
    for (no, line) in text.lines().enumerate() {
        for token in strip_line(line).split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            let word = token.parse::<Word>().map_err(|source| ParseError {
                line: no + 1,
                token: token.to_owned(),
                source,
            })?;
            words.push(word);
        }
    }
    Ok(words)
}
