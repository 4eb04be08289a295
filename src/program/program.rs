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
use std::path::Path;
use std::str::FromStr;
use std::{fs, io};

use super::parse::{parse, ParseError};
use crate::core::Word;

/// Errors loading a program from a file.
#[derive(Debug, Display, Error, From)]
#[display(inner)]
pub enum LoadError {
    /// File can't be read.
    #[from]
    Io(io::Error),

    /// File content is not a valid program.
    #[from]
    Parse(ParseError),
}

/// Program image: the initial content of the code segment.
///
/// A program is never modified by execution; machines work on their own copy of it.
#[derive(Wrapper, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, From)]
#[wrapper(Deref)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct Program(#[from] Vec<Word>);

impl Program {
    /// Constructs program from the list of words.
    #[inline]
    pub fn new(words: impl Into<Vec<Word>>) -> Self { Program(words.into()) }

    /// Reads a textual program from a file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file can't be read and [`LoadError::Parse`] if its content
    /// is not a valid program.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        Ok(Program::from_str(&text)?)
    }

    /// Program words.
    #[inline]
    pub fn as_slice(&self) -> &[Word] { &self.0 }
}

impl From<&[Word]> for Program {
    fn from(words: &[Word]) -> Self { Program(words.to_vec()) }
}

impl<const LEN: usize> From<[Word; LEN]> for Program {
    fn from(words: [Word; LEN]) -> Self { Program(words.to_vec()) }
}

impl FromIterator<Word> for Program {
    fn from_iter<I: IntoIterator<Item = Word>>(iter: I) -> Self { Program(iter.into_iter().collect()) }
}

impl FromStr for Program {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s).map(Program) }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();
        if let Some(first) = iter.next() {
            write!(f, "{first}")?;
        }
        for word in iter {
            write!(f, ",{word}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_fromstr() {
        let prog = Program::from([1, 0, 0, 3, 99]);
        assert_eq!(prog.to_string(), "1,0,0,3,99");
        assert_eq!(Program::from_str("1, 0,0,3,99 # halt").unwrap(), prog);
        assert_eq!(Program::default().to_string(), "");
    }

    #[test]
    fn deref() {
        let prog = Program::new(vec![109, -1, 99]);
        assert_eq!(prog.len(), 3);
        assert_eq!(prog[1], -1);
        assert_eq!(prog.as_slice(), &[109, -1, 99]);
        assert!(!prog.is_empty());
        assert_eq!(prog.iter().copied().collect::<Program>(), prog);
    }

    #[test]
    fn read_missing_file() {
        let err = Program::read_file("/nonexistent/intcode/program.txt").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn read_file() {
        let path = std::env::temp_dir().join(format!("intcode-read-file-{}.txt", std::process::id()));
        fs::write(&path, "1,0,0,0,\n99\n").unwrap();
        let prog = Program::read_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(prog.as_slice(), &[1, 0, 0, 0, 99]);

        fs::write(&path, "1,x").unwrap();
        let err = Program::read_file(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(err, LoadError::Parse(ParseError { line: 1, .. })));
    }
}
