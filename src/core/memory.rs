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

use std::collections::HashMap;

use super::{Addr, Word};

/// Unified address space of a machine.
///
/// Addresses inside `[0, code.len())` resolve to the code segment, which starts as a copy of the
/// loaded program. Every other address, negative ones included, resolves to the sparse region,
/// where a cell which was never written reads as zero.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Memory {
    code: Vec<Word>,
    bss: HashMap<Addr, Word>,
}

impl Memory {
    /// Creates memory with the code segment initialized from `image` and an empty sparse region.
    pub fn with(image: &[Word]) -> Self { Memory { code: image.to_vec(), bss: none!() } }

    /// Length of the code segment.
    #[inline]
    pub fn code_len(&self) -> usize { self.code.len() }

    /// Returns whether `addr` belongs to the code segment.
    #[inline]
    pub fn is_code(&self, addr: Addr) -> bool { self.code_index(addr).is_some() }

    #[inline]
    fn code_index(&self, addr: Addr) -> Option<usize> {
        usize::try_from(addr)
            .ok()
            .filter(|idx| *idx < self.code.len())
    }

    /// Reads the cell at `addr`.
    pub fn peek(&self, addr: Addr) -> Word {
        match self.code_index(addr) {
            Some(idx) => self.code[idx],
            None => self.bss.get(&addr).copied().unwrap_or_default(),
        }
    }

    /// Writes `value` into the cell at `addr`.
    pub fn poke(&mut self, addr: Addr, value: Word) {
        match self.code_index(addr) {
            Some(idx) => self.code[idx] = value,
            None => {
                self.bss.insert(addr, value);
            }
        }
    }

    /// Current content of the code segment.
    pub fn code(&self) -> &[Word] { &self.code }

    /// Number of cells ever written in the sparse region.
    pub fn bss_len(&self) -> usize { self.bss.len() }

    /// Lists cells whose content differs from `image`, sorted by address.
    ///
    /// Code cells are compared with the corresponding cells of `image`; every written cell of the
    /// sparse region is listed, even if the written value is zero.
    pub fn dirty_cells(&self, image: &[Word]) -> Vec<(Addr, Word)> {
        let mut cells = self
            .code
            .iter()
            .enumerate()
            .filter(|(idx, val)| image.get(*idx) != Some(*val))
            .map(|(idx, val)| (idx as Addr, *val))
            .chain(self.bss.iter().map(|(addr, val)| (*addr, *val)))
            .collect::<Vec<_>>();
        cells.sort_unstable_by_key(|(addr, _)| *addr);
        cells
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unified_addressing() {
        let mut mem = Memory::with(&[1, 2, 3]);
        assert_eq!(mem.peek(0), 1);
        assert_eq!(mem.peek(2), 3);
        assert_eq!(mem.peek(3), 0);
        assert_eq!(mem.peek(-1), 0);
        assert_eq!(mem.peek(1_000_000_000), 0);

        mem.poke(1, 20);
        mem.poke(3, 30);
        mem.poke(-5, 50);
        assert_eq!(mem.code(), &[1, 20, 3]);
        assert_eq!(mem.peek(3), 30);
        assert_eq!(mem.peek(-5), 50);
        assert_eq!(mem.bss_len(), 2);
        assert!(mem.is_code(2));
        assert!(!mem.is_code(3));
        assert!(!mem.is_code(-1));
    }

    #[test]
    fn empty_code_segment() {
        let mut mem = Memory::with(&[]);
        assert_eq!(mem.code_len(), 0);
        assert_eq!(mem.peek(0), 0);
        mem.poke(0, 7);
        assert_eq!(mem.peek(0), 7);
        assert_eq!(mem.code_len(), 0);
    }

    #[test]
    fn dirty_cells() {
        let image = [1, 2, 3];
        let mut mem = Memory::with(&image);
        assert!(mem.dirty_cells(&image).is_empty());

        mem.poke(2, 5);
        mem.poke(1, 2);
        mem.poke(100, 0);
        mem.poke(-3, 9);
        assert_eq!(mem.dirty_cells(&image), vec![(-3, 9), (2, 5), (100, 0)]);
    }
}
