// Copyright (c) 2024, The Netcode Project Authors.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright
//       notice, this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above
//       copyright notice, this list of conditions and the following disclaimer
//       in the documentation and/or other materials provided with the
//       distribution.
//
//     * Neither the name of the copyright holder nor the names of its
//       contributors may be used to endorse or promote products derived from
//       this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Symbol and coefficient storage.
//!
//! A [`SymbolStorage`] either owns one aligned buffer large enough for the
//! factory maxima (deep) or holds borrowed, caller-supplied buffers (shallow).
//! The lifetime parameter ties a shallow coder to the buffers it was given.

use aligned_box::AlignedBox;

use crate::error::{CodecError, Result};
use crate::generator::PivotInfo;

mod bitset;
mod coefficients;

pub use bitset::StatusBitset;
pub use coefficients::CoefficientStorage;

/// Alignment of deep symbol buffers.
pub const SYMBOL_ALIGNMENT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolStatus {
    /// No buffer is assigned to the symbol.
    Unavailable,
    /// A buffer exists but holds no data yet.
    Available,
    /// The buffer holds source data or a decoded row.
    Initialized,
}

/// Backing memory of a [`SymbolStorage`].
pub enum Backing<'a> {
    Owned(AlignedBox<[u8]>),
    Borrowed(Vec<Option<&'a mut [u8]>>),
}

pub struct SymbolStorage<'a> {
    backing: Backing<'a>,
    capacity: usize,
    symbols: usize,
    symbol_size: usize,
    status: Vec<SymbolStatus>,
    initialized: usize,
}

fn unassigned(index: usize) -> ! {
    panic!("symbol {} has no storage assigned", index)
}

impl<'a> SymbolStorage<'a> {
    /// Deep storage sized for `max_symbols * max_symbol_size` bytes.
    pub fn owned(max_symbols: usize, max_symbol_size: usize) -> Result<Self> {
        let capacity = max_symbols * max_symbol_size;
        let data = AlignedBox::slice_from_default(SYMBOL_ALIGNMENT, capacity.max(1))
            .map_err(|_| CodecError::Allocation(capacity))?;
        Ok(SymbolStorage {
            backing: Backing::Owned(data),
            capacity,
            symbols: 0,
            symbol_size: 0,
            status: Vec::new(),
            initialized: 0,
        })
    }

    /// Shallow storage; every symbol starts unavailable until attached.
    pub fn borrowed() -> Self {
        SymbolStorage {
            backing: Backing::Borrowed(Vec::new()),
            capacity: usize::MAX,
            symbols: 0,
            symbol_size: 0,
            status: Vec::new(),
            initialized: 0,
        }
    }

    /// Resets to `symbols` symbols of `symbol_size` bytes, none initialized.
    ///
    /// Deep storage is zeroed; shallow storage drops every attached buffer.
    pub fn initialize(&mut self, symbols: usize, symbol_size: usize) {
        assert!(
            symbols * symbol_size <= self.capacity,
            "block of {} bytes exceeds storage capacity {}",
            symbols * symbol_size,
            self.capacity
        );
        self.symbols = symbols;
        self.symbol_size = symbol_size;
        self.initialized = 0;
        self.status.clear();
        match &mut self.backing {
            Backing::Owned(data) => {
                data[..symbols * symbol_size].fill(0);
                self.status.resize(symbols, SymbolStatus::Available);
            }
            Backing::Borrowed(slots) => {
                slots.clear();
                slots.resize_with(symbols, || None);
                self.status.resize(symbols, SymbolStatus::Unavailable);
            }
        }
    }

    /// Largest block in bytes this storage can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn symbols(&self) -> usize {
        self.symbols
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    pub fn block_size(&self) -> usize {
        self.symbols * self.symbol_size
    }

    pub fn status(&self, index: usize) -> SymbolStatus {
        self.status[index]
    }

    pub fn is_symbol_initialized(&self, index: usize) -> bool {
        self.status[index] == SymbolStatus::Initialized
    }

    pub fn symbols_initialized(&self) -> usize {
        self.initialized
    }

    pub fn is_storage_full(&self) -> bool {
        self.initialized == self.symbols
    }

    pub fn mark_initialized(&mut self, index: usize) {
        assert!(
            self.status[index] != SymbolStatus::Unavailable,
            "symbol {} has no storage assigned",
            index
        );
        if self.status[index] != SymbolStatus::Initialized {
            self.status[index] = SymbolStatus::Initialized;
            self.initialized += 1;
        }
    }

    pub fn symbol(&self, index: usize) -> &[u8] {
        assert!(index < self.symbols, "symbol {} out of range", index);
        match &self.backing {
            Backing::Owned(data) => {
                let start = index * self.symbol_size;
                &data[start..start + self.symbol_size]
            }
            Backing::Borrowed(slots) => slots[index].as_deref().unwrap_or_else(|| unassigned(index)),
        }
    }

    pub fn symbol_mut(&mut self, index: usize) -> &mut [u8] {
        assert!(index < self.symbols, "symbol {} out of range", index);
        match &mut self.backing {
            Backing::Owned(data) => {
                let start = index * self.symbol_size;
                &mut data[start..start + self.symbol_size]
            }
            Backing::Borrowed(slots) => slots[index]
                .as_deref_mut()
                .unwrap_or_else(|| unassigned(index)),
        }
    }

    /// Mutable symbol `dst` together with symbol `src`; the two must differ.
    pub fn pair_mut(&mut self, dst: usize, src: usize) -> (&mut [u8], &[u8]) {
        assert!(dst != src, "aliased symbols");
        assert!(dst < self.symbols && src < self.symbols);
        let size = self.symbol_size;
        match &mut self.backing {
            Backing::Owned(data) => {
                if dst < src {
                    let (head, tail) = data.split_at_mut(src * size);
                    (&mut head[dst * size..(dst + 1) * size], &tail[..size])
                } else {
                    let (head, tail) = data.split_at_mut(dst * size);
                    (&mut tail[..size], &head[src * size..(src + 1) * size])
                }
            }
            Backing::Borrowed(slots) => {
                let (d, s) = if dst < src {
                    let (head, tail) = slots.split_at_mut(src);
                    (&mut head[dst], &tail[0])
                } else {
                    let (head, tail) = slots.split_at_mut(dst);
                    (&mut tail[0], &head[src])
                };
                (
                    d.as_deref_mut().unwrap_or_else(|| unassigned(dst)),
                    s.as_deref().unwrap_or_else(|| unassigned(src)),
                )
            }
        }
    }

    /// Copies `data` into symbol `index` and marks it initialized.
    pub fn set_symbol(&mut self, index: usize, data: &[u8]) {
        assert_eq!(data.len(), self.symbol_size, "symbol {} has the wrong size", index);
        self.symbol_mut(index).copy_from_slice(data);
        self.mark_initialized(index);
    }

    /// Copies a whole block into storage, one symbol per `symbol_size` bytes.
    pub fn set_symbols(&mut self, data: &[u8]) {
        assert_eq!(data.len(), self.block_size(), "block has the wrong size");
        if self.symbol_size == 0 {
            return;
        }
        for (index, chunk) in data.chunks_exact(self.symbol_size).enumerate() {
            self.set_symbol(index, chunk);
        }
    }

    /// Assigns a caller buffer to symbol `index` of shallow storage.
    pub fn attach_symbol(&mut self, index: usize, buffer: &'a mut [u8]) {
        assert!(index < self.symbols, "symbol {} out of range", index);
        assert_eq!(buffer.len(), self.symbol_size, "symbol {} has the wrong size", index);
        match &mut self.backing {
            Backing::Borrowed(slots) => slots[index] = Some(buffer),
            Backing::Owned(_) => panic!("cannot attach buffers to deep storage"),
        }
        if self.status[index] == SymbolStatus::Unavailable {
            self.status[index] = SymbolStatus::Available;
        }
        self.mark_initialized(index);
    }

    /// Splits one caller block into symbols and attaches each of them.
    pub fn attach_symbols(&mut self, block: &'a mut [u8]) {
        assert_eq!(block.len(), self.block_size(), "block has the wrong size");
        if self.symbol_size == 0 {
            return;
        }
        let size = self.symbol_size;
        for (index, chunk) in block.chunks_exact_mut(size).enumerate() {
            self.attach_symbol(index, chunk);
        }
    }

    /// Copies the block out into `dest`, which must hold `block_size` bytes.
    pub fn copy_symbols(&self, dest: &mut [u8]) {
        assert!(dest.len() >= self.block_size(), "destination too small");
        if self.symbol_size == 0 {
            return;
        }
        for (index, chunk) in dest[..self.block_size()]
            .chunks_exact_mut(self.symbol_size)
            .enumerate()
        {
            chunk.copy_from_slice(self.symbol(index));
        }
    }
}

impl PivotInfo for SymbolStorage<'_> {
    fn symbols(&self) -> usize {
        self.symbols
    }

    fn rank(&self) -> usize {
        self.initialized
    }

    fn is_symbol_pivot(&self, index: usize) -> bool {
        self.is_symbol_initialized(index)
    }
}
