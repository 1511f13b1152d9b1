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

//! # Linear Block Decoder
//!
//! Incremental Gauss-Jordan elimination over one block. Every received
//! symbol is reduced against the rows already held; a symbol that still has
//! a nonzero entry in a column without a row becomes the row for that
//! column. The block is complete once every column has a row.
//!
//! Each stored row `q` holds 1 at column `q` and zero at every column that
//! precedes `q` in the elimination direction. An eager decoder also keeps
//! every row zero at all other pivot columns, so a row that reduces to the
//! unit vector is known to equal the source symbol. A delayed decoder only
//! keeps the triangular form and runs one backward pass on completion.
//!
//! The banded order is meant for perpetual codes. Rows stay triangular in
//! forward order and each row remembers the last column it can be nonzero
//! at, so reducing a banded symbol only touches the columns of its band.

use log::{debug, info, trace};
use serde::Deserialize;
use std::fmt;

use crate::error::{CodecError, Result};
use crate::factory::CodecFactory;
use crate::field::{FieldKind, SharedField};
use crate::generator::{CoefficientGenerator, PivotInfo};
use crate::packet::{self, Packet, PacketCodec, SymbolId};
use crate::storage::{CoefficientStorage, SymbolStorage};
use crate::telemetry;

/// Order in which columns are searched for a pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Lowest unpivoted nonzero column first.
    #[default]
    Forward,
    /// Highest unpivoted nonzero column first.
    Backward,
    /// Forward order with row operations confined to each row's band.
    /// Always delayed.
    Banded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotState {
    Missing,
    /// A row is stored but may still mix in other symbols.
    Coded,
    /// The stored row equals the source symbol.
    Decoded,
}

type CompleteCallback = Box<dyn FnMut() + Send>;

pub struct Decoder<'a> {
    field: SharedField,
    kind: FieldKind,
    symbols: usize,
    symbol_size: usize,
    /// Symbol length in field elements.
    symbol_length: usize,
    direction: Direction,
    delayed: bool,
    storage: SymbolStorage<'a>,
    coefficients: CoefficientStorage,
    pivots: Vec<PivotState>,
    /// Last column each stored row may be nonzero at.
    extents: Vec<usize>,
    rank: usize,
    decoded: usize,
    partial_complete: bool,
    seen_encoder_rank: u32,
    completed: bool,
    callback: Option<CompleteCallback>,
    generator: Box<dyn CoefficientGenerator>,
    seed: u32,
    codec: PacketCodec,
    scratch_symbol: Vec<u8>,
    scratch_vector: Vec<u8>,
}

impl<'a> Decoder<'a> {
    /// Builds a decoder around `storage` and initializes it from `factory`.
    pub(crate) fn new(factory: &CodecFactory, storage: SymbolStorage<'a>) -> Result<Self> {
        let config = factory.config();
        let field = factory.field();
        let mut decoder = Decoder {
            kind: field.kind(),
            field,
            symbols: 0,
            symbol_size: 0,
            symbol_length: 0,
            direction: config.decoder.direction,
            delayed: config.decoder.delayed || config.decoder.direction == Direction::Banded,
            storage,
            coefficients: CoefficientStorage::new(config.field, config.max_symbols),
            pivots: Vec::new(),
            extents: Vec::new(),
            rank: 0,
            decoded: 0,
            partial_complete: false,
            seen_encoder_rank: 0,
            completed: false,
            callback: None,
            generator: factory.build_generator()?,
            seed: config.seed,
            codec: factory.packet_codec(),
            scratch_symbol: Vec::new(),
            scratch_vector: Vec::new(),
        };
        decoder.initialize(factory)?;
        Ok(decoder)
    }

    /// Resets the decoder to an empty block with the factory's current
    /// geometry. Shallow decoders drop their attached buffers.
    pub fn initialize(&mut self, factory: &CodecFactory) -> Result<()> {
        let symbols = factory.symbols();
        let symbol_size = factory.symbol_size();
        if symbols * symbol_size > self.storage.capacity() {
            return Err(CodecError::InvalidConfig(format!(
                "block of {} bytes exceeds the {} bytes this decoder was built for",
                symbols * symbol_size,
                self.storage.capacity()
            )));
        }
        self.symbols = symbols;
        self.symbol_size = symbol_size;
        self.symbol_length = self.kind.size_to_elements(symbol_size);
        self.storage.initialize(symbols, symbol_size);
        self.coefficients.initialize(symbols);
        self.pivots.clear();
        self.pivots.resize(symbols, PivotState::Missing);
        self.extents.clear();
        self.extents.resize(symbols, 0);
        self.rank = 0;
        self.decoded = 0;
        self.partial_complete = false;
        self.seen_encoder_rank = 0;
        self.completed = false;
        self.generator.initialize(symbols);
        self.generator.seed(self.seed);
        self.codec = factory.packet_codec();
        self.scratch_symbol = vec![0; symbol_size];
        self.scratch_vector = vec![0; self.coefficients.vector_size()];
        debug!(
            "decoder initialized: {} symbols of {} bytes over {}",
            symbols, symbol_size, self.kind
        );
        Ok(())
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

    /// Bytes in one coefficient vector.
    pub fn vector_size(&self) -> usize {
        self.coefficients.vector_size()
    }

    pub fn field(&self) -> FieldKind {
        self.kind
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn is_complete(&self) -> bool {
        self.rank == self.symbols
    }

    pub fn pivot_state(&self, index: usize) -> PivotState {
        self.pivots[index]
    }

    pub fn is_symbol_pivot(&self, index: usize) -> bool {
        self.pivots[index] != PivotState::Missing
    }

    /// True if the row at `index` is known to equal the source symbol.
    pub fn is_symbol_uncoded(&self, index: usize) -> bool {
        self.pivots[index] == PivotState::Decoded
    }

    pub fn symbols_uncoded(&self) -> usize {
        self.decoded
    }

    /// True if the last decode call made more symbols usable than before.
    ///
    /// Delayed decoders reduce their rows early once their rank reaches the
    /// rank announced by the sender, so they report partial completion at
    /// that point as well.
    pub fn is_partial_complete(&self) -> bool {
        self.partial_complete
    }

    /// Highest rank announced by a sender through the rank header.
    pub fn seen_encoder_rank(&self) -> u32 {
        self.seen_encoder_rank
    }

    /// Registers a callback fired once when the block completes.
    pub fn set_complete_callback(&mut self, callback: impl FnMut() + Send + 'static) {
        self.callback = Some(Box::new(callback));
    }

    pub fn symbol(&self, index: usize) -> &[u8] {
        self.storage.symbol(index)
    }

    pub fn coefficient_vector(&self, index: usize) -> &[u8] {
        self.coefficients.vector(index)
    }

    /// Copies the decoded block into `dest`.
    pub fn copy_symbols(&self, dest: &mut [u8]) {
        self.storage.copy_symbols(dest);
    }

    /// Lends the decoder a caller buffer for the whole block. Shallow only.
    pub fn set_symbols(&mut self, block: &'a mut [u8]) {
        self.storage.attach_symbols(block);
    }

    /// Lends the decoder a caller buffer for one symbol. Shallow only.
    pub fn set_symbol(&mut self, index: usize, buffer: &'a mut [u8]) {
        self.storage.attach_symbol(index, buffer);
    }

    pub fn packet_codec(&self) -> &PacketCodec {
        &self.codec
    }

    /// Incorporates one coded symbol. Both buffers are used as scratch space.
    ///
    /// A symbol that is linearly dependent on the rows already held leaves
    /// the decoder unchanged. Every coefficient must be a field element.
    pub fn decode_symbol(&mut self, symbol: &mut [u8], coefficients: &mut [u8]) {
        assert!(symbol.len() >= self.symbol_size, "symbol buffer too small");
        assert!(
            coefficients.len() >= self.vector_size(),
            "coefficient buffer too small"
        );
        assert!(
            self.kind.find_invalid(coefficients, self.symbols).is_none(),
            "coefficient outside {}",
            self.kind
        );
        telemetry::DECODED_PACKETS.inc();
        let before = self.decoded;
        if self.is_complete() {
            self.dependent();
        } else {
            self.decode_coded(symbol, coefficients);
            self.settle();
        }
        self.partial_complete = self.decoded > before;
    }

    /// Incorporates the source symbol at `index`.
    pub fn decode_uncoded(&mut self, symbol: &[u8], index: usize) {
        assert!(index < self.symbols, "symbol {} out of range", index);
        assert!(symbol.len() >= self.symbol_size, "symbol buffer too small");
        telemetry::DECODED_PACKETS.inc();
        let before = self.decoded;
        match self.pivots[index] {
            PivotState::Decoded => self.dependent(),
            PivotState::Missing => {
                self.store_uncoded(index, symbol);
                if !self.delayed {
                    self.eliminate_uncoded(index, symbol);
                }
            }
            PivotState::Coded => self.swap_coded_row(index, symbol),
        }
        self.settle();
        self.partial_complete = self.decoded > before;
    }

    /// Incorporates a parsed packet.
    pub fn decode_packet(&mut self, packet: Packet) -> Result<()> {
        let Packet { mut data, id, rank } = packet;
        if data.len() != self.symbol_size {
            return Err(CodecError::BufferTooShort {
                needed: self.symbol_size,
                actual: data.len(),
            });
        }
        if let Some(rank) = rank {
            self.seen_encoder_rank = self.seen_encoder_rank.max(rank);
        }
        match id {
            SymbolId::Systematic(index) => {
                let index = index as usize;
                if index >= self.symbols {
                    return Err(CodecError::IndexOutOfRange {
                        index,
                        symbols: self.symbols,
                    });
                }
                self.decode_uncoded(&data, index);
            }
            SymbolId::Coefficients(mut coefficients) => {
                if coefficients.len() != self.vector_size() {
                    return Err(CodecError::BufferTooShort {
                        needed: self.vector_size(),
                        actual: coefficients.len(),
                    });
                }
                if let Some((column, value)) = self.kind.find_invalid(&coefficients, self.symbols) {
                    return Err(CodecError::InvalidCoefficient {
                        column,
                        value,
                        field: self.kind,
                    });
                }
                self.decode_symbol(&mut data, &mut coefficients);
            }
            SymbolId::Seed(seed) => {
                let mut coefficients = vec![0u8; self.vector_size()];
                self.generator.seed(seed);
                self.generator.generate(&mut coefficients);
                self.decode_symbol(&mut data, &mut coefficients);
            }
        }
        Ok(())
    }

    /// Parses and incorporates one payload.
    pub fn read_payload(&mut self, payload: &[u8]) -> Result<()> {
        let packet = self.codec.read(payload)?;
        self.decode_packet(packet)
    }

    /// Writes the pivot bitset and rank for the sender.
    pub fn write_feedback(&self, out: &mut [u8]) -> Result<usize> {
        packet::write_feedback(self, out)
    }

    pub fn feedback_size(&self) -> usize {
        packet::feedback_size(self.symbols)
    }

    /// Column visited at step `k` of the elimination order.
    fn column_at(&self, k: usize) -> usize {
        match self.direction {
            Direction::Forward | Direction::Banded => k,
            Direction::Backward => self.symbols - 1 - k,
        }
    }

    /// Step at which `column` is visited.
    fn position(&self, column: usize) -> usize {
        self.column_at(column)
    }

    fn dependent(&mut self) {
        telemetry::DEPENDENT_PACKETS.inc();
        debug!("linearly dependent symbol at rank {}", self.rank);
    }

    fn decode_coded(&mut self, symbol: &mut [u8], coefficients: &mut [u8]) {
        if self.direction == Direction::Banded {
            self.decode_banded(symbol, coefficients);
            return;
        }
        let pivot = match self.forward_substitute_to_pivot(symbol, coefficients) {
            Some(pivot) => pivot,
            None => {
                self.dependent();
                return;
            }
        };
        if !self.kind.is_binary() {
            self.normalize(pivot, symbol, coefficients);
        }
        if !self.delayed {
            self.forward_substitute_from_pivot(pivot, symbol, coefficients);
            self.backward_substitute(pivot, symbol, coefficients);
        }
        self.store_coded(pivot, self.symbols - 1, symbol, coefficients);
    }

    /// Forward reduction that starts at the band and never looks past the
    /// last column the symbol or any row subtracted from it can reach.
    fn decode_banded(&mut self, symbol: &mut [u8], coefficients: &mut [u8]) {
        let (first, mut last) = match self.band(coefficients) {
            Some(band) => band,
            None => {
                self.dependent();
                return;
            }
        };
        let mut column = first;
        let pivot = loop {
            if column > last {
                self.dependent();
                return;
            }
            let value = self.kind.get_value(coefficients, column);
            if value != 0 {
                if self.pivots[column] == PivotState::Missing {
                    break column;
                }
                last = last.max(self.extents[column]);
                self.subtract_band(column, value, symbol, coefficients);
            }
            column += 1;
        };
        let value = self.kind.get_value(coefficients, pivot);
        if value != 1 {
            let inverse = self.field.invert(value);
            let (offset, length) = self.span(pivot, last);
            self.field
                .region_multiply_constant(&mut coefficients[offset..], inverse, length);
            self.field
                .region_multiply_constant(symbol, inverse, self.symbol_length);
        }
        trace!("banded row {} reaches column {}", pivot, last);
        self.store_coded(pivot, last, symbol, coefficients);
    }

    /// First and last nonzero columns of a coefficient vector.
    fn band(&self, coefficients: &[u8]) -> Option<(usize, usize)> {
        let first = (0..self.symbols).find(|&c| self.kind.get_value(coefficients, c) != 0)?;
        let last = (first..self.symbols)
            .rev()
            .find(|&c| self.kind.get_value(coefficients, c) != 0)?;
        Some((first, last))
    }

    /// Byte offset and element count covering columns `first..=last`.
    fn span(&self, first: usize, last: usize) -> (usize, usize) {
        let start = self.kind.byte_aligned(first);
        (self.kind.elements_to_size(start), last + 1 - start)
    }

    /// Subtracts `value` times banded row `row`, whose columns before `row`
    /// are zero.
    fn subtract_band(&self, row: usize, value: u32, symbol: &mut [u8], coefficients: &mut [u8]) {
        let (offset, length) = self.span(row, self.extents[row]);
        self.field.region_multiply_subtract(
            &mut coefficients[offset..],
            &self.coefficients.vector(row)[offset..],
            value,
            length,
        );
        self.field
            .region_multiply_subtract(symbol, self.storage.symbol(row), value, self.symbol_length);
    }

    /// Subtracts `value` times row `row` from the incoming symbol.
    fn subtract_row(&self, row: usize, value: u32, symbol: &mut [u8], coefficients: &mut [u8]) {
        self.field.region_multiply_subtract(
            coefficients,
            self.coefficients.vector(row),
            value,
            self.symbols,
        );
        self.field
            .region_multiply_subtract(symbol, self.storage.symbol(row), value, self.symbol_length);
    }

    /// Reduces the incoming symbol up to its first unpivoted nonzero column.
    fn forward_substitute_to_pivot(
        &self,
        symbol: &mut [u8],
        coefficients: &mut [u8],
    ) -> Option<usize> {
        for k in 0..self.symbols {
            let column = self.column_at(k);
            let value = self.kind.get_value(coefficients, column);
            if value == 0 {
                continue;
            }
            if self.pivots[column] == PivotState::Missing {
                return Some(column);
            }
            self.subtract_row(column, value, symbol, coefficients);
        }
        None
    }

    fn normalize(&self, pivot: usize, symbol: &mut [u8], coefficients: &mut [u8]) {
        let value = self.kind.get_value(coefficients, pivot);
        debug_assert!(value != 0);
        if value == 1 {
            return;
        }
        let inverse = self.field.invert(value);
        self.field
            .region_multiply_constant(coefficients, inverse, self.symbols);
        self.field
            .region_multiply_constant(symbol, inverse, self.symbol_length);
    }

    /// Clears pivoted columns that follow `pivot` from the incoming symbol.
    fn forward_substitute_from_pivot(
        &self,
        pivot: usize,
        symbol: &mut [u8],
        coefficients: &mut [u8],
    ) {
        for k in self.position(pivot) + 1..self.symbols {
            let column = self.column_at(k);
            if self.pivots[column] == PivotState::Missing {
                continue;
            }
            let value = self.kind.get_value(coefficients, column);
            if value != 0 {
                self.subtract_row(column, value, symbol, coefficients);
            }
        }
    }

    /// Clears column `pivot` from every stored row using the incoming symbol.
    fn backward_substitute(&mut self, pivot: usize, symbol: &[u8], coefficients: &[u8]) {
        for row in 0..self.symbols {
            if self.pivots[row] == PivotState::Missing {
                continue;
            }
            let value = self.coefficients.value(row, pivot);
            if value == 0 {
                continue;
            }
            self.field.region_multiply_subtract(
                self.coefficients.vector_mut(row),
                coefficients,
                value,
                self.symbols,
            );
            self.field.region_multiply_subtract(
                self.storage.symbol_mut(row),
                symbol,
                value,
                self.symbol_length,
            );
            if self.pivots[row] == PivotState::Coded && self.coefficients.is_unit(row) {
                self.mark_decoded(row);
            }
        }
    }

    fn store_coded(&mut self, pivot: usize, last: usize, symbol: &[u8], coefficients: &[u8]) {
        let vector_size = self.vector_size();
        self.coefficients
            .vector_mut(pivot)
            .copy_from_slice(&coefficients[..vector_size]);
        self.storage
            .symbol_mut(pivot)
            .copy_from_slice(&symbol[..self.symbol_size]);
        self.storage.mark_initialized(pivot);
        self.pivots[pivot] = PivotState::Coded;
        self.extents[pivot] = last;
        self.rank += 1;
        if !self.delayed && self.coefficients.is_unit(pivot) {
            self.mark_decoded(pivot);
        }
    }

    fn store_uncoded(&mut self, index: usize, symbol: &[u8]) {
        self.coefficients.set_unit(index);
        self.storage
            .symbol_mut(index)
            .copy_from_slice(&symbol[..self.symbol_size]);
        self.storage.mark_initialized(index);
        self.extents[index] = index;
        self.rank += 1;
        self.mark_decoded(index);
    }

    /// Clears column `index` from every other row after a source symbol
    /// arrived for a previously missing column.
    fn eliminate_uncoded(&mut self, index: usize, symbol: &[u8]) {
        for row in 0..self.symbols {
            if row == index || self.pivots[row] == PivotState::Missing {
                continue;
            }
            let value = self.coefficients.value(row, index);
            if value == 0 {
                continue;
            }
            self.kind
                .set_value(self.coefficients.vector_mut(row), index, 0);
            self.field.region_multiply_subtract(
                self.storage.symbol_mut(row),
                symbol,
                value,
                self.symbol_length,
            );
            if self.pivots[row] == PivotState::Coded && self.coefficients.is_unit(row) {
                self.mark_decoded(row);
            }
        }
    }

    /// A source symbol arrived for a column held by a coded row. The source
    /// symbol takes the column and the displaced row is reduced by it and
    /// decoded again.
    fn swap_coded_row(&mut self, index: usize, symbol: &[u8]) {
        trace!("uncoded symbol {} displaces a coded row", index);
        let mut row_symbol = std::mem::take(&mut self.scratch_symbol);
        let mut row_vector = std::mem::take(&mut self.scratch_vector);
        row_symbol.copy_from_slice(self.storage.symbol(index));
        row_vector.copy_from_slice(self.coefficients.vector(index));

        self.rank -= 1;
        self.store_uncoded(index, symbol);

        let value = self.kind.get_value(&row_vector, index);
        self.kind.set_value(&mut row_vector, index, 0);
        self.field
            .region_multiply_subtract(&mut row_symbol, symbol, value, self.symbol_length);
        self.decode_coded(&mut row_symbol, &mut row_vector);

        self.scratch_symbol = row_symbol;
        self.scratch_vector = row_vector;
    }

    fn mark_decoded(&mut self, index: usize) {
        if self.pivots[index] != PivotState::Decoded {
            self.pivots[index] = PivotState::Decoded;
            self.decoded += 1;
        }
    }

    /// Turns the triangular rows of a delayed decoder into unit rows.
    fn final_backward_substitute(&mut self) {
        if self.direction == Direction::Banded {
            self.final_banded_substitute();
            return;
        }
        for k in (0..self.symbols).rev() {
            let pivot = self.column_at(k);
            for row in 0..self.symbols {
                if row == pivot {
                    continue;
                }
                let value = self.coefficients.value(row, pivot);
                if value == 0 {
                    continue;
                }
                let (dst, src) = self.coefficients.pair_mut(row, pivot);
                self.field
                    .region_multiply_subtract(dst, src, value, self.symbols);
                let (dst, src) = self.storage.pair_mut(row, pivot);
                self.field
                    .region_multiply_subtract(dst, src, value, self.symbol_length);
            }
        }
    }

    /// Backward pass of a complete banded decoder. Row `pivot` is already a
    /// unit row when it is used, so only its symbol is subtracted.
    fn final_banded_substitute(&mut self) {
        for pivot in (0..self.symbols).rev() {
            for row in 0..pivot {
                if self.extents[row] < pivot {
                    continue;
                }
                let value = self.coefficients.value(row, pivot);
                if value == 0 {
                    continue;
                }
                self.kind
                    .set_value(self.coefficients.vector_mut(row), pivot, 0);
                let (dst, src) = self.storage.pair_mut(row, pivot);
                self.field
                    .region_multiply_subtract(dst, src, value, self.symbol_length);
            }
        }
    }

    /// Backward pass over the rows held so far. Rows that become unit rows
    /// are decoded; the others keep entries only in missing columns.
    fn backward_substitute_held(&mut self) {
        for k in (0..self.symbols).rev() {
            let pivot = self.column_at(k);
            if self.pivots[pivot] == PivotState::Missing {
                continue;
            }
            for row in 0..self.symbols {
                if row == pivot || self.pivots[row] == PivotState::Missing {
                    continue;
                }
                let value = self.coefficients.value(row, pivot);
                if value == 0 {
                    continue;
                }
                let (dst, src) = self.coefficients.pair_mut(row, pivot);
                self.field
                    .region_multiply_subtract(dst, src, value, self.symbols);
                let (dst, src) = self.storage.pair_mut(row, pivot);
                self.field
                    .region_multiply_subtract(dst, src, value, self.symbol_length);
                self.extents[row] = self.extents[row].max(self.extents[pivot]);
            }
        }
        for row in 0..self.symbols {
            if self.pivots[row] == PivotState::Coded && self.coefficients.is_unit(row) {
                self.mark_decoded(row);
            }
        }
    }

    fn settle(&mut self) {
        self.check_complete();
        if self.delayed
            && !self.completed
            && self.rank > 0
            && self.rank as u32 == self.seen_encoder_rank
        {
            debug!("rank {} matches the sender, reducing held rows", self.rank);
            self.backward_substitute_held();
        }
    }

    fn check_complete(&mut self) {
        if self.completed || !self.is_complete() {
            return;
        }
        if self.delayed {
            self.final_backward_substitute();
        }
        for index in 0..self.symbols {
            self.mark_decoded(index);
        }
        self.completed = true;
        telemetry::COMPLETED_BLOCKS.inc();
        info!("block of {} symbols decoded", self.symbols);
        if let Some(callback) = self.callback.as_mut() {
            callback();
        }
    }
}

impl PivotInfo for Decoder<'_> {
    fn symbols(&self) -> usize {
        self.symbols
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn is_symbol_pivot(&self, index: usize) -> bool {
        self.pivots[index] != PivotState::Missing
    }
}

impl fmt::Debug for Decoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("field", &self.kind)
            .field("symbols", &self.symbols)
            .field("symbol_size", &self.symbol_size)
            .field("direction", &self.direction)
            .field("delayed", &self.delayed)
            .field("rank", &self.rank)
            .field("decoded", &self.decoded)
            .finish()
    }
}
