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

//! # Encoder
//!
//! Produces packets from the source symbols held in storage. In the
//! systematic phase every available symbol is sent uncoded once; after that
//! each packet is a linear combination of the available symbols. Symbols may
//! be added to storage at any time, and coefficients are only drawn for the
//! symbols present, so a partially filled block can already be encoded.

use log::debug;
use std::fmt;

use crate::error::Result;
use crate::factory::CodecFactory;
use crate::field::{FieldKind, SharedField};
use crate::generator::{PivotAwareGenerator, PivotInfo};
use crate::packet::{self, Packet, PacketCodec, SymbolId, SymbolIdKind};
use crate::storage::SymbolStorage;
use crate::telemetry;

mod systematic;

pub use systematic::SystematicPhase;

/// Symbols held locally that the remote decoder has not reported.
struct UsefulSymbols<'s, 'a> {
    storage: &'s SymbolStorage<'a>,
    generator: &'s PivotAwareGenerator,
}

impl PivotInfo for UsefulSymbols<'_, '_> {
    fn symbols(&self) -> usize {
        self.storage.symbols()
    }

    fn rank(&self) -> usize {
        (0..self.symbols()).filter(|i| self.is_symbol_pivot(*i)).count()
    }

    fn is_symbol_pivot(&self, index: usize) -> bool {
        self.generator.can_generate_index(self.storage, index)
    }
}

pub struct Encoder<'a> {
    field: SharedField,
    kind: FieldKind,
    symbols: usize,
    symbol_size: usize,
    symbol_length: usize,
    storage: SymbolStorage<'a>,
    generator: PivotAwareGenerator,
    systematic: SystematicPhase,
    id_kind: SymbolIdKind,
    rank_header: bool,
    seed: u32,
    next_seed: u32,
    codec: PacketCodec,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(factory: &CodecFactory, storage: SymbolStorage<'a>) -> Result<Self> {
        let config = factory.config();
        let field = factory.field();
        let mut encoder = Encoder {
            kind: field.kind(),
            field,
            symbols: 0,
            symbol_size: 0,
            symbol_length: 0,
            storage,
            generator: PivotAwareGenerator::new(factory.build_generator()?),
            systematic: SystematicPhase::new(config.systematic),
            id_kind: config.symbol_id,
            rank_header: config.rank_header,
            seed: config.seed,
            next_seed: config.seed,
            codec: factory.packet_codec(),
        };
        encoder.initialize(factory)?;
        Ok(encoder)
    }

    /// Resets storage, systematic state, feedback and generator seed to the
    /// factory's current geometry.
    pub fn initialize(&mut self, factory: &CodecFactory) -> Result<()> {
        let symbols = factory.symbols();
        let symbol_size = factory.symbol_size();
        if symbols * symbol_size > self.storage.capacity() {
            return Err(crate::error::CodecError::InvalidConfig(format!(
                "block of {} bytes exceeds the {} bytes this encoder was built for",
                symbols * symbol_size,
                self.storage.capacity()
            )));
        }
        self.symbols = symbols;
        self.symbol_size = symbol_size;
        self.symbol_length = self.kind.size_to_elements(symbol_size);
        self.storage.initialize(symbols, symbol_size);
        self.generator.initialize(symbols);
        self.generator.seed(self.seed);
        self.systematic.initialize(symbols);
        self.next_seed = self.seed;
        self.codec = factory.packet_codec();
        debug!(
            "encoder initialized: {} symbols of {} bytes over {}",
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

    pub fn vector_size(&self) -> usize {
        self.kind.elements_to_size(self.symbols)
    }

    pub fn field(&self) -> FieldKind {
        self.kind
    }

    /// Number of source symbols available to the encoder.
    pub fn rank(&self) -> usize {
        self.storage.symbols_initialized()
    }

    pub fn is_symbol_initialized(&self, index: usize) -> bool {
        self.storage.is_symbol_initialized(index)
    }

    pub fn symbol(&self, index: usize) -> &[u8] {
        self.storage.symbol(index)
    }

    /// Copies a whole block into the encoder.
    pub fn set_symbols(&mut self, block: &[u8]) {
        self.storage.set_symbols(block);
    }

    /// Copies one source symbol into the encoder.
    pub fn set_symbol(&mut self, index: usize, data: &[u8]) {
        self.storage.set_symbol(index, data);
    }

    /// Lends a caller block to a shallow encoder.
    pub fn attach_symbols(&mut self, block: &'a mut [u8]) {
        self.storage.attach_symbols(block);
    }

    /// Lends one caller symbol to a shallow encoder.
    pub fn attach_symbol(&mut self, index: usize, buffer: &'a mut [u8]) {
        self.storage.attach_symbol(index, buffer);
    }

    pub fn is_systematic_on(&self) -> bool {
        self.systematic.is_systematic_on()
    }

    pub fn set_systematic_on(&mut self) {
        self.systematic.set_systematic_on();
    }

    pub fn set_systematic_off(&mut self) {
        self.systematic.set_systematic_off();
    }

    pub fn in_systematic_phase(&self) -> bool {
        let useful = UsefulSymbols {
            storage: &self.storage,
            generator: &self.generator,
        };
        self.systematic.in_systematic_phase(&useful)
    }

    pub fn packet_codec(&self) -> &PacketCodec {
        &self.codec
    }

    /// Produces the next packet: an uncoded symbol while the systematic
    /// phase lasts, a coded one afterwards.
    pub fn encode(&mut self) -> Packet {
        let rank = self.rank_header.then(|| self.rank() as u32);
        if self.systematic.is_systematic_on() {
            let useful = UsefulSymbols {
                storage: &self.storage,
                generator: &self.generator,
            };
            if let Some(index) = self.systematic.next_symbol(&useful) {
                self.systematic.mark_sent(index);
                telemetry::SYSTEMATIC_SYMBOLS.inc();
                return Packet {
                    data: self.storage.symbol(index).to_vec(),
                    id: SymbolId::Systematic(index as u32),
                    rank,
                };
            }
        }

        let mut coefficients = vec![0u8; self.vector_size()];
        let id = match self.id_kind {
            SymbolIdKind::Plain => {
                self.generator.generate(&mut coefficients, &self.storage);
                None
            }
            SymbolIdKind::Seed => {
                assert!(
                    self.storage.is_storage_full(),
                    "seed identifiers need every source symbol"
                );
                let seed = self.next_seed;
                self.next_seed = self.next_seed.wrapping_add(1);
                self.generator.seed(seed);
                self.generator.inner_mut().generate(&mut coefficients);
                Some(SymbolId::Seed(seed))
            }
        };
        let mut data = vec![0u8; self.symbol_size];
        self.encode_symbol(&mut data, &coefficients);
        telemetry::CODED_SYMBOLS.inc();
        Packet {
            data,
            id: id.unwrap_or(SymbolId::Coefficients(coefficients)),
            rank,
        }
    }

    /// Writes `Σ c_i · s_i` into `symbol` for the given coefficients.
    pub fn encode_symbol(&self, symbol: &mut [u8], coefficients: &[u8]) {
        assert!(symbol.len() >= self.symbol_size, "symbol buffer too small");
        symbol[..self.symbol_size].fill(0);
        for i in 0..self.symbols {
            let value = self.kind.get_value(coefficients, i);
            if value == 0 {
                continue;
            }
            assert!(
                self.storage.is_symbol_initialized(i),
                "coefficient for missing symbol {}",
                i
            );
            self.field.region_multiply_add(
                symbol,
                self.storage.symbol(i),
                value,
                self.symbol_length,
            );
        }
    }

    /// Encodes one packet straight into a payload buffer.
    pub fn write_payload(&mut self, out: &mut [u8]) -> Result<usize> {
        let packet = self.encode();
        self.codec.write(&packet, out)
    }

    /// Records the decoder's pivot state so later packets skip what it has.
    pub fn read_feedback(&mut self, feedback: &[u8]) -> Result<()> {
        let status = packet::read_feedback(self.symbols, feedback)?;
        debug!("encoder feedback: remote rank {}", status.rank());
        self.generator.set_remote(status);
        Ok(())
    }

    pub fn payload_size(&self) -> usize {
        self.codec.payload_size()
    }
}

impl fmt::Debug for Encoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("field", &self.kind)
            .field("symbols", &self.symbols)
            .field("symbol_size", &self.symbol_size)
            .field("rank", &self.rank())
            .field("systematic", &self.systematic.is_systematic_on())
            .field("id_kind", &self.id_kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::generator::tests::nonzero_columns;

    fn factory(symbols: usize, symbol_size: usize) -> CodecFactory {
        CodecFactory::new(CodecConfig {
            max_symbols: symbols,
            max_symbol_size: symbol_size,
            symbols,
            symbol_size,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn systematic_symbols_come_first() {
        let factory = factory(3, 2);
        let mut encoder = factory.build_encoder().unwrap();
        encoder.set_symbols(&[1, 2, 3, 4, 5, 6]);
        for i in 0..3 {
            assert!(encoder.in_systematic_phase());
            let packet = encoder.encode();
            assert_eq!(packet.id, SymbolId::Systematic(i));
            assert_eq!(packet.data, encoder.symbol(i as usize));
        }
        assert!(!encoder.in_systematic_phase());
        assert!(matches!(encoder.encode().id, SymbolId::Coefficients(_)));
    }

    #[test]
    fn partial_block_codes_only_available_symbols() {
        let factory = factory(6, 4);
        let mut encoder = factory.build_encoder().unwrap();
        encoder.set_systematic_off();
        encoder.set_symbol(1, &[1; 4]);
        encoder.set_symbol(4, &[2; 4]);
        assert_eq!(encoder.rank(), 2);
        for _ in 0..20 {
            let packet = encoder.encode();
            let SymbolId::Coefficients(c) = packet.id else {
                panic!("expected a coded packet");
            };
            for column in nonzero_columns(FieldKind::Binary8, &c, 6) {
                assert!(column == 1 || column == 4);
            }
        }
    }

    #[test]
    fn feedback_skips_symbols_the_decoder_holds() {
        let factory = factory(4, 1);
        let mut encoder = factory.build_encoder().unwrap();
        encoder.set_symbols(&[10, 20, 30, 40]);
        // decoder holds symbols 0 and 2
        encoder.read_feedback(&[0b0101, 0, 0, 0, 2]).unwrap();
        assert_eq!(encoder.encode().id, SymbolId::Systematic(1));
        assert_eq!(encoder.encode().id, SymbolId::Systematic(3));
        let SymbolId::Coefficients(c) = encoder.encode().id else {
            panic!("expected a coded packet");
        };
        assert_eq!(c[0], 0);
        assert_eq!(c[2], 0);
        assert!(encoder.read_feedback(&[0, 0]).is_err());
    }

    #[test]
    fn rank_header_carries_available_symbols() {
        let mut config = factory(3, 1).config().clone();
        config.rank_header = true;
        let factory = CodecFactory::new(config).unwrap();
        let mut encoder = factory.build_encoder().unwrap();
        encoder.set_symbol(2, &[9]);
        assert_eq!(encoder.encode().rank, Some(1));
    }

    #[test]
    #[should_panic(expected = "seed identifiers need every source symbol")]
    fn seed_ids_need_a_full_block() {
        let mut config = factory(3, 1).config().clone();
        config.symbol_id = SymbolIdKind::Seed;
        config.systematic = false;
        let factory = CodecFactory::new(config).unwrap();
        let mut encoder = factory.build_encoder().unwrap();
        encoder.set_symbol(0, &[1]);
        encoder.encode();
    }

    #[test]
    fn initialize_restores_systematic_default() {
        let factory = factory(2, 1);
        let mut encoder = factory.build_encoder().unwrap();
        encoder.set_systematic_off();
        encoder.set_symbols(&[1, 2]);
        encoder.initialize(&factory).unwrap();
        assert!(encoder.is_systematic_on());
        assert_eq!(encoder.rank(), 0);
    }
}
