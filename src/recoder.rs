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

//! # Recoder
//!
//! Combines the rows a decoder already holds into fresh coded symbols, so an
//! intermediate node can forward useful data before it has decoded the
//! block. Every stored row is a valid pair of coefficient vector and symbol,
//! which makes any linear combination of rows a valid coded symbol as well.

use log::debug;

use crate::decoder::Decoder;
use crate::error::{CodecError, Result};
use crate::factory::CodecFactory;
use crate::field::{FieldKind, SharedField};
use crate::generator::PivotAwareGenerator;
use crate::packet::{self, Packet, PacketCodec, SymbolId, SymbolIdKind};
use crate::telemetry;

#[derive(Debug)]
pub struct Recoder {
    field: SharedField,
    kind: FieldKind,
    generator: PivotAwareGenerator,
    seed: u32,
    rank_header: bool,
    codec: PacketCodec,
    recoding: Vec<u8>,
}

impl Recoder {
    pub(crate) fn new(factory: &CodecFactory) -> Result<Self> {
        let config = factory.config();
        let field = factory.field();
        let mut recoder = Recoder {
            kind: field.kind(),
            field,
            generator: PivotAwareGenerator::new(factory.build_generator()?),
            seed: config.seed,
            rank_header: config.rank_header,
            codec: factory.packet_codec(),
            recoding: Vec::new(),
        };
        recoder.initialize(factory)?;
        Ok(recoder)
    }

    pub fn initialize(&mut self, factory: &CodecFactory) -> Result<()> {
        let config = factory.config();
        if config.symbol_id == SymbolIdKind::Seed {
            return Err(CodecError::InvalidConfig(
                "recoded symbols cannot be identified by a seed".into(),
            ));
        }
        let symbols = factory.symbols();
        self.generator.initialize(symbols);
        self.generator.seed(self.seed);
        self.codec = factory.packet_codec();
        self.recoding = vec![0; factory.vector_size()];
        Ok(())
    }

    /// Produces one coded symbol from the rows held by `decoder`.
    ///
    /// A decoder without rows yields an all-zero symbol.
    pub fn recode(&mut self, decoder: &Decoder<'_>) -> Packet {
        let symbols = decoder.symbols();
        let vector_size = decoder.vector_size();
        let symbol_length = self.kind.size_to_elements(decoder.symbol_size());
        let mut coefficients = vec![0u8; vector_size];
        let mut data = vec![0u8; decoder.symbol_size()];

        self.recoding.resize(vector_size, 0);
        if decoder.rank() == 0 {
            self.recoding.fill(0);
        } else {
            self.generator.generate(&mut self.recoding, decoder);
        }
        for row in 0..symbols {
            let value = self.kind.get_value(&self.recoding, row);
            if value == 0 || !decoder.is_symbol_pivot(row) {
                continue;
            }
            self.field.region_multiply_add(
                &mut coefficients,
                decoder.coefficient_vector(row),
                value,
                symbols,
            );
            self.field
                .region_multiply_add(&mut data, decoder.symbol(row), value, symbol_length);
        }
        telemetry::RECODED_SYMBOLS.inc();
        Packet {
            data,
            id: SymbolId::Coefficients(coefficients),
            rank: self.rank_header.then(|| decoder.rank() as u32),
        }
    }

    pub fn write_payload(&mut self, decoder: &Decoder<'_>, out: &mut [u8]) -> Result<usize> {
        let packet = self.recode(decoder);
        self.codec.write(&packet, out)
    }

    /// Records the downstream decoder's pivots so later symbols skip them.
    pub fn read_feedback(&mut self, symbols: usize, feedback: &[u8]) -> Result<()> {
        let status = packet::read_feedback(symbols, feedback)?;
        debug!("recoder feedback: remote rank {}", status.rank());
        self.generator.set_remote(status);
        Ok(())
    }

    pub fn payload_size(&self) -> usize {
        self.codec.payload_size()
    }
}

/// A decoder that can forward recoded symbols while it is still decoding.
#[derive(Debug)]
pub struct RecodingDecoder<'a> {
    decoder: Decoder<'a>,
    recoder: Recoder,
}

impl<'a> RecodingDecoder<'a> {
    pub(crate) fn new(decoder: Decoder<'a>, recoder: Recoder) -> Self {
        RecodingDecoder { decoder, recoder }
    }

    pub fn initialize(&mut self, factory: &CodecFactory) -> Result<()> {
        self.decoder.initialize(factory)?;
        self.recoder.initialize(factory)
    }

    pub fn decoder(&self) -> &Decoder<'a> {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut Decoder<'a> {
        &mut self.decoder
    }

    pub fn recoder(&self) -> &Recoder {
        &self.recoder
    }

    pub fn rank(&self) -> usize {
        self.decoder.rank()
    }

    pub fn is_complete(&self) -> bool {
        self.decoder.is_complete()
    }

    pub fn decode_packet(&mut self, packet: Packet) -> Result<()> {
        self.decoder.decode_packet(packet)
    }

    pub fn read_payload(&mut self, payload: &[u8]) -> Result<()> {
        self.decoder.read_payload(payload)
    }

    pub fn recode(&mut self) -> Packet {
        self.recoder.recode(&self.decoder)
    }

    pub fn write_recoded_payload(&mut self, out: &mut [u8]) -> Result<usize> {
        self.recoder.write_payload(&self.decoder, out)
    }

    /// Feedback from the next hop.
    pub fn read_feedback(&mut self, feedback: &[u8]) -> Result<()> {
        self.recoder.read_feedback(self.decoder.symbols(), feedback)
    }

    /// Feedback for the previous hop.
    pub fn write_feedback(&self, out: &mut [u8]) -> Result<usize> {
        self.decoder.write_feedback(out)
    }

    pub fn copy_symbols(&self, dest: &mut [u8]) {
        self.decoder.copy_symbols(dest);
    }
}
