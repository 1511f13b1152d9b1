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

//! Builds encoders, decoders and recoders that share one configuration.
//!
//! Storage is sized from the configured maxima, so a codec built once can be
//! re-initialized for any smaller geometry set on the factory afterwards.

use log::debug;

use crate::config::CodecConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::field::{self, SharedField};
use crate::generator::{self, CoefficientGenerator};
use crate::packet::{self, PacketCodec};
use crate::recoder::{Recoder, RecodingDecoder};
use crate::storage::SymbolStorage;

#[derive(Debug, Clone)]
pub struct CodecFactory {
    config: CodecConfig,
    field: SharedField,
}

impl CodecFactory {
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        let field = field::build(config.field);
        debug!(
            "codec factory: {} symbols of {} bytes over {}",
            config.symbols, config.symbol_size, config.field
        );
        Ok(CodecFactory { config, field })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn field(&self) -> SharedField {
        self.field.clone()
    }

    pub fn symbols(&self) -> usize {
        self.config.symbols
    }

    pub fn symbol_size(&self) -> usize {
        self.config.symbol_size
    }

    pub fn set_symbols(&mut self, symbols: usize) -> Result<()> {
        self.config.validate_geometry(symbols, self.config.symbol_size)?;
        self.config.symbols = symbols;
        Ok(())
    }

    pub fn set_symbol_size(&mut self, symbol_size: usize) -> Result<()> {
        self.config.validate_geometry(self.config.symbols, symbol_size)?;
        self.config.symbol_size = symbol_size;
        Ok(())
    }

    pub fn vector_size(&self) -> usize {
        self.config.field.elements_to_size(self.config.symbols)
    }

    pub fn packet_codec(&self) -> PacketCodec {
        PacketCodec::new(
            self.config.symbols,
            self.config.symbol_size,
            self.vector_size(),
            self.config.symbol_id,
            self.config.rank_header,
        )
    }

    pub fn payload_size(&self) -> usize {
        self.packet_codec().payload_size()
    }

    pub fn feedback_size(&self) -> usize {
        packet::feedback_size(self.config.symbols)
    }

    /// Generator for the current geometry, seeded with the configured seed.
    pub fn build_generator(&self) -> Result<Box<dyn CoefficientGenerator>> {
        let mut generator =
            generator::build(&self.config.generator, self.field(), self.config.symbols)?;
        generator.seed(self.config.seed);
        Ok(generator)
    }

    fn deep_storage(&self) -> Result<SymbolStorage<'static>> {
        SymbolStorage::owned(self.config.max_symbols, self.config.max_symbol_size)
    }

    /// Encoder that copies source symbols into its own storage.
    pub fn build_encoder(&self) -> Result<Encoder<'static>> {
        Encoder::new(self, self.deep_storage()?)
    }

    /// Encoder that reads source symbols from caller buffers.
    pub fn build_shallow_encoder<'a>(&self) -> Result<Encoder<'a>> {
        Encoder::new(self, SymbolStorage::borrowed())
    }

    pub fn build_decoder(&self) -> Result<Decoder<'static>> {
        Decoder::new(self, self.deep_storage()?)
    }

    /// Decoder that decodes in place into caller buffers.
    pub fn build_shallow_decoder<'a>(&self) -> Result<Decoder<'a>> {
        Decoder::new(self, SymbolStorage::borrowed())
    }

    pub fn build_recoder(&self) -> Result<Recoder> {
        Recoder::new(self)
    }

    /// Fails for seed identifiers, which cannot describe recoded symbols.
    pub fn build_recoding_decoder(&self) -> Result<RecodingDecoder<'static>> {
        let recoder = Recoder::new(self)?;
        Ok(RecodingDecoder::new(self.build_decoder()?, recoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::field::FieldKind;
    use crate::packet::SymbolIdKind;

    fn config() -> CodecConfig {
        CodecConfig {
            max_symbols: 8,
            max_symbol_size: 32,
            symbols: 8,
            symbol_size: 32,
            ..Default::default()
        }
    }

    #[test]
    fn geometry_is_bounded_by_maxima() {
        let mut factory = CodecFactory::new(config()).unwrap();
        assert!(factory.set_symbols(9).is_err());
        assert!(factory.set_symbol_size(33).is_err());
        factory.set_symbols(3).unwrap();
        factory.set_symbol_size(10).unwrap();
        assert_eq!(factory.vector_size(), 3);
        assert_eq!(factory.payload_size(), 10 + 1 + 4);
        assert_eq!(factory.feedback_size(), 1 + 4);
    }

    #[test]
    fn prime_field_sizes_are_word_aligned() {
        let mut factory = CodecFactory::new(CodecConfig {
            field: FieldKind::Prime2325,
            ..config()
        })
        .unwrap();
        assert!(matches!(
            factory.set_symbol_size(6),
            Err(CodecError::SymbolSizeAlignment { size: 6, granularity: 4 })
        ));
        factory.set_symbols(5).unwrap();
        assert_eq!(factory.vector_size(), 20);
    }

    #[test]
    fn recoding_decoder_rejects_seed_ids() {
        let factory = CodecFactory::new(CodecConfig {
            symbol_id: SymbolIdKind::Seed,
            ..config()
        })
        .unwrap();
        assert!(factory.build_decoder().is_ok());
        assert!(matches!(
            factory.build_recoding_decoder(),
            Err(CodecError::InvalidConfig(_))
        ));
    }

    #[test]
    fn codecs_follow_factory_geometry() {
        let mut factory = CodecFactory::new(config()).unwrap();
        let mut encoder = factory.build_encoder().unwrap();
        let mut decoder = factory.build_decoder().unwrap();
        factory.set_symbols(4).unwrap();
        factory.set_symbol_size(16).unwrap();
        encoder.initialize(&factory).unwrap();
        decoder.initialize(&factory).unwrap();
        assert_eq!(encoder.block_size(), 64);
        assert_eq!(decoder.symbols(), 4);
        assert_eq!(decoder.vector_size(), 4);
    }
}
