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

use serde::Deserialize;
use std::path::Path;

use crate::decoder::Direction;
use crate::error::{CodecError, Result};
use crate::field::FieldKind;
use crate::generator::{GeneratorKind, ReedSolomonGenerator};
use crate::packet::SymbolIdKind;

const DEFAULT_MAX_SYMBOLS: usize = 16;
const DEFAULT_MAX_SYMBOL_SIZE: usize = 1400;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub kind: GeneratorKind,
    /// Sparse generators only.
    pub density: Option<f64>,
    /// Perpetual generators only; defaults to a tenth of the block.
    pub width: Option<usize>,
    /// Perpetual generators only.
    pub pre_charge: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            kind: GeneratorKind::Uniform,
            density: None,
            width: None,
            pre_charge: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    pub direction: Direction,
    /// Postpone backward substitution until the block is complete.
    pub delayed: bool,
}

impl DecoderConfig {
    /// Decoder settings suited to `kind`: banded elimination for perpetual
    /// codes, forward elimination otherwise.
    pub fn for_generator(kind: GeneratorKind) -> Self {
        let direction = match kind {
            GeneratorKind::Perpetual => Direction::Banded,
            _ => Direction::Forward,
        };
        DecoderConfig {
            direction,
            delayed: false,
        }
    }
}

/// Codec parameters shared by every coder a factory builds.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    pub field: FieldKind,
    pub max_symbols: usize,
    pub max_symbol_size: usize,
    pub symbols: usize,
    pub symbol_size: usize,
    /// Whether encoders start in the systematic phase.
    pub systematic: bool,
    pub symbol_id: SymbolIdKind,
    /// Append the sender rank to every payload.
    pub rank_header: bool,
    /// Seed applied to generators on every initialize.
    pub seed: u32,
    pub generator: GeneratorConfig,
    pub decoder: DecoderConfig,
}

impl CodecConfig {
    /// Parses the `[codec]` table of a TOML document.
    pub fn from_toml(s: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Root {
            codec: Codec,
        }

        #[derive(Deserialize)]
        struct Codec {
            field: Option<FieldKind>,
            max_symbols: Option<usize>,
            max_symbol_size: Option<usize>,
            symbols: Option<usize>,
            symbol_size: Option<usize>,
            systematic: Option<bool>,
            symbol_id: Option<SymbolIdKind>,
            rank_header: Option<bool>,
            seed: Option<u32>,
            generator: Option<GeneratorSection>,
            decoder: Option<DecoderSection>,
        }

        #[derive(Deserialize)]
        struct GeneratorSection {
            kind: Option<GeneratorKind>,
            density: Option<f64>,
            width: Option<usize>,
            pre_charge: Option<bool>,
        }

        #[derive(Deserialize)]
        struct DecoderSection {
            direction: Option<Direction>,
            delayed: Option<bool>,
        }

        let raw: Root = toml::from_str(s)?;
        let c = raw.codec;
        let defaults = CodecConfig::default();
        let max_symbols = c.max_symbols.unwrap_or(defaults.max_symbols);
        let max_symbol_size = c.max_symbol_size.unwrap_or(defaults.max_symbol_size);
        let generator = match c.generator {
            Some(g) => GeneratorConfig {
                kind: g.kind.unwrap_or_default(),
                density: g.density,
                width: g.width,
                pre_charge: g.pre_charge.unwrap_or(true),
            },
            None => GeneratorConfig::default(),
        };
        let suited = DecoderConfig::for_generator(generator.kind);
        let decoder = match c.decoder {
            Some(d) => DecoderConfig {
                direction: d.direction.unwrap_or(suited.direction),
                delayed: d.delayed.unwrap_or(false),
            },
            None => suited,
        };
        let config = CodecConfig {
            field: c.field.unwrap_or(defaults.field),
            max_symbols,
            max_symbol_size,
            symbols: c.symbols.unwrap_or(max_symbols),
            symbol_size: c.symbol_size.unwrap_or(max_symbol_size),
            systematic: c.systematic.unwrap_or(defaults.systematic),
            symbol_id: c.symbol_id.unwrap_or_default(),
            rank_header: c.rank_header.unwrap_or(false),
            seed: c.seed.unwrap_or(0),
            generator,
            decoder,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_symbols == 0 || self.max_symbol_size == 0 {
            return Err(CodecError::InvalidConfig(
                "maximum symbols and symbol size must be positive".into(),
            ));
        }
        if self.max_symbols > u32::MAX as usize {
            return Err(CodecError::TooManySymbols {
                symbols: self.max_symbols,
                max: u32::MAX as usize,
            });
        }
        self.validate_geometry(self.symbols, self.symbol_size)?;
        let granularity = self.field.granularity();
        if self.max_symbol_size % granularity != 0 {
            return Err(CodecError::SymbolSizeAlignment {
                size: self.max_symbol_size,
                granularity,
            });
        }

        match self.generator.kind {
            GeneratorKind::Perpetual if self.symbol_id == SymbolIdKind::Seed => {
                return Err(CodecError::InvalidConfig(
                    "perpetual generators cannot be used with seed identifiers".into(),
                ));
            }
            GeneratorKind::ReedSolomon if !ReedSolomonGenerator::supports(self.field, self.max_symbols) => {
                return Err(CodecError::InvalidConfig(format!(
                    "{} symbols do not fit a Reed-Solomon code over {}",
                    self.max_symbols, self.field
                )));
            }
            _ => {}
        }
        if let Some(density) = self.generator.density {
            let upper_ok = if self.field.is_binary() { density < 1.0 } else { density <= 1.0 };
            if !(density > 0.0 && upper_ok) {
                return Err(CodecError::InvalidConfig(format!(
                    "density {} is not valid for the {} field",
                    density, self.field
                )));
            }
        }
        Ok(())
    }

    /// Checks a block geometry against the configured maxima and field.
    pub fn validate_geometry(&self, symbols: usize, symbol_size: usize) -> Result<()> {
        if symbols == 0 || symbols > self.max_symbols {
            return Err(CodecError::TooManySymbols {
                symbols,
                max: self.max_symbols,
            });
        }
        if symbol_size == 0 || symbol_size > self.max_symbol_size {
            return Err(CodecError::SymbolSizeTooLarge {
                size: symbol_size,
                max: self.max_symbol_size,
            });
        }
        let granularity = self.field.granularity();
        if symbol_size % granularity != 0 {
            return Err(CodecError::SymbolSizeAlignment {
                size: symbol_size,
                granularity,
            });
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            field: FieldKind::Binary8,
            max_symbols: DEFAULT_MAX_SYMBOLS,
            max_symbol_size: DEFAULT_MAX_SYMBOL_SIZE,
            symbols: DEFAULT_MAX_SYMBOLS,
            symbol_size: DEFAULT_MAX_SYMBOL_SIZE,
            systematic: true,
            symbol_id: SymbolIdKind::Plain,
            rank_header: false,
            seed: 0,
            generator: GeneratorConfig::default(),
            decoder: DecoderConfig::default(),
        }
    }
}
