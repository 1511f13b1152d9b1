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

//! # Coefficient Generators
//!
//! A generator fills coefficient vectors according to a policy. Every
//! generator is deterministic given its seed, so a seed can stand in for a
//! whole vector on the wire. `generate_partial` only touches columns the
//! supplied [`PivotInfo`] reports as pivots and leaves every other column
//! zero.

use serde::Deserialize;
use std::fmt;

use crate::config::GeneratorConfig;
use crate::error::{CodecError, Result};
use crate::field::{FieldKind, SharedField};

mod perpetual;
mod pivot_aware;
mod reed_solomon;
mod sparse;
mod uniform;

pub use perpetual::PerpetualGenerator;
pub use pivot_aware::{PivotAwareGenerator, RemoteStatus};
pub use reed_solomon::ReedSolomonGenerator;
pub use sparse::SparseGenerator;
pub use uniform::UniformGenerator;

/// Read-only view of which columns a coder holds.
pub trait PivotInfo {
    fn symbols(&self) -> usize;

    fn rank(&self) -> usize;

    fn is_symbol_pivot(&self, index: usize) -> bool;
}

pub trait CoefficientGenerator: Send + fmt::Debug {
    /// Resizes the generator for blocks of `symbols` symbols.
    fn initialize(&mut self, symbols: usize);

    fn symbols(&self) -> usize;

    /// Fills a full coefficient vector.
    fn generate(&mut self, coefficients: &mut [u8]);

    /// Fills only the columns `pivots` holds; other columns are zero.
    fn generate_partial(&mut self, coefficients: &mut [u8], pivots: &dyn PivotInfo);

    /// Restarts the pseudo-random stream.
    fn seed(&mut self, seed: u32);
}

/// Generator policies selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    #[default]
    Uniform,
    Sparse,
    Perpetual,
    ReedSolomon,
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeneratorKind::Uniform => "uniform",
            GeneratorKind::Sparse => "sparse",
            GeneratorKind::Perpetual => "perpetual",
            GeneratorKind::ReedSolomon => "reed_solomon",
        };
        f.write_str(name)
    }
}

/// Zeroes the first `vector_size(symbols)` bytes of `coefficients`.
pub(crate) fn clear_vector(field: FieldKind, coefficients: &mut [u8], symbols: usize) {
    let size = field.elements_to_size(symbols);
    assert!(
        coefficients.len() >= size,
        "coefficient buffer of {} bytes, need {}",
        coefficients.len(),
        size
    );
    coefficients[..size].fill(0);
}

/// Pivot view over a plain boolean slice.
#[derive(Debug, Clone)]
pub struct PivotMask {
    pivots: Vec<bool>,
}

impl PivotMask {
    pub fn new(pivots: Vec<bool>) -> Self {
        PivotMask { pivots }
    }

    pub fn from_fn(symbols: usize, f: impl Fn(usize) -> bool) -> Self {
        PivotMask { pivots: (0..symbols).map(f).collect() }
    }
}

impl PivotInfo for PivotMask {
    fn symbols(&self) -> usize {
        self.pivots.len()
    }

    fn rank(&self) -> usize {
        self.pivots.iter().filter(|p| **p).count()
    }

    fn is_symbol_pivot(&self, index: usize) -> bool {
        self.pivots[index]
    }
}

/// Builds and configures the generator described by `config`, sized for
/// `symbols` symbols.
pub fn build(
    config: &GeneratorConfig,
    field: SharedField,
    symbols: usize,
) -> Result<Box<dyn CoefficientGenerator>> {
    let generator: Box<dyn CoefficientGenerator> = match config.kind {
        GeneratorKind::Uniform => {
            let mut generator = UniformGenerator::new(field);
            generator.initialize(symbols);
            Box::new(generator)
        }
        GeneratorKind::Sparse => {
            let mut generator = SparseGenerator::new(field);
            generator.initialize(symbols);
            if let Some(density) = config.density {
                generator.set_density(density)?;
            }
            Box::new(generator)
        }
        GeneratorKind::Perpetual => {
            let mut generator = PerpetualGenerator::new(field);
            generator.set_pre_charging(config.pre_charge);
            generator.initialize(symbols);
            if let Some(width) = config.width {
                generator.set_width(width)?;
            }
            Box::new(generator)
        }
        GeneratorKind::ReedSolomon => {
            if !ReedSolomonGenerator::supports(field.kind(), symbols) {
                return Err(CodecError::InvalidConfig(format!(
                    "{} symbols do not fit a Reed-Solomon code over {}",
                    symbols,
                    field.kind()
                )));
            }
            let mut generator = ReedSolomonGenerator::new(field);
            generator.initialize(symbols);
            Box::new(generator)
        }
    };
    Ok(generator)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::field;

    /// Nonzero columns of a generated vector.
    pub(crate) fn nonzero_columns(kind: FieldKind, coefficients: &[u8], symbols: usize) -> Vec<usize> {
        (0..symbols)
            .filter(|i| kind.get_value(coefficients, *i) != 0)
            .collect()
    }

    #[test]
    fn same_seed_same_vector_for_every_policy() {
        for kind in [
            GeneratorKind::Uniform,
            GeneratorKind::Sparse,
            GeneratorKind::Perpetual,
            GeneratorKind::ReedSolomon,
        ] {
            let f = field::build(FieldKind::Binary8);
            let config = GeneratorConfig { kind, ..Default::default() };
            let mut a = build(&config, f.clone(), 10).unwrap();
            let mut b = build(&config, f, 10).unwrap();
            let mut va = [0u8; 10];
            let mut vb = [0u8; 10];
            a.seed(42);
            b.seed(42);
            a.generate(&mut va);
            b.generate(&mut vb);
            assert_eq!(va, vb, "{kind}");
        }
    }

    #[test]
    fn build_applies_policy_parameters() {
        let f = field::build(FieldKind::Binary8);
        let config = GeneratorConfig {
            kind: GeneratorKind::Perpetual,
            width: Some(12),
            ..Default::default()
        };
        assert!(build(&config, f.clone(), 12).is_err());
        let config = GeneratorConfig {
            kind: GeneratorKind::ReedSolomon,
            ..Default::default()
        };
        let f4 = field::build(FieldKind::Binary4);
        assert!(build(&config, f4.clone(), 15).is_err());
        assert!(build(&config, f4, 14).is_ok());
        assert!(build(&config, f, 0).is_err());
    }

    #[test]
    fn partial_generation_respects_mask() {
        let f = field::build(FieldKind::Binary8);
        let mask = PivotMask::from_fn(12, |i| i % 3 == 0);
        for kind in [GeneratorKind::Uniform, GeneratorKind::Sparse, GeneratorKind::Perpetual] {
            let config = GeneratorConfig { kind, ..Default::default() };
            let mut generator = build(&config, f.clone(), 12).unwrap();
            let mut v = [0xffu8; 12];
            for seed in 0..20 {
                generator.seed(seed);
                generator.generate_partial(&mut v, &mask);
                for column in nonzero_columns(FieldKind::Binary8, &v, 12) {
                    assert!(mask.is_symbol_pivot(column), "{kind} column {column}");
                }
            }
        }
    }
}
