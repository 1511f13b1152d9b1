use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use super::{clear_vector, CoefficientGenerator, PivotInfo};
use crate::error::{CodecError, Result};
use crate::field::SharedField;

pub const DEFAULT_DENSITY: f64 = 0.5;

/// Bernoulli-gated columns; a column that passes the gate gets a uniform
/// nonzero value, always 1 in the binary field.
pub struct SparseGenerator {
    field: SharedField,
    symbols: usize,
    density: f64,
    gate: Bernoulli,
    rng: StdRng,
}

impl SparseGenerator {
    pub fn new(field: SharedField) -> Self {
        SparseGenerator {
            field,
            symbols: 0,
            density: DEFAULT_DENSITY,
            gate: Bernoulli::new(DEFAULT_DENSITY).expect("default density is a probability"),
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Probability that a column is nonzero. Must lie in `(0, 1]`, and
    /// strictly below 1 for the binary field.
    pub fn set_density(&mut self, density: f64) -> Result<()> {
        if !(density > 0.0 && density <= 1.0) {
            return Err(CodecError::InvalidConfig(format!(
                "density {} outside (0, 1]",
                density
            )));
        }
        if self.field.kind().is_binary() && density >= 1.0 {
            return Err(CodecError::InvalidConfig(
                "binary field requires a density below 1".into(),
            ));
        }
        self.gate = Bernoulli::new(density)
            .map_err(|e| CodecError::InvalidConfig(format!("density {}: {}", density, e)))?;
        self.density = density;
        Ok(())
    }

    /// Sets the density so that `symbols` columns are nonzero on average.
    pub fn set_average_nonzero_symbols(&mut self, symbols: f64) -> Result<()> {
        if self.symbols == 0 {
            return Err(CodecError::InvalidConfig(
                "generator has no symbols".into(),
            ));
        }
        self.set_density(symbols / self.symbols as f64)
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    fn draw(&mut self) -> u32 {
        if !self.gate.sample(&mut self.rng) {
            return 0;
        }
        let kind = self.field.kind();
        if kind.is_binary() {
            1
        } else {
            self.rng.gen_range(1..=kind.max_value())
        }
    }
}

impl fmt::Debug for SparseGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseGenerator")
            .field("field", &self.field.kind())
            .field("symbols", &self.symbols)
            .field("density", &self.density)
            .finish()
    }
}

impl CoefficientGenerator for SparseGenerator {
    fn initialize(&mut self, symbols: usize) {
        self.symbols = symbols;
    }

    fn symbols(&self) -> usize {
        self.symbols
    }

    fn generate(&mut self, coefficients: &mut [u8]) {
        let kind = self.field.kind();
        clear_vector(kind, coefficients, self.symbols);
        for i in 0..self.symbols {
            let value = self.draw();
            if value != 0 {
                kind.set_value(coefficients, i, value);
            }
        }
    }

    fn generate_partial(&mut self, coefficients: &mut [u8], pivots: &dyn PivotInfo) {
        let kind = self.field.kind();
        clear_vector(kind, coefficients, self.symbols);
        for i in 0..self.symbols {
            if !pivots.is_symbol_pivot(i) {
                continue;
            }
            let value = self.draw();
            if value != 0 {
                kind.set_value(coefficients, i, value);
            }
        }
    }

    fn seed(&mut self, seed: u32) {
        self.rng = StdRng::seed_from_u64(seed as u64);
    }
}
