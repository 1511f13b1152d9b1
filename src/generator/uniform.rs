use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use super::{clear_vector, CoefficientGenerator, PivotInfo};
use crate::field::SharedField;

/// Independent uniform field value per column.
pub struct UniformGenerator {
    field: SharedField,
    symbols: usize,
    rng: StdRng,
}

impl UniformGenerator {
    pub fn new(field: SharedField) -> Self {
        UniformGenerator {
            field,
            symbols: 0,
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl fmt::Debug for UniformGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformGenerator")
            .field("field", &self.field.kind())
            .field("symbols", &self.symbols)
            .finish()
    }
}

impl CoefficientGenerator for UniformGenerator {
    fn initialize(&mut self, symbols: usize) {
        self.symbols = symbols;
    }

    fn symbols(&self) -> usize {
        self.symbols
    }

    fn generate(&mut self, coefficients: &mut [u8]) {
        let kind = self.field.kind();
        clear_vector(kind, coefficients, self.symbols);
        let max = kind.max_value();
        for i in 0..self.symbols {
            let value = self.rng.gen_range(0..=max);
            kind.set_value(coefficients, i, value);
        }
    }

    fn generate_partial(&mut self, coefficients: &mut [u8], pivots: &dyn PivotInfo) {
        let kind = self.field.kind();
        clear_vector(kind, coefficients, self.symbols);
        let max = kind.max_value();
        for i in 0..self.symbols {
            if !pivots.is_symbol_pivot(i) {
                continue;
            }
            let value = self.rng.gen_range(0..=max);
            kind.set_value(coefficients, i, value);
        }
    }

    fn seed(&mut self, seed: u32) {
        self.rng = StdRng::seed_from_u64(seed as u64);
    }
}
