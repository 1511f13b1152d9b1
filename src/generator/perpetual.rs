use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use super::{clear_vector, CoefficientGenerator, PivotInfo};
use crate::error::{CodecError, Result};
use crate::field::SharedField;

/// Banded generator: one pivot column set to 1 followed by `width` nonzero
/// values wrapping around the block.
///
/// While pre-charging, the first `N` vectors walk the pivot through every
/// column in order, so an encoder starts by covering the whole block.
pub struct PerpetualGenerator {
    field: SharedField,
    symbols: usize,
    width: usize,
    requested_width: Option<usize>,
    pre_charging: bool,
    generated: usize,
    rng: StdRng,
}

impl PerpetualGenerator {
    pub fn new(field: SharedField) -> Self {
        PerpetualGenerator {
            field,
            symbols: 0,
            width: 0,
            requested_width: None,
            pre_charging: true,
            generated: 0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Band width used when none is configured: a tenth of the block.
    pub fn default_width(symbols: usize) -> usize {
        (symbols / 10).max(1).min(symbols.saturating_sub(1))
    }

    pub fn set_width(&mut self, width: usize) -> Result<()> {
        if self.symbols > 0 && width >= self.symbols {
            return Err(CodecError::InvalidConfig(format!(
                "perpetual width {} must be below the {} symbols",
                width, self.symbols
            )));
        }
        self.requested_width = Some(width);
        self.width = width;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn set_pre_charging(&mut self, pre_charging: bool) {
        self.pre_charging = pre_charging;
    }

    pub fn pre_charging(&self) -> bool {
        self.pre_charging
    }

    fn nonzero_value(&mut self) -> u32 {
        let max = self.field.kind().max_value();
        if max == 1 {
            1
        } else {
            self.rng.gen_range(1..=max)
        }
    }

    fn next_pivot(&mut self) -> usize {
        let pivot = if self.pre_charging && self.generated < self.symbols {
            self.generated
        } else {
            self.rng.gen_range(0..self.symbols)
        };
        self.generated += 1;
        pivot
    }
}

impl fmt::Debug for PerpetualGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerpetualGenerator")
            .field("field", &self.field.kind())
            .field("symbols", &self.symbols)
            .field("width", &self.width)
            .field("pre_charging", &self.pre_charging)
            .finish()
    }
}

impl CoefficientGenerator for PerpetualGenerator {
    fn initialize(&mut self, symbols: usize) {
        self.symbols = symbols;
        self.generated = 0;
        self.width = match self.requested_width {
            Some(width) => width.min(symbols.saturating_sub(1)),
            None => Self::default_width(symbols),
        };
    }

    fn symbols(&self) -> usize {
        self.symbols
    }

    fn generate(&mut self, coefficients: &mut [u8]) {
        let kind = self.field.kind();
        clear_vector(kind, coefficients, self.symbols);
        if self.symbols == 0 {
            return;
        }
        let pivot = self.next_pivot();
        kind.set_value(coefficients, pivot, 1);
        for offset in 1..=self.width {
            let column = (pivot + offset) % self.symbols;
            let value = self.nonzero_value();
            kind.set_value(coefficients, column, value);
        }
    }

    fn generate_partial(&mut self, coefficients: &mut [u8], pivots: &dyn PivotInfo) {
        let kind = self.field.kind();
        clear_vector(kind, coefficients, self.symbols);
        let candidates: Vec<usize> = (0..self.symbols)
            .filter(|i| pivots.is_symbol_pivot(*i))
            .collect();
        if candidates.is_empty() {
            return;
        }
        let pivot = candidates[self.rng.gen_range(0..candidates.len())];
        kind.set_value(coefficients, pivot, 1);
        for offset in 1..=self.width {
            let column = (pivot + offset) % self.symbols;
            if !pivots.is_symbol_pivot(column) {
                continue;
            }
            let value = self.nonzero_value();
            kind.set_value(coefficients, column, value);
        }
    }

    fn seed(&mut self, seed: u32) {
        self.rng = StdRng::seed_from_u64(seed as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{self, FieldKind};
    use crate::generator::tests::nonzero_columns;

    #[test]
    fn default_width_is_a_tenth() {
        assert_eq!(PerpetualGenerator::default_width(1), 0);
        assert_eq!(PerpetualGenerator::default_width(5), 1);
        assert_eq!(PerpetualGenerator::default_width(100), 10);
    }

    #[test]
    fn pre_charging_walks_every_pivot_then_bands() {
        let mut generator = PerpetualGenerator::new(field::build(FieldKind::Binary8));
        generator.initialize(20);
        assert_eq!(generator.width(), 2);
        let mut v = [0u8; 20];
        for pivot in 0..20 {
            generator.generate(&mut v);
            assert_eq!(v[pivot], 1);
            let band = [(pivot + 1) % 20, (pivot + 2) % 20];
            let mut expected = vec![pivot, band[0], band[1]];
            expected.sort_unstable();
            assert_eq!(nonzero_columns(FieldKind::Binary8, &v, 20), expected);
        }
        // after pre-charging the pivot is random but the band shape holds
        generator.generate(&mut v);
        assert_eq!(nonzero_columns(FieldKind::Binary8, &v, 20).len(), 3);
    }

    #[test]
    fn set_width_is_bounded_by_block() {
        let mut generator = PerpetualGenerator::new(field::build(FieldKind::Binary));
        generator.initialize(8);
        assert!(generator.set_width(8).is_err());
        generator.set_width(7).unwrap();
        let mut v = [0u8; 1];
        generator.generate(&mut v);
        assert_eq!(v[0], 0xff);
    }
}
