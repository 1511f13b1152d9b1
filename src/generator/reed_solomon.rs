use std::fmt;

use super::{clear_vector, CoefficientGenerator, PivotInfo};
use crate::field::{FieldKind, SharedField};

/// Primitive element of every binary extension field built from a
/// primitive polynomial.
const GENERATOR_ELEMENT: u32 = 2;

/// Repair rows of a systematic Vandermonde code.
///
/// The full generator matrix has `order - 1` codewords: the first `N` are
/// the source symbols themselves, the rest are repair codewords whose
/// coefficients are the Vandermonde columns multiplied by the inverse of the
/// leading `N x N` block. Any `N` codewords are linearly independent.
pub struct ReedSolomonGenerator {
    field: SharedField,
    symbols: usize,
    /// Inverse of the leading Vandermonde block, row major.
    inverse: Vec<u32>,
    row: usize,
}

impl ReedSolomonGenerator {
    pub fn new(field: SharedField) -> Self {
        ReedSolomonGenerator {
            field,
            symbols: 0,
            inverse: Vec::new(),
            row: 0,
        }
    }

    /// Whether a block of `symbols` symbols fits the code over `field`.
    pub fn supports(field: FieldKind, symbols: usize) -> bool {
        matches!(
            field,
            FieldKind::Binary4 | FieldKind::Binary8 | FieldKind::Binary16
        ) && symbols > 0
            && (symbols as u64) < field.max_value() as u64
    }

    /// Number of distinct repair codewords.
    pub fn repair_rows(&self) -> usize {
        self.field.kind().max_value() as usize - self.symbols
    }

    /// Index of the repair codeword the next `generate` call produces.
    pub fn row(&self) -> usize {
        self.row
    }

    fn pow(&self, base: u32, mut exponent: usize) -> u32 {
        let mut result = 1;
        let mut base = base;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = self.field.multiply(result, base);
            }
            base = self.field.multiply(base, base);
            exponent >>= 1;
        }
        result
    }

    fn invert_leading_block(&mut self) {
        let n = self.symbols;
        let field = &self.field;
        let mut a: Vec<u32> = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                a.push(self.pow(GENERATOR_ELEMENT, i * j));
            }
        }
        let mut inv = vec![0u32; n * n];
        for i in 0..n {
            inv[i * n + i] = 1;
        }
        // Leading minors of a Vandermonde matrix with distinct nodes are
        // nonzero, so the diagonal never needs a row swap.
        for i in 0..n {
            let scale = field.invert(a[i * n + i]);
            for k in 0..n {
                a[i * n + k] = field.multiply(a[i * n + k], scale);
                inv[i * n + k] = field.multiply(inv[i * n + k], scale);
            }
            for j in 0..n {
                if j == i {
                    continue;
                }
                let factor = a[j * n + i];
                if factor == 0 {
                    continue;
                }
                for k in 0..n {
                    let sa = field.multiply(factor, a[i * n + k]);
                    a[j * n + k] = field.subtract(a[j * n + k], sa);
                    let si = field.multiply(factor, inv[i * n + k]);
                    inv[j * n + k] = field.subtract(inv[j * n + k], si);
                }
            }
        }
        self.inverse = inv;
    }

    fn write_row(&self, coefficients: &mut [u8], row: usize, pivots: Option<&dyn PivotInfo>) {
        let n = self.symbols;
        let kind = self.field.kind();
        clear_vector(kind, coefficients, n);
        let node = self.pow(GENERATOR_ELEMENT, n + row);
        let column: Vec<u32> = (0..n).map(|k| self.pow(node, k)).collect();
        for i in 0..n {
            if let Some(pivots) = pivots {
                if !pivots.is_symbol_pivot(i) {
                    continue;
                }
            }
            let value = (0..n).fold(0, |acc, k| {
                self.field
                    .add(acc, self.field.multiply(self.inverse[i * n + k], column[k]))
            });
            kind.set_value(coefficients, i, value);
        }
    }
}

impl fmt::Debug for ReedSolomonGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReedSolomonGenerator")
            .field("field", &self.field.kind())
            .field("symbols", &self.symbols)
            .field("row", &self.row)
            .finish()
    }
}

impl CoefficientGenerator for ReedSolomonGenerator {
    fn initialize(&mut self, symbols: usize) {
        assert!(
            Self::supports(self.field.kind(), symbols),
            "{} symbols do not fit a Reed-Solomon code over {}",
            symbols,
            self.field.kind()
        );
        if symbols != self.symbols || self.inverse.is_empty() {
            self.symbols = symbols;
            self.invert_leading_block();
        }
        self.row = 0;
    }

    fn symbols(&self) -> usize {
        self.symbols
    }

    fn generate(&mut self, coefficients: &mut [u8]) {
        self.write_row(coefficients, self.row, None);
        self.row = (self.row + 1) % self.repair_rows();
    }

    fn generate_partial(&mut self, coefficients: &mut [u8], pivots: &dyn PivotInfo) {
        self.write_row(coefficients, self.row, Some(pivots));
        self.row = (self.row + 1) % self.repair_rows();
    }

    /// Selects repair codeword `seed mod repair_rows`.
    fn seed(&mut self, seed: u32) {
        self.row = seed as usize % self.repair_rows();
    }
}
