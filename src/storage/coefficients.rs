use crate::field::FieldKind;

/// Per-pivot coefficient vectors, one row of `vector_size` bytes per symbol.
#[derive(Debug, Clone)]
pub struct CoefficientStorage {
    data: Vec<u8>,
    symbols: usize,
    vector_size: usize,
    field: FieldKind,
}

impl CoefficientStorage {
    pub fn new(field: FieldKind, max_symbols: usize) -> Self {
        let vector_size = field.elements_to_size(max_symbols);
        CoefficientStorage {
            data: vec![0; max_symbols * vector_size],
            symbols: max_symbols,
            vector_size,
            field,
        }
    }

    /// Resizes for `symbols` columns and zeroes every row.
    pub fn initialize(&mut self, symbols: usize) {
        self.symbols = symbols;
        self.vector_size = self.field.elements_to_size(symbols);
        let needed = symbols * self.vector_size;
        if self.data.len() < needed {
            self.data.resize(needed, 0);
        }
        self.data[..needed].fill(0);
    }

    pub fn symbols(&self) -> usize {
        self.symbols
    }

    /// Length of one coefficient vector in bytes.
    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub fn field(&self) -> FieldKind {
        self.field
    }

    pub fn vector(&self, index: usize) -> &[u8] {
        assert!(index < self.symbols, "coefficient row {} out of range", index);
        let start = index * self.vector_size;
        &self.data[start..start + self.vector_size]
    }

    pub fn vector_mut(&mut self, index: usize) -> &mut [u8] {
        assert!(index < self.symbols, "coefficient row {} out of range", index);
        let start = index * self.vector_size;
        &mut self.data[start..start + self.vector_size]
    }

    /// Value at column `column` of row `index`.
    pub fn value(&self, index: usize, column: usize) -> u32 {
        self.field.get_value(self.vector(index), column)
    }

    /// Mutable row `dst` together with row `src`; the rows must differ.
    pub fn pair_mut(&mut self, dst: usize, src: usize) -> (&mut [u8], &[u8]) {
        assert!(dst != src, "aliased coefficient rows");
        assert!(dst < self.symbols && src < self.symbols);
        let size = self.vector_size;
        if dst < src {
            let (head, tail) = self.data.split_at_mut(src * size);
            (&mut head[dst * size..(dst + 1) * size], &tail[..size])
        } else {
            let (head, tail) = self.data.split_at_mut(dst * size);
            (&mut tail[..size], &head[src * size..(src + 1) * size])
        }
    }

    /// Writes the unit vector for column `index` into row `index`.
    pub fn set_unit(&mut self, index: usize) {
        let field = self.field;
        let row = self.vector_mut(index);
        row.fill(0);
        field.set_value(row, index, 1);
    }

    /// True if row `index` is the unit vector at its own column.
    pub fn is_unit(&self, index: usize) -> bool {
        let row = self.vector(index);
        (0..self.symbols).all(|column| {
            let value = self.field.get_value(row, column);
            if column == index {
                value == 1
            } else {
                value == 0
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_rows_are_bit_packed() {
        let mut coefficients = CoefficientStorage::new(FieldKind::Binary, 12);
        coefficients.initialize(12);
        assert_eq!(coefficients.vector_size(), 2);
        coefficients.set_unit(9);
        assert_eq!(coefficients.vector(9), &[0x00, 0x02]);
        assert!(coefficients.is_unit(9));
        assert!(!coefficients.is_unit(8));
    }

    #[test]
    fn pair_mut_either_order() {
        let mut coefficients = CoefficientStorage::new(FieldKind::Binary8, 4);
        coefficients.initialize(4);
        coefficients.vector_mut(3).copy_from_slice(&[1, 2, 3, 4]);
        let (dst, src) = coefficients.pair_mut(0, 3);
        dst.copy_from_slice(src);
        assert_eq!(coefficients.vector(0), &[1, 2, 3, 4]);
        let (dst, src) = coefficients.pair_mut(3, 1);
        dst.copy_from_slice(src);
        assert_eq!(coefficients.vector(3), &[0, 0, 0, 0]);
    }

    #[test]
    fn initialize_shrinks_rows() {
        let mut coefficients = CoefficientStorage::new(FieldKind::Binary16, 8);
        coefficients.initialize(3);
        assert_eq!(coefficients.vector_size(), 6);
        assert_eq!(coefficients.vector(2).len(), 6);
    }
}
