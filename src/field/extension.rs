use super::tables::{LogTables, GF16_TABLES, GF4_PRODUCTS, GF4_TABLES, GF8_PRODUCTS, GF8_TABLES};
use super::{xor_region, FieldKind, FieldOps};

/// GF(2^4), two elements per byte.
#[derive(Debug, Clone, Copy)]
pub struct Binary4 {
    tables: &'static LogTables,
    products: &'static [[u8; 256]],
}

/// GF(2^8), one element per byte.
#[derive(Debug, Clone, Copy)]
pub struct Binary8 {
    tables: &'static LogTables,
    products: &'static [[u8; 256]],
}

/// GF(2^16), little-endian two-byte elements.
#[derive(Debug, Clone, Copy)]
pub struct Binary16 {
    tables: &'static LogTables,
}

impl Binary4 {
    pub fn new() -> Self {
        Binary4 {
            tables: &GF4_TABLES,
            products: &GF4_PRODUCTS[..],
        }
    }
}

impl Binary8 {
    pub fn new() -> Self {
        Binary8 {
            tables: &GF8_TABLES,
            products: &GF8_PRODUCTS[..],
        }
    }
}

impl Binary16 {
    pub fn new() -> Self {
        Binary16 { tables: &GF16_TABLES }
    }
}

impl Default for Binary4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Binary8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Binary16 {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a byte-wise product table to `dest`, optionally accumulating into it.
#[inline(always)]
fn apply_row(dest: &mut [u8], src: Option<&[u8]>, row: &[u8; 256], bytes: usize) {
    match src {
        Some(src) => {
            for (d, s) in dest[..bytes].iter_mut().zip(&src[..bytes]) {
                *d ^= row[*s as usize];
            }
        }
        None => {
            for d in dest[..bytes].iter_mut() {
                *d = row[*d as usize];
            }
        }
    }
}

macro_rules! characteristic_two_values {
    () => {
        fn add(&self, a: u32, b: u32) -> u32 {
            a ^ b
        }

        fn subtract(&self, a: u32, b: u32) -> u32 {
            a ^ b
        }

        fn multiply(&self, a: u32, b: u32) -> u32 {
            self.tables.multiply(a, b)
        }

        fn invert(&self, a: u32) -> u32 {
            self.tables.invert(a)
        }

        fn region_add(&self, dest: &mut [u8], src: &[u8], length: usize) {
            xor_region(dest, src, self.kind().elements_to_size(length));
        }

        fn region_subtract(&self, dest: &mut [u8], src: &[u8], length: usize) {
            xor_region(dest, src, self.kind().elements_to_size(length));
        }

        fn region_multiply_subtract(
            &self,
            dest: &mut [u8],
            src: &[u8],
            constant: u32,
            length: usize,
        ) {
            self.region_multiply_add(dest, src, constant, length);
        }
    };
}

impl FieldOps for Binary4 {
    fn kind(&self) -> FieldKind {
        FieldKind::Binary4
    }

    characteristic_two_values!();

    fn region_multiply_constant(&self, dest: &mut [u8], constant: u32, length: usize) {
        let row = &self.products[constant as usize];
        apply_row(dest, None, row, FieldKind::Binary4.elements_to_size(length));
    }

    fn region_multiply_add(&self, dest: &mut [u8], src: &[u8], constant: u32, length: usize) {
        match constant {
            0 => {}
            1 => self.region_add(dest, src, length),
            c => {
                let row = &self.products[c as usize];
                apply_row(dest, Some(src), row, FieldKind::Binary4.elements_to_size(length));
            }
        }
    }
}

impl FieldOps for Binary8 {
    fn kind(&self) -> FieldKind {
        FieldKind::Binary8
    }

    characteristic_two_values!();

    fn region_multiply_constant(&self, dest: &mut [u8], constant: u32, length: usize) {
        apply_row(dest, None, &self.products[constant as usize], length);
    }

    fn region_multiply_add(&self, dest: &mut [u8], src: &[u8], constant: u32, length: usize) {
        match constant {
            0 => {}
            1 => self.region_add(dest, src, length),
            c => {
                apply_row(dest, Some(src), &self.products[c as usize], length);
            }
        }
    }
}

impl FieldOps for Binary16 {
    fn kind(&self) -> FieldKind {
        FieldKind::Binary16
    }

    characteristic_two_values!();

    fn region_multiply_add(&self, dest: &mut [u8], src: &[u8], constant: u32, length: usize) {
        match constant {
            0 => {}
            1 => self.region_add(dest, src, length),
            c => {
                for (d, s) in dest[..2 * length]
                    .chunks_exact_mut(2)
                    .zip(src[..2 * length].chunks_exact(2))
                {
                    let product = self
                        .tables
                        .multiply(c, u16::from_le_bytes([s[0], s[1]]) as u32)
                        as u16;
                    let value = u16::from_le_bytes([d[0], d[1]]) ^ product;
                    d.copy_from_slice(&value.to_le_bytes());
                }
            }
        }
    }
}
