use lazy_static::lazy_static;

/// Primitive polynomial for GF(2^4): x^4 + x + 1.
pub(crate) const GF4_POLY: u32 = 0x13;
/// Primitive polynomial for GF(2^8): x^8 + x^4 + x^3 + x^2 + 1.
pub(crate) const GF8_POLY: u32 = 0x11d;
/// Primitive polynomial for GF(2^16): x^16 + x^12 + x^3 + x + 1.
pub(crate) const GF16_POLY: u32 = 0x1100b;

lazy_static! {
    pub(crate) static ref GF4_TABLES: LogTables = LogTables::new(4, GF4_POLY);
    pub(crate) static ref GF8_TABLES: LogTables = LogTables::new(8, GF8_POLY);
    pub(crate) static ref GF16_TABLES: LogTables = LogTables::new(16, GF16_POLY);
    /// `GF8_PRODUCTS[c][v] = c * v` for every pair of GF(2^8) elements.
    pub(crate) static ref GF8_PRODUCTS: Vec<[u8; 256]> =
        (0..256).map(|c| GF8_TABLES.byte_row(c)).collect();
    /// Products of each GF(2^4) constant with both nibbles of every byte.
    pub(crate) static ref GF4_PRODUCTS: Vec<[u8; 256]> =
        (0..16).map(|c| GF4_TABLES.nibble_row(c)).collect();
}

/// Log/antilog tables for a binary extension field GF(2^degree).
///
/// The exponent table is doubled so that `exp[log a + log b]` never needs a
/// modular reduction.
#[derive(Debug)]
pub(crate) struct LogTables {
    log: Vec<u32>,
    exp: Vec<u32>,
    max: u32,
}

impl LogTables {
    pub(crate) fn new(degree: u32, polynomial: u32) -> Self {
        let order = 1u32 << degree;
        let max = order - 1;
        let mut log = vec![0u32; order as usize];
        let mut exp = vec![0u32; 2 * max as usize];
        let mut x: u32 = 1;
        for i in 0..max {
            exp[i as usize] = x;
            exp[(i + max) as usize] = x;
            log[x as usize] = i;
            x <<= 1;
            if x & order != 0 {
                x ^= polynomial;
            }
        }
        LogTables { log, exp, max }
    }

    #[inline(always)]
    pub(crate) fn multiply(&self, a: u32, b: u32) -> u32 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.exp[(self.log[a as usize] + self.log[b as usize]) as usize]
    }

    #[inline(always)]
    pub(crate) fn invert(&self, a: u32) -> u32 {
        assert!(a != 0, "inverse of 0 is undefined");
        self.exp[(self.max - self.log[a as usize]) as usize]
    }

    /// Products `constant * v` for every byte value `v` of GF(2^8).
    fn byte_row(&self, constant: u32) -> [u8; 256] {
        let mut row = [0u8; 256];
        for (v, out) in row.iter_mut().enumerate() {
            *out = self.multiply(constant, v as u32) as u8;
        }
        row
    }

    /// Products of `constant` with both nibbles of every byte value, for
    /// GF(2^4) elements packed two per byte.
    fn nibble_row(&self, constant: u32) -> [u8; 256] {
        let mut row = [0u8; 256];
        for (v, out) in row.iter_mut().enumerate() {
            let low = self.multiply(constant, (v & 0x0f) as u32);
            let high = self.multiply(constant, (v >> 4) as u32);
            *out = (low | (high << 4)) as u8;
        }
        row
    }
}
