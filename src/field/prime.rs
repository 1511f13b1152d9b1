use super::{FieldKind, FieldOps};

/// The largest prime below 2^32.
pub const PRIME_2325: u32 = 4_294_967_291;

/// The prime field of order 2^32 - 5.
///
/// Elements are little-endian 32-bit words. Symbol data fed to this field
/// must already consist of words below the prime.
#[derive(Debug, Default, Clone, Copy)]
pub struct Prime2325;

impl Prime2325 {
    fn pow(&self, mut base: u32, mut exponent: u32) -> u32 {
        let mut result = 1u32;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = self.multiply(result, base);
            }
            base = self.multiply(base, base);
            exponent >>= 1;
        }
        result
    }
}

impl FieldOps for Prime2325 {
    fn kind(&self) -> FieldKind {
        FieldKind::Prime2325
    }

    fn add(&self, a: u32, b: u32) -> u32 {
        ((a as u64 + b as u64) % PRIME_2325 as u64) as u32
    }

    fn subtract(&self, a: u32, b: u32) -> u32 {
        let b = b as u64 % PRIME_2325 as u64;
        ((a as u64 + PRIME_2325 as u64 - b) % PRIME_2325 as u64) as u32
    }

    fn multiply(&self, a: u32, b: u32) -> u32 {
        ((a as u64 * b as u64) % PRIME_2325 as u64) as u32
    }

    fn invert(&self, a: u32) -> u32 {
        assert!(a != 0, "inverse of 0 is undefined");
        self.pow(a, PRIME_2325 - 2)
    }
}
