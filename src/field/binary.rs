use super::{xor_region, FieldKind, FieldOps};

/// GF(2). Multiplication is AND, so region multiply-add degenerates to a
/// conditional XOR.
#[derive(Debug, Default, Clone, Copy)]
pub struct Binary;

impl FieldOps for Binary {
    fn kind(&self) -> FieldKind {
        FieldKind::Binary
    }

    fn add(&self, a: u32, b: u32) -> u32 {
        a ^ b
    }

    fn subtract(&self, a: u32, b: u32) -> u32 {
        a ^ b
    }

    fn multiply(&self, a: u32, b: u32) -> u32 {
        a & b
    }

    fn invert(&self, a: u32) -> u32 {
        assert!(a == 1, "inverse of 0 is undefined");
        1
    }

    fn region_add(&self, dest: &mut [u8], src: &[u8], length: usize) {
        xor_region(dest, src, FieldKind::Binary.elements_to_size(length));
    }

    fn region_subtract(&self, dest: &mut [u8], src: &[u8], length: usize) {
        xor_region(dest, src, FieldKind::Binary.elements_to_size(length));
    }

    fn region_multiply_constant(&self, dest: &mut [u8], constant: u32, length: usize) {
        if constant == 0 {
            dest[..FieldKind::Binary.elements_to_size(length)].fill(0);
        }
    }

    fn region_multiply_add(&self, dest: &mut [u8], src: &[u8], constant: u32, length: usize) {
        if constant != 0 {
            self.region_add(dest, src, length);
        }
    }

    fn region_multiply_subtract(&self, dest: &mut [u8], src: &[u8], constant: u32, length: usize) {
        if constant != 0 {
            self.region_add(dest, src, length);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_add_is_conditional_xor() {
        let mut dest = [0b1010_1010u8, 0xff];
        let src = [0b0110_0110u8, 0x0f];
        Binary.region_multiply_add(&mut dest, &src, 0, 16);
        assert_eq!(dest, [0b1010_1010, 0xff]);
        Binary.region_multiply_add(&mut dest, &src, 1, 16);
        assert_eq!(dest, [0b1100_1100, 0xf0]);
    }

    #[test]
    fn multiply_constant_zero_clears() {
        let mut dest = [0xffu8; 3];
        Binary.region_multiply_constant(&mut dest, 1, 24);
        assert_eq!(dest, [0xff; 3]);
        Binary.region_multiply_constant(&mut dest, 0, 24);
        assert_eq!(dest, [0; 3]);
    }
}
