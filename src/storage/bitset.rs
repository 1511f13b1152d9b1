/// Fixed-size bitset with one bit per symbol, packed LSB first.
///
/// The byte representation is also the pivot section of the feedback
/// layout, so `as_bytes` is exactly what goes on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBitset {
    bits: Vec<u8>,
    len: usize,
}

impl StatusBitset {
    pub fn new(len: usize) -> Self {
        StatusBitset { bits: vec![0; Self::bytes_for(len)], len }
    }

    /// Bytes needed to carry `len` bits.
    pub fn bytes_for(len: usize) -> usize {
        (len + 7) / 8
    }

    /// Resizes to `len` bits, all cleared.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.bits.clear();
        self.bits.resize(Self::bytes_for(len), 0);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit {} out of range {}", index, self.len);
        self.bits[index / 8] & (1 << (index % 8)) != 0
    }

    pub fn set(&mut self, index: usize) {
        assert!(index < self.len, "bit {} out of range {}", index, self.len);
        self.bits[index / 8] |= 1 << (index % 8);
    }

    pub fn clear(&mut self, index: usize) {
        assert!(index < self.len, "bit {} out of range {}", index, self.len);
        self.bits[index / 8] &= !(1 << (index % 8));
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Loads bits from a wire buffer. Bits past `len` in the last byte are
    /// ignored.
    pub fn copy_from_bytes(&mut self, bytes: &[u8]) {
        let n = Self::bytes_for(self.len);
        self.bits.copy_from_slice(&bytes[..n]);
        if self.len % 8 != 0 {
            if let Some(last) = self.bits.last_mut() {
                *last &= (1u8 << (self.len % 8)) - 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_count() {
        let mut bits = StatusBitset::new(10);
        assert_eq!(bits.as_bytes().len(), 2);
        bits.set(0);
        bits.set(9);
        assert!(bits.get(0) && bits.get(9) && !bits.get(5));
        assert_eq!(bits.count_ones(), 2);
        assert_eq!(bits.as_bytes(), &[0x01, 0x02]);
        bits.clear(0);
        assert_eq!(bits.count_ones(), 1);
    }

    #[test]
    fn copy_from_bytes_masks_padding() {
        let mut bits = StatusBitset::new(10);
        bits.copy_from_bytes(&[0xff, 0xff, 0xaa]);
        assert_eq!(bits.count_ones(), 10);
    }
}
