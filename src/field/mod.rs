// Copyright (c) 2024, The Netcode Project Authors.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright
//       notice, this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above
//       copyright notice, this list of conditions and the following disclaimer
//       in the documentation and/or other materials provided with the
//       distribution.
//
//     * Neither the name of the copyright holder nor the names of its
//       contributors may be used to endorse or promote products derived from
//       this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! # Finite Field Module
//!
//! Region arithmetic over the finite fields supported by the coders. Every
//! coder works on byte buffers interpreted as packed field elements; the
//! [`FieldKind`] describes the packing and the [`FieldOps`] implementation
//! performs the arithmetic. One field instance is built per factory and
//! shared by all coders it produces.

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

mod binary;
mod extension;
mod prime;
mod tables;

pub use binary::Binary;
pub use extension::{Binary16, Binary4, Binary8};
pub use prime::{Prime2325, PRIME_2325};

/// The finite fields available to the coders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// GF(2), eight elements per byte.
    Binary,
    /// GF(2^4), two elements per byte.
    Binary4,
    /// GF(2^8), one element per byte.
    Binary8,
    /// GF(2^16), little-endian 16-bit elements.
    Binary16,
    /// The prime field of order 2^32 - 5, little-endian 32-bit elements.
    Prime2325,
}

impl FieldKind {
    /// Bytes needed to store `elements` field elements.
    pub fn elements_to_size(self, elements: usize) -> usize {
        match self {
            FieldKind::Binary => (elements + 7) / 8,
            FieldKind::Binary4 => (elements + 1) / 2,
            FieldKind::Binary8 => elements,
            FieldKind::Binary16 => elements * 2,
            FieldKind::Prime2325 => elements * 4,
        }
    }

    /// Number of whole field elements stored in `bytes` bytes.
    pub fn size_to_elements(self, bytes: usize) -> usize {
        match self {
            FieldKind::Binary => bytes * 8,
            FieldKind::Binary4 => bytes * 2,
            FieldKind::Binary8 => bytes,
            FieldKind::Binary16 => bytes / 2,
            FieldKind::Prime2325 => bytes / 4,
        }
    }

    /// Symbol sizes must be a multiple of this many bytes.
    pub fn granularity(self) -> usize {
        match self {
            FieldKind::Binary | FieldKind::Binary4 | FieldKind::Binary8 => 1,
            FieldKind::Binary16 => 2,
            FieldKind::Prime2325 => 4,
        }
    }

    /// Largest element value of the field.
    pub fn max_value(self) -> u32 {
        match self {
            FieldKind::Binary => 1,
            FieldKind::Binary4 => 15,
            FieldKind::Binary8 => 255,
            FieldKind::Binary16 => 65535,
            FieldKind::Prime2325 => PRIME_2325 - 1,
        }
    }

    /// First of the leading `elements` values that is not a field element.
    ///
    /// Only the prime field has word patterns outside the field.
    pub fn find_invalid(self, data: &[u8], elements: usize) -> Option<(usize, u32)> {
        if self != FieldKind::Prime2325 {
            return None;
        }
        (0..elements)
            .map(|i| (i, self.get_value(data, i)))
            .find(|&(_, value)| value >= PRIME_2325)
    }

    /// First element index stored in the same byte as element `index`.
    pub fn byte_aligned(self, index: usize) -> usize {
        match self {
            FieldKind::Binary => index & !7,
            FieldKind::Binary4 => index & !1,
            _ => index,
        }
    }

    /// True for GF(2), where every nonzero coefficient equals one.
    pub fn is_binary(self) -> bool {
        self == FieldKind::Binary
    }

    /// Reads element `index` from a packed buffer.
    #[inline(always)]
    pub fn get_value(self, data: &[u8], index: usize) -> u32 {
        match self {
            FieldKind::Binary => ((data[index / 8] >> (index % 8)) & 1) as u32,
            FieldKind::Binary4 => {
                let byte = data[index / 2];
                if index % 2 == 0 {
                    (byte & 0x0f) as u32
                } else {
                    (byte >> 4) as u32
                }
            }
            FieldKind::Binary8 => data[index] as u32,
            FieldKind::Binary16 => {
                u16::from_le_bytes([data[2 * index], data[2 * index + 1]]) as u32
            }
            FieldKind::Prime2325 => u32::from_le_bytes([
                data[4 * index],
                data[4 * index + 1],
                data[4 * index + 2],
                data[4 * index + 3],
            ]),
        }
    }

    /// Writes element `index` into a packed buffer.
    #[inline(always)]
    pub fn set_value(self, data: &mut [u8], index: usize, value: u32) {
        debug_assert!(value <= self.max_value());
        match self {
            FieldKind::Binary => {
                let mask = 1u8 << (index % 8);
                if value != 0 {
                    data[index / 8] |= mask;
                } else {
                    data[index / 8] &= !mask;
                }
            }
            FieldKind::Binary4 => {
                let byte = &mut data[index / 2];
                if index % 2 == 0 {
                    *byte = (*byte & 0xf0) | value as u8;
                } else {
                    *byte = (*byte & 0x0f) | ((value as u8) << 4);
                }
            }
            FieldKind::Binary8 => data[index] = value as u8,
            FieldKind::Binary16 => {
                data[2 * index..2 * index + 2].copy_from_slice(&(value as u16).to_le_bytes())
            }
            FieldKind::Prime2325 => {
                data[4 * index..4 * index + 4].copy_from_slice(&value.to_le_bytes())
            }
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Binary => "binary",
            FieldKind::Binary4 => "binary4",
            FieldKind::Binary8 => "binary8",
            FieldKind::Binary16 => "binary16",
            FieldKind::Prime2325 => "prime2325",
        };
        f.write_str(name)
    }
}

/// Arithmetic over one finite field.
///
/// Region operations work in place on `dest` and take their length in
/// field elements, not bytes. `dest` and `src` never alias.
pub trait FieldOps: Send + Sync + fmt::Debug {
    fn kind(&self) -> FieldKind;

    fn add(&self, a: u32, b: u32) -> u32;

    fn subtract(&self, a: u32, b: u32) -> u32;

    fn multiply(&self, a: u32, b: u32) -> u32;

    /// Multiplicative inverse; `a` must be nonzero.
    fn invert(&self, a: u32) -> u32;

    /// `dest[i] = dest[i] + src[i]`
    fn region_add(&self, dest: &mut [u8], src: &[u8], length: usize) {
        let kind = self.kind();
        for i in 0..length {
            let v = self.add(kind.get_value(dest, i), kind.get_value(src, i));
            kind.set_value(dest, i, v);
        }
    }

    /// `dest[i] = dest[i] - src[i]`
    fn region_subtract(&self, dest: &mut [u8], src: &[u8], length: usize) {
        let kind = self.kind();
        for i in 0..length {
            let v = self.subtract(kind.get_value(dest, i), kind.get_value(src, i));
            kind.set_value(dest, i, v);
        }
    }

    /// `dest[i] = constant * dest[i]`
    fn region_multiply_constant(&self, dest: &mut [u8], constant: u32, length: usize) {
        let kind = self.kind();
        for i in 0..length {
            let v = self.multiply(constant, kind.get_value(dest, i));
            kind.set_value(dest, i, v);
        }
    }

    /// `dest[i] = dest[i] + constant * src[i]`
    fn region_multiply_add(&self, dest: &mut [u8], src: &[u8], constant: u32, length: usize) {
        let kind = self.kind();
        for i in 0..length {
            let product = self.multiply(constant, kind.get_value(src, i));
            let v = self.add(kind.get_value(dest, i), product);
            kind.set_value(dest, i, v);
        }
    }

    /// `dest[i] = dest[i] - constant * src[i]`
    fn region_multiply_subtract(&self, dest: &mut [u8], src: &[u8], constant: u32, length: usize) {
        let kind = self.kind();
        for i in 0..length {
            let product = self.multiply(constant, kind.get_value(src, i));
            let v = self.subtract(kind.get_value(dest, i), product);
            kind.set_value(dest, i, v);
        }
    }
}

/// Field instance shared between a factory and every coder it builds.
pub type SharedField = Arc<dyn FieldOps>;

/// Builds the field implementation for `kind`.
pub fn build(kind: FieldKind) -> SharedField {
    match kind {
        FieldKind::Binary => Arc::new(Binary),
        FieldKind::Binary4 => Arc::new(Binary4::new()),
        FieldKind::Binary8 => Arc::new(Binary8::new()),
        FieldKind::Binary16 => Arc::new(Binary16::new()),
        FieldKind::Prime2325 => Arc::new(Prime2325),
    }
}

/// XOR of two byte regions, the addition of every characteristic-2 field.
#[inline(always)]
pub(crate) fn xor_region(dest: &mut [u8], src: &[u8], bytes: usize) {
    for (d, s) in dest[..bytes].iter_mut().zip(&src[..bytes]) {
        *d ^= *s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_sizes() {
        assert_eq!(FieldKind::Binary.elements_to_size(9), 2);
        assert_eq!(FieldKind::Binary4.elements_to_size(3), 2);
        assert_eq!(FieldKind::Binary8.elements_to_size(3), 3);
        assert_eq!(FieldKind::Binary16.elements_to_size(3), 6);
        assert_eq!(FieldKind::Prime2325.elements_to_size(3), 12);
        assert_eq!(FieldKind::Binary.size_to_elements(2), 16);
        assert_eq!(FieldKind::Binary16.size_to_elements(6), 3);
    }

    #[test]
    fn get_set_values() {
        let mut buf = [0u8; 8];
        FieldKind::Binary.set_value(&mut buf, 9, 1);
        assert_eq!(buf[1], 0b10);
        assert_eq!(FieldKind::Binary.get_value(&buf, 9), 1);
        FieldKind::Binary.set_value(&mut buf, 9, 0);
        assert_eq!(buf[1], 0);

        FieldKind::Binary4.set_value(&mut buf, 3, 0xa);
        FieldKind::Binary4.set_value(&mut buf, 2, 0x5);
        assert_eq!(buf[1], 0xa5);
        assert_eq!(FieldKind::Binary4.get_value(&buf, 3), 0xa);

        FieldKind::Binary16.set_value(&mut buf, 1, 0xbeef);
        assert_eq!(&buf[2..4], &[0xef, 0xbe]);
        assert_eq!(FieldKind::Binary16.get_value(&buf, 1), 0xbeef);

        FieldKind::Prime2325.set_value(&mut buf, 1, 0x0102_0304);
        assert_eq!(&buf[4..8], &[4, 3, 2, 1]);
    }

    #[test]
    fn prime_words_outside_the_field_are_found() {
        let mut buf = [0u8; 12];
        FieldKind::Prime2325.set_value(&mut buf, 0, PRIME_2325 - 1);
        buf[4..8].copy_from_slice(&PRIME_2325.to_le_bytes());
        assert_eq!(
            FieldKind::Prime2325.find_invalid(&buf, 3),
            Some((1, PRIME_2325))
        );
        assert_eq!(FieldKind::Prime2325.find_invalid(&buf, 1), None);
        assert_eq!(FieldKind::Binary8.find_invalid(&[0xff; 4], 4), None);
    }

    #[test]
    fn byte_aligned_rounds_down_to_packed_byte() {
        assert_eq!(FieldKind::Binary.byte_aligned(13), 8);
        assert_eq!(FieldKind::Binary4.byte_aligned(5), 4);
        assert_eq!(FieldKind::Binary16.byte_aligned(5), 5);
    }

    #[test]
    fn every_field_satisfies_inverse_and_distribution() {
        for kind in [
            FieldKind::Binary,
            FieldKind::Binary4,
            FieldKind::Binary8,
            FieldKind::Binary16,
            FieldKind::Prime2325,
        ] {
            let field = build(kind);
            assert_eq!(field.kind(), kind);
            for a in [1u32, 2, 3, 7, kind.max_value()] {
                let a = a.min(kind.max_value());
                assert_eq!(field.multiply(a, field.invert(a)), 1, "{kind}");
                let b = kind.max_value() / 2 + 1;
                let c = 1u32.max(kind.max_value() / 3);
                let lhs = field.multiply(a, field.add(b, c));
                let rhs = field.add(field.multiply(a, b), field.multiply(a, c));
                assert_eq!(lhs, rhs, "{kind}");
                assert_eq!(field.subtract(field.add(a, b), b), a, "{kind}");
            }
        }
    }

    #[test]
    fn region_multiply_add_then_subtract_restores() {
        for kind in [
            FieldKind::Binary,
            FieldKind::Binary4,
            FieldKind::Binary8,
            FieldKind::Binary16,
            FieldKind::Prime2325,
        ] {
            let field = build(kind);
            let length = kind.size_to_elements(16);
            let mut src = vec![0u8; 16];
            let mut dest = vec![0u8; 16];
            for i in 0..length {
                kind.set_value(&mut src, i, (i as u32 * 7 + 3) % (kind.max_value() + 1).max(2));
                kind.set_value(&mut dest, i, (i as u32 * 5 + 1) % (kind.max_value() + 1).max(2));
            }
            let original = dest.clone();
            let constant = kind.max_value().min(3);
            field.region_multiply_add(&mut dest, &src, constant, length);
            field.region_multiply_subtract(&mut dest, &src, constant, length);
            assert_eq!(dest, original, "{kind}");

            field.region_add(&mut dest, &src, length);
            field.region_subtract(&mut dest, &src, length);
            assert_eq!(dest, original, "{kind}");
        }
    }
}
