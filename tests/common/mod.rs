#![allow(dead_code)]

use netcode::field::{self, FieldKind};
use netcode::{CodecConfig, CodecFactory};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub fn config(field: FieldKind, symbols: usize, symbol_size: usize) -> CodecConfig {
    CodecConfig {
        field,
        max_symbols: symbols,
        max_symbol_size: symbol_size,
        symbols,
        symbol_size,
        ..Default::default()
    }
}

pub fn factory(field: FieldKind, symbols: usize, symbol_size: usize) -> CodecFactory {
    netcode::logger::init_for_tests();
    CodecFactory::new(config(field, symbols, symbol_size)).unwrap()
}

/// Random block whose prime-field words stay below the modulus.
pub fn random_block(field: FieldKind, len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut block = vec![0u8; len];
    rng.fill_bytes(&mut block);
    if field == FieldKind::Prime2325 {
        for word in block.chunks_exact_mut(4) {
            word[3] &= 0x7f;
        }
    }
    block
}

/// `Σ c_i · s_i` computed straight from the source block.
pub fn combine(kind: FieldKind, block: &[u8], symbol_size: usize, coefficients: &[u8]) -> Vec<u8> {
    let f = field::build(kind);
    let length = kind.size_to_elements(symbol_size);
    let mut out = vec![0u8; symbol_size];
    for (i, symbol) in block.chunks_exact(symbol_size).enumerate() {
        f.region_multiply_add(&mut out, symbol, kind.get_value(coefficients, i), length);
    }
    out
}
