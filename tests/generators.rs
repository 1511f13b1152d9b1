mod common;

use common::{config, random_block};
use netcode::generator::{self, PivotMask, SparseGenerator};
use netcode::{
    CodecFactory, CoefficientGenerator, Direction, FieldKind, GeneratorKind, Packet, SymbolIdKind,
};

fn coded_packets(factory: &CodecFactory, block: &[u8], count: usize) -> Vec<Packet> {
    let mut encoder = factory.build_encoder().unwrap();
    encoder.set_symbols(block);
    (0..count).map(|_| encoder.encode()).collect()
}

/// Every `k`-subset of `0..n`, in lexicographic order.
fn subsets(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if n < k {
        return Vec::new();
    }
    let mut out = subsets(n - 1, k);
    for mut s in subsets(n - 1, k - 1) {
        s.push(n - 1);
        out.push(s);
    }
    out
}

#[test]
fn reed_solomon_recovers_from_any_n_packets() {
    for id_kind in [SymbolIdKind::Plain, SymbolIdKind::Seed] {
        let mut config = config(FieldKind::Binary8, 5, 8);
        config.generator.kind = GeneratorKind::ReedSolomon;
        config.symbol_id = id_kind;
        let factory = CodecFactory::new(config).unwrap();
        let block = random_block(FieldKind::Binary8, 40, 31);
        let packets = coded_packets(&factory, &block, 10);

        for subset in subsets(10, 5) {
            let mut decoder = factory.build_decoder().unwrap();
            for i in subset.iter() {
                decoder.decode_packet(packets[*i].clone()).unwrap();
            }
            assert!(decoder.is_complete(), "{id_kind:?} subset {subset:?}");
            let mut out = vec![0u8; 40];
            decoder.copy_symbols(&mut out);
            assert_eq!(out, block);
        }
    }
}

#[test]
fn reed_solomon_rejects_oversized_blocks() {
    let mut config = config(FieldKind::Binary4, 15, 4);
    config.generator.kind = GeneratorKind::ReedSolomon;
    assert!(CodecFactory::new(config.clone()).is_err());
    config.field = FieldKind::Prime2325;
    config.max_symbols = 4;
    config.symbols = 4;
    assert!(CodecFactory::new(config).is_err());
}

#[test]
fn perpetual_codes_decode() {
    for (pre_charge, direction) in [
        (true, Direction::Banded),
        (false, Direction::Banded),
        (true, Direction::Forward),
    ] {
        let mut config = config(FieldKind::Binary8, 30, 8);
        config.systematic = false;
        config.generator.kind = GeneratorKind::Perpetual;
        config.generator.width = Some(5);
        config.generator.pre_charge = pre_charge;
        config.decoder.direction = direction;
        let factory = CodecFactory::new(config).unwrap();
        let block = random_block(FieldKind::Binary8, 240, 32);
        let mut decoder = factory.build_decoder().unwrap();
        for packet in coded_packets(&factory, &block, 200) {
            decoder.decode_packet(packet).unwrap();
            if decoder.is_complete() {
                break;
            }
        }
        assert!(decoder.is_complete(), "pre_charge={pre_charge} {direction:?}");
        let mut out = vec![0u8; 240];
        decoder.copy_symbols(&mut out);
        assert_eq!(out, block);
    }
}

#[test]
fn perpetual_with_seed_ids_is_rejected() {
    let mut config = config(FieldKind::Binary8, 8, 8);
    config.generator.kind = GeneratorKind::Perpetual;
    config.symbol_id = SymbolIdKind::Seed;
    assert!(CodecFactory::new(config).is_err());
}

#[test]
fn sparse_codes_decode() {
    for field in [FieldKind::Binary, FieldKind::Binary16] {
        let mut config = config(field, 20, 8);
        config.systematic = false;
        config.generator.kind = GeneratorKind::Sparse;
        config.generator.density = Some(0.3);
        let factory = CodecFactory::new(config).unwrap();
        let block = random_block(field, 160, 33);
        let mut decoder = factory.build_decoder().unwrap();
        for packet in coded_packets(&factory, &block, 200) {
            decoder.decode_packet(packet).unwrap();
            if decoder.is_complete() {
                break;
            }
        }
        assert!(decoder.is_complete(), "{field}");
    }
}

#[test]
fn sparse_density_matches_configuration() {
    let f = netcode::field::build(FieldKind::Binary8);
    let mut generator = SparseGenerator::new(f);
    generator.initialize(50);
    generator.set_density(0.3).unwrap();
    generator.seed(5);
    let mut v = [0u8; 50];
    let mut nonzero = 0usize;
    for _ in 0..2000 {
        generator.generate(&mut v);
        nonzero += v.iter().filter(|b| **b != 0).count();
    }
    let mean = nonzero as f64 / 2000.0;
    assert!((mean - 15.0).abs() <= 15.0 * 0.15, "mean {mean}");
}

#[test]
fn generators_build_from_configuration() {
    let f = netcode::field::build(FieldKind::Binary16);
    let mask = PivotMask::from_fn(10, |i| i >= 7);
    for kind in [GeneratorKind::Uniform, GeneratorKind::Sparse, GeneratorKind::Perpetual] {
        let mut config = config(FieldKind::Binary16, 10, 8).generator;
        config.kind = kind;
        let mut generator = generator::build(&config, f.clone(), 10).unwrap();
        let mut v = [0u8; 20];
        generator.generate_partial(&mut v, &mask);
        assert!(v[..14].iter().all(|b| *b == 0), "{kind}");
    }
}
