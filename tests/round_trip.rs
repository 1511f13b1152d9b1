mod common;

use common::{config, factory, random_block};
use netcode::{CodecFactory, Direction, FieldKind, SymbolId, SymbolIdKind};

const FIELDS: [FieldKind; 5] = [
    FieldKind::Binary,
    FieldKind::Binary4,
    FieldKind::Binary8,
    FieldKind::Binary16,
    FieldKind::Prime2325,
];

fn transfer(factory: &CodecFactory, seed: u64) {
    let field = factory.config().field;
    let symbols = factory.symbols();
    let block = random_block(field, symbols * factory.symbol_size(), seed);
    let mut encoder = factory.build_encoder().unwrap();
    let mut decoder = factory.build_decoder().unwrap();
    encoder.set_symbols(&block);

    let mut payload = vec![0u8; factory.payload_size()];
    let mut fed = 0;
    let mut last_rank = 0;
    while !decoder.is_complete() {
        assert!(fed < 10 * symbols + 40, "{field}: no progress at rank {}", decoder.rank());
        let size = encoder.write_payload(&mut payload).unwrap();
        decoder.read_payload(&payload[..size]).unwrap();
        fed += 1;
        assert!(decoder.rank() <= fed);
        assert!(decoder.rank() >= last_rank);
        last_rank = decoder.rank();
    }
    let mut out = vec![0u8; block.len()];
    decoder.copy_symbols(&mut out);
    assert_eq!(out, block, "{field} with {symbols} symbols");
    for i in 0..symbols {
        assert!(decoder.is_symbol_uncoded(i));
    }
}

#[test]
fn coded_round_trip_every_field() {
    for field in FIELDS {
        for (symbols, symbol_size) in [(1, 4), (5, 8), (16, 32)] {
            let mut config = config(field, symbols, symbol_size);
            config.systematic = false;
            transfer(&CodecFactory::new(config).unwrap(), symbols as u64);
        }
    }
}

#[test]
fn systematic_round_trip_every_field() {
    for field in FIELDS {
        transfer(&factory(field, 12, 16), 7);
    }
}

#[test]
fn alternative_decoder_orders() {
    for (direction, delayed) in [
        (Direction::Forward, true),
        (Direction::Backward, false),
        (Direction::Backward, true),
        (Direction::Banded, false),
    ] {
        for field in [FieldKind::Binary, FieldKind::Binary8, FieldKind::Prime2325] {
            let mut config = config(field, 10, 8);
            config.systematic = false;
            config.decoder.direction = direction;
            config.decoder.delayed = delayed;
            transfer(&CodecFactory::new(config).unwrap(), 3);
        }
    }
}

#[test]
fn redundant_packets_change_nothing() {
    let factory = factory(FieldKind::Binary8, 6, 8);
    let block = random_block(FieldKind::Binary8, 48, 1);
    let mut encoder = factory.build_encoder().unwrap();
    let mut decoder = factory.build_decoder().unwrap();
    encoder.set_systematic_off();
    encoder.set_symbols(&block);

    let packets: Vec<_> = (0..3).map(|_| encoder.encode()).collect();
    for packet in packets.iter() {
        decoder.decode_packet(packet.clone()).unwrap();
    }
    let rank = decoder.rank();
    let rows: Vec<Vec<u8>> = (0..6)
        .filter(|i| decoder.is_symbol_pivot(*i))
        .map(|i| decoder.symbol(i).to_vec())
        .collect();
    for packet in packets {
        decoder.decode_packet(packet).unwrap();
        assert!(!decoder.is_partial_complete());
    }
    assert_eq!(decoder.rank(), rank);
    let after: Vec<Vec<u8>> = (0..6)
        .filter(|i| decoder.is_symbol_pivot(*i))
        .map(|i| decoder.symbol(i).to_vec())
        .collect();
    assert_eq!(rows, after);
}

#[test]
fn four_symbol_systematic_scenario() {
    let factory = factory(FieldKind::Binary8, 4, 16);
    let block = random_block(FieldKind::Binary8, 64, 4);
    let mut encoder = factory.build_encoder().unwrap();
    let mut decoder = factory.build_decoder().unwrap();
    encoder.set_symbols(&block);

    for i in 0..4u32 {
        let packet = encoder.encode();
        assert_eq!(packet.id, SymbolId::Systematic(i));
        decoder.decode_packet(packet).unwrap();
    }
    assert!(matches!(encoder.encode().id, SymbolId::Coefficients(_)));
    assert_eq!(decoder.rank(), 4);
    assert!(decoder.is_complete());
    for i in 0..4 {
        assert!(decoder.is_symbol_uncoded(i));
        assert_eq!(decoder.symbol(i), &block[i * 16..(i + 1) * 16]);
    }
}

#[test]
fn systematic_symbols_follow_arrival_order() {
    let factory = factory(FieldKind::Binary8, 5, 4);
    let block = random_block(FieldKind::Binary8, 20, 5);
    let mut encoder = factory.build_encoder().unwrap();
    encoder.set_symbol(3, &block[12..16]);
    assert_eq!(encoder.encode().id, SymbolId::Systematic(3));
    assert!(!encoder.in_systematic_phase());
    encoder.set_symbol(1, &block[4..8]);
    assert_eq!(encoder.encode().id, SymbolId::Systematic(1));
}

#[test]
fn seed_identifiers_round_trip() {
    for field in [FieldKind::Binary, FieldKind::Binary8, FieldKind::Binary16] {
        let mut config = config(field, 8, 16);
        config.symbol_id = SymbolIdKind::Seed;
        config.systematic = false;
        config.seed = 17;
        let factory = CodecFactory::new(config).unwrap();
        assert_eq!(factory.packet_codec().id_size(), 4);
        transfer(&factory, 9);
    }
}

#[test]
fn rank_header_reaches_decoder() {
    let mut config = config(FieldKind::Binary8, 4, 4);
    config.rank_header = true;
    let factory = CodecFactory::new(config).unwrap();
    let mut encoder = factory.build_encoder().unwrap();
    let mut decoder = factory.build_decoder().unwrap();
    encoder.set_symbol(0, &[1, 2, 3, 4]);
    encoder.set_symbol(1, &[5, 6, 7, 8]);
    let mut payload = vec![0u8; factory.payload_size()];
    let size = encoder.write_payload(&mut payload).unwrap();
    decoder.read_payload(&payload[..size]).unwrap();
    assert_eq!(decoder.seen_encoder_rank(), 2);
}

#[test]
fn shallow_codecs_work_in_place() {
    let factory = factory(FieldKind::Binary16, 6, 10);
    let original = random_block(FieldKind::Binary16, 60, 11);
    let mut source = original.clone();
    let mut decoded = vec![0u8; 60];
    {
        let mut encoder = factory.build_shallow_encoder().unwrap();
        let mut decoder = factory.build_shallow_decoder().unwrap();
        encoder.attach_symbols(&mut source);
        decoder.set_symbols(&mut decoded);
        encoder.set_systematic_off();
        while !decoder.is_complete() {
            decoder.decode_packet(encoder.encode()).unwrap();
        }
    }
    assert_eq!(decoded, original);
    assert_eq!(source, original);
}

#[test]
fn feedback_keeps_packets_innovative() {
    let factory = factory(FieldKind::Binary8, 16, 8);
    let block = random_block(FieldKind::Binary8, 128, 2);
    let mut encoder = factory.build_encoder().unwrap();
    let mut decoder = factory.build_decoder().unwrap();
    encoder.set_symbols(&block);
    let mut feedback = vec![0u8; factory.feedback_size()];

    // every other systematic packet is lost
    for i in 0..16 {
        let packet = encoder.encode();
        if i % 2 == 0 {
            decoder.decode_packet(packet).unwrap();
        }
    }
    assert_eq!(decoder.rank(), 8);
    let size = decoder.write_feedback(&mut feedback).unwrap();
    encoder.read_feedback(&feedback[..size]).unwrap();

    let mut sent = 0;
    while !decoder.is_complete() {
        let packet = encoder.encode();
        if let SymbolId::Coefficients(c) = &packet.id {
            for i in (0..16).step_by(2) {
                assert_eq!(c[i], 0, "column {i} already held by the decoder");
            }
        }
        decoder.decode_packet(packet).unwrap();
        sent += 1;
        assert!(sent < 40);
    }
    let mut out = vec![0u8; 128];
    decoder.copy_symbols(&mut out);
    assert_eq!(out, block);
}

#[test]
fn reinitialized_codecs_handle_a_new_geometry() {
    let mut factory = CodecFactory::new(config(FieldKind::Binary8, 16, 64)).unwrap();
    let mut encoder = factory.build_encoder().unwrap();
    let mut decoder = factory.build_decoder().unwrap();
    factory.set_symbols(5).unwrap();
    factory.set_symbol_size(20).unwrap();
    encoder.initialize(&factory).unwrap();
    decoder.initialize(&factory).unwrap();

    let block = random_block(FieldKind::Binary8, 100, 8);
    encoder.set_symbols(&block);
    let mut payload = vec![0u8; factory.payload_size()];
    while !decoder.is_complete() {
        let size = encoder.write_payload(&mut payload).unwrap();
        decoder.read_payload(&payload[..size]).unwrap();
    }
    let mut out = vec![0u8; 100];
    decoder.copy_symbols(&mut out);
    assert_eq!(out, block);
}
