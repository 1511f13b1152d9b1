//! Process-wide coding counters registered in the default prometheus registry.

use lazy_static::lazy_static;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

lazy_static! {
    pub static ref SYSTEMATIC_SYMBOLS: IntCounter = register_int_counter!(
        "netcode_systematic_symbols_total",
        "Number of uncoded symbols produced by encoders"
    )
    .unwrap();
    pub static ref CODED_SYMBOLS: IntCounter = register_int_counter!(
        "netcode_coded_symbols_total",
        "Number of coded symbols produced by encoders"
    )
    .unwrap();
    pub static ref RECODED_SYMBOLS: IntCounter = register_int_counter!(
        "netcode_recoded_symbols_total",
        "Number of symbols produced by recoders"
    )
    .unwrap();
    pub static ref DECODED_PACKETS: IntCounter = register_int_counter!(
        "netcode_decoded_packets_total",
        "Number of packets passed to decoders"
    )
    .unwrap();
    pub static ref DEPENDENT_PACKETS: IntCounter = register_int_counter!(
        "netcode_dependent_packets_total",
        "Number of received packets that did not increase the rank"
    )
    .unwrap();
    pub static ref COMPLETED_BLOCKS: IntCounter = register_int_counter!(
        "netcode_completed_blocks_total",
        "Number of blocks decoded to full rank"
    )
    .unwrap();
}

/// Renders every registered metric in the prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        log::warn!("failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
