// netcode: random linear network coding for packet erasure channels.
//
// Encoders turn a block of equally sized source symbols into a stream of
// coded symbols over a finite field, decoders rebuild the block from any
// sufficiently independent subset, and recoders combine partially decoded
// data without decoding it first.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod factory;
pub mod field;
pub mod generator;
pub mod logger;
pub mod packet;
pub mod recoder;
pub mod storage;
pub mod telemetry;

pub use config::{CodecConfig, DecoderConfig, GeneratorConfig};
pub use decoder::{Decoder, Direction, PivotState};
pub use encoder::Encoder;
pub use error::{CodecError, Result};
pub use factory::CodecFactory;
pub use field::FieldKind;
pub use generator::{CoefficientGenerator, GeneratorKind, PivotInfo};
pub use packet::{Packet, PacketCodec, SymbolId, SymbolIdKind};
pub use recoder::{Recoder, RecodingDecoder};
