use thiserror::Error;

use crate::field::FieldKind;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{symbols} symbols exceed the factory maximum of {max}")]
    TooManySymbols { symbols: usize, max: usize },
    #[error("symbol size {size} exceeds the factory maximum of {max}")]
    SymbolSizeTooLarge { size: usize, max: usize },
    #[error("symbol size {size} is not a multiple of the field element size {granularity}")]
    SymbolSizeAlignment { size: usize, granularity: usize },
    #[error("buffer too short: need {needed} bytes, got {actual}")]
    BufferTooShort { needed: usize, actual: usize },
    #[error("unknown packet flag {0:#04x}")]
    InvalidFlag(u8),
    #[error("coefficient {value} at column {column} is not an element of {field}")]
    InvalidCoefficient {
        column: usize,
        value: u32,
        field: FieldKind,
    },
    #[error("symbol index {index} out of range for {symbols} symbols")]
    IndexOutOfRange { index: usize, symbols: usize },
    #[error("aligned allocation of {0} bytes failed")]
    Allocation(usize),
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
