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

//! # Packet Layout
//!
//! A payload is the symbol data followed by its header:
//!
//! ```text
//! [ symbol data: symbol_size ][ flag: u8 ][ id: id_size ][ rank: u32 BE ]?
//! ```
//!
//! A flag of `0xff` marks a systematic symbol whose id carries its big-endian
//! index. A flag of `0x00` marks a coded symbol whose id is either the full
//! coefficient vector or a big-endian seed. The trailing rank is only present
//! when the codec is configured with a rank header.

use serde::Deserialize;

use crate::error::{CodecError, Result};

mod feedback;

pub use feedback::{feedback_size, read_feedback, write_feedback};

pub const SYSTEMATIC_FLAG: u8 = 0xff;
pub const CODED_FLAG: u8 = 0x00;

const U32_SIZE: usize = 4;

/// How coded symbols are identified on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SymbolIdKind {
    /// The id is the coefficient vector itself.
    #[default]
    Plain,
    /// The id is a generator seed; the receiver regenerates the vector.
    Seed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolId {
    /// Uncoded source symbol at this index.
    Systematic(u32),
    /// Coded symbol with an explicit coefficient vector.
    Coefficients(Vec<u8>),
    /// Coded symbol whose coefficients come from seeding a generator.
    Seed(u32),
}

/// One encoded symbol together with its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub data: Vec<u8>,
    pub id: SymbolId,
    /// Rank of the sender when the packet was produced.
    pub rank: Option<u32>,
}

/// Serializes packets for one block geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketCodec {
    symbols: usize,
    symbol_size: usize,
    vector_size: usize,
    id_kind: SymbolIdKind,
    rank_header: bool,
}

impl PacketCodec {
    pub fn new(
        symbols: usize,
        symbol_size: usize,
        vector_size: usize,
        id_kind: SymbolIdKind,
        rank_header: bool,
    ) -> Self {
        PacketCodec {
            symbols,
            symbol_size,
            vector_size,
            id_kind,
            rank_header,
        }
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    pub fn id_kind(&self) -> SymbolIdKind {
        self.id_kind
    }

    pub fn id_size(&self) -> usize {
        match self.id_kind {
            SymbolIdKind::Plain => self.vector_size.max(U32_SIZE),
            SymbolIdKind::Seed => U32_SIZE,
        }
    }

    pub fn header_size(&self) -> usize {
        1 + self.id_size() + if self.rank_header { U32_SIZE } else { 0 }
    }

    pub fn payload_size(&self) -> usize {
        self.symbol_size + self.header_size()
    }

    /// Writes `packet` into `out` and returns the number of bytes used.
    pub fn write(&self, packet: &Packet, out: &mut [u8]) -> Result<usize> {
        let size = self.payload_size();
        if out.len() < size {
            return Err(CodecError::BufferTooShort {
                needed: size,
                actual: out.len(),
            });
        }
        if packet.data.len() != self.symbol_size {
            return Err(CodecError::InvalidConfig(format!(
                "packet holds {} bytes of symbol data, codec expects {}",
                packet.data.len(),
                self.symbol_size
            )));
        }
        let (data, header) = out[..size].split_at_mut(self.symbol_size);
        data.copy_from_slice(&packet.data);
        header.fill(0);

        let id_size = self.id_size();
        let (flag, rest) = header.split_at_mut(1);
        let (id, rank) = rest.split_at_mut(id_size);
        match (&packet.id, self.id_kind) {
            (SymbolId::Systematic(index), _) => {
                flag[0] = SYSTEMATIC_FLAG;
                id[..U32_SIZE].copy_from_slice(&index.to_be_bytes());
            }
            (SymbolId::Coefficients(coefficients), SymbolIdKind::Plain) => {
                if coefficients.len() != self.vector_size {
                    return Err(CodecError::InvalidConfig(format!(
                        "coefficient vector of {} bytes, codec expects {}",
                        coefficients.len(),
                        self.vector_size
                    )));
                }
                flag[0] = CODED_FLAG;
                id[..self.vector_size].copy_from_slice(coefficients);
            }
            (SymbolId::Seed(seed), SymbolIdKind::Seed) => {
                flag[0] = CODED_FLAG;
                id.copy_from_slice(&seed.to_be_bytes());
            }
            (id, kind) => {
                return Err(CodecError::InvalidConfig(format!(
                    "{:?} cannot be written with {:?} identifiers",
                    id, kind
                )))
            }
        }
        if self.rank_header {
            rank.copy_from_slice(&packet.rank.unwrap_or(0).to_be_bytes());
        }
        Ok(size)
    }

    /// Parses a payload produced by [`PacketCodec::write`].
    pub fn read(&self, payload: &[u8]) -> Result<Packet> {
        let size = self.payload_size();
        if payload.len() < size {
            return Err(CodecError::BufferTooShort {
                needed: size,
                actual: payload.len(),
            });
        }
        let (data, header) = payload[..size].split_at(self.symbol_size);
        let (flag, rest) = (header[0], &header[1..]);
        let (id, rank) = rest.split_at(self.id_size());

        let id = match flag {
            SYSTEMATIC_FLAG => {
                let index = read_u32(id);
                if index as usize >= self.symbols {
                    return Err(CodecError::IndexOutOfRange {
                        index: index as usize,
                        symbols: self.symbols,
                    });
                }
                SymbolId::Systematic(index)
            }
            CODED_FLAG => match self.id_kind {
                SymbolIdKind::Plain => SymbolId::Coefficients(id[..self.vector_size].to_vec()),
                SymbolIdKind::Seed => SymbolId::Seed(read_u32(id)),
            },
            other => return Err(CodecError::InvalidFlag(other)),
        };
        let rank = if self.rank_header {
            Some(read_u32(rank))
        } else {
            None
        };
        Ok(Packet {
            data: data.to_vec(),
            id,
            rank,
        })
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
