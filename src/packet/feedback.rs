use crate::error::{CodecError, Result};
use crate::generator::{PivotInfo, RemoteStatus};
use crate::storage::StatusBitset;

/// Size of a feedback message for `symbols` symbols: the pivot bitset
/// followed by a big-endian rank.
pub fn feedback_size(symbols: usize) -> usize {
    StatusBitset::bytes_for(symbols) + 4
}

/// Serializes the pivot state of `pivots` into `out`.
pub fn write_feedback(pivots: &dyn PivotInfo, out: &mut [u8]) -> Result<usize> {
    let symbols = pivots.symbols();
    let size = feedback_size(symbols);
    if out.len() < size {
        return Err(CodecError::BufferTooShort {
            needed: size,
            actual: out.len(),
        });
    }
    let mut bits = StatusBitset::new(symbols);
    for i in (0..symbols).filter(|i| pivots.is_symbol_pivot(*i)) {
        bits.set(i);
    }
    let (bitset, rank) = out[..size].split_at_mut(size - 4);
    bitset.copy_from_slice(bits.as_bytes());
    rank.copy_from_slice(&(pivots.rank() as u32).to_be_bytes());
    Ok(size)
}

/// Parses a feedback message for a block of `symbols` symbols.
pub fn read_feedback(symbols: usize, feedback: &[u8]) -> Result<RemoteStatus> {
    let size = feedback_size(symbols);
    if feedback.len() < size {
        return Err(CodecError::BufferTooShort {
            needed: size,
            actual: feedback.len(),
        });
    }
    let mut bits = StatusBitset::new(symbols);
    bits.copy_from_bytes(&feedback[..size - 4]);
    let rank = u32::from_be_bytes([
        feedback[size - 4],
        feedback[size - 3],
        feedback[size - 2],
        feedback[size - 1],
    ]);
    if rank as usize > symbols {
        return Err(CodecError::InvalidConfig(format!(
            "feedback rank {} exceeds {} symbols",
            rank, symbols
        )));
    }
    Ok(RemoteStatus::new(bits, rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::PivotMask;

    #[test]
    fn layout_is_bitset_then_rank() {
        let pivots = PivotMask::from_fn(10, |i| i == 0 || i == 9);
        let mut out = [0u8; 6];
        assert_eq!(write_feedback(&pivots, &mut out).unwrap(), 6);
        assert_eq!(out, [0x01, 0x02, 0, 0, 0, 2]);

        let status = read_feedback(10, &out).unwrap();
        assert_eq!(status.rank(), 2);
        assert!(status.is_symbol_pivot(9));
        assert!(!status.is_symbol_pivot(1));
    }

    #[test]
    fn short_or_inconsistent_feedback_is_rejected() {
        assert!(read_feedback(10, &[0u8; 5]).is_err());
        assert!(read_feedback(8, &[0xff, 0, 0, 0, 9]).is_err());
    }
}
