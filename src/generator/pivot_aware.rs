use log::trace;

use super::{CoefficientGenerator, PivotInfo};
use crate::storage::StatusBitset;

/// Pivot state of the remote decoder, as last reported through feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteStatus {
    pivots: StatusBitset,
    rank: u32,
}

impl RemoteStatus {
    pub fn new(pivots: StatusBitset, rank: u32) -> Self {
        RemoteStatus { pivots, rank }
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn pivots(&self) -> &StatusBitset {
        &self.pivots
    }

    pub fn is_symbol_pivot(&self, index: usize) -> bool {
        index < self.pivots.len() && self.pivots.get(index)
    }
}

/// Columns held locally and not yet held by the remote side.
struct UsefulPivots<'a> {
    local: &'a dyn PivotInfo,
    remote: Option<&'a RemoteStatus>,
}

impl PivotInfo for UsefulPivots<'_> {
    fn symbols(&self) -> usize {
        self.local.symbols()
    }

    fn rank(&self) -> usize {
        (0..self.symbols()).filter(|i| self.is_symbol_pivot(*i)).count()
    }

    fn is_symbol_pivot(&self, index: usize) -> bool {
        self.local.is_symbol_pivot(index)
            && !self.remote.map_or(false, |r| r.is_symbol_pivot(index))
    }
}

/// Wraps a generator and falls back to partial generation whenever a full
/// vector could reference columns that are unknown locally or already known
/// remotely.
#[derive(Debug)]
pub struct PivotAwareGenerator {
    inner: Box<dyn CoefficientGenerator>,
    remote: Option<RemoteStatus>,
}

impl PivotAwareGenerator {
    pub fn new(inner: Box<dyn CoefficientGenerator>) -> Self {
        PivotAwareGenerator { inner, remote: None }
    }

    /// Full generation is only useful with every column available locally
    /// and nothing reported by the remote side.
    pub fn can_generate(&self, local: &dyn PivotInfo) -> bool {
        let remote_empty = self.remote.as_ref().map_or(true, |r| r.rank() == 0);
        remote_empty && local.rank() == local.symbols()
    }

    pub fn can_generate_index(&self, local: &dyn PivotInfo, index: usize) -> bool {
        UsefulPivots { local, remote: self.remote.as_ref() }.is_symbol_pivot(index)
    }

    /// Fills `coefficients` with a full vector when possible, otherwise with
    /// a partial one over the useful columns only.
    pub fn generate(&mut self, coefficients: &mut [u8], local: &dyn PivotInfo) {
        if self.can_generate(local) {
            self.inner.generate(coefficients);
        } else {
            let useful = UsefulPivots { local, remote: self.remote.as_ref() };
            self.inner.generate_partial(coefficients, &useful);
        }
    }

    pub fn set_remote(&mut self, status: RemoteStatus) {
        trace!("remote rank {} recorded", status.rank());
        self.remote = Some(status);
    }

    pub fn remote(&self) -> Option<&RemoteStatus> {
        self.remote.as_ref()
    }

    pub fn initialize(&mut self, symbols: usize) {
        self.inner.initialize(symbols);
        self.remote = None;
    }

    pub fn seed(&mut self, seed: u32) {
        self.inner.seed(seed);
    }

    pub fn inner(&self) -> &dyn CoefficientGenerator {
        &*self.inner
    }

    pub fn inner_mut(&mut self) -> &mut dyn CoefficientGenerator {
        &mut *self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{self, FieldKind};
    use crate::generator::tests::nonzero_columns;
    use crate::generator::{PivotMask, UniformGenerator};

    fn generator() -> PivotAwareGenerator {
        let mut inner = UniformGenerator::new(field::build(FieldKind::Binary8));
        inner.initialize(8);
        PivotAwareGenerator::new(Box::new(inner))
    }

    #[test]
    fn full_rank_without_feedback_generates_fully() {
        let generator = generator();
        let full = PivotMask::from_fn(8, |_| true);
        let half = PivotMask::from_fn(8, |i| i < 4);
        assert!(generator.can_generate(&full));
        assert!(!generator.can_generate(&half));
        assert!(generator.can_generate_index(&half, 3));
        assert!(!generator.can_generate_index(&half, 4));
    }

    #[test]
    fn remote_pivots_are_pruned() {
        let mut generator = generator();
        let full = PivotMask::from_fn(8, |_| true);
        let mut bits = StatusBitset::new(8);
        for i in 0..6 {
            bits.set(i);
        }
        generator.set_remote(RemoteStatus::new(bits, 6));
        assert!(!generator.can_generate(&full));
        assert!(!generator.can_generate_index(&full, 2));

        let mut v = [0u8; 8];
        for seed in 0..10 {
            generator.seed(seed);
            generator.generate(&mut v, &full);
            assert!(nonzero_columns(FieldKind::Binary8, &v, 8)
                .iter()
                .all(|c| *c >= 6));
        }

        generator.initialize(8);
        assert!(generator.remote().is_none());
        assert!(generator.can_generate(&full));
    }
}
