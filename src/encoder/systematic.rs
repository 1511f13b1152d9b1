use crate::generator::PivotInfo;
use crate::storage::StatusBitset;

/// Tracks which source symbols were already sent uncoded.
///
/// Each available symbol is sent once, in index order. `start` only moves
/// forward past the prefix of sent symbols so the search stays short.
#[derive(Debug, Clone)]
pub struct SystematicPhase {
    sent: StatusBitset,
    start: usize,
    enabled: bool,
    default_on: bool,
}

impl SystematicPhase {
    pub fn new(default_on: bool) -> Self {
        SystematicPhase {
            sent: StatusBitset::new(0),
            start: 0,
            enabled: default_on,
            default_on,
        }
    }

    pub fn initialize(&mut self, symbols: usize) {
        self.sent.reset(symbols);
        self.start = 0;
        self.enabled = self.default_on;
    }

    pub fn is_systematic_on(&self) -> bool {
        self.enabled
    }

    pub fn set_systematic_on(&mut self) {
        self.enabled = true;
    }

    pub fn set_systematic_off(&mut self) {
        self.enabled = false;
    }

    /// Lowest-index symbol that is available and not yet sent.
    pub fn next_symbol(&self, available: &dyn PivotInfo) -> Option<usize> {
        (self.start..self.sent.len())
            .find(|i| !self.sent.get(*i) && available.is_symbol_pivot(*i))
    }

    pub fn in_systematic_phase(&self, available: &dyn PivotInfo) -> bool {
        self.enabled && self.next_symbol(available).is_some()
    }

    pub fn mark_sent(&mut self, index: usize) {
        self.sent.set(index);
        while self.start < self.sent.len() && self.sent.get(self.start) {
            self.start += 1;
        }
    }

    pub fn symbols_sent(&self) -> usize {
        self.sent.count_ones()
    }
}
