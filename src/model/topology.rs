use std::ops::Range;

use indexmap::IndexMap;

use super::fragment::{ForceFieldTerm, StateBlock, StructureRow};

pub type GlobalId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub start: GlobalId,
    pub end: GlobalId,
    pub model: usize,
}

/// Ordered mapping from global id ranges to the model that owns them.
///
/// Ranges are half-open, disjoint, and appended in composition order, so
/// lookups are deterministic for a given [`GlobalTopology`]. The ledger is
/// what lets the selection resolver scope a query to the owning model and
/// translate between global and model-local ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdLedger {
    entries: Vec<LedgerEntry>,
}

impl IdLedger {
    pub(crate) fn push(&mut self, start: GlobalId, end: GlobalId, model: usize) {
        debug_assert!(start <= end);
        debug_assert!(self.entries.last().map_or(true, |e| e.end <= start));
        self.entries.push(LedgerEntry { start, end, model });
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    #[inline]
    pub fn model_count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of particles covered by the ledger.
    pub fn total_particles(&self) -> usize {
        self.entries.last().map_or(0, |e| e.end)
    }

    /// Index of the model owning `id`, or `None` when `id` is out of range.
    pub fn model_of(&self, id: GlobalId) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.start <= id && id < e.end)
            .map(|e| e.model)
    }

    /// Global id range owned by model `model`.
    pub fn range_of(&self, model: usize) -> Option<Range<GlobalId>> {
        self.entries
            .iter()
            .find(|e| e.model == model)
            .map(|e| e.start..e.end)
    }
}

/// Merged, globally-id-unique topology across all composed models.
/// Built once by the composer and read-only thereafter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalTopology {
    pub state: StateBlock,
    pub structure: Vec<StructureRow>,
    pub force_field: IndexMap<String, ForceFieldTerm>,
    pub ledger: IdLedger,
}

impl GlobalTopology {
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.state.len()
    }
}
