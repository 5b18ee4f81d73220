//! Model components: producers of local topology fragments.
//!
//! A model builds its particles, structure rows, and force-field terms with
//! ids scoped to itself (contiguous from 0) and answers selection queries
//! over those local ids. Everything global — id offsets, cross-model merge,
//! group derivation — happens downstream in [`crate::weave`].

use std::collections::BTreeSet;

use crate::model::fragment::{LocalId, TopologyFragment};
use crate::weave::resolver::SelectionQuery;

mod shell;
mod wlc;

pub use shell::shell;
pub use wlc::wlc;

/// One constructed model instance.
///
/// The fragment is produced once, at construction, and stays immutable;
/// `process_selection` must not mutate model state (resolution is
/// referentially transparent).
pub trait Model {
    /// Declared instance name.
    fn name(&self) -> &str;

    /// Component type tag.
    fn type_tag(&self) -> &str;

    /// The local topology this model produced at construction.
    fn fragment(&self) -> &TopologyFragment;

    /// Names of the model-defined selection predicates.
    fn selection_kinds(&self) -> &'static [&'static str];

    /// Resolves `query` to the set of matching local ids. Unmatched queries
    /// yield the empty set.
    fn process_selection(&self, query: &SelectionQuery) -> BTreeSet<LocalId>;
}

/// Handles the model-independent query variants: id membership and id
/// ranges, both clamped to the fragment's `0..particle_count` id space.
/// Returns `None` for predicate queries, which the model resolves itself.
pub fn intrinsic_selection(
    query: &SelectionQuery,
    particle_count: usize,
) -> Option<BTreeSet<LocalId>> {
    match query {
        SelectionQuery::All => Some((0..particle_count).collect()),
        SelectionQuery::ById(ids) => Some(
            ids.iter()
                .copied()
                .filter(|&id| id < particle_count)
                .collect(),
        ),
        SelectionQuery::ByIdRange { start, end } => {
            Some((*start..(*end).min(particle_count)).collect())
        }
        SelectionQuery::ByModel(_) | SelectionQuery::ByPredicate { .. } => None,
    }
}
