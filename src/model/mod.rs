//! Core data structures flowing through `simweave`:
//!
//! - [`spec`] – The input specification tree: per-section `{type, parameters}`
//!   component records, immutable once parsed.
//! - [`fragment`] – Local topology (state, structure, force field) produced by
//!   one model instance with ids scoped to that model.
//! - [`topology`] – The merged global topology and the id ledger mapping
//!   global id ranges back to their owning models.
//! - [`description`] – The final emittable simulation description and the
//!   selection-derived particle groups folded into it.
//!
//! The data model intentionally separates what a model *produces*
//! ([`TopologyFragment`]) from what the engine *consumes*
//! ([`SimulationDescription`]), letting the [`crate::weave`] pipeline
//! re-index, merge, and validate in between.
//!
//! [`TopologyFragment`]: fragment::TopologyFragment
//! [`SimulationDescription`]: description::SimulationDescription

pub mod description;
pub mod fragment;
pub mod spec;
pub mod topology;
