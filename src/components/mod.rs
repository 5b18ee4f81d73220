//! Built-in component implementations, grouped by the section of the
//! simulation description they contribute to.
//!
//! Every component validates itself against the schema contract at
//! construction ([`crate::weave::contract`]); the closed categories (units,
//! types, ensemble, integrators, system records) construct into plain typed
//! values, while the open-ended categories (models, simulation steps)
//! construct into trait objects so embedders can register their own.

pub mod ensemble;
pub mod integrators;
pub mod models;
pub mod steps;
pub mod system;
pub mod types;
pub mod units;

use crate::model::topology::GlobalTopology;

/// Construction context handed to model factories. Models read the unit
/// constants and ensemble components, and register the particle types they
/// use.
pub struct ModelContext<'a> {
    pub units: &'a units::UnitsDef,
    pub types: &'a mut types::ParticleTypes,
    pub ensemble: &'a ensemble::EnsembleDef,
}

/// Construction context handed to simulation-step factories, after every
/// model has been composed. Steps resolve their declared selections against
/// the composed topology here.
pub struct StepContext<'a> {
    pub units: &'a units::UnitsDef,
    pub types: &'a types::ParticleTypes,
    pub ensemble: &'a ensemble::EnsembleDef,
    pub topology: &'a GlobalTopology,
    pub models: &'a [Box<dyn models::Model>],
}
