//! A pure Rust library for building declarative molecular-dynamics
//! simulation descriptions from reusable, independently-validated
//! components. It validates every component against its schema contract,
//! composes per-model topology fragments into one globally consistent
//! topology, resolves named particle selections across models, and emits
//! self-contained descriptions ready for an external simulation engine.
//!
//! # Features
//!
//! - **Schema contracts** — Every component instance declares its available
//!   and required parameters and selections; violations are caught once, at
//!   construction, with the offending component and key named
//! - **Model composition** — Per-model fragments merge in declaration order
//!   with global id re-indexing, force-field terms concatenated by kind,
//!   and an id ledger mapping every id range back to its model
//! - **Selection resolution** — Named queries (by id, id range, model, or
//!   model-defined predicate) resolve to global id sets over the composed
//!   topology; steps fold selections into named particle groups
//! - **Pool batching** — Many independent specifications build into many
//!   independent descriptions; one invalid instance never blocks the rest
//!
//! # Quick Start
//!
//! The main entry point is the [`weave`] function, which takes a
//! [`SimulationSpec`] and a component [`Registry`] and produces a
//! [`SimulationDescription`]:
//!
//! ```
//! use simweave::{weave, Registry, SimulationSpec};
//! use serde_json::json;
//!
//! // Two worm-like chains in an NVT box, with a trajectory writer
//! // restricted to the second chain.
//! let spec: SimulationSpec = serde_json::from_value(json!({
//!     "system": [{"type": "simulationName",
//!                 "parameters": {"simulationName": "twoChains"}}],
//!     "units": [{"type": "KcalMol_A"}],
//!     "types": [{"type": "basic"}],
//!     "ensemble": [{"type": "NVT",
//!                   "parameters": {"box": [200.0, 200.0, 200.0],
//!                                  "temperature": 300.0}}],
//!     "integrators": [{"type": "BBK",
//!                      "parameters": {"timeStep": 0.02,
//!                                     "frictionConstant": 0.2,
//!                                     "integrationSteps": 1000000}}],
//!     "models": [
//!         {"type": "WLC", "name": "chainA", "parameters": {"N": 3}},
//!         {"type": "WLC", "name": "chainB", "parameters": {"N": 2}}
//!     ],
//!     "simulationSteps": [
//!         {"type": "saveState",
//!          "parameters": {"intervalStep": 10000,
//!                         "outputFilePath": "traj",
//!                         "outputFormat": "sp",
//!                         "selection": {"model": [1]}}},
//!         {"type": "info", "parameters": {"intervalStep": 10000}}
//!     ]
//! }))?;
//!
//! let registry = Registry::builtin();
//! let description = weave(&spec, &registry)?;
//!
//! // Chains compose in declaration order: 3 + 2 particles.
//! assert_eq!(description.particle_count(), 5);
//!
//! // chainB's ids were re-indexed past chainA, so the write step's group
//! // covers global ids {3, 4}.
//! let group = &description.simulation_steps["groupsaveState"];
//! assert_eq!(group.data.as_ref().unwrap()[0][2], json!([3, 4]));
//!
//! // The step itself now references its group by name.
//! let writer = &description.simulation_steps["saveState"];
//! assert_eq!(writer.parameters["group"], json!("saveState"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`model`] — Data model: specification trees, topology fragments, the
//!   global topology, and the emitted description
//! - [`weave`](mod@weave) — The pipeline: schema contract, component
//!   registry, selection resolver, model composer, and assembler
//! - [`components`] — Built-in component implementations (units, types,
//!   ensembles, integrators, models, simulation steps)
//! - [`pool`] — Simulation pools and batch distribution strategies
//! - [`io`] — JSON parsing of specifications and serialization of
//!   descriptions
//!
//! # Data Types
//!
//! ## Input
//!
//! - [`SimulationSpec`] — One instance's specification tree
//! - [`ComponentSpec`] — One `{type, name, parameters}` record
//!
//! ## Topology
//!
//! - [`TopologyFragment`] — A model's local state, structure, and
//!   force-field terms
//! - [`GlobalTopology`] — The merged, globally-id-unique topology
//! - [`IdLedger`] — Ordered global-id-range → model mapping
//!
//! ## Output
//!
//! - [`SimulationDescription`] — The final emittable description
//! - [`Group`] — A named snapshot of a resolved selection, attached to one
//!   simulation step
//!
//! ## Errors
//!
//! - [`ConfigurationError`] — Contract violations at construction
//! - [`SelectionError`] — Unsatisfiable selection requests
//! - [`CompositionError`] — Fragment or force-field merge inconsistencies
//! - [`AssemblyError`] — Ordering and reference mistakes at assembly

pub mod components;
pub mod io;
pub mod model;
pub mod pool;
pub mod weave;

pub use model::description::{DescriptionEntry, Group, LabeledBlock, SimulationDescription};
pub use model::fragment::{
    ForceFieldTerm, InteractionKind, LocalId, StateBlock, StructureRow, TopologyFragment,
};
pub use model::spec::{ComponentSpec, SimulationSpec};
pub use model::topology::{GlobalId, GlobalTopology, IdLedger, LedgerEntry};

pub use weave::contract::{ContractSets, ParameterContract};
pub use weave::resolver::SelectionQuery;
pub use weave::{
    weave, AssemblyError, CompositionError, ConfigurationError, Error, Registry, SelectionError,
};

pub use components::models::Model;
pub use components::steps::SimulationStep;
pub use components::{ModelContext, StepContext};

pub use pool::{Batch, Distributor, SimulationPool};
