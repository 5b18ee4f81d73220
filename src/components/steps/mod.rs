//! Simulation-step components.
//!
//! [`StepCore`] carries the behavior every step shares: the common schedule
//! parameters (`intervalStep` required, `startStep`/`endStep` optional) are
//! folded into the contract, declared selections are resolved against the
//! composed topology at construction time, and a step may restrict itself
//! to a named subset of ids by folding selections into a [`Group`].
//!
//! Concrete steps wrap a core plus their own `{type, parameters}` payload.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use super::StepContext;
use crate::model::description::{DescriptionEntry, Group};
use crate::model::spec::ComponentSpec;
use crate::model::topology::GlobalId;
use crate::weave::contract::{ContractSets, ParameterContract};
use crate::weave::error::{Error, SelectionError};
use crate::weave::resolver::{resolve, SelectionQuery};

mod info;
mod save_state;
mod thermo;

pub use info::info;
pub use save_state::save_state;
pub use thermo::thermodynamic_measurement;

/// One constructed simulation step.
pub trait SimulationStep {
    fn core(&self) -> &StepCore;

    /// The step's own `{type, parameters}` record, without the schedule
    /// parameters (the core injects those).
    fn descriptor(&self) -> DescriptionEntry;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn type_tag(&self) -> &str {
        self.core().type_tag()
    }

    fn group(&self) -> Option<&Group> {
        self.core().group()
    }

    /// The emittable record: descriptor plus injected schedule parameters.
    fn entry(&self) -> DescriptionEntry {
        let mut entry = self.descriptor();
        self.core().inject_schedule(&mut entry.parameters);
        entry
    }
}

/// Shared state and behavior of every simulation step.
#[derive(Debug)]
pub struct StepCore {
    contract: ParameterContract,
    interval_step: u64,
    start_step: Option<u64>,
    end_step: Option<u64>,
    selections: IndexMap<String, BTreeSet<GlobalId>>,
    group: Option<Group>,
}

impl StepCore {
    /// Validates the step contract (with the common schedule parameters
    /// folded in) and resolves every supplied selection.
    pub fn new(
        spec: &ComponentSpec,
        mut sets: ContractSets,
        ctx: &StepContext<'_>,
    ) -> Result<Self, Error> {
        sets.add_available_parameters(&["intervalStep", "startStep", "endStep"]);
        sets.add_required_parameters(&["intervalStep"]);

        let contract = ParameterContract::new(spec, sets)?;

        let interval_step = contract.get("intervalStep")?;
        let start_step = contract.get_opt("startStep")?;
        let end_step = contract.get_opt("endStep")?;

        let mut selections = IndexMap::new();
        for (key, value) in contract.supplied_selections() {
            let query = SelectionQuery::from_value(value)?;
            let ids = resolve(&query, ctx.models, &ctx.topology.ledger)?;
            debug!(
                step = contract.name(),
                selection = key,
                count = ids.len(),
                "step selection resolved"
            );
            selections.insert(key.to_string(), ids);
        }

        Ok(Self {
            contract,
            interval_step,
            start_step,
            end_step,
            selections,
            group: None,
        })
    }

    pub fn name(&self) -> &str {
        self.contract.name()
    }

    pub fn type_tag(&self) -> &str {
        self.contract.type_tag()
    }

    pub fn contract(&self) -> &ParameterContract {
        &self.contract
    }

    pub fn interval_step(&self) -> u64 {
        self.interval_step
    }

    /// Names of the selections this step resolved, in supply order.
    pub fn declared_selections(&self) -> impl Iterator<Item = &str> {
        self.selections.keys().map(String::as_str)
    }

    pub fn selection(&self, name: &str) -> Option<&BTreeSet<GlobalId>> {
        self.selections.get(name)
    }

    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    /// Folds the named selections into this step's group.
    ///
    /// Selections that were declared available but not supplied contribute
    /// nothing; an all-empty union skips group creation entirely, so no
    /// degenerate group ever reaches the engine.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NotDeclared`] when a name is outside the step's
    /// available selections.
    pub fn set_group(&mut self, names: &[&str]) -> Result<(), SelectionError> {
        for &name in names {
            if !self.contract.declares_selection(name) {
                return Err(SelectionError::NotDeclared {
                    name: self.contract.name().to_string(),
                    type_tag: self.contract.type_tag().to_string(),
                    selection: name.to_string(),
                });
            }
        }

        let sources: Vec<String> = names
            .iter()
            .filter(|name| self.selections.contains_key(**name))
            .map(|name| name.to_string())
            .collect();

        let ids: BTreeSet<GlobalId> = sources
            .iter()
            .flat_map(|name| self.selections[name].iter().copied())
            .collect();

        if ids.is_empty() {
            warn!(step = self.contract.name(), "empty selection, skipping group");
            return Ok(());
        }

        self.group = Some(Group::new(self.contract.name(), ids, sources));
        Ok(())
    }

    /// Injects the common schedule parameters into an emitted record.
    pub(crate) fn inject_schedule(&self, parameters: &mut IndexMap<String, Value>) {
        parameters.insert("intervalStep".to_string(), Value::from(self.interval_step));
        if let Some(start) = self.start_step {
            parameters.insert("startStep".to_string(), Value::from(start));
        }
        if let Some(end) = self.end_step {
            parameters.insert("endStep".to_string(), Value::from(end));
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::components::ensemble::{nvt_ensemble, EnsembleDef};
    use crate::components::models::{wlc, Model};
    use crate::components::types::{basic_types, ParticleTypes};
    use crate::components::units::{none_units, UnitsDef};
    use crate::components::ModelContext;
    use crate::model::topology::GlobalTopology;
    use crate::weave::composer::compose;
    use serde_json::json;

    /// A composed one-chain world the step tests can borrow from.
    pub struct World {
        pub units: UnitsDef,
        pub types: ParticleTypes,
        pub ensemble: EnsembleDef,
        pub models: Vec<Box<dyn Model>>,
        pub topology: GlobalTopology,
    }

    impl World {
        pub fn with_chain(n: usize) -> Self {
            let units = none_units(&ComponentSpec::new("none")).unwrap();
            let mut types = basic_types(&ComponentSpec::new("basic")).unwrap();
            let ensemble = nvt_ensemble(
                &ComponentSpec::new("NVT")
                    .with_parameter("box", json!([100.0, 100.0, 100.0]))
                    .with_parameter("temperature", 1.0),
            )
            .unwrap();

            let spec = ComponentSpec::named("WLC", "chain").with_parameter("N", n);
            let model = wlc(
                &spec,
                &mut ModelContext {
                    units: &units,
                    types: &mut types,
                    ensemble: &ensemble,
                },
            )
            .unwrap();

            let models = vec![model];
            let topology = compose(&models).unwrap();

            Self {
                units,
                types,
                ensemble,
                models,
                topology,
            }
        }

        pub fn step_ctx(&self) -> StepContext<'_> {
            StepContext {
                units: &self.units,
                types: &self.types,
                ensemble: &self.ensemble,
                topology: &self.topology,
                models: &self.models,
            }
        }
    }
}
