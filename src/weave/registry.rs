//! Component registry: the explicit type-tag → factory tables.
//!
//! Discovery is a process-start registration, never a filesystem scan: the
//! built-in table is assembled by [`Registry::builtin`], and embedders add
//! their own implementations through the `register_*` methods. Each category
//! is enumerable, so a spec's type tags can be checked up front.

use std::collections::HashMap;

use crate::components::ensemble::{nvt_ensemble, EnsembleDef};
use crate::components::integrators::{bbk, euler_maruyama, IntegratorDef};
use crate::components::models::{shell, wlc, Model};
use crate::components::steps::{info, save_state, thermodynamic_measurement, SimulationStep};
use crate::components::system::{backup, simulation_name, SystemRecord};
use crate::components::types::{basic_types, ParticleTypes};
use crate::components::units::{kcalmol_a_units, none_units, UnitsDef};
use crate::components::{ModelContext, StepContext};
use crate::model::spec::ComponentSpec;
use crate::pool::{one_distributor, size_distributor, Distributor};
use crate::weave::error::{ConfigurationError, Error};

pub type SystemFactory = fn(&ComponentSpec) -> Result<SystemRecord, Error>;
pub type UnitsFactory = fn(&ComponentSpec) -> Result<UnitsDef, Error>;
pub type TypesFactory = fn(&ComponentSpec) -> Result<ParticleTypes, Error>;
pub type EnsembleFactory = fn(&ComponentSpec) -> Result<EnsembleDef, Error>;
pub type IntegratorFactory = fn(&ComponentSpec) -> Result<IntegratorDef, Error>;
pub type ModelFactory =
    fn(&ComponentSpec, &mut ModelContext<'_>) -> Result<Box<dyn Model>, Error>;
pub type StepFactory =
    fn(&ComponentSpec, &StepContext<'_>) -> Result<Box<dyn SimulationStep>, Error>;
pub type DistributorFactory = fn(&ComponentSpec) -> Result<Box<dyn Distributor>, Error>;

/// Factory tables for every component category.
#[derive(Default)]
pub struct Registry {
    system: HashMap<String, SystemFactory>,
    units: HashMap<String, UnitsFactory>,
    types: HashMap<String, TypesFactory>,
    ensembles: HashMap<String, EnsembleFactory>,
    integrators: HashMap<String, IntegratorFactory>,
    models: HashMap<String, ModelFactory>,
    steps: HashMap<String, StepFactory>,
    distributors: HashMap<String, DistributorFactory>,
}

fn lookup<'a, F>(
    table: &'a HashMap<String, F>,
    category: &'static str,
    type_tag: &str,
) -> Result<&'a F, ConfigurationError> {
    table
        .get(type_tag)
        .ok_or_else(|| ConfigurationError::UnknownComponentType {
            category,
            type_tag: type_tag.to_string(),
        })
}

impl Registry {
    /// An empty registry with no components at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry of built-in components.
    pub fn builtin() -> Self {
        let mut registry = Self::default();

        registry.register_system("simulationName", simulation_name);
        registry.register_system("backup", backup);

        registry.register_units("none", none_units);
        registry.register_units("KcalMol_A", kcalmol_a_units);

        registry.register_types("basic", basic_types);

        registry.register_ensemble("NVT", nvt_ensemble);

        registry.register_integrator("BBK", bbk);
        registry.register_integrator("EulerMaruyama", euler_maruyama);

        registry.register_model("WLC", wlc);
        registry.register_model("SHELL", shell);

        registry.register_step("saveState", save_state);
        registry.register_step("info", info);
        registry.register_step("thermodynamicMeasurement", thermodynamic_measurement);

        registry.register_distributor("one", one_distributor);
        registry.register_distributor("size", size_distributor);

        registry
    }

    pub fn register_system(&mut self, type_tag: impl Into<String>, factory: SystemFactory) {
        self.system.insert(type_tag.into(), factory);
    }

    pub fn register_units(&mut self, type_tag: impl Into<String>, factory: UnitsFactory) {
        self.units.insert(type_tag.into(), factory);
    }

    pub fn register_types(&mut self, type_tag: impl Into<String>, factory: TypesFactory) {
        self.types.insert(type_tag.into(), factory);
    }

    pub fn register_ensemble(&mut self, type_tag: impl Into<String>, factory: EnsembleFactory) {
        self.ensembles.insert(type_tag.into(), factory);
    }

    pub fn register_integrator(&mut self, type_tag: impl Into<String>, factory: IntegratorFactory) {
        self.integrators.insert(type_tag.into(), factory);
    }

    pub fn register_model(&mut self, type_tag: impl Into<String>, factory: ModelFactory) {
        self.models.insert(type_tag.into(), factory);
    }

    pub fn register_step(&mut self, type_tag: impl Into<String>, factory: StepFactory) {
        self.steps.insert(type_tag.into(), factory);
    }

    pub fn register_distributor(
        &mut self,
        type_tag: impl Into<String>,
        factory: DistributorFactory,
    ) {
        self.distributors.insert(type_tag.into(), factory);
    }

    pub fn system_factory(&self, type_tag: &str) -> Result<&SystemFactory, ConfigurationError> {
        lookup(&self.system, "system", type_tag)
    }

    pub fn units_factory(&self, type_tag: &str) -> Result<&UnitsFactory, ConfigurationError> {
        lookup(&self.units, "units", type_tag)
    }

    pub fn types_factory(&self, type_tag: &str) -> Result<&TypesFactory, ConfigurationError> {
        lookup(&self.types, "types", type_tag)
    }

    pub fn ensemble_factory(&self, type_tag: &str) -> Result<&EnsembleFactory, ConfigurationError> {
        lookup(&self.ensembles, "ensemble", type_tag)
    }

    pub fn integrator_factory(
        &self,
        type_tag: &str,
    ) -> Result<&IntegratorFactory, ConfigurationError> {
        lookup(&self.integrators, "integrators", type_tag)
    }

    pub fn model_factory(&self, type_tag: &str) -> Result<&ModelFactory, ConfigurationError> {
        lookup(&self.models, "models", type_tag)
    }

    pub fn step_factory(&self, type_tag: &str) -> Result<&StepFactory, ConfigurationError> {
        lookup(&self.steps, "simulationSteps", type_tag)
    }

    pub fn distributor_factory(
        &self,
        type_tag: &str,
    ) -> Result<&DistributorFactory, ConfigurationError> {
        lookup(&self.distributors, "distributors", type_tag)
    }

    /// Registered type tags of one category, sorted for stable enumeration.
    pub fn registered_models(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.models.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn registered_steps(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.steps.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_covers_the_component_families() {
        let registry = Registry::builtin();

        assert!(registry.units_factory("none").is_ok());
        assert!(registry.units_factory("KcalMol_A").is_ok());
        assert!(registry.ensemble_factory("NVT").is_ok());
        assert!(registry.integrator_factory("BBK").is_ok());
        assert!(registry.model_factory("WLC").is_ok());
        assert!(registry.step_factory("saveState").is_ok());
        assert!(registry.distributor_factory("size").is_ok());

        assert_eq!(registry.registered_models(), ["SHELL", "WLC"]);
        assert_eq!(
            registry.registered_steps(),
            ["info", "saveState", "thermodynamicMeasurement"]
        );
    }

    #[test]
    fn unknown_type_tags_name_their_category() {
        let registry = Registry::builtin();
        let err = registry.model_factory("MADna").unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnknownComponentType { category: "models", .. }
        ));
        assert!(err.to_string().contains("'MADna'"));
    }

    #[test]
    fn custom_components_can_be_registered() {
        let mut registry = Registry::empty();
        assert!(registry.model_factory("WLC").is_err());

        registry.register_model("WLC", crate::components::models::wlc);
        assert!(registry.model_factory("WLC").is_ok());
    }
}
