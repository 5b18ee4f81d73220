pub mod assembler;
pub mod composer;
pub mod contract;
pub mod error;
pub mod registry;
pub mod resolver;

pub use error::{
    AssemblyError, CompositionError, ConfigurationError, Error, SelectionError,
};
pub use registry::Registry;

use tracing::debug;

use crate::components::{ModelContext, StepContext};
use crate::model::description::SimulationDescription;
use crate::model::spec::{ComponentSpec, SimulationSpec};

fn single<'a>(
    section: &'static str,
    records: &'a [ComponentSpec],
) -> Result<&'a ComponentSpec, ConfigurationError> {
    match records {
        [record] => Ok(record),
        _ => Err(ConfigurationError::SectionCardinality {
            section,
            found: records.len(),
        }),
    }
}

/// Builds one simulation description from its specification tree.
///
/// Components are constructed top-down: units, types, and ensemble first,
/// then integrators, then every model (each producing its local topology
/// fragment), then the fragments are composed into the global topology, the
/// simulation steps resolve their selections against it, and the assembler
/// emits the final description. Any failure aborts this instance only.
pub fn weave(
    spec: &SimulationSpec,
    registry: &Registry,
) -> Result<SimulationDescription, Error> {
    let system = spec
        .system
        .iter()
        .map(|record| registry.system_factory(&record.type_tag)?(record))
        .collect::<Result<Vec<_>, Error>>()?;

    let units_spec = single("units", &spec.units)?;
    let units = registry.units_factory(&units_spec.type_tag)?(units_spec)?;

    let types_spec = single("types", &spec.types)?;
    let mut types = registry.types_factory(&types_spec.type_tag)?(types_spec)?;

    let ensemble_spec = single("ensemble", &spec.ensemble)?;
    let ensemble = registry.ensemble_factory(&ensemble_spec.type_tag)?(ensemble_spec)?;

    let integrators = spec
        .integrators
        .iter()
        .map(|record| registry.integrator_factory(&record.type_tag)?(record))
        .collect::<Result<Vec<_>, Error>>()?;

    let mut models = Vec::with_capacity(spec.models.len());
    for record in &spec.models {
        let factory = registry.model_factory(&record.type_tag)?;
        let mut ctx = ModelContext {
            units: &units,
            types: &mut types,
            ensemble: &ensemble,
        };
        models.push(factory(record, &mut ctx)?);
    }

    let topology = composer::compose(&models)?;
    debug!(
        models = models.len(),
        particles = topology.particle_count(),
        "global topology composed"
    );

    let ctx = StepContext {
        units: &units,
        types: &types,
        ensemble: &ensemble,
        topology: &topology,
        models: &models,
    };
    let steps = spec
        .simulation_steps
        .iter()
        .map(|record| registry.step_factory(&record.type_tag)?(record, &ctx))
        .collect::<Result<Vec<_>, Error>>()?;

    let description = assembler::assemble(
        &system,
        &units,
        &types,
        &ensemble,
        &integrators,
        topology,
        &steps,
    )?;
    debug!(name = ?description.name(), "simulation description assembled");

    Ok(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_spec() -> SimulationSpec {
        serde_json::from_value(json!({
            "system": [{"type": "simulationName",
                        "parameters": {"simulationName": "twoChains"}}],
            "units": [{"type": "KcalMol_A"}],
            "types": [{"type": "basic"}],
            "ensemble": [{"type": "NVT",
                          "parameters": {"box": [200.0, 200.0, 200.0],
                                         "temperature": 300.0}}],
            "integrators": [{"type": "BBK",
                             "parameters": {"timeStep": 0.02,
                                            "frictionConstant": 0.2,
                                            "integrationSteps": 1000000}}],
            "models": [
                {"type": "WLC", "name": "chainA", "parameters": {"N": 3}},
                {"type": "WLC", "name": "chainB", "parameters": {"N": 2}}
            ],
            "simulationSteps": [
                {"type": "saveState",
                 "parameters": {"intervalStep": 10000,
                                "outputFilePath": "traj",
                                "outputFormat": "sp",
                                "selection": {"model": [1]}}},
                {"type": "info", "parameters": {"intervalStep": 10000}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn builds_a_complete_description() {
        let description = weave(&full_spec(), &Registry::builtin()).unwrap();

        assert_eq!(description.name(), Some("twoChains"));
        assert_eq!(description.particle_count(), 5);

        // second chain's bond [0, 1] re-indexed past the first chain
        let bonds = &description.force_field["bonds"];
        let data = bonds.data.as_ref().unwrap();
        assert_eq!(data[2][0], json!(3));
        assert_eq!(data[2][1], json!(4));

        // the model-scoped selection became the step's group
        let group = &description.simulation_steps["groupsaveState"];
        assert_eq!(group.data.as_ref().unwrap()[0][2], json!([3, 4]));

        assert_eq!(description.integrators["BBK"].parameters["integrationSteps"], json!(1000000));
    }

    #[test]
    fn section_cardinality_is_enforced() {
        let mut spec = full_spec();
        spec.units.clear();
        let result = weave(&spec, &Registry::builtin());
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::SectionCardinality {
                section: "units",
                found: 0
            }))
        ));
    }

    #[test]
    fn unknown_model_type_is_reported() {
        let mut spec = full_spec();
        spec.models[0].type_tag = "MADna".to_string();
        let result = weave(&spec, &Registry::builtin());
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::UnknownComponentType {
                category: "models",
                ..
            }))
        ));
    }

    #[test]
    fn model_parameter_mistakes_abort_the_instance() {
        let mut spec = full_spec();
        spec.models[0]
            .parameters
            .insert("stiffness".to_string(), json!(4.0));
        assert!(weave(&spec, &Registry::builtin()).is_err());
    }
}
