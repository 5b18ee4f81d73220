//! Final assembly of one simulation description.
//!
//! Folds the validated section components, the composed topology, and the
//! constructed steps into a single [`SimulationDescription`]. Section order
//! is fixed (system, units, types, ensemble, integrators, topology, steps)
//! and steps keep their declaration order; the engine consumes both through
//! mapping-key iteration. A step that restricted itself to a group gets the
//! group's name injected under the reserved `group` parameter key and its
//! declaration appended under `group<stepName>` — group entries are keyed
//! per step, never deduplicated by content.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::error::AssemblyError;
use crate::components::ensemble::EnsembleDef;
use crate::components::integrators::IntegratorDef;
use crate::components::steps::SimulationStep;
use crate::components::system::SystemRecord;
use crate::components::types::ParticleTypes;
use crate::components::units::UnitsDef;
use crate::model::description::{DescriptionEntry, SimulationDescription};
use crate::model::topology::GlobalTopology;

pub fn assemble(
    system: &[SystemRecord],
    units: &UnitsDef,
    types: &ParticleTypes,
    ensemble: &EnsembleDef,
    integrators: &[IntegratorDef],
    topology: GlobalTopology,
    steps: &[Box<dyn SimulationStep>],
) -> Result<SimulationDescription, AssemblyError> {
    let names_found = system
        .iter()
        .filter(|record| record.simulation_name().is_some())
        .count();
    if names_found != 1 {
        return Err(AssemblyError::SimulationNameCardinality { found: names_found });
    }

    if !steps.is_empty() && topology.ledger.is_empty() {
        return Err(AssemblyError::EmptyTopology);
    }

    let mut system_entries = IndexMap::new();
    for record in system {
        if system_entries
            .insert(record.name().to_string(), record.entry().clone())
            .is_some()
        {
            return Err(AssemblyError::DuplicateName {
                kind: "system record",
                name: record.name().to_string(),
            });
        }
    }

    let mut integrator_entries = IndexMap::new();
    for integrator in integrators {
        let mut entry = integrator.entry();
        entry.parameters.insert(
            "integrationSteps".to_string(),
            Value::from(integrator.integration_steps()),
        );
        if integrator_entries
            .insert(integrator.name().to_string(), entry)
            .is_some()
        {
            return Err(AssemblyError::DuplicateName {
                kind: "integrator",
                name: integrator.name().to_string(),
            });
        }
    }

    let mut step_entries: IndexMap<String, DescriptionEntry> = IndexMap::new();
    for step in steps {
        if step_entries.contains_key(step.name()) {
            return Err(AssemblyError::DuplicateName {
                kind: "simulation step",
                name: step.name().to_string(),
            });
        }

        let mut entry = step.entry();

        if let Some(group) = step.group() {
            for source in group.sources() {
                if step.core().selection(source).is_none() {
                    return Err(AssemblyError::GroupSelectionMissing {
                        step: step.name().to_string(),
                        selection: source.clone(),
                    });
                }
            }

            entry
                .parameters
                .insert("group".to_string(), Value::from(group.name().to_string()));
            step_entries.insert(step.name().to_string(), entry);
            step_entries.insert(format!("group{}", group.name()), group.declaration());
            debug!(step = step.name(), ids = group.ids().len(), "step group attached");
        } else {
            step_entries.insert(step.name().to_string(), entry);
        }
    }

    let state = topology.state_block();
    let structure = topology.structure_block();
    let force_field = topology.force_field_entries();

    Ok(SimulationDescription {
        system: system_entries,
        units: units.entry(),
        types: types.entry(),
        ensemble: ensemble.entry(),
        integrators: integrator_entries,
        state,
        structure,
        force_field,
        simulation_steps: step_entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::steps::test_support::World;
    use crate::components::steps::{save_state, thermodynamic_measurement};
    use crate::components::system::{backup, simulation_name};
    use crate::model::spec::ComponentSpec;
    use serde_json::json;

    fn system_records() -> Vec<SystemRecord> {
        vec![
            simulation_name(
                &ComponentSpec::new("simulationName").with_parameter("simulationName", "test"),
            )
            .unwrap(),
            backup(&ComponentSpec::new("backup").with_parameter("backupIntervalStep", 1000))
                .unwrap(),
        ]
    }

    fn save_spec(name: &str) -> ComponentSpec {
        ComponentSpec::named("saveState", name)
            .with_parameter("intervalStep", 100)
            .with_parameter("outputFilePath", "traj")
            .with_parameter("outputFormat", "sp")
    }

    #[test]
    fn sections_keep_contract_order() {
        let world = World::with_chain(4);
        let steps = vec![save_state(&save_spec("saveState"), &world.step_ctx()).unwrap()];

        let description = assemble(
            &system_records(),
            &world.units,
            &world.types,
            &world.ensemble,
            &[],
            world.topology.clone(),
            &steps,
        )
        .unwrap();

        let value = serde_json::to_value(&description).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "system",
                "units",
                "types",
                "ensemble",
                "integrators",
                "state",
                "structure",
                "forceField",
                "simulationSteps"
            ]
        );
        assert_eq!(description.name(), Some("test"));
        assert_eq!(description.particle_count(), 4);
    }

    #[test]
    fn grouped_step_gets_reference_and_declaration() {
        let world = World::with_chain(10);
        let spec = save_spec("saveState")
            .with_parameter("selection", json!({"idRange": {"start": 0, "end": 4}}));
        let steps = vec![save_state(&spec, &world.step_ctx()).unwrap()];

        let description = assemble(
            &system_records(),
            &world.units,
            &world.types,
            &world.ensemble,
            &[],
            world.topology.clone(),
            &steps,
        )
        .unwrap();

        let step = &description.simulation_steps["saveState"];
        assert_eq!(step.parameters["group"], json!("saveState"));

        let declaration = &description.simulation_steps["groupsaveState"];
        let value = serde_json::to_value(declaration).unwrap();
        assert_eq!(value["data"][0][0], "saveState");
        assert_eq!(value["data"][0][2], json!([0, 1, 2, 3]));
    }

    #[test]
    fn equal_selections_still_get_distinct_group_entries() {
        let world = World::with_chain(6);
        let selection = json!({"idRange": {"start": 0, "end": 6}});

        let steps = vec![
            save_state(
                &save_spec("firstWriter").with_parameter("selection", selection.clone()),
                &world.step_ctx(),
            )
            .unwrap(),
            thermodynamic_measurement(
                &ComponentSpec::named("thermodynamicMeasurement", "thermo")
                    .with_parameter("intervalStep", 100)
                    .with_parameter("outputFilePath", "thermo.dat")
                    .with_parameter("selection", selection),
                &world.step_ctx(),
            )
            .unwrap(),
        ];

        let description = assemble(
            &system_records(),
            &world.units,
            &world.types,
            &world.ensemble,
            &[],
            world.topology.clone(),
            &steps,
        )
        .unwrap();

        assert!(description.simulation_steps.contains_key("groupfirstWriter"));
        assert!(description.simulation_steps.contains_key("groupthermo"));
        let keys: Vec<&str> = description
            .simulation_steps
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            ["firstWriter", "groupfirstWriter", "thermo", "groupthermo"]
        );
    }

    #[test]
    fn ungrouped_step_emits_no_group_key() {
        let world = World::with_chain(4);
        let steps = vec![save_state(&save_spec("saveState"), &world.step_ctx()).unwrap()];

        let description = assemble(
            &system_records(),
            &world.units,
            &world.types,
            &world.ensemble,
            &[],
            world.topology.clone(),
            &steps,
        )
        .unwrap();

        assert!(!description.simulation_steps["saveState"]
            .parameters
            .contains_key("group"));
        assert_eq!(description.simulation_steps.len(), 1);
    }

    #[test]
    fn missing_simulation_name_is_rejected() {
        let world = World::with_chain(4);
        let records =
            vec![backup(&ComponentSpec::new("backup").with_parameter("backupIntervalStep", 10))
                .unwrap()];

        let result = assemble(
            &records,
            &world.units,
            &world.types,
            &world.ensemble,
            &[],
            world.topology.clone(),
            &[],
        );
        assert!(matches!(
            result,
            Err(AssemblyError::SimulationNameCardinality { found: 0 })
        ));
    }

    #[test]
    fn steps_against_empty_topology_are_rejected() {
        let world = World::with_chain(4);
        let steps = vec![save_state(&save_spec("saveState"), &world.step_ctx()).unwrap()];

        let result = assemble(
            &system_records(),
            &world.units,
            &world.types,
            &world.ensemble,
            &[],
            GlobalTopology::default(),
            &steps,
        );
        assert!(matches!(result, Err(AssemblyError::EmptyTopology)));
    }

    #[test]
    fn duplicate_step_names_are_rejected() {
        let world = World::with_chain(4);
        let steps = vec![
            save_state(&save_spec("writer"), &world.step_ctx()).unwrap(),
            save_state(&save_spec("writer"), &world.step_ctx()).unwrap(),
        ];

        let result = assemble(
            &system_records(),
            &world.units,
            &world.types,
            &world.ensemble,
            &[],
            world.topology.clone(),
            &steps,
        );
        assert!(matches!(
            result,
            Err(AssemblyError::DuplicateName { kind: "simulation step", .. })
        ));
    }
}
