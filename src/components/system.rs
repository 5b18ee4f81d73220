use crate::model::description::DescriptionEntry;
use crate::model::fragment::InteractionKind;
use crate::model::spec::ComponentSpec;
use crate::weave::contract::{ContractSets, ParameterContract};
use crate::weave::error::Error;

/// One record of the description's `system` section: free-form simulation
/// metadata. The record carrying the simulation name is special-cased so
/// the assembler can require exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemRecord {
    name: String,
    entry: DescriptionEntry,
    simulation_name: Option<String>,
}

impl SystemRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &DescriptionEntry {
        &self.entry
    }

    pub fn simulation_name(&self) -> Option<&str> {
        self.simulation_name.as_deref()
    }
}

/// The simulation's declared name; the engine addresses outputs by it.
pub fn simulation_name(spec: &ComponentSpec) -> Result<SystemRecord, Error> {
    let contract = ParameterContract::new(
        spec,
        ContractSets::parameters(&["simulationName"], &["simulationName"]),
    )?;

    let name: String = contract.get("simulationName")?;
    let entry = DescriptionEntry::new(InteractionKind::new("Simulation", "Information"))
        .with_parameter("simulationName", name.clone());

    Ok(SystemRecord {
        name: contract.name().to_string(),
        entry,
        simulation_name: Some(name),
    })
}

/// Periodic engine-side backup of the running simulation.
pub fn backup(spec: &ComponentSpec) -> Result<SystemRecord, Error> {
    let contract = ParameterContract::new(
        spec,
        ContractSets::parameters(&["backupIntervalStep"], &["backupIntervalStep"]),
    )?;

    let interval: u64 = contract.get("backupIntervalStep")?;
    let entry = DescriptionEntry::new(InteractionKind::new("Simulation", "Backup"))
        .with_parameter("backupIntervalStep", interval);

    Ok(SystemRecord {
        name: contract.name().to_string(),
        entry,
        simulation_name: None,
    })
}
