use crate::model::description::DescriptionEntry;
use crate::model::fragment::InteractionKind;
use crate::model::spec::ComponentSpec;
use crate::weave::contract::ContractSets;
use crate::weave::error::Error;

use super::{SimulationStep, StepContext, StepCore};

/// Writes thermodynamic quantities (energy, temperature, virial) to a file,
/// optionally restricted to a selection-derived group.
struct ThermodynamicMeasurement {
    core: StepCore,
    output_file_path: String,
}

impl SimulationStep for ThermodynamicMeasurement {
    fn core(&self) -> &StepCore {
        &self.core
    }

    fn descriptor(&self) -> DescriptionEntry {
        DescriptionEntry::new(InteractionKind::new(
            "ThermodynamicMeasure",
            "ThermodynamicQuantityMeasure",
        ))
        .with_parameter("outputFilePath", self.output_file_path.clone())
    }
}

pub fn thermodynamic_measurement(
    spec: &ComponentSpec,
    ctx: &StepContext<'_>,
) -> Result<Box<dyn SimulationStep>, Error> {
    let sets = ContractSets::parameters(&["outputFilePath"], &["outputFilePath"])
        .with_selections(&["selection"], &[]);

    let mut core = StepCore::new(spec, sets, ctx)?;
    core.set_group(&["selection"])?;

    let output_file_path = core.contract().get("outputFilePath")?;

    Ok(Box::new(ThermodynamicMeasurement {
        core,
        output_file_path,
    }))
}
