use crate::model::description::DescriptionEntry;
use crate::model::fragment::InteractionKind;
use crate::model::spec::ComponentSpec;
use crate::weave::contract::ContractSets;
use crate::weave::error::Error;

use super::{SimulationStep, StepContext, StepCore};

/// Writes simulation state to a trajectory file. Restricts itself to the
/// supplied `selection`, when one is given.
struct SaveState {
    core: StepCore,
    output_file_path: String,
    output_format: String,
}

impl SimulationStep for SaveState {
    fn core(&self) -> &StepCore {
        &self.core
    }

    fn descriptor(&self) -> DescriptionEntry {
        DescriptionEntry::new(InteractionKind::new("WriteStep", "WriteStep"))
            .with_parameter("outputFilePath", self.output_file_path.clone())
            .with_parameter("outputFormat", self.output_format.clone())
    }
}

pub fn save_state(
    spec: &ComponentSpec,
    ctx: &StepContext<'_>,
) -> Result<Box<dyn SimulationStep>, Error> {
    let sets = ContractSets::parameters(
        &["outputFilePath", "outputFormat"],
        &["outputFilePath", "outputFormat"],
    )
    .with_selections(&["selection"], &[]);

    let mut core = StepCore::new(spec, sets, ctx)?;
    core.set_group(&["selection"])?;

    let output_file_path = core.contract().get("outputFilePath")?;
    let output_format = core.contract().get("outputFormat")?;

    Ok(Box::new(SaveState {
        core,
        output_file_path,
        output_format,
    }))
}
