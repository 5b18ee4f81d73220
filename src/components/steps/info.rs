use crate::model::description::DescriptionEntry;
use crate::model::fragment::InteractionKind;
use crate::model::spec::ComponentSpec;
use crate::weave::contract::ContractSets;
use crate::weave::error::Error;

use super::{SimulationStep, StepContext, StepCore};

/// Periodic progress report; takes no parameters beyond the schedule.
struct Info {
    core: StepCore,
}

impl SimulationStep for Info {
    fn core(&self) -> &StepCore {
        &self.core
    }

    fn descriptor(&self) -> DescriptionEntry {
        DescriptionEntry::new(InteractionKind::new("UtilsStep", "InfoStep"))
    }
}

pub fn info(spec: &ComponentSpec, ctx: &StepContext<'_>) -> Result<Box<dyn SimulationStep>, Error> {
    let core = StepCore::new(spec, ContractSets::default(), ctx)?;
    Ok(Box::new(Info { core }))
}
