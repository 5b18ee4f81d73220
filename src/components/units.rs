use indexmap::IndexMap;

use crate::model::description::DescriptionEntry;
use crate::model::fragment::InteractionKind;
use crate::model::spec::ComponentSpec;
use crate::weave::contract::{ContractSets, ParameterContract};
use crate::weave::error::Error;

/// Boltzmann constant in kcal/(mol·K).
const KBOLTZ_KCALMOL_A: f64 = 1.987191e-3;

/// Unit system of one simulation instance. Exposes named physical constants
/// to the other components; the engine receives only the kind tag.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitsDef {
    type_tag: String,
    kind: InteractionKind,
    constants: IndexMap<String, f64>,
}

impl UnitsDef {
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    pub fn entry(&self) -> DescriptionEntry {
        DescriptionEntry::new(self.kind.clone())
    }
}

/// Reduced units: every exposed constant is 1.
pub fn none_units(spec: &ComponentSpec) -> Result<UnitsDef, Error> {
    let contract = ParameterContract::new(spec, ContractSets::default())?;

    let mut constants = IndexMap::new();
    constants.insert("KBOLTZ".to_string(), 1.0);

    Ok(UnitsDef {
        type_tag: contract.type_tag().to_string(),
        kind: InteractionKind::new("Units", "None"),
        constants,
    })
}

/// kcal/mol – Å unit system.
pub fn kcalmol_a_units(spec: &ComponentSpec) -> Result<UnitsDef, Error> {
    let contract = ParameterContract::new(spec, ContractSets::default())?;

    let mut constants = IndexMap::new();
    constants.insert("KBOLTZ".to_string(), KBOLTZ_KCALMOL_A);

    Ok(UnitsDef {
        type_tag: contract.type_tag().to_string(),
        kind: InteractionKind::new("Units", "KcalMol_A"),
        constants,
    })
}
