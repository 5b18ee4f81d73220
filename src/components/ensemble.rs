use indexmap::IndexMap;
use serde_json::Value;

use crate::model::description::DescriptionEntry;
use crate::model::fragment::InteractionKind;
use crate::model::spec::ComponentSpec;
use crate::weave::contract::{ContractSets, ParameterContract};
use crate::weave::error::{ConfigurationError, Error};

/// Thermodynamic ensemble of one simulation instance. Components consult it
/// by name (e.g. models read `box` for placement bounds).
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleDef {
    type_tag: String,
    kind: InteractionKind,
    components: IndexMap<String, Value>,
}

impl EnsembleDef {
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.components.get(name)
    }

    /// Simulation box as `[Lx, Ly, Lz]`, when the ensemble declares one.
    pub fn box_size(&self) -> Option<[f64; 3]> {
        let value = self.components.get("box")?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn entry(&self) -> DescriptionEntry {
        let labels = self.components.keys().cloned().collect();
        let row = self.components.values().cloned().collect();
        DescriptionEntry::new(self.kind.clone()).with_table(labels, vec![row])
    }
}

/// Canonical (NVT) ensemble: fixed box and temperature.
pub fn nvt_ensemble(spec: &ComponentSpec) -> Result<EnsembleDef, Error> {
    let contract = ParameterContract::new(
        spec,
        ContractSets::parameters(&["box", "temperature"], &["box", "temperature"]),
    )?;

    let box_size: [f64; 3] = contract.get("box")?;
    if box_size.iter().any(|&l| l <= 0.0) {
        return Err(ConfigurationError::invalid_parameter(
            contract.name(),
            contract.type_tag(),
            "box",
            format!("box lengths must be positive, got {box_size:?}"),
        )
        .into());
    }
    let temperature: f64 = contract.get("temperature")?;

    let mut components = IndexMap::new();
    components.insert("box".to_string(), serde_json::to_value(box_size).unwrap_or_default());
    components.insert("temperature".to_string(), Value::from(temperature));

    Ok(EnsembleDef {
        type_tag: contract.type_tag().to_string(),
        kind: InteractionKind::new("Ensemble", "NVT"),
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nvt_spec() -> ComponentSpec {
        ComponentSpec::new("NVT")
            .with_parameter("box", json!([120.0, 120.0, 120.0]))
            .with_parameter("temperature", 1.0)
    }

    #[test]
    fn nvt_exposes_box_and_temperature() {
        let ensemble = nvt_ensemble(&nvt_spec()).unwrap();
        assert_eq!(ensemble.box_size(), Some([120.0, 120.0, 120.0]));
        assert_eq!(ensemble.get("temperature"), Some(&json!(1.0)));
        assert_eq!(ensemble.get("pressure"), None);
    }

    #[test]
    fn nvt_requires_both_components() {
        let spec = ComponentSpec::new("NVT").with_parameter("temperature", 1.0);
        let result = nvt_ensemble(&spec);
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::MissingParameter { .. }))
        ));
    }

    #[test]
    fn nvt_rejects_degenerate_box() {
        let spec = ComponentSpec::new("NVT")
            .with_parameter("box", json!([0.0, 10.0, 10.0]))
            .with_parameter("temperature", 1.0);
        let result = nvt_ensemble(&spec);
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn entry_holds_one_row_in_declaration_order() {
        let ensemble = nvt_ensemble(&nvt_spec()).unwrap();
        let value = serde_json::to_value(ensemble.entry()).unwrap();
        assert_eq!(value["type"], json!(["Ensemble", "NVT"]));
        assert_eq!(value["labels"], json!(["box", "temperature"]));
        assert_eq!(value["data"], json!([[[120.0, 120.0, 120.0], 1.0]]));
    }
}
