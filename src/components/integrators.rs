use indexmap::IndexMap;
use serde_json::Value;

use crate::model::description::DescriptionEntry;
use crate::model::fragment::InteractionKind;
use crate::model::spec::ComponentSpec;
use crate::weave::contract::{ContractSets, ParameterContract};
use crate::weave::error::{ConfigurationError, Error};

/// One integrator of the simulation schedule. The integration-steps count
/// lives beside the engine parameters; the assembler folds it back into the
/// emitted entry.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorDef {
    name: String,
    type_tag: String,
    kind: InteractionKind,
    parameters: IndexMap<String, Value>,
    integration_steps: u64,
}

impl IntegratorDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn integration_steps(&self) -> u64 {
        self.integration_steps
    }

    pub fn entry(&self) -> DescriptionEntry {
        let mut entry = DescriptionEntry::new(self.kind.clone());
        entry.parameters = self.parameters.clone();
        entry
    }
}

fn positive_steps(contract: &ParameterContract) -> Result<u64, Error> {
    let steps: u64 = contract.get("integrationSteps")?;
    if steps == 0 {
        return Err(ConfigurationError::invalid_parameter(
            contract.name(),
            contract.type_tag(),
            "integrationSteps",
            "must be at least 1",
        )
        .into());
    }
    Ok(steps)
}

/// BBK Langevin integrator.
pub fn bbk(spec: &ComponentSpec) -> Result<IntegratorDef, Error> {
    let contract = ParameterContract::new(
        spec,
        ContractSets::parameters(
            &["timeStep", "frictionConstant", "integrationSteps"],
            &["timeStep", "frictionConstant", "integrationSteps"],
        ),
    )?;

    let integration_steps = positive_steps(&contract)?;

    let mut parameters = IndexMap::new();
    parameters.insert("timeStep".to_string(), Value::from(contract.get::<f64>("timeStep")?));
    parameters.insert(
        "frictionConstant".to_string(),
        Value::from(contract.get::<f64>("frictionConstant")?),
    );

    Ok(IntegratorDef {
        name: contract.name().to_string(),
        type_tag: contract.type_tag().to_string(),
        kind: InteractionKind::new("Langevin", "BBK"),
        parameters,
        integration_steps,
    })
}

/// Euler–Maruyama Brownian integrator.
pub fn euler_maruyama(spec: &ComponentSpec) -> Result<IntegratorDef, Error> {
    let contract = ParameterContract::new(
        spec,
        ContractSets::parameters(
            &["timeStep", "viscosity", "integrationSteps"],
            &["timeStep", "viscosity", "integrationSteps"],
        ),
    )?;

    let integration_steps = positive_steps(&contract)?;

    let mut parameters = IndexMap::new();
    parameters.insert("timeStep".to_string(), Value::from(contract.get::<f64>("timeStep")?));
    parameters.insert("viscosity".to_string(), Value::from(contract.get::<f64>("viscosity")?));

    Ok(IntegratorDef {
        name: contract.name().to_string(),
        type_tag: contract.type_tag().to_string(),
        kind: InteractionKind::new("Brownian", "EulerMaruyama"),
        parameters,
        integration_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bbk_builds_langevin_entry() {
        let spec = ComponentSpec::new("BBK")
            .with_parameter("timeStep", 0.001)
            .with_parameter("frictionConstant", 1.0)
            .with_parameter("integrationSteps", 5_000_000);
        let integrator = bbk(&spec).unwrap();

        assert_eq!(integrator.name(), "BBK");
        assert_eq!(integrator.integration_steps(), 5_000_000);

        let value = serde_json::to_value(integrator.entry()).unwrap();
        assert_eq!(value["type"], json!(["Langevin", "BBK"]));
        assert_eq!(value["parameters"]["timeStep"], 0.001);
        assert!(value["parameters"].get("integrationSteps").is_none());
    }

    #[test]
    fn euler_maruyama_requires_viscosity() {
        let spec = ComponentSpec::new("EulerMaruyama")
            .with_parameter("timeStep", 0.01)
            .with_parameter("integrationSteps", 100);
        let result = euler_maruyama(&spec);
        match result {
            Err(Error::Configuration(ConfigurationError::MissingParameter { key, .. })) => {
                assert_eq!(key, "viscosity")
            }
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn zero_integration_steps_are_rejected() {
        let spec = ComponentSpec::new("BBK")
            .with_parameter("timeStep", 0.001)
            .with_parameter("frictionConstant", 1.0)
            .with_parameter("integrationSteps", 0);
        assert!(matches!(
            bbk(&spec),
            Err(Error::Configuration(ConfigurationError::InvalidParameter { .. }))
        ));
    }
}
