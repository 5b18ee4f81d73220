use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::model::description::DescriptionEntry;
use crate::model::fragment::InteractionKind;
use crate::model::spec::ComponentSpec;
use crate::weave::contract::{ContractSets, ParameterContract};
use crate::weave::error::{ConfigurationError, Error};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleType {
    pub mass: f64,
    pub radius: f64,
    pub charge: f64,
}

/// Particle type table of one simulation instance.
///
/// The table starts empty; models register the types they use during
/// construction. Registering the same name twice is idempotent as long as
/// the values agree.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleTypes {
    type_tag: String,
    kind: InteractionKind,
    table: IndexMap<String, ParticleType>,
}

impl ParticleTypes {
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn get(&self, name: &str) -> Option<&ParticleType> {
        self.table.get(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Registers a particle type on behalf of `model`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::ConflictingParticleType`] when `name` is already
    /// registered with different values.
    pub fn add_type(
        &mut self,
        model: &str,
        name: impl Into<String>,
        particle_type: ParticleType,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        match self.table.get(&name) {
            Some(existing) if *existing != particle_type => {
                Err(ConfigurationError::ConflictingParticleType {
                    type_name: name,
                    model: model.to_string(),
                })
            }
            Some(_) => Ok(()),
            None => {
                debug!(model, type_name = %name, "registered particle type");
                self.table.insert(name, particle_type);
                Ok(())
            }
        }
    }

    pub fn entry(&self) -> DescriptionEntry {
        let data = self
            .table
            .iter()
            .map(|(name, t)| {
                vec![
                    Value::from(name.clone()),
                    Value::from(t.mass),
                    Value::from(t.radius),
                    Value::from(t.charge),
                ]
            })
            .collect();

        DescriptionEntry::new(self.kind.clone()).with_table(
            vec!["name".into(), "mass".into(), "radius".into(), "charge".into()],
            data,
        )
    }
}

/// The basic (name, mass, radius, charge) type table.
pub fn basic_types(spec: &ComponentSpec) -> Result<ParticleTypes, Error> {
    let contract = ParameterContract::new(spec, ContractSets::default())?;

    Ok(ParticleTypes {
        type_tag: contract.type_tag().to_string(),
        kind: InteractionKind::new("Types", "Basic"),
        table: IndexMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table() -> ParticleTypes {
        basic_types(&ComponentSpec::new("basic")).unwrap()
    }

    const BEAD: ParticleType = ParticleType {
        mass: 1.0,
        radius: 0.5,
        charge: 0.0,
    };

    #[test]
    fn add_type_registers_once() {
        let mut types = make_table();
        types.add_type("chain", "A", BEAD).unwrap();
        types.add_type("chain", "A", BEAD).unwrap();

        assert_eq!(types.len(), 1);
        assert_eq!(types.get("A"), Some(&BEAD));
    }

    #[test]
    fn conflicting_redefinition_is_rejected() {
        let mut types = make_table();
        types.add_type("chainA", "A", BEAD).unwrap();

        let result = types.add_type(
            "chainB",
            "A",
            ParticleType {
                mass: 2.0,
                ..BEAD
            },
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::ConflictingParticleType { .. })
        ));
    }

    #[test]
    fn entry_lists_types_in_registration_order() {
        let mut types = make_table();
        types.add_type("m", "B", BEAD).unwrap();
        types
            .add_type(
                "m",
                "A",
                ParticleType {
                    mass: 3.0,
                    radius: 1.0,
                    charge: -1.0,
                },
            )
            .unwrap();

        let value = serde_json::to_value(types.entry()).unwrap();
        assert_eq!(value["labels"][0], "name");
        assert_eq!(value["data"][0][0], "B");
        assert_eq!(value["data"][1][0], "A");
        assert_eq!(value["data"][1][1], 3.0);
    }
}
