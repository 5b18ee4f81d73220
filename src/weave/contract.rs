//! Schema contract every component instance must satisfy.
//!
//! A component declares, per instance, which parameters and selections are
//! *available* and which of those are *required*. Construction validates the
//! supplied parameter mapping against those sets exactly once:
//!
//! - required sets must be subsets of the available sets (a component-author
//!   bug, not a user mistake),
//! - every supplied key must be an available parameter or selection,
//! - every required parameter and selection must be supplied.
//!
//! On success the contract exposes read-only, serde-typed accessors.
//! Validation is local: it never touches the global topology and has no side
//! effects beyond the instance's own state.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::error::ConfigurationError;
use crate::model::spec::ComponentSpec;

/// The four declared key sets of one component instance.
#[derive(Debug, Clone, Default)]
pub struct ContractSets {
    pub available_parameters: BTreeSet<String>,
    pub required_parameters: BTreeSet<String>,
    pub available_selections: BTreeSet<String>,
    pub required_selections: BTreeSet<String>,
}

fn to_set(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

impl ContractSets {
    /// Declares the parameter axis; the selection axis stays empty.
    pub fn parameters(available: &[&str], required: &[&str]) -> Self {
        Self {
            available_parameters: to_set(available),
            required_parameters: to_set(required),
            ..Default::default()
        }
    }

    /// Declares the selection axis on top of the parameter axis.
    pub fn with_selections(mut self, available: &[&str], required: &[&str]) -> Self {
        self.available_selections = to_set(available);
        self.required_selections = to_set(required);
        self
    }

    pub fn add_available_parameters(&mut self, keys: &[&str]) {
        self.available_parameters.extend(keys.iter().map(|k| k.to_string()));
    }

    pub fn add_required_parameters(&mut self, keys: &[&str]) {
        self.required_parameters.extend(keys.iter().map(|k| k.to_string()));
    }
}

/// A validated component instance: its identity, its declared key sets, and
/// the supplied parameter mapping.
#[derive(Debug, Clone)]
pub struct ParameterContract {
    name: String,
    type_tag: String,
    sets: ContractSets,
    params: IndexMap<String, Value>,
}

impl ParameterContract {
    /// Validates `spec` against the declared sets.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::ContractViolation`] when a required set is not a
    /// subset of its available set,
    /// [`ConfigurationError::UnknownParameter`] for a supplied key outside
    /// both available sets, and
    /// [`ConfigurationError::MissingParameter`] /
    /// [`ConfigurationError::MissingSelection`] for absent required keys.
    pub fn new(spec: &ComponentSpec, sets: ContractSets) -> Result<Self, ConfigurationError> {
        let name = spec.name().to_string();
        let type_tag = spec.type_tag.clone();

        let stray: Vec<String> = sets
            .required_parameters
            .difference(&sets.available_parameters)
            .cloned()
            .collect();
        if !stray.is_empty() {
            return Err(ConfigurationError::ContractViolation {
                name,
                type_tag,
                axis: "parameters",
                missing: stray,
            });
        }

        let stray: Vec<String> = sets
            .required_selections
            .difference(&sets.available_selections)
            .cloned()
            .collect();
        if !stray.is_empty() {
            return Err(ConfigurationError::ContractViolation {
                name,
                type_tag,
                axis: "selections",
                missing: stray,
            });
        }

        for key in spec.parameters.keys() {
            if !sets.available_parameters.contains(key) && !sets.available_selections.contains(key)
            {
                return Err(ConfigurationError::unknown_parameter(&name, &type_tag, key));
            }
        }

        for key in &sets.required_parameters {
            if !spec.parameters.contains_key(key) {
                return Err(ConfigurationError::missing_parameter(&name, &type_tag, key));
            }
        }

        for key in &sets.required_selections {
            if !spec.parameters.contains_key(key) {
                return Err(ConfigurationError::MissingSelection {
                    name,
                    type_tag,
                    key: key.clone(),
                });
            }
        }

        debug!(component = %name, type_tag = %type_tag, "component contract validated");

        Ok(Self {
            name,
            type_tag,
            sets,
            params: spec.parameters.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn sets(&self) -> &ContractSets {
        &self.sets
    }

    #[inline]
    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Typed accessor for a parameter that must be present.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigurationError> {
        let value = self
            .params
            .get(key)
            .ok_or_else(|| ConfigurationError::missing_parameter(&self.name, &self.type_tag, key))?;
        serde_json::from_value(value.clone()).map_err(|e| {
            ConfigurationError::invalid_parameter(&self.name, &self.type_tag, key, e.to_string())
        })
    }

    /// Typed accessor returning `None` when the parameter was not supplied.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigurationError> {
        match self.params.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                ConfigurationError::invalid_parameter(&self.name, &self.type_tag, key, e.to_string())
            }),
        }
    }

    /// Typed accessor depositing `default` for a non-required, non-supplied
    /// parameter. The defaulting policy belongs to the component.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, ConfigurationError> {
        Ok(self.get_opt(key)?.unwrap_or(default))
    }

    /// Supplied keys that name declared selections, in supply order.
    pub fn supplied_selections(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params
            .iter()
            .filter(|(key, _)| self.sets.available_selections.contains(key.as_str()))
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn declares_selection(&self, key: &str) -> bool {
        self.sets.available_selections.contains(key)
    }
}
