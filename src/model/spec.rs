use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentSpec {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parameters: IndexMap<String, Value>,
}

impl ComponentSpec {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            name: None,
            parameters: IndexMap::new(),
        }
    }

    pub fn named(type_tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            name: Some(name.into()),
            parameters: IndexMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Declared instance name, falling back to the type tag when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.type_tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSpec {
    #[serde(default)]
    pub system: Vec<ComponentSpec>,
    #[serde(default)]
    pub units: Vec<ComponentSpec>,
    #[serde(default)]
    pub types: Vec<ComponentSpec>,
    #[serde(default)]
    pub ensemble: Vec<ComponentSpec>,
    #[serde(default)]
    pub integrators: Vec<ComponentSpec>,
    #[serde(default)]
    pub models: Vec<ComponentSpec>,
    #[serde(rename = "simulationSteps", default)]
    pub simulation_steps: Vec<ComponentSpec>,
}
