use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

pub type LocalId = usize;

/// Interaction kind tag, serialized as the two-element `[class, flavor]`
/// array the target engine expects (e.g. `["Bond2", "Harmonic"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InteractionKind {
    pub class: String,
    pub flavor: String,
}

impl InteractionKind {
    pub fn new(class: impl Into<String>, flavor: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            flavor: flavor.into(),
        }
    }
}

impl Serialize for InteractionKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.class)?;
        seq.serialize_element(&self.flavor)?;
        seq.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateRow {
    pub id: LocalId,
    pub values: Vec<Value>,
}

/// Per-particle state: one label per attribute column (the leading `id`
/// column is implicit) and one row per particle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateBlock {
    pub attribute_labels: Vec<String>,
    pub rows: Vec<StateRow>,
}

impl StateBlock {
    pub fn new(attribute_labels: &[&str]) -> Self {
        Self {
            attribute_labels: attribute_labels.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, values: Vec<Value>) -> LocalId {
        let id = self.rows.len();
        self.rows.push(StateRow { id, values });
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureRow {
    pub id: LocalId,
    pub type_name: String,
    pub subunit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermRow {
    pub ids: Vec<LocalId>,
    pub values: Vec<Value>,
}

/// One force-field term: shared parameters apply to every row; per-row
/// values carry tuple-specific overrides under `value_labels`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceFieldTerm {
    pub kind: InteractionKind,
    pub parameters: IndexMap<String, Value>,
    pub id_labels: Vec<String>,
    pub value_labels: Vec<String>,
    pub rows: Vec<TermRow>,
}

impl ForceFieldTerm {
    pub fn new(kind: InteractionKind, id_labels: &[&str], value_labels: &[&str]) -> Self {
        Self {
            kind,
            parameters: IndexMap::new(),
            id_labels: id_labels.iter().map(|s| s.to_string()).collect(),
            value_labels: value_labels.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn push_row(&mut self, ids: Vec<LocalId>, values: Vec<Value>) {
        self.rows.push(TermRow { ids, values });
    }

    pub fn labels(&self) -> Vec<String> {
        self.id_labels
            .iter()
            .chain(self.value_labels.iter())
            .cloned()
            .collect()
    }
}

/// Local topology produced by one model instance. Ids are contiguous from 0
/// and scoped to this fragment; the composer re-indexes them globally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyFragment {
    pub state: StateBlock,
    pub structure: Vec<StructureRow>,
    pub force_field: IndexMap<String, ForceFieldTerm>,
}

impl TopologyFragment {
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.state.len()
    }

    /// Number of model-internal subunits referenced by the structure rows.
    pub fn subunit_count(&self) -> usize {
        self.structure
            .iter()
            .map(|row| row.subunit + 1)
            .max()
            .unwrap_or(0)
    }
}
