use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::fragment::InteractionKind;
use super::topology::{GlobalId, GlobalTopology};

/// One `{type, parameters}` record of the final description. The same shape
/// carries simulation steps, integrators, section headers, and group
/// declarations; tabular records additionally fill `labels` and `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionEntry {
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub parameters: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Vec<Value>>>,
}

impl DescriptionEntry {
    pub fn new(kind: InteractionKind) -> Self {
        Self {
            kind,
            parameters: IndexMap::new(),
            labels: None,
            data: None,
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_table(mut self, labels: Vec<String>, data: Vec<Vec<Value>>) -> Self {
        self.labels = Some(labels);
        self.data = Some(data);
        self
    }
}

/// Plain `labels`/`data` table, the row-oriented block format the engine
/// uses for state and structure sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabeledBlock {
    pub labels: Vec<String>,
    pub data: Vec<Vec<Value>>,
}

/// Named, immutable snapshot of a resolved selection, attached to exactly
/// one simulation step. Ids are sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    ids: Vec<GlobalId>,
    sources: Vec<String>,
}

impl Group {
    pub(crate) fn new(
        name: impl Into<String>,
        ids: impl IntoIterator<Item = GlobalId>,
        sources: Vec<String>,
    ) -> Self {
        let mut ids: Vec<GlobalId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self {
            name: name.into(),
            ids,
            sources,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ids(&self) -> &[GlobalId] {
        &self.ids
    }

    /// Selection names the group was folded from.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Engine-facing group declaration record.
    pub fn declaration(&self) -> DescriptionEntry {
        let ids: Vec<Value> = self.ids.iter().map(|&id| Value::from(id)).collect();
        DescriptionEntry::new(InteractionKind::new("Groups", "GroupsList")).with_table(
            vec!["name".into(), "type".into(), "selection".into()],
            vec![vec![
                Value::from(self.name.clone()),
                Value::from("Ids"),
                Value::from(ids),
            ]],
        )
    }
}

/// The final artifact: one self-contained simulation description ready for
/// serialization to the external engine. Field order is the section order
/// the engine consumes through mapping-key iteration and must not change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationDescription {
    pub system: IndexMap<String, DescriptionEntry>,
    pub units: DescriptionEntry,
    pub types: DescriptionEntry,
    pub ensemble: DescriptionEntry,
    pub integrators: IndexMap<String, DescriptionEntry>,
    pub state: LabeledBlock,
    pub structure: LabeledBlock,
    #[serde(rename = "forceField")]
    pub force_field: IndexMap<String, DescriptionEntry>,
    #[serde(rename = "simulationSteps")]
    pub simulation_steps: IndexMap<String, DescriptionEntry>,
}

impl SimulationDescription {
    pub fn particle_count(&self) -> usize {
        self.state.data.len()
    }

    pub fn name(&self) -> Option<&str> {
        self.system
            .values()
            .find_map(|entry| entry.parameters.get("simulationName"))
            .and_then(Value::as_str)
    }
}

impl GlobalTopology {
    /// State section of the emitted description: `id` column plus the
    /// fragment-declared attribute columns.
    pub fn state_block(&self) -> LabeledBlock {
        let mut labels = vec!["id".to_string()];
        labels.extend(self.state.attribute_labels.iter().cloned());

        let data = self
            .state
            .rows
            .iter()
            .map(|row| {
                let mut record = vec![Value::from(row.id)];
                record.extend(row.values.iter().cloned());
                record
            })
            .collect();

        LabeledBlock { labels, data }
    }

    /// Structure section: `(id, type, modelId)` rows.
    pub fn structure_block(&self) -> LabeledBlock {
        let data = self
            .structure
            .iter()
            .map(|row| {
                vec![
                    Value::from(row.id),
                    Value::from(row.type_name.clone()),
                    Value::from(row.subunit),
                ]
            })
            .collect();

        LabeledBlock {
            labels: vec!["id".into(), "type".into(), "modelId".into()],
            data,
        }
    }

    /// Force-field section: one entry per term, id columns re-joined with
    /// the per-row value columns.
    pub fn force_field_entries(&self) -> IndexMap<String, DescriptionEntry> {
        self.force_field
            .iter()
            .map(|(name, term)| {
                let data = term
                    .rows
                    .iter()
                    .map(|row| {
                        let mut record: Vec<Value> =
                            row.ids.iter().map(|&id| Value::from(id)).collect();
                        record.extend(row.values.iter().cloned());
                        record
                    })
                    .collect();

                let mut entry = DescriptionEntry::new(term.kind.clone())
                    .with_table(term.labels(), data);
                entry.parameters = term.parameters.clone();
                (name.clone(), entry)
            })
            .collect()
    }
}
