//! Model composition: merging per-model topology fragments into one global
//! topology.
//!
//! Models are processed strictly in declaration order; the id offset of
//! model *k* is the sum of the state sizes of models `0..k`, so reordering
//! would change every downstream id. Force-field terms group by term name
//! across models; rows concatenate only when kind tags, label lists, and
//! shared parameters agree exactly. Composition runs once per instance in
//! O(particles + term rows) and is deterministic for a given model order.

use tracing::debug;

use super::error::CompositionError;
use crate::components::models::Model;
use crate::model::fragment::TopologyFragment;
use crate::model::topology::GlobalTopology;

fn validate_fragment(name: &str, fragment: &TopologyFragment) -> Result<(), CompositionError> {
    let particles = fragment.particle_count();

    for (row_index, row) in fragment.state.rows.iter().enumerate() {
        if row.id != row_index {
            return Err(CompositionError::NonContiguousIds {
                model: name.to_string(),
                expected: row_index,
                found: row.id,
            });
        }
        if row.values.len() != fragment.state.attribute_labels.len() {
            return Err(CompositionError::RowWidthMismatch {
                model: name.to_string(),
                block: "state".to_string(),
                row: row_index,
                expected: fragment.state.attribute_labels.len(),
                found: row.values.len(),
            });
        }
    }

    for row in &fragment.structure {
        if row.id >= particles {
            return Err(CompositionError::DanglingId {
                model: name.to_string(),
                referrer: "structure".to_string(),
                id: row.id,
                particles,
            });
        }
    }

    for (term_name, term) in &fragment.force_field {
        for (row_index, row) in term.rows.iter().enumerate() {
            if row.ids.len() != term.id_labels.len() || row.values.len() != term.value_labels.len()
            {
                return Err(CompositionError::RowWidthMismatch {
                    model: name.to_string(),
                    block: format!("term '{term_name}'"),
                    row: row_index,
                    expected: term.id_labels.len() + term.value_labels.len(),
                    found: row.ids.len() + row.values.len(),
                });
            }
            if let Some(&id) = row.ids.iter().find(|&&id| id >= particles) {
                return Err(CompositionError::DanglingId {
                    model: name.to_string(),
                    referrer: format!("term '{term_name}'"),
                    id,
                    particles,
                });
            }
        }
    }

    Ok(())
}

/// Merges the models' fragments, in declaration order, into one globally
/// consistent topology.
///
/// # Errors
///
/// Any fragment invariant violation or force-field term incompatibility
/// aborts composition for the whole instance; see [`CompositionError`].
pub fn compose(models: &[Box<dyn Model>]) -> Result<GlobalTopology, CompositionError> {
    let mut global = GlobalTopology::default();
    // maps term name -> declaring model, for conflict reporting
    let mut term_origins: Vec<(String, String)> = Vec::new();

    let mut offset = 0usize;
    let mut subunit_offset = 0usize;

    for (k, model) in models.iter().enumerate() {
        let name = model.name();
        let fragment = model.fragment();
        validate_fragment(name, fragment)?;

        let particles = fragment.particle_count();

        if !fragment.state.is_empty() {
            if global.state.attribute_labels.is_empty() && global.state.is_empty() {
                global.state.attribute_labels = fragment.state.attribute_labels.clone();
            } else if global.state.attribute_labels != fragment.state.attribute_labels {
                return Err(CompositionError::MismatchedStateLabels {
                    model: name.to_string(),
                    expected: global.state.attribute_labels.clone(),
                    found: fragment.state.attribute_labels.clone(),
                });
            }
        }

        for row in &fragment.state.rows {
            global.state.push(row.values.clone());
        }

        for row in &fragment.structure {
            let mut row = row.clone();
            row.id += offset;
            row.subunit += subunit_offset;
            global.structure.push(row);
        }

        for (term_name, term) in &fragment.force_field {
            match global.force_field.get_mut(term_name) {
                None => {
                    let mut merged = term.clone();
                    for row in &mut merged.rows {
                        for id in &mut row.ids {
                            *id += offset;
                        }
                    }
                    global.force_field.insert(term_name.clone(), merged);
                    term_origins.push((term_name.clone(), name.to_string()));
                }
                Some(existing) => {
                    let first = term_origins
                        .iter()
                        .find(|(t, _)| t == term_name)
                        .map(|(_, m)| m.clone())
                        .unwrap_or_default();
                    let conflict = |what| CompositionError::IncompatibleTerm {
                        term: term_name.clone(),
                        first: first.clone(),
                        second: name.to_string(),
                        what,
                    };

                    if existing.kind != term.kind {
                        return Err(conflict("kind tags"));
                    }
                    if existing.id_labels != term.id_labels
                        || existing.value_labels != term.value_labels
                    {
                        return Err(conflict("labels"));
                    }
                    if existing.parameters != term.parameters {
                        return Err(conflict("shared parameters"));
                    }

                    for row in &term.rows {
                        let mut row = row.clone();
                        for id in &mut row.ids {
                            *id += offset;
                        }
                        existing.rows.push(row);
                    }
                }
            }
        }

        global.ledger.push(offset, offset + particles, k);
        debug!(
            model = name,
            index = k,
            offset,
            particles,
            "composed model fragment"
        );

        offset += particles;
        subunit_offset += fragment.subunit_count();
    }

    Ok(global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fragment::{
        ForceFieldTerm, InteractionKind, LocalId, StateBlock, StructureRow,
    };
    use crate::weave::resolver::SelectionQuery;
    use serde_json::json;
    use std::collections::BTreeSet;

    struct RawModel {
        name: String,
        fragment: TopologyFragment,
    }

    impl Model for RawModel {
        fn name(&self) -> &str {
            &self.name
        }

        fn type_tag(&self) -> &str {
            "RAW"
        }

        fn fragment(&self) -> &TopologyFragment {
            &self.fragment
        }

        fn selection_kinds(&self) -> &'static [&'static str] {
            &[]
        }

        fn process_selection(&self, query: &SelectionQuery) -> BTreeSet<LocalId> {
            crate::components::models::intrinsic_selection(
                query,
                self.fragment.particle_count(),
            )
            .unwrap_or_default()
        }
    }

    fn chain(name: &str, particles: usize, bond_k: f64) -> Box<dyn Model> {
        let mut state = StateBlock::new(&["position"]);
        for i in 0..particles {
            state.push(vec![json!([0.0, 0.0, i as f64])]);
        }

        let structure = (0..particles)
            .map(|i| StructureRow {
                id: i,
                type_name: "A".to_string(),
                subunit: 0,
            })
            .collect();

        let mut bonds = ForceFieldTerm::new(
            InteractionKind::new("Bond2", "Harmonic"),
            &["id_i", "id_j"],
            &[],
        )
        .with_parameter("K", bond_k)
        .with_parameter("r0", 1.0);
        for i in 0..particles.saturating_sub(1) {
            bonds.push_row(vec![i, i + 1], vec![]);
        }

        let mut fragment = TopologyFragment {
            state,
            structure,
            ..Default::default()
        };
        fragment.force_field.insert("bonds".to_string(), bonds);

        Box::new(RawModel {
            name: name.to_string(),
            fragment,
        })
    }

    #[test]
    fn offsets_follow_declaration_order() {
        let models = vec![chain("a", 3, 60.0), chain("b", 2, 60.0)];
        let topology = compose(&models).unwrap();

        assert_eq!(topology.particle_count(), 5);
        assert_eq!(topology.state.rows[3].id, 3);
        assert_eq!(topology.ledger.range_of(0), Some(0..3));
        assert_eq!(topology.ledger.range_of(1), Some(3..5));

        // A's bond [0,1] survives unshifted; B's bond [0,1] lands at [3,4].
        let bonds = &topology.force_field["bonds"];
        assert_eq!(bonds.rows[0].ids, vec![0, 1]);
        assert_eq!(bonds.rows[2].ids, vec![3, 4]);
    }

    #[test]
    fn composition_is_deterministic() {
        let first = compose(&vec![chain("a", 3, 60.0), chain("b", 2, 60.0)]).unwrap();
        let second = compose(&vec![chain("a", 3, 60.0), chain("b", 2, 60.0)]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn reordering_shifts_ids_but_keeps_structure_content() {
        let forward = compose(&vec![chain("a", 3, 60.0), chain("b", 2, 60.0)]).unwrap();
        let backward = compose(&vec![chain("b", 2, 60.0), chain("a", 3, 60.0)]).unwrap();

        assert_ne!(forward.ledger, backward.ledger);

        let mut forward_types: Vec<&str> = forward
            .structure
            .iter()
            .map(|r| r.type_name.as_str())
            .collect();
        let mut backward_types: Vec<&str> = backward
            .structure
            .iter()
            .map(|r| r.type_name.as_str())
            .collect();
        forward_types.sort_unstable();
        backward_types.sort_unstable();
        assert_eq!(forward_types, backward_types);
    }

    #[test]
    fn matching_terms_concatenate() {
        let models = vec![chain("a", 3, 60.0), chain("b", 3, 60.0)];
        let topology = compose(&models).unwrap();

        let bonds = &topology.force_field["bonds"];
        assert_eq!(bonds.rows.len(), 4);
        assert_eq!(bonds.parameters["K"], json!(60.0));
    }

    #[test]
    fn differing_shared_parameters_are_a_hard_error() {
        let models = vec![chain("a", 3, 60.0), chain("b", 3, 90.0)];
        let result = compose(&models);
        match result {
            Err(CompositionError::IncompatibleTerm {
                term,
                first,
                second,
                what,
            }) => {
                assert_eq!(term, "bonds");
                assert_eq!(first, "a");
                assert_eq!(second, "b");
                assert_eq!(what, "shared parameters");
            }
            other => panic!("expected IncompatibleTerm, got {other:?}"),
        }
    }

    #[test]
    fn differing_kind_tags_are_a_hard_error() {
        let mut fragment = chain("b", 3, 60.0).fragment().clone();
        fragment.force_field.get_mut("bonds").unwrap().kind =
            InteractionKind::new("Bond2", "Morse");
        let morse: Box<dyn Model> = Box::new(RawModel {
            name: "b".to_string(),
            fragment,
        });

        let result = compose(&vec![chain("a", 3, 60.0), morse]);
        assert!(matches!(
            result,
            Err(CompositionError::IncompatibleTerm { what: "kind tags", .. })
        ));
    }

    #[test]
    fn dangling_structure_id_aborts_before_assembly() {
        let mut state = StateBlock::new(&["position"]);
        state.push(vec![json!([0.0, 0.0, 0.0])]);
        let fragment = TopologyFragment {
            state,
            structure: vec![StructureRow {
                id: 7,
                type_name: "A".to_string(),
                subunit: 0,
            }],
            ..Default::default()
        };
        let model: Box<dyn Model> = Box::new(RawModel {
            name: "broken".to_string(),
            fragment,
        });

        let result = compose(&vec![model]);
        assert!(matches!(
            result,
            Err(CompositionError::DanglingId { id: 7, particles: 1, .. })
        ));
    }

    #[test]
    fn non_contiguous_state_ids_are_rejected() {
        let mut state = StateBlock::new(&["position"]);
        state.push(vec![json!([0.0, 0.0, 0.0])]);
        state.push(vec![json!([0.0, 0.0, 1.0])]);
        state.rows[1].id = 5;

        let model: Box<dyn Model> = Box::new(RawModel {
            name: "gappy".to_string(),
            fragment: TopologyFragment {
                state,
                ..Default::default()
            },
        });

        assert!(matches!(
            compose(&vec![model]),
            Err(CompositionError::NonContiguousIds { expected: 1, found: 5, .. })
        ));
    }

    #[test]
    fn mismatched_state_attributes_are_rejected() {
        let with_direction = {
            let mut state = StateBlock::new(&["position", "direction"]);
            state.push(vec![json!([0.0, 0.0, 0.0]), json!([1.0, 0.0, 0.0, 0.0])]);
            Box::new(RawModel {
                name: "oriented".to_string(),
                fragment: TopologyFragment {
                    state,
                    ..Default::default()
                },
            }) as Box<dyn Model>
        };

        let result = compose(&vec![chain("a", 2, 60.0), with_direction]);
        assert!(matches!(
            result,
            Err(CompositionError::MismatchedStateLabels { .. })
        ));
    }

    #[test]
    fn subunit_tags_stay_unique_across_models() {
        fn shells(name: &str, shells: usize) -> Box<dyn Model> {
            let mut state = StateBlock::new(&["position"]);
            let mut structure = Vec::new();
            for s in 0..shells {
                for _ in 0..2 {
                    let id = state.push(vec![json!([0.0, 0.0, 0.0])]);
                    structure.push(StructureRow {
                        id,
                        type_name: "S".to_string(),
                        subunit: s,
                    });
                }
            }
            Box::new(RawModel {
                name: name.to_string(),
                fragment: TopologyFragment {
                    state,
                    structure,
                    ..Default::default()
                },
            })
        }

        let topology = compose(&vec![shells("x", 2), shells("y", 1)]).unwrap();
        let subunits: Vec<usize> = topology.structure.iter().map(|r| r.subunit).collect();
        assert_eq!(subunits, [0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn empty_model_list_composes_to_empty_topology() {
        let topology = compose(&Vec::new()).unwrap();
        assert_eq!(topology.particle_count(), 0);
        assert!(topology.ledger.is_empty());
    }
}
