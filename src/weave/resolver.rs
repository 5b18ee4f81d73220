//! Cross-model selection resolution.
//!
//! A selection is a named query resolved against the composed models into a
//! set of global particle ids. The resolver scopes each query through the
//! [`IdLedger`]: ids are partitioned by owning model, localized, dispatched
//! to the model's own `process_selection`, then translated back and merged
//! with set union. Resolution never mutates the topology or any model, and
//! resolving the same query twice against an unchanged topology yields an
//! identical set.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use super::error::SelectionError;
use crate::components::models::Model;
use crate::model::topology::{GlobalId, IdLedger};

/// Tagged selection query, replacing free-form predicate dictionaries.
///
/// The JSON form accepted inside a step's selection parameter is either a
/// bare id array, or a single-key object: `{"particleId": [...]}`
/// (`ById`), `{"idRange": {"start": a, "end": b}}` (half-open `ByIdRange`),
/// `{"model": [...]}` (`ByModel`), `{"all": true}` (`All`), or
/// `{"<predicate>": <args>}` for a model-defined predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionQuery {
    All,
    ById(Vec<GlobalId>),
    ByIdRange { start: GlobalId, end: GlobalId },
    ByModel(Vec<usize>),
    ByPredicate { name: String, args: Value },
}

impl SelectionQuery {
    /// Parses the JSON form described on the type.
    pub fn from_value(value: &Value) -> Result<Self, SelectionError> {
        fn id_list(value: &Value, key: &str) -> Result<Vec<usize>, SelectionError> {
            serde_json::from_value(value.clone()).map_err(|_| SelectionError::MalformedQuery {
                detail: format!("'{key}' expects an array of non-negative integers"),
            })
        }

        if value.is_array() {
            return Ok(Self::ById(id_list(value, "particleId")?));
        }

        let map = value.as_object().ok_or_else(|| SelectionError::MalformedQuery {
            detail: "expected an id array or a single-key query object".to_string(),
        })?;
        if map.len() != 1 {
            return Err(SelectionError::MalformedQuery {
                detail: format!("expected exactly one query key, found {}", map.len()),
            });
        }
        let (key, args) = map.iter().next().expect("len checked above");

        match key.as_str() {
            "all" => Ok(Self::All),
            "particleId" => Ok(Self::ById(id_list(args, "particleId")?)),
            "model" | "models" => Ok(Self::ByModel(id_list(args, key)?)),
            "idRange" => {
                #[derive(serde::Deserialize)]
                struct RawRange {
                    start: usize,
                    end: usize,
                }
                let range: RawRange =
                    serde_json::from_value(args.clone()).map_err(|_| SelectionError::MalformedQuery {
                        detail: "'idRange' expects {\"start\": a, \"end\": b}".to_string(),
                    })?;
                if range.end < range.start {
                    return Err(SelectionError::MalformedQuery {
                        detail: format!("empty id range {}..{}", range.start, range.end),
                    });
                }
                Ok(Self::ByIdRange {
                    start: range.start,
                    end: range.end,
                })
            }
            predicate => Ok(Self::ByPredicate {
                name: predicate.to_string(),
                args: args.clone(),
            }),
        }
    }
}

/// Resolves `query` to a set of global ids over the composed models.
///
/// Empty results are legal and yield the empty set.
pub fn resolve(
    query: &SelectionQuery,
    models: &[Box<dyn Model>],
    ledger: &IdLedger,
) -> Result<BTreeSet<GlobalId>, SelectionError> {
    let total = ledger.total_particles();

    let resolved = match query {
        SelectionQuery::All => (0..total).collect(),

        SelectionQuery::ByModel(indices) => {
            let mut ids = BTreeSet::new();
            for &index in indices {
                let range = ledger.range_of(index).ok_or(SelectionError::ModelOutOfRange {
                    index,
                    count: ledger.model_count(),
                })?;
                ids.extend(range);
            }
            ids
        }

        SelectionQuery::ById(requested) => {
            let mut per_model: Vec<Vec<GlobalId>> = vec![Vec::new(); models.len()];
            for &id in requested {
                let owner = ledger
                    .model_of(id)
                    .ok_or(SelectionError::IdOutOfRange { id, total })?;
                per_model[owner].push(id);
            }

            let mut ids = BTreeSet::new();
            for (owner, owned) in per_model.into_iter().enumerate() {
                if owned.is_empty() {
                    continue;
                }
                let range = ledger.range_of(owner).expect("owner came from the ledger");
                let local = SelectionQuery::ById(
                    owned.iter().map(|id| id - range.start).collect(),
                );
                ids.extend(
                    models[owner]
                        .process_selection(&local)
                        .into_iter()
                        .map(|id| id + range.start),
                );
            }
            ids
        }

        SelectionQuery::ByIdRange { start, end } => {
            if *end > total {
                return Err(SelectionError::IdOutOfRange {
                    id: end.saturating_sub(1),
                    total,
                });
            }
            let mut ids = BTreeSet::new();
            for entry in ledger.entries() {
                let overlap_start = (*start).max(entry.start);
                let overlap_end = (*end).min(entry.end);
                if overlap_start >= overlap_end {
                    continue;
                }
                let local = SelectionQuery::ByIdRange {
                    start: overlap_start - entry.start,
                    end: overlap_end - entry.start,
                };
                ids.extend(
                    models[entry.model]
                        .process_selection(&local)
                        .into_iter()
                        .map(|id| id + entry.start),
                );
            }
            ids
        }

        SelectionQuery::ByPredicate { name, .. } => {
            let defining: Vec<usize> = models
                .iter()
                .enumerate()
                .filter(|(_, m)| m.selection_kinds().contains(&name.as_str()))
                .map(|(k, _)| k)
                .collect();
            if defining.is_empty() {
                return Err(SelectionError::UnknownPredicate {
                    predicate: name.clone(),
                });
            }

            let mut ids = BTreeSet::new();
            for k in defining {
                let range = ledger.range_of(k).ok_or(SelectionError::ModelOutOfRange {
                    index: k,
                    count: ledger.model_count(),
                })?;
                ids.extend(
                    models[k]
                        .process_selection(query)
                        .into_iter()
                        .map(|id| id + range.start),
                );
            }
            ids
        }
    };

    debug!(?query, count = resolved.len(), "selection resolved");
    Ok(resolved)
}
