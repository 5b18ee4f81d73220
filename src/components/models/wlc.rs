use std::collections::BTreeSet;

use serde_json::json;
use tracing::warn;

use crate::components::types::ParticleType;
use crate::components::ModelContext;
use crate::model::fragment::{
    ForceFieldTerm, InteractionKind, LocalId, StateBlock, StructureRow, TopologyFragment,
};
use crate::model::spec::ComponentSpec;
use crate::weave::contract::{ContractSets, ParameterContract};
use crate::weave::error::{ConfigurationError, Error};
use crate::weave::resolver::SelectionQuery;

use super::{intrinsic_selection, Model};

/// Worm-like chain: `N` beads along the z axis, harmonic bonds between
/// consecutive beads and Kratky–Porod bending terms on consecutive triples.
struct Wlc {
    name: String,
    n: usize,
    fragment: TopologyFragment,
}

impl Model for Wlc {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_tag(&self) -> &str {
        "WLC"
    }

    fn fragment(&self) -> &TopologyFragment {
        &self.fragment
    }

    fn selection_kinds(&self) -> &'static [&'static str] {
        &["particleIndex"]
    }

    fn process_selection(&self, query: &SelectionQuery) -> BTreeSet<LocalId> {
        if let Some(ids) = intrinsic_selection(query, self.n) {
            return ids;
        }
        match query {
            SelectionQuery::ByPredicate { name, args } if name == "particleIndex" => {
                let indices: Vec<usize> =
                    serde_json::from_value(args.clone()).unwrap_or_default();
                indices.into_iter().filter(|&i| i < self.n).collect()
            }
            _ => BTreeSet::new(),
        }
    }
}

pub fn wlc(spec: &ComponentSpec, ctx: &mut ModelContext<'_>) -> Result<Box<dyn Model>, Error> {
    let contract = ParameterContract::new(
        spec,
        ContractSets::parameters(&["N", "mass", "b", "Kb", "Ka", "particleName"], &["N"]),
    )?;

    let n: usize = contract.get("N")?;
    if n == 0 {
        return Err(ConfigurationError::invalid_parameter(
            contract.name(),
            contract.type_tag(),
            "N",
            "chain needs at least one particle",
        )
        .into());
    }

    let mass: f64 = contract.get_or("mass", 1.0)?;
    let b: f64 = contract.get_or("b", 1.0)?;
    let kb: f64 = contract.get_or("Kb", 1.0)?;
    let ka: f64 = contract.get_or("Ka", 1.0)?;
    let particle_name: String = contract.get_or("particleName", "A".to_string())?;

    if let Some([_, _, lz]) = ctx.ensemble.box_size() {
        let length = (n - 1) as f64 * b;
        if length > lz {
            warn!(
                model = contract.name(),
                length, box_z = lz, "chain is longer than the simulation box"
            );
        }
    }

    ctx.types.add_type(
        contract.name(),
        particle_name.clone(),
        ParticleType {
            mass,
            radius: 0.5 * b,
            charge: 0.0,
        },
    )?;

    let mut state = StateBlock::new(&["position"]);
    let mut structure = Vec::with_capacity(n);
    for i in 0..n {
        let id = state.push(vec![json!([0.0, 0.0, i as f64 * b])]);
        structure.push(StructureRow {
            id,
            type_name: particle_name.clone(),
            subunit: 0,
        });
    }

    let mut fragment = TopologyFragment {
        state,
        structure,
        ..Default::default()
    };

    if n >= 2 {
        let mut bonds = ForceFieldTerm::new(
            InteractionKind::new("Bond2", "Harmonic"),
            &["id_i", "id_j"],
            &[],
        )
        .with_parameter("K", kb)
        .with_parameter("r0", b);
        for i in 0..n - 1 {
            bonds.push_row(vec![i, i + 1], vec![]);
        }
        fragment.force_field.insert("bonds".to_string(), bonds);
    }

    if n >= 3 {
        let mut angles = ForceFieldTerm::new(
            InteractionKind::new("Bond3", "KratkyPorod"),
            &["id_i", "id_j", "id_k"],
            &[],
        )
        .with_parameter("K", ka);
        for i in 0..n - 2 {
            angles.push_row(vec![i, i + 1, i + 2], vec![]);
        }
        fragment.force_field.insert("angles".to_string(), angles);
    }

    Ok(Box::new(Wlc {
        name: contract.name().to_string(),
        n,
        fragment,
    }))
}
