use std::collections::BTreeSet;

use serde_json::json;

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

const VERTICES_PER_SHELL: usize = 12;

/// Unit icosahedron vertices, circumradius √(1 + φ²).
fn icosahedron_vertices() -> [[f64; 3]; VERTICES_PER_SHELL] {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    [
        [0.0, 1.0, phi],
        [0.0, 1.0, -phi],
        [0.0, -1.0, phi],
        [0.0, -1.0, -phi],
        [1.0, phi, 0.0],
        [1.0, -phi, 0.0],
        [-1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, 1.0],
        [phi, 0.0, -1.0],
        [-phi, 0.0, -1.0],
    ]
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

/// Spherical bead shells held together by a harmonic bond network along the
/// icosahedron edges. Shell centers are placed explicitly; each shell is one
/// structure subunit.
struct Shell {
    name: String,
    shells: usize,
    fragment: TopologyFragment,
}

impl Model for Shell {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_tag(&self) -> &str {
        "SHELL"
    }

    fn fragment(&self) -> &TopologyFragment {
        &self.fragment
    }

    fn selection_kinds(&self) -> &'static [&'static str] {
        &["shellIndex"]
    }

    fn process_selection(&self, query: &SelectionQuery) -> BTreeSet<LocalId> {
        let particles = self.shells * VERTICES_PER_SHELL;
        if let Some(ids) = intrinsic_selection(query, particles) {
            return ids;
        }
        match query {
            SelectionQuery::ByPredicate { name, args } if name == "shellIndex" => {
                let indices: Vec<usize> =
                    serde_json::from_value(args.clone()).unwrap_or_default();
                indices
                    .into_iter()
                    .filter(|&s| s < self.shells)
                    .flat_map(|s| s * VERTICES_PER_SHELL..(s + 1) * VERTICES_PER_SHELL)
                    .collect()
            }
            _ => BTreeSet::new(),
        }
    }
}

pub fn shell(spec: &ComponentSpec, ctx: &mut ModelContext<'_>) -> Result<Box<dyn Model>, Error> {
    let contract = ParameterContract::new(
        spec,
        ContractSets::parameters(
            &[
                "centers",
                "shellRadius",
                "K",
                "particleName",
                "particleMass",
                "particleCharge",
                "particleRadius",
            ],
            &["centers", "shellRadius", "K"],
        ),
    )?;

    let centers: Vec<[f64; 3]> = contract.get("centers")?;
    let shell_radius: f64 = contract.get("shellRadius")?;
    let k: f64 = contract.get("K")?;
    let particle_name: String = contract.get_or("particleName", "Shell".to_string())?;
    let particle_mass: f64 = contract.get_or("particleMass", 1.0)?;
    let particle_charge: f64 = contract.get_or("particleCharge", 0.0)?;
    let particle_radius: f64 = contract.get_or("particleRadius", 1.0)?;

    if centers.is_empty() {
        return Err(ConfigurationError::invalid_parameter(
            contract.name(),
            contract.type_tag(),
            "centers",
            "at least one shell center is required",
        )
        .into());
    }
    if shell_radius <= 0.0 {
        return Err(ConfigurationError::invalid_parameter(
            contract.name(),
            contract.type_tag(),
            "shellRadius",
            "must be positive",
        )
        .into());
    }

    if let Some(box_size) = ctx.ensemble.box_size() {
        for (s, center) in centers.iter().enumerate() {
            for axis in 0..3 {
                let half = box_size[axis] / 2.0;
                if center[axis] - shell_radius < -half || center[axis] + shell_radius > half {
                    return Err(ConfigurationError::invalid_parameter(
                        contract.name(),
                        contract.type_tag(),
                        "centers",
                        format!("shell {s} at {center:?} does not fit inside the box"),
                    )
                    .into());
                }
            }
        }
    }

    ctx.types.add_type(
        contract.name(),
        particle_name.clone(),
        ParticleType {
            mass: particle_mass,
            radius: particle_radius,
            charge: particle_charge,
        },
    )?;

    let vertices = icosahedron_vertices();
    let circumradius = (1.0 + ((1.0 + 5.0_f64.sqrt()) / 2.0).powi(2)).sqrt();
    let scale = shell_radius / circumradius;
    let edge_length = 2.0 * scale;

    let mut state = StateBlock::new(&["position"]);
    let mut structure = Vec::new();
    let mut bonds = ForceFieldTerm::new(
        InteractionKind::new("Bond2", "Harmonic"),
        &["id_i", "id_j"],
        &["K", "r0"],
    );

    for (s, center) in centers.iter().enumerate() {
        let shell_base = s * VERTICES_PER_SHELL;

        for vertex in &vertices {
            let position = [
                center[0] + vertex[0] * scale,
                center[1] + vertex[1] * scale,
                center[2] + vertex[2] * scale,
            ];
            let id = state.push(vec![json!(position)]);
            structure.push(StructureRow {
                id,
                type_name: particle_name.clone(),
                subunit: s,
            });
        }

        // icosahedron edges: vertex pairs at the minimal pair distance
        for i in 0..VERTICES_PER_SHELL {
            for j in (i + 1)..VERTICES_PER_SHELL {
                let d = distance(vertices[i], vertices[j]) * scale;
                if d < edge_length * 1.05 {
                    bonds.push_row(
                        vec![shell_base + i, shell_base + j],
                        vec![json!(k), json!(d)],
                    );
                }
            }
        }
    }

    let mut fragment = TopologyFragment {
        state,
        structure,
        ..Default::default()
    };
    fragment.force_field.insert("shellBonds".to_string(), bonds);

    Ok(Box::new(Shell {
        name: contract.name().to_string(),
        shells: centers.len(),
        fragment,
    }))
}
