//! Simulation pools: many independent specification trees built into many
//! independent descriptions, then distributed into execution batches.
//!
//! Instances never share state: each one gets its own components, topology,
//! and description, so one invalid specification cannot poison its
//! siblings. Distribution only decides which built descriptions ride
//! together; running a batch belongs to the external engine.

use tracing::{debug, warn};

use crate::model::description::SimulationDescription;
use crate::model::spec::{ComponentSpec, SimulationSpec};
use crate::weave::contract::{ContractSets, ParameterContract};
use crate::weave::error::{ConfigurationError, Error};
use crate::weave::registry::Registry;
use crate::weave::weave;

/// An ordered collection of independent simulation specifications.
#[derive(Debug, Clone, Default)]
pub struct SimulationPool {
    specs: Vec<SimulationSpec>,
}

impl SimulationPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: Vec<SimulationSpec>) -> Self {
        Self { specs }
    }

    pub fn push(&mut self, spec: SimulationSpec) {
        self.specs.push(spec);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn specs(&self) -> &[SimulationSpec] {
        &self.specs
    }

    /// Builds every instance, keeping per-instance outcomes separate.
    ///
    /// A failing instance yields its error in place; the others still build.
    pub fn build_all(&self, registry: &Registry) -> Vec<Result<SimulationDescription, Error>> {
        self.specs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let result = weave(spec, registry);
                if let Err(err) = &result {
                    warn!(index, %err, "pool instance failed to build");
                }
                result
            })
            .collect()
    }
}

/// One execution batch: indices into the pool's declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub indices: Vec<usize>,
}

/// A pool distribution strategy: partitions built descriptions into
/// batches. Declaration order is preserved within and across batches.
pub trait Distributor {
    fn type_tag(&self) -> &str;

    fn distribute(&self, descriptions: &[SimulationDescription]) -> Vec<Batch>;
}

struct OneDistributor;

impl Distributor for OneDistributor {
    fn type_tag(&self) -> &str {
        "one"
    }

    fn distribute(&self, descriptions: &[SimulationDescription]) -> Vec<Batch> {
        if descriptions.is_empty() {
            return Vec::new();
        }
        vec![Batch {
            indices: (0..descriptions.len()).collect(),
        }]
    }
}

struct SizeDistributor {
    size: usize,
}

impl Distributor for SizeDistributor {
    fn type_tag(&self) -> &str {
        "size"
    }

    fn distribute(&self, descriptions: &[SimulationDescription]) -> Vec<Batch> {
        let batches: Vec<Batch> = (0..descriptions.len())
            .collect::<Vec<usize>>()
            .chunks(self.size)
            .map(|chunk| Batch {
                indices: chunk.to_vec(),
            })
            .collect();
        debug!(
            simulations = descriptions.len(),
            batches = batches.len(),
            "pool distributed by size"
        );
        batches
    }
}

/// Every simulation in a single batch.
pub fn one_distributor(spec: &ComponentSpec) -> Result<Box<dyn Distributor>, Error> {
    ParameterContract::new(spec, ContractSets::default())?;
    Ok(Box::new(OneDistributor))
}

/// Fixed-size batches in declaration order.
pub fn size_distributor(spec: &ComponentSpec) -> Result<Box<dyn Distributor>, Error> {
    let contract = ParameterContract::new(spec, ContractSets::parameters(&["size"], &["size"]))?;

    let size: usize = contract.get("size")?;
    if size == 0 {
        return Err(ConfigurationError::invalid_parameter(
            contract.name(),
            contract.type_tag(),
            "size",
            "batch size must be at least 1",
        )
        .into());
    }

    Ok(Box::new(SizeDistributor { size }))
}
