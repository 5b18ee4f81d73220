//! Error types for the description-building pipeline.
//!
//! Errors are categorized by the pipeline stage they originate in:
//! component construction ([`ConfigurationError`]), selection resolution
//! ([`SelectionError`]), model composition ([`CompositionError`]), and final
//! assembly ([`AssemblyError`]). Every error aborts only the simulation
//! instance it belongs to; a pool builds its other instances regardless.

use thiserror::Error;

use crate::model::fragment::LocalId;
use crate::model::topology::GlobalId;

/// Contract violations detected while constructing a component instance.
///
/// These are always surfaced immediately and never recovered: an unknown or
/// missing key is a mistake in the input specification (or, for
/// [`ContractViolation`](ConfigurationError::ContractViolation), in the
/// component implementation itself), not a runtime fault.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A component declared required keys outside its available sets.
    ///
    /// This is a component-author bug, caught once at construction.
    #[error(
        "component '{name}' ({type_tag}): required {axis} {missing:?} are not declared available"
    )]
    ContractViolation {
        /// Declared instance name.
        name: String,
        /// Component type tag.
        type_tag: String,
        /// Which axis is violated: `"parameters"` or `"selections"`.
        axis: &'static str,
        /// The required keys missing from the available set.
        missing: Vec<String>,
    },

    /// A supplied key is neither an available parameter nor an available
    /// selection of the component.
    #[error("component '{name}' ({type_tag}): parameter or selection '{key}' is not available")]
    UnknownParameter {
        /// Declared instance name.
        name: String,
        /// Component type tag.
        type_tag: String,
        /// The offending key.
        key: String,
    },

    /// A required parameter was not supplied.
    #[error("component '{name}' ({type_tag}): required parameter '{key}' was not given")]
    MissingParameter {
        /// Declared instance name.
        name: String,
        /// Component type tag.
        type_tag: String,
        /// The missing parameter name.
        key: String,
    },

    /// A required selection was not supplied.
    #[error("component '{name}' ({type_tag}): required selection '{key}' was not given")]
    MissingSelection {
        /// Declared instance name.
        name: String,
        /// Component type tag.
        type_tag: String,
        /// The missing selection name.
        key: String,
    },

    /// A supplied parameter value failed to convert to the expected type.
    #[error("component '{name}' ({type_tag}): parameter '{key}' is invalid: {detail}")]
    InvalidParameter {
        /// Declared instance name.
        name: String,
        /// Component type tag.
        type_tag: String,
        /// The offending parameter name.
        key: String,
        /// Description of the problem.
        detail: String,
    },

    /// No factory registered for a declared component type.
    #[error("no '{category}' component registered for type '{type_tag}'")]
    UnknownComponentType {
        /// Registry category (e.g. `"models"`).
        category: &'static str,
        /// The unregistered type tag.
        type_tag: String,
    },

    /// A single-entry section held zero or several records.
    #[error("section '{section}' must declare exactly one component, found {found}")]
    SectionCardinality {
        /// Section name.
        section: &'static str,
        /// Number of records found.
        found: usize,
    },

    /// A particle type was redefined with different mass, radius, or charge.
    #[error("particle type '{type_name}' redefined with conflicting values by model '{model}'")]
    ConflictingParticleType {
        /// The particle type name.
        type_name: String,
        /// The model attempting the redefinition.
        model: String,
    },
}

impl ConfigurationError {
    pub fn unknown_parameter(name: &str, type_tag: &str, key: impl Into<String>) -> Self {
        Self::UnknownParameter {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            key: key.into(),
        }
    }

    pub fn missing_parameter(name: &str, type_tag: &str, key: impl Into<String>) -> Self {
        Self::MissingParameter {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            key: key.into(),
        }
    }

    pub fn invalid_parameter(
        name: &str,
        type_tag: &str,
        key: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            key: key.into(),
            detail: detail.into(),
        }
    }
}

/// Selection requests that cannot be satisfied against the composed models.
///
/// Availability mistakes surface at step-construction time, not at
/// resolution time; resolving to an empty set is legal and is not an error.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A group was requested over a selection the step never declared.
    #[error("selection '{selection}' is not available for component '{name}' ({type_tag})")]
    NotDeclared {
        /// Declared instance name.
        name: String,
        /// Component type tag.
        type_tag: String,
        /// The undeclared selection name.
        selection: String,
    },

    /// A query referenced a particle id outside the composed topology.
    #[error("selection references particle id {id}, but ids end at {total}")]
    IdOutOfRange {
        /// The offending global id.
        id: GlobalId,
        /// Total number of composed particles.
        total: usize,
    },

    /// A query referenced a model index outside the composed model list.
    #[error("selection references model index {index}, but only {count} models are composed")]
    ModelOutOfRange {
        /// The offending model index.
        index: usize,
        /// Number of composed models.
        count: usize,
    },

    /// A predicate query names a selection kind no composed model defines.
    #[error("no composed model defines selection predicate '{predicate}'")]
    UnknownPredicate {
        /// The unmatched predicate name.
        predicate: String,
    },

    /// The selection parameter value does not parse into a query.
    #[error("malformed selection query: {detail}")]
    MalformedQuery {
        /// Description of the problem.
        detail: String,
    },
}

/// Inconsistencies detected while merging model fragments.
///
/// Composition is all-or-nothing for an instance: any of these aborts before
/// the assembler ever sees the topology.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// A fragment's state ids are not contiguous from 0.
    #[error("model '{model}': state ids not contiguous (expected {expected}, found {found})")]
    NonContiguousIds {
        /// Declared model name.
        model: String,
        /// Expected local id at this row.
        expected: LocalId,
        /// Actual id found.
        found: LocalId,
    },

    /// A structure or force-field row references an id absent from state.
    #[error(
        "model '{model}': {referrer} references local id {id}, but state holds {particles} particles"
    )]
    DanglingId {
        /// Declared model name.
        model: String,
        /// Which block holds the reference (structure or a term name).
        referrer: String,
        /// The dangling local id.
        id: LocalId,
        /// Particle count of the fragment.
        particles: usize,
    },

    /// A row's column count disagrees with its label list.
    #[error("model '{model}': {block} row {row} has {found} columns, expected {expected}")]
    RowWidthMismatch {
        /// Declared model name.
        model: String,
        /// Offending block (state or a term name).
        block: String,
        /// Row index within the block.
        row: usize,
        /// Expected column count.
        expected: usize,
        /// Found column count.
        found: usize,
    },

    /// Two models declared the same force-field term incompatibly.
    ///
    /// Term rows of matching terms concatenate across models, but only when
    /// kind tags, label lists, and shared parameters agree exactly; merging
    /// must never silently overwrite one model's parameters with another's.
    #[error(
        "force-field term '{term}' declared by models '{first}' and '{second}' with incompatible {what}"
    )]
    IncompatibleTerm {
        /// The colliding term name.
        term: String,
        /// First declaring model.
        first: String,
        /// Second declaring model.
        second: String,
        /// What disagrees: `"kind tags"`, `"labels"`, or `"shared parameters"`.
        what: &'static str,
    },

    /// Fragments declare different per-particle state attribute columns.
    #[error(
        "model '{model}' declares state attributes {found:?}, but composition established {expected:?}"
    )]
    MismatchedStateLabels {
        /// Declared model name.
        model: String,
        /// Attribute labels established by earlier fragments.
        expected: Vec<String>,
        /// This fragment's attribute labels.
        found: Vec<String>,
    },
}

/// Ordering or reference inconsistencies at final assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A step's group was folded from a selection it never resolved.
    #[error("step '{step}' groups over selection '{selection}', which it did not resolve")]
    GroupSelectionMissing {
        /// Step instance name.
        step: String,
        /// The unresolved selection name.
        selection: String,
    },

    /// Simulation steps were declared against an empty topology.
    #[error("simulation steps declared, but no models were composed")]
    EmptyTopology,

    /// The system section must carry exactly one `simulationName` record.
    #[error("system section must declare 'simulationName' exactly once, found {found}")]
    SimulationNameCardinality {
        /// Number of `simulationName` records found.
        found: usize,
    },

    /// Two records of the same kind share a declared name.
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName {
        /// Record kind (e.g. `"simulation step"`).
        kind: &'static str,
        /// The colliding name.
        name: String,
    },
}

/// Top-level error for the whole pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Component construction failed.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Selection resolution failed.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Model composition failed.
    #[error(transparent)]
    Composition(#[from] CompositionError),

    /// Final assembly failed.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_name_the_component_and_key() {
        let err = ConfigurationError::unknown_parameter("chain", "WLC", "Kbend");
        assert_eq!(
            err.to_string(),
            "component 'chain' (WLC): parameter or selection 'Kbend' is not available"
        );

        let err = ConfigurationError::missing_parameter("chain", "WLC", "N");
        assert!(err.to_string().contains("required parameter 'N'"));
    }

    #[test]
    fn composition_errors_name_the_conflict() {
        let err = CompositionError::IncompatibleTerm {
            term: "bonds".into(),
            first: "chainA".into(),
            second: "chainB".into(),
            what: "shared parameters",
        };
        let message = err.to_string();
        assert!(message.contains("'bonds'"));
        assert!(message.contains("'chainA'"));
        assert!(message.contains("shared parameters"));
    }

    #[test]
    fn errors_convert_into_the_top_level_error() {
        let err: Error = SelectionError::IdOutOfRange { id: 12, total: 10 }.into();
        assert!(matches!(err, Error::Selection(_)));
        assert!(err.to_string().contains("particle id 12"));
    }
}
