//! Serialization boundary: reading specification trees and writing
//! assembled descriptions, both as JSON.
//!
//! Key order is preserved end to end — the engine consumes the description
//! through mapping-key iteration, so the section and step ordering the
//! assembler produced must survive serialization untouched.

use std::io::{Read, Write};

use crate::model::description::SimulationDescription;
use crate::model::spec::SimulationSpec;

pub mod error;

pub use error::Error;

/// Reads one simulation specification tree.
pub fn read_spec<R: Read>(reader: R) -> Result<SimulationSpec, Error> {
    serde_json::from_reader(reader).map_err(Error::SpecParse)
}

/// Reads one specification tree from a JSON string.
pub fn read_spec_str(json: &str) -> Result<SimulationSpec, Error> {
    serde_json::from_str(json).map_err(Error::SpecParse)
}

/// Reads a whole pool: a JSON array of specification trees.
pub fn read_pool_str(json: &str) -> Result<Vec<SimulationSpec>, Error> {
    serde_json::from_str(json).map_err(Error::SpecParse)
}

/// Writes an assembled description as pretty-printed JSON.
pub fn write_description<W: Write>(
    writer: W,
    description: &SimulationDescription,
) -> Result<(), Error> {
    serde_json::to_writer_pretty(writer, description).map_err(Error::DescriptionWrite)
}

/// Serializes an assembled description to a JSON string.
pub fn description_to_string(description: &SimulationDescription) -> Result<String, Error> {
    serde_json::to_string_pretty(description).map_err(Error::DescriptionWrite)
}
