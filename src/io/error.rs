use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse simulation specification: {0}")]
    SpecParse(#[source] serde_json::Error),

    #[error("failed to serialize simulation description: {0}")]
    DescriptionWrite(#[source] serde_json::Error),
}
