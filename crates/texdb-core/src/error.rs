use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A section declared in the root document has no content file.
    #[error("Missing section identifier '{0}': declared in the root document but no content file was loaded")]
    MissingSection(String),

    /// The root document does not have the structure the extractor expects.
    #[error("Unexpected document layout: {0}")]
    Layout(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
