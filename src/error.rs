use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deserialization failed. `path` is the serde path of the offending field.
    #[error("could not parse xml at '{path}': {message}")]
    Xml { path: String, message: String },

    #[error("could not write xml: {0}")]
    XmlWrite(String),

    #[error("file format of {0:?} not supported. Use '.xml' or '.xml.gz'")]
    UnsupportedFormat(PathBuf),

    #[error("input file {0:?} not found")]
    MissingInput(PathBuf),

    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("config error: {0}")]
    Config(String),

    /// Raised by implementations of the traffic control interface.
    #[error("traffic control failed: {0}")]
    Control(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidValue {
            field,
            value: value.into(),
        }
    }
}
