//! Error types for the protodump-core library.
//!
//! The report engine itself cannot fail on a resolved descriptor tree; every
//! variant here belongs to one of its collaborators (decoding, resolution,
//! parameter parsing, or the line sink).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for protodump operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all protodump operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode a protobuf message (request, descriptor set)
    #[error("failed to decode protobuf message: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Failed to build the descriptor pool with prost-reflect
    #[error("failed to build descriptor pool: {0}")]
    DescriptorBuild(String),

    /// A file named for generation is missing from the descriptor pool
    #[error("file '{name}' not found in descriptor pool")]
    FileNotFound {
        /// Name of the missing file
        name: String,
    },

    /// Unknown or malformed plugin parameter
    #[error("invalid plugin parameter '{param}': {reason}")]
    InvalidParameter {
        /// The offending parameter entry
        param: String,
        /// Why it was rejected
        reason: String,
    },

    /// The line sink failed to accept a line
    #[error("failed to write report line: {0}")]
    Sink(#[source] std::io::Error),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new descriptor build error
    pub fn descriptor_build(msg: impl Into<String>) -> Self {
        Self::DescriptorBuild(msg.into())
    }

    /// Creates a new missing-file error
    pub fn file_not_found(name: impl Into<String>) -> Self {
        Self::FileNotFound { name: name.into() }
    }

    /// Creates a new invalid parameter error
    pub fn invalid_parameter(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error came from writing the report rather than
    /// from reading the schema
    pub fn is_sink_error(&self) -> bool {
        matches!(self, Self::Sink(_))
    }
}
