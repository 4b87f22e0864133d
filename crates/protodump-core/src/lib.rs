//! # protodump-core
//!
//! A library for rendering diagnostic dumps of Protocol Buffer schemas.
//!
//! Given the descriptors a protobuf compiler hands to a plugin, this crate
//! produces a deterministic, indented report of every service, method,
//! message and field, optionally annotated with the source comments the
//! compiler attached to them.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`model`]: The read-only descriptor tree
//! - [`provider`]: Builds the tree from `FileDescriptorProto`s
//! - [`report`]: The rendering engine
//! - [`comments`]: Comment formatting helpers
//! - [`classify`]: Well-known type classification
//! - [`sink`]: Line sinks the report is written to
//! - [`config`]: Plugin parameter parsing
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use protodump_core::{SchemaProvider, WriteSink};
//! use std::io::Read;
//!
//! // A serialized CodeGeneratorRequest, as protoc sends it to plugins
//! let mut request = Vec::new();
//! std::io::stdin().read_to_end(&mut request)?;
//!
//! let provider = SchemaProvider::from_request_bytes(&request)?;
//! provider.dump(&mut WriteSink::stderr())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`LineSink`]: Send the report somewhere other than stderr
//! - [`TypeClassifier`]: Change which types are tagged `(wellknown)`
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod classify;
pub mod comments;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;
pub mod sink;

// Re-export primary types for convenience
pub use classify::{TypeClassifier, WellKnownTypes};
pub use config::{DumpConfig, PathsMode};
pub use error::{Error, Result};
pub use model::{
    Cardinality, CommentSet, Field, FieldType, FileUnit, Kind, MapEntry, Message, MessageRef,
    MessageType, Method, Service,
};
pub use provider::{ProtoSyntax, SchemaProvider};
pub use report::{render, ReportConfig, ReportEngine};
pub use sink::{LineSink, MemorySink, WriteSink};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
