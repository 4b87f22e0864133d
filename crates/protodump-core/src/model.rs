//! Read-only descriptor tree consumed by the report engine.
//!
//! The tree is built once by a schema provider (see [`crate::provider`]) and
//! never mutated afterwards. Every collection keeps source declaration order.

use std::fmt;

/// A single schema source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUnit {
    /// Source path as given to protoc, e.g. `foo/bar.proto`
    pub path: String,
    /// Package name, empty for files without a `package` statement
    pub package: String,
    /// Whether the file was requested for generation
    pub generate: bool,
    /// Prefix that generated artifacts for this file would carry
    pub generated_prefix: String,
    /// Top-level services
    pub services: Vec<Service>,
    /// Top-level messages
    pub messages: Vec<Message>,
}

/// A service definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    /// Fully-qualified name
    pub full_name: String,
    /// Attached comments
    pub comments: CommentSet,
    /// Methods in declaration order
    pub methods: Vec<Method>,
}

/// A method of a service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Method {
    /// Short name
    pub name: String,
    /// Fully-qualified name
    pub full_name: String,
    /// Attached comments
    pub comments: CommentSet,
    /// Request message
    pub input: MessageRef,
    /// Response message
    pub output: MessageRef,
}

/// Name-only reference to a message, used for method input and output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRef {
    /// Short name
    pub name: String,
    /// Fully-qualified name
    pub full_name: String,
}

impl MessageRef {
    /// Creates a reference from a fully-qualified name, taking the last
    /// component as the short name
    pub fn from_full_name(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let name = full_name
            .rsplit_once('.')
            .map(|(_, name)| name)
            .unwrap_or(&full_name)
            .to_string();
        Self { name, full_name }
    }
}

/// A message definition, possibly nested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Short name
    pub name: String,
    /// Fully-qualified name
    pub full_name: String,
    /// Attached comments
    pub comments: CommentSet,
    /// Fields in declaration order
    pub fields: Vec<Field>,
    /// Nested messages, including synthetic map entries
    pub messages: Vec<Message>,
}

/// A field of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Short name
    pub name: String,
    /// Fully-qualified name
    pub full_name: String,
    /// Attached comments
    pub comments: CommentSet,
    /// Field cardinality
    pub cardinality: Cardinality,
    /// Scalar kind or message target
    pub ty: FieldType,
}

/// Type of a field: either a scalar-family kind or a message reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Scalar, enum or group field
    Scalar(Kind),
    /// Message-typed field
    Message(MessageType),
}

impl FieldType {
    /// Returns the map entry when this is a map field
    pub fn map_entry(&self) -> Option<&MapEntry> {
        match self {
            FieldType::Message(message) => message.map.as_ref(),
            FieldType::Scalar(_) => None,
        }
    }
}

/// Target of a message-typed field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageType {
    /// Fully-qualified name of the target message
    pub full_name: String,
    /// Key/value description when the target is a synthetic map entry
    pub map: Option<MapEntry>,
}

impl MessageType {
    /// Creates a plain (non-map) message target
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            map: None,
        }
    }
}

/// Key and value of a map field, derived from its synthetic entry message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    /// Kind of the key field
    pub key: Kind,
    /// Fully-qualified name of the entry's value field
    pub value_full_name: String,
    /// Kind of the value field
    pub value: Kind,
}

/// Field kind token as printed in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Kind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
    Group,
}

impl Kind {
    /// Returns the lowercase token used in `.proto` syntax
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Double => "double",
            Kind::Float => "float",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Sint32 => "sint32",
            Kind::Sint64 => "sint64",
            Kind::Fixed32 => "fixed32",
            Kind::Fixed64 => "fixed64",
            Kind::Sfixed32 => "sfixed32",
            Kind::Sfixed64 => "sfixed64",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Enum => "enum",
            Kind::Message => "message",
            Kind::Group => "group",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Proto3 field without explicit presence
    Singular,
    /// Proto2 `optional` or proto3 explicit `optional`
    Optional,
    /// Proto2 `required`
    Required,
    /// `repeated`, including map fields
    Repeated,
}

impl Cardinality {
    /// Returns the token printed in the report
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Singular => "singular",
            Cardinality::Optional => "optional",
            Cardinality::Required => "required",
            Cardinality::Repeated => "repeated",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comments attached to a descriptor
///
/// Text is stored raw, the way protoc records it in `SourceCodeInfo`: each
/// line keeps the space after `//` and blocks end with a newline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentSet {
    /// Comment blocks separated from the entity by a blank line
    pub leading_detached: Vec<String>,
    /// Comment block directly above the entity
    pub leading: String,
    /// Comment following the entity
    pub trailing: String,
}

impl CommentSet {
    /// Creates a comment set with only a leading comment
    pub fn leading(text: impl Into<String>) -> Self {
        Self {
            leading: text.into(),
            ..Self::default()
        }
    }

    /// Sets the trailing comment
    pub fn with_trailing(mut self, text: impl Into<String>) -> Self {
        self.trailing = text.into();
        self
    }

    /// Appends a detached leading block
    pub fn with_detached(mut self, text: impl Into<String>) -> Self {
        self.leading_detached.push(text.into());
        self
    }

    /// Returns true if no part carries any text
    pub fn is_empty(&self) -> bool {
        self.leading_detached.is_empty() && self.leading.is_empty() && self.trailing.is_empty()
    }
}
