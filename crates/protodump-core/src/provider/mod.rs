//! Schema provider: turns protobuf descriptors into the report's tree.
//!
//! ## Architecture
//!
//! [`SchemaProvider`] takes the `FileDescriptorProto`s that protoc hands to a
//! plugin and:
//!
//! 1. Builds a resolved `DescriptorPool` using prost-reflect
//! 2. Indexes each file's `SourceCodeInfo` comments by element path
//! 3. Walks services, methods, messages and fields in declaration order,
//!    resolving field kinds, map entries and method types through the pool
//!
//! The resulting [`FileUnit`]s are plain data and can be rendered any number
//! of times.

mod source_info;

use crate::config::{DumpConfig, PathsMode};
use crate::error::{Error, Result};
use crate::model::{
    Cardinality, Field, FieldType, FileUnit, Kind, MapEntry, Message, MessageRef, MessageType,
    Method, Service,
};
use crate::report::ReportEngine;
use crate::sink::LineSink;
use prost::Message as _;
use prost_reflect::{DescriptorPool, FieldDescriptor, MessageDescriptor};
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    MethodDescriptorProto, ServiceDescriptorProto,
};
use source_info::{
    child_path, CommentIndex, FILE_MESSAGE_TYPE, FILE_SERVICE, MESSAGE_FIELD,
    MESSAGE_NESTED_TYPE, SERVICE_METHOD,
};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

/// Proto syntax version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoSyntax {
    /// Proto2 syntax
    Proto2,
    /// Proto3 syntax
    Proto3,
    /// Protobuf editions
    Editions,
}

impl ProtoSyntax {
    /// Returns the syntax declaration string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtoSyntax::Proto2 => "proto2",
            ProtoSyntax::Proto3 => "proto3",
            ProtoSyntax::Editions => "editions",
        }
    }
}

impl TryFrom<&str> for ProtoSyntax {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "" | "proto2" => Ok(ProtoSyntax::Proto2),
            "proto3" => Ok(ProtoSyntax::Proto3),
            "editions" => Ok(ProtoSyntax::Editions),
            _ => Err(Error::descriptor_build(format!(
                "unsupported proto syntax: '{}'",
                value
            ))),
        }
    }
}

/// Builds [`FileUnit`]s from protobuf descriptors
#[derive(Debug)]
pub struct SchemaProvider {
    /// Raw descriptors, dependencies first
    files: Vec<FileDescriptorProto>,
    /// Resolved pool over `files`
    pool: DescriptorPool,
    /// Names of the files requested for generation
    generate: BTreeSet<String>,
    config: DumpConfig,
}

impl SchemaProvider {
    /// Creates a provider over `files`, marking `generate` for output
    pub fn new<I, S>(files: Vec<FileDescriptorProto>, generate: I, config: DumpConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pool = Self::build_pool(&files)?;
        let generate: BTreeSet<String> = generate.into_iter().map(Into::into).collect();

        for name in &generate {
            if pool.get_file_by_name(name).is_none() {
                return Err(Error::file_not_found(name.as_str()));
            }
        }

        debug!(
            "Loaded {} files ({} to generate)",
            files.len(),
            generate.len()
        );

        Ok(Self {
            files,
            pool,
            generate,
            config,
        })
    }

    /// Creates a provider from a protoc plugin request, parsing its parameter
    pub fn from_request(request: CodeGeneratorRequest) -> Result<Self> {
        let config = DumpConfig::parse(request.parameter())?;
        Self::new(request.proto_file, request.file_to_generate, config)
    }

    /// Decodes a protoc plugin request and creates a provider from it
    pub fn from_request_bytes(data: &[u8]) -> Result<Self> {
        let request = CodeGeneratorRequest::decode(data)?;
        Self::from_request(request)
    }

    /// Creates a provider from a descriptor set.
    ///
    /// With no explicit `generate` names every file in the set is generated.
    pub fn from_file_descriptor_set(
        set: FileDescriptorSet,
        generate: Vec<String>,
        config: DumpConfig,
    ) -> Result<Self> {
        let generate = if generate.is_empty() {
            set.file.iter().map(|f| f.name().to_string()).collect()
        } else {
            generate
        };
        Self::new(set.file, generate, config)
    }

    fn build_pool(files: &[FileDescriptorProto]) -> Result<DescriptorPool> {
        let fds = FileDescriptorSet {
            file: files.to_vec(),
        };

        DescriptorPool::decode(fds.encode_to_vec().as_slice()).map_err(|e| {
            Error::descriptor_build(format!("failed to decode descriptor pool: {}", e))
        })
    }

    /// Returns the active configuration
    pub fn config(&self) -> &DumpConfig {
        &self.config
    }

    /// Returns the resolved descriptor pool
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Returns true if `name` was requested for generation
    pub fn is_generated(&self, name: &str) -> bool {
        self.generate.contains(name)
    }

    /// Builds the tree for every file, in input order
    pub fn file_units(&self) -> Result<Vec<FileUnit>> {
        self.files.iter().map(|file| self.file_unit(file)).collect()
    }

    /// Builds the tree and renders it to `sink` using this provider's config
    pub fn dump<S: LineSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        let units = self.file_units()?;
        ReportEngine::new()
            .with_config(self.config.report_config())
            .render(&units, sink)
    }

    fn file_unit(&self, proto: &FileDescriptorProto) -> Result<FileUnit> {
        let syntax = ProtoSyntax::try_from(proto.syntax()).unwrap_or_else(|e| {
            warn!("{}: {}, treating as proto2", proto.name(), e);
            ProtoSyntax::Proto2
        });
        let comments = CommentIndex::new(proto.source_code_info.as_ref());
        trace!(
            "{}: syntax {}, {} commented elements",
            proto.name(),
            syntax.as_str(),
            comments.len()
        );

        let walker = FileWalker {
            pool: &self.pool,
            comments: &comments,
            syntax,
        };

        let services = proto
            .service
            .iter()
            .enumerate()
            .map(|(i, service)| {
                walker.service(service, proto.package(), &child_path(&[], FILE_SERVICE, i))
            })
            .collect::<Result<Vec<_>>>()?;

        let messages = proto
            .message_type
            .iter()
            .enumerate()
            .map(|(i, message)| {
                walker.message(message, proto.package(), &child_path(&[], FILE_MESSAGE_TYPE, i))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FileUnit {
            path: proto.name().to_string(),
            package: proto.package().to_string(),
            generate: self.is_generated(proto.name()),
            generated_prefix: self.generated_prefix(proto),
            services,
            messages,
        })
    }

    /// Computes the generated filename prefix the way protoc-gen-go names
    /// its output.
    ///
    /// In import mode a configured `module` path is trimmed from the front.
    /// Fallbacks are only logged for files requested for generation.
    pub fn generated_prefix(&self, proto: &FileDescriptorProto) -> String {
        let stem = strip_extension(proto.name());
        let generated = self.is_generated(proto.name());

        if self.config.paths == PathsMode::SourceRelative {
            return stem.to_string();
        }

        let Some(import_path) = self.import_path(proto) else {
            if generated {
                warn!(
                    "{}: no go_package option or M mapping, using source-relative prefix",
                    proto.name()
                );
            }
            return stem.to_string();
        };

        let base = stem.rsplit('/').next().unwrap_or(stem);
        let prefix = format!("{}/{}", import_path, base);

        let Some(ref module) = self.config.module else {
            return prefix;
        };

        match prefix
            .strip_prefix(module.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(trimmed) => trimmed.to_string(),
            None => {
                if generated {
                    warn!(
                        "{}: prefix {} is outside module {}, keeping it whole",
                        proto.name(),
                        prefix,
                        module
                    );
                }
                prefix
            }
        }
    }

    /// Import path from an `M` mapping or the `go_package` option
    fn import_path(&self, proto: &FileDescriptorProto) -> Option<String> {
        let raw = self
            .config
            .import_paths
            .get(proto.name())
            .map(String::as_str)
            .or_else(|| proto.options.as_ref().and_then(|o| o.go_package.as_deref()))?;

        // "import/path;package_name" or just "import/path"
        let import_path = raw.split(';').next().unwrap_or(raw).trim_end_matches('/');
        if import_path.is_empty() {
            None
        } else {
            Some(import_path.to_string())
        }
    }
}

/// Walks one file's descriptors
struct FileWalker<'a> {
    pool: &'a DescriptorPool,
    comments: &'a CommentIndex,
    syntax: ProtoSyntax,
}

impl FileWalker<'_> {
    fn service(
        &self,
        service: &ServiceDescriptorProto,
        scope: &str,
        path: &[i32],
    ) -> Result<Service> {
        let full_name = qualify(scope, service.name());
        trace!("Resolving service {}", full_name);

        let methods = service
            .method
            .iter()
            .enumerate()
            .map(|(i, method)| self.method(method, &full_name, &child_path(path, SERVICE_METHOD, i)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Service {
            comments: self.comments.get(path),
            full_name,
            methods,
        })
    }

    fn method(&self, method: &MethodDescriptorProto, scope: &str, path: &[i32]) -> Result<Method> {
        Ok(Method {
            name: method.name().to_string(),
            full_name: qualify(scope, method.name()),
            comments: self.comments.get(path),
            input: self.message_ref(method.input_type())?,
            output: self.message_ref(method.output_type())?,
        })
    }

    fn message_ref(&self, type_name: &str) -> Result<MessageRef> {
        let descriptor = self.lookup_message(type_name)?;
        Ok(MessageRef {
            name: descriptor.name().to_string(),
            full_name: descriptor.full_name().to_string(),
        })
    }

    fn message(&self, message: &DescriptorProto, scope: &str, path: &[i32]) -> Result<Message> {
        let full_name = qualify(scope, message.name());
        trace!("Resolving message {}", full_name);
        let descriptor = self.lookup_message(&full_name)?;

        let fields = message
            .field
            .iter()
            .enumerate()
            .map(|(i, field)| {
                self.field(&descriptor, field, &child_path(path, MESSAGE_FIELD, i))
            })
            .collect::<Result<Vec<_>>>()?;

        // Synthetic map entries are kept; they are part of the parsed tree.
        let messages = message
            .nested_type
            .iter()
            .enumerate()
            .map(|(i, nested)| {
                self.message(nested, &full_name, &child_path(path, MESSAGE_NESTED_TYPE, i))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Message {
            name: message.name().to_string(),
            comments: self.comments.get(path),
            full_name,
            fields,
            messages,
        })
    }

    fn field(
        &self,
        parent: &MessageDescriptor,
        field: &FieldDescriptorProto,
        path: &[i32],
    ) -> Result<Field> {
        let descriptor = parent.get_field_by_name(field.name()).ok_or_else(|| {
            Error::descriptor_build(format!(
                "field '{}' not found in '{}'",
                field.name(),
                parent.full_name()
            ))
        })?;

        let ty = match descriptor.kind() {
            prost_reflect::Kind::Message(_) if descriptor.is_group() => FieldType::Scalar(Kind::Group),
            prost_reflect::Kind::Message(target) => {
                let map = if descriptor.is_map() {
                    Some(map_entry(&target))
                } else {
                    None
                };
                FieldType::Message(MessageType {
                    full_name: target.full_name().to_string(),
                    map,
                })
            }
            _ => FieldType::Scalar(kind_of(&descriptor)),
        };

        Ok(Field {
            name: field.name().to_string(),
            full_name: descriptor.full_name().to_string(),
            comments: self.comments.get(path),
            cardinality: self.cardinality(&descriptor, field),
            ty,
        })
    }

    fn cardinality(&self, descriptor: &FieldDescriptor, field: &FieldDescriptorProto) -> Cardinality {
        match descriptor.cardinality() {
            prost_reflect::Cardinality::Repeated => Cardinality::Repeated,
            prost_reflect::Cardinality::Required => Cardinality::Required,
            prost_reflect::Cardinality::Optional => {
                if self.syntax == ProtoSyntax::Proto3 && !field.proto3_optional() {
                    Cardinality::Singular
                } else {
                    Cardinality::Optional
                }
            }
        }
    }

    fn lookup_message(&self, type_name: &str) -> Result<MessageDescriptor> {
        let name = type_name.strip_prefix('.').unwrap_or(type_name);
        self.pool
            .get_message_by_name(name)
            .ok_or_else(|| Error::descriptor_build(format!("message '{}' not found in pool", name)))
    }
}

fn map_entry(entry: &MessageDescriptor) -> MapEntry {
    let key = entry.map_entry_key_field();
    let value = entry.map_entry_value_field();
    MapEntry {
        key: kind_of(&key),
        value_full_name: value.full_name().to_string(),
        value: kind_of(&value),
    }
}

fn kind_of(field: &FieldDescriptor) -> Kind {
    use prost_reflect::Kind as K;

    match field.kind() {
        K::Double => Kind::Double,
        K::Float => Kind::Float,
        K::Int32 => Kind::Int32,
        K::Int64 => Kind::Int64,
        K::Uint32 => Kind::Uint32,
        K::Uint64 => Kind::Uint64,
        K::Sint32 => Kind::Sint32,
        K::Sint64 => Kind::Sint64,
        K::Fixed32 => Kind::Fixed32,
        K::Fixed64 => Kind::Fixed64,
        K::Sfixed32 => Kind::Sfixed32,
        K::Sfixed64 => Kind::Sfixed64,
        K::Bool => Kind::Bool,
        K::String => Kind::String,
        K::Bytes => Kind::Bytes,
        K::Enum(_) => Kind::Enum,
        K::Message(_) if field.is_group() => Kind::Group,
        K::Message(_) => Kind::Message,
    }
}

/// Joins a scope and a short name into a fully-qualified name
fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

/// Strips the extension of the last path component, like Go's `path.Ext`
fn strip_extension(path: &str) -> &str {
    let base_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[base_start..].rfind('.') {
        Some(dot) => &path[..base_start + dot],
        None => path,
    }
}
