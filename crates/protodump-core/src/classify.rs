//! Well-known type classification.

/// Decides whether a fully-qualified message name is a well-known type.
///
/// Any `Fn(&str) -> bool` closure works as a classifier, which keeps tests
/// and alternative standard libraries cheap to plug in.
pub trait TypeClassifier {
    /// Returns true if `full_name` belongs to the well-known set
    fn is_well_known(&self, full_name: &str) -> bool;
}

impl<F> TypeClassifier for F
where
    F: Fn(&str) -> bool,
{
    fn is_well_known(&self, full_name: &str) -> bool {
        self(full_name)
    }
}

/// Package of the protobuf well-known types
pub const WELL_KNOWN_PACKAGE: &str = "google.protobuf";

/// Message names shipped in the protobuf well-known types, sorted
const WELL_KNOWN_MESSAGES: &[&str] = &[
    "Any",
    "Api",
    "BoolValue",
    "BytesValue",
    "DoubleValue",
    "Duration",
    "Empty",
    "Enum",
    "EnumValue",
    "Field",
    "FieldMask",
    "FloatValue",
    "Int32Value",
    "Int64Value",
    "ListValue",
    "Method",
    "Mixin",
    "Option",
    "SourceContext",
    "StringValue",
    "Struct",
    "Timestamp",
    "Type",
    "UInt32Value",
    "UInt64Value",
    "Value",
];

/// Classifier for the `google.protobuf` well-known types
#[derive(Debug, Clone, Copy, Default)]
pub struct WellKnownTypes;

impl TypeClassifier for WellKnownTypes {
    fn is_well_known(&self, full_name: &str) -> bool {
        let full_name = full_name.strip_prefix('.').unwrap_or(full_name);
        full_name
            .strip_prefix(WELL_KNOWN_PACKAGE)
            .and_then(|rest| rest.strip_prefix('.'))
            .map_or(false, |name| WELL_KNOWN_MESSAGES.binary_search(&name).is_ok())
    }
}
