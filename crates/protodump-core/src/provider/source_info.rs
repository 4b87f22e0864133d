//! Comment lookup over `SourceCodeInfo`.
//!
//! protoc identifies every element by a path of field numbers and indices
//! into `FileDescriptorProto`, e.g. `[4, 0, 2, 1]` is the second field of the
//! first top-level message.

use crate::model::CommentSet;
use prost_types::SourceCodeInfo;
use std::collections::HashMap;

/// `FileDescriptorProto.message_type`
pub(crate) const FILE_MESSAGE_TYPE: i32 = 4;
/// `FileDescriptorProto.service`
pub(crate) const FILE_SERVICE: i32 = 6;
/// `DescriptorProto.field`
pub(crate) const MESSAGE_FIELD: i32 = 2;
/// `DescriptorProto.nested_type`
pub(crate) const MESSAGE_NESTED_TYPE: i32 = 3;
/// `ServiceDescriptorProto.method`
pub(crate) const SERVICE_METHOD: i32 = 2;

/// Comments of one file, keyed by element path
#[derive(Debug, Default)]
pub(crate) struct CommentIndex {
    by_path: HashMap<Vec<i32>, CommentSet>,
}

impl CommentIndex {
    pub(crate) fn new(info: Option<&SourceCodeInfo>) -> Self {
        let mut by_path = HashMap::new();

        for location in info.into_iter().flat_map(|info| info.location.iter()) {
            let comments = CommentSet {
                leading_detached: location.leading_detached_comments.clone(),
                leading: location.leading_comments().to_string(),
                trailing: location.trailing_comments().to_string(),
            };
            if comments.is_empty() {
                continue;
            }
            // protoc may repeat a path; the first location is the declaration
            by_path.entry(location.path.clone()).or_insert(comments);
        }

        Self { by_path }
    }

    /// Comments at `path`, empty when the element has none
    pub(crate) fn get(&self, path: &[i32]) -> CommentSet {
        self.by_path.get(path).cloned().unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_path.len()
    }
}

/// Appends `(tag, index)` to a parent path
pub(crate) fn child_path(parent: &[i32], tag: i32, index: usize) -> Vec<i32> {
    let mut path = Vec::with_capacity(parent.len() + 2);
    path.extend_from_slice(parent);
    path.push(tag);
    path.push(index as i32);
    path
}
