//! Bidirectional index between native and normalized node identities
//!
//! The mapping owns neither tree: it associates opaque ids only, keeping
//! ownership acyclic. It is written by the converter during one conversion
//! pass and is read-only afterwards, so concurrent reads from rule handlers
//! need no locking.

use crate::ast::NodeId;
use crate::frontend::NativeNodeId;
use std::collections::HashMap;
use thiserror::Error;

/// Error querying the node mapping
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    /// The normalized node is synthetic: it has no native counterpart
    #[error("no native counterpart for normalized node {0}")]
    NoNative(NodeId),

    /// The native node was never converted (not part of this pass)
    #[error("no normalized counterpart for native node {0}")]
    NoNormalized(NativeNodeId),
}

/// Bijective association between non-synthetic normalized nodes and native
/// nodes, built once per conversion pass.
#[derive(Debug, Default, Clone)]
pub struct NodeMapping {
    to_native: HashMap<NodeId, NativeNodeId>,
    to_normalized: HashMap<NativeNodeId, NodeId>,
}

impl NodeMapping {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a pair. Converter-only; the store is immutable after build.
    pub(crate) fn insert(&mut self, normalized: NodeId, native: NativeNodeId) {
        self.to_native.insert(normalized, native);
        self.to_normalized.insert(native, normalized);
    }

    /// Native counterpart of a normalized node. O(1) amortized.
    pub fn lookup_native(&self, normalized: NodeId) -> Result<NativeNodeId, MappingError> {
        self.to_native
            .get(&normalized)
            .copied()
            .ok_or(MappingError::NoNative(normalized))
    }

    /// Normalized counterpart of a native node. O(1) amortized.
    pub fn lookup_normalized(&self, native: NativeNodeId) -> Result<NodeId, MappingError> {
        self.to_normalized
            .get(&native)
            .copied()
            .ok_or(MappingError::NoNormalized(native))
    }

    /// Whether the normalized node has a native counterpart
    pub fn contains(&self, normalized: NodeId) -> bool {
        self.to_native.contains_key(&normalized)
    }

    /// Number of mapped pairs
    pub fn len(&self) -> usize {
        self.to_native.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_native.is_empty()
    }
}
