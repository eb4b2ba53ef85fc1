//! Rule registration contract and the capabilities handed to handlers
//!
//! A rule declares the normalized node kinds it recognizes and supplies one
//! handler per kind. The [`Rule`] trait is the engine's sole extension point:
//! rule code never touches converter or mapping internals except through the
//! [`RuleContext`] capabilities.

use crate::ast::{NodeKind, NormalizedNode};
use crate::diagnostic::{Diagnostic, Edit, Severity, SourceRange};
use crate::frontend::{NativeNode, NativeTree, SymbolDescriptor, TypeDescriptor, TypeQueryCache};
use crate::mapping::{MappingError, NodeMapping};
use thiserror::Error;

/// Failure signaled by a rule handler
#[derive(Debug, Error)]
pub enum RuleError {
    /// Non-fatal: recorded as a diagnostic for this rule/node, traversal
    /// continues for the remaining rules and nodes
    #[error("rule handler crashed: {0}")]
    Crash(String),

    /// Fatal: the whole file's traversal aborts immediately
    #[error("fatal handler failure: {0}")]
    Fatal(String),
}

/// A handler bound to one node kind.
///
/// Handlers run synchronously during traversal and must not block on I/O.
/// They must not share mutable state across rules beyond the diagnostic
/// collector they report into.
pub type Handler =
    Box<dyn Fn(&NormalizedNode, &mut RuleContext<'_>) -> Result<(), RuleError> + Send + Sync>;

/// A self-contained analysis unit
pub trait Rule: Send + Sync {
    /// Unique rule identifier (e.g. `for-in-array`)
    fn name(&self) -> &'static str;

    /// Node kinds this rule registers handlers for
    fn recognized_tags(&self) -> &'static [NodeKind];

    /// Severity used when the configuration has no override
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Whether this rule's diagnostics may carry suggested edits
    fn fixable(&self) -> bool {
        false
    }

    /// Build the kind-to-handler mapping. Called once per dispatch run,
    /// before traversal starts.
    fn create(&self) -> Vec<(NodeKind, Handler)>;
}

/// Capabilities available to a handler while visiting one node.
///
/// Bound to the reporting rule's id and effective severity by the dispatch
/// engine; the same context shape delegates mapping lookups and type-check
/// queries to the structures built for the current file.
pub struct RuleContext<'a> {
    rule_id: &'a str,
    severity: Severity,
    fixable: bool,
    mapping: &'a NodeMapping,
    native_tree: &'a NativeTree,
    types: &'a TypeQueryCache<'a>,
    sink: &'a mut Vec<Diagnostic>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        rule_id: &'a str,
        severity: Severity,
        fixable: bool,
        mapping: &'a NodeMapping,
        native_tree: &'a NativeTree,
        types: &'a TypeQueryCache<'a>,
        sink: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            rule_id,
            severity,
            fixable,
            mapping,
            native_tree,
            types,
            sink,
        }
    }

    /// Id of the rule this context reports for
    pub fn rule_id(&self) -> &str {
        self.rule_id
    }

    /// The native counterpart of a normalized node.
    ///
    /// Fails with [`MappingError::NoNative`] for synthetic nodes.
    pub fn native(&self, node: &NormalizedNode) -> Result<&NativeNode, MappingError> {
        let native_id = self.mapping.lookup_native(node.id())?;
        self.native_tree
            .get(native_id)
            .ok_or(MappingError::NoNative(node.id()))
    }

    /// Type of a normalized node, resolved through the mapping and the
    /// frontend's checker. `None` when the node is synthetic or the checker
    /// has no information.
    pub fn type_of(&self, node: &NormalizedNode) -> Option<TypeDescriptor> {
        let native_id = self.mapping.lookup_native(node.id()).ok()?;
        self.types.type_of(native_id)
    }

    /// Symbol of a normalized node, resolved the same way as [`type_of`].
    ///
    /// [`type_of`]: RuleContext::type_of
    pub fn symbol_of(&self, node: &NormalizedNode) -> Option<SymbolDescriptor> {
        let native_id = self.mapping.lookup_native(node.id()).ok()?;
        self.types.symbol_of(native_id)
    }

    /// Report a finding at the given range
    pub fn report(&mut self, range: SourceRange, message: &str) {
        let diag = Diagnostic::new(self.rule_id, self.severity, message, range);
        self.sink.push(diag);
    }

    /// Report a finding with suggested edits.
    ///
    /// Edits from rules not declared `fixable` are discarded; the finding
    /// itself is still reported.
    pub fn report_with_edits(&mut self, range: SourceRange, message: &str, edits: Vec<Edit>) {
        let mut diag = Diagnostic::new(self.rule_id, self.severity, message, range);
        if self.fixable {
            diag.edits = edits;
        } else if !edits.is_empty() {
            log::debug!(
                "rule '{}' is not fixable; dropping {} suggested edit(s)",
                self.rule_id,
                edits.len()
            );
        }
        self.sink.push(diag);
    }
}

/// Ordered collection of registered rules.
///
/// Registration order is dispatch order at each node, so it is part of the
/// deterministic-output contract.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. Later registrations run later at each node.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> &mut Self {
        if self.rules.iter().any(|r| r.name() == rule.name()) {
            log::warn!("rule '{}' registered more than once", rule.name());
        }
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
