//! Rule dispatch over one traversal of the normalized tree
//!
//! All active rules are aggregated into one combined table keyed by node
//! kind before traversal starts; the tree is then walked once, depth-first
//! pre-order, invoking every handler registered for each visited node's kind
//! in registration order. One shared traversal instead of one walk per rule;
//! the price is that handlers must not share mutable state across rules
//! beyond the diagnostic collector.

use crate::ast::{NodeId, NodeKind, NormalizedNode};
use crate::collector::DiagnosticCollector;
use crate::config::Config;
use crate::diagnostic::{Diagnostic, Severity};
use crate::frontend::{NativeTree, TypeQueryCache};
use crate::mapping::NodeMapping;
use crate::rule::{Handler, RuleContext, RuleError, RuleRegistry};
use std::collections::HashMap;
use thiserror::Error;

/// Rule id attached to the diagnostic recorded for a fatal handler failure
pub const FATAL_FAILURE_RULE_ID: &str = "fatal-handler-failure";

/// A fatal handler failure that aborted the traversal
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("rule '{rule_id}' signaled a fatal failure at {kind} node {node}: {message}")]
pub struct FatalAbort {
    /// The responsible rule
    pub rule_id: String,
    /// The node being visited when the handler failed
    pub node: NodeId,
    /// Kind of that node
    pub kind: NodeKind,
    /// The handler's message
    pub message: String,
}

/// Traversal lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    NotStarted,
    Visiting(NodeId),
    Finished,
    Aborted,
}

struct DispatchEntry {
    rule_id: &'static str,
    severity: Severity,
    fixable: bool,
    handler: Handler,
}

/// Runs all registered rules over one traversal
pub struct Dispatcher {
    /// node kind -> handlers in registration order
    table: HashMap<NodeKind, Vec<DispatchEntry>>,
    state: TraversalState,
}

impl Dispatcher {
    /// Build the combined dispatch table from the registry, applying the
    /// config's rule enablement and severity overrides. Handlers for tags a
    /// rule did not declare in `recognized_tags` are rejected.
    pub fn new(registry: &RuleRegistry, config: &Config) -> Self {
        let mut table: HashMap<NodeKind, Vec<DispatchEntry>> = HashMap::new();

        for rule in registry.rules() {
            let name = rule.name();
            if !config.is_rule_enabled(name) {
                log::debug!("rule '{}' disabled by configuration", name);
                continue;
            }
            let severity = config
                .severity_override(name)
                .unwrap_or_else(|| rule.default_severity());

            for (kind, handler) in rule.create() {
                if !rule.recognized_tags().contains(&kind) {
                    log::warn!(
                        "rule '{}' supplied a handler for undeclared tag '{}'; ignoring it",
                        name,
                        kind
                    );
                    continue;
                }
                table.entry(kind).or_default().push(DispatchEntry {
                    rule_id: name,
                    severity,
                    fixable: rule.fixable(),
                    handler,
                });
            }
        }

        Self {
            table,
            state: TraversalState::NotStarted,
        }
    }

    /// Current traversal state
    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// Number of (kind, handler) entries in the combined table
    pub fn handler_count(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    /// Walk the tree once, invoking handlers at every node.
    ///
    /// A `Crash` from a handler is contained: a diagnostic is recorded for
    /// that rule/node and the traversal continues. A `Fatal` aborts
    /// immediately; the fatal diagnostic naming the rule and node is
    /// recorded and the abort is returned to the caller.
    pub fn run(
        &mut self,
        root: &NormalizedNode,
        mapping: &NodeMapping,
        native_tree: &NativeTree,
        types: &TypeQueryCache<'_>,
        collector: &mut DiagnosticCollector,
    ) -> Result<(), FatalAbort> {
        for node in root.iter_preorder() {
            self.state = TraversalState::Visiting(node.id());

            let Some(entries) = self.table.get(&node.kind()) else {
                continue;
            };

            for entry in entries {
                let mut ctx = RuleContext::new(
                    entry.rule_id,
                    entry.severity,
                    entry.fixable,
                    mapping,
                    native_tree,
                    types,
                    collector.sink(),
                );

                match (entry.handler)(node, &mut ctx) {
                    Ok(()) => {}
                    Err(RuleError::Crash(message)) => {
                        log::warn!(
                            "rule '{}' crashed at {} node {}: {}",
                            entry.rule_id,
                            node.kind(),
                            node.id(),
                            message
                        );
                        collector.push(Diagnostic::new(
                            entry.rule_id,
                            Severity::Error,
                            &format!("Rule crashed: {}", message),
                            node.range(),
                        ));
                    }
                    Err(RuleError::Fatal(message)) => {
                        self.state = TraversalState::Aborted;
                        let abort = FatalAbort {
                            rule_id: entry.rule_id.to_string(),
                            node: node.id(),
                            kind: node.kind(),
                            message,
                        };
                        collector.push(Diagnostic::new(
                            FATAL_FAILURE_RULE_ID,
                            Severity::Error,
                            &abort.to_string(),
                            node.range(),
                        ));
                        return Err(abort);
                    }
                }
            }
        }

        self.state = TraversalState::Finished;
        Ok(())
    }
}
