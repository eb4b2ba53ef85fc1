//! Conversion from the frontend's native tree to the normalized tree
//!
//! One conversion pass walks the native tree depth-first in source order,
//! builds the normalized counterpart of every node it models, and registers
//! each native/normalized pair in the [`NodeMapping`] as it goes. Ids are
//! allocated pre-order and each pair is registered before the node's children
//! are converted, so a child's construction can already look up its
//! registered ancestors.
//!
//! No normalized subtree is ever shared. A frontend that models a
//! cross-reference as an extra tree edge gets a separate normalized subtree
//! for it; only the first occurrence of a native node enters the mapping, so
//! both directions stay unambiguous.

use crate::ast::{DeclarationKind, NodeId, NormalizedNode};
use crate::diagnostic::{Diagnostic, Severity};
use crate::frontend::{NativeKind, NativeNode, NativeNodeId, NativeTree};
use crate::mapping::NodeMapping;
use thiserror::Error;

/// Error during conversion
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The frontend never produced a usable tree. Checked before conversion
    /// starts, never retried.
    #[error("frontend reported a parse failure: {0}")]
    Parse(String),

    /// An unmodeled native kind was met under the abort policy
    #[error("unsupported native node kind {kind} at offset {offset}")]
    UnsupportedKind { kind: NativeKind, offset: usize },

    /// The native tree violates the shape the converter expects
    #[error("invalid native tree: {0}")]
    Invalid(String),
}

/// Converter options
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Abort the whole conversion on an unmodeled native kind instead of
    /// substituting a placeholder node and warning
    pub abort_on_unsupported: bool,
}

/// Output of one conversion pass. The tree and the mapping are created
/// together and should be dropped together when the file's analysis ends.
#[derive(Debug)]
pub struct Conversion {
    /// Root of the normalized tree
    pub root: NormalizedNode,
    /// Bidirectional native/normalized index
    pub mapping: NodeMapping,
    /// Non-fatal conversion diagnostics (unsupported-node warnings)
    pub diagnostics: Vec<Diagnostic>,
}

/// Rule id attached to unsupported-node warnings
pub const UNSUPPORTED_NODE_RULE_ID: &str = "unsupported-node";

/// Converts native trees into normalized trees plus mappings
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Convert one native tree.
    ///
    /// Fails with [`ConvertError::Parse`] when the frontend recorded a parse
    /// failure, before any node is visited.
    pub fn convert(&self, tree: &NativeTree) -> Result<Conversion, ConvertError> {
        if let Some(message) = tree.parse_error() {
            return Err(ConvertError::Parse(message.to_string()));
        }

        let mut pass = Pass {
            tree,
            options: self.options,
            next_id: 0,
            mapping: NodeMapping::new(),
            diagnostics: Vec::new(),
        };

        let root = pass.convert_node(tree.root())?;
        log::debug!(
            "converted {} native nodes into {} normalized nodes ({} warnings)",
            tree.node_count(),
            root.count(),
            pass.diagnostics.len()
        );

        Ok(Conversion {
            root,
            mapping: pass.mapping,
            diagnostics: pass.diagnostics,
        })
    }
}

/// State of one conversion pass
struct Pass<'a> {
    tree: &'a NativeTree,
    options: ConvertOptions,
    next_id: u32,
    mapping: NodeMapping,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Pass<'a> {
    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn node(&self, id: NativeNodeId) -> Result<&'a NativeNode, ConvertError> {
        self.tree
            .get(id)
            .ok_or_else(|| ConvertError::Invalid(format!("dangling native node id {}", id)))
    }

    /// Convert one native node and its subtree.
    ///
    /// The kind dispatch is a match over the closed native kind set; each arm
    /// builds the corresponding normalized shape, copying the source range
    /// verbatim and recursing into children in source order.
    fn convert_node(&mut self, native_id: NativeNodeId) -> Result<NormalizedNode, ConvertError> {
        let native = self.node(native_id)?;
        let range = native.range;

        // Placeholder path: synthetic, gets an id but no mapping entry.
        if !is_modeled(native.kind) {
            return self.unsupported(native);
        }

        // Register before recursing: pre-order ids, ancestors visible to
        // children mid-pass. A native node reachable through a second parent
        // edge keeps its first mapping entry; the extra copy goes unmapped so
        // the reverse direction stays unambiguous.
        let id = self.alloc_id();
        if self.mapping.lookup_normalized(native_id).is_err() {
            self.mapping.insert(id, native_id);
        } else {
            log::debug!(
                "native node {} re-encountered; copy {} left unmapped",
                native_id,
                id
            );
        }

        let node = match native.kind {
            NativeKind::SourceFile => NormalizedNode::Program {
                id,
                range,
                body: self.convert_all(&native.children)?,
            },
            NativeKind::Block => NormalizedNode::BlockStatement {
                id,
                range,
                body: self.convert_all(&native.children)?,
            },
            NativeKind::ExpressionStatement => NormalizedNode::ExpressionStatement {
                id,
                range,
                expression: Box::new(self.convert_child(native, 0)?),
            },
            NativeKind::VariableStatement => {
                let keyword = native.text.as_deref().ok_or_else(|| {
                    ConvertError::Invalid(format!(
                        "variable statement {} has no declaration keyword",
                        native_id
                    ))
                })?;
                let kind = keyword.parse::<DeclarationKind>().map_err(|e| {
                    ConvertError::Invalid(format!("variable statement {}: {}", native_id, e))
                })?;
                NormalizedNode::VariableDeclaration {
                    id,
                    range,
                    kind,
                    declarations: self.convert_all(&native.children)?,
                }
            }
            NativeKind::VariableDeclaration => {
                let name = Box::new(self.convert_child(native, 0)?);
                let init = self.convert_child_opt(native, 1)?.map(Box::new);
                NormalizedNode::VariableDeclarator {
                    id,
                    range,
                    name,
                    init,
                }
            }
            NativeKind::FunctionDeclaration => {
                // Child layout: name, params..., body.
                if native.children.len() < 2 {
                    return Err(ConvertError::Invalid(format!(
                        "function declaration {} has no name or body",
                        native_id
                    )));
                }
                let name = Box::new(self.convert_child(native, 0)?);
                let mut params = Vec::new();
                for idx in 1..native.children.len() - 1 {
                    params.push(self.convert_child(native, idx)?);
                }
                let body = Box::new(self.convert_child(native, native.children.len() - 1)?);
                NormalizedNode::FunctionDeclaration {
                    id,
                    range,
                    name,
                    params,
                    body,
                }
            }
            // Parameters normalize to plain identifiers; the distinction
            // lives in the parent function node.
            NativeKind::Parameter | NativeKind::Identifier => NormalizedNode::Identifier {
                id,
                range,
                name: native.text.clone().unwrap_or_default(),
            },
            NativeKind::IfStatement => NormalizedNode::IfStatement {
                id,
                range,
                test: Box::new(self.convert_child(native, 0)?),
                consequent: Box::new(self.convert_child(native, 1)?),
                alternate: self.convert_child_opt(native, 2)?.map(Box::new),
            },
            NativeKind::ForInStatement => NormalizedNode::ForInStatement {
                id,
                range,
                left: Box::new(self.convert_child(native, 0)?),
                right: Box::new(self.convert_child(native, 1)?),
                body: Box::new(self.convert_child(native, 2)?),
            },
            NativeKind::ReturnStatement => NormalizedNode::ReturnStatement {
                id,
                range,
                argument: self.convert_child_opt(native, 0)?.map(Box::new),
            },
            NativeKind::DebuggerStatement => NormalizedNode::DebuggerStatement { id, range },
            NativeKind::BinaryExpression => NormalizedNode::BinaryExpression {
                id,
                range,
                operator: native.text.clone().unwrap_or_default(),
                left: Box::new(self.convert_child(native, 0)?),
                right: Box::new(self.convert_child(native, 1)?),
            },
            NativeKind::CallExpression => {
                if native.children.is_empty() {
                    return Err(ConvertError::Invalid(format!(
                        "call expression {} has no callee",
                        native_id
                    )));
                }
                let callee = Box::new(self.convert_child(native, 0)?);
                let mut arguments = Vec::new();
                for idx in 1..native.children.len() {
                    arguments.push(self.convert_child(native, idx)?);
                }
                NormalizedNode::CallExpression {
                    id,
                    range,
                    callee,
                    arguments,
                }
            }
            NativeKind::PropertyAccessExpression => NormalizedNode::MemberExpression {
                id,
                range,
                object: Box::new(self.convert_child(native, 0)?),
                property: Box::new(self.convert_child(native, 1)?),
            },
            NativeKind::NumericLiteral | NativeKind::StringLiteral => NormalizedNode::Literal {
                id,
                range,
                raw: native.text.clone().unwrap_or_default(),
            },
            NativeKind::JsxElement | NativeKind::WithStatement | NativeKind::Decorator => {
                unreachable!("unmodeled kinds are handled before dispatch")
            }
        };

        Ok(node)
    }

    fn convert_all(&mut self, children: &[NativeNodeId]) -> Result<Vec<NormalizedNode>, ConvertError> {
        children.iter().map(|c| self.convert_node(*c)).collect()
    }

    fn convert_child(
        &mut self,
        native: &NativeNode,
        idx: usize,
    ) -> Result<NormalizedNode, ConvertError> {
        let child = *native.children.get(idx).ok_or_else(|| {
            ConvertError::Invalid(format!(
                "{} node {} is missing child {}",
                native.kind, native.id, idx
            ))
        })?;
        self.convert_node(child)
    }

    fn convert_child_opt(
        &mut self,
        native: &NativeNode,
        idx: usize,
    ) -> Result<Option<NormalizedNode>, ConvertError> {
        match native.children.get(idx) {
            Some(child) => Ok(Some(self.convert_node(*child)?)),
            None => Ok(None),
        }
    }

    /// Unsupported-kind policy: abort, or warn and substitute a placeholder
    /// preserving only the source range.
    fn unsupported(&mut self, native: &NativeNode) -> Result<NormalizedNode, ConvertError> {
        if self.options.abort_on_unsupported {
            return Err(ConvertError::UnsupportedKind {
                kind: native.kind,
                offset: native.range.start_offset,
            });
        }

        self.diagnostics.push(Diagnostic::new(
            UNSUPPORTED_NODE_RULE_ID,
            Severity::Warning,
            &format!(
                "Unsupported native node kind '{}'; substituted a placeholder",
                native.kind
            ),
            native.range,
        ));

        let id = self.alloc_id();
        Ok(NormalizedNode::Unsupported {
            id,
            range: native.range,
        })
    }
}

/// Whether the converter models this native kind
fn is_modeled(kind: NativeKind) -> bool {
    !matches!(
        kind,
        NativeKind::JsxElement | NativeKind::WithStatement | NativeKind::Decorator
    )
}

/// Convert with default options. Shorthand for one-off conversions.
pub fn convert(tree: &NativeTree) -> Result<Conversion, ConvertError> {
    Converter::default().convert(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::diagnostic::{Position, SourceRange};
    use crate::frontend::NativeTreeBuilder;

    fn range(start: usize, end: usize) -> SourceRange {
        SourceRange::new(
            start,
            end,
            Position::new(1, start as u32 + 1),
            Position::new(1, end as u32 + 1),
        )
    }

    /// `for (i in items) { }` plus a trailing `debugger;`
    fn sample_tree() -> NativeTree {
        let mut b = NativeTreeBuilder::new();
        let left = b.push(NativeKind::Identifier, range(5, 6), Some("i"), vec![]);
        let right = b.push(NativeKind::Identifier, range(10, 15), Some("items"), vec![]);
        let body = b.push(NativeKind::Block, range(17, 20), None, vec![]);
        let for_in = b.push(
            NativeKind::ForInStatement,
            range(0, 20),
            None,
            vec![left, right, body],
        );
        let debugger = b.push(NativeKind::DebuggerStatement, range(21, 30), None, vec![]);
        let root = b.push(NativeKind::SourceFile, range(0, 30), None, vec![for_in, debugger]);
        b.root(root);
        b.build()
    }

    #[test]
    fn test_parse_error_checked_first() {
        let mut b = NativeTreeBuilder::new();
        b.push(NativeKind::SourceFile, range(0, 0), None, vec![]);
        b.parse_error("unexpected token");
        let tree = b.build();

        let err = convert(&tree).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(ref m) if m == "unexpected token"));
    }

    #[test]
    fn test_empty_source_file() {
        let mut b = NativeTreeBuilder::new();
        let root = b.push(NativeKind::SourceFile, range(0, 0), None, vec![]);
        b.root(root);
        let conversion = convert(&b.build()).unwrap();

        assert_eq!(conversion.root.kind(), NodeKind::Program);
        assert!(conversion.root.children().is_empty());
        assert_eq!(conversion.root.count(), 1);
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn test_node_count_parity() {
        let tree = sample_tree();
        let conversion = convert(&tree).unwrap();
        assert_eq!(conversion.root.count(), tree.node_count());
        assert_eq!(conversion.mapping.len(), tree.node_count());
    }

    #[test]
    fn test_mapping_bijective_roundtrip() {
        let tree = sample_tree();
        let conversion = convert(&tree).unwrap();

        for native_id in tree.iter_preorder() {
            let normalized = conversion.mapping.lookup_normalized(native_id).unwrap();
            assert_eq!(conversion.mapping.lookup_native(normalized), Ok(native_id));
        }
        for node in conversion.root.iter_preorder() {
            let native = conversion.mapping.lookup_native(node.id()).unwrap();
            assert_eq!(conversion.mapping.lookup_normalized(native), Ok(node.id()));
        }
    }

    #[test]
    fn test_preorder_ids_parents_before_children() {
        let conversion = convert(&sample_tree()).unwrap();

        fn check(node: &NormalizedNode) {
            for child in node.children() {
                assert!(node.id() < child.id());
                check(child);
            }
        }
        check(&conversion.root);
    }

    #[test]
    fn test_ranges_copied_verbatim() {
        let tree = sample_tree();
        let conversion = convert(&tree).unwrap();

        for node in conversion.root.iter_preorder() {
            let native_id = conversion.mapping.lookup_native(node.id()).unwrap();
            assert_eq!(node.range(), tree.get(native_id).unwrap().range);
        }
    }

    #[test]
    fn test_for_in_shape() {
        let conversion = convert(&sample_tree()).unwrap();
        let for_in = conversion
            .root
            .iter_preorder()
            .find(|n| n.kind() == NodeKind::ForInStatement)
            .unwrap();

        match for_in {
            NormalizedNode::ForInStatement { left, right, body, .. } => {
                assert_eq!(left.kind(), NodeKind::Identifier);
                match right.as_ref() {
                    NormalizedNode::Identifier { name, .. } => assert_eq!(name, "items"),
                    other => panic!("unexpected right: {:?}", other.kind()),
                }
                assert_eq!(body.kind(), NodeKind::BlockStatement);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_variable_statement_keyword() {
        let mut b = NativeTreeBuilder::new();
        let name = b.push(NativeKind::Identifier, range(4, 5), Some("x"), vec![]);
        let init = b.push(NativeKind::NumericLiteral, range(8, 9), Some("1"), vec![]);
        let decl = b.push(NativeKind::VariableDeclaration, range(4, 9), None, vec![name, init]);
        let stmt = b.push(NativeKind::VariableStatement, range(0, 10), Some("const"), vec![decl]);
        let root = b.push(NativeKind::SourceFile, range(0, 10), None, vec![stmt]);
        b.root(root);

        let conversion = convert(&b.build()).unwrap();
        let decl = conversion
            .root
            .iter_preorder()
            .find(|n| n.kind() == NodeKind::VariableDeclaration)
            .unwrap();
        match decl {
            NormalizedNode::VariableDeclaration { kind, declarations, .. } => {
                assert_eq!(*kind, DeclarationKind::Const);
                assert_eq!(declarations.len(), 1);
                assert_eq!(declarations[0].kind(), NodeKind::VariableDeclarator);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_unsupported_warn_policy() {
        let mut b = NativeTreeBuilder::new();
        let jsx = b.push(NativeKind::JsxElement, range(0, 12), None, vec![]);
        let stmt = b.push(NativeKind::ExpressionStatement, range(0, 13), None, vec![jsx]);
        let root = b.push(NativeKind::SourceFile, range(0, 13), None, vec![stmt]);
        b.root(root);
        let tree = b.build();

        let conversion = convert(&tree).unwrap();

        // one placeholder at the jsx position, one warning, conversion completes
        assert_eq!(conversion.diagnostics.len(), 1);
        let warning = &conversion.diagnostics[0];
        assert_eq!(warning.rule_id, UNSUPPORTED_NODE_RULE_ID);
        assert_eq!(warning.range.start_offset, 0);
        assert!(warning.message.contains("JsxElement"));

        let placeholder = conversion
            .root
            .iter_preorder()
            .find(|n| n.is_synthetic())
            .unwrap();
        assert_eq!(placeholder.range(), range(0, 12));

        // synthetic nodes have no mapping entry
        assert!(conversion.mapping.lookup_native(placeholder.id()).is_err());
        assert_eq!(conversion.mapping.len(), tree.node_count() - 1);
    }

    #[test]
    fn test_unsupported_abort_policy() {
        let mut b = NativeTreeBuilder::new();
        let with = b.push(NativeKind::WithStatement, range(3, 9), None, vec![]);
        let root = b.push(NativeKind::SourceFile, range(0, 9), None, vec![with]);
        b.root(root);

        let converter = Converter::new(ConvertOptions {
            abort_on_unsupported: true,
        });
        let err = converter.convert(&b.build()).unwrap_err();
        match err {
            ConvertError::UnsupportedKind { kind, offset } => {
                assert_eq!(kind, NativeKind::WithStatement);
                assert_eq!(offset, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_cross_reference_edge_gets_own_subtree() {
        // A frontend modeling a shared declaration as two tree edges: the
        // converter must produce two distinct normalized subtrees.
        let mut b = NativeTreeBuilder::new();
        let shared_a = b.push(NativeKind::Identifier, range(0, 3), Some("dep"), vec![]);
        let shared_b = b.push(NativeKind::Identifier, range(0, 3), Some("dep"), vec![]);
        let stmt_a = b.push(NativeKind::ExpressionStatement, range(0, 4), None, vec![shared_a]);
        let stmt_b = b.push(NativeKind::ExpressionStatement, range(0, 4), None, vec![shared_b]);
        let root = b.push(NativeKind::SourceFile, range(0, 8), None, vec![stmt_a, stmt_b]);
        b.root(root);

        let conversion = convert(&b.build()).unwrap();
        let idents: Vec<&NormalizedNode> = conversion
            .root
            .iter_preorder()
            .filter(|n| n.kind() == NodeKind::Identifier)
            .collect();
        assert_eq!(idents.len(), 2);
        assert_ne!(idents[0].id(), idents[1].id());
    }

    #[test]
    fn test_shared_native_node_keeps_first_mapping() {
        // One native identifier referenced by two parent edges: both copies
        // are materialized, but only the first holds the mapping.
        let mut b = NativeTreeBuilder::new();
        let shared = b.push(NativeKind::Identifier, range(0, 3), Some("dep"), vec![]);
        let stmt_a = b.push(NativeKind::ExpressionStatement, range(0, 4), None, vec![shared]);
        let stmt_b = b.push(NativeKind::ExpressionStatement, range(5, 9), None, vec![shared]);
        let root = b.push(NativeKind::SourceFile, range(0, 9), None, vec![stmt_a, stmt_b]);
        b.root(root);

        let conversion = convert(&b.build()).unwrap();
        let idents: Vec<&NormalizedNode> = conversion
            .root
            .iter_preorder()
            .filter(|n| n.kind() == NodeKind::Identifier)
            .collect();
        assert_eq!(idents.len(), 2);

        let first = idents[0].id();
        let second = idents[1].id();
        assert_eq!(conversion.mapping.lookup_normalized(shared), Ok(first));
        assert_eq!(conversion.mapping.lookup_native(first), Ok(shared));
        assert!(conversion.mapping.lookup_native(second).is_err());

        // the shared node is mapped once
        assert_eq!(conversion.mapping.len(), 4);
    }

    #[test]
    fn test_variable_statement_without_keyword_rejected() {
        let mut b = NativeTreeBuilder::new();
        let name = b.push(NativeKind::Identifier, range(4, 5), Some("x"), vec![]);
        let decl = b.push(NativeKind::VariableDeclaration, range(4, 5), None, vec![name]);
        let stmt = b.push(NativeKind::VariableStatement, range(0, 6), None, vec![decl]);
        let root = b.push(NativeKind::SourceFile, range(0, 6), None, vec![stmt]);
        b.root(root);

        let err = convert(&b.build()).unwrap_err();
        match err {
            ConvertError::Invalid(message) => {
                assert!(message.contains("no declaration keyword"), "{}", message);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_malformed_tree_rejected() {
        let mut b = NativeTreeBuilder::new();
        // expression statement with no expression child
        let stmt = b.push(NativeKind::ExpressionStatement, range(0, 1), None, vec![]);
        let root = b.push(NativeKind::SourceFile, range(0, 1), None, vec![stmt]);
        b.root(root);

        let err = convert(&b.build()).unwrap_err();
        assert!(matches!(err, ConvertError::Invalid(_)));
    }
}
