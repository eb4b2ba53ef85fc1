//! The normalized, framework-neutral syntax tree
//!
//! Rules operate over this tree, never over the frontend's. Each node is a
//! tagged variant over a closed set of kinds, owns its typed children by
//! value, and carries a source range copied verbatim from its native
//! counterpart. The tree is immutable once conversion completes.

use crate::diagnostic::SourceRange;
use serde::{Deserialize, Serialize};

/// Identity of a normalized node, assigned in pre-order during conversion.
///
/// This is the handle the node mapping uses; nodes themselves are owned by
/// the tree, so identity is never a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The closed set of normalized node kinds.
///
/// This is the tag rules register handlers against. `Unsupported` marks the
/// synthetic placeholder substituted for native kinds the converter does not
/// model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Program,
    BlockStatement,
    ExpressionStatement,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    IfStatement,
    ForInStatement,
    ReturnStatement,
    DebuggerStatement,
    BinaryExpression,
    CallExpression,
    MemberExpression,
    Identifier,
    Literal,
    Unsupported,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeKind::Program => "program",
            NodeKind::BlockStatement => "block-statement",
            NodeKind::ExpressionStatement => "expression-statement",
            NodeKind::VariableDeclaration => "variable-declaration",
            NodeKind::VariableDeclarator => "variable-declarator",
            NodeKind::FunctionDeclaration => "function-declaration",
            NodeKind::IfStatement => "if-statement",
            NodeKind::ForInStatement => "for-in-statement",
            NodeKind::ReturnStatement => "return-statement",
            NodeKind::DebuggerStatement => "debugger-statement",
            NodeKind::BinaryExpression => "binary-expression",
            NodeKind::CallExpression => "call-expression",
            NodeKind::MemberExpression => "member-expression",
            NodeKind::Identifier => "identifier",
            NodeKind::Literal => "literal",
            NodeKind::Unsupported => "unsupported",
        };
        write!(f, "{}", s)
    }
}

/// Declaration keyword of a variable statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

impl std::str::FromStr for DeclarationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "var" => Ok(DeclarationKind::Var),
            "let" => Ok(DeclarationKind::Let),
            "const" => Ok(DeclarationKind::Const),
            _ => Err(format!("Unknown declaration keyword: {}", s)),
        }
    }
}

/// A node of the normalized tree.
///
/// Children are owned by value and appear in source order. Every variant
/// carries its [`NodeId`] and the source range of its native counterpart
/// (for `Unsupported`, the range is all that survives).
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedNode {
    Program {
        id: NodeId,
        range: SourceRange,
        body: Vec<NormalizedNode>,
    },
    BlockStatement {
        id: NodeId,
        range: SourceRange,
        body: Vec<NormalizedNode>,
    },
    ExpressionStatement {
        id: NodeId,
        range: SourceRange,
        expression: Box<NormalizedNode>,
    },
    VariableDeclaration {
        id: NodeId,
        range: SourceRange,
        kind: DeclarationKind,
        declarations: Vec<NormalizedNode>,
    },
    VariableDeclarator {
        id: NodeId,
        range: SourceRange,
        name: Box<NormalizedNode>,
        init: Option<Box<NormalizedNode>>,
    },
    FunctionDeclaration {
        id: NodeId,
        range: SourceRange,
        name: Box<NormalizedNode>,
        params: Vec<NormalizedNode>,
        body: Box<NormalizedNode>,
    },
    IfStatement {
        id: NodeId,
        range: SourceRange,
        test: Box<NormalizedNode>,
        consequent: Box<NormalizedNode>,
        alternate: Option<Box<NormalizedNode>>,
    },
    ForInStatement {
        id: NodeId,
        range: SourceRange,
        left: Box<NormalizedNode>,
        right: Box<NormalizedNode>,
        body: Box<NormalizedNode>,
    },
    ReturnStatement {
        id: NodeId,
        range: SourceRange,
        argument: Option<Box<NormalizedNode>>,
    },
    DebuggerStatement {
        id: NodeId,
        range: SourceRange,
    },
    BinaryExpression {
        id: NodeId,
        range: SourceRange,
        operator: String,
        left: Box<NormalizedNode>,
        right: Box<NormalizedNode>,
    },
    CallExpression {
        id: NodeId,
        range: SourceRange,
        callee: Box<NormalizedNode>,
        arguments: Vec<NormalizedNode>,
    },
    MemberExpression {
        id: NodeId,
        range: SourceRange,
        object: Box<NormalizedNode>,
        property: Box<NormalizedNode>,
    },
    Identifier {
        id: NodeId,
        range: SourceRange,
        name: String,
    },
    Literal {
        id: NodeId,
        range: SourceRange,
        raw: String,
    },
    /// Placeholder for a native kind the converter does not model.
    /// Synthetic: it has no mapping entry.
    Unsupported {
        id: NodeId,
        range: SourceRange,
    },
}

impl NormalizedNode {
    /// The node's kind tag
    pub fn kind(&self) -> NodeKind {
        match self {
            NormalizedNode::Program { .. } => NodeKind::Program,
            NormalizedNode::BlockStatement { .. } => NodeKind::BlockStatement,
            NormalizedNode::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            NormalizedNode::VariableDeclaration { .. } => NodeKind::VariableDeclaration,
            NormalizedNode::VariableDeclarator { .. } => NodeKind::VariableDeclarator,
            NormalizedNode::FunctionDeclaration { .. } => NodeKind::FunctionDeclaration,
            NormalizedNode::IfStatement { .. } => NodeKind::IfStatement,
            NormalizedNode::ForInStatement { .. } => NodeKind::ForInStatement,
            NormalizedNode::ReturnStatement { .. } => NodeKind::ReturnStatement,
            NormalizedNode::DebuggerStatement { .. } => NodeKind::DebuggerStatement,
            NormalizedNode::BinaryExpression { .. } => NodeKind::BinaryExpression,
            NormalizedNode::CallExpression { .. } => NodeKind::CallExpression,
            NormalizedNode::MemberExpression { .. } => NodeKind::MemberExpression,
            NormalizedNode::Identifier { .. } => NodeKind::Identifier,
            NormalizedNode::Literal { .. } => NodeKind::Literal,
            NormalizedNode::Unsupported { .. } => NodeKind::Unsupported,
        }
    }

    /// The node's identity
    pub fn id(&self) -> NodeId {
        match self {
            NormalizedNode::Program { id, .. }
            | NormalizedNode::BlockStatement { id, .. }
            | NormalizedNode::ExpressionStatement { id, .. }
            | NormalizedNode::VariableDeclaration { id, .. }
            | NormalizedNode::VariableDeclarator { id, .. }
            | NormalizedNode::FunctionDeclaration { id, .. }
            | NormalizedNode::IfStatement { id, .. }
            | NormalizedNode::ForInStatement { id, .. }
            | NormalizedNode::ReturnStatement { id, .. }
            | NormalizedNode::DebuggerStatement { id, .. }
            | NormalizedNode::BinaryExpression { id, .. }
            | NormalizedNode::CallExpression { id, .. }
            | NormalizedNode::MemberExpression { id, .. }
            | NormalizedNode::Identifier { id, .. }
            | NormalizedNode::Literal { id, .. }
            | NormalizedNode::Unsupported { id, .. } => *id,
        }
    }

    /// The node's source range
    pub fn range(&self) -> SourceRange {
        match self {
            NormalizedNode::Program { range, .. }
            | NormalizedNode::BlockStatement { range, .. }
            | NormalizedNode::ExpressionStatement { range, .. }
            | NormalizedNode::VariableDeclaration { range, .. }
            | NormalizedNode::VariableDeclarator { range, .. }
            | NormalizedNode::FunctionDeclaration { range, .. }
            | NormalizedNode::IfStatement { range, .. }
            | NormalizedNode::ForInStatement { range, .. }
            | NormalizedNode::ReturnStatement { range, .. }
            | NormalizedNode::DebuggerStatement { range, .. }
            | NormalizedNode::BinaryExpression { range, .. }
            | NormalizedNode::CallExpression { range, .. }
            | NormalizedNode::MemberExpression { range, .. }
            | NormalizedNode::Identifier { range, .. }
            | NormalizedNode::Literal { range, .. }
            | NormalizedNode::Unsupported { range, .. } => *range,
        }
    }

    /// True for nodes with no native counterpart
    pub fn is_synthetic(&self) -> bool {
        matches!(self, NormalizedNode::Unsupported { .. })
    }

    /// Child nodes in source order
    pub fn children(&self) -> Vec<&NormalizedNode> {
        match self {
            NormalizedNode::Program { body, .. } | NormalizedNode::BlockStatement { body, .. } => {
                body.iter().collect()
            }
            NormalizedNode::ExpressionStatement { expression, .. } => vec![expression.as_ref()],
            NormalizedNode::VariableDeclaration { declarations, .. } => {
                declarations.iter().collect()
            }
            NormalizedNode::VariableDeclarator { name, init, .. } => {
                let mut out: Vec<&NormalizedNode> = vec![name.as_ref()];
                if let Some(init) = init {
                    out.push(init.as_ref());
                }
                out
            }
            NormalizedNode::FunctionDeclaration {
                name, params, body, ..
            } => {
                let mut out: Vec<&NormalizedNode> = vec![name.as_ref()];
                out.extend(params.iter());
                out.push(body.as_ref());
                out
            }
            NormalizedNode::IfStatement {
                test,
                consequent,
                alternate,
                ..
            } => {
                let mut out: Vec<&NormalizedNode> = vec![test.as_ref(), consequent.as_ref()];
                if let Some(alt) = alternate {
                    out.push(alt.as_ref());
                }
                out
            }
            NormalizedNode::ForInStatement {
                left, right, body, ..
            } => vec![left.as_ref(), right.as_ref(), body.as_ref()],
            NormalizedNode::ReturnStatement { argument, .. } => {
                argument.iter().map(|a| a.as_ref()).collect()
            }
            NormalizedNode::BinaryExpression { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            NormalizedNode::CallExpression {
                callee, arguments, ..
            } => {
                let mut out: Vec<&NormalizedNode> = vec![callee.as_ref()];
                out.extend(arguments.iter());
                out
            }
            NormalizedNode::MemberExpression {
                object, property, ..
            } => vec![object.as_ref(), property.as_ref()],
            NormalizedNode::DebuggerStatement { .. }
            | NormalizedNode::Identifier { .. }
            | NormalizedNode::Literal { .. }
            | NormalizedNode::Unsupported { .. } => Vec::new(),
        }
    }

    /// Iterate this subtree in depth-first pre-order (source nesting order)
    pub fn iter_preorder(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Number of nodes in this subtree, including the node itself
    pub fn count(&self) -> usize {
        self.iter_preorder().count()
    }

    /// Find a node by id within this subtree
    pub fn find(&self, id: NodeId) -> Option<&NormalizedNode> {
        self.iter_preorder().find(|n| n.id() == id)
    }
}

/// Depth-first pre-order iterator over a normalized subtree
pub struct PreOrder<'a> {
    stack: Vec<&'a NormalizedNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a NormalizedNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children = node.children();
        for child in children.into_iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Position, SourceRange};

    fn range(start: usize, end: usize) -> SourceRange {
        SourceRange::new(start, end, Position::new(1, 1), Position::new(1, 1))
    }

    fn ident(id: u32, name: &str) -> NormalizedNode {
        NormalizedNode::Identifier {
            id: NodeId(id),
            range: range(0, name.len()),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(ident(0, "x").kind(), NodeKind::Identifier);
        let prog = NormalizedNode::Program {
            id: NodeId(0),
            range: range(0, 0),
            body: vec![],
        };
        assert_eq!(prog.kind(), NodeKind::Program);
        assert!(!prog.is_synthetic());
    }

    #[test]
    fn test_kind_display_roundtrip() {
        let yaml = serde_yaml::to_string(&NodeKind::ForInStatement).unwrap();
        assert_eq!(yaml.trim(), "for-in-statement");
        assert_eq!(NodeKind::ForInStatement.to_string(), "for-in-statement");
    }

    #[test]
    fn test_declaration_kind_from_str() {
        assert_eq!("var".parse::<DeclarationKind>(), Ok(DeclarationKind::Var));
        assert_eq!("const".parse::<DeclarationKind>(), Ok(DeclarationKind::Const));
        assert!("function".parse::<DeclarationKind>().is_err());
    }

    #[test]
    fn test_children_source_order() {
        let for_in = NormalizedNode::ForInStatement {
            id: NodeId(0),
            range: range(0, 30),
            left: Box::new(ident(1, "i")),
            right: Box::new(ident(2, "items")),
            body: Box::new(NormalizedNode::BlockStatement {
                id: NodeId(3),
                range: range(20, 30),
                body: vec![],
            }),
        };
        let kinds: Vec<NodeKind> = for_in.children().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Identifier, NodeKind::Identifier, NodeKind::BlockStatement]
        );
    }

    #[test]
    fn test_preorder_and_count() {
        let tree = NormalizedNode::Program {
            id: NodeId(0),
            range: range(0, 10),
            body: vec![NormalizedNode::ExpressionStatement {
                id: NodeId(1),
                range: range(0, 10),
                expression: Box::new(NormalizedNode::BinaryExpression {
                    id: NodeId(2),
                    range: range(0, 9),
                    operator: "+".to_string(),
                    left: Box::new(ident(3, "a")),
                    right: Box::new(ident(4, "b")),
                }),
            }],
        };

        let ids: Vec<NodeId> = tree.iter_preorder().map(|n| n.id()).collect();
        assert_eq!(ids, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3), NodeId(4)]);
        assert_eq!(tree.count(), 5);
        assert_eq!(tree.find(NodeId(4)).unwrap().kind(), NodeKind::Identifier);
        assert!(tree.find(NodeId(99)).is_none());
    }

    #[test]
    fn test_unsupported_is_synthetic() {
        let node = NormalizedNode::Unsupported {
            id: NodeId(9),
            range: range(4, 8),
        };
        assert!(node.is_synthetic());
        assert_eq!(node.kind(), NodeKind::Unsupported);
        assert!(node.children().is_empty());
    }
}
