//! Interface to the host compiler frontend
//!
//! The frontend (parser + type checker) is an external collaborator: this
//! module defines the surface the engine consumes, not a parser. A frontend
//! adapter materializes its tree into a [`NativeTree`] (an arena of nodes
//! addressed by opaque [`NativeNodeId`]s) and exposes type information through
//! the [`TypecheckService`] trait. The engine never mutates a native tree.

use crate::diagnostic::SourceRange;
use std::cell::RefCell;
use std::collections::HashMap;

/// Node kinds produced by the host frontend.
///
/// This set is owned by the frontend, not by the analysis core; the converter
/// models the kinds it understands and treats the rest under its
/// unsupported-node policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    SourceFile,
    Block,
    ExpressionStatement,
    VariableStatement,
    VariableDeclaration,
    FunctionDeclaration,
    Parameter,
    IfStatement,
    ForInStatement,
    ReturnStatement,
    DebuggerStatement,
    BinaryExpression,
    CallExpression,
    PropertyAccessExpression,
    Identifier,
    NumericLiteral,
    StringLiteral,
    // Kinds the normalized tree does not model
    JsxElement,
    WithStatement,
    Decorator,
}

impl std::fmt::Display for NativeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Opaque identity of a node in the frontend's tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeNodeId(pub u32);

impl std::fmt::Display for NativeNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of the frontend's tree.
///
/// `text` carries the frontend-specific lexeme where one exists: the name of
/// an identifier, the raw text of a literal, the operator of a binary
/// expression, the declaration keyword of a variable statement. The core
/// copies it during conversion but never reinterprets it.
#[derive(Debug, Clone)]
pub struct NativeNode {
    pub id: NativeNodeId,
    pub kind: NativeKind,
    pub range: SourceRange,
    pub text: Option<String>,
    /// Child ids in source order
    pub children: Vec<NativeNodeId>,
}

/// The frontend's tree for one file, materialized as an arena.
#[derive(Debug, Clone)]
pub struct NativeTree {
    nodes: Vec<NativeNode>,
    root: NativeNodeId,
    parse_error: Option<String>,
}

impl NativeTree {
    /// Root node id
    pub fn root(&self) -> NativeNodeId {
        self.root
    }

    /// Look up a node by id
    pub fn get(&self, id: NativeNodeId) -> Option<&NativeNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The parse failure recorded by the frontend, if any
    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    /// Iterate all node ids in depth-first pre-order from the root
    pub fn iter_preorder(&self) -> impl Iterator<Item = NativeNodeId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            if let Some(node) = self.get(id) {
                for child in node.children.iter().rev() {
                    stack.push(*child);
                }
            }
            Some(id)
        })
    }
}

/// Builder used by frontend adapters to materialize a [`NativeTree`].
///
/// Children must be pushed before the node that references them; adapters
/// conventionally push the source-file node last and mark it with [`root`].
///
/// [`root`]: NativeTreeBuilder::root
#[derive(Debug, Default)]
pub struct NativeTreeBuilder {
    nodes: Vec<NativeNode>,
    root: Option<NativeNodeId>,
    parse_error: Option<String>,
}

impl NativeTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a node and return its id
    pub fn push(
        &mut self,
        kind: NativeKind,
        range: SourceRange,
        text: Option<&str>,
        children: Vec<NativeNodeId>,
    ) -> NativeNodeId {
        let id = NativeNodeId(self.nodes.len() as u32);
        self.nodes.push(NativeNode {
            id,
            kind,
            range,
            text: text.map(String::from),
            children,
        });
        id
    }

    /// Mark the root node
    pub fn root(&mut self, id: NativeNodeId) -> &mut Self {
        self.root = Some(id);
        self
    }

    /// Record that the frontend failed to parse the source
    pub fn parse_error(&mut self, message: &str) -> &mut Self {
        self.parse_error = Some(message.to_string());
        self
    }

    /// Finish the tree. The root defaults to the last pushed node.
    pub fn build(self) -> NativeTree {
        let root = self
            .root
            .or_else(|| self.nodes.last().map(|n| n.id))
            .unwrap_or(NativeNodeId(0));
        NativeTree {
            nodes: self.nodes,
            root,
            parse_error: self.parse_error,
        }
    }
}

/// Type information for one native node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Display text of the type (e.g. `string[]`, `number`)
    pub text: String,
    /// Whether the type is an array type
    pub is_array: bool,
}

impl TypeDescriptor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_array: false,
        }
    }

    pub fn array(element: &str) -> Self {
        Self {
            text: format!("{}[]", element),
            is_array: true,
        }
    }
}

/// Symbol kinds reported by the frontend's checker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Property,
    Unknown,
}

/// Symbol information for one native node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDescriptor {
    pub name: String,
    pub kind: SymbolKind,
}

/// The frontend's type-check query service, keyed by native node identity.
///
/// Queries return `None` for nodes the checker has no information about.
/// Implementations must not block on I/O; handlers call into this service
/// mid-traversal.
pub trait TypecheckService: Send + Sync {
    fn type_of(&self, node: NativeNodeId) -> Option<TypeDescriptor>;
    fn symbol_of(&self, node: NativeNodeId) -> Option<SymbolDescriptor>;
}

/// A service for frontends without a type checker: every query misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTypecheck;

impl TypecheckService for NullTypecheck {
    fn type_of(&self, _node: NativeNodeId) -> Option<TypeDescriptor> {
        None
    }

    fn symbol_of(&self, _node: NativeNodeId) -> Option<SymbolDescriptor> {
        None
    }
}

/// Per-file memoization of type-check queries.
///
/// Symbol and type resolution can be expensive in the frontend; the cache
/// amortizes repeated queries for the same node within one file's traversal.
/// Created fresh at the start of each conversion pass and never shared across
/// files. Interior mutability is safe here: a file's traversal is
/// single-threaded.
pub struct TypeQueryCache<'a> {
    service: &'a dyn TypecheckService,
    types: RefCell<HashMap<NativeNodeId, Option<TypeDescriptor>>>,
    symbols: RefCell<HashMap<NativeNodeId, Option<SymbolDescriptor>>>,
}

impl<'a> TypeQueryCache<'a> {
    pub fn new(service: &'a dyn TypecheckService) -> Self {
        Self {
            service,
            types: RefCell::new(HashMap::new()),
            symbols: RefCell::new(HashMap::new()),
        }
    }

    pub fn type_of(&self, node: NativeNodeId) -> Option<TypeDescriptor> {
        self.types
            .borrow_mut()
            .entry(node)
            .or_insert_with(|| self.service.type_of(node))
            .clone()
    }

    pub fn symbol_of(&self, node: NativeNodeId) -> Option<SymbolDescriptor> {
        self.symbols
            .borrow_mut()
            .entry(node)
            .or_insert_with(|| self.service.symbol_of(node))
            .clone()
    }
}
