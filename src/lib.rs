//! Tandem - Dual-Tree Static Analysis Engine
//!
//! Converts a host compiler frontend's native AST into a normalized,
//! framework-neutral tree, keeps a bidirectional mapping between the two,
//! and dispatches analysis rules over one traversal of the normalized tree.
//! Rules consult the frontend's type-check service on demand through the
//! mapping.
//!
//! # Architecture
//!
//! ```text
//! NativeTree -> Converter -> (NormalizedNode, NodeMapping)
//!                                    |
//!                              Dispatcher (+ TypecheckService via mapping)
//!                                    |
//!                           DiagnosticCollector -> ordered Vec<Diagnostic>
//! ```
//!
//! The frontend is an external collaborator: an adapter materializes its
//! tree into a [`NativeTree`](frontend::NativeTree) and implements
//! [`TypecheckService`](frontend::TypecheckService); everything downstream
//! is frontend-agnostic. Rules plug in through the [`Rule`](rule::Rule)
//! trait only.
//!
//! # Writing a rule
//!
//! ```
//! use tandem::ast::NodeKind;
//! use tandem::rule::{Handler, Rule};
//!
//! struct NoDebugger;
//!
//! impl Rule for NoDebugger {
//!     fn name(&self) -> &'static str {
//!         "my-no-debugger"
//!     }
//!
//!     fn recognized_tags(&self) -> &'static [NodeKind] {
//!         &[NodeKind::DebuggerStatement]
//!     }
//!
//!     fn create(&self) -> Vec<(NodeKind, Handler)> {
//!         vec![(
//!             NodeKind::DebuggerStatement,
//!             Box::new(|node, ctx| {
//!                 ctx.report(node.range(), "debugger statement left in code");
//!                 Ok(())
//!             }),
//!         )]
//!     }
//! }
//! ```

pub mod ast;
pub mod collector;
pub mod config;
pub mod convert;
pub mod diagnostic;
pub mod dispatch;
pub mod engine;
pub mod frontend;
pub mod mapping;
pub mod rule;
pub mod rules;

// Re-export main types
pub use ast::{DeclarationKind, NodeId, NodeKind, NormalizedNode};
pub use collector::{DiagnosticCollector, DisableDirectives};
pub use config::{Config, ConfigError, ConverterConfig, EngineConfig, RuleOverride};
pub use convert::{convert, Conversion, ConvertError, ConvertOptions, Converter};
pub use diagnostic::{Diagnostic, Edit, Position, Severity, SourceRange};
pub use dispatch::{Dispatcher, FatalAbort, TraversalState};
pub use engine::{AnalysisResult, Engine, EngineError, FileInput};
pub use frontend::{
    NativeKind, NativeNode, NativeNodeId, NativeTree, NativeTreeBuilder, NullTypecheck,
    SymbolDescriptor, SymbolKind, TypeDescriptor, TypeQueryCache, TypecheckService,
};
pub use mapping::{MappingError, NodeMapping};
pub use rule::{Handler, Rule, RuleContext, RuleError, RuleRegistry};
pub use rules::builtin_rules;
