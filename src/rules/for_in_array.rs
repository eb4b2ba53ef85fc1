//! Flags for-in loops that iterate arrays
//!
//! A for-in loop enumerates keys, not elements; over an array that means
//! string indices, inherited properties, and no order guarantee. The check
//! needs the frontend's type information: the loop's right-hand side must
//! resolve to an array type before anything is reported.

use crate::ast::{NodeKind, NormalizedNode};
use crate::rule::{Handler, Rule};

pub struct ForInArray;

impl Rule for ForInArray {
    fn name(&self) -> &'static str {
        "for-in-array"
    }

    fn recognized_tags(&self) -> &'static [NodeKind] {
        &[NodeKind::ForInStatement]
    }

    fn create(&self) -> Vec<(NodeKind, Handler)> {
        vec![(
            NodeKind::ForInStatement,
            Box::new(|node, ctx| {
                let NormalizedNode::ForInStatement { right, .. } = node else {
                    return Ok(());
                };
                if let Some(ty) = ctx.type_of(right) {
                    if ty.is_array {
                        ctx.report(
                            node.range(),
                            &format!(
                                "For-in loop iterates over a value of array type '{}'; \
                                 prefer a for-of loop or index-based iteration",
                                ty.text
                            ),
                        );
                    }
                }
                Ok(())
            }),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::diagnostic::{Position, SourceRange};
    use crate::engine::Engine;
    use crate::frontend::{
        NativeKind, NativeNodeId, NativeTree, NativeTreeBuilder, NullTypecheck, SymbolDescriptor,
        TypeDescriptor, TypecheckService,
    };

    fn range(start: usize, end: usize) -> SourceRange {
        SourceRange::new(
            start,
            end,
            Position::new(1, start as u32 + 1),
            Position::new(1, end as u32 + 1),
        )
    }

    /// `for (i in items) { }` where `items` is the native node to type
    fn loop_tree() -> (NativeTree, NativeNodeId) {
        let mut b = NativeTreeBuilder::new();
        let left = b.push(NativeKind::Identifier, range(5, 6), Some("i"), vec![]);
        let items = b.push(NativeKind::Identifier, range(10, 15), Some("items"), vec![]);
        let body = b.push(NativeKind::Block, range(17, 20), None, vec![]);
        let for_in = b.push(
            NativeKind::ForInStatement,
            range(0, 20),
            None,
            vec![left, items, body],
        );
        let root = b.push(NativeKind::SourceFile, range(0, 20), None, vec![for_in]);
        b.root(root);
        (b.build(), items)
    }

    /// Types exactly one native node
    struct OneTypedNode {
        node: NativeNodeId,
        ty: TypeDescriptor,
    }

    impl TypecheckService for OneTypedNode {
        fn type_of(&self, node: NativeNodeId) -> Option<TypeDescriptor> {
            (node == self.node).then(|| self.ty.clone())
        }

        fn symbol_of(&self, _node: NativeNodeId) -> Option<SymbolDescriptor> {
            None
        }
    }

    fn engine() -> Engine {
        let mut engine = Engine::new(Config::default());
        engine.register_rule(Box::new(ForInArray));
        engine
    }

    #[test]
    fn test_reports_loop_over_array() {
        let (tree, items) = loop_tree();
        let svc = OneTypedNode {
            node: items,
            ty: TypeDescriptor::array("string"),
        };

        let diags = engine().analyze(&tree, &svc, None).unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule_id, "for-in-array");
        // range starts at the loop's own source offset
        assert_eq!(diags[0].range.start_offset, 0);
        // message references the type reported by the checker
        assert!(diags[0].message.contains("string[]"));
    }

    #[test]
    fn test_silent_on_non_array_type() {
        let (tree, items) = loop_tree();
        let svc = OneTypedNode {
            node: items,
            ty: TypeDescriptor::new("Record<string, number>"),
        };
        assert!(engine().analyze(&tree, &svc, None).unwrap().is_empty());
    }

    #[test]
    fn test_silent_without_type_information() {
        let (tree, _) = loop_tree();
        assert!(engine().analyze(&tree, &NullTypecheck, None).unwrap().is_empty());
    }
}
