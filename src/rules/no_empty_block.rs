//! Flags empty block statements
//!
//! Applies to every empty block, including function bodies; the normalized
//! tree carries no parent links, so no exemption is made for them.

use crate::ast::{NodeKind, NormalizedNode};
use crate::rule::{Handler, Rule};

pub struct NoEmptyBlock;

impl Rule for NoEmptyBlock {
    fn name(&self) -> &'static str {
        "no-empty-block"
    }

    fn recognized_tags(&self) -> &'static [NodeKind] {
        &[NodeKind::BlockStatement]
    }

    fn create(&self) -> Vec<(NodeKind, Handler)> {
        vec![(
            NodeKind::BlockStatement,
            Box::new(|node, ctx| {
                if let NormalizedNode::BlockStatement { body, .. } = node {
                    if body.is_empty() {
                        ctx.report(node.range(), "Empty block statement");
                    }
                }
                Ok(())
            }),
        )]
    }
}
