//! Flags `var` declarations and suggests `let`

use crate::ast::{DeclarationKind, NodeKind, NormalizedNode};
use crate::diagnostic::{Edit, Position, SourceRange};
use crate::rule::{Handler, Rule};

pub struct NoVarKeyword;

impl Rule for NoVarKeyword {
    fn name(&self) -> &'static str {
        "no-var"
    }

    fn recognized_tags(&self) -> &'static [NodeKind] {
        &[NodeKind::VariableDeclaration]
    }

    fn fixable(&self) -> bool {
        true
    }

    fn create(&self) -> Vec<(NodeKind, Handler)> {
        vec![(
            NodeKind::VariableDeclaration,
            Box::new(|node, ctx| {
                let NormalizedNode::VariableDeclaration { kind, .. } = node else {
                    return Ok(());
                };
                if *kind == DeclarationKind::Var {
                    let edit = Edit::replace(keyword_range(node.range()), "let");
                    ctx.report_with_edits(
                        node.range(),
                        "Unexpected var declaration; use let or const",
                        vec![edit],
                    );
                }
                Ok(())
            }),
        )]
    }
}

/// Span of the `var` keyword: the first three bytes of the declaration.
/// The statement range starts at the keyword, so this holds for any
/// frontend following the crate's offset convention.
fn keyword_range(range: SourceRange) -> SourceRange {
    SourceRange::new(
        range.start_offset,
        range.start_offset + 3,
        range.start,
        Position::new(range.start.line, range.start.column + 3),
    )
}
