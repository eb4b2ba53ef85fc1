//! Flags debugger statements

use crate::ast::NodeKind;
use crate::diagnostic::{Edit, Severity};
use crate::rule::{Handler, Rule};

pub struct NoDebugger;

impl Rule for NoDebugger {
    fn name(&self) -> &'static str {
        "no-debugger"
    }

    fn recognized_tags(&self) -> &'static [NodeKind] {
        &[NodeKind::DebuggerStatement]
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn fixable(&self) -> bool {
        true
    }

    fn create(&self) -> Vec<(NodeKind, Handler)> {
        vec![(
            NodeKind::DebuggerStatement,
            Box::new(|node, ctx| {
                ctx.report_with_edits(
                    node.range(),
                    "Unexpected debugger statement",
                    vec![Edit::delete(node.range())],
                );
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
    use crate::frontend::{NativeKind, NativeTreeBuilder, NullTypecheck};

    fn range(start: usize, end: usize) -> SourceRange {
        SourceRange::new(start, end, Position::new(1, 1), Position::new(1, 10))
    }

    #[test]
    fn test_reports_with_deletion_edit() {
        let mut b = NativeTreeBuilder::new();
        let debugger = b.push(NativeKind::DebuggerStatement, range(0, 9), None, vec![]);
        let root = b.push(NativeKind::SourceFile, range(0, 9), None, vec![debugger]);
        b.root(root);

        let mut engine = Engine::new(Config::default());
        engine.register_rule(Box::new(NoDebugger));
        let diags = engine.analyze(&b.build(), &NullTypecheck, None).unwrap();

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].edits.len(), 1);
        assert!(diags[0].edits[0].replacement.is_empty());
        assert_eq!(diags[0].edits[0].range, range(0, 9));
    }
}
