//! Built-in rules
//!
//! Each rule lives in its own module and implements the [`Rule`] contract;
//! nothing here touches converter or mapping internals directly.

pub mod for_in_array;
pub mod no_debugger;
pub mod no_empty_block;
pub mod no_var_keyword;

pub use for_in_array::ForInArray;
pub use no_debugger::NoDebugger;
pub use no_empty_block::NoEmptyBlock;
pub use no_var_keyword::NoVarKeyword;

use crate::rule::Rule;

/// All built-in rules, in their canonical registration order
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ForInArray),
        Box::new(NoDebugger),
        Box::new(NoEmptyBlock),
        Box::new(NoVarKeyword),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_have_unique_names() {
        let rules = builtin_rules();
        let mut names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), rules.len());
    }

    #[test]
    fn test_builtin_handlers_match_declared_tags() {
        for rule in builtin_rules() {
            for (kind, _) in rule.create() {
                assert!(
                    rule.recognized_tags().contains(&kind),
                    "rule '{}' registers an undeclared tag",
                    rule.name()
                );
            }
        }
    }
}
