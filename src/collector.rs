//! Diagnostic aggregation, ordering and suppression
//!
//! The collector accumulates findings as rules report them and produces the
//! final ordered sequence: sorted by (start byte offset, rule id) for stable,
//! reproducible output, optionally deduplicated, with inline-suppressed
//! findings dropped.

use crate::diagnostic::Diagnostic;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Inline suppression directives parsed from source comments.
///
/// Three forms are recognized, mirroring the usual linter conventions:
///
/// ```text
/// // tandem-disable-line <rule>        suppresses <rule> on this line
/// // tandem-disable-next-line <rule>   suppresses <rule> on the next line
/// // tandem-disable-file <rule>        suppresses <rule> in the whole file
/// ```
///
/// `all` as the rule id suppresses every rule.
#[derive(Debug, Default, Clone)]
pub struct DisableDirectives {
    /// rule id -> suppressed lines (1-based)
    lines: HashMap<String, HashSet<u32>>,
    /// rules suppressed for the entire file
    file_rules: HashSet<String>,
}

fn directive_patterns() -> &'static (Regex, Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"//\s*tandem-disable-line\s+(\S+)").unwrap(),
            Regex::new(r"//\s*tandem-disable-next-line\s+(\S+)").unwrap(),
            Regex::new(r"//\s*tandem-disable-file\s+(\S+)").unwrap(),
        )
    })
}

impl DisableDirectives {
    /// Scan source text for directives
    pub fn parse(source: &str) -> Self {
        let (line_re, next_line_re, file_re) = directive_patterns();
        let mut directives = DisableDirectives::default();

        for (i, line) in source.lines().enumerate() {
            let line_num = (i + 1) as u32;

            for cap in file_re.captures_iter(line) {
                directives.file_rules.insert(cap[1].to_string());
            }
            for cap in line_re.captures_iter(line) {
                directives
                    .lines
                    .entry(cap[1].to_string())
                    .or_default()
                    .insert(line_num);
            }
            for cap in next_line_re.captures_iter(line) {
                directives
                    .lines
                    .entry(cap[1].to_string())
                    .or_default()
                    .insert(line_num + 1);
            }
        }

        directives
    }

    /// Whether a rule is suppressed at the given line
    pub fn is_disabled(&self, rule_id: &str, line: u32) -> bool {
        if self.file_rules.contains("all") || self.file_rules.contains(rule_id) {
            return true;
        }
        for key in ["all", rule_id] {
            if let Some(lines) = self.lines.get(key) {
                if lines.contains(&line) {
                    return true;
                }
            }
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.file_rules.is_empty()
    }
}

/// Accumulates diagnostics during dispatch and orders them on completion
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    dedup: bool,
    directives: Option<DisableDirectives>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the deduplication policy: diagnostics identical in
    /// (rule id, range, message) collapse to one
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    /// Attach inline suppression directives
    pub fn with_directives(mut self, directives: DisableDirectives) -> Self {
        if !directives.is_empty() {
            self.directives = Some(directives);
        }
        self
    }

    /// Record one diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record several diagnostics
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Mutable access for handlers reporting through a context
    pub(crate) fn sink(&mut self) -> &mut Vec<Diagnostic> {
        &mut self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Produce the final ordered sequence: suppression filter, then a stable
    /// sort by (start offset ascending, rule id ascending), then optional
    /// dedup keeping the first occurrence.
    pub fn finish(self) -> Vec<Diagnostic> {
        let mut out = self.diagnostics;

        if let Some(directives) = &self.directives {
            out.retain(|d| !directives.is_disabled(&d.rule_id, d.range.start.line));
        }

        out.sort_by(|a, b| {
            a.range
                .start_offset
                .cmp(&b.range.start_offset)
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });

        if self.dedup {
            let mut seen = HashSet::new();
            out.retain(|d| seen.insert(d.dedup_key()));
        }

        out
    }
}
