//! Diagnostic types for analysis results

use serde::{Deserialize, Serialize};

/// Severity level for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning - potential issue
    #[default]
    Warning,
    /// Error - definite problem
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// A point in the source text. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A span of source text.
///
/// Offset convention (used everywhere in this crate): `start_offset` and
/// `end_offset` are byte offsets into the source, half-open
/// `[start_offset, end_offset)`. `start`/`end` carry the matching 1-based
/// line/column pair. Ranges are copied verbatim from the frontend's nodes
/// during conversion and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceRange {
    pub start_offset: usize,
    pub end_offset: usize,
    pub start: Position,
    pub end: Position,
}

impl SourceRange {
    pub fn new(start_offset: usize, end_offset: usize, start: Position, end: Position) -> Self {
        Self {
            start_offset,
            end_offset,
            start,
            end,
        }
    }

    /// Byte length of the span
    pub fn len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.end_offset <= self.start_offset
    }

    /// Check if this range fully contains another
    pub fn contains(&self, other: &SourceRange) -> bool {
        self.start_offset <= other.start_offset && other.end_offset <= self.end_offset
    }
}

/// A single suggested text replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Span of source text to replace
    pub range: SourceRange,
    /// Replacement text (empty string deletes the span)
    pub replacement: String,
}

impl Edit {
    pub fn replace(range: SourceRange, replacement: &str) -> Self {
        Self {
            range,
            replacement: replacement.to_string(),
        }
    }

    /// An edit that deletes the span
    pub fn delete(range: SourceRange) -> Self {
        Self {
            range,
            replacement: String::new(),
        }
    }
}

/// One reported finding: location, message, and optional suggested edits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule ID that produced this diagnostic
    pub rule_id: String,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Source span the finding points at
    pub range: SourceRange,
    /// Suggested edits, in application order
    #[serde(default)]
    pub edits: Vec<Edit>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(rule_id: &str, severity: Severity, message: &str, range: SourceRange) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            message: message.to_string(),
            range,
            edits: Vec::new(),
        }
    }

    /// Append a suggested edit
    pub fn with_edit(mut self, edit: Edit) -> Self {
        self.edits.push(edit);
        self
    }

    /// Check if this diagnostic carries suggested edits
    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Key used by the deduplication policy
    pub(crate) fn dedup_key(&self) -> (String, SourceRange, String) {
        (self.rule_id.clone(), self.range, self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: usize, end: usize) -> SourceRange {
        SourceRange::new(start, end, Position::new(1, 1), Position::new(1, 1))
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("hint".parse::<Severity>(), Ok(Severity::Info));
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn test_range_len_and_contains() {
        let outer = range(0, 10);
        let inner = range(2, 8);
        assert_eq!(outer.len(), 10);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(range(5, 5).is_empty());
    }

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::new("test-rule", Severity::Error, "Test message", range(3, 7));
        assert_eq!(diag.rule_id, "test-rule");
        assert!(diag.is_error());
        assert!(!diag.is_warning());
        assert!(!diag.has_edits());
    }

    #[test]
    fn test_diagnostic_with_edit() {
        let diag = Diagnostic::new("test-rule", Severity::Warning, "msg", range(0, 3))
            .with_edit(Edit::replace(range(0, 3), "let"));
        assert!(diag.has_edits());
        assert_eq!(diag.edits[0].replacement, "let");

        let del = Edit::delete(range(0, 3));
        assert!(del.replacement.is_empty());
    }

    #[test]
    fn test_diagnostic_serialization() {
        let diag = Diagnostic::new("r", Severity::Info, "m", range(1, 2));
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(diag, back);
    }
}
