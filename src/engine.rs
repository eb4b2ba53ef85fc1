//! The analysis engine facade
//!
//! Ties the pipeline together for one file: convert the frontend's tree,
//! build the dispatch table, run the traversal, and hand back the ordered
//! diagnostic list. Batch analysis fans independent files out over a rayon
//! pool; nothing is shared across files, so no locking is involved.

use crate::collector::{DiagnosticCollector, DisableDirectives};
use crate::config::Config;
use crate::convert::{ConvertError, Converter};
use crate::diagnostic::{Diagnostic, Severity, SourceRange};
use crate::dispatch::{Dispatcher, FatalAbort};
use crate::frontend::{NativeTree, TypeQueryCache, TypecheckService};
use crate::rule::{Rule, RuleRegistry};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Error from the strict single-file entry point
#[derive(Debug, Error)]
pub enum EngineError {
    /// Conversion never completed; no rule ran
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// A handler signaled a fatal failure; traversal was aborted
    #[error(transparent)]
    Fatal(#[from] FatalAbort),
}

/// One file queued for batch analysis.
///
/// Each input owns its native tree and its type-check service; batch workers
/// never share per-file state.
pub struct FileInput {
    /// Path used in reports
    pub path: PathBuf,
    /// Source text, when available (enables inline disable directives)
    pub source: Option<String>,
    /// The frontend's tree for this file
    pub tree: NativeTree,
    /// The frontend's checker for this file
    pub typecheck: Arc<dyn TypecheckService>,
}

/// Result of one analysis run
#[derive(Debug, Default)]
pub struct AnalysisResult {
    /// All diagnostics, ordered per file
    pub diagnostics: Vec<Diagnostic>,

    /// Files processed
    pub files_processed: usize,

    /// Files with at least one error
    pub files_with_errors: usize,

    /// Files with at least one warning
    pub files_with_warnings: usize,

    /// Files whose traversal was aborted by a fatal handler failure
    pub files_aborted: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Processing duration
    pub duration: Duration,
}

impl AnalysisResult {
    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if result is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if self.error_count > 0 {
            2
        } else if self.warning_count > 0 {
            1
        } else {
            0
        }
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: AnalysisResult) {
        self.diagnostics.extend(other.diagnostics);
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.files_with_warnings += other.files_with_warnings;
        self.files_aborted += other.files_aborted;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.info_count += other.info_count;
    }

    fn count(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            match diag.severity {
                Severity::Error => self.error_count += 1,
                Severity::Warning => self.warning_count += 1,
                Severity::Info => self.info_count += 1,
            }
        }
        if self.error_count > 0 {
            self.files_with_errors = 1;
        }
        if self.warning_count > 0 {
            self.files_with_warnings = 1;
        }
    }
}

/// The analysis engine: configuration plus registered rules
pub struct Engine {
    config: Config,
    registry: RuleRegistry,
}

impl Engine {
    /// Create an engine with configuration and no rules
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: RuleRegistry::new(),
        }
    }

    /// Register a rule. Registration order is dispatch order.
    pub fn register_rule(&mut self, rule: Box<dyn Rule>) -> &mut Self {
        self.registry.register(rule);
        self
    }

    /// Register several rules in order
    pub fn register_rules(&mut self, rules: impl IntoIterator<Item = Box<dyn Rule>>) -> &mut Self {
        for rule in rules {
            self.registry.register(rule);
        }
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Analyze one file strictly.
    ///
    /// Returns the complete, deterministically ordered diagnostic list, or
    /// the abort reason: a conversion failure (nothing ran) or a fatal
    /// handler failure (traversal discarded).
    pub fn analyze(
        &self,
        tree: &NativeTree,
        typecheck: &dyn TypecheckService,
        source: Option<&str>,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        let (diagnostics, abort) = self.run_one(tree, typecheck, source)?;
        match abort {
            Some(abort) => Err(abort.into()),
            None => Ok(diagnostics),
        }
    }

    /// Analyze a batch of independent files, in parallel when configured.
    ///
    /// Failures degrade to diagnostics so a broken file never hides the
    /// findings of the others: conversion failures become `parse-error` /
    /// `unsupported-node` / `invalid-native-tree` diagnostics, and a fatal
    /// handler failure leaves its fatal diagnostic in the file's output.
    pub fn analyze_batch(&self, inputs: &[FileInput]) -> AnalysisResult {
        let start = Instant::now();

        let results: Vec<AnalysisResult> = if self.config.engine.parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(if self.config.engine.jobs > 0 {
                    self.config.engine.jobs
                } else {
                    num_cpus::get()
                })
                .build()
                .unwrap_or_else(|_| rayon::ThreadPoolBuilder::new().build().unwrap());

            pool.install(|| inputs.par_iter().map(|i| self.analyze_input(i)).collect())
        } else {
            inputs.iter().map(|i| self.analyze_input(i)).collect()
        };

        let mut combined = AnalysisResult::default();
        for result in results {
            combined.merge(result);
        }
        combined.duration = start.elapsed();
        combined
    }

    /// Analyze one batch input, folding failures into diagnostics
    fn analyze_input(&self, input: &FileInput) -> AnalysisResult {
        let mut result = AnalysisResult {
            files_processed: 1,
            ..AnalysisResult::default()
        };

        match self.run_one(&input.tree, input.typecheck.as_ref(), input.source.as_deref()) {
            Ok((diagnostics, abort)) => {
                if abort.is_some() {
                    result.files_aborted = 1;
                }
                result.count(&diagnostics);
                result.diagnostics = diagnostics;
            }
            Err(err) => {
                log::debug!("conversion of {} failed: {}", input.path.display(), err);
                let rule_id = match &err {
                    ConvertError::Parse(_) => "parse-error",
                    ConvertError::UnsupportedKind { .. } => "unsupported-node",
                    ConvertError::Invalid(_) => "invalid-native-tree",
                };
                let diag = Diagnostic::new(
                    rule_id,
                    Severity::Error,
                    &err.to_string(),
                    SourceRange::default(),
                );
                result.count(std::slice::from_ref(&diag));
                result.diagnostics = vec![diag];
            }
        }

        result
    }

    /// The shared per-file pipeline: convert, dispatch, collect.
    ///
    /// Returns the finished diagnostic list plus the fatal abort, if one
    /// occurred (the fatal diagnostic is already part of the list).
    fn run_one(
        &self,
        tree: &NativeTree,
        typecheck: &dyn TypecheckService,
        source: Option<&str>,
    ) -> Result<(Vec<Diagnostic>, Option<FatalAbort>), ConvertError> {
        let converter = Converter::new(self.config.convert_options());
        let conversion = converter.convert(tree)?;

        let mut collector = DiagnosticCollector::new().with_dedup(self.config.dedup);
        if let Some(source) = source {
            collector = collector.with_directives(DisableDirectives::parse(source));
        }
        collector.extend(conversion.diagnostics);

        // Fresh per file: never shared, invalidated by construction.
        let cache = TypeQueryCache::new(typecheck);

        let mut dispatcher = Dispatcher::new(&self.registry, &self.config);
        let abort = dispatcher
            .run(
                &conversion.root,
                &conversion.mapping,
                tree,
                &cache,
                &mut collector,
            )
            .err();

        Ok((collector.finish(), abort))
    }
}
