//! Per-root generation driver and batch orchestration.

use rustc_hash::FxHashSet;

use husk_object::ObjectGraph;

use crate::emit::StubEmitter;
use crate::error::GenError;
use crate::policy::{RootPolicy, SyntheticRoot};
use crate::report::{DiagnosticReporter, StderrReporter};
use crate::sink::Sink;

/// Default base name substituted for classes that declare no usable bases.
pub const DEFAULT_ROOT_BASE: &str = "ObjectBase";

/// Drives stub generation over an object graph.
///
/// Each [`generate`](Generator::generate) call is one run: it gets a fresh
/// emitter (and therefore a fresh ledger), so repeated runs over the same
/// root are independent and byte-identical.
pub struct Generator<'g> {
    graph: &'g ObjectGraph,
    policy: Box<dyn RootPolicy>,
    reporter: Box<dyn DiagnosticReporter>,
}

impl<'g> Generator<'g> {
    /// Generator with the default synthetic-root policy and stderr
    /// diagnostics.
    pub fn new(graph: &'g ObjectGraph) -> Self {
        Self {
            graph,
            policy: Box::new(SyntheticRoot::new(DEFAULT_ROOT_BASE)),
            reporter: Box::new(StderrReporter),
        }
    }

    /// Replace the fallback-base policy.
    pub fn with_policy(mut self, policy: Box<dyn RootPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the diagnostic reporter.
    pub fn with_reporter(mut self, reporter: Box<dyn DiagnosticReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Generate the declaration text for one root module.
    pub fn generate(&mut self, root: &str) -> Result<String, GenError> {
        let module = self
            .graph
            .module(root)
            .ok_or_else(|| GenError::RootNotFound(root.to_string()))?;

        let mut emitter = StubEmitter::new(self.graph, self.policy.as_ref(), self.reporter.as_mut());

        let mut lines = vec![
            "# Generated declaration stubs".to_string(),
            format!("# import {}", root),
            format!("# {}", module.repr),
            String::new(),
        ];
        lines.extend(emitter.emit_members(&module.repr, &module.attrs));

        let mut text = lines.join("\n");
        text.push('\n');
        Ok(text)
    }

    /// Generate and persist a batch of roots.
    ///
    /// One root's failure (resolution or persistence) is recorded and the
    /// remaining roots still run; [`Sink::finish`] runs after the loop on
    /// all outcomes.
    pub fn generate_batch(
        &mut self,
        roots: &[String],
        exclude: &FxHashSet<String>,
        sink: &mut dyn Sink,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for root in roots {
            if exclude.contains(root) {
                report.skipped.push(root.clone());
                continue;
            }
            let outcome = self
                .generate(root)
                .and_then(|text| sink.persist(root, &text).map_err(GenError::from));
            match outcome {
                Ok(()) => report.generated.push(root.clone()),
                Err(error) => report.failed.push((root.clone(), error)),
            }
        }
        sink.finish();
        report
    }
}

/// Per-root outcomes of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Roots generated and persisted successfully, in processing order
    pub generated: Vec<String>,
    /// Roots skipped by the exclusion set
    pub skipped: Vec<String>,
    /// Roots that failed, with the error that stopped them
    pub failed: Vec<(String, GenError)>,
}

impl BatchReport {
    /// True when no root failed.
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}
