//! The binding table and injector
//!
//! Holds every binding discovered during the page scan, in discovery order,
//! and owns the injection step: writing formatted markup into each of a
//! binding's targets (in target order), marking each target done, and
//! retiring the binding from the pending set.

use crate::binding::expr::{parse_expression, BindingExpr};
use crate::error::BindError;
use crate::render::RenderTarget;

/// One declared binding and its render targets.
pub struct Binding {
    /// The raw expression as authored.
    pub expression: String,
    /// Parsed field + optional template.
    pub expr: BindingExpr,
    targets: Vec<Box<dyn RenderTarget>>,
    resolved: bool,
}

/// Ordered table of bindings; the crawler consumes its pending set.
#[derive(Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding in discovery order. Fails on an invalid expression.
    pub fn push(
        &mut self,
        expression: impl Into<String>,
        targets: Vec<Box<dyn RenderTarget>>,
    ) -> Result<(), BindError> {
        let expression = expression.into();
        let expr = parse_expression(&expression)?;
        self.bindings.push(Binding {
            expression,
            expr,
            targets,
            resolved: false,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Indices of the bindings pending right now, in table order.
    ///
    /// The crawler snapshots this at the start of each pass; a binding
    /// resolved mid-pass is re-checked via [`BindingTable::is_resolved`]
    /// before being visited.
    pub fn pending_ids(&self) -> Vec<usize> {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.resolved)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_resolved(&self, id: usize) -> bool {
        self.bindings[id].resolved
    }

    pub fn field(&self, id: usize) -> &str {
        &self.bindings[id].expr.field
    }

    pub fn template(&self, id: usize) -> Option<&str> {
        self.bindings[id].expr.template.as_deref()
    }

    pub fn expression(&self, id: usize) -> &str {
        &self.bindings[id].expression
    }

    /// Inject markup into every target of a binding and retire it.
    ///
    /// `markup` is `None` on a formatter miss: the binding still resolves
    /// (its relation did appear) and targets are marked done, but nothing
    /// is written, so authored content stays in place.
    ///
    /// Resolving an already-resolved binding is a programming error; the
    /// debug assertion catches it in tests, the guard makes it a no-op in
    /// release.
    pub fn inject(&mut self, id: usize, markup: Option<&str>) {
        let binding = &mut self.bindings[id];
        debug_assert!(!binding.resolved, "binding resolved twice: {}", binding.expression);
        if binding.resolved {
            return;
        }
        for target in binding.targets.iter_mut() {
            if let Some(markup) = markup {
                target.apply(markup);
            }
            target.mark_done();
        }
        binding.resolved = true;
        tracing::debug!(expression = %binding.expression, "binding resolved");
    }

    /// Number of bindings resolved so far.
    pub fn resolved_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.resolved).count()
    }

    /// Expressions still pending, in table order.
    pub fn pending_expressions(&self) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|b| !b.resolved)
            .map(|b| b.expression.clone())
            .collect()
    }
}
