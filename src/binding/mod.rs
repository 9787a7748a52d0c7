//! Binding declarations and the pending-binding table
//!
//! A binding ties one expression (a relation field plus an optional
//! per-item template) to an ordered list of render targets:
//!
//! ```text
//! expression        field      template
//! ──────────        ─────      ────────
//! "name"            name       (none)
//! "chairs ${name}"  chairs     ${name}
//! "group.name"      group.name (none)
//! ```
//!
//! Bindings are created once, in discovery order, and each resolves exactly
//! once: resolution injects markup into every target, marks the targets
//! done, and removes the binding from the pending set. Re-resolution is a
//! programming error.

mod expr;
mod table;

pub use expr::{parse_expression, BindingExpr};
pub use table::{Binding, BindingTable};
