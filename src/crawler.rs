//! Recursive link-resolving crawler
//!
//! Consumes the pending-binding set against one resource at a time. For
//! each binding pending at the start of a pass, in table order:
//!
//! 1. the resource has the binding's field and it is a link stub → fetch
//!    through the cache and crawl the whole pending set against the
//!    normalized sub-resource (the multi-hop mechanism: domain → groups →
//!    chairs);
//! 2. the field is present with an ordinary value → format, inject, retire
//!    the binding;
//! 3. the field has no direct match but its first dotted segment does →
//!    descend into that sub-object (fetching first when the segment is a
//!    stub) with the remaining segments as the field;
//! 4. otherwise the binding stays pending and is retried against every
//!    resource met later in the recursion. A crawl that ends with pending
//!    bindings is a silent partial failure: targets stay exactly as
//!    authored, and the only signal is the [`CrawlReport`].
//!
//! There is no depth limit. Termination rests on the API's relation graph
//! being finite: every successful stub resolution moves one step toward a
//! non-stub leaf. A malformed API returning a stub chain that loops back on
//! itself would recurse forever; that is a documented open risk, not
//! defended against here.
//!
//! Fetches are awaited one at a time, so the crawl never has two requests
//! for the same URL in flight. A transport failure is logged and abandons
//! only that branch; its bindings remain pending.

use futures::future::BoxFuture;
use serde_json::Value;

use crate::binding::BindingTable;
use crate::cache::ResourceCache;
use crate::envelope::{is_link_stub, stub_href};
use crate::formatter::format;

/// Outcome of a crawl: how much of the table resolved, and what never did.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Bindings resolved during the crawl.
    pub resolved: usize,
    /// Expressions still pending when the crawl terminated, in table order.
    pub pending: Vec<String>,
}

impl CrawlReport {
    pub fn from_table(table: &BindingTable) -> Self {
        Self {
            resolved: table.resolved_count(),
            pending: table.pending_expressions(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Crawl the pending set against one resource, recursing through link
/// stubs. Resolution failures are silent by contract; the caller reads the
/// table (or builds a [`CrawlReport`]) afterwards.
pub async fn crawl(cache: &ResourceCache, table: &mut BindingTable, resource: &Value) {
    crawl_set(cache, table, resource).await;
}

fn crawl_set<'a>(
    cache: &'a ResourceCache,
    table: &'a mut BindingTable,
    resource: &'a Value,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        // Snapshot: bindings added or resolved mid-pass are seen by the
        // is_resolved re-check, not revisited within this pass.
        let pending = table.pending_ids();
        for id in pending {
            if table.is_resolved(id) {
                continue;
            }
            let field = table.field(id).to_string();
            resolve_binding(cache, table, resource, id, field).await;
        }
    })
}

fn resolve_binding<'a>(
    cache: &'a ResourceCache,
    table: &'a mut BindingTable,
    resource: &'a Value,
    id: usize,
    field: String,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        match resource.get(&field) {
            // Rule 1: link stub → fetch, then crawl the whole set against
            // the sub-resource (which is where this binding's real value,
            // and possibly others', will surface).
            Some(value) if is_link_stub(value) => {
                let Some(href) = stub_href(value) else { return };
                let href = href.to_string();
                match cache.get(&href).await {
                    Ok(sub) => crawl_set(cache, table, &sub).await,
                    Err(error) => tracing::warn!(
                        expression = %table.expression(id),
                        url = %href,
                        %error,
                        "fetch failed; binding stays pending"
                    ),
                }
            }

            // Rule 2: ordinary value → format and inject.
            Some(value) => {
                let markup = format(value, table.template(id));
                if markup.is_none() {
                    tracing::debug!(
                        expression = %table.expression(id),
                        "formatter matched no rule; resolving without output"
                    );
                }
                table.inject(id, markup.as_deref());
            }

            // Rule 3: dotted descent into a matching head segment.
            None => {
                let Some((head, rest)) = field.split_once('.') else { return };
                match resource.get(head) {
                    Some(value) if is_link_stub(value) => {
                        let Some(href) = stub_href(value) else { return };
                        let href = href.to_string();
                        match cache.get(&href).await {
                            Ok(sub) => {
                                resolve_binding(cache, table, &sub, id, rest.to_string()).await
                            }
                            Err(error) => tracing::warn!(
                                expression = %table.expression(id),
                                url = %href,
                                %error,
                                "fetch failed; binding stays pending"
                            ),
                        }
                    }
                    Some(value) if value.is_object() => {
                        resolve_binding(cache, table, value, id, rest.to_string()).await
                    }
                    // Rule 4: no match anywhere; stays pending.
                    _ => {}
                }
            }
        }
    })
}
