//! Hypermedia envelope normalization
//!
//! HAL-style responses carry two reserved containers, `_links` and
//! `_embedded`, each mapping a relation name to a link object or a list of
//! them. Normalization flattens both onto the resource's top level so the
//! crawler can address every relation as an ordinary field.
//!
//! Container order is a correctness invariant: `_links` is applied first and
//! `_embedded` second, so an embedded resource always overwrites the link
//! stub for the same relation name. An embedded resource is richer than a
//! stub.

use serde_json::Value;

/// The reserved containers, in application order.
const RESERVED_CONTAINERS: [&str; 2] = ["_links", "_embedded"];

/// Flatten an envelope's reserved containers onto its top level.
///
/// Only the directly fetched resource is flattened; nested sub-objects keep
/// their own containers until they are fetched and normalized themselves.
/// Non-object envelopes are returned unchanged.
pub fn normalize(mut envelope: Value) -> Value {
    let Some(map) = envelope.as_object_mut() else {
        return envelope;
    };

    for container in RESERVED_CONTAINERS {
        match map.remove(container) {
            Some(Value::Object(relations)) => {
                for (relation, value) in relations {
                    map.insert(relation, value);
                }
            }
            // A malformed container (non-object) is dropped, not copied.
            Some(_) | None => {}
        }
    }

    envelope
}

/// A link stub is an object whose only field is a string `href`, the
/// sentinel for "not yet fetched". Stubs must never be formatted as
/// end-values.
pub fn is_link_stub(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => map.len() == 1 && map.get("href").is_some_and(Value::is_string),
        None => false,
    }
}

/// The href of a link stub, if `value` is one.
pub fn stub_href(value: &Value) -> Option<&str> {
    if is_link_stub(value) {
        value.get("href").and_then(Value::as_str)
    } else {
        None
    }
}
