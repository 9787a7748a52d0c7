//! Polymorphic entity formatting
//!
//! API resources are loosely typed: the same crawl can surface users,
//! groups, specifications, charters, services, or bare link objects, none
//! of which declare a type up front. Classification therefore runs an
//! ordered chain of shape predicates (discriminator fields and field-pair
//! tests) and the FIRST match wins. The chain order is a contract, not an
//! accident: most-specific shapes are tested before generic fallbacks, so
//! an object carrying both a `name` and a `{shortlink, title}` pair always
//! renders as a specification, never as a plain named item.
//!
//! Classification happens exactly once per value, here, producing an
//! [`EntityVariant`]; rendering is a straight match on the variant. No
//! shape test lives anywhere else in the crate.
//!
//! Dispatch order for [`format`]:
//! 1. a binding template, when present, takes over rendering entirely;
//! 2. a sequence of photo-size links renders as the best-ranked image;
//! 3. any other sequence renders each element recursively as a list;
//! 4. a single entity runs the variant chain;
//! 5. scalars render as escaped text.
//!
//! A value matching nothing produces no markup: `None`, never an error.

use serde_json::Value;

use crate::envelope::is_link_stub;
use crate::template::interpolate;

/// Photo size ranking: large > thumbnail > tiny. Names outside the closed
/// set are absent for ranking purposes.
fn photo_rank(name: &str) -> Option<u8> {
    match name {
        "large" => Some(2),
        "thumbnail" => Some(1),
        "tiny" => Some(0),
        _ => None,
    }
}

/// Service subtypes, discriminated by the entity's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    MailingList,
    Blog,
    Tracker,
    Repository,
    Wiki,
    Chat,
    Rss,
    Other,
}

impl ServiceKind {
    fn from_type(value: &str) -> Self {
        match value {
            "mailing-list" => Self::MailingList,
            "blog" => Self::Blog,
            "tracker" => Self::Tracker,
            "repository" => Self::Repository,
            "wiki" => Self::Wiki,
            "chat" => Self::Chat,
            "rss" => Self::Rss,
            _ => Self::Other,
        }
    }

    fn label(&self) -> Option<&'static str> {
        match self {
            Self::MailingList => Some("Mailing list"),
            Self::Blog => Some("Blog"),
            Self::Tracker => Some("Tracker"),
            Self::Repository => Some("Repository"),
            Self::Wiki => Some("Wiki"),
            Self::Chat => Some("Chat"),
            Self::Rss => Some("RSS feed"),
            Self::Other => None,
        }
    }
}

/// Every renderable shape of a single entity, in classification order.
#[derive(Debug)]
pub enum EntityVariant<'a> {
    Charter {
        start: &'a str,
        end: &'a str,
        uri: Option<&'a str>,
    },
    Service {
        kind: ServiceKind,
        link: &'a str,
        name: Option<&'a str>,
    },
    Group {
        name: &'a str,
        homepage: &'a str,
    },
    User {
        name: &'a str,
        href: Option<&'a str>,
    },
    Function {
        name: &'a str,
        href: Option<&'a str>,
    },
    Affiliation {
        name: &'a str,
    },
    Participation {
        member: &'a Value,
    },
    Specification {
        title: &'a str,
        shortlink: &'a str,
        description: Option<&'a str>,
        shortname: Option<&'a str>,
    },
    SpecVersion {
        uri: &'a str,
        status: &'a str,
        title: Option<&'a str>,
    },
    Named { name: &'a str },
    Titled { title: &'a str },
    LinkedTitle { href: &'a str, title: &'a str },
    LinkedName { href: &'a str, name: &'a str },
}

/// Run the predicate chain over one entity. First match wins.
pub fn classify(entity: &Value) -> Option<EntityVariant<'_>> {
    let obj = entity.as_object()?;
    let text = |key: &str| obj.get(key).and_then(Value::as_str);
    let discr = text("discr");

    if let (Some(start), Some(end)) = (text("start"), text("end")) {
        return Some(EntityVariant::Charter {
            start,
            end,
            uri: text("uri"),
        });
    }

    if let (Some(link), Some(kind)) = (text("link"), text("type")) {
        return Some(EntityVariant::Service {
            kind: ServiceKind::from_type(kind),
            link,
            name: text("name"),
        });
    }

    if let (Some(homepage), Some(name)) = (related_href(entity, "homepage"), text("name")) {
        return Some(EntityVariant::Group { name, homepage });
    }

    if discr == Some("user") && obj.contains_key("id") {
        if let Some(name) = text("name") {
            return Some(EntityVariant::User {
                name,
                href: self_href(entity),
            });
        }
    }

    if discr == Some("function") {
        if let Some(name) = text("name") {
            return Some(EntityVariant::Function {
                name,
                href: self_href(entity),
            });
        }
    }

    if discr == Some("organization") {
        if let Some(name) = text("name") {
            return Some(EntityVariant::Affiliation { name });
        }
    }

    if discr == Some("participation") {
        let member = related(entity, "user").or_else(|| related(entity, "organization"))?;
        return Some(EntityVariant::Participation { member });
    }

    if let (Some(shortlink), Some(title)) = (text("shortlink"), text("title")) {
        return Some(EntityVariant::Specification {
            title,
            shortlink,
            description: text("description"),
            shortname: text("shortname"),
        });
    }

    if let (Some(uri), Some(status)) = (text("uri"), text("status")) {
        return Some(EntityVariant::SpecVersion {
            uri,
            status,
            title: text("title"),
        });
    }

    // Linked generics before bare ones: href+title/href+name are the more
    // specific shapes and would otherwise be unreachable.
    if let (Some(href), Some(title)) = (text("href"), text("title")) {
        return Some(EntityVariant::LinkedTitle { href, title });
    }

    if let (Some(href), Some(name)) = (text("href"), text("name")) {
        return Some(EntityVariant::LinkedName { href, name });
    }

    if let Some(name) = text("name") {
        return Some(EntityVariant::Named { name });
    }

    if let Some(title) = text("title") {
        return Some(EntityVariant::Titled { title });
    }

    None
}

/// Render a classified variant as markup.
pub fn render(variant: &EntityVariant<'_>) -> Option<String> {
    let markup = match variant {
        EntityVariant::Charter { start, end, uri } => {
            let span = format!("{} \u{2013} {}", escape_html(start), escape_html(end));
            match uri {
                Some(uri) => format!("<li><a href=\"{}\">{}</a></li>", escape_attr(uri), span),
                None => format!("<li>{span}</li>"),
            }
        }
        EntityVariant::Service { kind, link, name } => {
            let label = name
                .map(escape_html)
                .or_else(|| kind.label().map(String::from))
                .unwrap_or_else(|| escape_html(link));
            format!("<li><a href=\"{}\">{}</a></li>", escape_attr(link), label)
        }
        EntityVariant::Group { name, homepage } => format!(
            "<li><a href=\"{}\">{}</a></li>",
            escape_attr(homepage),
            escape_html(name)
        ),
        EntityVariant::User { name, href } | EntityVariant::Function { name, href } => match href {
            Some(href) => format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape_attr(href),
                escape_html(name)
            ),
            None => format!("<li>{}</li>", escape_html(name)),
        },
        EntityVariant::Affiliation { name } => {
            format!("<li class=\"organization\">{}</li>", escape_html(name))
        }
        EntityVariant::Participation { member } => return format(member, None),
        EntityVariant::Specification {
            title,
            shortlink,
            description,
            shortname,
        } => {
            let tooltip = description
                .map(|d| format!(" title=\"{}\"", escape_attr(d)))
                .unwrap_or_default();
            let badge = shortname
                .map(|s| format!(" <span class=\"shortname\">{}</span>", escape_html(s)))
                .unwrap_or_default();
            format!(
                "<li><a href=\"{}\"{}>{}</a>{}</li>",
                escape_attr(shortlink),
                tooltip,
                escape_html(title),
                badge
            )
        }
        EntityVariant::SpecVersion { uri, status, title } => format!(
            "<li><a href=\"{}\">{}</a> ({})</li>",
            escape_attr(uri),
            escape_html(title.unwrap_or(uri)),
            escape_html(status)
        ),
        EntityVariant::Named { name } => format!("<li>{}</li>", escape_html(name)),
        EntityVariant::Titled { title } => format!("<li>{}</li>", escape_html(title)),
        EntityVariant::LinkedTitle { href, title } => format!(
            "<li><a href=\"{}\">{}</a></li>",
            escape_attr(href),
            escape_html(title)
        ),
        // Intentionally NOT list-item wrapped, unlike the titled form.
        EntityVariant::LinkedName { href, name } => format!(
            "<a href=\"{}\">{}</a>",
            escape_attr(href),
            escape_html(name)
        ),
    };
    Some(markup)
}

/// Format a resolved binding value as markup.
///
/// Returns `None` on a formatter miss (a value matching no rule), which
/// the caller treats as "resolved, nothing to write". Link stubs never
/// reach rendering; a stub here is a crawler bug, answered with `None`.
pub fn format(value: &Value, template: Option<&str>) -> Option<String> {
    if is_link_stub(value) {
        tracing::warn!("link stub reached the formatter; refusing to render it");
        return None;
    }

    if let Some(template) = template {
        return Some(match value {
            Value::Array(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", interpolate(template, item)))
                    .collect();
                format!("<ul>{}</ul>", rendered.concat())
            }
            single => interpolate(template, single),
        });
    }

    match value {
        Value::Array(items) => {
            if let Some(href) = best_photo(items) {
                return Some(format!(
                    "<img src=\"{}\" alt=\"photo\">",
                    escape_attr(href)
                ));
            }
            let rendered: Vec<String> = items
                .iter()
                .filter_map(|item| format(item, None))
                .collect();
            Some(format!("<ul>{}</ul>", rendered.concat()))
        }
        Value::Object(_) => render(&classify(value)?),
        Value::String(s) => Some(escape_html(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
    }
}

/// Detect a photo-size array and pick the highest-ranked href.
///
/// Every element must be an object carrying string `href` and `name`, and
/// at least one name must be in the ranking. Unranked names stay in the
/// array but never win.
fn best_photo(items: &[Value]) -> Option<&str> {
    if items.is_empty() {
        return None;
    }
    let mut best: Option<(u8, &str)> = None;
    for item in items {
        let obj = item.as_object()?;
        let href = obj.get("href").and_then(Value::as_str)?;
        let name = obj.get("name").and_then(Value::as_str)?;
        if let Some(rank) = photo_rank(name) {
            if best.map(|(r, _)| rank > r).unwrap_or(true) {
                best = Some((rank, href));
            }
        }
    }
    best.map(|(_, href)| href)
}

/// A relation value on an entity, looked up on the flattened top level
/// first, then under a still-nested `_links` container (entities embedded
/// in a parent resource are not deep-normalized).
fn related<'a>(entity: &'a Value, rel: &str) -> Option<&'a Value> {
    entity
        .get(rel)
        .or_else(|| entity.get("_links").and_then(|l| l.get(rel)))
        .or_else(|| entity.get("_embedded").and_then(|e| e.get(rel)))
}

/// The href of a relation, whatever side of normalization the entity is on.
fn related_href<'a>(entity: &'a Value, rel: &str) -> Option<&'a str> {
    related(entity, rel).and_then(|v| v.get("href")).and_then(Value::as_str)
}

/// An entity's own URL: a flattened `href` field or its `self` link.
fn self_href(entity: &Value) -> Option<&str> {
    entity
        .get("href")
        .and_then(Value::as_str)
        .or_else(|| related_href(entity, "self"))
}

/// Escape text content for HTML element bodies.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text for double-quoted HTML attribute values.
fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
