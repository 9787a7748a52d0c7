//! Page manifest parsing
//!
//! The manifest is the CLI's stand-in for a page scan: it carries the
//! bootstrap block and every binding declaration (expression + named
//! target slots) that a host with a real presentation surface would have
//! discovered by walking its document. Hosts embedding the library build a
//! [`BindingTable`](crate::binding::BindingTable) directly and never see
//! this type.
//!
//! ```yaml
//! schema: halbind/page@0.1
//!
//! api:
//!   key: supersecret            # or HALBIND_API_KEY
//!
//! entity:
//!   type: group
//!   id: "109"
//!
//! mode: debug
//!
//! bindings:
//!   - expression: name
//!     targets: [title, heading]
//!   - expression: chairs ${name}
//!     targets: [chairs-list]
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::binding::BindingTable;
use crate::bootstrap::{Bootstrap, Mode};
use crate::error::BindError;
use crate::render::SlotBoard;

/// Schema identifier a manifest must declare.
pub const PAGE_SCHEMA: &str = "halbind/page@0.1";

/// Environment variable consulted when the manifest omits the API key.
pub const API_KEY_ENV: &str = "HALBIND_API_KEY";

/// A page manifest parsed from YAML.
#[derive(Debug, Deserialize)]
pub struct PageManifest {
    pub schema: String,
    #[serde(default)]
    pub api: ApiBlock,
    #[serde(default)]
    pub entity: EntityBlock,
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub bindings: Vec<BindingDecl>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiBlock {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntityBlock {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// One declared binding: an expression and its target slots.
#[derive(Debug, Deserialize)]
pub struct BindingDecl {
    pub expression: String,
    pub targets: Vec<String>,
}

impl PageManifest {
    /// Parse a manifest from YAML text and check its schema.
    pub fn from_yaml(yaml: &str) -> Result<Self, BindError> {
        let manifest: PageManifest = serde_yaml::from_str(yaml)?;
        if manifest.schema != PAGE_SCHEMA {
            return Err(BindError::BadSchema {
                expected: PAGE_SCHEMA.to_string(),
                found: manifest.schema,
            });
        }
        Ok(manifest)
    }

    /// Load a manifest from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BindError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Resolve the bootstrap block, falling back to `HALBIND_API_KEY` for
    /// the key. Fatal on any missing value; no network has happened yet.
    pub fn bootstrap(&self) -> Result<Bootstrap, BindError> {
        let key = self
            .api
            .key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok());

        let mut bootstrap =
            Bootstrap::resolve(key, self.entity.kind.clone(), self.entity.id.clone())?;
        if let Some(mode) = self.mode {
            bootstrap = bootstrap.with_mode(mode);
        }
        if let Some(base_url) = &self.api.base_url {
            bootstrap = bootstrap.with_base_url(base_url.clone());
        }
        Ok(bootstrap)
    }

    /// Build the binding table, wiring every declared slot onto `board`.
    /// Declarations are kept in manifest order; that order is the crawl
    /// order.
    pub fn binding_table(&self, board: &SlotBoard) -> Result<BindingTable, BindError> {
        let mut table = BindingTable::new();
        for decl in &self.bindings {
            if decl.targets.is_empty() {
                return Err(BindError::NoTargets {
                    expression: decl.expression.clone(),
                });
            }
            let targets = decl
                .targets
                .iter()
                .map(|name| Box::new(board.target(name.clone())) as _)
                .collect();
            table.push(decl.expression.clone(), targets)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
schema: halbind/page@0.1

api:
  key: supersecret

entity:
  type: group
  id: "109"

bindings:
  - expression: name
    targets: [title, heading]
  - expression: chairs ${name}
    targets: [chairs-list]
"#;

    #[test]
    fn parses_a_valid_manifest() {
        let manifest = PageManifest::from_yaml(VALID).unwrap();
        assert_eq!(manifest.bindings.len(), 2);

        let bootstrap = manifest.bootstrap().unwrap();
        assert_eq!(bootstrap.api_key, "supersecret");
        assert_eq!(bootstrap.root_path(), "groups/109");
    }

    #[test]
    fn rejects_wrong_schema() {
        let err = PageManifest::from_yaml("schema: something/else@1\nbindings: []").unwrap_err();
        assert!(matches!(err, BindError::BadSchema { .. }));
    }

    #[test]
    fn missing_entity_id_is_fatal_at_bootstrap() {
        let yaml = r#"
schema: halbind/page@0.1
api:
  key: k
entity:
  type: user
bindings: []
"#;
        let manifest = PageManifest::from_yaml(yaml).unwrap();
        assert!(matches!(
            manifest.bootstrap(),
            Err(BindError::BootstrapIncomplete { .. })
        ));
    }

    #[test]
    fn mode_and_base_url_flow_into_bootstrap() {
        let yaml = r#"
schema: halbind/page@0.1
api:
  key: k
  base_url: "https://localhost:9999/"
entity:
  type: domain
  id: "9"
mode: debug
bindings: []
"#;
        let manifest = PageManifest::from_yaml(yaml).unwrap();
        let bootstrap = manifest.bootstrap().unwrap();
        assert_eq!(bootstrap.base_url(), "https://localhost:9999/");
    }

    #[test]
    fn binding_table_preserves_declaration_order() {
        let manifest = PageManifest::from_yaml(VALID).unwrap();
        let board = SlotBoard::new();
        let table = manifest.binding_table(&board).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.field(0), "name");
        assert_eq!(table.field(1), "chairs");
        assert_eq!(table.template(1), Some("${name}"));
        assert!(board.names().contains(&"chairs-list".to_string()));
    }

    #[test]
    fn binding_without_targets_is_rejected() {
        let yaml = r#"
schema: halbind/page@0.1
bindings:
  - expression: name
    targets: []
"#;
        let manifest = PageManifest::from_yaml(yaml).unwrap();
        let board = SlotBoard::new();
        assert!(matches!(
            manifest.binding_table(&board),
            Err(BindError::NoTargets { .. })
        ));
    }

    #[test]
    fn invalid_expression_fails_table_construction() {
        let yaml = r#"
schema: halbind/page@0.1
bindings:
  - expression: "..nope"
    targets: [slot]
"#;
        let manifest = PageManifest::from_yaml(yaml).unwrap();
        let board = SlotBoard::new();
        assert!(matches!(
            manifest.binding_table(&board),
            Err(BindError::InvalidField { .. })
        ));
    }
}
