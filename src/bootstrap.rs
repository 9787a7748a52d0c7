//! Bootstrap attributes
//!
//! The three values every session needs (API key, entity type, entity id)
//! plus the debug/production mode flag. Validation happens here, before any
//! network activity: a missing value is the one fatal, user-facing error in
//! the pipeline, and its message echoes all three resolved values so the
//! broken one is visible at a glance.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::BindError;

/// Production API endpoint.
const PRODUCTION_BASE_URL: &str = "https://api.w3.org/";
/// Test API endpoint, used in debug mode.
const DEBUG_BASE_URL: &str = "https://api-test.w3.org/";

/// The kind of entity a page is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Domain,
    Group,
    User,
}

impl EntityType {
    /// The API collection segment for this entity type.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityType::Domain => "domains",
            EntityType::Group => "groups",
            EntityType::User => "users",
        }
    }
}

impl FromStr for EntityType {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain" => Ok(EntityType::Domain),
            "group" => Ok(EntityType::Group),
            "user" => Ok(EntityType::User),
            other => Err(BindError::UnknownEntityType {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Domain => "domain",
            EntityType::Group => "group",
            EntityType::User => "user",
        };
        f.write_str(name)
    }
}

/// Which API endpoint the session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Debug,
    #[default]
    Production,
}

impl FromStr for Mode {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Mode::Debug),
            "production" => Ok(Mode::Production),
            other => Err(BindError::UnknownMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Validated bootstrap: a session cannot be built without one.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub api_key: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub mode: Mode,
    /// Explicit base URL override; trumps the mode-selected endpoint.
    pub base_url: Option<String>,
}

impl Bootstrap {
    /// Validate raw attributes. Fatal [`BindError::BootstrapIncomplete`]
    /// if any of the three required values is absent, raised before any
    /// network activity and echoing everything that WAS resolved.
    pub fn resolve(
        api_key: Option<String>,
        entity_type: Option<String>,
        entity_id: Option<String>,
    ) -> Result<Self, BindError> {
        let incomplete = api_key.as_deref().map(str::trim).unwrap_or("").is_empty()
            || entity_type.is_none()
            || entity_id.as_deref().map(str::trim).unwrap_or("").is_empty();
        if incomplete {
            return Err(BindError::BootstrapIncomplete {
                api_key,
                entity_type,
                entity_id,
            });
        }

        let entity_type = entity_type.unwrap_or_default().parse()?;

        Ok(Self {
            api_key: api_key.unwrap_or_default(),
            entity_type,
            entity_id: entity_id.unwrap_or_default(),
            mode: Mode::default(),
            base_url: None,
        })
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The base URL this session fetches against.
    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.mode) {
            (Some(explicit), _) => explicit,
            (None, Mode::Debug) => DEBUG_BASE_URL,
            (None, Mode::Production) => PRODUCTION_BASE_URL,
        }
    }

    /// Path of the root resource relative to the base URL.
    pub fn root_path(&self) -> String {
        format!("{}/{}", self.entity_type.collection(), self.entity_id)
    }
}
