//! SELECT compiler configuration
//!
//! Values come from defaults, `WCQ_*` environment variables, or a JSON file.

use crate::error::{WcqError, WcqResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const ENV_IDENTIFIER_CASE: &str = "WCQ_IDENTIFIER_CASE";
pub const ENV_COUNT_COLUMN: &str = "WCQ_COUNT_COLUMN";

/// How unquoted identifiers are matched against field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCase {
    /// Unquoted identifiers are lower-cased before lookup.
    #[default]
    Lowercase,
    /// Identifiers must match exactly.
    Preserve,
}

impl IdentifierCase {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowercase" => Some(IdentifierCase::Lowercase),
            "preserve" => Some(IdentifierCase::Preserve),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    pub identifier_case: IdentifierCase,
    /// Output column of COUNT queries.
    pub count_column: String,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            identifier_case: IdentifierCase::Lowercase,
            count_column: "count".to_string(),
        }
    }
}

impl SelectConfig {
    /// Defaults overridden by whatever `WCQ_*` variables are set.
    pub fn from_env() -> WcqResult<Self> {
        let mut config = Self::default();
        if let Ok(value) = env::var(ENV_IDENTIFIER_CASE) {
            config.identifier_case = IdentifierCase::parse(&value).ok_or_else(|| {
                WcqError::Serialization(format!("{ENV_IDENTIFIER_CASE}: unknown value '{value}'"))
            })?;
        }
        if let Ok(value) = env::var(ENV_COUNT_COLUMN) {
            if value.is_empty() {
                return Err(WcqError::Serialization(format!("{ENV_COUNT_COLUMN} is empty")));
            }
            config.count_column = value;
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> WcqResult<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> WcqResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Field-name form of an identifier under this configuration.
    pub fn normalize(&self, text: &str, quoted: bool) -> String {
        match self.identifier_case {
            IdentifierCase::Lowercase if !quoted => text.to_lowercase(),
            _ => text.to_string(),
        }
    }
}
