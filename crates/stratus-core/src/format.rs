//! Account file format detection and handling.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StratusError;

/// Supported account file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl AccountFormat {
    /// Extensions a directory scan accepts, across every format.
    pub const SCANNED_EXTENSIONS: [&'static str; 3] = ["yaml", "yml", "json"];

    /// Infers the format of a scanned file: `.json` is JSON, anything else YAML.
    pub fn infer_from_path(path: &Path) -> Self {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            AccountFormat::Json
        } else {
            AccountFormat::Yaml
        }
    }

    /// Returns true if a directory scan should consider `path`.
    pub fn is_scanned(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| Self::SCANNED_EXTENSIONS.contains(&ext))
    }
}

impl fmt::Display for AccountFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountFormat::Yaml => f.write_str("YAML"),
            AccountFormat::Json => f.write_str("JSON"),
        }
    }
}

impl FromStr for AccountFormat {
    type Err = StratusError;

    /// Parses a configured format name.
    ///
    /// Unsupported values are a configuration error, raised when the source
    /// is built rather than on every parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "YAML" | "YML" => Ok(AccountFormat::Yaml),
            "JSON" => Ok(AccountFormat::Json),
            _ => Err(StratusError::configuration(
                "format",
                format!("Unsupported file format: {s} valid ones are [YAML, JSON]"),
            )),
        }
    }
}
