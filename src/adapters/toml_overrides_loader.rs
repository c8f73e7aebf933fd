//! TOML loader for `FormattingOverrides` (spec §6 `formattingOverrides`).
//!
//! Grounded on `adapters::rule_loader::load_rules_from_toml`'s shape: parse
//! straight into a typed struct with `toml::from_str`, no generic JSON
//! detour — `FormattingOverrides` already derives `Deserialize`, so unlike
//! `adapters::toml_config_loader::TomlConfigLoader` (which needs a
//! dot-path-addressable `Configuration` because its schema is open-ended),
//! there is no intermediate value representation to build here.

use crate::domain::formatting::FormattingOverrides;
use crate::error::PipelineError;

/// Parses a TOML document shaped like:
///
/// ```toml
/// font-size = 13.0
/// paragraph-indent = 0.0
///
/// [margins]
/// top = 90.0
/// bottom = 72.0
/// left = 72.0
/// right = 72.0
/// ```
///
/// Every field is optional; an empty document yields an all-`None`
/// `FormattingOverrides` that changes nothing when merged.
pub fn load_overrides_from_toml(toml_content: &str) -> Result<FormattingOverrides, PipelineError> {
    toml::from_str(toml_content).map_err(|e| PipelineError::Internal(format!("failed to parse formatting overrides TOML: {e}")))
}
