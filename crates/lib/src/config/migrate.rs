//! Migration of legacy modifier records.
//!
//! Older configurations describe their mutations as `legacy_modifiers`.
//! Each record converts to an equivalent [`ProcessorConfig`], which is
//! appended to the processor list while the record is dropped. Records
//! with a blank application identifier carry no change and are dropped
//! without a replacement.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::BuildConfiguration;
use crate::processor::ProcessorConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegacyModifier {
  ApplicationIdentifier { application_identifier: String },
  /// Semicolon-separated define symbols.
  ScriptingDefines { defines: String },
}

impl LegacyModifier {
  pub fn kind(&self) -> &'static str {
    match self {
      LegacyModifier::ApplicationIdentifier { .. } => "application_identifier",
      LegacyModifier::ScriptingDefines { .. } => "scripting_defines",
    }
  }

  /// The equivalent processor, if the record describes a change.
  pub fn to_processor(&self) -> Option<ProcessorConfig> {
    match self {
      LegacyModifier::ApplicationIdentifier { application_identifier } => {
        let identifier = application_identifier.trim();
        if identifier.is_empty() {
          return None;
        }
        Some(ProcessorConfig::ApplicationIdentifier {
          identifier: identifier.to_string(),
        })
      }
      LegacyModifier::ScriptingDefines { defines } => Some(ProcessorConfig::ScriptingDefines {
        symbols: defines
          .split(';')
          .map(str::trim)
          .filter(|s| !s.is_empty())
          .map(str::to_string)
          .collect(),
      }),
    }
  }
}

/// Convert every legacy modifier into a processor.
///
/// Returns the kinds of the migrated records, in order. Empty when there
/// was nothing to migrate, in which case `config` is untouched.
pub fn migrate_legacy_modifiers(config: &mut BuildConfiguration) -> Vec<&'static str> {
  if config.legacy_modifiers.is_empty() {
    return Vec::new();
  }

  let modifiers = std::mem::take(&mut config.legacy_modifiers);
  let kinds: Vec<&'static str> = modifiers.iter().map(LegacyModifier::kind).collect();
  info!(config = %config.name, modifiers = ?kinds, "migrating legacy modifiers");

  for modifier in &modifiers {
    match modifier.to_processor() {
      Some(processor) => config.processors.push(processor),
      None => warn!(config = %config.name, kind = modifier.kind(), "dropping legacy modifier without a value"),
    }
  }
  kinds
}
