use anyhow::Context;
use serde::Deserialize;
use tracing::{
  error,
  info,
  warn
};

pub const DEFAULT_NAMESPACE: &str =
  "wazwez";

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
pub struct AppConfig {
  #[serde(default)]
  pub storage:     StorageSection,
  #[serde(default)]
  pub transitions: TransitionSection,
  #[serde(default)]
  pub limits:      LimitSection
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
pub struct StorageSection {
  #[serde(default = "default_namespace")]
  pub namespace: String
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
pub struct TransitionSection {
  /// Pause between ticking a task off
  /// and the start of its fade-out.
  #[serde(
    default = "default_complete_delay_ms"
  )]
  pub complete_delay_ms: u32,
  #[serde(default = "default_fade_ms")]
  pub fade_ms:           u32
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
pub struct LimitSection {
  #[serde(
    default = "default_title_max_chars"
  )]
  pub title_max_chars:       usize,
  #[serde(
    default = "default_description_max_chars"
  )]
  pub description_max_chars: usize
}

fn default_namespace() -> String {
  DEFAULT_NAMESPACE.to_string()
}

fn default_complete_delay_ms() -> u32 {
  500
}

fn default_fade_ms() -> u32 {
  300
}

fn default_title_max_chars() -> usize {
  100
}

fn default_description_max_chars()
-> usize {
  500
}

impl Default for StorageSection {
  fn default() -> Self {
    Self {
      namespace: default_namespace()
    }
  }
}

impl Default for TransitionSection {
  fn default() -> Self {
    Self {
      complete_delay_ms:
        default_complete_delay_ms(),
      fade_ms: default_fade_ms()
    }
  }
}

impl Default for LimitSection {
  fn default() -> Self {
    Self {
      title_max_chars:
        default_title_max_chars(),
      description_max_chars:
        default_description_max_chars()
    }
  }
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      storage:     StorageSection::default(),
      transitions: TransitionSection::default(),
      limits:      LimitSection::default()
    }
  }
}

impl AppConfig {
  pub fn from_toml_str(
    raw: &str
  ) -> anyhow::Result<Self> {
    let mut config =
      toml::from_str::<AppConfig>(raw)
        .context(
          "failed to parse app config"
        )?;
    config.sanitize();
    Ok(config)
  }

  /// Parses `raw`, logging and falling
  /// back to defaults when it is broken.
  pub fn load_or_default(
    raw: &str
  ) -> Self {
    match Self::from_toml_str(raw) {
      | Ok(config) => {
        info!(
          namespace = %config.storage.namespace,
          complete_delay_ms = config.transitions.complete_delay_ms,
          fade_ms = config.transitions.fade_ms,
          "loaded app config"
        );
        config
      }
      | Err(err) => {
        error!(error = %err, "failed parsing app config; using defaults");
        Self::default()
      }
    }
  }

  fn sanitize(&mut self) {
    let namespace = self
      .storage
      .namespace
      .trim()
      .to_string();
    if namespace.is_empty() {
      warn!(
        "empty storage namespace; \
         using default"
      );
      self.storage.namespace =
        default_namespace();
    } else {
      self.storage.namespace =
        namespace;
    }

    if self.limits.title_max_chars == 0
    {
      self.limits.title_max_chars =
        default_title_max_chars();
    }
    if self
      .limits
      .description_max_chars
      == 0
    {
      self
        .limits
        .description_max_chars =
        default_description_max_chars();
    }

    self.transitions.complete_delay_ms =
      self
        .transitions
        .complete_delay_ms
        .min(10_000);
    self.transitions.fade_ms = self
      .transitions
      .fade_ms
      .min(10_000);
  }
}

#[cfg(test)]
mod tests {
  use super::AppConfig;

  #[test]
  fn empty_document_gives_defaults() {
    let config =
      AppConfig::from_toml_str("")
        .expect("parse empty config");
    assert_eq!(
      config,
      AppConfig::default()
    );
    assert_eq!(
      config.storage.namespace,
      "wazwez"
    );
    assert_eq!(
      config.limits.title_max_chars,
      100
    );
  }

  #[test]
  fn partial_sections_are_sanitized() {
    let config = AppConfig::from_toml_str(
      r#"
[storage]
namespace = "  "

[transitions]
fade_ms = 99999

[limits]
title_max_chars = 0
description_max_chars = 80
"#
    )
    .expect("parse config");

    assert_eq!(
      config.storage.namespace,
      "wazwez"
    );
    assert_eq!(
      config.transitions.fade_ms,
      10_000
    );
    assert_eq!(
      config
        .transitions
        .complete_delay_ms,
      500
    );
    assert_eq!(
      config.limits.title_max_chars,
      100
    );
    assert_eq!(
      config
        .limits
        .description_max_chars,
      80
    );
  }

  #[test]
  fn broken_document_falls_back() {
    let config =
      AppConfig::load_or_default(
        "[storage\nnamespace = 1"
      );
    assert_eq!(
      config,
      AppConfig::default()
    );
  }
}
