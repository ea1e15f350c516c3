//! Demo configuration
//!
//! Everything is optional; a missing file or section falls back to the
//! library defaults.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use focal_a11y::{
    AnnouncerConfig, DynamicFocusOptions, FocusIndicator, InitialFocus, ModalOptions, SkipLinks,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub url: String,
    pub announcer: AnnouncerConfig,
    pub modal: ModalOptions,
    pub dynamic: DynamicFocusOptions,
    pub skip_links: SkipLinks,
    pub focus_indicator: FocusIndicator,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            url: "https://focal.test/todos".to_string(),
            announcer: AnnouncerConfig::default(),
            modal: ModalOptions {
                description_id: Some("modal-description".to_string()),
                initial_focus: Some(InitialFocus::from("#modal-primary-action")),
                ..Default::default()
            },
            dynamic: DynamicFocusOptions::default(),
            skip_links: SkipLinks::default(),
            focus_indicator: FocusIndicator::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid demo configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text)
    }
}
