use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::app::reconcile::{CHECK_LIMIT, MatchPolicy, VIDEO_CATEGORY};

/// User settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Head window compared when looking for a list shift. Shifts larger than
    /// this go undetected and resolve to offset 0.
    pub check_limit: usize,
    pub video_category: String,
    pub played_marker: String,
    pub tier_marker: String,
    pub tier_nicknames: Vec<String>,
    pub anonymous_label: String,
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_limit: CHECK_LIMIT,
            video_category: VIDEO_CATEGORY.to_string(),
            played_marker: "✅".to_string(),
            tier_marker: "🟥2️⃣".to_string(),
            tier_nicknames: Vec::new(),
            anonymous_label: "(익명)".to_string(),
            poll_interval_ms: 500,
        }
    }
}

impl Settings {
    pub(crate) fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            check_limit: self.check_limit,
            video_category: self.video_category.clone(),
        }
    }
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings at {}", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid settings in {}", path.display()))
}

pub fn parse_settings(raw: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(raw)?;
    Ok(settings)
}
