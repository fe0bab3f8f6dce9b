// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging configuration types

use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::LogFormat;

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging verbosity level
    #[serde(rename = "log-level", default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(rename = "log-format", default, skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,
}

impl LoggingConfig {
    /// The configured level, or `default` when none is set
    pub fn level_or(&self, default: Level) -> anyhow::Result<Level> {
        match &self.level {
            Some(level) => Level::from_str(level.trim())
                .with_context(|| format!("Invalid log level: {level}")),
            None => Ok(default),
        }
    }

    /// Install a global subscriber for `component` using this configuration
    pub fn init(&self, component: &str) -> anyhow::Result<()> {
        crate::init(
            component,
            self.level_or(Level::INFO)?,
            self.format.unwrap_or_default(),
        )
    }
}
