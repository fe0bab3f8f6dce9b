// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Construction-time configuration for [`MockFileSystem`](crate::MockFileSystem)

use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};
use crate::platform::Platform;

pub const ENV_PLATFORM: &str = "MOCKFS_PLATFORM";
pub const ENV_CURRENT_DIRECTORY: &str = "MOCKFS_CURRENT_DIRECTORY";
pub const ENV_TEMP_DIRECTORY: &str = "MOCKFS_TEMP_DIRECTORY";

/// Configuration for a mock file system instance
///
/// The platform cannot change once a file system has been built from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    pub platform: Platform,
    /// Defaults to the platform root
    pub current_directory: Option<String>,
    /// Defaults to `C:\temp\` or `/tmp/`
    pub temp_directory: Option<String>,
    pub create_temp_directory: bool,
    /// Adding a path under a missing drive or share creates that root
    pub auto_create_roots: bool,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self::for_platform(Platform::host())
    }
}

impl FsConfig {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            current_directory: None,
            temp_directory: None,
            create_temp_directory: true,
            auto_create_roots: true,
        }
    }

    pub fn windows() -> Self {
        Self::for_platform(Platform::Windows)
    }

    pub fn unix() -> Self {
        Self::for_platform(Platform::Unix)
    }

    pub fn with_current_directory(mut self, dir: impl Into<String>) -> Self {
        self.current_directory = Some(dir.into());
        self
    }

    pub fn with_temp_directory(mut self, dir: impl Into<String>) -> Self {
        self.temp_directory = Some(dir.into());
        self
    }

    pub fn with_create_temp_directory(mut self, create: bool) -> Self {
        self.create_temp_directory = create;
        self
    }

    pub fn with_auto_create_roots(mut self, auto_create: bool) -> Self {
        self.auto_create_roots = auto_create;
        self
    }

    pub fn from_json_str(json: &str) -> FsResult<Self> {
        serde_json::from_str(json).map_err(|e| FsError::Format(format!("Invalid configuration: {e}")))
    }

    pub fn to_json_string(&self) -> FsResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FsError::Format(format!("Invalid configuration: {e}")))
    }

    /// Apply `MOCKFS_*` variables from the process environment
    pub fn with_env_overrides(self) -> FsResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> FsResult<Self> {
        if let Some(platform) = lookup(ENV_PLATFORM) {
            self.platform = platform.parse().map_err(FsError::Format)?;
        }
        if let Some(dir) = lookup(ENV_CURRENT_DIRECTORY) {
            self.current_directory = Some(dir);
        }
        if let Some(dir) = lookup(ENV_TEMP_DIRECTORY) {
            self.temp_directory = Some(dir);
        }
        Ok(self)
    }

    pub fn resolved_current_directory(&self) -> String {
        self.current_directory
            .clone()
            .unwrap_or_else(|| self.platform.default_root().to_string())
    }

    pub fn resolved_temp_directory(&self) -> String {
        self.temp_directory
            .clone()
            .unwrap_or_else(|| self.platform.default_temp_directory().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_follow_platform() {
        let cfg = FsConfig::windows();
        assert_eq!(cfg.resolved_current_directory(), "C:\\");
        assert_eq!(cfg.resolved_temp_directory(), "C:\\temp\\");
        let cfg = FsConfig::unix();
        assert_eq!(cfg.resolved_temp_directory(), "/tmp/");
        assert!(cfg.auto_create_roots);
    }

    #[test]
    fn parses_partial_json() {
        let cfg = FsConfig::from_json_str(r#"{"platform":"unix","current_directory":"/home/me"}"#)
            .unwrap();
        assert_eq!(cfg.platform, Platform::Unix);
        assert_eq!(cfg.resolved_current_directory(), "/home/me");
        assert!(cfg.create_temp_directory);

        assert!(matches!(
            FsConfig::from_json_str(r#"{"platform":"amiga"}"#),
            Err(FsError::Format(_))
        ));
    }

    #[test]
    fn overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_PLATFORM, "windows"),
            (ENV_CURRENT_DIRECTORY, "D:\\work"),
        ]
        .into_iter()
        .collect();
        let cfg = FsConfig::unix()
            .with_overrides_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.platform, Platform::Windows);
        assert_eq!(cfg.current_directory.as_deref(), Some("D:\\work"));
        assert!(cfg.temp_directory.is_none());

        let err = FsConfig::unix().with_overrides_from(|k| {
            (k == ENV_PLATFORM).then(|| "vms".to_string())
        });
        assert!(err.is_err());
    }
}
