// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Timestamp, attribute and permission operations

use chrono::{DateTime, Local, Utc};
use tracing::debug;

use crate::clock::sentinel_utc;
use crate::error::{FsError, FsResult};
use crate::path::PathArg;
use crate::types::{FileAttributes, TimeKind, UnixFileMode};
use crate::vfs::MockFileSystem;

impl MockFileSystem {
    /// UTC timestamp of `path`; a missing path reports 1601-01-01T00:00:00Z
    pub fn get_time_utc<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        kind: TimeKind,
    ) -> FsResult<DateTime<Utc>> {
        let path = self.normalize(path, "path")?;
        let store = self.lock_store();
        let Some(target) = self.ancestry_or_missing(&store, &path)? else {
            return Ok(sentinel_utc());
        };
        Ok(store
            .get(&target)
            .map(|e| e.node.times.get(kind))
            .unwrap_or_else(sentinel_utc))
    }

    pub fn get_time<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        kind: TimeKind,
    ) -> FsResult<DateTime<Local>> {
        Ok(self.get_time_utc(path, kind)?.with_timezone(&Local))
    }

    pub fn get_creation_time<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<DateTime<Local>> {
        self.get_time(path, TimeKind::Creation)
    }

    pub fn get_creation_time_utc<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
    ) -> FsResult<DateTime<Utc>> {
        self.get_time_utc(path, TimeKind::Creation)
    }

    pub fn get_last_access_time<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
    ) -> FsResult<DateTime<Local>> {
        self.get_time(path, TimeKind::LastAccess)
    }

    pub fn get_last_access_time_utc<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
    ) -> FsResult<DateTime<Utc>> {
        self.get_time_utc(path, TimeKind::LastAccess)
    }

    pub fn get_last_write_time<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
    ) -> FsResult<DateTime<Local>> {
        self.get_time(path, TimeKind::LastWrite)
    }

    pub fn get_last_write_time_utc<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
    ) -> FsResult<DateTime<Utc>> {
        self.get_time_utc(path, TimeKind::LastWrite)
    }

    pub fn set_file_time<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        kind: TimeKind,
        at: DateTime<Local>,
    ) -> FsResult<()> {
        self.set_time(path.into(), kind, at.with_timezone(&Utc), false)
    }

    pub fn set_file_time_utc<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        kind: TimeKind,
        at: DateTime<Utc>,
    ) -> FsResult<()> {
        self.set_time(path.into(), kind, at, false)
    }

    pub fn set_directory_time<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        kind: TimeKind,
        at: DateTime<Local>,
    ) -> FsResult<()> {
        self.set_time(path.into(), kind, at.with_timezone(&Utc), true)
    }

    pub fn set_directory_time_utc<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        kind: TimeKind,
        at: DateTime<Utc>,
    ) -> FsResult<()> {
        self.set_time(path.into(), kind, at, true)
    }

    fn set_time(
        &self,
        path: PathArg<'_>,
        kind: TimeKind,
        at: DateTime<Utc>,
        directory_api: bool,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        let mut store = self.lock_store();
        let target = self.existing_ancestry(&store, &path)?;
        match store.get_mut(&target) {
            Some(entry) if !directory_api || entry.node.is_dir() => entry.node.times.set(kind, at),
            Some(_) => return Err(FsError::directory_not_found(path.as_str())),
            None if directory_api => return Err(FsError::directory_not_found(path.as_str())),
            None => return Err(self.missing_file(&store, &path)),
        }
        debug!(op = "set_time", path = %target, ?kind, at = %at, "timestamp updated");
        Ok(())
    }

    pub fn get_attributes<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<FileAttributes> {
        let path = self.normalize(path, "path")?;
        let store = self.lock_store();
        let target = self.existing_ancestry(&store, &path)?;
        match store.get(&target) {
            Some(entry) => Ok(entry
                .node
                .reported_attributes(self.platform(), entry.path.file_name())),
            None => Err(self.missing_file(&store, &path)),
        }
    }

    /// Replace the attribute set; `Directory` and `ReparsePoint` are ignored
    pub fn set_attributes<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        attributes: FileAttributes,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        let platform = self.platform();
        let mut store = self.lock_store();
        let target = self.existing_ancestry(&store, &path)?;
        match store.get_mut(&target) {
            Some(entry) => entry.node.apply_attributes(platform, attributes),
            None => return Err(self.missing_file(&store, &path)),
        }
        debug!(op = "set_attributes", path = %target, %attributes, "attributes updated");
        Ok(())
    }

    pub(crate) fn require_unix_mode(&self) -> FsResult<()> {
        if self.platform().supports_unix_mode() {
            Ok(())
        } else {
            Err(FsError::Unsupported(
                "Unix file modes are not supported on this platform.".to_string(),
            ))
        }
    }

    pub fn get_unix_file_mode<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<UnixFileMode> {
        let path = self.normalize(path, "path")?;
        self.require_unix_mode()?;
        let store = self.lock_store();
        let target = self.final_target(&store, &path)?;
        match store.get(&target) {
            Some(entry) => Ok(entry.node.unix_mode.unwrap_or(if entry.node.is_dir() {
                UnixFileMode::DEFAULT_DIRECTORY
            } else {
                UnixFileMode::DEFAULT_FILE
            })),
            None => Err(self.missing_file(&store, &path)),
        }
    }

    pub fn set_unix_file_mode<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        mode: UnixFileMode,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        self.require_unix_mode()?;
        let mut store = self.lock_store();
        let target = self.final_target(&store, &path)?;
        match store.get_mut(&target) {
            Some(entry) => entry.node.unix_mode = Some(UnixFileMode(mode.bits())),
            None => return Err(self.missing_file(&store, &path)),
        }
        debug!(op = "set_unix_file_mode", path = %target, mode = %mode, "mode updated");
        Ok(())
    }
}
