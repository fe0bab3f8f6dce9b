// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Operation engine: construction, bootstrap helpers and file operations
//!
//! Directory, metadata, link and access-control operations live in their
//! own modules as further `impl MockFileSystem` blocks.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::clock::{SystemClock, TimeSource};
use crate::config::FsConfig;
use crate::error::{FsError, FsResult, IoErrorKind};
use crate::node::{FileData, Node};
use crate::path::{CanonicalPath, PathArg, PathNormalizer, PathOps};
use crate::platform::Platform;
use crate::store::VirtualStore;
use crate::symlink::Resolver;
use crate::types::{CancellationToken, Metadata};
use crate::version::FileVersionInfo;

const UTF8_BOM: &str = "\u{feff}";

/// In-memory file system emulating Windows or Unix semantics
///
/// Every public operation takes the store lock once and holds it until it
/// returns, so concurrent callers never observe a half-applied change.
pub struct MockFileSystem {
    config: FsConfig,
    normalizer: PathNormalizer,
    temp_directory: CanonicalPath,
    store: Mutex<VirtualStore>,
    clock: Mutex<Arc<dyn TimeSource>>,
    temp_counter: AtomicU32,
}

impl std::fmt::Debug for MockFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFileSystem")
            .field("config", &self.config)
            .field("current_directory", self.normalizer.current_directory())
            .finish_non_exhaustive()
    }
}

impl MockFileSystem {
    /// Create a file system driven by the wall clock
    pub fn new(config: FsConfig) -> FsResult<Self> {
        Self::with_time_source(config, Arc::new(SystemClock))
    }

    /// Create a file system whose timestamps come from `clock`
    pub fn with_time_source(config: FsConfig, clock: Arc<dyn TimeSource>) -> FsResult<Self> {
        let platform = config.platform;
        let normalizer = PathNormalizer::new(platform, &config.resolved_current_directory())?;
        let temp_directory = normalizer.normalize(
            config.resolved_temp_directory().as_str().into(),
            "tempDirectory",
        )?;

        let now = clock.now();
        let mut store = VirtualStore::new(platform, config.auto_create_roots);
        // configured directories always get their roots
        store.ensure_root(normalizer.current_directory(), now);
        store.create_dir_all(normalizer.current_directory(), now)?;
        if config.create_temp_directory {
            store.ensure_root(&temp_directory, now);
            store.create_dir_all(&temp_directory, now)?;
        }

        debug!(
            %platform,
            current_directory = %normalizer.current_directory(),
            temp_directory = %temp_directory,
            "mock file system created"
        );

        Ok(Self {
            config,
            normalizer,
            temp_directory,
            store: Mutex::new(store),
            clock: Mutex::new(clock),
            temp_counter: AtomicU32::new(0),
        })
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.normalizer.platform()
    }

    /// Path-string operations under this file system's rules
    pub fn path(&self) -> PathOps<'_> {
        PathOps::new(&self.normalizer, &self.temp_directory)
    }

    /// Replace the time source used for subsequent mutations
    pub fn set_time_source(&self, clock: Arc<dyn TimeSource>) {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner) = clock;
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .now()
    }

    pub(crate) fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }

    pub(crate) fn normalize<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        param: &'static str,
    ) -> FsResult<CanonicalPath> {
        self.normalizer.normalize(path.into(), param)
    }

    pub(crate) fn try_normalize<'p>(&self, path: impl Into<PathArg<'p>>) -> Option<CanonicalPath> {
        self.normalizer.try_normalize(path.into())
    }

    pub(crate) fn lock_store(&self) -> MutexGuard<'_, VirtualStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `path` with every directory link above its last name followed
    pub(crate) fn ancestry(
        &self,
        store: &VirtualStore,
        path: &CanonicalPath,
    ) -> FsResult<CanonicalPath> {
        Resolver::new(store, &self.normalizer).resolve_ancestry(path)
    }

    /// Like [`Self::ancestry`], but a broken or cyclic directory link above
    /// the last name reads as a missing parent and yields `None`
    pub(crate) fn ancestry_or_missing(
        &self,
        store: &VirtualStore,
        path: &CanonicalPath,
    ) -> FsResult<Option<CanonicalPath>> {
        match self.ancestry(store, path) {
            Ok(resolved) => Ok(Some(resolved)),
            Err(err)
                if matches!(
                    err.io_kind(),
                    Some(IoErrorKind::UnresolvedLink | IoErrorKind::LinkCycle)
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// [`Self::ancestry`] for lookups of an existing node; a broken parent
    /// link fails as a missing directory
    pub(crate) fn existing_ancestry(
        &self,
        store: &VirtualStore,
        path: &CanonicalPath,
    ) -> FsResult<CanonicalPath> {
        self.ancestry_or_missing(store, path)?
            .ok_or_else(|| FsError::directory_not_found(path.as_str()))
    }

    /// `path` with the whole link chain followed
    pub(crate) fn final_target(
        &self,
        store: &VirtualStore,
        path: &CanonicalPath,
    ) -> FsResult<CanonicalPath> {
        Resolver::new(store, &self.normalizer).resolve_final(path)
    }

    /// Missing-file failure in real-OS order: a missing parent directory is
    /// reported before the missing file itself
    pub(crate) fn missing_file(&self, store: &VirtualStore, path: &CanonicalPath) -> FsError {
        match self.ancestry(store, path) {
            Ok(resolved) if store.parent_exists(&resolved) => {
                FsError::file_not_found(path.as_str())
            }
            _ => FsError::directory_not_found(path.as_str()),
        }
    }

    // Bootstrap and inspection

    /// Store a file, creating missing parent directories
    pub fn add_file<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        data: impl Into<FileData>,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        let now = self.now();
        let mut store = self.lock_store();
        let target = self.ancestry(&store, &path)?;
        if let Some(parent) = target.parent() {
            store.create_dir_all(&parent, now)?;
        }
        if store.is_dir(&target) {
            return Err(FsError::already_exists(path.as_str()));
        }
        store.put(&target, data.into().into_node(self.platform(), now), now)?;
        debug!(op = "add_file", path = %target, "file added");
        Ok(())
    }

    pub fn add_empty_file<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<()> {
        self.add_file(path, FileData::empty())
    }

    /// Store a directory and any missing ancestors
    pub fn add_directory<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        let now = self.now();
        let mut store = self.lock_store();
        let target = self.ancestry(&store, &path)?;
        store.create_dir_all(&target, now)?;
        debug!(op = "add_directory", path = %target, "directory added");
        Ok(())
    }

    /// Every stored path in insertion order
    pub fn all_paths(&self) -> Vec<String> {
        self.lock_store()
            .entries()
            .iter()
            .map(|e| e.path.as_str().to_string())
            .collect()
    }

    pub fn all_files(&self) -> Vec<String> {
        self.lock_store()
            .entries()
            .iter()
            .filter(|e| e.node.is_file())
            .map(|e| e.path.as_str().to_string())
            .collect()
    }

    pub fn all_directories(&self) -> Vec<String> {
        self.lock_store()
            .entries()
            .iter()
            .filter(|e| e.node.is_dir())
            .map(|e| e.path.as_str().to_string())
            .collect()
    }

    /// Independent copy of a stored file, following links
    pub fn get_file_data<'p>(&self, path: impl Into<PathArg<'p>>) -> Option<FileData> {
        let path = self.try_normalize(path)?;
        let store = self.lock_store();
        let target = self.final_target(&store, &path).ok()?;
        let entry = store.get(&target).filter(|e| e.node.is_file())?;
        Some(FileData::from_node(
            &entry.node,
            self.platform(),
            entry.path.file_name(),
        ))
    }

    // File operations

    /// False for null, blank or malformed paths, directories and broken links
    pub fn file_exists<'p>(&self, path: impl Into<PathArg<'p>>) -> bool {
        let Some(path) = self.try_normalize(path) else {
            return false;
        };
        let store = self.lock_store();
        self.final_target(&store, &path)
            .ok()
            .and_then(|target| store.get(&target))
            .is_some_and(|e| e.node.is_file())
    }

    pub fn read_all_bytes<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<Vec<u8>> {
        let path = self.normalize(path, "path")?;
        let now = self.now();
        let mut store = self.lock_store();
        let target = self.final_target(&store, &path)?;
        let entry = match store.get_mut(&target) {
            Some(entry) => entry,
            None => return Err(self.missing_file(&store, &path)),
        };
        if entry.node.is_dir() {
            return Err(FsError::access_denied(path.as_str()));
        }
        entry.node.times.last_access = now;
        Ok(entry.node.content().to_vec())
    }

    pub fn read_all_text<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<String> {
        let bytes = self.read_all_bytes(path)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.strip_prefix(UTF8_BOM).unwrap_or(&text).to_string())
    }

    pub fn read_all_lines<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<Vec<String>> {
        Ok(self
            .read_all_text(path)?
            .lines()
            .map(str::to_string)
            .collect())
    }

    pub fn write_all_bytes<'p>(&self, path: impl Into<PathArg<'p>>, bytes: &[u8]) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        self.write_content(&path, bytes, false)
    }

    pub fn write_all_text<'p>(&self, path: impl Into<PathArg<'p>>, text: &str) -> FsResult<()> {
        self.write_all_bytes(path, text.as_bytes())
    }

    /// Each line is terminated with the platform newline
    pub fn write_all_lines<'p, S: AsRef<str>>(
        &self,
        path: impl Into<PathArg<'p>>,
        lines: &[S],
    ) -> FsResult<()> {
        let text = self.join_lines(lines);
        self.write_all_bytes(path, text.as_bytes())
    }

    pub fn append_all_bytes<'p>(&self, path: impl Into<PathArg<'p>>, bytes: &[u8]) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        self.write_content(&path, bytes, true)
    }

    pub fn append_all_text<'p>(&self, path: impl Into<PathArg<'p>>, text: &str) -> FsResult<()> {
        self.append_all_bytes(path, text.as_bytes())
    }

    pub fn append_all_lines<'p, S: AsRef<str>>(
        &self,
        path: impl Into<PathArg<'p>>,
        lines: &[S],
    ) -> FsResult<()> {
        let text = self.join_lines(lines);
        self.append_all_bytes(path, text.as_bytes())
    }

    /// Create an empty file, truncating an existing one
    pub fn create_file<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        self.write_content(&path, &[], false)
    }

    fn join_lines<S: AsRef<str>>(&self, lines: &[S]) -> String {
        let newline = self.platform().newline();
        lines.iter().fold(String::new(), |mut acc, line| {
            acc.push_str(line.as_ref());
            acc.push_str(newline);
            acc
        })
    }

    fn write_content(&self, path: &CanonicalPath, data: &[u8], append: bool) -> FsResult<()> {
        let platform = self.platform();
        let now = self.now();
        let mut store = self.lock_store();
        let target = self.final_target(&store, path)?;
        match store.get_mut(&target) {
            Some(entry) => {
                if entry.node.is_dir() || entry.node.is_read_only(platform) {
                    return Err(FsError::access_denied(path.as_str()));
                }
                if !append
                    && platform.is_windows()
                    && entry.node.is_hidden(platform, entry.path.file_name())
                {
                    return Err(FsError::access_denied(path.as_str()));
                }
                if let Some(content) = entry.node.content_mut() {
                    if !append {
                        content.clear();
                    }
                    content.extend_from_slice(data);
                }
                entry.node.times.last_write = now;
                entry.node.times.last_access = now;
            }
            None => {
                store.put(&target, Node::file(platform, data.to_vec(), now), now)?;
            }
        }
        debug!(
            op = if append { "append" } else { "write" },
            path = %target,
            bytes = data.len(),
            "file written"
        );
        Ok(())
    }

    /// Succeeds silently when the file is already gone but its directory exists
    pub fn delete_file<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        let platform = self.platform();
        let mut store = self.lock_store();
        let Some(target) = self.ancestry_or_missing(&store, &path)? else {
            return Err(FsError::directory_not_found(path.as_str()));
        };
        let found = store
            .get(&target)
            .map(|e| (e.node.is_dir(), e.node.is_read_only(platform)));
        match found {
            None if store.parent_exists(&target) => Ok(()),
            None => Err(FsError::directory_not_found(path.as_str())),
            Some((true, _)) => Err(FsError::access_denied(path.as_str())),
            Some((false, true)) if platform.is_windows() => {
                Err(FsError::access_denied(path.as_str()))
            }
            Some(_) => {
                store.remove(&target);
                debug!(op = "delete_file", path = %target, "file deleted");
                Ok(())
            }
        }
    }

    /// Copy the final target of `source` to `destination`
    pub fn copy_file<'s, 'd>(
        &self,
        source: impl Into<PathArg<'s>>,
        destination: impl Into<PathArg<'d>>,
        overwrite: bool,
    ) -> FsResult<()> {
        let source = self.normalize(source, "sourceFileName")?;
        let destination = self.normalize(destination, "destFileName")?;
        let platform = self.platform();
        let now = self.now();
        let mut store = self.lock_store();

        let src = self.final_target(&store, &source)?;
        let mut node = match store.get(&src) {
            Some(entry) if entry.node.is_file() => entry.node.clone(),
            Some(_) => return Err(FsError::access_denied(source.as_str())),
            None => return Err(self.missing_file(&store, &source)),
        };

        let dst = self.ancestry(&store, &destination)?;
        if dst == src {
            return Err(if overwrite {
                FsError::io(
                    IoErrorKind::SharingViolation,
                    Some(destination.as_str()),
                    format!(
                        "The process cannot access the file '{destination}' because it is being used by another process."
                    ),
                )
            } else {
                FsError::already_exists(destination.as_str())
            });
        }

        let existing = store
            .get(&dst)
            .map(|e| (e.node.is_dir(), e.node.is_read_only(platform)));
        match existing {
            Some((true, _)) => return Err(FsError::access_denied(destination.as_str())),
            Some(_) if !overwrite => return Err(FsError::already_exists(destination.as_str())),
            Some((false, true)) => return Err(FsError::access_denied(destination.as_str())),
            _ => {}
        }

        node.link_target = None;
        node.times.creation = now;
        node.times.last_access = now;
        store.put(&dst, node, now)?;
        debug!(op = "copy_file", from = %src, to = %dst, "file copied");
        Ok(())
    }

    /// Move a file (or file link) to `destination`
    pub fn move_file<'s, 'd>(
        &self,
        source: impl Into<PathArg<'s>>,
        destination: impl Into<PathArg<'d>>,
        overwrite: bool,
    ) -> FsResult<()> {
        let source = self.normalize(source, "sourceFileName")?;
        let destination = self.normalize(destination, "destFileName")?;
        let platform = self.platform();
        let now = self.now();
        let mut store = self.lock_store();

        let src = self.existing_ancestry(&store, &source)?;
        let (node, stored) = match store.get(&src) {
            Some(entry) if entry.node.is_file() => (entry.node.clone(), entry.path.clone()),
            _ => return Err(self.missing_file(&store, &source)),
        };

        let dst = self.ancestry(&store, &destination)?;
        if dst == src {
            if platform.is_windows() && stored.file_name() != dst.file_name() {
                if let Some(name) = dst.file_name() {
                    store.respell(&src, stored.with_file_name(name));
                    debug!(op = "move_file", from = %stored, to = %dst, "file renamed");
                }
            }
            return Ok(());
        }

        let existing = store
            .get(&dst)
            .map(|e| (e.node.is_dir(), e.node.is_read_only(platform)));
        match existing {
            Some((true, _)) => return Err(FsError::already_exists(destination.as_str())),
            Some(_) if !overwrite => return Err(FsError::already_exists(destination.as_str())),
            Some((false, true)) if platform.is_windows() => {
                return Err(FsError::access_denied(destination.as_str()))
            }
            _ => {}
        }
        if !store.parent_exists(&dst) {
            return Err(FsError::directory_not_found(destination.as_str()));
        }

        store.remove(&dst);
        store.remove(&src);
        store.put(&dst, node, now)?;
        debug!(op = "move_file", from = %src, to = %dst, "file moved");
        Ok(())
    }

    /// Metadata of the final target of `path`
    pub fn metadata<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<Metadata> {
        self.metadata_of(path, true)
    }

    /// Metadata of `path` itself, without following a link
    pub fn symlink_metadata<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<Metadata> {
        self.metadata_of(path, false)
    }

    fn metadata_of<'p>(&self, path: impl Into<PathArg<'p>>, follow: bool) -> FsResult<Metadata> {
        let path = self.normalize(path, "path")?;
        let store = self.lock_store();
        let target = if follow {
            self.final_target(&store, &path)?
        } else {
            self.ancestry(&store, &path)?
        };
        match store.get(&target) {
            Some(entry) => Ok(entry
                .node
                .metadata(self.platform(), entry.path.file_name())),
            None => Err(self.missing_file(&store, &path)),
        }
    }

    /// Create a uniquely named empty file in the temp directory
    pub fn get_temp_file_name(&self) -> FsResult<String> {
        let platform = self.platform();
        let now = self.now();
        let mut store = self.lock_store();
        let dir = store.create_dir_all(&self.temp_directory, now)?;
        for _ in 0..=0xFFFF {
            let n = self.temp_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1) & 0xFFFF;
            let candidate = dir.join(&format!("tmp{n:04X}.tmp"));
            if !store.exists(&candidate) {
                store.put(&candidate, Node::file(platform, Vec::new(), now), now)?;
                debug!(op = "get_temp_file_name", path = %candidate, "temp file created");
                return Ok(candidate.as_str().to_string());
            }
        }
        Err(FsError::io(
            IoErrorKind::AlreadyExists,
            Some(dir.as_str()),
            "The file exists.",
        ))
    }

    /// Version resource of a file, or an empty one naming the file
    pub fn get_version_info<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<FileVersionInfo> {
        let path = self.normalize(path, "fileName")?;
        let store = self.lock_store();
        let target = self.final_target(&store, &path)?;
        match store.get(&target) {
            Some(entry) if entry.node.is_file() => Ok(match &entry.node.version_info {
                Some(info) => info.clone().for_file(entry.path.as_str()),
                None => FileVersionInfo::empty(entry.path.as_str()),
            }),
            _ => Err(FsError::file_not_found(path.as_str())),
        }
    }

    // Cancellable variants

    pub fn read_all_bytes_with_cancel<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        cancel: &CancellationToken,
    ) -> FsResult<Vec<u8>> {
        cancel.check()?;
        self.read_all_bytes(path)
    }

    pub fn read_all_text_with_cancel<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        cancel: &CancellationToken,
    ) -> FsResult<String> {
        cancel.check()?;
        self.read_all_text(path)
    }

    pub fn write_all_bytes_with_cancel<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> FsResult<()> {
        cancel.check()?;
        self.write_all_bytes(path, bytes)
    }

    pub fn write_all_text_with_cancel<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        text: &str,
        cancel: &CancellationToken,
    ) -> FsResult<()> {
        cancel.check()?;
        self.write_all_text(path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{unix_fs, windows_fs};
    use crate::types::FileAttributes;

    #[test]
    fn construction_creates_current_and_temp_directories() {
        let fs = windows_fs();
        assert!(fs.directory_exists("C:\\"));
        assert!(fs.directory_exists("C:\\temp"));
        let fs = MockFileSystem::new(FsConfig::unix().with_current_directory("/home/user"))
            .expect("build");
        assert!(fs.directory_exists("/home/user"));
        assert!(fs.directory_exists("/tmp"));
    }

    #[test]
    fn rejects_relative_current_directory() {
        let err = MockFileSystem::new(FsConfig::windows().with_current_directory("relative"))
            .unwrap_err();
        assert_eq!(err.param(), Some("currentDirectory"));
    }

    #[test]
    fn reads_return_independent_copies() {
        let fs = windows_fs();
        fs.write_all_bytes("C:\\data.bin", &[1, 2, 3]).expect("write");
        let mut first = fs.read_all_bytes("C:\\data.bin").expect("read");
        first[0] = 99;
        assert_eq!(fs.read_all_bytes("C:\\data.bin").expect("read"), vec![1, 2, 3]);
    }

    #[test]
    fn text_helpers_strip_bom_and_split_lines() {
        let fs = unix_fs();
        fs.write_all_bytes("/bom.txt", "\u{feff}hello".as_bytes()).expect("write");
        assert_eq!(fs.read_all_text("/bom.txt").expect("read"), "hello");

        fs.write_all_lines("/lines.txt", &["a", "b"]).expect("write");
        fs.append_all_lines("/lines.txt", &["c"]).expect("append");
        assert_eq!(fs.read_all_text("/lines.txt").expect("read"), "a\nb\nc\n");
        assert_eq!(fs.read_all_lines("/lines.txt").expect("read"), ["a", "b", "c"]);
    }

    #[test]
    fn windows_lines_use_crlf() {
        let fs = windows_fs();
        fs.write_all_lines("C:\\l.txt", &["x", "y"]).expect("write");
        assert_eq!(fs.read_all_text("C:\\l.txt").expect("read"), "x\r\ny\r\n");
        assert_eq!(fs.read_all_lines("C:\\l.txt").expect("read"), ["x", "y"]);
    }

    #[test]
    fn directory_paths_deny_file_io() {
        let fs = windows_fs();
        fs.create_directory("C:\\dir").expect("mkdir");
        assert!(matches!(fs.read_all_bytes("C:\\dir"), Err(FsError::AccessDenied { .. })));
        assert!(matches!(fs.write_all_text("C:\\dir", "x"), Err(FsError::AccessDenied { .. })));
        assert!(matches!(fs.delete_file("C:\\dir"), Err(FsError::AccessDenied { .. })));
    }

    #[test]
    fn hidden_files_can_be_appended_but_not_truncated_on_windows() {
        let fs = windows_fs();
        fs.add_file("C:\\h.txt", FileData::from_text("a").with_attributes(FileAttributes::HIDDEN))
            .expect("add");
        assert!(matches!(fs.write_all_text("C:\\h.txt", "b"), Err(FsError::AccessDenied { .. })));
        fs.append_all_text("C:\\h.txt", "b").expect("append");
        assert_eq!(fs.read_all_text("C:\\h.txt").expect("read"), "ab");
    }

    #[test]
    fn read_only_files_reject_writes() {
        let fs = unix_fs();
        fs.add_file("/ro.txt", FileData::from_text("x").with_attributes(FileAttributes::READ_ONLY))
            .expect("add");
        assert!(matches!(fs.write_all_text("/ro.txt", "y"), Err(FsError::AccessDenied { .. })));
        assert!(matches!(fs.append_all_text("/ro.txt", "y"), Err(FsError::AccessDenied { .. })));
        // unix allows unlinking a read-only file
        fs.delete_file("/ro.txt").expect("delete");
    }

    #[test]
    fn copy_onto_itself() {
        let fs = windows_fs();
        fs.write_all_text("C:\\a.txt", "x").expect("write");
        let err = fs.copy_file("C:\\a.txt", "c:\\A.TXT", true).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::SharingViolation));
        let err = fs.copy_file("C:\\a.txt", "C:\\a.txt", false).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::AlreadyExists));
    }

    #[test]
    fn move_respects_overwrite_flag() {
        let fs = unix_fs();
        fs.write_all_text("/a", "a").expect("write");
        fs.write_all_text("/b", "b").expect("write");
        let err = fs.move_file("/a", "/b", false).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::AlreadyExists));
        fs.move_file("/a", "/b", true).expect("move");
        assert!(!fs.file_exists("/a"));
        assert_eq!(fs.read_all_text("/b").expect("read"), "a");
        assert!(matches!(
            fs.move_file("/a", "/c", false),
            Err(FsError::FileNotFound { .. })
        ));
    }

    #[test]
    fn temp_file_names_are_unique() {
        let fs = windows_fs();
        let a = fs.get_temp_file_name().expect("temp");
        let b = fs.get_temp_file_name().expect("temp");
        assert_ne!(a, b);
        assert!(a.starts_with("C:\\temp\\tmp") && a.ends_with(".tmp"));
        assert!(fs.file_exists(&a));
    }

    #[test]
    fn cancelled_token_short_circuits() {
        let fs = unix_fs();
        let token = CancellationToken::new();
        fs.write_all_text_with_cancel("/f", "x", &token).expect("write");
        token.cancel();
        assert_eq!(fs.read_all_text_with_cancel("/f", &token), Err(FsError::Cancelled));
        assert_eq!(
            fs.write_all_bytes_with_cancel("/g", b"y", &token),
            Err(FsError::Cancelled)
        );
        assert!(!fs.file_exists("/g"));
    }

    #[test]
    fn bootstrap_lists_in_insertion_order() {
        let fs = unix_fs();
        fs.add_file("/srv/b.txt", "b").expect("add");
        fs.add_file("/srv/a.txt", "a").expect("add");
        fs.add_directory("/srv/empty").expect("add");
        let files: Vec<String> = fs
            .all_files()
            .into_iter()
            .filter(|p| p.starts_with("/srv"))
            .collect();
        assert_eq!(files, ["/srv/b.txt", "/srv/a.txt"]);
        assert!(fs.all_directories().contains(&"/srv/empty".to_string()));
        assert_eq!(fs.get_file_data("/srv/a.txt").expect("data").text(), "a");
        assert!(fs.get_file_data("/srv/empty").is_none());
    }
}
