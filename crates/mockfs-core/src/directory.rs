// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Directory operations

use std::collections::HashSet;

use tracing::debug;

use crate::acl::SecurityDescriptor;
use crate::error::{FsError, FsResult, IoErrorKind};
use crate::node::Node;
use crate::path::{CanonicalPath, PathArg};
use crate::pattern::SearchPattern;
use crate::store::StoreEntry;
use crate::types::{DirEntry, EntryKind, SearchOption, UnixFileMode};
use crate::vfs::MockFileSystem;

impl MockFileSystem {
    /// False for null, blank or malformed paths, files and broken links
    pub fn directory_exists<'p>(&self, path: impl Into<PathArg<'p>>) -> bool {
        let Some(path) = self.try_normalize(path) else {
            return false;
        };
        let store = self.lock_store();
        self.final_target(&store, &path)
            .ok()
            .is_some_and(|target| store.is_dir(&target))
    }

    /// Create `path` and any missing ancestors; existing directories are fine
    pub fn create_directory<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        self.create_directory_with(&path, |_| {})
    }

    /// Unix only: create a directory whose new leaf carries `mode`
    pub fn create_directory_with_mode<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        mode: UnixFileMode,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        self.require_unix_mode()?;
        self.create_directory_with(&path, |node| node.unix_mode = Some(mode))
    }

    /// Windows only: create a directory whose new leaf carries `descriptor`
    pub fn create_directory_with_access_control<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        descriptor: &SecurityDescriptor,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        if !self.platform().supports_access_control() {
            return Err(FsError::Unsupported(
                "Access control is not supported on this platform.".to_string(),
            ));
        }
        self.create_directory_with(&path, |node| {
            node.access_control = Some(descriptor.clone())
        })
    }

    fn create_directory_with(
        &self,
        path: &CanonicalPath,
        customize: impl FnOnce(&mut Node),
    ) -> FsResult<()> {
        let now = self.now();
        let mut store = self.lock_store();
        let target = self.ancestry(&store, path)?;
        if store.is_dir(&target) {
            return Ok(());
        }
        if store.exists(&target) {
            return Err(FsError::already_exists(path.as_str()));
        }
        let stored = store.create_dir_all(&target, now)?;
        if let Some(entry) = store.get_mut(&stored) {
            customize(&mut entry.node);
        }
        debug!(op = "create_directory", path = %stored, "directory created");
        Ok(())
    }

    /// Remove a directory
    ///
    /// A directory link is removed without touching its target. Recursive
    /// removal on Windows stops at the first read-only file.
    pub fn delete_directory<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        recursive: bool,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        let platform = self.platform();
        let mut store = self.lock_store();
        let target = self.existing_ancestry(&store, &path)?;

        let (is_dir, is_link) = match store.get(&target) {
            Some(entry) => (entry.node.is_dir(), entry.node.is_link()),
            None => return Err(FsError::directory_not_found(path.as_str())),
        };
        if !is_dir {
            return Err(FsError::io(
                IoErrorKind::InvalidDirectoryName,
                Some(path.as_str()),
                format!("The directory name is invalid. : '{path}'"),
            ));
        }
        if target.is_root() {
            return Err(FsError::access_denied(path.as_str()));
        }
        if is_link {
            store.remove(&target);
            debug!(op = "delete_directory", path = %target, "directory link removed");
            return Ok(());
        }

        if !recursive && store.has_children(&target) {
            return Err(FsError::io(
                IoErrorKind::DirectoryNotEmpty,
                Some(path.as_str()),
                format!("The directory is not empty. : '{path}'"),
            ));
        }
        if platform.is_windows() {
            let locked = store
                .descendants_of(&target)
                .into_iter()
                .find(|e| e.node.is_file() && e.node.is_read_only(platform))
                .map(|e| e.path.as_str().to_string());
            if let Some(locked) = locked {
                return Err(FsError::access_denied(&locked));
            }
        }

        let removed = store.remove_tree(&target);
        debug!(op = "delete_directory", path = %target, entries = removed.len(), "directory deleted");
        Ok(())
    }

    /// Move a directory and everything below it
    pub fn move_directory<'s, 'd>(
        &self,
        source: impl Into<PathArg<'s>>,
        destination: impl Into<PathArg<'d>>,
    ) -> FsResult<()> {
        let source = self.normalize(source, "sourceDirName")?;
        let destination = self.normalize(destination, "destDirName")?;
        let platform = self.platform();
        let mut store = self.lock_store();

        let src = self.existing_ancestry(&store, &source)?;
        let dst = self.ancestry(&store, &destination)?;
        let stored = match store.get(&src) {
            Some(entry) => entry.path.clone(),
            None => return Err(FsError::directory_not_found(source.as_str())),
        };

        let spelled = if src == dst {
            let renamed = stored.file_name() != dst.file_name();
            match dst.file_name() {
                Some(name) if platform.is_windows() && renamed => stored.with_file_name(name),
                _ => {
                    return Err(FsError::io(
                        IoErrorKind::SamePath,
                        Some(source.as_str()),
                        "Source and destination path must be different.",
                    ))
                }
            }
        } else {
            if src.root() != dst.root() {
                return Err(FsError::io(
                    IoErrorKind::CrossVolume,
                    Some(destination.as_str()),
                    "Source and destination path must have identical roots. Move will not work across volumes.",
                ));
            }
            if src.is_root() {
                return Err(FsError::access_denied(source.as_str()));
            }
            if src.is_ancestor_of(&dst) {
                return Err(FsError::io(
                    IoErrorKind::Other,
                    Some(destination.as_str()),
                    format!("Cannot move '{source}' to a subdirectory of itself, '{destination}'."),
                ));
            }
            if store.exists(&dst) {
                return Err(FsError::io(
                    IoErrorKind::AlreadyExists,
                    Some(destination.as_str()),
                    format!(
                        "Cannot create '{destination}' because a file or directory with the same name already exists."
                    ),
                ));
            }
            let parent = dst.parent().and_then(|p| store.get(&p).filter(|e| e.node.is_dir()));
            match (parent, dst.file_name()) {
                (Some(parent), Some(name)) => parent.path.join(name),
                _ => return Err(FsError::directory_not_found(destination.as_str())),
            }
        };

        let moved = store.remove_tree(&src);
        let count = moved.len();
        for entry in moved {
            let path = entry.path.rebase(&src, &spelled);
            store.relocate(path, entry.node);
        }
        debug!(op = "move_directory", from = %stored, to = %spelled, entries = count, "directory moved");
        Ok(())
    }

    pub fn get_files<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        search_pattern: &str,
        option: SearchOption,
    ) -> FsResult<Vec<String>> {
        self.enumerate(path.into(), search_pattern, option, Some(EntryKind::File))
    }

    pub fn get_directories<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        search_pattern: &str,
        option: SearchOption,
    ) -> FsResult<Vec<String>> {
        self.enumerate(path.into(), search_pattern, option, Some(EntryKind::Directory))
    }

    pub fn get_file_system_entries<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        search_pattern: &str,
        option: SearchOption,
    ) -> FsResult<Vec<String>> {
        self.enumerate(path.into(), search_pattern, option, None)
    }

    /// Snapshot of matching entries, spelled under the caller's `path`
    fn enumerate(
        &self,
        path: PathArg<'_>,
        search_pattern: &str,
        option: SearchOption,
        kind: Option<EntryKind>,
    ) -> FsResult<Vec<String>> {
        let raw = self.normalizer().validate(path, "path")?;
        let dir = self.normalize(raw, "path")?;
        let pattern = SearchPattern::new(search_pattern, self.platform())?;
        let store = self.lock_store();
        let base = self.require_directory(&store, &dir)?;

        let candidates = match option {
            SearchOption::TopDirectoryOnly => store.children_of(&base),
            SearchOption::AllDirectories => store.descendants_of(&base),
        };
        let prefix = self.caller_prefix(raw);
        let depth = base.segments().len();
        Ok(candidates
            .into_iter()
            .filter(|e| kind.map_or(true, |k| e.node.entry_kind() == k))
            .filter(|e| pattern.matches(e.path.file_name().unwrap_or_default()))
            .map(|e| self.spell_under(&prefix, &e.path.segments()[depth..]))
            .collect())
    }

    /// Top-level entries with their metadata
    pub fn read_dir<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<Vec<DirEntry>> {
        let dir = self.normalize(path, "path")?;
        let store = self.lock_store();
        let base = self.require_directory(&store, &dir)?;
        Ok(store
            .children_of(&base)
            .into_iter()
            .map(|e| self.dir_entry(e))
            .collect())
    }

    fn dir_entry(&self, entry: &StoreEntry) -> DirEntry {
        let name = entry.path.file_name().unwrap_or_default();
        DirEntry {
            name: name.to_string(),
            path: entry.path.as_str().to_string(),
            metadata: entry.node.metadata(self.platform(), Some(name)),
        }
    }

    fn require_directory(
        &self,
        store: &crate::store::VirtualStore,
        dir: &CanonicalPath,
    ) -> FsResult<CanonicalPath> {
        let base = self.final_target(store, dir)?;
        match store.get(&base) {
            Some(entry) if entry.node.is_dir() => Ok(entry.path.clone()),
            Some(_) => Err(FsError::io(
                IoErrorKind::InvalidDirectoryName,
                Some(dir.as_str()),
                format!("The directory name is invalid. : '{dir}'"),
            )),
            None => Err(FsError::directory_not_found(dir.as_str())),
        }
    }

    /// The caller's path with separators canonicalized and trailing ones
    /// dropped (a bare root keeps its separator)
    fn caller_prefix(&self, raw: &str) -> String {
        let platform = self.platform();
        let normalized = platform.normalize_separators(raw.trim_end());
        let root_len = platform.root_of(&normalized).map(|(_, n)| n).unwrap_or(0);
        let trimmed = normalized.trim_end_matches(platform.separator());
        if trimmed.len() < root_len {
            normalized[..root_len].to_string()
        } else {
            trimmed.to_string()
        }
    }

    fn spell_under(&self, prefix: &str, names: &[&str]) -> String {
        let sep = self.platform().separator();
        let mut out = prefix.to_string();
        for name in names {
            if !out.is_empty() && !out.ends_with(sep) {
                out.push(sep);
            }
            out.push_str(name);
        }
        out
    }

    /// Distinct drive roots in first-seen spelling; `/` on Unix
    pub fn get_logical_drives(&self) -> Vec<String> {
        if !self.platform().is_windows() {
            return vec!["/".to_string()];
        }
        let store = self.lock_store();
        let mut seen = HashSet::new();
        store
            .entries()
            .into_iter()
            .filter_map(|e| e.path.drive_letter())
            .filter(|letter| seen.insert(letter.to_ascii_uppercase()))
            .map(|letter| format!("{letter}:\\"))
            .collect()
    }

    pub fn get_directory_root<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<String> {
        Ok(self.normalize(path, "path")?.root_str().to_string())
    }

    /// Parent of `path`, `None` for a root
    pub fn get_parent<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<Option<String>> {
        Ok(self
            .normalize(path, "path")?
            .parent()
            .map(|p| p.as_str().to_string()))
    }

    pub fn get_current_directory(&self) -> String {
        self.normalizer().current_directory().as_str().to_string()
    }
}
