// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Flat path-keyed node store
//!
//! Directory membership is never stored; children are every entry whose
//! parent key equals the directory key. Entries remember their insertion
//! sequence so enumeration order is stable.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{FsError, FsResult};
use crate::node::Node;
use crate::path::CanonicalPath;
use crate::platform::Platform;

#[derive(Clone, Debug)]
pub(crate) struct StoreEntry {
    pub path: CanonicalPath,
    pub node: Node,
    seq: u64,
}

#[derive(Debug)]
pub(crate) struct VirtualStore {
    platform: Platform,
    auto_create_roots: bool,
    entries: HashMap<String, StoreEntry>,
    next_seq: u64,
}

impl VirtualStore {
    pub fn new(platform: Platform, auto_create_roots: bool) -> Self {
        Self {
            platform,
            auto_create_roots,
            entries: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn get(&self, path: &CanonicalPath) -> Option<&StoreEntry> {
        self.entries.get(path.key())
    }

    pub fn get_mut(&mut self, path: &CanonicalPath) -> Option<&mut StoreEntry> {
        self.entries.get_mut(path.key())
    }

    pub fn exists(&self, path: &CanonicalPath) -> bool {
        self.entries.contains_key(path.key())
    }

    pub fn is_dir(&self, path: &CanonicalPath) -> bool {
        self.get(path).is_some_and(|e| e.node.is_dir())
    }

    /// Whether the parent of `path` exists as a directory (roots always do)
    pub fn parent_exists(&self, path: &CanonicalPath) -> bool {
        match path.parent() {
            Some(parent) => self.is_dir(&parent),
            None => true,
        }
    }

    fn insert(&mut self, path: CanonicalPath, node: Node) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries
            .insert(path.key().to_string(), StoreEntry { path, node, seq });
    }

    /// Insert or replace a node under an existing parent directory
    ///
    /// Replacing keeps the stored spelling and enumeration position. A file
    /// cannot replace a directory or the other way around.
    pub fn put(&mut self, path: &CanonicalPath, node: Node, now: DateTime<Utc>) -> FsResult<()> {
        if let Some(existing) = self.entries.get_mut(path.key()) {
            if existing.node.is_dir() != node.is_dir() {
                return Err(FsError::already_exists(path.as_str()));
            }
            existing.node = node;
            return Ok(());
        }

        let display = match path.parent() {
            None => path.clone(),
            Some(parent) => {
                let stored_parent = match self.get(&parent) {
                    Some(entry) if entry.node.is_dir() => entry.path.clone(),
                    Some(_) => return Err(FsError::directory_not_found(path.as_str())),
                    None if parent.is_root() && self.auto_create_roots => {
                        self.insert(parent.clone(), Node::directory(self.platform, now));
                        parent
                    }
                    None => return Err(FsError::directory_not_found(path.as_str())),
                };
                match path.file_name() {
                    Some(name) => stored_parent.join(name),
                    None => path.clone(),
                }
            }
        };
        self.insert(display, node);
        Ok(())
    }

    /// Insert an entry verbatim; the caller guarantees the parent exists
    pub fn relocate(&mut self, path: CanonicalPath, node: Node) {
        self.insert(path, node);
    }

    /// Store the root of `path` as a directory regardless of
    /// `auto_create_roots`
    pub fn ensure_root(&mut self, path: &CanonicalPath, now: DateTime<Utc>) {
        let root = path.root();
        if !self.exists(&root) {
            self.insert(root, Node::directory(self.platform, now));
        }
    }

    /// Create `path` and every missing ancestor as directories
    ///
    /// Returns the stored spelling of `path`. A file anywhere on the way is
    /// reported as already existing. A missing root is only created when
    /// `auto_create_roots` is set.
    pub fn create_dir_all(
        &mut self,
        path: &CanonicalPath,
        now: DateTime<Utc>,
    ) -> FsResult<CanonicalPath> {
        let mut current = path.root();
        if !self.exists(&current) {
            if !self.auto_create_roots {
                return Err(FsError::directory_not_found(path.as_str()));
            }
            self.insert(current.clone(), Node::directory(self.platform, now));
        }
        for name in path.segments() {
            current = current.join(name);
            match self.get(&current) {
                Some(entry) if entry.node.is_dir() => current = entry.path.clone(),
                Some(_) => return Err(FsError::already_exists(current.as_str())),
                None => {
                    self.put(&current, Node::directory(self.platform, now), now)?;
                }
            }
        }
        Ok(self
            .get(path)
            .map(|e| e.path.clone())
            .unwrap_or_else(|| path.clone()))
    }

    pub fn remove(&mut self, path: &CanonicalPath) -> Option<StoreEntry> {
        self.entries.remove(path.key())
    }

    /// Remove `path` and everything below it, returned in insertion order
    pub fn remove_tree(&mut self, path: &CanonicalPath) -> Vec<StoreEntry> {
        let keys: Vec<String> = self
            .entries
            .values()
            .filter(|e| e.path == *path || path.is_ancestor_of(&e.path))
            .map(|e| e.path.key().to_string())
            .collect();
        let mut removed: Vec<StoreEntry> = keys
            .iter()
            .filter_map(|k| self.entries.remove(k))
            .collect();
        removed.sort_by_key(|e| e.seq);
        removed
    }

    /// Change the stored spelling of an entry without moving it
    pub fn respell(&mut self, path: &CanonicalPath, spelling: CanonicalPath) {
        if let Some(entry) = self.entries.get_mut(path.key()) {
            entry.path = spelling;
        }
    }

    pub fn children_of(&self, dir: &CanonicalPath) -> Vec<&StoreEntry> {
        let mut children: Vec<&StoreEntry> = self
            .entries
            .values()
            .filter(|e| e.path.parent().as_ref() == Some(dir))
            .collect();
        children.sort_by_key(|e| e.seq);
        children
    }

    pub fn descendants_of(&self, dir: &CanonicalPath) -> Vec<&StoreEntry> {
        let mut found: Vec<&StoreEntry> = self
            .entries
            .values()
            .filter(|e| dir.is_ancestor_of(&e.path))
            .collect();
        found.sort_by_key(|e| e.seq);
        found
    }

    pub fn has_children(&self, dir: &CanonicalPath) -> bool {
        self.entries.values().any(|e| dir.is_ancestor_of(&e.path))
    }

    /// All entries in insertion order
    pub fn entries(&self) -> Vec<&StoreEntry> {
        let mut all: Vec<&StoreEntry> = self.entries.values().collect();
        all.sort_by_key(|e| e.seq);
        all
    }
}
