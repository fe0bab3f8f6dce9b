// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Symbolic link resolution
//!
//! Links are ordinary nodes carrying a target path string. Resolution walks
//! the chain iteratively with a visited set plus the platform hop cap.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::error::{FsError, FsResult, IoErrorKind};
use crate::node::Node;
use crate::path::{CanonicalPath, PathArg, PathNormalizer};
use crate::store::VirtualStore;
use crate::vfs::MockFileSystem;

pub(crate) struct Resolver<'a> {
    store: &'a VirtualStore,
    normalizer: &'a PathNormalizer,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a VirtualStore, normalizer: &'a PathNormalizer) -> Self {
        Self { store, normalizer }
    }

    fn max_hops(&self) -> usize {
        self.normalizer.platform().max_link_hops()
    }

    fn too_many_links(path: &CanonicalPath) -> FsError {
        FsError::io(
            IoErrorKind::LinkCycle,
            Some(path.as_str()),
            format!("Too many levels of symbolic links: '{path}'."),
        )
    }

    /// Absolute form of a link's target; relative targets hang off the
    /// link's own directory
    pub fn target_path(&self, link: &CanonicalPath, target: &str) -> FsResult<CanonicalPath> {
        let platform = self.normalizer.platform();
        if platform.is_rooted(target) {
            return self.normalizer.normalize(target.into(), "pathToTarget");
        }
        let base = link.parent().unwrap_or_else(|| link.root());
        let mut joined = base.as_str().to_string();
        if !joined.ends_with(platform.separator()) {
            joined.push(platform.separator());
        }
        joined.push_str(target);
        self.normalizer.normalize(joined.as_str().into(), "pathToTarget")
    }

    /// Rewrite `path` so no directory above its last name is a link
    pub fn resolve_ancestry(&self, path: &CanonicalPath) -> FsResult<CanonicalPath> {
        self.ancestry_at_depth(path, 0)
    }

    fn ancestry_at_depth(&self, path: &CanonicalPath, depth: usize) -> FsResult<CanonicalPath> {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(path.clone());
        };
        let mut current = path.root();
        for name in parents {
            current = current.join(name);
            if let Some(entry) = self.store.get(&current) {
                if entry.node.is_dir() && entry.node.is_link() {
                    current = self.final_at_depth(&current, depth + 1)?;
                } else {
                    current = entry.path.clone();
                }
            }
        }
        Ok(current.join(last))
    }

    /// Follow links until a non-link node is reached
    ///
    /// A path that is not a link resolves to itself, whether or not it
    /// exists. A chain ending at a missing node is an error.
    pub fn resolve_final(&self, path: &CanonicalPath) -> FsResult<CanonicalPath> {
        self.final_at_depth(path, 0)
    }

    fn final_at_depth(&self, path: &CanonicalPath, depth: usize) -> FsResult<CanonicalPath> {
        if depth > self.max_hops() {
            return Err(Self::too_many_links(path));
        }
        let mut current = self.ancestry_at_depth(path, depth)?;
        let mut visited = HashSet::new();
        visited.insert(current.clone());
        let mut hops = 0usize;
        loop {
            let Some(entry) = self.store.get(&current) else {
                if hops == 0 {
                    return Ok(current);
                }
                return Err(FsError::io(
                    IoErrorKind::UnresolvedLink,
                    Some(path.as_str()),
                    format!("The link target of '{path}' could not be resolved: '{current}' does not exist."),
                ));
            };
            let Some(target) = entry.node.link_target.as_deref() else {
                return Ok(entry.path.clone());
            };
            hops += 1;
            if hops > self.max_hops() {
                return Err(Self::too_many_links(path));
            }
            let next = self.target_path(&entry.path, target)?;
            let next = self.ancestry_at_depth(&next, depth + hops)?;
            trace!(from = %entry.path, to = %next, hop = hops, "following symbolic link");
            if !visited.insert(next.clone()) {
                return Err(Self::too_many_links(path));
            }
            current = next;
        }
    }

    /// Target of the link at `path`, immediate or final
    pub fn resolve_link_target(
        &self,
        path: &CanonicalPath,
        return_final_target: bool,
    ) -> FsResult<CanonicalPath> {
        let link = self.resolve_ancestry(path)?;
        let entry = self
            .store
            .get(&link)
            .ok_or_else(|| FsError::file_not_found(path.as_str()))?;
        let target = entry
            .node
            .link_target
            .as_deref()
            .ok_or_else(|| FsError::not_a_reparse_point(path.as_str()))?;
        if return_final_target {
            self.resolve_final(&link)
        } else {
            self.target_path(&entry.path, target)
        }
    }
}

impl MockFileSystem {
    fn create_link<'p, 't>(
        &self,
        path: impl Into<PathArg<'p>>,
        path_to_target: impl Into<PathArg<'t>>,
        directory: bool,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        let target = self
            .normalizer()
            .validate(path_to_target.into(), "pathToTarget")?;
        let now = self.now();
        let mut store = self.lock_store();
        let link = self.ancestry(&store, &path)?;
        if store.exists(&link) {
            return Err(FsError::already_exists(path.as_str()));
        }
        let node = Node::symlink(self.platform(), target, directory, now);
        store.put(&link, node, now)?;
        debug!(op = "create_symbolic_link", path = %link, link_target = target, "link created");
        Ok(())
    }

    /// Create a file symbolic link at `path` pointing to `path_to_target`
    pub fn create_symbolic_link<'p, 't>(
        &self,
        path: impl Into<PathArg<'p>>,
        path_to_target: impl Into<PathArg<'t>>,
    ) -> FsResult<()> {
        self.create_link(path, path_to_target, false)
    }

    pub fn create_directory_symbolic_link<'p, 't>(
        &self,
        path: impl Into<PathArg<'p>>,
        path_to_target: impl Into<PathArg<'t>>,
    ) -> FsResult<()> {
        self.create_link(path, path_to_target, true)
    }

    /// Resolve the link at `path`
    ///
    /// With `return_final_target` the whole chain is followed; otherwise the
    /// immediate target is returned. Fails when `path` is not a link.
    pub fn resolve_link_target<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        return_final_target: bool,
    ) -> FsResult<String> {
        let path = self.normalize(path, "path")?;
        let store = self.lock_store();
        let target = Resolver::new(&store, self.normalizer())
            .resolve_link_target(&path, return_final_target)?;
        Ok(store
            .get(&target)
            .map(|e| e.path.as_str().to_string())
            .unwrap_or_else(|| target.as_str().to_string()))
    }

    /// The raw target string stored on a link, `None` for non-links
    pub fn link_target<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<Option<String>> {
        let path = self.normalize(path, "path")?;
        let store = self.lock_store();
        let link = self.existing_ancestry(&store, &path)?;
        match store.get(&link) {
            Some(entry) => Ok(entry.node.link_target.clone()),
            None => Err(self.missing_file(&store, &path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use chrono::{TimeZone, Utc};

    struct Fixture {
        normalizer: PathNormalizer,
        store: VirtualStore,
    }

    impl Fixture {
        fn new(platform: Platform, cwd: &str) -> Self {
            Self {
                normalizer: PathNormalizer::new(platform, cwd).unwrap(),
                store: VirtualStore::new(platform, true),
            }
        }

        fn p(&self, s: &str) -> CanonicalPath {
            self.normalizer.normalize(s.into(), "path").unwrap()
        }

        fn dir(&mut self, s: &str) {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let path = self.p(s);
            self.store.create_dir_all(&path, now).unwrap();
        }

        fn link(&mut self, s: &str, target: &str, directory: bool) {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let path = self.p(s);
            let node = Node::symlink(self.normalizer.platform(), target, directory, now);
            self.store.put(&path, node, now).unwrap();
        }

        fn resolver(&self) -> Resolver<'_> {
            Resolver::new(&self.store, &self.normalizer)
        }
    }

    #[test]
    fn chain_resolution_immediate_and_final() {
        let mut fx = Fixture::new(Platform::Windows, "C:\\");
        fx.dir("C:\\bar");
        fx.link("C:\\foo", "C:\\bar", true);
        fx.link("C:\\foo1", "C:\\foo", true);

        let r = fx.resolver();
        let immediate = r.resolve_link_target(&fx.p("C:\\foo1"), false).unwrap();
        assert_eq!(immediate.as_str(), "C:\\foo");
        let last = r.resolve_link_target(&fx.p("C:\\foo1"), true).unwrap();
        assert_eq!(last.as_str(), "C:\\bar");

        let err = r.resolve_link_target(&fx.p("C:\\bar"), false).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::NotAReparsePoint));
    }

    #[test]
    fn relative_targets_hang_off_the_link_directory() {
        let mut fx = Fixture::new(Platform::Unix, "/");
        fx.dir("/data/real");
        fx.link("/data/alias", "real", true);
        let resolved = fx.resolver().resolve_final(&fx.p("/data/alias")).unwrap();
        assert_eq!(resolved.as_str(), "/data/real");
    }

    #[test]
    fn cycles_are_reported() {
        let mut fx = Fixture::new(Platform::Unix, "/");
        fx.link("/a", "/b", false);
        fx.link("/b", "/a", false);
        let err = fx.resolver().resolve_final(&fx.p("/a")).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::LinkCycle));
    }

    #[test]
    fn broken_chain_is_unresolved() {
        let mut fx = Fixture::new(Platform::Unix, "/");
        fx.link("/dangling", "/nowhere", false);
        let err = fx.resolver().resolve_final(&fx.p("/dangling")).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::UnresolvedLink));
        // a plain missing path is not an error
        let missing = fx.resolver().resolve_final(&fx.p("/plain")).unwrap();
        assert_eq!(missing.as_str(), "/plain");
    }

    #[test]
    fn intermediate_directory_links_are_followed() {
        let mut fx = Fixture::new(Platform::Windows, "C:\\");
        fx.dir("C:\\target\\inner");
        fx.link("C:\\shortcut", "C:\\target", true);
        let resolved = fx
            .resolver()
            .resolve_ancestry(&fx.p("C:\\shortcut\\inner\\file.txt"))
            .unwrap();
        assert_eq!(resolved.as_str(), "C:\\target\\inner\\file.txt");
    }

    #[test]
    fn long_chains_hit_the_hop_cap() {
        let mut fx = Fixture::new(Platform::Unix, "/");
        fx.dir("/end");
        let cap = Platform::Unix.max_link_hops();
        for i in 0..=cap {
            let target = if i == cap { "/end".to_string() } else { format!("/l{}", i + 1) };
            fx.link(&format!("/l{i}"), &target, true);
        }
        let err = fx.resolver().resolve_final(&fx.p("/l0")).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::LinkCycle));
        assert!(fx.resolver().resolve_final(&fx.p("/l1")).is_ok());
    }
}
