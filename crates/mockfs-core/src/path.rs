// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Path normalization and path-string operations
//!
//! [`PathNormalizer`] turns caller-supplied strings into [`CanonicalPath`]
//! lookup keys under the active platform rules. It never touches the store.

use std::hash::{Hash, Hasher};

use crate::error::{FsError, FsResult};
use crate::platform::{Platform, RootKind};

/// A possibly-absent path argument
///
/// Operations accept anything convertible into `PathArg` so that callers can
/// exercise the null-path contract with `None::<&str>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathArg<'a>(Option<&'a str>);

impl<'a> PathArg<'a> {
    pub fn null() -> Self {
        PathArg(None)
    }

    pub fn as_option(self) -> Option<&'a str> {
        self.0
    }
}

impl<'a> From<&'a str> for PathArg<'a> {
    fn from(value: &'a str) -> Self {
        PathArg(Some(value))
    }
}

impl<'a> From<&'a String> for PathArg<'a> {
    fn from(value: &'a String) -> Self {
        PathArg(Some(value.as_str()))
    }
}

impl<'a> From<Option<&'a str>> for PathArg<'a> {
    fn from(value: Option<&'a str>) -> Self {
        PathArg(value)
    }
}

impl<'a> From<&'a CanonicalPath> for PathArg<'a> {
    fn from(value: &'a CanonicalPath) -> Self {
        PathArg(Some(value.as_str()))
    }
}

/// Normalized absolute path plus its case-folded lookup key
///
/// Equality and hashing use the lookup key, so two spellings that differ only
/// by case are the same path under case-insensitive emulation.
#[derive(Clone, Debug)]
pub struct CanonicalPath {
    platform: Platform,
    display: String,
    key: String,
    root_len: usize,
    trailing_separator: bool,
}

impl CanonicalPath {
    fn build(
        platform: Platform,
        root: &str,
        segments: &[&str],
        trailing_separator: bool,
    ) -> CanonicalPath {
        let sep = platform.separator();
        let mut display = root.to_string();
        let mut key = platform.fold_case(root);
        for segment in segments {
            if !display.ends_with(sep) {
                display.push(sep);
                key.push(sep);
            }
            display.push_str(segment);
            key.push_str(&platform.fold_case(segment));
        }
        CanonicalPath {
            platform,
            display,
            key,
            root_len: root.len(),
            trailing_separator,
        }
    }

    /// Normalized path in its stored casing, without a trailing separator
    /// (drive and posix roots keep theirs)
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Lookup key used by the store
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Full path as `GetFullPath` would render it: a trailing separator on
    /// the input survives as exactly one trailing separator
    pub fn full_path(&self) -> String {
        let sep = self.platform.separator();
        if self.trailing_separator && !self.display.ends_with(sep) {
            format!("{}{}", self.display, sep)
        } else {
            self.display.clone()
        }
    }

    pub fn is_root(&self) -> bool {
        self.display.len() == self.root_len
    }

    pub fn root_str(&self) -> &str {
        &self.display[..self.root_len]
    }

    pub fn root(&self) -> CanonicalPath {
        CanonicalPath::build(self.platform, self.root_str(), &[], false)
    }

    /// Drive letter for `X:\` rooted paths
    pub fn drive_letter(&self) -> Option<char> {
        match self.platform.root_of(self.root_str()) {
            Some((RootKind::Drive(letter), _)) => Some(letter),
            _ => None,
        }
    }

    pub fn is_unc(&self) -> bool {
        matches!(
            self.platform.root_of(self.root_str()),
            Some((RootKind::Unc { .. }, _))
        )
    }

    /// Names below the root
    pub fn segments(&self) -> Vec<&str> {
        self.display[self.root_len..]
            .split(self.platform.separator())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments().last().copied()
    }

    pub fn parent(&self) -> Option<CanonicalPath> {
        let segments = self.segments();
        if segments.is_empty() {
            return None;
        }
        Some(CanonicalPath::build(
            self.platform,
            self.root_str(),
            &segments[..segments.len() - 1],
            false,
        ))
    }

    pub fn join(&self, name: &str) -> CanonicalPath {
        let mut segments = self.segments();
        segments.push(name);
        CanonicalPath::build(self.platform, self.root_str(), &segments, false)
    }

    /// Same path with the last name replaced, used to keep stored casing
    pub fn with_file_name(&self, name: &str) -> CanonicalPath {
        match self.parent() {
            Some(parent) => parent.join(name),
            None => self.clone(),
        }
    }

    /// Strict ancestry test on lookup keys
    pub fn is_ancestor_of(&self, other: &CanonicalPath) -> bool {
        if other.key.len() <= self.key.len() || !other.key.starts_with(&self.key) {
            return false;
        }
        let sep = self.platform.separator();
        self.key.ends_with(sep) || other.key[self.key.len()..].starts_with(sep)
    }

    /// Re-root `self` from under `from` to under `to`
    pub fn rebase(&self, from: &CanonicalPath, to: &CanonicalPath) -> CanonicalPath {
        let own = self.segments();
        let skip = from.segments().len().min(own.len());
        let mut segments = to.segments();
        segments.extend_from_slice(&own[skip..]);
        CanonicalPath::build(self.platform, to.root_str(), &segments, false)
    }

    /// Same key, different spelling
    pub fn differs_only_in_case(&self, other: &CanonicalPath) -> bool {
        self == other && self.display != other.display
    }
}

impl PartialEq for CanonicalPath {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CanonicalPath {}

impl Hash for CanonicalPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl std::fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

/// Canonicalizes path strings under one platform's rules
#[derive(Clone, Debug)]
pub struct PathNormalizer {
    platform: Platform,
    current_dir: CanonicalPath,
}

impl PathNormalizer {
    /// `current_directory` must be fully qualified for the platform.
    pub fn new(platform: Platform, current_directory: &str) -> FsResult<Self> {
        let normalized = platform.normalize_separators(current_directory);
        let qualified = match platform.root_of(&normalized) {
            Some((RootKind::Drive(_), _)) | Some((RootKind::Unc { .. }, _)) => true,
            Some((RootKind::Posix, _)) => true,
            _ => false,
        };
        if !qualified {
            return Err(FsError::invalid_argument(
                "currentDirectory",
                format!("The current directory '{current_directory}' is not fully qualified."),
            ));
        }
        let bootstrap = PathNormalizer {
            platform,
            current_dir: CanonicalPath::build(platform, platform.default_root(), &[], false),
        };
        let current_dir = bootstrap.normalize(current_directory.into(), "currentDirectory")?;
        Ok(PathNormalizer {
            platform,
            current_dir,
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn current_directory(&self) -> &CanonicalPath {
        &self.current_dir
    }

    /// Reject null, blank and syntactically invalid input
    pub fn validate<'a>(&self, path: PathArg<'a>, param: &'static str) -> FsResult<&'a str> {
        let Some(raw) = path.as_option() else {
            return Err(FsError::ArgumentNull { param });
        };
        if raw.trim().is_empty() {
            return Err(FsError::invalid_argument(
                param,
                "Path cannot be the empty string or all whitespace.",
            ));
        }
        if raw.chars().any(|c| self.platform.is_invalid_path_char(c)) {
            return Err(FsError::invalid_argument(param, "Illegal characters in path."));
        }
        if self.platform.restricts_colon() {
            let drive_prefix = raw.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
            let misplaced = raw
                .char_indices()
                .any(|(i, c)| c == ':' && !(i == 1 && drive_prefix));
            if misplaced {
                return Err(FsError::invalid_argument(
                    param,
                    "The given path's format is not supported.",
                ));
            }
        }
        Ok(raw)
    }

    pub fn normalize(&self, path: PathArg<'_>, param: &'static str) -> FsResult<CanonicalPath> {
        let raw = self.validate(path, param)?;
        self.resolve(raw, param)
    }

    /// Lenient form for existence queries: any failure means "not there"
    pub fn try_normalize(&self, path: PathArg<'_>) -> Option<CanonicalPath> {
        self.normalize(path, "path").ok()
    }

    fn resolve(&self, raw: &str, param: &'static str) -> FsResult<CanonicalPath> {
        let platform = self.platform;
        let sep = platform.separator();
        let normalized = platform.normalize_separators(raw);
        let trailing_separator = normalized.ends_with(sep);

        let cwd_root = self.current_dir.root_str().to_string();
        let cwd_segments: Vec<String> =
            self.current_dir.segments().into_iter().map(str::to_string).collect();

        let (root, mut segments, rest): (String, Vec<String>, &str) =
            match platform.root_of(&normalized) {
                Some((RootKind::Drive(letter), n)) => {
                    (format!("{letter}:{sep}"), Vec::new(), &normalized[n..])
                }
                Some((RootKind::DriveRelative(letter), n)) => {
                    let rest = &normalized[n..];
                    let on_current_drive = self
                        .current_dir
                        .drive_letter()
                        .is_some_and(|d| d.eq_ignore_ascii_case(&letter));
                    if on_current_drive && !rest.is_empty() {
                        (cwd_root, cwd_segments, rest)
                    } else {
                        (format!("{letter}:{sep}"), Vec::new(), rest)
                    }
                }
                Some((RootKind::Unc { server, share }, n)) => (
                    format!("{sep}{sep}{server}{sep}{share}"),
                    Vec::new(),
                    &normalized[n..],
                ),
                Some((RootKind::CurrentDrive, n)) => (cwd_root, Vec::new(), &normalized[n..]),
                Some((RootKind::Posix, n)) => (sep.to_string(), Vec::new(), &normalized[n..]),
                None => {
                    if platform.is_windows() && normalized.starts_with("\\\\") {
                        return Err(FsError::invalid_argument(
                            param,
                            "The UNC path should be of the form \\\\server\\share.",
                        ));
                    }
                    (cwd_root, cwd_segments, normalized.as_str())
                }
            };

        for part in rest.split(sep) {
            match part {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name.to_string()),
            }
        }

        let borrowed: Vec<&str> = segments.iter().map(String::as_str).collect();
        Ok(CanonicalPath::build(
            platform,
            &root,
            &borrowed,
            trailing_separator,
        ))
    }
}

/// Path-string operations bound to the engine's platform and directories
#[derive(Clone, Copy, Debug)]
pub struct PathOps<'a> {
    normalizer: &'a PathNormalizer,
    temp_directory: &'a CanonicalPath,
}

impl<'a> PathOps<'a> {
    pub(crate) fn new(normalizer: &'a PathNormalizer, temp_directory: &'a CanonicalPath) -> Self {
        Self {
            normalizer,
            temp_directory,
        }
    }

    fn platform(&self) -> Platform {
        self.normalizer.platform()
    }

    pub fn directory_separator(&self) -> char {
        self.platform().separator()
    }

    pub fn alt_directory_separator(&self) -> char {
        self.platform().alt_separator()
    }

    pub fn get_invalid_path_chars(&self) -> Vec<char> {
        self.platform().invalid_path_chars().to_vec()
    }

    pub fn get_invalid_file_name_chars(&self) -> Vec<char> {
        self.platform().invalid_file_name_chars()
    }

    pub fn get_full_path<'p>(&self, path: impl Into<PathArg<'p>>) -> FsResult<String> {
        Ok(self.normalizer.normalize(path.into(), "path")?.full_path())
    }

    /// Join segments; a rooted segment discards everything before it
    pub fn combine(&self, parts: &[&str]) -> FsResult<String> {
        let platform = self.platform();
        let mut result = String::new();
        for part in parts {
            if part.chars().any(|c| platform.is_invalid_path_char(c)) {
                return Err(FsError::invalid_argument("paths", "Illegal characters in path."));
            }
            if part.is_empty() {
                continue;
            }
            if platform.is_rooted(part) {
                result = part.to_string();
            } else if result.is_empty() || result.ends_with(|c| platform.is_separator(c)) {
                result.push_str(part);
            } else {
                result.push(platform.separator());
                result.push_str(part);
            }
        }
        Ok(result)
    }

    pub fn is_path_rooted(&self, path: &str) -> bool {
        self.platform().is_rooted(path)
    }

    pub fn get_path_root(&self, path: &str) -> Option<String> {
        let normalized = self.platform().normalize_separators(path);
        let (_, len) = self.platform().root_of(&normalized)?;
        Some(normalized[..len].to_string())
    }

    fn name_start(&self, path: &str) -> usize {
        let platform = self.platform();
        let after_sep = path
            .char_indices()
            .filter(|(_, c)| platform.is_separator(*c))
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(0);
        match platform.root_of(path) {
            Some((RootKind::DriveRelative(_), n)) => after_sep.max(n),
            _ => after_sep,
        }
    }

    pub fn get_file_name(&self, path: &str) -> String {
        path[self.name_start(path)..].to_string()
    }

    pub fn get_file_name_without_extension(&self, path: &str) -> String {
        let name = self.get_file_name(path);
        match name.rfind('.') {
            Some(idx) => name[..idx].to_string(),
            None => name,
        }
    }

    /// Extension including its leading dot, or empty
    pub fn get_extension(&self, path: &str) -> String {
        let name = self.get_file_name(path);
        match name.rfind('.') {
            Some(idx) if idx + 1 < name.len() => name[idx..].to_string(),
            _ => String::new(),
        }
    }

    pub fn has_extension(&self, path: &str) -> bool {
        !self.get_extension(path).is_empty()
    }

    pub fn change_extension(&self, path: &str, extension: Option<&str>) -> String {
        let start = self.name_start(path);
        let stem_end = path[start..]
            .rfind('.')
            .map(|idx| start + idx)
            .unwrap_or(path.len());
        let stem = &path[..stem_end];
        match extension {
            None => stem.to_string(),
            Some("") => format!("{stem}."),
            Some(ext) if ext.starts_with('.') => format!("{stem}{ext}"),
            Some(ext) => format!("{stem}.{ext}"),
        }
    }

    /// Containing directory as written (no current-directory resolution);
    /// `None` for roots and empty input
    pub fn get_directory_name(&self, path: &str) -> Option<String> {
        let platform = self.platform();
        let sep = platform.separator();
        if path.trim().is_empty() {
            return None;
        }
        let normalized = platform.normalize_separators(path);
        let root_len = platform.root_of(&normalized).map(|(_, n)| n).unwrap_or(0);
        let rest = normalized[root_len..].trim_end_matches(sep);
        if rest.is_empty() && root_len > 0 {
            return None;
        }
        let root = &normalized[..root_len];
        let dir = match rest.rfind(sep) {
            Some(idx) => &rest[..idx],
            None => "",
        };
        let collapsed: Vec<&str> = dir.split(sep).filter(|s| !s.is_empty()).collect();
        let mut result = root.to_string();
        if !collapsed.is_empty() && !result.is_empty() && !result.ends_with(sep) {
            result.push(sep);
        }
        if dir.starts_with(sep) && root.is_empty() {
            result.push(sep);
        }
        result.push_str(&collapsed.join(&sep.to_string()));
        Some(result)
    }

    /// Temp directory with its trailing separator
    pub fn get_temp_path(&self) -> String {
        let sep = self.platform().separator();
        let mut path = self.temp_directory.as_str().to_string();
        if !path.ends_with(sep) {
            path.push(sep);
        }
        path
    }
}
