// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Core type definitions for the mock file system

use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};

/// Windows-style attribute flags, stored with their native bit values
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileAttributes(pub u32);

impl FileAttributes {
    pub const READ_ONLY: FileAttributes = FileAttributes(0x1);
    pub const HIDDEN: FileAttributes = FileAttributes(0x2);
    pub const SYSTEM: FileAttributes = FileAttributes(0x4);
    pub const DIRECTORY: FileAttributes = FileAttributes(0x10);
    pub const ARCHIVE: FileAttributes = FileAttributes(0x20);
    pub const DEVICE: FileAttributes = FileAttributes(0x40);
    pub const NORMAL: FileAttributes = FileAttributes(0x80);
    pub const TEMPORARY: FileAttributes = FileAttributes(0x100);
    pub const SPARSE_FILE: FileAttributes = FileAttributes(0x200);
    pub const REPARSE_POINT: FileAttributes = FileAttributes(0x400);
    pub const COMPRESSED: FileAttributes = FileAttributes(0x800);
    pub const OFFLINE: FileAttributes = FileAttributes(0x1000);
    pub const NOT_CONTENT_INDEXED: FileAttributes = FileAttributes(0x2000);
    pub const ENCRYPTED: FileAttributes = FileAttributes(0x4000);

    const NAMES: [(FileAttributes, &'static str); 14] = [
        (Self::READ_ONLY, "ReadOnly"),
        (Self::HIDDEN, "Hidden"),
        (Self::SYSTEM, "System"),
        (Self::DIRECTORY, "Directory"),
        (Self::ARCHIVE, "Archive"),
        (Self::DEVICE, "Device"),
        (Self::NORMAL, "Normal"),
        (Self::TEMPORARY, "Temporary"),
        (Self::SPARSE_FILE, "SparseFile"),
        (Self::REPARSE_POINT, "ReparsePoint"),
        (Self::COMPRESSED, "Compressed"),
        (Self::OFFLINE, "Offline"),
        (Self::NOT_CONTENT_INDEXED, "NotContentIndexed"),
        (Self::ENCRYPTED, "Encrypted"),
    ];

    pub const fn empty() -> Self {
        FileAttributes(0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: FileAttributes) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: FileAttributes) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: FileAttributes) {
        self.0 &= !other.0;
    }

    pub fn without(mut self, other: FileAttributes) -> Self {
        self.remove(other);
        self
    }
}

impl BitOr for FileAttributes {
    type Output = FileAttributes;

    fn bitor(self, rhs: Self) -> Self::Output {
        FileAttributes(self.0 | rhs.0)
    }
}

impl BitOrAssign for FileAttributes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for FileAttributes {
    type Output = FileAttributes;

    fn bitand(self, rhs: Self) -> Self::Output {
        FileAttributes(self.0 & rhs.0)
    }
}

impl std::fmt::Display for FileAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("0");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join(", "))
    }
}

/// POSIX permission bits (lower 12 bits of `st_mode`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnixFileMode(pub u32);

impl UnixFileMode {
    pub const USER_WRITE: u32 = 0o200;
    pub const DEFAULT_FILE: UnixFileMode = UnixFileMode(0o644);
    pub const DEFAULT_DIRECTORY: UnixFileMode = UnixFileMode(0o755);

    pub fn bits(self) -> u32 {
        self.0 & 0o7777
    }

    pub fn user_writable(self) -> bool {
        self.0 & Self::USER_WRITE != 0
    }
}

impl std::fmt::Display for UnixFileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const FLAGS: [(u32, char); 9] = [
            (0o400, 'r'),
            (0o200, 'w'),
            (0o100, 'x'),
            (0o040, 'r'),
            (0o020, 'w'),
            (0o010, 'x'),
            (0o004, 'r'),
            (0o002, 'w'),
            (0o001, 'x'),
        ];
        for (bit, c) in FLAGS {
            write!(f, "{}", if self.0 & bit != 0 { c } else { '-' })?;
        }
        Ok(())
    }
}

/// Which of the three node timestamps an operation addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeKind {
    Creation,
    LastAccess,
    LastWrite,
}

/// File timestamps, stored in UTC
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileTimes {
    pub creation: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
    pub last_write: DateTime<Utc>,
}

impl FileTimes {
    pub fn all(at: DateTime<Utc>) -> Self {
        Self {
            creation: at,
            last_access: at,
            last_write: at,
        }
    }

    pub fn get(&self, kind: TimeKind) -> DateTime<Utc> {
        match kind {
            TimeKind::Creation => self.creation,
            TimeKind::LastAccess => self.last_access,
            TimeKind::LastWrite => self.last_write,
        }
    }

    pub fn set(&mut self, kind: TimeKind, at: DateTime<Utc>) {
        match kind {
            TimeKind::Creation => self.creation = at,
            TimeKind::LastAccess => self.last_access = at,
            TimeKind::LastWrite => self.last_write = at,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// Snapshot of a node's observable metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub kind: EntryKind,
    pub len: u64,
    pub times: FileTimes,
    pub attributes: FileAttributes,
    pub unix_mode: Option<UnixFileMode>,
    pub link_target: Option<String>,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_symlink(&self) -> bool {
        self.link_target.is_some()
    }
}

/// Directory entry information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub metadata: Metadata,
}

/// Depth of an enumeration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchOption {
    #[default]
    TopDirectoryOnly,
    AllDirectories,
}

/// Cancellation signal checked before an operation starts
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self) -> FsResult<()> {
        if self.is_cancelled() {
            Err(FsError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_flags_compose() {
        let mut attrs = FileAttributes::ARCHIVE | FileAttributes::HIDDEN;
        assert!(attrs.contains(FileAttributes::HIDDEN));
        assert!(!attrs.contains(FileAttributes::READ_ONLY));
        attrs.remove(FileAttributes::HIDDEN);
        assert_eq!(attrs, FileAttributes::ARCHIVE);
        assert_eq!(
            (FileAttributes::READ_ONLY | FileAttributes::DIRECTORY).to_string(),
            "ReadOnly, Directory"
        );
        assert!(!FileAttributes::empty().contains(FileAttributes::empty()));
    }

    #[test]
    fn unix_mode_renders_like_ls() {
        assert_eq!(UnixFileMode(0o754).to_string(), "rwxr-xr--");
        assert!(UnixFileMode::DEFAULT_FILE.user_writable());
        assert!(!UnixFileMode(0o444).user_writable());
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(observer.check().is_ok());
        token.cancel();
        assert_eq!(observer.check(), Err(FsError::Cancelled));
    }
}
