// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory file-system engine for tests.
//!
//! [`MockFileSystem`] reproduces the observable behavior of a Windows or Unix
//! file system: path normalization, drive and UNC roots, case folding,
//! timestamp defaults, attribute and permission bits, access-control
//! descriptors and symbolic-link resolution, with the same error taxonomy
//! the real platform APIs use.
//!
//! ```
//! use mockfs_core::{FsConfig, MockFileSystem};
//!
//! let fs = MockFileSystem::new(FsConfig::windows()).unwrap();
//! fs.create_directory(r"C:\work").unwrap();
//! fs.write_all_text(r"C:\work\notes.txt", "hi").unwrap();
//! assert!(fs.file_exists(r"c:\WORK\NOTES.TXT"));
//! ```

pub mod acl;
pub mod clock;
pub mod config;
pub mod error;
pub mod node;
pub mod path;
pub mod pattern;
pub mod platform;
pub mod types;
pub mod version;

mod directory;
mod metadata;
mod store;
mod symlink;
mod vfs;

#[cfg(test)]
mod testing;

pub use acl::SecurityDescriptor;
pub use clock::{sentinel_utc, FixedClock, SystemClock, TimeSource};
pub use config::FsConfig;
pub use error::{FsError, FsResult, IoErrorKind};
pub use node::FileData;
pub use path::{CanonicalPath, PathArg, PathNormalizer, PathOps};
pub use pattern::SearchPattern;
pub use platform::{Platform, RootKind};
pub use types::{
    CancellationToken, DirEntry, EntryKind, FileAttributes, FileTimes, Metadata, SearchOption,
    TimeKind, UnixFileMode,
};
pub use version::{FileVersionInfo, Version};
pub use vfs::MockFileSystem;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_shareable_across_threads() {
        assert_send_sync::<MockFileSystem>();
    }
}
