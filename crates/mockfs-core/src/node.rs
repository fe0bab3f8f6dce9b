// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Node model: the stored representation of files and directories

use chrono::{DateTime, Utc};

use crate::acl::SecurityDescriptor;
use crate::platform::Platform;
use crate::types::{EntryKind, FileAttributes, FileTimes, Metadata, UnixFileMode};
use crate::version::FileVersionInfo;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    File { content: Vec<u8> },
    Directory,
}

/// A file or directory with its metadata
///
/// `attributes` never carries the `Directory` or `ReparsePoint` bits; those
/// are derived from `kind` and `link_target` when reported.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub times: FileTimes,
    pub attributes: FileAttributes,
    pub unix_mode: Option<UnixFileMode>,
    pub access_control: Option<SecurityDescriptor>,
    pub link_target: Option<String>,
    pub version_info: Option<FileVersionInfo>,
}

impl Node {
    pub fn file(platform: Platform, content: Vec<u8>, now: DateTime<Utc>) -> Self {
        Node {
            kind: NodeKind::File { content },
            times: FileTimes::all(now),
            attributes: if platform.is_windows() {
                FileAttributes::ARCHIVE
            } else {
                FileAttributes::NORMAL
            },
            unix_mode: platform
                .supports_unix_mode()
                .then_some(UnixFileMode::DEFAULT_FILE),
            access_control: None,
            link_target: None,
            version_info: None,
        }
    }

    pub fn directory(platform: Platform, now: DateTime<Utc>) -> Self {
        Node {
            kind: NodeKind::Directory,
            times: FileTimes::all(now),
            attributes: FileAttributes::empty(),
            unix_mode: platform
                .supports_unix_mode()
                .then_some(UnixFileMode::DEFAULT_DIRECTORY),
            access_control: None,
            link_target: None,
            version_info: None,
        }
    }

    pub fn symlink(platform: Platform, target: &str, directory: bool, now: DateTime<Utc>) -> Self {
        let mut node = if directory {
            Node::directory(platform, now)
        } else {
            Node::file(platform, Vec::new(), now)
        };
        node.link_target = Some(target.to_string());
        node
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn is_link(&self) -> bool {
        self.link_target.is_some()
    }

    pub fn entry_kind(&self) -> EntryKind {
        match self.kind {
            NodeKind::File { .. } => EntryKind::File,
            NodeKind::Directory => EntryKind::Directory,
        }
    }

    pub fn content(&self) -> &[u8] {
        match &self.kind {
            NodeKind::File { content } => content,
            NodeKind::Directory => &[],
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut Vec<u8>> {
        match &mut self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Directory => None,
        }
    }

    pub fn len(&self) -> u64 {
        self.content().len() as u64
    }

    /// Attributes as the platform reports them for an entry named `name`
    pub fn reported_attributes(&self, platform: Platform, name: Option<&str>) -> FileAttributes {
        let mut attrs = self.attributes;
        if !platform.is_windows() {
            attrs.remove(FileAttributes::READ_ONLY | FileAttributes::HIDDEN);
            if self.unix_mode.is_some_and(|mode| !mode.user_writable()) {
                attrs.insert(FileAttributes::READ_ONLY);
            }
            if name.is_some_and(|n| n.starts_with('.')) {
                attrs.insert(FileAttributes::HIDDEN);
            }
        }
        if self.is_link() {
            attrs.insert(FileAttributes::REPARSE_POINT);
        }
        if self.is_dir() {
            attrs.insert(FileAttributes::DIRECTORY);
        }
        normalize_attributes(attrs)
    }

    pub fn is_read_only(&self, platform: Platform) -> bool {
        self.reported_attributes(platform, None)
            .contains(FileAttributes::READ_ONLY)
    }

    pub fn is_hidden(&self, platform: Platform, name: Option<&str>) -> bool {
        self.reported_attributes(platform, name)
            .contains(FileAttributes::HIDDEN)
    }

    /// Store caller-supplied attributes, keeping derived bits out
    pub fn apply_attributes(&mut self, platform: Platform, requested: FileAttributes) {
        let mut attrs = requested
            .without(FileAttributes::DIRECTORY)
            .without(FileAttributes::REPARSE_POINT);
        if !platform.is_windows() {
            let read_only = attrs.contains(FileAttributes::READ_ONLY);
            if let Some(mode) = self.unix_mode.as_mut() {
                if read_only {
                    mode.0 &= !UnixFileMode::USER_WRITE;
                } else {
                    mode.0 |= UnixFileMode::USER_WRITE;
                }
            }
            attrs.remove(FileAttributes::READ_ONLY | FileAttributes::HIDDEN);
        }
        self.attributes = normalize_attributes(attrs).without(FileAttributes::DIRECTORY);
    }

    pub fn metadata(&self, platform: Platform, name: Option<&str>) -> Metadata {
        Metadata {
            kind: self.entry_kind(),
            len: self.len(),
            times: self.times,
            attributes: self.reported_attributes(platform, name),
            unix_mode: self.unix_mode,
            link_target: self.link_target.clone(),
        }
    }
}

/// `Normal` survives only when it is the sole flag; an empty set reads as `Normal`
fn normalize_attributes(attrs: FileAttributes) -> FileAttributes {
    let others = attrs.without(FileAttributes::NORMAL);
    if others.is_empty() {
        FileAttributes::NORMAL
    } else {
        others
    }
}

/// Builder for pre-populating files through the bootstrap API
///
/// Also returned by [`MockFileSystem::get_file_data`](crate::MockFileSystem::get_file_data)
/// as an independent copy of a stored file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileData {
    content: Vec<u8>,
    attributes: Option<FileAttributes>,
    creation_time: Option<DateTime<Utc>>,
    last_access_time: Option<DateTime<Utc>>,
    last_write_time: Option<DateTime<Utc>>,
    unix_mode: Option<UnixFileMode>,
    access_control: Option<SecurityDescriptor>,
    version_info: Option<FileVersionInfo>,
}

impl FileData {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, attributes: FileAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_creation_time(mut self, at: DateTime<Utc>) -> Self {
        self.creation_time = Some(at);
        self
    }

    pub fn with_last_access_time(mut self, at: DateTime<Utc>) -> Self {
        self.last_access_time = Some(at);
        self
    }

    pub fn with_last_write_time(mut self, at: DateTime<Utc>) -> Self {
        self.last_write_time = Some(at);
        self
    }

    pub fn with_unix_mode(mut self, mode: UnixFileMode) -> Self {
        self.unix_mode = Some(mode);
        self
    }

    pub fn with_access_control(mut self, descriptor: SecurityDescriptor) -> Self {
        self.access_control = Some(descriptor);
        self
    }

    pub fn with_version_info(mut self, info: FileVersionInfo) -> Self {
        self.version_info = Some(info);
        self
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    pub fn attributes(&self) -> Option<FileAttributes> {
        self.attributes
    }

    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
    }

    pub fn last_access_time(&self) -> Option<DateTime<Utc>> {
        self.last_access_time
    }

    pub fn last_write_time(&self) -> Option<DateTime<Utc>> {
        self.last_write_time
    }

    pub fn unix_mode(&self) -> Option<UnixFileMode> {
        self.unix_mode
    }

    pub fn access_control(&self) -> Option<&SecurityDescriptor> {
        self.access_control.as_ref()
    }

    pub fn version_info(&self) -> Option<&FileVersionInfo> {
        self.version_info.as_ref()
    }

    pub(crate) fn into_node(self, platform: Platform, now: DateTime<Utc>) -> Node {
        let mut node = Node::file(platform, self.content, now);
        if let Some(at) = self.creation_time {
            node.times.creation = at;
        }
        if let Some(at) = self.last_access_time {
            node.times.last_access = at;
        }
        if let Some(at) = self.last_write_time {
            node.times.last_write = at;
        }
        if let Some(mode) = self.unix_mode {
            if platform.supports_unix_mode() {
                node.unix_mode = Some(mode);
            }
        }
        if let Some(attributes) = self.attributes {
            node.apply_attributes(platform, attributes);
        }
        node.access_control = self.access_control;
        node.version_info = self.version_info;
        node
    }

    pub(crate) fn from_node(node: &Node, platform: Platform, name: Option<&str>) -> Self {
        FileData {
            content: node.content().to_vec(),
            attributes: Some(node.reported_attributes(platform, name)),
            creation_time: Some(node.times.creation),
            last_access_time: Some(node.times.last_access),
            last_write_time: Some(node.times.last_write),
            unix_mode: node.unix_mode,
            access_control: node.access_control.clone(),
            version_info: node.version_info.clone(),
        }
    }
}

impl From<&str> for FileData {
    fn from(text: &str) -> Self {
        FileData::from_text(text)
    }
}

impl From<Vec<u8>> for FileData {
    fn from(content: Vec<u8>) -> Self {
        FileData::new(content)
    }
}
