// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Access-control descriptors
//!
//! Descriptors are validated on construction and then stored verbatim on the
//! node. Nothing in the engine enforces them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FsError, FsResult};
use crate::path::PathArg;
use crate::vfs::MockFileSystem;

const SECTION_TAGS: [char; 4] = ['O', 'G', 'D', 'S'];

/// Opaque SDDL-shaped security descriptor
///
/// Only built through [`SecurityDescriptor::from_sddl`]; serde goes through
/// the same validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityDescriptor {
    owner: Option<String>,
    group: Option<String>,
    dacl: Option<String>,
    sacl: Option<String>,
}

impl SecurityDescriptor {
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn dacl(&self) -> Option<&str> {
        self.dacl.as_deref()
    }

    pub fn sacl(&self) -> Option<&str> {
        self.sacl.as_deref()
    }

    /// Parse `O:owner G:group D:dacl S:sacl` in that order, each section at
    /// most once and non-empty. An empty string is the empty descriptor.
    pub fn from_sddl(sddl: &str) -> FsResult<Self> {
        let invalid = |why: &str| FsError::Format(format!("Invalid SDDL string '{sddl}': {why}."));
        let text = sddl.trim();
        let mut descriptor = SecurityDescriptor::default();
        if text.is_empty() {
            return Ok(descriptor);
        }

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sections: Vec<(char, usize)> = Vec::new();
        let mut depth = 0usize;
        for (idx, &(offset, c)) in chars.iter().enumerate() {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.checked_sub(1).ok_or_else(|| invalid("unbalanced ')'"))?,
                _ if depth == 0
                    && SECTION_TAGS.contains(&c)
                    && chars.get(idx + 1).is_some_and(|&(_, next)| next == ':') =>
                {
                    sections.push((c, offset));
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(invalid("unbalanced '('"));
        }
        if sections.first().map(|&(_, offset)| offset) != Some(0) {
            return Err(invalid("expected a section tag"));
        }

        let mut last_rank = None;
        for (i, &(tag, start)) in sections.iter().enumerate() {
            let rank = SECTION_TAGS.iter().position(|t| *t == tag);
            if last_rank.is_some() && rank <= last_rank {
                return Err(invalid("sections out of order or repeated"));
            }
            last_rank = rank;
            let end = sections.get(i + 1).map(|&(_, s)| s).unwrap_or(text.len());
            let value = text[start + 2..end].trim();
            if value.is_empty() {
                return Err(invalid("empty section"));
            }
            let slot = match tag {
                'O' => &mut descriptor.owner,
                'G' => &mut descriptor.group,
                'D' => &mut descriptor.dacl,
                _ => &mut descriptor.sacl,
            };
            *slot = Some(value.to_string());
        }
        Ok(descriptor)
    }

    pub fn is_empty(&self) -> bool {
        *self == SecurityDescriptor::default()
    }

    pub fn to_sddl(&self) -> String {
        let mut out = String::new();
        for (tag, value) in [
            ('O', &self.owner),
            ('G', &self.group),
            ('D', &self.dacl),
            ('S', &self.sacl),
        ] {
            if let Some(value) = value {
                out.push(tag);
                out.push(':');
                out.push_str(value);
            }
        }
        out
    }
}

impl std::str::FromStr for SecurityDescriptor {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_sddl(s)
    }
}

impl TryFrom<String> for SecurityDescriptor {
    type Error = FsError;

    fn try_from(sddl: String) -> Result<Self, Self::Error> {
        Self::from_sddl(&sddl)
    }
}

impl From<SecurityDescriptor> for String {
    fn from(descriptor: SecurityDescriptor) -> Self {
        descriptor.to_sddl()
    }
}

impl std::fmt::Display for SecurityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sddl())
    }
}

impl MockFileSystem {
    fn require_access_control(&self) -> FsResult<()> {
        if self.platform().supports_access_control() {
            Ok(())
        } else {
            Err(FsError::Unsupported(
                "Access control is not supported on this platform.".to_string(),
            ))
        }
    }

    pub fn get_access_control<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
    ) -> FsResult<SecurityDescriptor> {
        let path = self.normalize(path, "path")?;
        self.require_access_control()?;
        let store = self.lock_store();
        let target = self.existing_ancestry(&store, &path)?;
        let entry = store.get(&target).ok_or_else(|| self.missing_file(&store, &path))?;
        Ok(entry.node.access_control.clone().unwrap_or_default())
    }

    pub fn set_access_control<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        descriptor: &SecurityDescriptor,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        self.require_access_control()?;
        let mut store = self.lock_store();
        let target = self.existing_ancestry(&store, &path)?;
        if !store.exists(&target) {
            return Err(self.missing_file(&store, &path));
        }
        if let Some(entry) = store.get_mut(&target) {
            entry.node.access_control = Some(descriptor.clone());
        }
        debug!(op = "set_access_control", path = %target, "access control updated");
        Ok(())
    }

    pub fn get_directory_access_control<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
    ) -> FsResult<SecurityDescriptor> {
        let path = self.normalize(path, "path")?;
        self.require_access_control()?;
        let store = self.lock_store();
        let target = self.existing_ancestry(&store, &path)?;
        match store.get(&target) {
            Some(entry) if entry.node.is_dir() => {
                Ok(entry.node.access_control.clone().unwrap_or_default())
            }
            _ => Err(FsError::directory_not_found(path.as_str())),
        }
    }

    pub fn set_directory_access_control<'p>(
        &self,
        path: impl Into<PathArg<'p>>,
        descriptor: &SecurityDescriptor,
    ) -> FsResult<()> {
        let path = self.normalize(path, "path")?;
        self.require_access_control()?;
        let mut store = self.lock_store();
        let target = self.existing_ancestry(&store, &path)?;
        match store.get_mut(&target) {
            Some(entry) if entry.node.is_dir() => {
                entry.node.access_control = Some(descriptor.clone());
            }
            _ => return Err(FsError::directory_not_found(path.as_str())),
        }
        debug!(op = "set_directory_access_control", path = %target, "access control updated");
        Ok(())
    }
}
