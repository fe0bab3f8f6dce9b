// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Version resource metadata attached to mock files

use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};

/// `major.minor[.build[.revision]]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }
}

impl std::str::FromStr for Version {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FsError::Format(format!("Version string '{s}' is not in a valid format."));
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(invalid());
        }
        let mut numbers = Vec::with_capacity(parts.len());
        for part in &parts {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            numbers.push(part.parse::<u32>().map_err(|_| invalid())?);
        }
        Ok(Version {
            major: numbers[0],
            minor: numbers[1],
            build: numbers.get(2).copied(),
            revision: numbers.get(3).copied(),
        })
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
            if let Some(revision) = self.revision {
                write!(f, ".{revision}")?;
            }
        }
        Ok(())
    }
}

/// Version resource of a mock file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersionInfo {
    pub file_name: String,
    pub file_version: Option<String>,
    pub product_version: Option<String>,
    pub company_name: Option<String>,
    pub product_name: Option<String>,
    pub file_description: Option<String>,
    pub comments: Option<String>,
    file: Option<Version>,
    product: Option<Version>,
}

impl FileVersionInfo {
    /// Both version strings must parse when present.
    pub fn new(file_version: Option<&str>, product_version: Option<&str>) -> FsResult<Self> {
        let file = file_version.map(str::parse::<Version>).transpose()?;
        let product = product_version.map(str::parse::<Version>).transpose()?;
        Ok(Self {
            file_version: file_version.map(str::to_string),
            product_version: product_version.map(str::to_string),
            file,
            product,
            ..Self::default()
        })
    }

    /// Info reported for a file without a version resource
    pub fn empty(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn with_file_description(mut self, description: impl Into<String>) -> Self {
        self.file_description = Some(description.into());
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    pub(crate) fn for_file(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self
    }

    pub fn file(&self) -> Option<Version> {
        self.file
    }

    pub fn product(&self) -> Option<Version> {
        self.product
    }

    pub fn file_major_part(&self) -> u32 {
        self.file.map(|v| v.major).unwrap_or(0)
    }

    pub fn file_minor_part(&self) -> u32 {
        self.file.map(|v| v.minor).unwrap_or(0)
    }

    pub fn file_build_part(&self) -> u32 {
        self.file.and_then(|v| v.build).unwrap_or(0)
    }

    pub fn file_private_part(&self) -> u32 {
        self.file.and_then(|v| v.revision).unwrap_or(0)
    }

    pub fn product_major_part(&self) -> u32 {
        self.product.map(|v| v.major).unwrap_or(0)
    }

    pub fn product_minor_part(&self) -> u32 {
        self.product.map(|v| v.minor).unwrap_or(0)
    }

    pub fn product_build_part(&self) -> u32 {
        self.product.and_then(|v| v.build).unwrap_or(0)
    }

    pub fn product_private_part(&self) -> u32 {
        self.product.and_then(|v| v.revision).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_to_four_components() {
        assert_eq!("1.2".parse::<Version>().unwrap(), Version::new(1, 2));
        let v: Version = "1.2.3.4".parse().unwrap();
        assert_eq!((v.build, v.revision), (Some(3), Some(4)));
        assert_eq!(v.to_string(), "1.2.3.4");
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["1", "1.2.3.4.5", "1..2", "a.b", "-1.2", "1.2 beta", ""] {
            assert!(
                matches!(bad.parse::<Version>(), Err(FsError::Format(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn version_info_exposes_parts() {
        let info = FileVersionInfo::new(Some("10.4.3.2"), Some("1.0")).unwrap();
        assert_eq!(info.file_major_part(), 10);
        assert_eq!(info.file_private_part(), 2);
        assert_eq!(info.product_build_part(), 0);
        assert!(FileVersionInfo::new(Some("garbage"), None).is_err());
        assert_eq!(FileVersionInfo::empty("a.dll").file_major_part(), 0);
    }
}
