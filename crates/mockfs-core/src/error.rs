// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the mock file-system engine

use std::io;

/// Classification of the generic IO failures the engine reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IoErrorKind {
    AlreadyExists,
    DirectoryNotEmpty,
    NotAReparsePoint,
    UnresolvedLink,
    LinkCycle,
    InvalidDirectoryName,
    SamePath,
    SharingViolation,
    CrossVolume,
    Other,
}

/// Core filesystem error type
///
/// Messages follow the wording of the platform APIs the engine stands in for,
/// so assertions written against the real file system keep passing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("Value cannot be null. (Parameter '{param}')")]
    ArgumentNull { param: &'static str },
    #[error("{message} (Parameter '{param}')")]
    InvalidArgument {
        param: &'static str,
        message: String,
    },
    #[error("Could not find a part of the path '{path}'.")]
    DirectoryNotFound { path: String },
    #[error("Could not find file '{path}'.")]
    FileNotFound { path: String },
    #[error("Access to the path '{path}' is denied.")]
    AccessDenied { path: String },
    #[error("{message}")]
    Io {
        kind: IoErrorKind,
        path: Option<String>,
        message: String,
    },
    #[error("{0}")]
    Unsupported(String),
    #[error("{0}")]
    Format(String),
    #[error("The operation was canceled.")]
    Cancelled,
}

pub type FsResult<T> = Result<T, FsError>;

impl FsError {
    pub(crate) fn invalid_argument(param: &'static str, message: impl Into<String>) -> Self {
        FsError::InvalidArgument {
            param,
            message: message.into(),
        }
    }

    pub(crate) fn io(kind: IoErrorKind, path: Option<&str>, message: impl Into<String>) -> Self {
        FsError::Io {
            kind,
            path: path.map(str::to_string),
            message: message.into(),
        }
    }

    pub(crate) fn already_exists(path: &str) -> Self {
        Self::io(
            IoErrorKind::AlreadyExists,
            Some(path),
            format!("The file '{path}' already exists."),
        )
    }

    pub(crate) fn not_a_reparse_point(path: &str) -> Self {
        Self::io(
            IoErrorKind::NotAReparsePoint,
            Some(path),
            format!("The file or directory '{path}' is not a reparse point."),
        )
    }

    pub(crate) fn directory_not_found(path: &str) -> Self {
        FsError::DirectoryNotFound {
            path: path.to_string(),
        }
    }

    pub(crate) fn file_not_found(path: &str) -> Self {
        FsError::FileNotFound {
            path: path.to_string(),
        }
    }

    pub(crate) fn access_denied(path: &str) -> Self {
        FsError::AccessDenied {
            path: path.to_string(),
        }
    }

    /// The path carried by the failure, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            FsError::DirectoryNotFound { path }
            | FsError::FileNotFound { path }
            | FsError::AccessDenied { path } => Some(path.as_str()),
            FsError::Io { path, .. } => path.as_deref(),
            _ => None,
        }
    }

    /// The parameter name carried by argument failures
    pub fn param(&self) -> Option<&'static str> {
        match self {
            FsError::ArgumentNull { param } | FsError::InvalidArgument { param, .. } => {
                Some(*param)
            }
            _ => None,
        }
    }

    pub fn io_kind(&self) -> Option<IoErrorKind> {
        match self {
            FsError::Io { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind = match &err {
            FsError::ArgumentNull { .. } | FsError::InvalidArgument { .. } => {
                io::ErrorKind::InvalidInput
            }
            FsError::DirectoryNotFound { .. } | FsError::FileNotFound { .. } => {
                io::ErrorKind::NotFound
            }
            FsError::AccessDenied { .. } => io::ErrorKind::PermissionDenied,
            FsError::Io {
                kind: IoErrorKind::AlreadyExists,
                ..
            } => io::ErrorKind::AlreadyExists,
            FsError::Unsupported(_) => io::ErrorKind::Unsupported,
            FsError::Format(_) => io::ErrorKind::InvalidData,
            FsError::Cancelled => io::ErrorKind::Interrupted,
            FsError::Io { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_parameter_and_path() {
        let err = FsError::ArgumentNull { param: "path" };
        assert_eq!(err.to_string(), "Value cannot be null. (Parameter 'path')");
        assert_eq!(err.param(), Some("path"));

        let err = FsError::file_not_found(r"C:\missing.txt");
        assert_eq!(err.path(), Some(r"C:\missing.txt"));
        assert_eq!(err.to_string(), r"Could not find file 'C:\missing.txt'.");
    }

    #[test]
    fn converts_into_std_io_error() {
        let err: io::Error = FsError::already_exists("/a").into();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        let err: io::Error = FsError::directory_not_found("/a/b").into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
