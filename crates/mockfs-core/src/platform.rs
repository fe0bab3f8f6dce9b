// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Platform emulation rules
//!
//! Every other component asks the active [`Platform`] for separators, root
//! forms, case sensitivity and the invalid-character set instead of
//! hard-coding them.

use serde::{Deserialize, Serialize};

/// Target platform the engine emulates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Unix,
}

/// Root form recognized at the start of a separator-normalized path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RootKind {
    /// `C:\` (len 3)
    Drive(char),
    /// `C:` followed by a name or nothing (drive-relative)
    DriveRelative(char),
    /// `\\server\share`
    Unc { server: String, share: String },
    /// A single leading separator on Windows, rooted on the current drive
    CurrentDrive,
    /// `/`
    Posix,
}

const WINDOWS_INVALID_PATH_CHARS: &[char] = &[
    '"', '<', '>', '|', '*', '?', '\0', '\u{1}', '\u{2}', '\u{3}', '\u{4}', '\u{5}', '\u{6}',
    '\u{7}', '\u{8}', '\u{9}', '\u{a}', '\u{b}', '\u{c}', '\u{d}', '\u{e}', '\u{f}', '\u{10}',
    '\u{11}', '\u{12}', '\u{13}', '\u{14}', '\u{15}', '\u{16}', '\u{17}', '\u{18}', '\u{19}',
    '\u{1a}', '\u{1b}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{1f}',
];

const UNIX_INVALID_PATH_CHARS: &[char] = &['\0'];

const WINDOWS_EXTRA_FILE_NAME_CHARS: &[char] = &[':', '\\', '/'];

impl Platform {
    /// The platform of the running host
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }

    pub fn is_case_sensitive(self) -> bool {
        self == Platform::Unix
    }

    pub fn separator(self) -> char {
        match self {
            Platform::Windows => '\\',
            Platform::Unix => '/',
        }
    }

    pub fn alt_separator(self) -> char {
        '/'
    }

    pub fn is_separator(self, c: char) -> bool {
        c == self.separator() || c == self.alt_separator()
    }

    pub fn invalid_path_chars(self) -> &'static [char] {
        match self {
            Platform::Windows => WINDOWS_INVALID_PATH_CHARS,
            Platform::Unix => UNIX_INVALID_PATH_CHARS,
        }
    }

    pub fn invalid_file_name_chars(self) -> Vec<char> {
        let mut chars = self.invalid_path_chars().to_vec();
        match self {
            Platform::Windows => chars.extend_from_slice(WINDOWS_EXTRA_FILE_NAME_CHARS),
            Platform::Unix => chars.push('/'),
        }
        chars
    }

    pub fn is_invalid_path_char(self, c: char) -> bool {
        self.invalid_path_chars().contains(&c)
    }

    /// Whether a `:` past the drive designator makes a path invalid
    pub fn restricts_colon(self) -> bool {
        self.is_windows()
    }

    pub fn supports_unix_mode(self) -> bool {
        self == Platform::Unix
    }

    pub fn supports_access_control(self) -> bool {
        self.is_windows()
    }

    /// Line terminator used by the line-oriented text helpers
    pub fn newline(self) -> &'static str {
        match self {
            Platform::Windows => "\r\n",
            Platform::Unix => "\n",
        }
    }

    pub fn default_root(self) -> &'static str {
        match self {
            Platform::Windows => "C:\\",
            Platform::Unix => "/",
        }
    }

    pub fn default_temp_directory(self) -> &'static str {
        match self {
            Platform::Windows => "C:\\temp\\",
            Platform::Unix => "/tmp/",
        }
    }

    /// Longest symlink chain followed before reporting a loop
    pub fn max_link_hops(self) -> usize {
        match self {
            Platform::Windows => 63,
            Platform::Unix => 40,
        }
    }

    /// Fold a path into its lookup form
    pub fn fold_case(self, path: &str) -> String {
        if self.is_case_sensitive() {
            path.to_string()
        } else {
            path.to_lowercase()
        }
    }

    pub fn names_equal(self, a: &str, b: &str) -> bool {
        if self.is_case_sensitive() {
            a == b
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    }

    /// Classify the root of a path whose separators are already canonical.
    ///
    /// Returns the root kind together with the number of bytes it occupies.
    /// A UNC prefix missing its share yields `None`.
    pub fn root_of(self, path: &str) -> Option<(RootKind, usize)> {
        match self {
            Platform::Unix => path.starts_with('/').then_some((RootKind::Posix, 1)),
            Platform::Windows => {
                let bytes = path.as_bytes();
                if path.starts_with("\\\\") {
                    let rest = &path[2..];
                    let mut parts = rest.splitn(3, '\\');
                    let server = parts.next().unwrap_or_default();
                    let share = parts.next().unwrap_or_default();
                    if server.is_empty() || share.is_empty() {
                        return None;
                    }
                    let len = 2 + server.len() + 1 + share.len();
                    return Some((
                        RootKind::Unc {
                            server: server.to_string(),
                            share: share.to_string(),
                        },
                        len,
                    ));
                }
                if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
                    let letter = bytes[0] as char;
                    if bytes.len() >= 3 && bytes[2] == b'\\' {
                        return Some((RootKind::Drive(letter), 3));
                    }
                    return Some((RootKind::DriveRelative(letter), 2));
                }
                if path.starts_with('\\') {
                    return Some((RootKind::CurrentDrive, 1));
                }
                None
            }
        }
    }

    /// Whether `path` (raw, any separators) carries a root of any form
    pub fn is_rooted(self, path: &str) -> bool {
        let normalized = self.normalize_separators(path);
        match self.root_of(&normalized) {
            Some(_) => true,
            // `\\server` without a share is still rooted syntax
            None => self.is_windows() && normalized.starts_with('\\'),
        }
    }

    /// Rewrite alternate separators to the canonical one
    pub fn normalize_separators(self, path: &str) -> String {
        match self {
            Platform::Windows => path.replace(self.alt_separator(), "\\"),
            Platform::Unix => path.to_string(),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::Unix => write!(f, "unix"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" => Ok(Platform::Windows),
            "unix" | "linux" | "macos" => Ok(Platform::Unix),
            _ => Err(format!("Invalid platform: {}. Use 'windows' or 'unix'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_root_forms() {
        let p = Platform::Windows;
        assert_eq!(p.root_of("C:\\foo"), Some((RootKind::Drive('C'), 3)));
        assert_eq!(p.root_of("d:"), Some((RootKind::DriveRelative('d'), 2)));
        assert_eq!(p.root_of("C:foo"), Some((RootKind::DriveRelative('C'), 2)));
        assert_eq!(p.root_of("\\foo"), Some((RootKind::CurrentDrive, 1)));
        assert_eq!(
            p.root_of("\\\\server\\share\\dir"),
            Some((
                RootKind::Unc {
                    server: "server".into(),
                    share: "share".into()
                },
                14
            ))
        );
        assert_eq!(p.root_of("\\\\server"), None);
        assert_eq!(p.root_of("foo\\bar"), None);
    }

    #[test]
    fn unix_root_forms() {
        let p = Platform::Unix;
        assert_eq!(p.root_of("/usr"), Some((RootKind::Posix, 1)));
        assert_eq!(p.root_of("usr"), None);
        assert!(!p.is_rooted("C:\\foo"));
    }

    #[test]
    fn feature_gates_are_exclusive() {
        assert!(Platform::Windows.supports_access_control());
        assert!(!Platform::Windows.supports_unix_mode());
        assert!(Platform::Unix.supports_unix_mode());
        assert!(!Platform::Unix.supports_access_control());
    }

    #[test]
    fn invalid_characters() {
        assert!(Platform::Windows.is_invalid_path_char('|'));
        assert!(Platform::Windows.is_invalid_path_char('\u{1f}'));
        assert!(!Platform::Unix.is_invalid_path_char('|'));
        assert!(Platform::Unix.is_invalid_path_char('\0'));
        assert!(Platform::Windows.invalid_file_name_chars().contains(&':'));
    }

    #[test]
    fn parses_from_string() {
        assert_eq!("Windows".parse::<Platform>(), Ok(Platform::Windows));
        assert_eq!("linux".parse::<Platform>(), Ok(Platform::Unix));
        assert!("beos".parse::<Platform>().is_err());
    }
}
