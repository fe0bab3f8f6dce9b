// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Wildcard search patterns for directory enumeration

use regex::{Regex, RegexBuilder};

use crate::error::{FsError, FsResult};
use crate::platform::Platform;

const PARAM: &str = "searchPattern";

/// Compiled `*`/`?` pattern matched against a single entry name
#[derive(Clone, Debug)]
pub struct SearchPattern {
    raw: String,
    regex: Option<Regex>,
}

/// `..` only climbs when it ends the pattern or precedes a separator
fn climbs_up(pattern: &str, platform: Platform) -> bool {
    pattern.char_indices().any(|(at, _)| {
        let rest = &pattern[at..];
        rest.starts_with("..")
            && rest[2..]
                .chars()
                .next()
                .map_or(true, |c| platform.is_separator(c))
    })
}

impl SearchPattern {
    pub fn new(pattern: &str, platform: Platform) -> FsResult<Self> {
        if climbs_up(pattern, platform) {
            return Err(FsError::invalid_argument(
                PARAM,
                "Search pattern cannot contain \"..\" to move up directories.",
            ));
        }
        if pattern.chars().any(|c| platform.is_separator(c)) {
            return Err(FsError::invalid_argument(
                PARAM,
                "Search pattern cannot contain a directory separator.",
            ));
        }
        if pattern.contains('\0') {
            return Err(FsError::invalid_argument(PARAM, "Illegal characters in path."));
        }

        // `*` and `*.*` match every name, including names without a dot
        if pattern.is_empty() || pattern == "*" || pattern == "*.*" {
            return Ok(Self {
                raw: pattern.to_string(),
                regex: None,
            });
        }

        let mut expr = String::from("^");
        for c in pattern.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        let regex = RegexBuilder::new(&expr)
            .case_insensitive(!platform.is_case_sensitive())
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| FsError::invalid_argument(PARAM, e.to_string()))?;
        Ok(Self {
            raw: pattern.to_string(),
            regex: Some(regex),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.regex {
            None => true,
            Some(regex) => regex.is_match(name),
        }
    }
}
