// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Test-only fixtures shared by the unit tests

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::clock::FixedClock;
use crate::config::FsConfig;
use crate::vfs::MockFileSystem;

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub(crate) fn windows_fs() -> MockFileSystem {
    MockFileSystem::new(FsConfig::windows()).expect("windows file system")
}

pub(crate) fn unix_fs() -> MockFileSystem {
    MockFileSystem::new(FsConfig::unix()).expect("unix file system")
}

pub(crate) fn clocked_windows_fs() -> (MockFileSystem, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(fixed_now()));
    let fs = MockFileSystem::with_time_source(FsConfig::windows(), clock.clone())
        .expect("windows file system");
    (fs, clock)
}
