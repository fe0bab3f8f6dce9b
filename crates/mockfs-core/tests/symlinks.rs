// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use mockfs_core::*;

fn windows() -> MockFileSystem {
    MockFileSystem::new(FsConfig::windows()).expect("windows file system")
}

fn unix() -> MockFileSystem {
    MockFileSystem::new(FsConfig::unix()).expect("unix file system")
}

#[test]
fn chains_resolve_one_hop_or_to_the_end() {
    let fs = windows();
    fs.write_all_text(r"C:\bar", "payload").expect("write");
    fs.create_symbolic_link(r"C:\foo", r"C:\bar").expect("link foo");
    fs.create_symbolic_link(r"C:\foo1", r"C:\foo").expect("link foo1");

    assert_eq!(fs.resolve_link_target(r"C:\foo1", false).expect("immediate"), r"C:\foo");
    assert_eq!(fs.resolve_link_target(r"C:\foo1", true).expect("final"), r"C:\bar");
    assert_eq!(fs.read_all_text(r"c:\FOO1").expect("read"), "payload");

    let err = fs.resolve_link_target(r"C:\bar", false).unwrap_err();
    assert_eq!(err.io_kind(), Some(IoErrorKind::NotAReparsePoint));
    let err = fs.resolve_link_target(r"C:\missing", false).unwrap_err();
    assert!(matches!(err, FsError::FileNotFound { .. }));
}

#[test]
fn link_metadata_is_distinct_from_target_metadata() {
    let fs = windows();
    fs.write_all_text(r"C:\target.txt", "12345").expect("write");
    fs.create_symbolic_link(r"C:\link.txt", r"C:\target.txt").expect("link");

    let link = fs.symlink_metadata(r"C:\link.txt").expect("link metadata");
    assert!(link.is_symlink());
    assert!(link.attributes.contains(FileAttributes::REPARSE_POINT));
    assert_eq!(link.link_target.as_deref(), Some(r"C:\target.txt"));

    let target = fs.metadata(r"C:\link.txt").expect("target metadata");
    assert!(!target.is_symlink());
    assert_eq!(target.len, 5);

    let err = fs.create_symbolic_link(r"C:\link.txt", r"C:\elsewhere").unwrap_err();
    assert_eq!(err.io_kind(), Some(IoErrorKind::AlreadyExists));
}

#[test]
fn directory_links_are_traversed_and_removed_alone() {
    let fs = windows();
    fs.add_file(r"C:\real\inner.txt", "in").expect("add");
    fs.create_directory_symbolic_link(r"C:\alias", r"C:\real").expect("link");

    assert!(fs.directory_exists(r"C:\alias"));
    assert!(fs.file_exists(r"C:\alias\inner.txt"));
    assert_eq!(
        fs.get_files(r"C:\alias", "*", SearchOption::TopDirectoryOnly).expect("list"),
        [r"C:\alias\inner.txt"]
    );

    fs.write_all_text(r"C:\alias\new.txt", "n").expect("write through link");
    assert!(fs.file_exists(r"C:\real\new.txt"));

    fs.delete_directory(r"C:\alias", false).expect("remove link");
    assert!(!fs.directory_exists(r"C:\alias"));
    assert!(fs.file_exists(r"C:\real\inner.txt"));
}

#[test]
fn relative_targets_resolve_against_the_link_directory() {
    let fs = unix();
    fs.add_file("/data/target.txt", "t").expect("add");
    fs.create_symbolic_link("/data/link", "target.txt").expect("link");

    assert_eq!(fs.link_target("/data/link").expect("raw").as_deref(), Some("target.txt"));
    assert_eq!(fs.link_target("/data/target.txt").expect("raw"), None);
    assert_eq!(fs.resolve_link_target("/data/link", true).expect("final"), "/data/target.txt");

    fs.write_all_text("/data/link", "updated").expect("write through");
    assert_eq!(fs.read_all_text("/data/target.txt").expect("read"), "updated");
}

#[test]
fn broken_links_do_not_exist() {
    let fs = unix();
    fs.create_symbolic_link("/dangling", "/nowhere").expect("link");

    assert!(!fs.file_exists("/dangling"));
    assert!(fs.symlink_metadata("/dangling").expect("link itself").is_symlink());
    let err = fs.read_all_bytes("/dangling").unwrap_err();
    assert_eq!(err.io_kind(), Some(IoErrorKind::UnresolvedLink));

    fs.delete_file("/dangling").expect("unlink");
    assert!(fs.symlink_metadata("/dangling").is_err());
}

#[test]
fn cycles_are_reported() {
    let fs = unix();
    fs.create_symbolic_link("/a", "/b").expect("link a");
    fs.create_symbolic_link("/b", "/a").expect("link b");

    assert!(!fs.file_exists("/a"));
    let err = fs.read_all_text("/a").unwrap_err();
    assert_eq!(err.io_kind(), Some(IoErrorKind::LinkCycle));
    let err = fs.resolve_link_target("/a", true).unwrap_err();
    assert_eq!(err.io_kind(), Some(IoErrorKind::LinkCycle));
    assert_eq!(fs.resolve_link_target("/a", false).expect("one hop"), "/b");
}

#[test]
fn link_creation_validates_the_target() {
    let fs = windows();
    let err = fs.create_symbolic_link(r"C:\l", PathArg::null()).unwrap_err();
    assert_eq!(err.param(), Some("pathToTarget"));
    let err = fs.create_symbolic_link(r"C:\l", "   ").unwrap_err();
    assert_eq!(err.param(), Some("pathToTarget"));
    assert!(!fs.file_exists(r"C:\l"));
}

#[test]
fn broken_directory_links_read_as_missing_parents() {
    let fs = unix();
    fs.create_directory_symbolic_link("/alias", "/nowhere").expect("link");
    fs.create_directory_symbolic_link("/loop_a", "/loop_b").expect("link a");
    fs.create_directory_symbolic_link("/loop_b", "/loop_a").expect("link b");

    for path in ["/alias/x.txt", "/loop_a/x.txt"] {
        assert_eq!(fs.get_creation_time_utc(path).expect("time"), sentinel_utc(), "{path}");
        assert_eq!(fs.get_last_write_time_utc(path).expect("time"), sentinel_utc(), "{path}");
        assert!(
            matches!(fs.delete_file(path), Err(FsError::DirectoryNotFound { .. })),
            "{path}"
        );
        assert!(
            matches!(fs.get_attributes(path), Err(FsError::DirectoryNotFound { .. })),
            "{path}"
        );
    }
}
