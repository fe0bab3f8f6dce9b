// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use mockfs_core::*;

fn unix() -> MockFileSystem {
    MockFileSystem::new(FsConfig::unix().with_current_directory("/home/dev"))
        .expect("unix file system")
}

#[test]
fn names_are_case_sensitive() {
    let fs = unix();
    fs.write_all_text("/home/dev/Makefile", "all:").expect("write");
    fs.write_all_text("/home/dev/makefile", "other:").expect("write");

    assert_eq!(fs.read_all_text("/home/dev/Makefile").expect("read"), "all:");
    assert_eq!(fs.read_all_text("/home/dev/makefile").expect("read"), "other:");
    assert!(!fs.file_exists("/home/dev/MAKEFILE"));

    let mut names = fs
        .get_files("/home/dev", "?akefile", SearchOption::TopDirectoryOnly)
        .expect("list");
    names.sort();
    assert_eq!(names, ["/home/dev/Makefile", "/home/dev/makefile"]);
    assert!(fs
        .get_files("/home/dev", "MAKE*", SearchOption::TopDirectoryOnly)
        .expect("list")
        .is_empty());
}

#[test]
fn relative_paths_resolve_against_the_current_directory() {
    let fs = unix();
    assert_eq!(fs.get_current_directory(), "/home/dev");
    fs.write_all_text("notes.txt", "hi").expect("write");
    assert!(fs.file_exists("/home/dev/notes.txt"));
    assert!(fs.file_exists("./notes.txt"));
    assert!(fs.file_exists("../dev/notes.txt"));
    assert_eq!(fs.path().get_full_path("a/../b").expect("full"), "/home/dev/b");
}

#[test]
fn backslashes_are_ordinary_name_characters() {
    let fs = unix();
    fs.write_all_text(r"/home/dev/odd\name", "x").expect("write");
    assert!(fs.file_exists(r"/home/dev/odd\name"));
    assert!(!fs.directory_exists("/home/dev/odd"));
    assert_eq!(fs.path().get_file_name(r"/x/odd\name"), r"odd\name");
    assert!(fs.path().get_path_root("relative").is_none());
    assert_eq!(fs.path().get_path_root("/etc/hosts").as_deref(), Some("/"));
}

#[test]
fn modes_drive_read_only_and_hidden_attributes() {
    let fs = unix();
    fs.write_all_text("/home/dev/.profile", "export X=1").expect("write");
    fs.write_all_text("/home/dev/plain", "x").expect("write");

    let attrs = fs.get_attributes("/home/dev/.profile").expect("attrs");
    assert!(attrs.contains(FileAttributes::HIDDEN));
    assert_eq!(fs.get_attributes("/home/dev/plain").expect("attrs"), FileAttributes::NORMAL);

    fs.set_attributes("/home/dev/plain", FileAttributes::READ_ONLY)
        .expect("set");
    let mode = fs.get_unix_file_mode("/home/dev/plain").expect("mode");
    assert!(!mode.user_writable());
    assert!(matches!(
        fs.write_all_text("/home/dev/plain", "y"),
        Err(FsError::AccessDenied { .. })
    ));

    fs.set_unix_file_mode("/home/dev/plain", UnixFileMode(0o600)).expect("chmod");
    assert!(!fs
        .get_attributes("/home/dev/plain")
        .expect("attrs")
        .contains(FileAttributes::READ_ONLY));
    fs.write_all_text("/home/dev/plain", "y").expect("write again");
}

#[test]
fn directories_carry_modes() {
    let fs = unix();
    fs.create_directory_with_mode("/srv/www", UnixFileMode(0o700))
        .expect("mkdir");
    assert_eq!(fs.get_unix_file_mode("/srv/www").expect("mode"), UnixFileMode(0o700));
    assert_eq!(
        fs.get_unix_file_mode("/srv").expect("mode"),
        UnixFileMode::DEFAULT_DIRECTORY
    );
    let md = fs.metadata("/srv/www").expect("metadata");
    assert!(md.is_dir());
    assert_eq!(md.unix_mode, Some(UnixFileMode(0o700)));
}

#[test]
fn windows_only_surfaces_are_unsupported() {
    let fs = unix();
    fs.write_all_text("/f", "x").expect("write");
    let sd = SecurityDescriptor::default();
    assert!(matches!(fs.get_access_control("/f"), Err(FsError::Unsupported(_))));
    assert!(matches!(fs.set_access_control("/f", &sd), Err(FsError::Unsupported(_))));
    assert!(matches!(
        fs.create_directory_with_access_control("/d", &sd),
        Err(FsError::Unsupported(_))
    ));
    assert!(!fs.directory_exists("/d"));
}

#[test]
fn single_root_and_temp_layout() {
    let fs = unix();
    assert_eq!(fs.get_logical_drives(), ["/"]);
    assert_eq!(fs.get_directory_root("/home/dev/x").expect("root"), "/");
    assert_eq!(fs.get_parent("/home/dev").expect("parent").as_deref(), Some("/home"));
    assert!(fs.get_parent("/").expect("parent").is_none());
    assert_eq!(fs.path().get_temp_path(), "/tmp/");

    let temp = fs.get_temp_file_name().expect("temp");
    assert!(temp.starts_with("/tmp/tmp"));
    assert!(fs.file_exists(&temp));
}

#[test]
fn recursive_enumeration_and_directory_moves() {
    let fs = unix();
    fs.add_file("/repo/src/lib.rs", "").expect("add");
    fs.add_file("/repo/src/bin/tool.rs", "").expect("add");
    fs.add_file("/repo/README.md", "").expect("add");

    let rs = fs
        .get_files("/repo", "*.rs", SearchOption::AllDirectories)
        .expect("list");
    assert_eq!(rs, ["/repo/src/lib.rs", "/repo/src/bin/tool.rs"]);

    let dirs = fs
        .get_directories("/repo/", "*", SearchOption::AllDirectories)
        .expect("list");
    assert_eq!(dirs, ["/repo/src", "/repo/src/bin"]);

    fs.move_directory("/repo/src", "/repo/lib").expect("move");
    assert!(fs.file_exists("/repo/lib/bin/tool.rs"));
    assert!(!fs.directory_exists("/repo/src"));

    let err = fs
        .get_files("/repo/README.md", "*", SearchOption::TopDirectoryOnly)
        .unwrap_err();
    assert_eq!(err.io_kind(), Some(IoErrorKind::InvalidDirectoryName));
    assert!(matches!(
        fs.get_files("/nope", "*", SearchOption::TopDirectoryOnly),
        Err(FsError::DirectoryNotFound { .. })
    ));
}
