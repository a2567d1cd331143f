#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use filetime::FileTime;

pub const HOUR: u64 = 60 * 60;
pub const DAY: u64 = 24 * HOUR;

/// Set the modification time of `path` to `age` before now.
pub fn backdate(path: &Path, age: Duration) {
    let mtime = SystemTime::now() - age;
    filetime::set_file_mtime(path, FileTime::from_system_time(mtime))
        .expect("failed to back-date test entry");
}

/// Create a file under `dir` that was last modified `hours` ago.
pub fn aged_file(dir: &TempDir, relative: &str, hours: u64) -> PathBuf {
    let child = dir.child(relative);
    child.write_str("payload").expect("failed to write test file");
    backdate(child.path(), Duration::from_secs(hours * HOUR));
    child.path().to_path_buf()
}

/// Create a directory under `dir` that was last modified `days` ago.
///
/// Creating entries inside a directory updates its mtime, so build trees
/// deepest-first.
pub fn aged_dir(dir: &TempDir, relative: &str, days: u64) -> PathBuf {
    let child = dir.child(relative);
    child.create_dir_all().expect("failed to create test directory");
    backdate(child.path(), Duration::from_secs(days * DAY));
    child.path().to_path_buf()
}

/// Write an exclude configuration with one `[dir]` section per entry.
pub fn write_config(dir: &TempDir, sections: &[(&Path, &str)]) -> PathBuf {
    let text: String = sections
        .iter()
        .map(|(path, files)| format!("[{}]\nfiles = {files}\n\n", path.display()))
        .collect();
    let config = dir.child("ops_files_purge_exceptions.cfg");
    config.write_str(&text).expect("failed to write config");
    config.path().to_path_buf()
}
