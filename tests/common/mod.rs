#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const SAMPLE_HEADER: &str =
    "name.firstName,name.lastName,age,address.line1,address.line2,address.city,address.state,gender";

/// Scratch directory holding CSV inputs and a database for one test case.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Database path inside the workspace; the file is created on first open.
    pub fn database(&self) -> PathBuf {
        self.temp_dir.path().join("users.db")
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// One CSV line in `SAMPLE_HEADER` layout.
pub fn sample_row(first: &str, last: &str, age: &str) -> String {
    format!("{first},{last},{age},A-563 Rakshak Society,New Pune Road,Pune,Maharashtra,male")
}

/// A full CSV document with one row per `(first, last, age)` tuple.
pub fn sample_csv(rows: &[(&str, &str, &str)]) -> String {
    let mut out = String::from(SAMPLE_HEADER);
    out.push('\n');
    for (first, last, age) in rows {
        out.push_str(&sample_row(first, last, age));
        out.push('\n');
    }
    out
}
