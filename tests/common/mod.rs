#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory holding input files and generated scripts.
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

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }

    /// Reads a file the test expects to have been generated.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.temp_dir.path().join(name)).expect("read generated file")
    }
}

/// Feeds rows straight into an inferencer and finishes it.
pub fn infer_rows(
    config: &csv_sqlgen::config::InferenceConfig,
    rows: &[&[&str]],
) -> csv_sqlgen::infer::InferredTable {
    let mut inferencer = csv_sqlgen::infer::ColumnInferencer::new(config);
    for &row in rows {
        inferencer.observe_row(row).expect("row shape");
    }
    inferencer.finish()
}
