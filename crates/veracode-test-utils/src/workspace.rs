//! [`TestWorkspace`] builder for application directories.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary application directory.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the application directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root as a string, the way handlers receive `application_path`.
    pub fn root_str(&self) -> String {
        self.root().display().to_string()
    }

    /// Write a file of `size` zero bytes at `rel_path`, creating parents.
    pub fn write_sized(&self, rel_path: &str, size: usize) -> PathBuf {
        let path = self.root().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, vec![0u8; size]).unwrap();
        path
    }

    /// Add a packaged artifact under `.veracode_packaging/`.
    pub fn add_packaged(&self, name: &str, size: usize) -> PathBuf {
        self.write_sized(&format!(".veracode_packaging/{name}"), size)
    }

    /// Assert that a path exists relative to the root.
    pub fn assert_exists(&self, rel_path: &str) {
        let path = self.root().join(rel_path);
        assert!(path.exists(), "Expected {} to exist", path.display());
    }
}
