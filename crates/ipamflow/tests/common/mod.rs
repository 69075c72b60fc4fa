#![allow(deprecated)] // Command::cargo_bin

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch project directory with an isolated user config
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_manifest(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("ipam.kdl");
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// `ipam` running inside the project with no ambient configuration
    pub fn ipam(&self) -> Command {
        let mut cmd = Command::cargo_bin("ipam").unwrap();
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .env("NO_COLOR", "1")
            .env_remove("IPAMFLOW_MANIFEST")
            .env_remove("IPAMFLOW_URL")
            .env_remove("IPAMFLOW_USER")
            .env_remove("IPAMFLOW_PASSWORD")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `ipam` pointed at a mock server
    #[allow(dead_code)]
    pub fn ipam_against(&self, url: &str) -> Command {
        let mut cmd = self.ipam();
        cmd.env("IPAMFLOW_URL", url)
            .env("IPAMFLOW_USER", "apiuser")
            .env("IPAMFLOW_PASSWORD", "secret");
        cmd
    }
}
