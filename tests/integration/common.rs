//! Common utilities for integration tests

use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Isolated project and installation directories.
pub struct TestContext {
    pub temp: TempDir,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        temp.child("install").create_dir_all().unwrap();
        temp.child("project").create_dir_all().unwrap();
        Self { temp }
    }

    pub fn install_dir(&self) -> PathBuf {
        self.temp.child("install").to_path_buf()
    }

    pub fn project_dir(&self) -> PathBuf {
        self.temp.child("project").to_path_buf()
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.child("config.yaml").to_path_buf()
    }

    /// A `plugpack` command running in the temp dir with its own config file.
    pub fn plugpack(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("plugpack").unwrap();
        cmd.current_dir(self.temp.path());
        cmd.env("PLUGPACK_CONFIG", self.config_path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn write_config(&self, content: &str) {
        self.temp.child("config.yaml").write_str(content).unwrap();
    }

    /// Write a project file, creating parent directories.
    pub fn project_file(&self, relative: &str, content: &str) -> PathBuf {
        let child = self.temp.child("project").child(relative);
        child.write_str(content).unwrap();
        child.to_path_buf()
    }

    /// Write a project module with its metadata.
    pub fn project_module(&self, relative: &str, metadata: &str) -> PathBuf {
        let path = self.project_file(relative, &format!("binary {}", relative));
        self.project_file(&format!("{}.module.yaml", relative), metadata);
        path
    }

    pub fn manifest(&self, content: &str) -> PathBuf {
        self.project_file("package.yaml", content)
    }

    /// Install a package offering one module file per `(module, version)`.
    pub fn install_package(&self, name: &str, version: &str, modules: &[(&str, &str)]) {
        let install = self.temp.child("install");
        let mut manifest = format!("name: {}\nversion: {}\nfiles:\n", name, version);
        for (module, module_version) in modules {
            let destination = format!("Packages/{}/{}.dll", name, module);
            install
                .child(&destination)
                .write_str(&format!("binary {}", module))
                .unwrap();
            install
                .child(format!("{}.module.yaml", destination))
                .write_str(&format!("name: {}\nversion: {}\n", module, module_version))
                .unwrap();
            manifest.push_str(&format!("  - path: {}\n", destination));
        }
        install
            .child(format!("Packages/{}/package.yaml", name))
            .write_str(&manifest)
            .unwrap();
    }
}

/// Entry names of a package archive.
pub fn archive_entries(archive: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// Read one entry of a package archive as text.
pub fn archive_text(archive: &Path, entry: &str) -> String {
    use std::io::Read;
    let mut archive = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut content = String::new();
    archive
        .by_name(entry)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

/// Unpack a package archive into an installation directory.
pub fn install_archive(archive: &Path, install_dir: &Path) {
    let mut archive = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    archive.extract(install_dir).unwrap();
}
