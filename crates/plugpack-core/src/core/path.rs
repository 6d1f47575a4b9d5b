use crate::core::error::{PackError, PackResult};
use std::path::{Component, Path, PathBuf};

/// Folder, relative to an installation, holding one sub-folder per package.
pub const PACKAGES_DIR: &str = "Packages";

/// Folder, relative to an installation or package, holding bundled payload modules.
pub const DEPENDENCIES_DIR: &str = "Dependencies";

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.yaml";

/// Characters that may not appear in a package name.
const ILLEGAL_NAME_CHARS: &[char] = &['"', '<', '>', '|', ':', '*', '?', '\\', '/'];

/// Get the Plugpack home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\plugpack
/// - Linux: ~/.config/plugpack
/// - macOS: ~/Library/Application Support/plugpack
pub fn plugpack_home() -> PackResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| PackError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("plugpack"))
}

/// Get the config file path (`$PLUGPACK_CONFIG` overrides the default location)
pub fn config_file() -> PackResult<PathBuf> {
    if let Ok(path) = std::env::var("PLUGPACK_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    Ok(plugpack_home()?.join("config.yaml"))
}

/// Archive-relative location of the manifest of package `name`.
pub fn package_manifest_path(name: &str) -> String {
    format!("{}/{}/{}", PACKAGES_DIR, name, MANIFEST_FILE)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> PackResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Normalize a relative destination path to the forward-slash form used inside archives.
///
/// `.` components are dropped; `..` and absolute paths are rejected since an
/// entry must never escape the package root.
pub fn to_archive_path(path: &str) -> PackResult<String> {
    let unified = path.replace('\\', "/");
    let mut parts = Vec::new();

    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(PackError::Package(format!(
                    "Destination '{}' must be a relative path inside the package",
                    path
                )))
            }
        }
    }

    if parts.is_empty() {
        return Err(PackError::Package(format!(
            "Destination '{}' is empty",
            path
        )));
    }

    Ok(parts.join("/"))
}

/// Check that a package name can be used as a folder and file name.
pub fn validate_package_name(name: &str) -> PackResult<()> {
    if name.trim().is_empty() {
        return Err(PackError::Package("Package name cannot be empty".to_string()));
    }

    if name
        .chars()
        .any(|c| c.is_control() || ILLEGAL_NAME_CHARS.contains(&c))
    {
        return Err(PackError::InvalidPackageName(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("test_dir");

        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_to_archive_path() {
        assert_eq!(to_archive_path("a\\b\\c.dll").unwrap(), "a/b/c.dll");
        assert_eq!(to_archive_path("./a/b.dll").unwrap(), "a/b.dll");
        assert!(to_archive_path("../escape.dll").is_err());
        assert!(to_archive_path("/abs.dll").is_err());
        assert!(to_archive_path("").is_err());
    }

    #[test]
    fn test_package_manifest_path() {
        assert_eq!(package_manifest_path("Core"), "Packages/Core/package.yaml");
    }

    #[test]
    fn test_validate_package_name() {
        assert!(validate_package_name("My Plugin").is_ok());
        assert!(validate_package_name("Plugin.Extras-2").is_ok());
        assert!(matches!(
            validate_package_name("bad/name"),
            Err(PackError::InvalidPackageName(_))
        ));
        assert!(matches!(
            validate_package_name("what?"),
            Err(PackError::InvalidPackageName(_))
        ));
        assert!(matches!(
            validate_package_name("  "),
            Err(PackError::Package(_))
        ));
    }
}
