use crate::core::path::config_file;
use crate::core::{PackError, PackResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// How to invoke an external program.
///
/// Arguments may contain the placeholders `{input}`, `{output}` and
/// `{certificate}`, substituted per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolConfig {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Checksum algorithm recorded for package files
    /// - "blake3": BLAKE3 (default)
    /// - "sha256": SHA-256
    #[serde(default = "default_checksum_algorithm")]
    pub checksum_algorithm: String,

    /// Modules provided by the runtime itself; references to them are never resolved
    #[serde(default = "default_base_modules")]
    pub base_modules: Vec<String>,

    /// Installation directory (defaults to the current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<String>,

    /// Signing tool used for files carrying a `sign` directive
    #[serde(default = "default_sign_tool")]
    pub sign_tool: ToolConfig,

    /// Obfuscators available to `--obfuscator`, by name
    #[serde(default = "default_obfuscators")]
    pub obfuscators: BTreeMap<String, ToolConfig>,

    /// How many times a file copy is retried before giving up
    #[serde(default = "default_copy_retries")]
    pub copy_retries: u32,

    /// Delay between copy retries, in milliseconds
    #[serde(default = "default_copy_backoff_ms")]
    pub copy_backoff_ms: u64,
}

fn default_checksum_algorithm() -> String {
    "blake3".to_string()
}

fn default_base_modules() -> Vec<String> {
    vec!["netstandard".to_string(), "mscorlib".to_string()]
}

fn default_sign_tool() -> ToolConfig {
    ToolConfig::new(
        "signtool",
        &[
            "sign",
            "--certificate",
            "{certificate}",
            "--in",
            "{input}",
            "--out",
            "{output}",
        ],
    )
}

fn default_obfuscators() -> BTreeMap<String, ToolConfig> {
    let mut obfuscators = BTreeMap::new();
    obfuscators.insert(
        "obfuscar".to_string(),
        ToolConfig::new("obfuscar", &["{input}", "{output}"]),
    );
    obfuscators.insert(
        "confuserex".to_string(),
        ToolConfig::new("Confuser.CLI", &["-n", "-o", "{output}", "{input}"]),
    );
    obfuscators
}

fn default_copy_retries() -> u32 {
    10
}

fn default_copy_backoff_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checksum_algorithm: default_checksum_algorithm(),
            base_modules: default_base_modules(),
            install_dir: None,
            sign_tool: default_sign_tool(),
            obfuscators: default_obfuscators(),
            copy_retries: default_copy_retries(),
            copy_backoff_ms: default_copy_backoff_ms(),
        }
    }
}

impl Config {
    /// Load config from the platform-specific config directory, falling back
    /// to defaults when no config file exists
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\plugpack\config.yaml
    /// - Linux: ~/.config/plugpack/config.yaml
    /// - macOS: ~/Library/Application Support/plugpack/config.yaml
    pub fn load() -> PackResult<Self> {
        let config_path = config_file()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> PackResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| PackError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> PackResult<()> {
        match self.checksum_algorithm.as_str() {
            "blake3" | "sha256" => Ok(()),
            other => Err(PackError::Config(format!(
                "Unknown checksum algorithm '{}'. Must be 'blake3' or 'sha256'",
                other
            ))),
        }
    }

    /// Get the installation directory, relative paths resolved against `cwd`
    pub fn get_install_dir(&self, cwd: &Path) -> PathBuf {
        match self.install_dir {
            Some(ref dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        }
    }

    pub fn copy_backoff(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.copy_backoff_ms)
    }
}
