use thiserror::Error;

pub type PackResult<T> = Result<T, PackError>;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("WalkDir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The manifest or the resolved package data is invalid.
    #[error("Package error: {0}")]
    Package(String),

    #[error("Version error: {0}")]
    Version(String),

    /// A pre-release tag that is not a valid SemVer pre-release.
    #[error("Illegal pre-release tag '{0}'")]
    InvalidPrerelease(String),

    /// A package name with characters that cannot appear in a file name.
    #[error("Package name '{0}' contains illegal characters")]
    InvalidPackageName(String),

    /// A declared dependency is not present in the installation.
    #[error("Dependency '{name}' is not installed")]
    DependencyNotInstalled { name: String },

    /// A declared dependency demands a version the installation does not have.
    #[error("Dependency '{name}' requires version {specifier}, but installed version is {installed}")]
    IncompatibleDependency {
        name: String,
        specifier: String,
        installed: String,
    },

    /// A file references a module at a version the providing package cannot satisfy.
    #[error(
        "'{file}' requires {module} version {required}, but package '{package}' provides version {offered}"
    )]
    VersionConflict {
        file: String,
        module: String,
        required: String,
        package: String,
        offered: String,
    },

    #[error("Action '{action}' requires '{tool}', which was not found")]
    ToolNotFound { action: String, tool: String },

    /// An external tool exited with a non-zero status.
    #[error("'{tool}' exited with code {code}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Directive '{directive}' on '{file}' was not handled by any action")]
    UnconsumedDirective { file: String, directive: String },

    /// Installed files do not match the checksums recorded at build time.
    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

impl PackError {
    /// Process exit code for this error.
    ///
    /// - 1: illegal pre-release tag
    /// - 3: invalid package data
    /// - 4: any other failure
    /// - 5: illegal characters in the package name
    ///
    /// Code 2 (argument error) is produced by the CLI parser, never here.
    pub fn exit_code(&self) -> u8 {
        match self {
            PackError::InvalidPrerelease(_) => 1,
            PackError::Package(_)
            | PackError::Version(_)
            | PackError::Yaml(_)
            | PackError::DependencyNotInstalled { .. }
            | PackError::IncompatibleDependency { .. }
            | PackError::VersionConflict { .. }
            | PackError::UnconsumedDirective { .. } => 3,
            PackError::InvalidPackageName(_) => 5,
            _ => 4,
        }
    }
}
