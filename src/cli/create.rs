use super::install_dir;
use clap::{Args, ValueEnum};
use plugpack::build::{CreateOptions, PackageBuilder};
use plugpack::config::Config;
use plugpack::core::PackResult;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Build and write the package archive
    Package,
    /// Print the manifest with macros expanded and stop
    Yaml,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Package manifest (package.yaml)
    pub manifest: PathBuf,
    /// Directory file paths in the manifest are relative to (defaults to the manifest's directory)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,
    /// Installation directory with the installed packages
    #[arg(long)]
    pub install_dir: Option<PathBuf>,
    /// Obfuscator to run on files marked `obfuscate`
    #[arg(long)]
    pub obfuscator: Option<String>,
    /// Archive to write; repeat for several copies
    #[arg(short = 'o', long = "out")]
    pub out: Vec<PathBuf>,
    /// Pre-release tag appended to the package version
    #[arg(long)]
    pub prerelease: Option<String>,
    /// Value of the $(GitVersion) macro
    #[arg(long)]
    pub package_version: Option<String>,
    /// Module name never to resolve; repeatable
    #[arg(long)]
    pub exclude: Vec<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Package)]
    pub out_format: OutputFormat,
}

pub fn run(args: CreateArgs) -> PackResult<()> {
    let config = Config::load()?;
    let options = CreateOptions {
        manifest: args.manifest,
        project_dir: args.project_dir,
        install_dir: install_dir(args.install_dir, &config)?,
        obfuscator: args.obfuscator,
        outputs: args.out,
        prerelease: args.prerelease,
        package_version: args.package_version,
        excluded: args.exclude,
    };
    let builder = PackageBuilder::new(&config);

    if args.out_format == OutputFormat::Yaml {
        print!("{}", builder.expand(&options)?);
        return Ok(());
    }

    let outcome = builder.build(&options)?;
    let pkg = &outcome.package;

    println!("✓ Created {} {}", pkg.name, pkg.version);
    println!(
        "  {} file(s), {} dependency(ies)",
        pkg.files.len(),
        pkg.dependencies.len()
    );
    for dependency in &pkg.dependencies {
        match &dependency.version {
            Some(version) => println!("  depends on {} {}", dependency.name, version),
            None => println!("  depends on {}", dependency.name),
        }
    }
    for output in &outcome.outputs {
        println!("  → {}", output.display());
    }
    Ok(())
}
