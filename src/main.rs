use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "plugpack")]
#[command(about = "Build versioned, signed plugin packages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a package archive from a manifest
    Create(cli::create::CreateArgs),
    /// Verify installed files against their recorded checksums
    Verify {
        /// Package to verify (all installed packages if omitted)
        package: Option<String>,
        /// Installation directory (defaults to config, then the current directory)
        #[arg(long)]
        install_dir: Option<PathBuf>,
    },
}

/// Exit code for a command-line parse failure.
///
/// Unknown options are 1, every other argument error 2.
fn parse_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        ErrorKind::UnknownArgument => 1,
        _ => 2,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_exit_code(e.kind()));
        }
    };

    let result = match cli.command {
        Commands::Create(args) => cli::create::run(args),
        Commands::Verify {
            package,
            install_dir,
        } => cli::verify::run(package, install_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\nError: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
