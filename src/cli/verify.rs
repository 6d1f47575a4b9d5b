use super::install_dir;
use plugpack::config::Config;
use plugpack::core::{PackError, PackResult};
use plugpack::package::installation::Installation;
use plugpack::package::verifier::{PackageVerifier, VerificationResult};
use std::path::PathBuf;

pub fn run(package: Option<String>, install_dir_arg: Option<PathBuf>) -> PackResult<()> {
    let config = Config::load()?;
    let root = install_dir(install_dir_arg, &config)?;
    let installation = Installation::load(&root)?;
    let verifier = PackageVerifier::new(&installation);

    let result = match package {
        Some(name) => {
            let pkg = installation.find(&name).ok_or_else(|| {
                PackError::Package(format!(
                    "Package '{}' is not installed in {}",
                    name,
                    root.display()
                ))
            })?;
            verifier.verify_package(pkg)?
        }
        None => {
            if installation.packages().is_empty() {
                println!("No packages to verify");
                return Ok(());
            }
            println!("Verifying {} package(s)...", installation.packages().len());
            verifier.verify_all()?
        }
    };

    report(&result)
}

fn report(result: &VerificationResult) -> PackResult<()> {
    for entry in result.passed() {
        println!("  ✓ {}: {}", entry.package, entry.file);
    }
    for entry in result.inconclusive() {
        println!("  ? {}: {} ({})", entry.package, entry.file, entry.outcome);
    }
    for entry in result.failed() {
        println!("  ❌ {}: {} ({})", entry.package, entry.file, entry.outcome);
    }

    let failed = result.failed().count();
    if failed > 0 {
        println!("❌ Verification failed");
        return Err(PackError::VerificationFailed(format!(
            "{} of {} file(s) failed",
            failed,
            result.total_verified()
        )));
    }

    println!(
        "✓ Verified {} file(s), {} inconclusive",
        result.total_verified(),
        result.inconclusive().count()
    );
    Ok(())
}
