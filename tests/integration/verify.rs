//! Tests for `plugpack verify`

use super::common::{install_archive, TestContext};
use predicates::prelude::*;
use std::fs;

/// Build a package with the CLI and unpack it into the installation.
fn build_and_install(ctx: &TestContext) {
    ctx.project_module("bin/Plugin.dll", "name: Plugin\nversion: 1.0.0\n");
    ctx.project_file("README.md", "readme");
    let manifest = ctx.manifest(
        "name: Plugin\nversion: 1.0.0\nfiles:\n  - path: bin/Plugin.dll\n    destination: Packages/Plugin/Plugin.dll\n  - path: README.md\n    destination: Packages/Plugin/README.md\n",
    );
    let archive = ctx.temp.path().join("Plugin.plugpack");

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .arg("-o")
        .arg(&archive)
        .assert()
        .success();
    install_archive(&archive, &ctx.install_dir());
}

#[test]
fn test_verify_empty_installation() {
    let ctx = TestContext::new();
    ctx.plugpack()
        .arg("verify")
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages to verify"));
}

#[test]
fn test_verify_built_package() {
    let ctx = TestContext::new();
    build_and_install(&ctx);

    ctx.plugpack()
        .args(["verify", "Plugin", "--install-dir"])
        .arg(ctx.install_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Verified 2 file(s)"));
}

#[test]
fn test_verify_reports_altered_file() {
    let ctx = TestContext::new();
    build_and_install(&ctx);
    fs::write(ctx.install_dir().join("Packages/Plugin/README.md"), "tampered").unwrap();

    ctx.plugpack()
        .arg("verify")
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .assert()
        .code(4)
        .stdout(predicate::str::contains("✓ Plugin: Packages/Plugin/Plugin.dll"))
        .stdout(predicate::str::contains(
            "❌ Plugin: Packages/Plugin/README.md (non-matching checksum",
        ));
}

#[test]
fn test_verify_missing_checksum_is_inconclusive() {
    let ctx = TestContext::new();
    ctx.install_package("Core", "1.0.0", &[("Core", "1.0.0")]);

    ctx.plugpack()
        .arg("verify")
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("missing checksum metadata"))
        .stdout(predicate::str::contains("1 inconclusive"));
}

#[test]
fn test_verify_unknown_package() {
    let ctx = TestContext::new();
    ctx.plugpack()
        .args(["verify", "Nope", "--install-dir"])
        .arg(ctx.install_dir())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not installed"));
}

#[cfg(unix)]
#[test]
fn test_signed_package_hash_covers_signature() {
    let ctx = TestContext::new();
    ctx.write_config(
        "sign_tool:\n  program: sh\n  args: [\"-c\", \"cat \\\"$1\\\" > \\\"$2\\\"; printf ' signed by %s' \\\"$0\\\" >> \\\"$2\\\"\", \"{certificate}\", \"{input}\", \"{output}\"]\n",
    );
    ctx.project_module("bin/Plugin.dll", "name: Plugin\nversion: 1.0.0\n");
    let manifest = ctx.manifest(
        "name: Plugin\nversion: 1.0.0\nfiles:\n  - path: bin/Plugin.dll\n    destination: Packages/Plugin/Plugin.dll\n    directives:\n      - type: sign\n        certificate: Lab\n",
    );
    let archive = ctx.temp.path().join("Plugin.plugpack");

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .arg("-o")
        .arg(&archive)
        .assert()
        .success();
    install_archive(&archive, &ctx.install_dir());

    let installed = fs::read_to_string(ctx.install_dir().join("Packages/Plugin/Plugin.dll")).unwrap();
    assert!(installed.ends_with("signed by Lab"));

    ctx.plugpack()
        .args(["verify", "Plugin", "--install-dir"])
        .arg(ctx.install_dir())
        .assert()
        .success();
}
