//! Tests for `plugpack create`

use super::common::{archive_entries, archive_text, TestContext};
use predicates::prelude::*;

const PLUGIN: &str = "name: Plugin\nversion: 1.2.0\nreferences:\n  - name: Core\n    version: 9.1.0\n";

const MANIFEST: &str = r#"name: Plugin
version: $(GitVersion)
description: Test plugin
files:
  - path: bin/Plugin.dll
    destination: Packages/Plugin/Plugin.dll
  - path: README.md
    destination: Packages/Plugin/README.md
"#;

fn plugin_project(ctx: &TestContext) -> std::path::PathBuf {
    ctx.project_module("bin/Plugin.dll", PLUGIN);
    ctx.project_file("README.md", "# Plugin");
    ctx.manifest(MANIFEST)
}

#[test]
fn test_create_writes_archive() {
    let ctx = TestContext::new();
    ctx.install_package("Core", "9.4.0", &[("Core", "9.4.0")]);
    let manifest = plugin_project(&ctx);
    let output = ctx.temp.path().join("out/Plugin.plugpack");

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .args(["--package-version", "1.2.3"])
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created Plugin 1.2.3"))
        .stdout(predicate::str::contains("depends on Core ^9.4.0"));

    let entries = archive_entries(&output);
    assert!(entries.contains(&"Packages/Plugin/Plugin.dll".to_string()));
    assert!(entries.contains(&"Packages/Plugin/README.md".to_string()));
    assert!(entries.contains(&"Packages/Plugin/package.yaml".to_string()));

    let embedded = archive_text(&output, "Packages/Plugin/package.yaml");
    assert!(embedded.contains("name: Core"));
    assert!(embedded.contains("type: hash"));
    assert!(!embedded.contains("bin/Plugin.dll"));
}

#[test]
fn test_create_default_output_name_and_multiple_outputs() {
    let ctx = TestContext::new();
    ctx.install_package("Core", "9.4.0", &[("Core", "9.4.0")]);
    let manifest = plugin_project(&ctx);

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .args(["--package-version", "2.0.0", "--prerelease", "rc.1"])
        .assert()
        .success();
    assert!(ctx.temp.path().join("Plugin.2.0.0-rc.1.plugpack").is_file());

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .args(["--package-version", "2.0.0", "-o", "a.plugpack", "-o", "b.plugpack"])
        .assert()
        .success();
    assert!(ctx.temp.path().join("a.plugpack").is_file());
    assert!(ctx.temp.path().join("b.plugpack").is_file());
}

#[test]
fn test_create_bundles_module_not_offered_by_any_package() {
    let ctx = TestContext::new();
    ctx.project_module("lib/Json.dll", "name: Json\nversion: 13.0.1\n");
    ctx.project_module(
        "bin/Plugin.dll",
        "name: Plugin\nversion: 1.0.0\nreferences:\n  - name: Json\n    version: 13.0.0\n",
    );
    let manifest = ctx.manifest(
        "name: Plugin\nversion: 1.0.0\nfiles:\n  - path: bin/Plugin.dll\n    destination: Packages/Plugin/Plugin.dll\n",
    );
    let output = ctx.temp.path().join("Plugin.plugpack");

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let entries = archive_entries(&output);
    assert!(entries.contains(&"Dependencies/Json.13.0.1/Json.dll".to_string()));
}

#[test]
fn test_create_yaml_output_only_expands() {
    let ctx = TestContext::new();
    let manifest = plugin_project(&ctx);

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .args(["--package-version", "7.1.0", "--out-format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 7.1.0"))
        .stdout(predicate::str::contains("$(").not());

    assert!(!ctx.temp.path().join("Plugin.7.1.0.plugpack").exists());
}

#[test]
fn test_illegal_prerelease_exits_1() {
    let ctx = TestContext::new();
    let manifest = plugin_project(&ctx);

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .args(["--package-version", "1.0.0", "--prerelease", "not valid!"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pre-release"));
}

#[test]
fn test_unknown_option_exits_1() {
    let ctx = TestContext::new();
    ctx.plugpack()
        .args(["create", "package.yaml", "--no-such-option"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_argument_exits_2() {
    let ctx = TestContext::new();
    ctx.plugpack().arg("create").assert().code(2);
}

#[test]
fn test_undefined_macro_exits_3() {
    let ctx = TestContext::new();
    let manifest = plugin_project(&ctx);

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("GitVersion"));
}

#[test]
fn test_version_conflict_exits_3() {
    let ctx = TestContext::new();
    ctx.install_package("Core", "2.0.0", &[("M", "1.1.0")]);
    ctx.project_module(
        "bin/Plugin.dll",
        "name: Plugin\nversion: 1.0.0\nreferences:\n  - name: M\n    version: 1.5.0\n",
    );
    let manifest = ctx.manifest(
        "name: Plugin\nversion: 1.0.0\nfiles:\n  - path: bin/Plugin.dll\n    destination: Packages/Plugin/Plugin.dll\n",
    );

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Packages/Plugin/Plugin.dll"))
        .stderr(predicate::str::contains("M version 1.5.0"))
        .stderr(predicate::str::contains("Core 2.0.0"));
}

#[test]
fn test_dependency_not_installed_exits_3() {
    let ctx = TestContext::new();
    ctx.project_file("README.md", "readme");
    let manifest = ctx.manifest(
        "name: Plugin\nversion: 1.0.0\ndependencies:\n  - name: Missing\nfiles:\n  - path: README.md\n",
    );

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Missing"));
}

#[test]
fn test_unconsumed_directive_exits_3() {
    let ctx = TestContext::new();
    ctx.project_module("bin/Plugin.dll", "name: Plugin\nversion: 1.0.0\n");
    let manifest = ctx.manifest(
        "name: Plugin\nversion: 1.0.0\nfiles:\n  - path: bin/Plugin.dll\n    directives:\n      - type: obfuscate\n",
    );

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("obfuscate"));
}

#[test]
fn test_missing_file_exits_4() {
    let ctx = TestContext::new();
    let manifest = ctx.manifest("name: Plugin\nversion: 1.0.0\nfiles:\n  - path: bin/Gone.dll\n");

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .assert()
        .code(4);
}

#[test]
fn test_illegal_package_name_exits_5() {
    let ctx = TestContext::new();
    ctx.project_file("README.md", "readme");
    let manifest = ctx.manifest("name: \"Bad|Name\"\nversion: 1.0.0\nfiles:\n  - path: README.md\n");

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .assert()
        .code(5);
}

#[test]
fn test_missing_signer_exits_4() {
    let ctx = TestContext::new();
    ctx.write_config("sign_tool:\n  program: plugpack-test-missing-signer\n");
    ctx.project_module("bin/Plugin.dll", "name: Plugin\nversion: 1.0.0\n");
    let manifest = ctx.manifest(
        "name: Plugin\nversion: 1.0.0\nfiles:\n  - path: bin/Plugin.dll\n    directives:\n      - type: sign\n        certificate: Lab\n",
    );

    ctx.plugpack()
        .arg("create")
        .arg(&manifest)
        .arg("--install-dir")
        .arg(ctx.install_dir())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("plugpack-test-missing-signer"));
}
