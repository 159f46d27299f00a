#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const REPOS_YML: &str = r#"repos:
  - id: svc1
    stage: 2
    domain: core
    status: active
    owner: team-a
  - id: svc2
    name: Billing
    stage: 4
    domain: payments
    tier: 1
    status: beta
    owner: team-b
    tags: [public]
    dependencies:
      internal: [svc1]
      external: [stripe]
"#;

pub const ACTIONS_YML: &str = r#"capabilities:
  - id: cap1
    name: Cap One
    description: First capability
    auth: none
  - id: billing.charge
    name: Charge
    description: Charge a customer
    domain: payments
    auth: oauth2
    tags: [money]
actions:
  - id: act1
    capability_id: cap1
    repo: svc1
    http:
      method: GET
      path: /v1/thing
  - id: charge.create
    name: Create charge
    capability_id: billing.charge
    repo: Billing
    http: {method: POST, path: /v1/charges}
    request_schema: ChargeInput
    response_schema: Charge
  - id: cap1.mirror
    name: Mirror thing
    capability_id: cap1
    repo: svc2
    http: {method: GET, path: /v1/mirror}
"#;

/// An action that breaks the capability reference rule.
pub const DANGLING_ACTION: &str = r#"  - id: act2
    capability_id: missing-cap
    repo: svc1
    http: {method: GET, path: /v2/thing}
"#;

/// Write a catalog root into a fresh temp dir.
pub fn catalog_root(repos: &str, actions: &str) -> Result<TempDir> {
    let dir = TempDir::new().context("failed to allocate catalog root")?;
    fs::write(dir.path().join("repos.yml"), repos)?;
    fs::write(dir.path().join("actions.yml"), actions)?;
    Ok(dir)
}

pub fn fixture_root() -> Result<TempDir> {
    catalog_root(REPOS_YML, ACTIONS_YML)
}

/// Fixture with `act2` appended, so cross-reference validation fails.
pub fn invalid_root() -> Result<TempDir> {
    catalog_root(REPOS_YML, &format!("{ACTIONS_YML}{DANGLING_ACTION}"))
}

pub fn cli_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_index-cli"))
}

/// `index-cli --root <root> <args>`, with logging silenced.
pub fn cli(root: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(cli_binary());
    cmd.arg("--root").arg(root).args(args).env("RUST_LOG", "off");
    cmd.env_remove("INDEX_ROOT");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Run a command that is expected to exit non-zero.
pub fn run_command_expect_failure(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        bail!(
            "command {:?} unexpectedly succeeded\nstdout: {}",
            cmd,
            String::from_utf8_lossy(&output.stdout)
        );
    }
    Ok(output)
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
