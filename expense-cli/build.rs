//! Stamps the source revision into `expenses --version`.
//!
//! Release tarballs have no `.git`, so packagers can set
//! `EXPENSES_REVISION` themselves; otherwise `git describe` is asked.

use std::env;
use std::path::Path;
use std::process::Command;

const REVISION_VAR: &str = "EXPENSES_REVISION";

fn git_describe(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["describe", "--always", "--dirty=+", "--abbrev=10"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8(out.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_string())
}

fn main() {
    println!("cargo:rerun-if-env-changed={REVISION_VAR}");

    let manifest_dir = env::var_os("CARGO_MANIFEST_DIR").unwrap_or_default();
    let workspace = Path::new(&manifest_dir).join("..");
    let git_dir = workspace.join(".git");
    if git_dir.exists() {
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", git_dir.join("index").display());
    }

    let revision = env::var(REVISION_VAR)
        .ok()
        .filter(|r| !r.trim().is_empty())
        .or_else(|| git_describe(&workspace))
        .unwrap_or_else(|| "untracked".to_string());

    println!("cargo:rustc-env={REVISION_VAR}={revision}");
}
