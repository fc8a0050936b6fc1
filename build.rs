// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=BARCODE_SCANNER_VERSION");

    // Packagers building from a tarball set the version explicitly
    let version = std::env::var("BARCODE_SCANNER_VERSION").unwrap_or_else(|_| git_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version derived from the nearest `v*` tag
///
/// - at a tag: "0.1.0-abcdef1"
/// - past a tag: "0.1.0-dirty-abcdef1"
/// - no tag: the short commit hash, or "unknown" outside a checkout
fn git_version() -> String {
    let commit = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());

    let Some(described) = git(&["describe", "--tags", "--match", "v*"]) else {
        return commit;
    };
    let described = described.strip_prefix('v').unwrap_or(&described);

    // git describe past a tag yields "<tag>-<count>-g<hash>"
    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    match parts.as_slice() {
        [hash, _count, base] if hash.starts_with('g') => {
            format!("{}-dirty-{}", base, &hash[1..])
        }
        _ => format!("{}-{}", described, commit),
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}
