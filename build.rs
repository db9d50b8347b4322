// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use std::process::Command;

// Bake the rustc version and short commit into the obfuscator banner.
fn main() {
    println!("cargo:rerun-if-env-changed=OBFUSCATOR_COMMIT");

    let rustc = rustc_version::version()
        .map(|v| v.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=RUSTC_VERSION={rustc}");

    let commit = std::env::var("OBFUSCATOR_COMMIT")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(short_commit)
        .unwrap_or_else(|| "0000000".to_string());
    println!("cargo:rustc-env=OBFUSCATOR_COMMIT={commit}");
}

fn short_commit() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}
