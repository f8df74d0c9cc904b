//! Build script for fake-lock-screen
//!
//! Stamps the binary with build date, time and commit for the startup banner.
//! The timestamp comes from chrono so Windows hosts without `date` get one too.

use std::process::Command;

fn main() {
    let now = chrono::Local::now();
    println!("cargo:rustc-env=BUILD_DATE={}", now.format("%Y-%m-%d"));
    println!("cargo:rustc-env=BUILD_TIME={}", now.format("%H:%M:%S"));

    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-changed=.git/HEAD");
}
