//! Build script for PixelPuritan
//!
//! Exposes build metadata to the crate as compile-time environment
//! variables, read back by `pixelpuritan::build_info()`.

use std::process::Command;

fn main() {
    let build_time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    emit("BUILD_TIME", &build_time.to_string());

    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"]);
    emit("GIT_HASH", git_hash.as_deref().unwrap_or("unknown"));

    let rust_version = command_output("rustc", &["--version"]);
    emit("RUST_VERSION", rust_version.as_deref().unwrap_or("unknown"));

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    emit("BUILD_PROFILE", &profile);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

/// Trimmed stdout of a successful command; `None` inside docs.rs builds
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    if std::env::var("DOCS_RS").is_ok() {
        return None;
    }

    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}
