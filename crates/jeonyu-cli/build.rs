//! Stamps the binary with a build identifier.
//!
//! `JEONYU_BUILD` from the environment wins; otherwise the stamp is
//! `<version>+<git hash>.<UTC timestamp>`.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=JEONYU_BUILD");

    let stamp = match std::env::var("JEONYU_BUILD") {
        Ok(stamp) if !stamp.trim().is_empty() => stamp.trim().to_string(),
        _ => {
            let git_hash = Command::new("git")
                .args(["rev-parse", "--short=8", "HEAD"])
                .output()
                .ok()
                .filter(|output| output.status.success())
                .and_then(|output| String::from_utf8(output.stdout).ok())
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
            let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
            format!("{version}+{git_hash}.{timestamp}")
        }
    };

    println!("cargo:rustc-env=JEONYU_BUILD={stamp}");
}
