// VgaAnsiTerminal - Build Script
//
// Stamps the version string and tracks the compile-time configuration
// overrides read by src/config/defaults.rs.

use std::env;
use std::process::Command;

const CONFIG_ENV: &[&str] = &[
    "VGATERM_DEFAULT_VGA_MODE",
    "VGATERM_DEFAULT_BAUD_RATE",
    "VGATERM_DEFAULT_KEYTABLE",
    "VGATERM_SCANLINE_BUFFER_SIZE",
    "VGATERM_DEFAULT_ENABLE_MOUSE",
    "VGATERM_DEFAULT_AUTO_WRAP",
    "VGATERM_DEFAULT_APPLICATION_MODE",
    "VGATERM_DEFAULT_UTF8_MODE",
    "VGATERM_DEFAULT_C1_CODES_8BIT",
    "VGATERM_DEFAULT_NEWLINE_MODE",
    "VGATERM_DEFAULT_LOCAL_ECHO",
    "VGATERM_DEFAULT_SGR_CUMULATIVE",
    "VGATERM_DEFAULT_LOG_UNHANDLED",
];

fn main() {
    // ESP-IDF environment setup (MUST be first!)
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    // Get git version info
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=VERSION_STRING=VgaTerm v{}-g{}", version, git_hash);

    // Defaults are baked in with option_env!, rebuild when any of them moves
    for name in CONFIG_ENV {
        println!("cargo:rerun-if-env-changed={}", name);
    }

    // Rebuild if git HEAD changes
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");
}
