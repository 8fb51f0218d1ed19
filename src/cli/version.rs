//! Version and usage text for the CLI.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_line() -> String {
    format!("novelforge {}", VERSION)
}

pub fn usage() -> String {
    format!(
        "{}

Usage:
  novelforge novels            List novels
  novelforge chat <prompt>     Ask the assistant and print the reply
  novelforge stream <prompt>   Stream the assistant reply as it is written
  novelforge --version         Print the version

Environment:
  NOVELFORGE_BASE_URL          Service base URL (default http://localhost:8080/api)
  NOVELFORGE_TIMEOUT_SECS      Request timeout in seconds
  RUST_LOG                     Log filter (default novelforge=info)",
        version_line()
    )
}
