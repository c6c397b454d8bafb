// src/version.rs

//! Build-time version constants.
//!
//! `HTTP_CMD_BUILD` may be set at compile time (e.g. to `git rev-parse HEAD`)
//! to stamp the binary with a build id.

use std::sync::LazyLock;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BUILD: &str = match option_env!("HTTP_CMD_BUILD") {
    Some(build) => build,
    None => "000000",
};

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| format!("{VERSION} (build {BUILD})"));

/// Version string including the build id, as shown by `--version`.
pub fn long_version() -> &'static str {
    LONG_VERSION.as_str()
}
