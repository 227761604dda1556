//! Post-mortem report of the last fatal error.
//!
//! The device has no supervisor to keep logs for it, so before the serving
//! loop is restarted the error that killed it is written to a file, where
//! the `/error/` page can pick it up after the restart.

use std::path::Path;

use anyhow::Context;

/// Overwrites `path` with the full report of `error`, causes included.
pub fn persist(path: &Path, error: &anyhow::Error) -> anyhow::Result<()> {
    std::fs::write(path, format!("{:?}\n", error))
        .with_context(|| format!("writing diagnostic to {}", path.display()))
}

/// Last persisted report.
pub fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("reading diagnostic from {}", path.display()))
}
