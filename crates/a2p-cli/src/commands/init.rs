//! `a2p init` command implementation
//!
//! Writes an empty checkpoint holding only the header row.

use crate::error::{CliError, Result};
use a2p_engine::checkpoint;
use a2p_engine::schema::{SCHEMA, SCHEMA_VERSION};
use colored::Colorize;
use std::path::Path;

pub fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::already_exists(path.display().to_string()));
    }

    checkpoint::write_template(path)?;

    println!("{} Created checkpoint: {}", "✓".green(), path.display());
    println!("  Schema version: {}", SCHEMA_VERSION);
    println!("  Columns: {}", SCHEMA.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("applicants.csv");

        run(&path, false).unwrap();

        let records = checkpoint::read_checkpoint(&path).unwrap();
        assert!(records.is_empty());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("friendlyId,subaccount,"));
    }

    #[test]
    fn test_init_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("applicants.csv");
        std::fs::write(&path, "keep me").unwrap();

        let err = run(&path, false).unwrap_err();

        assert!(matches!(err, CliError::AlreadyExists(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("applicants.csv");
        std::fs::write(&path, "old").unwrap();

        run(&path, true).unwrap();
        assert!(checkpoint::read_checkpoint(&path).unwrap().is_empty());
    }
}
