//! The `validate` subcommand: parse and structurally check a
//! configuration file without touching the remote platform.

use anyhow::{Context, Result};
use import_config::parser;
use std::path::Path;

pub fn run(config_path: &Path) -> Result<()> {
    let config = parser::parse_file(config_path)
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

    let environments: usize = config.projects.iter().map(|p| p.environments.len()).sum();
    println!(
        "{} is valid: {} billing group(s), {} group(s), {} user(s), {} project(s), {} environment(s)",
        config_path.display(),
        config.billing_groups.len(),
        config.groups.len(),
        config.users.len(),
        config.projects.len(),
        environments,
    );
    Ok(())
}
