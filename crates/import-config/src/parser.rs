//! Configuration parsing and structural validation

use crate::{Config, ConfigError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Parse a YAML configuration file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parse YAML configuration from a string
pub fn parse_str(content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate structural invariants of the document.
///
/// Only checks that can be decided without talking to the remote platform
/// live here; cross-resource rules (billing-group cardinality in
/// particular) are enforced during the import itself.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut project_names = HashSet::new();
    for project in &config.projects {
        if project.project.name.is_empty() {
            return Err(ConfigError::Validation(
                "project with empty name".to_string(),
            ));
        }
        if !project_names.insert(project.project.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate project '{}'",
                project.project.name
            )));
        }

        let mut environment_names = HashSet::new();
        for env in &project.environments {
            if env.environment.name.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "project '{}' has an environment with an empty name",
                    project.project.name
                )));
            }
            if !environment_names.insert(env.environment.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "project '{}' declares environment '{}' more than once",
                    project.project.name, env.environment.name
                )));
            }
        }
    }

    let mut group_names = HashSet::new();
    for group in &config.groups {
        if group.group.name.is_empty() {
            return Err(ConfigError::Validation("group with empty name".to_string()));
        }
        if !group_names.insert(group.group.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate group '{}'",
                group.group.name
            )));
        }
    }

    let mut user_emails = HashSet::new();
    for user in &config.users {
        if user.user.email.is_empty() {
            return Err(ConfigError::Validation(
                "user with empty email".to_string(),
            ));
        }
        if !user_emails.insert(user.user.email.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate user '{}'",
                user.user.email
            )));
        }
    }

    Ok(())
}
