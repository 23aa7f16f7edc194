//! # Import Configuration
//!
//! YAML configuration parser for the platform importer.
//!
//! This crate defines the declarative configuration tree that drives an
//! import run (billing groups, groups, users, projects, environments,
//! notifications) together with the typed API inputs submitted to the
//! remote platform. The tree mirrors the wire schema, so most config
//! structs flatten an input type and add the child collections that hang
//! off it.

#![warn(missing_docs)]

use serde::Deserialize;
use thiserror::Error;

pub mod parser;
pub mod schema;

pub use schema::*;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("couldn't read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse YAML
    #[error("couldn't unmarshal config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Root configuration document for an import run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Billing groups to create before any project references them
    #[serde(default)]
    pub billing_groups: Vec<AddBillingGroupInput>,

    /// Groups and their memberships
    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    /// Users and their SSH keys
    #[serde(default)]
    pub users: Vec<UserConfig>,

    /// Globally defined notifications, referenced by name from projects
    #[serde(default)]
    pub notifications: Option<NotificationsConfig>,

    /// Projects, each owning environments and variables
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

/// A group definition plus its member list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// The group creation input
    #[serde(flatten)]
    pub group: AddGroupInput,

    /// Members added to the group after users exist
    #[serde(default)]
    pub users: Vec<UserRoleConfig>,
}

/// A (user email, role) membership entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleConfig {
    /// Email of an already-declared (or pre-existing) user
    pub email: String,
    /// Role the user holds in the group
    pub role: GroupRole,
}

/// A user definition plus the SSH keys attached to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// The user creation input
    #[serde(flatten)]
    pub user: AddUserInput,

    /// SSH keys attached once the user exists
    #[serde(default)]
    pub ssh_keys: Vec<SshKey>,
}

/// Globally defined notifications, grouped by kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsConfig {
    /// Slack notification definitions
    #[serde(default)]
    pub slack: Vec<AddNotificationSlackInput>,

    /// RocketChat notification definitions
    #[serde(default)]
    pub rocket_chat: Vec<AddNotificationRocketChatInput>,

    /// Email notification definitions
    #[serde(default)]
    pub email: Vec<AddNotificationEmailInput>,

    /// Microsoft Teams notification definitions
    #[serde(default)]
    pub microsoft_teams: Vec<AddNotificationMicrosoftTeamsInput>,
}

/// A project definition and everything attached to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// The project creation input
    #[serde(flatten)]
    pub project: AddProjectInput,

    /// Project-scoped environment variables
    #[serde(default)]
    pub env_variables: Vec<EnvKeyValue>,

    /// Environments owned by this project
    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,

    /// Names of groups to associate with the project
    #[serde(default)]
    pub groups: Vec<String>,

    /// Names of billing groups to associate with the project (at most one)
    #[serde(default)]
    pub billing_groups: Vec<String>,

    /// Users added to the project's implicit group
    #[serde(default)]
    pub users: Vec<UserRoleConfig>,

    /// Names of notifications to attach to the project
    #[serde(default)]
    pub notifications: Option<ProjectNotificationsConfig>,
}

/// An environment definition plus its variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    /// The environment creation input; its `project_id` is replaced with
    /// the owning project's resolved id during import
    #[serde(flatten)]
    pub environment: AddEnvironmentInput,

    /// Environment-scoped environment variables
    #[serde(default)]
    pub env_variables: Vec<EnvKeyValue>,
}

/// Per-project notification references, by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNotificationsConfig {
    /// Names of Slack notifications to attach
    #[serde(default)]
    pub slack: Vec<String>,

    /// Names of RocketChat notifications to attach
    #[serde(default)]
    pub rocket_chat: Vec<String>,

    /// Names of Email notifications to attach
    #[serde(default)]
    pub email: Vec<String>,

    /// Names of Microsoft Teams notifications to attach
    #[serde(default)]
    pub microsoft_teams: Vec<String>,
}
