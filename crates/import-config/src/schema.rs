//! Typed API inputs shared between the configuration tree and the
//! resource client.
//!
//! These structs serialize to the wire field names expected by the remote
//! platform (camelCase, SCREAMING enum values) and deserialize from the
//! same spelling in YAML, which lets the config tree flatten them
//! directly.

use serde::{Deserialize, Serialize};

/// Input for creating a billing group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBillingGroupInput {
    /// Billing group name
    pub name: String,
    /// Billing currency code (e.g. "USD")
    pub currency: String,
    /// Optional billing software identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_software: Option<String>,
}

/// Input for creating a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGroupInput {
    /// Group name
    pub name: String,
}

/// Input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserInput {
    /// User email address, the user's unique handle
    pub email: String,
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Free-form comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Supported SSH key algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SshKeyType {
    /// RSA
    SshRsa,
    /// Ed25519
    SshEd25519,
    /// ECDSA over NIST P-256
    EcdsaSha2Nistp256,
    /// ECDSA over NIST P-384
    EcdsaSha2Nistp384,
    /// ECDSA over NIST P-521
    EcdsaSha2Nistp521,
}

/// An SSH public key as declared on a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshKey {
    /// Display name for the key
    pub name: String,
    /// The base64 key material, without the type prefix
    pub key_value: String,
    /// Key algorithm
    pub key_type: SshKeyType,
}

/// Input for attaching an SSH key to a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSshKeyInput {
    /// The key itself
    #[serde(flatten)]
    pub ssh_key: SshKey,
    /// Email of the owning user
    pub user_email: String,
}

/// Role a user holds within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupRole {
    /// Read-only visitor
    Guest,
    /// Can view reports
    Reporter,
    /// Can deploy to development environments
    Developer,
    /// Can deploy to production environments
    Maintainer,
    /// Full control of the group
    Owner,
}

/// Input for adding a user to a group with a role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupRoleInput {
    /// Email of the user
    pub user_email: String,
    /// Name of the group
    pub group_name: String,
    /// Role granted within the group
    pub group_role: GroupRole,
}

/// Input for defining a Slack notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNotificationSlackInput {
    /// Notification name, referenced from projects
    pub name: String,
    /// Incoming webhook URL
    pub webhook: String,
    /// Target channel
    pub channel: String,
}

/// Input for defining a RocketChat notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNotificationRocketChatInput {
    /// Notification name, referenced from projects
    pub name: String,
    /// Incoming webhook URL
    pub webhook: String,
    /// Target channel
    pub channel: String,
}

/// Input for defining an Email notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNotificationEmailInput {
    /// Notification name, referenced from projects
    pub name: String,
    /// Recipient address
    pub email_address: String,
}

/// Input for defining a Microsoft Teams notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNotificationMicrosoftTeamsInput {
    /// Notification name, referenced from projects
    pub name: String,
    /// Incoming webhook URL
    pub webhook: String,
}

/// Input for creating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProjectInput {
    /// Project name
    pub name: String,
    /// Git repository URL
    pub git_url: String,
    /// Name of the production environment branch
    pub production_environment: String,
    /// Branch deployment pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<String>,
    /// Pull-request deployment pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pullrequests: Option<String>,
    /// Subfolder within the repository, for monorepos
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfolder: Option<String>,
    /// Cap on concurrently existing development environments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development_environments_limit: Option<u32>,
    /// Numeric id of the target platform cluster. Whatever the document
    /// declares here is overwritten with the importer's default.
    #[serde(default)]
    pub cluster: u32,
}

/// A plain name/value environment variable pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvKeyValue {
    /// Variable name
    pub name: String,
    /// Variable value
    pub value: String,
}

/// Whether a variable is attached to a project or an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvVarScope {
    /// Attached to a project
    Project,
    /// Attached to a single environment
    Environment,
}

/// Input for attaching an environment variable to a project or
/// environment. `type_id` must be a resolved identifier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVariableInput {
    /// The variable itself
    #[serde(flatten)]
    pub env_key_value: EnvKeyValue,
    /// Attachment scope
    #[serde(rename = "type")]
    pub scope: EnvVarScope,
    /// Resolved id of the owning project or environment
    pub type_id: u32,
}

/// How an environment is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeployType {
    /// Deployed from a branch
    Branch,
    /// Deployed from a pull request
    Pullrequest,
    /// Promoted from another environment
    Promote,
}

/// Production/development classification of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentType {
    /// Production environment
    Production,
    /// Development environment
    Development,
}

/// Input for creating or updating an environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEnvironmentInput {
    /// Environment name (usually the branch name)
    pub name: String,
    /// Resolved id of the owning project; injected by the importer, any
    /// value in the document is ignored
    #[serde(default)]
    pub project_id: u32,
    /// Deployment mechanism
    pub deploy_type: DeployType,
    /// Environment classification
    pub environment_type: EnvironmentType,
    /// Namespace the environment runs in on the target cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A project referenced by name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    /// Project name
    pub name: String,
}

/// A group referenced by name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    /// Group name
    pub name: String,
}

/// Input for bulk-associating groups with a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGroupsInput {
    /// The target project
    pub project: ProjectInput,
    /// Groups to associate
    pub groups: Vec<GroupInput>,
}

/// Input for associating a project with a billing group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBillingGroupInput {
    /// The billing group, by name
    pub group: GroupInput,
    /// The project, by name
    pub project: ProjectInput,
}

/// Kinds of notification that can be attached to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    /// Slack
    #[serde(rename = "SLACK")]
    Slack,
    /// RocketChat
    #[serde(rename = "ROCKETCHAT")]
    RocketChat,
    /// Email
    #[serde(rename = "EMAIL")]
    Email,
    /// Microsoft Teams
    #[serde(rename = "MICROSOFTTEAMS")]
    MicrosoftTeams,
}

/// Input for attaching a named notification to a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNotificationToProjectInput {
    /// Project name
    pub project: String,
    /// Kind of the referenced notification
    pub notification_type: NotificationType,
    /// Name of the referenced notification
    pub notification_name: String,
}
