//! The resource client trait consumed by the import orchestrator.

use async_trait::async_trait;
use import_config::{
    AddBillingGroupInput, AddEnvironmentInput, AddGroupInput, AddNotificationEmailInput,
    AddNotificationMicrosoftTeamsInput, AddNotificationRocketChatInput, AddNotificationSlackInput,
    AddNotificationToProjectInput, AddProjectInput, AddSshKeyInput, AddUserInput,
    EnvVariableInput, ProjectBillingGroupInput, ProjectGroupsInput, UserGroupRoleInput,
};

use crate::types::{
    BillingGroup, Environment, EnvVar, Group, NotificationRecord, Project, SshKeyRecord, User,
};
use crate::Result;

/// One operation per resource or association kind on the remote platform.
///
/// Implementations decide how operations reach the server; the importer
/// only distinguishes success, existence conflict
/// ([`crate::ClientError::AlreadyExists`], produced by `add_project` and
/// `add_or_update_environment` only), and any other failure.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Create a billing group.
    async fn add_billing_group(&self, input: &AddBillingGroupInput) -> Result<BillingGroup>;

    /// Create a group.
    async fn add_group(&self, input: &AddGroupInput) -> Result<Group>;

    /// Create a user.
    async fn add_user(&self, input: &AddUserInput) -> Result<User>;

    /// Attach an SSH key to a user.
    async fn add_ssh_key(&self, input: &AddSshKeyInput) -> Result<SshKeyRecord>;

    /// Add a user to a group with a role.
    async fn add_user_to_group(&self, input: &UserGroupRoleInput) -> Result<Group>;

    /// Define a Slack notification.
    async fn add_notification_slack(
        &self,
        input: &AddNotificationSlackInput,
    ) -> Result<NotificationRecord>;

    /// Define a RocketChat notification.
    async fn add_notification_rocket_chat(
        &self,
        input: &AddNotificationRocketChatInput,
    ) -> Result<NotificationRecord>;

    /// Define an Email notification.
    async fn add_notification_email(
        &self,
        input: &AddNotificationEmailInput,
    ) -> Result<NotificationRecord>;

    /// Define a Microsoft Teams notification.
    async fn add_notification_microsoft_teams(
        &self,
        input: &AddNotificationMicrosoftTeamsInput,
    ) -> Result<NotificationRecord>;

    /// Create a project. May fail with an existence conflict.
    async fn add_project(&self, input: &AddProjectInput) -> Result<Project>;

    /// Attach an environment variable to a project or environment.
    async fn add_env_variable(&self, input: &EnvVariableInput) -> Result<EnvVar>;

    /// Create or update an environment. May fail with an existence
    /// conflict.
    async fn add_or_update_environment(&self, input: &AddEnvironmentInput) -> Result<Environment>;

    /// Look up a project by name.
    async fn project_by_name(&self, name: &str) -> Result<Project>;

    /// Look up an environment by name within a project.
    async fn environment_by_name(&self, name: &str, project_id: u32) -> Result<Environment>;

    /// Bulk-associate groups with a project.
    async fn add_groups_to_project(&self, input: &ProjectGroupsInput) -> Result<Project>;

    /// Associate a project with a billing group.
    async fn add_project_to_billing_group(
        &self,
        input: &ProjectBillingGroupInput,
    ) -> Result<Project>;

    /// Attach a named notification to a project.
    async fn add_notification_to_project(
        &self,
        input: &AddNotificationToProjectInput,
    ) -> Result<Project>;

    /// Trigger a deployment of a branch environment.
    async fn deploy_environment_branch(&self, project: &str, branch: &str) -> Result<String>;

    /// Delete a project environment.
    async fn delete_environment(&self, project: &str, environment: &str) -> Result<String>;
}
