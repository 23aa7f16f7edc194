//! GraphQL-over-HTTP implementation of [`ResourceClient`].
//!
//! Every operation posts a `{query, variables}` document to a single
//! endpoint and decodes one named field out of the `data` object. Project
//! creation and environment create-or-update pass their failures through
//! the conflict classifier; all other operations surface API errors
//! unchanged.

use async_trait::async_trait;
use import_config::{
    AddBillingGroupInput, AddEnvironmentInput, AddGroupInput, AddNotificationEmailInput,
    AddNotificationMicrosoftTeamsInput, AddNotificationRocketChatInput, AddNotificationSlackInput,
    AddNotificationToProjectInput, AddProjectInput, AddSshKeyInput, AddUserInput,
    EnvVariableInput, ProjectBillingGroupInput, ProjectGroupsInput, UserGroupRoleInput,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::types::{
    BillingGroup, Environment, EnvVar, Group, NotificationRecord, Project, SshKeyRecord, User,
};
use crate::{ClientError, ResourceClient, Result, conflict};

const ADD_BILLING_GROUP: &str = r#"mutation addBillingGroup($input: BillingGroupInput!) {
  addBillingGroup(input: $input) { id name }
}"#;

const ADD_GROUP: &str = r#"mutation addGroup($input: AddGroupInput!) {
  addGroup(input: $input) { id name }
}"#;

const ADD_USER: &str = r#"mutation addUser($input: AddUserInput!) {
  addUser(input: $input) { id email }
}"#;

const ADD_SSH_KEY: &str = r#"mutation addSshKey($input: AddSshKeyInput!) {
  addSshKey(input: $input) { id name }
}"#;

const ADD_USER_TO_GROUP: &str = r#"mutation addUserToGroup($input: UserGroupRoleInput!) {
  addUserToGroup(input: $input) { id name }
}"#;

const ADD_NOTIFICATION_SLACK: &str =
    r#"mutation addNotificationSlack($input: AddNotificationSlackInput!) {
  addNotificationSlack(input: $input) { id name }
}"#;

const ADD_NOTIFICATION_ROCKET_CHAT: &str =
    r#"mutation addNotificationRocketChat($input: AddNotificationRocketChatInput!) {
  addNotificationRocketChat(input: $input) { id name }
}"#;

const ADD_NOTIFICATION_EMAIL: &str =
    r#"mutation addNotificationEmail($input: AddNotificationEmailInput!) {
  addNotificationEmail(input: $input) { id name }
}"#;

const ADD_NOTIFICATION_MICROSOFT_TEAMS: &str =
    r#"mutation addNotificationMicrosoftTeams($input: AddNotificationMicrosoftTeamsInput!) {
  addNotificationMicrosoftTeams(input: $input) { id name }
}"#;

const ADD_PROJECT: &str = r#"mutation addProject($input: AddProjectInput!) {
  addProject(input: $input) { id name }
}"#;

const ADD_ENV_VARIABLE: &str = r#"mutation addEnvVariable($input: EnvVariableInput!) {
  addEnvVariable(input: $input) { id name }
}"#;

const ADD_OR_UPDATE_ENVIRONMENT: &str =
    r#"mutation addOrUpdateEnvironment($input: AddEnvironmentInput!) {
  addOrUpdateEnvironment(input: $input) { id name }
}"#;

const PROJECT_BY_NAME: &str = r#"query projectByName($name: String!) {
  projectByName(name: $name) { id name }
}"#;

const ENVIRONMENT_BY_NAME: &str = r#"query environmentByName($name: String!, $project: Int!) {
  environmentByName(name: $name, project: $project) { id name }
}"#;

const ADD_GROUPS_TO_PROJECT: &str = r#"mutation addGroupsToProject($input: ProjectGroupsInput!) {
  addGroupsToProject(input: $input) { id name }
}"#;

const ADD_PROJECT_TO_BILLING_GROUP: &str =
    r#"mutation addProjectToBillingGroup($input: ProjectBillingGroupInput!) {
  addProjectToBillingGroup(input: $input) { id name }
}"#;

const ADD_NOTIFICATION_TO_PROJECT: &str =
    r#"mutation addNotificationToProject($input: AddNotificationToProjectInput!) {
  addNotificationToProject(input: $input) { id name }
}"#;

const DEPLOY_ENVIRONMENT_BRANCH: &str =
    r#"mutation deployEnvironmentBranch($project: String!, $branch: String!) {
  deployEnvironmentBranch(input: {project: {name: $project}, branchName: $branch})
}"#;

const DELETE_ENVIRONMENT: &str = r#"mutation deleteEnvironment($project: String!, $name: String!) {
  deleteEnvironment(input: {project: $project, name: $name, execute: true})
}"#;

/// Resource API client speaking GraphQL over HTTP.
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    data: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    errors: Option<Vec<ResponseError>>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    message: String,
}

impl GraphQlClient {
    /// Create a client for the given endpoint, optionally authenticating
    /// with a bearer token.
    pub fn new(endpoint: Url, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    async fn run<T: DeserializeOwned>(
        &self,
        query: &'static str,
        field: &'static str,
        variables: Value,
    ) -> Result<T> {
        debug!(field, "sending resource api request");
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?.error_for_status()?;
        let body: Response = response.json().await?;
        extract(body, field)
    }
}

/// Pull the named field out of a response body, turning server errors
/// into [`ClientError::Api`].
fn extract<T: DeserializeOwned>(body: Response, field: &'static str) -> Result<T> {
    if let Some(errors) = body.errors {
        if !errors.is_empty() {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ClientError::Api { message });
        }
    }
    let value = body
        .data
        .and_then(|mut data| data.remove(field))
        .filter(|v| !v.is_null())
        .ok_or(ClientError::MissingData { field })?;
    Ok(serde_json::from_value(value)?)
}

/// Re-tag API failures that report a duplicate entry as existence
/// conflicts. Applied only to operations that can legitimately conflict.
fn wrap_conflicts<T>(result: Result<T>) -> Result<T> {
    match result {
        Err(ClientError::Api { message }) => Err(conflict::classify(message)),
        other => other,
    }
}

#[async_trait]
impl ResourceClient for GraphQlClient {
    async fn add_billing_group(&self, input: &AddBillingGroupInput) -> Result<BillingGroup> {
        self.run(ADD_BILLING_GROUP, "addBillingGroup", json!({ "input": input }))
            .await
    }

    async fn add_group(&self, input: &AddGroupInput) -> Result<Group> {
        self.run(ADD_GROUP, "addGroup", json!({ "input": input }))
            .await
    }

    async fn add_user(&self, input: &AddUserInput) -> Result<User> {
        self.run(ADD_USER, "addUser", json!({ "input": input })).await
    }

    async fn add_ssh_key(&self, input: &AddSshKeyInput) -> Result<SshKeyRecord> {
        self.run(ADD_SSH_KEY, "addSshKey", json!({ "input": input }))
            .await
    }

    async fn add_user_to_group(&self, input: &UserGroupRoleInput) -> Result<Group> {
        self.run(ADD_USER_TO_GROUP, "addUserToGroup", json!({ "input": input }))
            .await
    }

    async fn add_notification_slack(
        &self,
        input: &AddNotificationSlackInput,
    ) -> Result<NotificationRecord> {
        self.run(
            ADD_NOTIFICATION_SLACK,
            "addNotificationSlack",
            json!({ "input": input }),
        )
        .await
    }

    async fn add_notification_rocket_chat(
        &self,
        input: &AddNotificationRocketChatInput,
    ) -> Result<NotificationRecord> {
        self.run(
            ADD_NOTIFICATION_ROCKET_CHAT,
            "addNotificationRocketChat",
            json!({ "input": input }),
        )
        .await
    }

    async fn add_notification_email(
        &self,
        input: &AddNotificationEmailInput,
    ) -> Result<NotificationRecord> {
        self.run(
            ADD_NOTIFICATION_EMAIL,
            "addNotificationEmail",
            json!({ "input": input }),
        )
        .await
    }

    async fn add_notification_microsoft_teams(
        &self,
        input: &AddNotificationMicrosoftTeamsInput,
    ) -> Result<NotificationRecord> {
        self.run(
            ADD_NOTIFICATION_MICROSOFT_TEAMS,
            "addNotificationMicrosoftTeams",
            json!({ "input": input }),
        )
        .await
    }

    async fn add_project(&self, input: &AddProjectInput) -> Result<Project> {
        wrap_conflicts(
            self.run(ADD_PROJECT, "addProject", json!({ "input": input }))
                .await,
        )
    }

    async fn add_env_variable(&self, input: &EnvVariableInput) -> Result<EnvVar> {
        self.run(ADD_ENV_VARIABLE, "addEnvVariable", json!({ "input": input }))
            .await
    }

    async fn add_or_update_environment(&self, input: &AddEnvironmentInput) -> Result<Environment> {
        wrap_conflicts(
            self.run(
                ADD_OR_UPDATE_ENVIRONMENT,
                "addOrUpdateEnvironment",
                json!({ "input": input }),
            )
            .await,
        )
    }

    async fn project_by_name(&self, name: &str) -> Result<Project> {
        self.run(PROJECT_BY_NAME, "projectByName", json!({ "name": name }))
            .await
    }

    async fn environment_by_name(&self, name: &str, project_id: u32) -> Result<Environment> {
        self.run(
            ENVIRONMENT_BY_NAME,
            "environmentByName",
            json!({ "name": name, "project": project_id }),
        )
        .await
    }

    async fn add_groups_to_project(&self, input: &ProjectGroupsInput) -> Result<Project> {
        self.run(
            ADD_GROUPS_TO_PROJECT,
            "addGroupsToProject",
            json!({ "input": input }),
        )
        .await
    }

    async fn add_project_to_billing_group(
        &self,
        input: &ProjectBillingGroupInput,
    ) -> Result<Project> {
        self.run(
            ADD_PROJECT_TO_BILLING_GROUP,
            "addProjectToBillingGroup",
            json!({ "input": input }),
        )
        .await
    }

    async fn add_notification_to_project(
        &self,
        input: &AddNotificationToProjectInput,
    ) -> Result<Project> {
        self.run(
            ADD_NOTIFICATION_TO_PROJECT,
            "addNotificationToProject",
            json!({ "input": input }),
        )
        .await
    }

    async fn deploy_environment_branch(&self, project: &str, branch: &str) -> Result<String> {
        self.run(
            DEPLOY_ENVIRONMENT_BRANCH,
            "deployEnvironmentBranch",
            json!({ "project": project, "branch": branch }),
        )
        .await
    }

    async fn delete_environment(&self, project: &str, environment: &str) -> Result<String> {
        self.run(
            DELETE_ENVIRONMENT,
            "deleteEnvironment",
            json!({ "project": project, "name": environment }),
        )
        .await
    }
}
