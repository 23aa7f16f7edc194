//! Integration tests for the import orchestrator, driven by an
//! in-memory resource client that records every call and can be
//! scripted to fail or conflict on specific entities.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use import_config::{
    AddBillingGroupInput, AddEnvironmentInput, AddGroupInput, AddNotificationEmailInput,
    AddNotificationMicrosoftTeamsInput, AddNotificationRocketChatInput, AddNotificationSlackInput,
    AddNotificationToProjectInput, AddProjectInput, AddSshKeyInput, AddUserInput, Config,
    EnvVarScope, EnvVariableInput, NotificationType, ProjectBillingGroupInput, ProjectGroupsInput,
    UserGroupRoleInput, parser,
};
use import_orchestration::{Error, ImportOptions, StepOutcome, import};
use platform_client::{
    BillingGroup, ClientError, EnvVar, Environment, Group, NotificationRecord, Project,
    ResourceClient, SshKeyRecord, User,
};
use tokio_util::sync::CancellationToken;

/// Every remote operation the fake observed, in order.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    AddBillingGroup(String),
    AddGroup(String),
    AddUser(String),
    AddSshKey { key: String, user: String },
    AddUserToGroup { email: String, group: String },
    AddNotificationSlack(String),
    AddNotificationRocketChat(String),
    AddNotificationEmail(String),
    AddNotificationMicrosoftTeams(String),
    AddProject { name: String, cluster: u32 },
    AddEnvVariable { name: String, scope: EnvVarScope, type_id: u32 },
    AddOrUpdateEnvironment { name: String, project_id: u32 },
    ProjectByName(String),
    EnvironmentByName { name: String, project_id: u32 },
    AddGroupsToProject { project: String, groups: Vec<String> },
    AddProjectToBillingGroup { project: String, group: String },
    AddNotificationToProject { project: String, name: String, kind: NotificationType },
}

/// Scriptable fake platform. Failures and conflicts are keyed by
/// "<kind>:<name>" strings, e.g. "project:demo" or "user:dev@acme".
#[derive(Default)]
struct FakePlatform {
    calls: Mutex<Vec<Call>>,
    failures: HashSet<String>,
    conflicts: HashSet<String>,
    lookup_ids: HashMap<String, u32>,
    next_id: AtomicU32,
}

impl FakePlatform {
    fn new() -> Self {
        Self {
            next_id: AtomicU32::new(100),
            ..Self::default()
        }
    }

    /// Make the operation keyed by `key` fail with a generic API error.
    fn with_failure(mut self, key: &str) -> Self {
        self.failures.insert(key.to_string());
        self
    }

    /// Make the create keyed by `key` report an existence conflict, and
    /// serve `lookup_id` from the corresponding lookup.
    fn with_conflict(mut self, key: &str, lookup_id: u32) -> Self {
        self.conflicts.insert(key.to_string());
        self.lookup_ids.insert(key.to_string(), lookup_id);
        self
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn fail_if(&self, key: &str) -> Result<(), ClientError> {
        if self.failures.contains(key) {
            return Err(ClientError::Api {
                message: format!("backend rejected {key}"),
            });
        }
        Ok(())
    }

    fn conflict_if(&self, key: &str) -> Result<(), ClientError> {
        if self.conflicts.contains(key) {
            return Err(ClientError::AlreadyExists(format!(
                "Duplicate entry '{key}'"
            )));
        }
        Ok(())
    }

    fn assign_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceClient for FakePlatform {
    async fn add_billing_group(
        &self,
        input: &AddBillingGroupInput,
    ) -> platform_client::Result<BillingGroup> {
        self.log(Call::AddBillingGroup(input.name.clone()));
        self.fail_if(&format!("billing-group:{}", input.name))?;
        Ok(BillingGroup::default())
    }

    async fn add_group(&self, input: &AddGroupInput) -> platform_client::Result<Group> {
        self.log(Call::AddGroup(input.name.clone()));
        self.fail_if(&format!("group:{}", input.name))?;
        Ok(Group::default())
    }

    async fn add_user(&self, input: &AddUserInput) -> platform_client::Result<User> {
        self.log(Call::AddUser(input.email.clone()));
        self.fail_if(&format!("user:{}", input.email))?;
        Ok(User::default())
    }

    async fn add_ssh_key(&self, input: &AddSshKeyInput) -> platform_client::Result<SshKeyRecord> {
        self.log(Call::AddSshKey {
            key: input.ssh_key.name.clone(),
            user: input.user_email.clone(),
        });
        self.fail_if(&format!("ssh-key:{}", input.ssh_key.name))?;
        Ok(SshKeyRecord::default())
    }

    async fn add_user_to_group(
        &self,
        input: &UserGroupRoleInput,
    ) -> platform_client::Result<Group> {
        self.log(Call::AddUserToGroup {
            email: input.user_email.clone(),
            group: input.group_name.clone(),
        });
        self.fail_if(&format!("member:{}:{}", input.user_email, input.group_name))?;
        Ok(Group::default())
    }

    async fn add_notification_slack(
        &self,
        input: &AddNotificationSlackInput,
    ) -> platform_client::Result<NotificationRecord> {
        self.log(Call::AddNotificationSlack(input.name.clone()));
        self.fail_if(&format!("slack:{}", input.name))?;
        Ok(NotificationRecord::default())
    }

    async fn add_notification_rocket_chat(
        &self,
        input: &AddNotificationRocketChatInput,
    ) -> platform_client::Result<NotificationRecord> {
        self.log(Call::AddNotificationRocketChat(input.name.clone()));
        self.fail_if(&format!("rocketchat:{}", input.name))?;
        Ok(NotificationRecord::default())
    }

    async fn add_notification_email(
        &self,
        input: &AddNotificationEmailInput,
    ) -> platform_client::Result<NotificationRecord> {
        self.log(Call::AddNotificationEmail(input.name.clone()));
        self.fail_if(&format!("email:{}", input.name))?;
        Ok(NotificationRecord::default())
    }

    async fn add_notification_microsoft_teams(
        &self,
        input: &AddNotificationMicrosoftTeamsInput,
    ) -> platform_client::Result<NotificationRecord> {
        self.log(Call::AddNotificationMicrosoftTeams(input.name.clone()));
        self.fail_if(&format!("teams:{}", input.name))?;
        Ok(NotificationRecord::default())
    }

    async fn add_project(&self, input: &AddProjectInput) -> platform_client::Result<Project> {
        self.log(Call::AddProject {
            name: input.name.clone(),
            cluster: input.cluster,
        });
        let key = format!("project:{}", input.name);
        self.fail_if(&key)?;
        self.conflict_if(&key)?;
        Ok(Project {
            id: self.assign_id(),
            name: input.name.clone(),
        })
    }

    async fn add_env_variable(
        &self,
        input: &EnvVariableInput,
    ) -> platform_client::Result<EnvVar> {
        self.log(Call::AddEnvVariable {
            name: input.env_key_value.name.clone(),
            scope: input.scope,
            type_id: input.type_id,
        });
        self.fail_if(&format!("var:{}", input.env_key_value.name))?;
        Ok(EnvVar::default())
    }

    async fn add_or_update_environment(
        &self,
        input: &AddEnvironmentInput,
    ) -> platform_client::Result<Environment> {
        self.log(Call::AddOrUpdateEnvironment {
            name: input.name.clone(),
            project_id: input.project_id,
        });
        let key = format!("environment:{}", input.name);
        self.fail_if(&key)?;
        self.conflict_if(&key)?;
        Ok(Environment {
            id: self.assign_id(),
            name: input.name.clone(),
        })
    }

    async fn project_by_name(&self, name: &str) -> platform_client::Result<Project> {
        self.log(Call::ProjectByName(name.to_string()));
        self.fail_if(&format!("project-lookup:{name}"))?;
        let id = self
            .lookup_ids
            .get(&format!("project:{name}"))
            .copied()
            .ok_or(ClientError::MissingData { field: "projectByName" })?;
        Ok(Project {
            id,
            name: name.to_string(),
        })
    }

    async fn environment_by_name(
        &self,
        name: &str,
        project_id: u32,
    ) -> platform_client::Result<Environment> {
        self.log(Call::EnvironmentByName {
            name: name.to_string(),
            project_id,
        });
        self.fail_if(&format!("environment-lookup:{name}"))?;
        let id = self
            .lookup_ids
            .get(&format!("environment:{name}"))
            .copied()
            .ok_or(ClientError::MissingData {
                field: "environmentByName",
            })?;
        Ok(Environment {
            id,
            name: name.to_string(),
        })
    }

    async fn add_groups_to_project(
        &self,
        input: &ProjectGroupsInput,
    ) -> platform_client::Result<Project> {
        self.log(Call::AddGroupsToProject {
            project: input.project.name.clone(),
            groups: input.groups.iter().map(|g| g.name.clone()).collect(),
        });
        self.fail_if(&format!("project-groups:{}", input.project.name))?;
        Ok(Project {
            id: 0,
            name: input.project.name.clone(),
        })
    }

    async fn add_project_to_billing_group(
        &self,
        input: &ProjectBillingGroupInput,
    ) -> platform_client::Result<Project> {
        self.log(Call::AddProjectToBillingGroup {
            project: input.project.name.clone(),
            group: input.group.name.clone(),
        });
        self.fail_if(&format!("project-billing:{}", input.project.name))?;
        Ok(Project {
            id: 0,
            name: input.project.name.clone(),
        })
    }

    async fn add_notification_to_project(
        &self,
        input: &AddNotificationToProjectInput,
    ) -> platform_client::Result<Project> {
        self.log(Call::AddNotificationToProject {
            project: input.project.clone(),
            name: input.notification_name.clone(),
            kind: input.notification_type,
        });
        self.fail_if(&format!("project-notification:{}", input.notification_name))?;
        Ok(Project {
            id: 0,
            name: input.project.clone(),
        })
    }

    async fn deploy_environment_branch(
        &self,
        _project: &str,
        _branch: &str,
    ) -> platform_client::Result<String> {
        Ok(String::new())
    }

    async fn delete_environment(
        &self,
        _project: &str,
        _environment: &str,
    ) -> platform_client::Result<String> {
        Ok(String::new())
    }
}

fn options(keep_going: bool) -> ImportOptions {
    ImportOptions {
        keep_going,
        cluster_id: 3,
    }
}

fn full_config() -> Config {
    parser::parse_str(
        r#"
billingGroups:
  - name: acme-billing
    currency: USD
groups:
  - name: acme
    users:
      - email: dev@acme.example
        role: DEVELOPER
users:
  - email: dev@acme.example
    sshKeys:
      - name: laptop
        keyValue: AAAAB3Nza
        keyType: SSH_RSA
notifications:
  slack:
    - name: acme-slack
      webhook: https://hooks.example/s
      channel: deploys
  rocketChat:
    - name: acme-rc
      webhook: https://hooks.example/r
      channel: deploys
projects:
  - name: demo
    gitUrl: git@git.example:acme/demo.git
    productionEnvironment: main
    cluster: 99
    envVariables:
      - name: API_KEY
        value: secret
    environments:
      - name: main
        deployType: BRANCH
        environmentType: PRODUCTION
        envVariables:
          - name: DEBUG
            value: "false"
    groups:
      - acme
    billingGroups:
      - acme-billing
    users:
      - email: dev@acme.example
        role: MAINTAINER
    notifications:
      slack:
        - acme-slack
"#,
    )
    .unwrap()
}

#[tokio::test]
async fn full_tree_runs_every_phase_in_order() {
    let fake = FakePlatform::new();
    let config = full_config();

    let report = import(&fake, &config, options(false), CancellationToken::new())
        .await
        .unwrap();

    assert!(report.is_clean());
    // The declared cluster (99) is overridden by the run default (3),
    // and resolved ids flow into dependent operations: the project gets
    // id 100, the environment id 101.
    assert_eq!(
        fake.calls(),
        vec![
            Call::AddBillingGroup("acme-billing".into()),
            Call::AddGroup("acme".into()),
            Call::AddUser("dev@acme.example".into()),
            Call::AddSshKey {
                key: "laptop".into(),
                user: "dev@acme.example".into(),
            },
            Call::AddUserToGroup {
                email: "dev@acme.example".into(),
                group: "acme".into(),
            },
            Call::AddNotificationSlack("acme-slack".into()),
            Call::AddNotificationRocketChat("acme-rc".into()),
            Call::AddProject {
                name: "demo".into(),
                cluster: 3,
            },
            Call::AddEnvVariable {
                name: "API_KEY".into(),
                scope: EnvVarScope::Project,
                type_id: 100,
            },
            Call::AddOrUpdateEnvironment {
                name: "main".into(),
                project_id: 100,
            },
            Call::AddEnvVariable {
                name: "DEBUG".into(),
                scope: EnvVarScope::Environment,
                type_id: 101,
            },
            Call::AddGroupsToProject {
                project: "demo".into(),
                groups: vec!["acme".into()],
            },
            Call::AddProjectToBillingGroup {
                project: "demo".into(),
                group: "acme-billing".into(),
            },
            Call::AddUserToGroup {
                email: "dev@acme.example".into(),
                group: "project-demo".into(),
            },
            Call::AddNotificationToProject {
                project: "demo".into(),
                name: "acme-slack".into(),
                kind: NotificationType::Slack,
            },
        ]
    );
}

#[tokio::test]
async fn worked_example_issues_expected_calls() {
    // One project "demo" with one environment "main" and two
    // project-level variables, against an empty remote state.
    let config = parser::parse_str(
        r#"
projects:
  - name: demo
    gitUrl: git@git.example:acme/demo.git
    productionEnvironment: main
    envVariables:
      - name: API_KEY
        value: secret
      - name: REGION
        value: eu-west-1
    environments:
      - name: main
        deployType: BRANCH
        environmentType: PRODUCTION
        envVariables:
          - name: DEBUG
            value: "false"
"#,
    )
    .unwrap();
    let fake = FakePlatform::new();

    let report = import(&fake, &config, options(false), CancellationToken::new())
        .await
        .unwrap();

    assert!(report.is_clean());
    let calls = fake.calls();
    assert_eq!(
        calls
            .iter()
            .filter(|c| matches!(c, Call::AddProject { .. }))
            .count(),
        1
    );
    assert_eq!(
        calls
            .iter()
            .filter(|c| matches!(c, Call::AddOrUpdateEnvironment { .. }))
            .count(),
        1
    );
    // Project id 100 flows into both project variables and the
    // environment create; the environment id 101 into its variable.
    assert!(calls.contains(&Call::AddEnvVariable {
        name: "API_KEY".into(),
        scope: EnvVarScope::Project,
        type_id: 100,
    }));
    assert!(calls.contains(&Call::AddEnvVariable {
        name: "REGION".into(),
        scope: EnvVarScope::Project,
        type_id: 100,
    }));
    assert!(calls.contains(&Call::AddOrUpdateEnvironment {
        name: "main".into(),
        project_id: 100,
    }));
    assert!(calls.contains(&Call::AddEnvVariable {
        name: "DEBUG".into(),
        scope: EnvVarScope::Environment,
        type_id: 101,
    }));
}

#[tokio::test]
async fn project_conflict_resolves_via_single_lookup() {
    let fake = FakePlatform::new().with_conflict("project:demo", 777);
    let config = full_config();

    let report = import(&fake, &config, options(true), CancellationToken::new())
        .await
        .unwrap();

    let calls = fake.calls();
    // Exactly one creation attempt and one lookup, never a retry.
    assert_eq!(
        calls
            .iter()
            .filter(|c| matches!(c, Call::AddProject { .. }))
            .count(),
        1
    );
    assert_eq!(
        calls
            .iter()
            .filter(|c| matches!(c, Call::ProjectByName(_)))
            .count(),
        1
    );
    // Every dependent operation uses the looked-up id.
    assert!(calls.contains(&Call::AddEnvVariable {
        name: "API_KEY".into(),
        scope: EnvVarScope::Project,
        type_id: 777,
    }));
    assert!(calls.contains(&Call::AddOrUpdateEnvironment {
        name: "main".into(),
        project_id: 777,
    }));
    // And the report says the project was resolved, not created.
    let record = report
        .records
        .iter()
        .find(|r| r.entity == "demo")
        .unwrap();
    assert_eq!(record.outcome, StepOutcome::Resolved { id: 777 });
}

#[tokio::test]
async fn project_conflict_is_fatal_without_keep_going() {
    let fake = FakePlatform::new().with_conflict("project:demo", 777);
    let config = full_config();

    let err = import(&fake, &config, options(false), CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Operation { context, source, .. } => {
            assert_eq!(context, "project exists");
            assert!(source.is_already_exists());
        }
        other => panic!("unexpected error: {other}"),
    }
    // No fallback lookup is attempted when the run is already fatal.
    assert!(
        !fake
            .calls()
            .iter()
            .any(|c| matches!(c, Call::ProjectByName(_)))
    );
}

#[tokio::test]
async fn failed_project_lookup_is_fatal_even_with_keep_going() {
    let fake = FakePlatform::new()
        .with_conflict("project:demo", 777)
        .with_failure("project-lookup:demo");
    let config = full_config();

    let err = import(&fake, &config, options(true), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ProjectLookup { .. }));
}

#[tokio::test]
async fn multiple_billing_groups_are_fatal_regardless_of_keep_going() {
    let config = parser::parse_str(
        r#"
projects:
  - name: demo
    gitUrl: git@git.example:acme/demo.git
    productionEnvironment: main
    billingGroups:
      - billing-a
      - billing-b
"#,
    )
    .unwrap();

    for keep_going in [false, true] {
        let fake = FakePlatform::new();
        let err = import(&fake, &config, options(keep_going), CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            Error::MultipleBillingGroups { project, groups } => {
                assert_eq!(project, "demo");
                assert_eq!(groups, vec!["billing-a", "billing-b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Validation fires before any remote operation for the project.
        assert!(fake.calls().is_empty());
    }
}

#[tokio::test]
async fn keep_going_isolates_independent_failures() {
    let fake = FakePlatform::new().with_failure("user:dev@acme.example");
    let config = full_config();

    let report = import(&fake, &config, options(true), CancellationToken::new())
        .await
        .unwrap();

    // The failing user is recorded as skipped...
    let skipped: Vec<_> = report.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].entity, "dev@acme.example");
    // ...but later phases still ran in full.
    let calls = fake.calls();
    assert!(calls.iter().any(|c| matches!(c, Call::AddSshKey { .. })));
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, Call::AddProject { .. }))
    );
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, Call::AddNotificationToProject { .. }))
    );
}

#[tokio::test]
async fn first_failure_short_circuits_without_keep_going() {
    let fake = FakePlatform::new().with_failure("user:dev@acme.example");
    let config = full_config();

    let err = import(&fake, &config, options(false), CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Operation { context, entity, .. } => {
            assert_eq!(context, "couldn't add user");
            assert_eq!(entity, "dev@acme.example");
        }
        other => panic!("unexpected error: {other}"),
    }
    // Nothing past the failing call was attempted.
    assert_eq!(
        fake.calls(),
        vec![
            Call::AddBillingGroup("acme-billing".into()),
            Call::AddGroup("acme".into()),
            Call::AddUser("dev@acme.example".into()),
        ]
    );
}

#[tokio::test]
async fn rerun_against_populated_remote_resolves_instead_of_creating() {
    // Second run of a fully applied configuration: creates that do not
    // classify conflicts fail with generic duplicate errors, while
    // project and environment creation reports existence conflicts.
    let fake = FakePlatform::new()
        .with_conflict("project:demo", 500)
        .with_conflict("environment:main", 600)
        .with_failure("billing-group:acme-billing")
        .with_failure("group:acme")
        .with_failure("user:dev@acme.example")
        .with_failure("ssh-key:laptop")
        .with_failure("slack:acme-slack")
        .with_failure("rocketchat:acme-rc");
    let config = full_config();

    let report = import(&fake, &config, options(true), CancellationToken::new())
        .await
        .unwrap();

    let resolved: Vec<_> = report
        .records
        .iter()
        .filter(|r| matches!(r.outcome, StepOutcome::Resolved { .. }))
        .collect();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].entity, "demo");
    assert_eq!(resolved[1].entity, "main");

    // Variable attachment reuses the looked-up ids.
    let calls = fake.calls();
    assert!(calls.contains(&Call::AddEnvVariable {
        name: "API_KEY".into(),
        scope: EnvVarScope::Project,
        type_id: 500,
    }));
    assert!(calls.contains(&Call::AddEnvVariable {
        name: "DEBUG".into(),
        scope: EnvVarScope::Environment,
        type_id: 600,
    }));
}

#[tokio::test]
async fn environment_conflict_looks_up_with_resolved_project_id() {
    let fake = FakePlatform::new().with_conflict("environment:main", 888);
    let config = full_config();

    let report = import(&fake, &config, options(true), CancellationToken::new())
        .await
        .unwrap();

    let calls = fake.calls();
    // The lookup is keyed on the project's resolved id (100), not on
    // anything in the document.
    assert!(calls.contains(&Call::EnvironmentByName {
        name: "main".into(),
        project_id: 100,
    }));
    assert!(calls.contains(&Call::AddEnvVariable {
        name: "DEBUG".into(),
        scope: EnvVarScope::Environment,
        type_id: 888,
    }));
    assert!(
        report
            .records
            .iter()
            .any(|r| r.outcome == StepOutcome::Resolved { id: 888 })
    );
}

#[tokio::test]
async fn failed_environment_skips_its_variables_only() {
    let config = parser::parse_str(
        r#"
projects:
  - name: demo
    gitUrl: git@git.example:acme/demo.git
    productionEnvironment: main
    environments:
      - name: broken
        deployType: BRANCH
        environmentType: DEVELOPMENT
        envVariables:
          - name: UNREACHED
            value: "1"
      - name: main
        deployType: BRANCH
        environmentType: PRODUCTION
        envVariables:
          - name: DEBUG
            value: "false"
"#,
    )
    .unwrap();
    let fake = FakePlatform::new().with_failure("environment:broken");

    let report = import(&fake, &config, options(true), CancellationToken::new())
        .await
        .unwrap();

    let calls = fake.calls();
    // The broken environment's variable is never attached, but the next
    // environment proceeds normally.
    assert!(
        !calls
            .iter()
            .any(|c| matches!(c, Call::AddEnvVariable { name, .. } if name == "UNREACHED"))
    );
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, Call::AddEnvVariable { name, .. } if name == "DEBUG"))
    );
    assert_eq!(report.skipped().count(), 1);
}

#[tokio::test]
async fn cancelled_run_fails_before_issuing_calls() {
    let fake = FakePlatform::new();
    let config = full_config();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = import(&fake, &config, options(false), cancel)
        .await
        .unwrap_err();

    match err {
        Error::Operation { source, .. } => {
            assert!(matches!(source, ClientError::Cancelled));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn empty_config_is_a_clean_noop() {
    let fake = FakePlatform::new();
    let config = parser::parse_str("projects: []").unwrap();

    let report = import(&fake, &config, options(false), CancellationToken::new())
        .await
        .unwrap();

    assert!(report.records.is_empty());
    assert!(fake.calls().is_empty());
}
