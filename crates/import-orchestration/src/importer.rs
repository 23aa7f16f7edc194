//! The import run: a fixed sequence of phases over the configuration
//! tree, strictly sequential so each phase can rely on the resolved ids
//! produced by earlier ones.

use std::future::Future;

use import_config::{
    AddNotificationToProjectInput, AddSshKeyInput, Config, EnvKeyValue, EnvVarScope,
    EnvVariableInput, GroupInput, NotificationType, ProjectBillingGroupInput, ProjectGroupsInput,
    ProjectInput, UserGroupRoleInput,
};
use platform_client::{ClientError, ResourceClient};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::report::{ImportReport, Step, StepOutcome};
use crate::{Error, Result};

/// Settings for a single import run.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// When true, individual step failures are recorded and skipped
    /// instead of aborting the run. Conflict-resolution lookups and the
    /// billing-group cardinality check stay fatal regardless.
    pub keep_going: bool,
    /// Default target-platform cluster id applied to every project,
    /// overriding whatever the document declares.
    pub cluster_id: u32,
}

/// Provision every resource in `config` against the remote platform.
///
/// Phases run in a fixed order so that parents exist before children:
/// billing groups, groups, users, SSH keys, group memberships, global
/// notifications, then each project with its variables, environments,
/// and associations. Returns the per-step [`ImportReport`] on
/// completion, or the first fatal error.
pub async fn import<C>(
    client: &C,
    config: &Config,
    options: ImportOptions,
    cancel: CancellationToken,
) -> Result<ImportReport>
where
    C: ResourceClient + ?Sized,
{
    let mut run = Run {
        client,
        keep_going: options.keep_going,
        cluster_id: options.cluster_id,
        cancel,
        report: ImportReport::default(),
    };
    run.execute(config).await?;
    Ok(run.report)
}

struct Run<'a, C: ?Sized> {
    client: &'a C,
    keep_going: bool,
    cluster_id: u32,
    cancel: CancellationToken,
    report: ImportReport,
}

impl<C: ResourceClient + ?Sized> Run<'_, C> {
    async fn execute(&mut self, config: &Config) -> Result<()> {
        info!(
            keep_going = self.keep_going,
            cluster_id = self.cluster_id,
            "starting import run"
        );

        self.add_billing_groups(config).await?;
        self.add_groups(config).await?;
        self.add_users(config).await?;
        self.add_ssh_keys(config).await?;
        self.add_group_members(config).await?;
        self.add_notifications(config).await?;
        self.add_projects(config).await?;

        info!(
            steps = self.report.records.len(),
            skipped = self.report.skipped().count(),
            "import run complete"
        );
        Ok(())
    }

    async fn add_billing_groups(&mut self, config: &Config) -> Result<()> {
        let client = self.client;
        for bg in &config.billing_groups {
            self.attempt(Step::BillingGroup, &bg.name, client.add_billing_group(bg))
                .await?;
        }
        Ok(())
    }

    async fn add_groups(&mut self, config: &Config) -> Result<()> {
        let client = self.client;
        for group in &config.groups {
            self.attempt(Step::Group, &group.group.name, client.add_group(&group.group))
                .await?;
        }
        Ok(())
    }

    async fn add_users(&mut self, config: &Config) -> Result<()> {
        let client = self.client;
        for user in &config.users {
            self.attempt(Step::User, &user.user.email, client.add_user(&user.user))
                .await?;
        }
        Ok(())
    }

    // SSH keys are a separate phase: every user must exist first.
    async fn add_ssh_keys(&mut self, config: &Config) -> Result<()> {
        let client = self.client;
        for user in &config.users {
            for key in &user.ssh_keys {
                let input = AddSshKeyInput {
                    ssh_key: key.clone(),
                    user_email: user.user.email.clone(),
                };
                self.attempt(Step::SshKey, &key.name, client.add_ssh_key(&input))
                    .await?;
            }
        }
        Ok(())
    }

    async fn add_group_members(&mut self, config: &Config) -> Result<()> {
        let client = self.client;
        for group in &config.groups {
            for member in &group.users {
                let input = UserGroupRoleInput {
                    user_email: member.email.clone(),
                    group_name: group.group.name.clone(),
                    group_role: member.role,
                };
                let entity = format!("{} -> {}", member.email, group.group.name);
                self.attempt(Step::GroupMember, &entity, client.add_user_to_group(&input))
                    .await?;
            }
        }
        Ok(())
    }

    async fn add_notifications(&mut self, config: &Config) -> Result<()> {
        let Some(notifications) = &config.notifications else {
            return Ok(());
        };
        let client = self.client;
        for n in &notifications.slack {
            self.attempt(
                Step::NotificationSlack,
                &n.name,
                client.add_notification_slack(n),
            )
            .await?;
        }
        for n in &notifications.rocket_chat {
            self.attempt(
                Step::NotificationRocketChat,
                &n.name,
                client.add_notification_rocket_chat(n),
            )
            .await?;
        }
        for n in &notifications.email {
            self.attempt(
                Step::NotificationEmail,
                &n.name,
                client.add_notification_email(n),
            )
            .await?;
        }
        for n in &notifications.microsoft_teams {
            self.attempt(
                Step::NotificationMicrosoftTeams,
                &n.name,
                client.add_notification_microsoft_teams(n),
            )
            .await?;
        }
        Ok(())
    }

    async fn add_projects(&mut self, config: &Config) -> Result<()> {
        let client = self.client;
        for p in &config.projects {
            let name = &p.project.name;

            // Ambiguous billing association. Checked before any remote
            // operation for this project, and never skippable.
            if p.billing_groups.len() > 1 {
                return Err(Error::MultipleBillingGroups {
                    project: name.clone(),
                    groups: p.billing_groups.clone(),
                });
            }

            let mut input = p.project.clone();
            input.cluster = self.cluster_id;

            let project_id = match self.guarded(client.add_project(&input)).await {
                Ok(created) => {
                    self.report
                        .push(Step::Project, name.as_str(), StepOutcome::Created);
                    created.id
                }
                Err(err) if err.is_already_exists() => {
                    if !self.keep_going {
                        return Err(Error::Operation {
                            context: "project exists",
                            entity: name.clone(),
                            source: err,
                        });
                    }
                    // One-shot fallback; a failed lookup is fatal because
                    // every child operation needs the resolved id.
                    let existing = self
                        .guarded(client.project_by_name(name))
                        .await
                        .map_err(|source| Error::ProjectLookup {
                            name: name.clone(),
                            source,
                        })?;
                    info!(project = %name, id = existing.id, "project exists, using id from lookup");
                    self.report.push(
                        Step::Project,
                        name.as_str(),
                        StepOutcome::Resolved { id: existing.id },
                    );
                    existing.id
                }
                Err(err) => {
                    // Without a project id none of the dependent steps
                    // can run; skip the whole project.
                    self.skip_or_fail(Step::Project, name, err)?;
                    continue;
                }
            };

            for ev in &p.env_variables {
                self.add_env_variable(Step::ProjectEnvVariable, ev, EnvVarScope::Project, project_id)
                    .await?;
            }

            self.add_environments(p, project_id).await?;

            if !p.groups.is_empty() {
                let input = ProjectGroupsInput {
                    project: ProjectInput { name: name.clone() },
                    groups: p
                        .groups
                        .iter()
                        .map(|g| GroupInput { name: g.clone() })
                        .collect(),
                };
                self.attempt(Step::ProjectGroups, name, client.add_groups_to_project(&input))
                    .await?;
            }

            for bg_name in &p.billing_groups {
                let input = ProjectBillingGroupInput {
                    group: GroupInput {
                        name: bg_name.clone(),
                    },
                    project: ProjectInput { name: name.clone() },
                };
                let entity = format!("{name} -> {bg_name}");
                self.attempt(
                    Step::ProjectBillingGroup,
                    &entity,
                    client.add_project_to_billing_group(&input),
                )
                .await?;
            }

            // Project members go into the implicit project-scoped group.
            for member in &p.users {
                let input = UserGroupRoleInput {
                    user_email: member.email.clone(),
                    group_name: format!("project-{name}"),
                    group_role: member.role,
                };
                self.attempt(Step::ProjectUser, &member.email, client.add_user_to_group(&input))
                    .await?;
            }

            self.add_project_notifications(p).await?;
        }
        Ok(())
    }

    async fn add_environments(
        &mut self,
        p: &import_config::ProjectConfig,
        project_id: u32,
    ) -> Result<()> {
        let client = self.client;
        for env in &p.environments {
            let env_name = &env.environment.name;
            let mut input = env.environment.clone();
            input.project_id = project_id;

            let environment_id = match self.guarded(client.add_or_update_environment(&input)).await
            {
                Ok(created) => {
                    self.report
                        .push(Step::Environment, env_name.as_str(), StepOutcome::Created);
                    Some(created.id)
                }
                Err(err) if err.is_already_exists() => {
                    if !self.keep_going {
                        return Err(Error::Operation {
                            context: "environment exists",
                            entity: env_name.clone(),
                            source: err,
                        });
                    }
                    info!(
                        environment = %env_name,
                        project = %p.project.name,
                        "environment exists, querying by name for id"
                    );
                    let existing = self
                        .guarded(client.environment_by_name(env_name, project_id))
                        .await
                        .map_err(|source| Error::EnvironmentLookup {
                            name: env_name.clone(),
                            source,
                        })?;
                    self.report.push(
                        Step::Environment,
                        env_name.as_str(),
                        StepOutcome::Resolved { id: existing.id },
                    );
                    Some(existing.id)
                }
                Err(err) => {
                    self.skip_or_fail(Step::Environment, env_name, err)?;
                    None
                }
            };

            // No resolved id, no variable attachment.
            let Some(environment_id) = environment_id else {
                continue;
            };

            for ev in &env.env_variables {
                self.add_env_variable(
                    Step::EnvironmentEnvVariable,
                    ev,
                    EnvVarScope::Environment,
                    environment_id,
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn add_env_variable(
        &mut self,
        step: Step,
        ev: &EnvKeyValue,
        scope: EnvVarScope,
        type_id: u32,
    ) -> Result<()> {
        let client = self.client;
        let input = EnvVariableInput {
            env_key_value: ev.clone(),
            scope,
            type_id,
        };
        self.attempt(step, &ev.name, client.add_env_variable(&input))
            .await?;
        Ok(())
    }

    async fn add_project_notifications(
        &mut self,
        p: &import_config::ProjectConfig,
    ) -> Result<()> {
        let Some(notifications) = &p.notifications else {
            return Ok(());
        };
        let kinds = [
            (NotificationType::Slack, &notifications.slack),
            (NotificationType::RocketChat, &notifications.rocket_chat),
            (NotificationType::Email, &notifications.email),
            (NotificationType::MicrosoftTeams, &notifications.microsoft_teams),
        ];
        let client = self.client;
        for (kind, names) in kinds {
            for notification_name in names {
                let input = AddNotificationToProjectInput {
                    project: p.project.name.clone(),
                    notification_type: kind,
                    notification_name: notification_name.clone(),
                };
                self.attempt(
                    Step::ProjectNotification,
                    notification_name,
                    client.add_notification_to_project(&input),
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Run one step under the uniform failure policy: record success,
    /// or hand the failure to [`Run::skip_or_fail`].
    async fn attempt<T, F>(&mut self, step: Step, entity: &str, call: F) -> Result<Option<T>>
    where
        F: Future<Output = platform_client::Result<T>>,
    {
        match self.guarded(call).await {
            Ok(out) => {
                self.report.push(step, entity, StepOutcome::Created);
                Ok(Some(out))
            }
            Err(err) => {
                self.skip_or_fail(step, entity, err)?;
                Ok(None)
            }
        }
    }

    /// The two-branch failure rule: fatal when `keep_going` is off,
    /// otherwise logged and recorded as skipped.
    fn skip_or_fail(&mut self, step: Step, entity: &str, err: ClientError) -> Result<()> {
        if !self.keep_going {
            return Err(Error::Operation {
                context: step.context(),
                entity: entity.to_string(),
                source: err,
            });
        }
        warn!("{} '{}': {}", step.context(), entity, err);
        self.report.push(
            step,
            entity,
            StepOutcome::Skipped {
                reason: err.to_string(),
            },
        );
        Ok(())
    }

    /// Race a remote call against run cancellation.
    async fn guarded<T, F>(&self, call: F) -> platform_client::Result<T>
    where
        F: Future<Output = platform_client::Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            result = call => result,
        }
    }
}
