//! Structured per-step outcome records.
//!
//! Every attempted remote operation appends one record, so a caller can
//! render exactly what happened without scraping log output.

use std::fmt;

/// The kind of step a record belongs to, one per operation in the import
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Billing group creation
    BillingGroup,
    /// Group creation
    Group,
    /// User creation
    User,
    /// SSH key attachment
    SshKey,
    /// Group membership
    GroupMember,
    /// Global Slack notification creation
    NotificationSlack,
    /// Global RocketChat notification creation
    NotificationRocketChat,
    /// Global Email notification creation
    NotificationEmail,
    /// Global Microsoft Teams notification creation
    NotificationMicrosoftTeams,
    /// Project creation
    Project,
    /// Project-scoped variable attachment
    ProjectEnvVariable,
    /// Environment create-or-update
    Environment,
    /// Environment-scoped variable attachment
    EnvironmentEnvVariable,
    /// Bulk group-to-project association
    ProjectGroups,
    /// Project-to-billing-group association
    ProjectBillingGroup,
    /// Membership in the project's implicit group
    ProjectUser,
    /// Notification-to-project attachment
    ProjectNotification,
}

impl Step {
    /// The phase-identifying prefix used when a step failure is surfaced
    /// or logged.
    pub fn context(&self) -> &'static str {
        match self {
            Step::BillingGroup => "couldn't add billing group",
            Step::Group => "couldn't add group",
            Step::User => "couldn't add user",
            Step::SshKey => "couldn't add SSH key",
            Step::GroupMember => "couldn't add user to group",
            Step::NotificationSlack => "couldn't add Slack notification",
            Step::NotificationRocketChat => "couldn't add RocketChat notification",
            Step::NotificationEmail => "couldn't add Email notification",
            Step::NotificationMicrosoftTeams => "couldn't add Microsoft Teams notification",
            Step::Project => "couldn't add project",
            Step::ProjectEnvVariable => "couldn't add project env variable",
            Step::Environment => "couldn't add environment",
            Step::EnvironmentEnvVariable => "couldn't add environment env variable",
            Step::ProjectGroups => "couldn't add groups to project",
            Step::ProjectBillingGroup => "couldn't add project to billing group",
            Step::ProjectUser => "couldn't add user to project group",
            Step::ProjectNotification => "couldn't add notification to project",
        }
    }

    /// Short label for report rendering.
    pub fn label(&self) -> &'static str {
        match self {
            Step::BillingGroup => "billing group",
            Step::Group => "group",
            Step::User => "user",
            Step::SshKey => "ssh key",
            Step::GroupMember => "group member",
            Step::NotificationSlack => "slack notification",
            Step::NotificationRocketChat => "rocketchat notification",
            Step::NotificationEmail => "email notification",
            Step::NotificationMicrosoftTeams => "teams notification",
            Step::Project => "project",
            Step::ProjectEnvVariable => "project variable",
            Step::Environment => "environment",
            Step::EnvironmentEnvVariable => "environment variable",
            Step::ProjectGroups => "project groups",
            Step::ProjectBillingGroup => "project billing group",
            Step::ProjectUser => "project user",
            Step::ProjectNotification => "project notification",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a single step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The resource was created (or the association applied)
    Created,
    /// The resource already existed; its id was resolved via lookup
    Resolved {
        /// The id returned by the fallback lookup
        id: u32,
    },
    /// The step failed non-fatally and was skipped under `keep_going`
    Skipped {
        /// The failure that caused the skip
        reason: String,
    },
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Created => f.write_str("created"),
            StepOutcome::Resolved { id } => write!(f, "already exists, resolved id {id}"),
            StepOutcome::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// One attempted step and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Which operation was attempted
    pub step: Step,
    /// The entity the operation was attempted for
    pub entity: String,
    /// How the attempt ended
    pub outcome: StepOutcome,
}

/// The aggregate outcome of an import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Records in execution order, one per attempted step
    pub records: Vec<StepRecord>,
}

impl ImportReport {
    pub(crate) fn push(&mut self, step: Step, entity: impl Into<String>, outcome: StepOutcome) {
        self.records.push(StepRecord {
            step,
            entity: entity.into(),
            outcome,
        });
    }

    /// Records for steps that were skipped under `keep_going`.
    pub fn skipped(&self) -> impl Iterator<Item = &StepRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, StepOutcome::Skipped { .. }))
    }

    /// Whether every attempted step succeeded (created or resolved).
    pub fn is_clean(&self) -> bool {
        self.skipped().next().is_none()
    }
}
