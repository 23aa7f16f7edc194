//! # Import Orchestration
//!
//! Dependency-ordered provisioning of a configuration tree against the
//! remote resource API.
//!
//! The orchestrator executes a fixed sequence of phases (billing groups,
//! groups, users, SSH keys, memberships, notifications, then projects
//! with everything attached to them), strictly sequentially, so that
//! every child operation runs only after its parent's server-assigned id
//! is known. Existence conflicts on project and environment creation are
//! resolved with a one-shot fallback lookup; all other failures follow
//! the `keep_going` policy.
//!
//! ## Example
//!
//! ```rust,no_run
//! use import_orchestration::{ImportOptions, import};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(client: platform_client::GraphQlClient) -> Result<(), Box<dyn std::error::Error>> {
//! let config = import_config::parser::parse_file("import.yaml")?;
//! let options = ImportOptions { keep_going: true, cluster_id: 3 };
//! let report = import(&client, &config, options, CancellationToken::new()).await?;
//! for record in report.skipped() {
//!     eprintln!("skipped {}: {}", record.entity, record.outcome);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod importer;
mod report;

pub use importer::{ImportOptions, import};
pub use report::{ImportReport, Step, StepOutcome, StepRecord};

use platform_client::ClientError;
use thiserror::Error;

/// Fatal errors that abort an import run.
#[derive(Debug, Error)]
pub enum Error {
    /// A remote operation failed and the failure policy does not allow
    /// skipping it
    #[error("{context} '{entity}': {source}")]
    Operation {
        /// Phase-identifying prefix
        context: &'static str,
        /// Name of the entity being processed
        entity: String,
        /// The underlying client failure
        #[source]
        source: ClientError,
    },

    /// The fallback lookup for an existing project failed. Always fatal,
    /// since dependent operations cannot proceed without a resolved id.
    #[error("couldn't get project '{name}' by name: {source}")]
    ProjectLookup {
        /// Project name
        name: String,
        /// The underlying client failure
        #[source]
        source: ClientError,
    },

    /// The fallback lookup for an existing environment failed. Always
    /// fatal, for the same reason as project lookups.
    #[error("couldn't get environment '{name}' by name: {source}")]
    EnvironmentLookup {
        /// Environment name
        name: String,
        /// The underlying client failure
        #[source]
        source: ClientError,
    },

    /// A project declared more than one billing group. Always fatal,
    /// even under `keep_going`: the billing association would be
    /// ambiguous.
    #[error("project '{project}' can only have one billing group: {groups:?}")]
    MultipleBillingGroups {
        /// Project name
        project: String,
        /// The declared billing group names
        groups: Vec<String>,
    },
}

/// Result type for orchestration operations
pub type Result<T> = std::result::Result<T, Error>;
