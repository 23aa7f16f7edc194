//! The `deploy` and `delete-environment` subcommands.

use anyhow::{Context, Result};
use platform_client::ResourceClient;
use tracing::info;

use crate::Connection;

pub async fn deploy(connection: Connection, project: &str, branch: &str) -> Result<()> {
    let client = super::client(connection)?;
    let result = client
        .deploy_environment_branch(project, branch)
        .await
        .with_context(|| format!("couldn't deploy branch '{branch}' of project '{project}'"))?;
    info!(project, branch, "deployment triggered");
    if !result.is_empty() {
        println!("{result}");
    }
    Ok(())
}

pub async fn delete(connection: Connection, project: &str, environment: &str) -> Result<()> {
    let client = super::client(connection)?;
    let result = client
        .delete_environment(project, environment)
        .await
        .with_context(|| {
            format!("couldn't delete environment '{environment}' of project '{project}'")
        })?;
    info!(project, environment, "environment deleted");
    if !result.is_empty() {
        println!("{result}");
    }
    Ok(())
}
