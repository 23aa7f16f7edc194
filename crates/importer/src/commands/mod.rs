//! Subcommand implementations.

pub mod environment;
pub mod import;
pub mod validate;

use crate::Connection;
use anyhow::Result;
use platform_client::GraphQlClient;

/// Build a resource API client from the shared connection arguments.
pub fn client(connection: Connection) -> Result<GraphQlClient> {
    Ok(GraphQlClient::new(connection.endpoint, connection.token)?)
}
