//! The `import` subcommand: run the orchestrator and render its report.

use anyhow::{Context, Result};
use comfy_table::Table;
use import_config::parser;
use import_orchestration::{ImportOptions, ImportReport, import};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::Connection;

pub async fn run(
    config_path: &Path,
    connection: Connection,
    cluster_id: u32,
    keep_going: bool,
) -> Result<()> {
    let config = parser::parse_file(config_path)
        .with_context(|| format!("couldn't load configuration from {}", config_path.display()))?;
    let client = super::client(connection)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling import");
            interrupt.cancel();
        }
    });

    let options = ImportOptions {
        keep_going,
        cluster_id,
    };
    let report = import(&client, &config, options, cancel)
        .await
        .context("import failed")?;

    render(&report);
    Ok(())
}

fn render(report: &ImportReport) {
    if report.records.is_empty() {
        println!("nothing to import");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["step", "entity", "outcome"]);
    for record in &report.records {
        table.add_row(vec![
            record.step.to_string(),
            record.entity.clone(),
            record.outcome.to_string(),
        ]);
    }
    println!("{table}");

    let skipped = report.skipped().count();
    if skipped > 0 {
        warn!("{skipped} step(s) were skipped; see the report above");
    }
}
