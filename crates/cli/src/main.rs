mod cli;
mod render;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use stockbook_infra::{
    DatabaseConfig, InventoryService, InventoryStore, PostgresInventoryStore, is_success,
};

use crate::cli::{Cli, Command, ItemArgs};

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();
    let cli = Cli::parse();
    stockbook_observability::init(cli.log_format);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load `.env` from the working directory, if present, so clap's
/// `DATABASE_URL` fallback sees it. Variables already set win.
fn load_dotenv() {
    dotenv::dotenv().ok();
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    // clap already falls back to the DATABASE_URL environment variable.
    let url = cli.database_url;
    let config = DatabaseConfig::from_lookup(|_| url.clone())
        .context("no database configured; pass --database-url or set DATABASE_URL")?;
    tracing::debug!(?config, "database configured");

    let service = InventoryService::new(PostgresInventoryStore::new(config));
    let mut stdout = std::io::stdout().lock();
    execute(&service, cli.command, &mut stdout).await
}

/// Run one command against `service`, writing its output to `out`.
///
/// Returns whether the command succeeded; listings always do since storage
/// failures there degrade to an empty list.
async fn execute<S, W>(
    service: &InventoryService<S>,
    command: Command,
    out: &mut W,
) -> anyhow::Result<bool>
where
    S: InventoryStore,
    W: Write,
{
    match command {
        Command::InitDb => report(out, &service.create_tables().await),
        Command::Items { json } => {
            let items = service.fetch_inventory().await;
            if json {
                serde_json::to_writer_pretty(&mut *out, &items)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", render::inventory_table(&items))?;
            }
            Ok(true)
        }
        Command::Ledger { json } => {
            let entries = service.fetch_ledger().await;
            if json {
                serde_json::to_writer_pretty(&mut *out, &entries)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", render::ledger_table(&entries))?;
            }
            Ok(true)
        }
        Command::Add(args) => {
            let status = match args.to_form().parse() {
                Ok(details) => {
                    service
                        .add_inventory_item(
                            &details.name,
                            &details.category,
                            details.quantity,
                            details.price,
                        )
                        .await
                }
                Err(err) => rejected_form(&args, err.message()),
            };
            report(out, &status)
        }
        Command::Update { id, item } => {
            let status = match item.to_form().parse() {
                Ok(details) => {
                    service
                        .update_inventory_item(
                            id,
                            &details.name,
                            &details.category,
                            details.quantity,
                            details.price,
                        )
                        .await
                }
                Err(err) => rejected_form(&item, err.message()),
            };
            report(out, &status)
        }
        Command::Delete { id } => report(out, &service.delete_inventory_item(id).await),
    }
}

fn rejected_form(args: &ItemArgs, message: &str) -> String {
    tracing::warn!(name = %args.name, "rejected item form");
    message.to_string()
}

fn report<W: Write>(out: &mut W, status: &str) -> anyhow::Result<bool> {
    writeln!(out, "{status}")?;
    Ok(is_success(status))
}
