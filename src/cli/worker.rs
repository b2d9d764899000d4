//! Worker command

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde_json::{json, Value};
use tracing::debug;

use crate::api::models::{IdRef, WorkerRoute};
use crate::api::{encode_segment, ApiResponse};
use crate::cli::{render, Context};
use crate::error::CfmError;
use crate::output::{self, Table};

#[derive(Args, Debug)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommand,
}

#[derive(Subcommand, Debug)]
pub enum WorkerCommand {
    /// Deploy a Worker script
    Deploy {
        /// Script name
        name: String,

        /// Path to the script file
        script: PathBuf,
    },

    /// Delete a Worker script
    Delete {
        /// Script name
        name: String,
    },

    /// Manage Worker routes
    Route {
        #[command(subcommand)]
        command: RouteCommand,
    },

    /// Manage the workers.dev subdomain
    Subdomain {
        #[command(subcommand)]
        command: SubdomainCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum RouteCommand {
    /// List Worker routes for a zone
    List {
        /// Zone ID or domain
        zone: String,
    },

    /// Route a URL pattern to a Worker (e.g. "example.com/*")
    Create {
        /// Zone ID or domain
        zone: String,

        /// Route pattern
        pattern: String,

        /// Worker script name
        worker: String,
    },

    /// Delete a Worker route
    Delete {
        /// Zone ID or domain
        zone: String,

        /// Route ID
        route_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubdomainCommand {
    /// Show the workers.dev subdomain
    Get,

    /// Set the workers.dev subdomain
    Set {
        /// Subdomain name
        subdomain: String,
    },
}

pub async fn execute(ctx: &mut Context, args: WorkerArgs) -> Result<()> {
    match args.command {
        WorkerCommand::Deploy { name, script } => {
            let source = fs::read_to_string(&script)
                .with_context(|| format!("failed to read script file {}", script.display()))?;

            let session = ctx.session()?;
            let account_id = ctx.account_id(&session).await?;

            let _: ApiResponse<Value> = session
                .client()
                .put_worker_script(&script_path(&account_id, &name), source)
                .await
                .context("failed to deploy worker")?;

            output::success(&format!("Worker '{}' deployed successfully", name));
        }

        WorkerCommand::Delete { name } => {
            let session = ctx.session()?;
            let account_id = ctx.account_id(&session).await?;

            let _: ApiResponse<Value> = session
                .client()
                .delete(&script_path(&account_id, &name))
                .await
                .context("failed to delete worker")?;

            output::success(&format!("Worker '{}' deleted successfully", name));
        }

        WorkerCommand::Route { command } => execute_route(ctx, command).await?,

        WorkerCommand::Subdomain { command } => {
            if let SubdomainCommand::Set { subdomain } = command {
                debug!("Requested workers.dev subdomain '{}'", subdomain);
            }
            output::warning("Workers subdomain management is not fully implemented in this version");
            output::info("Please use the Cloudflare Dashboard");
            return Err(CfmError::Unimplemented("Workers subdomain management").into());
        }
    }

    Ok(())
}

async fn execute_route(ctx: &mut Context, command: RouteCommand) -> Result<()> {
    let session = ctx.session()?;

    match command {
        RouteCommand::List { zone } => {
            let zone_id = session.resolve_zone_id(&zone).await?;
            let value: Value = session
                .client()
                .get(&format!("/zones/{}/workers/routes", zone_id))
                .await
                .context("failed to list worker routes")?
                .into_result()?;

            render(ctx.format, value, |routes: Vec<WorkerRoute>| {
                if routes.is_empty() {
                    output::info("No worker routes found.");
                    return;
                }

                let mut table = Table::new(&["PATTERN", "WORKER", "ID"]);
                for route in routes {
                    table.row(vec![
                        route.pattern,
                        route.script.unwrap_or_else(|| "-".to_string()),
                        route.id,
                    ]);
                }
                table.print();
            })?;
        }

        RouteCommand::Create {
            zone,
            pattern,
            worker,
        } => {
            let zone_id = session.resolve_zone_id(&zone).await?;
            let body = json!({ "pattern": pattern, "script": worker });

            let route: IdRef = session
                .client()
                .post(&format!("/zones/{}/workers/routes", zone_id), body)
                .await
                .context("failed to create worker route")?
                .into_result()?;

            output::success("Worker route created successfully");
            output::print_details(
                "Route:",
                &[("Route ID", route.id), ("Pattern", pattern), ("Worker", worker)],
            );
        }

        RouteCommand::Delete { zone, route_id } => {
            let zone_id = session.resolve_zone_id(&zone).await?;
            let _: ApiResponse<Value> = session
                .client()
                .delete(&format!("/zones/{}/workers/routes/{}", zone_id, route_id))
                .await
                .context("failed to delete worker route")?;

            output::success("Worker route deleted successfully");
        }
    }

    Ok(())
}

fn script_path(account_id: &str, name: &str) -> String {
    format!(
        "/accounts/{}/workers/scripts/{}",
        account_id,
        encode_segment(name)
    )
}
