//! Zone command

use anyhow::{Context as _, Result};
use clap::{ArgAction, Args, Subcommand};
use serde_json::{json, Value};

use crate::api::models::Zone;
use crate::api::session::{ZONES_PATH, ZONES_PER_PAGE};
use crate::api::ApiResponse;
use crate::cli::{render, Context};
use crate::output::{self, Table};

#[derive(Args, Debug)]
pub struct ZoneArgs {
    #[command(subcommand)]
    pub command: ZoneCommand,
}

#[derive(Subcommand, Debug)]
pub enum ZoneCommand {
    /// List all zones
    List,

    /// Create a new zone
    Create {
        /// Domain name
        domain: String,

        /// Automatically scan for existing DNS records
        #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
        jump_start: bool,
    },

    /// Delete a zone
    Delete {
        /// Zone ID or domain
        zone: String,
    },

    /// Show zone information
    Info {
        /// Zone ID or domain
        zone: String,
    },

    /// Purge cache for a zone (everything unless --files is given)
    Purge {
        /// Zone ID or domain
        zone: String,

        /// Purge everything
        #[arg(long)]
        everything: bool,

        /// Specific URLs to purge (comma-separated or repeated)
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        files: Vec<String>,
    },
}

pub async fn execute(ctx: &mut Context, args: ZoneArgs) -> Result<()> {
    let session = ctx.session()?;

    match args.command {
        ZoneCommand::List => {
            let zones: Vec<Value> = session
                .client()
                .get_all_pages(ZONES_PATH, ZONES_PER_PAGE)
                .await
                .context("failed to list zones")?;

            render(ctx.format, Value::Array(zones), |zones: Vec<Zone>| {
                if zones.is_empty() {
                    output::info("No zones found. Use 'cfm zone create' to add a zone.");
                    return;
                }

                let mut table = Table::new(&["NAME", "ID", "STATUS", "NAME_SERVERS"]);
                for zone in &zones {
                    table.row(vec![
                        zone.name.clone(),
                        zone.id.clone(),
                        output::status(&zone.status),
                        name_server_summary(&zone.name_servers),
                    ]);
                }
                table.print();
                output::info(&format!("Total: {} zones", zones.len()));
            })?;
        }

        ZoneCommand::Create { domain, jump_start } => {
            let account_id = ctx.account_id(&session).await?;
            let body = json!({
                "name": domain,
                "account": { "id": account_id },
                "jump_start": jump_start,
                "type": "full"
            });

            let zone: Zone = session
                .client()
                .post("/zones", body)
                .await
                .context("failed to create zone")?
                .into_result()?;

            output::success(&format!("Zone '{}' created successfully", domain));
            output::print_details(
                "Zone:",
                &[("Zone ID", zone.id), ("Status", output::status(&zone.status))],
            );
            output::print_list("Nameservers:", &zone.name_servers, "none assigned yet");
            println!();
            output::info("Update your domain's nameservers to the ones listed above.");
        }

        ZoneCommand::Delete { zone } => {
            let zone_id = session.resolve_zone_id(&zone).await?;
            let _: ApiResponse<Value> = session
                .client()
                .delete(&format!("/zones/{}", zone_id))
                .await
                .context("failed to delete zone")?;

            output::success(&format!("Zone '{}' deleted successfully", zone));
        }

        ZoneCommand::Info { zone } => {
            let zone_id = session.resolve_zone_id(&zone).await?;
            let value: Value = session
                .client()
                .get(&format!("/zones/{}", zone_id))
                .await
                .context("failed to get zone info")?
                .into_result()?;

            render(ctx.format, value, |zone: Zone| {
                let plan = zone.plan.map(|p| p.name).unwrap_or_else(|| "-".to_string());
                output::print_details(
                    "Zone Information:",
                    &[
                        ("Name", zone.name),
                        ("ID", zone.id),
                        ("Status", output::status(&zone.status)),
                        ("Plan", plan),
                        ("Development Mode", output::check_mark(zone.development_mode > 0)),
                        (
                            "Created On",
                            output::format_timestamp(zone.created_on.as_deref(), output::DATE_TIME),
                        ),
                        (
                            "Modified On",
                            output::format_timestamp(zone.modified_on.as_deref(), output::DATE_TIME),
                        ),
                    ],
                );
                output::print_list("Nameservers:", &zone.name_servers, "none");
            })?;
        }

        ZoneCommand::Purge {
            zone,
            everything,
            files,
        } => {
            let zone_id = session.resolve_zone_id(&zone).await?;
            let body = purge_body(everything, &files);

            let _: ApiResponse<Value> = session
                .client()
                .post(&format!("/zones/{}/purge_cache", zone_id), body)
                .await
                .context("failed to purge cache")?;

            if purges_everything(everything, &files) {
                output::success("Cache purged successfully");
            } else {
                output::success(&format!("Purged {} files from cache", files.len()));
            }
        }
    }

    Ok(())
}

fn purges_everything(everything: bool, files: &[String]) -> bool {
    everything || files.is_empty()
}

/// `--everything` wins; with neither flag the whole cache is purged too
fn purge_body(everything: bool, files: &[String]) -> Value {
    if purges_everything(everything, files) {
        json!({ "purge_everything": true })
    } else {
        json!({ "files": files })
    }
}

fn name_server_summary(name_servers: &[String]) -> String {
    match name_servers {
        [] => "-".to_string(),
        [only] => only.clone(),
        [first, ..] => format!("{} ...", first),
    }
}
