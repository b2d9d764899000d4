//! R2 command

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::api::models::{R2Bucket, R2BucketList};
use crate::api::{encode_segment, ApiResponse};
use crate::cli::{render, Context};
use crate::output::{self, Table};

#[derive(Args, Debug)]
pub struct R2Args {
    #[command(subcommand)]
    pub command: R2Command,
}

#[derive(Subcommand, Debug)]
pub enum R2Command {
    /// List R2 buckets
    List,

    /// Create an R2 bucket
    Create {
        /// Bucket name
        name: String,

        /// Location hint (wnam, enam, weur, eeur, apac, ...)
        #[arg(long, default_value = "auto")]
        location: String,
    },

    /// Delete an R2 bucket
    Delete {
        /// Bucket name
        name: String,
    },

    /// Show bucket details
    Info {
        /// Bucket name
        name: String,
    },
}

pub async fn execute(ctx: &mut Context, args: R2Args) -> Result<()> {
    let session = ctx.session()?;
    let account_id = ctx.account_id(&session).await?;
    let buckets = format!("/accounts/{}/r2/buckets", account_id);

    match args.command {
        R2Command::List => {
            let value: Value = session
                .client()
                .get(&buckets)
                .await
                .context("failed to list R2 buckets")?
                .into_result()?;

            render(ctx.format, value, |list: R2BucketList| {
                if list.buckets.is_empty() {
                    output::info("No R2 buckets found.");
                    return;
                }

                let mut table = Table::new(&["NAME", "LOCATION", "CREATED_ON"]);
                for bucket in list.buckets {
                    table.row(vec![
                        bucket.name,
                        bucket.location.unwrap_or_else(|| "-".to_string()),
                        output::format_timestamp(bucket.creation_date.as_deref(), output::DATE),
                    ]);
                }
                table.print();
            })?;
        }

        R2Command::Create { name, location } => {
            let _: ApiResponse<Value> = session
                .client()
                .post(&buckets, create_body(&name, &location))
                .await
                .context("failed to create R2 bucket")?;

            output::success(&format!("R2 bucket '{}' created successfully", name));
        }

        R2Command::Delete { name } => {
            let _: ApiResponse<Value> = session
                .client()
                .delete(&bucket_path(&buckets, &name))
                .await
                .context("failed to delete R2 bucket")?;

            output::success(&format!("R2 bucket '{}' deleted successfully", name));
        }

        R2Command::Info { name } => {
            let value: Value = session
                .client()
                .get(&bucket_path(&buckets, &name))
                .await
                .context("failed to get R2 bucket info")?
                .into_result()?;

            render(ctx.format, value, |bucket: R2Bucket| {
                output::print_details(
                    "R2 Bucket Information:",
                    &[
                        ("Name", bucket.name),
                        ("Location", bucket.location.unwrap_or_else(|| "-".to_string())),
                        (
                            "Created On",
                            output::format_timestamp(bucket.creation_date.as_deref(), output::DATE_TIME),
                        ),
                    ],
                );
            })?;
        }
    }

    Ok(())
}

fn bucket_path(buckets: &str, name: &str) -> String {
    format!("{}/{}", buckets, encode_segment(name))
}

/// `auto` leaves placement to Cloudflare, so no hint is sent
fn create_body(name: &str, location: &str) -> Value {
    if location.eq_ignore_ascii_case("auto") {
        json!({ "name": name })
    } else {
        json!({ "name": name, "locationHint": location })
    }
}
