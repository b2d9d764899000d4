//! DNS command

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::api::models::DnsRecord;
use crate::api::ApiResponse;
use crate::cli::{render, Context};
use crate::error::CfmError;
use crate::output::{self, Table};

#[derive(Args, Debug)]
pub struct DnsArgs {
    #[command(subcommand)]
    pub command: DnsCommand,
}

#[derive(Subcommand, Debug)]
pub enum DnsCommand {
    /// List DNS records for a zone
    List {
        /// Zone ID or domain
        zone: String,

        /// Filter by record type (A, AAAA, CNAME, MX, etc.)
        #[arg(short = 't', long = "type")]
        record_type: Option<String>,
    },

    /// Create a DNS record
    Create {
        /// Zone ID or domain
        zone: String,

        /// Record type (A, AAAA, CNAME, TXT, MX, SRV, ...)
        record_type: String,

        /// Record name (e.g. "www" or "api.example.com")
        name: String,

        /// Record content (IP address, hostname, text, ...)
        content: String,

        /// TTL in seconds (1 = automatic)
        #[arg(long, default_value_t = 1)]
        ttl: u32,

        /// Enable Cloudflare proxy
        #[arg(long)]
        proxied: bool,

        /// Priority (MX and SRV records only)
        #[arg(long, default_value_t = 10)]
        priority: u16,
    },

    /// Update the content of a DNS record
    Update {
        /// Zone ID or domain
        zone: String,

        /// Record ID
        record_id: String,

        /// New record content
        content: String,

        /// TTL in seconds (1 = automatic)
        #[arg(long, default_value_t = 1)]
        ttl: u32,

        /// Enable Cloudflare proxy
        #[arg(long)]
        proxied: bool,
    },

    /// Delete a DNS record
    Delete {
        /// Zone ID or domain
        zone: String,

        /// Record ID
        record_id: String,
    },

    /// Import DNS records from a BIND file
    Import {
        /// Zone ID or domain
        zone: String,

        /// BIND zone file
        file: PathBuf,
    },

    /// Export DNS records in BIND format
    Export {
        /// Zone ID or domain
        zone: String,
    },
}

pub async fn execute(ctx: &mut Context, args: DnsArgs) -> Result<()> {
    match args.command {
        DnsCommand::List { zone, record_type } => {
            let session = ctx.session()?;
            let zone_id = session.resolve_zone_id(&zone).await?;

            let mut path = format!("/zones/{}/dns_records?per_page=100", zone_id);
            if let Some(t) = record_type {
                path.push_str(&format!("&type={}", t.to_uppercase()));
            }

            let value: Value = session
                .client()
                .get(&path)
                .await
                .context("failed to list DNS records")?
                .into_result()?;

            render(ctx.format, value, |records: Vec<DnsRecord>| {
                if records.is_empty() {
                    output::info("No DNS records found.");
                    return;
                }

                let mut table = Table::new(&["TYPE", "NAME", "CONTENT", "TTL", "PROXIED", "ID"]);
                for record in &records {
                    table.row(vec![
                        record.record_type.clone(),
                        record.name.clone(),
                        output::truncate(&record.content, 40),
                        ttl_label(record.ttl),
                        if record.proxied.unwrap_or(false) {
                            output::check_mark(true)
                        } else {
                            " ".to_string()
                        },
                        output::truncate(&record.id, 12),
                    ]);
                }
                table.print();
                output::info(&format!("Total: {} records", records.len()));
            })?;
        }

        DnsCommand::Create {
            zone,
            record_type,
            name,
            content,
            ttl,
            proxied,
            priority,
        } => {
            let session = ctx.session()?;
            let zone_id = session.resolve_zone_id(&zone).await?;
            let body = record_body(&record_type, &name, &content, ttl, proxied, Some(priority));

            let record: DnsRecord = session
                .client()
                .post(&format!("/zones/{}/dns_records", zone_id), body)
                .await
                .context("failed to create DNS record")?
                .into_result()?;

            output::success("DNS record created successfully");
            print_record(record);
        }

        DnsCommand::Update {
            zone,
            record_id,
            content,
            ttl,
            proxied,
        } => {
            let session = ctx.session()?;
            let zone_id = session.resolve_zone_id(&zone).await?;
            let path = format!("/zones/{}/dns_records/{}", zone_id, record_id);

            // type and name are immutable here; carry them over from the record
            let current: DnsRecord = session
                .client()
                .get(&path)
                .await
                .context("failed to get DNS record")?
                .into_result()?;

            let body = record_body(
                &current.record_type,
                &current.name,
                &content,
                ttl,
                proxied,
                current.priority,
            );

            let record: DnsRecord = session
                .client()
                .put(&path, body)
                .await
                .context("failed to update DNS record")?
                .into_result()?;

            output::success("DNS record updated successfully");
            print_record(record);
        }

        DnsCommand::Delete { zone, record_id } => {
            let session = ctx.session()?;
            let zone_id = session.resolve_zone_id(&zone).await?;
            let _: ApiResponse<Value> = session
                .client()
                .delete(&format!("/zones/{}/dns_records/{}", zone_id, record_id))
                .await
                .context("failed to delete DNS record")?;

            output::success(&format!("DNS record {} deleted successfully", record_id));
        }

        DnsCommand::Export { zone } => {
            let session = ctx.session()?;
            let zone_id = session.resolve_zone_id(&zone).await?;
            let bind = session
                .client()
                .get_text(&format!("/zones/{}/dns_records/export", zone_id))
                .await
                .context("failed to export DNS records")?;

            println!("{}", bind.trim_end());
        }

        DnsCommand::Import { .. } => {
            output::warning("DNS import is not fully implemented in this version");
            output::info("Please use the Cloudflare Dashboard to import DNS records");
            return Err(CfmError::Unimplemented("DNS import").into());
        }
    }

    Ok(())
}

/// Only MX and SRV records carry a priority
fn takes_priority(record_type: &str) -> bool {
    matches!(record_type, "MX" | "SRV")
}

fn record_body(
    record_type: &str,
    name: &str,
    content: &str,
    ttl: u32,
    proxied: bool,
    priority: Option<u16>,
) -> Value {
    let record_type = record_type.to_uppercase();
    let mut body = json!({
        "type": record_type,
        "name": name,
        "content": content,
        "ttl": ttl,
        "proxied": proxied
    });

    if takes_priority(&record_type) {
        if let Some(p) = priority {
            body["priority"] = json!(p);
        }
    }

    body
}

fn ttl_label(ttl: u32) -> String {
    if ttl == 1 {
        "Auto".to_string()
    } else {
        format!("{}s", ttl)
    }
}

fn print_record(record: DnsRecord) {
    output::print_details(
        "Record:",
        &[
            ("ID", record.id),
            ("Type", record.record_type),
            ("Name", record.name),
            ("Content", record.content),
        ],
    );
}
