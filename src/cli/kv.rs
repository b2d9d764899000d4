//! KV command

use std::io::{self, Write};

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::api::models::{KvKey, KvNamespace};
use crate::api::{encode_segment, ApiResponse};
use crate::cli::{render, Context};
use crate::output::{self, Table};

#[derive(Args, Debug)]
pub struct KvArgs {
    #[command(subcommand)]
    pub command: KvCommand,
}

#[derive(Subcommand, Debug)]
pub enum KvCommand {
    /// Manage KV namespaces
    Namespace {
        #[command(subcommand)]
        command: NamespaceCommand,
    },

    /// Manage keys in a namespace
    Key {
        #[command(subcommand)]
        command: KeyCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum NamespaceCommand {
    /// List KV namespaces
    List,

    /// Create a KV namespace
    Create {
        /// Namespace title
        title: String,
    },

    /// Delete a KV namespace
    Delete {
        /// Namespace ID
        namespace_id: String,
    },

    /// Rename a KV namespace
    Rename {
        /// Namespace ID
        namespace_id: String,

        /// New title
        title: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// List keys in a namespace
    List {
        /// Namespace ID
        namespace_id: String,
    },

    /// Print the value stored under a key
    Get {
        /// Namespace ID
        namespace_id: String,

        /// Key name
        key: String,
    },

    /// Store a value under a key
    Put {
        /// Namespace ID
        namespace_id: String,

        /// Key name
        key: String,

        /// Value to store
        value: String,
    },

    /// Delete a key
    Delete {
        /// Namespace ID
        namespace_id: String,

        /// Key name
        key: String,
    },
}

pub async fn execute(ctx: &mut Context, args: KvArgs) -> Result<()> {
    let session = ctx.session()?;
    let account_id = ctx.account_id(&session).await?;
    let namespaces = format!("/accounts/{}/storage/kv/namespaces", account_id);

    match args.command {
        KvCommand::Namespace { command } => match command {
            NamespaceCommand::List => {
                let value: Value = session
                    .client()
                    .get(&namespaces)
                    .await
                    .context("failed to list KV namespaces")?
                    .into_result()?;

                render(ctx.format, value, |list: Vec<KvNamespace>| {
                    if list.is_empty() {
                        output::info("No KV namespaces found.");
                        return;
                    }

                    let mut table = Table::new(&["TITLE", "ID"]);
                    for ns in list {
                        table.row(vec![ns.title, ns.id]);
                    }
                    table.print();
                })?;
            }

            NamespaceCommand::Create { title } => {
                let ns: KvNamespace = session
                    .client()
                    .post(&namespaces, json!({ "title": title }))
                    .await
                    .context("failed to create KV namespace")?
                    .into_result()?;

                output::success(&format!("KV namespace '{}' created successfully", ns.title));
                output::print_details("Namespace:", &[("ID", ns.id), ("Title", ns.title)]);
            }

            NamespaceCommand::Delete { namespace_id } => {
                let _: ApiResponse<Value> = session
                    .client()
                    .delete(&format!("{}/{}", namespaces, namespace_id))
                    .await
                    .context("failed to delete KV namespace")?;

                output::success(&format!("KV namespace {} deleted successfully", namespace_id));
            }

            NamespaceCommand::Rename {
                namespace_id,
                title,
            } => {
                let _: ApiResponse<Value> = session
                    .client()
                    .put(
                        &format!("{}/{}", namespaces, namespace_id),
                        json!({ "title": title }),
                    )
                    .await
                    .context("failed to rename KV namespace")?;

                output::success(&format!("KV namespace renamed to '{}'", title));
            }
        },

        KvCommand::Key { command } => match command {
            KeyCommand::List { namespace_id } => {
                let value: Value = session
                    .client()
                    .get(&format!("{}/{}/keys", namespaces, namespace_id))
                    .await
                    .context("failed to list KV keys")?
                    .into_result()?;

                render(ctx.format, value, |keys: Vec<KvKey>| {
                    if keys.is_empty() {
                        output::info("No keys found.");
                        return;
                    }

                    let mut table = Table::new(&["NAME", "EXPIRATION"]);
                    for key in &keys {
                        table.row(vec![key.name.clone(), expiration_label(key.expiration)]);
                    }
                    table.print();
                    output::info(&format!("Total: {} keys", keys.len()));
                })?;
            }

            KeyCommand::Get { namespace_id, key } => {
                let bytes = session
                    .client()
                    .get_bytes(&value_path(&namespaces, &namespace_id, &key))
                    .await
                    .context("failed to get KV value")?;

                let mut stdout = io::stdout().lock();
                stdout.write_all(&bytes)?;
                if console::user_attended() && !bytes.ends_with(b"\n") {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }

            KeyCommand::Put {
                namespace_id,
                key,
                value,
            } => {
                let _: ApiResponse<Value> = session
                    .client()
                    .put_bytes(
                        &value_path(&namespaces, &namespace_id, &key),
                        value.into_bytes(),
                    )
                    .await
                    .context("failed to put KV value")?;

                output::success(&format!("Key '{}' written successfully", key));
            }

            KeyCommand::Delete { namespace_id, key } => {
                let _: ApiResponse<Value> = session
                    .client()
                    .delete(&value_path(&namespaces, &namespace_id, &key))
                    .await
                    .context("failed to delete KV key")?;

                output::success(&format!("Key '{}' deleted successfully", key));
            }
        },
    }

    Ok(())
}

fn value_path(namespaces: &str, namespace_id: &str, key: &str) -> String {
    format!(
        "{}/{}/values/{}",
        namespaces,
        namespace_id,
        encode_segment(key)
    )
}

/// Expirations are unix seconds
fn expiration_label(expiration: Option<u64>) -> String {
    expiration
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format(output::DATE_TIME).to_string())
        .unwrap_or_else(|| "-".to_string())
}
