//! Account command

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;
use serde_json::{json, Value};

use crate::api::models::CfAccount;
use crate::cli::{render, Context};
use crate::config::Account;
use crate::output::{self, OutputFormat, Table};

#[derive(Args, Debug)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Add a Cloudflare account (the token is verified first)
    Add {
        /// Local name for the account
        name: String,

        /// Cloudflare API token
        #[arg(short, long, env = "CF_API_TOKEN", hide_env_values = true)]
        token: String,

        /// Email address (informational)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// List configured accounts
    List,

    /// Switch the current account
    Switch {
        /// Account name
        name: String,
    },

    /// Remove an account
    Remove {
        /// Account name
        name: String,
    },

    /// Show details of the selected account
    Info,
}

pub async fn execute(ctx: &mut Context, args: AccountArgs) -> Result<()> {
    match args.command {
        AccountCommand::Add { name, token, email } => {
            let mut account = Account::new(&name, token);
            account.email = email.filter(|e| !e.is_empty());

            let session = ctx.session_for(account.clone())?;
            let account_id = session
                .account_id()
                .await
                .context("failed to verify API token")?;
            account.account_id = Some(account_id.clone());

            ctx.store.add_account(account)?;
            output::success(&format!(
                "Account '{}' added successfully (ID: {})",
                name, account_id
            ));
            if ctx.store.is_current(&name) && ctx.store.accounts().len() == 1 {
                output::info(&format!("'{}' is now the current account", name));
            }
        }

        AccountCommand::List => {
            if ctx.format == OutputFormat::Json {
                let accounts: Vec<Value> = ctx
                    .store
                    .accounts()
                    .iter()
                    .map(|a| {
                        json!({
                            "name": a.name,
                            "email": a.email,
                            "account_id": a.account_id,
                            "current": ctx.store.is_current(&a.name),
                        })
                    })
                    .collect();
                return output::print_json_pretty(&accounts);
            }

            if ctx.store.accounts().is_empty() {
                output::info("No accounts configured. Use 'cfm account add' to add an account.");
                return Ok(());
            }

            let mut table = Table::new(&["CURRENT", "NAME", "EMAIL", "ACCOUNT_ID"]);
            for account in ctx.store.accounts() {
                let current = ctx.store.is_current(&account.name);
                table.row(vec![
                    if current {
                        "*".green().bold().to_string()
                    } else {
                        " ".to_string()
                    },
                    if current {
                        account.name.bold().to_string()
                    } else {
                        account.name.clone()
                    },
                    account.email.clone().unwrap_or_default(),
                    account.account_id.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            table.print();
        }

        AccountCommand::Switch { name } => {
            ctx.store.switch_account(&name)?;
            output::success(&format!("Switched to account '{}'", name));
        }

        AccountCommand::Remove { name } => {
            let was_current = ctx.store.is_current(&name);
            ctx.store.remove_account(&name)?;
            output::success(&format!("Account '{}' removed", name));

            if was_current {
                match ctx.store.current_account() {
                    Ok(next) => output::info(&format!("Current account is now '{}'", next.name)),
                    Err(_) => output::info("No accounts left"),
                }
            }
        }

        AccountCommand::Info => {
            let session = ctx.session()?;
            let account_id = ctx.account_id(&session).await?;

            let value: Value = session
                .client()
                .get(&format!("/accounts/{}", account_id))
                .await
                .context("failed to get account info")?
                .into_result()?;

            render(ctx.format, value, |account: CfAccount| {
                let two_factor = account
                    .settings
                    .map(|s| s.enforce_twofactor)
                    .unwrap_or(false);
                output::print_details(
                    "Account Information:",
                    &[
                        ("Name", account.name),
                        ("ID", account.id),
                        ("Type", account.account_type),
                        (
                            "Created On",
                            output::format_timestamp(account.created_on.as_deref(), output::DATE),
                        ),
                        ("Enforce 2FA", output::check_mark(two_factor)),
                    ],
                );
            })?;
        }
    }

    Ok(())
}
