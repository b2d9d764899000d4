//! CLI commands module

pub mod account;
pub mod dns;
pub mod kv;
pub mod pages;
pub mod r2;
pub mod worker;
pub mod zone;

use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::api::{Session, CF_API_BASE};
use crate::config::{Account, ConfigStore};
use crate::output::{self, OutputFormat};

/// cfm - Cloudflare Multi-Account Manager
#[derive(Parser, Debug)]
#[command(name = "cfm")]
#[command(version)]
#[command(about = "Cloudflare Multi-Account Manager", long_about = None)]
#[command(after_help = "Manage zones, DNS records, Workers, Pages, KV and R2 across \
several Cloudflare accounts. Add an account with 'cfm account add <name> --token <token>'.")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for list and info commands
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        env = "CFM_OUTPUT_FORMAT",
        default_value_t = OutputFormat::Table
    )]
    pub format: OutputFormat,

    /// Config file [default: ~/.cloudflare-manager.yaml]
    #[arg(long, global = true, env = "CFM_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use this configured account instead of the current one
    #[arg(short, long, global = true, env = "CFM_ACCOUNT", value_name = "NAME")]
    pub account: Option<String>,

    /// Cloudflare API base URL
    #[arg(long, global = true, env = "CFM_API_BASE", default_value = CF_API_BASE, hide = true)]
    pub api_base: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage Cloudflare accounts
    Account(account::AccountArgs),

    /// Manage zones (domains)
    Zone(zone::ZoneArgs),

    /// Manage DNS records
    Dns(dns::DnsArgs),

    /// Deploy and route Workers
    Worker(worker::WorkerArgs),

    /// Manage Pages projects
    Pages(pages::PagesArgs),

    /// Manage Workers KV namespaces and keys
    Kv(kv::KvArgs),

    /// Manage R2 storage buckets
    R2(r2::R2Args),
}

/// State shared by every command of one invocation
pub struct Context {
    pub store: ConfigStore,
    pub format: OutputFormat,
    account: Option<String>,
    api_base: String,
}

impl Context {
    pub fn new(
        store: ConfigStore,
        format: OutputFormat,
        account: Option<String>,
        api_base: String,
    ) -> Self {
        Self {
            store,
            format,
            account,
            api_base,
        }
    }

    /// Session for `--account` if given, otherwise the current account
    pub fn session(&self) -> Result<Session> {
        let account = match self.account.as_deref() {
            Some(name) => self.store.account(name)?,
            None => self.store.current_account()?,
        };
        self.session_for(account)
    }

    pub fn session_for(&self, account: Account) -> Result<Session> {
        debug!("Using account '{}'", account.name);
        Ok(Session::new(account, &self.api_base)?)
    }

    /// The session's Cloudflare account ID. A freshly resolved ID is written
    /// back to the config so later runs skip the lookup.
    pub async fn account_id(&mut self, session: &Session) -> Result<String> {
        let account_id = session
            .account_id()
            .await
            .context("failed to get account ID")?;

        if let Some(fresh) = session.newly_resolved_account_id() {
            let name = &session.account().name;
            if self.store.account(name).is_ok() {
                self.store.record_account_id(name, fresh)?;
            }
        }

        Ok(account_id)
    }
}

/// Print `value` as JSON, or decode it and hand it to `table`
pub fn render<T, F>(format: OutputFormat, value: Value, table: F) -> Result<()>
where
    T: DeserializeOwned,
    F: FnOnce(T),
{
    match format {
        OutputFormat::Json => output::print_json_pretty(&value),
        OutputFormat::Table => {
            let typed: T = serde_json::from_value(value).context("unexpected API response")?;
            table(typed);
            Ok(())
        }
    }
}

/// Load the configuration and dispatch one command
pub async fn run(cli: Cli) -> Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => ConfigStore::default_path()
            .ok_or_else(|| anyhow!("Cannot determine home directory; pass --config"))?,
    };
    let store = ConfigStore::open(path)?;
    debug!("Using config {}", store.path().display());
    let mut ctx = Context::new(store, cli.format, cli.account, cli.api_base);

    match cli.command {
        Commands::Account(args) => account::execute(&mut ctx, args).await,
        Commands::Zone(args) => zone::execute(&mut ctx, args).await,
        Commands::Dns(args) => dns::execute(&mut ctx, args).await,
        Commands::Worker(args) => worker::execute(&mut ctx, args).await,
        Commands::Pages(args) => pages::execute(&mut ctx, args).await,
        Commands::Kv(args) => kv::execute(&mut ctx, args).await,
        Commands::R2(args) => r2::execute(&mut ctx, args).await,
    }
}
