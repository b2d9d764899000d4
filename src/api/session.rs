//! Authenticated session for one configured account

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::api::client::CloudflareClient;
use crate::api::models::{CfAccount, Zone};
use crate::api::response::ApiResponse;
use crate::config::Account;
use crate::error::{CfmError, Result};

pub const ZONES_PATH: &str = "/zones";

/// Largest page size the zones endpoint accepts
pub const ZONES_PER_PAGE: u32 = 50;

/// An account's credentials plus its API client.
///
/// The Cloudflare account ID is resolved at most once per session.
pub struct Session {
    client: CloudflareClient,
    account: Account,
    account_id: OnceCell<String>,
}

impl Session {
    pub fn new(account: Account, api_base: &str) -> Result<Self> {
        let client = CloudflareClient::new(&account.api_token, api_base)?;

        let account_id = OnceCell::new();
        if let Some(id) = account.account_id.as_deref().filter(|id| !id.is_empty()) {
            let _ = account_id.set(id.to_string());
        }

        Ok(Self {
            client,
            account,
            account_id,
        })
    }

    pub fn client(&self) -> &CloudflareClient {
        &self.client
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Cloudflare account ID: the configured one, or the first account the
    /// token can see
    pub async fn account_id(&self) -> Result<String> {
        if let Some(id) = self.account_id.get() {
            return Ok(id.clone());
        }

        let response: ApiResponse<Vec<CfAccount>> = self.client.get("/accounts").await?;
        let first = response
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| CfmError::not_found("Cloudflare account", &self.account.name))?;

        debug!(
            "Resolved account ID {} for '{}'",
            first.id, self.account.name
        );
        let _ = self.account_id.set(first.id.clone());

        Ok(first.id)
    }

    /// The account ID if it was looked up remotely during this session
    pub fn newly_resolved_account_id(&self) -> Option<&str> {
        let resolved = self.account_id.get()?;
        if self.account.account_id.as_deref() == Some(resolved.as_str()) {
            None
        } else {
            Some(resolved)
        }
    }

    /// All zones visible to this account, across every page
    pub async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.client.get_all_pages(ZONES_PATH, ZONES_PER_PAGE).await
    }

    /// Resolve a zone ID or domain name to the zone ID
    pub async fn resolve_zone_id(&self, identifier: &str) -> Result<String> {
        let zones = self.list_zones().await?;
        match_zone(&zones, identifier)
            .map(|zone| zone.id.clone())
            .ok_or_else(|| CfmError::not_found("Zone", identifier))
    }
}

/// First zone whose ID or name equals `identifier` exactly
pub fn match_zone<'a>(zones: &'a [Zone], identifier: &str) -> Option<&'a Zone> {
    zones
        .iter()
        .find(|zone| zone.id == identifier || zone.name == identifier)
}
