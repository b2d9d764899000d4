//! Multi-account configuration
//!
//! The configuration is a small YAML document holding every known account
//! plus the name of the one commands use by default:
//!
//! ```yaml
//! current_account: work
//! accounts:
//! - name: work
//!   api_token: ...
//!   account_id: 0123abcd
//! ```
//!
//! [`Config`] holds the data and the pure mutations; [`ConfigStore`] binds it
//! to a file and persists after every change.

mod store;

pub use store::ConfigStore;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CfmError, Result};

/// A locally configured Cloudflare account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Local name, unique within the config
    pub name: String,

    /// API token used as bearer credential
    pub api_token: String,

    /// Cloudflare account ID, filled in after the first lookup
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_id: Option<String>,

    /// Contact email (informational only)
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
}

impl Account {
    pub fn new(name: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_token: api_token.into(),
            account_id: None,
            email: None,
        }
    }
}

/// Persisted configuration: the account list and the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Name of the current account, empty when none is selected
    #[serde(default)]
    pub current_account: String,

    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl Config {
    fn position(&self, name: &str) -> Option<usize> {
        self.accounts.iter().position(|a| a.name == name)
    }

    /// Insert or overwrite an account by name.
    ///
    /// An existing entry keeps its position. The first account added to an
    /// empty selection becomes current.
    pub fn upsert_account(&mut self, account: Account) {
        match self.position(&account.name) {
            Some(idx) => self.accounts[idx] = account,
            None => {
                if self.current_account.is_empty() {
                    self.current_account = account.name.clone();
                }
                self.accounts.push(account);
            }
        }
    }

    /// Remove an account by name, returning it.
    ///
    /// When the removed account was current, the first remaining account
    /// takes over (or the selection is cleared).
    pub fn remove_account(&mut self, name: &str) -> Result<Account> {
        let idx = self
            .position(name)
            .ok_or_else(|| CfmError::not_found("Account", name))?;
        let removed = self.accounts.remove(idx);

        if self.current_account == name {
            self.current_account = self
                .accounts
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_default();
        }

        Ok(removed)
    }

    pub fn account(&self, name: &str) -> Result<Account> {
        self.accounts
            .iter()
            .find(|a| a.name == name)
            .cloned()
            .ok_or_else(|| CfmError::not_found("Account", name))
    }

    pub fn current_account(&self) -> Result<Account> {
        if self.current_account.is_empty() {
            return Err(CfmError::NoCurrentAccount);
        }
        self.account(&self.current_account)
    }

    /// Select the current account. Leaves the config untouched on failure.
    pub fn set_current(&mut self, name: &str) -> Result<()> {
        if self.position(name).is_none() {
            return Err(CfmError::not_found("Account", name));
        }
        self.current_account = name.to_string();
        Ok(())
    }

    /// Store a resolved Cloudflare account ID. Returns whether anything changed.
    pub fn set_account_id(&mut self, name: &str, account_id: &str) -> Result<bool> {
        let idx = self
            .position(name)
            .ok_or_else(|| CfmError::not_found("Account", name))?;
        let slot = &mut self.accounts[idx].account_id;

        if slot.as_deref() == Some(account_id) {
            return Ok(false);
        }
        *slot = Some(account_id.to_string());
        Ok(true)
    }

    /// `current_account` is either empty or names a configured account
    pub fn is_consistent(&self) -> bool {
        self.current_account.is_empty() || self.position(&self.current_account).is_some()
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
