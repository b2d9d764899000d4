//! Typed views of the Cloudflare resources this tool touches.
//!
//! Only the fields the commands print are modelled; everything else in the
//! payloads is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfAccount {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub account_type: String,
    #[serde(default)]
    pub settings: Option<AccountSettings>,
    pub created_on: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSettings {
    #[serde(default)]
    pub enforce_twofactor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub name_servers: Vec<String>,
    pub plan: Option<Plan>,
    /// Seconds of development mode left; zero or negative when off
    #[serde(default)]
    pub development_mode: i64,
    pub created_on: Option<String>,
    pub modified_on: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub ttl: u32,
    pub proxied: Option<bool>,
    pub priority: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRoute {
    pub id: String,
    pub pattern: String,
    pub script: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesProject {
    pub name: String,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub domains: Vec<String>,
    pub created_on: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesDeployment {
    pub id: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub url: String,
    pub latest_stage: Option<DeploymentStage>,
    pub created_on: Option<String>,
}

impl PagesDeployment {
    pub fn status(&self) -> &str {
        self.latest_stage
            .as_ref()
            .map(|s| s.status.as_str())
            .unwrap_or("-")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentStage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvNamespace {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvKey {
    pub name: String,
    pub expiration: Option<u64>,
}

/// `GET /accounts/{id}/r2/buckets` wraps the list in an object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct R2BucketList {
    #[serde(default)]
    pub buckets: Vec<R2Bucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct R2Bucket {
    pub name: String,
    pub location: Option<String>,
    pub creation_date: Option<String>,
}

/// Reference to a created/deleted object, e.g. `{"id": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdRef {
    pub id: String,
}
