//! File-backed configuration store

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{Account, Config};
use crate::error::{CfmError, Result};

const CONFIG_FILE_NAME: &str = ".cloudflare-manager.yaml";

/// Configuration bound to its file. Every mutation is written back immediately.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// `~/.cloudflare-manager.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Open the store at `path`, reading the current contents
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Self::load(&path)?;
        Ok(Self { path, config })
    }

    /// Read a config file. A missing or empty file yields an empty config.
    pub fn load(path: &Path) -> Result<Config> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, starting empty", path.display());
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(CfmError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|source| CfmError::ConfigLoad {
                path: path.to_path_buf(),
                source,
            })?;

        if !config.is_consistent() {
            warn!(
                "Current account '{}' is not configured in {}",
                config.current_account,
                path.display()
            );
        }

        Ok(config)
    }

    /// Write the whole config: temp file in the same directory, owner-only
    /// permissions, then rename over the target.
    pub fn save(&self) -> Result<()> {
        let fail = |reason: String| CfmError::ConfigSave {
            path: self.path.clone(),
            reason,
        };

        let yaml = serde_yaml::to_string(&self.config).map_err(|e| fail(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| fail(e.to_string()))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".cfm-")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| fail(e.to_string()))?;

        tmp.write_all(yaml.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| fail(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))
                .map_err(|e| fail(e.to_string()))?;
        }

        tmp.persist(&self.path).map_err(|e| fail(e.error.to_string()))?;
        debug!("Saved config to {}", self.path.display());

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn accounts(&self) -> &[Account] {
        &self.config.accounts
    }

    pub fn is_current(&self, name: &str) -> bool {
        self.config.current_account == name
    }

    pub fn add_account(&mut self, account: Account) -> Result<()> {
        self.config.upsert_account(account);
        self.save()
    }

    pub fn remove_account(&mut self, name: &str) -> Result<Account> {
        let removed = self.config.remove_account(name)?;
        self.save()?;
        Ok(removed)
    }

    pub fn switch_account(&mut self, name: &str) -> Result<()> {
        self.config.set_current(name)?;
        self.save()
    }

    pub fn account(&self, name: &str) -> Result<Account> {
        self.config.account(name)
    }

    pub fn current_account(&self) -> Result<Account> {
        self.config.current_account()
    }

    /// Persist a remotely resolved account ID for `name` (no write when unchanged)
    pub fn record_account_id(&mut self, name: &str, account_id: &str) -> Result<()> {
        if self.config.set_account_id(name, account_id)? {
            self.save()?;
        }
        Ok(())
    }
}
