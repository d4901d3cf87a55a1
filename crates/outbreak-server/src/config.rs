//! Server configuration from the environment.

use anyhow::Context;
use outbreak_core::{Catalog, SessionConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATA_DIR: &str = "./data";

/// Runtime settings for the session host
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `SERVER_ADDR`
    pub addr: SocketAddr,
    /// `OUTBREAK_DATA_DIR`: one progress file per player lives here
    pub data_dir: PathBuf,
    /// `OUTBREAK_CATALOG`: content JSON; the bundled catalog when unset
    pub catalog_path: Option<PathBuf>,
    /// `OUTBREAK_STRICT_IDS`
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Read settings from process environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.into())
            .parse()
            .context("SERVER_ADDR is not a socket address")?;

        let data_dir = lookup("OUTBREAK_DATA_DIR")
            .unwrap_or_else(|| DEFAULT_DATA_DIR.into())
            .into();

        let catalog_path = lookup("OUTBREAK_CATALOG")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let validate_ids = match lookup("OUTBREAK_STRICT_IDS") {
            None => false,
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => anyhow::bail!("OUTBREAK_STRICT_IDS has unrecognised value {:?}", other),
            },
        };

        Ok(Self {
            addr,
            data_dir,
            catalog_path,
            session: SessionConfig { validate_ids },
        })
    }

    /// Load the configured content catalog
    pub fn load_catalog(&self) -> anyhow::Result<Catalog> {
        match &self.catalog_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading catalog {}", path.display()))?;
                Catalog::from_json(&json)
                    .with_context(|| format!("loading catalog {}", path.display()))
            }
            None => Catalog::builtin().context("loading bundled catalog"),
        }
    }

    /// Where a player's progress is stored
    pub fn progress_path(&self, player_id: uuid::Uuid) -> PathBuf {
        self.data_dir.join(format!("{}.json", player_id))
    }
}
