use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tienda_compile::database::DEFAULT_SCHEMA;
use tokio::fs;

pub const CONFIG_FILE: &str = "tienda.toml";

/// Settings read from `tienda.toml`. Command line flags and environment
/// variables take precedence over everything in here.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub database_url: Option<String>,
    pub schema: Option<String>,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Config::default());
        }

        let bytes = fs::read(path)
            .await
            .with_context(|| format!("could not read '{}'", path.display()))?;
        Config::parse(&bytes).with_context(|| format!("'{}' is corrupt", path.display()))
    }

    fn parse(bytes: &[u8]) -> Result<Config> {
        Ok(toml::from_slice(bytes)?)
    }

    pub fn database_url(&self, flag: Option<&str>) -> Result<String> {
        flag.map(str::to_string)
            .or_else(|| self.database_url.clone())
            .ok_or_else(|| {
                anyhow!(
                    "no database url: pass --database-url, set DATABASE_URL, or add database_url to {}",
                    CONFIG_FILE
                )
            })
    }

    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }
}
