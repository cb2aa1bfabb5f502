pub mod tracing;

use figment::providers::{Env, Format, Json};
use figment::Figment;
use serde::Deserialize;

use crate::pagination::{PageLimits, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppCfg {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub store: StoreKind,
    #[serde(default = "default_pool_size")]
    pub db_pool_size: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".into()
}

fn default_pool_size() -> usize {
    10
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u32 {
    50
}

impl AppCfg {
    /// `appsettings.json`, overridden by `APP_*` environment variables.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Json::file("appsettings.json"))
            .merge(Env::prefixed("APP_"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_size: self.default_page_size,
            max_size: self.max_page_size,
        }
    }
}
