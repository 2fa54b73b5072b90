use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Base URLs of every third-party service the API talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub hltb: String,
    pub reviews: String,
    pub nintendo: String,
    pub metacritic: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HltbConfig {
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NintendoConfig {
    pub filter_query: String,
    pub rows: u32,
    pub sort: String,
}

/// How the scraper obtains a browser.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LauncherConfig {
    /// Spawn a local Chrome/Chromium process.
    Local {
        executable: Option<PathBuf>,
        #[serde(default = "default_headless")]
        headless: bool,
    },
    /// Attach to an already running browser over its DevTools websocket.
    Remote { ws_url: String },
}

fn default_headless() -> bool {
    true
}

/// What a results-container wait timeout means.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WaitTimeoutPolicy {
    /// Treat the timeout as an empty result set.
    Empty,
    /// Surface the timeout as a scrape failure.
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    pub launcher: LauncherConfig,
    pub max_sessions: usize,
    pub wait_timeout_ms: u64,
    pub on_wait_timeout: WaitTimeoutPolicy,
    pub max_pages: usize,
    pub exact_match: bool,
    pub genre_marker: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacklogConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub excluded_completion: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub upstreams: UpstreamConfig,
    pub hltb: HltbConfig,
    pub nintendo: NintendoConfig,
    pub scraper: ScraperConfig,
    pub backlog: BacklogConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let config_file = match environment.as_str() {
            "production" => "prod",
            _ => "dev",
        };

        let s = Config::builder()
            .add_source(File::from_str(DEFAULTS, config::FileFormat::Yaml))
            .add_source(File::with_name("config/default.yaml").required(false))
            .add_source(File::with_name(&format!("config/{}.yaml", config_file)).required(false))
            .add_source(File::with_name("config/local.yaml").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Built-in defaults only, without touching the filesystem or environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(DEFAULTS, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }
}

const DEFAULTS: &str = include_str!("../config/default.yaml");
