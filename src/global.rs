use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::backlog::firestore::FirestoreStore;
use crate::backlog::BacklogStore;
use crate::config::Settings;
use crate::scraper::chromium::ChromiumLauncher;
use crate::scraper::metacritic::{MetacriticScraper, ScrapeOptions};
use crate::scraper::{SessionLauncher, SessionPool};
use crate::sources::hltb::HltbClient;
use crate::sources::nintendo::NintendoClient;
use crate::sources::reviews::ReviewsClient;

pub struct Global {
    pub config: Settings,
    pub hltb: HltbClient,
    pub reviews: ReviewsClient,
    pub nintendo: NintendoClient,
    pub metacritic: MetacriticScraper,
    pub backlog: Arc<dyn BacklogStore>,
    pub started_at: std::time::Instant,
}

impl Global {
    pub fn init(config: Settings) -> anyhow::Result<Arc<Self>> {
        let http_client = reqwest::Client::builder()
            .user_agent(&config.server.user_agent)
            .timeout(Duration::from_secs(config.upstreams.request_timeout_secs))
            .build()
            .context("http client")?;

        let launcher = Arc::new(ChromiumLauncher::new(
            config.scraper.launcher.clone(),
            config.server.user_agent.clone(),
        ));
        let backlog = Arc::new(FirestoreStore::new(http_client.clone(), config.backlog.clone()));

        Self::with_parts(config, http_client, launcher, backlog)
    }

    /// Wires the upstream clients around an explicit browser launcher and backlog store.
    pub fn with_parts(
        config: Settings,
        http_client: reqwest::Client,
        launcher: Arc<dyn SessionLauncher>,
        backlog: Arc<dyn BacklogStore>,
    ) -> anyhow::Result<Arc<Self>> {
        let upstreams = &config.upstreams;

        let pool = SessionPool::new(launcher, config.scraper.max_sessions);
        let metacritic = MetacriticScraper::new(pool, &upstreams.metacritic, ScrapeOptions::from(&config.scraper))
            .context("metacritic scraper")?;

        tracing::info!(
            max_sessions = config.scraper.max_sessions,
            launcher = ?config.scraper.launcher,
            "upstream clients initialized"
        );

        Ok(Arc::new(Self {
            hltb: HltbClient::new(http_client.clone(), &upstreams.hltb, config.hltb.page_size),
            reviews: ReviewsClient::new(http_client.clone(), &upstreams.reviews),
            nintendo: NintendoClient::new(http_client, &upstreams.nintendo, config.nintendo.clone()),
            metacritic,
            backlog,
            config,
            started_at: std::time::Instant::now(),
        }))
    }
}
