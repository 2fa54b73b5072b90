use std::time::Duration;

use ::scraper::{ElementRef, Html, Selector};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde::Serialize;

use super::{PageSession, SessionPool};
use crate::config::{ScraperConfig, WaitTimeoutPolicy};
use crate::error::{Result, ServiceError};
use crate::sources::{GameSearch, SearchQuery};


const DEFAULT_KIND: &str = "game";

const NO_RESULTS: &str = "p.no_results";
const RESULTS: &str = "ul.search_results";

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("ul.search_results > li.result").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h3.product_title a").unwrap());
static SCORE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.metascore_w").unwrap());
static NEXT_PAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.flipper.next a").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One search hit. `score` is the displayed text, e.g. `"97"` or `"tbd"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub title: String,
    pub score: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub wait_timeout: Duration,
    pub on_wait_timeout: WaitTimeoutPolicy,
    pub max_pages: usize,
    pub exact_match: bool,
    pub genre_marker: String,
}

impl From<&ScraperConfig> for ScrapeOptions {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            wait_timeout: Duration::from_millis(config.wait_timeout_ms),
            on_wait_timeout: config.on_wait_timeout,
            max_pages: config.max_pages.max(1),
            exact_match: config.exact_match,
            genre_marker: config.genre_marker.clone(),
        }
    }
}

/// Builds `/search/{kind}/{term}/results`, with the platform filter when given.
pub fn search_url(base: &Url, query: &SearchQuery) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ServiceError::ScrapeFailure(format!("invalid base url {base}")))?
        .pop_if_empty()
        .extend([
            "search",
            query.kind.as_deref().unwrap_or(DEFAULT_KIND),
            query.title.as_str(),
            "results",
        ]);

    if let Some(platform) = &query.platform {
        url.query_pairs_mut()
            .append_pair(&format!("plats[{platform}]"), "1")
            .append_pair("search_type", "advanced");
    }

    Ok(url)
}

pub(crate) fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_lowercase()
}

fn has_marker<'a>(mut lines: impl Iterator<Item = &'a str>, marker: &str) -> bool {
    lines.any(|line| {
        line.split(|c: char| !(c.is_alphanumeric() || c == '-'))
            .any(|token| token.eq_ignore_ascii_case(marker))
    })
}

#[derive(Debug, Default)]
pub(crate) struct PageRows {
    pub records: Vec<GameSummary>,
    pub next: Option<Url>,
}

fn extract(row: ElementRef<'_>, page_url: &Url) -> Option<GameSummary> {
    let link = row.select(&TITLE).next()?;
    let title = link.text().collect::<String>().trim().to_string();
    let score = row.select(&SCORE).next()?.text().collect::<String>().trim().to_string();
    let href = link.value().attr("href")?.trim();
    let url = page_url.join(href).ok()?.to_string();

    if title.is_empty() || score.is_empty() {
        return None;
    }

    Some(GameSummary { title, score, url })
}

/// Text of the row outside its title link: platform, type, release line.
fn details<'a>(row: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    let title = row.select(&TITLE).next().map(|link| link.id());

    row.descendants()
        .filter(move |node| !node.ancestors().any(|a| Some(a.id()) == title))
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
}

/// Reads every result row of one rendered page, in document order.
pub(crate) fn parse_page(html: &str, page_url: &Url, term: &str, exact: bool, marker: &str) -> PageRows {
    let document = Html::parse_document(html);
    let wanted = normalize(term);
    let mut records = Vec::new();

    for row in document.select(&ROW) {
        let Some(summary) = extract(row, page_url) else {
            tracing::debug!("skipping result row with missing fields");
            continue;
        };

        if exact && (normalize(&summary.title) != wanted || !has_marker(details(row), marker)) {
            continue;
        }

        records.push(summary);
    }

    let next = document
        .select(&NEXT_PAGE)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| page_url.join(href).ok());

    PageRows { records, next }
}

/// Drives `session` through the search result pages for `query`.
pub async fn scrape(
    session: &mut dyn PageSession,
    base: &Url,
    query: &SearchQuery,
    options: &ScrapeOptions,
) -> Result<Vec<GameSummary>> {
    let exact = query.exact.unwrap_or(options.exact_match);
    let mut url = search_url(base, query)?;
    let mut results = Vec::new();

    for page in 1..=options.max_pages {
        session.navigate(url.as_str()).await?;

        if session.exists(NO_RESULTS).await? {
            tracing::debug!(%url, "no results");
            break;
        }

        if !session.wait_for(RESULTS, options.wait_timeout).await? {
            match options.on_wait_timeout {
                WaitTimeoutPolicy::Empty => {
                    tracing::warn!(%url, "results never appeared, treating as empty");
                    break;
                }
                WaitTimeoutPolicy::Error => {
                    return Err(ServiceError::ScrapeFailure(format!(
                        "timed out after {}ms waiting for results at {url}",
                        options.wait_timeout.as_millis()
                    )));
                }
            }
        }

        let html = session.content().await?;
        let rows = parse_page(&html, &url, &query.title, exact, &options.genre_marker);
        tracing::debug!(page, count = rows.records.len(), "parsed result page");
        results.extend(rows.records);

        match rows.next {
            Some(next) if page < options.max_pages => url = next,
            _ => break,
        }
    }

    Ok(results)
}

/// Metacritic search through pooled browser sessions.
#[derive(Clone)]
pub struct MetacriticScraper {
    pool: SessionPool,
    base_url: Url,
    options: ScrapeOptions,
}

impl MetacriticScraper {
    pub fn new(pool: SessionPool, base_url: &str, options: ScrapeOptions) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::ScrapeFailure(format!("invalid metacritic url {base_url}: {e}")))?;

        Ok(Self {
            pool,
            base_url,
            options,
        })
    }
}

#[async_trait]
impl GameSearch for MetacriticScraper {
    type Output = Vec<GameSummary>;

    #[tracing::instrument(skip(self), fields(title = %query.title))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<GameSummary>> {
        let mut session = self.pool.acquire().await?;
        let result = scrape(session.page(), &self.base_url, query, &self.options).await;
        session.release().await;

        match &result {
            Ok(games) => tracing::info!(count = games.len(), "metacritic scrape complete"),
            Err(e) => tracing::error!(error = %e, "metacritic scrape failed"),
        }

        result
    }
}
