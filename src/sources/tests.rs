use super::*;
use crate::config::NintendoConfig;
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;
use tracing_test::traced_test;

fn nintendo_config() -> NintendoConfig {
    NintendoConfig {
        filter_query: "type:GAME".to_string(),
        rows: 24,
        sort: "score desc".to_string(),
    }
}

#[test]
fn query_requires_title() {
    let missing = SearchQuery::try_from(SearchParams::default());
    assert!(matches!(missing, Err(ServiceError::MissingParameter("title"))));

    let blank = SearchQuery::try_from(SearchParams {
        title: Some("   ".to_string()),
        ..Default::default()
    });
    assert!(matches!(blank, Err(ServiceError::MissingParameter("title"))));
}

#[test]
fn query_trims_and_drops_empty_options() {
    let query = SearchQuery::try_from(SearchParams {
        title: Some("  Hades ".to_string()),
        year: Some("".to_string()),
        kind: Some("game".to_string()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(query.title, "Hades");
    assert_eq!(query.year, None);
    assert_eq!(query.kind.as_deref(), Some("game"));
}

#[test]
fn hltb_body_carries_title_and_year() {
    let client = hltb::HltbClient::new(reqwest::Client::new(), "http://localhost", 20);
    let mut query = SearchQuery::new("Celeste");
    query.year = Some("2018".to_string());

    let body = client.request_body(&query);

    assert_eq!(body["searchTerms"], json!(["Celeste"]));
    assert_eq!(body["size"], 20);
    assert_eq!(body["searchOptions"]["games"]["rangeYear"]["min"], json!(["2018"]));
    assert_eq!(body["searchOptions"]["games"]["rangeYear"]["max"], json!(["2018"]));
    assert_eq!(body["searchOptions"]["users"]["sortCategory"], "postcount");
}

#[test]
fn hltb_body_without_year_sends_null_range() {
    let client = hltb::HltbClient::new(reqwest::Client::new(), "http://localhost", 20);

    let body = client.request_body(&SearchQuery::new("Celeste"));

    assert_eq!(body["searchOptions"]["games"]["rangeYear"]["min"], json!([null]));
    assert_eq!(body["searchOptions"]["games"]["rangeYear"]["max"], json!([null]));
}

#[tokio::test]
#[traced_test]
async fn hltb_passes_body_through_unchanged() {
    let server = MockServer::start_async().await;
    let upstream = r#"{"data":[{"game_name":"Celeste","comp_main":  30000}],"count":1}"#;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/search")
                .header("content-type", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .body(upstream);
        })
        .await;

    let client = hltb::HltbClient::new(reqwest::Client::new(), server.base_url(), 20);
    let body = client.search(&SearchQuery::new("Celeste")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(&body[..], upstream.as_bytes());
}

#[tokio::test]
#[traced_test]
async fn hltb_non_success_is_upstream_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/search");
            then.status(502);
        })
        .await;

    let client = hltb::HltbClient::new(reqwest::Client::new(), server.base_url(), 20);
    let err = client.search(&SearchQuery::new("Celeste")).await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::UpstreamUnavailable { status: Some(502), .. }
    ));
}

#[tokio::test]
#[traced_test]
async fn hltb_html_body_is_upstream_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/search");
            then.status(200).header("content-type", "text/html").body("<html>blocked</html>");
        })
        .await;

    let client = hltb::HltbClient::new(reqwest::Client::new(), server.base_url(), 20);
    let err = client.search(&SearchQuery::new("Celeste")).await.unwrap_err();

    assert!(matches!(err, ServiceError::UpstreamUnavailable { status: None, .. }));
}

#[tokio::test]
#[traced_test]
async fn reviews_search_sends_fixed_sort() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/list/query")
                .query_param("search", "Metroid Dread")
                .query_param("sort", "release_date")
                .query_param("dir", "asc")
                .query_param("notuser", "true");
            then.status(200).body(r#"[{"title":"Metroid Dread"}]"#);
        })
        .await;

    let client = reviews::ReviewsClient::new(reqwest::Client::new(), server.base_url());
    let body = client.search(&SearchQuery::new("Metroid Dread")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(&body[..], br#"[{"title":"Metroid Dread"}]"#);
}

#[tokio::test]
#[traced_test]
async fn reviews_status_reports_upstream_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(503);
        })
        .await;

    let client = reviews::ReviewsClient::new(reqwest::Client::new(), server.base_url());
    let status = client.status().await.unwrap();

    assert_eq!(status.as_u16(), 503);
}

#[tokio::test]
#[traced_test]
async fn nintendo_keeps_only_games() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/en/select")
                .query_param("q", "Mario")
                .query_param("wt", "json")
                .query_param("fq", "type:GAME");
            then.status(200).json_body(json!({
                "response": {
                    "numFound": 3,
                    "docs": [
                        { "title": "Super Mario Odyssey", "type": "GAME" },
                        { "title": "Mario amiibo", "type": "MERCHANDISE" },
                        { "title": "Mario Kart 8 Deluxe", "type": "GAME" }
                    ]
                }
            }));
        })
        .await;

    let client = nintendo::NintendoClient::new(reqwest::Client::new(), server.base_url(), nintendo_config());
    let games = client.search(&SearchQuery::new("Mario")).await.unwrap();

    mock.assert_async().await;
    let titles: Vec<_> = games.iter().map(|g| g["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Super Mario Odyssey", "Mario Kart 8 Deluxe"]);
}
