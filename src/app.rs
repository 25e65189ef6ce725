use crate::state::app_config::AppConfig;
use dota_widget_api::client::{ApiError, ApiResult, LiveApi};
use dota_widget_api::{WidgetCode, WidgetKind, select_matches};
use log::{debug, error, info, warn};

/// What a single refresh did, for the closing log line and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub selected: usize,
    pub kind: WidgetKind,
    /// VK answered with an `error` object instead of applying the update.
    pub rejected: bool,
}

/// One widget refresh: fetch live games, keep whitelisted leagues, publish.
///
/// Fetch and serialization failures degrade to the "no live matches" widget.
/// Only a failed publish request is returned as an error.
pub async fn run(api: &LiveApi, config: &AppConfig) -> ApiResult<RunReport> {
    let live = match api.fetch_live_matches().await {
        Ok(live) => live,
        Err(e) => {
            warn!("live match fetch failed, continuing with none: {e}");
            Vec::new()
        }
    };
    debug!("{} live matches, whitelist {:?}", live.len(), config.whitelist);

    let selected = select_matches(&live, &config.whitelist);
    let whitelisted = live
        .iter()
        .filter(|m| m.league_id.is_some_and(|id| config.whitelist.contains(&id)));
    for m in whitelisted.take(selected.len()) {
        debug!(
            "league {:?}: {} vs {} (live since {})",
            m.league_id,
            m.team_name_radiant.as_deref().unwrap_or("?"),
            m.team_name_dire.as_deref().unwrap_or("?"),
            m.activated_at().map(|t| t.to_rfc3339()).unwrap_or_else(|| "unknown".into()),
        );
    }
    let selected_count = selected.len();

    let widget = WidgetCode::build(selected).unwrap_or_else(|e| {
        error!("could not serialize widget payload, sending fallback: {e}");
        WidgetCode::no_matches()
    });

    let mut report = RunReport {
        fetched: live.len(),
        selected: selected_count,
        kind: widget.kind,
        rejected: false,
    };

    match api.publish_widget(&widget, &config.vk_api_key).await {
        Ok(()) => {}
        Err(e @ ApiError::Rejected { .. }) => {
            warn!("{e}");
            report.rejected = true;
        }
        Err(e) => return Err(e),
    }

    info!(
        "published {} widget: {} of {} live matches selected",
        report.kind, report.selected, report.fetched
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    const LIVE_BODY: &str = r#"[
        {"league_id":100,"team_name_radiant":"Alpha","team_name_dire":"Beta","radiant_score":12,"dire_score":9},
        {"league_id":200,"team_name_radiant":"Gamma","team_name_dire":"Delta","radiant_score":3,"dire_score":4}
    ]"#;

    fn api_for(server: &Server) -> LiveApi {
        LiveApi::new()
            .with_publish_timeout(Some(Duration::from_secs(5)))
            .with_base_urls(server.url(), server.url())
    }

    async fn mock_live(server: &mut Server, status: usize, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/api/live")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    fn config(key: &str, whitelist: Vec<i64>) -> AppConfig {
        AppConfig { vk_api_key: key.into(), whitelist }
    }

    #[tokio::test]
    async fn whitelisted_match_publishes_matches_widget() {
        let mut server = Server::new_async().await;
        let _live = mock_live(&mut server, 200, LIVE_BODY).await;
        let expected_code = concat!(
            r#"return{"title":"Live Dota 2 Matches","matches":["#,
            r#"{"team_a":{"name":"Alpha"},"team_b":{"name":"Beta"},"score":{"team_a":12,"team_b":9}}"#,
            "]};"
        );
        let publish = server
            .mock("GET", "/method/appWidgets.update")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("access_token".into(), "token".into()),
                Matcher::UrlEncoded("type".into(), "matches".into()),
                Matcher::UrlEncoded("code".into(), expected_code.into()),
            ]))
            .with_body(r#"{"response":1}"#)
            .create_async()
            .await;

        let report = run(&api_for(&server), &config("token", vec![100])).await.unwrap();
        publish.assert_async().await;
        assert_eq!(
            report,
            RunReport { fetched: 2, selected: 1, kind: WidgetKind::Matches, rejected: false }
        );
    }

    #[tokio::test]
    async fn no_whitelisted_match_publishes_text_fallback() {
        let mut server = Server::new_async().await;
        let _live = mock_live(&mut server, 200, LIVE_BODY).await;
        let publish = server
            .mock("GET", "/method/appWidgets.update")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("type".into(), "text".into()),
                Matcher::UrlEncoded("code".into(), dota_widget_api::NO_MATCHES_CODE.into()),
            ]))
            .create_async()
            .await;

        let report = run(&api_for(&server), &config("token", vec![300])).await.unwrap();
        publish.assert_async().await;
        assert_eq!(report.selected, 0);
        assert_eq!(report.kind, WidgetKind::Text);
    }

    #[tokio::test]
    async fn unreadable_config_sends_fallback_with_empty_token() {
        let mut server = Server::new_async().await;
        let _live = mock_live(&mut server, 200, LIVE_BODY).await;
        let publish = server
            .mock("GET", "/method/appWidgets.update")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("access_token".into(), String::new()),
                Matcher::UrlEncoded("type".into(), "text".into()),
            ]))
            .with_body(r#"{"error":{"error_code":5,"error_msg":"User authorization failed"}}"#)
            .create_async()
            .await;

        let config = AppConfig::load_or_default("/nonexistent/dota-widget/app.json");
        let report = run(&api_for(&server), &config).await.unwrap();
        publish.assert_async().await;
        assert_eq!(report.kind, WidgetKind::Text);
        assert!(report.rejected);
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_fallback() {
        let mut server = Server::new_async().await;
        let _live = mock_live(&mut server, 502, "bad gateway").await;
        let publish = server
            .mock("GET", "/method/appWidgets.update")
            .match_query(Matcher::UrlEncoded("type".into(), "text".into()))
            .create_async()
            .await;

        let report = run(&api_for(&server), &config("token", vec![100])).await.unwrap();
        publish.assert_async().await;
        assert_eq!(report.fetched, 0);
        assert_eq!(report.kind, WidgetKind::Text);
    }

    #[tokio::test]
    async fn publish_transport_failure_is_returned() {
        let mut server = Server::new_async().await;
        let _live = mock_live(&mut server, 200, LIVE_BODY).await;
        let api = LiveApi::new()
            .with_publish_timeout(Some(Duration::from_secs(2)))
            .with_base_urls(server.url(), "http://127.0.0.1:1");

        let err = run(&api, &config("token", vec![100])).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_, _)), "got {err}");
    }
}
