use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::Html,
    routing::get,
    Json, Router,
};
use askama::Template;
use chrono::{Local, Utc};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::info;

use crate::models::{CycleState, Lifecycle, Outcome};
use crate::state::StatusBoard;

pub async fn get_status(State(state): State<Arc<StatusBoard>>) -> Json<CycleState> {
    Json(state.snapshot().await)
}

pub async fn get_page(State(state): State<Arc<StatusBoard>>) -> Html<String> {
    Html(render_html(&state.snapshot().await))
}

pub fn create_router(state: Arc<StatusBoard>, img_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(get_page))
        .route("/api/status", get(get_status))
        .nest_service("/img", ServeDir::new(img_dir.as_ref()))
        .with_state(state)
}

pub async fn start_server(host: &str, port: u16, state: Arc<StatusBoard>) -> Result<()> {
    let app = create_router(state, "img");
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind status server on {}:{}", host, port))?;
    info!("Status server running on http://{}:{}", host, port);
    axum::serve(listener, app).await.context("Status server stopped")?;
    Ok(())
}

struct CardView {
    url: String,
    class: &'static str,
    outcome: &'static str,
    latency: String,
}

#[derive(Template)]
#[template(path = "status.html")]
struct StatusTemplate {
    summary: String,
    updated: String,
    year: String,
    cards: Vec<CardView>,
}

impl StatusTemplate {
    fn from_state(state: &CycleState) -> Self {
        let cards = state
            .results
            .iter()
            .map(|check| CardView {
                url: check.url.clone(),
                class: match check.outcome {
                    Outcome::Ok => "ok",
                    Outcome::Warning => "warning",
                    Outcome::Error => "error",
                },
                outcome: check.outcome.as_str(),
                latency: if check.is_measured() {
                    format!("{} ms", check.latency_ms)
                } else {
                    "n/a".to_string()
                },
            })
            .collect();

        let summary = match state.lifecycle {
            Lifecycle::Starting => "Starting, first check in progress...".to_string(),
            Lifecycle::Running if state.results.is_empty() => "Running, checking targets...".to_string(),
            Lifecycle::Running => format!("Running, {} targets checked", state.results.len()),
        };

        Self {
            summary,
            updated: state
                .updated_at
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "never".to_string()),
            year: Utc::now().format("%Y").to_string(),
            cards,
        }
    }
}

pub fn render_html(state: &CycleState) -> String {
    StatusTemplate::from_state(state)
        .render()
        .unwrap_or_else(|e| format!("<pre>Template error: {e}</pre>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckResult;
    use crate::testing::serve;

    fn sample_state() -> CycleState {
        CycleState {
            lifecycle: Lifecycle::Running,
            results: vec![
                CheckResult {
                    url: "https://ok.test".into(),
                    outcome: Outcome::Ok,
                    latency_ms: 50,
                },
                CheckResult::unreachable("https://down.test/?a=<b>"),
            ],
            updated_at: Some(Utc::now()),
        }
    }

    #[test]
    fn page_lists_every_result() {
        let html = render_html(&sample_state());
        assert!(html.contains("https://ok.test"));
        assert!(html.contains(r#"<span class="badge ok">OK</span>"#));
        assert!(html.contains("50 ms"));
        assert!(html.contains(r#"<span class="badge error">ERROR</span>"#));
        assert!(html.contains("n/a"));
        assert!(html.contains("Running, 2 targets checked"));
    }

    #[test]
    fn page_escapes_urls() {
        let html = render_html(&sample_state());
        assert!(html.contains("https://down.test/?a="));
        assert!(!html.contains("?a=<b>"));
    }

    #[test]
    fn starting_page_has_no_cards() {
        let html = render_html(&CycleState::default());
        assert!(html.contains("Starting"));
        assert!(html.contains("Last updated: never"));
        assert!(!html.contains(r#"class="card""#));
    }

    #[tokio::test]
    async fn status_endpoint_serves_snapshot() {
        let board = Arc::new(StatusBoard::new());
        board.publish(sample_state().results).await;
        let base = serve(create_router(Arc::clone(&board), "img")).await;

        let body: serde_json::Value = reqwest::get(format!("{base}/api/status"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "starting");
        assert_eq!(body["checks"].as_array().unwrap().len(), 2);
        assert_eq!(body["checks"][1]["status"], "ERROR");
        assert_eq!(body["checks"][1]["latency_ms"], -1);

        let page = reqwest::get(format!("{base}/")).await.unwrap();
        assert!(page.status().is_success());
        assert!(page.text().await.unwrap().contains("https://ok.test"));
    }

    #[tokio::test]
    async fn logo_is_served_from_img_dir() {
        let img_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/img");
        let base = serve(create_router(Arc::new(StatusBoard::new()), img_dir)).await;

        let html = reqwest::get(format!("{base}/")).await.unwrap().text().await.unwrap();
        assert!(html.contains(r#"src="img/logo.svg""#));

        let logo = reqwest::get(format!("{base}/img/logo.svg")).await.unwrap();
        assert!(logo.status().is_success());
        assert!(logo.text().await.unwrap().contains("<svg"));
    }
}
