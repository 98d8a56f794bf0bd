use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const TELEGRAM_TEST_TOKEN: &str = "test-token";

pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// /slow answers after 300 ms, /hang never answers in test time.
pub async fn spawn_targets() -> String {
    let router = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                "slow"
            }),
        )
        .route("/error", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .route(
            "/hang",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "late"
            }),
        );
    serve(router).await
}

#[derive(Clone)]
struct StubState {
    reply: StatusCode,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
}

pub struct TelegramStub {
    pub base_url: String,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl TelegramStub {
    pub async fn messages(&self) -> Vec<serde_json::Value> {
        self.received.lock().await.clone()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.messages()
            .await
            .iter()
            .filter_map(|m| m["text"].as_str().map(str::to_string))
            .collect()
    }
}

async fn record(
    State(state): State<StubState>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    state.received.lock().await.push(body);
    state.reply
}

pub async fn spawn_telegram_stub(reply: StatusCode) -> TelegramStub {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        reply,
        received: Arc::clone(&received),
    };
    let router = Router::new()
        .route(
            &format!("/bot{TELEGRAM_TEST_TOKEN}/sendMessage"),
            post(record),
        )
        .with_state(state);
    TelegramStub {
        base_url: serve(router).await,
        received,
    }
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .without_time()
            .finish()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
