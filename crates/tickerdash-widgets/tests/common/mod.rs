//! In-memory backend for widget tests.
//!
//! Serves the REST endpoints the managers call and counts requests per
//! `METHOD /path` so tests can assert on reloads.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tickerdash_api::ApiClient;
use tickerdash_core::{
    Alert, BotStatus, ClosingPrice, ColumnPreference, DrainerEvent, JobAccepted, Kpi, KpiUnit,
    NewAlert, NewPosition, NewsItem, PortfolioPosition, StockPrice,
};
use tickerdash_push::PushHub;
use tickerdash_widgets::{RecordingSurface, WidgetContext, WidgetSettings};
use tokio::net::TcpListener;

#[derive(Default)]
pub struct Backend {
    pub alerts: Mutex<Vec<Alert>>,
    pub positions: Mutex<Vec<PortfolioPosition>>,
    pub columns: Mutex<ColumnPreference>,
    pub news_count: Mutex<usize>,
    pub fail_kpis: Mutex<bool>,
    next_id: Mutex<i64>,
    hits: Mutex<HashMap<String, usize>>,
}

impl Backend {
    pub fn hits(&self, key: &str) -> usize {
        self.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }
}

async fn count_hits(State(backend): State<Arc<Backend>>, req: Request, next: Next) -> Response {
    let key = format!("{} {}", req.method(), req.uri().path());
    *backend.hits.lock().unwrap().entry(key).or_default() += 1;
    next.run(req).await
}

async fn stocks(Query(q): Query<HashMap<String, String>>) -> Json<Vec<StockPrice>> {
    let all = vec![
        StockPrice {
            symbol: "AAPL".to_string(),
            name: Some("Apple".to_string()),
            price: dec!(190.5),
            change: Some(dec!(1.5)),
            change_percent: Some(dec!(0.79)),
            volume: Some(1000),
            updated_at: None,
        },
        StockPrice {
            symbol: "KO".to_string(),
            name: Some("Coca-Cola".to_string()),
            price: dec!(61),
            change: Some(dec!(-0.2)),
            change_percent: Some(dec!(-0.33)),
            volume: None,
            updated_at: None,
        },
    ];
    let prices = match q.get("filter").map(String::as_str) {
        Some("dividend") => all.into_iter().filter(|s| s.symbol == "KO").collect(),
        _ => all,
    };
    Json(prices)
}

async fn get_columns(State(b): State<Arc<Backend>>) -> Json<ColumnPreference> {
    Json(b.columns.lock().unwrap().clone())
}

async fn save_columns(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> Json<ColumnPreference> {
    let visible: Vec<String> = serde_json::from_value(body["visible"].clone()).unwrap_or_default();
    let mut columns = b.columns.lock().unwrap();
    columns.visible = visible;
    Json(columns.clone())
}

async fn list_alerts(State(b): State<Arc<Backend>>) -> Json<Vec<Alert>> {
    Json(b.alerts.lock().unwrap().clone())
}

async fn create_alert(
    State(b): State<Arc<Backend>>,
    Json(new): Json<NewAlert>,
) -> Json<Alert> {
    let alert = Alert {
        id: b.next_id(),
        symbol: new.symbol,
        target_price: new.target_price,
        condition: new.condition,
    };
    b.alerts.lock().unwrap().push(alert.clone());
    Json(alert)
}

async fn remove_alert(State(b): State<Arc<Backend>>, Path(id): Path<i64>) -> StatusCode {
    let mut alerts = b.alerts.lock().unwrap();
    let before = alerts.len();
    alerts.retain(|a| a.id != id);
    if alerts.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn list_positions(State(b): State<Arc<Backend>>) -> Json<Vec<PortfolioPosition>> {
    Json(b.positions.lock().unwrap().clone())
}

async fn create_position(
    State(b): State<Arc<Backend>>,
    Json(new): Json<NewPosition>,
) -> Json<PortfolioPosition> {
    let position = PortfolioPosition {
        id: b.next_id(),
        symbol: new.symbol,
        quantity: new.quantity,
        purchase_price: new.purchase_price,
        current_price: None,
        purchase_date: new.purchase_date,
    };
    b.positions.lock().unwrap().push(position.clone());
    Json(position)
}

async fn kpis(State(b): State<Arc<Backend>>) -> Result<Json<Vec<Kpi>>, (StatusCode, Json<Value>)> {
    if *b.fail_kpis.lock().unwrap() {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "kpi cache unavailable"})),
        ));
    }
    Ok(Json(vec![Kpi {
        name: "Net worth".to_string(),
        value: dec!(52000),
        unit: KpiUnit::Currency,
        change: Some(dec!(1.2)),
    }]))
}

async fn news(State(b): State<Arc<Backend>>) -> Json<Vec<NewsItem>> {
    let count = *b.news_count.lock().unwrap();
    Json(
        (0..count)
            .map(|i| NewsItem {
                title: format!("Headline {i}"),
                url: None,
                source: Some("wire".to_string()),
                symbol: None,
                published_at: None,
            })
            .collect(),
    )
}

async fn drainer_events() -> Json<Vec<DrainerEvent>> {
    Json(vec![DrainerEvent {
        symbol: "TSLA".to_string(),
        detected_at: "2026-03-02T15:04:05Z".parse().unwrap(),
        event_type: "volume_drain".to_string(),
        magnitude: Some(dec!(-4.2)),
        description: None,
    }])
}

async fn start_job(Path(name): Path<String>) -> Json<JobAccepted> {
    let job = if name == "analyze" { "drainer" } else { "bot_update" };
    Json(JobAccepted {
        job: job.to_string(),
        message: None,
    })
}

async fn bot_status() -> Json<BotStatus> {
    Json(BotStatus {
        running: true,
        ..BotStatus::default()
    })
}

async fn closing() -> Json<Vec<ClosingPrice>> {
    Json(vec![ClosingPrice {
        symbol: "AAPL".to_string(),
        date: "2026-03-02".parse().unwrap(),
        close: dec!(189.9),
        change_percent: Some(dec!(-0.4)),
    }])
}

pub fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/api/stocks", get(stocks))
        .route("/api/stocks/filters", get(|| async { Json(vec!["dividend", "tech"]) }))
        .route("/api/columns/{table}", get(get_columns).post(save_columns))
        .route("/api/alerts", get(list_alerts).post(create_alert))
        .route("/api/alerts/{id}", delete(remove_alert))
        .route("/api/portfolio", get(list_positions).post(create_position))
        .route("/api/kpis", get(kpis))
        .route("/api/news", get(news))
        .route("/api/drainer/events", get(drainer_events))
        .route("/api/drainer/{name}", post(start_job))
        .route("/api/bot/status", get(bot_status))
        .route("/api/bot/{name}", post(start_job))
        .route("/api/closing", get(closing))
        .layer(middleware::from_fn_with_state(backend.clone(), count_hits))
        .with_state(backend)
}

pub async fn spawn_backend(backend: Arc<Backend>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(backend);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub struct Harness {
    pub backend: Arc<Backend>,
    pub surface: Arc<RecordingSurface>,
    pub push: PushHub,
    pub ctx: WidgetContext,
}

pub async fn harness() -> Harness {
    let backend = Arc::new(Backend::default());
    *backend.columns.lock().unwrap() = ColumnPreference::new(
        ["symbol", "name", "price", "change", "change_percent", "volume"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        vec!["symbol".to_string(), "price".to_string()],
    );
    let addr = spawn_backend(backend.clone()).await;

    let surface = Arc::new(RecordingSurface::new());
    let push = PushHub::default();
    let api = ApiClient::new(&format!("http://{addr}")).unwrap();
    let ctx = WidgetContext::new(api, surface.clone(), push.clone()).with_settings(WidgetSettings {
        news_limit: 3,
        log_lines: 50,
    });

    Harness {
        backend,
        surface,
        push,
        ctx,
    }
}
