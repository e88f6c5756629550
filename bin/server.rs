// Reading Stats - Web Server
// JSON API over the local library store

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{Local, NaiveDate};
use log::{error, info};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use reading_stats::config::db_path_from_env;
use reading_stats::{
    get_all_entries, parse_date, setup_database, EngineConfig, LibraryEntry, MonthKey,
    MonthlyBreakdown, RankingPopulation, StatsEngine, TrailingWindow, ViewParams,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    engine: Arc<StatsEngine>,
}

impl AppState {
    /// Fresh snapshot of the store for one computation pass
    fn snapshot(&self) -> Result<Vec<LibraryEntry>> {
        let conn = self
            .db
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))?;
        get_all_entries(&conn)
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn fail(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

fn internal_error(context: &str, e: anyhow::Error) -> Response {
    error!("{}: {:#}", context, e);
    fail(StatusCode::INTERNAL_SERVER_ERROR, format!("{}: {}", context, e))
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    window: Option<String>,
}

impl WindowQuery {
    fn resolve(&self, engine: &StatsEngine) -> Result<TrailingWindow, Response> {
        match &self.window {
            Some(raw) => raw
                .parse()
                .map_err(|e: anyhow::Error| fail(StatusCode::BAD_REQUEST, e.to_string())),
            None => Ok(engine.config.default_window),
        }
    }
}

#[derive(Serialize)]
struct BreakdownResponse<'a> {
    selected: Option<MonthKey>,
    stale: bool,
    entries: Vec<&'a LibraryEntry>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// GET /api/entries - Every entry in store order
async fn get_entries(State(state): State<AppState>) -> Response {
    match state.snapshot() {
        Ok(entries) => ApiResponse::ok(entries),
        Err(e) => internal_error("Error getting entries", e),
    }
}

/// GET /api/stats?window= - Full report
async fn get_stats(State(state): State<AppState>, Query(query): Query<WindowQuery>) -> Response {
    let window = match query.resolve(&state.engine) {
        Ok(window) => window,
        Err(response) => return response,
    };

    match state.snapshot() {
        Ok(entries) => {
            let report = state.engine.compute(&entries, &ViewParams::new(today(), window));
            ApiResponse::ok(report)
        }
        Err(e) => internal_error("Error computing stats", e),
    }
}

/// GET /api/stats/overview
async fn get_overview(State(state): State<AppState>) -> Response {
    match state.snapshot() {
        Ok(entries) => ApiResponse::ok(state.engine.overview(&entries, today())),
        Err(e) => internal_error("Error computing overview", e),
    }
}

/// GET /api/stats/habits?window=
async fn get_habits(State(state): State<AppState>, Query(query): Query<WindowQuery>) -> Response {
    let window = match query.resolve(&state.engine) {
        Ok(window) => window,
        Err(response) => return response,
    };

    match state.snapshot() {
        Ok(entries) => ApiResponse::ok(state.engine.habits(&entries, window)),
        Err(e) => internal_error("Error computing habits", e),
    }
}

fn ranking(state: &AppState, population: RankingPopulation) -> Response {
    match state.snapshot() {
        Ok(entries) => ApiResponse::ok(state.engine.taxonomy(&entries, population)),
        Err(e) => internal_error("Error computing rankings", e),
    }
}

/// GET /api/stats/genres
async fn get_genres(State(state): State<AppState>) -> Response {
    ranking(&state, RankingPopulation::Finished)
}

/// GET /api/stats/wishlist
async fn get_wishlist(State(state): State<AppState>) -> Response {
    ranking(&state, RankingPopulation::Wishlist)
}

/// GET /api/rankings/:population - finished | genres | wishlist | want_to_read
async fn get_rankings(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    match raw.parse::<RankingPopulation>() {
        Ok(population) => ranking(&state, population),
        Err(e) => fail(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// GET /api/calendar/:year/:month
async fn get_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Response {
    let Some(month) = MonthKey::new(year, month) else {
        return fail(StatusCode::BAD_REQUEST, format!("Invalid month: {}-{}", year, month));
    };

    match state.snapshot() {
        Ok(entries) => ApiResponse::ok(state.engine.calendar(&entries, month)),
        Err(e) => internal_error("Error building calendar", e),
    }
}

/// GET /api/day/:date - Calendar drill-down on one day
async fn get_calendar_day(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let Some(date) = parse_date(&raw) else {
        return fail(StatusCode::BAD_REQUEST, format!("Invalid date: {}", raw));
    };

    match state.snapshot() {
        Ok(entries) => {
            let view = state.engine.calendar(&entries, MonthKey::of(date));
            match view.select_day(date) {
                Some(detail) => ApiResponse::ok(detail),
                None => fail(StatusCode::NOT_FOUND, format!("Nothing finished on {}", date)),
            }
        }
        Err(e) => internal_error("Error building calendar", e),
    }
}

fn breakdown_response(state: &AppState, window: TrailingWindow, mut selection: MonthlyBreakdown) -> Response {
    match state.snapshot() {
        Ok(entries) => {
            let listed = state.engine.breakdown(&entries, window, &mut selection);
            let series = state.engine.habits(&entries, window).monthly;
            ApiResponse::ok(BreakdownResponse {
                selected: selection.selected(),
                stale: selection.is_stale(&series),
                entries: listed,
            })
        }
        Err(e) => internal_error("Error computing breakdown", e),
    }
}

/// GET /api/breakdown?window= - Most recent month
async fn get_breakdown_default(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Response {
    match query.resolve(&state.engine) {
        Ok(window) => breakdown_response(&state, window, MonthlyBreakdown::new()),
        Err(response) => response,
    }
}

/// GET /api/breakdown/:year/:month?window=
async fn get_breakdown(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<WindowQuery>,
) -> Response {
    let Some(month) = MonthKey::new(year, month) else {
        return fail(StatusCode::BAD_REQUEST, format!("Invalid month: {}-{}", year, month));
    };

    match query.resolve(&state.engine) {
        Ok(window) => {
            let mut selection = MonthlyBreakdown::new();
            selection.select(month);
            breakdown_response(&state, window, selection)
        }
        Err(response) => response,
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🌐 Reading Stats - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = db_path_from_env();
    let conn = Connection::open(&db_path).with_context(|| format!("Failed to open {}", db_path))?;
    setup_database(&conn)?;
    info!("Store opened: {}", db_path);

    let engine = StatsEngine::with_config(EngineConfig::from_env()?);

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        engine: Arc::new(engine),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/entries", get(get_entries))
        .route("/stats", get(get_stats))
        .route("/stats/overview", get(get_overview))
        .route("/stats/habits", get(get_habits))
        .route("/stats/genres", get(get_genres))
        .route("/stats/wishlist", get(get_wishlist))
        .route("/rankings/:population", get(get_rankings))
        .route("/calendar/:year/:month", get(get_calendar))
        .route("/day/:date", get(get_calendar_day))
        .route("/breakdown", get(get_breakdown_default))
        .route("/breakdown/:year/:month", get(get_breakdown))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = std::env::var("READING_STATS_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/stats", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
