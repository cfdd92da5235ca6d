use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    extract::{Query, State},
    http::{Method, header::CONTENT_TYPE},
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::{
    net::TcpListener,
    signal::{
        ctrl_c,
        unix::{SignalKind, signal},
    },
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::error::AppError;
use crate::filter::FilterCriteria;
use crate::models::{BucketCount, LeaderboardRow, RankedRow};
use crate::query;
use crate::score::Metric;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankingParams {
    department: Option<String>,
    starting_year: Option<String>,
    ending_year: Option<String>,
    sort_order: Option<String>,
}

#[derive(Serialize)]
struct RankingResponse {
    data: Vec<RankedRow>,
    stats: Vec<BucketCount>,
}

async fn cgpa_ranking(
    State(pool): State<PgPool>,
    Query(params): Query<RankingParams>,
) -> Result<Json<RankingResponse>, AppError> {
    let criteria = FilterCriteria::from_params(
        params.department.as_deref(),
        params.starting_year.as_deref(),
        params.ending_year.as_deref(),
        params.sort_order.as_deref(),
        None,
    )?;

    let data = query::fetch_ranking(&pool, &criteria, Metric::Cgpa).await?;

    // Ranking and distribution are independent failure domains: a failed
    // distribution degrades to an empty stats list, it never fails the view.
    let stats = match query::fetch_score_distribution(&pool, &criteria, Metric::Cgpa).await {
        Ok(stats) => stats,
        Err(err) => {
            warn!(error = %err, "distribution query failed, returning empty stats");
            Vec::new()
        }
    };

    Ok(Json(RankingResponse { data, stats }))
}

#[derive(Deserialize)]
struct LeaderboardParams {
    department: Option<String>,
    batch: Option<String>,
    sort: Option<String>,
    search: Option<String>,
}

async fn leaderboard(
    State(pool): State<PgPool>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<LeaderboardRow>>, AppError> {
    let criteria = FilterCriteria::from_listing_params(
        params.department.as_deref(),
        params.batch.as_deref(),
        params.sort.as_deref(),
        params.search.as_deref(),
    )?;

    let rows = query::fetch_leaderboard(&pool, &criteria).await?;
    Ok(Json(rows))
}

async fn departments(State(pool): State<PgPool>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(query::fetch_departments(&pool).await?))
}

async fn batches(State(pool): State<PgPool>) -> Result<Json<Vec<i32>>, AppError> {
    Ok(Json(query::fetch_batches(&pool).await?))
}

pub fn router(pool: PgPool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/students/cgpa-ranking", get(cgpa_ranking))
        .route("/students", get(leaderboard))
        .route("/students/departments", get(departments))
        .route("/students/batches", get(batches))
        .layer(cors)
        .with_state(pool)
}

pub async fn serve(pool: PgPool, port: u16) -> anyhow::Result<()> {
    let app = router(pool);

    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Dashboard API listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with an error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
