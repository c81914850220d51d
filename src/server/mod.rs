//! Delivery surface: one page with a ticker form, one download route.
//!
//! Each request runs a full pipeline pass; nothing is cached between
//! requests and no report is persisted server-side.

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::pipeline::ReportPipeline;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::{error, info};

const INDEX_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Stock Analysis Report Generator</title></head>
<body>
  <h1>Stock Analysis Report Generator</h1>
  <form action="/report" method="get">
    <label for="ticker">Ticker symbol</label>
    <input id="ticker" name="ticker" placeholder="NEE" required>
    <button type="submit">Generate Word Report</button>
  </form>
</body>
</html>
"#;

#[derive(Clone)]
struct AppState {
    config: AppConfig,
}

/// Run the HTTP server until shutdown.
pub async fn serve(config: AppConfig) -> Result<()> {
    let bind = config.server.bind.clone();
    let app = router(config);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| Error::Server(format!("cannot bind {bind}: {e}")))?;
    info!("Listening on http://{}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(e.to_string()))
}

fn router(config: AppConfig) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/report", get(download_report))
        .with_state(AppState { config })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    ticker: String,
}

async fn download_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let pipeline = ReportPipeline::new(state.config.clone());

    match pipeline.run(&query.ticker).await {
        Ok(artifact) => (
            [
                (header::CONTENT_TYPE, artifact.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    attachment_disposition(&artifact.file_name),
                ),
            ],
            artifact.bytes,
        )
            .into_response(),
        Err(err) => {
            error!("{}: report generation failed: {}", query.ticker, err);
            (error_status(&err), format!("report generation failed: {err}")).into_response()
        }
    }
}

fn attachment_disposition(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}

/// Upstream lookup failures are the provider's fault; everything else is ours.
fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::Fetch { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
