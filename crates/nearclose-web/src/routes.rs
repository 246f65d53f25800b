use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use nearclose_core::{
    spreadsheet_bytes, LookupReport, LookupRequest, Notice, Symbol, UtcDateTime,
    ValidationError, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{lookup_status, WebError};
use crate::render;
use crate::state::AppState;

/// Assemble the application routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/check", post(check_form))
        .route("/export", get(export))
        .route("/api/check", get(check_api))
        .route("/health", get(health))
}

/// Form fields; both arrive as raw text so empty inputs can be reported nicely.
#[derive(Debug, Default, Deserialize)]
pub struct CheckForm {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub target_price: String,
    #[serde(default)]
    pub as_of: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub ticker: String,
    #[serde(default)]
    pub as_of: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub report: LookupReport,
    pub notices: Vec<Notice>,
}

/// `GET /`: empty form.
async fn index() -> Html<String> {
    Html(render::page(&render::form("", "")))
}

/// `POST /check`: run a lookup and render the result page.
async fn check_form(
    State(state): State<Arc<AppState>>,
    Form(input): Form<CheckForm>,
) -> Response {
    let form = render::form(&input.ticker, &input.target_price);

    if input.ticker.trim().is_empty() || input.target_price.trim().is_empty() {
        let body = format!("{form}{}", render::notices(&[Notice::missing_input()]));
        return (StatusCode::BAD_REQUEST, Html(render::page(&body))).into_response();
    }

    let result = match lookup_request(&input) {
        Ok(request) => state.service.lookup(request).await,
        Err(error) => Err(error.into()),
    };

    match result {
        Ok(report) => {
            let body = format!("{form}{}", render::report(&report));
            Html(render::page(&body)).into_response()
        }
        Err(error) => {
            tracing::debug!(code = error.code(), %error, "lookup failed");
            let body = format!("{form}{}", render::notices(&[error.notice()]));
            (lookup_status(&error), Html(render::page(&body))).into_response()
        }
    }
}

/// `GET /api/check`: run a lookup and return the JSON report.
async fn check_api(
    State(state): State<Arc<AppState>>,
    Query(input): Query<CheckForm>,
) -> Result<Json<CheckResponse>, WebError> {
    let request = lookup_request(&input)?;
    let report = state.service.lookup(request).await?;
    let notices = report.notices();
    Ok(Json(CheckResponse { report, notices }))
}

/// `GET /export`: download the raw history as a spreadsheet.
async fn export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, WebError> {
    let symbol = Symbol::parse(&query.ticker)?;
    let as_of = resolve_as_of(query.as_of.as_deref())?;

    let series = state.service.history(&symbol, as_of).await?;
    let bytes = spreadsheet_bytes(&series)?;
    tracing::info!(%symbol, records = series.len(), "spreadsheet exported");

    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "source": state.service.source_id() }))
}

fn lookup_request(input: &CheckForm) -> Result<LookupRequest, ValidationError> {
    let as_of = resolve_as_of(input.as_of.as_deref())?;
    LookupRequest::parse(&input.ticker, &input.target_price, as_of)
}

/// "now" unless the caller pinned the window end, e.g. from an export link.
fn resolve_as_of(value: Option<&str>) -> Result<UtcDateTime, ValidationError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => UtcDateTime::parse(text),
        _ => Ok(UtcDateTime::now()),
    }
}
