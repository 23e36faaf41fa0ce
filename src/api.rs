//! HTTP surface of the content store.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::content::{ContentRow, ContentStore};
use crate::error::ContentError;
use crate::i18n::{negotiate_locale, Locale, LocaleHints, LocalizationMetrics};
use crate::security::{authorize, API_KEY_HEADER};
use crate::validation::ContentGate;

#[derive(Clone)]
pub struct AppState {
    pub store: ContentStore,
    pub gate: Arc<ContentGate>,
    /// When set, writes and deletes need a matching `X-API-Key` header
    pub api_key: Option<Arc<str>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/content",
            get(get_content)
                .post(write_content)
                .put(write_content)
                .delete(delete_content),
        )
        .route("/api/content/published", get(get_published))
        .route("/api/localization/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Errors ====================

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    Content(ContentError),
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        ApiError::Content(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::Content(ContentError::Validation(details)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            ApiError::Content(ContentError::UnknownLocale(code)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Unsupported language: {}", code) }),
            ),
            ApiError::Content(
                e @ (ContentError::Conflict { .. } | ContentError::StaleWrite { .. }),
            ) => (StatusCode::CONFLICT, json!({ "error": e.to_string() })),
            ApiError::Content(ContentError::PartialSectionWrite {
                section,
                saved,
                failed_field,
                source,
            }) => {
                error!(section, failed_field, "Section partially saved: {}", source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Failed to save content",
                        "section": section,
                        "failed_field": failed_field,
                        "saved": saved.iter().map(|row| row.key.as_str()).collect::<Vec<_>>(),
                    }),
                )
            }
            ApiError::Content(e) => {
                error!("Content request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ==================== Handlers ====================

#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    pub key: Option<String>,
    pub section: Option<String>,
    pub language: Option<String>,
    pub lang: Option<String>,
}

impl ContentQuery {
    fn locale(&self) -> ApiResult<Option<Locale>> {
        self.language
            .as_deref()
            .or(self.lang.as_deref())
            .filter(|code| !code.is_empty())
            .map(|code| code.parse::<Locale>().map_err(ApiError::from))
            .transpose()
    }
}

#[derive(Debug, Serialize)]
struct SectionEntry {
    lang: Locale,
    data: BTreeMap<String, String>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize)]
struct SectionWriteResponse {
    success: bool,
    results: Vec<ContentRow>,
}

async fn get_content(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> ApiResult<Json<Value>> {
    let language = query.locale()?;

    if let Some(section) = query.section.as_deref().filter(|s| !s.is_empty()) {
        let grouped = state.store.get_by_section(section, language).await?;
        let content: Vec<SectionEntry> = grouped
            .into_iter()
            .map(|(lang, section)| SectionEntry {
                lang,
                data: section.data,
                updated_at: section.updated_at,
            })
            .collect();
        return Ok(Json(json!({ "content": content })));
    }

    if let Some(key) = query.key.as_deref().filter(|k| !k.is_empty()) {
        let rows = state.store.get_by_key(key, language).await?;
        return Ok(Json(json!({ "content": rows })));
    }

    Err(ApiError::BadRequest("Key or section is required".to_string()))
}

/// POST and PUT: a section write when the body names a section, a
/// single-key write otherwise.
async fn write_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> ApiResult<Response> {
    require_api_key(&state, &headers)?;

    if payload.get("section").is_some() {
        let request = state.gate.section_write(&payload)?;
        let results = state
            .store
            .save_section(&request.section, request.language, request.fields, request.published)
            .await?;

        let response = SectionWriteResponse {
            success: true,
            results,
        };
        return Ok((StatusCode::OK, Json(response)).into_response());
    }

    let request = state.gate.key_write(&payload)?;
    let outcome = state
        .store
        .save(&request.key, request.language, &request.value, request.published)
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    info!(key = %outcome.row.key, language = %outcome.row.language, created = outcome.created, "Saved content");
    Ok((status, Json(outcome.row)).into_response())
}

async fn delete_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ContentQuery>,
) -> ApiResult<Json<Value>> {
    require_api_key(&state, &headers)?;

    let (Some(key), Some(language)) = (query.key.as_deref().filter(|k| !k.is_empty()), query.locale()?)
    else {
        return Err(ApiError::BadRequest("Key and language are required".to_string()));
    };

    state.store.delete_by_key_and_language(key, language).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct PublishedQuery {
    pub section: String,
    pub locale: Option<String>,
    pub lang: Option<String>,
}

/// Published fields of one section in the visitor's negotiated locale.
async fn get_published(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PublishedQuery>,
) -> ApiResult<Json<Value>> {
    if !state.gate.is_allowed_section(&query.section) {
        return Err(ApiError::BadRequest(format!("Unknown section: {}", query.section)));
    }

    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| cookie_value(v, "locale"));
    let locale = negotiate_locale(LocaleHints {
        param: query.locale.as_deref().or(query.lang.as_deref()),
        accept_language: headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok()),
        cookie,
    });

    let data = state.store.get_published_section(&query.section, locale).await?;
    Ok(Json(json!({
        "section": query.section,
        "locale": locale,
        "data": data,
    })))
}

async fn get_metrics() -> Json<Value> {
    Json(json!(LocalizationMetrics::global().report()))
}

// ==================== Helpers ====================

fn require_api_key(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let presented = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if authorize(state.api_key.as_deref(), presented) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
