//! Catalog HTTP routes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use super::admin::AdminSession;
use super::AppState;
use crate::catalog::{self, CatalogPage, CreateVideo};
use crate::db::Video;
use crate::error::{AppError, Result};
use crate::paging::PageRequest;
use crate::video::{self, Platform, ResolvedVideo};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

/// Unwrap a JSON body, reporting malformed payloads as validation errors
pub(super) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::Validation(format!("Malformed payload: {}", e.body_text())))
}

/// Unwrap query parameters, reporting unparseable values as validation errors
pub(super) fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| AppError::Validation(format!("Invalid query: {}", e.body_text())))
}

/// API: paginated, searchable catalog
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<CatalogPage>> {
    let query = query_params(query)?;
    let catalog = &state.config.catalog;
    let request = PageRequest::new(query.page, query.limit, catalog.default_page_size, catalog.max_page_size);
    let page = catalog::list(&state.db, query.search.as_deref(), request).await?;
    Ok(Json(page))
}

/// API: add a video (admin)
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    payload: std::result::Result<Json<CreateVideo>, JsonRejection>,
) -> Result<Json<Video>> {
    let input = json_body(payload)?;
    let video = catalog::create(&state.db, state.probe.as_ref(), input, Utc::now()).await?;
    Ok(Json(video))
}

/// API: single video
pub async fn get_video(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Video>> {
    Ok(Json(state.db.get_video(&id).await?))
}

/// API: delete a video (admin)
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    catalog::delete(&state.db, &id).await?;
    Ok(Json(json!({ "message": "Video deleted successfully" })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedResponse {
    pub video: Video,
    pub platform: Platform,
    pub video_id: Option<String>,
    pub embed_url: String,
}

/// API: video plus what the player needs to embed it
pub async fn embed_video(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<EmbedResponse>> {
    let video = state.db.get_video(&id).await?;
    let resolved = video::resolve(&video.url);
    Ok(Json(EmbedResponse {
        platform: resolved.platform,
        video_id: resolved.video_id,
        embed_url: resolved.embed_url,
        video,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub url: Option<String>,
}

/// API: resolver output for an arbitrary link
pub async fn resolve_url(
    query: std::result::Result<Query<ResolveQuery>, QueryRejection>,
) -> Result<Json<ResolvedVideo>> {
    let url = query_params(query)?
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("URL is required".to_string()))?;
    Ok(Json(video::resolve(url.trim())))
}
