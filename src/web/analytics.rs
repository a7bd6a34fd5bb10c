//! Visit tracking and analytics routes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ConnectInfo, Query, State,
    },
    http::HeaderMap,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};

use super::admin::AdminSession;
use super::middleware::client_ip;
use super::routes::{json_body, query_params};
use super::AppState;
use crate::analytics::{self, AnalyticsReport, VisitPayload};
use crate::db::Visitor;
use crate::error::Result;
use crate::paging::PageRequest;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub days: Option<i64>,
}

/// API: aggregate report for the trailing window (admin)
pub async fn report(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    query: std::result::Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<AnalyticsReport>> {
    let query = query_params(query)?;
    let days = analytics::clamp_days(query.days);
    let report = analytics::build_report(&state.db, days, &Local::now()).await?;
    Ok(Json(report))
}

/// API: record one page load
pub async fn track(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: std::result::Result<Json<VisitPayload>, JsonRejection>,
) -> Result<Json<Value>> {
    let payload = json_body(payload)?;
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let visit = payload.into_visit(client_ip(&headers, peer));

    analytics::record_visit(&state.db, &visit, &Local::now()).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct VisitorQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorPage {
    pub visitors: Vec<Visitor>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// API: raw visit log, newest first (admin)
pub async fn visitors(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    query: std::result::Result<Query<VisitorQuery>, QueryRejection>,
) -> Result<Json<VisitorPage>> {
    let query = query_params(query)?;
    let catalog = &state.config.catalog;
    let request = PageRequest::new(
        query.page,
        query.limit,
        catalog.visitor_page_size,
        catalog.max_page_size.max(catalog.visitor_page_size),
    );
    let (visitors, total) = state.db.list_visitors(&request).await?;

    Ok(Json(VisitorPage {
        visitors,
        total,
        page: request.page,
        limit: request.limit,
        total_pages: request.total_pages(total),
    }))
}
