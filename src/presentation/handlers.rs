// HTTP request handlers
use crate::application::report_service::ReportRequest;
use crate::domain::aggregate::{GroupBy, SortColumn, SortDirection};
use crate::domain::chart::Metric;
use crate::domain::filter::FilterCriteria;
use crate::domain::lead::Lead;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub manager: Option<String>,
    pub employee: Option<String>,
    pub stage: Option<String>,
    pub channel: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub metric: Option<String>,
}

/// Parse an optional query value, treating blank as absent.
fn parse_opt<T: FromStr<Err = String>>(
    raw: &Option<String>,
    err: fn(String) -> ApiError,
) -> Result<Option<T>, ApiError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(err),
    }
}

impl ReportQuery {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            manager: self.manager.clone(),
            employee: self.employee.clone(),
            stage: self.stage.clone(),
            channel: self.channel.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }

    pub fn metric(&self) -> Result<Option<Metric>, ApiError> {
        parse_opt(&self.metric, ApiError::UnknownMetric)
    }

    pub fn into_request(self, group_by: &str) -> Result<ReportRequest, ApiError> {
        let group_by = GroupBy::from_str(group_by).map_err(ApiError::UnknownGroupBy)?;
        Ok(ReportRequest {
            criteria: self.criteria(),
            group_by,
            sort: parse_opt::<SortColumn>(&self.sort, ApiError::UnknownSortColumn)?,
            direction: parse_opt::<SortDirection>(&self.direction, ApiError::UnknownDirection)?,
            metric: self.metric()?,
        })
    }
}

#[derive(Serialize)]
struct LeadList {
    total: usize,
    leads: Vec<Lead>,
}

async fn respond<T: Serialize>(headers: &HeaderMap, data: &T) -> Response {
    match json_response(StatusCode::OK, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Filtered lead table
pub async fn list_leads(
    Query(query): Query<ReportQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let leads = match state.lead_service.list_leads(&query.criteria()).await {
        Ok(leads) => leads,
        Err(e) => {
            tracing::warn!("Error fetching leads: {:#}", e);
            // Return empty list on error
            Vec::new()
        }
    };

    let body = LeadList {
        total: leads.len(),
        leads,
    };
    respond(&headers, &body).await
}

/// Grouped report with rows, tiles and a chart
pub async fn get_report(
    Path(group_by): Path<String>,
    Query(query): Query<ReportQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let request = query.into_request(&group_by)?;
    let report = state.report_service.build_report(&request).await;
    Ok(respond(&headers, &report).await)
}

pub async fn leads_analysis_chart(
    Query(query): Query<ReportQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let chart = state.report_service.leads_analysis(&query.criteria()).await;
    respond(&headers, &chart).await
}

pub async fn channel_performance_chart(
    Query(query): Query<ReportQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let metric = query.metric()?;
    let chart = state
        .report_service
        .channel_performance(&query.criteria(), metric)
        .await;
    Ok(respond(&headers, &chart).await)
}
