// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::lead_repository::LeadRepository;
use crate::application::lead_service::LeadService;
use crate::application::report_service::ReportService;
use crate::infrastructure::config::{load_config, SourceKind, SourceSettings};
use crate::infrastructure::file_repository::FileLeadRepository;
use crate::infrastructure::http_repository::HttpLeadRepository;
use crate::infrastructure::sample_repository::SampleLeadRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    channel_performance_chart, get_report, health_check, leads_analysis_chart, list_leads,
};

fn build_repository(source: &SourceSettings) -> anyhow::Result<Arc<dyn LeadRepository>> {
    let repository: Arc<dyn LeadRepository> = match source.kind {
        SourceKind::Sample => Arc::new(SampleLeadRepository::new()),
        SourceKind::File => {
            let path = source
                .path
                .clone()
                .context("source.path is required for the file source")?;
            Arc::new(FileLeadRepository::new(path))
        }
        SourceKind::Http => {
            let base_url = source
                .base_url
                .clone()
                .context("source.base_url is required for the http source")?;
            Arc::new(HttpLeadRepository::new(
                base_url,
                source.token.clone(),
                Duration::from_secs(source.timeout_secs),
            )?)
        }
    };
    Ok(repository)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_config().context("Failed to load configuration")?;

    // Create repository (infrastructure layer)
    let repository = build_repository(&config.source)?;
    tracing::info!("Reading leads from {}", repository.source_name());

    // Create services (application layer)
    let lead_service = LeadService::new(repository.clone(), config.reports.invalid_dates);
    let report_service = ReportService::new(repository, config.reports.clone());

    let state = Arc::new(AppState {
        lead_service,
        report_service,
    });

    // Build router (presentation layer)
    // Responses are compressed in the handlers, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/leads", get(list_leads))
        .route("/reports/:group_by", get(get_report))
        .route("/charts/leads-analysis", get(leads_analysis_chart))
        .route("/charts/channel-performance", get(channel_performance_chart))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Starting crm-reports service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
