// Report service - Use case for building grouped reports and charts
use crate::application::lead_repository::LeadRepository;
use crate::domain::aggregate::{aggregate, sort_rows, GroupBy, SortColumn, SortDirection};
use crate::domain::chart::{self, ChartData, Metric, Palette};
use crate::domain::filter::FilterCriteria;
use crate::domain::lead::Lead;
use crate::domain::report::{summary_tiles, Report};
use crate::infrastructure::config::ReportSettings;
use chrono::Utc;
use std::sync::Arc;

/// Everything a caller can choose about a report. `None` falls back to the configured defaults.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub criteria: FilterCriteria,
    pub group_by: GroupBy,
    pub sort: Option<SortColumn>,
    pub direction: Option<SortDirection>,
    pub metric: Option<Metric>,
}

#[derive(Clone)]
pub struct ReportService {
    repository: Arc<dyn LeadRepository>,
    settings: ReportSettings,
    palette: Palette,
}

impl ReportService {
    pub fn new(repository: Arc<dyn LeadRepository>, settings: ReportSettings) -> Self {
        let palette = settings.palette();
        Self {
            repository,
            settings,
            palette,
        }
    }

    pub async fn build_report(&self, request: &ReportRequest) -> Report {
        let leads = self.load_filtered(&request.criteria).await;

        let sort = request.sort.unwrap_or(self.settings.default_sort);
        let direction = request.direction.unwrap_or(self.settings.default_direction);
        let metric = request.metric.unwrap_or(self.settings.default_metric);

        let rows = sort_rows(&aggregate(&leads, request.group_by), sort, direction);
        let segments = chart::segments(&rows, metric, &self.palette);
        let title = format!("{} by {}", metric.title(), request.group_by.label().to_lowercase());
        let chart = match request.group_by {
            GroupBy::Channel => chart::channel_performance(&rows, metric, &self.palette),
            GroupBy::Month => chart::metric_trend(&rows, metric, &self.palette),
            _ => {
                let id = format!("by-{}", request.group_by.label().to_lowercase());
                chart::pie_chart(&id, &title, &rows, metric, &self.palette)
            }
        };

        tracing::debug!(
            "Built report {} with {} rows from {} leads",
            title,
            rows.len(),
            leads.len()
        );

        Report {
            title,
            group_by: request.group_by,
            metric,
            sort,
            direction,
            tiles: summary_tiles(&leads),
            rows,
            segments,
            chart,
            generated_at: Utc::now(),
        }
    }

    /// Monthly totals and closed leads as a line chart.
    pub async fn leads_analysis(&self, criteria: &FilterCriteria) -> ChartData {
        let leads = self.load_filtered(criteria).await;
        chart::leads_analysis(&aggregate(&leads, GroupBy::Month), &self.palette)
    }

    /// One bar per channel for the chosen metric, largest first.
    pub async fn channel_performance(
        &self,
        criteria: &FilterCriteria,
        metric: Option<Metric>,
    ) -> ChartData {
        let metric = metric.unwrap_or(self.settings.default_metric);
        let leads = self.load_filtered(criteria).await;
        let rows = aggregate(&leads, GroupBy::Channel);
        let column = match metric {
            Metric::Leads => SortColumn::Total,
            Metric::Closed => SortColumn::Closed,
            Metric::Conversion => SortColumn::ConversionRate,
            Metric::Value => SortColumn::Value,
            Metric::Spend => SortColumn::Spend,
        };
        let rows = sort_rows(&rows, column, SortDirection::Desc);
        chart::channel_performance(&rows, metric, &self.palette)
    }

    /// Load and filter. A failing source yields an empty collection rather than an error.
    async fn load_filtered(&self, criteria: &FilterCriteria) -> Vec<Lead> {
        match self.repository.list_leads().await {
            Ok(leads) if criteria.is_empty() => leads,
            Ok(leads) => criteria.apply(&leads, self.settings.invalid_dates),
            Err(e) => {
                tracing::warn!(
                    "Failed to load leads from {}, reporting on an empty set: {:#}",
                    self.repository.source_name(),
                    e
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::ChartKind;
    use async_trait::async_trait;

    struct FixedRepository(Vec<Lead>);

    #[async_trait]
    impl LeadRepository for FixedRepository {
        fn source_name(&self) -> &str {
            "fixed"
        }

        async fn list_leads(&self) -> anyhow::Result<Vec<Lead>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenRepository;

    #[async_trait]
    impl LeadRepository for BrokenRepository {
        fn source_name(&self) -> &str {
            "broken"
        }

        async fn list_leads(&self) -> anyhow::Result<Vec<Lead>> {
            anyhow::bail!("connection refused")
        }
    }

    fn lead(employee: &str, channel: &str, stage: &str, spend: f64, created_at: &str) -> Lead {
        Lead {
            employee: employee.to_string(),
            channel: channel.to_string(),
            stage: stage.to_string(),
            spend,
            created_at: created_at.to_string(),
            ..Lead::default()
        }
    }

    fn service() -> ReportService {
        let leads = vec![
            lead("A", "Google", "closed", 30.0, "2024-01-10"),
            lead("A", "Meta", "new", 10.0, "2024-02-02"),
            lead("B", "Google", "closed", 20.0, "2024-02-15"),
            lead("C", "Email", "qualified", 0.0, "bad-date"),
        ];
        ReportService::new(Arc::new(FixedRepository(leads)), ReportSettings::default())
    }

    fn request(group_by: GroupBy) -> ReportRequest {
        ReportRequest {
            criteria: FilterCriteria::default(),
            group_by,
            sort: None,
            direction: None,
            metric: None,
        }
    }

    #[tokio::test]
    async fn test_report_by_employee_uses_defaults() {
        let report = service().build_report(&request(GroupBy::Employee)).await;

        assert_eq!(report.sort, SortColumn::Total);
        assert_eq!(report.direction, SortDirection::Desc);
        assert_eq!(report.metric, Metric::Leads);
        assert_eq!(report.chart.kind, ChartKind::Pie);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].key, "A");
        assert_eq!(report.rows[0].conversion_rate, 50);
        assert_eq!(report.segments.len(), report.rows.len());
        assert_eq!(report.tiles[0].value, 4.0);
    }

    #[tokio::test]
    async fn test_report_respects_requested_sort_and_filter() {
        let mut req = request(GroupBy::Employee);
        req.sort = Some(SortColumn::Key);
        req.direction = Some(SortDirection::Asc);
        req.criteria.from = Some("2024-02-01".to_string());

        let report = service().build_report(&req).await;
        let keys: Vec<_> = report.rows.iter().map(|r| r.key.as_str()).collect();
        // "C" has an unparseable date and is kept by the default policy
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(report.rows[0].total, 1);
    }

    #[tokio::test]
    async fn test_channel_performance_by_spend() {
        let chart = service()
            .channel_performance(&FilterCriteria::default(), Some(Metric::Spend))
            .await;

        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.labels, vec!["Google", "Meta", "Email"]);
        assert_eq!(chart.datasets[0].data, vec![50.0, 10.0, 0.0]);
    }

    #[tokio::test]
    async fn test_leads_analysis_by_month() {
        let chart = service().leads_analysis(&FilterCriteria::default()).await;

        assert_eq!(chart.labels, vec!["2024-01", "2024-02"]);
        assert_eq!(chart.datasets[0].data, vec![1.0, 2.0]);
        assert_eq!(chart.datasets[1].data, vec![1.0, 1.0]);
    }

    #[tokio::test]
    async fn test_failing_source_gives_empty_report() {
        let service = ReportService::new(Arc::new(BrokenRepository), ReportSettings::default());
        let report = service.build_report(&request(GroupBy::Channel)).await;

        assert!(report.rows.is_empty());
        assert!(report.segments.is_empty());
        assert!(report.chart.labels.is_empty());
        assert_eq!(report.tiles[0].value, 0.0);
    }

    #[tokio::test]
    async fn test_month_report_charts_requested_metric() {
        let mut req = request(GroupBy::Month);
        req.metric = Some(Metric::Spend);
        let report = service().build_report(&req).await;

        assert_eq!(report.chart.kind, ChartKind::Line);
        assert_eq!(report.chart.labels, vec!["2024-01", "2024-02"]);
        assert_eq!(report.chart.datasets.len(), 1);
        assert_eq!(report.chart.datasets[0].label, Metric::Spend.title());
        assert_eq!(report.chart.datasets[0].data, vec![30.0, 30.0]);
    }
}
