// Report domain model
use super::aggregate::{conversion_rate, AggregateRow, GroupBy, SortColumn, SortDirection};
use super::chart::{round2, ChartData, ChartSegment, Metric};
use super::lead::{Lead, StageKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A headline number shown above a report table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: f64,
    pub precision: i32,
}

impl TileData {
    pub fn new(id: &str, title: &str, unit: &str, value: f64, precision: i32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.to_string(),
            value,
            precision,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub group_by: GroupBy,
    pub metric: Metric,
    pub sort: SortColumn,
    pub direction: SortDirection,
    pub tiles: Vec<TileData>,
    pub rows: Vec<AggregateRow>,
    pub segments: Vec<ChartSegment>,
    pub chart: ChartData,
    pub generated_at: DateTime<Utc>,
}

/// Totals over the filtered leads, independent of grouping.
pub fn summary_tiles(leads: &[Lead]) -> Vec<TileData> {
    let total = leads.len() as u64;
    let closed = leads
        .iter()
        .filter(|lead| lead.stage_kind() == StageKind::Closed)
        .count() as u64;
    let value: f64 = leads.iter().map(|lead| lead.value).sum();
    let spend: f64 = leads.iter().map(|lead| lead.spend).sum();
    let cost_per_lead = if total == 0 { 0.0 } else { spend / total as f64 };

    vec![
        TileData::new("total-leads", "Total leads", "leads", total as f64, 0),
        TileData::new("closed-leads", "Closed leads", "leads", closed as f64, 0),
        TileData::new(
            "conversion-rate",
            "Conversion rate",
            "%",
            conversion_rate(closed, total) as f64,
            0,
        ),
        TileData::new("pipeline-value", "Pipeline value", "currency", round2(value), 2),
        TileData::new("spend", "Spend", "currency", round2(spend), 2),
        TileData::new("cost-per-lead", "Cost per lead", "currency", round2(cost_per_lead), 2),
    ]
}
