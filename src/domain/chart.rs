// Chart projection: aggregate rows to label/dataset structures for the renderer
use super::aggregate::{AggregateRow, UNKNOWN_MONTH_KEY};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
];

/// Fixed color list assigned by position, wrapping around when exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Palette {
    /// Falls back to the built-in colors when `colors` is empty.
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            Self::default()
        } else {
            Self { colors }
        }
    }

    pub fn color_at(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }
}

/// Which numeric field of a row a chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Leads,
    Closed,
    Conversion,
    Value,
    Spend,
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leads" | "total" | "count" => Ok(Metric::Leads),
            "closed" => Ok(Metric::Closed),
            "conversion" | "rate" => Ok(Metric::Conversion),
            "value" | "revenue" => Ok(Metric::Value),
            "spend" | "cost" => Ok(Metric::Spend),
            other => Err(other.to_string()),
        }
    }
}

impl Metric {
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Leads => "Leads",
            Metric::Closed => "Closed leads",
            Metric::Conversion => "Conversion rate",
            Metric::Value => "Pipeline value",
            Metric::Spend => "Spend",
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Metric::Conversion => Some("%"),
            Metric::Value | Metric::Spend => Some("currency"),
            Metric::Leads | Metric::Closed => None,
        }
    }

    pub fn project(&self, row: &AggregateRow) -> f64 {
        match self {
            Metric::Leads => row.total as f64,
            Metric::Closed => row.closed as f64,
            Metric::Conversion => row.conversion_rate as f64,
            Metric::Value => round2(row.value),
            Metric::Spend => round2(row.spend),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
}

/// A labelled slice handed to a pie or bar renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSegment {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub unit: Option<String>,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    pub fn new(
        id: String,
        title: String,
        kind: ChartKind,
        unit: Option<String>,
        labels: Vec<String>,
        datasets: Vec<Dataset>,
    ) -> Self {
        Self {
            id,
            title,
            kind,
            unit,
            labels,
            datasets,
        }
    }
}

/// One segment per row, colored by position.
pub fn segments(rows: &[AggregateRow], metric: Metric, palette: &Palette) -> Vec<ChartSegment> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| ChartSegment {
            label: row.key.clone(),
            value: metric.project(row),
            color: palette.color_at(index).to_string(),
        })
        .collect()
}

fn single_dataset(label: &str, segments: Vec<ChartSegment>) -> (Vec<String>, Dataset) {
    let mut labels = Vec::with_capacity(segments.len());
    let mut data = Vec::with_capacity(segments.len());
    let mut colors = Vec::with_capacity(segments.len());
    for segment in segments {
        labels.push(segment.label);
        data.push(segment.value);
        colors.push(segment.color);
    }
    (
        labels,
        Dataset {
            label: label.to_string(),
            data,
            colors,
        },
    )
}

pub fn pie_chart(
    id: &str,
    title: &str,
    rows: &[AggregateRow],
    metric: Metric,
    palette: &Palette,
) -> ChartData {
    let (labels, dataset) = single_dataset(metric.title(), segments(rows, metric, palette));
    ChartData::new(
        id.to_string(),
        title.to_string(),
        ChartKind::Pie,
        metric.unit().map(str::to_string),
        labels,
        vec![dataset],
    )
}

/// Bar chart of one metric per channel.
pub fn channel_performance(rows: &[AggregateRow], metric: Metric, palette: &Palette) -> ChartData {
    let (labels, dataset) = single_dataset(metric.title(), segments(rows, metric, palette));
    ChartData::new(
        "channel-performance".to_string(),
        format!("Channel performance: {}", metric.title().to_lowercase()),
        ChartKind::Bar,
        metric.unit().map(str::to_string),
        labels,
        vec![dataset],
    )
}

/// Month rows in ascending order, without the `unknown` bucket.
fn dated_months(rows: &[AggregateRow]) -> Vec<&AggregateRow> {
    let mut months: Vec<&AggregateRow> = rows
        .iter()
        .filter(|row| row.key != UNKNOWN_MONTH_KEY)
        .collect();
    months.sort_by(|a, b| a.key.cmp(&b.key));
    months
}

fn month_datasets(months: &[&AggregateRow], metrics: &[Metric], palette: &Palette) -> Vec<Dataset> {
    metrics
        .iter()
        .enumerate()
        .map(|(index, metric)| Dataset {
            label: metric.title().to_string(),
            data: months.iter().map(|row| metric.project(row)).collect(),
            colors: vec![palette.color_at(index).to_string()],
        })
        .collect()
}

/// Monthly line chart with total and closed leads. Months ascend; undated leads are left out.
pub fn leads_analysis(rows: &[AggregateRow], palette: &Palette) -> ChartData {
    let months = dated_months(rows);
    let labels: Vec<String> = months.iter().map(|row| row.key.clone()).collect();

    ChartData::new(
        "leads-analysis".to_string(),
        "Leads analysis".to_string(),
        ChartKind::Line,
        None,
        labels,
        month_datasets(&months, &[Metric::Leads, Metric::Closed], palette),
    )
}

/// Monthly line chart of a single metric, used by the month report.
pub fn metric_trend(rows: &[AggregateRow], metric: Metric, palette: &Palette) -> ChartData {
    let months = dated_months(rows);
    let labels: Vec<String> = months.iter().map(|row| row.key.clone()).collect();

    ChartData::new(
        "by-month".to_string(),
        format!("{} by month", metric.title()),
        ChartKind::Line,
        metric.unit().map(str::to_string),
        labels,
        month_datasets(&months, &[metric], palette),
    )
}
