// Grouping and sorting stage of the report pipeline
use super::lead::{Lead, StageKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

pub const UNASSIGNED_KEY: &str = "unassigned";
pub const UNKNOWN_MONTH_KEY: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Employee,
    Manager,
    Channel,
    Stage,
    Month,
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "employee" | "salesperson" | "assigned" => Ok(GroupBy::Employee),
            "manager" => Ok(GroupBy::Manager),
            "channel" => Ok(GroupBy::Channel),
            "stage" | "status" => Ok(GroupBy::Stage),
            "month" => Ok(GroupBy::Month),
            other => Err(other.to_string()),
        }
    }
}

impl GroupBy {
    pub fn label(&self) -> &'static str {
        match self {
            GroupBy::Employee => "Salesperson",
            GroupBy::Manager => "Manager",
            GroupBy::Channel => "Channel",
            GroupBy::Stage => "Stage",
            GroupBy::Month => "Month",
        }
    }

    fn key_of(&self, lead: &Lead) -> String {
        let raw = match self {
            GroupBy::Employee => lead.employee.trim().to_string(),
            GroupBy::Manager => lead.manager.trim().to_string(),
            GroupBy::Channel => lead.channel.trim().to_string(),
            GroupBy::Stage => lead.stage.trim().to_lowercase(),
            GroupBy::Month => {
                return lead
                    .day()
                    .map(|d| d.format("%Y-%m").to_string())
                    .unwrap_or_else(|| UNKNOWN_MONTH_KEY.to_string());
            }
        };
        if raw.is_empty() {
            UNASSIGNED_KEY.to_string()
        } else {
            raw
        }
    }
}

/// Per-key tallies, recomputed from the filtered collection on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    pub key: String,
    pub total: u64,
    pub closed: u64,
    pub in_progress: u64,
    pub lost: u64,
    pub value: f64,
    pub closed_value: f64,
    pub spend: f64,
    pub conversion_rate: u32,
}

impl AggregateRow {
    fn new(key: String) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    fn add(&mut self, lead: &Lead) {
        self.total += 1;
        self.value += lead.value;
        self.spend += lead.spend;
        match lead.stage_kind() {
            StageKind::Closed => {
                self.closed += 1;
                self.closed_value += lead.value;
            }
            StageKind::InProgress => self.in_progress += 1,
            StageKind::Lost => self.lost += 1,
            StageKind::New => {}
        }
    }

    fn finish(mut self) -> Self {
        self.conversion_rate = conversion_rate(self.closed, self.total);
        self
    }
}

/// Closed over total as a whole percent, rounded half away from zero.
/// Zero when there is nothing to divide.
pub fn conversion_rate(closed: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((closed as f64 / total as f64) * 100.0).round() as u32
}

/// Group leads by `group_by`. Rows come out in first-seen key order.
pub fn aggregate(leads: &[Lead], group_by: GroupBy) -> Vec<AggregateRow> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow> = Vec::new();

    for lead in leads {
        let key = group_by.key_of(lead);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            rows.push(AggregateRow::new(key));
            rows.len() - 1
        });
        rows[slot].add(lead);
    }

    rows.into_iter().map(AggregateRow::finish).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Key,
    Total,
    Closed,
    InProgress,
    Lost,
    Value,
    ClosedValue,
    Spend,
    ConversionRate,
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "key" | "name" | "label" => Ok(SortColumn::Key),
            "total" | "leads" => Ok(SortColumn::Total),
            "closed" => Ok(SortColumn::Closed),
            "inprogress" => Ok(SortColumn::InProgress),
            "lost" => Ok(SortColumn::Lost),
            "value" => Ok(SortColumn::Value),
            "closedvalue" => Ok(SortColumn::ClosedValue),
            "spend" => Ok(SortColumn::Spend),
            "conversion" | "conversionrate" => Ok(SortColumn::ConversionRate),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(other.to_string()),
        }
    }
}

/// Case-folded comparison first, raw text as the tie-break.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn numeric(row: &AggregateRow, column: SortColumn) -> f64 {
    match column {
        SortColumn::Key => 0.0,
        SortColumn::Total => row.total as f64,
        SortColumn::Closed => row.closed as f64,
        SortColumn::InProgress => row.in_progress as f64,
        SortColumn::Lost => row.lost as f64,
        SortColumn::Value => row.value,
        SortColumn::ClosedValue => row.closed_value,
        SortColumn::Spend => row.spend,
        SortColumn::ConversionRate => row.conversion_rate as f64,
    }
}

/// Return a sorted copy. The sort is stable, so equal rows keep their relative order.
pub fn sort_rows(
    rows: &[AggregateRow],
    column: SortColumn,
    direction: SortDirection,
) -> Vec<AggregateRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match column {
            SortColumn::Key => compare_text(&a.key, &b.key),
            _ => numeric(a, column)
                .partial_cmp(&numeric(b, column))
                .unwrap_or(Ordering::Equal),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}
