// Lead domain model
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A sales prospect as delivered by the lead source.
///
/// Every field is optional on the wire: missing or malformed values fall back
/// to an empty string or zero instead of failing the whole payload. Fields
/// have alternative names; when a record carries several, the first one
/// listed in [`Lead::from_fields`] wins and the rest are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub employee: String,
    pub manager: String,
    pub stage: String,
    pub channel: String,
    pub value: f64,
    pub spend: f64,
    pub created_at: String,
}

/// Coarse lifecycle bucket derived from the free-form stage label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    New,
    InProgress,
    Closed,
    Lost,
}

impl StageKind {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "" | "new" => StageKind::New,
            "closed" | "won" | "closed-won" | "closed_won" | "sold" => StageKind::Closed,
            "lost" | "closed-lost" | "closed_lost" | "rejected" => StageKind::Lost,
            _ => StageKind::InProgress,
        }
    }
}

impl Lead {
    pub fn stage_kind(&self) -> StageKind {
        StageKind::from_label(&self.stage)
    }

    /// Calendar day of `created_at`, or `None` when it cannot be parsed.
    pub fn day(&self) -> Option<NaiveDate> {
        parse_day(&self.created_at)
    }
}

/// Parse a timestamp or plain date and truncate it to the day.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// First of `keys` present with a non-null value.
fn pick<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn text(fields: &Map<String, Value>, keys: &[&str]) -> String {
    match pick(fields, keys) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn number(fields: &Map<String, Value>, keys: &[&str]) -> f64 {
    let number = match pick(fields, keys) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if number.is_finite() { number } else { 0.0 }
}

impl Lead {
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            id: text(fields, &["id"]),
            employee: text(fields, &["employee", "salesperson", "assignedTo"]),
            manager: text(fields, &["manager"]),
            stage: text(fields, &["stage", "status"]),
            channel: text(fields, &["channel", "source"]),
            value: number(fields, &["value", "amount"]),
            spend: number(fields, &["spend", "cost"]),
            created_at: text(fields, &["createdAt", "created_at", "date"]),
        }
    }
}

impl<'de> Deserialize<'de> for Lead {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(fields) => Ok(Lead::from_fields(&fields)),
            other => Err(de::Error::custom(format!("expected a lead object, found {}", other))),
        }
    }
}

/// Convert raw records, skipping the ones that are not objects.
pub fn leads_from_values(values: Vec<Value>) -> Vec<Lead> {
    let total = values.len();
    let leads: Vec<Lead> = values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(fields) => Some(Lead::from_fields(&fields)),
            other => {
                tracing::warn!("Skipping lead record that is not an object: {}", other);
                None
            }
        })
        .collect();
    if leads.len() < total {
        tracing::debug!("Kept {} of {} lead records", leads.len(), total);
    }
    leads
}
