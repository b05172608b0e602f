// Filter criteria and the predicate stage of the report pipeline
use super::lead::{parse_day, Lead};
use chrono::NaiveDate;
use serde::Deserialize;

/// What to do with a lead whose date cannot be parsed while a date range is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidDatePolicy {
    /// The range does not exclude the lead.
    #[default]
    Include,
    /// The lead is dropped from the result.
    Exclude,
}

/// Report filter. Blank fields place no constraint on the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub manager: Option<String>,
    pub employee: Option<String>,
    pub stage: Option<String>,
    pub channel: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Criteria normalized once per request: lowercased needles and parsed bounds.
#[derive(Debug, Clone)]
struct Predicates {
    manager: Option<String>,
    employee: Option<String>,
    stage: Option<String>,
    channel: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

fn needle(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn bound(field: &Option<String>) -> Option<NaiveDate> {
    let raw = field.as_deref()?;
    let day = parse_day(raw);
    if day.is_none() && !raw.trim().is_empty() {
        tracing::debug!("Ignoring unparseable date bound: {}", raw);
    }
    day
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        let p = self.predicates();
        p.manager.is_none()
            && p.employee.is_none()
            && p.stage.is_none()
            && p.channel.is_none()
            && p.from.is_none()
            && p.to.is_none()
    }

    fn predicates(&self) -> Predicates {
        Predicates {
            manager: needle(&self.manager),
            employee: needle(&self.employee),
            stage: needle(&self.stage),
            channel: needle(&self.channel),
            from: bound(&self.from),
            to: bound(&self.to),
        }
    }

    /// Apply every active criterion as a logical AND. The input is left untouched.
    pub fn apply(&self, leads: &[Lead], policy: InvalidDatePolicy) -> Vec<Lead> {
        let predicates = self.predicates();
        leads
            .iter()
            .filter(|lead| predicates.matches(lead, policy))
            .cloned()
            .collect()
    }
}

impl Predicates {
    fn matches(&self, lead: &Lead, policy: InvalidDatePolicy) -> bool {
        if let Some(manager) = &self.manager {
            if !lead.manager.to_lowercase().contains(manager.as_str()) {
                return false;
            }
        }
        if let Some(employee) = &self.employee {
            if !lead.employee.to_lowercase().contains(employee.as_str()) {
                return false;
            }
        }
        if let Some(stage) = &self.stage {
            if lead.stage.trim().to_lowercase() != *stage {
                return false;
            }
        }
        if let Some(channel) = &self.channel {
            if lead.channel.trim().to_lowercase() != *channel {
                return false;
            }
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }

        let Some(day) = lead.day() else {
            return policy == InvalidDatePolicy::Include;
        };
        if let Some(from) = self.from {
            if day < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if day > to {
                return false;
            }
        }
        true
    }
}
