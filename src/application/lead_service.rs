// Lead service - Use case for the filtered lead table
use crate::application::lead_repository::LeadRepository;
use crate::domain::filter::{FilterCriteria, InvalidDatePolicy};
use crate::domain::lead::Lead;
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Clone)]
pub struct LeadService {
    repository: Arc<dyn LeadRepository>,
    invalid_dates: InvalidDatePolicy,
}

impl LeadService {
    pub fn new(repository: Arc<dyn LeadRepository>, invalid_dates: InvalidDatePolicy) -> Self {
        Self {
            repository,
            invalid_dates,
        }
    }

    /// Filtered leads, newest first. Leads without a usable date go last.
    pub async fn list_leads(&self, criteria: &FilterCriteria) -> anyhow::Result<Vec<Lead>> {
        let leads = self.repository.list_leads().await?;
        let mut filtered = criteria.apply(&leads, self.invalid_dates);

        filtered.sort_by(|a, b| match (a.day(), b.day()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        tracing::debug!(
            "Listed {} of {} leads from {}",
            filtered.len(),
            leads.len(),
            self.repository.source_name()
        );
        Ok(filtered)
    }
}
