// REST backend repository implementation
use crate::application::lead_repository::LeadRepository;
use crate::domain::lead::{leads_from_values, Lead};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const ANALYTICS_PATH: &str = "/api/reports/analytics";

#[derive(Debug, Clone)]
pub struct HttpLeadRepository {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

/// The backend answers either with a bare array or wrapped in an object.
/// Records stay raw until [`leads_from_values`] so one bad entry cannot sink the rest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnalyticsResponse {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default, alias = "data", alias = "records")]
        leads: Vec<Value>,
    },
}

impl AnalyticsResponse {
    fn into_leads(self) -> Vec<Lead> {
        match self {
            AnalyticsResponse::Bare(items) => leads_from_values(items),
            AnalyticsResponse::Wrapped { leads } => leads_from_values(leads),
        }
    }
}

impl HttpLeadRepository {
    pub fn new(base_url: String, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            client,
        })
    }

    fn analytics_url(&self) -> String {
        format!("{}{}", self.base_url, ANALYTICS_PATH)
    }
}

#[async_trait]
impl LeadRepository for HttpLeadRepository {
    fn source_name(&self) -> &str {
        &self.base_url
    }

    async fn list_leads(&self) -> Result<Vec<Lead>> {
        let url = self.analytics_url();
        tracing::debug!("Fetching leads from {}", url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to the analytics endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Analytics request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<AnalyticsResponse>()
            .await
            .context("Failed to parse analytics response")?;

        Ok(data.into_leads())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository(base_url: &str) -> HttpLeadRepository {
        let timeout = Duration::from_secs(1);
        HttpLeadRepository::new(base_url.to_string(), Some(String::new()), timeout).unwrap()
    }

    #[test]
    fn test_analytics_url_has_no_query() {
        let repo = repository("https://crm.example.com/");
        assert_eq!(repo.analytics_url(), "https://crm.example.com/api/reports/analytics");
        assert!(!repo.analytics_url().contains('?'));
        assert!(repo.token.is_none());
    }

    #[test]
    fn test_response_shapes() {
        let bare: AnalyticsResponse = serde_json::from_str(r#"[{"id": "1"}]"#).unwrap();
        assert_eq!(bare.into_leads().len(), 1);

        let wrapped: AnalyticsResponse =
            serde_json::from_str(r#"{"data": [{"id": "1"}, {"id": "2"}], "total": 2}"#).unwrap();
        assert_eq!(wrapped.into_leads().len(), 2);
    }

    #[test]
    fn test_response_with_duplicate_names_and_bad_record() {
        let body = r#"{"leads": [
            {"id": "1", "stage": "closed", "status": "new",
             "createdAt": "2024-02-01", "date": "x"},
            null,
            {"id": "2", "value": 5, "amount": 7}
        ]}"#;
        let leads = serde_json::from_str::<AnalyticsResponse>(body).unwrap().into_leads();

        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].stage, "closed");
        assert_eq!(leads[0].created_at, "2024-02-01");
        assert_eq!(leads[1].value, 5.0);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        let repo = repository("http://127.0.0.1:9");
        assert!(repo.list_leads().await.is_err());
    }
}
