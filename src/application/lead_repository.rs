// Repository trait for lead data access
use crate::domain::lead::Lead;
use async_trait::async_trait;

#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Human readable name of the source, used in logs
    fn source_name(&self) -> &str;

    /// Load every lead the source knows about
    async fn list_leads(&self) -> anyhow::Result<Vec<Lead>>;
}
