// Built-in sample data, used when no backend is configured
use crate::application::lead_repository::LeadRepository;
use crate::domain::lead::Lead;
use async_trait::async_trait;

// (id, employee, manager, stage, channel, value, spend, created_at)
#[rustfmt::skip]
const SAMPLE_LEADS: [(&str, &str, &str, &str, &str, f64, f64, &str); 12] = [
    (
        "L-1001", "Marina Costa", "Paulo Reis", "closed", "Google Ads",
        4200.0, 180.0, "2024-01-08T09:12:00Z",
    ),
    (
        "L-1002", "Marina Costa", "Paulo Reis", "qualified", "Google Ads",
        1500.0, 95.0, "2024-01-19T14:30:00Z",
    ),
    (
        "L-1003", "Tiago Nunes", "Paulo Reis", "new", "Facebook",
        800.0, 40.0, "2024-01-23",
    ),
    (
        "L-1004", "Tiago Nunes", "Paulo Reis", "closed", "Referral",
        6100.0, 0.0, "2024-02-02T11:00:00Z",
    ),
    (
        "L-1005", "Renata Alves", "Sofia Lemos", "negotiation", "Email",
        2300.0, 12.5, "2024-02-11",
    ),
    (
        "L-1006", "Renata Alves", "Sofia Lemos", "lost", "Facebook",
        950.0, 60.0, "2024-02-17T08:45:00Z",
    ),
    (
        "L-1007", "Renata Alves", "Sofia Lemos", "closed", "Google Ads",
        3100.0, 150.0, "2024-03-03T16:20:00Z",
    ),
    (
        "L-1008", "Igor Batista", "Sofia Lemos", "contacted", "Referral",
        700.0, 0.0, "2024-03-09",
    ),
    (
        "L-1009", "Igor Batista", "Sofia Lemos", "new", "Email",
        400.0, 8.0, "2024-03-21T10:05:00Z",
    ),
    (
        "L-1010", "Marina Costa", "Paulo Reis", "closed", "Facebook",
        2750.0, 70.0, "2024-03-28",
    ),
    (
        "L-1011", "", "Paulo Reis", "new", "Google Ads",
        0.0, 110.0, "2024-04-02T13:00:00Z",
    ),
    (
        "L-1012", "Tiago Nunes", "Paulo Reis", "qualified", "Email",
        1200.0, 9.5, "not recorded",
    ),
];

#[derive(Debug, Clone, Default)]
pub struct SampleLeadRepository;

impl SampleLeadRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn leads() -> Vec<Lead> {
        SAMPLE_LEADS
            .iter()
            .map(|(id, employee, manager, stage, channel, value, spend, created_at)| Lead {
                id: id.to_string(),
                employee: employee.to_string(),
                manager: manager.to_string(),
                stage: stage.to_string(),
                channel: channel.to_string(),
                value: *value,
                spend: *spend,
                created_at: created_at.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl LeadRepository for SampleLeadRepository {
    fn source_name(&self) -> &str {
        "sample"
    }

    async fn list_leads(&self) -> anyhow::Result<Vec<Lead>> {
        Ok(Self::leads())
    }
}
