// JSON file repository implementation
use crate::application::lead_repository::LeadRepository;
use crate::domain::lead::{leads_from_values, Lead};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// Reads a persisted JSON blob on every call, so edits to the file show up on the next report.
#[derive(Debug, Clone)]
pub struct FileLeadRepository {
    path: PathBuf,
    name: String,
}

impl FileLeadRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

/// Accept a bare array or an object holding it under `leads`.
/// Records that are not objects are skipped one by one.
fn leads_from_value(value: Value) -> Result<Vec<Lead>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("leads") {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => anyhow::bail!("Expected `leads` to be an array, found {}", other),
        },
        Value::Null => Vec::new(),
        other => anyhow::bail!("Expected a JSON array of leads, found {}", other),
    };
    Ok(leads_from_values(items))
}

#[async_trait]
impl LeadRepository for FileLeadRepository {
    fn source_name(&self) -> &str {
        &self.name
    }

    async fn list_leads(&self) -> Result<Vec<Lead>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read lead file {}", self.name))?;

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse lead file {}", self.name))?;
        leads_from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_reads_array_and_wrapped_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let bare = dir.path().join("bare.json");
        let wrapped = dir.path().join("wrapped.json");
        fs::write(&bare, r#"[{"id": "1", "stage": "closed"}, {"id": "2"}]"#).unwrap();
        fs::write(&wrapped, r#"{"version": 1, "leads": [{"id": "9", "value": 12}]}"#).unwrap();

        let leads = FileLeadRepository::new(&bare).list_leads().await.unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].stage, "closed");

        let leads = FileLeadRepository::new(&wrapped).list_leads().await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].value, 12.0);
    }

    #[tokio::test]
    async fn test_one_bad_record_keeps_the_rest() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"[
                {"id": "1", "stage": "closed", "status": "new",
                 "createdAt": "2024-03-01", "date": "2023-01-01"},
                "garbage",
                {"id": "2", "channel": "Google", "source": "Meta"}
            ]"#,
        )
        .unwrap();

        let leads = FileLeadRepository::new(file.path()).list_leads().await.unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].stage, "closed");
        assert_eq!(leads[0].created_at, "2024-03-01");
        assert_eq!(leads[1].channel, "Google");
    }

    #[tokio::test]
    async fn test_empty_file_has_no_leads() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let leads = FileLeadRepository::new(file.path()).list_leads().await.unwrap();
        assert!(leads.is_empty());
    }

    #[tokio::test]
    async fn test_missing_or_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FileLeadRepository::new(dir.path().join("nope.json"));
        assert!(missing.list_leads().await.is_err());

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{not json").unwrap();
        assert!(FileLeadRepository::new(&corrupt).list_leads().await.is_err());

        let scalar = dir.path().join("scalar.json");
        fs::write(&scalar, "42").unwrap();
        assert!(FileLeadRepository::new(&scalar).list_leads().await.is_err());
    }
}
