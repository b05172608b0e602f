use crate::domain::aggregate::{SortColumn, SortDirection};
use crate::domain::chart::{Metric, Palette};
use crate::domain::filter::InvalidDatePolicy;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "CRM_REPORTS";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub source: SourceSettings,
    #[serde(default)]
    pub reports: ReportSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Sample,
    File,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub path: Option<String>,
    pub base_url: Option<String>,
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportSettings {
    #[serde(default)]
    pub invalid_dates: InvalidDatePolicy,
    #[serde(default)]
    pub palette: Vec<String>,
    #[serde(default = "default_sort")]
    pub default_sort: SortColumn,
    #[serde(default)]
    pub default_direction: SortDirection,
    #[serde(default)]
    pub default_metric: Metric,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            invalid_dates: InvalidDatePolicy::default(),
            palette: Vec::new(),
            default_sort: default_sort(),
            default_direction: SortDirection::default(),
            default_metric: Metric::default(),
        }
    }
}

impl ReportSettings {
    pub fn palette(&self) -> Palette {
        Palette::new(self.palette.clone())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_sort() -> SortColumn {
    SortColumn::Total
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    load_config_from("config")
}

/// Layer `<dir>/server` and the optional `<dir>/reports` file, then `CRM_REPORTS__*` env vars.
pub fn load_config_from(dir: &str) -> anyhow::Result<AppConfig> {
    build_config(dir, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).separator("__")
}

fn build_config(dir: &str, env: config::Environment) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(&format!("{}/server", dir)))
        .add_source(config::File::with_name(&format!("{}/reports", dir)).required(false))
        .add_source(env)
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_layered_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("server.toml"),
            r#"
[server]
port = 9100

[source]
kind = "file"
path = "data/leads.json"
"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("reports.toml"),
            r##"
[reports]
invalid_dates = "exclude"
palette = ["#000000", "#ffffff"]
default_sort = "conversionRate"
default_direction = "asc"
default_metric = "spend"
"##,
        )
        .unwrap();

        let config = load_config_from(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.source.path.as_deref(), Some("data/leads.json"));
        assert_eq!(config.source.timeout_secs, 10);
        assert_eq!(config.reports.invalid_dates, InvalidDatePolicy::Exclude);
        assert_eq!(config.reports.default_sort, SortColumn::ConversionRate);
        assert_eq!(config.reports.default_direction, SortDirection::Asc);
        assert_eq!(config.reports.default_metric, Metric::Spend);
        assert_eq!(config.reports.palette().color_at(3), "#ffffff");
    }

    #[test]
    fn test_reports_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("server.toml"),
            "[source]\nkind = \"sample\"\n",
        )
        .unwrap();

        let config = load_config_from(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(config.source.kind, SourceKind::Sample);
        assert_eq!(config.reports.invalid_dates, InvalidDatePolicy::Include);
        assert_eq!(config.reports.default_sort, SortColumn::Total);
        assert_eq!(config.reports.palette(), Palette::default());
    }

    #[test]
    fn test_missing_server_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_from(dir.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_environment_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("server.toml"),
            "[source]\nkind = \"file\"\npath = \"data/leads.json\"\n",
        )
        .unwrap();

        let mut vars = config::Map::new();
        vars.insert("CRM_REPORTS__SOURCE__KIND".to_string(), "http".to_string());
        vars.insert(
            "CRM_REPORTS__SOURCE__BASE_URL".to_string(),
            "http://crm.local".to_string(),
        );
        vars.insert("OTHER_APP__SOURCE__KIND".to_string(), "sample".to_string());
        let env = environment().source(Some(vars));

        let config = build_config(dir.path().to_str().unwrap(), env).unwrap();

        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.base_url.as_deref(), Some("http://crm.local"));
        assert_eq!(config.source.path.as_deref(), Some("data/leads.json"));
    }
}
