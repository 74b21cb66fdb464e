//! Configuration file and flag overrides

use anyhow::{Context, Result};
use panel_data::DataConfig;
use std::path::Path;
use std::time::Duration;

/// Read the TOML configuration at `path`, or defaults when none is given
pub(crate) async fn load(path: Option<&Path>) -> Result<DataConfig> {
    let Some(path) = path else {
        return Ok(DataConfig::default());
    };

    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// Parse configuration text; omitted keys keep their defaults
pub(crate) fn parse(text: &str) -> Result<DataConfig> {
    Ok(toml::from_str(text)?)
}

/// Apply command-line overrides
pub(crate) fn apply_overrides(config: DataConfig, timeout_ms: Option<u64>) -> DataConfig {
    match timeout_ms {
        Some(ms) => config.with_load_timeout(Duration::from_millis(ms)),
        None => config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_data::ReferencePolicy;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_partial_file() {
        let config = parse(
            r#"
            load_timeout_ms = 2500
            reference_policy = "reject"

            [resources]
            schedules = "mockData/schedules.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.load_timeout_ms, 2500);
        assert_eq!(config.reference_policy, ReferencePolicy::Reject);
        assert_eq!(config.resources.schedules, "mockData/schedules.json");
        assert_eq!(config.resources.kpis, "kpis.json");
    }

    #[test]
    fn parse_rejects_unknown_policy() {
        assert!(parse(r#"reference_policy = "ignore""#).is_err());
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.toml");
        std::fs::write(&path, "load_timeout_ms = 100\n").unwrap();

        let config = load(Some(&path)).await.unwrap();
        assert_eq!(config.load_timeout_ms, 100);
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = load(Some(Path::new("/nonexistent/panel.toml"))).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/panel.toml"));
    }

    #[test]
    fn flag_overrides_file() {
        let config = apply_overrides(DataConfig::default(), Some(750));
        assert_eq!(config.load_timeout(), Duration::from_millis(750));
        assert_eq!(apply_overrides(DataConfig::default(), None), DataConfig::default());
    }
}
