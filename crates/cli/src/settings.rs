// Settings loading - YAML file + FOUGERE_* environment overrides

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use fougere_core::domain::{CloudTasksConfig, CloudTasksSettings};

pub const DEFAULT_CONFIG_PATH: &str = "~/.fougere/config.yaml";

/// Load the settings file at `path` (tilde expanded)
///
/// Queue keys are case-folded while loading: `MailQueue` becomes
/// `mailqueue`, and so does the qualified queue name built from it.
pub fn load_settings(path: &str) -> Result<CloudTasksSettings> {
    let path = shellexpand::tilde(path).into_owned();
    let builder = Config::builder().add_source(File::new(&path, FileFormat::Yaml).required(true));

    deserialize(builder).with_context(|| format!("Failed to load settings from {}", path))
}

/// Parse settings from an in-memory YAML document
pub fn parse_settings(yaml: &str) -> Result<CloudTasksSettings> {
    let builder = Config::builder().add_source(File::from_str(yaml, FileFormat::Yaml));
    deserialize(builder).context("Failed to parse settings")
}

/// Resolve queue names for `client_name` and validate every queue
pub fn resolve(settings: CloudTasksSettings, client_name: &str) -> Result<CloudTasksConfig> {
    CloudTasksConfig::from_settings(settings, client_name).context("Invalid Cloud Tasks configuration")
}

fn deserialize(builder: ConfigBuilder<DefaultState>) -> Result<CloudTasksSettings> {
    let settings = builder
        .add_source(
            Environment::with_prefix("FOUGERE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<CloudTasksSettings>()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_QUEUE_CONFIG: &str = r#"
cloudTasks:
  metrio-task:
    region: us-central1
    projectId: some-project
    minBackoff: 100ms
    maxBackoff: 1000ms
    maxConcurrentDispatches: 10
    maxDispatchesPerSecond: 100.0
"#;

    const INVALID_CONFIG: &str = r#"
cloudTasks:
  some-task:
    region:
      - should_not_be_an_array
"#;

    const MISSING_REGION: &str = r#"
cloudTasks:
  some-task:
    projectId: some-project
    minBackoff: 100ms
    maxBackoff: 1000ms
    maxConcurrentDispatches: 10
    maxDispatchesPerSecond: 100.0
"#;

    #[test]
    fn test_parse_valid_config() {
        let settings = parse_settings(VALID_QUEUE_CONFIG).unwrap();
        let config = resolve(settings, "metrio-client").unwrap();

        assert_eq!(config.len(), 1);
        let queue = &config.queues["metrio-task"];
        assert_eq!(queue.name, "metrio-client-metrio-task-some-project");
        assert_eq!(queue.region, "us-central1");
        assert_eq!(queue.project_id, "some-project");
        assert_eq!(queue.min_backoff, "100ms");
        assert_eq!(queue.max_backoff, "1000ms");
        assert_eq!(queue.max_concurrent_dispatches, 10);
        assert_eq!(queue.max_dispatches_per_second, 100.0);
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        assert!(parse_settings(INVALID_CONFIG).is_err());
    }

    #[test]
    fn test_resolve_rejects_missing_field() {
        let settings = parse_settings(MISSING_REGION).unwrap();
        let err = resolve(settings, "metrio-client").unwrap_err();

        let chain = format!("{:#}", err);
        assert!(chain.contains("validate failed on the required rule"));
        assert!(chain.contains("region"));
    }

    #[test]
    fn test_queue_keys_are_lowercased() {
        let yaml = VALID_QUEUE_CONFIG.replace("metrio-task", "MailQueue");
        let settings = parse_settings(&yaml).unwrap();
        let config = resolve(settings, "acme").unwrap();

        let keys: Vec<_> = config.queues.keys().cloned().collect();
        assert_eq!(keys, vec!["mailqueue".to_string()]);
        assert_eq!(config.queues["mailqueue"].name, "acme-mailqueue-some-project");
    }

    #[test]
    fn test_parse_without_section_is_empty() {
        let settings = parse_settings("other: 1\n").unwrap();
        assert!(settings.cloud_tasks.is_empty());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_settings("/nonexistent/fougere/config.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fougere/config.yaml"));
    }
}
