//! Client configuration structures and loaders.
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use revival_core::{EntityId, ItemId, RecoveryProfile, RevivalConfig};

/// Configuration required to bootstrap a revival runtime.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub revival: RevivalConfig,
    /// Entity controlled on this machine.
    pub local_participant: EntityId,
    /// Period of the runtime tick driver.
    pub tick_interval: Duration,
    /// Directory for log files. Platform data directory when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            revival: RevivalConfig::default(),
            local_participant: EntityId::from(Self::DEFAULT_LOCAL_PARTICIPANT),
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            log_dir: None,
        }
    }
}

impl ClientConfig {
    pub const DEFAULT_LOCAL_PARTICIPANT: &'static str = "player";
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `REVIVAL_CONFIG_FILE` - JSON file with a full revival config (loaded first)
    /// - `REVIVAL_ITEM_ID` - Template id of the required item
    /// - `REVIVAL_TESTING` - Bypass item and cooldown checks (default: false)
    /// - `REVIVAL_COOLDOWN_SECS` - Cooldown between revivals (default: 180)
    /// - `REVIVAL_INVULNERABILITY_SECS` - Invulnerability window (default: 10)
    /// - `REVIVAL_RECOVERY_PROFILE` - `partial` (default) or `legacy_full`
    /// - `REVIVAL_LOCAL_ENTITY` - Local participant id (default: player)
    /// - `REVIVAL_TICK_MS` - Tick driver period (default: 50)
    /// - `LOG_DIR` - Log directory (default: platform-specific)
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = var("REVIVAL_CONFIG_FILE") {
            config.revival = load_revival_file(Path::new(&path))?;
        }

        if let Some(item) = var("REVIVAL_ITEM_ID") {
            config.revival.required_item = ItemId::new(item);
        }

        // Also accept just setting the variable without value as "true"
        match var("REVIVAL_TESTING") {
            Some(value) if value.is_empty() => config.revival.bypass_requirements = true,
            Some(value) => {
                config.revival.bypass_requirements = parse::<bool>("REVIVAL_TESTING", &value)?;
            }
            None => {}
        }

        if let Some(secs) = read::<u64>(&var, "REVIVAL_COOLDOWN_SECS")? {
            config.revival.cooldown = Duration::from_secs(secs);
        }

        if let Some(secs) = read::<u64>(&var, "REVIVAL_INVULNERABILITY_SECS")? {
            config.revival.invulnerability = Duration::from_secs(secs);
        }

        if let Some(profile) = var("REVIVAL_RECOVERY_PROFILE") {
            config.revival.recovery = parse_recovery_profile(&profile)?;
        }

        if let Some(entity) = var("REVIVAL_LOCAL_ENTITY") {
            config.local_participant = EntityId::new(entity);
        }

        if let Some(ms) = read::<u64>(&var, "REVIVAL_TICK_MS")? {
            config.tick_interval = Duration::from_millis(ms.max(1));
        }

        config.log_dir = var("LOG_DIR").map(PathBuf::from);

        config
            .revival
            .validate()
            .context("invalid revival configuration")?;

        Ok(config)
    }
}

/// Reads a revival config from a JSON file. Missing fields keep their defaults.
pub fn load_revival_file(path: &Path) -> Result<RevivalConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read revival config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse revival config {}", path.display()))
}

pub fn parse_recovery_profile(name: &str) -> Result<RecoveryProfile> {
    match name.trim().to_ascii_lowercase().as_str() {
        "partial" => Ok(RecoveryProfile::partial()),
        "legacy_full" | "legacy" => Ok(RecoveryProfile::legacy_full()),
        other => bail!("unknown recovery profile {other:?} (expected partial or legacy_full)"),
    }
}

fn read<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key).map(|value| parse(key, &value)).transpose()
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} has invalid value {value:?}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = ClientConfig::from_vars(vars(&[])).unwrap();

        assert_eq!(config.revival, RevivalConfig::default());
        assert_eq!(config.local_participant, EntityId::from("player"));
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let config = ClientConfig::from_vars(vars(&[
            ("REVIVAL_ITEM_ID", "5c0e530286f7747fa1419862"),
            ("REVIVAL_TESTING", "true"),
            ("REVIVAL_COOLDOWN_SECS", "30"),
            ("REVIVAL_INVULNERABILITY_SECS", "4"),
            ("REVIVAL_RECOVERY_PROFILE", "legacy_full"),
            ("REVIVAL_TICK_MS", "20"),
            ("LOG_DIR", "/tmp/revival-logs"),
        ]))
        .unwrap();

        assert_eq!(config.revival.required_item.as_str(), "5c0e530286f7747fa1419862");
        assert!(config.revival.bypass_requirements);
        assert_eq!(config.revival.cooldown, Duration::from_secs(30));
        assert_eq!(config.revival.invulnerability, Duration::from_secs(4));
        assert_eq!(config.revival.recovery, RecoveryProfile::legacy_full());
        assert_eq!(config.tick_interval, Duration::from_millis(20));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/revival-logs")));
    }

    #[test]
    fn bare_testing_flag_enables_bypass() {
        let config = ClientConfig::from_vars(vars(&[("REVIVAL_TESTING", "")])).unwrap();

        assert!(config.revival.bypass_requirements);
    }

    #[test]
    fn malformed_number_is_an_error() {
        let err = ClientConfig::from_vars(vars(&[("REVIVAL_COOLDOWN_SECS", "soon")])).unwrap_err();

        assert!(err.to_string().contains("REVIVAL_COOLDOWN_SECS"));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        assert!(parse_recovery_profile("full").is_err());
        assert_eq!(
            parse_recovery_profile(" Partial ").unwrap(),
            RecoveryProfile::partial()
        );
    }

    #[test]
    fn zero_invulnerability_fails_validation() {
        let result = ClientConfig::from_vars(vars(&[("REVIVAL_INVULNERABILITY_SECS", "0")]));

        assert!(result.is_err());
    }

    #[test]
    fn config_file_is_loaded_then_overridden() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "item_name": "stim",
                "cooldown": {{ "secs": 60, "nanos": 0 }},
                "revival_key": "F6"
            }}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let config = ClientConfig::from_vars(vars(&[
            ("REVIVAL_CONFIG_FILE", path.as_str()),
            ("REVIVAL_INVULNERABILITY_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.revival.item_name, "stim");
        assert_eq!(config.revival.cooldown, Duration::from_secs(60));
        assert_eq!(config.revival.revival_key, "F6");
        assert_eq!(config.revival.invulnerability, Duration::from_secs(5));
        assert_eq!(config.revival.required_item, RevivalConfig::default().required_item);
    }

    #[test]
    fn unreadable_config_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let err = load_revival_file(&missing).unwrap_err();

        assert!(err.to_string().contains("missing.json"));
    }
}
