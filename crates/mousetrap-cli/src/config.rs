//! Configuration Vault – reads/writes `~/.mousetrap/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use mousetrap_runtime::{LogFormat, TelemetryConfig};
use mousetrap_sim::SimulationConfig;
use mousetrap_types::ConfigError;
use serde::{Deserialize, Serialize};

/// Persisted configuration stored in `~/.mousetrap/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Return the path to `~/.mousetrap/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".mousetrap").join("config.toml")
}

/// Load the config at `path` and apply `MOUSETRAP_*` overrides.
///
/// A missing file yields the defaults.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg)?;
    Ok(cfg)
}

/// Read the config from a specific path.  Returns `None` if the file does
/// not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let cfg: Config = toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Ok(Some(cfg))
}

/// Apply `MOUSETRAP_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `MOUSETRAP_TICK_INTERVAL` | `simulation.tick_interval` |
/// | `MOUSETRAP_FRAME_DELTA` | `simulation.frame_delta` |
/// | `MOUSETRAP_SEED` | `simulation.seed` |
/// | `MOUSETRAP_LOG_FORMAT` | `telemetry.log_format` |
///
/// Unparsable values are rejected rather than silently ignored.
pub fn apply_env_overrides(cfg: &mut Config) -> Result<(), ConfigError> {
    if let Some(v) = env_parsed::<f64>("MOUSETRAP_TICK_INTERVAL")? {
        cfg.simulation.tick_interval = v;
    }
    if let Some(v) = env_parsed::<f64>("MOUSETRAP_FRAME_DELTA")? {
        cfg.simulation.frame_delta = v;
    }
    if let Some(v) = env_parsed::<u64>("MOUSETRAP_SEED")? {
        cfg.simulation.seed = v;
    }
    match std::env::var("MOUSETRAP_LOG_FORMAT").as_deref() {
        Ok("json") => cfg.telemetry.log_format = LogFormat::Json,
        Ok("compact") => cfg.telemetry.log_format = LogFormat::Compact,
        _ => {}
    }
    Ok(())
}

fn env_parsed<T: std::str::FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
            field: var.to_string(),
            reason: format!("cannot parse {raw:?}"),
        }),
        Err(_) => Ok(None),
    }
}

/// Save the config to a specific path, creating its directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        // Restrict the config directory to the owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| io_error(parent, e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg).map_err(|e| ConfigError::Serialize(e.to_string()))?;
    // Owner-only read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| io_error(path, e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| io_error(path, e))?;
    Ok(())
}

fn io_error(path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "config file must have 0o600 permissions");

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        let dir_mode = dir_meta.permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700, "config directory must have 0o700 permissions");
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn roundtrip_preserves_edits() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("custom.toml");

        let mut cfg = Config::default();
        cfg.simulation.seed = 99;
        cfg.simulation.cat.waypoints.truncate(2);
        cfg.telemetry.log_format = LogFormat::Json;
        cfg.telemetry.otlp_endpoint = Some("http://collector:4318".to_string());
        save_to(&cfg, &path).expect("save");

        assert_eq!(load_from(&path).expect("load ok"), Some(cfg));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[simulation]\ntick_interval = 0.1\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.simulation.tick_interval, 0.1);
        assert_eq!(loaded.simulation.cat, Default::default());
        assert_eq!(loaded.telemetry, TelemetryConfig::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[simulation\n").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn config_path_points_to_mousetrap_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".mousetrap"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    // One test for all variables: the environment is process-wide and tests
    // run in parallel.
    #[test]
    fn apply_env_overrides() {
        // SAFETY: no other test touches these variables.
        unsafe {
            std::env::set_var("MOUSETRAP_TICK_INTERVAL", "0.125");
            std::env::set_var("MOUSETRAP_SEED", " 42 ");
        }
        let mut cfg = Config::default();
        let result = super::apply_env_overrides(&mut cfg);
        assert_eq!(result, Ok(()));
        assert_eq!(cfg.simulation.tick_interval, 0.125);
        assert_eq!(cfg.simulation.seed, 42);

        unsafe { std::env::set_var("MOUSETRAP_SEED", "not-a-seed") };
        let mut cfg = Config::default();
        let result = super::apply_env_overrides(&mut cfg);
        unsafe {
            std::env::remove_var("MOUSETRAP_TICK_INTERVAL");
            std::env::remove_var("MOUSETRAP_SEED");
        }
        assert!(matches!(result, Err(ConfigError::InvalidValue { field, .. }) if field == "MOUSETRAP_SEED"));
        assert_eq!(cfg.simulation.seed, SimulationConfig::default().seed);
    }
}
