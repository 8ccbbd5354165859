use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::error::Result;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Summary reports over electric-vehicle registration data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ev-dashboard",
    about = "Summary reports over electric-vehicle registration data",
    version
)]
pub struct Settings {
    /// CSV file, or directory of CSV files, to load
    #[arg(
        long,
        env = "EV_DASHBOARD_DATA",
        default_value = "Electric_Vehicle_Population_Data.csv"
    )]
    pub data: PathBuf,

    /// County to report on ("All" for every county)
    #[arg(long, default_value = "All")]
    pub group: String,

    /// Listing page to show (clamped to the available pages)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per listing page (overrides the config file)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub page_size: Option<usize>,

    /// Manufacturers kept in the range ranking (overrides the config file)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub top_n: Option<usize>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Read paging and group commands from stdin after the first report
    #[arg(long)]
    pub interactive: bool,

    /// JSON engine configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.ev-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".ev-dashboard").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation. Accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear saved settings");
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);
        let saved_page_size = last.page_size.filter(|&n| n > 0);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "group") {
            if let Some(v) = last.group {
                settings.group = v;
            }
        }
        // A config file supplies its own page size; only the CLI overrides it.
        if settings.page_size.is_none() && settings.config.is_none() {
            settings.page_size = saved_page_size;
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        settings = Self::apply_debug(settings);

        let mut params = LastUsedParams::from(&settings);
        if params.page_size.is_none() {
            params.page_size = saved_page_size;
        }
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "could not persist settings");
        }

        settings
    }

    /// Build the engine configuration: the `--config` file (or defaults) with
    /// `--page-size` and `--top-n` applied on top.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load_from(path)?,
            None => EngineConfig::default(),
        };
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            group: Some(s.group.clone()),
            page_size: s.page_size,
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvError;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn args(list: &[&str]) -> Vec<std::ffi::OsString> {
        list.iter().map(|s| (*s).into()).collect()
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            group: Some("King".to_string()),
            page_size: Some(25),
            format: Some("json".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.group, Some("King".to_string()));
        assert_eq!(loaded.page_size, Some(25));
        assert_eq!(loaded.format, Some("json".to_string()));
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.group.is_none());
        assert!(loaded.page_size.is_none());
        assert!(loaded.format.is_none());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    // ── Settings parsing ──────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["ev-dashboard"]);

        assert_eq!(settings.group, "All");
        assert_eq!(settings.page, 1);
        assert!(settings.page_size.is_none());
        assert!(settings.top_n.is_none());
        assert_eq!(settings.format, "text");
        assert!(!settings.interactive);
        assert!(settings.config.is_none());
        assert_eq!(settings.log_level, "WARNING");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_cli_overrides() {
        let settings = Settings::parse_from([
            "ev-dashboard",
            "--data",
            "/tmp/ev.csv",
            "--group",
            "Yakima",
            "--page",
            "4",
            "--page-size",
            "20",
            "--format",
            "json",
        ]);
        assert_eq!(settings.data, PathBuf::from("/tmp/ev.csv"));
        assert_eq!(settings.group, "Yakima");
        assert_eq!(settings.page, 4);
        assert_eq!(settings.page_size, Some(20));
        assert_eq!(settings.format, "json");
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_group() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            group: Some("Thurston".to_string()),
            page_size: Some(15),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&["ev-dashboard"]), &config_path);
        assert_eq!(settings.group, "Thurston");
        assert_eq!(settings.page_size, Some(15));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            group: Some("Thurston".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            args(&["ev-dashboard", "--group", "Clark"]),
            &config_path,
        );
        assert_eq!(settings.group, "Clark");
        assert_eq!(LastUsedParams::load_from(&config_path).group, Some("Clark".to_string()));
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&config_path).expect("save");

        Settings::load_with_last_used_impl(args(&["ev-dashboard", "--clear"]), &config_path);

        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            args(&["ev-dashboard", "--debug"]),
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    // ── engine_config ─────────────────────────────────────────────────────────

    #[test]
    fn test_engine_config_applies_overrides() {
        let settings = Settings::parse_from(["ev-dashboard", "--page-size", "50", "--top-n", "3"]);
        let config = settings.engine_config().expect("config");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.top_n, 3);
    }

    #[test]
    fn test_engine_config_rejects_zero_page_size_from_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("engine.json");
        std::fs::write(&path, r#"{"page_size": 0}"#).expect("write");

        let argv: Vec<std::ffi::OsString> =
            vec!["ev-dashboard".into(), "--config".into(), path.into_os_string()];
        let settings = Settings::parse_from(argv);
        assert!(matches!(settings.engine_config(), Err(EvError::Config(_))));
    }

    #[test]
    fn test_zero_page_size_rejected_at_parse_time() {
        assert!(Settings::try_parse_from(["ev-dashboard", "--page-size", "0"]).is_err());
        assert!(Settings::try_parse_from(["ev-dashboard", "--top-n", "0"]).is_err());
    }

    #[test]
    fn test_saved_zero_page_size_is_ignored() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            page_size: Some(0),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&["ev-dashboard"]), &config_path);
        assert!(settings.page_size.is_none());
        assert_eq!(settings.engine_config().expect("config").page_size, 10);
        assert!(LastUsedParams::load_from(&config_path).page_size.is_none());
    }

    #[test]
    fn test_saved_page_size_does_not_override_config_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::load_with_last_used_impl(
            args(&["ev-dashboard", "--page-size", "20"]),
            &config_path,
        );

        let engine = tmp.path().join("engine.json");
        std::fs::write(&engine, r#"{"page_size": 30}"#).expect("write");
        let argv: Vec<std::ffi::OsString> =
            vec!["ev-dashboard".into(), "--config".into(), engine.into_os_string()];
        let settings = Settings::load_with_last_used_impl(argv, &config_path);

        assert_eq!(settings.engine_config().expect("config").page_size, 30);
        // The saved value survives for later runs without a config file.
        assert_eq!(LastUsedParams::load_from(&config_path).page_size, Some(20));
        let settings = Settings::load_with_last_used_impl(args(&["ev-dashboard"]), &config_path);
        assert_eq!(settings.page_size, Some(20));
    }

    #[test]
    fn test_engine_config_reads_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("engine.json");
        std::fs::write(&path, r#"{"top_n": 5, "page_size": 30}"#).expect("write");

        let argv: Vec<std::ffi::OsString> = vec![
            "ev-dashboard".into(),
            "--config".into(),
            path.into_os_string(),
            "--page-size".into(),
            "12".into(),
        ];
        let settings = Settings::parse_from(argv);
        let config = settings.engine_config().expect("config");
        assert_eq!(config.top_n, 5);
        assert_eq!(config.page_size, 12);
    }
}
