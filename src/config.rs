use serde::{Deserialize, Serialize};
use chrono::Duration;
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::constants::{DEFAULT_MATCH_TOLERANCE_MINUTES, MAX_FORECAST_RECORDS};
use crate::location::Location;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_OUTPUT: &str = "frame.pbm";
/// Largest standard offset from UTC, minutes
const MAX_OFFSET_MINUTES: i32 = 14 * 60;
const MAX_TOLERANCE_MINUTES: i64 = 24 * 60;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration; every field optional so layers can be merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub location: Option<LocationConfig>,
    pub time: Option<TimeConfig>,
    pub display: Option<DisplayConfig>,
    /// DataPoint JSON, optionally gzipped
    pub feed: Option<PathBuf>,
    /// PBM image written after the commit
    pub output: Option<PathBuf>,
    /// icon strip file
    pub icons: Option<PathBuf>,
    /// forecast store size
    pub capacity: Option<usize>,
    /// how far a forecast tile may sit from its target time
    pub match_tolerance_minutes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimeConfig {
    /// local standard time minus UTC; DST is on when the wake offset exceeds it
    pub standard_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub invert: Option<bool>,
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn location(&self) -> Location {
        let home = Location::default();
        let Some(loc) = self.location.as_ref() else {
            return home;
        };
        Location {
            latitude: loc.latitude.unwrap_or(home.latitude),
            longitude: loc.longitude.unwrap_or(home.longitude),
            elevation: loc.elevation.unwrap_or(home.elevation),
        }
    }

    pub fn standard_offset_minutes(&self) -> i32 {
        self.time.as_ref().and_then(|t| t.standard_offset_minutes).unwrap_or(0)
    }

    pub fn invert(&self) -> bool {
        self.display.as_ref().and_then(|d| d.invert).unwrap_or(false)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    pub fn capacity(&self) -> usize {
        self.capacity.unwrap_or(MAX_FORECAST_RECORDS)
    }

    pub fn match_tolerance(&self) -> Duration {
        Duration::minutes(self.match_tolerance_minutes.unwrap_or(DEFAULT_MATCH_TOLERANCE_MINUTES))
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "wxpaper", about = "Render a weather forecast frame for an e-paper panel")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Forecast feed (DataPoint JSON, plain or gzip)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub feed: Option<PathBuf>,
    /// Where to write the rendered frame (PBM)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
    /// Icon strip file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub icons: Option<PathBuf>,
    /// Wake time as RFC 3339 instead of the system clock
    #[arg(long)]
    pub now: Option<String>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, merge CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Effective config as YAML, for --dump-config.
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/wxpaper/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/wxpaper/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/wxpaper.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["wxpaper.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()               { dst.log_level = src.log_level; }
    if src.feed.is_some()                    { dst.feed = src.feed; }
    if src.output.is_some()                  { dst.output = src.output; }
    if src.icons.is_some()                   { dst.icons = src.icons; }
    if src.capacity.is_some()                { dst.capacity = src.capacity; }
    if src.match_tolerance_minutes.is_some() { dst.match_tolerance_minutes = src.match_tolerance_minutes; }
    // location
    match (&mut dst.location, src.location) {
        (None, Some(c)) => dst.location = Some(c),
        (Some(d), Some(s)) => merge_location(d, s),
        _ => {}
    }
    // time
    match (&mut dst.time, src.time) {
        (None, Some(c)) => dst.time = Some(c),
        (Some(d), Some(s)) => {
            if s.standard_offset_minutes.is_some() { d.standard_offset_minutes = s.standard_offset_minutes; }
        }
        _ => {}
    }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => {
            if s.invert.is_some() { d.invert = s.invert; }
        }
        _ => {}
    }
}

fn merge_location(dst: &mut LocationConfig, src: LocationConfig) {
    if src.latitude.is_some()  { dst.latitude = src.latitude; }
    if src.longitude.is_some() { dst.longitude = src.longitude; }
    if src.elevation.is_some() { dst.elevation = src.elevation; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.feed.is_some()      { cfg.feed = cli.feed.clone(); }
    if cli.output.is_some()    { cfg.output = cli.output.clone(); }
    if cli.icons.is_some()     { cfg.icons = cli.icons.clone(); }

    if cli.latitude.is_some() || cli.longitude.is_some() {
        let location = cfg.location.get_or_insert_with(LocationConfig::default);
        if cli.latitude.is_some()  { location.latitude = cli.latitude; }
        if cli.longitude.is_some() { location.longitude = cli.longitude; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let location = cfg.location();
    if !location.is_valid() {
        return Err(ConfigError::Validation(format!("location {} out of range", location)));
    }
    if cfg.capacity() < 2 {
        return Err(ConfigError::Validation("capacity must be at least 2".into()));
    }
    if cfg.standard_offset_minutes().abs() > MAX_OFFSET_MINUTES {
        return Err(ConfigError::Validation("time standard_offset_minutes must be within ±14h".into()));
    }
    let tolerance = cfg.match_tolerance_minutes.unwrap_or(DEFAULT_MATCH_TOLERANCE_MINUTES);
    if tolerance <= 0 || tolerance > MAX_TOLERANCE_MINUTES {
        return Err(ConfigError::Validation("match_tolerance_minutes must be in 1..=1440".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = "
log_level: debug
location:
  latitude: 55.95
  longitude: -3.19
time:
  standard_offset_minutes: 0
display:
  invert: true
feed: /tmp/forecast.json
capacity: 24
";

    fn yaml_config() -> Config {
        serde_yaml::from_str(YAML).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.log_level(), "info");
        assert_eq!(cfg.location(), Location::default());
        assert_eq!(cfg.capacity(), 40);
        assert_eq!(cfg.match_tolerance(), Duration::minutes(90));
        assert_eq!(cfg.output_path(), PathBuf::from("frame.pbm"));
        assert!(!cfg.invert());
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_yaml_then_cli() {
        let mut cfg = Config::default();
        merge(&mut cfg, yaml_config());
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.capacity(), 24);
        assert!(cfg.invert());
        // elevation falls back to the default
        assert_eq!(cfg.location().elevation, 0.0);

        let cli = Cli::try_parse_from(["wxpaper", "--latitude", "-33.9", "--log-level", "warn"]).unwrap();
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.log_level(), "warn");
        assert_eq!(cfg.location().latitude, -33.9);
        assert_eq!(cfg.location().longitude, -3.19);
        assert_eq!(cfg.feed, Some(PathBuf::from("/tmp/forecast.json")));
    }

    #[test]
    fn test_partial_merge_keeps_fields() {
        let mut cfg = yaml_config();
        let later: Config = serde_yaml::from_str("location:\n  elevation: 40\n").unwrap();
        merge(&mut cfg, later);
        let loc = cfg.location();
        assert_eq!((loc.latitude, loc.elevation), (55.95, 40.0));
    }

    #[test]
    fn test_validation() {
        let mut cfg = Config::default();
        cfg.capacity = Some(1);
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));

        let mut cfg = Config::default();
        cfg.location = Some(LocationConfig { latitude: Some(95.0), ..Default::default() });
        assert!(validate(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.time = Some(TimeConfig { standard_offset_minutes: Some(15 * 60) });
        assert!(validate(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.match_tolerance_minutes = Some(0);
        assert!(validate(&cfg).is_err());
        cfg.match_tolerance_minutes = Some(i64::MAX);
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!("wxpaper-config-{}.yaml", std::process::id()));
        fs::write(&path, YAML).unwrap();
        let cli = Cli { config: Some(path.clone()), ..Default::default() };
        let cfg = load(&cli).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(cfg.capacity(), 24);

        let missing = Cli { config: Some(PathBuf::from("/nonexistent/wxpaper.yaml")), ..Default::default() };
        assert!(matches!(load(&missing), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_dump_roundtrips() {
        let cfg = yaml_config();
        let text = dump(&cfg).unwrap();
        let back: Config = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
