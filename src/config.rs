/*
 *  config.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  YAML configuration with command line overrides
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::{
    DEFAULT_BANNER, DEFAULT_I2C_ADDRESS, DEFAULT_I2C_BUS, DEFAULT_SUBTITLE, DEFAULT_TICK_MS,
    DISPLAY_HEIGHT, DISPLAY_WIDTH,
};
use crate::layout::IdleText;
use crate::session::mpd::{DEFAULT_HOST, DEFAULT_IO_TIMEOUT, DEFAULT_PORT};

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

/// Everything is optional so layers can be merged field by field; the
/// accessors below resolve defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>, // "info" | "debug" | ...
    pub tick_ms: Option<u64>,
    pub mpd: Option<MpdConfig>,
    pub display: Option<DisplayConfig>,
    pub idle: Option<IdleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MpdConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotate_deg: Option<u16>,
    pub invert: Option<bool>,
    pub brightness: Option<u8>,
    pub driver: Option<DriverKind>,
    pub bus: Option<BusConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IdleConfig {
    pub banner: Option<String>,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    I2c {
        bus: String, // e.g. "/dev/i2c-1"
        address: u8, // 7-bit, usually 0x3C or 0x3D
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Ssd1306,
    /// In-memory panel, nothing leaves the process.
    Headless,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "mpdoled", version, about = "MPD now-playing monitor for small OLED panels")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Shorthand for --log-level debug
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// MPD host name or address
    #[arg(long, value_hint = ValueHint::Hostname)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub display_rotate_deg: Option<u16>,
    #[arg(long, action = ArgAction::Set)]
    pub display_invert: Option<bool>,
    /// Render into memory only, no panel attached
    #[arg(long, action = ArgAction::SetTrue)]
    pub headless: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

impl Config {
    /// defaults, then YAML (explicit path or search), then CLI, then validate
    pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
        let mut cfg = Config::default();

        if let Some(p) = cli.config.as_ref() {
            if !p.exists() {
                return Err(ConfigError::Validation(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            merge(&mut cfg, read_yaml(p)?);
        } else if let Some(p) = find_config_file() {
            merge(&mut cfg, read_yaml(&p)?);
        }

        apply_cli_overrides(&mut cfg, cli);
        validate(&cfg)?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Pretty YAML of the effective config.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.unwrap_or(DEFAULT_TICK_MS))
    }

    pub fn mpd_host(&self) -> &str {
        self.mpd.as_ref().and_then(|m| m.host.as_deref()).unwrap_or(DEFAULT_HOST)
    }

    pub fn mpd_port(&self) -> u16 {
        self.mpd.as_ref().and_then(|m| m.port).unwrap_or(DEFAULT_PORT)
    }

    /// Empty strings count as no password.
    pub fn mpd_password(&self) -> Option<String> {
        self.mpd
            .as_ref()
            .and_then(|m| m.password.clone())
            .filter(|p| !p.is_empty())
    }

    pub fn mpd_timeout(&self) -> Duration {
        self.mpd
            .as_ref()
            .and_then(|m| m.timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_IO_TIMEOUT)
    }

    /// Display section with panel defaults filled in; the stock panel is an
    /// SSD1306 on the first I2C bus.
    pub fn effective_display(&self) -> DisplayConfig {
        let d = self.display.clone().unwrap_or_default();
        let driver = d.driver.unwrap_or(DriverKind::Ssd1306);
        let bus = match (driver, d.bus) {
            (DriverKind::Ssd1306, None) => Some(BusConfig::I2c {
                bus: DEFAULT_I2C_BUS.to_string(),
                address: DEFAULT_I2C_ADDRESS,
            }),
            (_, bus) => bus,
        };
        DisplayConfig {
            width: Some(d.width.unwrap_or(DISPLAY_WIDTH)),
            height: Some(d.height.unwrap_or(DISPLAY_HEIGHT)),
            rotate_deg: Some(d.rotate_deg.unwrap_or(0)),
            invert: Some(d.invert.unwrap_or(false)),
            brightness: d.brightness,
            driver: Some(driver),
            bus,
        }
    }

    pub fn idle_text(&self) -> IdleText {
        let idle = self.idle.clone().unwrap_or_default();
        IdleText {
            banner: idle.banner.unwrap_or_else(|| DEFAULT_BANNER.to_string()),
            subtitle: idle.subtitle.unwrap_or_else(|| DEFAULT_SUBTITLE.to_string()),
        }
    }
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/mpdoled/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/mpdoled/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/mpdoled.yaml");
        if p.exists() { return Some(p) }
    }
    // working directory
    for candidate in &["mpdoled.yaml", "config.yaml", "config/mpdoled.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    Config::from_yaml(&s)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    if src.tick_ms.is_some()   { dst.tick_ms = src.tick_ms; }
    match (&mut dst.mpd, src.mpd) {
        (None, Some(m)) => dst.mpd = Some(m),
        (Some(d), Some(s)) => merge_mpd(d, s),
        _ => {}
    }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.idle, src.idle) {
        (None, Some(i)) => dst.idle = Some(i),
        (Some(d), Some(s)) => {
            if s.banner.is_some()   { d.banner = s.banner; }
            if s.subtitle.is_some() { d.subtitle = s.subtitle; }
        }
        _ => {}
    }
}

fn merge_mpd(dst: &mut MpdConfig, src: MpdConfig) {
    if src.host.is_some()       { dst.host = src.host; }
    if src.port.is_some()       { dst.port = src.port; }
    if src.password.is_some()   { dst.password = src.password; }
    if src.timeout_ms.is_some() { dst.timeout_ms = src.timeout_ms; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()      { dst.width = src.width; }
    if src.height.is_some()     { dst.height = src.height; }
    if src.rotate_deg.is_some() { dst.rotate_deg = src.rotate_deg; }
    if src.invert.is_some()     { dst.invert = src.invert; }
    if src.brightness.is_some() { dst.brightness = src.brightness; }
    if src.driver.is_some()     { dst.driver = src.driver; }
    if src.bus.is_some()        { dst.bus = src.bus; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug               { cfg.log_level = Some("debug".to_string()); }

    if cli.host.is_some() || cli.port.is_some() || cli.password.is_some() {
        let mpd = cfg.mpd.get_or_insert_with(MpdConfig::default);
        if cli.host.is_some()     { mpd.host = cli.host.clone(); }
        if cli.port.is_some()     { mpd.port = cli.port; }
        if cli.password.is_some() { mpd.password = cli.password.clone(); }
    }

    let any_display = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.display_rotate_deg.is_some()
        || cli.display_invert.is_some()
        || cli.headless;
    if any_display {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.display_width.is_some()      { display.width = cli.display_width; }
        if cli.display_height.is_some()     { display.height = cli.display_height; }
        if cli.display_rotate_deg.is_some() { display.rotate_deg = cli.display_rotate_deg; }
        if cli.display_invert.is_some()     { display.invert = cli.display_invert; }
        if cli.headless                     { display.driver = Some(DriverKind::Headless); }
    }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.tick_ms == Some(0) {
        return Err(ConfigError::Validation("tick_ms must be > 0".into()));
    }
    if let Some(mpd) = cfg.mpd.as_ref() {
        if mpd.port == Some(0) {
            return Err(ConfigError::Validation("mpd port must be > 0".into()));
        }
        if mpd.timeout_ms == Some(0) {
            return Err(ConfigError::Validation("mpd timeout_ms must be > 0".into()));
        }
    }
    if let Some(display) = cfg.display.as_ref() {
        if display.width == Some(0) || display.height == Some(0) {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
        if let Some(rot) = display.rotate_deg {
            match rot {
                0 | 90 | 180 | 270 => {}
                _ => return Err(ConfigError::Validation("display rotate_deg must be 0|90|180|270".into())),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["mpdoled"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    const SAMPLE: &str = r#"
log_level: warn
tick_ms: 500
mpd:
  host: moode.local
  port: 6601
  password: sesame
display:
  driver: ssd1306
  rotate_deg: 180
  bus:
    type: i2c
    bus: /dev/i2c-3
    address: 61
idle:
  banner: living room
"#;

    #[test]
    fn test_yaml_sections_parse() {
        let cfg = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(cfg.log_level(), "warn");
        assert_eq!(cfg.tick(), Duration::from_millis(500));
        assert_eq!(cfg.mpd_host(), "moode.local");
        assert_eq!(cfg.mpd_port(), 6601);
        assert_eq!(cfg.mpd_password().as_deref(), Some("sesame"));
        let display = cfg.effective_display();
        assert_eq!(display.bus, Some(BusConfig::I2c { bus: "/dev/i2c-3".into(), address: 0x3D }));
        assert_eq!(display.rotate_deg, Some(180));
        let idle = cfg.idle_text();
        assert_eq!(idle.banner, "living room");
        assert_eq!(idle.subtitle, DEFAULT_SUBTITLE);
    }

    #[test]
    fn test_defaults_without_any_source() {
        let cfg = Config::default();
        assert_eq!(cfg.log_level(), "info");
        assert_eq!(cfg.tick(), Duration::from_secs(1));
        assert_eq!(cfg.mpd_host(), "localhost");
        assert_eq!(cfg.mpd_port(), 6600);
        assert_eq!(cfg.mpd_password(), None);
        assert_eq!(cfg.mpd_timeout(), Duration::from_millis(3000));

        let display = cfg.effective_display();
        assert_eq!(display.driver, Some(DriverKind::Ssd1306));
        assert_eq!((display.width, display.height), (Some(128), Some(64)));
        assert_eq!(display.bus, Some(BusConfig::I2c { bus: "/dev/i2c-1".into(), address: 0x3C }));
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let mut cfg = Config::from_yaml(SAMPLE).unwrap();
        apply_cli_overrides(&mut cfg, &cli(&["--host", "10.0.0.5", "--debug", "--display-invert", "true"]));
        assert_eq!(cfg.mpd_host(), "10.0.0.5");
        assert_eq!(cfg.mpd_port(), 6601);
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.effective_display().invert, Some(true));
    }

    #[test]
    fn test_headless_flag_selects_memory_panel() {
        let mut cfg = Config::default();
        apply_cli_overrides(&mut cfg, &cli(&["--headless"]));
        let display = cfg.effective_display();
        assert_eq!(display.driver, Some(DriverKind::Headless));
        assert_eq!(display.bus, None);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut base = Config::from_yaml(SAMPLE).unwrap();
        let over = Config::from_yaml("mpd:\n  port: 7000\n").unwrap();
        merge(&mut base, over);
        assert_eq!(base.mpd_host(), "moode.local");
        assert_eq!(base.mpd_port(), 7000);
    }

    #[test]
    fn test_empty_password_is_none() {
        let cfg = Config::from_yaml("mpd:\n  password: ''\n").unwrap();
        assert_eq!(cfg.mpd_password(), None);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        for bad in [
            "tick_ms: 0\n",
            "mpd:\n  port: 0\n",
            "display:\n  width: 0\n",
            "display:\n  rotate_deg: 45\n",
        ] {
            let cfg = Config::from_yaml(bad).unwrap();
            assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))), "{bad}");
        }
        assert!(validate(&Config::from_yaml(SAMPLE).unwrap()).is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(&cli(&["--config", "/nonexistent/mpdoled.yaml"])).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_reads_explicit_file() {
        let path = std::env::temp_dir().join(format!("mpdoled-test-{}.yaml", std::process::id()));
        fs::write(&path, SAMPLE).unwrap();
        let cfg = Config::load(&cli(&["--config", path.to_str().unwrap(), "--port", "6700"])).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(cfg.mpd_host(), "moode.local");
        assert_eq!(cfg.mpd_port(), 6700);
    }

    #[test]
    fn test_dump_round_trips() {
        let cfg = Config::from_yaml(SAMPLE).unwrap();
        let again = Config::from_yaml(&cfg.to_yaml().unwrap()).unwrap();
        assert_eq!(cfg, again);
    }
}
