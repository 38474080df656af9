use crate::error::{Result, ScheduleError};
use crate::schedule::color::{ColorSettings, Rgb};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub schedule: ScheduleConfig,
    pub colors: ColorConfig,
    pub output: OutputConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// URL or local path of the calendar PDF.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 45,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub team: Option<String>,
    /// Fixed year for every date header. Disables rollover.
    pub year: Option<i32>,
    pub rollover_months: u8,
    pub utc_offset_hours: i8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            team: None,
            year: None,
            rollover_months: 6,
            utc_offset_hours: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub azul: Rgb,
    pub blanco: Rgb,
    pub background: Rgb,
    pub max_distance: f64,
}

impl Default for ColorConfig {
    fn default() -> Self {
        let defaults = ColorSettings::default();
        Self {
            azul: defaults.azul,
            blanco: defaults.blanco,
            background: defaults.background,
            max_distance: defaults.max_distance,
        }
    }
}

impl From<&ColorConfig> for ColorSettings {
    fn from(cfg: &ColorConfig) -> Self {
        ColorSettings {
            azul: cfg.azul,
            blanco: cfg.blanco,
            background: cfg.background,
            max_distance: cfg.max_distance,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let cfg: Config =
            toml::from_str(content).map_err(|e| ScheduleError::Config(e.to_string()))?;
        if cfg.colors.max_distance < 0.0 {
            return Err(ScheduleError::Config(
                "colors.max_distance must not be negative".into(),
            ));
        }
        if cfg.schedule.rollover_months > 11 {
            return Err(ScheduleError::Config(
                "schedule.rollover_months must be between 0 and 11".into(),
            ));
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.source.timeout_secs, 45);
        assert_eq!(cfg.schedule.rollover_months, 6);
        assert_eq!(cfg.output.dir, "output");
        assert!(cfg.notify.enabled);
        assert_eq!(cfg.colors.background, Rgb::new(0xFF, 0xFF, 0xFF));
    }

    #[test]
    fn test_partial_config() {
        let cfg = Config::parse(
            r##"
            [source]
            url = "https://example.org/calendario.pdf"

            [schedule]
            team = "I12"
            year = 2027

            [colors]
            azul = "#0000FF"
            max_distance = 25.5
            "##,
        )
        .unwrap();

        assert_eq!(
            cfg.source.url.as_deref(),
            Some("https://example.org/calendario.pdf")
        );
        assert_eq!(cfg.source.timeout_secs, 45);
        assert_eq!(cfg.schedule.team.as_deref(), Some("I12"));
        assert_eq!(cfg.schedule.year, Some(2027));
        assert_eq!(cfg.colors.azul, Rgb::new(0, 0, 0xFF));
        assert_eq!(cfg.colors.max_distance, 25.5);

        let settings = ColorSettings::from(&cfg.colors);
        assert_eq!(settings.blanco, ColorSettings::default().blanco);
    }

    #[test]
    fn test_bad_color_is_config_error() {
        let err = Config::parse("[colors]\nazul = \"blue\"\n").unwrap_err();
        assert!(matches!(err, ScheduleError::Config(_)));
    }

    #[test]
    fn test_rollover_out_of_range() {
        let err = Config::parse("[schedule]\nrollover_months = 12\n").unwrap_err();
        assert!(matches!(err, ScheduleError::Config(_)));
    }
}
