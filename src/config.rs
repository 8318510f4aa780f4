use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::staffing::{StaffingParameters, DEFAULT_PRODUCTIVE_MINUTES, DEFAULT_STAFFED_MINUTES};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub staffing: StaffingConfig,
    #[serde(default)]
    pub defaults: InputDefaults,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffingConfig {
    #[serde(default = "default_staffed_minutes")]
    pub staffed_minutes_per_fte: f64,
    #[serde(default = "default_productive_minutes")]
    pub productive_minutes_per_fte: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDefaults {
    #[serde(default = "default_hours")]
    pub hours: usize,
    #[serde(default = "default_aht_minutes")]
    pub aht_minutes: f64,
    #[serde(default = "default_tat_target_minutes")]
    pub tat_target_minutes: u32,
    #[serde(default = "default_tat_compliance_percent")]
    pub tat_compliance_percent: u32,
    #[serde(default)]
    pub spillover_volume: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Clock time of the first planned hour, "HH:MM".
    #[serde(default)]
    pub shift_start: Option<String>,
    #[serde(default)]
    pub chart: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub staffed_minutes_per_fte: Option<f64>,
    pub productive_minutes_per_fte: Option<f64>,
    pub shift_start: Option<String>,
    pub chart: Option<bool>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/fte-planner/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        Self::from_toml(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(data)?;
        parsed.shift_start()?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(v) = overrides.staffed_minutes_per_fte {
            self.staffing.staffed_minutes_per_fte = v;
        }
        if let Some(v) = overrides.productive_minutes_per_fte {
            self.staffing.productive_minutes_per_fte = v;
        }
        if let Some(v) = overrides.shift_start {
            self.output.shift_start = Some(v);
        }
        if let Some(v) = overrides.chart {
            self.output.chart = v;
        }
    }

    pub fn staffing_parameters(&self) -> StaffingParameters {
        StaffingParameters {
            staffed_minutes_per_fte: self.staffing.staffed_minutes_per_fte,
            productive_minutes_per_fte: self.staffing.productive_minutes_per_fte,
        }
    }

    pub fn shift_start(&self) -> Result<Option<NaiveTime>> {
        self.output
            .shift_start
            .as_deref()
            .map(|raw| {
                NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                    .map_err(|e| anyhow!("invalid shift_start {raw:?} (expected HH:MM): {e}"))
            })
            .transpose()
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[staffing]
# Minutes one FTE is rostered per shift, and the share of them spent on cases.
staffed_minutes_per_fte = 540.0
productive_minutes_per_fte = 408.0

[defaults]
hours = 9
aht_minutes = 5.0
tat_target_minutes = 120
tat_compliance_percent = 95
spillover_volume = 0

[output]
# shift_start = "09:00"
chart = false

[server]
host = "127.0.0.1"
port = 3002
"#;
        template.to_string()
    }
}

impl Default for StaffingConfig {
    fn default() -> Self {
        Self {
            staffed_minutes_per_fte: default_staffed_minutes(),
            productive_minutes_per_fte: default_productive_minutes(),
        }
    }
}

impl Default for InputDefaults {
    fn default() -> Self {
        Self {
            hours: default_hours(),
            aht_minutes: default_aht_minutes(),
            tat_target_minutes: default_tat_target_minutes(),
            tat_compliance_percent: default_tat_compliance_percent(),
            spillover_volume: 0,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_staffed_minutes() -> f64 {
    DEFAULT_STAFFED_MINUTES
}

fn default_productive_minutes() -> f64 {
    DEFAULT_PRODUCTIVE_MINUTES
}

fn default_hours() -> usize {
    9
}

fn default_aht_minutes() -> f64 {
    5.0
}

fn default_tat_target_minutes() -> u32 {
    120
}

fn default_tat_compliance_percent() -> u32 {
    95
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3002
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let config = Config::from_toml(&Config::default_template()).expect("template invalid");
        assert_eq!(config.defaults.hours, 9);
        assert_eq!(config.defaults.tat_target_minutes, 120);
        assert_eq!(config.server.port, 3002);
        assert_eq!(
            config.staffing_parameters(),
            StaffingParameters::default()
        );
        assert!(config.output.shift_start.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = Config::from_toml("[defaults]\naht_minutes = 7.5\n").expect("parse failed");
        assert!((config.defaults.aht_minutes - 7.5).abs() < 1e-9);
        assert_eq!(config.defaults.tat_compliance_percent, 95);
        assert!((config.staffing.productive_minutes_per_fte - 408.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_shift_start() {
        assert!(Config::from_toml("[output]\nshift_start = \"25:99\"\n").is_err());
        let config =
            Config::from_toml("[output]\nshift_start = \"08:30\"\n").expect("parse failed");
        let start = config.shift_start().expect("shift_start invalid");
        assert_eq!(start, NaiveTime::from_hms_opt(8, 30, 0));
    }

    #[test]
    fn overrides_replace_loaded_values() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            productive_minutes_per_fte: Some(420.0),
            chart: Some(true),
            ..ConfigOverrides::default()
        });
        assert!((config.staffing.productive_minutes_per_fte - 420.0).abs() < 1e-9);
        assert!((config.staffing.staffed_minutes_per_fte - 540.0).abs() < 1e-9);
        assert!(config.output.chart);
        assert!(config.output.shift_start.is_none());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("fte-planner-does-not-exist/config.toml");
        let config = Config::load(Some(&path)).expect("load failed");
        assert_eq!(config.defaults.hours, 9);
    }
}
