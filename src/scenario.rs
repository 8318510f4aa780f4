use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::InputDefaults;
use crate::staffing::{StaffingParameters, WorkloadInput};

/// Workload fields that may each be left unset and filled in later.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartialWorkload {
    #[serde(default)]
    pub hour_count: Option<usize>,
    #[serde(default, alias = "aht_minutes")]
    pub average_handling_time_minutes: Option<f64>,
    #[serde(default, alias = "volumes")]
    pub hourly_volume: Option<Vec<i64>>,
    #[serde(default)]
    pub tat_target_minutes: Option<u32>,
    #[serde(default)]
    pub tat_compliance_percent: Option<u32>,
    #[serde(default)]
    pub spillover_volume: Option<i64>,
}

impl PartialWorkload {
    /// Fields set on `over` win.
    pub fn merge(self, over: PartialWorkload) -> PartialWorkload {
        PartialWorkload {
            hour_count: over.hour_count.or(self.hour_count),
            average_handling_time_minutes: over
                .average_handling_time_minutes
                .or(self.average_handling_time_minutes),
            hourly_volume: over.hourly_volume.or(self.hourly_volume),
            tat_target_minutes: over.tat_target_minutes.or(self.tat_target_minutes),
            tat_compliance_percent: over.tat_compliance_percent.or(self.tat_compliance_percent),
            spillover_volume: over.spillover_volume.or(self.spillover_volume),
        }
    }

    /// Without volumes the demo ramp `20 * (h + 1)` is used over the
    /// configured number of hours.
    pub fn resolve(self, defaults: &InputDefaults) -> WorkloadInput {
        let (hour_count, hourly_volume) = match self.hourly_volume {
            Some(volumes) => (self.hour_count.unwrap_or(volumes.len()), volumes),
            None => {
                let hours = self.hour_count.unwrap_or(defaults.hours);
                (hours, demo_volumes(hours))
            }
        };
        WorkloadInput {
            hour_count,
            average_handling_time_minutes: self
                .average_handling_time_minutes
                .unwrap_or(defaults.aht_minutes),
            hourly_volume,
            tat_target_minutes: self
                .tat_target_minutes
                .unwrap_or(defaults.tat_target_minutes),
            tat_compliance_percent: self
                .tat_compliance_percent
                .unwrap_or(defaults.tat_compliance_percent),
            spillover_volume: self.spillover_volume.unwrap_or(defaults.spillover_volume),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(flatten)]
    pub workload: PartialWorkload,
    #[serde(default)]
    pub staffing: Option<StaffingParameters>,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading scenario: {}", path.display()))?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        if is_toml {
            toml::from_str(&data)
                .with_context(|| format!("failed parsing TOML scenario: {}", path.display()))
        } else {
            serde_json::from_str(&data)
                .with_context(|| format!("failed parsing JSON scenario: {}", path.display()))
        }
    }
}

pub fn demo_volumes(hours: usize) -> Vec<i64> {
    (0..hours).map(|h| 20 * (h as i64 + 1)).collect()
}

/// Parses "10,20,30" or "10 20 30".
pub fn parse_volumes(raw: &str) -> Result<Vec<i64>> {
    let mut out = Vec::new();
    for piece in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed
            .parse::<i64>()
            .map_err(|e| anyhow!("invalid volume {trimmed:?}: {e}"))?;
        out.push(value);
    }
    if out.is_empty() {
        return Err(anyhow!("volume list is empty"));
    }
    Ok(out)
}

pub fn parse_targets(raw: &str) -> Result<Vec<u32>> {
    let mut out = Vec::new();
    for piece in raw.split(',') {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push(
            trimmed
                .parse::<u32>()
                .map_err(|e| anyhow!("invalid TAT target {trimmed:?}: {e}"))?,
        );
    }
    if out.is_empty() {
        return Err(anyhow!("TAT target list is empty"));
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_volume_lists() {
        assert_eq!(parse_volumes("10,20, 30").expect("parse"), vec![10, 20, 30]);
        assert_eq!(parse_volumes("5 6\t7").expect("parse"), vec![5, 6, 7]);
        assert_eq!(parse_volumes("-3").expect("parse"), vec![-3]);
        assert!(parse_volumes("1,x").is_err());
        assert!(parse_volumes(" , ").is_err());
    }

    #[test]
    fn parses_and_dedupes_targets() {
        assert_eq!(parse_targets("240,60, 120,60").expect("parse"), vec![60, 120, 240]);
        assert!(parse_targets("").is_err());
    }

    #[test]
    fn demo_ramp_matches_hours() {
        let input = PartialWorkload::default().resolve(&InputDefaults::default());
        assert_eq!(input.hour_count, 9);
        assert_eq!(input.hourly_volume, vec![20, 40, 60, 80, 100, 120, 140, 160, 180]);
        assert!((input.average_handling_time_minutes - 5.0).abs() < 1e-9);
        assert_eq!(input.tat_target_minutes, 120);
    }

    #[test]
    fn later_layer_wins_on_merge() {
        let file = PartialWorkload {
            hourly_volume: Some(vec![1, 2, 3]),
            tat_target_minutes: Some(60),
            ..PartialWorkload::default()
        };
        let cli = PartialWorkload {
            tat_target_minutes: Some(180),
            spillover_volume: Some(4),
            ..PartialWorkload::default()
        };
        let input = file.merge(cli).resolve(&InputDefaults::default());
        assert_eq!(input.hour_count, 3);
        assert_eq!(input.hourly_volume, vec![1, 2, 3]);
        assert_eq!(input.tat_target_minutes, 180);
        assert_eq!(input.spillover_volume, 4);
        assert_eq!(input.tat_compliance_percent, 95);
    }

    #[test]
    fn explicit_hour_count_is_kept_for_validation() {
        let partial = PartialWorkload {
            hour_count: Some(5),
            hourly_volume: Some(vec![1, 2]),
            ..PartialWorkload::default()
        };
        let input = partial.resolve(&InputDefaults::default());
        assert_eq!(input.hour_count, 5);
        assert_eq!(input.hourly_volume.len(), 2);
    }

    #[test]
    fn loads_json_and_toml_scenarios() {
        let dir = std::env::temp_dir().join(format!("fte-planner-scenario-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("mkdir");

        let json_path = dir.join("scenario.json");
        fs::write(
            &json_path,
            r#"{"volumes": [10, 20, 30], "aht_minutes": 5, "tat_target_minutes": 150,
                "staffing": {"staffed_minutes_per_fte": 480, "productive_minutes_per_fte": 400}}"#,
        )
        .expect("write json");
        let scenario = ScenarioFile::load(&json_path).expect("load json");
        assert_eq!(scenario.workload.hourly_volume, Some(vec![10, 20, 30]));
        assert_eq!(scenario.workload.tat_target_minutes, Some(150));
        let staffing = scenario.staffing.expect("missing staffing");
        assert!((staffing.staffed_minutes_per_fte - 480.0).abs() < 1e-9);

        let toml_path = dir.join("scenario.toml");
        fs::write(
            &toml_path,
            "hourly_volume = [4, 8]\ntat_compliance_percent = 80\nspillover_volume = 12\n",
        )
        .expect("write toml");
        let scenario = ScenarioFile::load(&toml_path).expect("load toml");
        assert_eq!(scenario.workload.hourly_volume, Some(vec![4, 8]));
        assert_eq!(scenario.workload.tat_compliance_percent, Some(80));
        assert_eq!(scenario.workload.spillover_volume, Some(12));
        assert!(scenario.staffing.is_none());

        fs::remove_dir_all(&dir).ok();
    }
}
