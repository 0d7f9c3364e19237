use controls::OrbitConfig;
use layers::LabelConfig;
use particles::presets::{
    GALAXY_COUNT, LEAVES, PETALS, SMOKE_COUNT, SNOW, STAR_BASE_COUNT, SUNSPOT_COUNT,
};
use scene::Season;
use serde::{Deserialize, Serialize};

use crate::error::DioramaError;

/// Particle budgets per effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleCounts {
    pub petals: usize,
    pub leaves: usize,
    pub snow: usize,
    pub smoke: usize,
    pub sunspots: usize,
    /// Stars before the per-season extras.
    pub stars: usize,
    pub galaxy: usize,
    /// Build the star field at startup instead of on the first night.
    pub preload_stars: bool,
}

impl Default for ParticleCounts {
    fn default() -> Self {
        Self {
            petals: PETALS.count,
            leaves: LEAVES.count,
            snow: SNOW.count,
            smoke: SMOKE_COUNT,
            sunspots: SUNSPOT_COUNT,
            stars: STAR_BASE_COUNT,
            galaxy: GALAXY_COUNT,
            preload_stars: true,
        }
    }
}

/// Timing of the "drag to orbit" hint overlay.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintConfig {
    pub show_after_s: f64,
    pub visible_s: f64,
    /// How long a click brings the hint back for.
    pub reshow_s: f64,
    pub opacity: f32,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            show_after_s: 2.0,
            visible_s: 10.0,
            reshow_s: 3.0,
            opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DioramaConfig {
    pub orbit: OrbitConfig,
    pub labels: LabelConfig,
    pub particles: ParticleCounts,
    pub hint: HintConfig,
    pub season: Season,
    pub night: bool,
    /// Seeds every random spawn so runs are replayable.
    pub seed: u64,
}

impl Default for DioramaConfig {
    fn default() -> Self {
        Self {
            orbit: OrbitConfig::default(),
            labels: LabelConfig::default(),
            particles: ParticleCounts::default(),
            hint: HintConfig::default(),
            season: Season::Spring,
            night: false,
            seed: 0x5eed_2024,
        }
    }
}

impl DioramaConfig {
    /// Parses a (possibly partial) JSON config; missing keys keep defaults.
    pub fn from_json(text: &str) -> Result<Self, DioramaError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DioramaError> {
        let limits = self.orbit.limits;
        if !(limits.min_distance.is_finite() && limits.max_distance.is_finite()) {
            return Err(DioramaError::Config("orbit distance limits must be finite".into()));
        }
        if self.labels.hit_radius_desktop <= 0.0 || self.labels.hit_radius_touch <= 0.0 {
            return Err(DioramaError::Config("label hit radius must be positive".into()));
        }
        if self.hint.visible_s < 0.0 || self.hint.reshow_s < 0.0 {
            return Err(DioramaError::Config("hint durations must not be negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_keeps_defaults() {
        let config = DioramaConfig::from_json("{}").unwrap();
        assert_eq!(config, DioramaConfig::default());
        assert_eq!(config.particles.petals, 500);
        assert_eq!(config.particles.snow, 1000);
    }

    #[test]
    fn partial_json_overrides_nested_fields() {
        let config = DioramaConfig::from_json(
            r#"{"season": "winter", "night": true, "particles": {"galaxy": 500}, "labels": {"auto_hide_s": 5.0}}"#,
        )
        .unwrap();
        assert_eq!(config.season, Season::Winter);
        assert!(config.night);
        assert_eq!(config.particles.galaxy, 500);
        assert_eq!(config.particles.leaves, 300);
        assert_eq!(config.labels.auto_hide_s, 5.0);
        assert_eq!(config.labels.hit_radius_desktop, 0.1);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = DioramaConfig::from_json("{\"season\": 3").unwrap_err();
        assert!(matches!(err, DioramaError::Config(_)));
        let err = DioramaConfig::from_json(r#"{"labels": {"hit_radius_touch": 0.0}}"#).unwrap_err();
        assert!(matches!(err, DioramaError::Config(_)));
    }
}
