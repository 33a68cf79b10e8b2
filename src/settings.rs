//! Run configuration and variant presets
//!
//! Everything here is fixed for the lifetime of a run. The only choice made at
//! startup is the variant (one ball at 155 Hz or several balls at 60 Hz).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Which flavour of the simulation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// One ball, no ball-ball pass
    Single,
    /// Several balls with pairwise collisions
    #[default]
    Multi,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Single => "single",
            Variant::Multi => "multi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" | "1" => Some(Variant::Single),
            "multi" | "n" => Some(Variant::Multi),
            _ => None,
        }
    }
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("arena radius must be positive and finite, got {0}")]
    ArenaRadius(f32),
    #[error("ball radius must be positive and finite, got {0}")]
    BallRadius(f32),
    #[error("ball radius {ball} does not fit inside arena radius {arena}")]
    BallTooLarge { ball: f32, arena: f32 },
    #[error("restitution must be in (0, 1], got {0}")]
    Restitution(f32),
    #[error("at least one ball is required")]
    NoBalls,
    #[error("tick rate must be positive and finite, got {0}")]
    TickRate(f32),
    #[error("{name} must be finite and non-negative, got {value}")]
    NotFinite { name: &'static str, value: f32 },
}

/// Constants for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub variant: Variant,
    pub arena_center: (f32, f32),
    pub arena_radius: f32,
    pub ball_radius: f32,
    pub ball_count: usize,
    pub ball_start_speed: f32,
    /// Max offset from the arena center per axis at spawn
    pub spawn_jitter: f32,
    pub gravity_magnitude: f32,
    pub tilt_step: f32,
    pub restitution: f32,
    /// Target ticks per second
    pub tick_rate: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}

impl SimConfig {
    /// Preset for a variant
    pub fn for_variant(variant: Variant) -> Self {
        let (ball_count, spawn_jitter, tick_rate) = match variant {
            Variant::Single => (1, 0.0, SINGLE_BALL_TICK_RATE),
            Variant::Multi => (MULTI_BALL_COUNT, MULTI_BALL_SPAWN_JITTER, MULTI_BALL_TICK_RATE),
        };

        Self {
            variant,
            arena_center: (ARENA_CENTER_X, ARENA_CENTER_Y),
            arena_radius: ARENA_RADIUS,
            ball_radius: BALL_RADIUS,
            ball_count,
            ball_start_speed: BALL_START_SPEED,
            spawn_jitter,
            gravity_magnitude: GRAVITY_MAGNITUDE,
            tilt_step: TILT_STEP,
            restitution: RESTITUTION,
            tick_rate,
        }
    }

    /// Preset from a user-supplied variant name, falling back to the default
    pub fn from_variant_name(name: Option<&str>) -> Self {
        match name {
            Some(raw) => match Variant::parse(raw) {
                Some(variant) => Self::for_variant(variant),
                None => {
                    log::warn!("Unknown variant {:?}, using {}", raw, Variant::default().as_str());
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena_radius.is_finite() && self.arena_radius > 0.0) {
            return Err(ConfigError::ArenaRadius(self.arena_radius));
        }
        if !(self.ball_radius.is_finite() && self.ball_radius > 0.0) {
            return Err(ConfigError::BallRadius(self.ball_radius));
        }
        if self.ball_radius >= self.arena_radius {
            return Err(ConfigError::BallTooLarge {
                ball: self.ball_radius,
                arena: self.arena_radius,
            });
        }
        if !(self.restitution > 0.0 && self.restitution <= 1.0) {
            return Err(ConfigError::Restitution(self.restitution));
        }
        if self.ball_count == 0 {
            return Err(ConfigError::NoBalls);
        }
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(ConfigError::TickRate(self.tick_rate));
        }
        for (name, value) in [
            ("arena_center.x", self.arena_center.0),
            ("arena_center.y", self.arena_center.1),
            ("ball_start_speed", self.ball_start_speed),
            ("spawn_jitter", self.spawn_jitter),
            ("gravity_magnitude", self.gravity_magnitude),
            ("tilt_step", self.tilt_step),
        ] {
            let signed_ok = name.starts_with("arena_center") || value >= 0.0;
            if !value.is_finite() || !signed_ok {
                return Err(ConfigError::NotFinite { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let single = SimConfig::for_variant(Variant::Single);
        assert_eq!(single.ball_count, 1);
        assert_eq!(single.tick_rate, 155.0);
        assert_eq!(single.spawn_jitter, 0.0);

        let multi = SimConfig::for_variant(Variant::Multi);
        assert_eq!(multi.ball_count, MULTI_BALL_COUNT);
        assert_eq!(multi.tick_rate, 60.0);

        // Only ball count, jitter and rate differ between variants
        assert_eq!(single.restitution, multi.restitution);
        assert_eq!(single.gravity_magnitude, multi.gravity_magnitude);
        assert_eq!(single.arena_radius, multi.arena_radius);
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!(Variant::parse("single"), Some(Variant::Single));
        assert_eq!(Variant::parse(" Multi "), Some(Variant::Multi));
        assert_eq!(Variant::parse("1"), Some(Variant::Single));
        assert_eq!(Variant::parse("lots"), None);

        assert_eq!(SimConfig::from_variant_name(Some("single")).variant, Variant::Single);
        assert_eq!(SimConfig::from_variant_name(Some("bogus")).variant, Variant::Multi);
        assert_eq!(SimConfig::from_variant_name(None).variant, Variant::Multi);
    }

    #[test]
    fn test_validate() {
        assert!(SimConfig::default().validate().is_ok());
        assert!(SimConfig::for_variant(Variant::Single).validate().is_ok());

        let mut config = SimConfig::default();
        config.restitution = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::Restitution(0.0)));
        config.restitution = 1.0;
        assert!(config.validate().is_ok());

        let mut config = SimConfig::default();
        config.arena_radius = -5.0;
        assert_eq!(config.validate(), Err(ConfigError::ArenaRadius(-5.0)));

        let mut config = SimConfig::default();
        config.ball_radius = config.arena_radius;
        assert!(matches!(config.validate(), Err(ConfigError::BallTooLarge { .. })));

        let mut config = SimConfig::default();
        config.ball_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoBalls));

        let mut config = SimConfig::default();
        config.tilt_step = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { name: "tilt_step", .. })
        ));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = SimConfig::for_variant(Variant::Single);
        let json = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
