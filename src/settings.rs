//! Game settings and rulesets
//!
//! Persisted as a JSON file next to the high score table.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence;
use crate::sim::{CleanupPolicy, DistanceMetric, ExpiryTiming};
use crate::{Error, Result};

/// Behavior presets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Ruleset {
    /// Plays like the classic game, quirks included: the x-only distance,
    /// one dead entity swept per kind per tick, late projectile expiry, no
    /// spawn clearance, and wrecks that still collide (a destroyed craft
    /// keeps steering, firing and ramming)
    Classic,
    #[default]
    Corrected,
}

impl Ruleset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ruleset::Classic => "classic",
            Ruleset::Corrected => "corrected",
        }
    }

    pub fn distance(&self) -> DistanceMetric {
        match self {
            Ruleset::Classic => DistanceMetric::LegacyAxis,
            Ruleset::Corrected => DistanceMetric::Euclidean,
        }
    }

    pub fn cleanup(&self) -> CleanupPolicy {
        match self {
            Ruleset::Classic => CleanupPolicy::FirstPerKind,
            Ruleset::Corrected => CleanupPolicy::All,
        }
    }

    pub fn expiry(&self) -> ExpiryTiming {
        match self {
            Ruleset::Classic => ExpiryTiming::Lagged,
            Ruleset::Corrected => ExpiryTiming::Immediate,
        }
    }

    /// Whether obstacles may not spawn already touching the player
    pub fn spawn_clearance(&self) -> bool {
        match self {
            Ruleset::Classic => false,
            Ruleset::Corrected => true,
        }
    }

    /// Whether dead entities still collide and a dead craft still acts
    pub fn wrecks_interact(&self) -> bool {
        match self {
            Ruleset::Classic => true,
            Ruleset::Corrected => false,
        }
    }
}

impl FromStr for Ruleset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "legacy" => Ok(Ruleset::Classic),
            "corrected" | "fixed" => Ok(Ruleset::Corrected),
            _ => Err(Error::UnknownRuleset(s.to_string())),
        }
    }
}

/// Numeric game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub launch_scale: f32,

    pub player_radius: i32,
    pub player_thrust: f32,
    /// Degrees per tick while a rotate control is held
    pub player_turn_rate: f32,
    pub player_start_heading: f32,

    pub obstacle_radius: i32,
    pub obstacle_speed: f32,
    /// Score for each large obstacle shot down
    pub obstacle_points: u64,
    pub medium_obstacle_radius: i32,
    pub medium_obstacle_points: u64,
    pub small_obstacle_radius: i32,
    pub small_obstacle_points: u64,
    pub split_kick: f32,
    /// Max deviation of each fragment from the impact heading (degrees)
    pub split_spread: f32,

    pub projectile_radius: i32,
    pub projectile_bonus_speed: f32,
    pub projectile_lifetime: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            launch_scale: LAUNCH_SCALE,
            player_radius: PLAYER_RADIUS,
            player_thrust: PLAYER_THRUST,
            player_turn_rate: PLAYER_TURN_RATE,
            player_start_heading: PLAYER_START_HEADING,
            obstacle_radius: OBSTACLE_RADIUS,
            obstacle_speed: OBSTACLE_SPEED,
            obstacle_points: OBSTACLE_POINTS,
            medium_obstacle_radius: MEDIUM_OBSTACLE_RADIUS,
            medium_obstacle_points: MEDIUM_OBSTACLE_POINTS,
            small_obstacle_radius: SMALL_OBSTACLE_RADIUS,
            small_obstacle_points: SMALL_OBSTACLE_POINTS,
            split_kick: SPLIT_KICK,
            split_spread: SPLIT_SPREAD,
            projectile_radius: PROJECTILE_RADIUS,
            projectile_bonus_speed: PROJECTILE_BONUS_SPEED,
            projectile_lifetime: PROJECTILE_LIFETIME,
        }
    }
}

/// Fields a ruleset preset controls
const PRESET_SWITCHES: [&str; 5] = [
    "distance",
    "cleanup",
    "expiry",
    "spawn_clearance",
    "wrecks_interact",
];

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preset the behavior switches below were derived from
    pub ruleset: Ruleset,

    // === Behavior switches ===
    pub distance: DistanceMetric,
    pub cleanup: CleanupPolicy,
    pub expiry: ExpiryTiming,
    pub spawn_clearance: bool,
    pub wrecks_interact: bool,

    // === World ===
    /// Ticks per second, 1 to `MAX_TARGET_FPS`
    pub target_fps: u32,
    pub obstacle_count: usize,
    /// Ticks between shots while fire is held (0 = every tick)
    pub fire_cooldown_ticks: u32,
    /// Include background stars in frames
    pub starfield: bool,
    /// Destroyed obstacles break into two of the next size down
    pub split_obstacles: bool,

    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Ruleset::default())
    }
}

impl Settings {
    /// Create settings from a ruleset preset
    pub fn from_preset(preset: Ruleset) -> Self {
        let mut settings = Self {
            ruleset: preset,
            distance: DistanceMetric::default(),
            cleanup: CleanupPolicy::default(),
            expiry: ExpiryTiming::default(),
            spawn_clearance: false,
            wrecks_interact: false,
            target_fps: TARGET_FPS,
            obstacle_count: OBSTACLE_COUNT,
            fire_cooldown_ticks: 0,
            starfield: false,
            split_obstacles: false,
            tuning: Tuning::default(),
        };
        settings.apply_preset(preset);
        settings
    }

    /// Apply a ruleset preset (overwrites the behavior switches)
    pub fn apply_preset(&mut self, preset: Ruleset) {
        self.ruleset = preset;
        self.distance = preset.distance();
        self.cleanup = preset.cleanup();
        self.expiry = preset.expiry();
        self.spawn_clearance = preset.spawn_clearance();
        self.wrecks_interact = preset.wrecks_interact();
    }

    /// Loop rate actually used, `target_fps` pulled into the supported range
    pub fn fps(&self) -> u32 {
        self.target_fps.clamp(1, MAX_TARGET_FPS)
    }

    /// Fixed interval between world ticks, never shorter than 1ms
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps()))
    }

    /// Milliseconds advanced by each tick
    pub fn tick_dt(&self) -> f32 {
        self.tick_interval().as_millis() as f32
    }

    /// Reject values the world loop can't run with
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TARGET_FPS).contains(&self.target_fps) {
            return Err(Error::InvalidSettings(format!(
                "target_fps must be between 1 and {MAX_TARGET_FPS}, got {}",
                self.target_fps
            )));
        }

        let t = &self.tuning;
        for (name, radius) in [
            ("player_radius", t.player_radius),
            ("obstacle_radius", t.obstacle_radius),
            ("medium_obstacle_radius", t.medium_obstacle_radius),
            ("small_obstacle_radius", t.small_obstacle_radius),
            ("projectile_radius", t.projectile_radius),
        ] {
            if radius <= 0 {
                return Err(Error::InvalidSettings(format!(
                    "{name} must be positive, got {radius}"
                )));
            }
        }

        if !t.projectile_lifetime.is_finite() || t.projectile_lifetime < 0.0 {
            return Err(Error::InvalidSettings(format!(
                "projectile_lifetime must be a non-negative number, got {}",
                t.projectile_lifetime
            )));
        }
        Ok(())
    }

    /// Build settings from parsed JSON.
    ///
    /// A document that names a `ruleset` but none of the behavior switches
    /// gets that preset's switches; explicit switches always win.
    pub fn from_json(raw: serde_json::Value) -> serde_json::Result<Self> {
        if raw.is_null() {
            return Ok(Self::default());
        }
        let preset_only = raw.get("ruleset").is_some()
            && !PRESET_SWITCHES.iter().any(|key| raw.get(key).is_some());

        let mut settings: Self = serde_json::from_value(raw)?;
        if preset_only {
            settings.apply_preset(settings.ruleset);
        }
        Ok(settings)
    }

    /// Load settings from a JSON file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self> {
        let raw: serde_json::Value = persistence::load_json_or_default(path)?;
        let settings = Self::from_json(raw).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!(
            "Loaded settings from {} (ruleset {}: {:?} distance, {:?} cleanup, {:?} expiry, clearance {}, wrecks {})",
            path.display(),
            settings.ruleset.as_str(),
            settings.distance,
            settings.cleanup,
            settings.expiry,
            settings.spawn_clearance,
            settings.wrecks_interact
        );
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save_json(path, self)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_corrected() {
        let settings = Settings::default();
        assert_eq!(settings.ruleset, Ruleset::Corrected);
        assert_eq!(settings.distance, DistanceMetric::Euclidean);
        assert_eq!(settings.cleanup, CleanupPolicy::All);
        assert_eq!(settings.expiry, ExpiryTiming::Immediate);
        assert!(settings.spawn_clearance);
        assert_eq!(settings.obstacle_count, 5);
    }

    #[test]
    fn test_classic_preset() {
        let settings = Settings::from_preset(Ruleset::Classic);
        assert_eq!(settings.distance, DistanceMetric::LegacyAxis);
        assert_eq!(settings.cleanup, CleanupPolicy::FirstPerKind);
        assert_eq!(settings.expiry, ExpiryTiming::Lagged);
        assert!(!settings.spawn_clearance);
        assert!(settings.wrecks_interact);
    }

    #[test]
    fn test_ruleset_parse() {
        assert_eq!("Classic".parse::<Ruleset>().unwrap(), Ruleset::Classic);
        assert_eq!("fixed".parse::<Ruleset>().unwrap(), Ruleset::Corrected);
        assert!(matches!(
            "arcade".parse::<Ruleset>(),
            Err(Error::UnknownRuleset(name)) if name == "arcade"
        ));
    }

    #[test]
    fn test_tick_interval() {
        let settings = Settings::default();
        assert_eq!(settings.tick_interval(), Duration::from_millis(16));
        assert_eq!(settings.tick_dt(), 16.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "obstacle_count": 9, "tuning": { "player_thrust": 4.0 } }"#)
                .unwrap();
        assert_eq!(settings.obstacle_count, 9);
        assert_eq!(settings.tuning.player_thrust, 4.0);
        assert_eq!(settings.tuning.player_radius, PLAYER_RADIUS);
        assert_eq!(settings.target_fps, TARGET_FPS);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::from_preset(Ruleset::Classic);
        settings.starfield = true;
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_fps_out_of_range_rejected() {
        for fps in [0, 2000] {
            let mut settings = Settings::default();
            settings.target_fps = fps;
            assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
            // Still usable if it slips through: the loop never gets a zero period
            assert!(settings.tick_interval() >= Duration::from_millis(1));
            assert!(settings.tick_dt() >= 1.0);
        }
        assert_eq!(Settings::default().validate().ok(), Some(()));
    }

    #[test]
    fn test_load_rejects_bad_fps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "target_fps": 2000 }"#).unwrap();
        assert!(matches!(Settings::load(&path), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn test_nonpositive_radius_rejected() {
        let mut settings = Settings::default();
        settings.tuning.small_obstacle_radius = 0;
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(msg)) if msg.contains("small_obstacle_radius")));
    }

    #[test]
    fn test_ruleset_only_file_applies_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "ruleset": "classic", "obstacle_count": 3 }"#).unwrap();

        let loaded = Settings::load(&path).unwrap();
        let mut expected = Settings::from_preset(Ruleset::Classic);
        expected.obstacle_count = 3;
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_explicit_switch_overrides_preset() {
        let raw = serde_json::json!({ "ruleset": "classic", "distance": "euclidean" });
        let settings = Settings::from_json(raw).unwrap();
        assert_eq!(settings.ruleset, Ruleset::Classic);
        assert_eq!(settings.distance, DistanceMetric::Euclidean);
        // Unnamed switches keep their field defaults
        assert_eq!(settings.cleanup, CleanupPolicy::All);
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }
}
