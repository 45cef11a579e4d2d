//! Engine configuration.
//!
//! Provides match, data, logging and simulation settings for the headless
//! host. Configuration can be loaded from and saved to a TOML file; missing
//! keys fall back to their defaults.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use barrage_gameplay::{DamageTables, ExperienceRules, ProjectileConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "barrage.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Match Settings ===
    /// Seed of the synchronized random source
    pub seed: u64,
    /// Logical ticks to simulate
    pub ticks: u32,
    /// Ticks between volleys of each battery
    pub volley_interval: u32,
    /// Distance between the two battle lines
    pub front_distance: i32,

    // === Data Settings ===
    /// Directory scanned for weapon TOML files
    pub weapon_dir: PathBuf,

    // === Logging Settings ===
    /// `tracing` filter directive
    pub log_filter: String,
    /// Emit JSON log lines instead of plain text
    pub log_json: bool,

    // === Simulation Settings ===
    /// Experience gain and scaling
    pub experience: ExperienceRules,
    /// Projectile tunables
    pub projectile: ProjectileConfig,
    /// Damage modifier tables
    pub damage: DamageTables,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Match
            seed: 0x5eed,
            ticks: 300,
            volley_interval: 10,
            front_distance: 1024,

            // Data
            weapon_dir: PathBuf::from(crate::weapon_loader::DEFAULT_WEAPON_PATH),

            // Logging
            log_filter: "barrage=info".to_string(),
            log_json: false,

            // Simulation
            experience: ExperienceRules::default(),
            projectile: ProjectileConfig::default(),
            damage: DamageTables::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `barrage.toml` in the working directory.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let mut contents = String::new();
        if let Err(e) = fs::File::open(path).and_then(|mut file| file.read_to_string(&mut contents)) {
            warn!("Failed to read config file: {e}");
            return Self::default();
        }

        match toml::from_str::<Self>(&contents) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values to ranges the simulation can work with.
    pub fn validate(&mut self) {
        // Match
        self.ticks = self.ticks.clamp(1, 1_000_000);
        self.volley_interval = self.volley_interval.max(1);
        self.front_distance = self.front_distance.clamp(128, 16_384);

        // Logging
        if self.log_filter.trim().is_empty() {
            self.log_filter = "barrage=info".to_string();
        }

        // Simulation
        let p = &mut self.projectile;
        p.gravity = p.gravity.max(1);
        p.range_extension_percent = p.range_extension_percent.max(100);
        p.neighbour_radius = p.neighbour_radius.max(0);
        p.homing_clearance_divisor = p.homing_clearance_divisor.max(1);
        p.homing_max_clearance = p.homing_max_clearance.max(0);
        p.speed_jitter_percent = p.speed_jitter_percent.min(50);
        p.terrain_sample_step = p.terrain_sample_step.max(1);
        p.projectile_radius = p.projectile_radius.max(1);
        p.event_capacity = p.event_capacity.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_common::PlayerId;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.ticks, 300);
        assert_eq!(config.log_filter, "barrage=info");
        assert_eq!(config.projectile.range_extension_percent, 150);
        assert_eq!(config.experience.gain(PlayerId::from_raw(3)), 100);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.ticks = 0;
        config.volley_interval = 0;
        config.log_filter = "  ".to_string();
        config.projectile.range_extension_percent = 20;
        config.projectile.terrain_sample_step = 0;

        config.validate();

        assert_eq!(config.ticks, 1);
        assert_eq!(config.volley_interval, 1);
        assert_eq!(config.log_filter, "barrage=info");
        assert_eq!(config.projectile.range_extension_percent, 100);
        assert_eq!(config.projectile.terrain_sample_step, 1);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("barrage.toml");

        let mut config = EngineConfig::default();
        config.seed = 12345;
        config.experience.multiplayer = true;
        config.experience.gain_percent[2] = 150;
        config.projectile.gravity = 800;
        config.damage.propulsion[0][0] = 90;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("barrage.toml");
        fs::write(&config_path, "ticks = 50\n\n[projectile]\nspeed_jitter_percent = 0\n")
            .expect("Failed to write config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded.ticks, 50);
        assert_eq!(loaded.projectile.speed_jitter_percent, 0);
        assert_eq!(loaded.projectile.neighbour_radius, 512);
        assert_eq!(loaded.seed, EngineConfig::default().seed);
    }

    #[test]
    fn test_config_load_missing_or_broken_file() {
        let config = EngineConfig::load_from("/nonexistent/path/barrage.toml");
        assert_eq!(config, EngineConfig::default());

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("barrage.toml");
        fs::write(&config_path, "ticks = \"many\"").expect("Failed to write config");
        assert_eq!(EngineConfig::load_from(&config_path), EngineConfig::default());
    }
}
