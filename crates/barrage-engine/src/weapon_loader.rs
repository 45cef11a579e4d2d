//! Weapon data loading and management.
//!
//! This module provides:
//! - Loading weapons from assets/weapons/*.toml
//! - Weapon validation on load
//! - Weapon registry with lookup by ID and name
//!
//! Registered weapons are handed out as `Arc<WeaponStats>` so every
//! projectile shares the same read-only copy.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use barrage_gameplay::{MovementModel, WeaponStats};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default asset path for weapons.
pub const DEFAULT_WEAPON_PATH: &str = "assets/weapons";

/// Weapons built into the binary, used when the asset directory is empty.
pub const BUILTIN_WEAPONS: &str = include_str!("../assets/weapons/default.toml");

/// Errors that can occur during weapon loading.
#[derive(Debug, Error)]
pub enum WeaponLoadError {
    /// File not found.
    #[error("Weapon file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read weapon file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse weapon TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error.
    #[error("Weapon validation error: {0}")]
    ValidationError(String),

    /// Duplicate weapon ID.
    #[error("Duplicate weapon ID: {0}")]
    DuplicateId(String),
}

/// Result type for weapon loading operations.
pub type WeaponLoadResult<T> = Result<T, WeaponLoadError>;

/// Checks a weapon for values the simulation cannot handle.
pub fn validate_weapon(weapon: &WeaponStats) -> WeaponLoadResult<()> {
    let fail = |what: String| Err(WeaponLoadError::ValidationError(format!("Weapon {}: {what}", weapon.id)));

    if weapon.id.is_empty() {
        return Err(WeaponLoadError::ValidationError(format!(
            "Weapon '{}' has empty id",
            weapon.name
        )));
    }
    if weapon.name.is_empty() {
        return fail("empty name".to_string());
    }
    if weapon.flight_speed <= 0 {
        return fail(format!("invalid flight_speed: {}", weapon.flight_speed));
    }
    if weapon.long_range <= 0 {
        return fail(format!("invalid long_range: {}", weapon.long_range));
    }
    if weapon.min_damage_percent > 100 {
        return fail(format!(
            "invalid min_damage_percent: {} (must be 0-100)",
            weapon.min_damage_percent
        ));
    }
    if weapon.radius < 0 || weapon.periodic_damage_radius < 0 {
        return fail("negative radius".to_string());
    }
    if !weapon.surface_to_air.is_valid() {
        return fail(format!("invalid surface_to_air: {:?}", weapon.surface_to_air));
    }
    if weapon.periodic_damage > 0 && weapon.periodic_damage_time == 0 {
        return fail("periodic damage without periodic_damage_time".to_string());
    }

    if weapon.penetrate && weapon.movement.is_indirect() {
        warn!("Weapon {} penetrates but fires indirectly", weapon.id);
    }
    if weapon.radius_damage > 0 && weapon.radius == 0 {
        warn!("Weapon {} has splash damage but no radius", weapon.id);
    }

    Ok(())
}

/// A collection of weapons from a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Weapons in this file.
    #[serde(default)]
    pub weapons: Vec<WeaponStats>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Weapon registry with fast lookup.
#[derive(Debug, Default)]
pub struct WeaponRegistry {
    /// Weapons by ID.
    by_id: HashMap<String, Arc<WeaponStats>>,
    /// Weapon IDs by name (lowercase).
    by_name: HashMap<String, String>,
}

impl WeaponRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered weapons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Registers a weapon.
    pub fn register(&mut self, weapon: WeaponStats) -> WeaponLoadResult<Arc<WeaponStats>> {
        if self.contains(&weapon.id) {
            return Err(WeaponLoadError::DuplicateId(weapon.id));
        }

        let weapon = Arc::new(weapon);
        self.by_name.insert(weapon.name.to_lowercase(), weapon.id.clone());
        self.by_id.insert(weapon.id.clone(), Arc::clone(&weapon));
        Ok(weapon)
    }

    /// Whether a weapon with this ID is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Gets a weapon by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<WeaponStats>> {
        self.by_id.get(id).cloned()
    }

    /// Gets a weapon by name (case-insensitive).
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<WeaponStats>> {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|id| self.by_id.get(id))
            .cloned()
    }

    /// Every weapon, sorted by ID.
    ///
    /// Map order differs between runs, so anything that feeds the
    /// simulation must go through this instead of the raw map.
    #[must_use]
    pub fn sorted(&self) -> Vec<Arc<WeaponStats>> {
        let mut weapons: Vec<_> = self.by_id.values().cloned().collect();
        weapons.sort_by(|a, b| a.id.cmp(&b.id));
        weapons
    }

    /// Weapons using a movement model, sorted by ID.
    #[must_use]
    pub fn with_movement(&self, movement: MovementModel) -> Vec<Arc<WeaponStats>> {
        self.sorted().into_iter().filter(|w| w.movement == movement).collect()
    }

    /// Clears the registry.
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_name.clear();
    }
}

/// Loads weapon files into a registry.
#[derive(Debug)]
pub struct WeaponLoader {
    /// Base path for weapon files.
    base_path: PathBuf,
    /// Weapon registry.
    registry: WeaponRegistry,
}

impl WeaponLoader {
    /// Creates a new weapon loader.
    #[must_use]
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            registry: WeaponRegistry::new(),
        }
    }

    /// Creates a weapon loader with default path.
    #[must_use]
    pub fn with_default_path() -> Self {
        Self::new(DEFAULT_WEAPON_PATH)
    }

    /// Returns a reference to the weapon registry.
    #[must_use]
    pub fn registry(&self) -> &WeaponRegistry {
        &self.registry
    }

    /// Consumes the loader, keeping the registry.
    #[must_use]
    pub fn into_registry(self) -> WeaponRegistry {
        self.registry
    }

    /// Loads all weapons from the base path.
    ///
    /// Files are read in name order. A file that fails to load is skipped
    /// with a warning and the rest are still loaded.
    pub fn load_all(&mut self) -> WeaponLoadResult<usize> {
        let path = &self.base_path;
        if !path.exists() {
            return Err(WeaponLoadError::NotFound(path.clone()));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().is_some_and(|ext| ext == "toml") {
                files.push(file_path);
            }
        }
        files.sort();

        let mut count = 0;
        for file_path in files {
            match self.load_file(&file_path) {
                Ok(n) => {
                    count += n;
                    debug!("Loaded {} weapons from {:?}", n, file_path);
                },
                Err(e) => {
                    warn!("Failed to load weapon file {:?}: {}", file_path, e);
                },
            }
        }

        info!("Loaded {} weapons total", count);
        Ok(count)
    }

    /// Loads weapons from a single file.
    pub fn load_file(&mut self, path: &Path) -> WeaponLoadResult<usize> {
        if !path.exists() {
            return Err(WeaponLoadError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        self.load_str(&content)
    }

    /// Loads weapons from TOML text.
    ///
    /// Every weapon in the text is validated and checked for a clashing ID
    /// before any is registered, so a bad entry leaves the registry
    /// untouched.
    pub fn load_str(&mut self, content: &str) -> WeaponLoadResult<usize> {
        let weapon_file: WeaponFile = toml::from_str(content)?;
        let mut ids = HashSet::with_capacity(weapon_file.weapons.len());
        for weapon in &weapon_file.weapons {
            validate_weapon(weapon)?;
            if !ids.insert(weapon.id.as_str()) || self.registry.contains(&weapon.id) {
                return Err(WeaponLoadError::DuplicateId(weapon.id.clone()));
            }
        }

        let mut count = 0;
        for weapon in weapon_file.weapons {
            self.registry.register(weapon)?;
            count += 1;
        }
        Ok(count)
    }

    /// Loads the weapons compiled into the binary.
    pub fn load_builtin(&mut self) -> WeaponLoadResult<usize> {
        let count = self.load_str(BUILTIN_WEAPONS)?;
        info!("Loaded {} built-in weapons", count);
        Ok(count)
    }

    /// Clears and reloads all weapons.
    pub fn reload(&mut self) -> WeaponLoadResult<usize> {
        self.registry.clear();
        self.load_all()
    }
}
