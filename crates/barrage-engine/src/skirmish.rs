//! Headless two-sided skirmish.
//!
//! Two battle lines face each other across rolling ground. Each side gets
//! one gunner per registered weapon plus a VTOL, and every gunner fires at
//! the nearest enemy its weapon can engage on a fixed volley schedule. The
//! outer loop here owns the clock; the projectile world only ever sees one
//! `advance_all` per tick.

use std::sync::Arc;

use barrage_common::{BarrageError, BarrageResult, GameTime, ObjectHandle, PlayerId, Vec3i, TILE_UNITS};
use barrage_gameplay::{
    AimPoint, AllianceTable, Battlefield, BodySize, CombatEvent, Combatant, Droid, LaunchOrder, PlayerStats,
    ProjectileWorld, Propulsion, WeaponStats,
};
use barrage_kernel::{HeightMap, Terrain};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::weapon_loader::WeaponRegistry;

/// Number of sides.
const SIDES: u8 = 2;

/// Distance from the map edge to the first battle line.
const MARGIN: i32 = 2 * TILE_UNITS;

/// Body points of every unit.
const UNIT_BODY: u32 = 600;

/// Cruise height of the VTOLs above ground.
const VTOL_ALTITUDE: i32 = 256;

/// Chassis cycled along each battle line.
const CHASSIS: [(Propulsion, BodySize); 3] = [
    (Propulsion::Wheeled, BodySize::Light),
    (Propulsion::HalfTracked, BodySize::Medium),
    (Propulsion::Tracked, BodySize::Heavy),
];

/// A gunner and the weapon it fires.
#[derive(Debug, Clone)]
struct Battery {
    gunner: ObjectHandle,
    player: PlayerId,
    weapon: Arc<WeaponStats>,
    row: u32,
}

/// Combat events seen during the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    /// Projectiles launched
    pub launched: u64,
    /// Detonations
    pub impacts: u64,
    /// Projectiles shot down
    pub intercepted: u64,
    /// Damage events, hits and burns
    pub damaged: u64,
    /// Objects destroyed
    pub destroyed: u64,
}

impl EventCounts {
    fn record(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::ProjectileLaunched { .. } => self.launched += 1,
            CombatEvent::ProjectileImpact { .. } => self.impacts += 1,
            CombatEvent::ProjectileIntercepted { .. } => self.intercepted += 1,
            CombatEvent::ObjectDamaged { .. } => self.damaged += 1,
            CombatEvent::ObjectDestroyed { .. } => self.destroyed += 1,
        }
    }
}

/// One side at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideReport {
    /// Player slot
    pub player: u8,
    /// Units still alive
    pub survivors: usize,
    /// Statistics for the player
    pub stats: PlayerStats,
}

/// Outcome of a skirmish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkirmishReport {
    /// Match seed
    pub seed: u64,
    /// Ticks actually simulated
    pub ticks: u32,
    /// Game time at the end
    pub game_time_ms: u32,
    /// Event totals
    pub events: EventCounts,
    /// Per-side results
    pub sides: Vec<SideReport>,
}

/// A scripted two-sided battle.
pub struct Skirmish {
    battlefield: Battlefield,
    world: ProjectileWorld,
    batteries: Vec<Battery>,
    seed: u64,
    ticks: u32,
    volley_interval: u32,
    tick: u32,
    events: EventCounts,
}

impl Skirmish {
    /// Builds the battlefield and both battle lines.
    pub fn new(config: &EngineConfig, registry: &WeaponRegistry) -> BarrageResult<Self> {
        let weapons = registry.sorted();
        if weapons.is_empty() {
            return Err(BarrageError::WeaponData("no weapons registered".to_string()));
        }

        let rows = weapons.len() as u32 + 1;
        let columns = ((2 * MARGIN + config.front_distance) / TILE_UNITS) as u32 + 2;
        let terrain = HeightMap::from_fn(columns, rows + 3, |x, y| ((x * 7 + y * 3) % 5) as i32 * 4);

        let mut battlefield = Battlefield::new(terrain, config.seed)
            .with_alliances(AllianceTable::from_teams(&[0, 1]))
            .with_tables(config.damage.clone())
            .with_rules(config.experience.clone())
            .with_config(&config.projectile);

        let mut batteries = Vec::with_capacity(weapons.len() * usize::from(SIDES));
        for side in 0..SIDES {
            let player = PlayerId::from_raw(side);
            let x = MARGIN + i32::from(side) * config.front_distance;
            for (row, weapon) in weapons.iter().enumerate() {
                let row = row as u32;
                let pos = ground_point(battlefield.terrain.as_ref(), x, row);
                let (propulsion, body) = CHASSIS[row as usize % CHASSIS.len()];
                let gunner = battlefield
                    .objects
                    .insert(Droid::new(player, pos, UNIT_BODY).with_chassis(propulsion, body));
                batteries.push(Battery {
                    gunner,
                    player,
                    weapon: Arc::clone(weapon),
                    row,
                });
            }

            let pos = ground_point(battlefield.terrain.as_ref(), x, rows - 1);
            battlefield.objects.insert(
                Droid::new(player, pos.with_z(pos.z + VTOL_ALTITUDE), UNIT_BODY)
                    .with_chassis(Propulsion::Lift, BodySize::Light),
            );
        }

        let mut world = ProjectileWorld::new(config.projectile.clone());
        world.init();

        info!(
            seed = config.seed,
            weapons = weapons.len(),
            units = battlefield.objects.iter().count(),
            "skirmish ready"
        );

        Ok(Self {
            battlefield,
            world,
            batteries,
            seed: config.seed,
            ticks: config.ticks,
            volley_interval: config.volley_interval.max(1),
            tick: 0,
            events: EventCounts::default(),
        })
    }

    /// The battlefield.
    #[must_use]
    pub fn battlefield(&self) -> &Battlefield {
        &self.battlefield
    }

    /// The live projectiles.
    #[must_use]
    pub fn world(&self) -> &ProjectileWorld {
        &self.world
    }

    /// Ticks simulated so far.
    #[must_use]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Units of `player` still alive.
    #[must_use]
    pub fn survivors(&self, player: PlayerId) -> usize {
        self.battlefield
            .objects
            .iter()
            .filter(|(_, o)| o.player() == player && !o.is_dead())
            .count()
    }

    /// Whether a side has been wiped out and nothing is left in the air.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        let wiped = (0..SIDES).any(|s| self.survivors(PlayerId::from_raw(s)) == 0);
        wiped && self.world.iter().all(|p| p.is_inactive())
    }

    /// Fires due volleys and advances the simulation by one tick.
    pub fn step(&mut self) -> GameTime {
        self.fire_volleys();
        let now = self.world.advance_all(&mut self.battlefield);
        for event in self.battlefield.events.drain() {
            self.events.record(&event);
        }
        self.tick += 1;
        now
    }

    /// Runs the configured number of ticks, or until one side is gone.
    pub fn run(&mut self) -> SkirmishReport {
        while self.tick < self.ticks {
            self.step();
            if self.is_decided() {
                info!(tick = self.tick, "skirmish decided");
                break;
            }
        }
        self.world.shutdown(&mut self.battlefield);
        for event in self.battlefield.events.drain() {
            self.events.record(&event);
        }

        let report = self.report();
        info!(
            ticks = report.ticks,
            launched = report.events.launched,
            destroyed = report.events.destroyed,
            "skirmish finished"
        );
        report
    }

    /// Summary of the battle so far.
    #[must_use]
    pub fn report(&self) -> SkirmishReport {
        let sides = (0..SIDES)
            .map(|s| {
                let player = PlayerId::from_raw(s);
                SideReport {
                    player: s,
                    survivors: self.survivors(player),
                    stats: self.battlefield.stats.player(player).copied().unwrap_or_default(),
                }
            })
            .collect();
        SkirmishReport {
            seed: self.seed,
            ticks: self.tick,
            game_time_ms: self.battlefield.now().millis(),
            events: self.events,
            sides,
        }
    }

    fn fire_volleys(&mut self) {
        let now = self.battlefield.now();
        for battery in &self.batteries {
            if (self.tick + battery.row) % self.volley_interval != 0 {
                continue;
            }
            let Some(gunner) = self.battlefield.objects.get_alive(battery.gunner) else {
                continue;
            };
            if gunner.as_droid().is_some_and(|d| d.is_disabled(now)) {
                continue;
            }
            let origin = gunner.aim_point();
            let Some(target) = pick_target(&self.battlefield, battery, origin) else {
                continue;
            };

            let order = LaunchOrder::new(Arc::clone(&battery.weapon), battery.player, origin, AimPoint::Object(target))
                .with_attacker(battery.gunner)
                .with_fire_time(now);
            if !self.world.launch(&mut self.battlefield, order) {
                debug!(weapon = %battery.weapon.id, "volley rejected");
            }
        }
    }
}

/// Nearest living enemy the battery's weapon can engage, first in arena
/// order on ties.
fn pick_target(bf: &Battlefield, battery: &Battery, origin: Vec3i) -> Option<ObjectHandle> {
    let weapon = &battery.weapon;
    bf.objects
        .iter()
        .filter(|(_, o)| !o.is_dead() && !bf.alliances.allied(battery.player, o.player()))
        .filter(|(_, o)| weapon.surface_to_air.can_hit(o.is_airborne()))
        .min_by_key(|(_, o)| (o.position() - origin).xy().length())
        .map(|(handle, _)| handle)
}

fn ground_point(terrain: &dyn Terrain, x: i32, row: u32) -> Vec3i {
    let y = (row as i32 + 1) * TILE_UNITS;
    Vec3i::new(x, y, terrain.height_at(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapon_loader::WeaponLoader;

    fn builtin() -> WeaponRegistry {
        let mut loader = WeaponLoader::with_default_path();
        loader.load_builtin().expect("built-in weapons load");
        loader.into_registry()
    }

    fn config(ticks: u32) -> EngineConfig {
        EngineConfig {
            ticks,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_empty_registry_is_an_error() {
        let result = Skirmish::new(&config(10), &WeaponRegistry::new());
        assert!(matches!(result, Err(BarrageError::WeaponData(_))));
    }

    #[test]
    fn test_lines_are_built() {
        let registry = builtin();
        let skirmish = Skirmish::new(&config(10), &registry).expect("skirmish");
        let per_side = registry.len() + 1;
        assert_eq!(skirmish.survivors(PlayerId::from_raw(0)), per_side);
        assert_eq!(skirmish.survivors(PlayerId::from_raw(1)), per_side);
        assert!(skirmish.world().is_empty());
    }

    #[test]
    fn test_volleys_launch_and_land() {
        let registry = builtin();
        let mut skirmish = Skirmish::new(&config(60), &registry).expect("skirmish");
        let report = skirmish.run();

        assert!(report.ticks > 0 && report.ticks <= 60);
        assert_eq!(report.game_time_ms, report.ticks * 100);
        assert!(report.events.launched > 0);
        assert!(report.events.impacts > 0);
        assert!(report.events.damaged > 0);
        // Penetrating shots relaunch without counting as a new shot.
        let shots: u64 = report.sides.iter().map(|s| s.stats.shots_fired).sum();
        assert!(shots > 0 && shots <= report.events.launched);
        assert!(skirmish.world().is_empty());
    }

    #[test]
    fn test_same_seed_same_battle() {
        let registry = builtin();
        let first = Skirmish::new(&config(40), &registry).expect("skirmish").run();
        let second = Skirmish::new(&config(40), &registry).expect("skirmish").run();
        assert_eq!(first, second);
    }
}
