//! Registries of worlds, towns, nations, residents and claimed zones.
//!
//! All maps are `im` persistent maps, so cloning a [`Universe`] is O(1) and
//! shares structure with the copy it came from. [`UniverseHandle`] builds on that to
//! hand out immutable snapshots to readers while writers publish new versions.

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

pub type WorldName = String;
pub type TownName = String;
pub type NationName = String;
pub type PlayerName = String;

/// A point in a named world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: WorldName,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: &str, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.to_string(),
            x,
            y,
            z,
        }
    }

    /// Column of claimable land containing this point.
    ///
    /// Uses floor division so negative coordinates map to the chunk on their
    /// negative side (x = -0.5 lies in chunk -1 for a zone size of 16).
    pub fn chunk(&self, zone_size: u32) -> ChunkCoord {
        let size = f64::from(zone_size.max(1));
        ChunkCoord {
            x: (self.x / size).floor() as i32,
            z: (self.z / size).floor() as i32,
        }
    }
}

/// Horizontal grid coordinate of a claimable zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Per-world combat defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSettings {
    pub name: WorldName,
    /// Worlds with claims disabled are never arbitrated.
    pub claims_enabled: bool,
    pub pvp: bool,
    pub force_pvp: bool,
    pub friendly_fire: bool,
    /// Home blocks keep their own PvP setting even when `force_pvp` is on.
    pub force_pvp_exempts_home_blocks: bool,
    /// Lightning strikes summoned by a channeling trident.
    #[serde(default)]
    pub trident_strikes: im::HashSet<EntityId>,
}

impl WorldSettings {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            claims_enabled: true,
            pvp: true,
            force_pvp: false,
            friendly_fire: false,
            force_pvp_exempts_home_blocks: false,
            trident_strikes: im::HashSet::new(),
        }
    }

    pub fn has_trident_strike(&self, id: EntityId) -> bool {
        self.trident_strikes.contains(&id)
    }
}

/// Kind of a claimed zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    #[default]
    Default,
    Shop,
    Arena,
    Embassy,
    Wilds,
    Inn,
    Jail,
    Farm,
    Bank,
}

/// A claimed column of land owned by a town.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    world: WorldName,
    coord: ChunkCoord,
    /// Set at claim time and never reassigned.
    town: TownName,
    pub kind: ZoneKind,
    pub pvp: bool,
    pub home_block: bool,
}

impl Zone {
    fn new(world: &str, coord: ChunkCoord, town: &str) -> Self {
        Self {
            world: world.to_string(),
            coord,
            town: town.to_string(),
            kind: ZoneKind::Default,
            pvp: false,
            home_block: false,
        }
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn town(&self) -> &str {
        &self.town
    }

    pub fn is_arena(&self) -> bool {
        self.kind == ZoneKind::Arena
    }

    pub fn is_jail(&self) -> bool {
        self.kind == ZoneKind::Jail
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Town {
    pub name: TownName,
    nation: Option<NationName>,
    residents: im::HashSet<PlayerName>,
    pub pvp: bool,
    /// Server-admin override that beats every other PvP source.
    pub admin_disabled_pvp: bool,
}

impl Town {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nation: None,
            residents: im::HashSet::new(),
            pvp: false,
            admin_disabled_pvp: false,
        }
    }

    pub fn nation(&self) -> Option<&str> {
        self.nation.as_deref()
    }

    pub fn residents(&self) -> &im::HashSet<PlayerName> {
        &self.residents
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nation {
    pub name: NationName,
    allies: im::HashSet<NationName>,
    enemies: im::HashSet<NationName>,
    pub neutral: bool,
}

impl Nation {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            allies: im::HashSet::new(),
            enemies: im::HashSet::new(),
            neutral: false,
        }
    }

    pub fn has_ally(&self, other: &str) -> bool {
        self.allies.contains(other)
    }

    pub fn has_enemy(&self, other: &str) -> bool {
        self.enemies.contains(other)
    }

    pub fn allies(&self) -> &im::HashSet<NationName> {
        &self.allies
    }

    pub fn enemies(&self) -> &im::HashSet<NationName> {
        &self.enemies
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
    pub name: PlayerName,
    town: Option<TownName>,
    pub jailed: bool,
}

impl Resident {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            town: None,
            jailed: false,
        }
    }

    pub fn town(&self) -> Option<&str> {
        self.town.as_deref()
    }

    pub fn has_town(&self) -> bool {
        self.town.is_some()
    }
}

/// Diplomatic stance one nation takes towards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Ally,
    Enemy,
    Neutral,
}

/// Lookups and mutations against entities the registry does not know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("world '{0}' is not registered")]
    UnknownWorld(WorldName),
    #[error("town '{0}' is not registered")]
    UnknownTown(TownName),
    #[error("nation '{0}' is not registered")]
    UnknownNation(NationName),
    #[error("resident '{0}' is not registered")]
    UnknownResident(PlayerName),
    #[error("zone {coord} in '{world}' is already claimed by '{town}'")]
    AlreadyClaimed {
        world: WorldName,
        coord: ChunkCoord,
        town: TownName,
    },
    #[error("zone {coord} in '{world}' is not claimed")]
    Unclaimed { world: WorldName, coord: ChunkCoord },
    #[error("nation '{0}' cannot hold a stance towards itself")]
    SelfRelation(NationName),
    #[error("'{0}' is already registered")]
    Duplicate(String),
}

/// Every registry the arbitration engine reads.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    worlds: im::HashMap<WorldName, WorldSettings>,
    towns: im::HashMap<TownName, Town>,
    nations: im::HashMap<NationName, Nation>,
    residents: im::HashMap<PlayerName, Resident>,
    zones: im::HashMap<(WorldName, ChunkCoord), Zone>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    // --- lookups -----------------------------------------------------------

    pub fn world(&self, name: &str) -> Option<&WorldSettings> {
        self.worlds.get(name)
    }

    pub fn town(&self, name: &str) -> Option<&Town> {
        self.towns.get(name)
    }

    pub fn nation(&self, name: &str) -> Option<&Nation> {
        self.nations.get(name)
    }

    pub fn resident(&self, name: &str) -> Option<&Resident> {
        self.residents.get(name)
    }

    pub fn zone(&self, world: &str, coord: ChunkCoord) -> Option<&Zone> {
        self.zones.get(&(world.to_string(), coord))
    }

    /// Town of a registered resident.
    pub fn town_of(&self, resident: &str) -> Option<&Town> {
        self.resident(resident)
            .and_then(Resident::town)
            .and_then(|t| self.town(t))
    }

    /// Nation of a registered town.
    pub fn nation_of(&self, town: &str) -> Option<&Nation> {
        self.town(town)
            .and_then(Town::nation)
            .and_then(|n| self.nation(n))
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    // --- registration ------------------------------------------------------

    pub fn add_world(&mut self, world: WorldSettings) -> Result<(), RegistryError> {
        if self.worlds.contains_key(&world.name) {
            return Err(RegistryError::Duplicate(world.name));
        }
        self.worlds.insert(world.name.clone(), world);
        Ok(())
    }

    pub fn add_town(&mut self, name: &str) -> Result<(), RegistryError> {
        if self.towns.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.towns.insert(name.to_string(), Town::new(name));
        Ok(())
    }

    pub fn add_nation(&mut self, name: &str) -> Result<(), RegistryError> {
        if self.nations.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.nations.insert(name.to_string(), Nation::new(name));
        Ok(())
    }

    pub fn add_resident(&mut self, name: &str) -> Result<(), RegistryError> {
        if self.residents.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.residents.insert(name.to_string(), Resident::new(name));
        Ok(())
    }

    /// Disband a town: members become townless.
    ///
    /// Zones the town claimed are left in place; release them with
    /// [`Universe::unclaim`].
    pub fn remove_town(&mut self, name: &str) -> Result<Town, RegistryError> {
        let town = self
            .towns
            .remove(name)
            .ok_or_else(|| RegistryError::UnknownTown(name.to_string()))?;
        for member in town.residents.iter() {
            if let Some(resident) = self.residents.get_mut(member) {
                resident.town = None;
            }
        }
        Ok(town)
    }

    /// Disband a nation: member towns become independent and every other
    /// nation forgets its stance towards it.
    pub fn remove_nation(&mut self, name: &str) -> Result<Nation, RegistryError> {
        let nation = self
            .nations
            .remove(name)
            .ok_or_else(|| RegistryError::UnknownNation(name.to_string()))?;
        for (_, town) in self.towns.iter_mut() {
            if town.nation.as_deref() == Some(name) {
                town.nation = None;
            }
        }
        for (_, other) in self.nations.iter_mut() {
            other.allies.remove(name);
            other.enemies.remove(name);
        }
        Ok(nation)
    }

    // --- mutable access to free-form flags ----------------------------------

    pub fn world_mut(&mut self, name: &str) -> Result<&mut WorldSettings, RegistryError> {
        self.worlds
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownWorld(name.to_string()))
    }

    pub fn town_mut(&mut self, name: &str) -> Result<&mut Town, RegistryError> {
        self.towns
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownTown(name.to_string()))
    }

    pub fn nation_mut(&mut self, name: &str) -> Result<&mut Nation, RegistryError> {
        self.nations
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownNation(name.to_string()))
    }

    pub fn resident_mut(&mut self, name: &str) -> Result<&mut Resident, RegistryError> {
        self.residents
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownResident(name.to_string()))
    }

    pub fn zone_mut(&mut self, world: &str, coord: ChunkCoord) -> Result<&mut Zone, RegistryError> {
        self.zones
            .get_mut(&(world.to_string(), coord))
            .ok_or_else(|| RegistryError::Unclaimed {
                world: world.to_string(),
                coord,
            })
    }

    // --- membership --------------------------------------------------------

    /// Move a resident into a town, leaving any previous one.
    pub fn join_town(&mut self, resident: &str, town: &str) -> Result<(), RegistryError> {
        if !self.towns.contains_key(town) {
            return Err(RegistryError::UnknownTown(town.to_string()));
        }
        self.leave_town(resident)?;
        self.resident_mut(resident)?.town = Some(town.to_string());
        self.town_mut(town)?.residents.insert(resident.to_string());
        Ok(())
    }

    pub fn leave_town(&mut self, resident: &str) -> Result<(), RegistryError> {
        let previous = self.resident_mut(resident)?.town.take();
        if let Some(previous) = previous {
            if let Some(town) = self.towns.get_mut(&previous) {
                town.residents.remove(resident);
            }
        }
        Ok(())
    }

    /// Attach a town to a nation. A town belongs to at most one nation, so
    /// this replaces any previous membership.
    pub fn join_nation(&mut self, town: &str, nation: &str) -> Result<(), RegistryError> {
        if !self.nations.contains_key(nation) {
            return Err(RegistryError::UnknownNation(nation.to_string()));
        }
        self.town_mut(town)?.nation = Some(nation.to_string());
        Ok(())
    }

    pub fn leave_nation(&mut self, town: &str) -> Result<(), RegistryError> {
        self.town_mut(town)?.nation = None;
        Ok(())
    }

    pub fn set_jailed(&mut self, resident: &str, jailed: bool) -> Result<(), RegistryError> {
        self.resident_mut(resident)?.jailed = jailed;
        Ok(())
    }

    // --- diplomacy ---------------------------------------------------------

    /// Set the stance between two nations on both sides.
    ///
    /// Ally and enemy sets stay mutually exclusive: declaring an ally removes
    /// any enemy entry for the pair and vice versa.
    pub fn set_stance(&mut self, a: &str, b: &str, stance: Stance) -> Result<(), RegistryError> {
        if a == b {
            return Err(RegistryError::SelfRelation(a.to_string()));
        }
        if !self.nations.contains_key(b) {
            return Err(RegistryError::UnknownNation(b.to_string()));
        }
        for (this, other) in [(a, b), (b, a)] {
            let nation = self.nation_mut(this)?;
            nation.allies.remove(other);
            nation.enemies.remove(other);
            match stance {
                Stance::Ally => {
                    nation.allies.insert(other.to_string());
                }
                Stance::Enemy => {
                    nation.enemies.insert(other.to_string());
                }
                Stance::Neutral => {}
            }
        }
        Ok(())
    }

    // --- claims ------------------------------------------------------------

    pub fn claim(
        &mut self,
        world: &str,
        coord: ChunkCoord,
        town: &str,
    ) -> Result<&mut Zone, RegistryError> {
        if !self.worlds.contains_key(world) {
            return Err(RegistryError::UnknownWorld(world.to_string()));
        }
        if !self.towns.contains_key(town) {
            return Err(RegistryError::UnknownTown(town.to_string()));
        }
        let key = (world.to_string(), coord);
        if let Some(existing) = self.zones.get(&key) {
            return Err(RegistryError::AlreadyClaimed {
                world: world.to_string(),
                coord,
                town: existing.town.clone(),
            });
        }
        let zone = self
            .zones
            .entry(key)
            .or_insert_with(|| Zone::new(world, coord, town));
        Ok(zone)
    }

    pub fn unclaim(&mut self, world: &str, coord: ChunkCoord) -> Result<Zone, RegistryError> {
        self.zones
            .remove(&(world.to_string(), coord))
            .ok_or_else(|| RegistryError::Unclaimed {
                world: world.to_string(),
                coord,
            })
    }

    pub fn record_trident_strike(
        &mut self,
        world: &str,
        strike: EntityId,
    ) -> Result<(), RegistryError> {
        self.world_mut(world)?.trident_strikes.insert(strike);
        Ok(())
    }

    /// Drop a strike once its lightning entity is gone. Returns whether it
    /// was recorded.
    pub fn forget_trident_strike(
        &mut self,
        world: &str,
        strike: EntityId,
    ) -> Result<bool, RegistryError> {
        Ok(self
            .world_mut(world)?
            .trident_strikes
            .remove(&strike)
            .is_some())
    }
}

/// Shared, concurrently readable access to a [`Universe`].
///
/// Readers take an `Arc` snapshot and never block writers for longer than the
/// pointer swap. Writers clone the current version (cheap with `im` maps),
/// mutate it, and publish it.
#[derive(Clone, Default)]
pub struct UniverseHandle {
    current: Arc<RwLock<Arc<Universe>>>,
}

impl UniverseHandle {
    pub fn new(universe: Universe) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(universe))),
        }
    }

    /// Immutable view of the latest published version.
    pub fn snapshot(&self) -> Arc<Universe> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Apply a mutation and publish the result.
    pub fn update<T>(&self, f: impl FnOnce(&mut Universe) -> T) -> T {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Universe::clone(&guard);
        let out = f(&mut next);
        *guard = Arc::new(next);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe_with_nations() -> Universe {
        let mut universe = Universe::new();
        universe.add_nation("Aurora").unwrap();
        universe.add_nation("Borealis").unwrap();
        universe
    }

    #[test]
    fn test_chunk_floor_division() {
        let loc = Location::new("overworld", -0.5, 64.0, 31.9);
        assert_eq!(loc.chunk(16), ChunkCoord::new(-1, 1));

        let loc = Location::new("overworld", 16.0, 64.0, -16.0);
        assert_eq!(loc.chunk(16), ChunkCoord::new(1, -1));
    }

    #[test]
    fn test_stance_is_symmetric() {
        let mut universe = universe_with_nations();
        universe.set_stance("Aurora", "Borealis", Stance::Ally).unwrap();

        assert!(universe.nation("Aurora").unwrap().has_ally("Borealis"));
        assert!(universe.nation("Borealis").unwrap().has_ally("Aurora"));
    }

    #[test]
    fn test_enemy_replaces_ally() {
        let mut universe = universe_with_nations();
        universe.set_stance("Aurora", "Borealis", Stance::Ally).unwrap();
        universe.set_stance("Borealis", "Aurora", Stance::Enemy).unwrap();

        let aurora = universe.nation("Aurora").unwrap();
        assert!(!aurora.has_ally("Borealis"));
        assert!(aurora.has_enemy("Borealis"));

        universe.set_stance("Aurora", "Borealis", Stance::Neutral).unwrap();
        let borealis = universe.nation("Borealis").unwrap();
        assert!(!borealis.has_ally("Aurora"));
        assert!(!borealis.has_enemy("Aurora"));
    }

    #[test]
    fn test_self_stance_rejected() {
        let mut universe = universe_with_nations();
        assert_eq!(
            universe.set_stance("Aurora", "Aurora", Stance::Ally),
            Err(RegistryError::SelfRelation("Aurora".to_string()))
        );
    }

    #[test]
    fn test_claim_owner_is_fixed() {
        let mut universe = Universe::new();
        universe.add_world(WorldSettings::new("overworld")).unwrap();
        universe.add_town("Oakvale").unwrap();
        universe.add_town("Ironhold").unwrap();

        universe
            .claim("overworld", ChunkCoord::new(0, 0), "Oakvale")
            .unwrap();
        let err = universe
            .claim("overworld", ChunkCoord::new(0, 0), "Ironhold")
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyClaimed { .. }));
        assert_eq!(
            universe.zone("overworld", ChunkCoord::new(0, 0)).unwrap().town(),
            "Oakvale"
        );
    }

    #[test]
    fn test_claim_requires_known_world_and_town() {
        let mut universe = Universe::new();
        universe.add_town("Oakvale").unwrap();
        assert_eq!(
            universe
                .claim("nether", ChunkCoord::new(0, 0), "Oakvale")
                .unwrap_err(),
            RegistryError::UnknownWorld("nether".to_string())
        );
    }

    #[test]
    fn test_join_town_moves_resident() {
        let mut universe = Universe::new();
        universe.add_town("Oakvale").unwrap();
        universe.add_town("Ironhold").unwrap();
        universe.add_resident("alice").unwrap();

        universe.join_town("alice", "Oakvale").unwrap();
        universe.join_town("alice", "Ironhold").unwrap();

        assert!(!universe.town("Oakvale").unwrap().residents().contains("alice"));
        assert!(universe.town("Ironhold").unwrap().residents().contains("alice"));
        assert_eq!(universe.town_of("alice").unwrap().name, "Ironhold");
    }

    #[test]
    fn test_join_nation_replaces_previous() {
        let mut universe = universe_with_nations();
        universe.add_town("Oakvale").unwrap();
        universe.join_nation("Oakvale", "Aurora").unwrap();
        universe.join_nation("Oakvale", "Borealis").unwrap();
        assert_eq!(universe.town("Oakvale").unwrap().nation(), Some("Borealis"));
    }

    #[test]
    fn test_remove_nation_clears_references() {
        let mut universe = universe_with_nations();
        universe.add_town("Oakvale").unwrap();
        universe.join_nation("Oakvale", "Aurora").unwrap();
        universe.set_stance("Aurora", "Borealis", Stance::Enemy).unwrap();

        universe.remove_nation("Aurora").unwrap();

        assert_eq!(universe.town("Oakvale").unwrap().nation(), None);
        assert!(universe.nation("Borealis").unwrap().enemies().is_empty());
    }

    #[test]
    fn test_remove_town_keeps_claims() {
        let mut universe = Universe::new();
        universe.add_world(WorldSettings::new("overworld")).unwrap();
        universe.add_town("Oakvale").unwrap();
        universe.add_resident("alice").unwrap();
        universe.join_town("alice", "Oakvale").unwrap();
        universe
            .claim("overworld", ChunkCoord::new(0, 0), "Oakvale")
            .unwrap();

        universe.remove_town("Oakvale").unwrap();

        assert!(!universe.resident("alice").unwrap().has_town());
        assert_eq!(universe.zone_count(), 1);
    }

    #[test]
    fn test_trident_strikes_can_be_forgotten() {
        let mut universe = Universe::new();
        universe.add_world(WorldSettings::new("overworld")).unwrap();

        for id in 0..1_000 {
            universe
                .record_trident_strike("overworld", EntityId(id))
                .unwrap();
        }
        for id in 0..1_000 {
            assert!(universe
                .forget_trident_strike("overworld", EntityId(id))
                .unwrap());
        }

        assert!(universe.world("overworld").unwrap().trident_strikes.is_empty());
        // Forgetting twice is harmless
        assert!(!universe
            .forget_trident_strike("overworld", EntityId(0))
            .unwrap());
        assert_eq!(
            universe.forget_trident_strike("nether", EntityId(0)),
            Err(RegistryError::UnknownWorld("nether".to_string()))
        );
    }

    #[test]
    fn test_handle_snapshot_is_isolated_from_updates() {
        let handle = UniverseHandle::new(Universe::new());
        let before = handle.snapshot();

        handle.update(|u| u.add_town("Oakvale")).unwrap();

        // Old snapshot keeps reading the version it was taken from
        assert!(before.town("Oakvale").is_none());
        assert!(handle.snapshot().town("Oakvale").is_some());
    }
}
