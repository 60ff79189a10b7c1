//! Builders and recording fakes for exercising the engine without a server.
//!
//! The builder methods expect consistent input (towns reference registered
//! nations, zones reference registered worlds and towns) and panic otherwise.

use crate::entity::{EntityId, Material};
use crate::host::{DestroyAuthority, EntityEffects, MessageSink};
use crate::state::{ChunkCoord, Location, Stance, Universe, WorldSettings, Zone, ZoneKind};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

pub struct UniverseBuilder {
    universe: Universe,
}

impl UniverseBuilder {
    pub fn new() -> Self {
        Self {
            universe: Universe::new(),
        }
    }

    /// World with default settings: claims on, PvP on, friendly fire off.
    pub fn with_world(self, name: &str) -> Self {
        self.with_world_settings(WorldSettings::new(name))
    }

    pub fn with_world_settings(mut self, world: WorldSettings) -> Self {
        self.universe.add_world(world).expect("world registered twice");
        self
    }

    pub fn with_nation(mut self, name: &str) -> Self {
        self.universe.add_nation(name).expect("nation registered twice");
        self
    }

    pub fn with_town(mut self, name: &str, nation: Option<&str>) -> Self {
        self.universe.add_town(name).expect("town registered twice");
        if let Some(nation) = nation {
            self.universe
                .join_nation(name, nation)
                .expect("nation must be registered before its towns");
        }
        self
    }

    pub fn with_town_pvp(mut self, town: &str, pvp: bool) -> Self {
        self.universe.town_mut(town).expect("unknown town").pvp = pvp;
        self
    }

    pub fn with_resident(mut self, name: &str, town: Option<&str>) -> Self {
        self.universe.add_resident(name).expect("resident registered twice");
        if let Some(town) = town {
            self.universe
                .join_town(name, town)
                .expect("town must be registered before its residents");
        }
        self
    }

    pub fn jailed(mut self, resident: &str) -> Self {
        self.universe
            .set_jailed(resident, true)
            .expect("unknown resident");
        self
    }

    pub fn with_stance(mut self, a: &str, b: &str, stance: Stance) -> Self {
        self.universe
            .set_stance(a, b, stance)
            .expect("stance between unknown nations");
        self
    }

    /// Claim chunk (`x`, `z`) as an ordinary zone with PvP off.
    pub fn with_zone(self, world: &str, x: i32, z: i32, town: &str) -> Self {
        self.with_zone_configured(world, x, z, town, |_| {})
    }

    pub fn with_zone_kind(self, world: &str, x: i32, z: i32, town: &str, kind: ZoneKind) -> Self {
        self.with_zone_configured(world, x, z, town, |zone| zone.kind = kind)
    }

    pub fn with_zone_configured(
        mut self,
        world: &str,
        x: i32,
        z: i32,
        town: &str,
        configure: impl FnOnce(&mut Zone),
    ) -> Self {
        let zone = self
            .universe
            .claim(world, ChunkCoord::new(x, z), town)
            .expect("zone claim failed");
        configure(zone);
        self
    }

    pub fn with_trident_strike(mut self, world: &str, strike: EntityId) -> Self {
        self.universe
            .record_trident_strike(world, strike)
            .expect("unknown world");
        self
    }

    pub fn build(self) -> Universe {
        self.universe
    }
}

impl Default for UniverseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Universe> for UniverseBuilder {
    fn from(universe: Universe) -> Self {
        Self { universe }
    }
}

/// Destroy rights granted to a fixed set of players, everywhere.
#[derive(Debug, Default)]
pub struct GrantedPlayers {
    players: HashSet<String>,
    asked: Mutex<Vec<(String, Material)>>,
}

impl GrantedPlayers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(players: &[&str]) -> Self {
        Self {
            players: players.iter().map(|p| p.to_string()).collect(),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Every `(player, material)` the engine asked about, in order.
    pub fn asked(&self) -> Vec<(String, Material)> {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DestroyAuthority for GrantedPlayers {
    fn can_destroy(&self, player: &str, _location: &Location, material: Material) -> bool {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((player.to_string(), material));
        self.players.contains(player)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ClearTarget(EntityId),
    Calm(EntityId),
}

/// Records entity effects instead of applying them.
#[derive(Debug, Default)]
pub struct RecordingEffects {
    effects: Mutex<Vec<Effect>>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, effect: Effect) {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(effect);
    }
}

impl EntityEffects for RecordingEffects {
    fn clear_target(&self, entity: EntityId) {
        self.push(Effect::ClearTarget(entity));
    }

    fn calm(&self, entity: EntityId) {
        self.push(Effect::Calm(entity));
    }
}

/// Records `(player, message)` pairs.
#[derive(Debug, Default)]
pub struct RecordingMessages {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MessageSink for RecordingMessages {
    fn send_error(&self, player: &str, message: &str) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((player.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let universe = UniverseBuilder::default()
            .with_world("overworld")
            .with_nation("Aurora")
            .with_town("Oakvale", Some("Aurora"))
            .with_resident("alice", Some("Oakvale"))
            .with_zone_kind("overworld", 1, 2, "Oakvale", ZoneKind::Farm)
            .build();

        assert_eq!(universe.town("Oakvale").unwrap().nation(), Some("Aurora"));
        assert_eq!(universe.town_of("alice").unwrap().name, "Oakvale");
        let zone = universe.zone("overworld", ChunkCoord::new(1, 2)).unwrap();
        assert_eq!(zone.kind, ZoneKind::Farm);
        assert_eq!(zone.town(), "Oakvale");
    }

    #[test]
    fn test_no_grants_denies_everyone() {
        let grants = GrantedPlayers::none();
        let loc = Location::new("overworld", 0.0, 0.0, 0.0);
        assert!(!grants.can_destroy("alice", &loc, Material::Dirt));
        assert_eq!(grants.asked().len(), 1);
    }

    #[test]
    fn test_granted_players_records_questions() {
        let grants = GrantedPlayers::of(&["alice"]);
        let loc = Location::new("overworld", 0.0, 0.0, 0.0);
        assert!(grants.can_destroy("alice", &loc, Material::Dirt));
        assert!(!grants.can_destroy("bob", &loc, Material::Wheat));
        assert_eq!(
            grants.asked(),
            vec![
                ("alice".to_string(), Material::Dirt),
                ("bob".to_string(), Material::Wheat)
            ]
        );
    }
}
