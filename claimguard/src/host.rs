//! Host services backed by the loaded scenario instead of a live server.

use claimguard_core::state::{Location, Universe};
use claimguard_core::zones::resolve_zone;
use claimguard_core::{DestroyAuthority, EntityEffects, EntityId, Material, MessageSink};
use std::collections::HashSet;
use std::sync::Arc;

/// Destroy rights as a plain town permission model: anyone may build in the
/// wilderness, residents may build in their own town, and granted players
/// may build everywhere.
pub struct TownPermissions {
    universe: Arc<Universe>,
    zone_size: u32,
    granted: HashSet<String>,
}

impl TownPermissions {
    pub fn new(universe: Arc<Universe>, zone_size: u32, granted: &[String]) -> Self {
        Self {
            universe,
            zone_size,
            granted: granted.iter().cloned().collect(),
        }
    }
}

impl DestroyAuthority for TownPermissions {
    fn can_destroy(&self, player: &str, location: &Location, material: Material) -> bool {
        let allowed = self.granted.contains(player)
            || match resolve_zone(&self.universe, location, self.zone_size) {
                None => true,
                Some(zone) => self
                    .universe
                    .town_of(player)
                    .is_some_and(|town| town.name == zone.town()),
            };
        log::trace!("{} destroy {:?} at {:?}: {}", player, material, location, allowed);
        allowed
    }
}

/// Reports entity effects and messages through the log.
#[derive(Debug, Default)]
pub struct LoggingHost;

impl EntityEffects for LoggingHost {
    fn clear_target(&self, entity: EntityId) {
        log::info!("Entity {} dropped its target", entity);
    }

    fn calm(&self, entity: EntityId) {
        log::info!("Entity {} calmed down", entity);
    }
}

impl MessageSink for LoggingHost {
    fn send_error(&self, player: &str, message: &str) {
        log::info!("To {}: {}", player, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimguard_core::state::ChunkCoord;
    use claimguard_core::testing::UniverseBuilder;

    #[test]
    fn test_residents_build_at_home_only() {
        let universe = UniverseBuilder::new()
            .with_world("overworld")
            .with_town("Oakvale", None)
            .with_town("Ashford", None)
            .with_resident("alice", Some("Oakvale"))
            .with_resident("carl", Some("Ashford"))
            .with_zone("overworld", 0, 0, "Oakvale")
            .build();
        assert!(universe.zone("overworld", ChunkCoord::new(0, 0)).is_some());

        let perms = TownPermissions::new(Arc::new(universe), 16, &["op".to_string()]);
        let home = Location::new("overworld", 4.0, 64.0, 4.0);
        let wild = Location::new("overworld", -40.0, 64.0, 4.0);

        assert!(perms.can_destroy("alice", &home, Material::Dirt));
        assert!(!perms.can_destroy("carl", &home, Material::Dirt));
        assert!(perms.can_destroy("op", &home, Material::Wheat));
        assert!(perms.can_destroy("carl", &wild, Material::ItemFrame));
    }
}
