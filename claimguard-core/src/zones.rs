//! Location → zone resolution and raw PvP policy.
//!
//! The values computed here are proposals; the engine runs them through the
//! registered [`PvpOverride`](crate::hooks::PvpOverride) hooks before acting
//! on them.

use crate::state::{Location, RegistryError, Universe, WorldSettings, Zone};

/// Zone claiming `location`, or `None` for wilderness.
pub fn resolve_zone<'a>(
    universe: &'a Universe,
    location: &Location,
    zone_size: u32,
) -> Option<&'a Zone> {
    universe.zone(&location.world, location.chunk(zone_size))
}

/// PvP status of a claimed zone, or of the wilderness when `zone` is `None`.
///
/// Precedence inside a zone:
/// 1. the owning town's admin override disables PvP outright,
/// 2. otherwise the zone flag, the town flag or world force-PvP enables it,
/// 3. force-PvP alone does not reach a home block when the world exempts them.
///
/// Fails when the zone's town is missing from the registry.
pub fn is_pvp(
    universe: &Universe,
    world: &WorldSettings,
    zone: Option<&Zone>,
) -> Result<bool, RegistryError> {
    let Some(zone) = zone else {
        return Ok(is_world_pvp(world));
    };

    let town = universe
        .town(zone.town())
        .ok_or_else(|| RegistryError::UnknownTown(zone.town().to_string()))?;

    if town.admin_disabled_pvp {
        return Ok(false);
    }

    if !zone.pvp && !town.pvp && !world.force_pvp {
        return Ok(false);
    }

    if zone.home_block && world.force_pvp && world.force_pvp_exempts_home_blocks {
        return Ok(false);
    }

    Ok(true)
}

/// Wilderness PvP: forced or enabled.
pub fn is_world_pvp(world: &WorldSettings) -> bool {
    world.force_pvp || world.pvp
}

/// Both parties stand in arena zones.
pub fn is_arena(attacker_zone: Option<&Zone>, defender_zone: Option<&Zone>) -> bool {
    matches!(
        (attacker_zone, defender_zone),
        (Some(a), Some(d)) if a.is_arena() && d.is_arena()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ChunkCoord, ZoneKind};
    use crate::testing::UniverseBuilder;

    fn zone_world(world: WorldSettings) -> Universe {
        UniverseBuilder::new()
            .with_world_settings(world)
            .with_town("Oakvale", None)
            .with_zone("overworld", 0, 0, "Oakvale")
            .with_zone_configured("overworld", 1, 0, "Oakvale", |z| z.pvp = true)
            .with_zone_configured("overworld", 2, 0, "Oakvale", |z| z.home_block = true)
            .with_zone_kind("overworld", 3, 0, "Oakvale", ZoneKind::Arena)
            .build()
    }

    fn pvp_at(u: &Universe, x: i32) -> bool {
        let world = u.world("overworld").unwrap();
        let zone = u.zone("overworld", ChunkCoord::new(x, 0));
        is_pvp(u, world, zone).unwrap()
    }

    #[test]
    fn test_resolve_zone() {
        let u = zone_world(WorldSettings::new("overworld"));
        let claimed = Location::new("overworld", 20.0, 70.0, 5.0);
        let wild = Location::new("overworld", -3.0, 70.0, 5.0);
        let elsewhere = Location::new("nether", 20.0, 70.0, 5.0);

        assert_eq!(
            resolve_zone(&u, &claimed, 16).unwrap().coord(),
            ChunkCoord::new(1, 0)
        );
        assert!(resolve_zone(&u, &wild, 16).is_none());
        assert!(resolve_zone(&u, &elsewhere, 16).is_none());
    }

    #[test]
    fn test_zone_flag_enables_pvp() {
        let u = zone_world(WorldSettings::new("overworld"));
        assert!(!pvp_at(&u, 0));
        assert!(pvp_at(&u, 1));
    }

    #[test]
    fn test_town_flag_enables_pvp() {
        let mut u = zone_world(WorldSettings::new("overworld"));
        u.town_mut("Oakvale").unwrap().pvp = true;
        assert!(pvp_at(&u, 0));
    }

    #[test]
    fn test_admin_override_beats_everything() {
        let mut world = WorldSettings::new("overworld");
        world.force_pvp = true;
        let mut u = zone_world(world);
        u.town_mut("Oakvale").unwrap().pvp = true;
        u.town_mut("Oakvale").unwrap().admin_disabled_pvp = true;

        assert!(!pvp_at(&u, 0));
        assert!(!pvp_at(&u, 1));
    }

    #[test]
    fn test_force_pvp_reaches_zones() {
        let mut world = WorldSettings::new("overworld");
        world.force_pvp = true;
        let u = zone_world(world);
        assert!(pvp_at(&u, 0));
        assert!(pvp_at(&u, 2));
    }

    #[test]
    fn test_home_block_exempt_from_force_pvp() {
        let mut world = WorldSettings::new("overworld");
        world.force_pvp = true;
        world.force_pvp_exempts_home_blocks = true;
        let u = zone_world(world);

        assert!(!pvp_at(&u, 2));
        // Ordinary zones are still forced
        assert!(pvp_at(&u, 0));
    }

    #[test]
    fn test_wilderness_pvp() {
        let mut world = WorldSettings::new("overworld");
        world.pvp = false;
        assert!(!is_world_pvp(&world));

        world.force_pvp = true;
        assert!(is_world_pvp(&world));

        let u = zone_world(WorldSettings::new("overworld"));
        assert!(is_pvp(&u, u.world("overworld").unwrap(), None).unwrap());
    }

    #[test]
    fn test_missing_town_is_an_error() {
        let u = zone_world(WorldSettings::new("overworld"));
        let zone = u.zone("overworld", ChunkCoord::new(0, 0)).unwrap().clone();
        let empty = UniverseBuilder::new().with_world("overworld").build();

        let err = is_pvp(&empty, empty.world("overworld").unwrap(), Some(&zone)).unwrap_err();
        assert_eq!(err, RegistryError::UnknownTown("Oakvale".to_string()));
    }

    #[test]
    fn test_arena_needs_both_sides() {
        let u = zone_world(WorldSettings::new("overworld"));
        let arena = u.zone("overworld", ChunkCoord::new(3, 0));
        let plain = u.zone("overworld", ChunkCoord::new(0, 0));

        assert!(is_arena(arena, arena));
        assert!(!is_arena(arena, plain));
        assert!(!is_arena(arena, None));
        assert!(!is_arena(None, None));
    }
}
