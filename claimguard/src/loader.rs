use anyhow::{Context, Result};
use claimguard_core::state::{ChunkCoord, Stance, Universe, WorldSettings, ZoneKind};
use claimguard_core::{CombatSettings, DamageRequest, EntityId};
use serde::Deserialize;
use std::path::Path;

/// A recorded server state plus the damage events to replay against it.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Used when no settings file is given on the command line.
    #[serde(default)]
    pub settings: Option<CombatSettings>,
    #[serde(default)]
    pub worlds: Vec<WorldSpec>,
    #[serde(default)]
    pub nations: Vec<NationSpec>,
    #[serde(default)]
    pub towns: Vec<TownSpec>,
    #[serde(default)]
    pub residents: Vec<ResidentSpec>,
    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
    /// Players allowed to destroy anywhere, on top of their own town.
    #[serde(default)]
    pub destroy_grants: Vec<String>,
    #[serde(default)]
    pub events: Vec<DamageRequest>,
}

#[derive(Debug, Deserialize)]
pub struct WorldSpec {
    pub name: String,
    #[serde(default = "enabled")]
    pub claims_enabled: bool,
    #[serde(default = "enabled")]
    pub pvp: bool,
    #[serde(default)]
    pub force_pvp: bool,
    #[serde(default)]
    pub friendly_fire: bool,
    #[serde(default)]
    pub force_pvp_exempts_home_blocks: bool,
    #[serde(default)]
    pub trident_strikes: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct NationSpec {
    pub name: String,
    #[serde(default)]
    pub allies: Vec<String>,
    #[serde(default)]
    pub enemies: Vec<String>,
    #[serde(default)]
    pub neutral: bool,
}

#[derive(Debug, Deserialize)]
pub struct TownSpec {
    pub name: String,
    #[serde(default)]
    pub nation: Option<String>,
    #[serde(default)]
    pub pvp: bool,
    #[serde(default)]
    pub admin_disabled_pvp: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResidentSpec {
    pub name: String,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub jailed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ZoneSpec {
    pub world: String,
    pub x: i32,
    pub z: i32,
    pub town: String,
    #[serde(default)]
    pub kind: ZoneKind,
    #[serde(default)]
    pub pvp: bool,
    #[serde(default)]
    pub home_block: bool,
}

fn enabled() -> bool {
    true
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    log::info!("Loading scenario from {:?}", path);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse scenario {}", path.display()))?;
    log::info!(
        "Loaded {} worlds, {} towns, {} zones, {} events",
        scenario.worlds.len(),
        scenario.towns.len(),
        scenario.zones.len(),
        scenario.events.len()
    );
    Ok(scenario)
}

/// Register everything in dependency order: worlds and nations, then towns,
/// residents, diplomacy and finally claims.
pub fn build_universe(scenario: &Scenario) -> Result<Universe> {
    let mut universe = Universe::new();

    for spec in &scenario.worlds {
        let mut world = WorldSettings::new(&spec.name);
        world.claims_enabled = spec.claims_enabled;
        world.pvp = spec.pvp;
        world.force_pvp = spec.force_pvp;
        world.friendly_fire = spec.friendly_fire;
        world.force_pvp_exempts_home_blocks = spec.force_pvp_exempts_home_blocks;
        universe
            .add_world(world)
            .with_context(|| format!("World '{}'", spec.name))?;
        for strike in &spec.trident_strikes {
            universe.record_trident_strike(&spec.name, EntityId(*strike))?;
        }
    }

    for spec in &scenario.nations {
        universe
            .add_nation(&spec.name)
            .with_context(|| format!("Nation '{}'", spec.name))?;
        universe.nation_mut(&spec.name)?.neutral = spec.neutral;
    }

    for spec in &scenario.towns {
        universe
            .add_town(&spec.name)
            .with_context(|| format!("Town '{}'", spec.name))?;
        let town = universe.town_mut(&spec.name)?;
        town.pvp = spec.pvp;
        town.admin_disabled_pvp = spec.admin_disabled_pvp;
        if let Some(nation) = &spec.nation {
            universe
                .join_nation(&spec.name, nation)
                .with_context(|| format!("Town '{}' joining nation '{}'", spec.name, nation))?;
        }
    }

    for spec in &scenario.residents {
        universe
            .add_resident(&spec.name)
            .with_context(|| format!("Resident '{}'", spec.name))?;
        if let Some(town) = &spec.town {
            universe
                .join_town(&spec.name, town)
                .with_context(|| format!("Resident '{}' joining town '{}'", spec.name, town))?;
        }
        universe.set_jailed(&spec.name, spec.jailed)?;
    }

    for spec in &scenario.nations {
        for ally in &spec.allies {
            universe
                .set_stance(&spec.name, ally, Stance::Ally)
                .with_context(|| format!("Alliance {} / {}", spec.name, ally))?;
        }
        for enemy in &spec.enemies {
            universe
                .set_stance(&spec.name, enemy, Stance::Enemy)
                .with_context(|| format!("War {} / {}", spec.name, enemy))?;
        }
    }

    for spec in &scenario.zones {
        let coord = ChunkCoord::new(spec.x, spec.z);
        let zone = universe
            .claim(&spec.world, coord, &spec.town)
            .with_context(|| format!("Claim of {} in '{}'", coord, spec.world))?;
        zone.kind = spec.kind;
        zone.pvp = spec.pvp;
        zone.home_block = spec.home_block;
    }

    log::debug!("Universe holds {} zones", universe.zone_count());
    Ok(universe)
}
