//! Diplomatic relationship queries over residents, towns and nations.
//!
//! Every query reads the registry as-is and never fails: a resident, town or
//! nation the registry does not know makes the pair "not related".

use crate::state::{Location, NationName, Universe};
use serde::Serialize;

/// How one resident stands towards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    SameTown,
    SameNation,
    Ally,
    Enemy,
    Neutral,
    /// One of the residents, or a town they point to, is not registered.
    Unknown,
}

/// Both residents belong to the same town.
pub fn same_town(universe: &Universe, a: &str, b: &str) -> bool {
    match (universe.town_of(a), universe.town_of(b)) {
        (Some(ta), Some(tb)) => ta.name == tb.name,
        _ => false,
    }
}

/// Towns are identical or share a nation.
pub fn same_nation(universe: &Universe, town_a: &str, town_b: &str) -> bool {
    if town_a == town_b {
        return true;
    }
    let (Some(ta), Some(tb)) = (universe.town(town_a), universe.town(town_b)) else {
        return false;
    };
    matches!((ta.nation(), tb.nation()), (Some(na), Some(nb)) if na == nb)
}

pub fn same_nation_residents(universe: &Universe, a: &str, b: &str) -> bool {
    match (universe.town_of(a), universe.town_of(b)) {
        (Some(ta), Some(tb)) => same_nation(universe, &ta.name, &tb.name),
        _ => false,
    }
}

/// Nations are identical or either lists the other as an ally.
pub fn is_ally(universe: &Universe, nation_a: &str, nation_b: &str) -> bool {
    if nation_a == nation_b {
        return true;
    }
    let (Some(na), Some(nb)) = (universe.nation(nation_a), universe.nation(nation_b)) else {
        return false;
    };
    na.has_ally(nation_b) || nb.has_ally(nation_a)
}

/// Towns are identical, share a nation, or their nations are allied.
pub fn is_ally_towns(universe: &Universe, town_a: &str, town_b: &str) -> bool {
    if same_nation(universe, town_a, town_b) {
        return true;
    }
    match (universe.nation_of(town_a), universe.nation_of(town_b)) {
        (Some(na), Some(nb)) => is_ally(universe, &na.name, &nb.name),
        _ => false,
    }
}

/// Residents are townmates, nation-mates, or citizens of allied nations.
pub fn is_ally_residents(universe: &Universe, a: &str, b: &str) -> bool {
    match (universe.town_of(a), universe.town_of(b)) {
        (Some(ta), Some(tb)) => is_ally_towns(universe, &ta.name, &tb.name),
        _ => false,
    }
}

/// Towns belong to nations that are at war with each other.
pub fn is_enemy(universe: &Universe, town_a: &str, town_b: &str) -> bool {
    if same_nation(universe, town_a, town_b) {
        return false;
    }
    match (universe.nation_of(town_a), universe.nation_of(town_b)) {
        (Some(na), Some(nb)) => na.has_enemy(&nb.name) || nb.has_enemy(&na.name),
        _ => false,
    }
}

pub fn is_enemy_residents(universe: &Universe, a: &str, b: &str) -> bool {
    match (universe.town_of(a), universe.town_of(b)) {
        (Some(ta), Some(tb)) => is_enemy(universe, &ta.name, &tb.name),
        _ => false,
    }
}

/// Enemy relationship that neutral nations opt out of.
pub fn can_attack_enemy(universe: &Universe, a: &str, b: &str) -> bool {
    let (Some(ta), Some(tb)) = (universe.town_of(a), universe.town_of(b)) else {
        return false;
    };
    let (Some(na), Some(nb)) = (universe.nation_of(&ta.name), universe.nation_of(&tb.name)) else {
        return false;
    };
    if na.neutral || nb.neutral {
        return false;
    }
    is_enemy(universe, &ta.name, &tb.name)
}

/// Checks consecutive pairs only: `[x, y, z]` is allied when x–y and y–z are,
/// whatever x and z think of each other.
pub fn all_allies(universe: &Universe, nations: &[NationName]) -> bool {
    nations
        .windows(2)
        .all(|pair| is_ally(universe, &pair[0], &pair[1]))
}

/// The location lies in a zone owned by a town the resident's town is at war
/// with.
pub fn is_enemy_zone(
    universe: &Universe,
    resident: &str,
    location: &Location,
    zone_size: u32,
) -> bool {
    let Some(town) = universe.town_of(resident) else {
        return false;
    };
    match universe.zone(&location.world, location.chunk(zone_size)) {
        Some(zone) => is_enemy(universe, &town.name, zone.town()),
        None => false,
    }
}

/// Classify the pair, strongest bond first.
pub fn relationship(universe: &Universe, a: &str, b: &str) -> Relationship {
    let (Some(ta), Some(tb)) = (universe.town_of(a), universe.town_of(b)) else {
        return Relationship::Unknown;
    };
    if ta.name == tb.name {
        Relationship::SameTown
    } else if same_nation(universe, &ta.name, &tb.name) {
        Relationship::SameNation
    } else if is_ally_towns(universe, &ta.name, &tb.name) {
        Relationship::Ally
    } else if is_enemy(universe, &ta.name, &tb.name) {
        Relationship::Enemy
    } else {
        Relationship::Neutral
    }
}
