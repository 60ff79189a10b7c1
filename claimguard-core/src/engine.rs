//! Combat arbitration: decides whether a damage event is cancelled.
//!
//! ```text
//! DamageRequest ─▶ world check ─▶ resolve shooter ─▶ self-damage? ─▶ branch
//!                                                                     │
//!        ┌──────────────────────┬──────────────────────┬──────────────┴───────┐
//!   player → player      player → other         other → player        other → other
//!   (PvP + hooks)        (protections)          (pets, lightning)     (projectiles, pets)
//! ```
//!
//! The engine holds no per-call state. Each call reads the [`Universe`]
//! snapshot it is given; a world, town or nation missing from that snapshot
//! lets the damage through.

use crate::config::{CombatSettings, SettingsError};
use crate::entity::{Actor, DamageCause, Entity, EntityKind, Material, Shooter};
use crate::hooks::{
    CombatDecision, CombatOverride, HookRegistry, PlayerCombat, PvpOverride, PvpSubject,
};
use crate::host::{DestroyAuthority, EntityEffects, MessageSink};
use crate::relations;
use crate::state::{RegistryError, Universe, WorldSettings, Zone, ZoneKind};
use crate::zones;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// A damage notification from the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageRequest {
    /// Entity dealing the damage directly (the arrow, not the archer).
    pub attacker: Entity,
    pub defender: Entity,
    #[serde(default)]
    pub cause: DamageCause,
}

/// Rule that produced a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    FriendlyFire,
    AttackerZonePvp,
    DefenderZonePvp,
    JailedPvp,
    /// A combat override cancelled a hit the rules allowed.
    CombatOverride,
    ProtectedPet,
    FarmAnimal,
    ProtectedEntity,
    PlacedObject,
    PetPvp,
    TridentStrike,
    StrayProjectile,
    PetAttack,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Verdict {
    pub cancelled: bool,
    /// Reason delivered to the attacking player.
    pub message: Option<String>,
    /// Why the hit was cancelled, when it was.
    pub rule: Option<Rule>,
}

impl Verdict {
    pub fn allow() -> Self {
        Self::default()
    }

    pub fn cancel(rule: Rule) -> Self {
        Self {
            cancelled: true,
            message: None,
            rule: Some(rule),
        }
    }

    /// Cancel when `cancelled` holds, allow otherwise.
    fn cancel_if(cancelled: bool, rule: Rule) -> Self {
        if cancelled {
            Self::cancel(rule)
        } else {
            Self::allow()
        }
    }
}

/// Zones both parties stand in, resolved once per call.
struct Ground<'a> {
    world: &'a WorldSettings,
    attacker: Option<&'a Zone>,
    defender: Option<&'a Zone>,
}

pub struct CombatEngine {
    settings: CombatSettings,
    farm_animals: FxHashSet<String>,
    hooks: HookRegistry,
    authority: Arc<dyn DestroyAuthority>,
    effects: Arc<dyn EntityEffects>,
    messages: Arc<dyn MessageSink>,
}

impl CombatEngine {
    pub fn new(
        settings: CombatSettings,
        authority: Arc<dyn DestroyAuthority>,
        effects: Arc<dyn EntityEffects>,
        messages: Arc<dyn MessageSink>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let farm_animals = settings
            .farm_animals
            .iter()
            .map(|name| name.trim().to_ascii_uppercase())
            .collect();
        Ok(Self {
            settings,
            farm_animals,
            hooks: HookRegistry::new(),
            authority,
            effects,
            messages,
        })
    }

    pub fn with_pvp_override(mut self, hook: Box<dyn PvpOverride>) -> Self {
        self.hooks.register_pvp(hook);
        self
    }

    pub fn with_combat_override(mut self, hook: Box<dyn CombatOverride>) -> Self {
        self.hooks.register_combat(hook);
        self
    }

    pub fn settings(&self) -> &CombatSettings {
        &self.settings
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Decide whether `request` must be cancelled.
    ///
    /// Never fails: an unregistered world, town or nation lets the damage
    /// through.
    #[instrument(
        skip_all,
        name = "prevent_damage",
        fields(attacker = %request.attacker.id, defender = %request.defender.id)
    )]
    pub fn prevent_damage(&self, universe: &Universe, request: &DamageRequest) -> Verdict {
        match self.arbitrate(universe, request) {
            Ok(verdict) => {
                if verdict.cancelled {
                    log::debug!(
                        "Cancelled {} -> {}: {:?}",
                        request.attacker.kind,
                        request.defender.kind,
                        verdict.rule
                    );
                }
                verdict
            }
            Err(e) => {
                log::debug!("Allowing damage, registry incomplete: {}", e);
                Verdict::allow()
            }
        }
    }

    /// PvP is disallowed at `zone` (or in the wilderness), after overrides.
    pub fn prevent_pvp(
        &self,
        universe: &Universe,
        world: &WorldSettings,
        zone: Option<&Zone>,
    ) -> Result<bool, RegistryError> {
        let pvp = zones::is_pvp(universe, world, zone)?;
        let subject = match zone {
            Some(zone) => PvpSubject::Zone { world, zone },
            None => PvpSubject::Wilderness(world),
        };
        Ok(!self.hooks.test_pvp(&subject, pvp))
    }

    fn arbitrate(
        &self,
        universe: &Universe,
        request: &DamageRequest,
    ) -> Result<Verdict, RegistryError> {
        let defender = &request.defender;
        let world_name = &defender.location.world;
        let world = universe
            .world(world_name)
            .ok_or_else(|| RegistryError::UnknownWorld(world_name.clone()))?;

        if !world.claims_enabled {
            return Ok(Verdict::allow());
        }

        let attacker = resolve_shooter(&request.attacker);

        if attacker.id == defender.id {
            return Ok(Verdict::allow());
        }

        let size = self.settings.zone_size;
        let ground = Ground {
            world,
            attacker: zones::resolve_zone(universe, &attacker.location, size),
            defender: zones::resolve_zone(universe, &defender.location, size),
        };

        match (Actor::of(attacker), Actor::of(defender)) {
            (
                Actor::Player {
                    entity: atk,
                    name: atk_name,
                },
                Actor::Player {
                    entity: def,
                    name: def_name,
                },
            ) => {
                let combat = PlayerCombat {
                    world,
                    attacker: atk,
                    attacker_name: atk_name,
                    attacker_zone: ground.attacker,
                    defender: def,
                    defender_name: def_name,
                    defender_zone: ground.defender,
                    cause: request.cause,
                };
                self.player_vs_player(universe, &combat)
            }
            (Actor::Player { name, .. }, Actor::NonPlayer(def)) => {
                Ok(self.player_vs_creature(attacker, name, def, &ground))
            }
            (Actor::NonPlayer(atk), Actor::Player { .. }) => {
                self.creature_vs_player(universe, atk, &ground)
            }
            (Actor::NonPlayer(atk), Actor::NonPlayer(def)) => {
                Ok(self.creature_vs_creature(&request.attacker, atk, def))
            }
        }
    }

    fn player_vs_player(
        &self,
        universe: &Universe,
        combat: &PlayerCombat<'_>,
    ) -> Result<Verdict, RegistryError> {
        let mut rule = None;
        let mut message = None;

        if !zones::is_arena(combat.attacker_zone, combat.defender_zone) {
            if self.prevent_friendly_fire(universe, combat) {
                rule = Some(Rule::FriendlyFire);
                message = Some(self.settings.messages.friendly_fire_disabled.clone());
            } else if self.prevent_pvp(universe, combat.world, combat.attacker_zone)? {
                rule = Some(Rule::AttackerZonePvp);
            } else if self.prevent_pvp(universe, combat.world, combat.defender_zone)? {
                rule = Some(Rule::DefenderZonePvp);
            } else if self.prevent_jailed_pvp(universe, combat) {
                rule = Some(Rule::JailedPvp);
            }
        }

        let proposed = CombatDecision {
            cancelled: rule.is_some(),
            message,
        };
        let decision = self.hooks.decide_combat(combat, proposed);

        if decision.cancelled {
            if let Some(message) = &decision.message {
                self.messages.send_error(combat.attacker_name, message);
            }
        }

        if !decision.cancelled {
            return Ok(Verdict::allow());
        }
        Ok(Verdict {
            cancelled: true,
            message: decision.message,
            rule: Some(rule.unwrap_or(Rule::CombatOverride)),
        })
    }

    /// Allies may not hurt each other unless the world allows friendly fire.
    fn prevent_friendly_fire(&self, universe: &Universe, combat: &PlayerCombat<'_>) -> bool {
        !combat.world.friendly_fire
            && relations::is_ally_residents(universe, combat.attacker_name, combat.defender_name)
    }

    /// A jailed resident inside a jail zone neither deals nor takes PvP damage.
    fn prevent_jailed_pvp(&self, universe: &Universe, combat: &PlayerCombat<'_>) -> bool {
        if !self.settings.jail_plots_prevent_pvp {
            return false;
        }
        let (Some(attacker), Some(defender)) = (
            universe.resident(combat.attacker_name),
            universe.resident(combat.defender_name),
        ) else {
            return false;
        };
        let jailed_in =
            |jailed: bool, zone: Option<&Zone>| jailed && zone.is_some_and(Zone::is_jail);

        jailed_in(defender.jailed, combat.defender_zone)
            || jailed_in(attacker.jailed, combat.attacker_zone)
    }

    fn player_vs_creature(
        &self,
        attacker: &Entity,
        name: &str,
        defender: &Entity,
        ground: &Ground<'_>,
    ) -> Verdict {
        let denied = |material: Material| {
            !self
                .authority
                .can_destroy(name, &defender.location, material)
        };

        if let Some(zone) = ground.defender {
            if defender.kind == EntityKind::Wolf
                && defender.owner.is_some_and(|owner| owner != attacker.id)
                && denied(Material::Dirt)
            {
                return Verdict::cancel(Rule::ProtectedPet);
            }

            if zone.kind == ZoneKind::Farm && self.farm_animals.contains(defender.kind.name()) {
                return Verdict::cancel_if(denied(Material::Wheat), Rule::FarmAnimal);
            }

            if defender.kind.matches_any(&self.settings.protected_entity_types) {
                return Verdict::cancel_if(denied(Material::Dirt), Rule::ProtectedEntity);
            }
        }

        match defender.kind.placed_material() {
            Some(material) => Verdict::cancel_if(denied(material), Rule::PlacedObject),
            None => Verdict::allow(),
        }
    }

    fn creature_vs_player(
        &self,
        universe: &Universe,
        attacker: &Entity,
        ground: &Ground<'_>,
    ) -> Result<Verdict, RegistryError> {
        if attacker.kind == EntityKind::Wolf
            && attacker.is_tamed()
            && (self.prevent_pvp(universe, ground.world, ground.attacker)?
                || self.prevent_pvp(universe, ground.world, ground.defender)?)
        {
            self.effects.clear_target(attacker.id);
            self.effects.calm(attacker.id);
            return Ok(Verdict::cancel(Rule::PetPvp));
        }

        if attacker.kind == EntityKind::LightningStrike
            && ground.world.has_trident_strike(attacker.id)
            && self.prevent_pvp(universe, ground.world, ground.defender)?
        {
            return Ok(Verdict::cancel(Rule::TridentStrike));
        }

        Ok(Verdict::allow())
    }

    /// `direct` is the entity that made contact, before shooter resolution.
    fn creature_vs_creature(
        &self,
        direct: &Entity,
        attacker: &Entity,
        defender: &Entity,
    ) -> Verdict {
        if direct.kind.is_projectile() {
            return Verdict::cancel(Rule::StrayProjectile);
        }

        let protected = defender
            .kind
            .matches_any(&self.settings.protected_entity_types);

        if attacker.kind == EntityKind::Wolf && attacker.is_tamed() && protected {
            self.effects.clear_target(attacker.id);
            self.effects.calm(attacker.id);
            return Verdict::cancel(Rule::PetAttack);
        }

        if attacker.kind == EntityKind::Axolotl && protected {
            // Axolotls keep their anger; only the target is dropped.
            self.effects.clear_target(attacker.id);
            return Verdict::cancel(Rule::PetAttack);
        }

        Verdict::allow()
    }
}

/// The launching entity of a projectile, or the entity itself.
///
/// Projectiles fired by blocks stay unresolved and are judged as the
/// projectile.
fn resolve_shooter(entity: &Entity) -> &Entity {
    if !entity.kind.is_projectile() {
        return entity;
    }
    match &entity.shooter {
        Some(Shooter::Entity(shooter)) => shooter,
        _ => entity,
    }
}
