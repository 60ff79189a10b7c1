//! Entity snapshots handed to the engine by the host.

use crate::state::{Location, PlayerName};
use serde::{Deserialize, Serialize};

/// Host-assigned runtime identifier of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity types the combat rules distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Player,
    // Animals
    Wolf,
    Axolotl,
    Cat,
    Parrot,
    Horse,
    Cow,
    Pig,
    Chicken,
    Sheep,
    Mooshroom,
    // Water mobs
    Squid,
    GlowSquid,
    Cod,
    Salmon,
    // NPCs and golems
    Villager,
    WanderingTrader,
    SnowGolem,
    IronGolem,
    // Monsters
    Zombie,
    Skeleton,
    Creeper,
    Spider,
    // Inanimate
    ArmorStand,
    ItemFrame,
    Painting,
    EnderCrystal,
    Minecart,
    MinecartChest,
    MinecartFurnace,
    MinecartCommand,
    MinecartHopper,
    // Projectiles
    Arrow,
    SpectralArrow,
    Trident,
    Snowball,
    Egg,
    Fireball,
    SmallFireball,
    // Weather
    LightningStrike,
}

impl EntityKind {
    /// Upper-case type name, as used in farm animal lists.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Player => "PLAYER",
            EntityKind::Wolf => "WOLF",
            EntityKind::Axolotl => "AXOLOTL",
            EntityKind::Cat => "CAT",
            EntityKind::Parrot => "PARROT",
            EntityKind::Horse => "HORSE",
            EntityKind::Cow => "COW",
            EntityKind::Pig => "PIG",
            EntityKind::Chicken => "CHICKEN",
            EntityKind::Sheep => "SHEEP",
            EntityKind::Mooshroom => "MOOSHROOM",
            EntityKind::Squid => "SQUID",
            EntityKind::GlowSquid => "GLOW_SQUID",
            EntityKind::Cod => "COD",
            EntityKind::Salmon => "SALMON",
            EntityKind::Villager => "VILLAGER",
            EntityKind::WanderingTrader => "WANDERING_TRADER",
            EntityKind::SnowGolem => "SNOWMAN",
            EntityKind::IronGolem => "IRON_GOLEM",
            EntityKind::Zombie => "ZOMBIE",
            EntityKind::Skeleton => "SKELETON",
            EntityKind::Creeper => "CREEPER",
            EntityKind::Spider => "SPIDER",
            EntityKind::ArmorStand => "ARMOR_STAND",
            EntityKind::ItemFrame => "ITEM_FRAME",
            EntityKind::Painting => "PAINTING",
            EntityKind::EnderCrystal => "ENDER_CRYSTAL",
            EntityKind::Minecart => "MINECART",
            EntityKind::MinecartChest => "MINECART_CHEST",
            EntityKind::MinecartFurnace => "MINECART_FURNACE",
            EntityKind::MinecartCommand => "MINECART_COMMAND",
            EntityKind::MinecartHopper => "MINECART_HOPPER",
            EntityKind::Arrow => "ARROW",
            EntityKind::SpectralArrow => "SPECTRAL_ARROW",
            EntityKind::Trident => "TRIDENT",
            EntityKind::Snowball => "SNOWBALL",
            EntityKind::Egg => "EGG",
            EntityKind::Fireball => "FIREBALL",
            EntityKind::SmallFireball => "SMALL_FIREBALL",
            EntityKind::LightningStrike => "LIGHTNING",
        }
    }

    /// Type families this kind belongs to, most specific first.
    ///
    /// Protected-entity lists in the settings may name either a family
    /// (`Animals`) or a single type (`Villager`).
    pub fn categories(self) -> &'static [&'static str] {
        match self {
            EntityKind::Player => &["Player", "HumanEntity", "LivingEntity"],
            EntityKind::Wolf => &["Wolf", "Tameable", "Animals", "LivingEntity"],
            EntityKind::Cat => &["Cat", "Tameable", "Animals", "LivingEntity"],
            EntityKind::Parrot => &["Parrot", "Tameable", "Animals", "LivingEntity"],
            EntityKind::Horse => &["Horse", "Tameable", "Animals", "LivingEntity"],
            EntityKind::Axolotl => &["Axolotl", "Animals", "LivingEntity"],
            EntityKind::Cow => &["Cow", "Animals", "LivingEntity"],
            EntityKind::Pig => &["Pig", "Animals", "LivingEntity"],
            EntityKind::Chicken => &["Chicken", "Animals", "LivingEntity"],
            EntityKind::Sheep => &["Sheep", "Animals", "LivingEntity"],
            EntityKind::Mooshroom => &["MushroomCow", "Cow", "Animals", "LivingEntity"],
            EntityKind::Squid => &["Squid", "WaterMob", "LivingEntity"],
            EntityKind::GlowSquid => &["GlowSquid", "Squid", "WaterMob", "LivingEntity"],
            EntityKind::Cod => &["Cod", "Fish", "WaterMob", "LivingEntity"],
            EntityKind::Salmon => &["Salmon", "Fish", "WaterMob", "LivingEntity"],
            EntityKind::Villager => &["Villager", "AbstractVillager", "NPC", "LivingEntity"],
            EntityKind::WanderingTrader => {
                &["WanderingTrader", "AbstractVillager", "NPC", "LivingEntity"]
            }
            EntityKind::SnowGolem => &["Snowman", "Golem", "LivingEntity"],
            EntityKind::IronGolem => &["IronGolem", "Golem", "LivingEntity"],
            EntityKind::Zombie => &["Zombie", "Monster", "LivingEntity"],
            EntityKind::Skeleton => &["Skeleton", "Monster", "LivingEntity"],
            EntityKind::Creeper => &["Creeper", "Monster", "LivingEntity"],
            EntityKind::Spider => &["Spider", "Monster", "LivingEntity"],
            EntityKind::ArmorStand => &["ArmorStand", "LivingEntity"],
            EntityKind::ItemFrame => &["ItemFrame", "Hanging"],
            EntityKind::Painting => &["Painting", "Hanging"],
            EntityKind::EnderCrystal => &["EnderCrystal"],
            EntityKind::Minecart
            | EntityKind::MinecartChest
            | EntityKind::MinecartFurnace
            | EntityKind::MinecartCommand
            | EntityKind::MinecartHopper => &["Minecart", "Vehicle"],
            EntityKind::Arrow => &["Arrow", "AbstractArrow", "Projectile"],
            EntityKind::SpectralArrow => &["SpectralArrow", "AbstractArrow", "Projectile"],
            EntityKind::Trident => &["Trident", "AbstractArrow", "Projectile"],
            EntityKind::Snowball => &["Snowball", "ThrowableProjectile", "Projectile"],
            EntityKind::Egg => &["Egg", "ThrowableProjectile", "Projectile"],
            EntityKind::Fireball => &["Fireball", "Projectile"],
            EntityKind::SmallFireball => &["SmallFireball", "Fireball", "Projectile"],
            EntityKind::LightningStrike => &["LightningStrike"],
        }
    }

    /// Whether `pattern` names this kind or one of its families.
    /// Comparison ignores ASCII case.
    pub fn matches(self, pattern: &str) -> bool {
        let pattern = pattern.trim();
        self.name().eq_ignore_ascii_case(pattern)
            || self
                .categories()
                .iter()
                .any(|c| c.eq_ignore_ascii_case(pattern))
    }

    pub fn matches_any<S: AsRef<str>>(self, patterns: &[S]) -> bool {
        patterns.iter().any(|p| self.matches(p.as_ref()))
    }

    pub fn is_projectile(self) -> bool {
        matches!(
            self,
            EntityKind::Arrow
                | EntityKind::SpectralArrow
                | EntityKind::Trident
                | EntityKind::Snowball
                | EntityKind::Egg
                | EntityKind::Fireball
                | EntityKind::SmallFireball
        )
    }

    /// Block material standing in for this entity in destroy checks.
    ///
    /// Only the placeable objects players build with are mapped; every other
    /// kind returns `None` and is not destroy-checked on that basis.
    pub fn placed_material(self) -> Option<Material> {
        match self {
            EntityKind::ItemFrame => Some(Material::ItemFrame),
            EntityKind::Painting => Some(Material::Painting),
            EntityKind::ArmorStand => Some(Material::ArmorStand),
            EntityKind::EnderCrystal => Some(Material::EndCrystal),
            EntityKind::Minecart => Some(Material::Minecart),
            EntityKind::MinecartChest => Some(Material::ChestMinecart),
            EntityKind::MinecartFurnace => Some(Material::FurnaceMinecart),
            EntityKind::MinecartCommand => Some(Material::CommandBlockMinecart),
            EntityKind::MinecartHopper => Some(Material::HopperMinecart),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Material passed to the destroy-permission oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Material {
    Dirt,
    Wheat,
    ItemFrame,
    Painting,
    ArmorStand,
    EndCrystal,
    Minecart,
    ChestMinecart,
    FurnaceMinecart,
    CommandBlockMinecart,
    HopperMinecart,
}

/// Where a projectile came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shooter {
    Entity(Box<Entity>),
    /// Fired by a block such as a dispenser.
    Block { location: Location },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub location: Location,
    /// Account name; set for players only.
    #[serde(default)]
    pub player: Option<PlayerName>,
    /// Entity that tamed this one.
    #[serde(default)]
    pub owner: Option<EntityId>,
    #[serde(default)]
    pub shooter: Option<Shooter>,
}

impl Entity {
    pub fn new(id: u64, kind: EntityKind, location: Location) -> Self {
        Self {
            id: EntityId(id),
            kind,
            location,
            player: None,
            owner: None,
            shooter: None,
        }
    }

    pub fn player(id: u64, name: &str, location: Location) -> Self {
        Self {
            player: Some(name.to_string()),
            ..Self::new(id, EntityKind::Player, location)
        }
    }

    pub fn tamed_by(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn shot_by(mut self, shooter: Shooter) -> Self {
        self.shooter = Some(shooter);
        self
    }

    pub fn is_tamed(&self) -> bool {
        self.owner.is_some()
    }
}

/// An entity classified for arbitration.
#[derive(Debug, Clone, Copy)]
pub enum Actor<'a> {
    Player { entity: &'a Entity, name: &'a str },
    NonPlayer(&'a Entity),
}

impl<'a> Actor<'a> {
    pub fn of(entity: &'a Entity) -> Self {
        match (entity.kind, entity.player.as_deref()) {
            (EntityKind::Player, Some(name)) => Actor::Player { entity, name },
            _ => Actor::NonPlayer(entity),
        }
    }

    pub fn entity(&self) -> &'a Entity {
        match self {
            Actor::Player { entity, .. } => entity,
            Actor::NonPlayer(entity) => entity,
        }
    }
}

/// Why the host is applying damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageCause {
    #[default]
    EntityAttack,
    EntitySweepAttack,
    Projectile,
    Lightning,
    Magic,
    Explosion,
    Thorns,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_type_and_family() {
        assert!(EntityKind::Cow.matches("Animals"));
        assert!(EntityKind::Cow.matches("cow"));
        assert!(EntityKind::Squid.matches("WaterMob"));
        assert!(EntityKind::WanderingTrader.matches("NPC"));
        assert!(EntityKind::SnowGolem.matches("Snowman"));
        assert!(!EntityKind::Zombie.matches("Animals"));
        assert!(!EntityKind::Villager.matches("Animal"));
    }

    #[test]
    fn test_placed_materials() {
        assert_eq!(EntityKind::Painting.placed_material(), Some(Material::Painting));
        assert_eq!(
            EntityKind::MinecartHopper.placed_material(),
            Some(Material::HopperMinecart)
        );
        assert_eq!(EntityKind::Cow.placed_material(), None);
    }

    #[test]
    fn test_actor_requires_player_name() {
        let loc = Location::new("overworld", 0.0, 64.0, 0.0);
        let named = Entity::player(1, "alice", loc.clone());
        assert!(matches!(Actor::of(&named), Actor::Player { name: "alice", .. }));
        assert_eq!(Actor::of(&named).entity().id, EntityId(1));

        // A player-kind entity without an account cannot be attributed
        let anonymous = Entity::new(2, EntityKind::Player, loc);
        assert!(matches!(Actor::of(&anonymous), Actor::NonPlayer(_)));
    }

    #[test]
    fn test_entity_json_shape() {
        let json = r#"{
            "id": 7,
            "kind": "ARROW",
            "location": {"world": "overworld", "x": 1.0, "y": 2.0, "z": 3.0},
            "shooter": {"block": {"location": {"world": "overworld", "x": 0.0, "y": 0.0, "z": 0.0}}}
        }"#;
        let arrow: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(arrow.kind, EntityKind::Arrow);
        assert!(matches!(arrow.shooter, Some(Shooter::Block { .. })));
        assert!(arrow.player.is_none());
    }
}
