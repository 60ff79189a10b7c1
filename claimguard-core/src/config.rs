use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid settings: {0}")]
    Invalid(String),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Server-wide combat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    /// Jailed residents standing in a jail zone can neither deal nor take
    /// player damage.
    pub jail_plots_prevent_pvp: bool,

    /// Entity type names (e.g. `COW`) that only residents with destroy
    /// rights may hurt inside farm zones.
    pub farm_animals: Vec<String>,

    /// Entity types or families (e.g. `Animals`, `Villager`) protected from
    /// players without destroy rights inside any claimed zone.
    pub protected_entity_types: Vec<String>,

    /// Edge length of a claimable zone in blocks.
    pub zone_size: u32,

    pub messages: CombatMessages,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatMessages {
    /// Sent to an attacker whose hit was blocked as friendly fire.
    pub friendly_fire_disabled: String,
}

impl Default for CombatMessages {
    fn default() -> Self {
        Self {
            friendly_fire_disabled: "You cannot harm members of your town, nation or allies."
                .to_string(),
        }
    }
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            jail_plots_prevent_pvp: true,
            farm_animals: ["PIG", "COW", "CHICKEN", "SHEEP", "MOOSHROOM"]
                .into_iter()
                .map(String::from)
                .collect(),
            protected_entity_types: [
                "Animals",
                "WaterMob",
                "NPC",
                "Snowman",
                "ArmorStand",
                "Villager",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            zone_size: 16,
            messages: CombatMessages::default(),
        }
    }
}

impl CombatSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.zone_size == 0 {
            return Err(SettingsError::Invalid("zone_size must be positive".into()));
        }

        if let Some(empty) = self
            .farm_animals
            .iter()
            .chain(&self.protected_entity_types)
            .find(|s| s.trim().is_empty())
        {
            return Err(SettingsError::Invalid(format!(
                "entity type list contains a blank entry ({:?})",
                empty
            )));
        }

        Ok(())
    }
}
