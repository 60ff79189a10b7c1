//! Override hooks for server operators.
//!
//! Two interception points let extensions adjust the engine's decisions
//! without touching stored data:
//!
//! ```text
//! is_pvp(world, zone) ──▶ PvpOverride* ──▶ final PvP flag
//!
//! player vs player ──▶ CombatOverride* ──▶ final (cancelled, message)
//! ```
//!
//! Hooks run in registration order, each seeing the previous hook's output.
//!
//! # Error Handling
//!
//! A hook that returns `Err` or panics is logged and skipped: the value it
//! was given is passed on unchanged. One misbehaving extension never aborts
//! the decision.

use crate::entity::{DamageCause, Entity};
use crate::state::{WorldSettings, Zone};
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("Hook failed: {0}")]
    Failed(String),
    #[error("Hook needs data that is not registered: {0}")]
    Registry(#[from] crate::state::RegistryError),
}

/// What a PvP test is about.
#[derive(Debug, Clone, Copy)]
pub enum PvpSubject<'a> {
    Zone {
        world: &'a WorldSettings,
        zone: &'a Zone,
    },
    Wilderness(&'a WorldSettings),
}

impl PvpSubject<'_> {
    pub fn world(&self) -> &WorldSettings {
        match self {
            PvpSubject::Zone { world, .. } => world,
            PvpSubject::Wilderness(world) => world,
        }
    }
}

/// Outcome of a player-vs-player check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CombatDecision {
    pub cancelled: bool,
    /// Reason shown to the attacker when the hit is cancelled.
    pub message: Option<String>,
}

impl CombatDecision {
    pub fn allow() -> Self {
        Self::default()
    }

    pub fn cancel(message: Option<String>) -> Self {
        Self {
            cancelled: true,
            message,
        }
    }
}

/// Everything known about a player hitting a player.
#[derive(Debug, Clone, Copy)]
pub struct PlayerCombat<'a> {
    pub world: &'a WorldSettings,
    pub attacker: &'a Entity,
    pub attacker_name: &'a str,
    pub attacker_zone: Option<&'a Zone>,
    pub defender: &'a Entity,
    pub defender_name: &'a str,
    pub defender_zone: Option<&'a Zone>,
    pub cause: DamageCause,
}

pub trait PvpOverride: Send + Sync {
    /// Receives the proposed PvP flag and returns the one to use.
    fn test_pvp(&self, subject: &PvpSubject<'_>, pvp: bool) -> Result<bool, HookError>;

    /// Human-readable name for logging/debugging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

pub trait CombatOverride: Send + Sync {
    /// Receives the proposed decision and returns the one to use.
    fn on_player_damage(
        &self,
        combat: &PlayerCombat<'_>,
        proposed: CombatDecision,
    ) -> Result<CombatDecision, HookError>;

    /// Human-readable name for logging/debugging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> PvpOverride for F
where
    F: Fn(&PvpSubject<'_>, bool) -> Result<bool, HookError> + Send + Sync,
{
    fn test_pvp(&self, subject: &PvpSubject<'_>, pvp: bool) -> Result<bool, HookError> {
        self(subject, pvp)
    }
}

impl<F> CombatOverride for F
where
    F: Fn(&PlayerCombat<'_>, CombatDecision) -> Result<CombatDecision, HookError> + Send + Sync,
{
    fn on_player_damage(
        &self,
        combat: &PlayerCombat<'_>,
        proposed: CombatDecision,
    ) -> Result<CombatDecision, HookError> {
        self(combat, proposed)
    }
}

/// Registered hooks for both interception points.
#[derive(Default)]
pub struct HookRegistry {
    pvp: Vec<Box<dyn PvpOverride>>,
    combat: Vec<Box<dyn CombatOverride>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_pvp(&mut self, hook: Box<dyn PvpOverride>) {
        log::info!("Registered PvP override: {}", hook.name());
        self.pvp.push(hook);
    }

    pub fn register_combat(&mut self, hook: Box<dyn CombatOverride>) {
        log::info!("Registered combat override: {}", hook.name());
        self.combat.push(hook);
    }

    /// Run `pvp` through every PvP override.
    pub fn test_pvp(&self, subject: &PvpSubject<'_>, pvp: bool) -> bool {
        self.pvp.iter().fold(pvp, |current, hook| {
            let result = catch_unwind(AssertUnwindSafe(|| hook.test_pvp(subject, current)));
            isolate(hook.name(), result).unwrap_or(current)
        })
    }

    /// Run `proposed` through every combat override.
    pub fn decide_combat(
        &self,
        combat: &PlayerCombat<'_>,
        proposed: CombatDecision,
    ) -> CombatDecision {
        self.combat.iter().fold(proposed, |current, hook| {
            let input = current.clone();
            let result = catch_unwind(AssertUnwindSafe(|| hook.on_player_damage(combat, input)));
            isolate(hook.name(), result).unwrap_or(current)
        })
    }

    /// Number of registered hooks across both points.
    pub fn len(&self) -> usize {
        self.pvp.len() + self.combat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pvp.is_empty() && self.combat.is_empty()
    }
}

fn isolate<T>(name: &str, result: std::thread::Result<Result<T, HookError>>) -> Option<T> {
    match result {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            log::warn!("Override '{}' error: {}", name, e);
            None
        }
        Err(_) => {
            log::warn!("Override '{}' panicked", name);
            None
        }
    }
}
