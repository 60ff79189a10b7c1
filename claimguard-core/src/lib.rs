//! # Claimguard Core
//!
//! Damage arbitration for a land-claim game server: given who hit whom and
//! where, decide whether the server should cancel the damage.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌──────────────┐     ┌────────────────┐
//! │ DamageRequest │────▶│ CombatEngine │────▶│    Verdict     │
//! │ (host event)  │     │  (stateless) │     │ cancel/message │
//! └───────────────┘     └──────┬───────┘     └────────────────┘
//!                              │ reads
//!          ┌───────────────────┼───────────────────┐
//!   ┌──────▼──────┐     ┌──────▼──────┐     ┌──────▼──────┐
//!   │  relations  │     │    zones    │     │    hooks    │
//!   │ (diplomacy) │     │ (PvP rules) │     │ (overrides) │
//!   └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Universe`] | Worlds, towns, nations, residents and claimed zones |
//! | [`UniverseHandle`] | Snapshot access for concurrent readers |
//! | [`CombatEngine`] | `(universe, request) -> verdict` |
//! | [`PvpOverride`] / [`CombatOverride`] | Operator hooks that can flip decisions |
//! | [`DestroyAuthority`], [`EntityEffects`], [`MessageSink`] | Services the host provides |

pub mod config;
pub mod engine;
pub mod entity;
pub mod hooks;
pub mod host;
pub mod relations;
pub mod state;
pub mod testing;
pub mod zones;


pub use config::{CombatMessages, CombatSettings, SettingsError};
pub use engine::{CombatEngine, DamageRequest, Rule, Verdict};
pub use entity::{Actor, DamageCause, Entity, EntityId, EntityKind, Material, Shooter};
pub use hooks::{
    CombatDecision, CombatOverride, HookError, HookRegistry, PlayerCombat, PvpOverride, PvpSubject,
};
pub use host::{DestroyAuthority, EntityEffects, MessageSink, NullHost};
pub use relations::Relationship;
pub use state::{
    ChunkCoord, Location, RegistryError, Stance, Universe, UniverseHandle, WorldSettings, Zone,
    ZoneKind,
};
