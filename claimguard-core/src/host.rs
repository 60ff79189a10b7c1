//! Services the host server provides to the engine.
//!
//! The engine only calls these; how they are backed (permission caches,
//! entity handles, chat) is up to the host.

use crate::entity::{EntityId, Material};
use crate::state::Location;

/// Answers whether a player may break a block of `material` at `location`.
pub trait DestroyAuthority: Send + Sync {
    fn can_destroy(&self, player: &str, location: &Location, material: Material) -> bool;
}

/// Writes back into the live game world. Fire-and-forget.
pub trait EntityEffects: Send + Sync {
    /// Drop the entity's current attack target.
    fn clear_target(&self, entity: EntityId);

    /// Clear the entity's angry state.
    fn calm(&self, entity: EntityId);
}

/// Delivers chat-style error messages to players. Fire-and-forget.
pub trait MessageSink: Send + Sync {
    fn send_error(&self, player: &str, message: &str);
}

/// Host without side effects: everyone may destroy, effects and messages are
/// dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl DestroyAuthority for NullHost {
    fn can_destroy(&self, _player: &str, _location: &Location, _material: Material) -> bool {
        true
    }
}

impl EntityEffects for NullHost {
    fn clear_target(&self, _entity: EntityId) {}

    fn calm(&self, _entity: EntityId) {}
}

impl MessageSink for NullHost {
    fn send_error(&self, _player: &str, _message: &str) {}
}
