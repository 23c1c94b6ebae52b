use bevy::prelude::*;

use crate::ecs::core::EntityId;
use crate::ecs::plugins::sync::engine::ReconciliationEngine;

#[derive(Resource, Default, Deref, DerefMut)]
pub struct SyncEngine(pub ReconciliationEngine<Entity>);

/// Raised by the local simulation when the player touches a chest visual.
#[derive(Event, Debug, Clone, Copy)]
pub struct ChestPickupEvent {
    pub chest: Entity,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SessionSyncedEvent {
    pub player_id: EntityId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SessionEndedEvent;
