use bevy::prelude::*;
use crate::ecs::plugins::sync::components::*;
use crate::ecs::plugins::sync::systems::*;

pub struct SyncPlugin;

impl Plugin for SyncPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SyncEngine>()
            .add_event::<ChestPickupEvent>()
            .add_event::<SessionSyncedEvent>()
            .add_event::<SessionEndedEvent>()
            .add_systems(Startup, begin_session_system)
            .add_systems(Update, (
                process_inbound_system,
                chest_pickup_system,
                broadcast_system,
            ).chain());
    }
}
