use bevy::prelude::*;

use crate::ecs::core::{ClientConfig, LocalPlayerState};
use crate::ecs::plugins::network::{InboundQueue, SyncError, TransportEvent, TransportHandle};
use crate::ecs::plugins::scene::{to_wire_vec, CommandScene, LocalMotion, LocalPlayer, Pickable, SceneVisual};
use crate::ecs::plugins::sync::components::*;
use crate::ecs::plugins::sync::engine::SyncPhase;
use crate::ecs::plugins::sync::scene::Visual;

pub fn begin_session_system(
    mut engine: ResMut<SyncEngine>,
    config: Res<ClientConfig>,
    transport: Option<Res<TransportHandle>>,
) {
    let Some(transport) = transport else {
        warn!("No transport available, staying disconnected");
        return;
    };
    if let Err(e) = engine.begin_session(&config.player_name, transport.0.as_ref()) {
        error!("Could not request initial snapshot: {}", e);
    }
}

/// Drains the hand-off queue in arrival order. This is the only place inbound
/// traffic touches sync state.
pub fn process_inbound_system(
    mut commands: Commands,
    queue: Res<InboundQueue>,
    mut engine: ResMut<SyncEngine>,
    mut synced_events: EventWriter<SessionSyncedEvent>,
    mut ended_events: EventWriter<SessionEndedEvent>,
) {
    let mut scene = CommandScene::new(&mut commands);

    for event in queue.0.try_iter() {
        match event {
            TransportEvent::Datagram(bytes) => match engine.handle_payload(&bytes, &mut scene) {
                Ok(applied) if applied.synced => {
                    if let Some(session) = engine.session() {
                        synced_events.send(SessionSyncedEvent { player_id: session.local_player_id });
                    }
                }
                Ok(_) => {}
                Err(SyncError::Decode(e)) => debug!("Dropping undecodable message: {}", e),
                Err(e) => debug!("Dropping message: {}", e),
            },
            TransportEvent::Failed(reason) => engine.record_transport_failure(&reason),
            TransportEvent::Closed => {
                if engine.phase() != SyncPhase::Disconnected {
                    let released = engine.end_session();
                    debug!("Released {} tracked visuals", released.len());
                    ended_events.send(SessionEndedEvent);
                }
            }
        }
    }
}

pub fn chest_pickup_system(
    mut commands: Commands,
    mut pickups: EventReader<ChestPickupEvent>,
    chests: Query<&SceneVisual, With<Pickable>>,
    mut engine: ResMut<SyncEngine>,
    transport: Option<Res<TransportHandle>>,
) {
    let Some(transport) = transport else {
        pickups.clear();
        return;
    };
    let mut scene = CommandScene::new(&mut commands);

    for event in pickups.read() {
        let Ok(SceneVisual(Visual::Chest { id })) = chests.get(event.chest) else {
            continue;
        };
        if let Err(e) = engine.pickup_chest(*id, &mut scene, transport.0.as_ref()) {
            warn!("Chest {} pickup failed: {}", id, e);
        }
    }
}

pub fn broadcast_system(
    time: Res<Time>,
    mut engine: ResMut<SyncEngine>,
    transport: Option<Res<TransportHandle>>,
    local_player: Query<&LocalMotion, With<LocalPlayer>>,
) {
    let Some(transport) = transport else {
        return;
    };
    let sample = || {
        local_player.get_single().ok().map(|motion| LocalPlayerState {
            position: to_wire_vec(motion.position),
            velocity: to_wire_vec(motion.velocity),
        })
    };
    if let Err(e) = engine.broadcast(time.delta(), sample, transport.0.as_ref()) {
        debug!("Update broadcast failed: {}", e);
    }
}
