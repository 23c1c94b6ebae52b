/*!
# Reconciliation Engine

Routes decoded server messages into the map store and entity registry and
asks the scene layer for the matching visuals.

Phases: `Disconnected -> AwaitingInitial -> Synced`. The initial request
moves the engine to `AwaitingInitial`; the first snapshot moves it to
`Synced`, after which every state update is applied. Nothing here is fatal:
rejected input is counted in [`SyncDiagnostics`] so a stalled or diverging
session stays visible.
*/

use bevy::log::{debug, info, warn};
use glam::Vec3;
use std::collections::HashMap;
use std::time::Duration;

use crate::ecs::core::{CellId, EntityId, LocalPlayerState, SessionContext};
use crate::ecs::plugins::network::codec::{
    decode, encode, ChestPickupNotification, InitialRequest, InitialSnapshot, Message, OutboundMessage, StateUpdate,
};
use crate::ecs::plugins::network::{ProtocolViolation, SyncError, Transport, TransportFailure};
use crate::ecs::plugins::sync::broadcaster::UpdateBroadcaster;
use crate::ecs::plugins::sync::map_store::MapStateStore;
use crate::ecs::plugins::sync::registry::EntityRegistry;
use crate::ecs::plugins::sync::scene::{SceneLayer, Visual};

/// Obstacle fade and destroy delay.
pub const OBSTACLE_FADE_MS: u64 = 500;
/// Chest fade and destroy delay after a local pickup.
pub const CHEST_FADE_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Disconnected,
    AwaitingInitial,
    Synced,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncDiagnostics {
    pub decode_errors: u64,
    pub protocol_violations: u64,
    pub dropped_before_sync: u64,
    pub transport_failures: u64,
    pub version_overflows: u64,
    pub updates_applied: u64,
    pub last_error: Option<String>,
}

/// What a single inbound message changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    pub synced: bool,
    pub obstacles_created: usize,
    pub obstacles_removed: usize,
    pub bombs_created: usize,
    pub chests_created: usize,
    pub players_created: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum VisualKey {
    LocalPlayer,
    Obstacle(CellId),
    Chest(EntityId),
    Player(EntityId),
}

pub struct ReconciliationEngine<H> {
    phase: SyncPhase,
    player_name: String,
    session: Option<SessionContext>,
    map: MapStateStore,
    registry: EntityRegistry,
    visuals: HashMap<VisualKey, H>,
    broadcaster: UpdateBroadcaster,
    diagnostics: SyncDiagnostics,
}

impl<H> Default for ReconciliationEngine<H> {
    fn default() -> Self {
        Self {
            phase: SyncPhase::Disconnected,
            player_name: String::new(),
            session: None,
            map: MapStateStore::default(),
            registry: EntityRegistry::default(),
            visuals: HashMap::new(),
            broadcaster: UpdateBroadcaster::default(),
            diagnostics: SyncDiagnostics::default(),
        }
    }
}

impl<H: Copy> ReconciliationEngine<H> {
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    pub fn map(&self) -> &MapStateStore {
        &self.map
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn broadcaster(&self) -> &UpdateBroadcaster {
        &self.broadcaster
    }

    pub fn diagnostics(&self) -> &SyncDiagnostics {
        &self.diagnostics
    }

    pub fn local_player_handle(&self) -> Option<H> {
        self.visuals.get(&VisualKey::LocalPlayer).copied()
    }

    pub fn chest_handle(&self, id: EntityId) -> Option<H> {
        self.visuals.get(&VisualKey::Chest(id)).copied()
    }

    /// Sends the initial request and starts waiting for the snapshot.
    pub fn begin_session(&mut self, player_name: &str, transport: &dyn Transport) -> Result<(), SyncError> {
        if self.phase != SyncPhase::Disconnected {
            return Err(self.violation(ProtocolViolation::SessionActive));
        }

        let request = OutboundMessage::InitialRequest(InitialRequest {
            player_name: player_name.to_string(),
        });
        transport
            .send(encode(&request), request.reliability())
            .map_err(|e| self.transport_error(e))?;

        self.player_name = player_name.to_string();
        self.phase = SyncPhase::AwaitingInitial;
        info!("Requested initial snapshot as '{}'", player_name);
        Ok(())
    }

    pub fn handle_payload<S>(&mut self, bytes: &[u8], scene: &mut S) -> Result<Applied, SyncError>
    where
        S: SceneLayer<Handle = H>,
    {
        let message = decode(bytes).inspect_err(|e| {
            self.diagnostics.decode_errors += 1;
            self.diagnostics.last_error = Some(e.to_string());
        })?;
        self.handle_message(message, scene)
    }

    pub fn handle_message<S>(&mut self, message: Message, scene: &mut S) -> Result<Applied, SyncError>
    where
        S: SceneLayer<Handle = H>,
    {
        match (self.phase, message) {
            (SyncPhase::AwaitingInitial, Message::Initial(snapshot)) => Ok(self.apply_initial(snapshot, scene)),
            (SyncPhase::Synced, Message::Initial(_)) => Err(self.violation(ProtocolViolation::DuplicateInitial)),
            (SyncPhase::Disconnected, Message::Initial(_)) => {
                Err(self.violation(ProtocolViolation::UnsolicitedInitial))
            }
            (SyncPhase::Synced, Message::StateUpdate(update)) => self.apply_update(update, scene),
            (_, Message::StateUpdate(_)) => {
                warn!("Dropping state update received before the initial snapshot");
                self.diagnostics.dropped_before_sync += 1;
                Err(ProtocolViolation::UpdateBeforeSnapshot.into())
            }
        }
    }

    fn apply_initial<S>(&mut self, snapshot: InitialSnapshot, scene: &mut S) -> Applied
    where
        S: SceneLayer<Handle = H>,
    {
        let InitialSnapshot {
            width,
            height,
            map_version,
            spawn_position,
            player_id,
            map_grid,
        } = snapshot;

        self.session = Some(SessionContext::new(player_id, map_version, width, height));
        self.map.initialize(map_grid, map_version);
        self.registry.set_local_player(player_id);

        let player = scene.instantiate(
            Visual::LocalPlayer {
                name: self.player_name.clone(),
            },
            spawn_position,
        );
        self.visuals.insert(VisualKey::LocalPlayer, player);

        let mut applied = Applied {
            synced: true,
            ..Applied::default()
        };
        for obstacle in self.map.obstacle_cells() {
            let handle = scene.instantiate(
                Visual::Obstacle {
                    cell: obstacle.cell,
                    code: obstacle.code,
                },
                Vec3::new(obstacle.column as f32, obstacle.row as f32, 0.0),
            );
            self.visuals.insert(VisualKey::Obstacle(obstacle.cell), handle);
            applied.obstacles_created += 1;
        }

        self.broadcaster.start();
        self.phase = SyncPhase::Synced;
        info!(
            "Synced as player {} on a {}x{} map at version {} ({} obstacles)",
            player_id, width, height, map_version, applied.obstacles_created
        );
        applied
    }

    fn apply_update<S>(&mut self, update: StateUpdate, scene: &mut S) -> Result<Applied, SyncError>
    where
        S: SceneLayer<Handle = H>,
    {
        let Some(session) = self.session.as_mut() else {
            return Err(self.violation(ProtocolViolation::NotSynced));
        };
        let mut applied = Applied::default();

        session.remaining_time_seconds = update.timer;

        let batches = self.map.apply_version_batches(&update.map_version_batches);
        session.map_version = self.map.version();
        if batches.saturated {
            warn!("Map version saturated at {}", session.map_version);
            self.diagnostics.version_overflows += 1;
            self.diagnostics.last_error = Some("map version overflow".to_string());
        }
        for cell in batches.removed {
            if let Some(handle) = self.visuals.remove(&VisualKey::Obstacle(cell)) {
                scene.animate_scale_to_zero(handle, OBSTACLE_FADE_MS);
                scene.destroy(handle, OBSTACLE_FADE_MS);
                applied.obstacles_removed += 1;
            }
        }

        // The scene layer owns a bomb visual once created and removes it
        // when the fuse runs out, so its handle is not kept.
        for bomb in update.bombs {
            if self.registry.upsert_bomb(bomb.id, bomb.position, bomb.fuse).created {
                scene.instantiate(Visual::Bomb { id: bomb.id, fuse: bomb.fuse }, bomb.position);
                applied.bombs_created += 1;
            }
        }

        for chest in update.chests {
            if self.registry.upsert_chest(chest.id, chest.position).created {
                let handle = scene.instantiate(Visual::Chest { id: chest.id }, chest.position);
                self.visuals.insert(VisualKey::Chest(chest.id), handle);
                applied.chests_created += 1;
            }
        }

        for player in update.players {
            if player.id == session.local_player_id {
                continue;
            }
            if self.registry.upsert_player(player.id, &player.name).created {
                let handle = scene.instantiate(
                    Visual::OtherPlayer {
                        id: player.id,
                        name: player.name,
                    },
                    Vec3::ZERO,
                );
                self.visuals.insert(VisualKey::Player(player.id), handle);
                applied.players_created += 1;
            }
        }

        self.diagnostics.updates_applied += 1;
        debug!("Applied update {:?} (map version {})", applied, session.map_version);
        Ok(applied)
    }

    /// Local pickup of a chest: the chest stops being pickable, fades out,
    /// leaves the registry, and the server is told reliably. A chest that is
    /// no longer registered yields `Ok(None)` so a pickup is reported once.
    pub fn pickup_chest<S>(
        &mut self,
        chest_id: EntityId,
        scene: &mut S,
        transport: &dyn Transport,
    ) -> Result<Option<ChestPickupNotification>, SyncError>
    where
        S: SceneLayer<Handle = H>,
    {
        let Some(player_id) = self.session.as_ref().map(|s| s.local_player_id) else {
            return Err(self.violation(ProtocolViolation::NotSynced));
        };
        if self.registry.chest(chest_id).is_none() {
            debug!("Ignoring pickup of unknown chest {}", chest_id);
            return Ok(None);
        }

        if let Some(handle) = self.visuals.remove(&VisualKey::Chest(chest_id)) {
            scene.disable_pickup(handle);
            scene.animate_scale_to_zero(handle, CHEST_FADE_MS);
            scene.destroy(handle, CHEST_FADE_MS);
        }
        self.registry.remove_chest(chest_id);

        let notification = ChestPickupNotification { chest_id, player_id };
        let message = OutboundMessage::ChestPickup(notification);
        transport
            .send(encode(&message), message.reliability())
            .map_err(|e| self.transport_error(e))?;

        info!("Picked chest {}", chest_id);
        Ok(Some(notification))
    }

    /// Drives the update broadcaster; a no-op until synced.
    pub fn broadcast(
        &mut self,
        delta: Duration,
        sample: impl FnOnce() -> Option<LocalPlayerState>,
        transport: &dyn Transport,
    ) -> Result<bool, SyncError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(false);
        };
        match self.broadcaster.tick(delta, session, sample, transport) {
            Ok(sent) => Ok(sent),
            Err(e) => Err(self.transport_error(e)),
        }
    }

    pub fn record_transport_failure(&mut self, reason: &str) {
        warn!("Transport failure: {}", reason);
        self.diagnostics.transport_failures += 1;
        self.diagnostics.last_error = Some(reason.to_string());
    }

    /// Tears the session down and returns the handles it still tracked.
    pub fn end_session(&mut self) -> Vec<H> {
        self.broadcaster.stop();
        self.session = None;
        self.map.clear();
        self.registry.clear();
        self.phase = SyncPhase::Disconnected;
        info!("Session ended");
        self.visuals.drain().map(|(_, handle)| handle).collect()
    }

    fn violation(&mut self, violation: ProtocolViolation) -> SyncError {
        warn!("Protocol violation: {}", violation);
        self.diagnostics.protocol_violations += 1;
        self.diagnostics.last_error = Some(violation.to_string());
        violation.into()
    }

    fn transport_error(&mut self, failure: TransportFailure) -> SyncError {
        self.record_transport_failure(&failure.to_string());
        failure.into()
    }
}
