/*!
# Debug Systems

Periodic logging of the sync state so a stalled or diverging session can be
diagnosed from the log alone.
*/

use bevy::prelude::*;
use crate::ecs::core::ClientConfig;
use crate::ecs::plugins::scene::SceneVisual;
use crate::ecs::plugins::sync::{SyncDiagnostics, SyncEngine, SyncPhase};

/// How often to print debug information (in seconds)
const DEBUG_PRINT_INTERVAL: f32 = 5.0;

#[derive(Resource, Default)]
pub struct DebugTimer {
    last_print_time: f32,
    awaiting_since: Option<f32>,
    stall_reported: bool,
}

impl DebugTimer {
    pub fn stall_reported(&self) -> bool {
        self.stall_reported
    }
}

/// Warns once when the snapshot has not arrived within the configured time.
pub fn snapshot_stall_system(
    engine: Res<SyncEngine>,
    config: Res<ClientConfig>,
    time: Res<Time>,
    mut debug_timer: ResMut<DebugTimer>,
) {
    let now = time.elapsed_secs();

    if engine.phase() != SyncPhase::AwaitingInitial {
        debug_timer.awaiting_since = None;
        debug_timer.stall_reported = false;
        return;
    }

    let since = *debug_timer.awaiting_since.get_or_insert(now);
    if !debug_timer.stall_reported && now - since >= config.snapshot_warn_after.as_secs_f32() {
        warn!(
            "Still waiting for the initial snapshot after {:.1}s ({} updates dropped)",
            now - since,
            engine.diagnostics().dropped_before_sync
        );
        debug_timer.stall_reported = true;
    }
}

pub fn debug_system(
    engine: Res<SyncEngine>,
    visuals: Query<&SceneVisual>,
    time: Res<Time>,
    mut debug_timer: ResMut<DebugTimer>,
) {
    let current_time = time.elapsed_secs();
    if current_time - debug_timer.last_print_time < DEBUG_PRINT_INTERVAL {
        return;
    }
    debug_timer.last_print_time = current_time;

    let diagnostics = engine.diagnostics();
    match engine.session() {
        Some(session) => info!(
            "Sync {:?}: player {} map v{} {}s left | bombs {} chests {} players {} | visuals {} | sent {}",
            engine.phase(),
            session.local_player_id,
            session.map_version,
            session.remaining_time_seconds,
            engine.registry().bomb_count(),
            engine.registry().chest_count(),
            engine.registry().player_count(),
            visuals.iter().count(),
            engine.broadcaster().sent(),
        ),
        None => info!("Sync {:?}: no session", engine.phase()),
    }

    if *diagnostics != SyncDiagnostics::default() {
        info!(
            "Sync diagnostics: applied {} decode errors {} violations {} dropped {} transport failures {} version overflows {} last error {:?}",
            diagnostics.updates_applied,
            diagnostics.decode_errors,
            diagnostics.protocol_violations,
            diagnostics.dropped_before_sync,
            diagnostics.transport_failures,
            diagnostics.version_overflows,
            diagnostics.last_error,
        );
    }
}
