use glam::Vec3;

/// Server-assigned identifier for players, bombs and chests.
pub type EntityId = i64;

/// Row-major index of a map cell (`row * columns + column`).
pub type CellId = i64;

/// Motion state of the local player as sampled from the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalPlayerState {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Process-wide state for one connected session.
///
/// Created when the initial snapshot arrives and dropped on disconnect.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub local_player_id: EntityId,
    pub map_version: i64,
    pub remaining_time_seconds: i64,
    pub width: i64,
    pub height: i64,
}

impl SessionContext {
    pub fn new(local_player_id: EntityId, map_version: i64, width: i64, height: i64) -> Self {
        Self {
            local_player_id,
            map_version,
            remaining_time_seconds: 0,
            width,
            height,
        }
    }
}
