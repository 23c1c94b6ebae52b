use glam::Vec3;

use crate::ecs::core::{CellId, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Player,
    OtherPlayer,
    Bomb,
    Chest,
    Obstacle,
}

/// A visual requested from the scene layer, with the data it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    LocalPlayer { name: String },
    OtherPlayer { id: EntityId, name: String },
    Bomb { id: EntityId, fuse: f32 },
    Chest { id: EntityId },
    Obstacle { cell: CellId, code: i64 },
}

impl Visual {
    pub fn kind(&self) -> VisualKind {
        match self {
            Visual::LocalPlayer { .. } => VisualKind::Player,
            Visual::OtherPlayer { .. } => VisualKind::OtherPlayer,
            Visual::Bomb { .. } => VisualKind::Bomb,
            Visual::Chest { .. } => VisualKind::Chest,
            Visual::Obstacle { .. } => VisualKind::Obstacle,
        }
    }
}

/// Side effects the reconciliation engine asks of whatever renders the game.
pub trait SceneLayer {
    type Handle: Copy;

    fn instantiate(&mut self, visual: Visual, position: Vec3) -> Self::Handle;
    fn destroy(&mut self, handle: Self::Handle, delay_ms: u64);
    fn animate_scale_to_zero(&mut self, handle: Self::Handle, duration_ms: u64);
    /// Stops the local simulation from reporting further pickups of `handle`.
    fn disable_pickup(&mut self, handle: Self::Handle);
}
