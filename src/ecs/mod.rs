pub mod core;
pub mod plugins;

pub use core::CorePlugin;
pub use plugins::{DebugPlugin, NetworkPlugin, ScenePlugin, SyncPlugin};
