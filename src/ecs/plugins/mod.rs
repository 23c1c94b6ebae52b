pub mod debug;
pub mod network;
pub mod scene;
pub mod sync;

pub use debug::DebugPlugin;
pub use network::{NetworkMode, NetworkPlugin};
pub use scene::ScenePlugin;
pub use sync::SyncPlugin;
