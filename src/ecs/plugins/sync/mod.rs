pub mod broadcaster;
pub mod components;
pub mod engine;
pub mod map_store;
pub mod plugin;
pub mod registry;
pub mod scene;
pub mod systems;

#[cfg(test)]
pub mod test_support;

pub use components::*;
pub use engine::{ReconciliationEngine, SyncDiagnostics, SyncPhase};
pub use plugin::SyncPlugin;
