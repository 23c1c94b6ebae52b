pub mod components;
pub mod plugin;
pub mod resources;

pub use components::*;
pub use plugin::CorePlugin;
pub use resources::*;
