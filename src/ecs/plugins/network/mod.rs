pub mod codec;
pub mod components;
pub mod error;
pub mod plugin;
pub mod udp;

pub use components::*;
pub use error::*;
pub use plugin::{NetworkMode, NetworkPlugin};
