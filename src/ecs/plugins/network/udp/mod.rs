pub mod plugin;
pub mod transport;

pub use plugin::UdpNetworkPlugin;
pub use transport::RenetTransport;
