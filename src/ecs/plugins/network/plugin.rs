use bevy::prelude::*;
use crate::ecs::plugins::network::components::inbound_channel;
use crate::ecs::plugins::network::udp::UdpNetworkPlugin;

// ============================================================================
// PLUGIN DEFINITION
// ============================================================================

pub enum NetworkMode {
    Udp,
    /// Only the hand-off queue; a transport is installed by the caller.
    Detached,
}

pub struct NetworkPlugin {
    pub mode: NetworkMode,
}

impl Default for NetworkPlugin {
    fn default() -> Self {
        Self { mode: NetworkMode::Udp }
    }
}

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        let (sender, queue) = inbound_channel();
        app.insert_resource(sender).insert_resource(queue);

        if let NetworkMode::Udp = self.mode {
            app.add_plugins(UdpNetworkPlugin);
        }
    }
}
