use bevy::prelude::*;
use bevy_renet::{
    netcode::{NetcodeClientPlugin, NetcodeTransportError},
    renet::RenetClient,
    RenetClientPlugin, RenetReceive, RenetSend,
};
use crate::ecs::core::ClientConfig;
use crate::ecs::plugins::network::components::*;
use crate::ecs::plugins::network::udp::transport::*;

/// Last connection state reported to the inbound queue.
#[derive(Resource, Default)]
pub struct ConnectionStatus {
    connected: bool,
    closed: bool,
}

pub struct UdpNetworkPlugin;

impl Plugin for UdpNetworkPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RenetClientPlugin)
            .add_plugins(NetcodeClientPlugin)
            .init_resource::<ConnectionStatus>()
            .add_systems(PreStartup, connect_udp_transport_system)
            .add_systems(
                PreUpdate,
                (receive_messages_system, connection_status_system)
                    .chain()
                    .after(RenetReceive),
            )
            .add_systems(PostUpdate, flush_outbound_system.before(RenetSend));
    }
}

/// Opens the netcode client once at startup. On failure no transport is
/// installed and the sync engine stays `Disconnected`.
pub fn connect_udp_transport_system(mut commands: Commands, config: Res<ClientConfig>) {
    let addr = config.server_addr();
    match connect_client(&addr, rand::random::<u64>()) {
        Ok((client, transport)) => {
            info!("Connecting to game server at {}", addr);
            let (handle, queue) = outbound_channel();
            commands.insert_resource(client);
            commands.insert_resource(transport);
            commands.insert_resource(queue);
            commands.insert_resource(TransportHandle(Box::new(handle)));
        }
        Err(e) => {
            error!("Could not open transport to {}: {}", addr, e);
        }
    }
}

pub fn receive_messages_system(client: Option<ResMut<RenetClient>>, inbound: Res<InboundSender>) {
    if let Some(mut client) = client {
        drain_messages(&mut client, &inbound.0);
    }
}

/// Reports transport errors and the one-time disconnect to the inbound queue.
pub fn connection_status_system(
    client: Option<Res<RenetClient>>,
    mut errors: EventReader<NetcodeTransportError>,
    inbound: Res<InboundSender>,
    mut status: ResMut<ConnectionStatus>,
) {
    for error in errors.read() {
        let _ = inbound.0.send(TransportEvent::Failed(error.to_string()));
    }

    let Some(client) = client else {
        return;
    };
    if client.is_connected() && !status.connected {
        info!("Connected to game server");
        status.connected = true;
    }
    if client.is_disconnected() && !status.closed {
        warn!("Disconnected from game server: {:?}", client.disconnect_reason());
        status.closed = true;
        let _ = inbound.0.send(TransportEvent::Closed);
    }
}

pub fn flush_outbound_system(queue: Option<Res<OutboundQueue>>, client: Option<ResMut<RenetClient>>) {
    if let (Some(queue), Some(mut client)) = (queue, client) {
        flush_outbound(&queue, &mut client);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::core::CorePlugin;
    use crate::ecs::plugins::network::{NetworkMode, NetworkPlugin};

    #[test]
    fn unreachable_host_installs_no_transport() {
        let config = ClientConfig {
            host: "not an address".to_string(),
            ..ClientConfig::default()
        };
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(CorePlugin { config })
            .add_plugins(NetworkPlugin { mode: NetworkMode::Udp });

        app.update();

        assert!(app.world().get_resource::<TransportHandle>().is_none());
        assert!(app.world().get_resource::<RenetClient>().is_none());
    }

    #[test]
    fn queued_sends_and_client_are_installed_on_startup() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(CorePlugin { config: ClientConfig::default() })
            .add_plugins(NetworkPlugin { mode: NetworkMode::Udp });

        app.update();

        assert!(app.world().get_resource::<RenetClient>().is_some());
        assert!(app.world().get_resource::<OutboundQueue>().is_some());
        let transport = app.world().resource::<TransportHandle>();
        assert!(transport.0.send(b"{}".to_vec(), Reliability::Reliable).is_ok());
    }
}
