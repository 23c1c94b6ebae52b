/*!
# Renet Transport

UDP through a renet client speaking the netcode protocol. Renet owns sequencing,
acknowledgement, resends and ordering: reliable sends use the
`ReliableOrdered` channel, motion updates the `Unreliable` one.

The frame loop never calls renet from inside the sync core. `Transport::send`
only queues; a system moves the queue into the client before renet flushes
packets, and another moves received messages into the inbound hand-off queue.
*/

use bevy::prelude::Resource;
use bevy_renet::netcode::{ClientAuthentication, NetcodeClientTransport};
use bevy_renet::renet::{ConnectionConfig, DefaultChannel, RenetClient};
use crossbeam_channel::{Receiver, Sender};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::SystemTime;

use crate::ecs::plugins::network::components::{Reliability, Transport, TransportEvent};
use crate::ecs::plugins::network::error::TransportFailure;

/// Must match the server's netcode protocol id.
pub const PROTOCOL_ID: u64 = 0;

pub struct Outbound {
    bytes: Vec<u8>,
    reliability: Reliability,
}

/// Sending half handed to the sync engine.
pub struct RenetTransport {
    outbound: Sender<Outbound>,
}

/// Sends waiting to be written into the renet client this frame.
#[derive(Resource)]
pub struct OutboundQueue(pub Receiver<Outbound>);

pub fn outbound_channel() -> (RenetTransport, OutboundQueue) {
    let (send, recv) = crossbeam_channel::unbounded::<Outbound>();
    (RenetTransport { outbound: send }, OutboundQueue(recv))
}

impl Transport for RenetTransport {
    fn send(&self, bytes: Vec<u8>, reliability: Reliability) -> Result<(), TransportFailure> {
        self.outbound
            .send(Outbound { bytes, reliability })
            .map_err(|_| TransportFailure::Closed)
    }
}

fn channel_for(reliability: Reliability) -> u8 {
    match reliability {
        Reliability::Reliable => DefaultChannel::ReliableOrdered.into(),
        Reliability::Unreliable => DefaultChannel::Unreliable.into(),
    }
}

/// Resolves `server_addr`, binds a local socket and builds an unsecured
/// netcode client for it.
pub fn connect_client(
    server_addr: &str,
    client_id: u64,
) -> Result<(RenetClient, NetcodeClientTransport), TransportFailure> {
    let server = server_addr
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| TransportFailure::Resolve(server_addr.to_string()))?;

    let local: SocketAddr = if server.is_ipv4() {
        SocketAddr::from(([0, 0, 0, 0], 0))
    } else {
        SocketAddr::from(([0u16; 8], 0))
    };
    let socket = UdpSocket::bind(local).map_err(TransportFailure::Bind)?;

    let current_time = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|e| TransportFailure::Connect(e.to_string()))?;
    let authentication = ClientAuthentication::Unsecure {
        protocol_id: PROTOCOL_ID,
        client_id,
        server_addr: server,
        user_data: None,
    };
    let transport = NetcodeClientTransport::new(current_time, authentication, socket)
        .map_err(|e| TransportFailure::Connect(e.to_string()))?;

    Ok((RenetClient::new(ConnectionConfig::default()), transport))
}

/// Writes every queued send into its renet channel, in queue order.
pub fn flush_outbound(queue: &OutboundQueue, client: &mut RenetClient) -> usize {
    let mut flushed = 0;
    for Outbound { bytes, reliability } in queue.0.try_iter() {
        client.send_message(channel_for(reliability), bytes);
        flushed += 1;
    }
    flushed
}

/// Moves received messages into the inbound queue. The reliable channel is
/// drained first so a snapshot precedes unreliable traffic from the same frame.
pub fn drain_messages(client: &mut RenetClient, inbound: &Sender<TransportEvent>) -> usize {
    let mut drained = 0;
    for channel in [channel_for(Reliability::Reliable), channel_for(Reliability::Unreliable)] {
        while let Some(message) = client.receive_message(channel) {
            let _ = inbound.send(TransportEvent::Datagram(message.to_vec()));
            drained += 1;
        }
    }
    drained
}
