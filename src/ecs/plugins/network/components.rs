use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};

use crate::ecs::plugins::network::error::TransportFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reliability {
    Reliable,
    Unreliable,
}

/// Events produced by the transport's receive side.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Datagram(Vec<u8>),
    Failed(String),
    Closed,
}

/// Outbound half of a datagram transport. Sends are fire-and-forget.
pub trait Transport: Send + Sync {
    fn send(&self, bytes: Vec<u8>, reliability: Reliability) -> Result<(), TransportFailure>;
}

#[derive(Resource)]
pub struct TransportHandle(pub Box<dyn Transport>);

/// Hand-off queue from the transport's execution context into the frame loop.
#[derive(Resource)]
pub struct InboundQueue(pub Receiver<TransportEvent>);

#[derive(Resource, Clone)]
pub struct InboundSender(pub Sender<TransportEvent>);

pub fn inbound_channel() -> (InboundSender, InboundQueue) {
    let (send, recv) = crossbeam_channel::unbounded::<TransportEvent>();
    (InboundSender(send), InboundQueue(recv))
}
