//! Recording fakes for the scene layer and the transport.

use glam::Vec3;
use std::sync::{Arc, Mutex};

use crate::ecs::plugins::network::{Reliability, Transport, TransportFailure};
use crate::ecs::plugins::sync::scene::{SceneLayer, Visual, VisualKind};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneCall {
    Instantiate { handle: u32, visual: Visual, position: Vec3 },
    Destroy { handle: u32, delay_ms: u64 },
    ScaleToZero { handle: u32, duration_ms: u64 },
    DisablePickup { handle: u32 },
}

#[derive(Debug, Default)]
pub struct RecordingScene {
    pub calls: Vec<SceneCall>,
    next_handle: u32,
}

impl RecordingScene {
    pub fn instantiated(&self, kind: VisualKind) -> Vec<Visual> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SceneCall::Instantiate { visual, .. } if visual.kind() == kind => Some(visual.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn handle_of(&self, wanted: &Visual) -> Option<u32> {
        self.calls.iter().find_map(|call| match call {
            SceneCall::Instantiate { handle, visual, .. } if visual == wanted => Some(*handle),
            _ => None,
        })
    }
}

impl SceneLayer for RecordingScene {
    type Handle = u32;

    fn instantiate(&mut self, visual: Visual, position: Vec3) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.calls.push(SceneCall::Instantiate { handle, visual, position });
        handle
    }

    fn destroy(&mut self, handle: u32, delay_ms: u64) {
        self.calls.push(SceneCall::Destroy { handle, delay_ms });
    }

    fn animate_scale_to_zero(&mut self, handle: u32, duration_ms: u64) {
        self.calls.push(SceneCall::ScaleToZero { handle, duration_ms });
    }

    fn disable_pickup(&mut self, handle: u32) {
        self.calls.push(SceneCall::DisablePickup { handle });
    }
}

#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<(Vec<u8>, Reliability)>>>,
    closed: bool,
}

impl RecordingTransport {
    pub fn closed() -> Self {
        Self { closed: true, ..Self::default() }
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, Reliability)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_json(&self) -> Vec<(serde_json::Value, Reliability)> {
        self.sent()
            .into_iter()
            .map(|(bytes, reliability)| (serde_json::from_slice(&bytes).unwrap(), reliability))
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, bytes: Vec<u8>, reliability: Reliability) -> Result<(), TransportFailure> {
        if self.closed {
            return Err(TransportFailure::Closed);
        }
        self.sent.lock().unwrap().push((bytes, reliability));
        Ok(())
    }
}
