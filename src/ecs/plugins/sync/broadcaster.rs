use bevy::prelude::{Timer, TimerMode};
use std::time::Duration;

use crate::ecs::core::{LocalPlayerState, SessionContext};
use crate::ecs::plugins::network::codec::{encode, OutboundMessage, OutgoingUpdate};
use crate::ecs::plugins::network::{Reliability, Transport, TransportFailure};

pub const BROADCAST_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed-interval sender of the local player's motion. Fire-and-forget:
/// nothing waits on acknowledgement.
#[derive(Debug)]
pub struct UpdateBroadcaster {
    timer: Timer,
    running: bool,
    send_immediately: bool,
    sent: u64,
}

impl Default for UpdateBroadcaster {
    fn default() -> Self {
        Self {
            timer: Timer::new(BROADCAST_INTERVAL, TimerMode::Repeating),
            running: false,
            send_immediately: false,
            sent: 0,
        }
    }
}

impl UpdateBroadcaster {
    /// The first update goes out on the next tick, then one per interval.
    pub fn start(&mut self) {
        self.timer.reset();
        self.running = true;
        self.send_immediately = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.send_immediately = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Advances the timer by `delta` and sends at most one update. Several
    /// elapsed intervals in one frame still produce a single send.
    pub fn tick(
        &mut self,
        delta: Duration,
        session: &SessionContext,
        sample: impl FnOnce() -> Option<LocalPlayerState>,
        transport: &dyn Transport,
    ) -> Result<bool, TransportFailure> {
        if !self.running {
            return Ok(false);
        }

        self.timer.tick(delta);
        if !(self.timer.just_finished() || self.send_immediately) {
            return Ok(false);
        }

        let Some(state) = sample() else {
            return Ok(false);
        };
        self.send_immediately = false;

        let update = OutgoingUpdate {
            position: state.position.truncate(),
            velocity: state.velocity.truncate(),
            map_version: session.map_version,
            player_id: session.local_player_id,
        };
        transport.send(encode(&OutboundMessage::Update(update)), Reliability::Unreliable)?;
        self.sent += 1;
        Ok(true)
    }
}
