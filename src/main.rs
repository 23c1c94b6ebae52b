/*!
# Bomber Sync Client

Headless client-side state synchronization for a multiplayer bomber game,
built with Bevy ECS (Entity Component System).

## Architecture Overview

The client is assembled from plugins, one per concern:

- **CorePlugin**: Client configuration and shared session types
- **NetworkPlugin**: UDP transport (renet over netcode) and the inbound queue
- **SyncPlugin**: Message decoding, map/entity reconciliation and the 100ms update broadcaster
- **ScenePlugin**: Visual entities, fades, delayed despawns and bomb fuses
- **DebugPlugin**: Periodic state logging and stalled-snapshot warnings

## How It Works

1. The client sends its player name and waits for the initial snapshot
2. The snapshot seeds the map grid, the session and the local player
3. State updates are reconciled against the map and the entity registry
4. The local player's motion is sent to the server every 100ms
5. Picking up a chest notifies the server once and fades the chest out

Configure the server address with `SYNC_HOST` / `SYNC_PORT` and the player
name with `PLAYER_NAME`.
*/

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

mod ecs;

use ecs::core::ClientConfig;
use ecs::plugins::NetworkMode;
use ecs::{CorePlugin, DebugPlugin, NetworkPlugin, ScenePlugin, SyncPlugin};

/// Client frame rate; the broadcaster keeps its own 100ms cadence on top of it.
const FRAME_RATE: f64 = 60.0;

/// Main entry point for the sync client.
///
/// Reads configuration from the environment, connects the transport and runs
/// the frame loop until the process is stopped.
fn main() {
    let config = ClientConfig::from_env();

    println!("🚀 Starting Bomber Sync Client...");
    println!("📡 Server: {}:{} (UDP)", config.host, config.port);
    println!("🎮 Player: {}", config.player_name);

    App::new()
        // Bevy's minimal plugins (no graphics/audio needed headless)
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f64(1.0 / FRAME_RATE),
        )))
        .add_plugins(LogPlugin::default())

        // Add plugins
        .add_plugins(CorePlugin { config })
        .add_plugins(NetworkPlugin { mode: NetworkMode::Udp })
        .add_plugins(SyncPlugin)
        .add_plugins(ScenePlugin)
        .add_plugins(DebugPlugin)

        // Start the frame loop
        .run();
}
