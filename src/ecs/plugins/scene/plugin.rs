use bevy::prelude::*;
use crate::ecs::plugins::scene::systems::*;
use crate::ecs::plugins::sync::components::SessionEndedEvent;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SessionEndedEvent>()
            .add_systems(Update, (
                bomb_fuse_system,
                scale_to_zero_system,
                despawn_after_system,
                clear_scene_on_session_end_system,
            ));
    }
}
