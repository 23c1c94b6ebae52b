use bevy::prelude::*;
use crate::ecs::core::ClientConfig;

pub struct CorePlugin {
    pub config: ClientConfig,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone());
    }
}
