use bevy::prelude::*;
use std::time::Duration;

use crate::ecs::plugins::scene::components::*;
use crate::ecs::plugins::sync::components::SessionEndedEvent;
use crate::ecs::plugins::sync::scene::{SceneLayer, Visual};

/// Longest fuse a bomb visual will wait for.
const MAX_FUSE_SECS: f32 = 600.0;

/// Scene layer backed by ECS commands. Handles are entities.
pub struct CommandScene<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
}

impl<'a, 'w, 's> CommandScene<'a, 'w, 's> {
    pub fn new(commands: &'a mut Commands<'w, 's>) -> Self {
        Self { commands }
    }
}

impl SceneLayer for CommandScene<'_, '_, '_> {
    type Handle = Entity;

    fn instantiate(&mut self, visual: Visual, position: glam::Vec3) -> Entity {
        let translation = to_scene_vec(position);
        let mut entity = self
            .commands
            .spawn((SceneVisual(visual.clone()), Transform::from_translation(translation)));

        match visual {
            Visual::LocalPlayer { .. } => {
                entity.insert((LocalPlayer, LocalMotion { position: translation, velocity: Vec3::ZERO }));
            }
            Visual::Bomb { fuse, .. } => {
                let fuse = fuse.max(0.0).min(MAX_FUSE_SECS);
                entity.insert(BombFuse(Timer::from_seconds(fuse, TimerMode::Once)));
            }
            Visual::Chest { .. } => {
                entity.insert(Pickable);
            }
            Visual::OtherPlayer { .. } | Visual::Obstacle { .. } => {}
        }

        entity.id()
    }

    fn destroy(&mut self, handle: Entity, delay_ms: u64) {
        let Some(mut entity) = self.commands.get_entity(handle) else {
            return;
        };
        if delay_ms == 0 {
            entity.despawn();
        } else {
            entity.try_insert(DespawnAfter(Timer::new(Duration::from_millis(delay_ms), TimerMode::Once)));
        }
    }

    fn animate_scale_to_zero(&mut self, handle: Entity, duration_ms: u64) {
        if let Some(mut entity) = self.commands.get_entity(handle) {
            entity.try_insert(ScaleToZero {
                timer: Timer::new(Duration::from_millis(duration_ms), TimerMode::Once),
                from: None,
            });
        }
    }

    fn disable_pickup(&mut self, handle: Entity) {
        if let Some(mut entity) = self.commands.get_entity(handle) {
            entity.remove::<Pickable>();
        }
    }
}

pub fn scale_to_zero_system(
    time: Res<Time>,
    mut query: Query<(&mut Transform, &mut ScaleToZero)>,
) {
    for (mut transform, mut tween) in query.iter_mut() {
        let from = *tween.from.get_or_insert(transform.scale);
        tween.timer.tick(time.delta());
        transform.scale = from * (1.0 - tween.timer.fraction());
    }
}

pub fn despawn_after_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut DespawnAfter)>,
) {
    for (entity, mut delay) in query.iter_mut() {
        if delay.0.tick(time.delta()).finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// Bombs disappear when their fuse runs out; the registry keeps their id.
pub fn bomb_fuse_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &SceneVisual, &mut BombFuse), Without<DespawnAfter>>,
) {
    for (entity, visual, mut fuse) in query.iter_mut() {
        if fuse.0.tick(time.delta()).just_finished() {
            if let Visual::Bomb { id, .. } = &visual.0 {
                debug!("Bomb {} fuse elapsed", id);
            }
            commands.entity(entity).despawn();
        }
    }
}

/// Despawns every sync visual, including ones waiting on a delayed destroy.
pub fn clear_scene_on_session_end_system(
    mut commands: Commands,
    mut ended: EventReader<SessionEndedEvent>,
    visuals: Query<Entity, With<SceneVisual>>,
) {
    if ended.read().count() == 0 {
        return;
    }
    let mut cleared = 0;
    for entity in visuals.iter() {
        commands.entity(entity).despawn();
        cleared += 1;
    }
    info!("Cleared {} scene visuals", cleared);
}
