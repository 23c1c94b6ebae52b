use bevy::prelude::*;
use crate::ecs::plugins::sync::scene::Visual;

/// Marks every entity created for the sync engine.
#[derive(Component, Debug, Clone)]
pub struct SceneVisual(pub Visual);

#[derive(Component, Debug, Clone, Copy)]
pub struct LocalPlayer;

/// Written by the local simulation, sampled by the update broadcaster.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalMotion {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Present while the local player may pick the chest up.
#[derive(Component, Debug, Clone, Copy)]
pub struct Pickable;

#[derive(Component, Debug, Clone)]
pub struct BombFuse(pub Timer);

/// Shrinks the transform's scale from its value at the first tick to zero.
#[derive(Component, Debug, Clone)]
pub struct ScaleToZero {
    pub timer: Timer,
    pub from: Option<Vec3>,
}

#[derive(Component, Debug, Clone)]
pub struct DespawnAfter(pub Timer);

pub fn to_scene_vec(v: glam::Vec3) -> Vec3 {
    Vec3::from_array(v.to_array())
}

pub fn to_wire_vec(v: Vec3) -> glam::Vec3 {
    glam::Vec3::from_array(v.to_array())
}
