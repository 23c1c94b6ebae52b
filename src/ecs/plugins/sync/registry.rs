use glam::Vec3;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::ecs::core::EntityId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteBomb {
    pub id: EntityId,
    pub position: Vec3,
    pub fuse_remaining: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteChest {
    pub id: EntityId,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayer {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upsert {
    pub created: bool,
}

/// Remote entities keyed by server id. Each id is created at most once;
/// re-sent fields for a known id are ignored.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    local_player_id: Option<EntityId>,
    bombs: HashMap<EntityId, RemoteBomb>,
    chests: HashMap<EntityId, RemoteChest>,
    players: HashMap<EntityId, RemotePlayer>,
}

impl EntityRegistry {
    /// The local player's id is never registered as a remote player.
    pub fn set_local_player(&mut self, id: EntityId) {
        self.local_player_id = Some(id);
        self.players.remove(&id);
    }

    pub fn upsert_bomb(&mut self, id: EntityId, position: Vec3, fuse: f32) -> Upsert {
        insert_once(&mut self.bombs, id, || RemoteBomb {
            id,
            position,
            fuse_remaining: fuse,
        })
    }

    pub fn upsert_chest(&mut self, id: EntityId, position: Vec3) -> Upsert {
        insert_once(&mut self.chests, id, || RemoteChest { id, position })
    }

    pub fn upsert_player(&mut self, id: EntityId, name: &str) -> Upsert {
        if self.local_player_id == Some(id) {
            return Upsert { created: false };
        }
        insert_once(&mut self.players, id, || RemotePlayer {
            id,
            name: name.to_string(),
        })
    }

    pub fn remove_chest(&mut self, id: EntityId) -> Option<RemoteChest> {
        self.chests.remove(&id)
    }

    pub fn bomb(&self, id: EntityId) -> Option<&RemoteBomb> {
        self.bombs.get(&id)
    }

    pub fn chest(&self, id: EntityId) -> Option<&RemoteChest> {
        self.chests.get(&id)
    }

    pub fn player(&self, id: EntityId) -> Option<&RemotePlayer> {
        self.players.get(&id)
    }

    pub fn bomb_count(&self) -> usize {
        self.bombs.len()
    }

    pub fn chest_count(&self) -> usize {
        self.chests.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn insert_once<T>(map: &mut HashMap<EntityId, T>, id: EntityId, make: impl FnOnce() -> T) -> Upsert {
    match map.entry(id) {
        Entry::Occupied(_) => Upsert { created: false },
        Entry::Vacant(slot) => {
            slot.insert(make());
            Upsert { created: true }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_upsert_is_a_no_op() {
        let mut registry = EntityRegistry::default();

        assert!(registry.upsert_bomb(9, Vec3::new(1.0, 1.0, 0.0), 3.0).created);
        assert!(!registry.upsert_bomb(9, Vec3::new(5.0, 5.0, 0.0), 0.5).created);
        assert_eq!(registry.bomb_count(), 1);
        assert_eq!(
            registry.bomb(9),
            Some(&RemoteBomb { id: 9, position: Vec3::new(1.0, 1.0, 0.0), fuse_remaining: 3.0 })
        );

        assert!(registry.upsert_chest(4, Vec3::ZERO).created);
        assert!(!registry.upsert_chest(4, Vec3::ONE).created);
        assert_eq!(registry.chest_count(), 1);

        assert!(registry.upsert_player(7, "rival").created);
        assert!(!registry.upsert_player(7, "renamed").created);
        assert_eq!(registry.player(7).map(|p| p.name.as_str()), Some("rival"));
    }

    #[test]
    fn local_player_is_never_registered() {
        let mut registry = EntityRegistry::default();
        registry.set_local_player(1);

        assert!(!registry.upsert_player(1, "me").created);
        assert!(registry.player(1).is_none());
        assert_eq!(registry.player_count(), 0);
    }

    #[test]
    fn removed_chest_can_be_created_again() {
        let mut registry = EntityRegistry::default();
        registry.upsert_chest(2, Vec3::ZERO);

        assert_eq!(registry.remove_chest(2).map(|c| c.id), Some(2));
        assert!(registry.remove_chest(2).is_none());
        assert!(registry.upsert_chest(2, Vec3::ZERO).created);
    }
}
