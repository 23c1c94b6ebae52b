/*!
# Message Codec

Inbound server payloads are JSON objects tagged by a `type` field. Field
extraction is lenient: a missing or mistyped number reads as zero instead of
rejecting the whole message. Only the `type` tag is structural.

Outbound messages are plain `serde` structs so their field names and numeric
representation stay fixed.
*/

use bevy::log::debug;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ecs::core::{CellId, EntityId};
use crate::ecs::plugins::network::components::Reliability;
use crate::ecs::plugins::network::error::DecodeError;

pub const INITIAL_TYPE: &str = "initial";
pub const UPDATE_TYPE: &str = "update";
pub const CHEST_PICKUP_TYPE: &str = "picked_chest";

// ============================================================================
// INBOUND
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Initial(InitialSnapshot),
    StateUpdate(StateUpdate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitialSnapshot {
    pub width: i64,
    pub height: i64,
    pub map_version: i64,
    pub spawn_position: Vec3,
    pub player_id: EntityId,
    /// Obstacle codes by row; every row has the length of the first one.
    pub map_grid: Vec<Vec<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub timer: i64,
    pub map_version_batches: Vec<Vec<CellId>>,
    pub bombs: Vec<BombEntry>,
    pub chests: Vec<ChestEntry>,
    pub players: Vec<PlayerEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BombEntry {
    pub id: EntityId,
    pub position: Vec3,
    pub fuse: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChestEntry {
    pub id: EntityId,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntry {
    pub id: EntityId,
    pub name: String,
}

pub fn decode(bytes: &[u8]) -> Result<Message, DecodeError> {
    let root: Value = serde_json::from_slice(bytes)?;

    match root.get("type").and_then(Value::as_str) {
        Some(INITIAL_TYPE) => Ok(Message::Initial(decode_initial(&root))),
        Some(UPDATE_TYPE) => Ok(Message::StateUpdate(decode_update(root.get("state")))),
        other => Err(DecodeError::UnknownType(other.map(str::to_string))),
    }
}

fn decode_initial(root: &Value) -> InitialSnapshot {
    let rows = array(root.get("map"));
    let columns = rows.first().map(|row| array(Some(row)).len()).unwrap_or(0);

    let map_grid = rows
        .iter()
        .map(|row| {
            let cells = array(Some(row));
            (0..columns).map(|column| lenient_int(cells.get(column))).collect()
        })
        .collect();

    InitialSnapshot {
        width: lenient_int(root.get("width")),
        height: lenient_int(root.get("height")),
        map_version: lenient_int(root.get("map_version")),
        spawn_position: lenient_vec3(root.get("spawn")),
        player_id: lenient_int(root.get("playerId")),
        map_grid,
    }
}

fn decode_update(state: Option<&Value>) -> StateUpdate {
    let Some(state) = state else {
        return StateUpdate::default();
    };

    let map_version_batches = array(state.get("map_changes"))
        .iter()
        .map(|batch| array(Some(batch)).iter().map(|cell| lenient_int(Some(cell))).collect())
        .collect();

    let bombs = array(state.get("bombs"))
        .iter()
        .map(|bomb| BombEntry {
            id: lenient_int(bomb.get("id")),
            position: lenient_vec3(Some(bomb)),
            fuse: lenient_float(bomb.get("timer")),
        })
        .collect();

    let chests = array(state.get("chests"))
        .iter()
        .map(|chest| ChestEntry {
            id: lenient_int(chest.get("id")),
            position: lenient_vec3(Some(chest)),
        })
        .collect();

    let mut players = Vec::new();
    if let Some(entries) = state.get("players").and_then(Value::as_object) {
        for (key, value) in entries {
            match key.trim().parse::<EntityId>() {
                Ok(id) => players.push(PlayerEntry {
                    id,
                    name: lenient_string(value.get("playerName")),
                }),
                Err(_) => debug!("Skipping player entry with non-numeric key '{}'", key),
            }
        }
    }

    StateUpdate {
        timer: lenient_int(state.get("timer")),
        map_version_batches,
        bombs,
        chests,
        players,
    }
}

fn array(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// Integers as-is, floats truncated, numeric strings parsed, anything else 0.
fn lenient_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(text)) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn lenient_float(value: Option<&Value>) -> f32 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0) as f32,
        Some(Value::String(text)) => text.trim().parse::<f32>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn lenient_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

/// Reads `[x, y, z]` arrays or objects with `x`/`y`/`z` keys.
fn lenient_vec3(value: Option<&Value>) -> Vec3 {
    match value {
        Some(Value::Array(items)) => Vec3::new(
            lenient_float(items.first()),
            lenient_float(items.get(1)),
            lenient_float(items.get(2)),
        ),
        Some(Value::Object(fields)) => Vec3::new(
            lenient_float(fields.get("x")),
            lenient_float(fields.get("y")),
            lenient_float(fields.get("z")),
        ),
        _ => Vec3::ZERO,
    }
}

// ============================================================================
// OUTBOUND
// ============================================================================

/// First message of a session, asks the server for the initial snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialRequest {
    pub player_name: String,
}

/// Local player motion, sent every broadcaster tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingUpdate {
    pub position: Vec2,
    pub velocity: Vec2,
    pub map_version: i64,
    pub player_id: EntityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "picked_chest", rename_all = "camelCase")]
pub struct ChestPickupNotification {
    pub chest_id: EntityId,
    pub player_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    InitialRequest(InitialRequest),
    Update(OutgoingUpdate),
    ChestPickup(ChestPickupNotification),
}

impl OutboundMessage {
    /// Motion updates are superseded every tick; everything else must arrive.
    pub fn reliability(&self) -> Reliability {
        match self {
            OutboundMessage::Update(_) => Reliability::Unreliable,
            OutboundMessage::InitialRequest(_) | OutboundMessage::ChestPickup(_) => Reliability::Reliable,
        }
    }
}

pub fn encode(message: &OutboundMessage) -> Vec<u8> {
    // Plain structs with string keys cannot fail to serialize.
    serde_json::to_vec(message).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_value(value: Value) -> Result<Message, DecodeError> {
        decode(value.to_string().as_bytes())
    }

    fn decode_state(state: Value) -> StateUpdate {
        match decode_value(json!({ "type": "update", "state": state })) {
            Ok(Message::StateUpdate(update)) => update,
            other => panic!("expected state update, got {:?}", other),
        }
    }

    #[test]
    fn decodes_initial_snapshot() {
        let message = decode_value(json!({
            "type": "initial",
            "width": 2,
            "height": 2,
            "map_version": 4,
            "spawn": [1.5, 2.0, 0.0],
            "playerId": 1,
            "map": [[1, 1], [0, 1]]
        }))
        .unwrap();

        assert_eq!(
            message,
            Message::Initial(InitialSnapshot {
                width: 2,
                height: 2,
                map_version: 4,
                spawn_position: Vec3::new(1.5, 2.0, 0.0),
                player_id: 1,
                map_grid: vec![vec![1, 1], vec![0, 1]],
            })
        );
    }

    #[test]
    fn ragged_map_rows_follow_first_row_width() {
        let Message::Initial(snapshot) = decode_value(json!({
            "type": "initial",
            "map": [[1, 2, 3], [4], [5, 6, 7, 8]]
        }))
        .unwrap() else {
            panic!("expected initial snapshot");
        };

        assert_eq!(snapshot.map_grid, vec![vec![1, 2, 3], vec![4, 0, 0], vec![5, 6, 7]]);
    }

    #[test]
    fn decodes_full_state_update() {
        let update = decode_state(json!({
            "timer": 90,
            "map_changes": [[2, 5], []],
            "bombs": [{ "id": 9, "timer": 2.5, "x": 1.0, "y": 2.0, "z": 0.0 }],
            "chests": [{ "id": 4, "x": 3.0, "y": 1.0, "z": 0.0 }],
            "players": { "1": { "playerName": "me" }, "7": { "playerName": "rival" } }
        }));

        assert_eq!(update.timer, 90);
        assert_eq!(update.map_version_batches, vec![vec![2, 5], vec![]]);
        assert_eq!(
            update.bombs,
            vec![BombEntry { id: 9, position: Vec3::new(1.0, 2.0, 0.0), fuse: 2.5 }]
        );
        assert_eq!(update.chests, vec![ChestEntry { id: 4, position: Vec3::new(3.0, 1.0, 0.0) }]);

        let mut players = update.players.clone();
        players.sort_by_key(|player| player.id);
        assert_eq!(
            players,
            vec![
                PlayerEntry { id: 1, name: "me".to_string() },
                PlayerEntry { id: 7, name: "rival".to_string() },
            ]
        );
    }

    #[test]
    fn missing_timer_reads_as_zero() {
        let update = decode_state(json!({ "map_changes": [] }));
        assert_eq!(update.timer, 0);
    }

    #[test]
    fn mistyped_numbers_degrade_to_zero() {
        let update = decode_state(json!({
            "timer": "45",
            "bombs": [{ "id": "12", "timer": null, "x": "oops", "y": 3 }],
            "chests": [{ "id": 2.9 }]
        }));

        assert_eq!(update.timer, 45);
        assert_eq!(update.bombs[0].id, 12);
        assert_eq!(update.bombs[0].fuse, 0.0);
        assert_eq!(update.bombs[0].position, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(update.chests[0].id, 2);
    }

    #[test]
    fn non_array_batch_counts_as_empty_batch() {
        let update = decode_state(json!({ "map_changes": [[1], 7, null] }));
        assert_eq!(update.map_version_batches, vec![vec![1], vec![], vec![]]);
    }

    #[test]
    fn missing_state_yields_empty_update() {
        let message = decode_value(json!({ "type": "update" })).unwrap();
        assert_eq!(message, Message::StateUpdate(StateUpdate::default()));
    }

    #[test]
    fn non_numeric_player_keys_are_skipped() {
        let update = decode_state(json!({
            "players": { "abc": { "playerName": "ghost" }, "3": { "playerName": 42 } }
        }));
        assert_eq!(update.players, vec![PlayerEntry { id: 3, name: "42".to_string() }]);
    }

    #[test]
    fn unknown_or_missing_type_is_rejected() {
        assert!(matches!(
            decode_value(json!({ "type": "lobby" })),
            Err(DecodeError::UnknownType(Some(kind))) if kind == "lobby"
        ));
        assert!(matches!(
            decode_value(json!({ "state": {} })),
            Err(DecodeError::UnknownType(None))
        ));
        assert!(matches!(
            decode_value(json!({ "type": 3 })),
            Err(DecodeError::UnknownType(None))
        ));
        assert!(matches!(decode_value(json!([1, 2])), Err(DecodeError::UnknownType(None))));
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        assert!(matches!(decode(b"{not json"), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn outgoing_update_round_trips() {
        let update = OutgoingUpdate {
            position: Vec2::new(1.0, 2.0),
            velocity: Vec2::new(0.0, 0.0),
            map_version: 7,
            player_id: 3,
        };
        let bytes = encode(&OutboundMessage::Update(update));

        let decoded: OutgoingUpdate = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, update);

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!({ "position": [1.0, 2.0], "velocity": [0.0, 0.0], "mapVersion": 7, "playerId": 3 })
        );
    }

    #[test]
    fn chest_pickup_carries_type_tag() {
        let bytes = encode(&OutboundMessage::ChestPickup(ChestPickupNotification {
            chest_id: 4,
            player_id: 1,
        }));
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({ "type": CHEST_PICKUP_TYPE, "chestId": 4, "playerId": 1 }));
    }

    #[test]
    fn initial_request_carries_player_name() {
        let message = OutboundMessage::InitialRequest(InitialRequest { player_name: "Dynamite".into() });
        let value: Value = serde_json::from_slice(&encode(&message)).unwrap();
        assert_eq!(value, json!({ "playerName": "Dynamite" }));
        assert_eq!(message.reliability(), Reliability::Reliable);
    }
}
