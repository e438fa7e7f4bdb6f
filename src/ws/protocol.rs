//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Movement key carried by a `move` intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKey {
    #[serde(alias = "KeyW")]
    Up,
    #[serde(alias = "KeyA")]
    Left,
    #[serde(alias = "KeyS")]
    Down,
    #[serde(alias = "KeyD")]
    Right,
    /// Any other keycode. Still advances the sequence number.
    #[serde(other)]
    Unrecognized,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMsg {
    /// Create this session's player
    Join {
        username: String,
        /// Canvas width, bounds projectiles fired by this player
        width: f64,
        /// Canvas height, bounds projectiles fired by this player
        height: f64,
        /// Screen width, bounds this player's movement
        screen_width: f64,
        /// Screen height, bounds this player's movement
        screen_height: f64,
    },

    /// One movement step
    Move {
        keycode: MoveKey,
        /// Sequence number for client-side prediction reconciliation
        #[serde(rename = "sequenceNumber")]
        sequence_number: u64,
    },

    /// Fire a projectile from (x, y)
    Shoot {
        x: f64,
        y: f64,
        /// Direction in radians
        angle: f64,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMsg {
    /// Sent once to a new connection, carries the id its player will use
    Welcome { session_id: Uuid },

    /// Full roster, sent on join, leave and every tick
    PlayersUpdate {
        players: HashMap<Uuid, PlayerSnapshot>,
    },

    /// Every in-flight projectile, sent every tick
    ProjectilesUpdate {
        projectiles: BTreeMap<u64, ProjectileSnapshot>,
    },
}

/// Width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

/// 2D vector on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// Player state in a roster update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f64,
    pub y: f64,
    pub color: String,
    /// Last applied input sequence
    #[serde(rename = "sequenceNumber")]
    pub sequence_number: u64,
    pub score: u64,
    pub username: String,
    pub sc_width: f64,
    pub sc_height: f64,
    pub canvas: Extent,
    pub radius: f64,
}

/// Projectile state in a projectiles update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub x: f64,
    pub y: f64,
    pub velocity: Vec2,
    #[serde(rename = "playerId")]
    pub player_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_payload() {
        let msg: ClientMsg = serde_json::from_str(
            r#"{"type":"join","username":"ada","width":1024,"height":768,"screen_width":800,"screen_height":600}"#,
        )
        .unwrap();

        match msg {
            ClientMsg::Join {
                username,
                width,
                screen_height,
                ..
            } => {
                assert_eq!(username, "ada");
                assert_eq!(width, 1024.0);
                assert_eq!(screen_height, 600.0);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_move_accepts_named_and_legacy_keys() {
        let named: ClientMsg =
            serde_json::from_str(r#"{"type":"move","keycode":"left","sequenceNumber":3}"#).unwrap();
        let legacy: ClientMsg =
            serde_json::from_str(r#"{"type":"move","keycode":"KeyD","sequenceNumber":4}"#).unwrap();

        assert!(matches!(
            named,
            ClientMsg::Move { keycode: MoveKey::Left, sequence_number: 3 }
        ));
        assert!(matches!(
            legacy,
            ClientMsg::Move { keycode: MoveKey::Right, sequence_number: 4 }
        ));
    }

    #[test]
    fn test_move_with_unknown_key_still_parses() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"move","keycode":"Space","sequenceNumber":9}"#).unwrap();

        assert!(matches!(
            msg,
            ClientMsg::Move { keycode: MoveKey::Unrecognized, sequence_number: 9 }
        ));
    }

    #[test]
    fn test_unknown_message_type_is_rejected() {
        let result = serde_json::from_str::<ClientMsg>(r#"{"type":"chat","text":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_projectiles_update_wire_shape() {
        let owner = Uuid::new_v4();
        let mut projectiles = BTreeMap::new();
        projectiles.insert(
            7,
            ProjectileSnapshot {
                x: 1.0,
                y: 2.0,
                velocity: Vec2 { x: 5.0, y: 0.0 },
                player_id: owner,
            },
        );

        let value = serde_json::to_value(ServerMsg::ProjectilesUpdate { projectiles }).unwrap();

        assert_eq!(value["type"], "projectiles-update");
        assert_eq!(value["projectiles"]["7"]["velocity"]["x"], 5.0);
        assert_eq!(value["projectiles"]["7"]["playerId"], owner.to_string());
    }
}
