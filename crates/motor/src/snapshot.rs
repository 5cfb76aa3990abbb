//! Serializable capture of the movement state, for replays and debugging.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ability::AbilityKind;
use crate::error::SnapshotError;
use crate::movement::MoveMode;
use crate::wall::WallSide;

/// Movement state of one character at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementSnapshot {
    /// Controller clock when the snapshot was taken.
    pub time: f32,
    pub mode: MoveMode,
    pub previous_mode: MoveMode,
    pub time_in_state: f32,
    pub jump_requested: bool,
    pub jump_consumed: bool,
    pub crouching: bool,
    pub wall_side: WallSide,
    pub active_abilities: Vec<AbilityKind>,
    pub position: Vec3,
    pub velocity: Vec3,
}

impl MovementSnapshot {
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serde::encode_to_vec(self, bincode::config::standard())?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let (snapshot, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_running() -> MovementSnapshot {
        MovementSnapshot {
            time: 12.5,
            mode: MoveMode::WallRunning,
            previous_mode: MoveMode::Airborne,
            time_in_state: 0.4,
            jump_requested: false,
            jump_consumed: false,
            crouching: false,
            wall_side: WallSide::Right,
            active_abilities: vec![AbilityKind::AirJump],
            position: Vec3::new(3.0, 4.5, -2.0),
            velocity: Vec3::new(0.0, 1.0, 12.0),
        }
    }

    #[test]
    fn test_encode_decode() {
        let snapshot = wall_running();
        let bytes = snapshot.encode().unwrap();
        assert_eq!(MovementSnapshot::decode(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn test_decode_truncated_fails() {
        let bytes = wall_running().encode().unwrap();
        assert!(MovementSnapshot::decode(&bytes[..bytes.len() / 2]).is_err());
    }
}
