//! JSON wire types for the HTTP surface
//!
//! The engine's enums travel as small integers; field names are camelCase.
//! The player listing deliberately omits roles so observers cannot learn
//! who the Mafia are; the single-player lookup is self-service and carries
//! the role once assigned.

use mafia_core::{PhaseExecution, Player};
use serde::Serialize;

/// One player on the wire
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub player_address: String,
    pub player_nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_role: Option<u8>,
}

impl PlayerResponse {
    /// Full record, role included once assigned
    pub fn with_role(player: &Player) -> Self {
        Self {
            player_address: player.address.clone(),
            player_nickname: player.nickname.clone(),
            player_role: player.role.map(|role| role.as_wire()),
        }
    }

    /// Projection for the roster listing: role withheld
    pub fn without_role(player: &Player) -> Self {
        Self {
            player_address: player.address.clone(),
            player_nickname: player.nickname.clone(),
            player_role: None,
        }
    }
}

/// A completed phase on the wire
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseExecutionResponse {
    pub host_address: String,
    pub phase_outcome: u8,
    pub current_phase: u8,
    pub killed_players: Vec<String>,
    pub convicted_players: Vec<String>,
}

impl From<PhaseExecution> for PhaseExecutionResponse {
    fn from(execution: PhaseExecution) -> Self {
        Self {
            host_address: execution.host_address,
            phase_outcome: execution.outcome.as_wire(),
            current_phase: execution.phase.as_wire(),
            killed_players: execution.killed_players,
            convicted_players: execution.convicted_players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mafia_core::{PhaseOutcome, PlayerRole, TimeOfDay};

    fn sample_player() -> Player {
        let mut player = Player::new("0xabc", "Alice");
        player.role = Some(PlayerRole::Mafia);
        player
    }

    #[test]
    fn test_player_with_role_serializes_all_fields() {
        let body = serde_json::to_value(PlayerResponse::with_role(&sample_player())).unwrap();
        assert_eq!(body["playerAddress"], "0xabc");
        assert_eq!(body["playerNickname"], "Alice");
        assert_eq!(body["playerRole"], 1);
    }

    #[test]
    fn test_player_without_role_omits_the_field() {
        let body = serde_json::to_value(PlayerResponse::without_role(&sample_player())).unwrap();
        assert_eq!(body["playerAddress"], "0xabc");
        assert!(body.get("playerRole").is_none());
    }

    #[test]
    fn test_unassigned_role_is_omitted_even_in_the_full_record() {
        let player = Player::new("0xdef", "Bob");
        let body = serde_json::to_value(PlayerResponse::with_role(&player)).unwrap();
        assert!(body.get("playerRole").is_none());
    }

    #[test]
    fn test_phase_execution_wire_format() {
        let execution = PhaseExecution {
            host_address: "host".to_string(),
            phase: TimeOfDay::Night,
            outcome: PhaseOutcome::MafiaVictory,
            killed_players: vec!["victim".to_string()],
            convicted_players: vec![],
        };

        let body = serde_json::to_value(PhaseExecutionResponse::from(execution)).unwrap();
        assert_eq!(body["hostAddress"], "host");
        assert_eq!(body["currentPhase"], 1);
        assert_eq!(body["phaseOutcome"], 2);
        assert_eq!(body["killedPlayers"][0], "victim");
        assert_eq!(body["convictedPlayers"].as_array().unwrap().len(), 0);
    }
}
