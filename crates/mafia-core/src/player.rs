//! Players and their roles

use serde::{Deserialize, Serialize};

/// Role assigned to a player when the game starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRole {
    /// An ordinary townsperson
    Civilian,
    /// A member of the Mafia, allowed to cast kill votes at night
    Mafia,
}

impl PlayerRole {
    /// Stable integer form used on the wire (Civilian = 0, Mafia = 1)
    pub fn as_wire(self) -> u8 {
        match self {
            PlayerRole::Civilian => 0,
            PlayerRole::Mafia => 1,
        }
    }
}

/// A participant in a single match
///
/// Players are created on join and persist for the match's life; the roster
/// is append-only. Role stays `None` until the game starts and is frozen
/// once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque identifier, unique within the match
    pub address: String,
    /// Display name
    pub nickname: String,
    /// Assigned role; `None` before the game starts
    pub role: Option<PlayerRole>,
    /// Voted out during a day phase
    pub convicted: bool,
    /// Killed during a night phase
    pub dead: bool,
}

impl Player {
    /// Create a new unassigned player
    pub fn new(address: &str, nickname: &str) -> Self {
        Self {
            address: address.to_string(),
            nickname: nickname.to_string(),
            role: None,
            convicted: false,
            dead: false,
        }
    }

    /// Whether this player may still vote or be voted against
    pub fn can_act(&self) -> bool {
        !self.convicted && !self.dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_unassigned_and_able_to_act() {
        let player = Player::new("0xabc", "Alice");
        assert_eq!(player.role, None);
        assert!(player.can_act());
    }

    #[test]
    fn test_conviction_and_death_block_acting() {
        let mut player = Player::new("0xabc", "Alice");
        player.convicted = true;
        assert!(!player.can_act());

        let mut player = Player::new("0xdef", "Bob");
        player.dead = true;
        assert!(!player.can_act());
    }
}
