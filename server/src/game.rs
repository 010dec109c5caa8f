//! Boundary to the movement/collision/scoring engine.
//!
//! The round state machine never moves players itself. It hands each legal
//! request to a [`Game`] and reads back positions, lives, score, and point
//! occupancy to build snapshots.

use shared::{Coord, Direction, Role};
use std::collections::BTreeMap;

/// The two moving identities in a round. Protocol roles are translated into
/// this type once, at the state-machine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Cman,
    Ghost,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::Cman => Player::Ghost,
            Player::Ghost => Player::Cman,
        }
    }

    pub fn from_role(role: Role) -> Option<Player> {
        match role {
            Role::Cman => Some(Player::Cman),
            Role::Ghost => Some(Player::Ghost),
            Role::Spectator => None,
        }
    }

    pub fn role(self) -> Role {
        match self {
            Player::Cman => Role::Cman,
            Player::Ghost => Role::Ghost,
        }
    }
}

pub trait Game {
    /// Applies a move if it is legal. Returns whether anything moved.
    fn apply_move(&mut self, player: Player, direction: Direction) -> bool;

    fn winner(&self) -> Option<Player>;

    /// `(lives remaining, cman score)`
    fn progress(&self) -> (u8, u8);

    /// `(cman, ghost)`
    fn current_coords(&self) -> (Coord, Coord);

    /// Every starting point and whether it is still on the map.
    fn points(&self) -> BTreeMap<Coord, bool>;

    fn declare_winner(&mut self, player: Player);

    /// Restores lives, score, and points for a fresh game.
    fn restart_game(&mut self);

    /// Puts both players back on their start tiles for a new round.
    fn next_round(&mut self);
}
