//! Round lifecycle and request arbitration
//!
//! [`GameStateMachine`] owns the role slots, the round phase, and the
//! [`Game`] that resolves moves. It has no socket: requests come in as
//! `(address, message)` pairs and outgoing snapshots are computed on demand,
//! so every transition can be driven directly from tests.

use crate::client_manager::ClientManager;
use crate::game::{Game, Player};
use log::{debug, info, warn};
use shared::{
    ClientMessage, Direction, EndSummary, ErrorCode, PointsBitmap, Role, StateUpdate,
    MAX_ATTEMPTS,
};
use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Player slots not yet both filled
    Pregame,
    /// Both players joined, no move applied yet
    Waiting,
    /// At least one move applied since the last catch
    Playing,
    /// A life was just lost; the ghost sits out until the next applied move
    Start,
    /// A winner is known
    End,
}

pub struct GameStateMachine<G: Game> {
    phase: RoundPhase,
    clients: ClientManager,
    game: G,
}

impl<G: Game> GameStateMachine<G> {
    pub fn new(game: G) -> Self {
        Self {
            phase: RoundPhase::Pregame,
            clients: ClientManager::new(),
            game,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    fn set_phase(&mut self, phase: RoundPhase) {
        if self.phase != phase {
            info!("Round phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Routes one decoded request from `addr`.
    pub fn handle(&mut self, addr: SocketAddr, message: ClientMessage) -> Result<(), ErrorCode> {
        match message {
            ClientMessage::Join(role) => self.join(addr, role),
            ClientMessage::Move(direction) => self.move_player(addr, direction),
            ClientMessage::Quit => self.quit(addr),
        }
    }

    pub fn join(&mut self, addr: SocketAddr, role: Role) -> Result<(), ErrorCode> {
        self.clients.join(addr, role)?;

        if self.phase == RoundPhase::Pregame && self.clients.both_players_joined() {
            self.game.next_round();
            self.set_phase(RoundPhase::Waiting);
        }
        Ok(())
    }

    pub fn move_player(&mut self, addr: SocketAddr, direction: Direction) -> Result<(), ErrorCode> {
        let role = self.clients.role_of(addr).ok_or(ErrorCode::UnknownClient)?;

        match self.phase {
            RoundPhase::Pregame => return Err(ErrorCode::NotStarted),
            RoundPhase::End => {
                debug!("Ignoring move from {} after the round ended", addr);
                return Ok(());
            }
            _ => {}
        }

        let player = Player::from_role(role).ok_or(ErrorCode::WatcherMove)?;

        let (lives_before, _) = self.game.progress();
        let applied = self.game.apply_move(player, direction);
        let (lives_after, _) = self.game.progress();
        let life_lost = lives_before != lives_after;

        debug!(
            "{:?} moved {:?}: applied={}, life_lost={}",
            player, direction, applied, life_lost
        );

        if self.game.winner().is_some() {
            self.set_phase(RoundPhase::End);
        } else if life_lost && self.phase == RoundPhase::Playing {
            self.set_phase(RoundPhase::Start);
        } else if applied {
            self.set_phase(RoundPhase::Playing);
        }
        Ok(())
    }

    /// Handles a Quit. Before both players are in, a player simply gives up
    /// the slot. Afterwards a player quitting forfeits the round to the
    /// other one. Watchers just stop receiving snapshots.
    pub fn quit(&mut self, addr: SocketAddr) -> Result<(), ErrorCode> {
        let role = self.clients.role_of(addr).ok_or(ErrorCode::UnknownClient)?;

        let player = match Player::from_role(role) {
            Some(player) => player,
            None => {
                self.clients.remove(addr);
                return Ok(());
            }
        };

        match self.phase {
            RoundPhase::Pregame => {
                self.clients.remove(addr);
            }
            RoundPhase::End => {}
            _ => {
                info!("{:?} quit mid-round, {:?} wins", player, player.other());
                self.game.declare_winner(player.other());
                self.set_phase(RoundPhase::End);
            }
        }
        Ok(())
    }

    /// Clears every slot and starts a fresh game. Called once the end of a
    /// round has been broadcast for the full cooldown.
    pub fn reset(&mut self) {
        self.clients.clear();
        self.game.restart_game();
        self.set_phase(RoundPhase::Pregame);
    }

    /// Whether a recipient holding `role` may move right now.
    pub fn is_frozen(&self, role: Role) -> bool {
        match role {
            Role::Cman => self.phase == RoundPhase::Pregame,
            Role::Ghost => matches!(
                self.phase,
                RoundPhase::Pregame | RoundPhase::Waiting | RoundPhase::Start
            ),
            Role::Spectator => true,
        }
    }

    /// The snapshot a recipient holding `role` should receive this tick.
    pub fn snapshot_for(&self, role: Role) -> StateUpdate {
        let (cman, ghost) = self.game.current_coords();
        let (lives, _) = self.game.progress();
        StateUpdate {
            freeze: self.is_frozen(role),
            cman,
            ghost,
            attempts: MAX_ATTEMPTS.saturating_sub(lives),
            points: PointsBitmap::from_presence(&self.game.points()),
        }
    }

    /// Final result, available once the game reports a winner.
    pub fn end_summary(&self) -> Option<EndSummary> {
        let winner = match self.game.winner() {
            Some(winner) => winner,
            None => {
                warn!("Round ended without a winner");
                return None;
            }
        };
        let (lives, score) = self.game.progress();
        Some(EndSummary {
            winner: winner.role(),
            ghost_catches: MAX_ATTEMPTS.saturating_sub(lives),
            cman_score: score,
        })
    }
}
