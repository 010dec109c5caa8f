//! Reference [`Game`] used by the server binary: grid movement over a
//! [`WorldMap`], point collection, and catches.

use crate::game::{Game, Player};
use log::{debug, info};
use shared::{Coord, Direction, WorldMap, MAX_ATTEMPTS};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct MazeGame {
    map: WorldMap,
    cman: Coord,
    ghost: Coord,
    points: BTreeMap<Coord, bool>,
    lives: u8,
    score: u8,
    winner: Option<Player>,
}

impl MazeGame {
    pub fn new(map: WorldMap) -> Self {
        let points = map.starting_points().iter().map(|c| (*c, true)).collect();
        Self {
            cman: map.cman_start(),
            ghost: map.ghost_start(),
            map,
            points,
            lives: MAX_ATTEMPTS,
            score: 0,
            winner: None,
        }
    }

    fn reset_positions(&mut self) {
        self.cman = self.map.cman_start();
        self.ghost = self.map.ghost_start();
    }

    fn position_mut(&mut self, player: Player) -> &mut Coord {
        match player {
            Player::Cman => &mut self.cman,
            Player::Ghost => &mut self.ghost,
        }
    }
}

impl Game for MazeGame {
    fn apply_move(&mut self, player: Player, direction: Direction) -> bool {
        if self.winner.is_some() {
            return false;
        }

        let current = *self.position_mut(player);
        let target = match current.step(direction) {
            Some(target) if self.map.is_walkable(target) => target,
            _ => return false,
        };
        *self.position_mut(player) = target;

        if self.cman == self.ghost {
            self.lives = self.lives.saturating_sub(1);
            info!("Cman caught at {}, {} lives left", target, self.lives);
            if self.lives == 0 {
                self.winner = Some(Player::Ghost);
            } else {
                self.reset_positions();
            }
            return true;
        }

        // Only the step that eats the last point wins; a map without points
        // is never won by collection
        if player == Player::Cman && self.points.get(&target) == Some(&true) {
            self.points.insert(target, false);
            self.score = self.score.saturating_add(1);
            debug!("Point collected at {}, score {}", target, self.score);

            if self.points.values().all(|present| !present) {
                self.winner = Some(Player::Cman);
            }
        }

        true
    }

    fn winner(&self) -> Option<Player> {
        self.winner
    }

    fn progress(&self) -> (u8, u8) {
        (self.lives, self.score)
    }

    fn current_coords(&self) -> (Coord, Coord) {
        (self.cman, self.ghost)
    }

    fn points(&self) -> BTreeMap<Coord, bool> {
        self.points.clone()
    }

    fn declare_winner(&mut self, player: Player) {
        self.winner = Some(player);
    }

    fn restart_game(&mut self) {
        self.points.values_mut().for_each(|present| *present = true);
        self.lives = MAX_ATTEMPTS;
        self.score = 0;
        self.winner = None;
        self.reset_positions();
    }

    fn next_round(&mut self) {
        self.reset_positions();
    }
}
