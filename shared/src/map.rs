//! World map loading and snapshot reconstruction
//!
//! The map file is a text grid using a small legend (`W` wall, `F` floor,
//! `P` point, `S` ghost start, `C` cman start). The same file is loaded by the
//! server, to drive movement, and by every client, to learn the wall layout
//! and the row-major list of starting points the snapshot bitmap refers to.
//!
//! Walls never change after loading. Snapshots only move the two players and
//! toggle point tiles, so a snapshot naming a wall tile for either player is
//! rejected before anything is mutated.

use crate::points::MAX_POINTS;
use crate::protocol::{Role, StateUpdate};
use crate::Coord;
use std::path::Path;
use thiserror::Error;

/// Largest grid side that still fits a single-byte coordinate.
pub const MAX_MAP_SIDE: usize = 256;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("map is empty")]
    Empty,
    #[error("map must contain exactly one cman start, found {0}")]
    CmanStart(usize),
    #[error("map must contain exactly one ghost start, found {0}")]
    GhostStart(usize),
    #[error("map has {0} points, at most {max} fit in a snapshot", max = MAX_POINTS)]
    TooManyPoints(usize),
    #[error("map exceeds {max} rows or columns", max = MAX_MAP_SIDE)]
    TooLarge,
    #[error("{role} coordinate {coord} is outside the map")]
    OutOfBounds { role: Role, coord: Coord },
    #[error("{role} coordinate {coord} is inside a wall")]
    InWall { role: Role, coord: Coord },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Point,
    Cman,
    Ghost,
    /// A character outside the legend, kept and drawn as-is
    Other(char),
}

impl Tile {
    pub fn from_legend(c: char) -> Self {
        match c {
            'W' => Tile::Wall,
            'F' => Tile::Floor,
            'P' => Tile::Point,
            'S' => Tile::Ghost,
            'C' => Tile::Cman,
            other => Tile::Other(other),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Tile::Wall => '█',
            Tile::Floor => ' ',
            Tile::Point => '·',
            Tile::Cman => 'C',
            Tile::Ghost => '∩',
            Tile::Other(c) => c,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorldMap {
    grid: Vec<Vec<Tile>>,
    starting_points: Vec<Coord>,
    cman_start: Coord,
    ghost_start: Coord,
    cman: Coord,
    ghost: Coord,
}

impl WorldMap {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut lines: Vec<&str> = text.lines().map(str::trim).collect();
        // Blank rows inside the grid keep their place; only trailing ones go
        while matches!(lines.last(), Some(line) if line.is_empty()) {
            lines.pop();
        }
        let grid: Vec<Vec<Tile>> = lines
            .into_iter()
            .map(|line| line.chars().map(Tile::from_legend).collect())
            .collect();

        if grid.is_empty() {
            return Err(MapError::Empty);
        }
        if grid.len() > MAX_MAP_SIDE || grid.iter().any(|row| row.len() > MAX_MAP_SIDE) {
            return Err(MapError::TooLarge);
        }

        let find = |wanted: Tile| -> Vec<Coord> {
            let mut found = Vec::new();
            for (row, tiles) in grid.iter().enumerate() {
                for (col, tile) in tiles.iter().enumerate() {
                    if *tile == wanted {
                        found.push(Coord::new(row as u8, col as u8));
                    }
                }
            }
            found
        };

        let starting_points = find(Tile::Point);
        if starting_points.len() > MAX_POINTS {
            return Err(MapError::TooManyPoints(starting_points.len()));
        }

        let cmans = find(Tile::Cman);
        if cmans.len() != 1 {
            return Err(MapError::CmanStart(cmans.len()));
        }
        let ghosts = find(Tile::Ghost);
        if ghosts.len() != 1 {
            return Err(MapError::GhostStart(ghosts.len()));
        }

        Ok(Self {
            grid,
            starting_points,
            cman_start: cmans[0],
            ghost_start: ghosts[0],
            cman: cmans[0],
            ghost: ghosts[0],
        })
    }

    pub fn tile(&self, coord: Coord) -> Option<Tile> {
        self.grid
            .get(coord.row as usize)
            .and_then(|row| row.get(coord.col as usize))
            .copied()
    }

    /// Whether a player may stand on `coord`. Tiles off the grid count as
    /// blocked.
    pub fn is_walkable(&self, coord: Coord) -> bool {
        matches!(self.tile(coord), Some(tile) if tile != Tile::Wall)
    }

    /// Row-major coordinates that held a point when the map was loaded.
    pub fn starting_points(&self) -> &[Coord] {
        &self.starting_points
    }

    pub fn cman_start(&self) -> Coord {
        self.cman_start
    }

    pub fn ghost_start(&self) -> Coord {
        self.ghost_start
    }

    pub fn cman(&self) -> Coord {
        self.cman
    }

    pub fn ghost(&self) -> Coord {
        self.ghost
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.grid.iter().map(Vec::as_slice)
    }

    fn set(&mut self, coord: Coord, tile: Tile) {
        if let Some(cell) = self
            .grid
            .get_mut(coord.row as usize)
            .and_then(|row| row.get_mut(coord.col as usize))
        {
            *cell = tile;
        }
    }

    pub fn remove_players(&mut self) {
        self.set(self.cman, Tile::Floor);
        self.set(self.ghost, Tile::Floor);
    }

    pub fn place_point(&mut self, coord: Coord) {
        self.set(coord, Tile::Point);
    }

    pub fn remove_point(&mut self, coord: Coord) {
        self.set(coord, Tile::Floor);
    }

    pub fn place_cman(&mut self, coord: Coord) {
        self.set(coord, Tile::Cman);
        self.cman = coord;
    }

    pub fn place_ghost(&mut self, coord: Coord) {
        self.set(coord, Tile::Ghost);
        self.ghost = coord;
    }

    fn check_player(&self, role: Role, coord: Coord) -> Result<(), MapError> {
        match self.tile(coord) {
            None => Err(MapError::OutOfBounds { role, coord }),
            Some(Tile::Wall) => Err(MapError::InWall { role, coord }),
            Some(_) => Ok(()),
        }
    }

    /// Rebuilds occupancy from a snapshot: both players are lifted off the
    /// grid, every starting point is rewritten from the bitmap, then the
    /// players are placed again. Applying the same snapshot twice leaves the
    /// map unchanged. A snapshot that would put a player in a wall or off
    /// the grid is rejected and the map keeps its previous state.
    pub fn apply_snapshot(&mut self, update: &StateUpdate) -> Result<(), MapError> {
        self.check_player(Role::Cman, update.cman)?;
        self.check_player(Role::Ghost, update.ghost)?;

        self.remove_players();
        for index in 0..self.starting_points.len() {
            let coord = self.starting_points[index];
            if update.points.is_collected(index) {
                self.remove_point(coord);
            } else {
                self.place_point(coord);
            }
        }
        self.place_cman(update.cman);
        self.place_ghost(update.ghost);
        Ok(())
    }

    /// Renders the grid with display glyphs, one line per row.
    pub fn render(&self) -> String {
        self.grid
            .iter()
            .map(|row| row.iter().map(|tile| tile.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
