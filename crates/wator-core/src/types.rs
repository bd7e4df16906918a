//! Core type definitions for the simulation.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an agent, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two species living in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Predator,
    Prey,
}

impl Species {
    /// Single character used in text snapshots
    pub fn glyph(&self) -> char {
        match self {
            Species::Predator => 'X',
            Species::Prey => 'o',
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Predator => write!(f, "predator"),
            Species::Prey => write!(f, "prey"),
        }
    }
}

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Apply toroidal wrapping for a square world of the given edge length
    pub fn wrap(&self, size: i32) -> Self {
        Self {
            x: self.x.rem_euclid(size),
            y: self.y.rem_euclid(size),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Heading of an agent. `+x` is East and `+y` is South.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }

    /// Uniformly chosen direction from the full set
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let all = Self::all();
        all[rng.gen_range(0..all.len())]
    }

    /// Uniformly chosen direction other than `self`
    pub fn different_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let others: Vec<Direction> = Self::all()
            .into_iter()
            .filter(|d| d != self)
            .collect();
        // `others` always holds seven entries
        *others.choose(rng).unwrap_or(self)
    }

    /// Position one step along this heading, before wrapping
    pub fn position_after_movement(&self, pos: Position) -> Position {
        let (dx, dy) = self.to_delta();
        pos.add(dx, dy)
    }
}
