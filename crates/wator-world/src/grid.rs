//! 2D toroidal occupancy grid for the world.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use wator_core::{AgentId, Error, Position, Result, Species};

/// Random probes tried before falling back to a full scan of free cells
const PLACEMENT_PROBES: usize = 32;

/// What sits on an occupied cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: AgentId,
    pub species: Species,
}

/// A square toroidal grid holding at most one agent per cell.
///
/// Every method wraps its coordinates, so callers may pass any integer pair.
#[derive(Debug, Clone)]
pub struct Grid {
    size: i32,
    cells: Vec<Option<Occupant>>,
    occupied: usize,
}

impl Grid {
    pub fn new(size: i32) -> Self {
        debug_assert!(size > 0, "grid size must be positive");
        let len = (size.max(0) as usize).pow(2);
        Self {
            size,
            cells: vec![None; len],
            occupied: 0,
        }
    }

    /// Edge length of the grid
    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn is_full(&self) -> bool {
        self.occupied == self.cells.len()
    }

    /// Occupant at position (with toroidal wrapping)
    pub fn get(&self, pos: Position) -> Option<Occupant> {
        self.cells[self.index_of(pos)]
    }

    pub fn is_free(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// Put an occupant on a free cell
    pub fn place(&mut self, pos: Position, occupant: Occupant) -> Result<()> {
        let index = self.index_of(pos);
        if self.cells[index].is_some() {
            let wrapped = pos.wrap(self.size);
            return Err(Error::Occupied {
                x: wrapped.x,
                y: wrapped.y,
            });
        }
        self.cells[index] = Some(occupant);
        self.occupied += 1;
        Ok(())
    }

    /// Relocate whatever sits on `from` to `to` in a single update.
    ///
    /// Returns the occupant that was overwritten on `to`, which is how a
    /// capture removes its prey from the grid. Moving onto the same cell is a
    /// no-op.
    pub fn move_occupant(&mut self, from: Position, to: Position) -> Option<Occupant> {
        let from_index = self.index_of(from);
        let to_index = self.index_of(to);
        if from_index == to_index {
            return None;
        }

        let mover = self.cells[from_index].take();
        debug_assert!(mover.is_some(), "no occupant to move at {}", from);
        let displaced = std::mem::replace(&mut self.cells[to_index], mover);
        if displaced.is_some() {
            self.occupied -= 1;
        }
        displaced
    }

    /// Clear a cell, but only while it still belongs to `id`
    pub fn clear(&mut self, pos: Position, id: AgentId) -> bool {
        let index = self.index_of(pos);
        match self.cells[index] {
            Some(occupant) if occupant.id == id => {
                self.cells[index] = None;
                self.occupied -= 1;
                true
            }
            _ => false,
        }
    }

    /// Uniformly chosen free cell, or `None` when the grid is full
    pub fn random_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        if self.is_full() {
            return None;
        }

        for _ in 0..PLACEMENT_PROBES {
            let index = rng.gen_range(0..self.cells.len());
            if self.cells[index].is_none() {
                return Some(self.index_to_pos(index));
            }
        }

        let free: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| i)
            .collect();
        free.choose(rng).map(|&i| self.index_to_pos(i))
    }

    fn index_of(&self, pos: Position) -> usize {
        let wrapped = pos.wrap(self.size);
        (wrapped.y * self.size + wrapped.x) as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.size;
        let y = (index as i32) / self.size;
        Position::new(x, y)
    }

    /// Iterator over occupied cells
    pub fn iter(&self) -> impl Iterator<Item = (Position, Occupant)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.map(|occupant| (self.index_to_pos(i), occupant)))
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            size: self.size,
            cells: self
                .cells
                .iter()
                .map(|cell| cell.map(|occupant| occupant.species))
                .collect(),
        }
    }
}

/// Species-only copy of the grid, row-major, for display and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub size: i32,
    pub cells: Vec<Option<Species>>,
}

impl GridSnapshot {
    pub fn get(&self, x: i32, y: i32) -> Option<Species> {
        let pos = Position::new(x, y).wrap(self.size);
        self.cells[(pos.y * self.size + pos.x) as usize]
    }
}

impl fmt::Display for GridSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size.max(1) as usize) {
            let line: String = row
                .iter()
                .map(|cell| cell.map_or('.', |species| species.glyph()))
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
