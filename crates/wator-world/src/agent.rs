//! Agent state and per-cycle behavior.

use crate::grid::{Grid, Occupant};
use rand::Rng;
use serde::{Deserialize, Serialize};
use wator_core::{AgentId, Direction, Position, PredatorParams, PreyParams, Species};

/// Species-specific state of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    Predator {
        params: PredatorParams,
        /// Cycles since the last capture
        starving: u32,
    },
    Prey {
        params: PreyParams,
    },
}

impl AgentKind {
    pub fn predator(params: PredatorParams) -> Self {
        AgentKind::Predator {
            params,
            starving: 0,
        }
    }

    pub fn prey(params: PreyParams) -> Self {
        AgentKind::Prey { params }
    }

    pub fn species(&self) -> Species {
        match self {
            AgentKind::Predator { .. } => Species::Predator,
            AgentKind::Prey { .. } => Species::Prey,
        }
    }

    fn spawn_cycle(&self) -> u32 {
        match self {
            AgentKind::Predator { params, .. } => params.spawn_cycle,
            AgentKind::Prey { params } => params.spawn_cycle,
        }
    }

    /// Same species and parameters, fresh counters
    fn newborn(&self) -> Self {
        match self {
            AgentKind::Predator { params, .. } => AgentKind::predator(*params),
            AgentKind::Prey { params } => AgentKind::prey(*params),
        }
    }
}

/// A change to shared state requested by an agent during its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Step onto the empty cell `to`
    Move { to: Position },
    /// Step onto `to`, killing the prey that sits there
    Capture { to: Position, prey: AgentId },
    /// Queue a newborn with the given state
    Spawn(AgentKind),
    /// Remove the acting agent, it went too long without eating
    Starve,
}

/// An agent in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    position: Position,
    direction: Direction,
    age: u32,
    kind: AgentKind,
}

impl Agent {
    pub fn new(id: AgentId, kind: AgentKind, position: Position, direction: Direction) -> Self {
        Self {
            id,
            position,
            direction,
            age: 0,
            kind,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Cycles this agent has acted
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    pub fn species(&self) -> Species {
        self.kind.species()
    }

    /// Cycles since the last capture, `None` for prey
    pub fn starving_value(&self) -> Option<u32> {
        match self.kind {
            AgentKind::Predator { starving, .. } => Some(starving),
            AgentKind::Prey { .. } => None,
        }
    }

    pub fn occupant(&self) -> Occupant {
        Occupant {
            id: self.id,
            species: self.species(),
        }
    }

    pub(crate) fn relocate(&mut self, to: Position) {
        self.position = to;
    }

    /// Builder used by tests and scripted scenarios
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    /// Builder used by tests and scripted scenarios; ignored for prey
    pub fn with_starving(mut self, value: u32) -> Self {
        if let AgentKind::Predator { starving, .. } = &mut self.kind {
            *starving = value;
        }
        self
    }

    fn is_starved(&self) -> bool {
        match self.kind {
            AgentKind::Predator { params, starving } => starving >= params.max_starving,
            AgentKind::Prey { .. } => false,
        }
    }

    fn should_spawn(&self) -> bool {
        self.age > 0 && self.age % self.kind.spawn_cycle() == 0
    }

    /// Decide this cycle's actions.
    ///
    /// Only the agent's own counters and heading change here; everything that
    /// touches the grid or the population comes back as an [`Effect`] for the
    /// caller to apply.
    pub fn act<R: Rng + ?Sized>(&mut self, grid: &Grid, rng: &mut R) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        let mut ate = false;

        if self.is_starved() {
            effects.push(Effect::Starve);
        } else {
            if self.should_spawn() {
                effects.push(Effect::Spawn(self.kind.newborn()));
            }
            if let Some(effect) = self.step(grid, rng) {
                ate = matches!(effect, Effect::Capture { .. });
                effects.push(effect);
            }
        }

        self.age += 1;
        if let AgentKind::Predator { starving, .. } = &mut self.kind {
            *starving = if ate { 0 } else { *starving + 1 };
        }

        effects
    }

    /// One movement attempt along the current heading
    fn step<R: Rng + ?Sized>(&mut self, grid: &Grid, rng: &mut R) -> Option<Effect> {
        let target = self
            .direction
            .position_after_movement(self.position)
            .wrap(grid.size());

        match grid.get(target) {
            None => Some(Effect::Move { to: target }),
            Some(other)
                if self.species() == Species::Predator
                    && other.species == Species::Prey
                    && other.id != self.id =>
            {
                Some(Effect::Capture {
                    to: target,
                    prey: other.id,
                })
            }
            Some(_) => {
                self.direction = self.direction.different_random(rng);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn predator(id: u64, pos: Position, direction: Direction, max_starving: u32) -> Agent {
        Agent::new(
            AgentId(id),
            AgentKind::predator(PredatorParams {
                spawn_cycle: 100,
                max_starving,
            }),
            pos,
            direction,
        )
    }

    fn prey(id: u64, pos: Position, direction: Direction, spawn_cycle: u32) -> Agent {
        Agent::new(
            AgentId(id),
            AgentKind::prey(PreyParams { spawn_cycle }),
            pos,
            direction,
        )
    }

    fn grid_with(size: i32, agents: &[&Agent]) -> Grid {
        let mut grid = Grid::new(size);
        for agent in agents {
            grid.place(agent.position(), agent.occupant()).unwrap();
        }
        grid
    }

    #[test]
    fn test_agent_creation() {
        let agent = predator(1, Position::new(2, 3), Direction::East, 5);
        assert_eq!(agent.id(), AgentId(1));
        assert_eq!(agent.species(), Species::Predator);
        assert_eq!(agent.age(), 0);
        assert_eq!(agent.starving_value(), Some(0));

        let fish = prey(2, Position::new(0, 0), Direction::North, 3);
        assert_eq!(fish.species(), Species::Prey);
        assert_eq!(fish.starving_value(), None);
    }

    #[test]
    fn test_move_into_empty_cell() {
        let mut agent = prey(1, Position::new(1, 1), Direction::SouthEast, 10);
        let grid = grid_with(5, &[&agent]);

        let effects = agent.act(&grid, &mut rng());
        assert_eq!(
            effects,
            vec![Effect::Move {
                to: Position::new(2, 2)
            }]
        );
        assert_eq!(agent.direction(), Direction::SouthEast);
        assert_eq!(agent.age(), 1);
    }

    #[test]
    fn test_predator_captures_prey() {
        let mut hunter = predator(1, Position::new(0, 0), Direction::East, 5).with_starving(4);
        let fish = prey(2, Position::new(1, 0), Direction::North, 10);
        let grid = grid_with(3, &[&hunter, &fish]);

        let effects = hunter.act(&grid, &mut rng());
        assert_eq!(
            effects,
            vec![Effect::Capture {
                to: Position::new(1, 0),
                prey: AgentId(2),
            }]
        );
        assert_eq!(hunter.starving_value(), Some(0));
        assert_eq!(hunter.age(), 1);
    }

    #[test]
    fn test_predator_deflects_off_predator() {
        let mut hunter = predator(1, Position::new(0, 0), Direction::East, 5);
        let other = predator(2, Position::new(1, 0), Direction::North, 5);
        let grid = grid_with(3, &[&hunter, &other]);

        let effects = hunter.act(&grid, &mut rng());
        assert!(effects.is_empty());
        assert_eq!(hunter.position(), Position::new(0, 0));
        assert_ne!(hunter.direction(), Direction::East);
        assert_eq!(hunter.starving_value(), Some(1));
    }

    #[test]
    fn test_prey_deflects_off_any_occupant() {
        for blocker in [
            predator(2, Position::new(1, 1), Direction::North, 5),
            prey(2, Position::new(1, 1), Direction::North, 10),
        ] {
            let mut fish = prey(1, Position::new(0, 0), Direction::SouthEast, 10);
            let grid = grid_with(3, &[&fish, &blocker]);

            let effects = fish.act(&grid, &mut rng());
            assert!(effects.is_empty());
            assert_ne!(fish.direction(), Direction::SouthEast);
        }
    }

    #[test]
    fn test_lone_agent_on_single_cell_is_blocked_by_itself() {
        let mut hunter = predator(1, Position::new(0, 0), Direction::West, 5);
        let grid = grid_with(1, &[&hunter]);

        assert!(hunter.act(&grid, &mut rng()).is_empty());
        assert_ne!(hunter.direction(), Direction::West);
    }

    #[test]
    fn test_starved_predator_only_dies() {
        let mut hunter = predator(1, Position::new(0, 0), Direction::East, 3)
            .with_starving(3)
            .with_age(100);
        let fish = prey(2, Position::new(1, 0), Direction::North, 10);
        let grid = grid_with(3, &[&hunter, &fish]);

        // Prey in reach and a spawn due: starvation still wins
        let effects = hunter.act(&grid, &mut rng());
        assert_eq!(effects, vec![Effect::Starve]);
        assert_eq!(hunter.age(), 101);
        assert_eq!(hunter.starving_value(), Some(4));
    }

    #[test]
    fn test_zero_max_starving_dies_on_first_turn() {
        let mut hunter = predator(1, Position::new(0, 0), Direction::East, 0);
        let grid = grid_with(3, &[&hunter]);
        assert_eq!(hunter.act(&grid, &mut rng()), vec![Effect::Starve]);
    }

    #[test]
    fn test_starvation_counts_up_while_hungry() {
        let mut hunter = predator(1, Position::new(0, 0), Direction::East, 3);
        let mut grid = grid_with(5, &[&hunter]);
        let mut rng = rng();

        for expected in 1..=3 {
            let effects = hunter.act(&grid, &mut rng);
            assert_eq!(effects.len(), 1);
            if let Effect::Move { to } = effects[0] {
                grid.move_occupant(hunter.position(), to);
                hunter.relocate(to);
            }
            assert_eq!(hunter.starving_value(), Some(expected));
        }

        assert_eq!(hunter.act(&grid, &mut rng), vec![Effect::Starve]);
    }

    #[test]
    fn test_spawn_on_positive_multiples_of_spawn_cycle() {
        let mut fish = prey(1, Position::new(0, 0), Direction::East, 3);
        let mut grid = grid_with(50, &[&fish]);
        let mut rng = rng();
        let mut spawned_at = Vec::new();

        for _ in 0..10 {
            let age = fish.age();
            for effect in fish.act(&grid, &mut rng) {
                match effect {
                    Effect::Spawn(kind) => {
                        assert_eq!(kind, AgentKind::prey(PreyParams { spawn_cycle: 3 }));
                        spawned_at.push(age);
                    }
                    Effect::Move { to } => {
                        grid.move_occupant(fish.position(), to);
                        fish.relocate(to);
                    }
                    other => panic!("unexpected effect {:?}", other),
                }
            }
        }

        assert_eq!(spawned_at, vec![3, 6, 9]);
    }

    #[test]
    fn test_newborn_predator_has_fresh_counters() {
        let mut hunter = predator(1, Position::new(0, 0), Direction::East, 9)
            .with_age(100)
            .with_starving(6);
        let grid = grid_with(5, &[&hunter]);

        let effects = hunter.act(&grid, &mut rng());
        let kind = effects
            .iter()
            .find_map(|effect| match effect {
                Effect::Spawn(kind) => Some(*kind),
                _ => None,
            })
            .expect("spawn effect");

        assert_eq!(
            kind,
            AgentKind::Predator {
                params: PredatorParams {
                    spawn_cycle: 100,
                    max_starving: 9,
                },
                starving: 0,
            }
        );
        assert_eq!(hunter.starving_value(), Some(7));
    }

    proptest! {
        #[test]
        fn move_off_any_edge_wraps_to_opposite_edge(size in 2i32..12, along in 0i32..12) {
            let along = along % size;
            let last = size - 1;
            let cases = [
                (Position::new(last, along), Direction::East, Position::new(0, along)),
                (Position::new(0, along), Direction::West, Position::new(last, along)),
                (Position::new(along, 0), Direction::North, Position::new(along, last)),
                (Position::new(along, last), Direction::South, Position::new(along, 0)),
                (Position::new(last, last), Direction::SouthEast, Position::new(0, 0)),
                (Position::new(0, 0), Direction::NorthWest, Position::new(last, last)),
            ];

            for (start, direction, expected) in cases {
                let mut agent = prey(1, start, direction, 10);
                let grid = grid_with(size, &[&agent]);
                let effects = agent.act(&grid, &mut rng());
                prop_assert_eq!(effects, vec![Effect::Move { to: expected }]);
            }
        }
    }
}
