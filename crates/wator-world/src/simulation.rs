//! Simulation engine: owns the grid and the population and drives cycles.

use crate::agent::{Agent, AgentKind, Effect};
use crate::grid::{Grid, GridSnapshot};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, trace};
use wator_core::{
    AgentId, CycleReport, Direction, Error, PopulationCounts, PopulationTotals, Position, Result,
    SimulationConfig, Species,
};

/// Why an agent left the population
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Starved,
    Eaten,
}

pub struct Environment {
    grid: Grid,
    agents: Vec<Agent>,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    next_id: u64,
    cycle: u64,
    // Deferred population changes, drained by `commit`
    pending_removals: Vec<(AgentId, Removal)>,
    removed: HashSet<AgentId>,
    pending_births: Vec<AgentKind>,
    totals: PopulationTotals,
}

impl Environment {
    /// Build a world and seed it with the configured initial population
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut env = Self::empty(config)?;

        let predators = env.config.initial.predators;
        let prey = env.config.initial.prey;
        let predator_params = env.config.predator;
        let prey_params = env.config.prey;

        for _ in 0..predators {
            env.seed(AgentKind::predator(predator_params))?;
        }
        for _ in 0..prey {
            env.seed(AgentKind::prey(prey_params))?;
        }

        info!(
            size = env.grid.size(),
            predators = predators,
            prey = prey,
            seed = env.config.seed,
            "World seeded"
        );

        Ok(env)
    }

    /// Build a world with no agents; populate it with [`Environment::insert_agent`]
    pub fn empty(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            grid: Grid::new(config.world.size),
            agents: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            next_id: 0,
            cycle: 0,
            pending_removals: Vec::new(),
            removed: HashSet::new(),
            pending_births: Vec::new(),
            totals: PopulationTotals::default(),
        })
    }

    /// Put an agent of `species` on a chosen cell with a chosen heading.
    ///
    /// The agent takes the species parameters from the configuration and
    /// acts after every agent already in the population.
    pub fn insert_agent(
        &mut self,
        species: Species,
        position: Position,
        direction: Direction,
    ) -> Result<AgentId> {
        let kind = match species {
            Species::Predator => AgentKind::predator(self.config.predator),
            Species::Prey => AgentKind::prey(self.config.prey),
        };
        let position = position.wrap(self.grid.size());
        let agent = Agent::new(AgentId(self.next_id), kind, position, direction);
        self.grid.place(position, agent.occupant())?;
        self.next_id += 1;

        let id = agent.id();
        self.agents.push(agent);
        Ok(id)
    }

    fn seed(&mut self, kind: AgentKind) -> Result<()> {
        match self.place_newborn(kind) {
            Some(_) => Ok(()),
            None => Err(Error::GridFull(format!(
                "no free cell left to seed a {}",
                kind.species()
            ))),
        }
    }

    /// Place a fresh agent on a uniform-random free cell with a random heading
    fn place_newborn(&mut self, kind: AgentKind) -> Option<AgentId> {
        let position = self.grid.random_free_cell(&mut self.rng)?;
        let direction = Direction::random(&mut self.rng);
        let agent = Agent::new(AgentId(self.next_id), kind, position, direction);
        self.grid.place(position, agent.occupant()).ok()?;
        self.next_id += 1;

        let id = agent.id();
        self.agents.push(agent);
        Some(id)
    }

    /// Run up to `num_cycles` cycles, stopping early on extinction if configured
    #[instrument(skip(self), fields(num_cycles = self.config.num_cycles, seed = self.config.seed))]
    pub fn run(&mut self) -> SimulationResult {
        info!("Starting simulation for {} cycles", self.config.num_cycles);

        // `num_cycles` is an upper bound only, so the history grows as cycles complete
        let mut history = Vec::new();
        history.push(self.population());
        let mut extinct = None;

        for _ in 0..self.config.num_cycles {
            let report = self.step();
            history.push(report.population);

            let interval = self.config.report_interval;
            if interval > 0 && report.cycle % interval == 0 {
                info!(
                    cycle = report.cycle,
                    predators = report.population.predators,
                    prey = report.population.prey,
                    births = report.births,
                    starved = report.starved,
                    eaten = report.eaten,
                    "Population snapshot"
                );
            }

            if let Some(species) = extinct_species(&report.population) {
                if extinct.is_none() {
                    info!(cycle = report.cycle, species = %species, "Species died out");
                    extinct = Some(species);
                }
                if self.config.stop_on_extinction {
                    break;
                }
            }
        }

        let result = SimulationResult {
            cycles_run: self.cycle,
            final_population: self.population(),
            history,
            totals: self.totals,
            extinct,
        };

        info!(
            cycles_run = result.cycles_run,
            predators = result.final_population.predators,
            prey = result.final_population.prey,
            births = result.totals.births,
            births_dropped = result.totals.births_dropped,
            starved = result.totals.starved,
            eaten = result.totals.eaten,
            "Simulation complete"
        );

        result
    }

    /// Execute one full cycle: every live agent acts once, then queued
    /// births and deaths are applied.
    pub fn step(&mut self) -> CycleReport {
        self.cycle += 1;
        let mut report = CycleReport {
            cycle: self.cycle,
            ..Default::default()
        };

        self.sweep();
        self.commit(&mut report);

        report.population = self.population();
        self.totals.record(&report);
        debug_assert!(self.is_consistent(), "grid and population diverged");
        report
    }

    fn sweep(&mut self) {
        // Agents only join the list during `commit`, so indices stay stable here
        let count = self.agents.len();
        for index in 0..count {
            let id = self.agents[index].id();
            if self.removed.contains(&id) {
                continue;
            }

            let effects = self.agents[index].act(&self.grid, &mut self.rng);
            for effect in effects {
                self.apply(index, effect);
            }
        }
    }

    fn apply(&mut self, index: usize, effect: Effect) {
        let agent = &mut self.agents[index];
        let id = agent.id();

        match effect {
            Effect::Move { to } => {
                let displaced = self.grid.move_occupant(agent.position(), to);
                debug_assert!(displaced.is_none(), "{} moved onto an occupied cell", id);
                trace!(agent = %id, from = %agent.position(), to = %to, "Moved");
                agent.relocate(to);
            }

            Effect::Capture { to, prey } => {
                let displaced = self.grid.move_occupant(agent.position(), to);
                debug_assert_eq!(displaced.map(|o| o.id), Some(prey));
                trace!(predator = %id, prey = %prey, at = %to, "Captured prey");
                agent.relocate(to);
                self.queue_removal(prey, Removal::Eaten);
            }

            Effect::Spawn(kind) => {
                trace!(parent = %id, species = %kind.species(), "Queued newborn");
                self.pending_births.push(kind);
            }

            Effect::Starve => {
                self.queue_removal(id, Removal::Starved);
            }
        }
    }

    fn queue_removal(&mut self, id: AgentId, cause: Removal) {
        if self.removed.insert(id) {
            self.pending_removals.push((id, cause));
        }
    }

    fn commit(&mut self, report: &mut CycleReport) {
        if !self.pending_removals.is_empty() {
            let causes: HashMap<AgentId, Removal> = self.pending_removals.drain(..).collect();
            let grid = &mut self.grid;
            let cycle = self.cycle;

            self.agents.retain(|agent| match causes.get(&agent.id()) {
                Some(cause) => {
                    // A captured prey's cell already belongs to its predator
                    grid.clear(agent.position(), agent.id());
                    match cause {
                        Removal::Starved => report.starved += 1,
                        Removal::Eaten => report.eaten += 1,
                    }
                    debug!(
                        cycle = cycle,
                        agent = %agent.id(),
                        species = %agent.species(),
                        age = agent.age(),
                        cause = ?cause,
                        "Agent removed"
                    );
                    false
                }
                None => true,
            });
            self.removed.clear();
        }

        let births = std::mem::take(&mut self.pending_births);
        for kind in births {
            match self.place_newborn(kind) {
                Some(_) => report.births += 1,
                None => {
                    report.births_dropped += 1;
                    debug!(
                        cycle = self.cycle,
                        species = %kind.species(),
                        "Newborn dropped: grid is full"
                    );
                }
            }
        }
    }

    /// Live agent counts per species
    pub fn population(&self) -> PopulationCounts {
        self.agents.iter().map(Agent::species).collect()
    }

    /// Species on a cell, wrapping the coordinates
    pub fn agent_at(&self, x: i32, y: i32) -> Option<Species> {
        self.grid
            .get(Position::new(x, y))
            .map(|occupant| occupant.species)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id() == id)
    }

    /// Live agents in acting order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.grid.snapshot()
    }

    /// Cycles completed so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn totals(&self) -> PopulationTotals {
        self.totals
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Every agent sits on its own cell and the grid holds nothing else
    pub fn is_consistent(&self) -> bool {
        self.grid.occupied_count() == self.agents.len()
            && self.agents.iter().all(|agent| {
                self.grid.get(agent.position()).map(|o| o.id) == Some(agent.id())
            })
    }
}

fn extinct_species(population: &PopulationCounts) -> Option<Species> {
    if population.predators == 0 {
        Some(Species::Predator)
    } else if population.prey == 0 {
        Some(Species::Prey)
    } else {
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub cycles_run: u64,
    pub final_population: PopulationCounts,
    /// Population before the first cycle and after each completed one
    pub history: Vec<PopulationCounts>,
    pub totals: PopulationTotals,
    /// First species observed extinct, if any
    pub extinct: Option<Species>,
}
