//! World simulation engine.
//!
//! A square toroidal grid populated by predators and prey. Each cycle every
//! live agent acts once in a fixed order; births and deaths decided during the
//! sweep are queued and applied only after every agent has acted.

pub mod grid;
pub mod agent;
pub mod simulation;

pub use grid::{Grid, GridSnapshot, Occupant};
pub use agent::{Agent, AgentKind, Effect};
pub use simulation::{Environment, SimulationResult};
