pub mod calibration;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod io;
pub mod math;
pub mod model;
pub mod validation;

pub use config::ControllerConfig;
pub use controller::{ControllerPhase, DebounceHandle, Publication, SimulationController};
pub use engine::{run_simulation, RunOutcome};
pub use error::ModelError;
pub use math::ode::{Rk4Solver, SolverSettings};
pub use model::{
    registry, Model, ModelKind, ModelParameters, ModelState, ParamName, PartialState,
    SimulationResult,
};
pub use validation::ValidationResult;
