pub mod result;
pub mod sir;
pub mod variants;

pub use result::{herd_immunity_threshold, SimulationResult, TrajectorySummary};
pub use sir::{ModelParameters, ModelState, ParamName, PartialState};
pub use variants::{registry, unknown_model, Model, ModelKind, ModelRegistry, Rates};
