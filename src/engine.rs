//! Validate → R0 → integrate → validate, as one synchronous run.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ModelError;
use crate::math::ode::{Rk4Solver, SolverSettings, MAX_STEPS};
use crate::model::result::SimulationResult;
use crate::model::sir::{ModelParameters, ModelState, ParamName};
use crate::model::variants::Model;
use crate::validation::{
    parameter_errors, validate_all_parameters, validate_initial_state, validate_simulation_result,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed {
        result: SimulationResult,
        r0: f64,
    },
    /// Inputs failed validation; the integrator was not invoked.
    Invalid {
        parameter_errors: BTreeMap<String, String>,
        initial_state_error: Option<String>,
    },
    /// Inputs were in range but the trajectory (or R0) was not finite.
    Unstable { message: String },
}

/// Capacity the initial state is checked against: 1 for the normalized
/// variant, N otherwise. `None` while N itself is missing or unusable.
pub fn initial_capacity(model: &Model, params: &ModelParameters) -> Option<f64> {
    if model.is_normalized() {
        return Some(1.0);
    }
    params.get(ParamName::N).filter(|n| n.is_finite())
}

pub fn run_simulation(
    solver: &Rk4Solver,
    model: &Model,
    params: &ModelParameters,
    initial: &ModelState,
    settings: SolverSettings,
) -> Result<RunOutcome, ModelError> {
    let param_errors =
        parameter_errors(&validate_all_parameters(params, model.required_parameters()));
    let initial_state_error = initial_capacity(model, params)
        .map(|cap| validate_initial_state(initial, cap))
        .and_then(|res| res.error);

    if !param_errors.is_empty() || initial_state_error.is_some() {
        debug!(
            model = model.name,
            parameter_errors = param_errors.len(),
            initial_state_error = initial_state_error.is_some(),
            "skipping integration, inputs invalid"
        );
        return Ok(RunOutcome::Invalid { parameter_errors: param_errors, initial_state_error });
    }

    let rates = model.resolve(params)?;
    let r0 = model.r0(&rates);
    if !r0.is_finite() {
        warn!(model = model.name, r0, "basic reproduction number is not finite");
        return Ok(RunOutcome::Unstable {
            message: "R0 is not finite; increase γ or μ".to_string(),
        });
    }

    let steps = settings.steps();
    if steps > MAX_STEPS {
        warn!(model = model.name, steps, "integration span too long for step size");
        return Ok(RunOutcome::Unstable {
            message: format!(
                "Integration would take {} steps, more than the limit of {}; \
                 increase the step size",
                steps, MAX_STEPS
            ),
        });
    }

    let result = solver.solve(|y| model.derivatives(y, &rates), *initial, settings);
    let check = validate_simulation_result(&result);
    if let Some(message) = check.error {
        warn!(model = model.name, beta = rates.beta, gamma = rates.gamma, "{}", message);
        return Ok(RunOutcome::Unstable { message });
    }

    debug!(model = model.name, r0, points = result.len(), "simulation completed");
    Ok(RunOutcome::Completed { result, r0 })
}
