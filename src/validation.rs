//! Range checks for parameters, feasibility of initial conditions and
//! finiteness of computed trajectories.
//!
//! Nothing here returns `Err`: every problem is a user-correctable
//! [`ValidationResult`] that the controller turns into a message.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::result::SimulationResult;
use crate::model::sir::{ModelParameters, ModelState, ParamName};

/// Slack on `S0 + I0 + R0 <= N` for floating-point rounding.
pub const POPULATION_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { is_valid: true, error: None }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self { is_valid: false, error: Some(error.into()) }
    }
}

pub fn validate_parameter(name: ParamName, value: f64) -> ValidationResult {
    if !value.is_finite() {
        return ValidationResult::invalid(format!("{} must be a finite number", name));
    }
    let (min, max) = name.range();
    if value < min || value > max {
        return ValidationResult::invalid(format!("{} must be between {} and {}", name, min, max));
    }
    ValidationResult::ok()
}

/// Checks every required name for presence and every present name for range.
pub fn validate_all_parameters(
    params: &ModelParameters,
    required: &[ParamName],
) -> BTreeMap<ParamName, ValidationResult> {
    let mut results = BTreeMap::new();
    for &name in required {
        if params.get(name).is_none() {
            results.insert(name, ValidationResult::invalid(format!("{} is required", name)));
        }
    }
    for name in params.present() {
        if let Some(value) = params.get(name) {
            results.insert(name, validate_parameter(name, value));
        }
    }
    results
}

/// Failing entries only, keyed by parameter name, for display.
pub fn parameter_errors(
    results: &BTreeMap<ParamName, ValidationResult>,
) -> BTreeMap<String, String> {
    results
        .iter()
        .filter_map(|(name, res)| res.error.as_ref().map(|e| (name.to_string(), e.clone())))
        .collect()
}

/// `capacity` is 1 for the normalized variant and the model's N otherwise.
pub fn validate_initial_conditions(s0: f64, i0: f64, r0: f64, capacity: f64) -> ValidationResult {
    if ![s0, i0, r0].iter().all(|v| v.is_finite()) {
        return ValidationResult::invalid("Initial conditions must be finite numbers");
    }
    if s0 < 0.0 || i0 < 0.0 || r0 < 0.0 {
        return ValidationResult::invalid("Initial conditions cannot be negative");
    }
    let total = s0 + i0 + r0;
    if total > capacity + POPULATION_TOLERANCE {
        return ValidationResult::invalid(format!(
            "Total initial population ({}) cannot exceed N ({})",
            total, capacity
        ));
    }
    ValidationResult::ok()
}

pub fn validate_initial_state(state: &ModelState, capacity: f64) -> ValidationResult {
    validate_initial_conditions(state.s, state.i, state.r, capacity)
}

/// `label` names the series in the error message.
pub fn validate_simulation_values(values: &[f64], label: &str) -> ValidationResult {
    match values.iter().position(|v| !v.is_finite()) {
        None => ValidationResult::ok(),
        Some(idx) => ValidationResult::invalid(format!(
            "Simulation produced non-finite {} values (first at index {}); \
             try reducing β or increasing γ",
            label, idx
        )),
    }
}

pub fn validate_simulation_result(result: &SimulationResult) -> ValidationResult {
    let series: [(&[f64], &str); 4] = [
        (result.t.as_slice(), "time"),
        (result.s.as_slice(), "susceptible"),
        (result.i.as_slice(), "infected"),
        (result.r.as_slice(), "recovered"),
    ];
    series
        .into_iter()
        .map(|(values, label)| validate_simulation_values(values, label))
        .find(|res| !res.is_valid)
        .unwrap_or_else(ValidationResult::ok)
}
