//! Owns the current model, parameters and initial state, and republishes a
//! simulation whenever they settle after an edit.
//!
//! State machine:
//!
//! ```text
//!   edit            edit (re-arms timer)
//!  Idle ───────► Debouncing ◄──┐
//!   ▲               │  └───────┘
//!   │  publish      │ deadline reached (poll / settle)
//!   └──────── Computing ◄┘
//! ```
//!
//! Everything runs on the caller's task. The only deferred work is the single
//! pending [`DebounceHandle`]; arming a new one drops the old, so only the
//! latest edit is ever computed.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::engine::{run_simulation, RunOutcome};
use crate::error::ModelError;
use crate::math::ode::Rk4Solver;
use crate::model::result::SimulationResult;
use crate::model::sir::{ModelParameters, ModelState, ParamName, PartialState};
use crate::model::variants::{registry, unknown_model, Model, ModelKind};

/// Starting point for the normalized variant: 1% infected.
pub const DEFAULT_INITIAL_STATE: ModelState = ModelState::new(0.99, 0.01, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Debouncing,
    Computing,
}

/// A scheduled recompute. At most one is live per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceHandle {
    id: u64,
    deadline: Instant,
}

impl DebounceHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// What consumers see after each computation, successful or not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Publication {
    /// Increments on every publish.
    pub revision: u64,
    pub result: Option<Arc<SimulationResult>>,
    pub r0: f64,
    pub parameter_errors: BTreeMap<String, String>,
    pub initial_state_error: Option<String>,
    pub simulation_error: Option<String>,
}

impl Publication {
    pub fn is_valid(&self) -> bool {
        self.parameter_errors.is_empty() && self.initial_state_error.is_none()
    }
}

pub struct SimulationController {
    config: ControllerConfig,
    solver: Rk4Solver,
    model: &'static Model,
    parameters: ModelParameters,
    initial_state: ModelState,
    phase: ControllerPhase,
    pending: Option<DebounceHandle>,
    next_handle: u64,
    computations: u64,
    published: Publication,
    publisher: watch::Sender<Publication>,
}

impl Default for SimulationController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

/// `beta`/`gamma` carried over, every other required parameter copied from
/// `current` or defaulted.
fn parameters_for(model: &Model, current: &ModelParameters) -> ModelParameters {
    let mut params = ModelParameters::new(current.beta, current.gamma);
    for &name in model.required_parameters() {
        if matches!(name, ParamName::Beta | ParamName::Gamma) {
            continue;
        }
        params.set(name, current.get(name).unwrap_or_else(|| name.default_value()));
    }
    params
}

impl SimulationController {
    /// Starts on the basic model with default parameters and a first
    /// computation already scheduled.
    pub fn new(config: ControllerConfig) -> Self {
        let model = ModelKind::BasicSir.model();
        let (publisher, _) = watch::channel(Publication::default());
        let mut ctl = Self {
            config,
            solver: Rk4Solver::new(),
            model,
            parameters: parameters_for(model, &ModelParameters::default()),
            initial_state: DEFAULT_INITIAL_STATE,
            phase: ControllerPhase::Idle,
            pending: None,
            next_handle: 0,
            computations: 0,
            published: Publication::default(),
            publisher,
        };
        ctl.schedule();
        ctl
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn selected_model(&self) -> &'static str {
        self.model.name
    }

    pub fn model(&self) -> &'static Model {
        self.model
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    pub fn initial_state(&self) -> &ModelState {
        &self.initial_state
    }

    pub fn simulation_result(&self) -> Option<&SimulationResult> {
        self.published.result.as_deref()
    }

    pub fn r0_value(&self) -> f64 {
        self.published.r0
    }

    pub fn parameter_errors(&self) -> &BTreeMap<String, String> {
        &self.published.parameter_errors
    }

    pub fn initial_state_error(&self) -> Option<&str> {
        self.published.initial_state_error.as_deref()
    }

    pub fn simulation_error(&self) -> Option<&str> {
        self.published.simulation_error.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.published.is_valid()
    }

    pub fn publication(&self) -> &Publication {
        &self.published
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn pending(&self) -> Option<DebounceHandle> {
        self.pending
    }

    /// Number of times the computing step ran to completion.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Receives every publication from now on.
    pub fn subscribe(&self) -> watch::Receiver<Publication> {
        self.publisher.subscribe()
    }

    pub fn set_parameter(&mut self, name: ParamName, value: f64) {
        self.parameters.set(name, value);
        self.schedule();
    }

    /// String-keyed edit from a front end. Unknown names are logged and ignored.
    pub fn set_parameter_by_name(&mut self, name: &str, value: f64) -> bool {
        match name.parse::<ParamName>() {
            Ok(param) => {
                self.set_parameter(param, value);
                true
            }
            Err(e) => {
                warn!(parameter = name, "ignoring edit: {}", e);
                false
            }
        }
    }

    pub fn set_initial_state(&mut self, edit: PartialState) {
        self.initial_state = edit.apply_to(&self.initial_state);
        self.schedule();
    }

    /// Switches variant, carrying parameters over and rescaling the initial
    /// state between fractions and head counts. Unknown names leave
    /// everything untouched and return `false`.
    pub fn set_selected_model(&mut self, name: &str) -> bool {
        let Some(next) = registry().get(name) else {
            warn!(model = name, "ignoring switch: {}", unknown_model(name));
            return false;
        };
        if next.kind == self.model.kind {
            return true;
        }

        let prev = self.model;
        let params = parameters_for(next, &self.parameters);

        if prev.is_normalized() && !next.is_normalized() {
            let n = params.n.unwrap_or_else(|| ParamName::N.default_value());
            self.initial_state = self.initial_state.scaled(n);
        } else if !prev.is_normalized() && next.is_normalized() {
            let n = self.parameters.n.unwrap_or_else(|| ParamName::N.default_value());
            let s = &self.initial_state;
            self.initial_state = ModelState::new(s.s / n, s.i / n, s.r / n);
        }

        info!(from = prev.name, to = next.name, "switched model");
        self.model = next;
        self.parameters = params;
        self.schedule();
        true
    }

    /// Cancels any pending recompute and arms a fresh one.
    fn schedule(&mut self) {
        if let Some(old) = self.cancel_pending() {
            debug!(handle = old.id(), "debounce timer re-armed");
        }
        self.next_handle += 1;
        let handle = DebounceHandle {
            id: self.next_handle,
            deadline: Instant::now() + self.config.debounce(),
        };
        self.pending = Some(handle);
        self.phase = ControllerPhase::Debouncing;
    }

    pub fn cancel_pending(&mut self) -> Option<DebounceHandle> {
        let old = self.pending.take();
        if old.is_some() {
            self.phase = ControllerPhase::Idle;
        }
        old
    }

    /// Runs the pending computation if its deadline has passed.
    pub fn poll(&mut self) -> Result<bool, ModelError> {
        match self.pending {
            Some(handle) if handle.is_due(Instant::now()) => {
                self.pending = None;
                self.compute()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Waits out the pending deadline, then computes. Returns `false` when
    /// nothing was scheduled.
    pub async fn settle(&mut self) -> Result<bool, ModelError> {
        let Some(handle) = self.pending else {
            return Ok(false);
        };
        tokio::time::sleep_until(handle.deadline()).await;
        self.poll()
    }

    /// Skips the debounce and computes immediately.
    pub fn recompute_now(&mut self) -> Result<(), ModelError> {
        self.cancel_pending();
        self.compute()
    }

    fn compute(&mut self) -> Result<(), ModelError> {
        self.phase = ControllerPhase::Computing;
        let settings = self.config.settings_for(self.model);
        let outcome = run_simulation(
            &self.solver,
            self.model,
            &self.parameters,
            &self.initial_state,
            settings,
        );
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                self.phase = ControllerPhase::Idle;
                return Err(e);
            }
        };

        let revision = self.published.revision + 1;
        let publication = match outcome {
            RunOutcome::Completed { result, r0 } => Publication {
                revision,
                result: Some(Arc::new(result)),
                r0,
                ..Default::default()
            },
            RunOutcome::Invalid { parameter_errors, initial_state_error } => Publication {
                revision,
                parameter_errors,
                initial_state_error,
                ..Default::default()
            },
            RunOutcome::Unstable { message } => Publication {
                revision,
                simulation_error: Some(message),
                ..Default::default()
            },
        };

        self.computations += 1;
        self.published = publication.clone();
        self.publisher.send_replace(publication);
        self.phase = ControllerPhase::Idle;
        Ok(())
    }
}
