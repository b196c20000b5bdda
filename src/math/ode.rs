use serde::{Deserialize, Serialize};

use crate::model::result::SimulationResult;
use crate::model::sir::ModelState;

/// Upper bound on integration steps for one run.
pub const MAX_STEPS: usize = 1_000_000;

/// Time span and fixed step for one integration run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    pub t_start: f64,
    pub t_end: f64,
    pub step: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self { t_start: 0.0, t_end: 100.0, step: 0.01 }
    }
}

impl SolverSettings {
    pub fn new(t_start: f64, t_end: f64, step: f64) -> Self {
        Self { t_start, t_end, step }
    }

    /// Longer, coarser run for variants with vital dynamics.
    pub fn demographic() -> Self {
        Self { t_start: 0.0, t_end: 500.0, step: 0.1 }
    }

    /// `floor((t_end - t_start) / step)`; zero for an empty or inverted span.
    pub fn steps(&self) -> usize {
        let n = ((self.t_end - self.t_start) / self.step).floor();
        if n.is_finite() && n > 0.0 {
            n as usize
        } else {
            0
        }
    }
}

/// One classical RK4 step of size `dt` from `y`.
pub fn rk4_step<F>(y: &ModelState, dt: f64, f: &mut F) -> ModelState
where
    F: FnMut(&ModelState) -> ModelState,
{
    let half_dt = 0.5 * dt;

    let k1 = f(y);
    let k2 = f(&y.add_scaled(half_dt, &k1));
    let k3 = f(&y.add_scaled(half_dt, &k2));
    let k4 = f(&y.add_scaled(dt, &k3));

    let slope = |a: f64, b: f64, c: f64, d: f64| 2.0f64.mul_add(b + c, a + d);
    y.add_scaled(
        dt / 6.0,
        &ModelState::new(
            slope(k1.s, k2.s, k3.s, k4.s),
            slope(k1.i, k2.i, k3.i, k4.i),
            slope(k1.r, k2.r, k3.r, k4.r),
        ),
    )
}

/// Fixed-step RK4 over an (S, I, R) state. Stateless, so one instance can be
/// shared by every run.
///
/// The solver knows nothing about epidemiology: `f` is whatever derivative the
/// caller binds. Pathological inputs yield non-finite output without error,
/// so results must be checked downstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rk4Solver;

impl Rk4Solver {
    pub fn new() -> Self {
        Self
    }

    /// Integrates from `initial` over `settings`, recording the initial point
    /// and every step. Time advances by accumulating `step`.
    ///
    /// Preallocation stops at [`MAX_STEPS`]; callers bound the step count.
    pub fn solve<F>(
        &self,
        mut f: F,
        initial: ModelState,
        settings: SolverSettings,
    ) -> SimulationResult
    where
        F: FnMut(&ModelState) -> ModelState,
    {
        let n_steps = settings.steps();
        let dt = settings.step;
        let mut out = SimulationResult::with_capacity(n_steps.min(MAX_STEPS) + 1);

        let mut t = settings.t_start;
        let mut y = initial;
        out.push(t, &y);

        for _ in 0..n_steps {
            y = rk4_step(&y, dt, &mut f);
            t += dt;
            out.push(t, &y);
        }
        out
    }
}
