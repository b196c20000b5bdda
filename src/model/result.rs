use serde::{Deserialize, Serialize};

use crate::model::sir::ModelState;

/// Trajectory from one integration run. All four series have the same length
/// and are aligned by index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    pub t: Vec<f64>,
    #[serde(rename = "S")]
    pub s: Vec<f64>,
    #[serde(rename = "I")]
    pub i: Vec<f64>,
    #[serde(rename = "R")]
    pub r: Vec<f64>,
}

impl SimulationResult {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            s: Vec::with_capacity(n),
            i: Vec::with_capacity(n),
            r: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, t: f64, y: &ModelState) {
        self.t.push(t);
        self.s.push(y.s);
        self.i.push(y.i);
        self.r.push(y.r);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn state_at(&self, idx: usize) -> Option<ModelState> {
        Some(ModelState::new(*self.s.get(idx)?, *self.i.get(idx)?, *self.r.get(idx)?))
    }

    pub fn last_state(&self) -> Option<ModelState> {
        self.len().checked_sub(1).and_then(|idx| self.state_at(idx))
    }

    /// (t, S, I, R) rows in time order.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.t
            .iter()
            .zip(&self.s)
            .zip(&self.i)
            .zip(&self.r)
            .map(|(((t, s), i), r)| (*t, *s, *i, *r))
    }

    /// Headline numbers for display next to the plots.
    pub fn summary(&self) -> Option<TrajectorySummary> {
        let last = self.last_state()?;
        let (peak_idx, peak_infected) = self
            .i
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (idx, v)| {
                if v > best.1 {
                    (idx, v)
                } else {
                    best
                }
            });
        Some(TrajectorySummary {
            peak_infected,
            peak_time: self.t[peak_idx],
            final_susceptible: last.s,
            final_infected: last.i,
            final_recovered: last.r,
            final_population: last.total(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub peak_infected: f64,
    pub peak_time: f64,
    pub final_susceptible: f64,
    pub final_infected: f64,
    pub final_recovered: f64,
    pub final_population: f64,
}

/// Fraction that must be immune to stop growth: `1 - 1/R0`, zero when R0 <= 1.
pub fn herd_immunity_threshold(r0: f64) -> f64 {
    if r0 > 1.0 {
        1.0 - 1.0 / r0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> SimulationResult {
        let mut res = SimulationResult::with_capacity(3);
        res.push(0.0, &ModelState::new(0.9, 0.1, 0.0));
        res.push(1.0, &ModelState::new(0.7, 0.2, 0.1));
        res.push(2.0, &ModelState::new(0.6, 0.15, 0.25));
        res
    }

    #[test]
    fn summary_finds_peak() {
        let sum = tiny().summary().unwrap();
        assert_eq!(sum.peak_infected, 0.2);
        assert_eq!(sum.peak_time, 1.0);
        assert_eq!(sum.final_recovered, 0.25);
        assert!((sum.final_population - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_result_has_no_summary() {
        assert!(SimulationResult::default().summary().is_none());
    }

    #[test]
    fn herd_immunity() {
        assert!((herd_immunity_threshold(4.0) - 0.75).abs() < 1e-12);
        assert_eq!(herd_immunity_threshold(0.8), 0.0);
        assert_eq!(herd_immunity_threshold(f64::INFINITY), 1.0);
    }
}
