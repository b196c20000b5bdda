use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::math::ode::{SolverSettings, MAX_STEPS};
use crate::model::sir::ParamName;
use crate::model::variants::Model;

pub const DEBOUNCE_ENV: &str = "EPICURVE_DEBOUNCE_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Quiet period after the last edit before recomputing.
    pub debounce_ms: u64,
    /// Span and step for variants without vital dynamics.
    pub basic: SolverSettings,
    /// Span and step for variants that require μ.
    pub demographic: SolverSettings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            basic: SolverSettings::default(),
            demographic: SolverSettings::demographic(),
        }
    }
}

impl ControllerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Demographic variants evolve on a slower time scale.
    pub fn settings_for(&self, model: &Model) -> SolverSettings {
        if model.requires(ParamName::Mu) {
            self.demographic
        } else {
            self.basic
        }
    }

    pub fn check(&self) -> anyhow::Result<()> {
        for (label, s) in [("basic", &self.basic), ("demographic", &self.demographic)] {
            anyhow::ensure!(s.step.is_finite() && s.step > 0.0, "{} step must be positive", label);
            anyhow::ensure!(
                s.t_start.is_finite() && s.t_end.is_finite() && s.t_end > s.t_start,
                "{} span must be finite and non-empty",
                label
            );
            anyhow::ensure!(
                s.steps() <= MAX_STEPS,
                "{} span/step gives {} steps, more than the limit of {}",
                label,
                s.steps(),
                MAX_STEPS
            );
        }
        Ok(())
    }

    /// Defaults overlaid with `EPICURVE_DEBOUNCE_MS` when set.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        if let Ok(raw) = std::env::var(DEBOUNCE_ENV) {
            cfg.debounce_ms = raw
                .trim()
                .parse()
                .with_context(|| {
                    format!(
                        "{} must be an integer number of milliseconds, got '{}'",
                        DEBOUNCE_ENV, raw
                    )
                })?;
        }
        cfg.check()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read controller config: {:?}", path))?;
        let cfg: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse controller config: {:?}", path))?;
        cfg.check()?;
        Ok(cfg)
    }
}
