use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Names of every parameter any SIR variant may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParamName {
    #[serde(rename = "beta")]
    Beta,
    #[serde(rename = "gamma")]
    Gamma,
    #[serde(rename = "mu")]
    Mu,
    #[serde(rename = "alpha")]
    Alpha,
    #[serde(rename = "N")]
    N,
}

impl ParamName {
    pub const ALL: [ParamName; 5] = [
        ParamName::Beta,
        ParamName::Gamma,
        ParamName::Mu,
        ParamName::Alpha,
        ParamName::N,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::Beta => "beta",
            ParamName::Gamma => "gamma",
            ParamName::Mu => "mu",
            ParamName::Alpha => "alpha",
            ParamName::N => "N",
        }
    }

    /// Accepted closed interval `(min, max)` for this parameter.
    pub fn range(self) -> (f64, f64) {
        match self {
            ParamName::Beta => (1e-5, 10.0),
            ParamName::Gamma => (1e-3, 10.0),
            ParamName::Mu => (0.0, 1.0),
            ParamName::Alpha => (0.0, 10.0),
            ParamName::N => (1.0, 1e6),
        }
    }

    /// Value used when a parameter first becomes required (model switch or startup).
    pub fn default_value(self) -> f64 {
        match self {
            ParamName::Beta => 0.3,
            ParamName::Gamma => 0.1,
            ParamName::Mu => 0.01,
            ParamName::Alpha => 0.005,
            ParamName::N => 1000.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParamName::Beta => "Transmission rate (β)",
            ParamName::Gamma => "Recovery rate (γ)",
            ParamName::Mu => "Birth/death rate (μ)",
            ParamName::Alpha => "Disease mortality rate (α)",
            ParamName::N => "Population size (N)",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamName::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown parameter '{}'", s))
    }
}

/// Rates and sizes for one simulation run. `mu`, `alpha` and `N` are only
/// populated for variants that need them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub beta: f64,
    pub gamma: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            beta: ParamName::Beta.default_value(),
            gamma: ParamName::Gamma.default_value(),
            mu: None,
            alpha: None,
            n: None,
        }
    }
}

impl ModelParameters {
    pub fn new(beta: f64, gamma: f64) -> Self {
        Self { beta, gamma, mu: None, alpha: None, n: None }
    }

    pub fn with(mut self, name: ParamName, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: ParamName) -> Option<f64> {
        match name {
            ParamName::Beta => Some(self.beta),
            ParamName::Gamma => Some(self.gamma),
            ParamName::Mu => self.mu,
            ParamName::Alpha => self.alpha,
            ParamName::N => self.n,
        }
    }

    pub fn set(&mut self, name: ParamName, value: f64) {
        match name {
            ParamName::Beta => self.beta = value,
            ParamName::Gamma => self.gamma = value,
            ParamName::Mu => self.mu = Some(value),
            ParamName::Alpha => self.alpha = Some(value),
            ParamName::N => self.n = Some(value),
        }
    }

    /// Names that currently carry a value.
    pub fn present(&self) -> impl Iterator<Item = ParamName> + '_ {
        ParamName::ALL.into_iter().filter(|p| self.get(*p).is_some())
    }
}

/// S, I, R at one instant: counts for absolute-population variants,
/// fractions for the normalized one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelState {
    #[serde(rename = "S")]
    pub s: f64,
    #[serde(rename = "I")]
    pub i: f64,
    #[serde(rename = "R")]
    pub r: f64,
}

impl ModelState {
    pub const fn new(s: f64, i: f64, r: f64) -> Self {
        Self { s, i, r }
    }

    pub fn total(&self) -> f64 {
        self.s + self.i + self.r
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.s * factor, self.i * factor, self.r * factor)
    }

    /// `self + h * rate`, component-wise.
    pub fn add_scaled(&self, h: f64, rate: &ModelState) -> Self {
        Self::new(
            h.mul_add(rate.s, self.s),
            h.mul_add(rate.i, self.i),
            h.mul_add(rate.r, self.r),
        )
    }
}

/// An initial-state edit touching any subset of the compartments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialState {
    #[serde(rename = "S", default)]
    pub s: Option<f64>,
    #[serde(rename = "I", default)]
    pub i: Option<f64>,
    #[serde(rename = "R", default)]
    pub r: Option<f64>,
}

impl PartialState {
    pub fn apply_to(&self, state: &ModelState) -> ModelState {
        ModelState::new(
            self.s.unwrap_or(state.s),
            self.i.unwrap_or(state.i),
            self.r.unwrap_or(state.r),
        )
    }
}
